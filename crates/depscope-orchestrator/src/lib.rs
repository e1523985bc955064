//! Enricher Orchestration
//!
//! The orchestrator owns the [`Inventory`] for the duration of a scan and
//! moves it through enrichment phases. Enrichers declare which producers
//! they require; the orchestrator derives a topological order, runs each
//! enricher sequentially with a mutable borrow of the inventory, and keeps
//! going when an individual enricher fails.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  Orchestrator                │
//! └──────────┬───────────────────┘
//!            │
//!            ├──> EnricherRegistry (name -> Box<dyn Enricher>)
//!            │
//!            ├──> topological order over `requires()`
//!            │
//!            └──> enrich(&ScanInput, &mut Inventory), one at a time
//! ```

pub mod enricher;
pub mod registry;

pub use enricher::{Enricher, ScanInput};
pub use registry::EnricherRegistry;

use depscope_core::Inventory;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{info, warn};

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("enricher {enricher} requires absent producer {missing}")]
    DependencyUnsatisfied { enricher: String, missing: String },

    #[error("dependency cycle among enrichers: {0:?}")]
    DependencyCycle(Vec<String>),

    #[error("unknown enricher: {0}")]
    UnknownEnricher(String),

    #[error("scan canceled")]
    Canceled,
}

/// Drives enrichers over one inventory.
pub struct Orchestrator {
    registry: EnricherRegistry,
}

impl Orchestrator {
    pub fn new(registry: EnricherRegistry) -> Self {
        Self { registry }
    }

    /// Run the named enrichers in dependency order.
    ///
    /// A failing enricher is logged and skipped; the pipeline continues.
    /// Ordering problems (absent producers, cycles, unknown names) and
    /// cancellation abort the run.
    pub async fn run(
        &self,
        input: &ScanInput,
        inventory: &mut Inventory,
        enabled: &[&str],
    ) -> Result<()> {
        let order = self.execution_order(enabled)?;
        info!("running {} enrichers: {:?}", order.len(), order);

        for name in &order {
            if input.cancel.is_cancelled() {
                return Err(OrchestratorError::Canceled);
            }
            let enricher = self
                .registry
                .get(name)
                .expect("ordered names come from the registry");

            match enricher.enrich(input, inventory).await {
                Ok(()) => info!(enricher = %name, "enrichment complete"),
                Err(e) => warn!(enricher = %name, "enricher failed, skipping: {e:#}"),
            }
        }
        Ok(())
    }

    /// Topological order of the enabled enrichers over their `requires`
    /// sets (Kahn's algorithm, stable within a rank by enabled order).
    fn execution_order(&self, enabled: &[&str]) -> Result<Vec<String>> {
        let enabled_set: HashSet<&str> = enabled.iter().copied().collect();

        let mut requires: HashMap<&str, Vec<String>> = HashMap::new();
        for name in enabled {
            let enricher = self
                .registry
                .get(name)
                .ok_or_else(|| OrchestratorError::UnknownEnricher(name.to_string()))?;
            for req in enricher.requires() {
                if !enabled_set.contains(req.as_str()) {
                    return Err(OrchestratorError::DependencyUnsatisfied {
                        enricher: name.to_string(),
                        missing: req,
                    });
                }
                requires.entry(name).or_default().push(req);
            }
        }

        let mut order = Vec::with_capacity(enabled.len());
        let mut placed: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<&str> = enabled.to_vec();

        while !remaining.is_empty() {
            let ready: Vec<&str> = remaining
                .iter()
                .copied()
                .filter(|n| {
                    requires
                        .get(n)
                        .map(|reqs| reqs.iter().all(|r| placed.contains(r.as_str())))
                        .unwrap_or(true)
                })
                .collect();

            if ready.is_empty() {
                return Err(OrchestratorError::DependencyCycle(
                    remaining.iter().map(|s| s.to_string()).collect(),
                ));
            }
            for name in ready {
                placed.insert(name);
                order.push(name.to_string());
            }
            remaining.retain(|n| !placed.contains(n));
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use depscope_core::{Ecosystem, Package};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Recorder {
        name: String,
        requires: Vec<String>,
        log: Arc<std::sync::Mutex<Vec<String>>>,
        fail: bool,
        seen: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Enricher for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn requires(&self) -> Vec<String> {
            self.requires.clone()
        }

        async fn enrich(
            &self,
            _input: &ScanInput,
            inventory: &mut Inventory,
        ) -> anyhow::Result<()> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            self.log.lock().unwrap().push(self.name.clone());
            inventory.add_package(Package::new(Ecosystem::Generic, self.name.clone(), "1"));
            Ok(())
        }
    }

    fn recorder(
        name: &str,
        requires: &[&str],
        log: &Arc<std::sync::Mutex<Vec<String>>>,
        fail: bool,
    ) -> (Box<Recorder>, Arc<AtomicUsize>) {
        let seen = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Recorder {
                name: name.to_string(),
                requires: requires.iter().map(|s| s.to_string()).collect(),
                log: log.clone(),
                fail,
                seen: seen.clone(),
            }),
            seen,
        )
    }

    #[tokio::test]
    async fn test_runs_in_dependency_order() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = EnricherRegistry::new();
        let (c, _) = recorder("consumer", &["producer"], &log, false);
        let (p, _) = recorder("producer", &[], &log, false);
        registry.register(c);
        registry.register(p);

        let orchestrator = Orchestrator::new(registry);
        let input = ScanInput::new("/scan");
        let mut inventory = Inventory::new();
        orchestrator
            .run(&input, &mut inventory, &["consumer", "producer"])
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["producer", "consumer"]);
    }

    #[tokio::test]
    async fn test_absent_producer_is_an_error() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = EnricherRegistry::new();
        let (c, _) = recorder("consumer", &["vulnmatch/osv"], &log, false);
        registry.register(c);

        let orchestrator = Orchestrator::new(registry);
        let input = ScanInput::new("/scan");
        let mut inventory = Inventory::new();
        let err = orchestrator
            .run(&input, &mut inventory, &["consumer"])
            .await
            .unwrap_err();

        match err {
            OrchestratorError::DependencyUnsatisfied { enricher, missing } => {
                assert_eq!(enricher, "consumer");
                assert_eq!(missing, "vulnmatch/osv");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failing_enricher_is_skipped() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = EnricherRegistry::new();
        let (bad, bad_seen) = recorder("bad", &[], &log, true);
        let (good, _) = recorder("good", &[], &log, false);
        registry.register(bad);
        registry.register(good);

        let orchestrator = Orchestrator::new(registry);
        let input = ScanInput::new("/scan");
        let mut inventory = Inventory::new();
        orchestrator
            .run(&input, &mut inventory, &["bad", "good"])
            .await
            .unwrap();

        assert_eq!(bad_seen.load(Ordering::SeqCst), 1);
        assert_eq!(*log.lock().unwrap(), vec!["good"]);
        assert_eq!(inventory.packages().len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_detected() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = EnricherRegistry::new();
        let (a, _) = recorder("a", &["b"], &log, false);
        let (b, _) = recorder("b", &["a"], &log, false);
        registry.register(a);
        registry.register(b);

        let orchestrator = Orchestrator::new(registry);
        let input = ScanInput::new("/scan");
        let mut inventory = Inventory::new();
        let err = orchestrator
            .run(&input, &mut inventory, &["a", "b"])
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::DependencyCycle(_)));
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_run() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = EnricherRegistry::new();
        let (a, a_seen) = recorder("a", &[], &log, false);
        registry.register(a);

        let orchestrator = Orchestrator::new(registry);
        let input = ScanInput::new("/scan");
        input.cancel.cancel();
        let mut inventory = Inventory::new();
        let err = orchestrator
            .run(&input, &mut inventory, &["a"])
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::Canceled));
        assert_eq!(a_seen.load(Ordering::SeqCst), 0);
    }
}
