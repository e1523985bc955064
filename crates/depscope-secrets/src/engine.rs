//! Streaming detection engine
//!
//! Feeds registered detectors overlapping windows from a byte source and
//! rebases their window-relative positions onto stream coordinates. The
//! retained overlap equals the largest detector window, so any secret that
//! fits a window is seen whole by at least one scan. Re-detections inside
//! the overlap are deduplicated by (detector, position).

use crate::detector::{Detection, Detector, DEFAULT_WINDOW};
use std::collections::HashSet;
use std::io::Read;
use tracing::warn;

/// Upper bound on detections from a single scan; a pathological input
/// degrades gracefully instead of allocating without bound.
const MAX_DETECTIONS: usize = 1_000_000;

pub struct DetectionEngine {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectionEngine {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    fn window(&self) -> usize {
        self.detectors
            .iter()
            .map(|d| d.max_secret_len())
            .max()
            .unwrap_or(DEFAULT_WINDOW)
    }

    /// Scan an in-memory buffer.
    pub fn scan_bytes(&self, data: &[u8]) -> Vec<Detection> {
        self.scan_reader(data).expect("in-memory read cannot fail")
    }

    /// Scan a byte source incrementally.
    pub fn scan_reader(&self, mut reader: impl Read) -> std::io::Result<Vec<Detection>> {
        let window = self.window();
        let mut buffer: Vec<u8> = Vec::with_capacity(window * 2);
        let mut base = 0usize;
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut detections: Vec<Detection> = Vec::new();
        let mut chunk = vec![0u8; window];

        loop {
            let n = reader.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
            self.scan_window(&buffer, base, &mut seen, &mut detections);

            if buffer.len() > window {
                let drop = buffer.len() - window;
                buffer.drain(..drop);
                base += drop;
            }
        }

        detections.sort_by_key(|d| d.position);
        Ok(detections)
    }

    fn scan_window(
        &self,
        buffer: &[u8],
        base: usize,
        seen: &mut HashSet<(usize, usize)>,
        detections: &mut Vec<Detection>,
    ) {
        for (index, detector) in self.detectors.iter().enumerate() {
            for detection in detector.detect(buffer) {
                if detections.len() >= MAX_DETECTIONS {
                    warn!(
                        detector = detector.name(),
                        "detection cap of {} reached, dropping further matches", MAX_DETECTIONS
                    );
                    return;
                }
                let position = base + detection.position;
                if seen.insert((index, position)) {
                    detections.push(Detection::new(detection.secret, position));
                }
            }
        }
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::new()
    }
}
