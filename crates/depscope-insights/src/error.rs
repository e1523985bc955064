use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightsError>;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),

    #[error("batch of {0} keys exceeds the service limit")]
    BatchTooLarge(usize),
}
