use thiserror::Error;

/// Errors from the fetch side of the pipeline: building, issuing, and
/// reading service requests.
#[derive(Debug, Error)]
pub enum ForcingDataError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Retries exhausted after {attempts} attempts for {url}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}")]
    BodyRead(String, #[source] reqwest::Error),

    #[error("Fetcher returned {got} responses for {expected} requests")]
    ResponseCountMismatch { expected: usize, got: usize },
}
