use thiserror::Error;

/// Errors specific to fetching and decoding the domain grid mask.
#[derive(Error, Debug)]
pub enum GridMaskError {
    // Covers staging the downloaded bytes for the NetCDF reader
    #[error("Failed to stage the grid mask on disk: {0}")]
    TempFile(#[from] std::io::Error),

    #[error("Failed to decode the grid mask: {0}")]
    Decode(#[source] netcdf::Error),

    #[error("Grid mask is missing the '{0}' variable")]
    MissingVariable(String),

    #[error("Grid mask variable '{variable}' has {got} values, expected {expected}")]
    ShapeMismatch {
        variable: String,
        expected: usize,
        got: usize,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
