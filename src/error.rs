use crate::forcing::error::ForcingDataError;
use crate::grid::error::GridMaskError;
use thiserror::Error;

/// The date window the service supports, used in range error messages.
pub(crate) const VALID_DATE_WINDOW: &str = "1979-01-01 to yesterday";

#[derive(Debug, Error)]
pub enum NldasError {
    /// An argument had the wrong shape, e.g. an empty coordinate list.
    #[error("Invalid '{param}': expected {expected}")]
    InvalidInput {
        param: &'static str,
        expected: String,
    },

    /// A variable name outside the fixed catalog.
    #[error("Unknown variable '{name}'; valid variables: {valid}")]
    UnknownVariable { name: String, valid: String },

    /// A date outside the window the service publishes data for.
    #[error("'{field}' is out of range; supported window: {valid}")]
    DateOutOfRange {
        field: &'static str,
        valid: &'static str,
    },

    /// A coordinate outside the grid's bounding box.
    #[error("'coords' is out of range; supported bounds (west, south, east, north): {bounds}")]
    CoordsOutOfRange { bounds: String },

    /// A coordinate reference system other than the grid's native one.
    #[error("Unsupported CRS '{given}'; only EPSG:4326 is supported")]
    UnsupportedCrs { given: String },

    /// The service answered with an embedded error message instead of data.
    #[error("NLDAS service error: {0}")]
    Service(String),

    #[error(transparent)]
    ForcingData(#[from] ForcingDataError),

    #[error(transparent)]
    GridMask(#[from] GridMaskError),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}
