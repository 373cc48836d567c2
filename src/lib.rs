mod error;
mod forcing;
mod grid;
mod nldas;
mod types;

pub use error::NldasError;
pub use nldas::*;

pub use forcing::error::ForcingDataError;
pub use forcing::fetcher::{FetchConfig, ForcingFetcher, HttpFetcher};
pub use forcing::request::ServiceRequest;
pub use forcing::response::Fragment;

pub use grid::error::GridMaskError;
pub use grid::mask::GridMask;

pub use types::catalog::ForcingVariable;
pub use types::coords::{BoundingBox, Geometry, LonLat, CONUS_BOUNDS};
pub use types::dataset::{ForcingDataset, GridVariable};
pub use types::into_date_trait::IntoDateInput;
