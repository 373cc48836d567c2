//! This module provides the main entry point for the NLDAS-2 forcing
//! client. It allows fetching hourly climate forcing either for a list of
//! point coordinates or for a geographic region, and exposes the domain
//! grid mask the region path is built on.

use crate::error::NldasError;
use crate::forcing::assemble::{assemble_grid, assemble_table};
use crate::forcing::date_chunks::{partition_window, resolve_window, MAX_CHUNK_DAYS};
use crate::forcing::error::ForcingDataError;
use crate::forcing::fetcher::{FetchConfig, ForcingFetcher, HttpFetcher};
use crate::forcing::request::build_requests;
use crate::forcing::response::{parse_fragment, Fragment};
use crate::grid::mask::{decode_mask, GridMask, CELL_SIZE_DEG, MASK_URL};
use crate::types::catalog::ForcingVariable;
use crate::types::coords::{check_crs, validate_coords, Geometry, LonLat};
use crate::types::dataset::ForcingDataset;
use crate::types::into_date_trait::IntoDateInput;
use bon::bon;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use log::info;
use polars::prelude::DataFrame;
use std::sync::Arc;

/// The result of a point query: a table by default, a gridded dataset
/// when `as_grid` is set.
///
/// # Examples
///
/// ```no_run
/// # use nldas2::{LonLat, Nldas, NldasError};
/// # async fn run() -> Result<(), NldasError> {
/// let client = Nldas::new();
/// let output = client
///     .get_by_coords()
///     .coords(vec![LonLat(-100.0, 40.0)])
///     .start_date("2022-01-01")
///     .end_date("2022-01-31")
///     .call()
///     .await?;
/// if let Some(table) = output.into_table() {
///     println!("{table}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub enum ForcingOutput {
    /// Point-mode table: `lon`, `lat`, `time`, then one column per
    /// selected variable.
    Table(DataFrame),
    /// Grid-mode dataset: one `(time, y, x)` cube per selected variable.
    Grid(ForcingDataset),
}

impl ForcingOutput {
    /// The table, if this output is one.
    pub fn into_table(self) -> Option<DataFrame> {
        match self {
            ForcingOutput::Table(table) => Some(table),
            ForcingOutput::Grid(_) => None,
        }
    }

    /// The gridded dataset, if this output is one.
    pub fn into_grid(self) -> Option<ForcingDataset> {
        match self {
            ForcingOutput::Table(_) => None,
            ForcingOutput::Grid(dataset) => Some(dataset),
        }
    }
}

/// The main client struct for fetching NLDAS-2 hourly forcing data.
///
/// The client splits each query into one service call per
/// (location, date chunk, variable), issues them concurrently through a
/// [`ForcingFetcher`], parses the textual responses, and reassembles the
/// fragments into a table or a gridded dataset.
///
/// Create an instance with [`Nldas::new()`] for default behavior,
/// [`Nldas::with_config()`] to tune the HTTP fetcher, or
/// [`Nldas::with_fetcher()`] to supply your own fetcher implementation
/// (tests use this to avoid network access).
///
/// # Examples
///
/// ```no_run
/// # use nldas2::{LonLat, Nldas, NldasError};
/// # async fn run() -> Result<(), NldasError> {
/// let client = Nldas::new();
/// let table = client
///     .get_by_coords()
///     .coords(vec![LonLat(-100.0, 40.0), LonLat(-89.6, 35.1)])
///     .start_date("2022-01-01")
///     .end_date("2022-01-31")
///     .variables(vec!["temp".to_string(), "prcp".to_string()])
///     .call()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Nldas {
    fetcher: Arc<dyn ForcingFetcher>,
}

#[bon]
impl Nldas {
    /// Creates a client with the default HTTP fetcher (endpoint, retry
    /// policy, and a concurrency limit of 4).
    pub fn new() -> Self {
        Self {
            fetcher: Arc::new(HttpFetcher::new()),
        }
    }

    /// Creates a client with a customized HTTP fetcher.
    ///
    /// # Examples
    ///
    /// ```
    /// use nldas2::{FetchConfig, Nldas};
    ///
    /// let client = Nldas::with_config(FetchConfig {
    ///     max_workers: 2,
    ///     ..FetchConfig::default()
    /// });
    /// ```
    pub fn with_config(config: FetchConfig) -> Self {
        Self {
            fetcher: Arc::new(HttpFetcher::with_config(config)),
        }
    }

    /// Creates a client on top of a caller-supplied fetcher.
    ///
    /// The whole network surface of the crate goes through the
    /// [`ForcingFetcher`] trait, so injecting a stub here makes every
    /// query path testable offline.
    pub fn with_fetcher(fetcher: Arc<dyn ForcingFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches hourly forcing data for a list of (lon, lat) coordinates.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.coords(Vec<LonLat>)`: **Required.** The points to fetch, inside
    ///   the grid's domain (lon -125..-67, lat 25..53).
    /// * `.start_date(..)` / `.end_date(..)`: **Required.** Calendar dates
    ///   as `chrono::NaiveDate` or `"YYYY-MM-DD"` strings. Both days are
    ///   included in the result.
    /// * `.variables(Vec<String>)`: Optional. Short variable names to
    ///   fetch; defaults to the whole catalog.
    /// * `.as_grid(bool)`: Optional. When `true`, the fragments are
    ///   assembled into a [`ForcingDataset`] with one grid cell per
    ///   distinct coordinate instead of a table. Defaults to `false`.
    ///
    /// # Returns
    ///
    /// A [`ForcingOutput`]: a polars `DataFrame` with columns `lon`,
    /// `lat`, `time` and one `f64` column per selected variable (rows
    /// ordered by input location, then time), or the gridded equivalent
    /// when `as_grid` is set. The time axis covers
    /// `[start_date 00:00, end_date 23:00]` hourly.
    ///
    /// # Errors
    ///
    /// All input validation runs before any network activity:
    /// * [`NldasError::InvalidInput`] for an empty coordinate list or an
    ///   unparsable date.
    /// * [`NldasError::CoordsOutOfRange`] for a point outside the domain.
    /// * [`NldasError::UnknownVariable`] for a name outside the catalog.
    /// * [`NldasError::DateOutOfRange`] for a window outside
    ///   1979-01-01..yesterday.
    ///
    /// After dispatch, [`NldasError::Service`] carries an error message
    /// embedded in a service response verbatim, and
    /// [`NldasError::ForcingData`] wraps transport failures.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use nldas2::{LonLat, Nldas, NldasError};
    /// #
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), NldasError> {
    /// let client = Nldas::new();
    ///
    /// let output = client
    ///     .get_by_coords()
    ///     .coords(vec![LonLat(-100.0, 40.0)])
    ///     .start_date("2022-01-01")
    ///     .end_date("2022-01-31")
    ///     .variables(vec!["temp".to_string(), "prcp".to_string()])
    ///     .call()
    ///     .await?;
    ///
    /// if let Some(table) = output.into_table() {
    ///     println!("{}", table.head(Some(5)));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn get_by_coords(
        &self,
        coords: Vec<LonLat>,
        start_date: impl IntoDateInput,
        end_date: impl IntoDateInput,
        variables: Option<Vec<String>>,
        as_grid: Option<bool>,
    ) -> Result<ForcingOutput, NldasError> {
        validate_coords(&coords)?;
        let variables = ForcingVariable::resolve(variables.as_deref())?;
        let (start, end) = requested_window(start_date, end_date)?;

        let fragments = self.fetch_fragments(&coords, &variables, start, end).await?;
        if as_grid.unwrap_or(false) {
            Ok(ForcingOutput::Grid(assemble_grid(
                fragments, &variables, start, end, CELL_SIZE_DEG,
            )))
        } else {
            Ok(ForcingOutput::Table(assemble_table(
                &coords, fragments, &variables, start, end,
            )?))
        }
    }

    /// Fetches hourly forcing data for every grid cell touching a
    /// geometry, at the grid's native 0.125-degree resolution.
    ///
    /// The domain grid is downloaded once per call (see
    /// [`Nldas::grid_mask`]), clipped to the geometry's bounding
    /// envelope, and one series is fetched per selected cell and
    /// variable.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.geometry(Geometry)`: **Required.** A bounding box or a polygon
    ///   exterior ring; cell selection works on its envelope.
    /// * `.start_date(..)` / `.end_date(..)`: **Required.** Calendar dates
    ///   as `chrono::NaiveDate` or `"YYYY-MM-DD"` strings.
    /// * `.crs(String)`: Optional. CRS of the input geometry. Only the
    ///   grid's native `EPSG:4326` is accepted; other values are
    ///   rejected rather than reprojected. Defaults to `EPSG:4326`.
    /// * `.variables(Vec<String>)`: Optional. Short variable names;
    ///   defaults to the whole catalog.
    ///
    /// # Returns
    ///
    /// A [`ForcingDataset`]: ascending `y`/`x` axes, hourly UTC time axis
    /// covering `[start_date 00:00, end_date 23:00]`, one `(time, y, x)`
    /// cube per variable with `{long_name, units}` attached, plus the
    /// grid's CRS and affine transform.
    ///
    /// # Errors
    ///
    /// * [`NldasError::InvalidInput`] for a degenerate geometry, an
    ///   unparsable date, or an envelope that misses the grid entirely.
    /// * [`NldasError::UnsupportedCrs`] for a CRS other than EPSG:4326.
    /// * [`NldasError::UnknownVariable`] / [`NldasError::DateOutOfRange`]
    ///   as for [`Nldas::get_by_coords`].
    /// * [`NldasError::GridMask`] if the mask asset cannot be decoded.
    /// * [`NldasError::Service`] / [`NldasError::ForcingData`] for
    ///   service and transport failures.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use nldas2::{BoundingBox, Geometry, Nldas, NldasError};
    /// #
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), NldasError> {
    /// let client = Nldas::new();
    ///
    /// let dataset = client
    ///     .get_by_geometry()
    ///     .geometry(Geometry::BoundingBox(BoundingBox {
    ///         west: -100.0,
    ///         south: 39.0,
    ///         east: -99.5,
    ///         north: 39.4,
    ///     }))
    ///     .start_date("2022-01-01")
    ///     .end_date("2022-01-02")
    ///     .variables(vec!["prcp".to_string()])
    ///     .call()
    ///     .await?;
    ///
    /// let (times, rows, cols) = dataset.shape();
    /// println!("{times} stamps over a {rows} x {cols} grid");
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn get_by_geometry(
        &self,
        geometry: Geometry,
        start_date: impl IntoDateInput,
        end_date: impl IntoDateInput,
        crs: Option<String>,
        variables: Option<Vec<String>>,
    ) -> Result<ForcingDataset, NldasError> {
        let envelope = geometry.envelope()?;
        if let Some(crs) = crs.as_deref() {
            check_crs(crs)?;
        }
        let variables = ForcingVariable::resolve(variables.as_deref())?;
        let (start, end) = requested_window(start_date, end_date)?;

        let mask = self.grid_mask().await?;
        let cells = mask.clip_cells(envelope);
        if cells.is_empty() {
            return Err(NldasError::InvalidInput {
                param: "geometry",
                expected: "an area overlapping the NLDAS-2 grid".to_string(),
            });
        }

        let fragments = self.fetch_fragments(&cells, &variables, start, end).await?;
        Ok(assemble_grid(fragments, &variables, start, end, CELL_SIZE_DEG))
    }

    /// Downloads and decodes the NLDAS-2 domain grid.
    ///
    /// The returned [`GridMask`] holds the lon/lat cell-center axes and
    /// the CONUS land mask. [`Nldas::get_by_geometry`] calls this
    /// internally to enumerate candidate cells.
    ///
    /// # Errors
    ///
    /// [`NldasError::ForcingData`] if the download fails,
    /// [`NldasError::GridMask`] if the asset cannot be decoded.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use nldas2::{Nldas, NldasError};
    /// # async fn run() -> Result<(), NldasError> {
    /// let client = Nldas::new();
    /// let mask = client.grid_mask().await?;
    /// let (rows, cols) = mask.shape();
    /// println!("grid is {rows} x {cols}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn grid_mask(&self) -> Result<GridMask, NldasError> {
        info!("Downloading the NLDAS-2 grid mask");
        let bytes = self.fetcher.retrieve_binary(MASK_URL).await?;
        Ok(decode_mask(bytes).await?)
    }

    /// Builds, dispatches, and parses the whole request batch for one
    /// query.
    async fn fetch_fragments(
        &self,
        locations: &[LonLat],
        variables: &[ForcingVariable],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Fragment>, NldasError> {
        let chunks = partition_window(start, end, MAX_CHUNK_DAYS);
        let requests = build_requests(locations, &chunks, variables);
        info!(
            "Dispatching {} requests ({} locations, {} chunks, {} variables)",
            requests.len(),
            locations.len(),
            chunks.len(),
            variables.len()
        );

        let bodies = self.fetcher.retrieve_text(&requests).await?;
        if bodies.len() != requests.len() {
            return Err(ForcingDataError::ResponseCountMismatch {
                expected: requests.len(),
                got: bodies.len(),
            }
            .into());
        }

        requests
            .iter()
            .zip(&bodies)
            .map(|(request, body)| parse_fragment(body, request))
            .collect()
    }
}

impl Default for Nldas {
    fn default() -> Self {
        Self::new()
    }
}

fn requested_window(
    start_date: impl IntoDateInput,
    end_date: impl IntoDateInput,
) -> Result<(NaiveDateTime, NaiveDateTime), NldasError> {
    let start = date_argument(start_date, "start_date")?;
    let end = date_argument(end_date, "end_date")?;
    resolve_window(start, end, Utc::now().naive_utc())
}

fn date_argument(value: impl IntoDateInput, param: &'static str) -> Result<NaiveDate, NldasError> {
    value.into_date().ok_or_else(|| NldasError::InvalidInput {
        param,
        expected: "a calendar date (YYYY-MM-DD or chrono::NaiveDate)".to_string(),
    })
}

// --- Tests ---
