//! The NLDAS-2 domain grid: a NetCDF mask asset downloaded from a fixed
//! URL, decoded into lon/lat axes plus the CONUS land mask, and clipped
//! to a query geometry's envelope to enumerate candidate cells.

use crate::grid::error::GridMaskError;
use crate::types::coords::{BoundingBox, LonLat};
use log::info;
use ndarray::Array2;
use std::io::Write;
use tempfile::NamedTempFile;

/// Fixed location of the mask asset.
pub(crate) const MASK_URL: &str =
    "https://ldas.gsfc.nasa.gov/sites/default/files/ldas/nldas/NLDAS_masks-veg-soil.nc4";

/// Grid cell size in degrees, both axes.
pub(crate) const CELL_SIZE_DEG: f64 = 0.125;

/// The decoded domain grid.
///
/// `conus` is indexed `[lat, lon]` and holds 1 inside the CONUS domain
/// and 0 outside; the axes hold the cell-center coordinates of the
/// 0.125-degree grid.
#[derive(Debug, Clone)]
pub struct GridMask {
    /// Longitude cell centers, as stored in the asset.
    pub lon: Vec<f64>,
    /// Latitude cell centers, as stored in the asset.
    pub lat: Vec<f64>,
    /// The CONUS land/domain mask, indexed `[lat, lon]`.
    pub conus: Array2<f64>,
}

impl GridMask {
    /// Decodes the downloaded asset.
    ///
    /// The NetCDF C library reads by path, so the bytes are staged in a
    /// temporary file first.
    pub fn decode(bytes: &[u8]) -> Result<GridMask, GridMaskError> {
        let mut staged = NamedTempFile::new()?;
        staged.write_all(bytes)?;
        staged.flush()?;

        let file = netcdf::open(staged.path()).map_err(GridMaskError::Decode)?;
        let lon = read_axis(&file, "lon")?;
        let lat = read_axis(&file, "lat")?;

        let mask_var = file
            .variable("CONUS_mask")
            .ok_or_else(|| GridMaskError::MissingVariable("CONUS_mask".to_string()))?;
        let values: Vec<f64> = mask_var.get_values(..).map_err(GridMaskError::Decode)?;
        let expected = lat.len() * lon.len();
        if values.len() != expected {
            return Err(GridMaskError::ShapeMismatch {
                variable: "CONUS_mask".to_string(),
                expected,
                got: values.len(),
            });
        }
        let conus = Array2::from_shape_vec((lat.len(), lon.len()), values).map_err(|_| {
            GridMaskError::ShapeMismatch {
                variable: "CONUS_mask".to_string(),
                expected,
                got: 0,
            }
        })?;

        info!(
            "Decoded grid mask: {} x {} cells",
            conus.nrows(),
            conus.ncols()
        );
        Ok(GridMask { lon, lat, conus })
    }

    /// `(lat, lon)` lengths of the grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    /// Candidate cells for a region query: every cell whose extent
    /// touches `envelope`, longitude-outermost.
    pub(crate) fn clip_cells(&self, envelope: BoundingBox) -> Vec<LonLat> {
        let half = CELL_SIZE_DEG / 2.0;
        let lons: Vec<f64> = self
            .lon
            .iter()
            .copied()
            .filter(|c| c + half >= envelope.west && c - half <= envelope.east)
            .collect();
        let lats: Vec<f64> = self
            .lat
            .iter()
            .copied()
            .filter(|c| c + half >= envelope.south && c - half <= envelope.north)
            .collect();

        let mut cells = Vec::with_capacity(lons.len() * lats.len());
        for lon in &lons {
            for lat in &lats {
                cells.push(LonLat(*lon, *lat));
            }
        }
        cells
    }
}

/// Decodes the asset off the async runtime; the NetCDF read is blocking
/// C I/O.
pub(crate) async fn decode_mask(bytes: Vec<u8>) -> Result<GridMask, GridMaskError> {
    tokio::task::spawn_blocking(move || GridMask::decode(&bytes)).await?
}

fn read_axis(file: &netcdf::File, name: &str) -> Result<Vec<f64>, GridMaskError> {
    let var = file
        .variable(name)
        .ok_or_else(|| GridMaskError::MissingVariable(name.to_string()))?;
    var.get_values(..).map_err(GridMaskError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn write_test_asset(
        path: &std::path::Path,
        lats: &[f64],
        lons: &[f64],
        mask: &[f64],
    ) -> Result<(), netcdf::Error> {
        let mut file = netcdf::create(path)?;
        file.add_dimension("lat", lats.len())?;
        file.add_dimension("lon", lons.len())?;
        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put_values(lats, ..)?;
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put_values(lons, ..)?;
        let mut mask_var = file.add_variable::<f64>("CONUS_mask", &["lat", "lon"])?;
        mask_var.put_values(mask, ..)?;
        Ok(())
    }

    #[test]
    fn decodes_axes_and_mask() -> Result<(), Box<dyn std::error::Error>> {
        let staged = NamedTempFile::new()?;
        let lats = [39.0625, 39.1875];
        let lons = [-100.0625, -99.9375, -99.8125];
        let mask = [1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        write_test_asset(staged.path(), &lats, &lons, &mask)?;

        let bytes = std::fs::read(staged.path())?;
        let grid = GridMask::decode(&bytes)?;

        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.lat, lats);
        assert_eq!(grid.lon, lons);
        assert_eq!(grid.conus[[0, 0]], 1.0);
        assert_eq!(grid.conus[[1, 2]], 0.0);
        Ok(())
    }

    #[test]
    fn missing_mask_variable_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let staged = NamedTempFile::new()?;
        {
            let mut file = netcdf::create(staged.path())?;
            file.add_dimension("lat", 1)?;
            let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
            lat_var.put_values(&[40.0], ..)?;
            let mut lon_var = file.add_variable::<f64>("lon", &["lat"])?;
            lon_var.put_values(&[-100.0], ..)?;
        }
        let bytes = std::fs::read(staged.path())?;
        let err = GridMask::decode(&bytes).unwrap_err();
        assert!(matches!(err, GridMaskError::MissingVariable(name) if name == "CONUS_mask"));
        Ok(())
    }

    #[test]
    fn clip_selects_all_touched_cells() {
        let grid = GridMask {
            lon: vec![-100.0625, -99.9375, -99.8125],
            lat: vec![39.0625, 39.1875, 39.3125],
            conus: Array2::zeros((3, 3)),
        };
        // Covers the middle column, clips a sliver off the east column's
        // extent ([-99.875, -99.75]), and stops short of the west column
        // and the top row.
        let envelope = BoundingBox {
            west: -99.99,
            south: 39.05,
            east: -99.87,
            north: 39.20,
        };
        let cells = grid.clip_cells(envelope);
        assert_eq!(
            cells,
            vec![
                LonLat(-99.9375, 39.0625),
                LonLat(-99.9375, 39.1875),
                LonLat(-99.8125, 39.0625),
                LonLat(-99.8125, 39.1875),
            ]
        );

        // An east edge short of the east column's extent drops the whole
        // column; selection is by interval overlap, not center containment.
        let narrower = BoundingBox {
            east: -99.90,
            ..envelope
        };
        assert_eq!(
            grid.clip_cells(narrower),
            vec![LonLat(-99.9375, 39.0625), LonLat(-99.9375, 39.1875)]
        );
    }

    #[test]
    fn clip_outside_the_grid_is_empty() {
        let grid = GridMask {
            lon: vec![-100.0625],
            lat: vec![39.0625],
            conus: Array2::zeros((1, 1)),
        };
        let envelope = BoundingBox {
            west: -90.0,
            south: 30.0,
            east: -89.0,
            north: 31.0,
        };
        assert!(grid.clip_cells(envelope).is_empty());
    }
}
