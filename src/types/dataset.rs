//! The gridded output container for region queries (and for point queries
//! assembled as a grid): one `(time, y, x)` cube per variable plus the
//! coordinate metadata needed to interpret it.

use chrono::NaiveDateTime;
use ndarray::Array3;

/// One forcing variable on the output grid, laid out `(time, y, x)`.
#[derive(Debug, Clone)]
pub struct GridVariable {
    /// Short catalog name, e.g. `temp`.
    pub name: &'static str,
    /// Human-readable description.
    pub long_name: &'static str,
    /// Physical units.
    pub units: &'static str,
    /// Values indexed `[time, y, x]`; `NaN` where the service returned
    /// nothing for a cell.
    pub values: Array3<f64>,
}

/// A time-indexed grid of forcing variables.
///
/// Axes are ordered `(time, y, x)`: `y` holds latitudes and `x` holds
/// longitudes, both ascending. Timestamps are timezone-naive and represent
/// UTC, as recorded in [`ForcingDataset::tz`].
#[derive(Debug, Clone)]
pub struct ForcingDataset {
    /// Hourly timestamps (UTC), ascending.
    pub time: Vec<NaiveDateTime>,
    /// Latitude axis, ascending.
    pub y: Vec<f64>,
    /// Longitude axis, ascending.
    pub x: Vec<f64>,
    /// One cube per selected variable, in selection order.
    pub variables: Vec<GridVariable>,
    /// Coordinate reference system of the spatial axes.
    pub crs: String,
    /// Affine transform `[a, b, c, d, e, f]` mapping (column, row) to
    /// (x, y): `x = a * col + b * row + c`, `y = d * col + e * row + f`,
    /// anchored at the grid's outer cell edges with rows as stored
    /// (ascending latitude, so `e` is positive).
    pub transform: [f64; 6],
    /// Timezone the timestamps represent.
    pub tz: String,
}

impl ForcingDataset {
    /// `(time, y, x)` lengths of the dataset's axes.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.time.len(), self.y.len(), self.x.len())
    }

    /// Looks a variable up by short name.
    pub fn variable(&self, name: &str) -> Option<&GridVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Names of the variables, in selection order.
    pub fn variable_names(&self) -> Vec<&'static str> {
        self.variables.iter().map(|v| v.name).collect()
    }

    /// Derives the affine transform from the stored axes.
    ///
    /// Cell size falls back to `fallback_res` on axes too short to carry
    /// a spacing (a single column or row).
    pub(crate) fn affine(x: &[f64], y: &[f64], fallback_res: f64) -> [f64; 6] {
        let xres = if x.len() > 1 { x[1] - x[0] } else { fallback_res };
        let yres = if y.len() > 1 { y[1] - y[0] } else { fallback_res };
        let west_edge = x.first().copied().unwrap_or(0.0) - xres / 2.0;
        let south_edge = y.first().copied().unwrap_or(0.0) - yres / 2.0;
        [xres, 0.0, west_edge, 0.0, yres, south_edge]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_anchors_cell_edges() {
        let x = vec![-100.0625, -99.9375, -99.8125];
        let y = vec![39.0625, 39.1875];
        let t = ForcingDataset::affine(&x, &y, 0.125);
        assert!((t[0] - 0.125).abs() < 1e-9, "x resolution");
        assert!((t[4] - 0.125).abs() < 1e-9, "y resolution");
        assert!((t[2] - (-100.125)).abs() < 1e-9, "west edge");
        assert!((t[5] - 39.0).abs() < 1e-9, "south edge");
    }

    #[test]
    fn affine_single_cell_uses_fallback() {
        let t = ForcingDataset::affine(&[-100.0], &[40.0], 0.125);
        assert!((t[0] - 0.125).abs() < 1e-9);
        assert!((t[2] - (-100.0625)).abs() < 1e-9);
    }
}
