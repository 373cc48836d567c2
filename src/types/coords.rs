//! Coordinate and geometry inputs for point and region queries, plus the
//! bounds checks that run before any request is issued.

use crate::error::NldasError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographical coordinate as (longitude, latitude), in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat(pub f64, pub f64);

impl LonLat {
    pub fn lon(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.0, self.1)
    }
}

/// An axis-aligned geographic bounding box, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// The NLDAS-2 grid's domain. Coordinates outside this box are rejected.
pub const CONUS_BOUNDS: BoundingBox = BoundingBox {
    west: -125.0,
    south: 25.0,
    east: -67.0,
    north: 53.0,
};

impl BoundingBox {
    pub fn contains(&self, point: LonLat) -> bool {
        point.lon() >= self.west
            && point.lon() <= self.east
            && point.lat() >= self.south
            && point.lat() <= self.north
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:?}, {:?}, {:?}, {:?})",
            self.west, self.south, self.east, self.north
        )
    }
}

/// The region of interest for a geometry query.
///
/// Cell selection works on the geometry's bounding envelope: every grid
/// cell whose extent touches the envelope is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// An axis-aligned box.
    BoundingBox(BoundingBox),
    /// The exterior ring of a polygon, as (lon, lat) vertices.
    Polygon(Vec<LonLat>),
}

impl Geometry {
    /// The geometry's bounding envelope.
    ///
    /// Fails with [`NldasError::InvalidInput`] for a degenerate input
    /// (inverted box, or a ring with fewer than 3 vertices).
    pub fn envelope(&self) -> Result<BoundingBox, NldasError> {
        match self {
            Geometry::BoundingBox(bbox) => {
                if bbox.west > bbox.east || bbox.south > bbox.north {
                    return Err(NldasError::InvalidInput {
                        param: "geometry",
                        expected: "a bounding box with west <= east and south <= north"
                            .to_string(),
                    });
                }
                Ok(*bbox)
            }
            Geometry::Polygon(ring) => {
                if ring.len() < 3 {
                    return Err(NldasError::InvalidInput {
                        param: "geometry",
                        expected: "a polygon ring with at least 3 vertices".to_string(),
                    });
                }
                let mut bbox = BoundingBox {
                    west: f64::INFINITY,
                    south: f64::INFINITY,
                    east: f64::NEG_INFINITY,
                    north: f64::NEG_INFINITY,
                };
                for p in ring {
                    bbox.west = bbox.west.min(p.lon());
                    bbox.east = bbox.east.max(p.lon());
                    bbox.south = bbox.south.min(p.lat());
                    bbox.north = bbox.north.max(p.lat());
                }
                Ok(bbox)
            }
        }
    }
}

/// Checks a point-query coordinate list: non-empty and inside the domain.
pub(crate) fn validate_coords(coords: &[LonLat]) -> Result<(), NldasError> {
    if coords.is_empty() {
        return Err(NldasError::InvalidInput {
            param: "coords",
            expected: "a non-empty list of (lon, lat) pairs".to_string(),
        });
    }
    if coords.iter().any(|c| !CONUS_BOUNDS.contains(*c)) {
        return Err(NldasError::CoordsOutOfRange {
            bounds: CONUS_BOUNDS.to_string(),
        });
    }
    Ok(())
}

/// Accepts the grid's native CRS in its common spellings, rejects the rest.
pub(crate) fn check_crs(crs: &str) -> Result<(), NldasError> {
    let normalized = crs.trim().to_ascii_lowercase();
    if normalized == "epsg:4326" || normalized == "4326" {
        Ok(())
    } else {
        Err(NldasError::UnsupportedCrs {
            given: crs.to_string(),
        })
    }
}
