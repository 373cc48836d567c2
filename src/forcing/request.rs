//! Service request descriptors and the Cartesian builder that produces
//! them, one per (location, chunk, variable).

use crate::types::catalog::ForcingVariable;
use crate::types::coords::LonLat;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Endpoint serving the hourly time series.
pub(crate) const SERVICE_URL: &str =
    "https://hydro1.gesdisc.eosdis.nasa.gov/daac-bin/access/timeseries.cgi";

/// Timestamp format the service expects for `startDate`/`endDate`.
const WIRE_DATE_FMT: &str = "%Y-%m-%dT%H";

/// One service call: a variable at a location over one date chunk.
///
/// Consumed once by the fetcher; the response at the same position
/// answers it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRequest {
    /// Fully qualified variable identifier, e.g.
    /// `NLDAS:NLDAS_FORA0125_H.002:TMP2m`.
    pub variable: String,
    /// The grid point the series is requested for.
    pub location: LonLat,
    /// Chunk start (inclusive on the wire).
    pub start: NaiveDateTime,
    /// Chunk end.
    pub end: NaiveDateTime,
}

impl ServiceRequest {
    /// The bare identifier naming the response fragment, i.e. the part of
    /// [`ServiceRequest::variable`] after the last `:`.
    pub fn service_identifier(&self) -> &str {
        self.variable.rsplit(':').next().unwrap_or(&self.variable)
    }

    /// Query parameters for the service call.
    pub(crate) fn query_params(&self) -> [(&'static str, String); 5] {
        [
            ("type", "asc2".to_string()),
            (
                "location",
                format!("GEOM:POINT({:?}, {:?})", self.location.lon(), self.location.lat()),
            ),
            ("variable", self.variable.clone()),
            ("startDate", self.start.format(WIRE_DATE_FMT).to_string()),
            ("endDate", self.end.format(WIRE_DATE_FMT).to_string()),
        ]
    }
}

/// Builds the full request list: locations outermost, then chunks, then
/// variables. The fetcher returns bodies in this order and the
/// reassembler demultiplexes them positionally.
pub(crate) fn build_requests(
    locations: &[LonLat],
    chunks: &[(NaiveDateTime, NaiveDateTime)],
    variables: &[ForcingVariable],
) -> Vec<ServiceRequest> {
    let mut requests = Vec::with_capacity(locations.len() * chunks.len() * variables.len());
    for location in locations {
        for (start, end) in chunks {
            for variable in variables {
                requests.push(ServiceRequest {
                    variable: variable.full_service_identifier(),
                    location: *location,
                    start: *start,
                    end: *end,
                });
            }
        }
    }
    requests
}
