//! Parses one raw service response into a named time series fragment.

use crate::error::NldasError;
use crate::forcing::request::ServiceRequest;
use crate::types::coords::LonLat;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Fixed metadata block the service prints before the data table.
pub(crate) const HEADER_LINES: usize = 39;

/// A named, time-indexed series of values parsed from one response.
///
/// Named after the bare service identifier of the variable it answers,
/// and tagged with the request's grid point so the region path can place
/// it spatially. May be zero-length, which is not an error: the service
/// returns empty bodies for chunks with no data.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Bare service identifier, e.g. `TMP2m`.
    pub name: String,
    /// The grid point the series belongs to.
    pub location: LonLat,
    /// Hourly timestamps (UTC), in response order.
    pub times: Vec<NaiveDateTime>,
    /// One value per timestamp.
    pub values: Vec<f64>,
}

impl Fragment {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Parses a raw text body into the fragment answering `request`.
///
/// Empty bodies and bodies with no parsable rows produce an empty, named
/// fragment. A body carrying a `<strong>`-delimited service message fails
/// with [`NldasError::Service`] holding the extracted text verbatim.
pub(crate) fn parse_fragment(body: &str, request: &ServiceRequest) -> Result<Fragment, NldasError> {
    let name = request.service_identifier().to_string();
    let location = request.location;

    if body.trim().is_empty() {
        return Ok(Fragment {
            name,
            location,
            times: Vec::new(),
            values: Vec::new(),
        });
    }
    if let Some(message) = embedded_error(body) {
        return Err(NldasError::Service(message));
    }

    let mut times = Vec::new();
    let mut values = Vec::new();
    // The line after the metadata block is the column header row; it has
    // fewer than 3 fields and falls through the same row filter.
    for line in body.lines().skip(HEADER_LINES) {
        let mut fields = line.split_whitespace();
        let (Some(date), Some(tod), Some(value)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let Some(timestamp) = combine_timestamp(date, tod) else {
            continue;
        };
        let Ok(value) = value.parse::<f64>() else {
            continue;
        };
        times.push(timestamp);
        values.push(value);
    }

    Ok(Fragment {
        name,
        location,
        times,
        values,
    })
}

/// Combines the date column and the `HHZ` time-of-day column into one
/// timestamp. The `Z` suffix marks UTC; timestamps are stored naive and
/// documented as UTC.
fn combine_timestamp(date: &str, tod: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let hour: u32 = tod.strip_suffix(['Z', 'z'])?.parse().ok()?;
    let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    Some(date.and_time(time))
}

/// Extracts the service's embedded error message: every
/// `<strong>...</strong>` span (spans may contain newlines), concatenated
/// and trimmed. `None` when the body carries no such message.
fn embedded_error(body: &str) -> Option<String> {
    const OPEN: &str = "<strong>";
    const CLOSE: &str = "</strong>";

    let mut message = String::new();
    let mut rest = body;
    while let Some(open_idx) = rest.find(OPEN) {
        let after = &rest[open_idx + OPEN.len()..];
        let Some(close_idx) = after.find(CLOSE) else {
            break;
        };
        message.push_str(&after[..close_idx]);
        rest = &after[close_idx + CLOSE.len()..];
    }

    let message = message.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::catalog::ForcingVariable;
    use chrono::NaiveDate;

    fn request_for(variable: ForcingVariable) -> ServiceRequest {
        ServiceRequest {
            variable: variable.full_service_identifier(),
            location: LonLat(-100.0, 40.0),
            start: NaiveDate::from_ymd_opt(2022, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            end: NaiveDate::from_ymd_opt(2022, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn service_body(rows: &[(&str, &str, &str)]) -> String {
        let mut body = String::new();
        for i in 1..=HEADER_LINES {
            body.push_str(&format!("metadata line {i}\n"));
        }
        body.push_str("      Date&Time   Data\n");
        for (date, tod, value) in rows {
            body.push_str(&format!("{date} {tod}  {value}\n"));
        }
        body
    }

    #[test]
    fn parses_rows_into_hourly_timestamps() {
        let body = service_body(&[
            ("2022-01-01", "00Z", "271.55"),
            ("2022-01-01", "01Z", "271.22"),
            ("2022-01-01", "13Z", "275.81"),
        ]);
        let fragment = parse_fragment(&body, &request_for(ForcingVariable::Temp)).unwrap();

        assert_eq!(fragment.name, "TMP2m");
        assert_eq!(fragment.location, LonLat(-100.0, 40.0));
        assert_eq!(fragment.len(), 3);
        assert_eq!(
            fragment.times[0],
            NaiveDate::from_ymd_opt(2022, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(
            fragment.times[2],
            NaiveDate::from_ymd_opt(2022, 1, 1)
                .unwrap()
                .and_hms_opt(13, 0, 0)
                .unwrap()
        );
        assert_eq!(fragment.values, vec![271.55, 271.22, 275.81]);
    }

    #[test]
    fn empty_body_yields_named_empty_fragment() {
        let fragment = parse_fragment("", &request_for(ForcingVariable::Prcp)).unwrap();
        assert_eq!(fragment.name, "APCPsfc");
        assert!(fragment.is_empty());

        let fragment = parse_fragment("  \n \n", &request_for(ForcingVariable::Prcp)).unwrap();
        assert!(fragment.is_empty());
    }

    #[test]
    fn short_unparsable_body_yields_empty_fragment() {
        let fragment =
            parse_fragment("<html><body>nothing here</body></html>", &request_for(ForcingVariable::Pet))
                .unwrap();
        assert_eq!(fragment.name, "PEVAPsfc");
        assert!(fragment.is_empty());
    }

    #[test]
    fn embedded_error_message_is_extracted_verbatim() {
        let body = "<html><p>Request failed:</p><strong>Invalid variable specified</strong></html>";
        let err = parse_fragment(body, &request_for(ForcingVariable::Temp)).unwrap_err();
        match err {
            NldasError::Service(message) => {
                assert_eq!(message, "Invalid variable specified");
            }
            other => panic!("expected Service, got {other:?}"),
        }
    }

    #[test]
    fn multiple_error_spans_concatenate_across_lines() {
        let body = "junk <strong>first part\nof message</strong> more junk <strong> and the rest </strong>";
        let err = parse_fragment(body, &request_for(ForcingVariable::Temp)).unwrap_err();
        match err {
            NldasError::Service(message) => {
                assert_eq!(message, "first part\nof message and the rest");
            }
            other => panic!("expected Service, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_rows_are_dropped() {
        let body = service_body(&[
            ("2022-01-01", "00Z", "1.5"),
            ("2022-01-01", "01Z", "missing"),
            ("not-a-date", "02Z", "2.5"),
            ("2022-01-01", "03Z", "3.5"),
        ]);
        let fragment = parse_fragment(&body, &request_for(ForcingVariable::Prcp)).unwrap();
        assert_eq!(fragment.values, vec![1.5, 3.5]);
    }
}
