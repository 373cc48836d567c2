use chrono::NaiveDate;

/// Conversion of the accepted date-input forms into a calendar date.
///
/// Query builders take `impl IntoDateInput`, so both `NaiveDate` values
/// and `"YYYY-MM-DD"` strings work. `None` means the input could not be
/// interpreted; the caller turns that into an input error naming the
/// offending parameter.
pub trait IntoDateInput {
    fn into_date(self) -> Option<NaiveDate>;
}

impl IntoDateInput for NaiveDate {
    fn into_date(self) -> Option<NaiveDate> {
        Some(self)
    }
}

impl IntoDateInput for &str {
    fn into_date(self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.trim(), "%Y-%m-%d").ok()
    }
}

impl IntoDateInput for String {
    fn into_date(self) -> Option<NaiveDate> {
        self.as_str().into_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            "2022-01-15".into_date(),
            NaiveDate::from_ymd_opt(2022, 1, 15)
        );
        assert_eq!(" 2022-01-15 ".into_date(), NaiveDate::from_ymd_opt(2022, 1, 15));
        assert_eq!("01/15/2022".into_date(), None);
        assert_eq!("not a date".into_date(), None);
    }

    #[test]
    fn passes_dates_through() {
        let date = NaiveDate::from_ymd_opt(2001, 6, 30).unwrap();
        assert_eq!(date.into_date(), Some(date));
    }
}
