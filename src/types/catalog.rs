//! Defines the fixed catalog of NLDAS-2 forcing variables that can be
//! requested from the service, along with their identifiers and units.

use crate::error::NldasError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix the service expects in front of every variable identifier.
pub(crate) const SERVICE_DATASET: &str = "NLDAS:NLDAS_FORA0125_H.002";

/// One of the eight hourly forcing variables published by NLDAS-2.
///
/// Each variant maps a short, user-facing name (the column name in the
/// returned data) to the identifier the service understands, plus a
/// human-readable label and physical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcingVariable {
    /// Precipitation hourly total (`APCPsfc`, mm).
    Prcp,
    /// Potential evaporation (`PEVAPsfc`, mm).
    Pet,
    /// 2-m above ground temperature (`TMP2m`, K).
    Temp,
    /// 10-m above ground zonal wind (`UGRD10m`, m/s).
    WindU,
    /// 10-m above ground meridional wind (`VGRD10m`, m/s).
    WindV,
    /// Surface downward longwave radiation flux (`DLWRFsfc`, W/m^2).
    Rlds,
    /// Surface downward shortwave radiation flux (`DSWRFsfc`, W/m^2).
    Rsds,
    /// 2-m above ground specific humidity (`SPFH2m`, kg/kg).
    Humidity,
}

impl ForcingVariable {
    /// Every catalog entry, in catalog order. This is the default selection.
    pub const ALL: [ForcingVariable; 8] = [
        ForcingVariable::Prcp,
        ForcingVariable::Pet,
        ForcingVariable::Temp,
        ForcingVariable::WindU,
        ForcingVariable::WindV,
        ForcingVariable::Rlds,
        ForcingVariable::Rsds,
        ForcingVariable::Humidity,
    ];

    /// The short name used for columns and variable selection.
    pub fn short_name(&self) -> &'static str {
        match self {
            ForcingVariable::Prcp => "prcp",
            ForcingVariable::Pet => "pet",
            ForcingVariable::Temp => "temp",
            ForcingVariable::WindU => "wind_u",
            ForcingVariable::WindV => "wind_v",
            ForcingVariable::Rlds => "rlds",
            ForcingVariable::Rsds => "rsds",
            ForcingVariable::Humidity => "humidity",
        }
    }

    /// The bare identifier the service uses to name this variable.
    pub fn service_identifier(&self) -> &'static str {
        match self {
            ForcingVariable::Prcp => "APCPsfc",
            ForcingVariable::Pet => "PEVAPsfc",
            ForcingVariable::Temp => "TMP2m",
            ForcingVariable::WindU => "UGRD10m",
            ForcingVariable::WindV => "VGRD10m",
            ForcingVariable::Rlds => "DLWRFsfc",
            ForcingVariable::Rsds => "DSWRFsfc",
            ForcingVariable::Humidity => "SPFH2m",
        }
    }

    /// Human-readable description of the variable.
    pub fn long_name(&self) -> &'static str {
        match self {
            ForcingVariable::Prcp => "Precipitation hourly total",
            ForcingVariable::Pet => "Potential evaporation",
            ForcingVariable::Temp => "2-m above ground temperature",
            ForcingVariable::WindU => "10-m above ground zonal wind",
            ForcingVariable::WindV => "10-m above ground meridional wind",
            ForcingVariable::Rlds => "Surface DW longwave radiation flux",
            ForcingVariable::Rsds => "Surface DW shortwave radiation flux",
            ForcingVariable::Humidity => "2-m above ground specific humidity",
        }
    }

    /// Physical units of the variable's values.
    pub fn units(&self) -> &'static str {
        match self {
            ForcingVariable::Prcp => "mm",
            ForcingVariable::Pet => "mm",
            ForcingVariable::Temp => "K",
            ForcingVariable::WindU => "m/s",
            ForcingVariable::WindV => "m/s",
            ForcingVariable::Rlds => "W/m^2",
            ForcingVariable::Rsds => "W/m^2",
            ForcingVariable::Humidity => "kg/kg",
        }
    }

    /// The fully qualified identifier sent to the service,
    /// e.g. `NLDAS:NLDAS_FORA0125_H.002:TMP2m`.
    pub(crate) fn full_service_identifier(&self) -> String {
        format!("{}:{}", SERVICE_DATASET, self.service_identifier())
    }

    /// Looks a variable up by its short name.
    pub fn from_short_name(name: &str) -> Option<ForcingVariable> {
        ForcingVariable::ALL
            .iter()
            .copied()
            .find(|v| v.short_name() == name)
    }

    /// Looks a variable up by its bare service identifier.
    pub fn from_service_identifier(id: &str) -> Option<ForcingVariable> {
        ForcingVariable::ALL
            .iter()
            .copied()
            .find(|v| v.service_identifier() == id)
    }

    /// Resolves a user selection of short names against the catalog.
    ///
    /// `None` selects every catalog entry in catalog order. Any name outside
    /// the catalog fails with [`NldasError::UnknownVariable`] naming the
    /// offending entry and the full valid set.
    pub fn resolve<S: AsRef<str>>(names: Option<&[S]>) -> Result<Vec<ForcingVariable>, NldasError> {
        match names {
            None => Ok(ForcingVariable::ALL.to_vec()),
            Some(names) => names
                .iter()
                .map(|name| {
                    ForcingVariable::from_short_name(name.as_ref()).ok_or_else(|| {
                        NldasError::UnknownVariable {
                            name: name.as_ref().to_string(),
                            valid: ForcingVariable::valid_names(),
                        }
                    })
                })
                .collect(),
        }
    }

    fn valid_names() -> String {
        ForcingVariable::ALL
            .iter()
            .map(|v| v.short_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Formats the variable as its short name.
///
/// # Examples
///
/// ```
/// use nldas2::ForcingVariable;
///
/// assert_eq!(format!("{}", ForcingVariable::Temp), "temp");
/// assert_eq!(ForcingVariable::WindU.to_string(), "wind_u");
/// ```
impl fmt::Display for ForcingVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_eight_unique_entries() {
        assert_eq!(ForcingVariable::ALL.len(), 8);
        let short: HashSet<_> = ForcingVariable::ALL.iter().map(|v| v.short_name()).collect();
        let ids: HashSet<_> = ForcingVariable::ALL
            .iter()
            .map(|v| v.service_identifier())
            .collect();
        assert_eq!(short.len(), 8, "short names must be unique");
        assert_eq!(ids.len(), 8, "service identifiers must be unique");
    }

    #[test]
    fn lookups_round_trip() {
        for v in ForcingVariable::ALL {
            assert_eq!(ForcingVariable::from_short_name(v.short_name()), Some(v));
            assert_eq!(
                ForcingVariable::from_service_identifier(v.service_identifier()),
                Some(v)
            );
        }
        assert_eq!(ForcingVariable::from_short_name("snow"), None);
    }

    #[test]
    fn full_identifier_carries_dataset_prefix() {
        assert_eq!(
            ForcingVariable::Temp.full_service_identifier(),
            "NLDAS:NLDAS_FORA0125_H.002:TMP2m"
        );
    }

    #[test]
    fn resolve_defaults_to_whole_catalog() {
        let all = ForcingVariable::resolve::<&str>(None).unwrap();
        assert_eq!(all, ForcingVariable::ALL.to_vec());
    }

    #[test]
    fn resolve_rejects_unknown_names() {
        let err = ForcingVariable::resolve(Some(&["temp", "snow"])).unwrap_err();
        match err {
            NldasError::UnknownVariable { name, valid } => {
                assert_eq!(name, "snow");
                assert!(valid.contains("prcp"));
                assert!(valid.contains("humidity"));
            }
            other => panic!("expected UnknownVariable, got {other:?}"),
        }
    }
}
