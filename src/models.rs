use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Formats a liter quantity the way the persisted contract stores decimals:
/// shortest round-tripping representation, no forced precision.
pub(crate) fn fmt_decimal(value: f64) -> String {
    format!("{value}")
}

mod decimal_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::fmt_decimal(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|err| D::Error::custom(format!("invalid decimal '{raw}': {err}")))
    }
}

/// One row of the intake history, stored under the `entries` key as a JSON
/// array in insertion order. Entries have no identity beyond their position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LedgerEntry {
    /// Reset boundary, rendered as a day section header.
    /// Wire shape: `{"section": true, "date": "YYYY-MM-DD"}`.
    SectionMarker { section: bool, date: NaiveDate },

    /// A logged drink.
    /// Wire shape: `{"inputValue": "0.3", "dateValue": "...", "timeValue": "..."}`.
    Reading {
        #[serde(rename = "inputValue", with = "decimal_string")]
        amount_liters: f64,
        #[serde(rename = "dateValue")]
        date: NaiveDate,
        #[serde(rename = "timeValue")]
        time: NaiveTime,
    },
}

impl LedgerEntry {
    pub fn reading(amount_liters: f64, date: NaiveDate, time: NaiveTime) -> Self {
        Self::Reading {
            amount_liters,
            date,
            time,
        }
    }

    pub fn section_marker(date: NaiveDate) -> Self {
        Self::SectionMarker {
            section: true,
            date,
        }
    }

    pub fn is_section_marker(&self) -> bool {
        matches!(self, Self::SectionMarker { .. })
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Self::SectionMarker { date, .. } | Self::Reading { date, .. } => *date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// What the user entered on the profile screen. Each field persists under its
/// own key; the struct is only assembled in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileInputs {
    pub weight_kg: f64,
    pub activity_factor: f64,
    pub climate_factor: f64,
    pub gender: Gender,
}

/// Last computed need, stored under `waterIntake` as
/// `{"individual": "<2dp decimal string>"}` for the profile results view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterIntakeSummary {
    pub individual: String,
}
