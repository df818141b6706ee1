#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Hazard type taxonomy and coordinate bounds.
//!
//! Defines the fixed set of hazard categories a driver can report and the
//! WGS84 coordinate ranges every persisted hazard must fall within. These
//! types are shared by the validator, the store, and the API layer.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Valid latitude range in decimal degrees.
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in decimal degrees.
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Attribution stored when a report does not name its reporter.
pub const ANONYMOUS_REPORTER: &str = "anonymous";

/// Maximum length of the `reported_by` attribution, in characters.
pub const MAX_REPORTER_LENGTH: usize = 100;

/// Category of a reported hazard.
///
/// The string forms (`"Road Closure"`, `"Police"`, ...) are the wire and
/// storage representation and must match exactly; parsing is
/// case-sensitive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum HazardType {
    /// Road fully or partially closed
    #[serde(rename = "Road Closure")]
    #[strum(serialize = "Road Closure")]
    RoadClosure,
    /// Police presence or checkpoint
    Police,
    /// Traffic accident
    Accident,
    /// Objects on the roadway
    Debris,
    /// Weather-related hazard (ice, flooding, fog)
    Weather,
    /// Anything not covered above
    Other,
}

impl HazardType {
    /// Returns all variants of this enum, in their canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::RoadClosure,
            Self::Police,
            Self::Accident,
            Self::Debris,
            Self::Weather,
            Self::Other,
        ]
    }

    /// Returns the string forms of every variant, suitable for telling a
    /// caller which values are accepted.
    #[must_use]
    pub fn valid_names() -> Vec<&'static str> {
        Self::all().iter().map(|t| t.as_str()).collect()
    }

    /// Returns the wire/storage string for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoadClosure => "Road Closure",
            Self::Police => "Police",
            Self::Accident => "Accident",
            Self::Debris => "Debris",
            Self::Weather => "Weather",
            Self::Other => "Other",
        }
    }
}

/// A coordinate as supplied by a client: either a JSON number or a numeric
/// string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateInput {
    /// A JSON number.
    Number(f64),
    /// A string expected to hold a decimal number.
    Text(String),
}

impl CoordinateInput {
    /// Returns `true` if the value carries nothing (a blank string).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    /// Returns the numeric value, or `None` if a string does not parse.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// An unvalidated hazard report as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateReport {
    /// Requested hazard type name.
    #[serde(rename = "type", default)]
    pub hazard_type: Option<String>,
    /// Latitude in decimal degrees.
    #[serde(default)]
    pub latitude: Option<CoordinateInput>,
    /// Longitude in decimal degrees.
    #[serde(default)]
    pub longitude: Option<CoordinateInput>,
    /// Optional attribution.
    #[serde(default)]
    pub reported_by: Option<String>,
}

/// Returns `true` if `latitude` is a finite value within [`LATITUDE_RANGE`].
#[must_use]
pub fn is_valid_latitude(latitude: f64) -> bool {
    LATITUDE_RANGE.contains(&latitude)
}

/// Returns `true` if `longitude` is a finite value within
/// [`LONGITUDE_RANGE`].
#[must_use]
pub fn is_valid_longitude(longitude: f64) -> bool {
    LONGITUDE_RANGE.contains(&longitude)
}
