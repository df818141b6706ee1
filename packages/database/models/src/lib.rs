#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Hazard store row types and query parameter definitions.
//!
//! These types represent the shapes of data as stored in and retrieved from
//! the hazard store. They are distinct from the API response types in
//! `hazard_map_server_models`.

use chrono::{DateTime, TimeDelta, Utc};
use hazard_map_hazard_models::HazardType;
use serde::{Deserialize, Serialize};

/// A rectangular latitude/longitude range in WGS84 coordinates.
///
/// Both ranges are inclusive, matching SQL `BETWEEN` semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern latitude boundary.
    pub lat_min: f64,
    /// Northern latitude boundary.
    pub lat_max: f64,
    /// Western longitude boundary.
    pub lng_min: f64,
    /// Eastern longitude boundary.
    pub lng_max: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given ranges.
    #[must_use]
    pub const fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lng_min,
            lng_max,
        }
    }

    /// Returns `true` if the point lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&latitude)
            && (self.lng_min..=self.lng_max).contains(&longitude)
    }
}

/// A validated hazard ready to be inserted.
///
/// The store assigns `id` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHazard {
    /// Hazard category.
    pub hazard_type: HazardType,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Free-text attribution.
    pub reported_by: String,
}

/// A hazard row as retrieved from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardRow {
    /// Primary key.
    pub id: i64,
    /// Hazard category.
    pub hazard_type: HazardType,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// When the store accepted the report.
    pub timestamp: DateTime<Utc>,
    /// Free-text attribution.
    pub reported_by: String,
    /// Minutes since `timestamp` by the store clock. Only populated by
    /// listing queries.
    pub age_minutes: Option<f64>,
}

/// Decimal places coordinates are compared at (`NUMERIC(_, 8)` scale).
pub const COORDINATE_DECIMALS: i32 = 8;

/// Rounds a degree value to [`COORDINATE_DECIMALS`] places.
///
/// Differences of coordinates are rounded before comparing against a
/// tolerance so a move of exactly the tolerance is never seen as closer.
#[must_use]
pub fn round_degrees(degrees: f64) -> f64 {
    let scale = 10_f64.powi(COORDINATE_DECIMALS);
    (degrees * scale).round() / scale
}

/// Parameters for the duplicate-report lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateQuery {
    /// Only hazards of this type can collide.
    pub hazard_type: HazardType,
    /// Candidate latitude.
    pub latitude: f64,
    /// Candidate longitude.
    pub longitude: f64,
    /// How far back to look from the store's current time.
    pub window: TimeDelta,
    /// Per-axis tolerance in degrees; matches must differ by strictly less,
    /// after rounding the difference with [`round_degrees`].
    pub tolerance: f64,
}

impl DuplicateQuery {
    /// Returns `true` if `row` collides with this query, ignoring the time
    /// window.
    #[must_use]
    pub fn is_near(&self, row: &HazardRow) -> bool {
        row.hazard_type == self.hazard_type
            && round_degrees((row.latitude - self.latitude).abs()) < self.tolerance
            && round_degrees((row.longitude - self.longitude).abs()) < self.tolerance
    }
}

/// Active hazard count for a single type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    /// Hazard category.
    pub hazard_type: HazardType,
    /// Number of active hazards of this type.
    pub count: u64,
}

/// Aggregate counts over the active window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStats {
    /// Total active hazards.
    pub total: u64,
    /// Per-type counts, only types with at least one active hazard.
    pub by_type: Vec<TypeCount>,
}
