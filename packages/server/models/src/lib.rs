#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the hazard map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the store row types to allow independent evolution of the API
//! contract. Field names are `snake_case` on the wire, except
//! `validTypes` in the invalid-type error body.

use chrono::{DateTime, Utc};
use hazard_map_database_models::{ActiveStats, HazardRow, TypeCount};
use hazard_map_hazard_models::HazardType;
use serde::{Deserialize, Serialize};

pub use hazard_map_hazard_models::CandidateReport as ReportHazardRequest;

/// Human-readable service name reported by `GET /`.
pub const SERVICE_NAME: &str = "Hazard Map - Hazard Reporting API";

/// A hazard as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiHazard {
    /// Unique hazard ID.
    pub id: i64,
    /// Hazard category.
    #[serde(rename = "type")]
    pub hazard_type: HazardType,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// When the hazard was reported (ISO 8601).
    pub timestamp: DateTime<Utc>,
    /// Attribution.
    pub reported_by: String,
    /// Minutes since the report, on listing responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_minutes: Option<f64>,
}

impl From<HazardRow> for ApiHazard {
    fn from(row: HazardRow) -> Self {
        Self {
            id: row.id,
            hazard_type: row.hazard_type,
            latitude: row.latitude,
            longitude: row.longitude,
            timestamp: row.timestamp,
            reported_by: row.reported_by,
            age_minutes: row.age_minutes,
        }
    }
}

/// Query parameters for `GET /api/hazards`.
///
/// Kept as strings so blank and non-numeric values can be reported with a
/// JSON error body instead of an extractor failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HazardQueryParams {
    /// Centre latitude.
    pub lat: Option<String>,
    /// Centre longitude.
    pub lng: Option<String>,
    /// Radius in kilometres.
    pub radius: Option<String>,
}

/// Response from `GET /api/hazards`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHazardList {
    /// Number of hazards returned.
    pub count: usize,
    /// Active hazards, most recent first.
    pub hazards: Vec<ApiHazard>,
    /// Radius the search used.
    pub radius_km: f64,
}

/// Response from `POST /api/hazards`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHazardCreated {
    /// Confirmation message.
    pub message: String,
    /// The stored hazard.
    pub hazard: ApiHazard,
}

/// Response from `DELETE /api/hazards/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHazardDeleted {
    /// Confirmation message.
    pub message: String,
    /// The deleted hazard's id.
    pub id: i64,
}

/// Response from `POST /api/hazards/cleanup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCleanup {
    /// Confirmation message.
    pub message: String,
    /// Number of expired hazards removed.
    pub deleted_count: u64,
}

/// Active hazard count for one type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTypeCount {
    /// Hazard category.
    #[serde(rename = "type")]
    pub hazard_type: HazardType,
    /// Number of active hazards.
    pub count: u64,
}

impl From<TypeCount> for ApiTypeCount {
    fn from(count: TypeCount) -> Self {
        Self {
            hazard_type: count.hazard_type,
            count: count.count,
        }
    }
}

/// Response from `GET /api/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStats {
    /// Hazards reported in the active window.
    pub total_active_hazards: u64,
    /// Per-type breakdown.
    pub by_type: Vec<ApiTypeCount>,
}

impl From<ActiveStats> for ApiStats {
    fn from(stats: ActiveStats) -> Self {
        Self {
            total_active_hazards: stats.total,
            by_type: stats.by_type.into_iter().map(ApiTypeCount::from).collect(),
        }
    }
}

/// Response from `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiServiceInfo {
    /// Always `"online"`.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Response from `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// `"healthy"` or `"unhealthy"`.
    pub status: String,
    /// `"connected"` or `"disconnected"`.
    pub database: String,
    /// Failure detail when unhealthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    /// Short error summary.
    pub error: String,
    /// Additional detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Fields a report must carry (missing-field errors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Fields that were absent (missing-field errors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<String>>,
    /// Accepted hazard types (invalid-type errors).
    #[serde(
        default,
        rename = "validTypes",
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_types: Option<Vec<String>>,
}

impl ApiError {
    /// Creates an error body with just a summary.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }

    /// Attaches a detail message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
