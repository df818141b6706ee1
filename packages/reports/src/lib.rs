#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hazard report validation, duplicate suppression, and retention rules.
//!
//! [`HazardService`] ties the pieces together around an injected
//! [`HazardStore`]:
//!
//! * reports pass through [`validate::validate_report`], then
//!   [`dedup::ensure_not_duplicate`], then are inserted
//! * radius queries are turned into a bounding box by
//!   `hazard_map_geography` and answered from the active window
//! * cleanup, deletion and statistics follow [`retention`]

pub mod dedup;
pub mod retention;
pub mod validate;

use std::sync::Arc;

use hazard_map_database::{DbError, HazardStore};
use hazard_map_database_models::{ActiveStats, HazardRow};
use hazard_map_geography::GeoError;
use hazard_map_geography::bbox::SearchArea;
use hazard_map_hazard_models::CandidateReport;
use thiserror::Error;

pub use dedup::DuplicatePolicy;
pub use retention::RetentionPolicy;

/// Errors surfaced by hazard operations.
#[derive(Debug, Error)]
pub enum ReportError {
    /// One or more required report fields were absent or blank.
    #[error("Missing required fields: {}", missing.join(", "))]
    MissingField {
        /// The absent fields.
        missing: Vec<&'static str>,
    },

    /// The hazard type is not in the enumeration.
    #[error("Invalid hazard type: {value}")]
    InvalidType {
        /// The rejected value.
        value: String,
        /// The accepted values.
        valid_types: Vec<&'static str>,
    },

    /// A coordinate is non-numeric or out of range.
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates {
        /// Description of what went wrong.
        message: String,
    },

    /// The attribution is too long.
    #[error("reported_by must be at most {max} characters")]
    InvalidReporter {
        /// Maximum accepted length.
        max: usize,
    },

    /// A matching hazard was reported nearby within the duplicate window.
    #[error("Duplicate report detected")]
    DuplicateReport {
        /// Ids of the colliding hazards.
        existing: Vec<i64>,
    },

    /// No hazard has the requested id.
    #[error("Hazard {id} not found")]
    NotFound {
        /// The requested id.
        id: i64,
    },

    /// The search centre or radius is missing or invalid.
    #[error(transparent)]
    Search(#[from] GeoError),

    /// The store failed.
    #[error("Store error: {0}")]
    Store(#[from] DbError),
}

/// Active hazards around a search centre.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyHazards {
    /// The resolved search.
    pub area: SearchArea,
    /// Matching hazards, most recent first.
    pub hazards: Vec<HazardRow>,
}

/// Entry point for every hazard operation.
///
/// Holds no mutable state of its own; cloning shares the store.
#[derive(Clone)]
pub struct HazardService {
    store: Arc<dyn HazardStore>,
    duplicates: DuplicatePolicy,
    retention: RetentionPolicy,
}

impl std::fmt::Debug for HazardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HazardService")
            .field("duplicates", &self.duplicates)
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

impl HazardService {
    /// Creates a service with the default duplicate and retention policies.
    #[must_use]
    pub fn new(store: Arc<dyn HazardStore>) -> Self {
        Self::with_policies(store, DuplicatePolicy::default(), RetentionPolicy::default())
    }

    /// Creates a service with explicit policies.
    #[must_use]
    pub fn with_policies(
        store: Arc<dyn HazardStore>,
        duplicates: DuplicatePolicy,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            store,
            duplicates,
            retention,
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn HazardStore> {
        &self.store
    }

    /// Validates, de-duplicates, and stores a report.
    ///
    /// # Errors
    ///
    /// Returns any validation error from [`validate::validate_report`],
    /// [`ReportError::DuplicateReport`], or [`ReportError::Store`].
    pub async fn report(&self, candidate: &CandidateReport) -> Result<HazardRow, ReportError> {
        let hazard = validate::validate_report(candidate)?;
        dedup::ensure_not_duplicate(self.store.as_ref(), &self.duplicates, &hazard).await?;

        let row = self.store.insert(&hazard).await?;
        log::info!(
            "Hazard {} reported: {} at ({}, {}) by {}",
            row.id,
            row.hazard_type,
            row.latitude,
            row.longitude,
            row.reported_by,
        );
        Ok(row)
    }

    /// Returns active hazards inside the bounding box of `area`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Store`] if the store query fails.
    pub async fn nearby(&self, area: SearchArea) -> Result<NearbyHazards, ReportError> {
        let bbox = area.bounding_box();
        log::debug!("Searching {bbox:?} for area {area:?}");

        let hazards = self
            .store
            .query_active_in_box(&bbox, self.retention.active_window)
            .await?;

        Ok(NearbyHazards { area, hazards })
    }

    /// Like [`Self::nearby`], taking raw query-string values.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Search`] if the centre or radius is missing
    /// or invalid, or [`ReportError::Store`] if the store query fails.
    pub async fn nearby_raw(
        &self,
        lat: Option<&str>,
        lng: Option<&str>,
        radius: Option<&str>,
    ) -> Result<NearbyHazards, ReportError> {
        let area = SearchArea::parse(lat, lng, radius)?;
        self.nearby(area).await
    }

    /// Deletes a hazard regardless of age.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::NotFound`] or [`ReportError::Store`].
    pub async fn delete(&self, id: i64) -> Result<i64, ReportError> {
        retention::delete_hazard(self.store.as_ref(), id).await
    }

    /// Removes hazards outside the active window.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Store`] if the store operation fails.
    pub async fn cleanup(&self) -> Result<u64, ReportError> {
        retention::purge_expired(self.store.as_ref(), &self.retention).await
    }

    /// Counts active hazards in total and per type.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Store`] if the store operation fails.
    pub async fn stats(&self) -> Result<ActiveStats, ReportError> {
        retention::active_stats(self.store.as_ref(), &self.retention).await
    }

    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Store`] if it is not.
    pub async fn health(&self) -> Result<(), ReportError> {
        Ok(self.store.ping().await?)
    }
}
