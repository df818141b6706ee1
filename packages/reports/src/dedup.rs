//! Duplicate report suppression.
//!
//! A report is a duplicate when the store already holds a hazard of the
//! same type, created within [`DuplicatePolicy::window`], whose latitude and
//! longitude each differ from the candidate's by strictly less than
//! [`DuplicatePolicy::tolerance_degrees`], after rounding each difference
//! to eight decimal places. The matching region is a small
//! square in degree space, not a circle.
//!
//! The check and the subsequent insert are separate store round trips.
//! Two concurrent reports for the same spot can both pass the check and
//! both be stored.

use chrono::TimeDelta;
use hazard_map_database::HazardStore;
use hazard_map_database_models::{DuplicateQuery, NewHazard};

use crate::ReportError;

/// Default look-back for duplicate detection, in minutes.
pub const DUPLICATE_WINDOW_MINUTES: i64 = 5;

/// Default per-axis tolerance in degrees (about 111 m at the equator).
pub const DUPLICATE_TOLERANCE_DEGREES: f64 = 0.001;

/// Parameters of the duplicate window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicatePolicy {
    /// How far back to look for colliding reports.
    pub window: TimeDelta,
    /// Per-axis coordinate tolerance in degrees.
    pub tolerance_degrees: f64,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        Self {
            window: TimeDelta::minutes(DUPLICATE_WINDOW_MINUTES),
            tolerance_degrees: DUPLICATE_TOLERANCE_DEGREES,
        }
    }
}

impl DuplicatePolicy {
    /// Builds the store query for `hazard`.
    #[must_use]
    pub const fn query_for(&self, hazard: &NewHazard) -> DuplicateQuery {
        DuplicateQuery {
            hazard_type: hazard.hazard_type,
            latitude: hazard.latitude,
            longitude: hazard.longitude,
            window: self.window,
            tolerance: self.tolerance_degrees,
        }
    }
}

/// Rejects `hazard` if it collides with a recent nearby report.
///
/// # Errors
///
/// * [`ReportError::DuplicateReport`] carrying the colliding ids
/// * [`ReportError::Store`] if the lookup fails
pub async fn ensure_not_duplicate(
    store: &dyn HazardStore,
    policy: &DuplicatePolicy,
    hazard: &NewHazard,
) -> Result<(), ReportError> {
    let existing = store.query_duplicates(&policy.query_for(hazard)).await?;

    if existing.is_empty() {
        return Ok(());
    }

    log::debug!(
        "Rejecting duplicate {} report at ({}, {}); matches {existing:?}",
        hazard.hazard_type,
        hazard.latitude,
        hazard.longitude,
    );

    Err(ReportError::DuplicateReport { existing })
}
