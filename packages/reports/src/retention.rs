//! Active-window and cleanup rules.
//!
//! A hazard is active while `timestamp > now - active_window`. Reads only
//! ever see active hazards; cleanup removes the rest. Deleting by id is a
//! moderation action and ignores the window entirely.

use chrono::TimeDelta;
use hazard_map_database::HazardStore;
use hazard_map_database_models::ActiveStats;

use crate::ReportError;

/// Default active window, in hours.
pub const ACTIVE_WINDOW_HOURS: i64 = 24;

/// How long hazards stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Age after which a hazard stops being active and becomes eligible
    /// for cleanup.
    pub active_window: TimeDelta,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            active_window: TimeDelta::hours(ACTIVE_WINDOW_HOURS),
        }
    }
}

/// Deletes every hazard outside the active window and returns the count.
///
/// Running it again straight away deletes nothing.
///
/// # Errors
///
/// Returns [`ReportError::Store`] if the store operation fails.
pub async fn purge_expired(
    store: &dyn HazardStore,
    policy: &RetentionPolicy,
) -> Result<u64, ReportError> {
    let deleted = store.delete_expired(policy.active_window).await?;
    log::info!("Cleanup removed {deleted} expired hazard(s)");
    Ok(deleted)
}

/// Deletes a hazard by id regardless of its age.
///
/// # Errors
///
/// * [`ReportError::NotFound`] if no hazard has that id
/// * [`ReportError::Store`] if the store operation fails
pub async fn delete_hazard(store: &dyn HazardStore, id: i64) -> Result<i64, ReportError> {
    let deleted = store
        .delete_by_id(id)
        .await?
        .ok_or(ReportError::NotFound { id })?;
    log::info!("Deleted hazard {deleted}");
    Ok(deleted)
}

/// Counts active hazards in total and per type.
///
/// # Errors
///
/// Returns [`ReportError::Store`] if the store operation fails.
pub async fn active_stats(
    store: &dyn HazardStore,
    policy: &RetentionPolicy,
) -> Result<ActiveStats, ReportError> {
    Ok(store.count_and_group_active(policy.active_window).await?)
}
