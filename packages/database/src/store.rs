//! The hazard store contract and its `PostgreSQL` implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use hazard_map_database_models::{ActiveStats, BoundingBox, DuplicateQuery, HazardRow, NewHazard};
use switchy_database::Database;

use crate::{DbError, queries};

/// Persistence operations required by the hazard reporting core.
///
/// Every method is a single atomic store round trip. Time windows are
/// measured back from the store's own clock, the same clock that assigns
/// `timestamp` on insert. Implementations must be safe to call from many
/// request handlers at once.
#[async_trait]
pub trait HazardStore: Send + Sync {
    /// Persists a hazard, assigning its `id` and `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store operation fails.
    async fn insert(&self, hazard: &NewHazard) -> Result<HazardRow, DbError>;

    /// Returns hazards newer than `now - active_window` that lie inside
    /// `bbox`, ordered by timestamp descending. Rows carry `age_minutes`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store operation fails.
    async fn query_active_in_box(
        &self,
        bbox: &BoundingBox,
        active_window: TimeDelta,
    ) -> Result<Vec<HazardRow>, DbError>;

    /// Returns the ids of hazards that collide with `query`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store operation fails.
    async fn query_duplicates(&self, query: &DuplicateQuery) -> Result<Vec<i64>, DbError>;

    /// Deletes a hazard regardless of age. Returns `None` if it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store operation fails.
    async fn delete_by_id(&self, id: i64) -> Result<Option<i64>, DbError>;

    /// Deletes hazards at or older than `now - retention` and returns how
    /// many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store operation fails.
    async fn delete_expired(&self, retention: TimeDelta) -> Result<u64, DbError>;

    /// Counts hazards newer than `now - active_window`, in total and per
    /// type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store operation fails.
    async fn count_and_group_active(&self, active_window: TimeDelta)
    -> Result<ActiveStats, DbError>;

    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be reached.
    async fn ping(&self) -> Result<(), DbError>;
}

/// [`HazardStore`] backed by a `switchy_database` connection.
#[derive(Clone)]
pub struct DatabaseHazardStore {
    db: Arc<dyn Database>,
}

impl DatabaseHazardStore {
    /// Wraps an open database connection.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

impl std::fmt::Debug for DatabaseHazardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseHazardStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl HazardStore for DatabaseHazardStore {
    async fn insert(&self, hazard: &NewHazard) -> Result<HazardRow, DbError> {
        queries::insert_hazard(self.db.as_ref(), hazard).await
    }

    async fn query_active_in_box(
        &self,
        bbox: &BoundingBox,
        active_window: TimeDelta,
    ) -> Result<Vec<HazardRow>, DbError> {
        queries::query_active_in_box(self.db.as_ref(), bbox, active_window).await
    }

    async fn query_duplicates(&self, query: &DuplicateQuery) -> Result<Vec<i64>, DbError> {
        queries::query_duplicates(self.db.as_ref(), query).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<Option<i64>, DbError> {
        queries::delete_hazard(self.db.as_ref(), id).await
    }

    async fn delete_expired(&self, retention: TimeDelta) -> Result<u64, DbError> {
        queries::delete_expired(self.db.as_ref(), retention).await
    }

    async fn count_and_group_active(
        &self,
        active_window: TimeDelta,
    ) -> Result<ActiveStats, DbError> {
        queries::count_active_by_type(self.db.as_ref(), active_window).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        queries::ping(self.db.as_ref()).await
    }
}
