//! In-process [`HazardStore`] for tests and database-less runs.
//!
//! Rows live in a mutex-guarded `Vec`. The store clock is wall-clock time
//! plus an adjustable offset so callers can move time forward without
//! sleeping.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use hazard_map_database_models::{
    ActiveStats, BoundingBox, DuplicateQuery, HazardRow, NewHazard, TypeCount,
};

use crate::{DbError, HazardStore};

#[derive(Debug, Default)]
struct State {
    rows: Vec<HazardRow>,
    next_id: i64,
    clock_offset: TimeDelta,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    fn now(&self) -> DateTime<Utc> {
        Utc::now() + self.clock_offset
    }
}

/// A [`HazardStore`] that keeps hazards in memory.
#[derive(Debug, Default)]
pub struct MemoryHazardStore {
    state: Mutex<State>,
}

impl MemoryHazardStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the store clock forward by `by`.
    pub fn advance(&self, by: TimeDelta) {
        self.lock().clock_offset += by;
    }

    /// Returns the store's current time.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.lock().now()
    }

    /// Number of rows held, regardless of age.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    /// Returns `true` if the store holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[allow(clippy::cast_precision_loss)]
fn minutes_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}

#[async_trait]
impl HazardStore for MemoryHazardStore {
    async fn insert(&self, hazard: &NewHazard) -> Result<HazardRow, DbError> {
        let mut state = self.lock();

        // Keep timestamps monotonic in insertion order even if the wall
        // clock steps backwards.
        let now = state.now();
        let timestamp = state.last_timestamp.map_or(now, |last| last.max(now));
        state.last_timestamp = Some(timestamp);

        state.next_id += 1;
        let row = HazardRow {
            id: state.next_id,
            hazard_type: hazard.hazard_type,
            latitude: hazard.latitude,
            longitude: hazard.longitude,
            timestamp,
            reported_by: hazard.reported_by.clone(),
            age_minutes: None,
        };
        state.rows.push(row.clone());

        Ok(row)
    }

    async fn query_active_in_box(
        &self,
        bbox: &BoundingBox,
        active_window: TimeDelta,
    ) -> Result<Vec<HazardRow>, DbError> {
        let state = self.lock();
        let now = state.now();
        let cutoff = now - active_window;

        let mut hazards: Vec<HazardRow> = state
            .rows
            .iter()
            .filter(|row| row.timestamp > cutoff && bbox.contains(row.latitude, row.longitude))
            .map(|row| HazardRow {
                age_minutes: Some(minutes_between(row.timestamp, now)),
                ..row.clone()
            })
            .collect();

        hazards.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        Ok(hazards)
    }

    async fn query_duplicates(&self, query: &DuplicateQuery) -> Result<Vec<i64>, DbError> {
        let state = self.lock();
        let cutoff = state.now() - query.window;

        Ok(state
            .rows
            .iter()
            .filter(|row| row.timestamp > cutoff && query.is_near(row))
            .map(|row| row.id)
            .collect())
    }

    async fn delete_by_id(&self, id: i64) -> Result<Option<i64>, DbError> {
        let mut state = self.lock();
        let Some(index) = state.rows.iter().position(|row| row.id == id) else {
            return Ok(None);
        };
        state.rows.remove(index);
        Ok(Some(id))
    }

    async fn delete_expired(&self, retention: TimeDelta) -> Result<u64, DbError> {
        let mut state = self.lock();
        let cutoff = state.now() - retention;
        let before = state.rows.len();
        state.rows.retain(|row| row.timestamp > cutoff);
        Ok((before - state.rows.len()) as u64)
    }

    async fn count_and_group_active(
        &self,
        active_window: TimeDelta,
    ) -> Result<ActiveStats, DbError> {
        let state = self.lock();
        let cutoff = state.now() - active_window;

        let mut by_type: Vec<TypeCount> = Vec::new();
        for row in state.rows.iter().filter(|row| row.timestamp > cutoff) {
            match by_type.iter_mut().find(|c| c.hazard_type == row.hazard_type) {
                Some(entry) => entry.count += 1,
                None => by_type.push(TypeCount {
                    hazard_type: row.hazard_type,
                    count: 1,
                }),
            }
        }
        by_type.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.hazard_type.as_str().cmp(b.hazard_type.as_str()))
        });

        Ok(ActiveStats {
            total: by_type.iter().map(|c| c.count).sum(),
            by_type,
        })
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hazard_map_hazard_models::HazardType;

    use super::*;

    fn new_hazard(hazard_type: HazardType, latitude: f64, longitude: f64) -> NewHazard {
        NewHazard {
            hazard_type,
            latitude,
            longitude,
            reported_by: "tester".to_string(),
        }
    }

    fn world() -> BoundingBox {
        BoundingBox::new(-90.0, 90.0, -180.0, 180.0)
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids_and_timestamps() {
        let store = MemoryHazardStore::new();
        let a = store
            .insert(&new_hazard(HazardType::Police, 1.0, 1.0))
            .await
            .unwrap();
        let b = store
            .insert(&new_hazard(HazardType::Police, 2.0, 2.0))
            .await
            .unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(b.timestamp >= a.timestamp);
        assert_eq!(a.reported_by, "tester");
        assert!(a.age_minutes.is_none());
    }

    #[tokio::test]
    async fn active_query_filters_box_and_age() {
        let store = MemoryHazardStore::new();
        store
            .insert(&new_hazard(HazardType::Debris, 10.0, 10.0))
            .await
            .unwrap();
        store.advance(TimeDelta::hours(25));
        let fresh = store
            .insert(&new_hazard(HazardType::Debris, 10.0, 10.0))
            .await
            .unwrap();
        store
            .insert(&new_hazard(HazardType::Debris, 40.0, 40.0))
            .await
            .unwrap();

        let bbox = BoundingBox::new(9.0, 11.0, 9.0, 11.0);
        let hazards = store
            .query_active_in_box(&bbox, TimeDelta::hours(24))
            .await
            .unwrap();
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].id, fresh.id);
        assert!(hazards[0].age_minutes.is_some());
    }

    #[tokio::test]
    async fn active_query_is_most_recent_first() {
        let store = MemoryHazardStore::new();
        for i in 0..3 {
            store
                .insert(&new_hazard(HazardType::Weather, f64::from(i), 0.0))
                .await
                .unwrap();
            store.advance(TimeDelta::minutes(1));
        }
        let ids: Vec<i64> = store
            .query_active_in_box(&world(), TimeDelta::hours(24))
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn duplicates_respect_type_tolerance_and_window() {
        let store = MemoryHazardStore::new();
        let existing = store
            .insert(&new_hazard(HazardType::Accident, 51.5, -0.12))
            .await
            .unwrap();

        let query = DuplicateQuery {
            hazard_type: HazardType::Accident,
            latitude: 51.5005,
            longitude: -0.1205,
            window: TimeDelta::minutes(5),
            tolerance: 0.001,
        };
        assert_eq!(store.query_duplicates(&query).await.unwrap(), vec![existing.id]);

        let other_type = DuplicateQuery {
            hazard_type: HazardType::Police,
            ..query
        };
        assert!(store.query_duplicates(&other_type).await.unwrap().is_empty());

        let moved = DuplicateQuery {
            latitude: 51.502,
            ..query
        };
        assert!(store.query_duplicates(&moved).await.unwrap().is_empty());

        store.advance(TimeDelta::minutes(6));
        assert!(store.query_duplicates(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_expired_is_idempotent() {
        let store = MemoryHazardStore::new();
        store
            .insert(&new_hazard(HazardType::Other, 0.0, 0.0))
            .await
            .unwrap();
        store.advance(TimeDelta::hours(24));
        store
            .insert(&new_hazard(HazardType::Other, 1.0, 1.0))
            .await
            .unwrap();

        assert_eq!(store.delete_expired(TimeDelta::hours(24)).await.unwrap(), 1);
        assert_eq!(store.delete_expired(TimeDelta::hours(24)).await.unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn delete_by_id_ignores_age() {
        let store = MemoryHazardStore::new();
        let row = store
            .insert(&new_hazard(HazardType::Police, 0.0, 0.0))
            .await
            .unwrap();
        store.advance(TimeDelta::days(3));

        assert_eq!(store.delete_by_id(row.id).await.unwrap(), Some(row.id));
        assert_eq!(store.delete_by_id(row.id).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn stats_group_active_rows_only() {
        let store = MemoryHazardStore::new();
        store
            .insert(&new_hazard(HazardType::Debris, 0.0, 0.0))
            .await
            .unwrap();
        store.advance(TimeDelta::hours(30));
        for _ in 0..2 {
            store
                .insert(&new_hazard(HazardType::Police, 0.0, 0.0))
                .await
                .unwrap();
        }
        store
            .insert(&new_hazard(HazardType::Weather, 0.0, 0.0))
            .await
            .unwrap();

        let stats = store
            .count_and_group_active(TimeDelta::hours(24))
            .await
            .unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(
            stats.by_type,
            vec![
                TypeCount {
                    hazard_type: HazardType::Police,
                    count: 2
                },
                TypeCount {
                    hazard_type: HazardType::Weather,
                    count: 1
                },
            ]
        );
    }
}
