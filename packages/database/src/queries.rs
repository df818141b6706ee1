//! `PostgreSQL` query functions for hazard data.
//!
//! All statements are single parameterized round trips via
//! `query_raw_params()` / `exec_raw_params()`. Time windows are evaluated
//! against the database clock (`NOW()` in UTC), so timestamps assigned at
//! insert and the cutoffs used by reads come from the same source.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use hazard_map_database_models::{
    ActiveStats, BoundingBox, COORDINATE_DECIMALS, DuplicateQuery, HazardRow, NewHazard,
    TypeCount,
};
use hazard_map_hazard_models::HazardType;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

/// Current database time as a UTC `TIMESTAMP`.
const NOW_UTC: &str = "(NOW() AT TIME ZONE 'UTC')";

/// Inserts a hazard, letting the database assign `id` and `timestamp`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_hazard(db: &dyn Database, hazard: &NewHazard) -> Result<HazardRow, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "INSERT INTO hazards (type, latitude, longitude, reported_by, timestamp)
                 VALUES ($1, $2, $3, $4, {NOW_UTC})
                 RETURNING id, type, latitude, longitude, timestamp, reported_by"
            ),
            &[
                DatabaseValue::String(hazard.hazard_type.as_str().to_string()),
                DatabaseValue::Real64(hazard.latitude),
                DatabaseValue::Real64(hazard.longitude),
                DatabaseValue::String(hazard.reported_by.clone()),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Insert returned no row".to_string(),
    })?;

    hazard_from_row(row, false)
}

/// Returns active hazards inside `bbox`, most recent first.
///
/// A hazard is active when its timestamp is strictly newer than
/// `now - active_window`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn query_active_in_box(
    db: &dyn Database,
    bbox: &BoundingBox,
    active_window: TimeDelta,
) -> Result<Vec<HazardRow>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT id, type, latitude, longitude, timestamp, reported_by,
                        (EXTRACT(EPOCH FROM ({NOW_UTC} - timestamp)) / 60)::double precision
                            AS age_minutes
                 FROM hazards
                 WHERE timestamp > {NOW_UTC} - make_interval(secs => $1)
                   AND latitude BETWEEN $2 AND $3
                   AND longitude BETWEEN $4 AND $5
                 ORDER BY timestamp DESC, id DESC"
            ),
            &[
                DatabaseValue::Real64(window_secs(active_window)),
                DatabaseValue::Real64(bbox.lat_min),
                DatabaseValue::Real64(bbox.lat_max),
                DatabaseValue::Real64(bbox.lng_min),
                DatabaseValue::Real64(bbox.lng_max),
            ],
        )
        .await?;

    rows.iter().map(|row| hazard_from_row(row, true)).collect()
}

/// Returns the ids of recent hazards that collide with `query`.
///
/// Coordinate differences are rounded to [`COORDINATE_DECIMALS`] places
/// before the tolerance check, as in
/// [`DuplicateQuery::is_near`].
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn query_duplicates(
    db: &dyn Database,
    query: &DuplicateQuery,
) -> Result<Vec<i64>, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT id FROM hazards
                 WHERE type = $1
                   AND timestamp > {NOW_UTC} - make_interval(secs => $2)
                   AND ROUND(ABS(latitude - $3)::numeric, {COORDINATE_DECIMALS})
                       < $5::double precision
                   AND ROUND(ABS(longitude - $4)::numeric, {COORDINATE_DECIMALS})
                       < $5::double precision"
            ),
            &[
                DatabaseValue::String(query.hazard_type.as_str().to_string()),
                DatabaseValue::Real64(window_secs(query.window)),
                DatabaseValue::Real64(query.latitude),
                DatabaseValue::Real64(query.longitude),
                DatabaseValue::Real64(query.tolerance),
            ],
        )
        .await?;

    rows.iter()
        .map(|row| {
            row.to_value("id").map_err(|e| DbError::Conversion {
                message: format!("Failed to parse hazard id: {e}"),
            })
        })
        .collect()
}

/// Deletes a hazard by id regardless of age.
///
/// Returns the deleted id, or `None` if no such hazard exists.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete_hazard(db: &dyn Database, id: i64) -> Result<Option<i64>, DbError> {
    let rows = db
        .query_raw_params(
            "DELETE FROM hazards WHERE id = $1 RETURNING id",
            &[DatabaseValue::Int64(id)],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let deleted: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse deleted id: {e}"),
    })?;

    Ok(Some(deleted))
}

/// Deletes every hazard whose timestamp is at or before
/// `now - retention`, returning the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete_expired(db: &dyn Database, retention: TimeDelta) -> Result<u64, DbError> {
    let deleted = db
        .exec_raw_params(
            &format!("DELETE FROM hazards WHERE timestamp <= {NOW_UTC} - make_interval(secs => $1)"),
            &[DatabaseValue::Real64(window_secs(retention))],
        )
        .await?;

    Ok(deleted)
}

/// Counts active hazards in total and per type.
///
/// Both figures come from one grouped statement so they always agree.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn count_active_by_type(
    db: &dyn Database,
    active_window: TimeDelta,
) -> Result<ActiveStats, DbError> {
    let rows = db
        .query_raw_params(
            &format!(
                "SELECT type, COUNT(*) AS count
                 FROM hazards
                 WHERE timestamp > {NOW_UTC} - make_interval(secs => $1)
                 GROUP BY type
                 ORDER BY count DESC, type"
            ),
            &[DatabaseValue::Real64(window_secs(active_window))],
        )
        .await?;

    let mut stats = ActiveStats::default();

    for row in &rows {
        let hazard_type = parse_type(row)?;
        let count: i64 = row.to_value("count").unwrap_or(0);
        let count = u64::try_from(count).unwrap_or(0);
        stats.total += count;
        stats.by_type.push(TypeCount { hazard_type, count });
    }

    Ok(stats)
}

/// Round-trips a trivial statement to confirm the connection is usable.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be reached.
pub async fn ping(db: &dyn Database) -> Result<(), DbError> {
    db.query_raw_params("SELECT NOW() AS now", &[]).await?;
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn window_secs(window: TimeDelta) -> f64 {
    window.num_milliseconds() as f64 / 1000.0
}

fn parse_type(row: &Row) -> Result<HazardType, DbError> {
    let name: String = row.to_value("type").unwrap_or_default();
    name.parse::<HazardType>().map_err(|_| DbError::Conversion {
        message: format!("Unknown hazard type in store: {name:?}"),
    })
}

fn hazard_from_row(row: &Row, with_age: bool) -> Result<HazardRow, DbError> {
    let timestamp: NaiveDateTime = row.to_value("timestamp").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse hazard timestamp: {e}"),
    })?;

    Ok(HazardRow {
        id: row.to_value("id").map_err(|e| DbError::Conversion {
            message: format!("Failed to parse hazard id: {e}"),
        })?,
        hazard_type: parse_type(row)?,
        latitude: row.to_value("latitude").map_err(|e| DbError::Conversion {
            message: format!("Failed to parse hazard latitude: {e}"),
        })?,
        longitude: row.to_value("longitude").map_err(|e| DbError::Conversion {
            message: format!("Failed to parse hazard longitude: {e}"),
        })?,
        timestamp: DateTime::<Utc>::from_naive_utc_and_offset(timestamp, Utc),
        reported_by: row.to_value("reported_by").unwrap_or_default(),
        age_minutes: if with_age {
            row.to_value("age_minutes").unwrap_or(None)
        } else {
            None
        },
    })
}
