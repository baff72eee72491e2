//! `DuckDB` event catalog and region statistics.
//!
//! A single database file holds an `events` table, append-only and keyed
//! by a sequence so that insertion order is recoverable, and a
//! `province_statistics` table of per-region counts.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use duckdb::{Connection, Statement};
use quake_risk_database_models::{EventQuery, LabelAggregate, SortDirection, SortKey};
use quake_risk_event_models::{EventRecord, SeverityLabel};

use crate::{DbError, EventRepository, StatisticsStore};

/// Number of rows per INSERT chunk.
const CHUNK_SIZE: usize = 5_000;

const EVENT_COLUMNS: &str = "\"timestamp\", latitude, longitude, magnitude, depth, severity_label";

/// Event repository and statistics store backed by one `DuckDB`
/// connection.
///
/// The connection is `Send` but not `Sync`, so it is guarded by a mutex
/// and calls are serialized.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
}

impl DuckDbStore {
    /// Opens (or creates) the database at `path` and ensures the schema
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            crate::paths::ensure_dir(parent)?;
        }

        let store = Self::from_connection(Connection::open(path)?)?;
        log::info!("Opened event database at {}", path.display());
        Ok(store)
    }

    /// Opens a transient in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DbError> {
        create_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    /// Returns the number of stored events.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub fn count(&self) -> Result<u64, DbError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM events")?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        to_u64(count)
    }
}

fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE SEQUENCE IF NOT EXISTS events_id_seq START 1;

        CREATE TABLE IF NOT EXISTS events (
            id BIGINT PRIMARY KEY DEFAULT nextval('events_id_seq'),
            \"timestamp\" BIGINT NOT NULL,
            latitude DOUBLE NOT NULL,
            longitude DOUBLE NOT NULL,
            magnitude DOUBLE NOT NULL,
            depth DOUBLE NOT NULL,
            severity_label SMALLINT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS province_statistics (
            region TEXT PRIMARY KEY,
            event_count BIGINT NOT NULL
        );",
    )?;

    Ok(())
}

/// A bound query parameter.
#[derive(Debug, Clone, Copy)]
enum Param {
    Integer(i64),
    Small(i16),
    Double(f64),
}

fn bind_all(stmt: &mut Statement<'_>, params: &[Param]) -> Result<(), DbError> {
    for (i, param) in params.iter().enumerate() {
        match *param {
            Param::Integer(v) => stmt.raw_bind_parameter(i + 1, v)?,
            Param::Small(v) => stmt.raw_bind_parameter(i + 1, v)?,
            Param::Double(v) => stmt.raw_bind_parameter(i + 1, v)?,
        }
    }
    Ok(())
}

/// Builds the WHERE clause (with leading space, or empty) and its
/// positional parameters.
fn where_clause(query: &EventQuery) -> (String, Vec<Param>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut params = Vec::new();

    if let Some(bbox) = query.bbox {
        conditions.push("latitude BETWEEN ? AND ? AND longitude BETWEEN ? AND ?".to_string());
        params.extend([
            Param::Double(bbox.south),
            Param::Double(bbox.north),
            Param::Double(bbox.west),
            Param::Double(bbox.east),
        ]);
    }

    if !query.labels.is_empty() {
        let placeholders = vec!["?"; query.labels.len()].join(", ");
        conditions.push(format!("severity_label IN ({placeholders})"));
        params.extend(
            query
                .labels
                .iter()
                .map(|label| Param::Small(i16::from(label.value()))),
        );
    }

    if let Some(range) = query.timestamp {
        conditions.push("\"timestamp\" BETWEEN ? AND ?".to_string());
        params.extend([Param::Integer(range.min), Param::Integer(range.max)]);
    }

    if let Some(range) = query.magnitude {
        conditions.push("magnitude BETWEEN ? AND ?".to_string());
        params.extend([Param::Double(range.min), Param::Double(range.max)]);
    }

    if let Some(range) = query.depth {
        conditions.push("depth BETWEEN ? AND ?".to_string());
        params.extend([Param::Double(range.min), Param::Double(range.max)]);
    }

    if conditions.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), params)
    }
}

const fn sort_column(key: SortKey) -> &'static str {
    match key {
        SortKey::Timestamp => "\"timestamp\"",
        SortKey::Magnitude => "magnitude",
        SortKey::Depth => "depth",
    }
}

fn event_from_row(row: &duckdb::Row<'_>) -> Result<EventRecord, DbError> {
    let label: i16 = row.get(5)?;
    let severity_label = u8::try_from(label)
        .ok()
        .and_then(|v| SeverityLabel::from_value(v).ok())
        .ok_or_else(|| DbError::Conversion {
            message: format!("Invalid stored severity label: {label}"),
        })?;

    Ok(EventRecord {
        timestamp: row.get(0)?,
        latitude: row.get(1)?,
        longitude: row.get(2)?,
        magnitude: row.get(3)?,
        depth: row.get(4)?,
        severity_label,
    })
}

fn collect_events(stmt: &mut Statement<'_>) -> Result<Vec<EventRecord>, DbError> {
    stmt.raw_execute()?;

    let mut events = Vec::new();
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        events.push(event_from_row(row)?);
    }

    Ok(events)
}

fn to_u64(value: i64) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|e| DbError::Conversion {
        message: format!("Negative count {value}: {e}"),
    })
}

fn to_i64(value: u64) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|e| DbError::Conversion {
        message: format!("Count {value} out of range: {e}"),
    })
}

impl EventRepository for DuckDbStore {
    fn query(&self, query: &EventQuery) -> Result<Vec<EventRecord>, DbError> {
        let (filter, params) = where_clause(query);
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events{filter} ORDER BY id");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        bind_all(&mut stmt, &params)?;
        let events = collect_events(&mut stmt)?;

        log::debug!("Event query returned {} rows", events.len());
        Ok(events)
    }

    fn aggregate_by_label(&self, label: SeverityLabel) -> Result<Option<LabelAggregate>, DbError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT COUNT(*),
                    AVG(magnitude), MAX(magnitude), MIN(magnitude),
                    AVG(depth), MAX(depth), MIN(depth)
             FROM events
             WHERE severity_label = ?",
        )?;

        let (count, aggregate) = stmt.query_row([i16::from(label.value())], |row| {
            let count: i64 = row.get(0)?;
            let value = |idx: usize| -> duckdb::Result<f64> {
                Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or_default())
            };
            Ok((
                count,
                LabelAggregate {
                    count: 0,
                    avg_magnitude: value(1)?,
                    max_magnitude: value(2)?,
                    min_magnitude: value(3)?,
                    avg_depth: value(4)?,
                    max_depth: value(5)?,
                    min_depth: value(6)?,
                },
            ))
        })?;

        if count == 0 {
            return Ok(None);
        }

        Ok(Some(LabelAggregate {
            count: to_u64(count)?,
            ..aggregate
        }))
    }

    fn extreme(
        &self,
        key: SortKey,
        direction: SortDirection,
    ) -> Result<Option<EventRecord>, DbError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY {} {}, id LIMIT 1",
            sort_column(key),
            direction.as_ref(),
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        Ok(collect_events(&mut stmt)?.into_iter().next())
    }

    fn insert_events(&self, events: &[EventRecord]) -> Result<u64, DbError> {
        if events.is_empty() {
            return Ok(0);
        }

        let conn = self.lock()?;
        let mut total_inserted = 0u64;

        for chunk in events.chunks(CHUNK_SIZE) {
            let mut sql = format!("INSERT INTO events ({EVENT_COLUMNS}) VALUES ");
            for i in 0..chunk.len() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str("(?, ?, ?, ?, ?, ?)");
            }

            let mut stmt = conn.prepare(&sql)?;
            let mut param_idx = 1usize;

            for event in chunk {
                stmt.raw_bind_parameter(param_idx, event.timestamp)?;
                stmt.raw_bind_parameter(param_idx + 1, event.latitude)?;
                stmt.raw_bind_parameter(param_idx + 2, event.longitude)?;
                stmt.raw_bind_parameter(param_idx + 3, event.magnitude)?;
                stmt.raw_bind_parameter(param_idx + 4, event.depth)?;
                stmt.raw_bind_parameter(param_idx + 5, i16::from(event.severity_label.value()))?;
                param_idx += 6;
            }

            let rows = stmt.raw_execute()?;
            total_inserted += u64::try_from(rows).unwrap_or(0);
        }

        log::info!("Inserted {total_inserted} events");
        Ok(total_inserted)
    }
}

impl StatisticsStore for DuckDbStore {
    fn upsert(&self, region: &str, count: u64) -> Result<(), DbError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO province_statistics (region, event_count) VALUES (?, ?)
             ON CONFLICT (region) DO UPDATE SET event_count = EXCLUDED.event_count",
            duckdb::params![region, to_i64(count)?],
        )?;
        Ok(())
    }

    fn upsert_all(&self, counts: &BTreeMap<String, u64>) -> Result<u64, DbError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO province_statistics (region, event_count) VALUES (?, ?)
                 ON CONFLICT (region) DO UPDATE SET event_count = EXCLUDED.event_count",
            )?;
            for (region, count) in counts {
                stmt.execute(duckdb::params![region, to_i64(*count)?])?;
            }
        }

        tx.commit()?;
        log::info!("Stored counts for {} regions", counts.len());
        Ok(counts.len() as u64)
    }

    fn read_all(&self) -> Result<BTreeMap<String, u64>, DbError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT region, event_count FROM province_statistics ORDER BY region")?;
        stmt.raw_execute()?;

        let mut counts = BTreeMap::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
            let region: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            counts.insert(region, to_u64(count)?);
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quake_risk_database_models::{BoundingBox, Range};

    fn event(timestamp: i64, lat: f64, lon: f64, magnitude: f64, depth: f64, label: u8) -> EventRecord {
        EventRecord {
            timestamp,
            latitude: lat,
            longitude: lon,
            magnitude,
            depth,
            severity_label: SeverityLabel::from_value(label).unwrap(),
        }
    }

    fn seeded() -> DuckDbStore {
        let store = DuckDbStore::open_in_memory().unwrap();
        store
            .insert_events(&[
                event(1_000, -6.2, 106.8, 5.1, 10.0, 15),
                event(2_000, -6.5, 107.0, 4.2, 30.0, 9),
                event(3_000, 3.5, 98.6, 6.3, 120.0, 15),
                event(4_000, -8.4, 115.2, 3.0, 5.0, 2),
                event(5_000, -6.3, 106.9, 4.8, 15.0, 13),
            ])
            .unwrap();
        store
    }

    #[test]
    fn unfiltered_query_returns_insertion_order() {
        let store = seeded();
        let events = store.query(&EventQuery::all()).unwrap();
        let timestamps: Vec<i64> = events.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![1_000, 2_000, 3_000, 4_000, 5_000]);
        assert_eq!(store.count().unwrap(), 5);
    }

    #[test]
    fn bbox_round_trip_preserves_records_and_mean() {
        let store = seeded();
        let query = EventQuery {
            bbox: Some(BoundingBox::new(106.0, -7.0, 108.0, -6.0)),
            ..EventQuery::default()
        };
        let events = store.query(&query).unwrap();
        assert_eq!(events.len(), 3);

        #[allow(clippy::cast_precision_loss)]
        let mean = events.iter().map(|e| e.magnitude).sum::<f64>() / events.len() as f64;
        assert!((mean - (5.1 + 4.2 + 4.8) / 3.0).abs() < 1e-3);
    }

    #[test]
    fn filters_are_conjunctive() {
        let store = seeded();
        let query = EventQuery {
            labels: vec![SeverityLabel::from_value(15).unwrap()],
            magnitude: Some(Range::new(6.0, 7.0).unwrap()),
            ..EventQuery::default()
        };
        let events = store.query(&query).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, 3_000);

        let query = EventQuery {
            timestamp: Some(Range::new(2_000, 4_000).unwrap()),
            depth: Some(Range::new(0.0, 50.0).unwrap()),
            ..EventQuery::default()
        };
        let timestamps: Vec<i64> = store.query(&query).unwrap().iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![2_000, 4_000]);
    }

    #[test]
    fn aggregates_by_label() {
        let store = seeded();
        let aggregate = store
            .aggregate_by_label(SeverityLabel::from_value(15).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(aggregate.count, 2);
        assert!((aggregate.avg_magnitude - 5.7).abs() < 1e-9);
        assert!((aggregate.max_depth - 120.0).abs() < f64::EPSILON);
        assert!((aggregate.min_depth - 10.0).abs() < f64::EPSILON);

        let missing = store
            .aggregate_by_label(SeverityLabel::from_value(7).unwrap())
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn extreme_events() {
        let store = seeded();
        let earliest = store.extreme(SortKey::Timestamp, SortDirection::Ascending).unwrap();
        assert_eq!(earliest.unwrap().timestamp, 1_000);
        let latest = store.extreme(SortKey::Timestamp, SortDirection::Descending).unwrap();
        assert_eq!(latest.unwrap().timestamp, 5_000);
        let strongest = store.extreme(SortKey::Magnitude, SortDirection::Descending).unwrap();
        assert_eq!(strongest.unwrap().timestamp, 3_000);

        let empty = DuckDbStore::open_in_memory().unwrap();
        assert!(empty.extreme(SortKey::Depth, SortDirection::Ascending).unwrap().is_none());
    }

    #[test]
    fn upsert_overwrites_previous_count() {
        let store = DuckDbStore::open_in_memory().unwrap();
        store.upsert("DKI JAKARTA", 3).unwrap();
        store.upsert("DKI JAKARTA", 7).unwrap();
        store.upsert("BALI", 1).unwrap();

        let counts = store.read_all().unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["DKI JAKARTA"], 7);

        let mut update = BTreeMap::new();
        update.insert("BALI".to_string(), 4);
        update.insert("ACEH".to_string(), 2);
        assert_eq!(store.upsert_all(&update).unwrap(), 2);

        let counts = store.read_all().unwrap();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts["BALI"], 4);
        assert_eq!(counts["DKI JAKARTA"], 7);
    }

    #[test]
    fn empty_insert_is_noop() {
        let store = DuckDbStore::open_in_memory().unwrap();
        assert_eq!(store.insert_events(&[]).unwrap(), 0);
    }
}
