//! Batch import of an event catalog from a JSON file.
//!
//! The catalog is a JSON array of event objects. Both the current field
//! names and the legacy `datetime` / `cluster_label` names are accepted.
//! Every record is validated before anything is written.

use std::path::Path;

use quake_risk_event_models::EventRecord;

use crate::{DbError, EventRepository};

/// Parses and validates a catalog string.
///
/// # Errors
///
/// Returns [`DbError::Json`] if the string is not an array of events, or
/// [`DbError::Conversion`] naming the first invalid record.
pub fn parse_catalog(json: &str) -> Result<Vec<EventRecord>, DbError> {
    let events: Vec<EventRecord> = serde_json::from_str(json)?;

    for (idx, event) in events.iter().enumerate() {
        validate(event).map_err(|message| DbError::Conversion {
            message: format!("Record {idx}: {message}"),
        })?;
    }

    Ok(events)
}

fn validate(event: &EventRecord) -> Result<(), String> {
    event.point().map_err(|e| e.to_string())?;

    if !event.magnitude.is_finite() {
        return Err(format!("magnitude {} is not finite", event.magnitude));
    }
    if !event.depth.is_finite() {
        return Err(format!("depth {} is not finite", event.depth));
    }

    Ok(())
}

/// Reads a catalog file, validates it, and inserts every record.
/// Returns the number of events inserted.
///
/// # Errors
///
/// Returns [`DbError`] if the file cannot be read, fails validation, or
/// the insert fails. Nothing is inserted when validation fails.
pub fn import_file(repository: &dyn EventRepository, path: &Path) -> Result<u64, DbError> {
    let contents = std::fs::read_to_string(path)?;
    let events = parse_catalog(&contents)?;
    log::info!("Importing {} events from {}", events.len(), path.display());
    repository.insert_events(&events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DuckDbStore;
    use quake_risk_database_models::EventQuery;

    #[test]
    fn accepts_current_and_legacy_field_names() {
        let json = r#"[
            {"timestamp": 1000, "latitude": -6.2, "longitude": 106.8, "magnitude": 5.0, "depth": 10.0, "severityLabel": 15},
            {"datetime": 2000, "latitude": 3.5, "longitude": 98.6, "magnitude": 4.1, "depth": 33.0, "cluster_label": 4}
        ]"#;
        let events = parse_catalog(json).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].timestamp, 2000);
        assert_eq!(events[1].severity_label.value(), 4);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let json = r#"[
            {"timestamp": 1, "latitude": 0.0, "longitude": 0.0, "magnitude": 1.0, "depth": 1.0, "severityLabel": 1},
            {"timestamp": 2, "latitude": 91.0, "longitude": 0.0, "magnitude": 1.0, "depth": 1.0, "severityLabel": 1}
        ]"#;
        let err = parse_catalog(json).unwrap_err();
        assert!(matches!(err, DbError::Conversion { ref message } if message.starts_with("Record 1")));
    }

    #[test]
    fn rejects_unknown_label() {
        let json = r#"[{"timestamp": 1, "latitude": 0.0, "longitude": 0.0, "magnitude": 1.0, "depth": 1.0, "severityLabel": 16}]"#;
        assert!(matches!(parse_catalog(json), Err(DbError::Json(_))));
    }

    #[test]
    fn imports_file_into_store() {
        let path = std::env::temp_dir().join(format!("quake_risk_import_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"timestamp": 1, "latitude": -6.2, "longitude": 106.8, "magnitude": 5.0, "depth": 10.0, "severityLabel": 15}]"#,
        )
        .unwrap();

        let store = DuckDbStore::open_in_memory().unwrap();
        let inserted = import_file(&store, &path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(store.query(&EventQuery::all()).unwrap().len(), 1);
    }
}
