use std::path::PathBuf;

use thiserror::Error;

use crate::lifecycle::Stage;

#[derive(Debug, Error)]
pub enum ObrasError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Could not decode {} as {encoding}: {detail}", .path.display())]
    Encoding {
        path: PathBuf,
        encoding: String,
        detail: String,
    },

    #[error("Input file is empty: {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("Could not open database {}: {source}", .path.display())]
    StorageConnection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[source] rusqlite::Error),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot {action} a work order in stage {}", stage_label(.stage))]
    InvalidTransition {
        action: &'static str,
        stage: Option<Stage>,
    },

    #[error("Work order not found: {0}")]
    WorkOrderNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ObrasError {
    /// True for bad field values and stage-guard violations, the errors an
    /// interactive caller can recover from by asking again.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ObrasError::Validation(_) | ObrasError::InvalidTransition { .. }
        )
    }
}

// Constraint violations are split out so bulk loads can tell a duplicate
// lookup row apart from a broken database.
impl From<rusqlite::Error> for ObrasError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                ObrasError::Integrity(
                    message
                        .clone()
                        .unwrap_or_else(|| "constraint violation".to_string()),
                )
            }
            _ => ObrasError::Storage(err),
        }
    }
}

fn stage_label(stage: &Option<Stage>) -> String {
    match stage {
        Some(stage) => stage.to_string(),
        None => "UNSET".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_display() {
        let err = ObrasError::InvalidTransition {
            action: "award",
            stage: Some(Stage::New),
        };
        assert_eq!(err.to_string(), "Cannot award a work order in stage NEW");

        let err = ObrasError::InvalidTransition {
            action: "finish",
            stage: None,
        };
        assert_eq!(err.to_string(), "Cannot finish a work order in stage UNSET");
    }

    #[test]
    fn validation_class() {
        assert!(ObrasError::Validation("bad".into()).is_validation());
        assert!(
            ObrasError::InvalidTransition {
                action: "rescind",
                stage: Some(Stage::Finished),
            }
            .is_validation()
        );
        assert!(!ObrasError::Integrity("dup".into()).is_validation());
    }

    #[test]
    fn constraint_violation_maps_to_integrity() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: ObrasError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, ObrasError::Integrity(_)));
    }

    #[test]
    fn other_sqlite_errors_map_to_storage() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: ObrasError = conn
            .execute("INSERT INTO missing VALUES (1)", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, ObrasError::Storage(_)));
    }
}
