//! Typed error hierarchy for guildboard.
//!
//! `SequencerError` is the single error type of the library. Every variant
//! maps onto an [`ErrorKind`] so callers can decide on retries and messaging
//! without matching on message strings.

use std::fmt;

use thiserror::Error;

/// Which kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Board,
    Column,
    Task,
    Item,
    Group,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Board => "Board",
            Entity::Column => "Column",
            Entity::Task => "Task",
            Entity::Item => "Item",
            Entity::Group => "Group",
        };
        f.write_str(name)
    }
}

/// Classification of a [`SequencerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidPosition,
    TransactionConflict,
    StoreUnavailable,
    ConstraintViolation,
    InvalidInput,
}

/// Errors from the sequencer, the stores and the record layer.
#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error("Position {requested} is out of range (valid: 0..={max})")]
    InvalidPosition { requested: i64, max: i64 },

    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SequencerError {
    pub fn not_found(entity: Entity, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidPosition { .. } => ErrorKind::InvalidPosition,
            Self::TransactionConflict(_) => ErrorKind::TransactionConflict,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// Only conflicts are worth re-running; everything else fails the same
    /// way on a second attempt.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::TransactionConflict
    }
}

impl From<rusqlite::Error> for SequencerError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                Self::TransactionConflict(err.to_string())
            }
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation(err.to_string()),
            _ => Self::StoreUnavailable(anyhow::Error::new(err)),
        }
    }
}

pub type Result<T, E = SequencerError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = SequencerError::not_found(Entity::Task, 42);
        assert_eq!(err.to_string(), "Task 42 not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(SequencerError::TransactionConflict("busy".into()).is_retryable());
        assert!(!SequencerError::not_found(Entity::Board, 1).is_retryable());
        assert!(
            !SequencerError::InvalidPosition {
                requested: 9,
                max: 2
            }
            .is_retryable()
        );
        assert!(!SequencerError::StoreUnavailable(anyhow::anyhow!("disk gone")).is_retryable());
        assert!(!SequencerError::ConstraintViolation("dup".into()).is_retryable());
    }

    #[test]
    fn invalid_position_carries_bounds() {
        let err = SequencerError::InvalidPosition {
            requested: 7,
            max: 3,
        };
        assert_eq!(err.to_string(), "Position 7 is out of range (valid: 0..=3)");
    }

    #[test]
    fn sqlite_constraint_errors_are_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (p INTEGER UNIQUE); INSERT INTO t VALUES (1);")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES (1)", []).unwrap_err();
        let err = SequencerError::from(err);
        assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    }

    #[test]
    fn other_sqlite_errors_are_store_unavailable() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err = conn.execute("SELECT * FROM missing_table", []).unwrap_err();
        let err = SequencerError::from(err);
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }
}
