use thiserror::Error;

/// Failures surfaced by the record store. Driver errors never leave the
/// database layer in any other shape.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key")]
    DuplicateKey,
    #[error("record not found")]
    NotFound,
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("query exceeded {0:?}")]
    Timeout(std::time::Duration),
    #[error("storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    pub fn storage(message: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Storage {
            message: message.into(),
            source,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::DuplicateKey,
            _ => StoreError::storage("Database error", e),
        }
    }
}

/// Parses a caller supplied identifier.
pub fn parse_id(id: &str) -> Result<uuid::Uuid, StoreError> {
    uuid::Uuid::parse_str(id.trim()).map_err(|_| StoreError::InvalidIdentifier(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(StoreError::from(sqlx::Error::RowNotFound), StoreError::NotFound));
    }

    #[test]
    fn test_other_errors_map_to_storage() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Storage { .. }));
    }

    #[test]
    fn test_parse_id() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_id("61ba6382df4bec585cf60e60"), Err(StoreError::InvalidIdentifier(_))));
        assert!(matches!(parse_id(""), Err(StoreError::InvalidIdentifier(_))));
    }
}
