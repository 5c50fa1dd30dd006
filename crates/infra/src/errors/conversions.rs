//! Conversions from external infrastructure errors into domain errors.

use duebell_domain::DuebellError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DuebellError);

impl From<InfraError> for DuebellError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DuebellError> for InfraError {
    fn from(value: DuebellError) -> Self {
        InfraError(value)
    }
}

trait IntoDuebellError {
    fn into_duebell(self) -> DuebellError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → DuebellError */
/* -------------------------------------------------------------------------- */

impl IntoDuebellError for SqlError {
    fn into_duebell(self) -> DuebellError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        DuebellError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        DuebellError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 1555 | 2067) => {
                        DuebellError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::CannotOpen, _) => {
                        DuebellError::Database(format!("unable to open database: {message}"))
                    }
                    _ => DuebellError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => DuebellError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                DuebellError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                DuebellError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => DuebellError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => DuebellError::Database("invalid SQL query".into()),
            other => DuebellError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_duebell())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → DuebellError */
/* -------------------------------------------------------------------------- */

impl IntoDuebellError for r2d2::Error {
    fn into_duebell(self) -> DuebellError {
        DuebellError::Database(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_duebell())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DuebellError */
/* -------------------------------------------------------------------------- */

impl IntoDuebellError for HttpError {
    fn into_duebell(self) -> DuebellError {
        if self.is_timeout() {
            return DuebellError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return DuebellError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return status_error(status);
        }

        DuebellError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_duebell())
    }
}

/// Map a non-success HTTP status to a domain error.
pub fn status_error(status: reqwest::StatusCode) -> DuebellError {
    let code = status.as_u16();
    let message = format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

    match code {
        401 | 403 => DuebellError::Auth(message),
        404 => DuebellError::NotFound(message),
        429 => DuebellError::Network(message),
        400..=499 => DuebellError::InvalidInput(message),
        _ => DuebellError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
