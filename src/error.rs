//! Error types for opentdb-import
//!
//! The importer distinguishes three failure scopes:
//! - [`TokenAcquisitionError`]: the session token could not be obtained; fatal for the run
//! - [`FetchError`]: a count or batch request failed; aborts the current category only
//! - [`PersistError`]: a single question could not be stored; logged and skipped
//!
//! Everything else (configuration, database lifecycle, I/O) surfaces through [`Error`].

use thiserror::Error;

/// Result type alias for opentdb-import operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for opentdb-import
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "import.page_size")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The token endpoint refused or failed to issue a session token
    #[error("token acquisition failed: {0}")]
    TokenAcquisition(#[from] TokenAcquisitionError),

    /// A count or batch request failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// A single question could not be persisted
    #[error("persist failed: {0}")]
    Persist(#[from] PersistError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),

    /// Constraint violation (e.g., duplicate key)
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Failures of the token endpoint (`api_token.php`)
#[derive(Debug, Error)]
pub enum TokenAcquisitionError {
    /// Token endpoint answered with a non-success HTTP status
    #[error("token endpoint returned HTTP {status}")]
    HttpStatus {
        /// The HTTP status code received
        status: u16,
    },

    /// Token endpoint answered with a non-zero response code
    #[error("token endpoint returned response code {code}")]
    ResponseCode {
        /// The API response code received
        code: i64,
    },

    /// Response was successful but carried no token
    #[error("token endpoint returned no token")]
    MissingToken,

    /// Request could not be completed (connect, timeout, undecodable body)
    #[error("token request failed: {message}")]
    Transport {
        /// Underlying transport error
        message: String,
        /// Whether the failure was a timeout or connection failure
        transient: bool,
    },
}

/// Failures of the count (`api_count.php`) and batch (`api.php`) endpoints
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be sent or the connection failed
    #[error("request to {endpoint} failed: {message}")]
    Transport {
        /// The endpoint that was being called
        endpoint: String,
        /// Underlying transport error
        message: String,
        /// Whether the failure was a connection failure worth retrying
        transient: bool,
    },

    /// Request did not complete within the configured timeout
    #[error("request to {endpoint} timed out")]
    Timeout {
        /// The endpoint that was being called
        endpoint: String,
    },

    /// Endpoint answered with a non-success HTTP status
    #[error("{endpoint} returned HTTP {status}")]
    HttpStatus {
        /// The endpoint that was being called
        endpoint: String,
        /// The HTTP status code received
        status: u16,
    },

    /// Batch endpoint answered with a response code the importer does not handle
    #[error("category {category_id}: unexpected response code {code} ({meaning})")]
    ResponseCode {
        /// The OpenTDB category being fetched
        category_id: i64,
        /// The API response code received
        code: i64,
        /// Documented meaning of the code
        meaning: &'static str,
    },

    /// Response body could not be decoded
    #[error("invalid response from {endpoint}: {message}")]
    Decode {
        /// The endpoint that was being called
        endpoint: String,
        /// Decoder error message
        message: String,
    },
}

/// Failures while storing a single question
#[derive(Debug, Error)]
pub enum PersistError {
    /// The API item is missing required content or carries an unknown type
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// The persistence layer rejected one of the upsert steps
    #[error("{step} failed: {message}")]
    Store {
        /// Which upsert step failed (e.g., "resolve difficulty")
        step: &'static str,
        /// Underlying error message
        message: String,
    },
}

impl Error {
    /// Machine-readable error code, used in run summaries
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) | Error::Sqlx(_) => "database_error",
            Error::TokenAcquisition(_) => "token_acquisition_error",
            Error::Fetch(FetchError::Timeout { .. }) => "fetch_timeout",
            Error::Fetch(_) => "fetch_error",
            Error::Persist(_) => "persist_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::Other(_) => "internal_error",
        }
    }

    /// Whether this error must stop the whole multi-category run
    ///
    /// Only token acquisition failures are run-fatal; fetch failures abort a
    /// single category and the run moves on.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, Error::TokenAcquisition(_))
    }
}

impl FetchError {
    /// Build a fetch error from a reqwest failure, separating timeouts
    pub(crate) fn from_reqwest(endpoint: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else if e.is_decode() {
            FetchError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }
        } else {
            FetchError::Transport {
                endpoint: endpoint.to_string(),
                transient: e.is_connect(),
                message: e.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for TokenAcquisitionError {
    fn from(e: reqwest::Error) -> Self {
        TokenAcquisitionError::Transport {
            transient: e.is_timeout() || e.is_connect(),
            message: e.to_string(),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn all_error_variants() -> Vec<(Error, &'static str)> {
        vec![
            (
                Error::Config {
                    message: "bad value".into(),
                    key: Some("import.page_size".into()),
                },
                "config_error",
            ),
            (
                Error::Database(DatabaseError::QueryFailed("locked".into())),
                "database_error",
            ),
            (
                Error::TokenAcquisition(TokenAcquisitionError::MissingToken),
                "token_acquisition_error",
            ),
            (
                Error::Fetch(FetchError::Timeout {
                    endpoint: "api.php".into(),
                }),
                "fetch_timeout",
            ),
            (
                Error::Fetch(FetchError::ResponseCode {
                    category_id: 9,
                    code: 2,
                    meaning: "invalid parameter",
                }),
                "fetch_error",
            ),
            (
                Error::Persist(PersistError::InvalidItem("empty question".into())),
                "persist_error",
            ),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                "io_error",
            ),
            (Error::Other("unknown".into()), "internal_error"),
        ]
    }

    #[test]
    fn test_error_codes() {
        for (error, expected) in all_error_variants() {
            assert_eq!(error.error_code(), expected, "wrong code for {error}");
        }
    }

    #[test]
    fn test_only_token_errors_are_fatal_for_run() {
        for (error, code) in all_error_variants() {
            assert_eq!(
                error.is_fatal_for_run(),
                code == "token_acquisition_error",
                "unexpected fatality for {error}"
            );
        }
    }

    #[test]
    fn test_display_carries_context() {
        let err = Error::Fetch(FetchError::ResponseCode {
            category_id: 23,
            code: 3,
            meaning: "token not found",
        });
        let msg = err.to_string();
        assert!(msg.contains("category 23"), "got: {msg}");
        assert!(msg.contains("response code 3"), "got: {msg}");

        let err = Error::Persist(PersistError::Store {
            step: "resolve difficulty",
            message: "disk I/O error".into(),
        });
        assert_eq!(
            err.to_string(),
            "persist failed: resolve difficulty failed: disk I/O error"
        );
    }
}
