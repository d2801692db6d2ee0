//! Error types for the treatment plan API.
//!
//! This module defines the execution-side error taxonomy with SQL Server
//! error code mapping. Validation failures are not part of this taxonomy:
//! they are per-field details handled before the database is ever touched.

use thiserror::Error;

/// Domain errors for everything past input validation.
///
/// Every variant reaches the client as the same generic 500 response; the
/// distinctions exist for the server-side error observer and the logs.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Object not found (procedure, table type, etc.)
    #[error("{object_type} not found: {name}")]
    ObjectNotFound { object_type: String, name: String },

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A value was incompatible with the parameter kind it was bound to.
    /// Propagates like any other execution failure; this layer does no
    /// pre-validation of value shapes.
    #[error("Parameter marshaling failed: {0}")]
    Marshal(String),

    /// Procedure execution error
    #[error("Procedure execution error: {message}")]
    Execution {
        message: String,
        sql_error_code: Option<i32>,
    },

    /// Query timeout
    #[error("Timeout: the stored procedure call did not complete in time")]
    Timeout,

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid input at the SQL boundary (bad identifier, etc.)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection error with a source.
    pub fn connection_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an authentication error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an object not found error.
    pub fn object_not_found(object_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            object_type: object_type.into(),
            name: name.into(),
        }
    }

    /// Create a permission denied error.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a marshaling error.
    pub fn marshal(msg: impl Into<String>) -> Self {
        Self::Marshal(msg.into())
    }

    /// Create a procedure execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution {
            message: msg.into(),
            sql_error_code: None,
        }
    }

    /// Create a procedure execution error carrying the SQL error code.
    pub fn execution_with_code(msg: impl Into<String>, code: i32) -> Self {
        Self::Execution {
            message: msg.into(),
            sql_error_code: Some(code),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Map SQL Server error codes to semantic ServerError types.
pub fn from_sql_error(code: i32, message: &str) -> ServerError {
    match code {
        // Authentication
        18456 => ServerError::auth(format!("Login failed: {}", message)),

        // Object not found
        208 => ServerError::object_not_found("Object", message),
        2812 => ServerError::object_not_found("Stored procedure", message),

        // Permission
        229 | 230 => ServerError::permission_denied(message),

        // Timeout
        -2 => ServerError::Timeout,

        // Connection
        -1 => ServerError::connection("Connection broken"),
        53 => ServerError::connection("Server not found or not accessible"),

        // Constraint violations
        547 => ServerError::ConstraintViolation(message.to_string()),
        2601 | 2627 => ServerError::ConstraintViolation(format!("Duplicate key: {}", message)),

        // Default: generic execution error
        _ => ServerError::execution_with_code(message, code),
    }
}

impl From<tiberius::error::Error> for ServerError {
    fn from(e: tiberius::error::Error) -> Self {
        use tiberius::error::Error;

        match &e {
            Error::Server(token) => from_sql_error(token.code() as i32, token.message()),
            Error::Io { .. } => ServerError::connection(format!("IO error: {}", e)),
            Error::Tls(_) => ServerError::connection(format!("TLS error: {}", e)),
            Error::Routing { .. } => ServerError::connection(format!("Routing error: {}", e)),
            Error::Protocol(_) | Error::Encoding(_) => {
                ServerError::connection(format!("Protocol error: {}", e))
            }
            Error::Conversion(_) => ServerError::execution(format!("Type conversion error: {}", e)),
            _ => ServerError::internal(e.to_string()),
        }
    }
}

impl From<bb8_tiberius::Error> for ServerError {
    fn from(e: bb8_tiberius::Error) -> Self {
        ServerError::connection(format!("Pool error: {}", e))
    }
}

impl From<bb8::RunError<bb8_tiberius::Error>> for ServerError {
    fn from(e: bb8::RunError<bb8_tiberius::Error>) -> Self {
        match e {
            bb8::RunError::User(e) => e.into(),
            bb8::RunError::TimedOut => {
                ServerError::connection("Timed out waiting for a pooled connection")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_error_mapping() {
        let err = from_sql_error(18456, "Login failed for user 'api'");
        assert!(matches!(err, ServerError::Authentication(_)));

        let err = from_sql_error(2812, "Could not find stored procedure 'TreatmentPlanSave'");
        assert!(matches!(err, ServerError::ObjectNotFound { .. }));

        let err = from_sql_error(229, "EXECUTE permission denied");
        assert!(matches!(err, ServerError::PermissionDenied(_)));

        let err = from_sql_error(547, "FK_TreatmentPlan_Patient conflict");
        assert!(matches!(err, ServerError::ConstraintViolation(_)));
    }

    #[test]
    fn test_unmapped_code_keeps_code() {
        let err = from_sql_error(8114, "Error converting data type");
        match err {
            ServerError::Execution { sql_error_code, .. } => {
                assert_eq!(sql_error_code, Some(8114));
            }
            other => panic!("expected Execution, got {:?}", other),
        }
    }

    #[test]
    fn test_marshal_display() {
        let err = ServerError::marshal("invalid date 'notadate' for StartDate");
        assert!(err.to_string().contains("Parameter marshaling failed"));
    }
}
