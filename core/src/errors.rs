use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("PATTERN ERROR: {code} - {message}")]
    Pattern { code: String, message: String },

    #[error("ENVIRONMENT ERROR: {message}")]
    EnvironmentMissing { message: String },

    #[error("ROUTE NOT FOUND: no route matches {method} {path}")]
    RouteNotFound { method: String, path: String },

    #[error("RESOLUTION ERROR: {code} - {message}")]
    HandlerResolution { code: String, message: String },

    #[error("CONFIG ERROR: {code} - {message}")]
    Config { code: String, message: String },

    #[error("PROCESSING ERROR: {code} - {message}")]
    Processing { code: String, message: String },
}

impl ProjectError {
    pub(crate) fn pattern(code: &str, message: impl Into<String>) -> Self {
        ProjectError::Pattern {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn resolution(code: &str, message: impl Into<String>) -> Self {
        ProjectError::HandlerResolution {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn config(code: &str, message: impl Into<String>) -> Self {
        ProjectError::Config {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Error a handler body returns when its own work fails.
    pub fn processing(message: impl Into<String>) -> Self {
        ProjectError::Processing {
            code: error_codes::HANDLER_FAILED.to_string(),
            message: message.into(),
        }
    }

    /// Stable error code, if the variant carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ProjectError::Pattern { code, .. }
            | ProjectError::HandlerResolution { code, .. }
            | ProjectError::Config { code, .. }
            | ProjectError::Processing { code, .. } => Some(code),
            ProjectError::EnvironmentMissing { .. } | ProjectError::RouteNotFound { .. } => None,
        }
    }
}

/// **ROUTING ERROR CODES**
///
/// **MANDATE**: Use these standardized error codes for consistent error reporting.
pub mod error_codes {
    pub const EMPTY_PATTERN: &str = "RUST_CORE_ROUTING_EMPTY_PATTERN";
    pub const CATCH_ALL_NOT_FINAL: &str = "RUST_CORE_ROUTING_CATCH_ALL_NOT_FINAL";
    pub const UNBALANCED_PARENTHESES: &str = "RUST_CORE_ROUTING_UNBALANCED_PARENTHESES";
    pub const UNKNOWN_MODIFIER: &str = "RUST_CORE_ROUTING_UNKNOWN_MODIFIER";
    pub const EMPTY_PARAMETER: &str = "RUST_CORE_ROUTING_EMPTY_PARAMETER";

    pub const DEPENDENCY_NOT_FOUND: &str = "RUST_CORE_ROUTING_DEPENDENCY_NOT_FOUND";
    pub const DEPENDENCY_UNBOUND: &str = "RUST_CORE_ROUTING_DEPENDENCY_UNBOUND";
    pub const ACTION_NOT_FOUND: &str = "RUST_CORE_ROUTING_ACTION_NOT_FOUND";
    pub const CALLABLE_NOT_FOUND: &str = "RUST_CORE_ROUTING_CALLABLE_NOT_FOUND";

    pub const INVALID_HTTP_METHOD: &str = "RUST_CORE_ROUTING_INVALID_HTTP_METHOD";
    pub const INVALID_CONFIG: &str = "RUST_CORE_ROUTING_INVALID_CONFIG";
    pub const CONFIG_IO: &str = "RUST_CORE_ROUTING_CONFIG_IO";

    pub const HANDLER_FAILED: &str = "RUST_CORE_ROUTING_HANDLER_FAILED";
}
