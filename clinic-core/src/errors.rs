//! # Errors
//!
//! Two layers of errors live here:
//!
//! - [`TenancyError`]: the typed taxonomy of the tenancy core (resolution and
//!   scoped execution). Resolver and executor APIs return it directly so
//!   callers can match on the kind.
//! - [`ClinicError`]: the structured, Feathers-style error that crosses
//!   service boundaries inside `anyhow::Error`. Transports decide how to
//!   serialize it; `to_json()` gives the canonical payload.
//!
//! A `TenancyError` converts into a `ClinicError` losslessly: the original
//! error is kept as the `source` for logs and dropped by
//! [`ClinicError::sanitize_for_client`].

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::Value;
use thiserror::Error;

/// A convenience result type for service APIs.
pub type ClinicResult<T> = std::result::Result<T, AnyError>;

/// Boxed driver error carried as an error source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error class names + status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400
    MissingTenant,    // 400
    NotFound,         // 404
    TenantNotFound,   // 404
    MethodNotAllowed, // 405
    Unprocessable,    // 422
    GeneralError,     // 500
    ResolutionFailed, // 500
    StatementFailed,  // 500
    PoolExhausted,    // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest | ErrorKind::MissingTenant => 400,
            ErrorKind::NotFound | ErrorKind::TenantNotFound => 404,
            ErrorKind::MethodNotAllowed => 405,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError
            | ErrorKind::ResolutionFailed
            | ErrorKind::StatementFailed
            | ErrorKind::PoolExhausted => 500,
        }
    }

    /// Error `name` (e.g. "TenantNotFound")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::MissingTenant => "MissingTenant",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::TenantNotFound => "TenantNotFound",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::ResolutionFailed => "ResolutionFailed",
            ErrorKind::StatementFailed => "StatementFailed",
            ErrorKind::PoolExhausted => "PoolExhausted",
        }
    }

    /// Kebab-cased `className`, doubling as the kind discriminator clients match on.
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::MissingTenant => "missing-tenant",
            ErrorKind::NotFound => "not-found",
            ErrorKind::TenantNotFound => "tenant-not-found",
            ErrorKind::MethodNotAllowed => "method-not-allowed",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::ResolutionFailed => "resolution-failed",
            ErrorKind::StatementFailed => "statement-failed",
            ErrorKind::PoolExhausted => "pool-exhausted",
        }
    }
}

/// Failures of the tenancy core.
#[derive(Debug, Error)]
pub enum TenancyError {
    /// No slug was supplied. Raised before any database access.
    #[error("tenant identifier is missing")]
    MissingTenantIdentifier,

    /// No active registry row matches the slug.
    #[error("tenant not found: {slug}")]
    TenantNotFound { slug: String },

    /// Transient failure while looking the tenant up.
    #[error("tenant resolution failed: {message}")]
    TenantResolutionFailed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The scoped statement itself failed.
    #[error("statement `{statement}` failed in schema {schema}: {message}")]
    StatementExecutionFailed {
        schema: String,
        statement: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// No pooled connection became available in time.
    #[error("no database connection available: {message}")]
    PoolExhausted { message: String },
}

impl TenancyError {
    pub fn resolution_failed(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self::TenantResolutionFailed {
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn statement_failed(
        schema: impl Into<String>,
        statement: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        let source = source.into();
        Self::StatementExecutionFailed {
            schema: schema.into(),
            statement: statement.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn pool_exhausted(message: impl Into<String>) -> Self {
        Self::PoolExhausted {
            message: message.into(),
        }
    }

    /// Resolution failures and pool exhaustion may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TenantResolutionFailed { .. } | Self::PoolExhausted { .. }
        )
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingTenantIdentifier => ErrorKind::MissingTenant,
            Self::TenantNotFound { .. } => ErrorKind::TenantNotFound,
            Self::TenantResolutionFailed { .. } => ErrorKind::ResolutionFailed,
            Self::StatementExecutionFailed { .. } => ErrorKind::StatementFailed,
            Self::PoolExhausted { .. } => ErrorKind::PoolExhausted,
        }
    }
}

/// A structured error that can live inside `anyhow::Error`.
///
/// Fields:
/// - name
/// - message
/// - code (HTTP status)
/// - class_name
/// - data (optional)
/// - errors (optional)
#[derive(Debug)]
pub struct ClinicError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<Value>,
    pub errors: Option<Value>,
    pub source: Option<AnyError>,
}

impl ClinicError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            errors: None,
            source: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it flows through service calls.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `ClinicError` anywhere in an `anyhow::Error` chain.
    pub fn from_anyhow(err: &AnyError) -> Option<&ClinicError> {
        err.chain().find_map(|e| e.downcast_ref::<ClinicError>())
    }

    /// Turn any error into a ClinicError:
    /// - a ClinicError is kept as is
    /// - a bare TenancyError is converted by kind
    /// - anything else becomes a GeneralError
    pub fn normalize(err: AnyError) -> ClinicError {
        let err = match err.downcast::<ClinicError>() {
            Ok(clinic) => return clinic,
            Err(other) => other,
        };
        match err.downcast::<TenancyError>() {
            Ok(tenancy) => tenancy.into(),
            Err(other) => {
                ClinicError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// Copy suitable for returning to clients: the inner `source` is dropped.
    pub fn sanitize_for_client(&self) -> ClinicError {
        ClinicError {
            kind: self.kind,
            message: self.message.clone(),
            data: self.data.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut base = serde_json::json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodNotAllowed, msg)
    }
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl From<TenancyError> for ClinicError {
    fn from(err: TenancyError) -> Self {
        let kind = err.kind();
        let (message, data) = match &err {
            TenancyError::MissingTenantIdentifier => {
                ("Tenant header is required".to_string(), None)
            }
            TenancyError::TenantNotFound { slug } => (
                "Tenant not found".to_string(),
                Some(serde_json::json!({ "slug": slug })),
            ),
            TenancyError::TenantResolutionFailed { .. } => {
                ("Internal error while resolving tenant".to_string(), None)
            }
            TenancyError::StatementExecutionFailed {
                statement, message, ..
            } => (
                format!("Statement {statement} failed: {message}"),
                Some(serde_json::json!({ "statement": statement })),
            ),
            TenancyError::PoolExhausted { .. } => {
                ("No database connection available".to_string(), None)
            }
        };

        let mut out = ClinicError::new(kind, message).with_source(AnyError::new(err));
        out.data = data;
        out
    }
}

impl fmt::Display for ClinicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for ClinicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Convenience helper for "bail with ClinicError".
#[macro_export]
macro_rules! bail_clinic {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::ClinicError::$ctor($msg).into_anyhow())
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::ClinicError::$ctor(format!($fmt, $($arg)*)).into_anyhow())
    };
}
