use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for rowbind operations.
///
/// This enum represents all possible error categories that can occur while
/// building or invoking compiled accessors. Each kind describes a specific
/// category of failure, enabling precise error handling.
///
/// # Examples
///
/// ```rust,ignore
/// use rowbind::errors::{RowbindError, ErrorKind, RowbindResult};
///
/// fn example() -> RowbindResult<()> {
///     Err(RowbindError::new("no column matched", ErrorKind::NoMatchedFields))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// The emitter could not bind any attribute/column pair.
    NoMatchedFields,
    /// A handler or type mapping already exists for the key and no force flag was given.
    MappingExists,
    /// Unrecoverable type introspection failure (duplicate mapped names, unusable metadata).
    Metadata,
    /// A value could not be converted to the destination type at invocation time.
    Conversion,
    /// Invalid data type for the requested operation.
    InvalidDataType,
    /// The input failed validation (empty field lists, zero batch size).
    Validation,
    /// The operation is not valid in the current context.
    InvalidOperation,
    /// Internal error (usually indicates a bug).
    Internal,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NoMatchedFields => write!(f, "No matched fields"),
            ErrorKind::MappingExists => write!(f, "Mapping already exists"),
            ErrorKind::Metadata => write!(f, "Metadata error"),
            ErrorKind::Conversion => write!(f, "Conversion error"),
            ErrorKind::InvalidDataType => write!(f, "Invalid data type"),
            ErrorKind::Validation => write!(f, "Validation error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::Internal => write!(f, "Internal error"),
        }
    }
}

/// Custom rowbind error type.
///
/// `RowbindError` encapsulates error information including the error
/// message, kind, and optional cause. It supports error chaining and
/// backtraces for debugging.
///
/// # Type alias
///
/// The `RowbindResult<T>` type alias is equivalent to
/// `Result<T, RowbindError>` and is used throughout the codebase for
/// operations that can fail.
#[derive(Clone)]
pub struct RowbindError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<RowbindError>>,
    backtrace: Atomic<Backtrace>,
}

impl RowbindError {
    /// Creates a new `RowbindError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        RowbindError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `RowbindError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for
    /// debugging.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: RowbindError) -> Self {
        RowbindError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&RowbindError> {
        self.cause.as_deref()
    }
}

impl Display for RowbindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RowbindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for RowbindError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for rowbind operations.
///
/// `RowbindResult<T>` is shorthand for `Result<T, RowbindError>`.
/// All fallible rowbind operations return this type.
pub type RowbindResult<T> = Result<T, RowbindError>;

// From trait implementations for automatic error conversion
impl From<std::num::ParseIntError> for RowbindError {
    fn from(err: std::num::ParseIntError) -> Self {
        RowbindError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::Conversion,
        )
    }
}

impl From<std::num::ParseFloatError> for RowbindError {
    fn from(err: std::num::ParseFloatError) -> Self {
        RowbindError::new(
            &format!("Float parsing error: {}", err),
            ErrorKind::Conversion,
        )
    }
}

impl From<uuid::Error> for RowbindError {
    fn from(err: uuid::Error) -> Self {
        RowbindError::new(
            &format!("Guid parsing error: {}", err),
            ErrorKind::Conversion,
        )
    }
}

impl From<chrono::ParseError> for RowbindError {
    fn from(err: chrono::ParseError) -> Self {
        RowbindError::new(
            &format!("Date/time parsing error: {}", err),
            ErrorKind::Conversion,
        )
    }
}

impl From<String> for RowbindError {
    fn from(msg: String) -> Self {
        RowbindError::new(&msg, ErrorKind::Internal)
    }
}

impl From<&str> for RowbindError {
    fn from(msg: &str) -> Self {
        RowbindError::new(msg, ErrorKind::Internal)
    }
}
