use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for Quarry operations
///
/// This enum represents all possible error types that can occur while
/// normalizing and merging criteria or options documents. Each error kind
/// describes a specific category of failure, enabling precise error handling.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::errors::{QuarryError, ErrorKind, QuarryResult};
///
/// fn example() -> QuarryResult<()> {
///     Err(QuarryError::new("not a valid object id", ErrorKind::InvalidId))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // ID Errors - raised when an identifier string fails strict parsing
    /// The provided ID is invalid
    InvalidId,

    // Validation Errors - raised on rejected caller input
    /// Generic validation error
    ValidationError,
    /// Invalid data type for operation
    InvalidDataType,

    // Merge Errors - raised when two documents cannot be conjoined
    /// The two values at a key have structurally incompatible shapes
    IncompatibleMerge,

    // Generic/Internal Errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::InvalidDataType => write!(f, "Invalid data type"),
            ErrorKind::IncompatibleMerge => write!(f, "Incompatible merge"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom Quarry error type.
///
/// `QuarryError` encapsulates error information including the error message,
/// kind, and optional cause. It supports error chaining and backtraces for
/// debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::errors::{QuarryError, ErrorKind};
///
/// // Create a simple error
/// let err = QuarryError::new("object_ids must be an array", ErrorKind::ValidationError);
///
/// // Create an error with a cause
/// let cause = QuarryError::new("not hex", ErrorKind::InvalidId);
/// let err = QuarryError::new_with_cause("cannot convert field", ErrorKind::ValidationError, cause);
/// ```
///
/// # Type alias
///
/// The `QuarryResult<T>` type alias is equivalent to `Result<T, QuarryError>`
/// and is used throughout the codebase for operations that can fail.
#[derive(Clone)]
pub struct QuarryError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<QuarryError>>,
    backtrace: Atomic<Backtrace>,
}

impl QuarryError {
    /// Creates a new `QuarryError` with the specified message and error kind.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    ///
    /// # Returns
    ///
    /// A new `QuarryError` instance.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        QuarryError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `QuarryError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for
    /// debugging.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_type` - The category of error
    /// * `cause` - The underlying error that caused this error
    ///
    /// # Returns
    ///
    /// A new `QuarryError` instance with the cause error attached.
    pub fn new_with_cause(message: &str, error_type: ErrorKind, cause: QuarryError) -> Self {
        QuarryError {
            message: message.to_string(),
            error_kind: error_type,
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

    pub fn cause(&self) -> Option<&Box<QuarryError>> {
        self.cause.as_ref()
    }
}

impl Display for QuarryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for QuarryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for QuarryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Quarry operations.
///
/// `QuarryResult<T>` is shorthand for `Result<T, QuarryError>`.
/// All fallible Quarry operations return this type.
pub type QuarryResult<T> = Result<T, QuarryError>;

// From trait implementations for automatic error conversion
impl From<std::fmt::Error> for QuarryError {
    fn from(err: std::fmt::Error) -> Self {
        QuarryError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<std::num::ParseIntError> for QuarryError {
    fn from(err: std::num::ParseIntError) -> Self {
        QuarryError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::InvalidDataType,
        )
    }
}

impl From<std::num::ParseFloatError> for QuarryError {
    fn from(err: std::num::ParseFloatError) -> Self {
        QuarryError::new(
            &format!("Float parsing error: {}", err),
            ErrorKind::InvalidDataType,
        )
    }
}

impl From<String> for QuarryError {
    fn from(msg: String) -> Self {
        QuarryError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for QuarryError {
    fn from(msg: &str) -> Self {
        QuarryError::new(msg, ErrorKind::InternalError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarry_error_new_creates_error() {
        let error = QuarryError::new("An error occurred", ErrorKind::ValidationError);
        assert_eq!(error.message, "An error occurred");
        assert_eq!(error.error_kind, ErrorKind::ValidationError);
        assert!(error.cause.is_none());
    }

    #[test]
    fn quarry_error_new_with_cause_creates_error() {
        let cause = QuarryError::new("not hex", ErrorKind::InvalidId);
        let error = QuarryError::new_with_cause(
            "cannot convert field",
            ErrorKind::ValidationError,
            cause,
        );
        assert_eq!(error.message, "cannot convert field");
        assert_eq!(error.error_kind, ErrorKind::ValidationError);
        assert!(error.cause.is_some());
    }

    #[test]
    fn quarry_error_message_returns_message() {
        let error = QuarryError::new("An error occurred", ErrorKind::InvalidId);
        assert_eq!(error.message(), "An error occurred");
    }

    #[test]
    fn quarry_error_kind_returns_kind() {
        let error = QuarryError::new("An error occurred", ErrorKind::IncompatibleMerge);
        assert_eq!(error.kind(), &ErrorKind::IncompatibleMerge);
    }

    #[test]
    fn quarry_error_cause_returns_none_when_no_cause() {
        let error = QuarryError::new("An error occurred", ErrorKind::InvalidId);
        assert!(error.cause().is_none());
    }

    #[test]
    fn quarry_error_display_formats_correctly() {
        let error = QuarryError::new("An error occurred", ErrorKind::InvalidId);
        let formatted = format!("{}", error);
        assert_eq!(formatted, "An error occurred");
    }

    #[test]
    fn quarry_error_debug_formats_with_cause() {
        let cause = QuarryError::new("root cause", ErrorKind::InvalidId);
        let error =
            QuarryError::new_with_cause("An error occurred", ErrorKind::ValidationError, cause);
        let formatted = format!("{:?}", error);
        assert!(formatted.contains("An error occurred"));
        assert!(formatted.contains("Caused by:"));
    }

    #[test]
    fn quarry_error_source_returns_cause() {
        let cause = QuarryError::new("root cause", ErrorKind::InvalidId);
        let error =
            QuarryError::new_with_cause("An error occurred", ErrorKind::ValidationError, cause);
        assert!(error.source().is_some());
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(format!("{}", ErrorKind::InvalidId), "Invalid ID");
        assert_eq!(format!("{}", ErrorKind::ValidationError), "Validation error");
        assert_eq!(format!("{}", ErrorKind::InvalidDataType), "Invalid data type");
        assert_eq!(format!("{}", ErrorKind::IncompatibleMerge), "Incompatible merge");
        assert_eq!(format!("{}", ErrorKind::InternalError), "Internal error");
    }

    #[test]
    fn test_from_parse_int_error() {
        let parse_err = "not_a_number".parse::<i32>().unwrap_err();
        let quarry_err: QuarryError = parse_err.into();

        assert_eq!(quarry_err.kind(), &ErrorKind::InvalidDataType);
        assert!(quarry_err.message().contains("Integer parsing"));
    }

    #[test]
    fn test_from_str() {
        let quarry_err: QuarryError = "string error".into();

        assert_eq!(quarry_err.kind(), &ErrorKind::InternalError);
        assert_eq!(quarry_err.message(), "string error");
    }

    #[test]
    fn test_question_mark_operator_with_from() {
        fn parse_number_operation() -> QuarryResult<i32> {
            let num: i32 = "12345".parse()?;
            Ok(num)
        }

        let result = parse_number_operation();
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 12345);
    }

    #[test]
    fn test_error_chain_with_different_kinds() {
        let root_cause = QuarryError::new("not a hex string", ErrorKind::InvalidId);
        let top_level = QuarryError::new_with_cause(
            "cannot normalize object id field",
            ErrorKind::ValidationError,
            root_cause,
        );

        assert_eq!(top_level.kind(), &ErrorKind::ValidationError);
        if let Some(cause_box) = top_level.cause() {
            assert_eq!(cause_box.kind(), &ErrorKind::InvalidId);
        }
    }
}
