//! The interpreter's typed error boundary.
//!
//! `ErrorCode` is the i32 wire contract a host sees back from `run`/`eval`;
//! `Error` is the richer value propagated internally with `?`. This follows
//! the workspace's existing hand-rolled error style (see
//! `codegen::CodeGenError`) rather than a derive-macro crate: there is no
//! `thiserror` dependency here, by design.

/// Numeric result codes, matching the host-bridge contract exactly.
/// Negative values are failures; zero is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    NoMem = -1,
    Syntax = -2,
    UnknownSym = -3,
    BadArgs = -4,
    TooManyArgs = -5,
    OutOfBounds = -6,
    Stopped = -7,
    /// Internal only: an `if` block ended at `else` rather than `}`. Never
    /// surfaced to a host.
    OkElse = 1,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// An interpreter error: a code, plus (behind the `verbose-errors` feature)
/// a human-readable message. With the feature off, `Error` is exactly the
/// size of the code alone.
#[derive(Debug, Clone)]
pub struct Error {
    code: ErrorCode,
    #[cfg(feature = "verbose-errors")]
    message: Option<String>,
}

impl Error {
    pub fn new(code: ErrorCode) -> Self {
        Error {
            code,
            #[cfg(feature = "verbose-errors")]
            message: None,
        }
    }

    #[cfg(feature = "verbose-errors")]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Error {
            code,
            message: Some(message.into()),
        }
    }

    #[cfg(not(feature = "verbose-errors"))]
    pub fn with_message(code: ErrorCode, _message: impl Into<String>) -> Self {
        Error::new(code)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        #[cfg(feature = "verbose-errors")]
        {
            if let Some(msg) = &self.message {
                return write!(f, "{:?}: {}", self.code, msg);
            }
        }
        write!(f, "{:?}", self.code)
    }
}

impl std::error::Error for Error {}

impl From<ErrorCode> for Error {
    fn from(code: ErrorCode) -> Self {
        Error::new(code)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trips_through_error() {
        let e: Error = ErrorCode::OutOfBounds.into();
        assert_eq!(e.code(), ErrorCode::OutOfBounds);
        assert_eq!(e.code().as_i32(), -6);
    }

    #[test]
    fn ok_else_is_positive_and_internal() {
        assert_eq!(ErrorCode::OkElse.as_i32(), 1);
    }

    #[test]
    fn display_is_non_empty() {
        let e: Error = ErrorCode::Syntax.into();
        assert!(!format!("{e}").is_empty());
    }
}
