use std::fmt;

/// A configuration value rejected before any attempt runs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InvalidOption {
    /// Name of the offending option, as spelled in the configuration surface.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

impl InvalidOption {
    pub(crate) fn integer(field: &'static str) -> Self {
        Self {
            field,
            message: format!("Value for {field} must be an integer greater than or equal to 0"),
        }
    }

    pub(crate) fn number(field: &'static str) -> Self {
        Self {
            field,
            message: format!("Value for {field} must be a number greater than or equal to 0"),
        }
    }

    pub(crate) fn boolean(field: &'static str) -> Self {
        Self {
            field,
            message: format!("Value for {field} must be a boolean"),
        }
    }

    pub(crate) fn min_delay_exceeds_delay(min_delay: u64, delay: u64) -> Self {
        Self {
            field: "minDelay",
            message: format!(
                "delay cannot be less than minDelay (delay: {delay}, minDelay: {min_delay})"
            ),
        }
    }
}

/// Stable identifier for each failure kind, for programmatic branching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidOption,
    AttemptTimeout,
    TotalTimeout,
    AttemptAborted,
    AttemptFailed,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidOption => "INVALID_OPTION",
            Self::AttemptTimeout => "ATTEMPT_TIMEOUT",
            Self::TotalTimeout => "TOTAL_TIMEOUT",
            Self::AttemptAborted => "ATTEMPT_ABORTED",
            Self::AttemptFailed => "ATTEMPT_FAILED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type returned by [`retry`](crate::retry).
///
/// `E` is the error type of the attempt function and of the hooks that may
/// replace it.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The configuration was rejected; no attempt was made.
    #[error(transparent)]
    InvalidOption(#[from] InvalidOption),
    /// An attempt exceeded the per-attempt timeout and no `handleTimeout`
    /// hook was configured.
    #[error("retry timeout (attempt: {attempt_num}, timeout: {timeout_ms} ms)")]
    AttemptTimeout { attempt_num: u64, timeout_ms: u64 },
    /// The whole operation exceeded `totalTimeout` and no
    /// `handleTotalTimeout` hook was configured.
    #[error("total timeout (totalTimeout: {total_timeout_ms} ms)")]
    TotalTimeout { total_timeout_ms: u64 },
    /// `beforeAttempt` aborted the loop.
    #[error("attempt aborted")]
    AttemptAborted,
    /// `handleError` aborted the loop; carries the error that was being handled.
    #[error("{0}")]
    Aborted(E),
    /// Error from the attempt function, or a replacement raised by a hook.
    #[error("{0}")]
    Attempt(E),
}

impl<E> RetryError<E> {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidOption(_) => ErrorCode::InvalidOption,
            Self::AttemptTimeout { .. } => ErrorCode::AttemptTimeout,
            Self::TotalTimeout { .. } => ErrorCode::TotalTimeout,
            Self::AttemptAborted | Self::Aborted(_) => ErrorCode::AttemptAborted,
            Self::Attempt(_) => ErrorCode::AttemptFailed,
        }
    }

    /// Returns `true` when the loop ended because a hook called
    /// [`AttemptContext::abort`](crate::AttemptContext::abort).
    pub fn is_aborted(&self) -> bool {
        self.code() == ErrorCode::AttemptAborted
    }

    /// Borrows the caller's error, if this failure carries one.
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::Aborted(err) | Self::Attempt(err) => Some(err),
            _ => None,
        }
    }

    /// Consumes the error and returns the caller's error, if any.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Aborted(err) | Self::Attempt(err) => Some(err),
            _ => None,
        }
    }
}
