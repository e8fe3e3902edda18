//! `attempt-retry` repeatedly runs an async unit of work until it succeeds.
//!
//! The loop is driven by [`retry`] and configured with [`RetryOptions`]:
//! - inter-attempt delay with exponential `factor`, `min_delay`/`max_delay`
//!   bounds and optional jitter ([`default_calculate_delay`])
//! - a per-attempt `timeout` and a whole-operation `total_timeout`
//! - optional hooks (`before_attempt`, `handle_error`, `handle_timeout`,
//!   `handle_total_timeout`, `calculate_delay`) that observe or steer the
//!   loop through the shared [`AttemptContext`]

mod context;
mod delay;
mod error;
pub mod hooks;
mod options;
mod retry;
mod validate;

pub use context::AttemptContext;
pub use delay::{default_calculate_delay, sleep};
pub use error::{ErrorCode, InvalidOption, RetryError};
pub use options::{RetryConfig, RetryOptions, RetrySettings};
pub use retry::{retry, retry_with_defaults};
pub use validate::validate_settings;

pub type RetryResult<T, E> = std::result::Result<T, RetryError<E>>;
