//! Optional caller-supplied strategies.
//!
//! Every hook is an optional boxed function; an unset hook means "no-op" or
//! "use the default algorithm". Async hooks borrow the [`AttemptContext`] for
//! the duration of their future, so they can call
//! [`AttemptContext::abort`] but cannot hold on to the context afterwards.

use futures::future::BoxFuture;

use crate::{AttemptContext, RetryConfig};

/// `beforeAttempt(context)`, awaited before each iteration's delay.
pub type BeforeAttemptHook =
    Box<dyn for<'a> Fn(&'a mut AttemptContext) -> BoxFuture<'a, ()> + Send + Sync>;

/// `handleError(error, context)`. Returning `Err` replaces the attempt error
/// and ends the loop.
pub type HandleErrorHook<E> = Box<
    dyn for<'a> Fn(&'a E, &'a mut AttemptContext) -> BoxFuture<'a, Result<(), E>> + Send + Sync,
>;

/// `handleTimeout(context)` and `handleTotalTimeout(context)`. Their outcome
/// becomes the outcome of the whole loop.
pub type FallbackHook<T, E> =
    Box<dyn for<'a> Fn(&'a mut AttemptContext) -> BoxFuture<'a, Result<T, E>> + Send + Sync>;

/// `calculateDelay(context, config)`, replacing the default algorithm.
pub type CalculateDelayHook = Box<dyn Fn(&AttemptContext, &RetryConfig) -> u64 + Send + Sync>;

pub(crate) struct Hooks<T, E> {
    pub(crate) before_attempt: Option<BeforeAttemptHook>,
    pub(crate) handle_error: Option<HandleErrorHook<E>>,
    pub(crate) handle_timeout: Option<FallbackHook<T, E>>,
    pub(crate) handle_total_timeout: Option<FallbackHook<T, E>>,
    pub(crate) calculate_delay: Option<CalculateDelayHook>,
}

impl<T, E> Default for Hooks<T, E> {
    fn default() -> Self {
        Self {
            before_attempt: None,
            handle_error: None,
            handle_timeout: None,
            handle_total_timeout: None,
            calculate_delay: None,
        }
    }
}
