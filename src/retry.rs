use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::{
    delay::{default_calculate_delay, sleep},
    hooks::Hooks,
    AttemptContext, RetryConfig, RetryError, RetryOptions, RetryResult,
};

/// Result of one attempt cycle, before the failure policy runs.
enum Outcome<T, E> {
    /// The loop is over: success, or a timeout path that settled it.
    Settled(RetryResult<T, E>),
    /// The attempt failed and may be retried.
    Failed(E),
}

/// Calls `attempt` until it succeeds, the attempt budget runs out, a timeout
/// fires or a hook aborts.
///
/// Attempts run one at a time. The attempt function receives a snapshot of
/// the [`AttemptContext`] and the validated [`RetryConfig`]; copy what it
/// needs out of them before building its future.
///
/// When a per-attempt or total timeout fires, the in-flight attempt future is
/// dropped and never polled again.
///
/// ```
/// use attempt_retry::{retry, RetryOptions};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let result = retry(
///     |context, _config| {
///         let attempt_num = context.attempt_num();
///         async move {
///             if attempt_num < 2 {
///                 Err(format!("attempt {attempt_num} failed"))
///             } else {
///                 Ok(attempt_num)
///             }
///         }
///     },
///     RetryOptions::new().delay(10).max_attempts(5),
/// )
/// .await;
/// assert_eq!(result.ok(), Some(2));
/// # }
/// ```
pub async fn retry<T, E, F, Fut>(attempt: F, options: RetryOptions<T, E>) -> RetryResult<T, E>
where
    F: FnMut(&AttemptContext, &RetryConfig) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let config = options.validate()?;
    Orchestrator {
        config,
        hooks: options.hooks,
    }
    .run(attempt)
    .await
}

/// [`retry`] with every option left at its default.
pub async fn retry_with_defaults<T, E, F, Fut>(attempt: F) -> RetryResult<T, E>
where
    F: FnMut(&AttemptContext, &RetryConfig) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry(attempt, RetryOptions::default()).await
}

struct Orchestrator<T, E> {
    config: RetryConfig,
    hooks: Hooks<T, E>,
}

impl<T, E> Orchestrator<T, E> {
    async fn run<F, Fut>(&self, mut attempt: F) -> RetryResult<T, E>
    where
        F: FnMut(&AttemptContext, &RetryConfig) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let deadline = match self.config.total_timeout {
            0 => None,
            ms => Instant::now().checked_add(Duration::from_millis(ms)),
        };
        let mut context = AttemptContext::new(self.config.max_attempts);

        loop {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                attempt_num = context.attempt_num(),
                attempts_remaining = ?context.attempts_remaining(),
                "starting retry iteration"
            );

            if let Some(hook) = &self.hooks.before_attempt {
                hook(&mut context).await;
            }
            if context.is_aborted() {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt_num = context.attempt_num(), "aborted before attempt");
                return Err(RetryError::AttemptAborted);
            }

            let delay_ms = self.delay_for(&context);
            if delay_ms > 0 {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt_num = context.attempt_num(),
                    delay_ms,
                    "waiting before attempt"
                );

                if !Self::pause(delay_ms, deadline).await {
                    return self.total_timeout(&mut context).await;
                }
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return self.total_timeout(&mut context).await;
            }

            let cycle = self.attempt_cycle(&mut attempt, &mut context);
            let outcome = match deadline {
                Some(deadline) => {
                    let raced = tokio::time::timeout_at(deadline, cycle).await;
                    match raced {
                        Ok(outcome) => outcome,
                        Err(_) => return self.total_timeout(&mut context).await,
                    }
                }
                None => cycle.await,
            };

            let err = match outcome {
                Outcome::Settled(result) => return result,
                Outcome::Failed(err) => err,
            };

            #[cfg(feature = "tracing")]
            tracing::debug!(attempt_num = context.attempt_num(), "attempt failed");

            if let Some(hook) = &self.hooks.handle_error {
                if let Err(replacement) = hook(&err, &mut context).await {
                    return Err(RetryError::Attempt(replacement));
                }
                if context.is_aborted() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt_num = context.attempt_num(), "aborted by error hook");
                    return Err(RetryError::Aborted(err));
                }
            }

            if context.attempts_remaining() == Some(0) {
                return Err(RetryError::Attempt(err));
            }
            context.advance();
        }
    }

    fn delay_for(&self, context: &AttemptContext) -> u64 {
        match &self.hooks.calculate_delay {
            Some(hook) => hook(context, &self.config),
            None => default_calculate_delay(context, &self.config),
        }
    }

    /// Sleeps for `delay_ms`, returning `false` if the deadline passed first.
    async fn pause(delay_ms: u64, deadline: Option<Instant>) -> bool {
        match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, sleep(delay_ms))
                .await
                .is_ok(),
            None => {
                sleep(delay_ms).await;
                true
            }
        }
    }

    /// Runs one attempt under the per-attempt timeout.
    async fn attempt_cycle<F, Fut>(
        &self,
        attempt: &mut F,
        context: &mut AttemptContext,
    ) -> Outcome<T, E>
    where
        F: FnMut(&AttemptContext, &RetryConfig) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let pending = attempt(&*context, &self.config);
        if self.config.timeout == 0 {
            return match pending.await {
                Ok(value) => Outcome::Settled(Ok(value)),
                Err(err) => Outcome::Failed(err),
            };
        }

        let limit = Duration::from_millis(self.config.timeout);
        match tokio::time::timeout(limit, pending).await {
            Ok(Ok(value)) => Outcome::Settled(Ok(value)),
            Ok(Err(err)) => Outcome::Failed(err),
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt_num = context.attempt_num(),
                    timeout_ms = self.config.timeout,
                    "attempt timed out"
                );

                let settled = match &self.hooks.handle_timeout {
                    Some(hook) => hook(context).await.map_err(RetryError::Attempt),
                    None => Err(RetryError::AttemptTimeout {
                        attempt_num: context.attempt_num(),
                        timeout_ms: self.config.timeout,
                    }),
                };
                Outcome::Settled(settled)
            }
        }
    }

    async fn total_timeout(&self, context: &mut AttemptContext) -> RetryResult<T, E> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt_num = context.attempt_num(),
            total_timeout_ms = self.config.total_timeout,
            "total timeout reached"
        );

        match &self.hooks.handle_total_timeout {
            Some(hook) => hook(context).await.map_err(RetryError::Attempt),
            None => Err(RetryError::TotalTimeout {
                total_timeout_ms: self.config.total_timeout,
            }),
        }
    }
}
