use std::fmt;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::{
    hooks::Hooks,
    validate::{self, Field},
    AttemptContext, InvalidOption,
};

/// Validated numeric configuration consumed by the retry loop.
///
/// All durations are milliseconds. A value of `0` for `max_delay`,
/// `max_attempts`, `timeout` or `total_timeout` means "unbounded".
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Base wait between attempts.
    pub delay: u64,
    /// Wait before the first attempt.
    pub initial_delay: u64,
    /// Floor for every computed delay after the first.
    pub min_delay: u64,
    /// Ceiling for the computed delay.
    pub max_delay: u64,
    /// Exponential growth multiplier; `0` disables growth.
    pub factor: f64,
    pub max_attempts: u64,
    /// Per-attempt budget.
    pub timeout: u64,
    /// Whole-operation budget.
    pub total_timeout: u64,
    /// Randomize each computed delay within `[min_delay, delay]`.
    pub jitter: bool,
}

/// Unvalidated numeric settings.
///
/// Integers are signed so that negative values reach the validator and are
/// reported instead of wrapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RetrySettings {
    pub delay: Option<i64>,
    pub initial_delay: Option<i64>,
    pub min_delay: Option<i64>,
    pub max_delay: Option<i64>,
    pub factor: Option<f64>,
    pub max_attempts: Option<i64>,
    pub timeout: Option<i64>,
    pub total_timeout: Option<i64>,
    pub jitter: Option<bool>,
}

/// Options for a single [`retry`](crate::retry) invocation.
///
/// Built with chained setters; every field is optional and validated when the
/// loop starts.
///
/// ```
/// use attempt_retry::RetryOptions;
///
/// let options: RetryOptions<String, std::io::Error> = RetryOptions::new()
///     .delay(100)
///     .factor(2.0)
///     .max_delay(1_000)
///     .max_attempts(5)
///     .jitter(true);
/// assert!(options.validate().is_ok());
/// ```
pub struct RetryOptions<T, E> {
    pub(crate) settings: RetrySettings,
    pub(crate) hooks: Hooks<T, E>,
}

impl<T, E> Default for RetryOptions<T, E> {
    fn default() -> Self {
        Self {
            settings: RetrySettings::default(),
            hooks: Hooks::default(),
        }
    }
}

impl<T, E> fmt::Debug for RetryOptions<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hook = |set: bool| if set { "<hook>" } else { "<unset>" };
        f.debug_struct("RetryOptions")
            .field("settings", &self.settings)
            .field("before_attempt", &hook(self.hooks.before_attempt.is_some()))
            .field("handle_error", &hook(self.hooks.handle_error.is_some()))
            .field("handle_timeout", &hook(self.hooks.handle_timeout.is_some()))
            .field(
                "handle_total_timeout",
                &hook(self.hooks.handle_total_timeout.is_some()),
            )
            .field(
                "calculate_delay",
                &hook(self.hooks.calculate_delay.is_some()),
            )
            .finish()
    }
}

impl<T, E> RetryOptions<T, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Three attempts, 200 ms apart.
    pub fn recommended() -> Self {
        Self::new().delay(200).max_attempts(3)
    }

    /// Wraps already-built numeric settings, with no hooks.
    pub fn from_settings(settings: RetrySettings) -> Self {
        Self {
            settings,
            hooks: Hooks::default(),
        }
    }

    /// Reads settings from a JSON object using the camelCase option names
    /// (`delay`, `initialDelay`, `minDelay`, `maxDelay`, `factor`,
    /// `maxAttempts`, `timeout`, `totalTimeout`, `jitter`).
    ///
    /// Unknown keys and `null` values are ignored.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, InvalidOption> {
        let object = value.as_object().ok_or_else(|| InvalidOption {
            field: "options",
            message: "options must be a JSON object".to_owned(),
        })?;

        let mut settings = RetrySettings::default();
        for field in Field::ALL {
            let Some(raw) = object.get(field.name()).filter(|raw| !raw.is_null()) else {
                continue;
            };
            field.apply_json(&mut settings, raw)?;
        }
        Ok(Self::from_settings(settings))
    }

    pub fn from_json_str(input: &str) -> Result<Self, InvalidOption> {
        let value: serde_json::Value =
            serde_json::from_str(input).map_err(|err| InvalidOption {
                field: "options",
                message: format!("options are not valid JSON: {err}"),
            })?;
        Self::from_json(&value)
    }

    /// Reads settings from environment variables named `<prefix>DELAY`,
    /// `<prefix>INITIAL_DELAY`, `<prefix>MIN_DELAY`, `<prefix>MAX_DELAY`,
    /// `<prefix>FACTOR`, `<prefix>MAX_ATTEMPTS`, `<prefix>TIMEOUT`,
    /// `<prefix>TOTAL_TIMEOUT` and `<prefix>JITTER`.
    ///
    /// Missing or empty variables leave the option unset.
    pub fn from_env(prefix: &str) -> Result<Self, InvalidOption> {
        let mut settings = RetrySettings::default();
        for field in Field::ALL {
            let key = format!("{prefix}{}", field.env_suffix());
            let Ok(raw) = std::env::var(&key) else {
                continue;
            };
            if raw.trim().is_empty() {
                continue;
            }
            field.apply_str(&mut settings, raw.trim())?;
        }
        Ok(Self::from_settings(settings))
    }

    pub fn settings(&self) -> &RetrySettings {
        &self.settings
    }

    /// Runs the option validator without starting a loop.
    pub fn validate(&self) -> Result<RetryConfig, InvalidOption> {
        validate::validate_settings(&self.settings)
    }

    pub fn delay(mut self, ms: i64) -> Self {
        self.settings.delay = Some(ms);
        self
    }

    pub fn initial_delay(mut self, ms: i64) -> Self {
        self.settings.initial_delay = Some(ms);
        self
    }

    pub fn min_delay(mut self, ms: i64) -> Self {
        self.settings.min_delay = Some(ms);
        self
    }

    pub fn max_delay(mut self, ms: i64) -> Self {
        self.settings.max_delay = Some(ms);
        self
    }

    pub fn factor(mut self, factor: f64) -> Self {
        self.settings.factor = Some(factor);
        self
    }

    pub fn max_attempts(mut self, attempts: i64) -> Self {
        self.settings.max_attempts = Some(attempts);
        self
    }

    pub fn timeout(mut self, ms: i64) -> Self {
        self.settings.timeout = Some(ms);
        self
    }

    pub fn total_timeout(mut self, ms: i64) -> Self {
        self.settings.total_timeout = Some(ms);
        self
    }

    pub fn jitter(mut self, jitter: bool) -> Self {
        self.settings.jitter = Some(jitter);
        self
    }

    /// Replaces the default delay algorithm. The returned value is used
    /// verbatim, with no floor, ceiling or jitter applied.
    pub fn calculate_delay<H>(mut self, hook: H) -> Self
    where
        H: Fn(&AttemptContext, &RetryConfig) -> u64 + Send + Sync + 'static,
    {
        self.hooks.calculate_delay = Some(Box::new(hook));
        self
    }
}

impl<T, E> RetryOptions<T, E>
where
    T: Send + 'static,
    E: Send + Sync + 'static,
{
    /// Called before every iteration; may call [`AttemptContext::abort`].
    pub fn before_attempt<H>(mut self, hook: H) -> Self
    where
        H: for<'a> Fn(&'a mut AttemptContext) -> BoxFuture<'a, ()> + Send + Sync + 'static,
    {
        self.hooks.before_attempt = Some(Box::new(hook));
        self
    }

    /// Called with every attempt error. Returning `Err` ends the loop with
    /// that error; calling [`AttemptContext::abort`] ends it with the
    /// original error.
    pub fn handle_error<H>(mut self, hook: H) -> Self
    where
        H: for<'a> Fn(&'a E, &'a mut AttemptContext) -> BoxFuture<'a, Result<(), E>>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.handle_error = Some(Box::new(hook));
        self
    }

    /// Produces the loop's result when an attempt exceeds `timeout`.
    pub fn handle_timeout<H>(mut self, hook: H) -> Self
    where
        H: for<'a> Fn(&'a mut AttemptContext) -> BoxFuture<'a, Result<T, E>>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.handle_timeout = Some(Box::new(hook));
        self
    }

    /// Produces the loop's result when the whole operation exceeds
    /// `totalTimeout`.
    pub fn handle_total_timeout<H>(mut self, hook: H) -> Self
    where
        H: for<'a> Fn(&'a mut AttemptContext) -> BoxFuture<'a, Result<T, E>>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.handle_total_timeout = Some(Box::new(hook));
        self
    }
}
