use crate::{InvalidOption, RetryConfig, RetrySettings};

/// Names every numeric option so that parsing and validation agree on the
/// spelling used in error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Field {
    Delay,
    InitialDelay,
    MinDelay,
    MaxDelay,
    Factor,
    MaxAttempts,
    Timeout,
    TotalTimeout,
    Jitter,
}

impl Field {
    pub(crate) const ALL: [Field; 9] = [
        Field::Delay,
        Field::InitialDelay,
        Field::MinDelay,
        Field::MaxDelay,
        Field::Factor,
        Field::MaxAttempts,
        Field::Timeout,
        Field::TotalTimeout,
        Field::Jitter,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Field::Delay => "delay",
            Field::InitialDelay => "initialDelay",
            Field::MinDelay => "minDelay",
            Field::MaxDelay => "maxDelay",
            Field::Factor => "factor",
            Field::MaxAttempts => "maxAttempts",
            Field::Timeout => "timeout",
            Field::TotalTimeout => "totalTimeout",
            Field::Jitter => "jitter",
        }
    }

    pub(crate) fn env_suffix(self) -> &'static str {
        match self {
            Field::Delay => "DELAY",
            Field::InitialDelay => "INITIAL_DELAY",
            Field::MinDelay => "MIN_DELAY",
            Field::MaxDelay => "MAX_DELAY",
            Field::Factor => "FACTOR",
            Field::MaxAttempts => "MAX_ATTEMPTS",
            Field::Timeout => "TIMEOUT",
            Field::TotalTimeout => "TOTAL_TIMEOUT",
            Field::Jitter => "JITTER",
        }
    }

    fn integer_slot(self, settings: &mut RetrySettings) -> Option<&mut Option<i64>> {
        match self {
            Field::Delay => Some(&mut settings.delay),
            Field::InitialDelay => Some(&mut settings.initial_delay),
            Field::MinDelay => Some(&mut settings.min_delay),
            Field::MaxDelay => Some(&mut settings.max_delay),
            Field::MaxAttempts => Some(&mut settings.max_attempts),
            Field::Timeout => Some(&mut settings.timeout),
            Field::TotalTimeout => Some(&mut settings.total_timeout),
            Field::Factor | Field::Jitter => None,
        }
    }

    pub(crate) fn apply_json(
        self,
        settings: &mut RetrySettings,
        raw: &serde_json::Value,
    ) -> Result<(), InvalidOption> {
        match self {
            Field::Factor => {
                let factor = raw
                    .as_f64()
                    .ok_or_else(|| InvalidOption::number(self.name()))?;
                settings.factor = Some(factor);
            }
            Field::Jitter => {
                let jitter = raw
                    .as_bool()
                    .ok_or_else(|| InvalidOption::boolean(self.name()))?;
                settings.jitter = Some(jitter);
            }
            _ => {
                let value =
                    json_integer(raw).ok_or_else(|| InvalidOption::integer(self.name()))?;
                if let Some(slot) = self.integer_slot(settings) {
                    *slot = Some(value);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn apply_str(
        self,
        settings: &mut RetrySettings,
        raw: &str,
    ) -> Result<(), InvalidOption> {
        match self {
            Field::Factor => {
                let factor = raw
                    .parse::<f64>()
                    .map_err(|_| InvalidOption::number(self.name()))?;
                settings.factor = Some(factor);
            }
            Field::Jitter => {
                let jitter = match raw.to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" | "on" => true,
                    "false" | "0" | "no" | "off" => false,
                    _ => return Err(InvalidOption::boolean(self.name())),
                };
                settings.jitter = Some(jitter);
            }
            _ => {
                let value = raw
                    .parse::<i64>()
                    .map_err(|_| InvalidOption::integer(self.name()))?;
                if let Some(slot) = self.integer_slot(settings) {
                    *slot = Some(value);
                }
            }
        }
        Ok(())
    }
}

/// Accepts JSON integers and integral floats such as `3.0`.
fn json_integer(raw: &serde_json::Value) -> Option<i64> {
    if let Some(value) = raw.as_i64() {
        return Some(value);
    }
    let value = raw.as_f64()?;
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn non_negative(field: Field, value: Option<i64>) -> Result<u64, InvalidOption> {
    match value {
        None => Ok(0),
        Some(value) => u64::try_from(value).map_err(|_| InvalidOption::integer(field.name())),
    }
}

/// Fills defaults and rejects invalid values.
///
/// Individual fields are checked first, in declaration order; the
/// `minDelay <= delay` relation is checked last.
pub fn validate_settings(settings: &RetrySettings) -> Result<RetryConfig, InvalidOption> {
    let delay = non_negative(Field::Delay, settings.delay)?;
    let initial_delay = non_negative(Field::InitialDelay, settings.initial_delay)?;
    let min_delay = non_negative(Field::MinDelay, settings.min_delay)?;
    let max_delay = non_negative(Field::MaxDelay, settings.max_delay)?;
    let max_attempts = non_negative(Field::MaxAttempts, settings.max_attempts)?;
    let timeout = non_negative(Field::Timeout, settings.timeout)?;
    let total_timeout = non_negative(Field::TotalTimeout, settings.total_timeout)?;

    let factor = settings.factor.unwrap_or(0.0);
    if !factor.is_finite() || factor < 0.0 {
        return Err(InvalidOption::number(Field::Factor.name()));
    }

    if min_delay > delay {
        return Err(InvalidOption::min_delay_exceeds_delay(min_delay, delay));
    }

    Ok(RetryConfig {
        delay,
        initial_delay,
        min_delay,
        max_delay,
        factor,
        max_attempts,
        timeout,
        total_timeout,
        jitter: settings.jitter.unwrap_or(false),
    })
}
