use std::time::Duration;

use rand::Rng;

use crate::{AttemptContext, RetryConfig};

/// Suspends the current task for `ms` milliseconds.
pub async fn sleep(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Default delay before the attempt described by `context`.
///
/// Attempt 0 waits `initial_delay`, untouched by floor, ceiling or jitter.
/// Later attempts wait `delay * factor^(attempt_num - 1)` (or plain `delay`
/// when `factor` is 0), clamped to `max_delay`, then either sampled from
/// `[min_delay, clamped]` with jitter or floored at `min_delay` without.
/// A zero `delay` always yields 0.
pub fn default_calculate_delay(context: &AttemptContext, config: &RetryConfig) -> u64 {
    calculate_with(context, config, &mut rand::rng())
}

pub(crate) fn calculate_with<R: Rng + ?Sized>(
    context: &AttemptContext,
    config: &RetryConfig,
    rng: &mut R,
) -> u64 {
    let attempt_num = context.attempt_num();
    if attempt_num == 0 {
        return config.initial_delay;
    }
    if config.delay == 0 {
        return 0;
    }

    let mut raw = if config.factor == 0.0 {
        config.delay as f64
    } else {
        let exponent = i32::try_from(attempt_num - 1).unwrap_or(i32::MAX);
        config.delay as f64 * config.factor.powi(exponent)
    };
    if config.max_delay > 0 {
        raw = raw.min(config.max_delay as f64);
    }

    // Float-to-int `as` saturates, so overflowing growth pins at u64::MAX.
    let raw = raw.round() as u64;
    if config.jitter {
        if config.min_delay >= raw {
            return config.min_delay;
        }
        rng.random_range(config.min_delay..=raw)
    } else {
        raw.max(config.min_delay)
    }
}
