/// Per-invocation attempt state, shared with hooks.
///
/// One context is created for every call to [`retry`](crate::retry) and
/// mutated in place as the loop advances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptContext {
    attempt_num: u64,
    max_attempts: u64,
    aborted: bool,
}

impl AttemptContext {
    /// Creates the context for attempt 0. `max_attempts == 0` means unbounded.
    pub fn new(max_attempts: u64) -> Self {
        Self {
            attempt_num: 0,
            max_attempts,
            aborted: false,
        }
    }

    /// Number of attempts already made (0 for the first attempt).
    pub fn attempt_num(&self) -> u64 {
        self.attempt_num
    }

    /// Attempts left after the current one, or `None` when unbounded.
    pub fn attempts_remaining(&self) -> Option<u64> {
        (self.max_attempts > 0).then(|| {
            self.max_attempts
                .saturating_sub(self.attempt_num)
                .saturating_sub(1)
        })
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Stops the loop before its next attempt. Calling it again has no effect.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub(crate) fn advance(&mut self) {
        self.attempt_num += 1;
    }

    #[cfg(test)]
    pub(crate) fn at_attempt(attempt_num: u64, max_attempts: u64) -> Self {
        Self {
            attempt_num,
            max_attempts,
            aborted: false,
        }
    }
}
