// ABOUTME: Retry policy for page fetches: backoff table, attempt state machine and retry classification.
// ABOUTME: Kept free of I/O so attempt ordering and cancellation gating can be unit tested directly.

use std::error::Error;
use std::time::Duration;

use crate::error::{ErrorCode, ExtractError};

/// Backoff delays between attempts. `n` delays allow `n + 1` attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    backoff: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: vec![Duration::from_millis(500), Duration::from_millis(1000)],
        }
    }
}

impl RetryPolicy {
    pub fn new(backoff: Vec<Duration>) -> Self {
        Self { backoff }
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            backoff: Vec::new(),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.backoff.len() + 1
    }

    /// Delay to wait before attempt number `attempt` (zero-based).
    pub fn backoff_before(&self, attempt: usize) -> Option<Duration> {
        attempt
            .checked_sub(1)
            .and_then(|i| self.backoff.get(i).copied())
    }
}

/// The transition a fetch loop should take next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Issue attempt number `n` (zero-based).
    Attempt(usize),
    /// Sleep before the next attempt.
    Backoff(Duration),
    /// The token was cancelled; stop without further requests.
    Cancelled,
    /// Every attempt has been used.
    Exhausted,
}

/// Attempt counter driving the fetch loop.
///
/// Every transition takes the cancellation state observed at that moment, so
/// both the pre-sleep and the pre-attempt edges are gated on it.
#[derive(Debug)]
pub struct RetryState<'a> {
    policy: &'a RetryPolicy,
    next_attempt: usize,
    backoff_done: bool,
}

impl<'a> RetryState<'a> {
    pub fn new(policy: &'a RetryPolicy) -> Self {
        Self {
            policy,
            next_attempt: 0,
            backoff_done: false,
        }
    }

    pub fn next(&mut self, cancelled: bool) -> RetryStep {
        if cancelled {
            return RetryStep::Cancelled;
        }
        if self.next_attempt >= self.policy.max_attempts() {
            return RetryStep::Exhausted;
        }
        if !self.backoff_done {
            if let Some(delay) = self.policy.backoff_before(self.next_attempt) {
                self.backoff_done = true;
                return RetryStep::Backoff(delay);
            }
        }
        let attempt = self.next_attempt;
        self.next_attempt += 1;
        self.backoff_done = false;
        RetryStep::Attempt(attempt)
    }
}

/// Whether a failed attempt is worth repeating.
///
/// Network failures, timeouts and errors that carry no classification are
/// retried; every other classified error is final.
pub fn should_retry(err: &(dyn Error + 'static)) -> bool {
    match err.downcast_ref::<ExtractError>() {
        Some(e) => matches!(e.code, ErrorCode::NetworkFailure | ErrorCode::Timeout),
        None => true,
    }
}

/// Final error once the budget is spent, keeping the last error's classification.
pub(crate) fn exhausted(url: &str, last: Option<ExtractError>) -> ExtractError {
    match last {
        Some(last) => {
            let source = match last.source {
                Some(src) => src.context("max retries exceeded"),
                None => anyhow::anyhow!("max retries exceeded: {}", last.code),
            };
            ExtractError::new(last.code, url, "Fetch", Some(source))
        }
        None => ExtractError::network(url, "Fetch", Some(anyhow::anyhow!("max retries exceeded"))),
    }
}
