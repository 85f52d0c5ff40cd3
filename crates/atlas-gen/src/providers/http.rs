//! Shared blocking HTTP plumbing for the network providers

use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 15;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

pub(crate) fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

pub(crate) fn is_retryable_error(e: &ureq::Error) -> bool {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => true,
        ureq::Error::StatusCode(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        _ => false,
    }
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}

/// Run `op` against a fresh agent, retrying transient failures with
/// exponential backoff. The last error is returned unchanged so callers can
/// inspect status codes.
pub(crate) fn call_with_retry<T, F>(mut op: F) -> Result<T, ureq::Error>
where
    F: FnMut(&ureq::Agent) -> Result<T, ureq::Error>,
{
    let agent = build_agent();
    let mut attempt = 0;
    loop {
        match op(&agent) {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) => {
                tracing::debug!(attempt, error = %e, "retrying request");
                sleep_backoff(attempt);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_status_codes() {
        assert!(is_retryable_error(&ureq::Error::StatusCode(503)));
        assert!(is_retryable_error(&ureq::Error::StatusCode(429)));
        assert!(!is_retryable_error(&ureq::Error::StatusCode(404)));
        assert!(is_retryable_error(&ureq::Error::HostNotFound));
    }

    #[test]
    fn test_non_retryable_returns_first_error() {
        let mut calls = 0;
        let result: Result<(), ureq::Error> = call_with_retry(|_| {
            calls += 1;
            Err(ureq::Error::StatusCode(404))
        });
        assert!(matches!(result, Err(ureq::Error::StatusCode(404))));
        assert_eq!(calls, 1);
    }
}
