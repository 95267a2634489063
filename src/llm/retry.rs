//! HTTP retry policy for model requests
//!
//! Exponential backoff over a fixed number of attempts, retrying only the
//! configured status codes and connection failures. When attempts run out the
//! last response is handed back so the caller can report its status.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::future::retry;
use backoff::ExponentialBackoffBuilder;
use reqwest::{RequestBuilder, Response};
use tracing::warn;

use crate::core::config::RetryConfig;
use crate::core::{Result, TutorError};

/// Build the backoff schedule for a retry policy
pub fn backoff_schedule(policy: &RetryConfig) -> impl Backoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(policy.initial_delay())
        .with_multiplier(policy.exp_base)
        .with_randomization_factor(0.0)
        .with_max_interval(policy.max_delay())
        .with_max_elapsed_time(None)
        .build()
}

/// Send a request, rebuilding and retrying it according to `policy`
pub async fn send_with_retry<F>(policy: &RetryConfig, mut build: F) -> Result<Response>
where
    F: FnMut() -> RequestBuilder,
{
    let attempt = AtomicU32::new(0);
    let max_attempts = policy.attempts.max(1);

    let operation = || {
        let request = build();
        let attempt_no = attempt.fetch_add(1, Ordering::SeqCst) + 1;
        let can_retry = attempt_no < max_attempts;

        async move {
            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if !policy.is_retryable(status) || !can_retry {
                        return Ok(response);
                    }

                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .map(|d| Duration::from_secs(d).min(policy.max_delay()));

                    warn!(
                        "Model request returned {} (attempt {}/{}), retrying",
                        status, attempt_no, max_attempts
                    );
                    Err(backoff::Error::Transient {
                        err: TutorError::model(format!("HTTP {}", status)),
                        retry_after,
                    })
                }
                Err(e) if (e.is_connect() || e.is_timeout()) && can_retry => {
                    warn!(
                        "Model request failed (attempt {}/{}): {}, retrying",
                        attempt_no, max_attempts, e
                    );
                    Err(backoff::Error::transient(TutorError::Http(e)))
                }
                Err(e) => Err(backoff::Error::permanent(TutorError::Http(e))),
            }
        }
    };

    retry(backoff_schedule(policy), operation).await
}
