//! Retry with exponential back-off and jitter for the OpenAI client.

use std::future::Future;
use std::time::Duration;

use crate::error::OpenAiError;

/// Returns `true` for errors worth retrying after a back-off delay:
/// connect failures, timeouts, HTTP 429 and 5xx. Schema violations and
/// malformed payloads are never retried.
pub(crate) fn is_retriable(err: &OpenAiError) -> bool {
    match err {
        OpenAiError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        OpenAiError::Api { status, .. } => *status == 429 || *status >= 500,
        OpenAiError::Deserialize { .. }
        | OpenAiError::SchemaViolation(_)
        | OpenAiError::MissingImage
        | OpenAiError::InvalidImage(_)
        | OpenAiError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors. Delay is `backoff_base_ms × 2^(attempt-1)` ± 25 % jitter, capped
/// at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, OpenAiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OpenAiError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "OpenAI transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn rate_limit_and_server_errors_are_retriable() {
        assert!(is_retriable(&OpenAiError::Api {
            status: 429,
            message: "slow down".into()
        }));
        assert!(is_retriable(&OpenAiError::Api {
            status: 503,
            message: "busy".into()
        }));
        assert!(!is_retriable(&OpenAiError::Api {
            status: 400,
            message: "bad".into()
        }));
    }

    #[test]
    fn schema_violation_is_not_retriable() {
        assert!(!is_retriable(&OpenAiError::SchemaViolation("x".into())));
        assert!(!is_retriable(&OpenAiError::MissingImage));
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(OpenAiError::Api {
                        status: 500,
                        message: "oops".into(),
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<u32, _> = retry_with_backoff(1, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(OpenAiError::Api {
                    status: 502,
                    message: "bad gateway".into(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(OpenAiError::Api { status: 502, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn schema_violation_is_returned_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<u32, _> = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(OpenAiError::SchemaViolation("refused".into()))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
