use super::{GenerationClient, GenerationError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Timeout and retry settings applied to every generation call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Upper bound on a single attempt.
    pub timeout: Duration,
    /// Additional attempts after the first one for transient failures.
    pub max_retries: u32,
    /// Delay before the first retry; doubled after each attempt.
    pub initial_backoff: Duration,
}

/// Decorator that bounds each call with a timeout and retries transient failures.
pub struct ResilientClient {
    inner: Arc<dyn GenerationClient>,
    policy: RetryPolicy,
}

impl ResilientClient {
    /// Wrap `inner` with the supplied policy.
    pub fn new(inner: Arc<dyn GenerationClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl GenerationClient for ResilientClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut backoff = self.policy.initial_backoff;
        let mut attempt = 0u32;
        loop {
            let result = match tokio::time::timeout(self.policy.timeout, self.inner.generate(prompt))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(GenerationError::Timeout(self.policy.timeout)),
            };

            match result {
                Ok(text) => return Ok(text),
                Err(error) if error.is_transient() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        error = %error,
                        attempt,
                        max_retries = self.policy.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Generation call failed; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedClient {
        responses: Mutex<Vec<Result<String, GenerationError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        fn new(mut responses: Vec<Result<String, GenerationError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerationClient for ScriptedClient {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("fallback".into()))
        }
    }

    struct StallingClient;

    #[async_trait]
    impl GenerationClient for StallingClient {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".into())
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(50),
            max_retries,
            initial_backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let inner = Arc::new(ScriptedClient::new(vec![
            Err(GenerationError::Unavailable("connection reset".into())),
            Err(GenerationError::Rejected {
                status: 503,
                message: "overloaded".into(),
            }),
            Ok("done".into()),
        ]));
        let client = ResilientClient::new(inner.clone(), policy(2));

        let text = client.generate("prompt").await.expect("eventual success");

        assert_eq!(text, "done");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_failures() {
        let inner = Arc::new(ScriptedClient::new(vec![Err(GenerationError::Rejected {
            status: 400,
            message: "bad request".into(),
        })]));
        let client = ResilientClient::new(inner.clone(), policy(3));

        let error = client.generate("prompt").await.expect_err("permanent");

        assert!(matches!(error, GenerationError::Rejected { status: 400, .. }));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_retry_budget() {
        let inner = Arc::new(ScriptedClient::new(vec![
            Err(GenerationError::Unavailable("a".into())),
            Err(GenerationError::Unavailable("b".into())),
        ]));
        let client = ResilientClient::new(inner.clone(), policy(1));

        let error = client.generate("prompt").await.expect_err("exhausted");

        assert!(matches!(error, GenerationError::Unavailable(message) if message == "b"));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stalled_calls_time_out() {
        let client = ResilientClient::new(Arc::new(StallingClient), policy(0));

        let error = client.generate("prompt").await.expect_err("timeout");

        assert!(matches!(error, GenerationError::Timeout(_)));
    }
}
