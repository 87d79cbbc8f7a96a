//! Outbound user notifications.
//!
//! Delivery is fire-and-forget from the caller's point of view: a failed
//! notification is logged and never fails the operation that triggered it.

use async_trait::async_trait;
use failsafe::futures::CircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use super::retry::RetryPolicy;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: Uuid, title: &str, message: &str, data: Value);
}

/// Default notifier: writes the notification to the log stream.
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, user_id: Uuid, title: &str, message: &str, data: Value) {
        info!(%user_id, title, message, %data, "notification");
    }
}

/// POSTs notifications to an external webhook, behind a circuit breaker so a
/// dead endpoint cannot slow down matching or settlement.
pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
    retry: RetryPolicy,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::Exponential>, ()>,
}

impl WebhookNotifier {
    pub fn new(endpoint: String) -> Self {
        Self::with_circuit_breaker_config(endpoint, 5, Duration::from_secs(60))
    }

    pub fn with_circuit_breaker_config(
        endpoint: String,
        failure_threshold: u32,
        reset_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        let backoff = backoff::exponential(Duration::from_secs(10), reset_timeout);
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        Self {
            client,
            endpoint,
            retry: RetryPolicy::default(),
            circuit_breaker,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Connection problems, timeouts and 5xx responses are worth another try;
/// 4xx responses and an open circuit are not.
fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect()
        || error.is_timeout()
        || error.status().map_or(false, |s| s.is_server_error())
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, user_id: Uuid, title: &str, message: &str, data: Value) {
        let payload = json!({
            "user_id": user_id,
            "title": title,
            "message": message,
            "data": data,
        });

        let result = self
            .retry
            .run(
                || {
                    let client = self.client.clone();
                    let endpoint = self.endpoint.clone();
                    let payload = payload.clone();
                    self.circuit_breaker.call(async move {
                        client
                            .post(&endpoint)
                            .json(&payload)
                            .send()
                            .await?
                            .error_for_status()?;
                        Ok::<_, reqwest::Error>(())
                    })
                },
                |e| matches!(e, FailsafeError::Inner(inner) if is_transient(inner)),
            )
            .await;

        match result {
            Ok(()) => {}
            Err(FailsafeError::Rejected) => {
                warn!(%user_id, title, "notification dropped, webhook circuit open");
            }
            Err(FailsafeError::Inner(e)) => {
                warn!(%user_id, title, error = %e, "notification delivery failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn webhook_posts_notification_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .with_status(200)
            .create_async()
            .await;

        let notifier = WebhookNotifier::new(server.url());
        notifier
            .notify(Uuid::new_v4(), "Driver found", "Your driver is on the way", json!({}))
            .await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn webhook_retries_server_errors_then_gives_up() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let notifier = WebhookNotifier::new(server.url()).with_retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            multiplier: 2,
        });
        // Failure is swallowed; delivery is best-effort.
        notifier
            .notify(Uuid::new_v4(), "Trip completed", "Fare settled", json!({}))
            .await;

        mock.assert_async().await;
    }
}
