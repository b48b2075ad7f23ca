//! Webhook intake: record the notification, acknowledge, classify later.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use super::classifier::ErrorClassifier;
use super::models::{Issue, IssueEvent, UNKNOWN_ERROR_TYPE};
use super::store::IssueStore;
use crate::errors::AutofixError;

/// Result of accepting one webhook call.
pub struct Receipt {
    pub issue: Issue,
    /// Handle to the deferred classification. Dropping it detaches the task;
    /// tests await it to observe completion.
    pub classification: JoinHandle<()>,
}

#[derive(Clone)]
pub struct WebhookIntake {
    store: IssueStore,
    classifier: Arc<ErrorClassifier>,
    tasks: TaskTracker,
    events: broadcast::Sender<IssueEvent>,
}

impl WebhookIntake {
    pub fn new(
        store: IssueStore,
        classifier: Arc<ErrorClassifier>,
        events: broadcast::Sender<IssueEvent>,
    ) -> Self {
        Self {
            store,
            classifier,
            tasks: TaskTracker::new(),
            events,
        }
    }

    /// Store the raw notification and schedule its classification.
    ///
    /// Never fails because of the body's content: unparseable input is kept
    /// as `{"raw": ...}` and classified as `UnknownError`.
    pub fn receive(&self, body: &[u8]) -> Result<Receipt, AutofixError> {
        let payload = parse_payload(body);
        let error_type = extract_error_type(&payload);
        let issue = self.store.append(payload)?;

        tracing::info!(issue_id = %issue.id, %error_type, "Received Sentry webhook");
        let _ = self.events.send(IssueEvent::IssueReceived {
            issue_id: issue.id.clone(),
        });

        let store = self.store.clone();
        let classifier = Arc::clone(&self.classifier);
        let events = self.events.clone();
        let issue_id = issue.id.clone();
        let classification = self.tasks.spawn(async move {
            process_issue(&store, &classifier, &events, &issue_id, &error_type);
        });

        Ok(Receipt {
            issue,
            classification,
        })
    }

    /// Number of classifications spawned but not yet finished.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for outstanding classifications, up to `grace`.
    ///
    /// Returns the number of tasks still running when the grace period
    /// elapsed (zero on a clean drain).
    pub async fn drain(&self, grace: Duration) -> usize {
        self.tasks.close();
        let drained = tokio::time::timeout(grace, self.tasks.wait()).await.is_ok();
        self.tasks.reopen();
        if drained {
            return 0;
        }
        let pending = self.tasks.len();
        tracing::warn!(
            pending,
            grace_secs = grace.as_secs_f64(),
            "Shutting down with classifications still pending"
        );
        pending
    }
}

fn process_issue(
    store: &IssueStore,
    classifier: &ErrorClassifier,
    events: &broadcast::Sender<IssueEvent>,
    issue_id: &str,
    error_type: &str,
) {
    tracing::debug!(issue_id, "Processing issue");
    let result = classifier.classify(error_type);
    let confidence = result.confidence;
    match store.update(issue_id, result) {
        Ok(_) => {
            tracing::info!(issue_id, confidence, "Issue analyzed");
            let _ = events.send(IssueEvent::IssueAnalyzed {
                issue_id: issue_id.to_string(),
                confidence,
            });
        }
        Err(e) => {
            tracing::error!(issue_id, error = %e, "Failed to record issue analysis");
        }
    }
}

/// Parse a webhook body, wrapping anything that is not JSON as `{"raw": ...}`.
pub fn parse_payload(body: &[u8]) -> serde_json::Value {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => value,
        Err(_) => serde_json::json!({ "raw": String::from_utf8_lossy(body) }),
    }
}

/// Error type at `data.error.type`, or `UnknownError` when missing or not a string.
pub fn extract_error_type(payload: &serde_json::Value) -> String {
    payload
        .pointer("/data/error/type")
        .and_then(|v| v.as_str())
        .unwrap_or(UNKNOWN_ERROR_TYPE)
        .to_string()
}
