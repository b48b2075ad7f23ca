use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence reported for any error type that matches a known signature.
pub const MATCHED_CONFIDENCE: f64 = 0.85;

/// Confidence reported for the unmatched fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.30;

/// Error type used when a webhook payload carries no `data.error.type`.
pub const UNKNOWN_ERROR_TYPE: &str = "UnknownError";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Received,
    Analyzed,
}

/// One received error notification plus its eventual classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub id: String,
    pub received_at: DateTime<Utc>,
    pub payload: serde_json::Value,
    pub status: IssueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ClassificationResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub error_type: String,
    pub analysis: String,
    pub suggested_fix: String,
    pub patch: Option<String>,
    pub confidence: f64,
}

/// A rendered, non-executed description of a fix pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrDescriptor {
    pub branch_name: String,
    pub pr_title: String,
    pub pr_body: String,
    pub apply_instructions: String,
}

// API view types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: IssueStatus,
    pub issue_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueList {
    pub total: usize,
    pub issues: Vec<Issue>,
}

/// Response for ad-hoc `/analyze` submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdHocAnalysis {
    pub status: String,
    pub analysis: ClassificationResult,
    pub pr_info: PrDescriptor,
}

/// Response for `/test/{error_type}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAnalysis {
    pub error_type: String,
    pub analysis: ClassificationResult,
    pub pr_info: PrDescriptor,
}

/// Outcome of looking an issue up by id. `NotFound` serializes to the
/// `{"error": "Issue not found"}` sentinel rather than a transport fault.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueLookup {
    Found(Issue),
    NotFound,
}

impl From<Option<Issue>> for IssueLookup {
    fn from(value: Option<Issue>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

impl Serialize for IssueLookup {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Found(issue) => issue.serialize(serializer),
            Self::NotFound => serde_json::json!({"error": "Issue not found"}).serialize(serializer),
        }
    }
}

/// Outcome of asking for the fix PR of a stored issue.
#[derive(Debug, Clone, PartialEq)]
pub enum FixLookup {
    Ready(PrDescriptor),
    Pending,
    NotFound,
}

/// Lifecycle notifications broadcast by the intake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum IssueEvent {
    IssueReceived { issue_id: String },
    IssueAnalyzed { issue_id: String, confidence: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_status_serializes_snake_case() {
        assert_eq!(serde_json::to_value(IssueStatus::Received).unwrap(), "received");
        assert_eq!(serde_json::to_value(IssueStatus::Analyzed).unwrap(), "analyzed");
    }

    #[test]
    fn test_issue_omits_analysis_until_present() {
        let issue = Issue {
            id: "issue-1".into(),
            received_at: Utc::now(),
            payload: serde_json::json!({"action": "created"}),
            status: IssueStatus::Received,
            analysis: None,
        };
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["status"], "received");
        assert!(value.get("analysis").is_none());
    }

    #[test]
    fn test_not_found_lookup_serializes_as_sentinel() {
        let value = serde_json::to_value(IssueLookup::NotFound).unwrap();
        assert_eq!(value, serde_json::json!({"error": "Issue not found"}));
    }

    #[test]
    fn test_issue_event_is_tagged() {
        let event = IssueEvent::IssueAnalyzed {
            issue_id: "issue-3".into(),
            confidence: MATCHED_CONFIDENCE,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "issue_analyzed");
        assert_eq!(value["data"]["issue_id"], "issue-3");
    }
}
