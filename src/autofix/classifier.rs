use super::knowledge::KnowledgeBase;
use super::models::{ClassificationResult, FALLBACK_CONFIDENCE, MATCHED_CONFIDENCE};

/// Maps an error type onto the knowledge base.
///
/// Classification is pure and total: the same `error_type` always yields the
/// same result, and unmatched input falls back to a low-confidence result
/// instead of failing.
#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier {
    knowledge: KnowledgeBase,
}

impl ErrorClassifier {
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn classify(&self, error_type: &str) -> ClassificationResult {
        match self.knowledge.lookup(error_type) {
            Some(entry) => ClassificationResult {
                error_type: error_type.to_string(),
                analysis: entry.analysis.to_string(),
                suggested_fix: entry.fix.to_string(),
                patch: Some(entry.patch.to_string()),
                confidence: MATCHED_CONFIDENCE,
            },
            None => ClassificationResult {
                error_type: error_type.to_string(),
                analysis: format!(
                    "Unknown error type: {}. Manual investigation required.",
                    error_type
                ),
                suggested_fix: "Review the stacktrace and add appropriate error handling."
                    .to_string(),
                patch: None,
                confidence: FALLBACK_CONFIDENCE,
            },
        }
    }

    /// Classify a full error report. Only `error_type` takes part in
    /// matching; `message` and `stacktrace` are accepted and ignored.
    pub fn classify_report(
        &self,
        error_type: &str,
        _message: &str,
        _stacktrace: &str,
    ) -> ClassificationResult {
        self.classify(error_type)
    }
}
