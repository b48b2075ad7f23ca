use std::sync::Arc;

use super::classifier::ErrorClassifier;
use super::models::{
    AdHocAnalysis, FixLookup, IssueList, IssueLookup, IssueStatus, TestAnalysis,
};
use super::pr;
use super::store::IssueStore;
use crate::errors::AutofixError;

/// Read-only view over the store plus synchronous, non-persisted
/// classification for manual submissions.
#[derive(Clone)]
pub struct QueryService {
    store: IssueStore,
    classifier: Arc<ErrorClassifier>,
}

impl QueryService {
    pub fn new(store: IssueStore, classifier: Arc<ErrorClassifier>) -> Self {
        Self { store, classifier }
    }

    pub fn list_issues(&self) -> Result<IssueList, AutofixError> {
        let issues = self.store.list()?;
        Ok(IssueList {
            total: issues.len(),
            issues,
        })
    }

    pub fn get_issue(&self, id: &str) -> Result<IssueLookup, AutofixError> {
        Ok(self.store.get(id)?.into())
    }

    /// Classify a manually submitted error. The submission is not stored;
    /// the PR descriptor is keyed `manual-<current issue count>`.
    pub fn classify_ad_hoc(
        &self,
        error_type: &str,
        message: &str,
        stacktrace: &str,
    ) -> Result<AdHocAnalysis, AutofixError> {
        let analysis = self.classifier.classify_report(error_type, message, stacktrace);
        let pr_info = pr::build(&format!("manual-{}", self.store.len()?), &analysis);
        Ok(AdHocAnalysis {
            status: "success".to_string(),
            analysis,
            pr_info,
        })
    }

    pub fn test_classify(&self, error_type: &str) -> TestAnalysis {
        let analysis = self.classifier.classify(error_type);
        let pr_info = pr::build(&format!("test-{}", error_type), &analysis);
        TestAnalysis {
            error_type: error_type.to_string(),
            analysis,
            pr_info,
        }
    }

    /// PR descriptor for a stored issue once its classification has landed.
    pub fn fix_for_issue(&self, id: &str) -> Result<FixLookup, AutofixError> {
        let Some(issue) = self.store.get(id)? else {
            return Ok(FixLookup::NotFound);
        };
        match (issue.status, issue.analysis) {
            (IssueStatus::Analyzed, Some(analysis)) => {
                Ok(FixLookup::Ready(pr::build(&issue.id, &analysis)))
            }
            _ => Ok(FixLookup::Pending),
        }
    }
}
