use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::models::{ClassificationResult, Issue, IssueStatus};
use crate::errors::AutofixError;

/// In-memory, process-lifetime store of received issues.
///
/// Cheap to clone: clones share the same records. Mutations (`append`,
/// `update`) take the write lock, so id assignment and status transitions are
/// serialized; reads take the read lock and hand out snapshots.
#[derive(Clone, Default)]
pub struct IssueStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    last_seq: u64,
    issues: Vec<Issue>,
    /// Issue id to position in `issues`.
    index: HashMap<String, usize>,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreInner>, AutofixError> {
        self.inner.read().map_err(|_| AutofixError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreInner>, AutofixError> {
        self.inner.write().map_err(|_| AutofixError::LockPoisoned)
    }

    /// Record a new issue with the next sequence id and status `received`.
    pub fn append(&self, payload: serde_json::Value) -> Result<Issue, AutofixError> {
        let mut inner = self.write()?;
        inner.last_seq += 1;
        let issue = Issue {
            id: format!("issue-{}", inner.last_seq),
            received_at: Utc::now(),
            payload,
            status: IssueStatus::Received,
            analysis: None,
        };
        let position = inner.issues.len();
        inner.index.insert(issue.id.clone(), position);
        inner.issues.push(issue.clone());
        Ok(issue)
    }

    /// Attach a classification and move the issue to `analyzed`.
    ///
    /// The transition happens at most once; a second update is reported as
    /// `AlreadyAnalyzed` and leaves the record untouched.
    pub fn update(&self, id: &str, analysis: ClassificationResult) -> Result<Issue, AutofixError> {
        let mut inner = self.write()?;
        let position = *inner
            .index
            .get(id)
            .ok_or_else(|| AutofixError::IssueNotFound { id: id.to_string() })?;
        let issue = &mut inner.issues[position];
        if issue.status == IssueStatus::Analyzed {
            return Err(AutofixError::AlreadyAnalyzed { id: id.to_string() });
        }
        issue.analysis = Some(analysis);
        issue.status = IssueStatus::Analyzed;
        Ok(issue.clone())
    }

    pub fn get(&self, id: &str) -> Result<Option<Issue>, AutofixError> {
        let inner = self.read()?;
        Ok(inner.index.get(id).map(|&pos| inner.issues[pos].clone()))
    }

    /// All issues in insertion order.
    pub fn list(&self) -> Result<Vec<Issue>, AutofixError> {
        Ok(self.read()?.issues.clone())
    }

    pub fn len(&self) -> Result<usize, AutofixError> {
        Ok(self.read()?.issues.len())
    }

    pub fn is_empty(&self) -> Result<bool, AutofixError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autofix::classifier::ErrorClassifier;
    use std::collections::HashSet;

    fn analysis(error_type: &str) -> ClassificationResult {
        ErrorClassifier::default().classify(error_type)
    }

    #[test]
    fn test_append_assigns_dense_sequence() {
        let store = IssueStore::new();
        let ids: Vec<String> = (0..3)
            .map(|i| store.append(serde_json::json!({"n": i})).unwrap().id)
            .collect();
        assert_eq!(ids, vec!["issue-1", "issue-2", "issue-3"]);
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn test_append_starts_received_without_analysis() {
        let store = IssueStore::new();
        let issue = store.append(serde_json::json!({"action": "created"})).unwrap();
        assert_eq!(issue.status, IssueStatus::Received);
        assert!(issue.analysis.is_none());
        assert_eq!(issue.payload["action"], "created");
    }

    #[test]
    fn test_update_transitions_to_analyzed() {
        let store = IssueStore::new();
        let issue = store.append(serde_json::json!({})).unwrap();
        let updated = store.update(&issue.id, analysis("KeyError")).unwrap();
        assert_eq!(updated.status, IssueStatus::Analyzed);
        assert_eq!(updated.received_at, issue.received_at);

        let fetched = store.get(&issue.id).unwrap().unwrap();
        assert_eq!(fetched.status, IssueStatus::Analyzed);
        assert_eq!(fetched.analysis.unwrap().confidence, 0.85);
    }

    #[test]
    fn test_double_update_is_rejected() {
        let store = IssueStore::new();
        let issue = store.append(serde_json::json!({})).unwrap();
        store.update(&issue.id, analysis("KeyError")).unwrap();

        let err = store.update(&issue.id, analysis("Other")).unwrap_err();
        assert!(matches!(err, AutofixError::AlreadyAnalyzed { ref id } if id == "issue-1"));
        // First analysis is kept.
        let kept = store.get(&issue.id).unwrap().unwrap();
        assert_eq!(kept.analysis.unwrap().error_type, "KeyError");
    }

    #[test]
    fn test_update_unknown_id() {
        let store = IssueStore::new();
        let err = store.update("issue-42", analysis("KeyError")).unwrap_err();
        assert!(matches!(err, AutofixError::IssueNotFound { .. }));
    }

    #[test]
    fn test_get_unknown_returns_none() {
        let store = IssueStore::new();
        assert!(store.get("issue-1").unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = IssueStore::new();
        for i in 0..5 {
            store.append(serde_json::json!({"n": i})).unwrap();
        }
        store.update("issue-3", analysis("ValueError")).unwrap();
        let issues = store.list().unwrap();
        let ns: Vec<i64> = issues.iter().map(|i| i.payload["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![0, 1, 2, 3, 4]);
        assert_eq!(issues[2].status, IssueStatus::Analyzed);
    }

    #[test]
    fn test_clones_share_records() {
        let store = IssueStore::new();
        let other = store.clone();
        store.append(serde_json::json!({})).unwrap();
        assert_eq!(other.len().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_appends_yield_dense_ids() {
        let store = IssueStore::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| store.append(serde_json::json!({})).unwrap().id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: HashSet<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let expected: HashSet<String> = (1..=200).map(|n| format!("issue-{}", n)).collect();
        assert_eq!(ids, expected);
    }
}
