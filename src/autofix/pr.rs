//! Pull request descriptors for suggested fixes.
//!
//! Nothing here touches git or a code host: the descriptor spells out the
//! branch, title and body a maintainer would use, plus manual steps to apply
//! the patch.

use super::models::{ClassificationResult, PrDescriptor};

const BRANCH_PREFIX: &str = "fix/sentry-issue-";

pub fn branch_name(issue_id: &str) -> String {
    format!("{}{}", BRANCH_PREFIX, issue_id)
}

/// Build the PR descriptor for `result`, keyed by `issue_id`.
pub fn build(issue_id: &str, result: &ClassificationResult) -> PrDescriptor {
    let branch_name = branch_name(issue_id);
    let title_subject = if result.error_type.is_empty() {
        "Unknown Error"
    } else {
        result.error_type.as_str()
    };
    let commit_subject = if result.error_type.is_empty() {
        "error"
    } else {
        result.error_type.as_str()
    };

    let pr_body = format!(
        "## 🤖 AI-Generated Fix\n\n\
         **Issue ID:** {issue_id}\n\n\
         ### Analysis\n{analysis}\n\n\
         ### Suggested Fix\n{fix}\n\n\
         ### Patch\n```diff\n{patch}```\n\n\
         ---\n*This PR was automatically generated by sentry-autofix.*\n",
        issue_id = issue_id,
        analysis = result.analysis,
        fix = result.suggested_fix,
        patch = result.patch.as_deref().unwrap_or_default(),
    );

    let apply_instructions = format!(
        "To apply this fix manually:\n\
         1. git checkout -b {branch}\n\
         2. Apply the patch above to the relevant file\n\
         3. git commit -m \"fix: {subject}\"\n\
         4. git push origin {branch}\n\
         5. Create PR on GitHub\n",
        branch = branch_name,
        subject = commit_subject,
    );

    PrDescriptor {
        pr_title: format!("[Auto-Fix] {}", title_subject),
        branch_name,
        pr_body,
        apply_instructions,
    }
}
