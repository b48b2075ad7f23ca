//! One-shot classification command — `sentry-autofix classify`.

use std::sync::Arc;

use anyhow::{Context, Result};

use sentry_autofix::autofix::classifier::ErrorClassifier;
use sentry_autofix::autofix::query::QueryService;
use sentry_autofix::autofix::store::IssueStore;

use super::super::OutputFormat;

pub fn cmd_classify(error_type: &str, format: OutputFormat) -> Result<()> {
    let query = QueryService::new(IssueStore::new(), Arc::new(ErrorClassifier::default()));
    let result = query.test_classify(error_type);

    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&result).context("Failed to serialize analysis")?;
            println!("{}", json);
        }
        OutputFormat::Markdown => {
            println!("# {}", result.pr_info.pr_title);
            println!();
            println!(
                "Confidence: {:.0}%  |  Branch: `{}`",
                result.analysis.confidence * 100.0,
                result.pr_info.branch_name
            );
            println!("{}", result.pr_info.pr_body);
            println!("{}", result.pr_info.apply_instructions);
        }
    }
    Ok(())
}
