//! Report formatting
//!
//! Turns a [`ValidationResult`] into the human-readable report the CLI
//! prints: grouped by version (global errors first), then by element path,
//! one line per error.

use crate::result::{ResultKind, ValidationResult};
use serde_json::json;

/// Render a plain-text report.
pub fn format_report(result: &ValidationResult) -> String {
    let mut out = String::new();
    match result.kind() {
        ResultKind::Success => {
            out.push_str(&format!("valid for all versions {}\n", result.versions));
            return out;
        }
        ResultKind::Partial => {
            out.push_str(&format!("valid for versions {}\n", result.versions));
        }
        ResultKind::Failure => {
            out.push_str("not valid for any version\n");
        }
    }
    for (key, errors) in &result.errors {
        if errors.is_empty() {
            continue;
        }
        out.push_str(&format!("{}:\n", key));
        for error in errors {
            out.push_str(&format!("  {}: {}\n", error.path(), error));
        }
    }
    out
}

/// Render a machine-readable report.
pub fn to_json(result: &ValidationResult) -> serde_json::Value {
    json!({
        "kind": result.kind(),
        "valid_versions": &result.versions,
        "errors": result.errors.iter().map(|(key, errors)| {
            json!({
                "scope": key.to_string(),
                "errors": errors.iter().map(|e| {
                    json!({ "path": e.path(), "message": e.to_string() })
                }).collect::<Vec<_>>(),
            })
        }).collect::<Vec<_>>(),
    })
}
