//! Outcome of a check run and its text rendering.

use crate::diff::Difference;
use crate::issues::Severity;
use crate::policy::CompatibilityMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Style guide the lint rules refer to
pub const GUIDELINES: &str = "go/android-api-guidelines";

/// Which check produced a report; decides the failure summary wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "check", content = "mode")]
pub enum CheckKind {
    Compatibility(CompatibilityMode),
    ApiLint,
}

/// Why an issue does not count against the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "payload")]
pub enum SuppressionSource {
    /// A suppression annotation on the item or an enclosing class
    Annotation(String),
    /// A payload from the configured suppression map
    Configured(String),
    /// A matching baseline entry
    Baseline,
}

/// A difference with its effective severity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedIssue {
    pub difference: Difference,
    pub severity: Severity,
    pub suppression: Option<SuppressionSource>,
}

impl ReportedIssue {
    pub fn is_suppressed(&self) -> bool {
        self.suppression.is_some()
    }

    /// `path:line: severity: message [Kind]`, plus the guideline rule when the
    /// kind enforces one
    pub fn render(&self) -> String {
        let difference = &self.difference;
        let mut line = String::new();
        if !difference.location.is_unknown() {
            line.push_str(&format!("{}: ", difference.location));
        }
        line.push_str(&format!(
            "{}: {} [{}]",
            self.severity, difference.message, difference.kind
        ));
        if let Some(rule) = difference.kind.rule() {
            line.push_str(&format!(" [Rule {} in {}]", rule, GUIDELINES));
        }
        line
    }
}

impl fmt::Display for ReportedIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Result of one compatibility or lint run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub check: CheckKind,
    /// Issues that count: not hidden and not suppressed, in canonical order
    pub issues: Vec<ReportedIssue>,
    /// Every non-hidden issue, suppressed ones included
    pub all_issues: Vec<ReportedIssue>,
    pub errors: usize,
    pub warnings: usize,
    pub passed: bool,
    /// Extra text appended to the failure summary
    pub error_message: Option<String>,
}

impl Report {
    /// Build a report from already classified issues; hidden ones are dropped
    pub fn new(
        check: CheckKind,
        issues: impl IntoIterator<Item = ReportedIssue>,
        error_message: Option<String>,
    ) -> Self {
        let mut all_issues: Vec<ReportedIssue> = issues
            .into_iter()
            .filter(|issue| issue.severity != Severity::Hidden)
            .collect();
        all_issues.sort_by(|a, b| a.difference.cmp(&b.difference));

        let issues: Vec<ReportedIssue> = all_issues
            .iter()
            .filter(|issue| !issue.is_suppressed())
            .cloned()
            .collect();
        let errors = issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
            .count();
        let warnings = issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
            .count();

        Self {
            check,
            issues,
            all_issues,
            errors,
            warnings,
            passed: errors == 0,
            error_message,
        }
    }

    /// Counted issues at error severity
    pub fn errors(&self) -> impl Iterator<Item = &ReportedIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    /// Issues excluded by an annotation, the suppression map or the baseline
    pub fn suppressed(&self) -> impl Iterator<Item = &ReportedIssue> {
        self.all_issues.iter().filter(|issue| issue.is_suppressed())
    }

    /// One rendered line per counted issue
    pub fn render(&self) -> String {
        let mut out = String::new();
        for issue in &self.issues {
            out.push_str(&issue.render());
            out.push('\n');
        }
        out
    }

    /// Summary printed when the run does not pass
    ///
    /// Lint runs summarise as soon as any issue is counted; compatibility runs
    /// only when an error remains.
    pub fn failure_summary(&self) -> Option<String> {
        let summary = match self.check {
            CheckKind::ApiLint if !self.issues.is_empty() => {
                format!("{} new API lint issues were found.", self.issues.len())
            }
            CheckKind::Compatibility(mode) if !self.passed => format!(
                "Aborting: Found compatibility problems checking the {} API.",
                mode
            ),
            _ => return None,
        };
        Some(match &self.error_message {
            Some(message) => format!("{}\n{}", summary, message),
            None => summary,
        })
    }
}
