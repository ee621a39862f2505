//! Baseline documents: known issues that should not fail a run.
//!
//! ```text
//! // Baseline format: 1.0
//! ChangedValue: test.pkg.Parent#field1:
//!     Field test.pkg.Parent.field1 has changed value from 1 to 42
//! ```
//!
//! An entry matches an issue when kind, element key and message are equal.

use crate::diff::Difference;
use crate::errors::{ApiError, ApiErrorKind, Result};
use crate::issues::{IssueKind, Severity};
use crate::report::{Report, SuppressionSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const HEADER_PREFIX: &str = "// Baseline format: ";
const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub kind: IssueKind,
    pub element: String,
    pub message: String,
}

impl BaselineEntry {
    pub fn from_difference(difference: &Difference) -> Self {
        Self {
            kind: difference.kind,
            element: difference.element.clone(),
            message: difference.message.trim().to_string(),
        }
    }

    fn matches(&self, difference: &Difference) -> bool {
        self.kind == difference.kind
            && self.element == difference.element
            && self.message == difference.message.trim()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    entries: BTreeSet<BaselineEntry>,
}

fn invalid(line: usize, message: impl Into<String>) -> ApiError {
    ApiError::new(ApiErrorKind::InvalidBaseline)
        .with_op("parse_baseline")
        .with_line(line as u32)
        .with_message(message)
}

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a baseline document
    ///
    /// # Errors
    ///
    /// `InvalidBaseline` for a missing or unsupported header, an unknown issue
    /// name, or a message line with no entry header above it.
    pub fn parse(text: &str) -> Result<Self> {
        let mut baseline = Self::new();
        let mut header_seen = false;
        let mut current: Option<(IssueKind, String)> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !header_seen {
                let version = trimmed
                    .strip_prefix(HEADER_PREFIX)
                    .ok_or_else(|| invalid(line_no, "missing `// Baseline format` header"))?;
                if version.trim() != FORMAT_VERSION {
                    return Err(invalid(
                        line_no,
                        format!("unsupported baseline format {}", version.trim()),
                    ));
                }
                header_seen = true;
                continue;
            }
            if trimmed.starts_with("//") {
                continue;
            }

            let indented = raw.starts_with(char::is_whitespace);
            if indented {
                let (kind, element) = current
                    .as_ref()
                    .ok_or_else(|| invalid(line_no, "message without an entry header"))?;
                baseline.entries.insert(BaselineEntry {
                    kind: *kind,
                    element: element.clone(),
                    message: trimmed.to_string(),
                });
                continue;
            }

            let head = trimmed
                .strip_suffix(':')
                .ok_or_else(|| invalid(line_no, format!("expected `Kind: element:`, found `{}`", trimmed)))?;
            let (name, element) = head
                .split_once(':')
                .ok_or_else(|| invalid(line_no, format!("expected `Kind: element:`, found `{}`", trimmed)))?;
            let kind = IssueKind::from_name(name.trim())
                .ok_or_else(|| invalid(line_no, format!("unknown issue {}", name.trim())))?;
            current = Some((kind, element.trim().to_string()));
        }

        Ok(baseline)
    }

    pub fn insert(&mut self, entry: BaselineEntry) {
        self.entries.insert(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &BaselineEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, difference: &Difference) -> bool {
        self.entries.iter().any(|entry| entry.matches(difference))
    }

    /// Baseline that would make `report` pass
    ///
    /// Issues already covered by the baseline are kept; those suppressed by an
    /// annotation or the suppression map are not needed. With `errors_only`
    /// warnings are left out.
    pub fn from_report(report: &Report, errors_only: bool) -> Self {
        let entries = report
            .all_issues
            .iter()
            .filter(|issue| {
                matches!(issue.suppression, None | Some(SuppressionSource::Baseline))
            })
            .filter(|issue| !errors_only || issue.severity == Severity::Error)
            .map(|issue| BaselineEntry::from_difference(&issue.difference))
            .collect();
        Self { entries }
    }

    /// Entries no issue of `report` matched
    pub fn unused_entries<'a>(&'a self, report: &Report) -> Vec<&'a BaselineEntry> {
        self.entries
            .iter()
            .filter(|entry| {
                !report
                    .all_issues
                    .iter()
                    .any(|issue| entry.matches(&issue.difference))
            })
            .collect()
    }

    /// Render in canonical order; parsing the output gives back the same baseline
    pub fn to_text(&self) -> String {
        let mut out = format!("{}{}\n", HEADER_PREFIX, FORMAT_VERSION);
        let mut previous: Option<(IssueKind, &str)> = None;
        for entry in &self.entries {
            let head = (entry.kind, entry.element.as_str());
            if previous != Some(head) {
                out.push_str(&format!("{}: {}:\n", entry.kind, entry.element));
                previous = Some(head);
            }
            out.push_str(&format!("    {}\n", entry.message));
        }
        out
    }
}
