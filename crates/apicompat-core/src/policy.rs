//! Severity and suppression policy
//!
//! A [`ClassifierConfig`] decides, for every classified difference, the
//! effective severity and whether something (an annotation on the new item,
//! the configured suppression map, or the baseline) excuses it.

use crate::baseline::Baseline;
use crate::diff::Difference;
use crate::errors::{ApiError, ApiErrorKind, Result};
use crate::issues::{resolve_issue_id, IssueKind, Severity};
use crate::model::{CodebaseSnapshot, SourceLocation};
use crate::report::{CheckKind, Report, ReportedIssue, SuppressionSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which API the new snapshot is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityMode {
    /// Against the in-development API: additions are reported too
    #[default]
    Current,
    /// Against a shipped API: additions are fine, breakage is not
    Released,
}

impl CompatibilityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CompatibilityMode::Current => "current",
            CompatibilityMode::Released => "released",
        }
    }
}

impl fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element key to suppression payloads (`Kind` or `Kind:message`)
pub type SuppressionMap = BTreeMap<String, Vec<String>>;

/// Immutable per-run policy configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierConfig {
    pub mode: CompatibilityMode,
    /// Explicit severities; these win over mode and kind defaults
    pub severity_overrides: BTreeMap<IssueKind, Severity>,
    /// Promote every warning to an error
    pub warnings_as_errors: bool,
    pub baseline: Option<Baseline>,
    pub suppressions: SuppressionMap,
    /// Appended to the failure summary when the run fails
    pub error_message: Option<String>,
    /// Package prefixes API lint skips (`android.icu.`)
    pub api_lint_ignore_prefixes: Vec<String>,
    /// Notes produced while building the config (deprecated id spellings)
    pub diagnostics: Vec<Difference>,
}

/// Whether one suppression payload excuses `difference`
///
/// `Kind` matches every issue of that kind; `Kind:message` (a space after the
/// colon is allowed) only the issue whose trimmed message is equal.
pub fn payload_matches(payload: &str, difference: &Difference) -> bool {
    let payload = payload.trim();
    match payload.split_once(':') {
        Some((kind, message)) => {
            kind.trim() == difference.kind.name() && message.trim() == difference.message.trim()
        }
        None => payload == difference.kind.name(),
    }
}

impl ClassifierConfig {
    pub fn builder() -> ClassifierConfigBuilder {
        ClassifierConfigBuilder::default()
    }

    /// Build from a JSON document
    ///
    /// ```json
    /// { "mode": "released", "hide": ["AddedMethod"], "warnings_as_errors": true,
    ///   "baseline": "// Baseline format: 1.0\n", "suppressions": {"a.B": ["RemovedMethod"]} }
    /// ```
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for malformed JSON or unknown keys, plus every error the
    /// builder and [`Baseline::parse`] raise.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(text).map_err(|e| {
            ApiError::new(ApiErrorKind::InvalidConfig)
                .with_op("config_from_json")
                .with_message(e.to_string())
        })?;

        let mut builder = Self::builder()
            .mode(file.mode)
            .warnings_as_errors(file.warnings_as_errors);
        for ids in &file.hide {
            builder = builder.hide(ids)?;
        }
        for ids in &file.warning {
            builder = builder.warning(ids)?;
        }
        for ids in &file.error {
            builder = builder.error(ids)?;
        }
        if let Some(text) = &file.baseline {
            builder = builder.baseline(Baseline::parse(text)?);
        }
        for (element, payloads) in file.suppressions {
            for payload in payloads {
                builder = builder.suppress(element.clone(), payload);
            }
        }
        if let Some(message) = file.error_message {
            builder = builder.error_message(message);
        }
        for prefix in file.api_lint_ignore_prefixes {
            builder = builder.api_lint_ignore_prefix(prefix);
        }
        Ok(builder.build())
    }

    /// Effective severity of an issue kind under this config
    pub fn severity_for(&self, kind: IssueKind) -> Severity {
        let severity = match self.severity_overrides.get(&kind) {
            Some(severity) => *severity,
            None => match (self.mode, kind) {
                (CompatibilityMode::Released, IssueKind::ChangedAbstract) => Severity::Warning,
                (CompatibilityMode::Released, kind)
                    if kind.is_addition() && kind != IssueKind::AddedAbstractMethod =>
                {
                    Severity::Hidden
                }
                _ => kind.default_severity(),
            },
        };
        if self.warnings_as_errors && severity == Severity::Warning {
            Severity::Error
        } else {
            severity
        }
    }

    /// First thing that excuses `difference`, looked up in annotations on the
    /// new snapshot, then the suppression map, then the baseline
    pub fn suppression_for(
        &self,
        difference: &Difference,
        new: &CodebaseSnapshot,
    ) -> Option<SuppressionSource> {
        if let Some(payload) = new
            .suppressions_for(&difference.element)
            .into_iter()
            .find(|payload| payload_matches(payload, difference))
        {
            return Some(SuppressionSource::Annotation(payload.to_string()));
        }

        let class_key = difference
            .element
            .split_once('#')
            .map(|(class, _)| class);
        let configured = std::iter::once(difference.element.as_str())
            .chain(class_key)
            .filter_map(|key| self.suppressions.get(key))
            .flatten()
            .find(|payload| payload_matches(payload, difference));
        if let Some(payload) = configured {
            return Some(SuppressionSource::Configured(payload.clone()));
        }

        match &self.baseline {
            Some(baseline) if baseline.contains(difference) => Some(SuppressionSource::Baseline),
            _ => None,
        }
    }
}

/// Turn classified differences into a report for `check`
///
/// Diagnostics gathered while building `config` are reported alongside.
pub fn apply_policy(
    check: CheckKind,
    differences: Vec<Difference>,
    new: &CodebaseSnapshot,
    config: &ClassifierConfig,
) -> Report {
    let issues = config
        .diagnostics
        .iter()
        .cloned()
        .chain(differences)
        .filter_map(|difference| {
            let severity = config.severity_for(difference.kind);
            if severity == Severity::Hidden {
                return None;
            }
            let suppression = config.suppression_for(&difference, new);
            Some(ReportedIssue {
                difference,
                severity,
                suppression,
            })
        });
    Report::new(check, issues, config.error_message.clone())
}

/// Builder for [`ClassifierConfig`]
#[derive(Debug, Default)]
pub struct ClassifierConfigBuilder {
    config: ClassifierConfig,
}

impl ClassifierConfigBuilder {
    pub fn mode(mut self, mode: CompatibilityMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Hide the given comma-separated issue ids
    ///
    /// # Errors
    ///
    /// `UnknownIssue` for an id that matches nothing, `ConflictingSeverity`
    /// when an id already got another severity from this builder.
    pub fn hide(self, ids: &str) -> Result<Self> {
        self.set_severity(ids, "--hide", Severity::Hidden)
    }

    /// Report the given comma-separated issue ids as warnings
    ///
    /// # Errors
    ///
    /// As [`hide`](Self::hide).
    pub fn warning(self, ids: &str) -> Result<Self> {
        self.set_severity(ids, "--warning", Severity::Warning)
    }

    /// Report the given comma-separated issue ids as errors
    ///
    /// # Errors
    ///
    /// As [`hide`](Self::hide).
    pub fn error(self, ids: &str) -> Result<Self> {
        self.set_severity(ids, "--error", Severity::Error)
    }

    pub fn warnings_as_errors(mut self, enabled: bool) -> Self {
        self.config.warnings_as_errors = enabled;
        self
    }

    pub fn baseline(mut self, baseline: Baseline) -> Self {
        self.config.baseline = Some(baseline);
        self
    }

    pub fn suppress(mut self, element: impl Into<String>, payload: impl Into<String>) -> Self {
        self.config
            .suppressions
            .entry(element.into())
            .or_default()
            .push(payload.into());
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.config.error_message = Some(message.into());
        self
    }

    pub fn api_lint_ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.api_lint_ignore_prefixes.push(prefix.into());
        self
    }

    pub fn build(self) -> ClassifierConfig {
        self.config
    }

    fn set_severity(mut self, ids: &str, flag: &str, severity: Severity) -> Result<Self> {
        for id in ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
            let resolved = resolve_issue_id(id, flag)?;
            let kind = resolved.kind;
            if let Some(previous) = self.config.severity_overrides.get(&kind) {
                if *previous != severity {
                    return Err(ApiError::new(ApiErrorKind::ConflictingSeverity)
                        .with_op("build_config")
                        .with_element(kind.name())
                        .with_message(format!(
                            "Issue {} configured as both {} and {}",
                            kind, previous, severity
                        )));
                }
            }
            self.config.severity_overrides.insert(kind, severity);
            if let Some(note) = resolved.deprecation {
                self.config.diagnostics.push(Difference::new(
                    IssueKind::DeprecatedOption,
                    flag,
                    SourceLocation::unknown(),
                    note,
                ));
            }
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    mode: CompatibilityMode,
    hide: Vec<String>,
    warning: Vec<String>,
    error: Vec<String>,
    warnings_as_errors: bool,
    baseline: Option<String>,
    suppressions: SuppressionMap,
    error_message: Option<String>,
    api_lint_ignore_prefixes: Vec<String>,
}
