//! Check entry points with boundary logging.
//!
//! Each entry point owns lifecycle logging for its run:
//! - `log_op_start!` at entry, tagged with a fresh run id
//! - `log_op_end!` on success, with difference and issue counts
//! - `log_op_error!` on failure
//!
//! The classifier, policy and lint layers only use `tracing::debug!()`.

use crate::diff::classify;
use crate::errors::Result;
use crate::lint::run_api_lint;
use crate::model::CodebaseSnapshot;
use crate::policy::{apply_policy, ClassifierConfig};
use crate::report::{CheckKind, Report};
use crate::signature::parse_signature;
use crate::{log_op_end, log_op_error, log_op_start};
use apicompat_core_types::correlation::RunId;

/// Check `new` against `old` under `config`
///
/// ## Errors
///
/// None at present for in-memory snapshots; the `Result` keeps the signature
/// aligned with [`check_signature_compatibility`].
pub fn check_compatibility(
    old: &CodebaseSnapshot,
    new: &CodebaseSnapshot,
    config: &ClassifierConfig,
) -> Result<Report> {
    let run_id = RunId::new();
    log_op_start!(
        "check_compatibility",
        run_id = run_id.as_str(),
        mode = config.mode.as_str(),
        class_count = new.class_count()
    );
    let start = std::time::Instant::now();

    let report = check_compatibility_impl(old, new, config);

    log_op_end!(
        "check_compatibility",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = run_id.as_str(),
        diff_count = report.all_issues.len(),
        error_count = report.errors,
        warning_count = report.warnings
    );
    Ok(report)
}

fn check_compatibility_impl(
    old: &CodebaseSnapshot,
    new: &CodebaseSnapshot,
    config: &ClassifierConfig,
) -> Report {
    let differences = classify(old, new, config.mode);
    tracing::debug!(diff_count = differences.len(), "classified differences");
    apply_policy(CheckKind::Compatibility(config.mode), differences, new, config)
}

/// Parse two signature documents and check the second against the first
///
/// ## Errors
///
/// - `InvalidSignature`: either document could not be parsed
/// - `DuplicateItem`: a document declares the same element twice
pub fn check_signature_compatibility(
    old_file: &str,
    old_text: &str,
    new_file: &str,
    new_text: &str,
    config: &ClassifierConfig,
) -> Result<Report> {
    let run_id = RunId::new();
    log_op_start!(
        "check_signature_compatibility",
        run_id = run_id.as_str(),
        mode = config.mode.as_str()
    );
    let start = std::time::Instant::now();

    let report = parse_signature(old_file, old_text)
        .and_then(|old| parse_signature(new_file, new_text).map(|new| (old, new)))
        .map(|(old, new)| check_compatibility_impl(&old, &new, config))
        .map_err(|e| {
            log_op_error!(
                "check_signature_compatibility",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = run_id.as_str()
            );
            e
        })?;

    log_op_end!(
        "check_signature_compatibility",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = run_id.as_str(),
        diff_count = report.all_issues.len(),
        error_count = report.errors,
        warning_count = report.warnings
    );
    Ok(report)
}

/// Lint the API that `new` adds over `previous` (everything when `None`)
///
/// ## Errors
///
/// None at present; kept fallible like the other entry points.
pub fn check_api_lint(
    new: &CodebaseSnapshot,
    previous: Option<&CodebaseSnapshot>,
    config: &ClassifierConfig,
) -> Result<Report> {
    let run_id = RunId::new();
    log_op_start!(
        "check_api_lint",
        run_id = run_id.as_str(),
        class_count = new.class_count()
    );
    let start = std::time::Instant::now();

    let findings = run_api_lint(new, previous, &config.api_lint_ignore_prefixes);
    tracing::debug!(finding_count = findings.len(), "linted new API");
    let report = apply_policy(CheckKind::ApiLint, findings, new, config);

    log_op_end!(
        "check_api_lint",
        duration_ms = start.elapsed().as_millis() as u64,
        run_id = run_id.as_str(),
        diff_count = report.all_issues.len(),
        error_count = report.errors,
        warning_count = report.warnings
    );
    Ok(report)
}
