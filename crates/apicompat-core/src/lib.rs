//! apicompat core - API compatibility classifier for Java/Kotlin API surfaces
//!
//! This crate compares two versions of an API surface and reports what broke:
//! - Codebase snapshot model with inheritance and visibility queries
//! - Signature file loader producing snapshots
//! - Difference classifier for current and released compatibility modes
//! - Severity, suppression and baseline policy
//! - API lint naming rules for newly added API
//! - Deterministic reports with rendered diagnostics
//!
//! Everything is pure and synchronous; inputs are text and in-memory values.

pub mod baseline;
pub mod check;
pub mod diff;
pub mod errors;
pub mod issues;
pub mod lint;
pub mod logging_facility;
pub mod model;
pub mod policy;
pub mod report;
pub mod signature;

// Re-export commonly used types
pub use baseline::{Baseline, BaselineEntry};
pub use check::{check_api_lint, check_compatibility, check_signature_compatibility};
pub use diff::{classify, Difference};
pub use errors::{ApiError, ApiErrorKind, Result, SignatureError};
pub use issues::{resolve_issue_id, IssueCategory, IssueKind, Severity};
pub use model::{CodebaseSnapshot, SourceLocation};
pub use policy::{apply_policy, ClassifierConfig, CompatibilityMode};
pub use report::{CheckKind, Report, ReportedIssue, SuppressionSource};
pub use signature::{parse_signature, SignatureFormat};
