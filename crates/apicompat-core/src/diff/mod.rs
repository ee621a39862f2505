//! API difference classifier.
//!
//! Compares an old and a new [`CodebaseSnapshot`](crate::model::CodebaseSnapshot)
//! and produces the sorted list of classified differences that the policy
//! layer turns into a report.
//!
//! ## Entry point
//!
//! ```ignore
//! use apicompat_core::diff::classify;
//! use apicompat_core::policy::CompatibilityMode;
//!
//! let differences = classify(&old, &new, CompatibilityMode::Released);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: equal inputs give an equal, sorted difference list.
//! - **Outermost removal only**: a removed package or class hides the removal
//!   of everything inside it.
//! - **Inheritance aware**: a member that disappears from a class but is still
//!   inherited from a supertype is not reported as removed.
//! - **Mode aware**: additions are only classified when checking the current API.

pub mod engine;
pub mod model;
pub(crate) mod types;

pub use engine::classify;
pub use model::Difference;
