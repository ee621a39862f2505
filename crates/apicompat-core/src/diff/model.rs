//! Classifier output types.

use crate::issues::IssueKind;
use crate::model::SourceLocation;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One classified difference between two API snapshots
///
/// Ordered by location, then issue kind declaration order, then message, so
/// sorting a list of differences gives the canonical output order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Difference {
    pub kind: IssueKind,
    /// Stable element key: `pkg`, `pkg.Cls`, `pkg.Cls#name(T1,T2)` or `pkg.Cls#field`
    pub element: String,
    pub location: SourceLocation,
    pub message: String,
}

impl Difference {
    pub fn new(
        kind: IssueKind,
        element: impl Into<String>,
        location: SourceLocation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            element: element.into(),
            location,
            message: message.into(),
        }
    }
}

impl Ord for Difference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location
            .cmp(&other.location)
            .then(self.kind.cmp(&other.kind))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.element.cmp(&other.element))
    }
}

impl PartialOrd for Difference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
