#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use apicompat_core::{classify, CompatibilityMode, IssueKind};
use common::{in_package, snapshot};
use proptest::prelude::*;
use std::collections::BTreeSet;

const TYPES: &[&str] = &["int", "long", "String", "java.util.List<String>", "byte[]"];
const SUPERTYPES: &[&str] = &[
    "",
    " extends test.pkg.Missing",
    " implements java.lang.Runnable",
    " extends java.lang.Exception implements test.pkg.Unknown",
];

fn member_lines(methods: &BTreeSet<String>, type_index: usize) -> String {
    methods
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let ty = TYPES[(i + type_index) % TYPES.len()];
            format!("    method public {} {}({});\n", ty, name, ty)
        })
        .collect()
}

fn class_text(
    methods: &BTreeSet<String>,
    type_index: usize,
    is_final: bool,
    supertype: &str,
) -> String {
    let modifier = if is_final { "public final" } else { "public" };
    in_package(&format!(
        "  {} class Generated{} {{\n    ctor public Generated();\n{}    field public static final int LIMIT = 3; // 0x3\n  }}\n",
        modifier,
        supertype,
        member_lines(methods, type_index)
    ))
}

fn method_names() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("do[A-Z][a-zA-Z0-9]{0,6}", 1..8)
}

proptest! {
    // S1: idempotence
    #[test]
    fn prop_snapshot_compared_with_itself_is_empty(
        methods in method_names(),
        type_index in 0usize..5,
        is_final in any::<bool>(),
        supertype in 0usize..4,
    ) {
        let text = class_text(&methods, type_index, is_final, SUPERTYPES[supertype]);
        let old = snapshot(&text);
        let new = snapshot(&text);
        for mode in [CompatibilityMode::Current, CompatibilityMode::Released] {
            prop_assert!(classify(&old, &new, mode).is_empty());
        }
    }

    // S2: removing n methods yields n RemovedMethod differences
    #[test]
    fn prop_each_removed_method_reported_once(
        methods in method_names(),
        keep in 0usize..8,
    ) {
        let kept: BTreeSet<String> = methods.iter().take(keep).cloned().collect();
        let old = snapshot(&class_text(&methods, 0, false, ""));
        let new = snapshot(&class_text(&kept, 0, false, ""));

        let differences = classify(&old, &new, CompatibilityMode::Released);
        prop_assert_eq!(differences.len(), methods.len() - kept.len());
        prop_assert!(differences.iter().all(|d| d.kind == IssueKind::RemovedMethod));
    }

    // S3: output is sorted and repeatable
    #[test]
    fn prop_classification_is_deterministic(
        old_methods in method_names(),
        new_methods in method_names(),
    ) {
        let old = snapshot(&class_text(&old_methods, 0, false, ""));
        let new = snapshot(&class_text(&new_methods, 0, false, ""));

        let first = classify(&old, &new, CompatibilityMode::Current);
        let second = classify(&old, &new, CompatibilityMode::Current);
        prop_assert_eq!(&first, &second);
        let mut sorted = first.clone();
        sorted.sort();
        prop_assert_eq!(first, sorted);
    }
}
