use apicompat_core::{
    check_compatibility, parse_signature, ClassifierConfig, CodebaseSnapshot, CompatibilityMode,
    IssueKind, Report,
};

/// Parse a format 2.0 signature body (everything after the header)
#[allow(dead_code)]
pub fn snapshot(body: &str) -> CodebaseSnapshot {
    parse_signature("api.txt", &format!("// Signature format: 2.0\n{}", body)).unwrap()
}

/// Parse a format 3.0 (Kotlin nullness) signature body
#[allow(dead_code)]
pub fn snapshot_v3(body: &str) -> CodebaseSnapshot {
    parse_signature("api.txt", &format!("// Signature format: 3.0\n{}", body)).unwrap()
}

/// Wrap class declarations in `package test.pkg { ... }`
#[allow(dead_code)]
pub fn in_package(classes: &str) -> String {
    format!("package test.pkg {{\n{}}}\n", classes)
}

/// Compatibility check with default policy for `mode`
#[allow(dead_code)]
pub fn check(old: &CodebaseSnapshot, new: &CodebaseSnapshot, mode: CompatibilityMode) -> Report {
    let config = ClassifierConfig::builder().mode(mode).build();
    check_compatibility(old, new, &config).unwrap()
}

/// Kinds of the counted (unsuppressed) issues, in report order
#[allow(dead_code)]
pub fn kinds(report: &Report) -> Vec<IssueKind> {
    report.issues.iter().map(|i| i.difference.kind).collect()
}

/// Messages of the counted issues, in report order
#[allow(dead_code)]
pub fn messages(report: &Report) -> Vec<String> {
    report
        .issues
        .iter()
        .map(|i| i.difference.message.clone())
        .collect()
}
