#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use apicompat_core::{check_api_lint, CheckKind, ClassifierConfig, IssueKind, Severity};
use common::{kinds, snapshot};

// S1: a fresh class with naming problems
#[test]
fn test_lint_new_api_without_previous() {
    let new = snapshot(
        "package android.pkg {\n  public class HTMLWriter {\n    ctor public HTMLWriter();\n    method public void Write(@NonNull String);\n  }\n}\n",
    );

    let report = check_api_lint(&new, None, &ClassifierConfig::default()).unwrap();
    assert_eq!(report.check, CheckKind::ApiLint);
    assert_eq!(
        kinds(&report),
        vec![IssueKind::AcronymName, IssueKind::StartWithLower]
    );
    assert_eq!(report.issues[0].severity, Severity::Warning);
    assert_eq!(report.issues[1].severity, Severity::Error);
    assert_eq!(
        report.issues[0].render(),
        "api.txt:3: warning: Acronyms should not be capitalized in class names: was `HTMLWriter`, should this be `HtmlWriter`? [AcronymName] [Rule S1 in go/android-api-guidelines]"
    );
    assert_eq!(
        report.failure_summary().as_deref(),
        Some("2 new API lint issues were found.")
    );
}

// S2: items already present in the previous API are not linted again
#[test]
fn test_lint_only_checks_additions() {
    let previous = snapshot(
        "package android.pkg {\n  public class HTMLWriter {\n    method public void Write(@NonNull String);\n  }\n}\n",
    );
    let new = snapshot(
        "package android.pkg {\n  public class HTMLWriter {\n    method public void Write(@NonNull String);\n    method public void Flush();\n  }\n}\n",
    );

    let report = check_api_lint(&new, Some(&previous), &ClassifierConfig::default()).unwrap();
    assert_eq!(kinds(&report), vec![IssueKind::StartWithLower]);
    assert_eq!(
        report.issues[0].difference.element,
        "android.pkg.HTMLWriter#Flush()"
    );
}

#[test]
fn test_lint_ignore_prefix() {
    let new = snapshot(
        "package android.pkg {\n  public class HTMLWriter {\n  }\n}\npackage android.pkg.internal {\n  public class XMLReader {\n  }\n}\n",
    );
    let config = ClassifierConfig::builder()
        .api_lint_ignore_prefix("android.pkg.internal")
        .build();

    let report = check_api_lint(&new, None, &config).unwrap();
    let elements: Vec<&str> = report
        .issues
        .iter()
        .map(|i| i.difference.element.as_str())
        .collect();
    assert_eq!(elements, vec!["android.pkg.HTMLWriter"]);
}

#[test]
fn test_lint_boxing_and_nullability() {
    let new = snapshot(
        "package android.pkg {\n  public final class Values {\n    method public java.lang.Integer lookup(String);\n  }\n}\n",
    );

    let report = check_api_lint(&new, None, &ClassifierConfig::default()).unwrap();
    let found = kinds(&report);
    assert!(found.contains(&IssueKind::AutoBoxing), "{:?}", found);
    assert!(found.contains(&IssueKind::MissingNullability), "{:?}", found);
    assert!(!report.passed);
}

#[test]
fn test_lint_clean_api_passes() {
    let new = snapshot(
        "package android.pkg {\n  public final class Widget {\n    method @NonNull public String getTitle();\n    method public void setTitle(@NonNull String);\n    field public static final int DEFAULT_SIZE = 4; // 0x4\n  }\n}\n",
    );

    let report = check_api_lint(&new, None, &ClassifierConfig::default()).unwrap();
    assert!(report.issues.is_empty(), "{}", report.render());
    assert_eq!(report.failure_summary(), None);
}

#[test]
fn test_lint_findings_can_be_hidden() {
    let new = snapshot("package android.pkg {\n  public class HTMLWriter {\n  }\n}\n");
    let config = ClassifierConfig::builder()
        .hide("AcronymName")
        .unwrap()
        .build();

    let report = check_api_lint(&new, None, &config).unwrap();
    assert!(report.all_issues.is_empty());
}

#[test]
fn test_lint_suppressed_by_annotation() {
    let new = snapshot(
        "package android.pkg {\n  @SuppressLint(\"AcronymName\") public class HTMLWriter {\n  }\n}\n",
    );

    let report = check_api_lint(&new, None, &ClassifierConfig::default()).unwrap();
    assert!(report.issues.is_empty());
    assert_eq!(report.suppressed().count(), 1);
}
