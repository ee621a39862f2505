#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use apicompat_core::{CompatibilityMode, IssueKind, Severity};
use common::{check, in_package, kinds, messages, snapshot_v3};

fn class_with(member: &str) -> String {
    in_package(&format!(
        "  public final class Foo {{\n    {}\n  }}\n",
        member
    ))
}

#[test]
fn test_parameter_rename() {
    let old = snapshot_v3(&class_with("method public void move(int distance);"));
    let new = snapshot_v3(&class_with("method public void move(int steps);"));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::ParameterNameChange]);
    assert_eq!(
        messages(&report),
        vec!["Attempted to change parameter name from distance to steps in method test.pkg.Foo.move"]
    );
}

#[test]
fn test_parameter_name_removed() {
    let old = snapshot_v3(&class_with("method public void move(int distance);"));
    let new = snapshot_v3(&class_with("method public void move(int);"));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::ParameterNameChange]);
    assert_eq!(
        messages(&report),
        vec!["Attempted to remove parameter name from parameter arg1 in test.pkg.Foo.move in method test.pkg.Foo.move"]
    );
}

#[test]
fn test_default_value_removed() {
    let old = snapshot_v3(&class_with("method public void move(optional int steps);"));
    let new = snapshot_v3(&class_with("method public void move(int steps);"));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::DefaultValueChange]);
    assert_eq!(
        messages(&report),
        vec!["Attempted to remove default value from parameter steps in test.pkg.Foo.move in method test.pkg.Foo.move"]
    );
}

#[test]
fn test_default_value_added_is_compatible() {
    let old = snapshot_v3(&class_with("method public void move(int steps);"));
    let new = snapshot_v3(&class_with("method public void move(optional int steps);"));

    assert!(check(&old, &new, CompatibilityMode::Released)
        .all_issues
        .is_empty());
}

#[test]
fn test_changed_default_value_is_warning() {
    let old = snapshot_v3(&class_with("method public void move(int steps = 1);"));
    let new = snapshot_v3(&class_with("method public void move(int steps = 2);"));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::ChangedDefaultValue]);
    assert_eq!(report.issues[0].severity, Severity::Warning);
    assert!(report.passed);
}

#[test]
fn test_varargs_to_array() {
    let old = snapshot_v3(&class_with("method public void log(java.lang.String... parts);"));
    let new = snapshot_v3(&class_with("method public void log(java.lang.String[] parts);"));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::VarargRemoval]);
    assert_eq!(
        messages(&report),
        vec!["Changing from varargs to array is an incompatible change: parameter parts in test.pkg.Foo.log(java.lang.String[] parts)"]
    );
}

#[test]
fn test_operator_and_infix_removal() {
    let old = snapshot_v3(&class_with(
        "method public operator infix test.pkg.Foo plus(test.pkg.Foo other);",
    ));
    let new = snapshot_v3(&class_with(
        "method public test.pkg.Foo plus(test.pkg.Foo other);",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(
        kinds(&report),
        vec![IssueKind::InfixRemoval, IssueKind::OperatorRemoval]
    );
    assert_eq!(
        messages(&report)[1],
        "Cannot remove `operator` modifier from method test.pkg.Foo.plus(test.pkg.Foo): Incompatible change"
    );
}

#[test]
fn test_reified_type_parameter() {
    let old = snapshot_v3(&class_with("method public inline <T> void add(T t);"));
    let new = snapshot_v3(&class_with("method public inline <reified T> void add(T t);"));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::ChangedReified]);
    assert_eq!(
        messages(&report),
        vec!["Method test.pkg.Foo.add made type variable T reified: incompatible change"]
    );
}

#[test]
fn test_sealed_added_has_no_line() {
    let old = snapshot_v3(&in_package(
        "  public abstract class Shape {\n    ctor public Shape();\n  }\n",
    ));
    let new = snapshot_v3(&in_package(
        "  public abstract sealed class Shape {\n    ctor public Shape();\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::AddSealed]);
    let issue = &report.issues[0];
    assert_eq!(issue.difference.location.line, None);
    assert_eq!(
        issue.render(),
        "api.txt: error: Cannot add 'sealed' modifier to class test.pkg.Shape: Incompatible change [AddSealed]"
    );
}
