#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use apicompat_core::{classify, CompatibilityMode, IssueKind, Severity};
use common::{check, in_package, kinds, messages, snapshot};

// S1: comparing a snapshot with itself yields nothing
#[test]
fn test_snapshot_compared_with_itself_is_clean() {
    let body = in_package(
        "  public abstract class Foo extends test.pkg.Base implements java.lang.Runnable {\n    ctor public Foo(int);\n    method @Nullable public String name(@NonNull String, int...) throws java.io.IOException;\n    method public abstract void run();\n    field public static final int MAX = 4; // 0x4\n    field protected volatile long counter;\n  }\n  public class Base {\n  }\n  public enum Mode {\n    enum_constant public static final test.pkg.Mode FAST;\n  }\n",
    );
    let old = snapshot(&body);
    let new = snapshot(&body);

    for mode in [CompatibilityMode::Current, CompatibilityMode::Released] {
        let report = check(&old, &new, mode);
        assert!(report.all_issues.is_empty(), "{}", report.render());
        assert!(report.passed);
    }
}

// S2: members a class only inherits are not removed
#[test]
fn test_inherited_members_are_not_removed() {
    let old = snapshot(&in_package(
        "  public class Parent {\n    method public void method1();\n    method public void method2();\n    method public void method3();\n  }\n  public class Child extends test.pkg.Parent {\n    method public void method1();\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public class Parent {\n    method public void method1();\n    method public void method2();\n    method public void method3();\n  }\n  public class Child extends test.pkg.Parent {\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert!(report.all_issues.is_empty(), "{}", report.render());
}

// S3: constant value change
#[test]
fn test_changed_constant_value() {
    let old = snapshot(&in_package(
        "  public class Foo {\n    field public static final int FOO = 1; // 0x1\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public class Foo {\n    field public static final int FOO = 42; // 0x2a\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::ChangedValue]);
    assert_eq!(
        messages(&report),
        vec!["Field test.pkg.Foo.FOO has changed value from 1 to 42"]
    );
    assert_eq!(report.issues[0].difference.element, "test.pkg.Foo#FOO");
    assert!(!report.passed);
}

// S4: interface turned into a class
#[test]
fn test_interface_to_class_is_one_changed_class() {
    let old = snapshot(&in_package("  public interface MyTest2 {\n  }\n"));
    let new = snapshot(&in_package("  public class MyTest2 {\n  }\n"));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::ChangedClass]);
    assert!(report.issues[0].difference.message.contains("MyTest2"));
}

// S5: dropped throws clause
#[test]
fn test_removed_throws_is_one_changed_throws() {
    let old = snapshot(&in_package(
        "  public class Foo {\n    method public void method() throws java.io.IOException;\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public class Foo {\n    method public void method();\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::ChangedThrows]);
    assert!(report.issues[0]
        .difference
        .message
        .ends_with("no longer throws exception java.io.IOException"));
}

// S6: final added while the only constructor disappears (released)
#[test]
fn test_final_class_without_constructor_released_mode() {
    let old = snapshot(&in_package(
        "  public class Class1 {\n    ctor public Class1();\n  }\n",
    ));
    let new = snapshot(&in_package("  public final class Class1 {\n  }\n"));

    let report = check(&old, &new, CompatibilityMode::Released);
    let found = kinds(&report);
    assert_eq!(found.len(), 2, "{}", report.render());
    assert!(found.contains(&IssueKind::AddedFinal));
    assert!(found.contains(&IssueKind::RemovedMethod));
    assert!(messages(&report).contains(&"Removed constructor test.pkg.Class1()".to_string()));
}

// S7: wholly new elements are additions only in current mode
#[test]
fn test_new_class_reported_only_in_current_mode() {
    let old = snapshot(&in_package("  public class Other {\n  }\n"));
    let new = snapshot(&in_package(
        "  public final class Class1 {\n    ctor public Class1();\n  }\n  public class Other {\n  }\n",
    ));

    let current = check(&old, &new, CompatibilityMode::Current);
    assert_eq!(kinds(&current), vec![IssueKind::AddedClass]);
    assert_eq!(messages(&current), vec!["Added class test.pkg.Class1"]);

    let released = check(&old, &new, CompatibilityMode::Released);
    assert!(released.all_issues.is_empty(), "{}", released.render());
}

#[test]
fn test_return_type_change() {
    let old = snapshot(&in_package(
        "  public class Foo {\n    method public int size();\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public class Foo {\n    method public long size();\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::ChangedType]);
    assert_eq!(
        messages(&report),
        vec!["Method test.pkg.Foo.size has changed return type from int to long"]
    );
}

#[test]
fn test_removed_deprecated_method_has_own_kind() {
    let old = snapshot(&in_package(
        "  public class Foo {\n    method @Deprecated public void legacy();\n    method public void current();\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public class Foo {\n    method public void current();\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::RemovedDeprecatedMethod]);
    assert_eq!(
        messages(&report),
        vec!["Removed deprecated method test.pkg.Foo.legacy()"]
    );
}

#[test]
fn test_deprecation_state_change() {
    let old = snapshot(&in_package(
        "  public class Foo {\n    method public void run();\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public class Foo {\n    method @Deprecated public void run();\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::ChangedDeprecated]);
    assert!(report.issues[0]
        .difference
        .message
        .ends_with("has changed deprecation state false --> true"));
}

#[test]
fn test_abstract_class_change_is_warning_when_released() {
    let old = snapshot(&in_package(
        "  public class Foo {\n    ctor public Foo();\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public abstract class Foo {\n    ctor public Foo();\n  }\n",
    ));

    let released = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&released), vec![IssueKind::ChangedAbstract]);
    assert_eq!(released.issues[0].severity, Severity::Warning);
    assert!(released.passed);

    let current = check(&old, &new, CompatibilityMode::Current);
    assert_eq!(current.issues[0].severity, Severity::Error);
    assert!(!current.passed);
}

#[test]
fn test_added_abstract_method_fails_released_check() {
    let old = snapshot(&in_package("  public interface Listener {\n  }\n"));
    let new = snapshot(&in_package(
        "  public interface Listener {\n    method public abstract void onEvent();\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::AddedAbstractMethod]);
    assert!(!report.passed);
    assert_eq!(
        report.failure_summary().as_deref(),
        Some("Aborting: Found compatibility problems checking the released API.")
    );
}

#[test]
fn test_classify_orders_by_location() {
    let old = snapshot(&in_package(
        "  public class Alpha {\n    method public void a();\n  }\n  public class Beta {\n    method public void b();\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public class Alpha {\n  }\n  public class Beta {\n  }\n",
    ));

    let differences = classify(&old, &new, CompatibilityMode::Released);
    let elements: Vec<&str> = differences.iter().map(|d| d.element.as_str()).collect();
    assert_eq!(elements, vec!["test.pkg.Alpha#a()", "test.pkg.Beta#b()"]);
    assert_eq!(differences, classify(&old, &new, CompatibilityMode::Released));
}

#[test]
fn test_changed_visibility_of_class_method_and_field() {
    let old = snapshot(&in_package(
        "  protected class Class1 {\n  }\n  public abstract class MyClass {\n    method protected void myMethod1();\n    method public void myMethod2();\n    field protected int myField1;\n    field public final int myField3;\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public class Class1 {\n  }\n  public abstract class MyClass {\n    method public void myMethod1();\n    method protected void myMethod2();\n    field public int myField1;\n    field public int myField3;\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(
        messages(&report),
        vec![
            "Class test.pkg.Class1 changed visibility from protected to public",
            "Method test.pkg.MyClass.myMethod1 changed visibility from protected to public",
            "Method test.pkg.MyClass.myMethod2 changed visibility from public to protected",
            "Field test.pkg.MyClass.myField1 changed visibility from protected to public",
            "Field test.pkg.MyClass.myField3 has removed 'final' qualifier",
        ]
    );
    assert_eq!(
        kinds(&report),
        vec![
            IssueKind::ChangedScope,
            IssueKind::ChangedScope,
            IssueKind::ChangedScope,
            IssueKind::ChangedScope,
            IssueKind::RemovedFinal,
        ]
    );
}

#[test]
fn test_nested_class_compared_on_effective_visibility() {
    let old = snapshot(&in_package(
        "  public class Outer {\n  }\n  public static class Outer.Inner {\n    method public void run();\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  class Outer {\n  }\n  public static class Outer.Inner {\n    method public void run();\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(
        messages(&report),
        vec![
            "Class test.pkg.Outer changed visibility from public to package private",
            "Class test.pkg.Outer.Inner changed visibility from public to package private",
        ]
    );

    // Hidden on both sides, so dropping a member of the public inner class is not a change
    let hidden_old = snapshot(&in_package(
        "  class Outer {\n  }\n  public static class Outer.Inner {\n    method public void run();\n  }\n",
    ));
    let hidden_new = snapshot(&in_package(
        "  class Outer {\n  }\n  public static class Outer.Inner {\n  }\n",
    ));
    let report = check(&hidden_old, &hidden_new, CompatibilityMode::Released);
    assert!(report.all_issues.is_empty(), "{}", report.render());
}

#[test]
fn test_changed_implemented_interfaces() {
    let old = snapshot(&in_package(
        "  public abstract class Parent implements java.io.Closeable, java.util.Map {\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public abstract class Parent implements java.util.Map, java.util.List {\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Current);
    assert_eq!(
        kinds(&report),
        vec![IssueKind::AddedInterface, IssueKind::RemovedInterface]
    );
    assert_eq!(
        messages(&report),
        vec![
            "Added interface java.util.List to class class test.pkg.Parent",
            "Class test.pkg.Parent no longer implements java.io.Closeable",
        ]
    );

    let released = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&released), vec![IssueKind::RemovedInterface]);
}

#[test]
fn test_interface_still_reachable_through_subinterface() {
    let old = snapshot(&in_package(
        "  public interface Base {\n  }\n  public interface Child extends test.pkg.Base {\n  }\n  public class Impl implements test.pkg.Base {\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public interface Base {\n  }\n  public interface Child extends test.pkg.Base {\n  }\n  public class Impl implements test.pkg.Child {\n  }\n",
    ));

    let released = check(&old, &new, CompatibilityMode::Released);
    assert!(released.all_issues.is_empty(), "{}", released.render());

    let current = check(&old, &new, CompatibilityMode::Current);
    assert_eq!(kinds(&current), vec![IssueKind::AddedInterface]);
    assert_eq!(
        messages(&current),
        vec!["Added interface test.pkg.Child to class class test.pkg.Impl"]
    );
}

#[test]
fn test_field_qualifier_changes() {
    let old = snapshot(&in_package(
        "  public class Parent {\n    ctor public Parent();\n    field public static final int field1 = 1; // 0x1\n    field public static final int field2 = 2; // 0x2\n    field public int field3;\n    field public int field4 = 4; // 0x4\n    field public int field5;\n    field public int field6;\n    field public int field7;\n    field public deprecated int field8;\n    field public int field9;\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public class Parent {\n    ctor public Parent();\n    field public static final int field1 = 1; // 0x1\n    field public static final int field2 = 42; // 0x2a\n    field public char field3;\n    field public final int field4 = 4; // 0x4\n    field public static int field5;\n    field public transient int field6;\n    field public volatile int field7;\n    field public int field8;\n    field public deprecated int field9;\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(
        messages(&report),
        vec![
            "Field test.pkg.Parent.field2 has changed value from 2 to 42",
            "Field test.pkg.Parent.field3 has changed type from int to char",
            "Field test.pkg.Parent.field4 has added 'final' qualifier",
            "Field test.pkg.Parent.field5 has changed 'static' qualifier",
            "Field test.pkg.Parent.field6 has changed 'transient' qualifier",
            "Field test.pkg.Parent.field7 has changed 'volatile' qualifier",
            "Field test.pkg.Parent.field8 has changed deprecation state true --> false",
            "Field test.pkg.Parent.field9 has changed deprecation state false --> true",
        ]
    );
    assert_eq!(
        kinds(&report)[3..6],
        [
            IssueKind::ChangedStatic,
            IssueKind::ChangedTransient,
            IssueKind::ChangedVolatile,
        ]
    );
}

#[test]
fn test_added_package_in_current_mode() {
    let old = snapshot(&in_package("  public class Foo {\n  }\n"));
    let new = snapshot(&format!(
        "{}package test.other {{\n  public class Bar {{\n  }}\n}}\n",
        in_package("  public class Foo {\n  }\n")
    ));

    let report = check(&old, &new, CompatibilityMode::Current);
    assert_eq!(kinds(&report), vec![IssueKind::AddedPackage]);
    assert_eq!(messages(&report), vec!["Added package test.other"]);
    assert!(check(&old, &new, CompatibilityMode::Released)
        .all_issues
        .is_empty());
}

#[test]
fn test_removed_deprecated_class_and_field() {
    let old = snapshot(&in_package(
        "  public class Foo {\n    field public deprecated int count;\n  }\n  public deprecated class Legacy {\n  }\n",
    ));
    let new = snapshot(&in_package("  public class Foo {\n  }\n"));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(
        kinds(&report),
        vec![
            IssueKind::RemovedDeprecatedField,
            IssueKind::RemovedDeprecatedClass,
        ]
    );
    assert_eq!(
        messages(&report),
        vec![
            "Removed deprecated field test.pkg.Foo.count",
            "Removed deprecated class test.pkg.Legacy",
        ]
    );
}

#[test]
fn test_unresolved_supertype_is_a_warning() {
    let old = snapshot(&in_package("  public class Foo {\n  }\n"));
    let new = snapshot(&in_package(
        "  public class Foo extends test.pkg.Missing {\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(kinds(&report), vec![IssueKind::UnresolvedSymbol]);
    assert_eq!(report.issues[0].severity, Severity::Warning);
    assert_eq!(
        messages(&report),
        vec!["Unresolved supertype test.pkg.Missing of class test.pkg.Foo; its members were not considered"]
    );
    assert!(report.passed);

    // Already dangling in the previous API: nothing new to say
    let report = check(&new, &new, CompatibilityMode::Released);
    assert!(report.all_issues.is_empty(), "{}", report.render());
}

#[test]
fn test_final_changes_follow_declared_class_finality() {
    let old = snapshot(&in_package(
        "  public abstract class Outer {\n  }\n  public class Outer.Class1 {\n    method public void method1();\n  }\n  public final class Outer.Class2 {\n    method public void method2();\n  }\n  public final class Outer.Class3 {\n    method public final void method3();\n  }\n  public class Outer.Class4 {\n    method public final void method4();\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public abstract class Outer {\n  }\n  public class Outer.Class1 {\n    method public final void method1();\n  }\n  public final class Outer.Class2 {\n    method public final void method2();\n  }\n  public final class Outer.Class3 {\n    method public void method3();\n  }\n  public class Outer.Class4 {\n    method public void method4();\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(
        report.render(),
        "api.txt:6: error: Method test.pkg.Outer.Class1.method1 has added 'final' qualifier [AddedFinal]\n\
         api.txt:15: error: Method test.pkg.Outer.Class4.method4 has removed 'final' qualifier [RemovedFinal]\n"
    );
}

#[test]
fn test_narrowed_throws_clause_is_not_a_removal() {
    let old = snapshot(&in_package(
        "  public class Foo {\n    method public void m() throws java.io.IOException;\n  }\n",
    ));
    let new = snapshot(&in_package(
        "  public class Foo {\n    method public void m() throws java.io.FileNotFoundException;\n  }\n",
    ));

    let report = check(&old, &new, CompatibilityMode::Released);
    assert_eq!(
        messages(&report),
        vec!["Method test.pkg.Foo.m added thrown exception java.io.FileNotFoundException"]
    );
}
