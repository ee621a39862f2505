//! Compatibility classifier: walks two snapshots in lockstep and emits one
//! [`Difference`] per incompatible (or, in current mode, additive) change.

use crate::diff::model::Difference;
use crate::diff::types::{describe_type, same_type, TypeScope};
use crate::issues::IssueKind;
use crate::model::hierarchy::{is_object_method, JAVA_LANG_OBJECT};
use crate::model::{
    ClassItem, ClassKind, CodebaseSnapshot, DefaultValue, FieldItem, MethodItem, Modifiers,
    Nullness, SourceLocation, Visibility,
};
use crate::policy::CompatibilityMode;
use std::collections::BTreeSet;

/// Classify every difference between `old` and `new`
///
/// The result is sorted by location, issue kind and message, so equal inputs
/// always give the same list. In [`CompatibilityMode::Released`] additions
/// are not emitted at all (adding an abstract method still is).
pub fn classify(
    old: &CodebaseSnapshot,
    new: &CodebaseSnapshot,
    mode: CompatibilityMode,
) -> Vec<Difference> {
    let mut classifier = Classifier {
        old,
        new,
        mode,
        differences: Vec::new(),
    };
    classifier.compare_packages();
    classifier.check_unresolved_supertypes();
    let mut differences = classifier.differences;
    differences.sort();
    differences.dedup();
    differences
}

struct Classifier<'a> {
    old: &'a CodebaseSnapshot,
    new: &'a CodebaseSnapshot,
    mode: CompatibilityMode,
    differences: Vec<Difference>,
}

fn flag_name(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn member_visibility(snapshot: &CodebaseSnapshot, class: &ClassItem, modifiers: &Modifiers) -> Visibility {
    snapshot.effective_member_visibility(class, modifiers.visibility)
}

fn normalize_expression(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl<'a> Classifier<'a> {
    fn report(
        &mut self,
        kind: IssueKind,
        element: impl Into<String>,
        location: &SourceLocation,
        message: String,
    ) {
        self.differences
            .push(Difference::new(kind, element, location.clone(), message));
    }

    fn reports_additions(&self) -> bool {
        self.mode == CompatibilityMode::Current
    }

    // ---- packages and classes ----

    fn compare_packages(&mut self) {
        let (old, new) = (self.old, self.new);
        let names: BTreeSet<&str> = old.package_names().chain(new.package_names()).collect();
        for name in names {
            match (old.package(name), new.package(name)) {
                (Some(old_pkg), None) => {
                    if old_pkg.classes.values().any(|c| old.is_api_visible(c)) {
                        self.report(
                            IssueKind::RemovedPackage,
                            name,
                            &old_pkg.location,
                            format!("Removed package {}", name),
                        );
                    }
                }
                (None, Some(new_pkg)) => {
                    if self.reports_additions()
                        && new_pkg.classes.values().any(|c| new.is_api_visible(c))
                    {
                        self.report(
                            IssueKind::AddedPackage,
                            name,
                            &new_pkg.location,
                            format!("Added package {}", name),
                        );
                    }
                }
                (Some(old_pkg), Some(new_pkg)) => {
                    let class_names: BTreeSet<&String> =
                        old_pkg.classes.keys().chain(new_pkg.classes.keys()).collect();
                    for class_name in class_names {
                        match (old_pkg.classes.get(class_name), new_pkg.classes.get(class_name)) {
                            (Some(oc), Some(nc)) => self.compare_class(oc, nc),
                            (Some(oc), None) => self.removed_class(oc),
                            (None, Some(nc)) => self.added_class(nc),
                            (None, None) => {}
                        }
                    }
                }
                (None, None) => {}
            }
        }
    }

    fn removed_class(&mut self, oc: &ClassItem) {
        if !self.old.is_api_visible(oc) {
            return;
        }
        // Only the outermost removed class is reported
        if let Some(outer) = &oc.containing_class {
            if self.old.contains_class(outer) && !self.new.contains_class(outer) {
                return;
            }
        }
        let (kind, message) = if oc.modifiers.is_deprecated {
            (
                IssueKind::RemovedDeprecatedClass,
                format!("Removed deprecated class {}", oc.qualified_name),
            )
        } else {
            (
                IssueKind::RemovedClass,
                format!("Removed class {}", oc.qualified_name),
            )
        };
        self.report(kind, oc.qualified_name.clone(), &oc.location, message);
    }

    fn added_class(&mut self, nc: &ClassItem) {
        if !self.reports_additions() || !self.new.is_api_visible(nc) {
            return;
        }
        if let Some(outer) = &nc.containing_class {
            if self.new.contains_class(outer) && !self.old.contains_class(outer) {
                return;
            }
        }
        let kind = if nc.kind.is_interface_like() {
            IssueKind::AddedInterface
        } else {
            IssueKind::AddedClass
        };
        self.report(
            kind,
            nc.qualified_name.clone(),
            &nc.location,
            format!("Added class {}", nc.qualified_name),
        );
    }

    fn compare_class(&mut self, oc: &ClassItem, nc: &ClassItem) {
        let old_vis = self.old.effective_class_visibility(oc);
        let new_vis = self.new.effective_class_visibility(nc);
        match (old_vis.is_api(), new_vis.is_api()) {
            (false, false) => return,
            (false, true) => return self.added_class(nc),
            _ => {}
        }

        let name = nc.qualified_name.clone();
        let location = nc.location.clone();

        if old_vis != new_vis {
            self.report(
                IssueKind::ChangedScope,
                name.clone(),
                &location,
                format!(
                    "Class {} changed visibility from {} to {}",
                    name, old_vis, new_vis
                ),
            );
        }
        if !new_vis.is_api() {
            return;
        }

        if oc.kind.is_interface_like() != nc.kind.is_interface_like() {
            self.report(
                IssueKind::ChangedClass,
                name.clone(),
                &location,
                format!("Class {} changed class/interface declaration", name),
            );
        }

        self.compare_interfaces(oc, nc);

        if !nc.kind.is_interface_like()
            && !oc.kind.is_interface_like()
            && oc.modifiers.is_abstract != nc.modifiers.is_abstract
        {
            self.report(
                IssueKind::ChangedAbstract,
                name.clone(),
                &location,
                format!("Class {} changed 'abstract' qualifier", name),
            );
        }
        if oc.modifiers.is_static != nc.modifiers.is_static {
            self.report(
                IssueKind::ChangedStatic,
                name.clone(),
                &location,
                format!("Class {} changed 'static' qualifier", name),
            );
        }
        if !oc.modifiers.is_final && nc.modifiers.is_final && oc.kind == ClassKind::Class {
            if !self.old.is_effectively_final(oc) {
                self.report(
                    IssueKind::AddedFinal,
                    name.clone(),
                    &location,
                    format!("Class {} added 'final' qualifier", name),
                );
            } else {
                self.report(
                    IssueKind::AddedFinalUninstantiable,
                    name.clone(),
                    &location,
                    format!(
                        "Class {} added 'final' qualifier but was previously uninstantiable and therefore could not be subclassed",
                        name
                    ),
                );
            }
        }
        if oc.modifiers.is_final && !nc.modifiers.is_final && nc.kind == ClassKind::Class {
            self.report(
                IssueKind::RemovedFinal,
                name.clone(),
                &location,
                format!("Class {} removed 'final' qualifier", name),
            );
        }
        if oc.modifiers.is_deprecated != nc.modifiers.is_deprecated {
            self.report(
                IssueKind::ChangedDeprecated,
                name.clone(),
                &location,
                format!(
                    "Class {} has changed deprecation state {} --> {}",
                    name,
                    flag_name(oc.modifiers.is_deprecated),
                    flag_name(nc.modifiers.is_deprecated)
                ),
            );
        }

        self.compare_superclass(oc, nc);

        if oc.type_params.len() != nc.type_params.len() {
            self.report(
                IssueKind::ChangedType,
                name.clone(),
                &location,
                format!(
                    "Class {} changed number of type parameters from {} to {}",
                    name,
                    oc.type_params.len(),
                    nc.type_params.len()
                ),
            );
        }
        if !oc.modifiers.is_sealed && nc.modifiers.is_sealed {
            self.report(
                IssueKind::AddSealed,
                name.clone(),
                &location.without_line(),
                format!(
                    "Cannot add 'sealed' modifier to class {}: Incompatible change",
                    name
                ),
            );
        }

        self.compare_members(oc, nc);
    }

    fn compare_interfaces(&mut self, oc: &ClassItem, nc: &ClassItem) {
        let old_all = self.old.all_interfaces(oc);
        let new_all = self.new.all_interfaces(nc);
        let name = &nc.qualified_name;
        for iface in oc.interface_names() {
            if !new_all.contains(iface) {
                self.report(
                    IssueKind::RemovedInterface,
                    name.clone(),
                    &nc.location,
                    format!("Class {} no longer implements {}", name, iface),
                );
            }
        }
        if self.reports_additions() {
            for iface in nc.interface_names() {
                if !old_all.contains(iface) {
                    self.report(
                        IssueKind::AddedInterface,
                        name.clone(),
                        &nc.location,
                        format!("Added interface {} to class class {}", iface, name),
                    );
                }
            }
        }
    }

    fn compare_superclass(&mut self, oc: &ClassItem, nc: &ClassItem) {
        if oc.kind.is_interface_like() || nc.kind.is_interface_like() {
            return;
        }
        let old_super = oc
            .superclass
            .as_ref()
            .and_then(|s| s.class_name())
            .unwrap_or(JAVA_LANG_OBJECT);
        if old_super == JAVA_LANG_OBJECT || nc.kind == ClassKind::Enum {
            return;
        }
        // Inserting an intermediate superclass keeps the old one reachable
        if self.new.superclass_names(nc).iter().any(|s| s == old_super) {
            return;
        }
        let new_super = nc
            .superclass
            .as_ref()
            .and_then(|s| s.class_name())
            .unwrap_or(JAVA_LANG_OBJECT);
        self.report(
            IssueKind::ChangedSuperclass,
            nc.qualified_name.clone(),
            &nc.location,
            format!(
                "Class {} superclass changed from {} to {}",
                nc.qualified_name, old_super, new_super
            ),
        );
    }

    // ---- members ----

    fn compare_members(&mut self, oc: &ClassItem, nc: &ClassItem) {
        for (old_map, new_map) in [(&oc.constructors, &nc.constructors), (&oc.methods, &nc.methods)] {
            let keys: BTreeSet<&String> = old_map.keys().chain(new_map.keys()).collect();
            for key in keys {
                match (old_map.get(key), new_map.get(key)) {
                    (Some(om), Some(nm)) => self.compare_method(oc, om, nc, nm, key),
                    (Some(om), None) => self.removed_method(oc, om, nc, key),
                    (None, Some(nm)) => self.added_method(oc, nc, nm, key),
                    (None, None) => {}
                }
            }
        }

        let names: BTreeSet<&String> = oc.fields.keys().chain(nc.fields.keys()).collect();
        for name in names {
            match (oc.fields.get(name), nc.fields.get(name)) {
                (Some(of), Some(nf)) => self.compare_field(oc, of, nc, nf),
                (Some(of), None) => self.removed_field(oc, of, nc),
                (None, Some(nf)) => self.added_field(oc, nc, nf),
                (None, None) => {}
            }
        }
    }

    fn removed_method(&mut self, oc: &ClassItem, om: &MethodItem, nc: &ClassItem, key: &str) {
        if !member_visibility(self.old, oc, &om.modifiers).is_api() {
            return;
        }
        if !om.is_constructor
            && (is_object_method(key) || self.new.inherited_method(nc, key).is_some())
        {
            return;
        }
        let deprecated = om.modifiers.is_deprecated || oc.modifiers.is_deprecated;
        let what = if om.is_constructor { "constructor" } else { "method" };
        let (kind, message) = if deprecated {
            (
                IssueKind::RemovedDeprecatedMethod,
                format!("Removed deprecated {} {}", what, om.describe()),
            )
        } else {
            (
                IssueKind::RemovedMethod,
                format!("Removed {} {}", what, om.describe()),
            )
        };
        self.report(kind, oc.member_element(key), &om.location, message);
    }

    fn added_method(&mut self, oc: &ClassItem, nc: &ClassItem, nm: &MethodItem, key: &str) {
        if !member_visibility(self.new, nc, &nm.modifiers).is_api() {
            return;
        }
        if !nm.is_constructor
            && (is_object_method(key) || self.old.inherited_method(oc, key).is_some())
        {
            return;
        }
        let subclassable = nc.kind.is_interface_like() || nc.modifiers.is_abstract;
        let abstract_added = !nm.is_constructor
            && nm.modifiers.is_abstract
            && subclassable
            && nm.annotation_default.is_none();
        let what = if nm.is_constructor { "constructor" } else { "method" };
        let message = format!("Added {} {}", what, nm.describe());
        if abstract_added {
            self.report(
                IssueKind::AddedAbstractMethod,
                nc.member_element(key),
                &nm.location,
                message,
            );
        } else if self.reports_additions() {
            self.report(IssueKind::AddedMethod, nc.member_element(key), &nm.location, message);
        }
    }

    fn compare_method(
        &mut self,
        oc: &ClassItem,
        om: &MethodItem,
        nc: &ClassItem,
        nm: &MethodItem,
        key: &str,
    ) {
        let old_vis = member_visibility(self.old, oc, &om.modifiers);
        let new_vis = member_visibility(self.new, nc, &nm.modifiers);
        match (old_vis.is_api(), new_vis.is_api()) {
            (false, false) => return,
            (false, true) => return self.added_method(oc, nc, nm, key),
            _ => {}
        }

        let label = if nm.is_constructor { "Constructor" } else { "Method" };
        let subject = if nm.is_constructor {
            nm.containing_class.clone()
        } else {
            nm.qualified_name()
        };
        let element = nc.member_element(key);
        let location = nm.location.clone();
        let report = |this: &mut Self, kind: IssueKind, message: String| {
            this.report(kind, element.clone(), &location, message);
        };

        if old_vis != new_vis {
            report(
                self,
                IssueKind::ChangedScope,
                format!(
                    "{} {} changed visibility from {} to {}",
                    label, subject, old_vis, new_vis
                ),
            );
        }
        if !new_vis.is_api() {
            return;
        }

        let (om_mods, nm_mods) = (&om.modifiers, &nm.modifiers);
        let interface_default = nc.kind.is_interface_like() && om_mods.is_abstract && nm_mods.is_default;
        if om_mods.is_abstract != nm_mods.is_abstract && !interface_default {
            report(
                self,
                IssueKind::ChangedAbstract,
                format!("{} {} has changed 'abstract' qualifier", label, subject),
            );
        }
        if om_mods.is_static != nm_mods.is_static {
            report(
                self,
                IssueKind::ChangedStatic,
                format!("{} {} has changed 'static' qualifier", label, subject),
            );
        }
        if !om_mods.is_final
            && nm_mods.is_final
            && !om_mods.is_static
            && !oc.prevents_overrides()
        {
            report(
                self,
                IssueKind::AddedFinal,
                format!("{} {} has added 'final' qualifier", label, subject),
            );
        }
        if om_mods.is_final && !nm_mods.is_final && !nc.prevents_overrides() {
            report(
                self,
                IssueKind::RemovedFinal,
                format!("{} {} has removed 'final' qualifier", label, subject),
            );
        }
        if om_mods.is_deprecated != nm_mods.is_deprecated {
            report(
                self,
                IssueKind::ChangedDeprecated,
                format!(
                    "{} {} has changed deprecation state {} --> {}",
                    label,
                    subject,
                    flag_name(om_mods.is_deprecated),
                    flag_name(nm_mods.is_deprecated)
                ),
            );
        }

        let old_scope = TypeScope::method(&om.type_params, &oc.type_params);
        let new_scope = TypeScope::method(&nm.type_params, &nc.type_params);
        if let (Some(old_ret), Some(new_ret)) = (&om.return_type, &nm.return_type) {
            if !same_type(old_ret, old_scope, new_ret, new_scope) {
                let (from, to) = if old_ret.is_variable() && new_ret.is_variable() {
                    (describe_type(old_ret, old_scope), describe_type(new_ret, new_scope))
                } else {
                    (old_ret.to_string(), new_ret.to_string())
                };
                report(
                    self,
                    IssueKind::ChangedType,
                    format!(
                        "{} {} has changed return type from {} to {}",
                        label, subject, from, to
                    ),
                );
            }
            if !new_ret.is_primitive() {
                if let Some(message) = return_null_conversion(om.return_nullness, nm.return_nullness, nm) {
                    report(self, IssueKind::InvalidNullConversion, message);
                }
            }
        }

        let is_finalize = nm.name == "finalize" && nm.parameters.is_empty();
        if !is_finalize {
            let old_throws: Vec<&str> = om.throws.iter().filter_map(|t| t.class_name()).collect();
            let new_throws: Vec<&str> = nm.throws.iter().filter_map(|t| t.class_name()).collect();
            for exception in &old_throws {
                // Throwing only subclasses of a dropped exception narrows the clause
                let narrowed = new_throws
                    .iter()
                    .any(|thrown| self.new.is_subclass_of(thrown, exception));
                if !narrowed {
                    report(
                        self,
                        IssueKind::ChangedThrows,
                        format!("{} {} no longer throws exception {}", label, subject, exception),
                    );
                }
            }
            for exception in &new_throws {
                if !old_throws.contains(exception) {
                    report(
                        self,
                        IssueKind::ChangedThrows,
                        format!("{} {} added thrown exception {}", label, subject, exception),
                    );
                }
            }
        }

        for (op, np) in om.parameters.iter().zip(&nm.parameters) {
            if let Some(old_name) = op.public_name.as_deref().filter(|n| !n.starts_with('_')) {
                match np.public_name.as_deref() {
                    None => report(
                        self,
                        IssueKind::ParameterNameChange,
                        format!(
                            "Attempted to remove parameter name from parameter {} in {} in method {}",
                            np.name, subject, subject
                        ),
                    ),
                    Some(new_name) if new_name != old_name => report(
                        self,
                        IssueKind::ParameterNameChange,
                        format!(
                            "Attempted to change parameter name from {} to {} in method {}",
                            old_name, new_name, subject
                        ),
                    ),
                    Some(_) => {}
                }
            }

            match (&op.default_value, &np.default_value) {
                (old_default, DefaultValue::None) if old_default.is_present() => report(
                    self,
                    IssueKind::DefaultValueChange,
                    format!(
                        "Attempted to remove default value from parameter {} in {} in method {}",
                        np.name, subject, subject
                    ),
                ),
                (DefaultValue::Value(a), DefaultValue::Value(b))
                    if normalize_expression(a) != normalize_expression(b) =>
                {
                    report(
                        self,
                        IssueKind::ChangedDefaultValue,
                        format!(
                            "{} {} has changed default value of parameter {} from {} to {}",
                            label, subject, np.name, a, b
                        ),
                    )
                }
                _ => {}
            }

            if op.varargs != np.varargs {
                let direction = if op.varargs {
                    "from varargs to array"
                } else {
                    "from array to varargs"
                };
                report(
                    self,
                    IssueKind::VarargRemoval,
                    format!(
                        "Changing {} is an incompatible change: parameter {} in {}",
                        direction,
                        np.name,
                        nm.describe_with_names()
                    ),
                );
            }

            if !np.ty.is_primitive() {
                let target = format!("parameter {} in {}", np.name, nm.describe_with_names());
                let message = match (op.nullness, np.nullness) {
                    (Nullness::Nullable, Nullness::Unannotated) => Some(format!(
                        "Attempted to remove @Nullable annotation from {}",
                        target
                    )),
                    (Nullness::NonNull, Nullness::Unannotated) => Some(format!(
                        "Attempted to remove @NonNull annotation from {}",
                        target
                    )),
                    (Nullness::Nullable, Nullness::NonNull) => Some(format!(
                        "Attempted to change parameter from @Nullable to @NonNull: incompatible change for {}",
                        target
                    )),
                    _ => None,
                };
                if let Some(message) = message {
                    report(self, IssueKind::InvalidNullConversion, message);
                }
            }
        }

        if om_mods.is_operator && !nm_mods.is_operator {
            report(
                self,
                IssueKind::OperatorRemoval,
                format!(
                    "Cannot remove `operator` modifier from method {}: Incompatible change",
                    nm.describe()
                ),
            );
        }
        if om_mods.is_infix && !nm_mods.is_infix {
            report(
                self,
                IssueKind::InfixRemoval,
                format!(
                    "Cannot remove `infix` modifier from method {}: Incompatible change",
                    nm.describe()
                ),
            );
        }

        for (index, param) in nm.type_params.iter().enumerate() {
            let was_reified = om.type_params.get(index).is_some_and(|p| p.reified);
            if param.reified && !was_reified {
                report(
                    self,
                    IssueKind::ChangedReified,
                    format!(
                        "{} {} made type variable {} reified: incompatible change",
                        label, subject, param.name
                    ),
                );
            }
        }

        if nc.kind == ClassKind::Annotation && om.annotation_default != nm.annotation_default {
            report(
                self,
                IssueKind::ChangedValue,
                format!(
                    "{} {} has changed value from {} to {}",
                    label,
                    subject,
                    om.annotation_default.as_deref().unwrap_or("nothing"),
                    nm.annotation_default.as_deref().unwrap_or("nothing")
                ),
            );
        }
    }

    fn removed_field(&mut self, oc: &ClassItem, of: &FieldItem, nc: &ClassItem) {
        if !member_visibility(self.old, oc, &of.modifiers).is_api() {
            return;
        }
        if self.new.inherited_field(nc, &of.name).is_some() {
            return;
        }
        let (kind, message) = if of.modifiers.is_deprecated || oc.modifiers.is_deprecated {
            (
                IssueKind::RemovedDeprecatedField,
                format!("Removed deprecated field {}", of.qualified_name()),
            )
        } else {
            (
                IssueKind::RemovedField,
                format!("Removed field {}", of.qualified_name()),
            )
        };
        self.report(kind, oc.member_element(&of.name), &of.location, message);
    }

    fn added_field(&mut self, oc: &ClassItem, nc: &ClassItem, nf: &FieldItem) {
        if !self.reports_additions() || !member_visibility(self.new, nc, &nf.modifiers).is_api() {
            return;
        }
        if self.old.inherited_field(oc, &nf.name).is_some() {
            return;
        }
        self.report(
            IssueKind::AddedField,
            nc.member_element(&nf.name),
            &nf.location,
            format!("Added field {}", nf.qualified_name()),
        );
    }

    fn compare_field(&mut self, oc: &ClassItem, of: &FieldItem, nc: &ClassItem, nf: &FieldItem) {
        let old_vis = member_visibility(self.old, oc, &of.modifiers);
        let new_vis = member_visibility(self.new, nc, &nf.modifiers);
        match (old_vis.is_api(), new_vis.is_api()) {
            (false, false) => return,
            (false, true) => return self.added_field(oc, nc, nf),
            _ => {}
        }

        let subject = nf.qualified_name();
        let element = nc.member_element(&nf.name);
        let location = nf.location.clone();
        let report = |this: &mut Self, kind: IssueKind, message: String| {
            this.report(kind, element.clone(), &location, message);
        };

        if old_vis != new_vis {
            report(
                self,
                IssueKind::ChangedScope,
                format!(
                    "Field {} changed visibility from {} to {}",
                    subject, old_vis, new_vis
                ),
            );
        }
        if !new_vis.is_api() {
            return;
        }

        if !of.is_enum_constant && !nf.is_enum_constant {
            let old_scope = TypeScope::class(&oc.type_params);
            let new_scope = TypeScope::class(&nc.type_params);
            if !same_type(&of.ty, old_scope, &nf.ty, new_scope) {
                report(
                    self,
                    IssueKind::ChangedType,
                    format!(
                        "Field {} has changed type from {} to {}",
                        subject, of.ty, nf.ty
                    ),
                );
            } else if nf.is_static_final() && of.constant_value != nf.constant_value
            {
                report(
                    self,
                    IssueKind::ChangedValue,
                    format!(
                        "Field {} has changed value from {} to {}",
                        subject,
                        of.constant_value.as_deref().unwrap_or("nothing/not constant"),
                        nf.constant_value.as_deref().unwrap_or("nothing/not constant")
                    ),
                );
            }
        }

        let (om, nm) = (&of.modifiers, &nf.modifiers);
        if !om.is_final && nm.is_final {
            report(
                self,
                IssueKind::AddedFinal,
                format!("Field {} has added 'final' qualifier", subject),
            );
        }
        if om.is_final && !nm.is_final {
            report(
                self,
                IssueKind::RemovedFinal,
                format!("Field {} has removed 'final' qualifier", subject),
            );
        }
        let flips = [
            (om.is_static, nm.is_static, IssueKind::ChangedStatic, "static"),
            (om.is_transient, nm.is_transient, IssueKind::ChangedTransient, "transient"),
            (om.is_volatile, nm.is_volatile, IssueKind::ChangedVolatile, "volatile"),
        ];
        for (before, after, kind, qualifier) in flips {
            if before != after {
                report(
                    self,
                    kind,
                    format!("Field {} has changed '{}' qualifier", subject, qualifier),
                );
            }
        }
        if om.is_deprecated != nm.is_deprecated {
            report(
                self,
                IssueKind::ChangedDeprecated,
                format!(
                    "Field {} has changed deprecation state {} --> {}",
                    subject,
                    flag_name(om.is_deprecated),
                    flag_name(nm.is_deprecated)
                ),
            );
        }
    }

    // ---- diagnostics ----

    /// Warn once per class whose supertype lives in a known package but is missing
    ///
    /// A class whose old declaration names the same supertypes was already
    /// in that state, so it is not reported again.
    fn check_unresolved_supertypes(&mut self) {
        let (old, new) = (self.old, self.new);
        for class in new.classes() {
            if !new.is_api_visible(class) {
                continue;
            }
            let unchanged = old.class(&class.qualified_name).is_some_and(|previous| {
                previous.superclass == class.superclass && previous.interfaces == class.interfaces
            });
            if unchanged {
                continue;
            }
            let unresolved = class
                .superclass
                .iter()
                .chain(class.interfaces.iter())
                .filter_map(|t| t.class_name())
                .find(|name| {
                    !new.contains_class(name)
                        && new
                            .package_of(name)
                            .is_some_and(|p| name.starts_with(&format!("{}.", p.name)))
                });
            if let Some(name) = unresolved {
                self.report(
                    IssueKind::UnresolvedSymbol,
                    class.qualified_name.clone(),
                    &class.location,
                    format!(
                        "Unresolved supertype {} of class {}; its members were not considered",
                        name, class.qualified_name
                    ),
                );
            }
        }
    }
}

fn return_null_conversion(old: Nullness, new: Nullness, method: &MethodItem) -> Option<String> {
    match (old, new) {
        (Nullness::Nullable, Nullness::Unannotated) => Some(format!(
            "Attempted to remove @Nullable annotation from method {}",
            method.describe()
        )),
        (Nullness::NonNull, Nullness::Unannotated) => Some(format!(
            "Attempted to remove @NonNull annotation from method {}",
            method.describe()
        )),
        (Nullness::NonNull, Nullness::Nullable) => Some(format!(
            "Attempted to change method return from @NonNull to @Nullable: incompatible change for method {}",
            method.describe()
        )),
        _ => None,
    }
}
