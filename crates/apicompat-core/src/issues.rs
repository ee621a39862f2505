//! Issue taxonomy: every kind of difference or lint finding the checker can
//! report, with its default severity and legacy identifiers.

use crate::errors::{ApiError, ApiErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Effective severity of a reported issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hidden,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Hidden => "hidden",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueCategory {
    Compatibility,
    ApiLint,
    Diagnostic,
}

/// Closed set of issue kinds
///
/// Declaration order is the tie-break order when two differences share a
/// location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    // Compatibility
    AddedPackage,
    AddedClass,
    AddedInterface,
    AddedMethod,
    AddedAbstractMethod,
    AddedField,
    AddedFinal,
    AddedFinalUninstantiable,
    AddSealed,
    ChangedAbstract,
    ChangedClass,
    ChangedDefaultValue,
    ChangedDeprecated,
    ChangedReified,
    ChangedScope,
    ChangedStatic,
    ChangedSuperclass,
    ChangedThrows,
    ChangedTransient,
    ChangedType,
    ChangedValue,
    ChangedVolatile,
    DefaultValueChange,
    InfixRemoval,
    InvalidNullConversion,
    OperatorRemoval,
    ParameterNameChange,
    RemovedClass,
    RemovedDeprecatedClass,
    RemovedDeprecatedMethod,
    RemovedDeprecatedField,
    RemovedField,
    RemovedFinal,
    RemovedInterface,
    RemovedMethod,
    RemovedPackage,
    VarargRemoval,

    // API lint
    AcronymName,
    AllUpper,
    AutoBoxing,
    BannedThrow,
    CompileTimeConstant,
    EndsWithImpl,
    GenericException,
    MinMaxConstant,
    MissingNullability,
    StartWithLower,
    StartWithUpper,

    // Diagnostics about the run itself
    DeprecatedOption,
    UnresolvedSymbol,
}

struct IssueInfo {
    numeric_id: u32,
    category: IssueCategory,
    default_severity: Severity,
    rule: Option<&'static str>,
}

const fn compat(numeric_id: u32, default_severity: Severity) -> IssueInfo {
    IssueInfo {
        numeric_id,
        category: IssueCategory::Compatibility,
        default_severity,
        rule: None,
    }
}

const fn lint(numeric_id: u32, default_severity: Severity, rule: &'static str) -> IssueInfo {
    IssueInfo {
        numeric_id,
        category: IssueCategory::ApiLint,
        default_severity,
        rule: Some(rule),
    }
}

const fn diagnostic(numeric_id: u32, default_severity: Severity) -> IssueInfo {
    IssueInfo {
        numeric_id,
        category: IssueCategory::Diagnostic,
        default_severity,
        rule: None,
    }
}

impl IssueKind {
    pub const ALL: &'static [IssueKind] = &[
        IssueKind::AddedPackage,
        IssueKind::AddedClass,
        IssueKind::AddedInterface,
        IssueKind::AddedMethod,
        IssueKind::AddedAbstractMethod,
        IssueKind::AddedField,
        IssueKind::AddedFinal,
        IssueKind::AddedFinalUninstantiable,
        IssueKind::AddSealed,
        IssueKind::ChangedAbstract,
        IssueKind::ChangedClass,
        IssueKind::ChangedDefaultValue,
        IssueKind::ChangedDeprecated,
        IssueKind::ChangedReified,
        IssueKind::ChangedScope,
        IssueKind::ChangedStatic,
        IssueKind::ChangedSuperclass,
        IssueKind::ChangedThrows,
        IssueKind::ChangedTransient,
        IssueKind::ChangedType,
        IssueKind::ChangedValue,
        IssueKind::ChangedVolatile,
        IssueKind::DefaultValueChange,
        IssueKind::InfixRemoval,
        IssueKind::InvalidNullConversion,
        IssueKind::OperatorRemoval,
        IssueKind::ParameterNameChange,
        IssueKind::RemovedClass,
        IssueKind::RemovedDeprecatedClass,
        IssueKind::RemovedDeprecatedMethod,
        IssueKind::RemovedDeprecatedField,
        IssueKind::RemovedField,
        IssueKind::RemovedFinal,
        IssueKind::RemovedInterface,
        IssueKind::RemovedMethod,
        IssueKind::RemovedPackage,
        IssueKind::VarargRemoval,
        IssueKind::AcronymName,
        IssueKind::AllUpper,
        IssueKind::AutoBoxing,
        IssueKind::BannedThrow,
        IssueKind::CompileTimeConstant,
        IssueKind::EndsWithImpl,
        IssueKind::GenericException,
        IssueKind::MinMaxConstant,
        IssueKind::MissingNullability,
        IssueKind::StartWithLower,
        IssueKind::StartWithUpper,
        IssueKind::DeprecatedOption,
        IssueKind::UnresolvedSymbol,
    ];

    fn info(self) -> IssueInfo {
        use IssueKind::*;
        use Severity::{Error, Warning};
        match self {
            AddedPackage => compat(2, Error),
            AddedClass => compat(3, Error),
            AddedMethod => compat(4, Error),
            AddedField => compat(5, Error),
            AddedInterface => compat(6, Error),
            RemovedPackage => compat(7, Error),
            RemovedClass => compat(8, Error),
            RemovedMethod => compat(9, Error),
            RemovedField => compat(10, Error),
            RemovedInterface => compat(11, Error),
            ChangedStatic => compat(12, Error),
            AddedFinal => compat(13, Error),
            ChangedTransient => compat(14, Error),
            ChangedVolatile => compat(15, Error),
            ChangedType => compat(16, Error),
            ChangedValue => compat(17, Error),
            ChangedSuperclass => compat(18, Error),
            ChangedScope => compat(19, Error),
            ChangedAbstract => compat(20, Error),
            ChangedThrows => compat(21, Error),
            ChangedClass => compat(23, Error),
            ChangedDeprecated => compat(24, Error),
            AddedFinalUninstantiable => compat(26, Error),
            RemovedFinal => compat(27, Error),
            RemovedDeprecatedClass => compat(28, Error),
            RemovedDeprecatedMethod => compat(29, Error),
            RemovedDeprecatedField => compat(30, Error),
            AddedAbstractMethod => compat(31, Error),
            InvalidNullConversion => compat(40, Error),
            ParameterNameChange => compat(41, Error),
            OperatorRemoval => compat(42, Error),
            InfixRemoval => compat(43, Error),
            VarargRemoval => compat(44, Error),
            AddSealed => compat(45, Error),
            DefaultValueChange => compat(46, Error),
            ChangedReified => compat(47, Error),
            ChangedDefaultValue => compat(48, Warning),
            StartWithLower => lint(101, Error, "S1"),
            StartWithUpper => lint(102, Error, "S1"),
            AllUpper => lint(103, Error, "C2"),
            AcronymName => lint(104, Warning, "S1"),
            EndsWithImpl => IssueInfo {
                rule: None,
                ..lint(105, Error, "S1")
            },
            MinMaxConstant => lint(106, Warning, "C8"),
            CompileTimeConstant => lint(107, Error, "C8"),
            MissingNullability => lint(108, Error, "M12"),
            AutoBoxing => lint(109, Error, "M11"),
            GenericException => lint(110, Error, "S1"),
            BannedThrow => lint(111, Error, "S1"),
            DeprecatedOption => diagnostic(201, Warning),
            UnresolvedSymbol => diagnostic(202, Warning),
        }
    }

    /// Canonical name used in output and configuration
    pub fn name(self) -> &'static str {
        use IssueKind::*;
        match self {
            AddedPackage => "AddedPackage",
            AddedClass => "AddedClass",
            AddedInterface => "AddedInterface",
            AddedMethod => "AddedMethod",
            AddedAbstractMethod => "AddedAbstractMethod",
            AddedField => "AddedField",
            AddedFinal => "AddedFinal",
            AddedFinalUninstantiable => "AddedFinalUninstantiable",
            AddSealed => "AddSealed",
            ChangedAbstract => "ChangedAbstract",
            ChangedClass => "ChangedClass",
            ChangedDefaultValue => "ChangedDefaultValue",
            ChangedDeprecated => "ChangedDeprecated",
            ChangedReified => "ChangedReified",
            ChangedScope => "ChangedScope",
            ChangedStatic => "ChangedStatic",
            ChangedSuperclass => "ChangedSuperclass",
            ChangedThrows => "ChangedThrows",
            ChangedTransient => "ChangedTransient",
            ChangedType => "ChangedType",
            ChangedValue => "ChangedValue",
            ChangedVolatile => "ChangedVolatile",
            DefaultValueChange => "DefaultValueChange",
            InfixRemoval => "InfixRemoval",
            InvalidNullConversion => "InvalidNullConversion",
            OperatorRemoval => "OperatorRemoval",
            ParameterNameChange => "ParameterNameChange",
            RemovedClass => "RemovedClass",
            RemovedDeprecatedClass => "RemovedDeprecatedClass",
            RemovedDeprecatedMethod => "RemovedDeprecatedMethod",
            RemovedDeprecatedField => "RemovedDeprecatedField",
            RemovedField => "RemovedField",
            RemovedFinal => "RemovedFinal",
            RemovedInterface => "RemovedInterface",
            RemovedMethod => "RemovedMethod",
            RemovedPackage => "RemovedPackage",
            VarargRemoval => "VarargRemoval",
            AcronymName => "AcronymName",
            AllUpper => "AllUpper",
            AutoBoxing => "AutoBoxing",
            BannedThrow => "BannedThrow",
            CompileTimeConstant => "CompileTimeConstant",
            EndsWithImpl => "EndsWithImpl",
            GenericException => "GenericException",
            MinMaxConstant => "MinMaxConstant",
            MissingNullability => "MissingNullability",
            StartWithLower => "StartWithLower",
            StartWithUpper => "StartWithUpper",
            DeprecatedOption => "DeprecatedOption",
            UnresolvedSymbol => "UnresolvedSymbol",
        }
    }

    /// Legacy numeric identifier, still accepted (with a deprecation warning)
    pub fn numeric_id(self) -> u32 {
        self.info().numeric_id
    }

    pub fn category(self) -> IssueCategory {
        self.info().category
    }

    pub fn default_severity(self) -> Severity {
        self.info().default_severity
    }

    /// API guideline rule the kind enforces, if any
    pub fn rule(self) -> Option<&'static str> {
        self.info().rule
    }

    /// `Added*` kinds describe API growth rather than breakage
    pub fn is_addition(self) -> bool {
        matches!(
            self,
            IssueKind::AddedPackage
                | IssueKind::AddedClass
                | IssueKind::AddedInterface
                | IssueKind::AddedMethod
                | IssueKind::AddedAbstractMethod
                | IssueKind::AddedField
        )
    }

    /// Exact, case-sensitive lookup by canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn from_numeric_id(id: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.numeric_id() == id)
    }

    pub fn from_name_ignore_case(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of resolving one issue id given in configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIssue {
    pub kind: IssueKind,
    /// Set when a deprecated spelling was used; names the canonical one
    pub deprecation: Option<String>,
}

/// Resolve an issue id as written after a severity flag (`--hide`, `--error`, ...)
///
/// Exact names are preferred; numeric ids and case-insensitive names are
/// still accepted but produce a deprecation note.
///
/// # Errors
///
/// `UnknownIssue` when nothing matches.
pub fn resolve_issue_id(id: &str, flag: &str) -> Result<ResolvedIssue> {
    let id = id.trim();
    if let Some(kind) = IssueKind::from_name(id) {
        return Ok(ResolvedIssue {
            kind,
            deprecation: None,
        });
    }
    if let Some(kind) = id.parse::<u32>().ok().and_then(IssueKind::from_numeric_id) {
        return Ok(ResolvedIssue {
            kind,
            deprecation: Some(format!(
                "Issue lookup by numeric id is deprecated, use {} {} instead of {} {}",
                flag,
                kind.name(),
                flag,
                id
            )),
        });
    }
    if let Some(kind) = IssueKind::from_name_ignore_case(id) {
        return Ok(ResolvedIssue {
            kind,
            deprecation: Some(format!(
                "Case-insensitive issue matching is deprecated, use {} {} instead of {} {}",
                flag,
                kind.name(),
                flag,
                id
            )),
        });
    }
    Err(ApiError::new(ApiErrorKind::UnknownIssue)
        .with_op("resolve_issue_id")
        .with_message(format!("Unknown issue id: {} {}", flag, id)))
}
