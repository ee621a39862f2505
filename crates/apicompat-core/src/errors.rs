use thiserror::Error;

/// Result type alias using ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    // Loading
    /// Signature text could not be parsed
    InvalidSignature,
    /// A snapshot violates an identity invariant (duplicate class, method or field)
    DuplicateItem,
    /// A deserialized snapshot is internally inconsistent
    InvalidSnapshot,

    // Configuration
    /// An issue id given in configuration matches no known issue
    UnknownIssue,
    /// The same issue was given two different severities in one configuration
    ConflictingSeverity,
    /// Configuration document is malformed
    InvalidConfig,
    /// Baseline document is malformed
    InvalidBaseline,

    // Integration
    Serialization,
}

impl ApiErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorKind::InvalidSignature => "ERR_INVALID_SIGNATURE",
            ApiErrorKind::DuplicateItem => "ERR_DUPLICATE_ITEM",
            ApiErrorKind::InvalidSnapshot => "ERR_INVALID_SNAPSHOT",
            ApiErrorKind::UnknownIssue => "ERR_UNKNOWN_ISSUE",
            ApiErrorKind::ConflictingSeverity => "ERR_CONFLICTING_SEVERITY",
            ApiErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ApiErrorKind::InvalidBaseline => "ERR_INVALID_BASELINE",
            ApiErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context for debugging: the
/// operation that failed, the API element involved and a file position.
#[derive(Debug, Clone)]
pub struct ApiError {
    kind: ApiErrorKind,
    op: Option<String>,
    element: Option<String>,
    file: Option<String>,
    line: Option<u32>,
    message: String,
}

impl ApiError {
    /// Create a new error with the specified kind
    pub fn new(kind: ApiErrorKind) -> Self {
        Self {
            kind,
            op: None,
            element: None,
            file: None,
            line: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add API element context (e.g. `test.pkg.Foo#bar(int)`)
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Add file context
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Add line context
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the element context, if any
    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    /// Get the file context, if any
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Get the line context, if any
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(element) = &self.element {
            write!(f, " (element: {})", element)?;
        }
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, " (at {}:{})", file, line)?,
            (Some(file), None) => write!(f, " (at {})", file)?,
            _ => {}
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

// ========== End Error Facility ==========

/// Failures raised while reading a signature file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignatureError {
    /// The format header names a version this reader does not understand
    #[error("{file}:{line}: Unsupported signature format version {version}")]
    UnsupportedFormat {
        file: String,
        line: u32,
        version: String,
    },

    /// A declaration appeared outside of any `package` block
    #[error("{file}:{line}: Declaration outside of a package: {text}")]
    OutsidePackage { file: String, line: u32, text: String },

    /// A member declaration appeared outside of a class body
    #[error("{file}:{line}: Member declaration outside of a class: {text}")]
    OutsideClass { file: String, line: u32, text: String },

    /// A line could not be interpreted
    #[error("{file}:{line}: Unexpected line: {text}")]
    UnexpectedLine { file: String, line: u32, text: String },

    /// A declaration was recognised but is malformed
    #[error("{file}:{line}: Invalid declaration: {reason}")]
    InvalidDeclaration {
        file: String,
        line: u32,
        reason: String,
    },

    /// A type expression could not be parsed
    #[error("{file}:{line}: Invalid type `{text}`")]
    InvalidType { file: String, line: u32, text: String },

    /// Braces do not balance by end of input
    #[error("{file}:{line}: Unbalanced braces at end of file")]
    UnbalancedBraces { file: String, line: u32 },

    /// The same element was declared twice
    #[error("{file}:{line}: Duplicate declaration of {element}")]
    Duplicate {
        file: String,
        line: u32,
        element: String,
    },
}

impl SignatureError {
    /// File and line the error refers to
    pub fn position(&self) -> (&str, u32) {
        match self {
            SignatureError::UnsupportedFormat { file, line, .. }
            | SignatureError::OutsidePackage { file, line, .. }
            | SignatureError::OutsideClass { file, line, .. }
            | SignatureError::UnexpectedLine { file, line, .. }
            | SignatureError::InvalidDeclaration { file, line, .. }
            | SignatureError::InvalidType { file, line, .. }
            | SignatureError::UnbalancedBraces { file, line }
            | SignatureError::Duplicate { file, line, .. } => (file.as_str(), *line),
        }
    }
}

impl From<SignatureError> for ApiError {
    fn from(err: SignatureError) -> Self {
        let (file, line) = err.position();
        let kind = match &err {
            SignatureError::Duplicate { .. } => ApiErrorKind::DuplicateItem,
            _ => ApiErrorKind::InvalidSignature,
        };
        let mut api = ApiError::new(kind)
            .with_op("parse_signature")
            .with_file(file)
            .with_line(line)
            .with_message(err.to_string());
        if let SignatureError::Duplicate { element, .. } = &err {
            api = api.with_element(element.clone());
        }
        api
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::new(ApiErrorKind::Serialization).with_message(err.to_string())
    }
}
