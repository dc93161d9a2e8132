use serde::Serialize;
use thiserror::Error;

// ─── Diagnostic codes ───────────────────────────────────────────────────────

pub const SYNTAX_ERROR: &str = "SyntaxError";
pub const SCHEMA_ERROR: &str = "SchemaError";
pub const SCHEMA_WARNING: &str = "SchemaWarning";
pub const DUPLICATE_SYMBOL: &str = "DuplicateSymbol";
pub const UNKNOWN_BUILTIN: &str = "UnknownBuiltin";
pub const TYPE_ERROR: &str = "TypeError";
pub const INDEX_ERROR: &str = "IndexError";
pub const DECODE_ERROR: &str = "DecodeError";
pub const CYCLE_DETECTED: &str = "CycleDetected";
pub const UNKNOWN_TEMPLATE_KEY: &str = "UnknownTemplateKey";
pub const UNBALANCED_BLOCKS: &str = "UnbalancedBlocks";
pub const UNKNOWN_SYMBOL: &str = "UnknownSymbol";

// ─── Diagnostics ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A non-fatal problem found while processing a project. Diagnostics
/// accumulate through the pipeline; they never abort it.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }

    /// Attach the originating file. Empty file names (in-memory templates)
    /// are left off.
    pub fn with_file(mut self, file: &str) -> Self {
        if !file.is_empty() {
            self.file = Some(file.to_string());
        }
        self
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// True if any diagnostic in the list is an error.
pub fn any_errors(diags: &[Diagnostic]) -> bool {
    diags.iter().any(|d| d.severity == Severity::Error)
}

// ─── Typed errors for the standalone entry points ───────────────────────────

/// Failures returned by the standalone entry points (`evaluate_builtin`,
/// `validate_jinja`, `preprocess_jinja`), which have no diagnostics list to
/// carry problems in.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown builtin function '{0}'")]
    UnknownBuiltin(String),

    #[error("{0}")]
    Type(String),

    #[error("{0}")]
    Index(String),

    #[error("{0}")]
    Decode(String),

    #[error("{file}: unknown template key: {message}")]
    UnknownTemplateKey { file: String, message: String },

    #[error("{file}: unbalanced template blocks: {message}")]
    UnbalancedBlocks { file: String, message: String },
}

impl HostError {
    /// The stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            HostError::UnknownBuiltin(_) => UNKNOWN_BUILTIN,
            HostError::Type(_) => TYPE_ERROR,
            HostError::Index(_) => INDEX_ERROR,
            HostError::Decode(_) => DECODE_ERROR,
            HostError::UnknownTemplateKey { .. } => UNKNOWN_TEMPLATE_KEY,
            HostError::UnbalancedBlocks { .. } => UNBALANCED_BLOCKS,
        }
    }
}
