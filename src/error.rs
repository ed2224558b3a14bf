//! Error Module for the Entry Point Generator
//!
//! Every failure is fatal: the run either produces the complete artifact set
//! or aborts before a single file is written. Each error carries a stable code
//! and the guarantee it protects so diagnostics read the same across runs.

use std::path::PathBuf;
use thiserror::Error;

use crate::registry::Api;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const EPG_MALFORMED_SPEC: &str = "EPG-001";
pub const EPG_UNKNOWN_TYPE: &str = "EPG-002";
pub const EPG_POLICY_CONFLICT: &str = "EPG-003";
pub const EPG_MISSING_POLICY_PARAMETER: &str = "EPG-004";
pub const EPG_TAG_COLLISION: &str = "EPG-005";
pub const EPG_INVALID_INPUT: &str = "EPG-006";
pub const EPG_IO: &str = "EPG-007";
pub const EPG_JSON: &str = "EPG-008";

// ═══════════════════════════════════════════════════════════════════════════════
// GUARANTEES
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_guarantee(code: &str) -> &'static str {
    match code {
        EPG_MALFORMED_SPEC => "Every parameter and return declaration has exactly one identifier.",
        EPG_UNKNOWN_TYPE => {
            "Every non-pointer type has a known format; formats are never guessed."
        }
        EPG_POLICY_CONFLICT => {
            "Each command matches at most one rule per classification family."
        }
        EPG_MISSING_POLICY_PARAMETER => {
            "Every declared policy finds the parameter it needs in the command signature."
        }
        EPG_TAG_COLLISION => "Each capture tag names exactly one rendered parameter type.",
        EPG_INVALID_INPUT => "Generator inputs are complete and well-formed before emission.",
        EPG_IO => "Outputs are replaced atomically or not at all.",
        EPG_JSON => "Input tables are valid JSON documents.",
        _ => "Unknown guarantee.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A parameter or return declaration has no parseable identifier.
    #[error("{api} command `{command}`: malformed declaration `{text}`")]
    MalformedSpec {
        api: Api,
        command: String,
        text: String,
    },

    /// A non-pointer type is missing from the format table.
    #[error("{api} command `{command}`: type `{ty}` has no format mapping")]
    UnknownType {
        api: Api,
        command: String,
        ty: String,
    },

    /// A command matched two mutually exclusive classification rules.
    #[error("command `{command}` matches both `{first}` and `{second}`")]
    PolicyConflict {
        command: String,
        first: String,
        second: String,
    },

    /// A declared policy needs a parameter the command does not have.
    #[error("command `{command}` declares `{category}` but has no matching parameter")]
    MissingPolicyParameter { command: String, category: String },

    /// Two different types rendered to the same capture tag.
    #[error("capture tag `{tag}` renders both as `{first}` and `{second}`")]
    TagCollision {
        tag: String,
        first: String,
        second: String,
    },

    /// Configuration or table content that cannot drive a run.
    #[error("{path}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: invalid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl GeneratorError {
    pub fn code(&self) -> &'static str {
        match self {
            GeneratorError::MalformedSpec { .. } => EPG_MALFORMED_SPEC,
            GeneratorError::UnknownType { .. } => EPG_UNKNOWN_TYPE,
            GeneratorError::PolicyConflict { .. } => EPG_POLICY_CONFLICT,
            GeneratorError::MissingPolicyParameter { .. } => EPG_MISSING_POLICY_PARAMETER,
            GeneratorError::TagCollision { .. } => EPG_TAG_COLLISION,
            GeneratorError::InvalidInput { .. } => EPG_INVALID_INPUT,
            GeneratorError::Io { .. } => EPG_IO,
            GeneratorError::Json { .. } => EPG_JSON,
        }
    }

    pub fn guarantee(&self) -> &'static str {
        get_guarantee(self.code())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeneratorError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        GeneratorError::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
