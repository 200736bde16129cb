//! Error types and handling for template packaging
//!
//! Uses `thiserror` for error definitions and `miette` for diagnostics.
//!
//! Constructors are grouped by error domain:
//! - [`source`]: source resolution and overlay errors
//! - [`fs`]: file system errors

pub mod fs;
pub mod source;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for packaging operations
#[derive(Error, Diagnostic, Debug)]
pub enum TemplateError {
    // Source errors
    #[error("Template source unavailable: {source_name}: {reason}")]
    #[diagnostic(
        code(specify::source::unavailable),
        help("Check that the repository, release asset, or path exists and is readable")
    )]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Malformed overlay at {path}: {reason}")]
    #[diagnostic(
        code(specify::source::malformed_overlay),
        help("An overlay must be a directory or a ZIP archive mirroring a packaged template")
    )]
    MalformedOverlay { path: String, reason: String },

    #[error("Conflicting template sources: {first} and {second}")]
    #[diagnostic(
        code(specify::source::conflicting),
        help("Use either a replacement template repository or a single overlay, not both")
    )]
    ConflictingSources { first: String, second: String },

    #[error("Invalid repository: {input}")]
    #[diagnostic(
        code(specify::source::invalid_repository),
        help("Valid formats: owner/name, owner/name#ref, https://host/owner/name.git, file:///path")
    )]
    InvalidRepository { input: String },

    // Agent errors
    #[error("Unknown agent: {agent}")]
    #[diagnostic(
        code(specify::agent::unknown),
        help(
            "Supported agents: claude, gemini, copilot, cursor-agent, qwen, opencode, windsurf, codex, ... or 'all'"
        )
    )]
    UnknownAgent { agent: String },

    #[error("Unknown script variant: {variant}")]
    #[diagnostic(code(specify::script::unknown), help("Supported script variants: sh, ps"))]
    InvalidScriptVariant { variant: String },

    // Template errors
    #[error("Malformed command template {path}: {reason}")]
    #[diagnostic(code(specify::template::malformed))]
    MalformedTemplate { path: String, reason: String },

    #[error("Invalid path '{path}': {reason}")]
    #[diagnostic(code(specify::tree::invalid_path))]
    InvalidPath { path: String, reason: String },

    #[error("Path collision at {path} between agents '{first}' and '{second}'")]
    #[diagnostic(code(specify::package::path_collision))]
    PathCollision {
        path: String,
        first: String,
        second: String,
    },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(specify::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(specify::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(specify::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for TemplateError {
    fn from(err: zip::result::ZipError) -> Self {
        TemplateError::MalformedOverlay {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for TemplateError {
    fn from(err: git2::Error) -> Self {
        TemplateError::SourceUnavailable {
            source_name: "git".to_string(),
            reason: err.message().to_string(),
        }
    }
}

impl From<serde_yaml::Error> for TemplateError {
    fn from(err: serde_yaml::Error) -> Self {
        TemplateError::MalformedTemplate {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        TemplateError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, TemplateError>;
