//! Source resolution errors

use super::TemplateError;

/// A named repository, release asset, or path could not be resolved or read
pub fn unavailable(source_name: impl Into<String>, reason: impl Into<String>) -> TemplateError {
    TemplateError::SourceUnavailable {
        source_name: source_name.into(),
        reason: reason.into(),
    }
}

/// An overlay path exists but is neither a readable directory nor a ZIP archive
pub fn malformed_overlay(path: impl Into<String>, reason: impl Into<String>) -> TemplateError {
    TemplateError::MalformedOverlay {
        path: path.into(),
        reason: reason.into(),
    }
}

pub fn conflicting(first: impl Into<String>, second: impl Into<String>) -> TemplateError {
    TemplateError::ConflictingSources {
        first: first.into(),
        second: second.into(),
    }
}

pub fn invalid_repository(input: impl Into<String>) -> TemplateError {
    TemplateError::InvalidRepository {
        input: input.into(),
    }
}
