//! File system errors

use std::path::Path;

use super::TemplateError;

pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> TemplateError {
    TemplateError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> TemplateError {
    TemplateError::FileWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Map an IO error on `path` to a read failure
pub fn read_error(path: &Path) -> impl FnOnce(std::io::Error) -> TemplateError + '_ {
    move |e| read_failed(path.display().to_string(), e.to_string())
}

/// Map an IO error on `path` to a write failure
pub fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> TemplateError + '_ {
    move |e| write_failed(path.display().to_string(), e.to_string())
}
