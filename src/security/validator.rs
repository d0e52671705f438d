use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{field} cannot start with '-': {value}")]
    OptionLike { field: &'static str, value: String },

    #[error("Unsupported conflict resolution strategy: {0}")]
    UnsupportedStrategy(String),
}

/// Require a working directory that is non-empty after trimming whitespace
pub fn require_working_dir(path: &Path) -> Result<(), ValidationError> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(ValidationError::Empty("working directory"));
    }
    Ok(())
}

/// Require a non-blank string argument and hand it back unchanged
pub fn require_value<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(value)
}

/// Require a revision-like argument (branch, stash id) that git cannot mistake for an option
///
/// Paths are always passed after `--`, so only refs need this check.
pub fn require_ref<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = require_value(field, value)?;
    if value.trim_start().starts_with('-') {
        return Err(ValidationError::OptionLike {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Optional refs may be absent; a present value must be non-blank and not option-like
pub fn optional_ref<'a>(
    field: &'static str,
    value: Option<&'a str>,
) -> Result<Option<&'a str>, ValidationError> {
    match value {
        Some(v) => require_ref(field, v).map(Some),
        None => Ok(None),
    }
}
