//! Route handlers, one module per resource.

pub mod ai;
pub mod auth;
pub mod health;
pub mod learning_paths;
pub mod progress;
pub mod quiz;

/// Trimmed, non-empty string field.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
