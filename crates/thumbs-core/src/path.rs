//! Source path validation.

use crate::{Error, Result};
use std::path::{Component, Path};

/// Accept only plain relative paths that stay below their root.
pub fn validate_relative_path(path: &str) -> Result<()> {
    let unsafe_path = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.contains('\0')
        || path.split('/').any(|segment| segment == "..")
        || Path::new(path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if unsafe_path {
        Err(Error::UnsafePath(path.to_string()))
    } else {
        Ok(())
    }
}
