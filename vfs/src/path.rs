//! Path normalization for VFS lookups.
//!
//! VFS paths use `/` separators. Normalization collapses repeated
//! separators, strips leading and trailing ones, and rejects empty paths
//! and any path containing `.` or `..` segments.

use crate::error::VfsError;

/// Normalize a raw path into canonical `a/b/c` form.
pub fn normalize(raw: &str) -> Result<String, VfsError> {
    let mut segments = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" => continue,
            "." | ".." => {
                return Err(VfsError::InvalidPath(raw.to_string()));
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(VfsError::InvalidPath(raw.to_string()));
    }
    Ok(segments.join("/"))
}

/// Split a normalized path into its first segment and the rest.
pub fn split_source(path: &str) -> (&str, &str) {
    match path.split_once('/') {
        Some((source, rest)) => (source, rest),
        None => (path, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/assets//a.json/").unwrap(), "assets/a.json");
        assert_eq!(normalize("a").unwrap(), "a");
        assert!(normalize("").is_err());
        assert!(normalize("///").is_err());
        assert!(normalize("a/../b").is_err());
        assert!(normalize("./a").is_err());
    }

    #[test]
    fn test_split_source() {
        assert_eq!(split_source("assets/tex/a.png"), ("assets", "tex/a.png"));
        assert_eq!(split_source("assets"), ("assets", ""));
    }
}
