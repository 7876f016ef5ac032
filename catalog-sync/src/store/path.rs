// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Hierarchical path helpers shared by the store backends

use super::types::{StoreError, StoreResult};

pub const SEPARATOR: char = '/';

/// Check that `path` is absolute, has no empty segments and no trailing separator
pub fn validate(path: &str) -> StoreResult<()> {
    if path == "/" {
        return Ok(());
    }
    if !path.starts_with(SEPARATOR) {
        return Err(StoreError::InvalidPath(format!(
            "'{}' must start with '/'",
            path
        )));
    }
    if path.ends_with(SEPARATOR) {
        return Err(StoreError::InvalidPath(format!(
            "'{}' must not end with '/'",
            path
        )));
    }
    if path[1..].split(SEPARATOR).any(|segment| segment.is_empty()) {
        return Err(StoreError::InvalidPath(format!(
            "'{}' contains an empty segment",
            path
        )));
    }
    Ok(())
}

/// Join a parent path and a single child name
pub fn join(parent: &str, child: &str) -> String {
    if parent == "/" {
        format!("/{}", child)
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Prefix that every descendant of `path` starts with
pub fn descendant_prefix(path: &str) -> String {
    if path == "/" {
        "/".to_string()
    } else {
        format!("{}/", path)
    }
}

/// True if `candidate` is `root` itself or lies anywhere below it
pub fn is_within(root: &str, candidate: &str) -> bool {
    candidate == root || candidate.starts_with(&descendant_prefix(root))
}

/// Name of `candidate` if it is a direct child of `parent`
pub fn direct_child_name<'a>(parent: &str, candidate: &'a str) -> Option<&'a str> {
    let rest = candidate.strip_prefix(&descendant_prefix(parent))?;
    if rest.is_empty() || rest.contains(SEPARATOR) {
        None
    } else {
        Some(rest)
    }
}

/// All proper ancestors of `path`, outermost first, excluding "/"
pub fn ancestors(path: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut end = 0;
    while let Some(offset) = path[end + 1..].find(SEPARATOR) {
        end += offset + 1;
        result.push(path[..end].to_string());
    }
    result
}

/// Prefix client paths with a namespace ("" leaves them untouched)
pub fn namespaced(namespace: &str, path: &str) -> String {
    if namespace.is_empty() {
        path.to_string()
    } else if path == "/" {
        format!("/{}", namespace)
    } else {
        format!("/{}{}", namespace, path)
    }
}

/// Inverse of [`namespaced`]
pub fn strip_namespace<'a>(namespace: &str, full: &'a str) -> &'a str {
    if namespace.is_empty() {
        return full;
    }
    let prefix = format!("/{}", namespace);
    match full.strip_prefix(&prefix) {
        Some("") => "/",
        Some(rest) if rest.starts_with(SEPARATOR) => rest,
        _ => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(validate("/").is_ok());
        assert!(validate("/catalog/meta").is_ok());
        assert!(validate("catalog/meta").is_err());
        assert!(validate("/catalog/meta/").is_err());
        assert!(validate("/catalog//meta").is_err());
    }

    #[test]
    fn test_ancestors() {
        assert_eq!(
            ancestors("/catalog/meta/sales"),
            vec!["/catalog".to_string(), "/catalog/meta".to_string()]
        );
        assert!(ancestors("/catalog").is_empty());
    }

    #[test]
    fn test_direct_child_name() {
        assert_eq!(
            direct_child_name("/catalog/meta", "/catalog/meta/sales"),
            Some("sales")
        );
        assert_eq!(direct_child_name("/catalog/meta", "/catalog/meta/a/b"), None);
        assert_eq!(direct_child_name("/catalog/meta", "/catalog/metadata"), None);
        assert_eq!(direct_child_name("/", "/catalog"), Some("catalog"));
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("/catalog/meta", "/catalog/meta"));
        assert!(is_within("/catalog/meta", "/catalog/meta/x/y"));
        assert!(!is_within("/catalog/meta", "/catalog/metadata"));
    }

    #[test]
    fn test_namespace_round_trip() {
        let full = namespaced("trino", "/catalog/meta/sales");
        assert_eq!(full, "/trino/catalog/meta/sales");
        assert_eq!(strip_namespace("trino", &full), "/catalog/meta/sales");
        assert_eq!(strip_namespace("trino", "/trino"), "/");
        assert_eq!(namespaced("", "/a"), "/a");
    }
}
