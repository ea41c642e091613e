//! Include/import path resolution.
//!
//! Both forms take a string literal from the source text. The literal is
//! unescaped, resolved against the owning file's directory, normalized, and
//! checked for existence through the caller-supplied lookup (which routes
//! through the reactive cache so that creating a file re-resolves paths that
//! previously failed).

use std::path::{Component, Path, PathBuf};

use crate::parser::{literal_content, unescape_lenient};

/// Extension appended by `import` when the raw path does not exist.
pub const SOURCE_EXTENSION: &str = "btl";

/// Lexically normalize a path: strip `.` components, fold `..`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            _ => out.push(component),
        }
    }
    out
}

/// Decode a path literal token (quotes included) into a relative path.
fn literal_path(literal: &str) -> Option<PathBuf> {
    let bytes = unescape_lenient(literal_content(literal));
    let text = String::from_utf8(bytes).ok()?;
    if text.is_empty() {
        return None;
    }
    Some(PathBuf::from(text))
}

fn resolve_relative(owner: &Path, arg: &Path) -> PathBuf {
    if arg.is_absolute() {
        normalize_path(arg)
    } else {
        let dir = owner.parent().unwrap_or_else(|| Path::new(""));
        normalize_path(&dir.join(arg))
    }
}

/// Resolve an `include "path"` literal to a canonical workspace path.
pub fn resolve_include(
    owner: &Path,
    literal: &str,
    exists: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    let arg = literal_path(literal)?;
    let resolved = resolve_relative(owner, &arg);
    exists(&resolved).then_some(resolved)
}

/// Resolve an `import "path"` literal, retrying with the `.btl` source
/// extension when the raw path does not exist.
pub fn resolve_import(
    owner: &Path,
    literal: &str,
    exists: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    let arg = literal_path(literal)?;
    let resolved = resolve_relative(owner, &arg);
    if exists(&resolved) {
        return Some(resolved);
    }
    if resolved.extension().is_none() {
        let with_ext = resolved.with_extension(SOURCE_EXTENSION);
        if exists(&with_ext) {
            return Some(with_ext);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize_path(Path::new("/ws/./a/../b.btl")),
            PathBuf::from("/ws/b.btl")
        );
    }

    #[test]
    fn test_resolve_include_relative() {
        let exists = |p: &Path| p == Path::new("/ws/lib/util.btl");
        let resolved = resolve_include(Path::new("/ws/lib/main.btl"), "\"util.btl\"", exists);
        assert_eq!(resolved, Some(PathBuf::from("/ws/lib/util.btl")));
    }

    #[test]
    fn test_resolve_include_missing() {
        let resolved = resolve_include(Path::new("/ws/main.btl"), "\"nope.btl\"", |_| false);
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_resolve_import_appends_extension() {
        let exists = |p: &Path| p == Path::new("/ws/util.btl");
        let resolved = resolve_import(Path::new("/ws/main.btl"), "\"util\"", exists);
        assert_eq!(resolved, Some(PathBuf::from("/ws/util.btl")));
    }
}
