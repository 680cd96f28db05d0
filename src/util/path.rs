use std::ffi::OsStr;
use std::path::Path;

pub trait PathExt {
    /// True when the extension matches one of `extensions` (case-insensitive).
    fn has_extension_in(&self, extensions: &[String]) -> bool;
    /// Path as a string with `/` separators on every platform.
    fn to_slash_string(&self) -> String;
}

impl PathExt for Path {
    fn has_extension_in(&self, extensions: &[String]) -> bool {
        self.extension()
            .and_then(OsStr::to_str)
            .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn to_slash_string(&self) -> String {
        normalize_path_separator(&self.to_string_lossy())
    }
}

/// Check if a path component is a dot-file or dot-directory.
///
/// Returns true for names starting with `.` (except `.` and `..`).
pub fn is_hidden(name: &OsStr) -> bool {
    name.to_str()
        .map(|s| s.starts_with('.') && s.len() > 1 && s != "..")
        .unwrap_or(false)
}

// Helper function for cross-platform path comparison
pub fn normalize_path_separator(s: &str) -> String {
    s.replace('\\', "/")
}
