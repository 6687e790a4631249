// markclean-core/src/export/paths.rs
//! Logical (vault-relative) path handling for the file sink.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref SLASH_RUNS: Regex = Regex::new(r"/{2,}").expect("valid regex pattern");
}

/// Normalizes a user-supplied logical path.
///
/// Backslashes become `/`, repeated slashes collapse, leading and trailing slashes
/// are trimmed, non-breaking spaces become plain spaces and the result is in
/// Unicode NFC. An empty result is `/`.
pub fn normalize_logical_path(path: &str) -> String {
    let unified = path.replace('\\', "/").replace(['\u{00A0}', '\u{202F}'], " ");
    let collapsed = SLASH_RUNS.replace_all(&unified, "/");
    let trimmed = collapsed.trim_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    trimmed.nfc().collect()
}

/// The file an export of `source_path` lands in when no explicit path is set:
/// the same logical path with an `.html` extension.
pub fn default_export_path(source_path: &str) -> String {
    let normalized = normalize_logical_path(source_path);
    if normalized == "/" {
        return "export.html".to_string();
    }
    let stem = match normalized.rsplit_once('/') {
        Some((_, file)) => match file.rfind('.') {
            Some(dot) if dot > 0 => &normalized[..normalized.len() - (file.len() - dot)],
            _ => normalized.as_str(),
        },
        None => match normalized.rfind('.') {
            Some(dot) if dot > 0 => &normalized[..dot],
            _ => normalized.as_str(),
        },
    };
    format!("{}.html", stem)
}
