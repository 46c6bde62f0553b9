//! Destination path sanitization and validation.
//!
//! Every destination the engine plans passes through here before it is
//! claimed: components are scrubbed of characters that some filesystem will
//! refuse, and the assembled path is validated so that it can never escape the
//! output root.

use crate::error::{ErrorKind, Result};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Longest filename (in bytes) accepted by ext4, APFS and NTFS alike.
pub const MAX_COMPONENT_BYTES: usize = 255;

const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9", "LPT1",
    "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Scrubs a single path component (folder name or filename).
///
/// - Removes `< > : " / \ | ? *` and control characters.
/// - Trims surrounding whitespace and trailing dots (Windows silently drops
///   them, which would make two distinct names collide).
/// - Suffixes Windows device names (`CON`, `com1`, …) with `_`.
/// - Caps the result at [`MAX_COMPONENT_BYTES`] on a character boundary.
///
/// # Errors
/// Returns [`ErrorKind::InvalidPath`] when nothing usable is left, or the
/// result is `.` or `..`.
///
/// # Examples
///
/// ```
/// use arrange_engine::sanitize_component;
/// assert_eq!(sanitize_component("  Q3: Report?.  ").unwrap(), "Q3 Report");
/// assert_eq!(sanitize_component("con").unwrap(), "con_");
/// assert!(sanitize_component("..").is_err());
/// assert!(sanitize_component("***").is_err());
/// ```
pub fn sanitize_component(raw: &str) -> Result<String> {
    let scrubbed: String = raw.chars().filter(|c| !c.is_control() && !FORBIDDEN.contains(c)).collect();
    let mut component = scrubbed.trim().trim_end_matches('.').trim_end().to_string();
    if component.is_empty() || component == "." || component == ".." {
        exn::bail!(ErrorKind::InvalidPath(PathBuf::from(raw)));
    }
    let device = component.split('.').next().unwrap_or_default();
    if RESERVED.iter().any(|r| r.eq_ignore_ascii_case(device)) {
        component.insert(device.len(), '_');
    }
    truncate_bytes(&mut component, MAX_COMPONENT_BYTES);
    Ok(component)
}

/// Assembles `folders/…/stem.ext` from raw parts, sanitizing each one.
///
/// The extension is lowercased and stripped of dots; an empty extension
/// produces a bare `stem`. The stem is shortened when needed so that the
/// whole filename still fits in [`MAX_COMPONENT_BYTES`].
///
/// # Examples
///
/// ```
/// use arrange_engine::sanitize_path;
/// use std::path::Path;
/// let path = sanitize_path(&["text_files", "pdf_files"], "report", "PDF").unwrap();
/// assert_eq!(path, Path::new("text_files/pdf_files/report.pdf"));
/// assert!(sanitize_path(&[".."], "passwd", "").is_err());
/// ```
pub fn sanitize_path(folders: &[impl AsRef<str>], stem: &str, extension: &str) -> Result<PathBuf> {
    let mut path = PathBuf::new();
    for folder in folders {
        path.push(sanitize_component(folder.as_ref())?);
    }
    let extension: String = extension
        .trim()
        .trim_matches('.')
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    let mut stem = sanitize_component(stem)?;
    match extension.is_empty() {
        true => path.push(stem),
        false => {
            truncate_bytes(&mut stem, MAX_COMPONENT_BYTES.saturating_sub(extension.len() + 1));
            path.push(format!("{stem}.{extension}"));
        },
    }
    validate(path)
}

/// Validates a relative destination path for security and correctness.
/// Ensures that paths don't escape the output root (no `..` traversal).
///
/// Null bytes are rejected because C-based syscalls would silently cut the
/// path short. Backslashes and non-UTF-8 bytes are left alone.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use arrange_engine::validate_path;
/// assert_eq!(validate_path("./Receipts//coffee.pdf/").unwrap(), Path::new("Receipts/coffee.pdf"));
/// assert_eq!(validate_path("draft/../final.pdf").unwrap(), Path::new("final.pdf"));
/// assert!(validate_path("../outside.pdf").is_err());
/// assert!(validate_path("nul\0byte").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let invalid = || exn::Exn::from(ErrorKind::InvalidPath(path.to_path_buf()));
    let mut kept: Vec<&OsStr> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) if name.as_encoded_bytes().contains(&0) => return Err(invalid()),
            Component::Normal(name) => kept.push(name),
            Component::ParentDir => _ = kept.pop().ok_or_else(invalid)?,
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => return Err(invalid()),
        }
    }
    if kept.is_empty() {
        return Err(invalid());
    }
    Ok(kept.iter().collect())
}

/// Truncates in place to at most `max_bytes`, never splitting a character.
fn truncate_bytes(s: &mut String, max_bytes: usize) {
    if s.len() > max_bytes {
        let boundary = s.floor_char_boundary(max_bytes);
        s.truncate(boundary);
        let trimmed = s.trim_end().trim_end_matches('.').len();
        s.truncate(trimmed);
    }
}
