//! Collision-free destination naming.

use crate::sanitize::MAX_COMPONENT_BYTES;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The set of destination paths already claimed within one plan.
///
/// By default membership is case-insensitive: `Report.pdf` and `report.pdf`
/// are the same file on APFS and NTFS, so a plan must never contain both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    case_insensitive: bool,
    claimed: HashSet<String>,
}
impl Default for ClaimSet {
    fn default() -> Self {
        Self::new(true)
    }
}
impl ClaimSet {
    pub fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive, claimed: HashSet::new() }
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.claimed.contains(&self.key(path.as_ref()))
    }

    /// Claims a path. Returns `false` if it was already claimed.
    pub fn insert(&mut self, path: impl AsRef<Path>) -> bool {
        let key = self.key(path.as_ref());
        self.claimed.insert(key)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    fn key(&self, path: &Path) -> String {
        // Join normalized components so `a/b` and `a//b` agree.
        let joined = path.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
        match self.case_insensitive {
            true => joined.to_lowercase(),
            false => joined,
        }
    }
}
impl<P: AsRef<Path>> Extend<P> for ClaimSet {
    fn extend<T: IntoIterator<Item = P>>(&mut self, iter: T) {
        for path in iter {
            self.insert(path);
        }
    }
}

/// Returns a destination that is not in `claimed`.
///
/// An unclaimed `candidate` is returned unchanged. Otherwise the filename is
/// split into stem and extension and `stem_1.ext`, `stem_2.ext`, … are probed
/// in order until a free one is found. Names without an extension (including
/// dotfiles) are suffixed directly: `name_1`. The stem is shortened on a char
/// boundary when needed so the suffixed filename still fits in
/// [`MAX_COMPONENT_BYTES`].
///
/// Deterministic for a given candidate and claim set, and never mutates the
/// set: the caller claims the returned path.
///
/// # Examples
///
/// ```
/// use arrange_engine::{ClaimSet, resolve};
/// use std::path::Path;
/// let mut claimed = ClaimSet::default();
/// claimed.insert("a.pdf");
/// assert_eq!(resolve("a.pdf", &claimed), Path::new("a_1.pdf"));
/// claimed.insert("a_1.pdf");
/// assert_eq!(resolve("a.pdf", &claimed), Path::new("a_2.pdf"));
/// assert_eq!(resolve("b.pdf", &claimed), Path::new("b.pdf"));
/// ```
pub fn resolve(candidate: impl AsRef<Path>, claimed: &ClaimSet) -> PathBuf {
    let candidate = candidate.as_ref();
    if !claimed.contains(candidate) {
        return candidate.to_path_buf();
    }
    let stem = candidate.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let extension = candidate.extension().map(|e| e.to_string_lossy().into_owned());
    let parent = candidate.parent().unwrap_or_else(|| Path::new(""));
    // The claim set is finite, so this always terminates.
    (1usize..)
        .map(|n| {
            let suffix = match &extension {
                Some(ext) => format!("_{n}.{ext}"),
                None => format!("_{n}"),
            };
            let budget = MAX_COMPONENT_BYTES.saturating_sub(suffix.len());
            let stem = &stem[..stem.floor_char_boundary(budget)];
            parent.join(format!("{stem}{suffix}"))
        })
        .find(|probe| !claimed.contains(probe))
        .unwrap_or_else(|| candidate.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn claims(paths: &[&str]) -> ClaimSet {
        let mut set = ClaimSet::default();
        set.extend(paths.iter());
        set
    }

    #[rstest]
    #[case(&[], "a.pdf", "a.pdf")]
    #[case(&["a.pdf"], "a.pdf", "a_1.pdf")]
    #[case(&["a.pdf", "a_1.pdf"], "a.pdf", "a_2.pdf")]
    #[case(&["a.pdf", "a_2.pdf"], "a.pdf", "a_1.pdf")]
    #[case(&["docs/a.pdf"], "docs/a.pdf", "docs/a_1.pdf")]
    #[case(&["docs/a.pdf"], "other/a.pdf", "other/a.pdf")]
    #[case(&["others/README"], "others/README", "others/README_1")]
    #[case(&["others/.bashrc"], "others/.bashrc", "others/.bashrc_1")]
    #[case(&["x/archive.tar.gz"], "x/archive.tar.gz", "x/archive.tar_1.gz")]
    fn test_resolve(#[case] claimed: &[&str], #[case] candidate: &str, #[case] expected: &str) {
        assert_eq!(resolve(candidate, &claims(claimed)), Path::new(expected));
    }

    #[rstest]
    #[case('x', 251, Some("pdf"), 1)]
    #[case('x', 255, None, 1)]
    #[case('x', 250, Some("pdf"), 12)]
    #[case('é', 125, Some("jpeg"), 3)]
    fn test_resolve_stays_within_component_limit(
        #[case] fill: char,
        #[case] repeat: usize,
        #[case] extension: Option<&str>,
        #[case] duplicates: usize,
    ) {
        let stem = fill.to_string().repeat(repeat);
        let name = match extension {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem.clone(),
        };
        let candidate = Path::new("text_files").join(&name);
        let mut set = ClaimSet::default();
        set.insert(&candidate);
        for _ in 0..duplicates {
            let resolved = resolve(&candidate, &set);
            let file_name = resolved.file_name().unwrap().to_str().unwrap();
            assert!(file_name.len() <= MAX_COMPONENT_BYTES, "{} bytes", file_name.len());
            assert_eq!(resolved.extension().and_then(|e| e.to_str()), extension);
            assert!(resolved.starts_with("text_files"));
            assert!(set.insert(&resolved), "{} was already claimed", resolved.display());
        }
        assert_eq!(set.len(), duplicates + 1);
    }

    #[test]
    fn test_resolve_is_deterministic_and_pure() {
        let set = claims(&["a.pdf", "a_1.pdf"]);
        let before = set.clone();
        let first = resolve("a.pdf", &set);
        let second = resolve("a.pdf", &set);
        assert_eq!(first, second);
        assert_eq!(set, before);
    }

    #[test]
    fn test_case_insensitive_claims() {
        let set = claims(&["Docs/Report.PDF"]);
        assert!(set.contains("docs/report.pdf"));
        assert_eq!(resolve("docs/report.pdf", &set), Path::new("docs/report_1.pdf"));

        let mut sensitive = ClaimSet::new(false);
        sensitive.insert("Docs/Report.PDF");
        assert!(!sensitive.contains("docs/report.pdf"));
    }

    #[test]
    fn test_insert_reports_duplicates() {
        let mut set = ClaimSet::default();
        assert!(set.insert("a/b.txt"));
        assert!(!set.insert("a//b.txt"));
        assert_eq!(set.len(), 1);
    }
}
