use super::Analyzer;
use crate::error::{ErrorKind, Result};
use crate::file::{Analysis, InputFile};
use async_trait::async_trait;
use exn::ResultExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Reads analysis results produced ahead of time by an external tool.
///
/// The sidecar is a JSON object whose keys are file paths or bare file names
/// and whose values are [`Analysis`] objects (or `null`):
///
/// ```json
/// {
///   "/home/me/Inbox/IMG_0042.jpg": { "category": "Pets", "suggested_name": "dog_on_beach" },
///   "scan.pdf": { "description": "Electricity bill for March", "category": "Bills" },
///   "blurry.png": null
/// }
/// ```
///
/// Relative path keys are resolved against the sidecar's own directory. A
/// full path match wins over a file name match.
#[derive(Debug, Clone, Default)]
pub struct SidecarAnalyzer {
    by_path: HashMap<PathBuf, Option<Analysis>>,
    by_name: HashMap<String, Option<Analysis>>,
}
impl SidecarAnalyzer {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.or_raise(|| ErrorKind::Sidecar(path.to_path_buf()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let sidecar = Self::from_json(&json, base).or_raise(|| ErrorKind::Sidecar(path.to_path_buf()))?;
        debug!(entries = sidecar.len(), "loaded analysis sidecar");
        Ok(sidecar)
    }

    /// Parses sidecar JSON, resolving relative path keys against `base`.
    pub fn from_json(json: &str, base: impl AsRef<Path>) -> std::result::Result<Self, serde_json::Error> {
        let entries: HashMap<String, Option<Analysis>> = serde_json::from_str(json)?;
        let mut sidecar = Self::default();
        for (key, analysis) in entries {
            let key_path = Path::new(&key);
            if key_path.components().count() > 1 || key_path.is_absolute() {
                sidecar.by_path.insert(base.as_ref().join(key_path), analysis);
            } else {
                sidecar.by_name.insert(key, analysis);
            }
        }
        Ok(sidecar)
    }

    pub fn len(&self) -> usize {
        self.by_path.len() + self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Analyzer for SidecarAnalyzer {
    fn name(&self) -> &str {
        "sidecar"
    }

    async fn analyze(&self, file: &InputFile) -> Result<Option<Analysis>> {
        if let Some(analysis) = self.by_path.get(file.path()) {
            return Ok(analysis.clone());
        }
        let name = file.path().file_name().map(|n| n.to_string_lossy());
        Ok(name.and_then(|name| self.by_name.get(name.as_ref())).cloned().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::OffsetDateTime;

    const SIDECAR: &str = r#"{
        "/in/a/report.pdf": { "category": "Reports", "suggested_name": "q1 report" },
        "report.pdf": { "category": "Other Reports" },
        "nested/photo.jpg": { "description": "a cat" },
        "blurry.png": null
    }"#;

    fn file(path: &str) -> InputFile {
        InputFile::new(path, 1, OffsetDateTime::UNIX_EPOCH)
    }

    async fn category(sidecar: &SidecarAnalyzer, path: &str) -> Option<String> {
        sidecar.analyze(&file(path)).await.unwrap().and_then(|a| a.category)
    }

    #[tokio::test]
    async fn test_lookup() {
        let sidecar = SidecarAnalyzer::from_json(SIDECAR, "/data").unwrap();
        assert_eq!(sidecar.len(), 4);
        assert_eq!(category(&sidecar, "/in/a/report.pdf").await.as_deref(), Some("Reports"));
        assert_eq!(category(&sidecar, "/in/b/report.pdf").await.as_deref(), Some("Other Reports"));
        assert!(sidecar.analyze(&file("/data/nested/photo.jpg")).await.unwrap().is_some());
        assert!(sidecar.analyze(&file("/in/blurry.png")).await.unwrap().is_none());
        assert!(sidecar.analyze(&file("/in/unknown.txt")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        std::fs::write(&path, SIDECAR).unwrap();
        let sidecar = SidecarAnalyzer::load(&path).await.unwrap();
        let nested = dir.path().join("nested/photo.jpg");
        assert!(sidecar.analyze(&file(nested.to_str().unwrap())).await.unwrap().is_some());

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let err = SidecarAnalyzer::load(&path).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Sidecar(p) if p == &path));
        let err = SidecarAnalyzer::load(dir.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Sidecar(_)));
    }
}
