use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// One downloadable guide: display title + PDF on disk.
#[derive(Clone, Debug)]
pub struct GuideEntry {
    pub key: String,
    pub title: String,
    pub file: PathBuf,
}

/// Read-only catalog of downloadable guides.
///
/// Built once at startup and never mutated afterwards. Order is preserved so
/// the menu renders the guides in a stable order.
#[derive(Clone, Debug)]
pub struct ContentCatalog {
    entries: Vec<GuideEntry>,
}

impl ContentCatalog {
    /// Build a catalog, failing fast on structural corruption (empty catalog,
    /// duplicate or blank keys). Missing PDF files are only a warning: the
    /// delivery path reports them per-request as a retryable failure.
    pub fn new(entries: Vec<GuideEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Config("content catalog is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.key.trim().is_empty() {
                return Err(Error::Config("content catalog has a blank key".to_string()));
            }
            if !seen.insert(entry.key.as_str()) {
                return Err(Error::Config(format!(
                    "content catalog has a duplicate key: {}",
                    entry.key
                )));
            }
        }

        Ok(Self { entries })
    }

    /// The standard guide set, with PDFs resolved under `assets_dir`.
    pub fn builtin(assets_dir: &Path) -> Result<Self> {
        let entry = |key: &str, title: &str, file: &str| GuideEntry {
            key: key.to_string(),
            title: title.to_string(),
            file: assets_dir.join(file),
        };

        Self::new(vec![
            entry("path_to_self", "Путь к себе", "guide_path_to_self.pdf"),
            entry(
                "know_but_dont_do",
                "Знаю, но не делаю",
                "guide_know_but_dont_do.pdf",
            ),
            entry(
                "self_acceptance",
                "Принятие себя",
                "guide_self_acceptance.pdf",
            ),
            entry("shut_the_mind", "Заткнуть мозг", "guide_shut_the_mind.pdf"),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&GuideEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GuideEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Log a warning for every entry whose PDF is not on disk yet.
    pub fn warn_missing_files(&self) {
        for entry in &self.entries {
            if !entry.file.exists() {
                tracing::warn!(
                    "guide {} has no PDF at {}",
                    entry.key,
                    entry.file.display()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_four_guides() {
        let cat = ContentCatalog::builtin(Path::new("assets")).unwrap();
        assert_eq!(cat.len(), 4);
        assert!(cat.contains("path_to_self"));
        assert!(cat.contains("shut_the_mind"));
        assert!(!cat.contains("unknown"));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let entry = |key: &str| GuideEntry {
            key: key.to_string(),
            title: "t".to_string(),
            file: PathBuf::from("x.pdf"),
        };
        let err = ContentCatalog::new(vec![entry("a"), entry("a")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(ContentCatalog::new(vec![]).is_err());
    }
}
