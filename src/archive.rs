//! Package archive access
//!
//! The extractor reads archives through [`ArchiveReader`]. Two readers ship
//! with the crate:
//!
//! - [`MemoryArchive`]: manifest and entries held in memory
//! - [`DirectoryArchive`]: an extracted package on disk
//!
//! ```text
//! my-package/
//! ├── manifest.json
//! ├── README.md
//! ├── images/icon.png
//! └── lib/
//!     ├── net6.0/
//!     └── netstandard2.0/
//! ```
//!
//! A reader is driven by one extraction at a time; open one reader per
//! concurrent extraction.

use std::collections::{BTreeSet, HashMap};
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncRead;
use walkdir::WalkDir;

use crate::error::{MetadataError, Result};
use crate::manifest::{Manifest, ManifestReader};

/// Byte stream over one archive entry
pub type EntryStream = Box<dyn AsyncRead + Send + Unpin>;

/// Name of the manifest document inside a [`DirectoryArchive`]
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Content folders whose immediate subfolders name target frameworks
const FRAMEWORK_FOLDERS: [&str; 5] = ["lib", "ref", "build", "tools", "content"];

/// Read access to a package archive
#[async_trait]
pub trait ArchiveReader: Send + Sync {
    /// The archive's manifest
    fn manifest(&self) -> &dyn ManifestReader;

    /// Short monikers of the frameworks the archive's content supports
    fn supported_frameworks(&self) -> Vec<String>;

    /// Whether an entry exists at `path`
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Open the entry at `path`, failing with `NotFound` if absent
    async fn open(&self, path: &str) -> Result<EntryStream>;
}

/// An archive held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    manifest: Manifest,
    entries: HashMap<String, Vec<u8>>,
    frameworks: Vec<String>,
}

impl MemoryArchive {
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            entries: HashMap::new(),
            frameworks: Vec::new(),
        }
    }

    /// Add an entry at `path`
    pub fn with_entry(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(path.into(), content.into());
        self
    }

    /// Declare a framework the content supports
    pub fn with_framework(mut self, moniker: impl Into<String>) -> Self {
        self.frameworks.push(moniker.into());
        self
    }
}

#[async_trait]
impl ArchiveReader for MemoryArchive {
    fn manifest(&self) -> &dyn ManifestReader {
        &self.manifest
    }

    fn supported_frameworks(&self) -> Vec<String> {
        self.frameworks.clone()
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.entries.contains_key(path))
    }

    async fn open(&self, path: &str) -> Result<EntryStream> {
        let content = self.entries.get(path).ok_or_else(|| MetadataError::NotFound {
            path: path.to_string(),
        })?;
        Ok(Box::new(Cursor::new(content.clone())))
    }
}

/// An extracted package directory with a JSON manifest at its root
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
    manifest: Manifest,
    frameworks: Vec<String>,
    size_bytes: u64,
}

impl DirectoryArchive {
    /// Open a package directory
    ///
    /// Reads the manifest, discovers supported frameworks and rejects the
    /// package with a validation error if its content exceeds `max_size_bytes`.
    pub fn open(root: impl AsRef<Path>, max_size_bytes: u64) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        let manifest_path = root.join(MANIFEST_FILE_NAME);
        let content = std::fs::read_to_string(&manifest_path)?;
        let manifest = Manifest::from_json(&content)?;

        let size_bytes = content_size(&root)?;
        if size_bytes > max_size_bytes {
            return Err(MetadataError::Validation(format!(
                "Package size {} bytes exceeds the maximum of {} bytes",
                size_bytes, max_size_bytes
            )));
        }

        let frameworks = discover_frameworks(&root, &manifest)?;

        tracing::debug!(
            root = %root.display(),
            size_bytes,
            frameworks = frameworks.len(),
            "Opened package directory"
        );

        Ok(Self {
            root,
            manifest,
            frameworks,
            size_bytes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Total size of all files in the package directory
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Resolve an entry path, refusing anything that escapes the root
    fn entry_path(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || !contained {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl ArchiveReader for DirectoryArchive {
    fn manifest(&self) -> &dyn ManifestReader {
        &self.manifest
    }

    fn supported_frameworks(&self) -> Vec<String> {
        self.frameworks.clone()
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let Some(full_path) = self.entry_path(path) else {
            return Ok(false);
        };
        match tokio::fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn open(&self, path: &str) -> Result<EntryStream> {
        let not_found = || MetadataError::NotFound {
            path: path.to_string(),
        };
        let full_path = self.entry_path(path).ok_or_else(not_found)?;
        match tokio::fs::File::open(&full_path).await {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }
}

fn content_size(root: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() {
            total += entry.metadata().map_err(std::io::Error::from)?.len();
        }
    }
    Ok(total)
}

/// Frameworks named by content folders plus those declared by dependency groups
fn discover_frameworks(root: &Path, manifest: &Manifest) -> Result<Vec<String>> {
    let mut frameworks = BTreeSet::new();

    for folder in FRAMEWORK_FOLDERS {
        let folder_path = root.join(folder);
        if !folder_path.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&folder_path).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                frameworks.insert(name.to_lowercase());
            }
        }
    }

    for group in &manifest.dependency_groups {
        let moniker = group.target_framework.trim();
        if !moniker.is_empty() {
            frameworks.insert(moniker.to_lowercase());
        }
    }

    frameworks.remove("any");
    Ok(frameworks.into_iter().collect())
}
