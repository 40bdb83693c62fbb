//! Registry Package Metadata
//!
//! Extracts canonical, normalized metadata from a package archive for
//! ingestion into a package registry.
//!
//! ## Features
//!
//! - **Normalization**: Authors, tags, URLs and versions are parsed and defaulted
//!   by the ecosystem's rules
//! - **SemVer Classification**: Packages needing a SemVer 2.0.0 aware client are flagged
//! - **All-or-Nothing**: Any invalid field rejects the whole archive
//! - **Pluggable Archives**: In-memory and extracted-directory readers, or bring your own
//!
//! ## Architecture
//!
//! ```text
//! ManifestReader ─┐
//!                 ├─> MetadataExtractor ──> Package
//! ArchiveReader ──┘          │
//!                            └─ semver_level::classify
//! ```

pub mod archive;
pub mod clock;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fields;
pub mod manifest;
pub mod package;
pub mod semver_level;
pub mod version;

pub use archive::{ArchiveReader, DirectoryArchive, EntryStream, MemoryArchive};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::MetadataConfig;
pub use error::{MetadataError, Result};
pub use extractor::{open_icon, open_readme, MetadataExtractor};
pub use manifest::{Manifest, ManifestReader};
pub use package::{Package, PackageDependency, PackageType, SemVerLevel, TargetFramework};
pub use version::{Version, VersionRange};
