//! Package metadata record produced by extraction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::version::Version;

/// Semantic versioning compliance level of a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SemVerLevel {
    /// Readable by clients without SemVer 2.0.0 support
    #[default]
    Unknown,
    /// Requires a SemVer 2.0.0 aware client
    SemVer2,
}

/// A dependency entry for one target framework
///
/// An entry with both `id` and `version_range` absent records that the
/// framework was declared with no dependencies at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDependency {
    pub id: Option<String>,
    pub version_range: Option<String>,
    pub target_framework: String,
}

impl PackageDependency {
    /// Entry for a framework declared with an empty dependency list
    pub fn empty_group(target_framework: impl Into<String>) -> Self {
        Self {
            id: None,
            version_range: None,
            target_framework: target_framework.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageType {
    pub name: String,
    pub version: String,
}

impl PackageType {
    /// The generic package type assumed when a manifest declares none
    pub fn dependency() -> Self {
        Self {
            name: "Dependency".to_string(),
            version: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetFramework {
    pub moniker: String,
}

impl TargetFramework {
    pub fn new(moniker: impl Into<String>) -> Self {
        Self { moniker: moniker.into() }
    }

    /// The framework assumed when the archive supports none
    pub fn any() -> Self {
        Self::new("any")
    }
}

/// Registry-ready package metadata
///
/// Built in one step by [`MetadataExtractor`](crate::MetadataExtractor) and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub(crate) id: String,
    pub(crate) version: Version,
    pub(crate) authors: Vec<String>,
    pub(crate) description: String,
    pub(crate) has_readme: bool,
    pub(crate) has_embedded_icon: bool,
    pub(crate) is_prerelease: bool,
    pub(crate) language: String,
    pub(crate) release_notes: String,
    pub(crate) listed: bool,
    pub(crate) min_client_version: Option<String>,
    pub(crate) published: DateTime<Utc>,
    pub(crate) require_license_acceptance: bool,
    pub(crate) sem_ver_level: SemVerLevel,
    pub(crate) summary: String,
    pub(crate) title: String,
    pub(crate) icon_url: Option<Url>,
    pub(crate) license_url: Option<Url>,
    pub(crate) project_url: Option<Url>,
    pub(crate) repository_url: Option<Url>,
    pub(crate) repository_type: Option<String>,
    pub(crate) dependencies: Vec<PackageDependency>,
    pub(crate) tags: Vec<String>,
    pub(crate) package_types: Vec<PackageType>,
    pub(crate) target_frameworks: Vec<TargetFramework>,
}

impl Package {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn has_readme(&self) -> bool {
        self.has_readme
    }

    pub fn has_embedded_icon(&self) -> bool {
        self.has_embedded_icon
    }

    pub fn is_prerelease(&self) -> bool {
        self.is_prerelease
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn release_notes(&self) -> &str {
        &self.release_notes
    }

    pub fn listed(&self) -> bool {
        self.listed
    }

    pub fn min_client_version(&self) -> Option<&str> {
        self.min_client_version.as_deref()
    }

    pub fn published(&self) -> DateTime<Utc> {
        self.published
    }

    pub fn require_license_acceptance(&self) -> bool {
        self.require_license_acceptance
    }

    pub fn sem_ver_level(&self) -> SemVerLevel {
        self.sem_ver_level
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon_url(&self) -> Option<&Url> {
        self.icon_url.as_ref()
    }

    pub fn license_url(&self) -> Option<&Url> {
        self.license_url.as_ref()
    }

    pub fn project_url(&self) -> Option<&Url> {
        self.project_url.as_ref()
    }

    pub fn repository_url(&self) -> Option<&Url> {
        self.repository_url.as_ref()
    }

    pub fn repository_type(&self) -> Option<&str> {
        self.repository_type.as_deref()
    }

    pub fn dependencies(&self) -> &[PackageDependency] {
        &self.dependencies
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn package_types(&self) -> &[PackageType] {
        &self.package_types
    }

    pub fn target_frameworks(&self) -> &[TargetFramework] {
        &self.target_frameworks
    }
}
