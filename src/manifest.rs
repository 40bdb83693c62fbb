//! Package manifest access
//!
//! [`ManifestReader`] is the capability the extractor consumes. Parsing the
//! container's manifest document is left to whoever implements it; the crate
//! ships [`Manifest`], a plain serde model that can be loaded from JSON or
//! built in code.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::version::{Version, VersionRange};

/// A single dependency declared by the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub id: String,
    /// `None` when the manifest places no constraint on the version
    pub range: Option<VersionRange>,
}

/// Dependencies declared for one target framework
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGroup {
    /// Short target framework moniker (e.g. `net6.0`)
    pub target_framework: String,
    pub dependencies: Vec<Dependency>,
}

/// Repository metadata as declared by the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    #[serde(default, rename = "type")]
    pub repository_type: String,
    #[serde(default)]
    pub url: String,
}

/// A declared package type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTypeDeclaration {
    pub name: String,
    #[serde(default = "default_package_type_version")]
    pub version: String,
}

fn default_package_type_version() -> String {
    "0.0".to_string()
}

/// Read access to the fields of a package manifest
///
/// String accessors return `None` when the element is absent. Structured
/// fields are parsed by the reader and fail with
/// [`MetadataError::Format`](crate::MetadataError::Format).
pub trait ManifestReader: Send + Sync {
    fn id(&self) -> Option<&str>;

    /// The package version; always required
    fn version(&self) -> Result<Version>;

    fn authors(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn summary(&self) -> Option<&str>;
    fn title(&self) -> Option<&str>;
    fn tags(&self) -> Option<&str>;
    fn language(&self) -> Option<&str>;
    fn release_notes(&self) -> Option<&str>;

    /// Path of the readme entry inside the archive
    fn readme(&self) -> Option<&str>;

    /// Path of the embedded icon entry inside the archive
    fn icon(&self) -> Option<&str>;

    fn icon_url(&self) -> Option<&str>;
    fn license_url(&self) -> Option<&str>;
    fn project_url(&self) -> Option<&str>;

    fn min_client_version(&self) -> Result<Option<Version>>;
    fn require_license_acceptance(&self) -> bool;

    fn repository(&self) -> Option<RepositoryMetadata>;

    /// Dependency groups in manifest order
    fn dependency_groups(&self) -> Result<Vec<DependencyGroup>>;

    /// Package type declarations in manifest order
    fn package_types(&self) -> Vec<PackageTypeDeclaration>;
}

/// Serialized form of a dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDependency {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Serialized form of a dependency group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDependencyGroup {
    pub target_framework: String,
    #[serde(default)]
    pub dependencies: Vec<ManifestDependency>,
}

/// A package manifest document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub release_notes: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub license_url: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub min_client_version: Option<String>,
    #[serde(default)]
    pub require_license_acceptance: bool,
    #[serde(default)]
    pub repository: Option<RepositoryMetadata>,
    #[serde(default)]
    pub dependency_groups: Vec<ManifestDependencyGroup>,
    #[serde(default)]
    pub package_types: Vec<PackageTypeDeclaration>,
}

impl Manifest {
    /// Create a manifest with only the required fields
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Parse a manifest from its JSON representation
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

impl ManifestReader for Manifest {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn version(&self) -> Result<Version> {
        Version::parse(&self.version)
    }

    fn authors(&self) -> Option<&str> {
        self.authors.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn tags(&self) -> Option<&str> {
        self.tags.as_deref()
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn release_notes(&self) -> Option<&str> {
        self.release_notes.as_deref()
    }

    fn readme(&self) -> Option<&str> {
        self.readme.as_deref()
    }

    fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    fn icon_url(&self) -> Option<&str> {
        self.icon_url.as_deref()
    }

    fn license_url(&self) -> Option<&str> {
        self.license_url.as_deref()
    }

    fn project_url(&self) -> Option<&str> {
        self.project_url.as_deref()
    }

    fn min_client_version(&self) -> Result<Option<Version>> {
        match self.min_client_version.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Version::parse(raw).map(Some),
            _ => Ok(None),
        }
    }

    fn require_license_acceptance(&self) -> bool {
        self.require_license_acceptance
    }

    fn repository(&self) -> Option<RepositoryMetadata> {
        self.repository.clone()
    }

    fn dependency_groups(&self) -> Result<Vec<DependencyGroup>> {
        self.dependency_groups
            .iter()
            .map(|group| -> Result<DependencyGroup> {
                let dependencies = group
                    .dependencies
                    .iter()
                    .map(|dependency| -> Result<Dependency> {
                        let range = match dependency.version.as_deref().map(str::trim) {
                            Some(raw) if !raw.is_empty() => Some(VersionRange::parse(raw)?),
                            _ => None,
                        };
                        Ok(Dependency {
                            id: dependency.id.clone(),
                            range,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(DependencyGroup {
                    target_framework: group.target_framework.clone(),
                    dependencies,
                })
            })
            .collect()
    }

    fn package_types(&self) -> Vec<PackageTypeDeclaration> {
        self.package_types.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;

    #[test]
    fn test_manifest_from_json() {
        let manifest = Manifest::from_json(
            r#"{
                "id": "Contoso.Utils",
                "version": "1.2.0",
                "repository": { "type": "git", "url": "https://example.com/repo.git" },
                "dependencyGroups": [
                    { "targetFramework": "net6.0", "dependencies": [{ "id": "A", "version": "[1.0,2.0)" }] },
                    { "targetFramework": "netstandard2.0" }
                ],
                "packageTypes": [{ "name": "DotnetTool" }]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.id(), Some("Contoso.Utils"));
        assert_eq!(manifest.version().unwrap().to_string(), "1.2.0");
        assert_eq!(manifest.repository().unwrap().repository_type, "git");

        let groups = manifest.dependency_groups().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].dependencies[0].range.as_ref().unwrap().to_string(), "[1.0.0, 2.0.0)");
        assert!(groups[1].dependencies.is_empty());

        assert_eq!(manifest.package_types()[0].version, "0.0");
    }

    #[test]
    fn test_missing_range_is_unconstrained() {
        let mut manifest = Manifest::new("A", "1.0.0");
        manifest.dependency_groups.push(ManifestDependencyGroup {
            target_framework: "net6.0".to_string(),
            dependencies: vec![
                ManifestDependency { id: "B".to_string(), version: None },
                ManifestDependency { id: "C".to_string(), version: Some("  ".to_string()) },
            ],
        });

        let groups = manifest.dependency_groups().unwrap();
        assert!(groups[0].dependencies.iter().all(|d| d.range.is_none()));
    }

    #[test]
    fn test_invalid_range_is_format_error() {
        let mut manifest = Manifest::new("A", "1.0.0");
        manifest.dependency_groups.push(ManifestDependencyGroup {
            target_framework: "net6.0".to_string(),
            dependencies: vec![ManifestDependency { id: "B".to_string(), version: Some("[2.0,1.0]".to_string()) }],
        });

        assert!(matches!(manifest.dependency_groups(), Err(MetadataError::Format(_))));
    }

    #[test]
    fn test_min_client_version() {
        let mut manifest = Manifest::new("A", "1.0.0");
        assert!(manifest.min_client_version().unwrap().is_none());

        manifest.min_client_version = Some("2.12".to_string());
        assert_eq!(manifest.min_client_version().unwrap().unwrap().to_normalized_string(), "2.12.0");

        manifest.min_client_version = Some("two".to_string());
        assert!(manifest.min_client_version().is_err());
    }
}
