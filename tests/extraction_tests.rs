//! Extraction Tests
//!
//! End-to-end extraction of manifests into package records.

use chrono::{TimeZone, Utc};
use registry_metadata::manifest::{ManifestDependencyGroup, RepositoryMetadata};
use registry_metadata::{
    FixedClock, Manifest, MemoryArchive, MetadataError, MetadataExtractor, Package,
    PackageDependency, PackageType, SemVerLevel, TargetFramework,
};
use tokio_util::sync::CancellationToken;

fn manifest_fixture(content: &str) -> Manifest {
    Manifest::from_json(content).unwrap()
}

async fn extract(archive: &MemoryArchive) -> Result<Package, MetadataError> {
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap());
    MetadataExtractor::with_clock(clock)
        .extract(archive, &CancellationToken::new())
        .await
}

// =============================================================================
// Full Manifest
// =============================================================================

#[tokio::test]
async fn test_full_manifest() {
    let archive = MemoryArchive::new(manifest_fixture(include_str!("fixtures/full_manifest.json")))
        .with_entry("docs/README.md", "# Contoso.Utils")
        .with_entry("images/icon.png", vec![0x89, b'P', b'N', b'G'])
        .with_framework("net6.0")
        .with_framework("netstandard2.0");

    let package = extract(&archive).await.unwrap();

    assert_eq!(package.id(), "Contoso.Utils");
    assert_eq!(package.version().to_string(), "2.1.0-beta");
    assert!(package.is_prerelease());
    assert_eq!(package.authors(), &["Alice Smith", " Bob Jones", "Carol"]);
    assert_eq!(package.tags(), &["utils", "contoso", "helpers"]);
    assert_eq!(package.title(), "Contoso Utilities");
    assert_eq!(package.summary(), "Utility helpers");
    assert_eq!(package.language(), "en-US");
    assert_eq!(package.release_notes(), "Initial beta.");
    assert!(package.has_readme());
    assert!(package.has_embedded_icon());
    assert!(package.require_license_acceptance());
    assert!(package.listed());
    assert_eq!(package.min_client_version(), Some("5.0.0"));
    assert_eq!(package.sem_ver_level(), SemVerLevel::Unknown);
    assert_eq!(package.project_url().unwrap().as_str(), "https://github.com/contoso/utils");
    assert_eq!(package.repository_url().unwrap().as_str(), "https://github.com/contoso/utils.git");
    assert_eq!(package.repository_type(), Some("git"));
    assert_eq!(package.published(), Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap());

    assert_eq!(
        package.dependencies(),
        &[
            PackageDependency {
                id: Some("Newtonsoft.Json".to_string()),
                version_range: Some("[13.0.1, )".to_string()),
                target_framework: "net6.0".to_string(),
            },
            PackageDependency {
                id: Some("Contoso.Core".to_string()),
                version_range: Some("[1.0.0, 2.0.0)".to_string()),
                target_framework: "net6.0".to_string(),
            },
            PackageDependency::empty_group("netstandard2.0"),
        ]
    );

    assert_eq!(
        package.package_types(),
        &[PackageType { name: "Dependency".to_string(), version: "0.0".to_string() }]
    );
    assert_eq!(
        package.target_frameworks(),
        &[TargetFramework::new("net6.0"), TargetFramework::new("netstandard2.0")]
    );
}

#[tokio::test]
async fn test_extraction_is_deterministic() {
    let archive = MemoryArchive::new(manifest_fixture(include_str!("fixtures/full_manifest.json")))
        .with_entry("docs/README.md", "readme")
        .with_entry("images/icon.png", "icon");

    let first = extract(&archive).await.unwrap();
    let second = extract(&archive).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_package_serializes_camel_case() {
    let package = extract(&MemoryArchive::new(Manifest::new("A", "1.0.0+sha.1"))).await.unwrap();
    let json = serde_json::to_value(&package).unwrap();

    assert_eq!(json["version"], "1.0.0+sha.1");
    assert_eq!(json["semVerLevel"], "SemVer2");
    assert_eq!(json["hasReadme"], false);
    assert_eq!(json["packageTypes"][0]["name"], "Dependency");
    assert_eq!(json["targetFrameworks"][0]["moniker"], "any");
    assert!(json["repositoryUrl"].is_null());
}

// =============================================================================
// Defaults
// =============================================================================

#[tokio::test]
async fn test_no_dependency_groups_no_sentinels() {
    let package = extract(&MemoryArchive::new(Manifest::new("A", "1.0.0"))).await.unwrap();
    assert!(package.dependencies().is_empty());
}

#[tokio::test]
async fn test_empty_group_yields_single_sentinel() {
    let mut manifest = Manifest::new("A", "1.0.0");
    manifest.dependency_groups.push(ManifestDependencyGroup {
        target_framework: "net6.0".to_string(),
        dependencies: Vec::new(),
    });

    let package = extract(&MemoryArchive::new(manifest)).await.unwrap();
    assert_eq!(
        package.dependencies(),
        &[PackageDependency { id: None, version_range: None, target_framework: "net6.0".to_string() }]
    );
}

#[tokio::test]
async fn test_default_package_type_and_framework() {
    let package = extract(&MemoryArchive::new(Manifest::new("A", "1.0.0"))).await.unwrap();
    assert_eq!(
        package.package_types(),
        &[PackageType { name: "Dependency".to_string(), version: "0.0.0.0".to_string() }]
    );
    assert_eq!(package.target_frameworks(), &[TargetFramework { moniker: "any".to_string() }]);
}

#[tokio::test]
async fn test_empty_optional_urls_are_absent() {
    let mut manifest = Manifest::new("A", "1.0.0");
    manifest.icon_url = Some(String::new());
    manifest.license_url = Some(String::new());

    let package = extract(&MemoryArchive::new(manifest)).await.unwrap();
    assert!(package.icon_url().is_none());
    assert!(package.license_url().is_none());
    assert!(package.project_url().is_none());
}

// =============================================================================
// Repository Metadata
// =============================================================================

#[tokio::test]
async fn test_non_http_repository_silently_ignored() {
    let archive = MemoryArchive::new(manifest_fixture(include_str!("fixtures/ignored_repository.json")));

    let package = extract(&archive).await.unwrap();
    assert!(package.repository_url().is_none());
    assert!(package.repository_type().is_none());
    assert_eq!(package.version().to_string(), "1.0.0");
}

#[tokio::test]
async fn test_overlong_repository_type_rejected() {
    let mut manifest = Manifest::new("A", "1.0.0");
    manifest.repository = Some(RepositoryMetadata {
        repository_type: "x".repeat(101),
        url: "https://example.com/repo".to_string(),
    });

    let result = extract(&MemoryArchive::new(manifest)).await;
    assert!(matches!(result, Err(MetadataError::Validation(_))));
}

// =============================================================================
// SemVer Level
// =============================================================================

#[tokio::test]
async fn test_build_metadata_version_is_semver2() {
    let mut manifest = manifest_fixture(include_str!("fixtures/full_manifest.json"));
    manifest.version = "1.0.0+build".to_string();
    manifest.readme = None;
    manifest.icon = None;

    let package = extract(&MemoryArchive::new(manifest)).await.unwrap();
    assert_eq!(package.sem_ver_level(), SemVerLevel::SemVer2);
}

#[tokio::test]
async fn test_semver2_dependency_bound() {
    let archive = MemoryArchive::new(manifest_fixture(include_str!("fixtures/semver2_dependency.json")));
    let package = extract(&archive).await.unwrap();
    assert_eq!(package.sem_ver_level(), SemVerLevel::SemVer2);
}

#[tokio::test]
async fn test_classic_ranges_are_unknown() {
    let mut manifest = Manifest::new("A", "1.0.0");
    manifest.dependency_groups = manifest_fixture(include_str!("fixtures/full_manifest.json")).dependency_groups;

    let package = extract(&MemoryArchive::new(manifest)).await.unwrap();
    assert_eq!(package.sem_ver_level(), SemVerLevel::Unknown);
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_missing_readme_is_integrity_error() {
    let mut manifest = Manifest::new("A", "1.0.0");
    manifest.readme = Some("README.md".to_string());

    let result = extract(&MemoryArchive::new(manifest)).await;
    assert!(matches!(result, Err(MetadataError::Integrity { .. })));
}

#[tokio::test]
async fn test_relative_project_url_is_format_error() {
    let mut manifest = Manifest::new("A", "1.0.0");
    manifest.project_url = Some("github.com/contoso".to_string());

    let result = extract(&MemoryArchive::new(manifest)).await;
    assert!(matches!(result, Err(MetadataError::Format(_))));
}

#[tokio::test]
async fn test_missing_version_is_format_error() {
    let manifest = manifest_fixture(r#"{ "id": "A" }"#);
    let result = extract(&MemoryArchive::new(manifest)).await;
    assert!(matches!(result, Err(ref e) if e.rejects_package()));
    assert!(matches!(result, Err(MetadataError::Format(_))));
}
