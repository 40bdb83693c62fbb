//! Package metadata extraction
//!
//! Turns an archive's manifest into a registry-ready [`Package`], applying
//! the ecosystem's defaulting and validation rules. Extraction is
//! all-or-nothing: the first error aborts it and no partial record escapes.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::archive::{ArchiveReader, EntryStream};
use crate::clock::{Clock, SystemClock};
use crate::error::{MetadataError, Result};
use crate::fields::{parse_authors, parse_repository, parse_tags, parse_uri, strip_leading_separators};
use crate::manifest::DependencyGroup;
use crate::package::{Package, PackageDependency, PackageType, TargetFramework};
use crate::semver_level;

/// Builds [`Package`] records from package archives
#[derive(Debug, Clone, Default)]
pub struct MetadataExtractor<C: Clock = SystemClock> {
    clock: C,
}

impl MetadataExtractor<SystemClock> {
    /// Extractor stamping packages with the system time
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> MetadataExtractor<C> {
    /// Extractor stamping packages with `clock`
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Extract the metadata of one package
    ///
    /// Fails with `Format` for an unparseable version, min client version,
    /// dependency range or declared URL, `Validation` for an overlong
    /// repository type, `Integrity` when a declared readme or icon is missing
    /// from the archive, and `Cancelled` if `cancellation` fires while the
    /// archive is being read.
    pub async fn extract<A>(&self, archive: &A, cancellation: &CancellationToken) -> Result<Package>
    where
        A: ArchiveReader + ?Sized,
    {
        let manifest = archive.manifest();

        let version = manifest.version()?;
        let id = manifest.id().unwrap_or_default().to_string();

        let min_client_version = manifest
            .min_client_version()?
            .map(|v| v.to_normalized_string());

        let (repository_url, repository_type) = parse_repository(manifest.repository().as_ref())?;

        let icon_url = parse_uri("iconUrl", manifest.icon_url())?;
        let license_url = parse_uri("licenseUrl", manifest.license_url())?;
        let project_url = parse_uri("projectUrl", manifest.project_url())?;

        let dependency_groups = manifest.dependency_groups()?;
        let sem_ver_level = semver_level::classify(&version, &dependency_groups);
        let dependencies = flatten_dependencies(&dependency_groups);

        let has_readme = !manifest.readme().unwrap_or_default().is_empty();
        let has_embedded_icon = !manifest.icon().unwrap_or_default().is_empty();

        if has_readme {
            ensure_entry(archive, manifest.readme().unwrap_or_default(), cancellation).await?;
        }
        if has_embedded_icon {
            ensure_entry(archive, manifest.icon().unwrap_or_default(), cancellation).await?;
        }

        let package = Package {
            id,
            is_prerelease: version.is_prerelease(),
            version,
            authors: parse_authors(manifest.authors()),
            description: manifest.description().unwrap_or_default().to_string(),
            has_readme,
            has_embedded_icon,
            language: manifest.language().unwrap_or_default().to_string(),
            release_notes: manifest.release_notes().unwrap_or_default().to_string(),
            listed: true,
            min_client_version,
            published: self.clock.now(),
            require_license_acceptance: manifest.require_license_acceptance(),
            sem_ver_level,
            summary: manifest.summary().unwrap_or_default().to_string(),
            title: manifest.title().unwrap_or_default().to_string(),
            icon_url,
            license_url,
            project_url,
            repository_url,
            repository_type,
            dependencies,
            tags: parse_tags(manifest.tags()),
            package_types: package_types(archive),
            target_frameworks: target_frameworks(archive),
        };

        tracing::debug!(
            id = %package.id,
            version = %package.version,
            dependencies = package.dependencies.len(),
            sem_ver_level = ?package.sem_ver_level,
            "Extracted package metadata"
        );

        Ok(package)
    }
}

/// Open the readme declared by the archive's manifest
pub async fn open_readme<A>(archive: &A, cancellation: &CancellationToken) -> Result<EntryStream>
where
    A: ArchiveReader + ?Sized,
{
    let path = archive
        .manifest()
        .readme()
        .filter(|path| !path.is_empty())
        .ok_or(MetadataError::MissingResource("readme"))?;
    cancellable(cancellation, archive.open(strip_leading_separators(path))).await
}

/// Open the embedded icon declared by the archive's manifest
pub async fn open_icon<A>(archive: &A, cancellation: &CancellationToken) -> Result<EntryStream>
where
    A: ArchiveReader + ?Sized,
{
    let path = archive
        .manifest()
        .icon()
        .filter(|path| !path.is_empty())
        .ok_or(MetadataError::MissingResource("icon"))?;
    cancellable(cancellation, archive.open(strip_leading_separators(path))).await
}

/// Race an archive operation against cancellation
async fn cancellable<T>(
    cancellation: &CancellationToken,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;

        _ = cancellation.cancelled() => Err(MetadataError::Cancelled),
        result = operation => result,
    }
}

async fn ensure_entry<A>(archive: &A, declared: &str, cancellation: &CancellationToken) -> Result<()>
where
    A: ArchiveReader + ?Sized,
{
    let path = strip_leading_separators(declared);
    if cancellable(cancellation, archive.exists(path)).await? {
        Ok(())
    } else {
        Err(MetadataError::Integrity {
            path: declared.to_string(),
        })
    }
}

/// One entry per declared dependency, or an empty-group entry for a
/// framework declared without any
fn flatten_dependencies(groups: &[DependencyGroup]) -> Vec<PackageDependency> {
    let mut dependencies = Vec::new();

    for group in groups {
        if group.dependencies.is_empty() {
            dependencies.push(PackageDependency::empty_group(&group.target_framework));
        }

        for dependency in &group.dependencies {
            dependencies.push(PackageDependency {
                id: Some(dependency.id.clone()),
                version_range: dependency
                    .range
                    .as_ref()
                    .filter(|range| !range.is_unconstrained())
                    .map(|range| range.to_string()),
                target_framework: group.target_framework.clone(),
            });
        }
    }

    dependencies
}

fn package_types<A: ArchiveReader + ?Sized>(archive: &A) -> Vec<PackageType> {
    let mut package_types: Vec<PackageType> = archive
        .manifest()
        .package_types()
        .into_iter()
        .map(|declared| PackageType {
            name: declared.name,
            version: declared.version,
        })
        .collect();

    if package_types.is_empty() {
        package_types.push(PackageType::dependency());
    }

    package_types
}

fn target_frameworks<A: ArchiveReader + ?Sized>(archive: &A) -> Vec<TargetFramework> {
    let mut frameworks: Vec<TargetFramework> = archive
        .supported_frameworks()
        .into_iter()
        .map(TargetFramework::new)
        .collect();

    if frameworks.is_empty() {
        frameworks.push(TargetFramework::any());
    }

    frameworks
}
