//! SemVer 2.0.0 compliance classification

use crate::manifest::DependencyGroup;
use crate::package::SemVerLevel;
use crate::version::Version;

/// Classify a package by its own version and its dependency ranges.
///
/// The package is `SemVer2` if its version, or either bound of any
/// dependency range, needs a SemVer 2.0.0 aware client to be understood.
pub fn classify(version: &Version, dependency_groups: &[DependencyGroup]) -> SemVerLevel {
    if version.is_semver2() {
        return SemVerLevel::SemVer2;
    }

    let dependency_needs_semver2 = dependency_groups
        .iter()
        .flat_map(|group| &group.dependencies)
        .filter_map(|dependency| dependency.range.as_ref())
        .flat_map(|range| [range.min(), range.max()])
        .flatten()
        .any(Version::is_semver2);

    if dependency_needs_semver2 {
        SemVerLevel::SemVer2
    } else {
        SemVerLevel::Unknown
    }
}
