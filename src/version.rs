//! Package versions and dependency version ranges
//!
//! Versions follow the registry ecosystem's rules rather than strict SemVer:
//! one to four numeric parts (legacy `1.0` and `1.0.0.0` forms are accepted),
//! an optional dot-separated pre-release label and optional build metadata.
//! Identifier syntax for the label and metadata is validated with the
//! `semver` crate.

use semver::{BuildMetadata, Prerelease};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{MetadataError, Result};

/// A parsed package version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    /// Fourth (legacy) part; omitted from the normalized form when zero
    revision: u64,
    release_labels: Vec<String>,
    metadata: Option<String>,
}

impl Version {
    /// Create a stable version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            revision: 0,
            release_labels: Vec::new(),
            metadata: None,
        }
    }

    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MetadataError::Format("version is empty".to_string()));
        }

        let (rest, metadata) = match trimmed.split_once('+') {
            Some((rest, meta)) => {
                if meta.is_empty() || BuildMetadata::new(meta).is_err() {
                    return Err(invalid_version(input));
                }
                (rest, Some(meta.to_string()))
            }
            None => (trimmed, None),
        };

        let (numbers, release_labels) = match rest.split_once('-') {
            Some((numbers, release)) => {
                if release.is_empty() || Prerelease::new(release).is_err() {
                    return Err(invalid_version(input));
                }
                (numbers, release.split('.').map(String::from).collect())
            }
            None => (rest, Vec::new()),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() > 4 {
            return Err(invalid_version(input));
        }

        let mut values = [0u64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid_version(input));
            }
            *slot = part.parse().map_err(|_| invalid_version(input))?;
        }

        Ok(Self {
            major: values[0],
            minor: values[1],
            patch: values[2],
            revision: values[3],
            release_labels,
            metadata,
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Dot-separated segments of the pre-release label
    pub fn release_labels(&self) -> &[String] {
        &self.release_labels
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn is_prerelease(&self) -> bool {
        !self.release_labels.is_empty()
    }

    /// Whether this version can only be understood by a SemVer 2.0.0 aware client
    ///
    /// True when the version carries build metadata, or its pre-release label
    /// has more than one segment or any all-numeric segment.
    pub fn is_semver2(&self) -> bool {
        self.metadata.is_some()
            || self.release_labels.len() > 1
            || self.release_labels.iter().any(|label| is_numeric(label))
    }

    /// Normalized form without build metadata (e.g. `1.0.0-beta`)
    pub fn to_normalized_string(&self) -> String {
        let mut normalized = format!("{}.{}.{}", self.major, self.minor, self.patch);
        if self.revision > 0 {
            normalized.push_str(&format!(".{}", self.revision));
        }
        if self.is_prerelease() {
            normalized.push('-');
            normalized.push_str(&self.release_labels.join("."));
        }
        normalized
    }

    /// Normalized form including build metadata (e.g. `1.0.0-beta+abc`)
    pub fn to_full_string(&self) -> String {
        match &self.metadata {
            Some(metadata) => format!("{}+{}", self.to_normalized_string(), metadata),
            None => self.to_normalized_string(),
        }
    }

    /// Compare by precedence, ignoring build metadata
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch, self.revision)
            .cmp(&(other.major, other.minor, other.patch, other.revision))
            .then_with(|| compare_release_labels(&self.release_labels, &other.release_labels))
    }
}

fn invalid_version(input: &str) -> MetadataError {
    MetadataError::Format(format!("'{}' is not a valid version string", input))
}

fn is_numeric(label: &str) -> bool {
    !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit())
}

fn compare_release_labels(left: &[String], right: &[String]) -> Ordering {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => return Ordering::Equal,
        // A stable version sorts above any pre-release of the same numbers
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    for (l, r) in left.iter().zip(right) {
        let ordering = match (is_numeric(l), is_numeric(r)) {
            (true, true) => {
                let l_value: u128 = l.parse().unwrap_or(u128::MAX);
                let r_value: u128 = r.parse().unwrap_or(u128::MAX);
                l_value.cmp(&r_value)
            }
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => l.to_ascii_lowercase().cmp(&r.to_ascii_lowercase()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    left.len().cmp(&right.len())
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_full_string())
    }
}

impl FromStr for Version {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A dependency version range with optional lower and upper bounds
///
/// Accepts the ecosystem's interval notation: a bare version means
/// "at least", `[1.0]` is an exact match, and `[1.0,2.0)`, `(,2.0]` and
/// friends give explicit bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    min: Option<Version>,
    min_inclusive: bool,
    max: Option<Version>,
    max_inclusive: bool,
}

impl VersionRange {
    /// The range matching every version
    pub fn all() -> Self {
        Self {
            min: None,
            min_inclusive: false,
            max: None,
            max_inclusive: false,
        }
    }

    /// `version` or anything above it
    pub fn at_least(version: Version) -> Self {
        Self {
            min: Some(version),
            min_inclusive: true,
            max: None,
            max_inclusive: false,
        }
    }

    /// Parse range notation
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MetadataError::Format("version range is empty".to_string()));
        }

        if !trimmed.starts_with(['[', '(']) {
            let version = Version::parse(trimmed).map_err(|_| invalid_range(input))?;
            return Ok(Self::at_least(version));
        }

        let min_inclusive = trimmed.starts_with('[');
        let max_inclusive = match trimmed.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(invalid_range(input)),
        };
        if trimmed.len() < 2 {
            return Err(invalid_range(input));
        }

        let inner = &trimmed[1..trimmed.len() - 1];
        let bounds: Vec<&str> = inner.split(',').collect();

        match bounds.as_slice() {
            [exact] => {
                let exact = exact.trim();
                if exact.is_empty() || !(min_inclusive && max_inclusive) {
                    return Err(invalid_range(input));
                }
                let version = Version::parse(exact).map_err(|_| invalid_range(input))?;
                Ok(Self {
                    min: Some(version.clone()),
                    min_inclusive: true,
                    max: Some(version),
                    max_inclusive: true,
                })
            }
            [low, high] => {
                let min = parse_bound(low, input)?;
                let max = parse_bound(high, input)?;

                if let (Some(min), Some(max)) = (&min, &max) {
                    match min.cmp_precedence(max) {
                        Ordering::Greater => return Err(invalid_range(input)),
                        Ordering::Equal if !(min_inclusive && max_inclusive) => {
                            return Err(invalid_range(input))
                        }
                        _ => {}
                    }
                }

                Ok(Self {
                    min_inclusive: min_inclusive && min.is_some(),
                    max_inclusive: max_inclusive && max.is_some(),
                    min,
                    max,
                })
            }
            _ => Err(invalid_range(input)),
        }
    }

    pub fn min(&self) -> Option<&Version> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&Version> {
        self.max.as_ref()
    }

    pub fn is_min_inclusive(&self) -> bool {
        self.min_inclusive
    }

    pub fn is_max_inclusive(&self) -> bool {
        self.max_inclusive
    }

    /// True when neither bound is set
    pub fn is_unconstrained(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

fn parse_bound(raw: &str, input: &str) -> Result<Option<Version>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Version::parse(raw).map(Some).map_err(|_| invalid_range(input))
}

fn invalid_range(input: &str) -> MetadataError {
    MetadataError::Format(format!("'{}' is not a valid version range", input))
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(min), Some(max)) = (&self.min, &self.max) {
            if self.min_inclusive && self.max_inclusive && min == max {
                return write!(f, "[{}]", min.to_normalized_string());
            }
        }

        let open = if self.min_inclusive { '[' } else { '(' };
        let close = if self.max_inclusive { ']' } else { ')' };
        let min = self.min.as_ref().map(Version::to_normalized_string).unwrap_or_default();
        let max = self.max.as_ref().map(Version::to_normalized_string).unwrap_or_default();
        write!(f, "{}{}, {}{}", open, min, max, close)
    }
}

impl FromStr for VersionRange {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
