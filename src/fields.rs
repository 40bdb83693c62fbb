//! Parsers for individual manifest fields

use url::Url;

use crate::error::{MetadataError, Result};
use crate::manifest::RepositoryMetadata;

/// Delimiters accepted between authors
const AUTHOR_SEPARATORS: [char; 5] = [',', ';', '\t', '\n', '\r'];

/// Longest repository type the registry stores
pub const MAX_REPOSITORY_TYPE_LENGTH: usize = 100;

/// Split an authors field into individual authors.
///
/// Tokens are kept verbatim and in order; empty tokens are dropped.
pub fn parse_authors(authors: Option<&str>) -> Vec<String> {
    match authors {
        Some(authors) if !authors.is_empty() => authors
            .split(AUTHOR_SEPARATORS)
            .filter(|author| !author.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Split a tags field on single spaces, dropping empty tokens.
pub fn parse_tags(tags: Option<&str>) -> Vec<String> {
    match tags {
        Some(tags) if !tags.is_empty() => tags
            .split(' ')
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse an optional absolute URI.
///
/// An empty or missing value is `None`; anything else must be an absolute URI.
pub fn parse_uri(field: &str, value: Option<&str>) -> Result<Option<Url>> {
    match value {
        Some(value) if !value.is_empty() => Url::parse(value).map(Some).map_err(|e| {
            MetadataError::Format(format!("{} '{}' is not an absolute URI: {}", field, value, e))
        }),
        _ => Ok(None),
    }
}

/// Resolve repository metadata into a `(url, type)` pair.
///
/// An empty URL, or one that is not absolute http(s), drops both values
/// without error. Once a URL is present, an overlong repository type is
/// rejected whether or not the URL is usable.
pub fn parse_repository(
    repository: Option<&RepositoryMetadata>,
) -> Result<(Option<Url>, Option<String>)> {
    let Some(repository) = repository else {
        return Ok((None, None));
    };

    if repository.url.is_empty() {
        return Ok((None, None));
    }

    if repository.repository_type.chars().count() > MAX_REPOSITORY_TYPE_LENGTH {
        return Err(MetadataError::Validation(format!(
            "Repository type must be less than or equal {} characters",
            MAX_REPOSITORY_TYPE_LENGTH
        )));
    }

    let url = match Url::parse(&repository.url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(url = %repository.url, error = %e, "Ignoring unparseable repository URL");
            return Ok((None, None));
        }
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        tracing::warn!(url = %repository.url, scheme = url.scheme(), "Ignoring non-http repository URL");
        return Ok((None, None));
    }

    Ok((Some(url), Some(repository.repository_type.clone())))
}

/// Remove leading `/` and `\` from an archive entry path
pub fn strip_leading_separators(path: &str) -> &str {
    path.trim_start_matches(['/', '\\'])
}
