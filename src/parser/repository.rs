//! Repository reference parsing (SSH and HTTPS forms).

use std::fmt;

use tracing::debug;
use url::Url;

use super::error::ParseError;

/// The only host whose URL scheme and page layout the crawler understands.
pub const SUPPORTED_HOST: &str = "github.com";

/// An `owner/name` pair identifying one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Creates a reference from already-validated parts.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Returns the repository owner (user or organization).
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name without any `.git` suffix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the `/owner/name` path prefix shared by every repository page.
    #[must_use]
    pub fn path_prefix(&self) -> String {
        format!("/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parses a repository reference into its owner and name.
///
/// Accepted forms:
/// - `git@github.com:owner/repo.git` (any user, `.git` optional)
/// - `https://github.com/owner/repo` with optional trailing path, slash or `.git`
///
/// # Errors
///
/// Returns [`ParseError::InvalidReference`] when the host is not
/// `github.com`, the input is not a URL, or the path lacks an owner and name.
///
/// # Examples
///
/// ```
/// use repofetch_core::parser::parse_repository_ref;
///
/// let repo = parse_repository_ref("git@github.com:rust-lang/cargo.git").unwrap();
/// assert_eq!(repo.owner(), "rust-lang");
/// assert_eq!(repo.name(), "cargo");
/// ```
#[tracing::instrument(level = "debug")]
pub fn parse_repository_ref(input: &str) -> Result<RepositoryRef, ParseError> {
    let trimmed = input.trim().trim_end_matches('/');

    if let Some(path) = ssh_path(trimmed) {
        return split_owner_and_name(input, path);
    }

    let parsed = Url::parse(trimmed).map_err(|e| ParseError::malformed(input, &e.to_string()))?;
    let host = parsed.host_str().unwrap_or_default();
    if !matches!(parsed.scheme(), "http" | "https") || host != SUPPORTED_HOST {
        let shown = if host.is_empty() { parsed.scheme() } else { host };
        return Err(ParseError::wrong_host(input, shown));
    }

    split_owner_and_name(input, parsed.path())
}

/// Returns the `owner/repo` part of an scp-like `user@host:path` reference.
fn ssh_path(input: &str) -> Option<&str> {
    if input.contains("://") {
        return None;
    }
    let (authority, path) = input.split_once(':')?;
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    (host == SUPPORTED_HOST).then_some(path)
}

fn split_owner_and_name(input: &str, path: &str) -> Result<RepositoryRef, ParseError> {
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    let (Some(owner), Some(raw_name)) = (segments.next(), segments.next()) else {
        return Err(ParseError::missing_segments(input));
    };

    let name = raw_name.strip_suffix(".git").unwrap_or(raw_name);
    if name.is_empty() {
        return Err(ParseError::missing_segments(input));
    }

    debug!(owner, name, "parsed repository reference");
    Ok(RepositoryRef::new(owner, name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_https_reference() {
        let repo = parse_repository_ref("https://github.com/octo/demo").unwrap();
        assert_eq!(repo, RepositoryRef::new("octo", "demo"));
    }

    #[test]
    fn test_parse_https_strips_trailing_slash_and_git_suffix() {
        let repo = parse_repository_ref("https://github.com/octo/demo.git/").unwrap();
        assert_eq!(repo.name(), "demo");
    }

    #[test]
    fn test_parse_https_ignores_deeper_path() {
        let repo = parse_repository_ref("https://github.com/octo/demo/tree/main/src").unwrap();
        assert_eq!(repo, RepositoryRef::new("octo", "demo"));
    }

    #[test]
    fn test_parse_http_scheme_accepted() {
        let repo = parse_repository_ref("http://github.com/octo/demo").unwrap();
        assert_eq!(repo.owner(), "octo");
    }

    #[test]
    fn test_parse_ssh_reference() {
        let repo = parse_repository_ref("git@github.com:octo/demo.git").unwrap();
        assert_eq!(repo, RepositoryRef::new("octo", "demo"));
    }

    #[test]
    fn test_parse_ssh_reference_without_user_or_suffix() {
        let repo = parse_repository_ref("github.com:octo/demo").unwrap();
        assert_eq!(repo, RepositoryRef::new("octo", "demo"));
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let repo = parse_repository_ref("  https://github.com/octo/demo  ").unwrap();
        assert_eq!(repo.to_string(), "octo/demo");
    }

    #[test]
    fn test_parse_rejects_other_host() {
        let err = parse_repository_ref("https://gitlab.com/octo/demo").unwrap_err();
        assert!(matches!(err, ParseError::InvalidReference { .. }));
        assert!(err.to_string().contains("gitlab.com"));
    }

    #[test]
    fn test_parse_rejects_ssh_on_other_host() {
        assert!(parse_repository_ref("git@gitlab.com:octo/demo.git").is_err());
    }

    #[test]
    fn test_parse_rejects_single_segment() {
        let err = parse_repository_ref("https://github.com/octo").unwrap_err();
        assert!(err.to_string().contains("owner and a repository name"));
    }

    #[test]
    fn test_parse_rejects_bare_git_suffix_name() {
        assert!(parse_repository_ref("https://github.com/octo/.git").is_err());
    }

    #[test]
    fn test_parse_rejects_non_url_text() {
        assert!(parse_repository_ref("octo/demo").is_err());
        assert!(parse_repository_ref("").is_err());
    }

    #[test]
    fn test_path_prefix() {
        assert_eq!(RepositoryRef::new("a", "b").path_prefix(), "/a/b");
    }
}
