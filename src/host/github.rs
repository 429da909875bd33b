//! GitHub REST API client for tag listing and ref lookups.

use crate::domain::TagReference;
use crate::error::{Result, TaggerError};
use crate::host::{RepoSlug, TagHost};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Largest page size the tags endpoint honours
pub const MAX_PAGE_SIZE: u32 = 100;

/// Entry of `GET /repos/{owner}/{repo}/tags` (only the fields we use)
#[derive(Debug, Clone, Deserialize)]
struct GitHubTag {
    name: String,
    commit: Option<GitHubCommit>,
}

#[derive(Debug, Clone, Deserialize)]
struct GitHubCommit {
    sha: String,
}

impl From<GitHubTag> for TagReference {
    fn from(tag: GitHubTag) -> Self {
        TagReference {
            name: tag.name,
            commit_sha: tag.commit.map(|c| c.sha),
        }
    }
}

/// GitHub API client
pub struct GitHubClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
    page_size: u32,
    max_pages: Option<u32>,
}

impl GitHubClient {
    /// Create a client against `base_url` (e.g. [DEFAULT_API_URL] or a GHES endpoint)
    ///
    /// # Errors
    /// Returns [`TaggerError::Config`] when `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                TaggerError::config(format!("Invalid API base URL '{}'", base_url))
            })?;

        let http = Client::builder()
            .user_agent(concat!("app-tagger/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            http,
            base_url,
            token: token.filter(|t| !t.is_empty()),
            page_size: MAX_PAGE_SIZE,
            max_pages: None,
        })
    }

    /// Entries requested per page, clamped to `1..=100`
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Stop listing after this many pages
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn get(&self, url: Url) -> Result<Response> {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        Ok(request.send()?)
    }

    /// `base_url` extended by `segments`, each percent-encoded on its own
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn tags_url(&self, repo: &RepoSlug, page: u32) -> Url {
        let mut url = self.endpoint([
            "repos",
            repo.owner.as_str(),
            repo.name.as_str(),
            "tags",
        ]);
        url.query_pairs_mut()
            .append_pair("per_page", &self.page_size.to_string())
            .append_pair("page", &page.to_string());
        url
    }

    /// A `/` in the tag name stays a path separator; everything else that is
    /// not URL-safe (`#`, `%`, `?`) is escaped.
    fn ref_url(&self, repo: &RepoSlug, tag_name: &str) -> Url {
        let prefix = [
            "repos",
            repo.owner.as_str(),
            repo.name.as_str(),
            "git",
            "ref",
            "tags",
        ];
        self.endpoint(prefix.into_iter().chain(tag_name.split('/')))
    }

    fn fetch_page(&self, repo: &RepoSlug, page: u32) -> Result<Vec<TagReference>> {
        let response = self.get(self.tags_url(repo, page))?;

        if !response.status().is_success() {
            return Err(api_error(response, &format!("listing tags of {}", repo)));
        }

        let tags: Vec<GitHubTag> = response.json()?;
        Ok(tags.into_iter().map(TagReference::from).collect())
    }
}

impl TagHost for GitHubClient {
    #[instrument(skip(self, repo), fields(repo = %repo))]
    fn list_tags(&self, repo: &RepoSlug) -> Result<Vec<TagReference>> {
        collect_pages(self.page_size, self.max_pages, |page| {
            self.fetch_page(repo, page)
        })
    }

    #[instrument(skip(self, repo), fields(repo = %repo))]
    fn ref_exists(&self, repo: &RepoSlug, tag_name: &str) -> Result<bool> {
        let response = self.get(self.ref_url(repo, tag_name))?;
        let status = response.status();
        debug!(%status, "ref lookup");

        if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else if status.is_success() {
            Ok(true)
        } else {
            Err(api_error(
                response,
                &format!("checking tag {} of {}", tag_name, repo),
            ))
        }
    }
}

fn api_error(response: Response, context: &str) -> TaggerError {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    TaggerError::host(format!(
        "GitHub API error ({}) while {}: {}",
        status, context, body
    ))
}

/// Drain a 1-based paged listing.
///
/// A page shorter than `page_size` ends the listing. When `max_pages` is
/// reached first the listing is truncated and a warning is logged.
pub(crate) fn collect_pages<T, F>(
    page_size: u32,
    max_pages: Option<u32>,
    mut fetch: F,
) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Result<Vec<T>>,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let batch = fetch(page)?;
        let len = batch.len();
        items.extend(batch);
        debug!(page, len, total = items.len(), "fetched page");

        if len < page_size as usize {
            return Ok(items);
        }

        if max_pages.is_some_and(|max| page >= max) {
            warn!(
                pages = page,
                total = items.len(),
                "tag listing truncated at page limit, current version may be stale"
            );
            return Ok(items);
        }

        page += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(page: u32, len: usize) -> Vec<String> {
        (0..len).map(|i| format!("p{}-{}", page, i)).collect()
    }

    #[test]
    fn test_collect_pages_stops_on_short_page() {
        let mut calls = Vec::new();
        let items = collect_pages(3, None, |page| {
            calls.push(page);
            Ok(numbered(page, if page < 3 { 3 } else { 1 }))
        })
        .unwrap();

        assert_eq!(calls, vec![1, 2, 3]);
        assert_eq!(items.len(), 7);
        assert_eq!(items[0], "p1-0");
        assert_eq!(items[6], "p3-0");
    }

    #[test]
    fn test_collect_pages_empty_first_page() {
        let items: Vec<String> = collect_pages(100, None, |_| Ok(Vec::new())).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_collect_pages_exact_multiple_needs_extra_request() {
        let mut calls = 0;
        let items = collect_pages(2, None, |page| {
            calls += 1;
            Ok(if page <= 2 { numbered(page, 2) } else { Vec::new() })
        })
        .unwrap();

        assert_eq!(calls, 3);
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn test_collect_pages_respects_max_pages() {
        let mut calls = 0;
        let items = collect_pages(2, Some(2), |page| {
            calls += 1;
            Ok(numbered(page, 2))
        })
        .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn test_collect_pages_propagates_errors() {
        let result: Result<Vec<String>> = collect_pages(1, None, |page| {
            if page == 2 {
                Err(TaggerError::host("boom"))
            } else {
                Ok(numbered(page, 1))
            }
        });
        assert!(matches!(result, Err(TaggerError::Host(_))));
    }

    #[test]
    fn test_urls() {
        let client = GitHubClient::new("https://api.example.com/", None)
            .unwrap()
            .with_page_size(500);
        let repo = RepoSlug::new("acme", "mono");

        assert_eq!(
            client.tags_url(&repo, 2).as_str(),
            "https://api.example.com/repos/acme/mono/tags?per_page=100&page=2"
        );
        assert_eq!(
            client.ref_url(&repo, "app/V1.0.0-beta").as_str(),
            "https://api.example.com/repos/acme/mono/git/ref/tags/app/V1.0.0-beta"
        );
    }

    #[test]
    fn test_ref_url_escapes_tag_characters() {
        let client = GitHubClient::new(DEFAULT_API_URL, None).unwrap();
        let repo = RepoSlug::new("acme", "mono");

        assert_eq!(
            client.ref_url(&repo, "app/V1.0.1-rc#2").as_str(),
            "https://api.github.com/repos/acme/mono/git/ref/tags/app/V1.0.1-rc%232"
        );
        assert_eq!(
            client.ref_url(&repo, "app/V1.0.1-50%").as_str(),
            "https://api.github.com/repos/acme/mono/git/ref/tags/app/V1.0.1-50%25"
        );
        assert_eq!(client.ref_url(&repo, "app/V1.0.1-rc#2").fragment(), None);
    }

    #[test]
    fn test_enterprise_base_path_is_kept() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/", None).unwrap();
        assert_eq!(
            client
                .ref_url(&RepoSlug::new("acme", "mono"), "app/V1.0.0")
                .as_str(),
            "https://ghe.example.com/api/v3/repos/acme/mono/git/ref/tags/app/V1.0.0"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            GitHubClient::new("not a url", None),
            Err(TaggerError::Config(_))
        ));
    }

    #[test]
    fn test_page_size_lower_bound() {
        let client = GitHubClient::new(DEFAULT_API_URL, None)
            .unwrap()
            .with_page_size(0);
        assert_eq!(client.page_size, 1);
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client = GitHubClient::new(DEFAULT_API_URL, Some(String::new())).unwrap();
        assert!(client.token.is_none());
    }

    #[test]
    fn test_tag_reference_from_api_entry() {
        let tag = GitHubTag {
            name: "app/V1.0.0".to_string(),
            commit: Some(GitHubCommit {
                sha: "abc123".to_string(),
            }),
        };
        let reference = TagReference::from(tag);
        assert_eq!(reference.name, "app/V1.0.0");
        assert_eq!(reference.commit_sha.as_deref(), Some("abc123"));
    }
}
