//! Source-control host abstraction
//!
//! The publish workflow reads the tag list and checks for an existing ref
//! through the [TagHost] trait. Implementations:
//!
//! - [github::GitHubClient]: the GitHub REST API over blocking `reqwest`
//! - [mock::MockHost]: an in-memory host for tests

pub mod github;
pub mod mock;

pub use github::GitHubClient;
pub use mock::MockHost;

use crate::domain::TagReference;
use crate::error::{Result, TaggerError};
use std::fmt;
use std::str::FromStr;

/// Repository coordinates in `owner/name` form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepoSlug {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoSlug {
    type Err = TaggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(RepoSlug::new(owner, name))
            }
            _ => Err(TaggerError::config(format!(
                "Invalid repo '{}' - expected owner/name",
                s
            ))),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Read access to the tags stored on the source-control host.
pub trait TagHost {
    /// List every tag of the repository.
    ///
    /// Implementations page through the whole listing rather than returning
    /// only the first page.
    fn list_tags(&self, repo: &RepoSlug) -> Result<Vec<TagReference>>;

    /// Check whether `refs/tags/<tag_name>` exists.
    ///
    /// A "not found" answer is `Ok(false)`; every other failure is an error.
    fn ref_exists(&self, repo: &RepoSlug, tag_name: &str) -> Result<bool>;
}

impl<T: TagHost + ?Sized> TagHost for &T {
    fn list_tags(&self, repo: &RepoSlug) -> Result<Vec<TagReference>> {
        (**self).list_tags(repo)
    }

    fn ref_exists(&self, repo: &RepoSlug, tag_name: &str) -> Result<bool> {
        (**self).ref_exists(repo, tag_name)
    }
}
