//! Local git workspace abstraction
//!
//! The publish workflow needs a local checkout to create the annotated tag
//! and push it. The [GitWorkspace] trait covers those steps:
//!
//! - [repository::Git2Workspace]: a real implementation using the `git2` crate
//! - [mock::MockWorkspace]: a recording implementation for tests
//!
//! Every method either succeeds or returns an error; the workflow treats any
//! error as fatal.

pub mod mock;
pub mod repository;

pub use mock::{MockWorkspace, Step, WorkspaceCall};
pub use repository::Git2Workspace;

use crate::error::Result;

/// Author identity used for tag objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

impl GitIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        GitIdentity {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// How the workspace got its repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOrigin {
    /// The working directory already was a git repository
    Existing,
    /// The repository was cloned into the working directory
    Cloned,
}

/// Git operations the publish workflow performs on the local checkout
pub trait GitWorkspace {
    /// Make sure a repository is available, cloning it when the working
    /// directory is not inside one.
    fn ensure_repository(&mut self) -> Result<RepositoryOrigin>;

    /// Set the author identity used by later tag operations.
    fn configure_identity(&mut self, identity: &GitIdentity) -> Result<()>;

    /// Fetch all tags from the remote.
    fn fetch_tags(&mut self) -> Result<()>;

    /// Create an annotated tag on HEAD. Fails if the tag already exists locally.
    fn create_annotated_tag(&mut self, name: &str, message: &str) -> Result<()>;

    /// Push `refs/tags/<name>` to the remote.
    fn push_tag(&mut self, name: &str) -> Result<()>;

    /// Delete a local tag.
    fn delete_local_tag(&mut self, name: &str) -> Result<()>;
}
