use crate::error::{Result, TaggerError};
use crate::git::{GitIdentity, GitWorkspace, RepositoryOrigin};
use std::collections::BTreeSet;

/// A call made against [MockWorkspace], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceCall {
    EnsureRepository,
    ConfigureIdentity(GitIdentity),
    FetchTags,
    CreateTag { name: String, message: String },
    PushTag(String),
    DeleteTag(String),
}

/// Step of [GitWorkspace] that a mock can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Ensure,
    Identity,
    Fetch,
    Create,
    Push,
    Delete,
}

/// Mock workspace for testing without actual git operations
pub struct MockWorkspace {
    origin: RepositoryOrigin,
    calls: Vec<WorkspaceCall>,
    local_tags: BTreeSet<String>,
    pushed_tags: BTreeSet<String>,
    failing: BTreeSet<Step>,
}

impl MockWorkspace {
    /// Create a mock that reports an existing repository
    pub fn new() -> Self {
        MockWorkspace {
            origin: RepositoryOrigin::Existing,
            calls: Vec::new(),
            local_tags: BTreeSet::new(),
            pushed_tags: BTreeSet::new(),
            failing: BTreeSet::new(),
        }
    }

    /// Report a fresh clone from `ensure_repository`
    pub fn cloned(mut self) -> Self {
        self.origin = RepositoryOrigin::Cloned;
        self
    }

    /// Make a step fail with a git error
    pub fn fail_on(mut self, step: Step) -> Self {
        self.failing.insert(step);
        self
    }

    /// Seed a tag that already exists locally
    pub fn add_local_tag(&mut self, name: impl Into<String>) {
        self.local_tags.insert(name.into());
    }

    pub fn calls(&self) -> &[WorkspaceCall] {
        &self.calls
    }

    pub fn local_tags(&self) -> Vec<String> {
        self.local_tags.iter().cloned().collect()
    }

    pub fn pushed_tags(&self) -> Vec<String> {
        self.pushed_tags.iter().cloned().collect()
    }

    /// Whether any call would have written to the repository or remote
    pub fn wrote_anything(&self) -> bool {
        self.calls.iter().any(|call| {
            matches!(
                call,
                WorkspaceCall::CreateTag { .. }
                    | WorkspaceCall::PushTag(_)
                    | WorkspaceCall::DeleteTag(_)
            )
        })
    }

    fn check(&self, step: Step) -> Result<()> {
        if self.failing.contains(&step) {
            Err(git2::Error::from_str(&format!("simulated {:?} failure", step)).into())
        } else {
            Ok(())
        }
    }
}

impl Default for MockWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl GitWorkspace for MockWorkspace {
    fn ensure_repository(&mut self) -> Result<RepositoryOrigin> {
        self.calls.push(WorkspaceCall::EnsureRepository);
        self.check(Step::Ensure)?;
        Ok(self.origin)
    }

    fn configure_identity(&mut self, identity: &GitIdentity) -> Result<()> {
        self.calls
            .push(WorkspaceCall::ConfigureIdentity(identity.clone()));
        self.check(Step::Identity)
    }

    fn fetch_tags(&mut self) -> Result<()> {
        self.calls.push(WorkspaceCall::FetchTags);
        self.check(Step::Fetch)
    }

    fn create_annotated_tag(&mut self, name: &str, message: &str) -> Result<()> {
        self.calls.push(WorkspaceCall::CreateTag {
            name: name.to_string(),
            message: message.to_string(),
        });
        self.check(Step::Create)?;

        if !self.local_tags.insert(name.to_string()) {
            return Err(TaggerError::publish(format!(
                "tag '{}' already exists locally",
                name
            )));
        }
        Ok(())
    }

    fn push_tag(&mut self, name: &str) -> Result<()> {
        self.calls.push(WorkspaceCall::PushTag(name.to_string()));
        self.check(Step::Push)?;
        self.pushed_tags.insert(name.to_string());
        Ok(())
    }

    fn delete_local_tag(&mut self, name: &str) -> Result<()> {
        self.calls.push(WorkspaceCall::DeleteTag(name.to_string()));
        self.check(Step::Delete)?;
        self.local_tags.remove(name);
        Ok(())
    }
}
