use crate::error::{Result, TaggerError};
use crate::git::{GitIdentity, GitWorkspace, RepositoryOrigin};
use git2::build::RepoBuilder;
use git2::{
    Cred, CredentialType, ErrorCode, FetchOptions, PushOptions, RemoteCallbacks, Repository,
    Signature,
};
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

const TAG_REFSPEC: &str = "+refs/tags/*:refs/tags/*";

/// [GitWorkspace] backed by libgit2
pub struct Git2Workspace {
    workdir: PathBuf,
    remote: String,
    clone_url: String,
    token: Option<String>,
    identity: Option<GitIdentity>,
    repo: Option<Repository>,
}

impl Git2Workspace {
    /// Create a workspace rooted at `workdir`.
    ///
    /// Nothing is opened until [GitWorkspace::ensure_repository] runs.
    /// `clone_url` is only used when `workdir` is not inside a repository;
    /// `token` authenticates HTTPS fetches and pushes.
    pub fn new(
        workdir: impl Into<PathBuf>,
        remote: impl Into<String>,
        clone_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Git2Workspace {
            workdir: workdir.into(),
            remote: remote.into(),
            clone_url: clone_url.into(),
            token: token.filter(|t| !t.is_empty()),
            identity: None,
            repo: None,
        }
    }

    fn repo(&self) -> Result<&Repository> {
        self.repo.as_ref().ok_or_else(|| {
            TaggerError::from(git2::Error::from_str(
                "repository not opened, ensure_repository must run first",
            ))
        })
    }

    fn signature(&self, repo: &Repository) -> Result<Signature<'static>> {
        let signature = match &self.identity {
            Some(identity) => Signature::now(&identity.name, &identity.email)?,
            None => repo.signature()?,
        };
        Ok(signature)
    }
}

/// Credentials for fetch, clone and push.
///
/// HTTPS remotes get the token as an `x-access-token` password; SSH remotes
/// go through the agent.
fn remote_callbacks(token: Option<&str>) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, allowed_types| {
        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(token) = token {
                return Cred::userpass_plaintext("x-access-token", token);
            }
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
        }

        Cred::default()
    });
    callbacks
}

impl GitWorkspace for Git2Workspace {
    #[instrument(skip(self), fields(workdir = %self.workdir.display()))]
    fn ensure_repository(&mut self) -> Result<RepositoryOrigin> {
        match Repository::discover(&self.workdir) {
            Ok(repo) => {
                debug!("already in a git repository");
                self.repo = Some(repo);
                Ok(RepositoryOrigin::Existing)
            }
            Err(e) if e.code() == ErrorCode::NotFound => {
                info!(url = %self.clone_url, "not in a git repository, cloning");
                let mut fetch_options = FetchOptions::new();
                fetch_options.remote_callbacks(remote_callbacks(self.token.as_deref()));

                let repo = RepoBuilder::new()
                    .fetch_options(fetch_options)
                    .clone(&self.clone_url, &self.workdir)?;
                self.repo = Some(repo);
                Ok(RepositoryOrigin::Cloned)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes `user.name` / `user.email` into the repository's own config
    /// and uses the identity for tag objects.
    fn configure_identity(&mut self, identity: &GitIdentity) -> Result<()> {
        let mut config = self.repo()?.config()?;
        config.set_str("user.name", &identity.name)?;
        config.set_str("user.email", &identity.email)?;
        self.identity = Some(identity.clone());
        Ok(())
    }

    #[instrument(skip(self), fields(remote = %self.remote))]
    fn fetch_tags(&mut self) -> Result<()> {
        let repo = self.repo()?;
        let mut remote = repo.find_remote(&self.remote).map_err(|e| {
            TaggerError::publish(format!("Remote '{}' not found: {}", self.remote, e))
        })?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(self.token.as_deref()));

        remote.fetch(&[TAG_REFSPEC], Some(&mut fetch_options), None)?;
        debug!("fetched tags");
        Ok(())
    }

    #[instrument(skip(self, message))]
    fn create_annotated_tag(&mut self, name: &str, message: &str) -> Result<()> {
        let repo = self.repo()?;
        let signature = self.signature(repo)?;
        let head = repo.head()?.peel_to_commit()?;

        let oid = repo.tag(name, head.as_object(), &signature, message, false)?;
        debug!(%oid, target = %head.id(), "created annotated tag");
        Ok(())
    }

    #[instrument(skip(self), fields(remote = %self.remote))]
    fn push_tag(&mut self, name: &str) -> Result<()> {
        let repo = self.repo()?;
        let mut remote = repo.find_remote(&self.remote).map_err(|e| {
            TaggerError::publish(format!("Remote '{}' not found: {}", self.remote, e))
        })?;

        let mut callbacks = remote_callbacks(self.token.as_deref());

        // A rejected ref does not fail `push` by itself, only this callback sees it.
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => {
                warn!(refname, status, "remote rejected reference");
                Err(git2::Error::from_str(&format!(
                    "remote rejected {}: {}",
                    refname, status
                )))
            }
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/tags/{0}:refs/tags/{0}", name);
        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    TaggerError::publish(format!("Network error during push: {}", e))
                }
                _ => TaggerError::publish(format!("Failed to push tag '{}': {}", name, e)),
            })?;

        debug!("pushed tag");
        Ok(())
    }

    fn delete_local_tag(&mut self, name: &str) -> Result<()> {
        self.repo()?.tag_delete(name)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn init_with_commit(path: &Path) -> Repository {
        let repo = Repository::init(path).unwrap();
        {
            let sig = Signature::now("Test", "test@example.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
                .unwrap();
        }
        repo
    }

    fn url(path: &Path) -> String {
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_operations_require_repository() {
        let dir = TempDir::new().unwrap();
        let mut ws = Git2Workspace::new(dir.path(), "origin", "unused", None);
        assert!(matches!(ws.fetch_tags(), Err(TaggerError::Git(_))));
    }

    #[test]
    fn test_existing_repository_is_opened() {
        let dir = TempDir::new().unwrap();
        init_with_commit(dir.path());

        let mut ws = Git2Workspace::new(dir.path(), "origin", "unused", None);
        assert_eq!(ws.ensure_repository().unwrap(), RepositoryOrigin::Existing);
    }

    #[test]
    fn test_clone_fallback_and_fetch_tags() {
        let source_dir = TempDir::new().unwrap();
        let source = init_with_commit(source_dir.path());
        let target_dir = TempDir::new().unwrap();

        let mut ws = Git2Workspace::new(target_dir.path(), "origin", url(source_dir.path()), None);
        assert_eq!(ws.ensure_repository().unwrap(), RepositoryOrigin::Cloned);

        let head = source.head().unwrap().peel_to_commit().unwrap();
        source
            .tag_lightweight("app/V1.0.0", head.as_object(), false)
            .unwrap();

        ws.fetch_tags().unwrap();
        let local = Repository::open(target_dir.path()).unwrap();
        assert!(local.find_reference("refs/tags/app/V1.0.0").is_ok());
    }

    #[test]
    fn test_create_push_and_delete_annotated_tag() {
        let remote_dir = TempDir::new().unwrap();
        Repository::init_bare(remote_dir.path()).unwrap();

        let work_dir = TempDir::new().unwrap();
        let work = init_with_commit(work_dir.path());
        work.remote("origin", &url(remote_dir.path())).unwrap();

        let mut ws = Git2Workspace::new(work_dir.path(), "origin", "unused", None);
        ws.ensure_repository().unwrap();
        ws.configure_identity(&GitIdentity::new("bot", "bot@example.com"))
            .unwrap();
        ws.create_annotated_tag("app/V1.0.0-beta", "Release V1.0.0-beta")
            .unwrap();

        let tag = work
            .find_reference("refs/tags/app/V1.0.0-beta")
            .unwrap()
            .peel_to_tag()
            .unwrap();
        assert_eq!(tag.message(), Some("Release V1.0.0-beta"));
        assert_eq!(tag.tagger().unwrap().name(), Some("bot"));

        ws.push_tag("app/V1.0.0-beta").unwrap();
        let remote = Repository::open_bare(remote_dir.path()).unwrap();
        assert!(remote.find_reference("refs/tags/app/V1.0.0-beta").is_ok());

        ws.delete_local_tag("app/V1.0.0-beta").unwrap();
        assert!(work.find_reference("refs/tags/app/V1.0.0-beta").is_err());
    }

    #[test]
    fn test_create_refuses_existing_tag() {
        let dir = TempDir::new().unwrap();
        init_with_commit(dir.path());

        let mut ws = Git2Workspace::new(dir.path(), "origin", "unused", None);
        ws.ensure_repository().unwrap();
        ws.configure_identity(&GitIdentity::new("bot", "bot@example.com"))
            .unwrap();
        ws.create_annotated_tag("app/V1.0.0", "first").unwrap();
        assert!(ws.create_annotated_tag("app/V1.0.0", "second").is_err());
    }

    #[test]
    fn test_push_to_missing_remote_fails() {
        let dir = TempDir::new().unwrap();
        init_with_commit(dir.path());

        let mut ws = Git2Workspace::new(dir.path(), "upstream", "unused", None);
        ws.ensure_repository().unwrap();
        assert!(matches!(
            ws.push_tag("app/V1.0.0"),
            Err(TaggerError::Publish(_))
        ));
    }
}
