//! Main workflow orchestration logic
//!
//! Ties the pure version rules to the host and git collaborators. Every step
//! either succeeds or aborts the run; nothing is retried.

use tracing::{debug, info};

use crate::boundary::BoundaryWarning;
use crate::config::{render_tag_message, Config};
use crate::domain::{resolve_current, ChangeType, Namespace};
use crate::error::{Result, TaggerError};
use crate::git::{GitIdentity, GitWorkspace, RepositoryOrigin};
use crate::host::{RepoSlug, TagHost};
use crate::ui::{Reporter, RunSummary};

/// Everything one run needs, validated up front
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub repo: RepoSlug,
    pub namespace: Namespace,
    pub change_type: ChangeType,
    pub identity: GitIdentity,
    /// Annotated tag message template, see [render_tag_message]
    pub tag_message: String,
    /// Stop after the existence check without writing anything
    pub dry_run: bool,
}

impl PublishRequest {
    /// Validate raw inputs into a request.
    ///
    /// # Errors
    /// - [`TaggerError::Config`] for a malformed repo or empty application name
    /// - [`TaggerError::InvalidChangeType`] for anything but major/minor/patch
    pub fn from_inputs(
        repo: &str,
        application_name: &str,
        release_type: Option<&str>,
        change_type: &str,
        config: &Config,
    ) -> Result<Self> {
        Ok(PublishRequest {
            repo: repo.parse()?,
            namespace: Namespace::new(application_name, release_type)?,
            change_type: change_type.parse()?,
            identity: GitIdentity::new(&config.git.user_name, &config.git.user_email),
            tag_message: config.git.tag_message.clone(),
            dry_run: false,
        })
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Result of a successful publish workflow
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    /// Version part of the new tag, e.g. `V1.2.0-beta`
    pub tag_version: String,
    /// Full new tag, e.g. `myapp/V1.2.0-beta`
    pub new_tag: String,
    /// Tag the new version was derived from, if any
    pub previous_tag: Option<String>,
    /// Whether the tag reached the remote (false on dry runs)
    pub pushed: bool,
}

/// Main publish workflow
///
/// Orchestrates the entire tagging process:
/// 1. Make sure a local repository exists and fetch its tags
/// 2. List the host's tags and resolve the namespace's current version
/// 3. Bump it and build the candidate tag name
/// 4. Refuse to continue if the host already has that tag
/// 5. Create the annotated tag and push it
///
/// Between the existence check and the push another run may publish the same
/// tag; the push is then rejected and this run fails.
///
/// If the push fails the local tag is deleted again before the error is
/// returned, so re-running the workflow is the recovery path.
pub fn run_publish_workflow<H, W, R>(
    request: &PublishRequest,
    host: &H,
    workspace: &mut W,
    reporter: &R,
) -> Result<PublishOutcome>
where
    H: TagHost + ?Sized,
    W: GitWorkspace + ?Sized,
    R: Reporter + ?Sized,
{
    let namespace = &request.namespace;

    reporter.status(&format!("Application: {}", namespace.application()));
    reporter.status(&format!(
        "Release Type: {}",
        namespace.release_type().unwrap_or("Production")
    ));
    reporter.status(&format!("Change Type: {}", request.change_type));

    match workspace.ensure_repository()? {
        RepositoryOrigin::Existing => reporter.status("Already in a git repository"),
        RepositoryOrigin::Cloned => reporter.status(&format!("Cloned {}", request.repo)),
    }
    workspace.configure_identity(&request.identity)?;

    reporter.status("Fetching all repository tags...");
    workspace.fetch_tags()?;

    let tags = host.list_tags(&request.repo)?;
    reporter.status(&format!("Found {} total tags in repository", tags.len()));

    let matching = namespace.filter(&tags);
    reporter.status(&format!(
        "Found {} matching tags for {}",
        matching.len(),
        namespace
    ));

    let resolution = resolve_current(matching.iter().copied(), namespace);
    for warning in &resolution.warnings {
        reporter.warning(warning);
    }
    if let Some(latest) = &resolution.latest_tag {
        reporter.status(&format!("Latest matching tag: {}", latest));
    }
    reporter.status(&format!("Current version: {}", resolution.current));

    let new_version = resolution.current.bump(request.change_type)?;
    let tag_version = namespace.tag_version(&new_version);
    let new_tag = namespace.tag_name(&new_version);
    reporter.status(&format!("New version: {}", new_version));
    reporter.status(&format!("Complete new tag: {}", new_tag));

    if host.ref_exists(&request.repo, &new_tag)? {
        return Err(TaggerError::TagExists(new_tag));
    }

    let outcome = |pushed| PublishOutcome {
        tag_version: tag_version.clone(),
        new_tag: new_tag.clone(),
        previous_tag: resolution.latest_tag.clone(),
        pushed,
    };

    if request.dry_run {
        reporter.warning(&BoundaryWarning::DryRun {
            tag: new_tag.clone(),
        });
        return Ok(outcome(false));
    }

    let message = render_tag_message(&request.tag_message, &tag_version, &new_tag);
    publish_tag(workspace, reporter, &new_tag, &message)?;

    reporter.summary(&RunSummary {
        application: namespace.application().to_string(),
        change_type: request.change_type.to_string(),
        release_type: namespace.release_type().map(str::to_string),
        new_tag: new_tag.clone(),
        tag_version: tag_version.clone(),
    });
    reporter.success("Successfully created and pushed new version tag!");

    Ok(outcome(true))
}

/// Create the annotated tag and push it as one step.
///
/// A failed push rolls back the local tag. If the rollback fails too, the
/// push error is still the one returned.
fn publish_tag<W, R>(workspace: &mut W, reporter: &R, tag: &str, message: &str) -> Result<()>
where
    W: GitWorkspace + ?Sized,
    R: Reporter + ?Sized,
{
    reporter.status(&format!("Creating tag: {}", tag));
    workspace
        .create_annotated_tag(tag, message)
        .map_err(|e| TaggerError::publish(format!("cannot create {}: {}", tag, e)))?;

    if let Err(push_error) = workspace.push_tag(tag) {
        info!(tag, "push failed, deleting local tag");
        match workspace.delete_local_tag(tag) {
            Ok(()) => reporter.warning(&BoundaryWarning::LocalTagRolledBack {
                tag: tag.to_string(),
            }),
            Err(e) => debug!(tag, error = %e, "could not delete local tag"),
        }
        return Err(match push_error {
            TaggerError::Publish(_) => push_error,
            other => TaggerError::publish(format!("cannot push {}: {}", tag, other)),
        });
    }

    reporter.success(&format!("Successfully created and pushed tag: {}", tag));
    Ok(())
}
