use std::fmt;

/// Non-fatal observations made while deriving or publishing a tag.
/// These are reported to the user but never stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No existing tags in the namespace; the initial version is used
    NoMatchingTags { namespace: String },
    /// A version component of a tag could not be read and was taken as 0
    LenientComponent { tag: String, component: String },
    /// Two tags parse to the same version; the first one listed is kept
    DuplicateVersion { kept: String, ignored: String },
    /// The tag was created locally but the push failed, so it was removed again
    LocalTagRolledBack { tag: String },
    /// Nothing was written because the run is a dry run
    DryRun { tag: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoMatchingTags { namespace } => {
                write!(
                    f,
                    "No matching tags found for {}, starting from V1.0.0",
                    namespace
                )
            }
            BoundaryWarning::LenientComponent { tag, component } => {
                write!(
                    f,
                    "Tag '{}' has an unreadable {} component, treating it as 0",
                    tag, component
                )
            }
            BoundaryWarning::DuplicateVersion { kept, ignored } => {
                write!(
                    f,
                    "Tags '{}' and '{}' carry the same version, using '{}'",
                    kept, ignored, kept
                )
            }
            BoundaryWarning::LocalTagRolledBack { tag } => {
                write!(f, "Push failed, local tag '{}' was deleted", tag)
            }
            BoundaryWarning::DryRun { tag } => {
                write!(f, "Dry run: tag '{}' was not created or pushed", tag)
            }
        }
    }
}
