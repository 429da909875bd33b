use crate::domain::version::VersionNumber;
use crate::error::{Result, TaggerError};
use std::fmt;

/// A tag as reported by the source-control host.
///
/// Only `name` is interpreted; the commit is carried along for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReference {
    pub name: String,
    pub commit_sha: Option<String>,
}

impl TagReference {
    /// Create a tag reference without host metadata
    pub fn new(name: impl Into<String>) -> Self {
        TagReference {
            name: name.into(),
            commit_sha: None,
        }
    }
}

/// The (application, release type) pair that owns a stream of tags.
///
/// Tags are laid out as `<application>/V<major>.<minor>.<patch>[-<release_type>]`.
/// A missing release type is the production stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    application: String,
    release_type: Option<String>,
}

/// Outcome of reading a version out of a tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag {
    pub version: VersionNumber,
    /// Components that were missing or unreadable and fell back to 0
    pub defaulted: Vec<&'static str>,
}

const COMPONENTS: [&str; 3] = ["major", "minor", "patch"];

impl Namespace {
    /// Create a namespace.
    ///
    /// An empty release type is treated as production.
    ///
    /// # Errors
    /// Returns [`TaggerError::Config`] when the application name is empty, or
    /// when either part contains control characters (git rejects them in ref
    /// names).
    pub fn new(application: &str, release_type: Option<&str>) -> Result<Self> {
        if application.is_empty() {
            return Err(TaggerError::config("application name must not be empty"));
        }
        if application.contains(char::is_control) {
            return Err(TaggerError::config(
                "application name must not contain control characters",
            ));
        }
        if release_type.is_some_and(|rt| rt.contains(char::is_control)) {
            return Err(TaggerError::config(
                "release type must not contain control characters",
            ));
        }

        Ok(Namespace {
            application: application.to_string(),
            release_type: release_type
                .filter(|rt| !rt.is_empty())
                .map(str::to_string),
        })
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn release_type(&self) -> Option<&str> {
        self.release_type.as_deref()
    }

    fn version_prefix(&self) -> String {
        format!("{}/V", self.application)
    }

    fn suffix(&self) -> Option<String> {
        self.release_type.as_ref().map(|rt| format!("-{}", rt))
    }

    /// Version part of a tag, e.g. `V1.2.0` or `V1.2.0-beta`
    pub fn tag_version(&self, version: &VersionNumber) -> String {
        match self.suffix() {
            Some(suffix) => format!("{}{}", version, suffix),
            None => version.to_string(),
        }
    }

    /// Full tag name, e.g. `myapp/V1.2.0-beta`
    pub fn tag_name(&self, version: &VersionNumber) -> String {
        format!("{}/{}", self.application, self.tag_version(version))
    }

    /// Whether a tag name belongs to this namespace.
    ///
    /// The production stream only accepts names without any `-` after the
    /// `<application>/V` prefix, so it never overlaps a release-type stream.
    /// Release-type streams match on a plain `-<release_type>` suffix.
    pub fn matches(&self, tag_name: &str) -> bool {
        let Some(rest) = tag_name.strip_prefix(&self.version_prefix()) else {
            return false;
        };

        match self.suffix() {
            None => !rest.contains('-'),
            Some(suffix) => tag_name.ends_with(&suffix),
        }
    }

    /// Select the tags of this namespace, keeping input order
    pub fn filter<'a>(&self, tags: &'a [TagReference]) -> Vec<&'a TagReference> {
        tags.iter().filter(|tag| self.matches(&tag.name)).collect()
    }

    /// Read the version out of a tag name.
    ///
    /// Returns `None` for names outside this namespace. Inside it, parsing is
    /// lenient: each of the first three dot-separated components contributes
    /// its leading decimal digits, and a component that is missing, has no
    /// leading digits, or does not fit in `u64` becomes 0.
    pub fn parse(&self, tag_name: &str) -> Option<ParsedTag> {
        if !self.matches(tag_name) {
            return None;
        }

        let mut body = tag_name.strip_prefix(&self.version_prefix())?;
        if let Some(suffix) = self.suffix() {
            body = body.strip_suffix(&suffix)?;
        }

        let mut parts = body.split('.');
        let mut values = [0u64; 3];
        let mut defaulted = Vec::new();

        for (slot, name) in values.iter_mut().zip(COMPONENTS) {
            match parts.next().and_then(leading_number) {
                Some(n) => *slot = n,
                None => defaulted.push(name),
            }
        }

        Some(ParsedTag {
            version: VersionNumber::new(values[0], values[1], values[2]),
            defaulted,
        })
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.release_type {
            Some(rt) => write!(f, "{}-{}", self.application, rt),
            None => write!(f, "{}", self.application),
        }
    }
}

fn leading_number(component: &str) -> Option<u64> {
    let end = component
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(component.len());
    component[..end].parse().ok()
}
