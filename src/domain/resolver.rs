//! Current-version resolution for one namespace.

use crate::boundary::BoundaryWarning;
use crate::domain::tag::{Namespace, TagReference};
use crate::domain::version::VersionNumber;

/// Highest version found in a namespace, plus what was noticed on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub current: VersionNumber,
    /// Name of the winning tag; `None` when the namespace is empty
    pub latest_tag: Option<String>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Find the current version of `namespace` among `tags`.
///
/// Tags outside the namespace are ignored, so the input may be either the
/// full tag list or an already filtered one. An empty namespace resolves to
/// [`VersionNumber::INITIAL`]. Among equal versions the first tag in input
/// order wins.
pub fn resolve_current<'a, I>(tags: I, namespace: &Namespace) -> Resolution
where
    I: IntoIterator<Item = &'a TagReference>,
{
    let mut warnings = Vec::new();
    let mut best: Option<(VersionNumber, &str)> = None;

    for tag in tags {
        let Some(parsed) = namespace.parse(&tag.name) else {
            continue;
        };

        for component in &parsed.defaulted {
            warnings.push(BoundaryWarning::LenientComponent {
                tag: tag.name.clone(),
                component: component.to_string(),
            });
        }

        match best {
            Some((version, kept)) if parsed.version == version => {
                warnings.push(BoundaryWarning::DuplicateVersion {
                    kept: kept.to_string(),
                    ignored: tag.name.clone(),
                });
            }
            Some((version, _)) if parsed.version < version => {}
            _ => best = Some((parsed.version, tag.name.as_str())),
        }
    }

    match best {
        Some((current, name)) => Resolution {
            current,
            latest_tag: Some(name.to_string()),
            warnings,
        },
        None => {
            warnings.push(BoundaryWarning::NoMatchingTags {
                namespace: namespace.to_string(),
            });
            Resolution {
                current: VersionNumber::INITIAL,
                latest_tag: None,
                warnings,
            }
        }
    }
}
