//! Domain logic - pure tag and version rules independent of git or the host API

pub mod resolver;
pub mod tag;
pub mod version;

pub use resolver::{resolve_current, Resolution};
pub use tag::{Namespace, ParsedTag, TagReference};
pub use version::{bump_str, ChangeType, VersionNumber};
