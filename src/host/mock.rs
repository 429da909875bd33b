use crate::domain::TagReference;
use crate::error::{Result, TaggerError};
use crate::host::{RepoSlug, TagHost};
use std::cell::RefCell;
use std::collections::HashSet;

/// In-memory host for testing without network access
#[derive(Default)]
pub struct MockHost {
    tags: Vec<TagReference>,
    existing_refs: HashSet<String>,
    list_error: Option<String>,
    lookup_error: Option<String>,
    lookups: RefCell<Vec<String>>,
}

impl MockHost {
    /// Create a new empty mock host
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host listing the given tag names
    pub fn with_tags(names: &[&str]) -> Self {
        let mut host = Self::new();
        for name in names {
            host.add_tag(*name);
        }
        host
    }

    /// Add a tag to the listing
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.push(TagReference::new(name));
    }

    /// Mark a ref as existing without listing it, as happens when another
    /// run pushed the tag after our listing was taken
    pub fn add_existing_ref(&mut self, tag_name: impl Into<String>) {
        self.existing_refs.insert(tag_name.into());
    }

    /// Make `list_tags` fail
    pub fn fail_listing(&mut self, message: impl Into<String>) {
        self.list_error = Some(message.into());
    }

    /// Make `ref_exists` fail with something other than "not found"
    pub fn fail_lookup(&mut self, message: impl Into<String>) {
        self.lookup_error = Some(message.into());
    }

    /// Tag names passed to `ref_exists`, in call order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl TagHost for MockHost {
    fn list_tags(&self, _repo: &RepoSlug) -> Result<Vec<TagReference>> {
        match &self.list_error {
            Some(message) => Err(TaggerError::host(message.clone())),
            None => Ok(self.tags.clone()),
        }
    }

    fn ref_exists(&self, _repo: &RepoSlug, tag_name: &str) -> Result<bool> {
        self.lookups.borrow_mut().push(tag_name.to_string());

        if let Some(message) = &self.lookup_error {
            return Err(TaggerError::host(message.clone()));
        }

        Ok(self.existing_refs.contains(tag_name) || self.tags.iter().any(|t| t.name == tag_name))
    }
}
