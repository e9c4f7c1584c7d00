use crate::error::{Result, SrtError};
use crate::git::Repository;
use std::collections::{HashMap, HashSet};

/// Mock repository for testing without actual git operations
#[derive(Default)]
pub struct MockRepository {
    remotes: HashMap<String, String>,
    local_branch: Option<String>,
    upstream: Option<String>,
    tags: HashSet<String>,
    descriptions: HashMap<String, String>,
    head: String,
    head_message: String,
    dirty: bool,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            head: "0".repeat(40),
            ..MockRepository::default()
        }
    }

    pub fn set_remote_url(&mut self, remote: impl Into<String>, url: impl Into<String>) {
        self.remotes.insert(remote.into(), url.into());
    }

    pub fn set_local_branch(&mut self, branch: impl Into<String>) {
        self.local_branch = Some(branch.into());
    }

    pub fn set_upstream(&mut self, upstream: impl Into<String>) {
        self.upstream = Some(upstream.into());
    }

    /// Add an annotated tag
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.insert(name.into());
    }

    /// Make `describe(rev)` answer `tag`
    pub fn set_description(&mut self, rev: impl Into<String>, tag: impl Into<String>) {
        self.descriptions.insert(rev.into(), tag.into());
    }

    pub fn set_head(&mut self, hash: impl Into<String>, message: impl Into<String>) {
        self.head = hash.into();
        self.head_message = message.into();
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }
}

impl Repository for MockRepository {
    fn remote_url(&self, remote: &str) -> Result<String> {
        self.remotes
            .get(remote)
            .cloned()
            .ok_or_else(|| SrtError::config(format!("remote '{}' not found", remote)))
    }

    fn local_branch_name(&self) -> Result<String> {
        Ok(self.local_branch.clone().unwrap_or_else(|| "HEAD".to_string()))
    }

    fn upstream_branch_name(&self) -> Result<String> {
        self.upstream
            .clone()
            .ok_or_else(|| SrtError::config("no upstream branch configured"))
    }

    fn tag_exists(&self, tag: &str) -> Result<bool> {
        Ok(self.tags.contains(tag))
    }

    fn is_dirty(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn head_commit(&self) -> Result<String> {
        Ok(self.head.clone())
    }

    fn last_commit_message(&self) -> Result<String> {
        Ok(self.head_message.clone())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let mut tags: Vec<String> = self.tags.iter().cloned().collect();
        tags.sort();
        Ok(tags)
    }

    fn describe(&self, rev: &str) -> Result<Option<String>> {
        Ok(self.descriptions.get(rev).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_tags() {
        let mut repo = MockRepository::new();
        repo.add_tag("v4.4.115-rt38");

        assert!(repo.tag_exists("v4.4.115-rt38").unwrap());
        assert!(!repo.tag_exists("v4.4.115-rt39").unwrap());
    }

    #[test]
    fn test_mock_repository_list_tags_sorted() {
        let mut repo = MockRepository::new();
        repo.add_tag("v4.4.115-rt39");
        repo.add_tag("v4.4.115-rt38");

        assert_eq!(
            repo.list_tags().unwrap(),
            vec!["v4.4.115-rt38".to_string(), "v4.4.115-rt39".to_string()]
        );
    }

    #[test]
    fn test_mock_repository_missing_upstream() {
        let repo = MockRepository::new();
        assert!(repo.upstream_branch_name().is_err());
        assert_eq!(repo.local_branch_name().unwrap(), "HEAD");
    }

    #[test]
    fn test_mock_repository_default_head() {
        let repo = MockRepository::new();
        assert_eq!(repo.head_commit().unwrap().len(), 40);
        assert!(!repo.is_dirty().unwrap());
    }
}
