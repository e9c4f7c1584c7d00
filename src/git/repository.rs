use crate::error::{Result, SrtError};
use git2::{
    Branch, DescribeFormatOptions, DescribeOptions, ErrorCode, ObjectType,
    Repository as Git2Repo, StatusOptions,
};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Root of the work tree
    pub fn workdir(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }
}

impl super::Repository for Git2Repository {
    fn remote_url(&self, remote: &str) -> Result<String> {
        let remote = self.repo.find_remote(remote)?;
        remote
            .url()
            .map(str::to_string)
            .ok_or_else(|| SrtError::config("remote URL is not valid UTF-8"))
    }

    fn local_branch_name(&self) -> Result<String> {
        let head = self.repo.head()?;
        Ok(head.shorthand().unwrap_or("HEAD").to_string())
    }

    fn upstream_branch_name(&self) -> Result<String> {
        let head = self.repo.head()?;
        let upstream = Branch::wrap(head).upstream()?;
        upstream
            .name()?
            .map(str::to_string)
            .ok_or_else(|| SrtError::config("upstream branch name is not valid UTF-8"))
    }

    fn tag_exists(&self, tag: &str) -> Result<bool> {
        let reference_name = format!("refs/tags/{}", tag);

        match self.repo.find_reference(&reference_name) {
            Ok(reference) => Ok(reference.peel(ObjectType::Tag).is_ok()),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn is_dirty(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }

    fn head_commit(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    fn last_commit_message(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.message().unwrap_or_default().trim().to_string())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn describe(&self, rev: &str) -> Result<Option<String>> {
        let object = self.repo.revparse_single(rev)?;
        let mut options = DescribeOptions::new();
        options.describe_tags();

        let described = match object.describe(&options) {
            Ok(description) => {
                let mut format = DescribeFormatOptions::new();
                format.abbreviated_size(0);
                Some(description.format(Some(&format))?)
            }
            Err(e) if e.code() == ErrorCode::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(described)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use git2::Signature;

    fn init_repo() -> (tempfile::TempDir, Git2Repo) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        {
            let sig = Signature::now("Mighty Eagle", "me@incredible.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "Linux 4.4.115-rt38", &tree, &[])
                .unwrap();
        }
        (dir, repo)
    }

    #[test]
    fn test_head_message_and_tags() {
        let (_dir, raw) = init_repo();
        {
            let head = raw.head().unwrap().peel_to_commit().unwrap();
            let sig = Signature::now("Mighty Eagle", "me@incredible.com").unwrap();
            raw.tag("v4.4.115-rt38", head.as_object(), &sig, "Linux 4.4.115-rt38", false)
                .unwrap();
            raw.tag_lightweight("light", head.as_object(), false).unwrap();
        }

        let repo = Git2Repository::from_git2(raw);
        assert_eq!(repo.last_commit_message().unwrap(), "Linux 4.4.115-rt38");
        assert!(repo.tag_exists("v4.4.115-rt38").unwrap());
        assert!(!repo.tag_exists("light").unwrap());
        assert!(!repo.tag_exists("v4.4.115-rt39").unwrap());
        assert_eq!(
            repo.describe("HEAD").unwrap(),
            Some("v4.4.115-rt38".to_string())
        );
    }

    #[test]
    fn test_describe_without_tags() {
        let (_dir, raw) = init_repo();
        let repo = Git2Repository::from_git2(raw);
        assert_eq!(repo.describe("HEAD").unwrap(), None);
    }

    #[test]
    fn test_dirty_detects_untracked() {
        let (dir, raw) = init_repo();
        let repo = Git2Repository::from_git2(raw);
        assert!(!repo.is_dirty().unwrap());

        std::fs::write(dir.path().join("localversion-rt"), "-rt39\n").unwrap();
        assert!(repo.is_dirty().unwrap());
    }
}
