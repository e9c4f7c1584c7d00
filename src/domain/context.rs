//! Filesystem layout of a release.
//!
//! Every artifact of a release lives below `<root>/patches/<tag>/`:
//!
//! ```text
//! <root>/patches/v4.4.115-rt39/
//!     patch-4.4.115-rt39.patch.xz        full patch against the base
//!     patches-4.4.115-rt39.tar.xz        tarball of the series directory
//!     patch-4.4.115-rt38-rt39.patch.xz   incremental patch, same base only
//!     patches/                           quilt series
//!     mails/                             review mails
//! ```
//!
//! Signing and upload locate artifacts by these names, so they must not
//! change.

use std::path::{Path, PathBuf};

use crate::domain::Tag;
use crate::error::Result;

/// Paths and names derived from one tag
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseSlot {
    pub tag: Tag,
    /// Tag string without the leading `v`
    pub short_tag: String,
    pub dir_patches: PathBuf,
    pub dir_series: PathBuf,
    pub dir_mails: PathBuf,
    pub patch_file: PathBuf,
    pub tar_file: PathBuf,
}

impl ReleaseSlot {
    pub fn new(tag_text: &str, root: &Path) -> Result<Self> {
        let tag = Tag::parse(tag_text)?;
        let name = tag.to_string();
        let short_tag = tag.short();

        let dir_patches = root.join("patches").join(&name);
        let dir_series = dir_patches.join("patches");
        let dir_mails = dir_patches.join("mails");
        let patch_file = dir_patches.join(format!("patch-{}.patch.xz", short_tag));
        let tar_file = dir_patches.join(format!("patches-{}.tar.xz", short_tag));

        Ok(ReleaseSlot {
            tag,
            short_tag,
            dir_patches,
            dir_series,
            dir_mails,
            patch_file,
            tar_file,
        })
    }
}

/// Bookkeeping for one release step from `old` to `new`
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseContext {
    pub root: PathBuf,
    pub old: ReleaseSlot,
    pub new: ReleaseSlot,
    is_release_candidate: bool,
    incremental_patch_file: Option<PathBuf>,
}

impl ReleaseContext {
    /// Build the context for a release from `old_tag` to `new_tag`.
    ///
    /// Fails if either tag does not parse. Tags without an `rt` component
    /// never share a base, so they yield neither an incremental patch nor
    /// a release candidate context.
    pub fn new(old_tag: &str, new_tag: &str, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let old = ReleaseSlot::new(old_tag, root)?;
        let new = ReleaseSlot::new(new_tag, root)?;

        let shared_base = match (old.tag.base(), new.tag.base()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };

        let (is_release_candidate, incremental_patch_file) = if shared_base {
            let postfix = incremental_postfix(&new.tag)?;
            let file = new
                .dir_patches
                .join(format!("patch-{}{}.patch.xz", old.short_tag, postfix));
            (new.tag.is_release_candidate(), Some(file))
        } else {
            (false, None)
        };

        Ok(ReleaseContext {
            root: root.to_path_buf(),
            old,
            new,
            is_release_candidate,
            incremental_patch_file,
        })
    }

    /// True iff old and new share a base and new is a release candidate
    pub fn is_release_candidate(&self) -> bool {
        self.is_release_candidate
    }

    pub fn incremental_patch_file(&self) -> Option<&Path> {
        self.incremental_patch_file.as_deref()
    }

    /// Artifacts of the new release: patch, tarball, then the incremental
    /// patch when there is one. Signing and upload rely on this order.
    pub fn artifact_files(&self) -> Vec<PathBuf> {
        let mut files = vec![self.new.patch_file.clone(), self.new.tar_file.clone()];
        if let Some(incr) = &self.incremental_patch_file {
            files.push(incr.clone());
        }
        files
    }

    /// Artifacts of the previous release, retired on upload
    pub fn predecessor_artifact_files(&self) -> Vec<PathBuf> {
        vec![self.old.patch_file.clone(), self.old.tar_file.clone()]
    }
}

/// `-rt<N>` or `-rt<N>-rc<M>` describing `tag` relative to its base
fn incremental_postfix(tag: &Tag) -> Result<String> {
    let rt = tag.component("rt")?;
    if tag.is_release_candidate() {
        Ok(format!("-rt{}-rc{}", rt, tag.component("rc")?))
    } else {
        Ok(format!("-rt{}", rt))
    }
}
