//! Domain logic - release tags and the artifact layout derived from them

pub mod context;
pub mod tag;

pub use context::{ReleaseContext, ReleaseSlot};
pub use tag::{Component, Tag};
