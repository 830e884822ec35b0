//! File-backed storage for the location tree.
//!
//! The whole tree is rewritten on every save. Reading never fails: a missing
//! or unreadable file yields the built-in seed tree.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::location_tree::LocationTree;
use crate::seed::seed_tree;
use crate::tree_codec::{self, TreeFormat};

/// Persists trees. Implemented by [`TreeStore`]; tests may substitute their own.
pub trait TreeSink {
    fn save(&self, tree: &LocationTree) -> Result<()>;
}

impl<T: TreeSink + ?Sized> TreeSink for &T {
    fn save(&self, tree: &LocationTree) -> Result<()> {
        (**self).save(tree)
    }
}

#[derive(Debug, Clone)]
pub struct TreeStore {
    path: PathBuf,
    format: TreeFormat,
}

impl TreeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: TreeFormat::default(),
        }
    }

    pub fn with_format(mut self, format: TreeFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored tree, falling back to the seed tree.
    pub fn load(&self) -> LocationTree {
        match self.try_load() {
            Ok(tree) => {
                tracing::info!(
                    path = %self.path.display(),
                    states = tree.states().len(),
                    "Loaded location tree"
                );
                tree
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Could not read location tree, starting from built-in data"
                );
                seed_tree()
            }
        }
    }

    fn try_load(&self) -> Result<LocationTree> {
        let raw = std::fs::read_to_string(&self.path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        tree_codec::decode(&value)
    }
}

impl TreeSink for TreeStore {
    fn save(&self, tree: &LocationTree) -> Result<()> {
        let encoded = tree_codec::encode(tree, self.format);
        let mut text = serde_json::to_string_pretty(&encoded)?;
        text.push('\n');
        std::fs::write(&self.path, text)?;
        tracing::debug!(path = %self.path.display(), "Saved location tree");
        Ok(())
    }
}
