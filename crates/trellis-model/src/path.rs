//! Tree paths for addressing rows by position.
//!
//! A [`TreePath`] is an ordered sequence of sibling indices, read top-down:
//! `[2, 0, 1]` names the third top-level row, then its first child, then
//! that child's second child. Unlike a [`TreeIter`](crate::TreeIter), a path
//! carries no generation stamp: its validity is a point-in-time fact, and it
//! may name a nonexistent row once the model has mutated.

use std::fmt;

use trellis_core::{ModelError, Result};

/// A position in a tree model, as a sequence of sibling indices.
///
/// The empty path is the *root* path. It never names a row itself; it is
/// used as the "parent" coordinate for top-level rows, e.g. in
/// [`rows_reordered`](crate::ModelSignals::rows_reordered) payloads.
///
/// Paths order in document order: a parent sorts before its descendants,
/// and siblings sort by index.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreePath {
    indices: Vec<usize>,
}

impl TreePath {
    /// Creates the root path (depth 0).
    #[inline]
    pub const fn new() -> Self {
        Self {
            indices: Vec::new(),
        }
    }

    /// Creates a path from a slice of sibling indices.
    pub fn from_indices(indices: &[usize]) -> Self {
        Self {
            indices: indices.to_vec(),
        }
    }

    /// Parses the colon-separated textual form, e.g. `"2:0:1"`.
    ///
    /// Returns [`ModelError::BadFormat`] for an empty string or any segment
    /// that is not a non-negative integer.
    pub fn from_string(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ModelError::BadFormat);
        }
        let indices = s
            .split(':')
            .map(|part| part.parse::<usize>().map_err(|_| ModelError::BadFormat))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { indices })
    }

    /// Returns the number of levels in this path. The root path has depth 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if this is the root path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the sibling indices, top-down.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns the last (deepest) sibling index, or `None` for the root path.
    #[inline]
    pub fn last_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Appends an index, descending one level.
    pub fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    /// Moves the path up one level.
    ///
    /// Returns `false` (leaving the path unchanged) if it is already the
    /// root path.
    pub fn up(&mut self) -> bool {
        self.indices.pop().is_some()
    }

    /// Moves the path to the next sibling at the deepest level.
    ///
    /// Has no effect on the root path.
    pub fn next(&mut self) {
        if let Some(last) = self.indices.last_mut() {
            *last += 1;
        }
    }

    /// Moves the path to the previous sibling at the deepest level.
    ///
    /// Returns `false` (leaving the path unchanged) if the deepest index is
    /// already 0 or the path is the root path.
    pub fn prev(&mut self) -> bool {
        match self.indices.last_mut() {
            Some(last) if *last > 0 => {
                *last -= 1;
                true
            }
            _ => false,
        }
    }

    /// Returns the path of this path's parent, or `None` for the root path.
    pub fn parent(&self) -> Option<TreePath> {
        if self.indices.is_empty() {
            return None;
        }
        Some(Self {
            indices: self.indices[..self.indices.len() - 1].to_vec(),
        })
    }

    /// Returns the path of the `index`-th child of this path.
    pub fn child(&self, index: usize) -> TreePath {
        let mut child = self.clone();
        child.push(index);
        child
    }

    /// Returns `true` if `self` is a strict ancestor of `other`.
    ///
    /// The root path is an ancestor of every non-root path. A path is not
    /// its own ancestor.
    pub fn is_ancestor_of(&self, other: &TreePath) -> bool {
        self.depth() < other.depth() && other.indices.starts_with(&self.indices)
    }

    /// Returns `true` if `self` is a strict descendant of `other`.
    pub fn is_descendant_of(&self, other: &TreePath) -> bool {
        other.is_ancestor_of(self)
    }
}

impl fmt::Display for TreePath {
    /// Renders the colon-separated form; the root path renders empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

impl From<Vec<usize>> for TreePath {
    fn from(indices: Vec<usize>) -> Self {
        Self { indices }
    }
}
