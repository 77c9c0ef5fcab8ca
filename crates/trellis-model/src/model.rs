//! The model protocol: navigation, value access, and change signals.
//!
//! [`TreeModel`] is the polymorphic interface every store implements —
//! [`ListStore`](crate::ListStore), [`TreeStore`](crate::TreeStore), and the
//! [`SortFilterModel`](crate::SortFilterModel) wrapper. Views and wrappers
//! consume it without knowing the concrete type.
//!
//! # Iterator contract
//!
//! Navigation returns `Option<TreeIter>`: a failed step (`iter_next` past
//! the last sibling, `iter_children` on a leaf, `iter_parent` on a root)
//! yields `None`, never a stale handle. Obtained iterators stay valid across
//! value-only edits but are invalidated by any structural mutation; see
//! [`TreeIter`](crate::TreeIter).
//!
//! # Signal contract
//!
//! Every structural mutation emits exactly one signal, synchronously, after
//! the store's state already reflects the mutation — an observer querying
//! the model from inside its handler sees post-mutation state. Observers
//! are notified in attachment order and must not assume exclusive access or
//! that earlier observers have reacted.

use trellis_core::{Result, Signal};

use crate::iter::{ModelId, TreeIter};
use crate::path::TreePath;
use crate::value::{Value, ValueType};

/// The core trait for tree/list data models.
///
/// # Example
///
/// ```
/// use trellis_model::{ListStore, TreeModel, Value, ValueType};
///
/// let store = ListStore::new(vec![ValueType::String]);
/// store.append(vec![Value::from("first")]).unwrap();
/// store.append(vec![Value::from("second")]).unwrap();
///
/// let mut texts = Vec::new();
/// let mut cursor = store.iter_first();
/// while let Some(iter) = cursor {
///     texts.push(store.value(&iter, 0).unwrap().into_string().unwrap());
///     cursor = store.iter_next(&iter);
/// }
/// assert_eq!(texts, ["first", "second"]);
/// ```
pub trait TreeModel: Send + Sync {
    /// Returns the number of columns in the schema.
    fn n_columns(&self) -> usize;

    /// Returns the type of the given column.
    ///
    /// Fails with `OutOfRange` if `column` is beyond the schema.
    fn column_type(&self, column: usize) -> Result<ValueType>;

    /// Returns this model instance's process-unique identity.
    fn model_id(&self) -> ModelId;

    /// Returns the change signals for this model.
    ///
    /// Views and wrapper models connect to these to stay synchronized.
    fn signals(&self) -> &ModelSignals;

    /// Returns `true` if `iter` belongs to this model at its current
    /// generation.
    fn iter_is_valid(&self, iter: &TreeIter) -> bool;

    /// Returns an iterator to the first top-level row, or `None` on an
    /// empty model.
    fn iter_first(&self) -> Option<TreeIter> {
        self.iter_nth_child(None, 0)
    }

    /// Returns an iterator to the row following `iter` among its siblings.
    fn iter_next(&self, iter: &TreeIter) -> Option<TreeIter>;

    /// Returns an iterator to the first child of `parent`, or `None` for a
    /// leaf.
    fn iter_children(&self, parent: &TreeIter) -> Option<TreeIter> {
        self.iter_nth_child(Some(parent), 0)
    }

    /// Returns an iterator to the parent of `child`, or `None` for a
    /// top-level row.
    fn iter_parent(&self, child: &TreeIter) -> Option<TreeIter>;

    /// Returns an iterator to the `n`-th child of `parent`; `None` parent
    /// addresses the top level.
    fn iter_nth_child(&self, parent: Option<&TreeIter>, n: usize) -> Option<TreeIter>;

    /// Returns the number of children of `parent`; `None` parent counts
    /// top-level rows.
    fn iter_n_children(&self, parent: Option<&TreeIter>) -> usize;

    /// Returns `true` if `iter` has at least one child.
    fn has_child(&self, iter: &TreeIter) -> bool {
        self.iter_n_children(Some(iter)) > 0
    }

    /// Reads the value at `(iter, column)`.
    ///
    /// Fails with `InvalidIterator` for a stale iterator and `OutOfRange`
    /// for a column beyond the schema.
    fn value(&self, iter: &TreeIter, column: usize) -> Result<Value>;

    /// Converts an iterator to the path currently naming its row.
    ///
    /// Walks parent links accumulating sibling indices; O(depth), fails
    /// only for an invalid iterator.
    fn path(&self, iter: &TreeIter) -> Result<TreePath>;

    /// Converts a path to an iterator.
    ///
    /// Walks the hierarchy level by level; fails with `NotFound` if any
    /// index at any level is out of range (including the root path, which
    /// names no row).
    fn iter(&self, path: &TreePath) -> Result<TreeIter>;
}

/// Change signals emitted by models.
///
/// # Reorder payloads
///
/// `rows_reordered` carries the parent path (the root path for the top
/// level) and an `order` array with `order[new_position] = old_position`.
pub struct ModelSignals {
    /// A row's values changed in place. Args: (path, iter), both current.
    pub row_changed: Signal<(TreePath, TreeIter)>,

    /// A row was inserted. Args: (path, iter) of the new row.
    pub row_inserted: Signal<(TreePath, TreeIter)>,

    /// A row (and, for tree stores, its subtree) was deleted.
    /// Args: the path the row occupied before deletion.
    pub row_deleted: Signal<TreePath>,

    /// One sibling level was permuted.
    /// Args: (parent path, order) with `order[new] = old`.
    pub rows_reordered: Signal<(TreePath, Vec<usize>)>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    /// Creates a new set of model signals.
    pub fn new() -> Self {
        Self {
            row_changed: Signal::new(),
            row_inserted: Signal::new(),
            row_deleted: Signal::new(),
            rows_reordered: Signal::new(),
        }
    }

    /// Emits `row_changed`. Call after the store reflects the edit.
    pub fn emit_row_changed(&self, path: TreePath, iter: TreeIter) {
        self.row_changed.emit((path, iter));
    }

    /// Emits `row_inserted`. Call after the store reflects the insert.
    pub fn emit_row_inserted(&self, path: TreePath, iter: TreeIter) {
        self.row_inserted.emit((path, iter));
    }

    /// Emits `row_deleted`. Call after the store reflects the removal.
    pub fn emit_row_deleted(&self, path: TreePath) {
        self.row_deleted.emit(path);
    }

    /// Emits `rows_reordered` with `order[new] = old`.
    pub fn emit_rows_reordered(&self, parent: TreePath, order: Vec<usize>) {
        self.rows_reordered.emit((parent, order));
    }
}
