//! A hierarchical row store.
//!
//! [`TreeStore`] generalizes [`ListStore`](crate::ListStore) to arbitrary
//! depth. Nodes live in one generational arena; each node records its
//! parent and an ordered child list, so sibling order is explicit and
//! subtree removal is a walk that reclaims slots. Reordering operations
//! (`swap`, `move_before`, `move_after`, `reorder`) act within a single
//! sibling list; reparenting a row means removing and re-inserting it.

use parking_lot::RwLock;
use slotmap::SlotMap;
use trellis_core::{ModelError, Result};

use crate::iter::{bump_stamp, next_stamp_seed, ModelId, RowKey, TreeIter};
use crate::model::{ModelSignals, TreeModel};
use crate::path::TreePath;
use crate::value::{Value, ValueType};

struct RowNode {
    values: Vec<Value>,
    parent: Option<RowKey>,
    children: Vec<RowKey>,
}

struct TreeState {
    stamp: u64,
    nodes: SlotMap<RowKey, RowNode>,
    root_children: Vec<RowKey>,
}

impl TreeState {
    fn siblings(&self, parent: Option<RowKey>) -> &Vec<RowKey> {
        match parent {
            None => &self.root_children,
            Some(key) => &self.nodes[key].children,
        }
    }

    fn siblings_mut(&mut self, parent: Option<RowKey>) -> &mut Vec<RowKey> {
        match parent {
            None => &mut self.root_children,
            Some(key) => &mut self.nodes[key].children,
        }
    }

    fn position(&self, key: RowKey) -> usize {
        let parent = self.nodes[key].parent;
        self.siblings(parent)
            .iter()
            .position(|&k| k == key)
            .unwrap_or_else(|| unreachable!("node missing from its sibling list"))
    }

    fn path_of(&self, key: RowKey) -> TreePath {
        let mut indices = Vec::new();
        let mut cursor = Some(key);
        while let Some(key) = cursor {
            indices.push(self.position(key));
            cursor = self.nodes[key].parent;
        }
        indices.reverse();
        TreePath::from(indices)
    }
}

/// A tree of rows, each a fixed-schema tuple of [`Value`]s.
///
/// # Example
///
/// ```
/// use trellis_model::{TreeStore, TreeModel, Value, ValueType};
///
/// let store = TreeStore::new(vec![ValueType::String]);
/// let parent = store.append(None, vec![Value::from("folder")]).unwrap();
/// store.append(Some(&parent), vec![Value::from("file")]).unwrap();
/// assert_eq!(store.iter_n_children(Some(&parent)), 1);
/// ```
pub struct TreeStore {
    schema: Vec<ValueType>,
    id: ModelId,
    state: RwLock<TreeState>,
    signals: ModelSignals,
}

impl TreeStore {
    /// Creates an empty store with the given column schema.
    pub fn new(schema: Vec<ValueType>) -> Self {
        Self {
            schema,
            id: ModelId::allocate(),
            state: RwLock::new(TreeState {
                stamp: next_stamp_seed(),
                nodes: SlotMap::with_key(),
                root_children: Vec::new(),
            }),
            signals: ModelSignals::new(),
        }
    }

    fn check_row(&self, values: &[Value]) -> Result<()> {
        if values.len() != self.schema.len() {
            return Err(ModelError::OutOfRange);
        }
        for (column, (value, expected)) in values.iter().zip(&self.schema).enumerate() {
            if value.type_of() != *expected {
                return Err(ModelError::TypeMismatch {
                    column,
                    expected: expected.name(),
                    found: value.type_of().name(),
                });
            }
        }
        Ok(())
    }

    fn resolve(state: &TreeState, iter: &TreeIter) -> Result<RowKey> {
        if iter.stamp() != state.stamp || !state.nodes.contains_key(iter.key()) {
            return Err(ModelError::InvalidIterator);
        }
        Ok(iter.key())
    }

    /// Inserts a row as the `pos`-th child of `parent` (`None` = top
    /// level). `pos` may equal the child count, which appends.
    pub fn insert(
        &self,
        parent: Option<&TreeIter>,
        pos: usize,
        values: Vec<Value>,
    ) -> Result<TreeIter> {
        self.check_row(&values)?;
        let (iter, path) = {
            let mut state = self.state.write();
            let parent_key = match parent {
                Some(p) => Some(Self::resolve(&state, p)?),
                None => None,
            };
            if pos > state.siblings(parent_key).len() {
                return Err(ModelError::OutOfRange);
            }
            let key = state.nodes.insert(RowNode {
                values,
                parent: parent_key,
                children: Vec::new(),
            });
            state.siblings_mut(parent_key).insert(pos, key);
            state.stamp = bump_stamp(state.stamp);
            (TreeIter::new(state.stamp, key), state.path_of(key))
        };
        tracing::debug!(target: "trellis_model::store", path = %path, "row inserted");
        self.signals.emit_row_inserted(path, iter);
        Ok(iter)
    }

    /// Appends a row under `parent`.
    pub fn append(&self, parent: Option<&TreeIter>, values: Vec<Value>) -> Result<TreeIter> {
        let pos = {
            let state = self.state.read();
            let parent_key = match parent {
                Some(p) => Some(Self::resolve(&state, p)?),
                None => None,
            };
            state.siblings(parent_key).len()
        };
        self.insert(parent, pos, values)
    }

    /// Prepends a row under `parent`.
    pub fn prepend(&self, parent: Option<&TreeIter>, values: Vec<Value>) -> Result<TreeIter> {
        self.insert(parent, 0, values)
    }

    /// Inserts a row before `sibling`; the parent is derived from the
    /// sibling when one is given. With no sibling the row is appended
    /// under `parent`.
    pub fn insert_before(
        &self,
        parent: Option<&TreeIter>,
        sibling: Option<&TreeIter>,
        values: Vec<Value>,
    ) -> Result<TreeIter> {
        match sibling {
            Some(sib) => {
                let (parent, pos) = self.locate(sib)?;
                self.insert(parent.as_ref(), pos, values)
            }
            None => self.append(parent, values),
        }
    }

    /// Inserts a row after `sibling`; the parent is derived from the
    /// sibling when one is given. With no sibling the row is prepended
    /// under `parent`.
    pub fn insert_after(
        &self,
        parent: Option<&TreeIter>,
        sibling: Option<&TreeIter>,
        values: Vec<Value>,
    ) -> Result<TreeIter> {
        match sibling {
            Some(sib) => {
                let (parent, pos) = self.locate(sib)?;
                self.insert(parent.as_ref(), pos + 1, values)
            }
            None => self.prepend(parent, values),
        }
    }

    /// Returns a row's parent iterator (if any) and position among its
    /// siblings.
    fn locate(&self, iter: &TreeIter) -> Result<(Option<TreeIter>, usize)> {
        let state = self.state.read();
        let key = Self::resolve(&state, iter)?;
        let parent = state.nodes[key]
            .parent
            .map(|p| TreeIter::new(state.stamp, p));
        Ok((parent, state.position(key)))
    }

    /// Replaces one cell. Value-only: no iterator is invalidated.
    pub fn set_value(&self, iter: &TreeIter, column: usize, value: Value) -> Result<()> {
        let expected = *self.schema.get(column).ok_or(ModelError::OutOfRange)?;
        if value.type_of() != expected {
            return Err(ModelError::TypeMismatch {
                column,
                expected: expected.name(),
                found: value.type_of().name(),
            });
        }
        let path = {
            let mut state = self.state.write();
            let key = Self::resolve(&state, iter)?;
            state.nodes[key].values[column] = value;
            state.path_of(key)
        };
        self.signals.emit_row_changed(path, *iter);
        Ok(())
    }

    /// Replaces every cell of a row. Emits a single `row_changed`.
    pub fn set_row(&self, iter: &TreeIter, values: Vec<Value>) -> Result<()> {
        self.check_row(&values)?;
        let path = {
            let mut state = self.state.write();
            let key = Self::resolve(&state, iter)?;
            state.nodes[key].values = values;
            state.path_of(key)
        };
        self.signals.emit_row_changed(path, *iter);
        Ok(())
    }

    /// Removes the row at `iter` together with its entire subtree.
    ///
    /// Returns an iterator to the sibling now occupying the removed
    /// position, or `None` if the removed row was the last child. A single
    /// `row_deleted` is emitted for the subtree root; descendants go with
    /// it implicitly.
    pub fn remove(&self, iter: &TreeIter) -> Result<Option<TreeIter>> {
        let (path, successor) = {
            let mut state = self.state.write();
            let key = Self::resolve(&state, iter)?;
            let path = state.path_of(key);
            let parent = state.nodes[key].parent;
            let pos = state.position(key);

            // Reclaim the whole subtree.
            let mut stack = vec![key];
            while let Some(key) = stack.pop() {
                let node = state
                    .nodes
                    .remove(key)
                    .unwrap_or_else(|| unreachable!("subtree key vanished mid-walk"));
                stack.extend(node.children);
            }
            state.siblings_mut(parent).remove(pos);
            state.stamp = bump_stamp(state.stamp);

            let successor = state
                .siblings(parent)
                .get(pos)
                .map(|&k| TreeIter::new(state.stamp, k));
            (path, successor)
        };
        tracing::debug!(target: "trellis_model::store", path = %path, "subtree deleted");
        self.signals.emit_row_deleted(path);
        Ok(successor)
    }

    /// Exchanges the positions of two rows sharing a parent. Emits one
    /// `rows_reordered` for that sibling level; swapping a row with itself
    /// is a signal-free no-op.
    pub fn swap(&self, a: &TreeIter, b: &TreeIter) -> Result<()> {
        let (parent_path, order) = {
            let mut state = self.state.write();
            let key_a = Self::resolve(&state, a)?;
            let key_b = Self::resolve(&state, b)?;
            if key_a == key_b {
                return Ok(());
            }
            let parent = state.nodes[key_a].parent;
            if state.nodes[key_b].parent != parent {
                return Err(ModelError::OutOfRange);
            }
            let pos_a = state.position(key_a);
            let pos_b = state.position(key_b);
            state.siblings_mut(parent).swap(pos_a, pos_b);
            state.stamp = bump_stamp(state.stamp);

            let mut order: Vec<usize> = (0..state.siblings(parent).len()).collect();
            order.swap(pos_a, pos_b);
            let parent_path = match parent {
                Some(key) => state.path_of(key),
                None => TreePath::new(),
            };
            (parent_path, order)
        };
        self.signals.emit_rows_reordered(parent_path, order);
        Ok(())
    }

    fn move_to(&self, iter: &TreeIter, new_pos: usize) -> Result<()> {
        let (parent_path, order) = {
            let mut state = self.state.write();
            let key = Self::resolve(&state, iter)?;
            let parent = state.nodes[key].parent;
            let old_pos = state.position(key);
            if old_pos == new_pos {
                return Ok(());
            }
            let siblings = state.siblings_mut(parent);
            siblings.remove(old_pos);
            siblings.insert(new_pos, key);
            state.stamp = bump_stamp(state.stamp);

            let mut order: Vec<usize> = (0..state.siblings(parent).len()).collect();
            if old_pos < new_pos {
                for (i, slot) in order[old_pos..new_pos].iter_mut().enumerate() {
                    *slot = old_pos + i + 1;
                }
            } else {
                for (i, slot) in order[new_pos + 1..=old_pos].iter_mut().enumerate() {
                    *slot = new_pos + i;
                }
            }
            order[new_pos] = old_pos;
            let parent_path = match parent {
                Some(key) => state.path_of(key),
                None => TreePath::new(),
            };
            (parent_path, order)
        };
        self.signals.emit_rows_reordered(parent_path, order);
        Ok(())
    }

    /// Moves `iter` to just before `position` within its sibling list;
    /// with no position the row moves to the end of the list. Both rows
    /// must share a parent.
    pub fn move_before(&self, iter: &TreeIter, position: Option<&TreeIter>) -> Result<()> {
        let new_pos = {
            let state = self.state.read();
            let key = Self::resolve(&state, iter)?;
            let parent = state.nodes[key].parent;
            match position {
                Some(target) => {
                    let target_key = Self::resolve(&state, target)?;
                    if state.nodes[target_key].parent != parent {
                        return Err(ModelError::OutOfRange);
                    }
                    let old = state.position(key);
                    let target = state.position(target_key);
                    if old < target { target - 1 } else { target }
                }
                None => state.siblings(parent).len() - 1,
            }
        };
        self.move_to(iter, new_pos)
    }

    /// Moves `iter` to just after `position` within its sibling list;
    /// with no position the row moves to the start of the list. Both rows
    /// must share a parent.
    pub fn move_after(&self, iter: &TreeIter, position: Option<&TreeIter>) -> Result<()> {
        let new_pos = {
            let state = self.state.read();
            let key = Self::resolve(&state, iter)?;
            let parent = state.nodes[key].parent;
            match position {
                Some(target) => {
                    let target_key = Self::resolve(&state, target)?;
                    if state.nodes[target_key].parent != parent {
                        return Err(ModelError::OutOfRange);
                    }
                    let old = state.position(key);
                    let target = state.position(target_key);
                    if old < target { target } else { target + 1 }
                }
                None => 0,
            }
        };
        self.move_to(iter, new_pos)
    }

    /// Permutes the direct children of `parent`, `order[new] = old`.
    /// Descendants keep their internal structure.
    pub fn reorder(&self, parent: Option<&TreeIter>, order: &[usize]) -> Result<()> {
        let parent_path = {
            let mut state = self.state.write();
            let parent_key = match parent {
                Some(p) => Some(Self::resolve(&state, p)?),
                None => None,
            };
            let siblings = state.siblings(parent_key);
            if order.len() != siblings.len() {
                return Err(ModelError::OutOfRange);
            }
            let mut seen = vec![false; order.len()];
            for &old in order {
                if old >= order.len() || seen[old] {
                    return Err(ModelError::OutOfRange);
                }
                seen[old] = true;
            }
            let previous = siblings.clone();
            let siblings = state.siblings_mut(parent_key);
            for (new, &old) in order.iter().enumerate() {
                siblings[new] = previous[old];
            }
            state.stamp = bump_stamp(state.stamp);
            match parent_key {
                Some(key) => state.path_of(key),
                None => TreePath::new(),
            }
        };
        tracing::debug!(
            target: "trellis_model::store",
            parent = %parent_path,
            rows = order.len(),
            "rows reordered"
        );
        self.signals.emit_rows_reordered(parent_path, order.to_vec());
        Ok(())
    }

    /// Removes every row. Emits `row_deleted` per top-level row, last row
    /// first; subtrees go with their roots.
    pub fn clear(&self) {
        let count = {
            let mut state = self.state.write();
            let count = state.root_children.len();
            state.nodes.clear();
            state.root_children.clear();
            state.stamp = bump_stamp(state.stamp);
            count
        };
        tracing::debug!(target: "trellis_model::store", top_level = count, "store cleared");
        for pos in (0..count).rev() {
            self.signals.emit_row_deleted(TreePath::from_indices(&[pos]));
        }
    }
}

impl TreeModel for TreeStore {
    fn n_columns(&self) -> usize {
        self.schema.len()
    }

    fn column_type(&self, column: usize) -> Result<ValueType> {
        self.schema
            .get(column)
            .copied()
            .ok_or(ModelError::OutOfRange)
    }

    fn model_id(&self) -> ModelId {
        self.id
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn iter_is_valid(&self, iter: &TreeIter) -> bool {
        let state = self.state.read();
        iter.stamp() == state.stamp && state.nodes.contains_key(iter.key())
    }

    fn iter_next(&self, iter: &TreeIter) -> Option<TreeIter> {
        let state = self.state.read();
        let key = Self::resolve(&state, iter).ok()?;
        let parent = state.nodes[key].parent;
        let pos = state.position(key);
        state
            .siblings(parent)
            .get(pos + 1)
            .map(|&k| TreeIter::new(state.stamp, k))
    }

    fn iter_parent(&self, child: &TreeIter) -> Option<TreeIter> {
        let state = self.state.read();
        let key = Self::resolve(&state, child).ok()?;
        state.nodes[key]
            .parent
            .map(|p| TreeIter::new(state.stamp, p))
    }

    fn iter_nth_child(&self, parent: Option<&TreeIter>, n: usize) -> Option<TreeIter> {
        let state = self.state.read();
        let parent_key = match parent {
            Some(p) => Some(Self::resolve(&state, p).ok()?),
            None => None,
        };
        state
            .siblings(parent_key)
            .get(n)
            .map(|&k| TreeIter::new(state.stamp, k))
    }

    fn iter_n_children(&self, parent: Option<&TreeIter>) -> usize {
        let state = self.state.read();
        let parent_key = match parent {
            Some(p) => match Self::resolve(&state, p) {
                Ok(key) => Some(key),
                Err(_) => return 0,
            },
            None => None,
        };
        state.siblings(parent_key).len()
    }

    fn value(&self, iter: &TreeIter, column: usize) -> Result<Value> {
        if column >= self.schema.len() {
            return Err(ModelError::OutOfRange);
        }
        let state = self.state.read();
        let key = Self::resolve(&state, iter)?;
        Ok(state.nodes[key].values[column].clone())
    }

    fn path(&self, iter: &TreeIter) -> Result<TreePath> {
        let state = self.state.read();
        let key = Self::resolve(&state, iter)?;
        Ok(state.path_of(key))
    }

    fn iter(&self, path: &TreePath) -> Result<TreeIter> {
        if path.is_root() {
            return Err(ModelError::NotFound);
        }
        let state = self.state.read();
        let mut parent: Option<RowKey> = None;
        let mut found = None;
        for &index in path.indices() {
            let key = *state
                .siblings(parent)
                .get(index)
                .ok_or(ModelError::NotFound)?;
            parent = Some(key);
            found = Some(key);
        }
        let key = found.ok_or(ModelError::NotFound)?;
        Ok(TreeIter::new(state.stamp, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn store() -> TreeStore {
        TreeStore::new(vec![ValueType::String])
    }

    fn row(text: &str) -> Vec<Value> {
        vec![Value::from(text)]
    }

    fn text_at(store: &TreeStore, path: &[usize]) -> String {
        let iter = store.iter(&TreePath::from_indices(path)).unwrap();
        store.value(&iter, 0).unwrap().into_string().unwrap()
    }

    fn child_texts(store: &TreeStore, parent: Option<&TreeIter>) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = store.iter_nth_child(parent, 0);
        while let Some(iter) = cursor {
            out.push(store.value(&iter, 0).unwrap().into_string().unwrap());
            cursor = store.iter_next(&iter);
        }
        out
    }

    #[test]
    fn test_nested_insert_and_navigation() {
        let store = store();
        let top = store.append(None, row("top")).unwrap();
        let child = store.append(Some(&top), row("child")).unwrap();
        let grandchild = store.append(Some(&child), row("grandchild")).unwrap();

        assert_eq!(
            store.path(&grandchild).unwrap(),
            TreePath::from_indices(&[0, 0, 0])
        );
        assert_eq!(text_at(&store, &[0, 0, 0]), "grandchild");
        assert!(store.has_child(&top));
        assert!(!store.has_child(&grandchild));

        let up = store.iter_parent(&grandchild).unwrap();
        assert_eq!(store.value(&up, 0).unwrap().as_str(), Some("child"));
        assert!(store.iter_parent(&top).is_none());
    }

    #[test]
    fn test_path_iter_round_trip_at_depth() {
        let store = store();
        let a = store.append(None, row("a")).unwrap();
        store.append(Some(&a), row("a0")).unwrap();
        let a1 = store.append(Some(&a), row("a1")).unwrap();
        store.append(None, row("b")).unwrap();

        let path = store.path(&a1).unwrap();
        assert_eq!(path, TreePath::from_indices(&[0, 1]));
        let again = store.iter(&path).unwrap();
        assert_eq!(store.value(&again, 0).unwrap().as_str(), Some("a1"));
    }

    #[test]
    fn test_iter_rejects_root_and_missing_paths() {
        let store = store();
        store.append(None, row("a")).unwrap();
        assert!(matches!(
            store.iter(&TreePath::new()),
            Err(ModelError::NotFound)
        ));
        assert!(matches!(
            store.iter(&TreePath::from_indices(&[0, 3])),
            Err(ModelError::NotFound)
        ));
        assert!(matches!(
            store.iter(&TreePath::from_indices(&[1])),
            Err(ModelError::NotFound)
        ));
    }

    #[test]
    fn test_insert_before_derives_parent_from_sibling() {
        let store = store();
        let top = store.append(None, row("top")).unwrap();
        let second = store.append(Some(&top), row("second")).unwrap();
        store
            .insert_before(None, Some(&second), row("first"))
            .unwrap();
        let top = store.iter(&TreePath::from_indices(&[0])).unwrap();
        assert_eq!(child_texts(&store, Some(&top)), ["first", "second"]);
    }

    #[test]
    fn test_insert_none_sibling_asymmetry() {
        let store = store();
        store.append(None, row("mid")).unwrap();
        store.insert_after(None, None, row("first")).unwrap();
        store.insert_before(None, None, row("last")).unwrap();
        assert_eq!(child_texts(&store, None), ["first", "mid", "last"]);
    }

    #[test]
    fn test_remove_subtree_reclaims_and_returns_successor() {
        let store = store();
        let a = store.append(None, row("a")).unwrap();
        store.append(Some(&a), row("a0")).unwrap();
        store.append(Some(&a), row("a1")).unwrap();
        store.append(None, row("b")).unwrap();

        let deleted = Arc::new(Mutex::new(Vec::new()));
        let recv = deleted.clone();
        store.signals().row_deleted.connect(move |path| {
            recv.lock().push(path.clone());
        });

        let succ = store.remove(&a).unwrap().unwrap();
        assert_eq!(store.value(&succ, 0).unwrap().as_str(), Some("b"));
        assert_eq!(store.iter_n_children(None), 1);
        // One deletion for the subtree root; descendants go implicitly.
        assert_eq!(*deleted.lock(), vec![TreePath::from_indices(&[0])]);
    }

    #[test]
    fn test_remove_last_child_has_no_successor() {
        let store = store();
        let top = store.append(None, row("top")).unwrap();
        let only = store.append(Some(&top), row("only")).unwrap();
        assert!(store.remove(&only).unwrap().is_none());
        let top = store.iter(&TreePath::from_indices(&[0])).unwrap();
        assert!(!store.has_child(&top));
    }

    #[test]
    fn test_structural_mutation_invalidates_all_iterators() {
        let store = store();
        let a = store.append(None, row("a")).unwrap();
        let child = store.append(Some(&a), row("child")).unwrap();
        // Insert elsewhere in the tree still bumps the generation.
        store.append(None, row("b")).unwrap();
        assert!(!store.iter_is_valid(&child));
        assert!(matches!(
            store.path(&child),
            Err(ModelError::InvalidIterator)
        ));
    }

    #[test]
    fn test_set_value_preserves_iterators() {
        let store = store();
        let a = store.append(None, row("a")).unwrap();
        let child = store.append(Some(&a), row("old")).unwrap();

        let changed = Arc::new(Mutex::new(Vec::new()));
        let recv = changed.clone();
        store.signals().row_changed.connect(move |(path, _)| {
            recv.lock().push(path.clone());
        });

        store.set_value(&child, 0, Value::from("new")).unwrap();
        assert!(store.iter_is_valid(&child));
        assert_eq!(store.value(&child, 0).unwrap().as_str(), Some("new"));
        assert_eq!(*changed.lock(), vec![TreePath::from_indices(&[0, 1])]);
    }

    #[test]
    fn test_reorder_children_only() {
        let store = store();
        let top = store.append(None, row("top")).unwrap();
        let a = store.append(Some(&top), row("a")).unwrap();
        store.append(Some(&a), row("a-kid")).unwrap();
        let top = store.iter(&TreePath::from_indices(&[0])).unwrap();
        store.append(Some(&top), row("b")).unwrap();
        let top = store.iter(&TreePath::from_indices(&[0])).unwrap();
        store.append(Some(&top), row("c")).unwrap();

        let reorders = Arc::new(Mutex::new(Vec::new()));
        let recv = reorders.clone();
        store.signals().rows_reordered.connect(move |(parent, order)| {
            recv.lock().push((parent.clone(), order.clone()));
        });

        let top = store.iter(&TreePath::from_indices(&[0])).unwrap();
        store.reorder(Some(&top), &[2, 1, 0]).unwrap();

        let top = store.iter(&TreePath::from_indices(&[0])).unwrap();
        assert_eq!(child_texts(&store, Some(&top)), ["c", "b", "a"]);
        // The moved subtree kept its internal structure.
        assert_eq!(text_at(&store, &[0, 2, 0]), "a-kid");
        assert_eq!(
            *reorders.lock(),
            vec![(TreePath::from_indices(&[0]), vec![2, 1, 0])]
        );
    }

    #[test]
    fn test_swap_requires_common_parent() {
        let store = store();
        let a = store.append(None, row("a")).unwrap();
        let child = store.append(Some(&a), row("child")).unwrap();
        let a = store.iter(&TreePath::from_indices(&[0])).unwrap();
        assert!(matches!(
            store.swap(&a, &child),
            Err(ModelError::OutOfRange)
        ));
    }

    #[test]
    fn test_move_within_sibling_list() {
        let store = store();
        let top = store.append(None, row("top")).unwrap();
        store.append(Some(&top), row("a")).unwrap();
        let top = store.iter(&TreePath::from_indices(&[0])).unwrap();
        store.append(Some(&top), row("b")).unwrap();
        let top = store.iter(&TreePath::from_indices(&[0])).unwrap();
        store.append(Some(&top), row("c")).unwrap();

        let a = store.iter(&TreePath::from_indices(&[0, 0])).unwrap();
        store.move_before(&a, None).unwrap();
        let top = store.iter(&TreePath::from_indices(&[0])).unwrap();
        assert_eq!(child_texts(&store, Some(&top)), ["b", "c", "a"]);

        let a = store.iter(&TreePath::from_indices(&[0, 2])).unwrap();
        store.move_after(&a, None).unwrap();
        let top = store.iter(&TreePath::from_indices(&[0])).unwrap();
        assert_eq!(child_texts(&store, Some(&top)), ["a", "b", "c"]);
    }

    #[test]
    fn test_move_rejects_cross_parent_target() {
        let store = store();
        let a = store.append(None, row("a")).unwrap();
        store.append(Some(&a), row("a-kid")).unwrap();
        store.append(None, row("b")).unwrap();

        let kid = store.iter(&TreePath::from_indices(&[0, 0])).unwrap();
        let b = store.iter(&TreePath::from_indices(&[1])).unwrap();
        assert!(matches!(
            store.move_before(&kid, Some(&b)),
            Err(ModelError::OutOfRange)
        ));
    }

    #[test]
    fn test_clear_emits_top_level_deletions_back_to_front() {
        let store = store();
        let a = store.append(None, row("a")).unwrap();
        store.append(Some(&a), row("a-kid")).unwrap();
        store.append(None, row("b")).unwrap();

        let deleted = Arc::new(Mutex::new(Vec::new()));
        let recv = deleted.clone();
        store.signals().row_deleted.connect(move |path| {
            recv.lock().push(path.clone());
        });

        store.clear();
        assert_eq!(store.iter_n_children(None), 0);
        assert_eq!(
            *deleted.lock(),
            vec![TreePath::from_indices(&[1]), TreePath::from_indices(&[0])]
        );
    }
}
