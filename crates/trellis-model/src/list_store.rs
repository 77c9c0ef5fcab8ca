//! A flat, depth-1 row store.
//!
//! [`ListStore`] keeps every row in a generational arena and maintains a
//! separate ordering vector, so iterators survive reallocation of other
//! rows and stale handles are rejected instead of dereferenced. All
//! mutation goes through `&self`; the store emits its change signals
//! synchronously after each mutation, outside the state lock, so handlers
//! may query the store re-entrantly.

use parking_lot::RwLock;
use slotmap::SlotMap;
use trellis_core::{ModelError, Result};

use crate::iter::{bump_stamp, next_stamp_seed, ModelId, RowKey, TreeIter};
use crate::model::{ModelSignals, TreeModel};
use crate::path::TreePath;
use crate::value::{Value, ValueType};

struct ListState {
    stamp: u64,
    rows: SlotMap<RowKey, Vec<Value>>,
    order: Vec<RowKey>,
}

/// An ordered collection of rows, each a fixed-schema tuple of [`Value`]s.
///
/// # Example
///
/// ```
/// use trellis_model::{ListStore, TreeModel, Value, ValueType};
///
/// let store = ListStore::new(vec![ValueType::String, ValueType::Int]);
/// let iter = store.append(vec![Value::from("widget"), Value::from(7)]).unwrap();
/// assert_eq!(store.value(&iter, 1).unwrap().as_int(), Some(7));
/// ```
pub struct ListStore {
    schema: Vec<ValueType>,
    id: ModelId,
    state: RwLock<ListState>,
    signals: ModelSignals,
}

impl ListStore {
    /// Creates an empty store with the given column schema.
    pub fn new(schema: Vec<ValueType>) -> Self {
        Self {
            schema,
            id: ModelId::allocate(),
            state: RwLock::new(ListState {
                stamp: next_stamp_seed(),
                rows: SlotMap::with_key(),
                order: Vec::new(),
            }),
            signals: ModelSignals::new(),
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.state.read().order.len()
    }

    /// Returns `true` if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.state.read().order.is_empty()
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

    fn resolve(state: &ListState, iter: &TreeIter) -> Result<usize> {
        if iter.stamp() != state.stamp || !state.rows.contains_key(iter.key()) {
            return Err(ModelError::InvalidIterator);
        }
        state
            .order
            .iter()
            .position(|&k| k == iter.key())
            .ok_or(ModelError::InvalidIterator)
    }

    /// Inserts a row at `pos`, shifting later rows down. `pos` may equal
    /// the current length, which appends.
    pub fn insert(&self, pos: usize, values: Vec<Value>) -> Result<TreeIter> {
        self.check_row(&values)?;
        let iter = {
            let mut state = self.state.write();
            if pos > state.order.len() {
                return Err(ModelError::OutOfRange);
            }
            let key = state.rows.insert(values);
            state.order.insert(pos, key);
            state.stamp = bump_stamp(state.stamp);
            TreeIter::new(state.stamp, key)
        };
        tracing::debug!(target: "trellis_model::store", pos, "row inserted");
        self.signals
            .emit_row_inserted(TreePath::from_indices(&[pos]), iter);
        Ok(iter)
    }

    /// Appends a row.
    pub fn append(&self, values: Vec<Value>) -> Result<TreeIter> {
        let pos = self.state.read().order.len();
        self.insert(pos, values)
    }

    /// Prepends a row.
    pub fn prepend(&self, values: Vec<Value>) -> Result<TreeIter> {
        self.insert(0, values)
    }

    /// Inserts a row before `sibling`; with no sibling the row is appended.
    pub fn insert_before(&self, sibling: Option<&TreeIter>, values: Vec<Value>) -> Result<TreeIter> {
        let pos = match sibling {
            Some(sib) => Self::resolve(&self.state.read(), sib)?,
            None => self.state.read().order.len(),
        };
        self.insert(pos, values)
    }

    /// Inserts a row after `sibling`; with no sibling the row is prepended.
    pub fn insert_after(&self, sibling: Option<&TreeIter>, values: Vec<Value>) -> Result<TreeIter> {
        let pos = match sibling {
            Some(sib) => Self::resolve(&self.state.read(), sib)? + 1,
            None => 0,
        };
        self.insert(pos, values)
    }

    /// Replaces one cell. Value-only: `iter` (and every other iterator into
    /// this store) remains valid afterwards.
    pub fn set_value(&self, iter: &TreeIter, column: usize, value: Value) -> Result<()> {
        let expected = *self.schema.get(column).ok_or(ModelError::OutOfRange)?;
        if value.type_of() != expected {
            return Err(ModelError::TypeMismatch {
                column,
                expected: expected.name(),
                found: value.type_of().name(),
            });
        }
        let pos = {
            let mut state = self.state.write();
            let pos = Self::resolve(&state, iter)?;
            state.rows[iter.key()][column] = value;
            pos
        };
        self.signals
            .emit_row_changed(TreePath::from_indices(&[pos]), *iter);
        Ok(())
    }

    /// Replaces every cell of a row at once. Emits a single `row_changed`.
    pub fn set_row(&self, iter: &TreeIter, values: Vec<Value>) -> Result<()> {
        self.check_row(&values)?;
        let pos = {
            let mut state = self.state.write();
            let pos = Self::resolve(&state, iter)?;
            state.rows[iter.key()] = values;
            pos
        };
        self.signals
            .emit_row_changed(TreePath::from_indices(&[pos]), *iter);
        Ok(())
    }

    /// Removes the row at `iter`.
    ///
    /// Returns an iterator to the row that now occupies the removed
    /// position (typically the next selection target), or `None` if the
    /// removed row was last.
    pub fn remove(&self, iter: &TreeIter) -> Result<Option<TreeIter>> {
        let (pos, successor) = {
            let mut state = self.state.write();
            let pos = Self::resolve(&state, iter)?;
            state.rows.remove(iter.key());
            state.order.remove(pos);
            state.stamp = bump_stamp(state.stamp);
            let successor = state
                .order
                .get(pos)
                .map(|&key| TreeIter::new(state.stamp, key));
            (pos, successor)
        };
        tracing::debug!(target: "trellis_model::store", pos, "row deleted");
        self.signals.emit_row_deleted(TreePath::from_indices(&[pos]));
        Ok(successor)
    }

    /// Exchanges the positions of two rows. Emits one `rows_reordered`;
    /// swapping a row with itself is a signal-free no-op.
    pub fn swap(&self, a: &TreeIter, b: &TreeIter) -> Result<()> {
        let order = {
            let mut state = self.state.write();
            let pos_a = Self::resolve(&state, a)?;
            let pos_b = Self::resolve(&state, b)?;
            if pos_a == pos_b {
                return Ok(());
            }
            state.order.swap(pos_a, pos_b);
            state.stamp = bump_stamp(state.stamp);
            let mut order: Vec<usize> = (0..state.order.len()).collect();
            order.swap(pos_a, pos_b);
            order
        };
        self.signals.emit_rows_reordered(TreePath::new(), order);
        Ok(())
    }

    fn move_to(&self, iter: &TreeIter, new_pos: usize) -> Result<()> {
        let order = {
            let mut state = self.state.write();
            let old_pos = Self::resolve(&state, iter)?;
            if old_pos == new_pos {
                return Ok(());
            }
            let key = state.order.remove(old_pos);
            state.order.insert(new_pos, key);
            state.stamp = bump_stamp(state.stamp);
            // order[new] = old for the shifted span, identity elsewhere.
            let mut order: Vec<usize> = (0..state.order.len()).collect();
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
            order
        };
        self.signals.emit_rows_reordered(TreePath::new(), order);
        Ok(())
    }

    /// Moves `iter` to just before `position`; with no position the row
    /// moves to the end of the store.
    pub fn move_before(&self, iter: &TreeIter, position: Option<&TreeIter>) -> Result<()> {
        let new_pos = match position {
            Some(target) => {
                let state = self.state.read();
                let old = Self::resolve(&state, iter)?;
                let target = Self::resolve(&state, target)?;
                // Removal shifts everything past the old slot left by one.
                if old < target { target - 1 } else { target }
            }
            None => {
                let state = self.state.read();
                Self::resolve(&state, iter)?;
                state.order.len() - 1
            }
        };
        self.move_to(iter, new_pos)
    }

    /// Moves `iter` to just after `position`; with no position the row
    /// moves to the start of the store.
    pub fn move_after(&self, iter: &TreeIter, position: Option<&TreeIter>) -> Result<()> {
        let new_pos = match position {
            Some(target) => {
                let state = self.state.read();
                let old = Self::resolve(&state, iter)?;
                let target = Self::resolve(&state, target)?;
                if old < target { target } else { target + 1 }
            }
            None => 0,
        };
        self.move_to(iter, new_pos)
    }

    /// Applies a whole-store permutation, `order[new] = old`.
    ///
    /// `order` must mention every current position exactly once.
    pub fn reorder(&self, order: &[usize]) -> Result<()> {
        {
            let mut state = self.state.write();
            if order.len() != state.order.len() {
                return Err(ModelError::OutOfRange);
            }
            let mut seen = vec![false; order.len()];
            for &old in order {
                if old >= order.len() || seen[old] {
                    return Err(ModelError::OutOfRange);
                }
                seen[old] = true;
            }
            let previous = state.order.clone();
            for (new, &old) in order.iter().enumerate() {
                state.order[new] = previous[old];
            }
            state.stamp = bump_stamp(state.stamp);
        }
        tracing::debug!(target: "trellis_model::store", rows = order.len(), "rows reordered");
        self.signals
            .emit_rows_reordered(TreePath::new(), order.to_vec());
        Ok(())
    }

    /// Removes every row. Emits `row_deleted` per row, last row first, so
    /// every reported path is valid at the moment its handler runs.
    pub fn clear(&self) {
        let count = {
            let mut state = self.state.write();
            let count = state.order.len();
            state.rows.clear();
            state.order.clear();
            state.stamp = bump_stamp(state.stamp);
            count
        };
        tracing::debug!(target: "trellis_model::store", rows = count, "store cleared");
        for pos in (0..count).rev() {
            self.signals.emit_row_deleted(TreePath::from_indices(&[pos]));
        }
    }
}

impl TreeModel for ListStore {
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
        iter.stamp() == state.stamp && state.rows.contains_key(iter.key())
    }

    fn iter_next(&self, iter: &TreeIter) -> Option<TreeIter> {
        let state = self.state.read();
        let pos = Self::resolve(&state, iter).ok()?;
        state
            .order
            .get(pos + 1)
            .map(|&key| TreeIter::new(state.stamp, key))
    }

    fn iter_parent(&self, _child: &TreeIter) -> Option<TreeIter> {
        None
    }

    fn iter_nth_child(&self, parent: Option<&TreeIter>, n: usize) -> Option<TreeIter> {
        if parent.is_some() {
            return None;
        }
        let state = self.state.read();
        state
            .order
            .get(n)
            .map(|&key| TreeIter::new(state.stamp, key))
    }

    fn iter_n_children(&self, parent: Option<&TreeIter>) -> usize {
        match parent {
            Some(_) => 0,
            None => self.state.read().order.len(),
        }
    }

    fn value(&self, iter: &TreeIter, column: usize) -> Result<Value> {
        if column >= self.schema.len() {
            return Err(ModelError::OutOfRange);
        }
        let state = self.state.read();
        Self::resolve(&state, iter)?;
        Ok(state.rows[iter.key()][column].clone())
    }

    fn path(&self, iter: &TreeIter) -> Result<TreePath> {
        let state = self.state.read();
        let pos = Self::resolve(&state, iter)?;
        Ok(TreePath::from_indices(&[pos]))
    }

    fn iter(&self, path: &TreePath) -> Result<TreeIter> {
        if path.depth() != 1 {
            return Err(ModelError::NotFound);
        }
        let state = self.state.read();
        state
            .order
            .get(path.indices()[0])
            .map(|&key| TreeIter::new(state.stamp, key))
            .ok_or(ModelError::NotFound)
    }
}
