//! Sorting and filtering wrapper.
//!
//! [`SortFilterModel`] wraps a source model and presents its top level
//! sorted and/or filtered. The wrapper maintains a row mapping in both
//! directions, tracks the source incrementally through its change signals,
//! and re-emits translated signals of its own, so a view connected to the
//! wrapper never needs to know the source exists.
//!
//! Translation is one level deep: children of visible rows are not
//! exposed. Wrapper iterators are generation-stamped independently of the
//! source; any change to the visible sequence invalidates them.

use parking_lot::{Mutex, RwLock};
use slotmap::SlotMap;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use trellis_core::logging::PerfSpan;
use trellis_core::{ConnectionId, ModelError, Result};

use crate::iter::{bump_stamp, next_stamp_seed, ModelId, RowKey, TreeIter};
use crate::model::{ModelSignals, TreeModel};
use crate::path::TreePath;
use crate::value::{Value, ValueType};

/// Filter predicate. Receives the source model and a source iterator;
/// returns `true` to keep the row visible.
pub type FilterFn<S> = Arc<dyn Fn(&S, &TreeIter) -> bool + Send + Sync>;

/// Sort comparator over two source iterators.
pub type CompareFn<S> = Arc<dyn Fn(&S, &TreeIter, &TreeIter) -> Ordering + Send + Sync>;

/// Direction for [`SortFilterModel::sort_by_column`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Row mapping between wrapper and source top-level positions.
struct RowMapping {
    /// Wrapper position to source position.
    proxy_to_source: Vec<usize>,
    /// Source position to wrapper position (`None` if filtered out).
    source_to_proxy: Vec<Option<usize>>,
}

impl RowMapping {
    fn new() -> Self {
        Self {
            proxy_to_source: Vec::new(),
            source_to_proxy: Vec::new(),
        }
    }

    fn refresh_source_to_proxy(&mut self, source_len: usize) {
        self.source_to_proxy = vec![None; source_len];
        for (proxy, &source) in self.proxy_to_source.iter().enumerate() {
            self.source_to_proxy[source] = Some(proxy);
        }
    }

    fn from_source(&self, source_pos: usize) -> Option<usize> {
        self.source_to_proxy.get(source_pos).and_then(|&p| p)
    }
}

struct ProxyState {
    stamp: u64,
    mapping: RowMapping,
    /// Live wrapper iterator handles, keyed per generation.
    handles: SlotMap<RowKey, usize>,
    /// Wrapper position to its handle, so repeated lookups share one key.
    pos_handles: Vec<Option<RowKey>>,
}

impl ProxyState {
    fn bump(&mut self) {
        self.stamp = bump_stamp(self.stamp);
        self.handles.clear();
        self.pos_handles.clear();
    }

    fn handle_for(&mut self, pos: usize) -> TreeIter {
        if self.pos_handles.len() <= pos {
            self.pos_handles.resize(pos + 1, None);
        }
        let key = match self.pos_handles[pos] {
            Some(key) => key,
            None => {
                let key = self.handles.insert(pos);
                self.pos_handles[pos] = Some(key);
                key
            }
        };
        TreeIter::new(self.stamp, key)
    }

    fn resolve(&self, iter: &TreeIter) -> Result<usize> {
        if iter.stamp() != self.stamp {
            return Err(ModelError::InvalidIterator);
        }
        self.handles
            .get(iter.key())
            .copied()
            .ok_or(ModelError::InvalidIterator)
    }
}

struct SourceConnections {
    changed: ConnectionId,
    inserted: ConnectionId,
    deleted: ConnectionId,
    reordered: ConnectionId,
}

/// A model presenting another model's top level sorted and/or filtered.
///
/// # Example
///
/// ```
/// use trellis_model::{ListStore, SortFilterModel, SortOrder, TreeModel, Value, ValueType};
///
/// let store = std::sync::Arc::new(ListStore::new(vec![ValueType::String]));
/// store.append(vec![Value::from("pear")]).unwrap();
/// store.append(vec![Value::from("apple")]).unwrap();
///
/// let sorted = SortFilterModel::new(store.clone());
/// sorted.sort_by_column(0, SortOrder::Ascending);
///
/// let first = sorted.iter_first().unwrap();
/// assert_eq!(sorted.value(&first, 0).unwrap().as_str(), Some("apple"));
/// ```
pub struct SortFilterModel<S: TreeModel> {
    source: Arc<S>,
    id: ModelId,
    filter: RwLock<Option<FilterFn<S>>>,
    compare: RwLock<Option<CompareFn<S>>>,
    state: RwLock<ProxyState>,
    signals: ModelSignals,
    connections: Mutex<Option<SourceConnections>>,
}

enum ChangeOutcome {
    Nothing,
    Inserted(usize, TreeIter),
    Deleted(usize),
    Reordered(Vec<usize>),
    Forwarded(usize, TreeIter),
}

impl<S: TreeModel + 'static> SortFilterModel<S> {
    /// Wraps `source`, initially unsorted and unfiltered.
    ///
    /// The wrapper subscribes to all four source signals; the
    /// subscriptions are dropped with the wrapper.
    pub fn new(source: Arc<S>) -> Arc<Self> {
        let model = Arc::new(Self {
            source,
            id: ModelId::allocate(),
            filter: RwLock::new(None),
            compare: RwLock::new(None),
            state: RwLock::new(ProxyState {
                stamp: next_stamp_seed(),
                mapping: RowMapping::new(),
                handles: SlotMap::with_key(),
                pos_handles: Vec::new(),
            }),
            signals: ModelSignals::new(),
            connections: Mutex::new(None),
        });

        {
            // No filter or comparator yet: the mapping is the identity.
            let source_len = model.source.iter_n_children(None);
            let mut state = model.state.write();
            state.mapping.proxy_to_source = (0..source_len).collect();
            state.mapping.refresh_source_to_proxy(source_len);
        }

        let signals = model.source.signals();
        let weak = Arc::downgrade(&model);
        let changed = signals.row_changed.connect(enliven(
            &weak,
            |model, args: &(TreePath, TreeIter)| {
                model.source_row_changed(&args.0);
            },
        ));
        let weak = Arc::downgrade(&model);
        let inserted = signals.row_inserted.connect(enliven(
            &weak,
            |model, args: &(TreePath, TreeIter)| {
                model.source_row_inserted(&args.0);
            },
        ));
        let weak = Arc::downgrade(&model);
        let deleted = signals.row_deleted.connect(enliven(&weak, |model, path: &TreePath| {
            model.source_row_deleted(path);
        }));
        let weak = Arc::downgrade(&model);
        let reordered = signals.rows_reordered.connect(enliven(
            &weak,
            |model, args: &(TreePath, Vec<usize>)| {
                model.source_rows_reordered(&args.0, &args.1);
            },
        ));
        *model.connections.lock() = Some(SourceConnections {
            changed,
            inserted,
            deleted,
            reordered,
        });

        model
    }

    /// Returns the wrapped source model.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Sets the sort comparator and re-sorts the visible rows, emitting
    /// one `rows_reordered` if the sequence changed.
    pub fn set_sort<F>(&self, compare: F)
    where
        F: Fn(&S, &TreeIter, &TreeIter) -> Ordering + Send + Sync + 'static,
    {
        *self.compare.write() = Some(Arc::new(compare));
        self.resort();
    }

    /// Removes the sort; visible rows return to source order.
    pub fn clear_sort(&self) {
        *self.compare.write() = None;
        self.resort();
    }

    /// Sorts by one column using the natural ordering of [`Value`].
    pub fn sort_by_column(&self, column: usize, order: SortOrder) {
        self.set_sort(move |source: &S, a: &TreeIter, b: &TreeIter| {
            let ordering = match (source.value(a, column), source.value(b, column)) {
                (Ok(va), Ok(vb)) => va.compare(&vb),
                _ => Ordering::Equal,
            };
            order.apply(ordering)
        });
    }

    /// Sets the filter predicate and refilters, emitting `row_deleted` for
    /// rows that disappear (highest wrapper position first) and
    /// `row_inserted` for rows that appear (lowest first).
    pub fn set_filter<F>(&self, filter: F)
    where
        F: Fn(&S, &TreeIter) -> bool + Send + Sync + 'static,
    {
        *self.filter.write() = Some(Arc::new(filter));
        self.refilter();
    }

    /// Removes the filter, revealing every source row.
    pub fn clear_filter(&self) {
        *self.filter.write() = None;
        self.refilter();
    }

    /// Maps a wrapper iterator to a source iterator for the same row.
    pub fn map_to_source(&self, iter: &TreeIter) -> Result<TreeIter> {
        let source_pos = {
            let state = self.state.read();
            let pos = state.resolve(iter)?;
            state.mapping.proxy_to_source[pos]
        };
        self.source.iter(&TreePath::from_indices(&[source_pos]))
    }

    /// Maps a source iterator into the wrapper; `Ok(None)` means the row
    /// is filtered out (or below the top level).
    pub fn map_from_source(&self, iter: &TreeIter) -> Result<Option<TreeIter>> {
        let path = self.source.path(iter)?;
        if path.depth() != 1 {
            return Ok(None);
        }
        let mut state = self.state.write();
        Ok(state
            .mapping
            .from_source(path.indices()[0])
            .map(|pos| state.handle_for(pos)))
    }

    /// Path-level companion to [`map_to_source`](Self::map_to_source).
    pub fn map_path_to_source(&self, path: &TreePath) -> Result<TreePath> {
        if path.depth() != 1 {
            return Err(ModelError::NotFound);
        }
        let state = self.state.read();
        let source_pos = *state
            .mapping
            .proxy_to_source
            .get(path.indices()[0])
            .ok_or(ModelError::NotFound)?;
        Ok(TreePath::from_indices(&[source_pos]))
    }

    /// Path-level companion to [`map_from_source`](Self::map_from_source).
    pub fn map_path_from_source(&self, path: &TreePath) -> Result<Option<TreePath>> {
        if path.depth() != 1 {
            return Ok(None);
        }
        let state = self.state.read();
        if path.indices()[0] >= state.mapping.source_to_proxy.len() {
            return Err(ModelError::NotFound);
        }
        Ok(state
            .mapping
            .from_source(path.indices()[0])
            .map(|pos| TreePath::from_indices(&[pos])))
    }

    fn source_iter(&self, source_pos: usize) -> Option<TreeIter> {
        self.source
            .iter(&TreePath::from_indices(&[source_pos]))
            .ok()
    }

    fn row_visible(&self, source_pos: usize) -> bool {
        let filter = self.filter.read();
        match (&*filter, self.source_iter(source_pos)) {
            (Some(filter), Some(iter)) => filter(&self.source, &iter),
            _ => true,
        }
    }

    /// Orders two source positions: the comparator when set, source
    /// order otherwise. Used both for sorting and for insertion points,
    /// which makes the unsorted wrapper follow source order for free.
    fn compare_positions(&self, a: usize, b: usize) -> Ordering {
        let compare = self.compare.read();
        if let Some(compare) = &*compare {
            if let (Some(iter_a), Some(iter_b)) = (self.source_iter(a), self.source_iter(b)) {
                return compare(&self.source, &iter_a, &iter_b);
            }
        }
        a.cmp(&b)
    }

    fn resort(&self) {
        let _perf = PerfSpan::new("resort");
        let order = {
            let mut state = self.state.write();
            let old = state.mapping.proxy_to_source.clone();
            let mut order: Vec<usize> = (0..old.len()).collect();
            // Stable, so equal rows keep their previous relative order.
            order.sort_by(|&i, &j| self.compare_positions(old[i], old[j]));
            let new: Vec<usize> = order.iter().map(|&i| old[i]).collect();
            if new == old {
                return;
            }
            let source_len = self.source.iter_n_children(None);
            state.mapping.proxy_to_source = new;
            state.mapping.refresh_source_to_proxy(source_len);
            state.bump();
            order
        };
        tracing::debug!(target: "trellis_model::sort", rows = order.len(), "resorted");
        self.signals.emit_rows_reordered(TreePath::new(), order);
    }

    fn refilter(&self) {
        let _perf = PerfSpan::new("refilter");
        let (deleted, inserted) = {
            let mut state = self.state.write();
            let source_len = self.source.iter_n_children(None);
            let old = state.mapping.proxy_to_source.clone();
            let mut new: Vec<usize> = (0..source_len).filter(|&s| self.row_visible(s)).collect();
            new.sort_by(|&a, &b| self.compare_positions(a, b));
            if new == old {
                return;
            }

            let old_set: HashSet<usize> = old.iter().copied().collect();
            let new_set: HashSet<usize> = new.iter().copied().collect();
            let deleted: Vec<usize> = old
                .iter()
                .enumerate()
                .rev()
                .filter(|&(_, s)| !new_set.contains(s))
                .map(|(pos, _)| pos)
                .collect();

            state.mapping.proxy_to_source = new.clone();
            state.mapping.refresh_source_to_proxy(source_len);
            state.bump();

            let revealed: Vec<usize> = new
                .iter()
                .enumerate()
                .filter(|&(_, s)| !old_set.contains(s))
                .map(|(pos, _)| pos)
                .collect();
            let inserted: Vec<(usize, TreeIter)> = revealed
                .into_iter()
                .map(|pos| (pos, state.handle_for(pos)))
                .collect();
            (deleted, inserted)
        };
        tracing::debug!(
            target: "trellis_model::sort",
            hidden = deleted.len(),
            revealed = inserted.len(),
            "refiltered"
        );
        for pos in deleted {
            self.signals.emit_row_deleted(TreePath::from_indices(&[pos]));
        }
        for (pos, iter) in inserted {
            self.signals
                .emit_row_inserted(TreePath::from_indices(&[pos]), iter);
        }
    }

    fn source_row_inserted(&self, path: &TreePath) {
        if path.depth() != 1 {
            return;
        }
        let source_pos = path.indices()[0];
        let event = {
            let mut state = self.state.write();
            for s in &mut state.mapping.proxy_to_source {
                if *s >= source_pos {
                    *s += 1;
                }
            }
            let source_len = self.source.iter_n_children(None);
            if self.row_visible(source_pos) {
                let pos = state
                    .mapping
                    .proxy_to_source
                    .partition_point(|&s| self.compare_positions(s, source_pos) != Ordering::Greater);
                state.mapping.proxy_to_source.insert(pos, source_pos);
                state.mapping.refresh_source_to_proxy(source_len);
                state.bump();
                Some((pos, state.handle_for(pos)))
            } else {
                state.mapping.refresh_source_to_proxy(source_len);
                None
            }
        };
        if let Some((pos, iter)) = event {
            self.signals
                .emit_row_inserted(TreePath::from_indices(&[pos]), iter);
        }
    }

    fn source_row_deleted(&self, path: &TreePath) {
        if path.depth() != 1 {
            return;
        }
        let source_pos = path.indices()[0];
        let event = {
            let mut state = self.state.write();
            let removed = state.mapping.from_source(source_pos);
            if let Some(pos) = removed {
                state.mapping.proxy_to_source.remove(pos);
            }
            for s in &mut state.mapping.proxy_to_source {
                if *s > source_pos {
                    *s -= 1;
                }
            }
            let source_len = self.source.iter_n_children(None);
            state.mapping.refresh_source_to_proxy(source_len);
            if removed.is_some() {
                state.bump();
            }
            removed
        };
        if let Some(pos) = event {
            self.signals.emit_row_deleted(TreePath::from_indices(&[pos]));
        }
    }

    fn source_row_changed(&self, path: &TreePath) {
        if path.depth() != 1 {
            return;
        }
        let source_pos = path.indices()[0];
        let outcome = {
            let mut state = self.state.write();
            let source_len = self.source.iter_n_children(None);
            let was_visible = state.mapping.from_source(source_pos);
            let now_visible = self.row_visible(source_pos);
            match (was_visible, now_visible) {
                (None, false) => ChangeOutcome::Nothing,
                (None, true) => {
                    let pos = state
                        .mapping
                        .proxy_to_source
                        .partition_point(|&s| {
                            self.compare_positions(s, source_pos) != Ordering::Greater
                        });
                    state.mapping.proxy_to_source.insert(pos, source_pos);
                    state.mapping.refresh_source_to_proxy(source_len);
                    state.bump();
                    let iter = state.handle_for(pos);
                    ChangeOutcome::Inserted(pos, iter)
                }
                (Some(pos), false) => {
                    state.mapping.proxy_to_source.remove(pos);
                    state.mapping.refresh_source_to_proxy(source_len);
                    state.bump();
                    ChangeOutcome::Deleted(pos)
                }
                (Some(old_pos), true) => {
                    let mut others = state.mapping.proxy_to_source.clone();
                    others.remove(old_pos);
                    let new_pos = others.partition_point(|&s| {
                        self.compare_positions(s, source_pos) != Ordering::Greater
                    });
                    if new_pos == old_pos {
                        let iter = state.handle_for(old_pos);
                        ChangeOutcome::Forwarded(old_pos, iter)
                    } else {
                        others.insert(new_pos, source_pos);
                        state.mapping.proxy_to_source = others;
                        state.mapping.refresh_source_to_proxy(source_len);
                        state.bump();
                        let len = state.mapping.proxy_to_source.len();
                        let mut order: Vec<usize> = (0..len).collect();
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
                        ChangeOutcome::Reordered(order)
                    }
                }
            }
        };
        match outcome {
            ChangeOutcome::Nothing => {}
            ChangeOutcome::Inserted(pos, iter) => {
                self.signals
                    .emit_row_inserted(TreePath::from_indices(&[pos]), iter);
            }
            ChangeOutcome::Deleted(pos) => {
                self.signals.emit_row_deleted(TreePath::from_indices(&[pos]));
            }
            ChangeOutcome::Reordered(order) => {
                self.signals.emit_rows_reordered(TreePath::new(), order);
            }
            ChangeOutcome::Forwarded(pos, iter) => {
                self.signals
                    .emit_row_changed(TreePath::from_indices(&[pos]), iter);
            }
        }
    }

    fn source_rows_reordered(&self, parent: &TreePath, source_order: &[usize]) {
        if !parent.is_root() {
            return;
        }
        // source_order[new] = old; invert to map old positions forward.
        let mut forward = vec![0usize; source_order.len()];
        for (new, &old) in source_order.iter().enumerate() {
            forward[old] = new;
        }
        let order = {
            let mut state = self.state.write();
            for s in &mut state.mapping.proxy_to_source {
                *s = forward[*s];
            }
            let sorted = self.compare.read().is_some();
            if sorted {
                // Row identity drives the sequence; only the cached
                // positions moved.
                let source_len = self.source.iter_n_children(None);
                state.mapping.refresh_source_to_proxy(source_len);
                return;
            }
            // Unsorted: the wrapper follows source order.
            let old = state.mapping.proxy_to_source.clone();
            let mut order: Vec<usize> = (0..old.len()).collect();
            order.sort_by_key(|&i| old[i]);
            let new: Vec<usize> = order.iter().map(|&i| old[i]).collect();
            if new == old {
                return;
            }
            let source_len = self.source.iter_n_children(None);
            state.mapping.proxy_to_source = new;
            state.mapping.refresh_source_to_proxy(source_len);
            state.bump();
            order
        };
        self.signals.emit_rows_reordered(TreePath::new(), order);
    }
}

/// Wraps a handler so it only fires while the wrapper is alive.
fn enliven<S, Args, F>(
    weak: &Weak<SortFilterModel<S>>,
    handler: F,
) -> impl Fn(&Args) + Send + Sync + 'static
where
    S: TreeModel + 'static,
    F: Fn(&SortFilterModel<S>, &Args) + Send + Sync + 'static,
{
    let weak = weak.clone();
    move |args: &Args| {
        if let Some(model) = weak.upgrade() {
            handler(&model, args);
        }
    }
}

impl<S: TreeModel> Drop for SortFilterModel<S> {
    fn drop(&mut self) {
        if let Some(connections) = self.connections.lock().take() {
            let signals = self.source.signals();
            signals.row_changed.disconnect(connections.changed);
            signals.row_inserted.disconnect(connections.inserted);
            signals.row_deleted.disconnect(connections.deleted);
            signals.rows_reordered.disconnect(connections.reordered);
        }
    }
}

impl<S: TreeModel + 'static> TreeModel for SortFilterModel<S> {
    fn n_columns(&self) -> usize {
        self.source.n_columns()
    }

    fn column_type(&self, column: usize) -> Result<ValueType> {
        self.source.column_type(column)
    }

    fn model_id(&self) -> ModelId {
        self.id
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn iter_is_valid(&self, iter: &TreeIter) -> bool {
        self.state.read().resolve(iter).is_ok()
    }

    fn iter_next(&self, iter: &TreeIter) -> Option<TreeIter> {
        let mut state = self.state.write();
        let pos = state.resolve(iter).ok()?;
        if pos + 1 < state.mapping.proxy_to_source.len() {
            Some(state.handle_for(pos + 1))
        } else {
            None
        }
    }

    fn iter_parent(&self, _child: &TreeIter) -> Option<TreeIter> {
        None
    }

    fn iter_nth_child(&self, parent: Option<&TreeIter>, n: usize) -> Option<TreeIter> {
        if parent.is_some() {
            return None;
        }
        let mut state = self.state.write();
        if n < state.mapping.proxy_to_source.len() {
            Some(state.handle_for(n))
        } else {
            None
        }
    }

    fn iter_n_children(&self, parent: Option<&TreeIter>) -> usize {
        match parent {
            Some(_) => 0,
            None => self.state.read().mapping.proxy_to_source.len(),
        }
    }

    fn value(&self, iter: &TreeIter, column: usize) -> Result<Value> {
        let source_iter = self.map_to_source(iter)?;
        self.source.value(&source_iter, column)
    }

    fn path(&self, iter: &TreeIter) -> Result<TreePath> {
        let pos = self.state.read().resolve(iter)?;
        Ok(TreePath::from_indices(&[pos]))
    }

    fn iter(&self, path: &TreePath) -> Result<TreeIter> {
        if path.depth() != 1 {
            return Err(ModelError::NotFound);
        }
        let mut state = self.state.write();
        let pos = path.indices()[0];
        if pos < state.mapping.proxy_to_source.len() {
            Ok(state.handle_for(pos))
        } else {
            Err(ModelError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list_store::ListStore;

    fn fruit_store() -> Arc<ListStore> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        let store = Arc::new(ListStore::new(vec![ValueType::String, ValueType::Int]));
        store
            .append(vec![Value::from("pear"), Value::from(30i64)])
            .unwrap();
        store
            .append(vec![Value::from("apple"), Value::from(10i64)])
            .unwrap();
        store
            .append(vec![Value::from("quince"), Value::from(20i64)])
            .unwrap();
        store
    }

    fn visible_texts(model: &SortFilterModel<ListStore>) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = model.iter_first();
        while let Some(iter) = cursor {
            out.push(model.value(&iter, 0).unwrap().into_string().unwrap());
            cursor = model.iter_next(&iter);
        }
        out
    }

    #[test]
    fn test_passthrough_preserves_source_order() {
        let source = fruit_store();
        let model = SortFilterModel::new(source);
        assert_eq!(model.iter_n_children(None), 3);
        assert_eq!(visible_texts(&model), ["pear", "apple", "quince"]);
    }

    #[test]
    fn test_sort_by_column() {
        let source = fruit_store();
        let model = SortFilterModel::new(source);
        model.sort_by_column(0, SortOrder::Ascending);
        assert_eq!(visible_texts(&model), ["apple", "pear", "quince"]);
        model.sort_by_column(1, SortOrder::Descending);
        assert_eq!(visible_texts(&model), ["pear", "quince", "apple"]);
    }

    #[test]
    fn test_clear_sort_restores_source_order() {
        let source = fruit_store();
        let model = SortFilterModel::new(source);
        model.sort_by_column(0, SortOrder::Ascending);
        model.clear_sort();
        assert_eq!(visible_texts(&model), ["pear", "apple", "quince"]);
    }

    #[test]
    fn test_set_sort_emits_one_reorder() {
        let source = fruit_store();
        let model = SortFilterModel::new(source);

        let reorders = Arc::new(Mutex::new(Vec::new()));
        let recv = reorders.clone();
        model.signals().rows_reordered.connect(move |(parent, order)| {
            recv.lock().push((parent.clone(), order.clone()));
        });

        model.sort_by_column(0, SortOrder::Ascending);
        // Sorted sequence apple, pear, quince from source pear, apple, quince.
        assert_eq!(
            *reorders.lock(),
            vec![(TreePath::new(), vec![1, 0, 2])]
        );
    }

    #[test]
    fn test_filter_hides_rows() {
        let source = fruit_store();
        let model = SortFilterModel::new(source);
        model.set_filter(|source: &ListStore, iter: &TreeIter| {
            source.value(iter, 1).map(|v| v.as_int() >= Some(20)).unwrap_or(false)
        });
        assert_eq!(visible_texts(&model), ["pear", "quince"]);

        model.clear_filter();
        assert_eq!(visible_texts(&model), ["pear", "apple", "quince"]);
    }

    #[test]
    fn test_refilter_emits_deletes_then_inserts() {
        let source = fruit_store();
        let model = SortFilterModel::new(source);

        let events = Arc::new(Mutex::new(Vec::new()));
        let recv = events.clone();
        model.signals().row_deleted.connect(move |path| {
            recv.lock().push(("deleted", path.clone()));
        });
        let recv = events.clone();
        model.signals().row_inserted.connect(move |(path, _)| {
            recv.lock().push(("inserted", path.clone()));
        });

        // Hides apple (10), wrapper position 1.
        model.set_filter(|source: &ListStore, iter: &TreeIter| {
            source.value(iter, 1).map(|v| v.as_int() >= Some(20)).unwrap_or(false)
        });
        assert_eq!(
            *events.lock(),
            vec![("deleted", TreePath::from_indices(&[1]))]
        );

        events.lock().clear();
        model.clear_filter();
        assert_eq!(
            *events.lock(),
            vec![("inserted", TreePath::from_indices(&[1]))]
        );
    }

    #[test]
    fn test_source_insert_lands_at_sorted_position() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        model.sort_by_column(0, SortOrder::Ascending);

        let inserts = Arc::new(Mutex::new(Vec::new()));
        let recv = inserts.clone();
        model.signals().row_inserted.connect(move |(path, _)| {
            recv.lock().push(path.clone());
        });

        source
            .append(vec![Value::from("banana"), Value::from(40i64)])
            .unwrap();
        assert_eq!(visible_texts(&model), ["apple", "banana", "pear", "quince"]);
        assert_eq!(*inserts.lock(), vec![TreePath::from_indices(&[1])]);
    }

    #[test]
    fn test_source_insert_of_filtered_row_is_silent() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        model.set_filter(|source: &ListStore, iter: &TreeIter| {
            source.value(iter, 1).map(|v| v.as_int() >= Some(20)).unwrap_or(false)
        });

        let count = Arc::new(Mutex::new(0usize));
        let recv = count.clone();
        model.signals().row_inserted.connect(move |_| {
            *recv.lock() += 1;
        });

        // Hidden row: iterators into the wrapper stay valid.
        let first = model.iter_first().unwrap();
        source
            .append(vec![Value::from("fig"), Value::from(5i64)])
            .unwrap();
        assert_eq!(*count.lock(), 0);
        assert!(model.iter_is_valid(&first));
        assert_eq!(visible_texts(&model), ["pear", "quince"]);
    }

    #[test]
    fn test_source_delete_translates_path() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        model.sort_by_column(0, SortOrder::Ascending);

        let deletes = Arc::new(Mutex::new(Vec::new()));
        let recv = deletes.clone();
        model.signals().row_deleted.connect(move |path| {
            recv.lock().push(path.clone());
        });

        // Source position 0 (pear) sits at wrapper position 1.
        let pear = source.iter(&TreePath::from_indices(&[0])).unwrap();
        source.remove(&pear).unwrap();
        assert_eq!(*deletes.lock(), vec![TreePath::from_indices(&[1])]);
        assert_eq!(visible_texts(&model), ["apple", "quince"]);
    }

    #[test]
    fn test_source_edit_moves_row() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        model.sort_by_column(1, SortOrder::Ascending);
        assert_eq!(visible_texts(&model), ["apple", "quince", "pear"]);

        let reorders = Arc::new(Mutex::new(Vec::new()));
        let recv = reorders.clone();
        model.signals().rows_reordered.connect(move |(_, order)| {
            recv.lock().push(order.clone());
        });

        // apple 10 -> 25: moves between quince (20) and pear (30).
        let apple = source.iter(&TreePath::from_indices(&[1])).unwrap();
        source.set_value(&apple, 1, Value::from(25i64)).unwrap();
        assert_eq!(visible_texts(&model), ["quince", "apple", "pear"]);
        assert_eq!(*reorders.lock(), vec![vec![1, 0, 2]]);
    }

    #[test]
    fn test_source_edit_in_place_forwards_row_changed() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        model.sort_by_column(1, SortOrder::Ascending);

        let changes = Arc::new(Mutex::new(Vec::new()));
        let recv = changes.clone();
        model.signals().row_changed.connect(move |(path, _)| {
            recv.lock().push(path.clone());
        });

        // apple keeps its sort position; text edits don't move it.
        let apple = source.iter(&TreePath::from_indices(&[1])).unwrap();
        source.set_value(&apple, 0, Value::from("crabapple")).unwrap();
        assert_eq!(*changes.lock(), vec![TreePath::from_indices(&[0])]);
        assert_eq!(visible_texts(&model), ["crabapple", "quince", "pear"]);
    }

    #[test]
    fn test_edit_crossing_filter_boundary() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        model.set_filter(|source: &ListStore, iter: &TreeIter| {
            source.value(iter, 1).map(|v| v.as_int() >= Some(20)).unwrap_or(false)
        });
        assert_eq!(visible_texts(&model), ["pear", "quince"]);

        // apple 10 -> 50: crosses into visibility.
        let apple = source.iter(&TreePath::from_indices(&[1])).unwrap();
        source.set_value(&apple, 1, Value::from(50i64)).unwrap();
        assert_eq!(visible_texts(&model), ["pear", "apple", "quince"]);

        // pear 30 -> 0: drops out.
        let pear = source.iter(&TreePath::from_indices(&[0])).unwrap();
        source.set_value(&pear, 1, Value::from(0i64)).unwrap();
        assert_eq!(visible_texts(&model), ["apple", "quince"]);
    }

    #[test]
    fn test_source_reorder_follows_when_unsorted() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());

        let reorders = Arc::new(Mutex::new(Vec::new()));
        let recv = reorders.clone();
        model.signals().rows_reordered.connect(move |(_, order)| {
            recv.lock().push(order.clone());
        });

        source.reorder(&[2, 0, 1]).unwrap();
        assert_eq!(visible_texts(&model), ["quince", "pear", "apple"]);
        assert_eq!(*reorders.lock(), vec![vec![2, 0, 1]]);
    }

    #[test]
    fn test_source_reorder_is_silent_when_sorted() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        model.sort_by_column(0, SortOrder::Ascending);

        let count = Arc::new(Mutex::new(0usize));
        let recv = count.clone();
        model.signals().rows_reordered.connect(move |_| {
            *recv.lock() += 1;
        });

        source.reorder(&[2, 0, 1]).unwrap();
        assert_eq!(*count.lock(), 0);
        assert_eq!(visible_texts(&model), ["apple", "pear", "quince"]);
    }

    #[test]
    fn test_map_round_trip() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        model.sort_by_column(0, SortOrder::Ascending);

        let first = model.iter_first().unwrap();
        let source_iter = model.map_to_source(&first).unwrap();
        assert_eq!(source.value(&source_iter, 0).unwrap().as_str(), Some("apple"));

        let back = model.map_from_source(&source_iter).unwrap().unwrap();
        assert_eq!(model.path(&back).unwrap(), TreePath::from_indices(&[0]));
    }

    #[test]
    fn test_map_from_source_filtered_row_is_none() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        model.set_filter(|source: &ListStore, iter: &TreeIter| {
            source.value(iter, 1).map(|v| v.as_int() >= Some(20)).unwrap_or(false)
        });

        let apple = source.iter(&TreePath::from_indices(&[1])).unwrap();
        assert!(model.map_from_source(&apple).unwrap().is_none());
        assert_eq!(
            model.map_path_from_source(&TreePath::from_indices(&[1])).unwrap(),
            None
        );
    }

    #[test]
    fn test_visible_change_invalidates_wrapper_iterators() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        let first = model.iter_first().unwrap();

        source
            .append(vec![Value::from("banana"), Value::from(40i64)])
            .unwrap();
        assert!(!model.iter_is_valid(&first));
        assert!(matches!(
            model.value(&first, 0),
            Err(ModelError::InvalidIterator)
        ));
    }

    #[test]
    fn test_dropping_wrapper_disconnects_from_source() {
        let source = fruit_store();
        let model = SortFilterModel::new(source.clone());
        assert_eq!(source.signals().row_inserted.connection_count(), 1);
        drop(model);
        assert_eq!(source.signals().row_inserted.connection_count(), 0);
    }
}
