//! Tree and list data models for Trellis.
//!
//! This crate implements the model half of a model/view split: stores own
//! rows of typed values, views observe them through a polymorphic protocol
//! and four change signals. Views never reach into store internals; stores
//! never know what is displaying them.
//!
//! # Core Types
//!
//! - [`TreePath`]: a row's position as a sequence of sibling indices
//! - [`TreeIter`]: an opaque, generation-checked handle to a row
//! - [`Value`] / [`ValueType`]: the typed cell payloads and column schema
//! - [`TreeModel`]: the trait stores and wrappers implement
//! - [`ModelSignals`]: the change notifications views subscribe to
//!
//! # Stores
//!
//! - [`ListStore`]: a flat, ordered row store
//! - [`TreeStore`]: a hierarchical row store of arbitrary depth
//! - [`SortFilterModel`]: wraps any model, presenting it sorted/filtered
//!
//! # Example
//!
//! ```
//! use trellis_model::{ListStore, TreeModel, Value, ValueType};
//!
//! let store = ListStore::new(vec![ValueType::String, ValueType::Int]);
//!
//! store.signals().row_inserted.connect(|(path, _iter)| {
//!     println!("row inserted at {path}");
//! });
//!
//! let iter = store.append(vec![Value::from("apple"), Value::from(3)]).unwrap();
//! assert_eq!(store.value(&iter, 0).unwrap().as_str(), Some("apple"));
//! ```
//!
//! # Iterator discipline
//!
//! Every structural mutation (insert, remove, reorder, clear) advances the
//! owning store's generation stamp, invalidating all previously obtained
//! [`TreeIter`]s; a value-only edit does not. Stale handles fail with
//! [`ModelError::InvalidIterator`] instead of reading the wrong row. A
//! signal handler that mutates the model it was called from must re-fetch
//! its iterators afterwards for the same reason.

pub mod dnd;
pub mod iter;
pub mod list_store;
pub mod model;
pub mod path;
pub mod sort;
pub mod tree_store;
pub mod value;

pub use dnd::{drag_data_delete, RowDragData};
pub use iter::{ModelId, TreeIter};
pub use list_store::ListStore;
pub use model::{ModelSignals, TreeModel};
pub use path::TreePath;
pub use sort::{CompareFn, FilterFn, SortFilterModel, SortOrder};
pub use tree_store::TreeStore;
pub use value::{Value, ValueType};

pub use trellis_core::{ModelError, Result};
