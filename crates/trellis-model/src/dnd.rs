//! Row drag-and-drop transport.
//!
//! [`RowDragData`] is the payload a view hands to the platform drag
//! machinery when a row drag starts: the identity of the source model plus
//! the dragged row's path, flattened to bytes. The model core never talks
//! to the clipboard or drag transport itself; it only defines the payload
//! and its codec.

use trellis_core::{ModelError, Result};

use crate::iter::ModelId;
use crate::model::TreeModel;
use crate::path::TreePath;

/// Payload tag, so unrelated drops are rejected cheaply.
const MAGIC: &[u8; 4] = b"trow";
const FORMAT_VERSION: u8 = 1;

/// Length of magic, version byte, and little-endian model id.
const HEADER_LEN: usize = 4 + 1 + 8;

/// A dragged row: which model it came from and where it sat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowDragData {
    model: ModelId,
    path: TreePath,
}

impl RowDragData {
    /// Captures the drag payload for one row of `model`.
    pub fn for_row<M: TreeModel + ?Sized>(model: &M, path: TreePath) -> Self {
        Self {
            model: model.model_id(),
            path,
        }
    }

    /// The identity of the model the row was dragged from.
    pub fn model_id(&self) -> ModelId {
        self.model
    }

    /// The dragged row's path, valid in the source model at drag start.
    pub fn path(&self) -> &TreePath {
        &self.path
    }

    /// Returns `true` if this payload originated in `model`. Receivers use
    /// this to distinguish an internal reorder from a cross-model drop.
    pub fn is_from<M: TreeModel + ?Sized>(&self, model: &M) -> bool {
        self.model == model.model_id()
    }

    /// Flattens to the wire layout: magic, format version, little-endian
    /// model id, then the path in colon form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let path_text = self.path.to_string();
        let mut bytes = Vec::with_capacity(HEADER_LEN + path_text.len());
        bytes.extend_from_slice(MAGIC);
        bytes.push(FORMAT_VERSION);
        bytes.extend_from_slice(&self.model.as_u64().to_le_bytes());
        bytes.extend_from_slice(path_text.as_bytes());
        bytes
    }

    /// Parses a payload produced by [`to_bytes`](Self::to_bytes).
    ///
    /// Anything malformed, truncated, or of a foreign target type fails
    /// with `BadFormat`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() <= HEADER_LEN {
            return Err(ModelError::BadFormat);
        }
        if &bytes[..4] != MAGIC || bytes[4] != FORMAT_VERSION {
            tracing::trace!(target: "trellis_model::dnd", len = bytes.len(), "foreign drag payload rejected");
            return Err(ModelError::BadFormat);
        }
        let mut raw_id = [0u8; 8];
        raw_id.copy_from_slice(&bytes[5..HEADER_LEN]);
        let path_text =
            std::str::from_utf8(&bytes[HEADER_LEN..]).map_err(|_| ModelError::BadFormat)?;
        Ok(Self {
            model: ModelId::from_raw(u64::from_le_bytes(raw_id)),
            path: TreePath::from_string(path_text)?,
        })
    }
}

/// Source-side deletion hook for the row-reordering pattern.
///
/// Deliberately does nothing: in row drag-and-drop the destination performs
/// the actual move, so an automatic source-side delete would remove the row
/// twice. A source that wants move-not-copy semantics removes the dragged
/// row explicitly in its drop handler instead.
pub fn drag_data_delete<M: TreeModel + ?Sized>(_model: &M, _path: &TreePath) {}
