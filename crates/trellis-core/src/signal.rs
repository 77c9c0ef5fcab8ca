//! Signal/slot system for Trellis.
//!
//! This module provides a type-safe signal/slot mechanism for change
//! notification. Models emit signals when their state changes, and connected
//! slots (callbacks) are invoked in response.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Emission Order and Re-entrancy
//!
//! Emission is synchronous: every connected slot runs on the emitting thread
//! before [`Signal::emit`] returns, in connection (attachment) order. The
//! connection list is snapshotted before the first slot runs, so a slot may
//! connect or disconnect slots on the same signal; such changes take effect
//! from the next emission. A slot that mutates the model it was called from
//! must re-fetch its iterators afterwards, since the store's generation
//! stamp may have changed.
//!
//! # Example
//!
//! ```
//! use trellis_core::Signal;
//!
//! // Create a signal that passes a string argument
//! let text_changed = Signal::<String>::new();
//!
//! // Connect a slot (closure)
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! // Emit the signal
//! text_changed.emit("Hello, World!".to_string());
//!
//! // Disconnect when done
//! text_changed.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke (Arc-wrapped so emission can snapshot it).
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
}

/// A type-safe signal that can have multiple connected slots.
///
/// Signals are the core of the observer pattern in Trellis. When a signal is
/// emitted, all connected slots are invoked synchronously with the provided
/// arguments, in attachment order.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments, or a tuple like `(String, i32)` for multiple
///   arguments.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let connection = Connection {
            slot: Arc::new(slot),
        };
        self.connections.lock().insert(connection)
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false`
    /// otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` will do nothing. This is useful
    /// during initialization or batch updates to prevent cascading
    /// notifications.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots.
    ///
    /// If the signal is blocked, this does nothing. Slots run in attachment
    /// order on the calling thread; the connection list is snapshotted
    /// first, so slots may connect or disconnect without deadlocking.
    #[tracing::instrument(skip_all, target = "trellis_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "trellis_core::signal", "signal blocked, skipping emit");
            return;
        }

        // Snapshot under the lock, invoke outside it.
        let slots: Vec<Arc<dyn Fn(&Args) + Send + Sync>> = {
            let connections = self.connections.lock();
            connections.values().map(|conn| conn.slot.clone()).collect()
        };
        tracing::trace!(
            target: "trellis_core::signal",
            connection_count = slots.len(),
            "emitting signal"
        );

        for slot in slots {
            slot(&args);
        }
    }
}

/// A connection guard that automatically disconnects when dropped.
///
/// This is useful for RAII-style connection management, ensuring connections
/// are cleaned up when the receiver goes out of scope. Created via
/// [`Signal::connect_scoped`].
///
/// # Example
///
/// ```
/// use trellis_core::Signal;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let signal = Signal::<i32>::new();
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _guard = signal.connect_scoped(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);  // counter = 42
/// }
/// signal.emit(43);  // Nothing happens - connection was dropped
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
pub struct ConnectionGuard<Args> {
    signal: *const Signal<Args>,
    id: ConnectionId,
}

impl<Args> Signal<Args> {
    /// Connect a slot with automatic disconnection when the guard is dropped.
    ///
    /// # Safety
    ///
    /// The returned guard holds a raw pointer to this signal. The signal must
    /// outlive the guard. Using `Arc<Signal<Args>>` is recommended for shared
    /// ownership.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            signal: self as *const Signal<Args>,
            id,
        }
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        // SAFETY: The signal pointer is valid if the guard is used correctly.
        // The caller must ensure the signal outlives the guard.
        unsafe {
            if !self.signal.is_null() {
                let _ = (*self.signal).disconnect(self.id);
            }
        }
    }
}

// SAFETY: ConnectionGuard is Send + Sync because:
// - The raw pointer `signal` is only dereferenced in `drop()`.
// - Signal<Args> itself is Send + Sync (uses Mutex internally for connections).
// - The ConnectionId is a simple Copy type (slotmap key).
// - The guard's safety contract (documented in `connect_scoped`) requires the
//   Signal to outlive the guard, which the caller must ensure.
unsafe impl<Args> Send for ConnectionGuard<Args> {}
unsafe impl<Args> Sync for ConnectionGuard<Args> {}

static_assertions::assert_impl_all!(Signal<i32>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionId: Send, Sync, Copy);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        let values = received.lock();
        assert_eq!(*values, vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let conn_id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(signal.disconnect(conn_id));
        signal.emit(2);

        let values = received.lock();
        assert_eq!(*values, vec![1]); // Only received before disconnect
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        signal.set_blocked(true);
        signal.emit(2); // Should be ignored
        signal.set_blocked(false);
        signal.emit(3);

        let values = received.lock();
        assert_eq!(*values, vec![1, 3]);
    }

    #[test]
    fn test_multiple_connections_in_order() {
        let signal = Signal::<String>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order_clone = order.clone();
            signal.connect(move |_| {
                order_clone.lock().push(i);
            });
        }

        assert_eq!(signal.connection_count(), 3);
        signal.emit("test".to_string());
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_disconnect_all() {
        let signal = Signal::<()>::new();

        for _ in 0..5 {
            signal.connect(|_| {});
        }

        assert_eq!(signal.connection_count(), 5);
        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_connection_guard() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        {
            let received_clone = received.clone();
            let _guard = signal.connect_scoped(move |&value| {
                received_clone.lock().push(value);
            });
            signal.emit(1);
        } // Guard dropped here, connection should be removed

        signal.emit(2); // Should not be received

        let values = received.lock();
        assert_eq!(*values, vec![1]);
    }

    #[test]
    fn test_reentrant_disconnect_from_slot() {
        // A slot may disconnect connections on the signal it was emitted
        // from; the snapshot makes this safe.
        let signal = Arc::new(Signal::<()>::new());
        let fired = Arc::new(Mutex::new(0));

        let signal_clone = signal.clone();
        let fired_clone = fired.clone();
        signal.connect(move |_| {
            *fired_clone.lock() += 1;
            signal_clone.disconnect_all();
        });

        signal.emit(());
        signal.emit(());

        assert_eq!(*fired.lock(), 1);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_signal_with_multiple_args() {
        let signal = Signal::<(String, i32)>::new();
        let received = Arc::new(Mutex::new(None));

        let received_clone = received.clone();
        signal.connect(move |args| {
            *received_clone.lock() = Some(args.clone());
        });

        signal.emit(("hello".to_string(), 42));

        let value = received.lock().clone();
        assert_eq!(value, Some(("hello".to_string(), 42)));
    }
}
