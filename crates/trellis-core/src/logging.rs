//! Logging and debugging facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Use the constants in [`targets`] with `tracing` filter directives to
//! narrow output to one subsystem, e.g.
//! `RUST_LOG=trellis_model::store=trace`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "trellis_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Concrete store mutations (inserts, removals, reorders).
    pub const STORE: &str = "trellis_model::store";
    /// Sort/filter wrapper re-derivation.
    pub const SORT: &str = "trellis_model::sort";
    /// Row drag-and-drop transport.
    pub const DND: &str = "trellis_model::dnd";
}

/// A guard that tracks the duration of an operation via a tracing span.
///
/// The span stays active until the guard is dropped.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        let _span = PerfSpan::new("test_operation");
    }

    #[test]
    fn test_targets_are_distinct() {
        let all = [
            targets::CORE,
            targets::SIGNAL,
            targets::STORE,
            targets::SORT,
            targets::DND,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
