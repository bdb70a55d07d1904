//! Overlap detection between influence volumes and bodies.

pub mod overlap;

pub use overlap::OverlapMonitor;
