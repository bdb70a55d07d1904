//! Utility helpers including math extensions, allocators, and logging.

pub mod allocator;
pub mod logging;
pub mod math;

pub use allocator::{Arena, ArenaKey, BodyId, GenerationalId, SourceId};
pub use math::*;
