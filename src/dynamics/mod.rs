//! Simulation dynamics: the attraction pass and body integration.

pub mod attraction;
pub mod integrator;

pub use attraction::{AttractionEngine, AttractionStats, PairForce, PairJob};
pub use integrator::Integrator;
