//! Host-side data the gravity components read from and write to.

pub mod rigidbody;
pub mod types;
pub mod volume;

pub use rigidbody::{BodyKind, PhysicsBody};
pub use types::{ForceMode, MassProperties, Transform, Velocity};
pub use volume::{InfluenceVolume, VolumeShape};
