//! Global configuration constants and the world configuration for Gravity Wells.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::ForceMode;
use crate::error::{GravityError, GravityResult};

/// Gravitational constant in game units (cm, kg, s), scaled up for playable masses.
pub const DEFAULT_GRAVITATIONAL_CONSTANT: f32 = 6.674e-5;

/// Earth surface gravity in cm/s², the unit of one g.
pub const EARTH_SURFACE_GRAVITY: f32 = 980.0;

/// Default ambient field: free space.
pub const DEFAULT_AMBIENT_GRAVITY: [f32; 3] = [0.0, 0.0, 0.0];

/// Default fixed tick (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Squared separation below which a source/body pair is skipped for the tick.
pub const DEFAULT_MIN_DISTANCE_SQUARED: f32 = 1e-6;

/// Angle (radians) under which a righting body counts as aligned.
pub const DEFAULT_ALIGNMENT_TOLERANCE: f32 = 1e-3;

/// Default per-tick self-righting blend fraction.
pub const DEFAULT_RIGHTING_STRENGTH: f32 = 0.5;

/// Default surface gravity of a new source (1 g).
pub const DEFAULT_SURFACE_GRAVITY: f32 = EARTH_SURFACE_GRAVITY;

/// Default surface radius of a new source.
pub const DEFAULT_SURFACE_RADIUS: f32 = 100.0;

/// Tunables shared by every component of a [`crate::GravityWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    pub gravitational_constant: f32,
    pub ambient_gravity: Vec3,
    pub time_step: f32,
    pub min_distance_squared: f32,
    pub alignment_tolerance: f32,
    pub force_mode: ForceMode,
    /// Let the built-in overlap monitor generate enter/exit signals.
    pub detect_overlaps: bool,
    /// Compute pair forces on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: DEFAULT_GRAVITATIONAL_CONSTANT,
            ambient_gravity: Vec3::from_array(DEFAULT_AMBIENT_GRAVITY),
            time_step: DEFAULT_TIME_STEP,
            min_distance_squared: DEFAULT_MIN_DISTANCE_SQUARED,
            alignment_tolerance: DEFAULT_ALIGNMENT_TOLERANCE,
            force_mode: ForceMode::Force,
            detect_overlaps: true,
            parallel: false,
        }
    }
}

impl GravityConfig {
    pub fn validate(&self) -> GravityResult<()> {
        positive_finite("gravitational_constant", self.gravitational_constant)?;
        if !self.ambient_gravity.is_finite() {
            return Err(GravityError::NonFiniteVector {
                field: "ambient_gravity",
            });
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(GravityError::InvalidTimeStep(self.time_step));
        }
        positive_finite("min_distance_squared", self.min_distance_squared)?;
        positive_finite("alignment_tolerance", self.alignment_tolerance)?;
        Ok(())
    }
}

fn positive_finite(field: &'static str, value: f32) -> GravityResult<()> {
    if !value.is_finite() {
        return Err(GravityError::NonFinite { field, value });
    }
    if value <= 0.0 {
        return Err(GravityError::NonPositive { field, value });
    }
    Ok(())
}
