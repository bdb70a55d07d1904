use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ComponentState;
use crate::config::DEFAULT_RIGHTING_STRENGTH;
use crate::error::{ensure_finite, GravityError, GravityResult};
use crate::utils::math::exponential_blend;

/// How the per-tick self-righting fraction is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum RightingBlend {
    /// The righting strength is used as-is every tick; correction speed scales with tick rate.
    #[default]
    PerTick,
    /// Exponential approach with time constant `seconds`, independent of tick rate.
    TimeConstant { seconds: f32 },
}

/// Self-righting state of an attracted body, re-evaluated every fixed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RightingState {
    /// No gravity acts on the body (or righting is switched off).
    #[default]
    Stable,
    /// Gravity acts and the up axis is still off target.
    Correcting,
    /// Up axis is within the alignment tolerance of the target.
    Aligned,
}

/// Tracker component of an attracted body.
///
/// The set of sources influencing the body is owned by
/// [`crate::gravity::InfluenceTracker`]; this component carries the righting
/// configuration and the outputs of the last resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GravityObject {
    pub self_right: bool,
    righting_strength: f32,
    blend: RightingBlend,
    #[serde(skip)]
    pub(crate) righting_state: RightingState,
    #[serde(skip)]
    pub(crate) dominant_gravity: Vec3,
    #[serde(skip)]
    pub(crate) state: ComponentState,
}

impl Default for GravityObject {
    fn default() -> Self {
        Self {
            self_right: false,
            righting_strength: DEFAULT_RIGHTING_STRENGTH,
            blend: RightingBlend::PerTick,
            righting_state: RightingState::Stable,
            dominant_gravity: Vec3::ZERO,
            state: ComponentState::Initialized,
        }
    }
}

impl GravityObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker that rights itself with the given per-tick strength.
    pub fn self_righting(strength: f32) -> GravityResult<Self> {
        let mut object = Self {
            self_right: true,
            ..Self::default()
        };
        object.set_righting_strength(strength)?;
        Ok(object)
    }

    pub fn righting_strength(&self) -> f32 {
        self.righting_strength
    }

    pub fn set_righting_strength(&mut self, strength: f32) -> GravityResult<()> {
        ensure_finite("righting strength", strength)?;
        if !(0.0..=1.0).contains(&strength) {
            return Err(GravityError::RightingStrengthOutOfRange(strength));
        }
        self.righting_strength = strength;
        Ok(())
    }

    pub fn blend(&self) -> RightingBlend {
        self.blend
    }

    pub fn set_blend(&mut self, blend: RightingBlend) -> GravityResult<()> {
        if let RightingBlend::TimeConstant { seconds } = blend {
            ensure_finite("righting time constant", seconds)?;
            if seconds <= 0.0 {
                return Err(GravityError::NonPositive {
                    field: "righting time constant",
                    value: seconds,
                });
            }
        }
        self.blend = blend;
        Ok(())
    }

    /// Fraction of the remaining rotation applied during a tick of `dt` seconds.
    pub fn blend_fraction(&self, dt: f32) -> f32 {
        match self.blend {
            RightingBlend::PerTick => self.righting_strength,
            RightingBlend::TimeConstant { seconds } => exponential_blend(dt, seconds),
        }
    }

    pub fn righting_state(&self) -> RightingState {
        self.righting_state
    }

    /// Dominant gravity found by the last fixed tick.
    pub fn dominant_gravity(&self) -> Vec3 {
        self.dominant_gravity
    }

    pub fn state(&self) -> ComponentState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_outside_unit_interval_is_rejected() {
        let mut object = GravityObject::new();
        assert_eq!(
            object.set_righting_strength(1.5),
            Err(GravityError::RightingStrengthOutOfRange(1.5))
        );
        assert!(object.set_righting_strength(f32::NAN).is_err());
        assert_eq!(object.righting_strength(), DEFAULT_RIGHTING_STRENGTH);
        assert!(GravityObject::self_righting(-0.1).is_err());
    }

    #[test]
    fn blend_fraction_follows_mode() {
        let mut object = GravityObject::self_righting(0.2).unwrap();
        assert_eq!(object.blend_fraction(1.0 / 60.0), 0.2);

        object
            .set_blend(RightingBlend::TimeConstant { seconds: 0.5 })
            .unwrap();
        let coarse = object.blend_fraction(1.0 / 30.0);
        let fine = object.blend_fraction(1.0 / 60.0);
        assert!(coarse > fine);

        assert!(object
            .set_blend(RightingBlend::TimeConstant { seconds: 0.0 })
            .is_err());
    }
}
