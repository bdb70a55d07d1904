//! Validation errors raised by configuration mutators and lifecycle calls.

use thiserror::Error;

use crate::utils::allocator::{BodyId, SourceId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GravityError {
    #[error("surface radius must be strictly positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("{field} must have finite components")]
    NonFiniteVector { field: &'static str },
    #[error("{field} must be strictly positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("mass must not be negative, got {0}")]
    NegativeMass(f32),
    #[error("surface gravity must not be negative, got {0}")]
    NegativeSurfaceGravity(f32),
    #[error("mass, surface gravity and surface radius cannot all be set; one is derived")]
    OverdeterminedCoupling,
    #[error("righting strength must lie in [0, 1], got {0}")]
    RightingStrengthOutOfRange(f32),
    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f32),
    #[error("unknown gravity source {0}")]
    UnknownSource(SourceId),
    #[error("unknown body {0}")]
    UnknownBody(BodyId),
}

pub type GravityResult<T> = Result<T, GravityError>;

/// Rejects NaN and infinities.
pub(crate) fn ensure_finite(field: &'static str, value: f32) -> GravityResult<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GravityError::NonFinite { field, value })
    }
}
