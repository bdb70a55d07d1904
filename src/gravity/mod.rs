//! Gravity sources, attracted-body trackers, the influence tracking protocol
//! and dominant-gravity resolution.

pub mod coupling;
pub mod object;
pub mod resolver;
pub mod source;
pub mod tracking;

use serde::{Deserialize, Serialize};

pub use coupling::{MassAuthority, MassGravityCoupling};
pub use object::{GravityObject, RightingBlend, RightingState};
pub use resolver::{compute_dominant_gravity, self_right};
pub use source::{GravitySource, GravitySourceDesc};
pub use tracking::{InfluenceTracker, OverlapEvent, OverlapOutcome, RejectReason};

/// Lifecycle of a gravity component as driven by the host loop.
///
/// `init` yields `Initialized`; `enable`/`disable` toggle between `Enabled` and
/// `Disabled`; teardown removes the component altogether.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentState {
    #[default]
    Initialized,
    Enabled,
    Disabled,
}

impl ComponentState {
    pub fn is_enabled(self) -> bool {
        self == ComponentState::Enabled
    }
}
