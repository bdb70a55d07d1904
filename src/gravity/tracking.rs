//! Influence tracking protocol.
//!
//! Keeps two mirrored maps, `source -> bodies inside its volume` and
//! `body -> sources whose volume it is inside`. Both are mutated only here,
//! inside the same call, so they cannot diverge.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::source::GravitySource;
use crate::core::rigidbody::PhysicsBody;
use crate::utils::allocator::{BodyId, SourceId};

/// Volume-overlap signal delivered by the host broadphase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapEvent {
    Begin { source: SourceId, body: BodyId },
    End { source: SourceId, body: BodyId },
}

/// Why a begin signal did not start tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The overlapping body has no dynamic-physics representation.
    NoDynamicBody,
    /// The overlapping body belongs to the source itself.
    SelfOverlap,
    /// The source is not enabled and is not listening for overlaps.
    SourceInactive,
    /// The source has no influence volume to overlap with.
    NoInfluenceVolume,
}

/// Result of delivering one overlap signal. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapOutcome {
    Added,
    AlreadyTracked,
    Removed,
    NotTracked,
    Rejected(RejectReason),
}

#[derive(Debug, Default)]
pub struct InfluenceTracker {
    bodies_by_source: HashMap<SourceId, HashSet<BodyId>>,
    sources_by_body: HashMap<BodyId, HashSet<SourceId>>,
}

impl InfluenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles an overlap-begin between `source`'s volume and `body_id`.
    pub fn begin_overlap(
        &mut self,
        source: &GravitySource,
        body_id: BodyId,
        body: Option<&PhysicsBody>,
    ) -> OverlapOutcome {
        if !source.is_enabled() {
            return OverlapOutcome::Rejected(RejectReason::SourceInactive);
        }
        if source.volume().is_none() {
            return OverlapOutcome::Rejected(RejectReason::NoInfluenceVolume);
        }
        if !body.map(PhysicsBody::is_simulated).unwrap_or(false) {
            return OverlapOutcome::Rejected(RejectReason::NoDynamicBody);
        }
        if source.owns_body(body_id) {
            return OverlapOutcome::Rejected(RejectReason::SelfOverlap);
        }

        let source_id = source.id();
        let inserted = self
            .bodies_by_source
            .entry(source_id)
            .or_default()
            .insert(body_id);
        self.sources_by_body
            .entry(body_id)
            .or_default()
            .insert(source_id);

        if inserted {
            debug!("{body_id} entered gravity of {source_id}");
            OverlapOutcome::Added
        } else {
            debug!("duplicate enter of {body_id} into {source_id} ignored");
            OverlapOutcome::AlreadyTracked
        }
    }

    /// Handles an overlap-end. An end without a matching begin is a no-op.
    pub fn end_overlap(&mut self, source: SourceId, body: BodyId) -> OverlapOutcome {
        let removed = remove_entry(&mut self.bodies_by_source, source, body);
        remove_entry(&mut self.sources_by_body, body, source);

        if removed {
            debug!("{body} exited gravity of {source}");
            OverlapOutcome::Removed
        } else {
            debug!("exit of untracked {body} from {source} ignored");
            OverlapOutcome::NotTracked
        }
    }

    /// Drops every pair involving `source`, bodies' side first. Returns the released bodies.
    pub fn detach_source(&mut self, source: SourceId) -> Vec<BodyId> {
        let mut released: Vec<BodyId> = self
            .bodies_by_source
            .get(&source)
            .map(|bodies| bodies.iter().copied().collect())
            .unwrap_or_default();
        released.sort();
        for body in &released {
            remove_entry(&mut self.sources_by_body, *body, source);
        }
        self.bodies_by_source.remove(&source);
        released
    }

    /// Drops every pair involving `body`.
    pub fn forget_body(&mut self, body: BodyId) -> Vec<SourceId> {
        let mut released: Vec<SourceId> = self
            .sources_by_body
            .get(&body)
            .map(|sources| sources.iter().copied().collect())
            .unwrap_or_default();
        released.sort();
        for source in &released {
            remove_entry(&mut self.bodies_by_source, *source, body);
        }
        self.sources_by_body.remove(&body);
        released
    }

    pub fn is_tracking(&self, source: SourceId, body: BodyId) -> bool {
        self.bodies_by_source
            .get(&source)
            .map(|bodies| bodies.contains(&body))
            .unwrap_or(false)
    }

    /// Copy of a source's tracked set in ascending id order, safe to hold while signals arrive.
    pub fn snapshot_bodies(&self, source: SourceId) -> Vec<BodyId> {
        let mut bodies: Vec<BodyId> = self
            .bodies_by_source
            .get(&source)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        bodies.sort();
        bodies
    }

    /// Sources currently influencing `body`, in ascending id order.
    pub fn sources_of(&self, body: BodyId) -> Vec<SourceId> {
        let mut sources: Vec<SourceId> = self
            .sources_by_body
            .get(&body)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        sources.sort();
        sources
    }

    pub fn is_influenced(&self, body: BodyId) -> bool {
        self.sources_by_body
            .get(&body)
            .map(|set| !set.is_empty())
            .unwrap_or(false)
    }

    pub fn pair_count(&self) -> usize {
        self.bodies_by_source.values().map(HashSet::len).sum()
    }

    /// Whether both maps describe exactly the same set of pairs.
    pub fn is_symmetric(&self) -> bool {
        let forward = self.bodies_by_source.iter().all(|(source, bodies)| {
            bodies.iter().all(|body| {
                self.sources_by_body
                    .get(body)
                    .map(|sources| sources.contains(source))
                    .unwrap_or(false)
            })
        });
        let backward = self.sources_by_body.iter().all(|(body, sources)| {
            sources.iter().all(|source| {
                self.bodies_by_source
                    .get(source)
                    .map(|bodies| bodies.contains(body))
                    .unwrap_or(false)
            })
        });
        forward && backward
    }
}

fn remove_entry<K, V>(map: &mut HashMap<K, HashSet<V>>, key: K, value: V) -> bool
where
    K: std::hash::Hash + Eq,
    V: std::hash::Hash + Eq,
{
    let Some(set) = map.get_mut(&key) else {
        return false;
    };
    let removed = set.remove(&value);
    if set.is_empty() {
        map.remove(&key);
    }
    removed
}
