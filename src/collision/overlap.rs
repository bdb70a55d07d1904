use std::collections::{HashMap, HashSet};

use crate::{
    core::rigidbody::PhysicsBody,
    gravity::{source::GravitySource, tracking::OverlapEvent},
    utils::allocator::{Arena, BodyId, SourceId},
};

/// Trigger-style overlap detection between influence volumes and bodies.
///
/// Stands in for a host broadphase: it remembers which bodies were inside
/// each volume last tick and reports the difference as begin/end signals.
#[derive(Debug, Default)]
pub struct OverlapMonitor {
    inside: HashMap<SourceId, HashSet<BodyId>>,
}

impl OverlapMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs current overlaps against the previous tick.
    ///
    /// Static bodies and the source's own bodies never count as inside, so a
    /// body that becomes simulated while inside a volume is reported then.
    ///
    /// Events are ordered by source id, then ends before begins, then body id.
    pub fn detect(
        &mut self,
        sources: &Arena<SourceId, GravitySource>,
        bodies: &Arena<BodyId, PhysicsBody>,
    ) -> Vec<OverlapEvent> {
        let mut events = Vec::new();
        self.inside.retain(|id, _| sources.contains(*id));

        for (source_id, source) in sources.iter() {
            let volume = match (source.is_enabled(), source.volume()) {
                (true, Some(volume)) => volume,
                _ => {
                    self.inside.remove(&source_id);
                    continue;
                }
            };

            let owner = source.world_transform(bodies);
            let now: HashSet<BodyId> = bodies
                .iter()
                .filter(|(id, body)| {
                    body.is_simulated()
                        && !source.owns_body(*id)
                        && volume.overlaps_sphere(&owner, body.transform.position, body.radius)
                })
                .map(|(id, _)| id)
                .collect();

            let before = self.inside.remove(&source_id).unwrap_or_default();

            let mut ended: Vec<BodyId> = before.difference(&now).copied().collect();
            ended.sort();
            events.extend(ended.into_iter().map(|body| OverlapEvent::End {
                source: source_id,
                body,
            }));

            let mut began: Vec<BodyId> = now.difference(&before).copied().collect();
            began.sort();
            events.extend(began.into_iter().map(|body| OverlapEvent::Begin {
                source: source_id,
                body,
            }));

            self.inside.insert(source_id, now);
        }

        events
    }

    /// Drops the overlap memory of `source`; a later enable re-reports bodies already inside.
    pub fn forget_source(&mut self, source: SourceId) {
        self.inside.remove(&source);
    }

    pub fn forget_body(&mut self, body: BodyId) {
        for bodies in self.inside.values_mut() {
            bodies.remove(&body);
        }
    }
}
