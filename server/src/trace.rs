//! Combined world/combatant trajectory tracing.
//!
//! One trace answers: along this segment, what does the bullet touch first —
//! a world surface, or somebody's hit-volume? Combatant volumes are tested
//! slightly inflated and over a short reach past the world impact point, so a
//! near-miss on the coarse world trace can still register as a body hit.

use bevy::prelude::*;

use shared::{
    classify_hit, head_center, segment_sphere, segment_vertical_capsule, HitGroup,
    BODY_HULL_INFLATION, COMBATANT_HEIGHT, COMBATANT_RADIUS, HEAD_HULL_INFLATION, HEAD_RADIUS,
};

use crate::colliders::{WorldColliders, WorldHit};

/// A combatant's hit-volume, snapshotted for one resolution pass.
#[derive(Clone, Copy, Debug)]
pub struct TargetVolume {
    pub entity: Entity,
    /// Capsule bottom center (feet).
    pub bottom: Vec3,
    /// Facing yaw, for left/right hit-group lateralization.
    pub yaw: f32,
}

/// Nearest blocking intersection of one traced segment.
#[derive(Clone, Copy, Debug)]
pub enum TraceHit {
    Surface(WorldHit),
    Combatant {
        entity: Entity,
        t_enter: f32,
        t_exit: f32,
        point: Vec3,
        normal: Vec3,
        hit_group: HitGroup,
    },
}

impl TraceHit {
    pub fn t_enter(&self) -> f32 {
        match self {
            TraceHit::Surface(hit) => hit.t_enter,
            TraceHit::Combatant { t_enter, .. } => *t_enter,
        }
    }
}

/// Cast one segment against world geometry and combatant hit-volumes.
///
/// The shooter is never hit; `skip` excludes the combatant the previous
/// segment just exited so one bullet traverses a body at most once per
/// segment. `reach` extends the combatant search past the segment end when
/// nothing in the world was hit. Returns None for an unobstructed ray.
pub fn trace_segment(
    colliders: &WorldColliders,
    targets: &[TargetVolume],
    start: Vec3,
    dir: Vec3,
    length: f32,
    shooter: Entity,
    skip: Option<Entity>,
    reach: f32,
) -> Option<TraceHit> {
    let world = colliders.trace(start, dir, length);
    let world_t = world.as_ref().map(|h| h.t_enter);

    // Combatants are searched up to the wall (if any), otherwise slightly
    // past the end of the segment.
    let search_len = world_t.unwrap_or(length + reach);

    let mut best: Option<(f32, Entity, TraceHit)> = None;
    for target in targets {
        if target.entity == shooter || Some(target.entity) == skip {
            continue;
        }

        // Head sphere first, body capsule second (the head pokes out of the
        // capsule band and should win classification).
        let head = segment_sphere(
            start,
            dir,
            search_len,
            head_center(target.bottom),
            HEAD_RADIUS * HEAD_HULL_INFLATION,
        );
        let candidate = match head {
            Some(hit) => Some((hit, HitGroup::Head)),
            None => segment_vertical_capsule(
                start,
                dir,
                search_len,
                target.bottom,
                COMBATANT_HEIGHT,
                COMBATANT_RADIUS * BODY_HULL_INFLATION,
            )
            .map(|hit| {
                let point = start + dir * hit.t_enter;
                (hit, classify_hit(point, target.bottom, target.yaw))
            }),
        };

        let Some((hit, hit_group)) = candidate else {
            continue;
        };
        // Entity order breaks exact ties so resolution stays deterministic
        // regardless of snapshot order.
        let closer = match &best {
            Some((t, entity, _)) => {
                hit.t_enter < *t || (hit.t_enter == *t && target.entity < *entity)
            }
            None => true,
        };
        if closer {
            best = Some((
                hit.t_enter,
                target.entity,
                TraceHit::Combatant {
                    entity: target.entity,
                    t_enter: hit.t_enter,
                    t_exit: hit.t_exit,
                    point: start + dir * hit.t_enter,
                    normal: hit.normal,
                    hit_group,
                },
            ));
        }
    }

    match (best, world) {
        (Some((t, _, combatant_hit)), Some(world_hit)) => {
            if t < world_hit.t_enter {
                Some(combatant_hit)
            } else {
                Some(TraceHit::Surface(world_hit))
            }
        }
        (Some((_, _, combatant_hit)), None) => Some(combatant_hit),
        (None, Some(world_hit)) => Some(TraceHit::Surface(world_hit)),
        (None, None) => None,
    }
}
