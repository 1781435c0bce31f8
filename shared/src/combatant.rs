//! Combatant hit-volume constants and hit-group classification.
//!
//! World units: one combatant stands 72 units tall and moves at 250 units
//! per second at full speed.

use bevy::prelude::*;

use crate::weapons::damage::HitGroup;

/// Combatant capsule height (world units).
pub const COMBATANT_HEIGHT: f32 = 72.0;

/// Combatant capsule radius (world units).
pub const COMBATANT_RADIUS: f32 = 16.0;

/// Head sphere radius (world units).
pub const HEAD_RADIUS: f32 = 8.0;

/// Head sphere center height above the feet.
pub const HEAD_CENTER_HEIGHT: f32 = COMBATANT_HEIGHT - HEAD_RADIUS;

/// Eye height above the feet, where shots originate.
pub const EYE_HEIGHT: f32 = 64.0;

/// Unencumbered movement speed (units per second).
pub const BASE_MOVE_SPEED: f32 = 250.0;

/// Hit-volume inflation over the collision capsule. Hitboxes legitimately
/// poke out past the movement hull, so traces test a slightly fatter shape.
pub const BODY_HULL_INFLATION: f32 = 1.2;

/// Head sphere inflation for hit registration.
pub const HEAD_HULL_INFLATION: f32 = 1.25;

/// Center of the head sphere for a combatant standing at `bottom`.
pub fn head_center(bottom: Vec3) -> Vec3 {
    bottom + Vec3::new(0.0, HEAD_CENTER_HEIGHT, 0.0)
}

/// Facing-frame right vector for a combatant with the given yaw.
pub fn facing_right(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Classify a capsule hit into a hit-group.
///
/// Bands run by height relative to the feet; arms and legs split left/right
/// by the lateral offset of the impact in the victim's facing frame. Head
/// sphere hits are classified before this is consulted.
pub fn classify_hit(hit_point: Vec3, bottom: Vec3, yaw: f32) -> HitGroup {
    let relative_height = ((hit_point.y - bottom.y) / COMBATANT_HEIGHT).clamp(0.0, 1.0);
    let axis = Vec3::new(bottom.x, hit_point.y, bottom.z);
    let lateral = (hit_point - axis).dot(facing_right(yaw));
    let wide = lateral.abs() > COMBATANT_RADIUS * 0.65;

    if relative_height > 0.88 {
        HitGroup::Head
    } else if relative_height > 0.62 {
        if wide {
            // Victim's own left is the negative lateral side.
            if lateral < 0.0 {
                HitGroup::LeftArm
            } else {
                HitGroup::RightArm
            }
        } else {
            HitGroup::Chest
        }
    } else if relative_height > 0.44 {
        HitGroup::Stomach
    } else if lateral < 0.0 {
        HitGroup::LeftLeg
    } else {
        HitGroup::RightLeg
    }
}
