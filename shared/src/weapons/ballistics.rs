//! Hitscan ballistics math.
//!
//! Pure helpers used by the shot resolution loop: spread-offset direction
//! construction, incremental range falloff, and penetration budget charges.

use bevy::prelude::*;

/// Build the world-space bullet direction from a precomputed spread offset.
///
/// Spread generation (recoil patterns, inaccuracy) happens upstream; this
/// only composes the offset into the aim basis. Returns `Vec3::ZERO` for a
/// degenerate basis, which callers treat as a shot that resolves to nothing.
pub fn spread_direction(forward: Vec3, right: Vec3, up: Vec3, spread_x: f32, spread_y: f32) -> Vec3 {
    (forward + right * spread_x + up * spread_y).normalize_or_zero()
}

/// Apply exponential range falloff over one traced segment.
///
/// `damage' = damage * range_modifier^(distance / reference)`. Applied per
/// segment as distance accumulates, which composes to the same total as a
/// single end-of-flight application but lets every intermediate hit see the
/// correct in-flight damage.
pub fn apply_range_falloff(damage: f32, distance: f32, range_modifier: f32, reference: f32) -> f32 {
    if distance <= 0.0 || reference <= 0.0 {
        return damage;
    }
    damage * range_modifier.powf(distance / reference)
}

/// Penetration budget charged for crossing `thickness` of a material with the
/// given blended penetration modifier.
pub fn budget_charge(thickness: f32, blended_modifier: f32) -> f32 {
    if blended_modifier <= 0.0 {
        return f32::INFINITY;
    }
    thickness / blended_modifier
}
