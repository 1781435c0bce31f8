//! Tagging: the movement-speed debuff applied to combatants under fire.
//!
//! The victim's [`FlinchState`] scalar multiplies their movement speed.
//! Hits push it down, time pulls it back toward 1.0. The movement system
//! consumes the scalar; this module only maintains it.

use crate::components::FlinchState;
use crate::tuning::FlinchTuning;
use crate::weapons::{AmmoClass, WeaponStats};

/// Apply one hit's flinch to the victim.
///
/// The flinch *magnitude* (fraction of speed removed) interpolates the
/// weapon's small and large coefficients by how heavy the hit was; grenade
/// blasts scale it further with damage. The resulting scalar multiplies into
/// the current one so rapid follow-up hits tighten the slow instead of
/// resetting it, floored by the speed the weapon guarantees its victim.
///
/// Returns the new scalar.
pub fn on_hit(
    flinch: &mut FlinchState,
    stats: &WeaponStats,
    ammo_class: AmmoClass,
    damage_to_health: f32,
    victim_max_speed: f32,
    tuning: &FlinchTuning,
) -> f32 {
    let heavy = (damage_to_health / tuning.heavy_damage).clamp(0.0, 1.0);
    let mut magnitude = stats.flinch_small + (stats.flinch_large - stats.flinch_small) * heavy;

    if ammo_class == AmmoClass::Grenade {
        magnitude = (magnitude * (1.0 + damage_to_health * tuning.grenade_damage_scale))
            .min(tuning.grenade_cap);
    }

    let candidate = (1.0 - magnitude).max(0.0);
    let combined = flinch.scalar * candidate;

    let floor = if victim_max_speed > 0.0 {
        (stats.min_tagged_speed / victim_max_speed).clamp(tuning.min_scalar, 1.0)
    } else {
        tuning.min_scalar
    };

    flinch.scalar = combined.max(floor).clamp(tuning.min_scalar, 1.0);
    flinch.scalar
}

/// Relax the flinch scalar toward 1.0 over `dt` seconds.
pub fn decay(flinch: &mut FlinchState, dt: f32, tuning: &FlinchTuning) {
    flinch.scalar =
        (flinch.scalar + tuning.decay_per_second * dt).clamp(tuning.min_scalar, 1.0);
}
