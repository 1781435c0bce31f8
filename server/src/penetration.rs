//! Penetration resolution: whether and how a bullet continues past a hit.
//!
//! Given the entry intersection of a segment, find the exit face of the
//! obstruction, blend the entry/exit material modifiers, charge the damage
//! and penetration budgets, and decide whether the shot carries on.

use bevy::prelude::*;

use shared::weapons::ballistics::budget_charge;
use shared::{AmmoProfile, PenetrationModel, PenetrationTuning, SurfaceMaterial};

use crate::colliders::WorldColliders;
use crate::trace::TraceHit;

/// How far past the exit face the embedded-exit probe sits.
const EXIT_PROBE_OFFSET: f32 = 0.25;

/// A successful penetration: where the bullet re-enters the world and what
/// it has left.
#[derive(Clone, Copy, Debug)]
pub struct PenetrationOutcome {
    pub exit_point: Vec3,
    pub thickness: f32,
    pub new_damage: f32,
    pub new_budget: f32,
}

/// Blend entry and exit material penetration modifiers.
///
/// Differing classes average; grate/glass/no-draw force a near-total
/// pass-through; a same-class wood/plastic pair is treated as a hollow
/// object and gets the penetration bonus.
fn blended_penetration_modifier(
    entry: SurfaceMaterial,
    exit: SurfaceMaterial,
    tuning: &PenetrationTuning,
) -> f32 {
    let mut modifier = if entry == exit {
        entry.profile().penetration_modifier
    } else {
        0.5 * (entry.profile().penetration_modifier + exit.profile().penetration_modifier)
    };

    if entry.is_pass_through() || exit.is_pass_through() {
        modifier = modifier.max(tuning.grate_modifier);
    }
    if entry == exit && entry.is_hollow_candidate() {
        modifier = modifier.max(tuning.hollow_modifier);
    }
    modifier
}

fn blended_damage_modifier(entry: SurfaceMaterial, exit: SurfaceMaterial) -> f32 {
    if entry == exit {
        entry.profile().damage_modifier
    } else {
        0.5 * (entry.profile().damage_modifier + exit.profile().damage_modifier)
    }
}

/// Damage surviving a traversal under the canonical loss model.
///
/// `impact_loss = damage*f + max(0, base/power)*scale * (1/modifier)*mod_scale`
/// `thickness_loss = (1/modifier) * thickness^2 / divisor`
pub fn standard_penetration_damage(
    damage: f32,
    penetration_power: f32,
    blended_modifier: f32,
    thickness: f32,
    tuning: &PenetrationTuning,
) -> f32 {
    if blended_modifier <= 0.0 || penetration_power <= 0.0 {
        return 0.0;
    }
    let inverse_modifier = (1.0 / blended_modifier).max(0.0);
    let impact_loss = damage * tuning.impact_damage_fraction
        + (tuning.power_loss_base / penetration_power).max(0.0)
            * tuning.power_loss_scale
            * (inverse_modifier * tuning.modifier_loss_scale);
    let thickness_loss = inverse_modifier * thickness * thickness / tuning.thickness_divisor;
    damage - (impact_loss + thickness_loss)
}

/// Resolve whether the bullet continues past the given hit.
///
/// Returns None when the shot stops here: obstruction too thick or embedded
/// in further solid geometry, material not penetrable, residual damage below
/// the epsilon, penetration budget spent, or total travel past the ammo's
/// penetration range. A None is a normal termination, never an error.
pub fn resolve_penetration(
    colliders: &WorldColliders,
    hit: &TraceHit,
    start: Vec3,
    dir: Vec3,
    ammo: &AmmoProfile,
    damage: f32,
    budget: f32,
    distance_so_far: f32,
    tuning: &PenetrationTuning,
) -> Option<PenetrationOutcome> {
    if distance_so_far > ammo.penetration_range {
        return None;
    }

    let (entry_material, entry_t, exit_t, exit_material) = match hit {
        TraceHit::Surface(world_hit) => {
            let entry = world_hit.material;
            if !entry.profile().penetrable {
                return None;
            }
            let (exit_t, exit_material) =
                colliders.obstruction_exit(start, dir, world_hit, tuning.max_obstruction_thickness)?;
            (entry, world_hit.t_enter, exit_t, exit_material)
        }
        TraceHit::Combatant {
            t_enter, t_exit, ..
        } => (SurfaceMaterial::Flesh, *t_enter, *t_exit, SurfaceMaterial::Flesh),
    };

    let thickness = exit_t - entry_t;
    if thickness > tuning.max_obstruction_thickness {
        return None;
    }

    let exit_point = start + dir * exit_t;
    if colliders.point_embedded(exit_point + dir * EXIT_PROBE_OFFSET) {
        return None;
    }

    let blended = blended_penetration_modifier(entry_material, exit_material, tuning);

    let new_damage = match tuning.model {
        PenetrationModel::Standard => standard_penetration_damage(
            damage,
            ammo.penetration_power,
            blended,
            thickness,
            tuning,
        ),
        // Historical variant: material keeps a fraction of the damage and the
        // power budget pays for the distance crossed.
        PenetrationModel::Legacy => damage * blended_damage_modifier(entry_material, exit_material),
    };
    if new_damage < tuning.min_damage {
        return None;
    }

    let new_budget = budget - budget_charge(thickness, blended);
    if new_budget <= 0.0 {
        return None;
    }

    Some(PenetrationOutcome {
        exit_point,
        thickness,
        new_damage,
        new_budget,
    })
}
