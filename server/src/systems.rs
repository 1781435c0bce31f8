//! Host-side combatant upkeep systems.
//!
//! These are the collaborators around the resolution engine: flinch recovery,
//! respawning (which resets all per-life combat state), and draining the
//! per-tick output queues on behalf of scoring and effects consumers.

use bevy::prelude::*;

use shared::weapons::tagging;
use shared::{
    ArmorState, CombatTuning, CombatantPosition, FlinchState, Health, TICK_RATE_HZ,
};

use crate::weapons::{CombatLog, ImpactQueue};

/// How long a dead combatant waits before respawning (seconds).
const RESPAWN_TIME: f32 = 4.0;

/// Height above the spawn point combatants re-enter at.
const SPAWN_POSITION: [f32; 3] = [0.0, 0.0, -800.0];

/// Component added to dead combatants while waiting to respawn.
#[derive(Component, Clone, Copy, Debug)]
pub struct RespawnTimer {
    pub time_remaining: f32,
}

impl Default for RespawnTimer {
    fn default() -> Self {
        Self {
            time_remaining: RESPAWN_TIME,
        }
    }
}

/// Relax every combatant's flinch scalar toward 1.0.
pub fn decay_flinch(tuning: Res<CombatTuning>, mut combatants: Query<&mut FlinchState>) {
    let dt = 1.0 / TICK_RATE_HZ as f32;
    for mut flinch in combatants.iter_mut() {
        tagging::decay(&mut flinch, dt, &tuning.flinch);
    }
}

/// Count down respawn timers and bring combatants back with fresh state.
///
/// Respawning is what resets health, armor and flinch; the resolution engine
/// itself never does.
pub fn tick_respawns(
    mut commands: Commands,
    tuning: Res<CombatTuning>,
    mut dead: Query<(
        Entity,
        &mut RespawnTimer,
        &mut Health,
        &mut ArmorState,
        &mut FlinchState,
        &mut CombatantPosition,
    )>,
) {
    let dt = 1.0 / TICK_RATE_HZ as f32;
    for (entity, mut timer, mut health, mut armor, mut flinch, mut position) in dead.iter_mut() {
        timer.time_remaining -= dt;
        if timer.time_remaining > 0.0 {
            continue;
        }

        *health = Health::new(health.max);
        *armor = ArmorState::full(tuning.armor.max_armor, true);
        *flinch = FlinchState::default();
        position.0 = Vec3::from_array(SPAWN_POSITION);
        commands.entity(entity).remove::<RespawnTimer>();

        info!("Respawned {:?}", entity);
    }
}

/// Report applied damage to the scoring collaborator (here: the log) and
/// clear the queue for the next tick.
pub fn drain_combat_log(mut log: ResMut<CombatLog>) {
    for applied in log.entries.drain(..) {
        info!(
            "{:?} -> {:?}: {:?} {} hp / {} armor (bullet {:?}, {} left{})",
            applied.event.attacker,
            applied.event.victim,
            applied.event.hit_group,
            applied.health_damage,
            applied.armor_damage,
            applied.event.bullet_id,
            applied.remaining_health,
            if applied.lethal { ", lethal" } else { "" },
        );
    }
}

/// Hand impact points to the effects collaborator (here: a debug trace) and
/// clear the queue for the next tick.
pub fn drain_impacts(mut impacts: ResMut<ImpactQueue>) {
    for impact in impacts.impacts.drain(..) {
        debug!(
            "impact {:?} at {:.1},{:.1},{:.1}",
            impact.material, impact.point.x, impact.point.y, impact.point.z
        );
    }
}
