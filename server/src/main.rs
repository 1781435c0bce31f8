//! Authoritative combat server - headless Bevy app.
//!
//! Runs the fixed-tick simulation that resolves queued shots against the
//! arena and its combatants. No rendering; all output flows through the
//! combat log and impact queue.

mod colliders;
mod penetration;
mod systems;
mod trace;
mod weapons;
mod world;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::path::Path;

use shared::{load_tuning, tick_duration, CombatTuning};

use colliders::WorldColliders;
use weapons::{CombatLog, ImpactQueue, PendingShots};

/// Optional tuning override, relative to the workspace root.
const TUNING_PATH: &str = "server/assets/combat.toml";

fn main() {
    let mut app = App::new();

    // Headless plugins, main loop locked to the fixed tick.
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick_duration())));
    app.add_plugins(bevy::log::LogPlugin::default());
    app.insert_resource(Time::<Fixed>::from_hz(shared::TICK_RATE_HZ));

    // Combat tuning: TOML override when present, built-in defaults otherwise.
    let tuning = match load_tuning(Path::new(TUNING_PATH)) {
        Ok(tuning) => {
            info!("Loaded combat tuning from {TUNING_PATH}");
            tuning
        }
        Err(err) => {
            warn!("Using default combat tuning ({err})");
            CombatTuning::default()
        }
    };
    app.insert_resource(tuning);

    app.init_resource::<WorldColliders>();
    app.init_resource::<PendingShots>();
    app.init_resource::<CombatLog>();
    app.init_resource::<ImpactQueue>();

    app.add_systems(
        Startup,
        (world::setup_world, world::queue_demo_volley).chain(),
    );

    // Fixed tick: resolve queued shots, then run combatant upkeep and drain
    // the output queues for the downstream consumers.
    app.add_systems(
        FixedUpdate,
        (
            weapons::apply_shot_requests,
            systems::decay_flinch,
            systems::tick_respawns,
            systems::drain_combat_log,
            systems::drain_impacts,
        )
            .chain(),
    );

    info!("Starting combat server at {} Hz", shared::TICK_RATE_HZ);
    app.run();
}
