//! Shared data model and combat math for the authoritative simulation.
//!
//! Everything here is pure data or pure functions: material and weapon
//! tables, segment intersection primitives, the falloff/armor/flinch
//! formulas, and the tuning layer. World state and the resolution loop live
//! in the server crate.

pub mod combatant;
pub mod components;
pub mod materials;
pub mod spatial;
pub mod tuning;
pub mod weapons;

pub use combatant::{
    classify_hit, facing_right, head_center, BASE_MOVE_SPEED, BODY_HULL_INFLATION,
    COMBATANT_HEIGHT, COMBATANT_RADIUS, EYE_HEIGHT, HEAD_CENTER_HEIGHT, HEAD_HULL_INFLATION,
    HEAD_RADIUS,
};
pub use components::{
    AppliedDamage, ArmorState, BulletId, Combatant, CombatantPosition, CombatantRotation,
    DamageEvent, FlinchState, Health, Impact, ShotRequest, Team,
};
pub use materials::{SurfaceMaterial, SurfaceProfile};
pub use spatial::{segment_aabb, segment_sphere, segment_vertical_capsule, Aabb, SegmentHit};
pub use tuning::{
    load_tuning, parse_tuning, ArmorTuning, CombatTuning, FlinchTuning, PenetrationModel,
    PenetrationTuning, TuningError,
};
pub use weapons::damage::HitGroup;
pub use weapons::{AmmoClass, AmmoProfile, AmmoType, WeaponStats, WeaponType};

use std::time::Duration;

/// Fixed simulation rate of the authoritative server.
pub const TICK_RATE_HZ: f64 = 64.0;

/// Duration of one fixed simulation tick.
pub fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / TICK_RATE_HZ)
}
