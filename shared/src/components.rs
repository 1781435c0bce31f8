//! Shared ECS components and combat data types.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combatant::BASE_MOVE_SPEED;
use crate::materials::SurfaceMaterial;
use crate::weapons::damage::HitGroup;
use crate::weapons::WeaponType;

// =============================================================================
// COMBATANTS
// =============================================================================

/// Side a combatant fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Alpha,
    Bravo,
}

impl Team {
    /// Index into per-team tuning tables.
    pub fn index(&self) -> usize {
        match self {
            Team::Alpha => 0,
            Team::Bravo => 1,
        }
    }
}

/// Marker component for combatant entities.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Combatant {
    pub team: Team,
    /// Unencumbered movement speed (units per second).
    pub max_speed: f32,
}

impl Default for Combatant {
    fn default() -> Self {
        Self {
            team: Team::Alpha,
            max_speed: BASE_MOVE_SPEED,
        }
    }
}

/// Combatant feet position (capsule bottom center).
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct CombatantPosition(pub Vec3);

/// Combatant facing yaw in radians.
#[derive(Component, Clone, Copy, Debug, PartialEq, Default)]
pub struct CombatantRotation(pub f32);

// =============================================================================
// HEALTH & ARMOR
// =============================================================================

/// Integer hit-point pool for damageable entities.
#[derive(Component, Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            current: 100,
            max: 100,
        }
    }
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Apply a hit-point loss; returns true if this killed the entity.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.current = (self.current - amount).max(0);
        self.current == 0
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }
}

/// Worn armor: a vest pool plus helmet/heavy flags.
///
/// Reset on respawn by the spawning system; mutated only by damage
/// resolution.
#[derive(Component, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct ArmorState {
    pub armor: i32,
    pub has_helmet: bool,
    pub has_heavy_armor: bool,
}

impl ArmorState {
    pub fn full(max_armor: i32, helmet: bool) -> Self {
        Self {
            armor: max_armor,
            has_helmet: helmet,
            has_heavy_armor: false,
        }
    }
}

/// Movement-speed scalar from recent incoming damage (tagging).
///
/// 1.0 is unimpaired; hits push it down, time pulls it back. The movement
/// system multiplies the combatant's speed by this.
#[derive(Component, Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct FlinchState {
    pub scalar: f32,
}

impl Default for FlinchState {
    fn default() -> Self {
        Self { scalar: 1.0 }
    }
}

// =============================================================================
// SHOTS & DAMAGE
// =============================================================================

/// Identifies one physical discharge. All damage a single bullet deals
/// carries the same id, which is what multi-kill attribution keys on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BulletId {
    /// Global discharge sequence number.
    pub sequence: u32,
    /// Position in the weapon's recoil pattern when fired.
    pub recoil_index: u32,
}

impl BulletId {
    pub fn new(sequence: u32, recoil_index: u32) -> Self {
        Self {
            sequence,
            recoil_index,
        }
    }
}

/// One hitscan discharge handed to the resolution engine.
///
/// The firing collaborator owns cadence, recoil and spread generation; by the
/// time a request reaches the engine the spread offset is already decided.
/// Multi-pellet weapons enqueue one request per pellet.
#[derive(Clone, Copy, Debug)]
pub struct ShotRequest {
    pub origin: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// Precomputed spread offset along `right`.
    pub spread_x: f32,
    /// Precomputed spread offset along `up`.
    pub spread_y: f32,
    pub max_distance: f32,
    pub weapon: WeaponType,
    pub base_damage: f32,
    /// Exponential falloff base per reference distance.
    pub range_modifier: f32,
    /// Override of the ammo's penetration power, if any.
    pub penetration_budget: Option<f32>,
    /// Hard cap on surfaces this shot may pass through.
    pub max_penetrations: u32,
    pub attacker: Entity,
    pub bullet_id: BulletId,
}

impl ShotRequest {
    /// Build a request with the weapon's table values and no spread.
    pub fn from_weapon(
        attacker: Entity,
        weapon: WeaponType,
        origin: Vec3,
        forward: Vec3,
        right: Vec3,
        up: Vec3,
        bullet_id: BulletId,
    ) -> Self {
        let stats = weapon.stats();
        Self {
            origin,
            forward,
            right,
            up,
            spread_x: 0.0,
            spread_y: 0.0,
            max_distance: stats.max_distance,
            weapon,
            base_damage: stats.damage,
            range_modifier: stats.range_modifier,
            penetration_budget: None,
            max_penetrations: 4,
            attacker,
            bullet_id,
        }
    }
}

/// One victim's share of a resolved shot, before armor mitigation.
#[derive(Clone, Copy, Debug)]
pub struct DamageEvent {
    pub victim: Entity,
    pub attacker: Entity,
    pub weapon: WeaponType,
    /// In-flight damage at the victim, after falloff and penetration losses,
    /// before the hit-group multiplier and armor split.
    pub raw_damage: f32,
    pub hit_group: HitGroup,
    pub damage_bits: u32,
    pub bullet_id: BulletId,
    /// Impulse to hand the physics/ragdoll layer.
    pub force: Vec3,
    /// Number of surfaces the bullet crossed before this victim. 0 = direct.
    pub penetrations_so_far: u32,
}

/// A damage event after armor resolution, as reported to scoring and HUDs.
#[derive(Clone, Copy, Debug)]
pub struct AppliedDamage {
    pub event: DamageEvent,
    pub health_damage: i32,
    pub armor_damage: i32,
    pub remaining_health: i32,
    pub lethal: bool,
}

/// Terminal or penetration impact point, for the effects/decal layer.
#[derive(Clone, Copy, Debug)]
pub struct Impact {
    pub point: Vec3,
    pub normal: Vec3,
    pub material: SurfaceMaterial,
    /// The combatant struck, for flesh impacts.
    pub entity: Option<Entity>,
    pub bullet_id: BulletId,
}
