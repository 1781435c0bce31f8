//! Weapon and ammunition data tables.
//!
//! Static stats keyed by weapon type. Ammunition carries the penetration
//! characteristics; the weapon carries damage, falloff, armor and flinch
//! coefficients.

pub mod ballistics;
pub mod damage;
pub mod tagging;

use serde::{Deserialize, Serialize};

/// Behavior class of an ammunition type.
///
/// Dispatch on this instead of inspecting the firing weapon: pellets, blast
/// fragments and taser charges all flow through the same resolution path with
/// class-specific handling at the armor and flinch steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmoClass {
    Bullet,
    Buckshot,
    Grenade,
    Taser,
    Melee,
}

/// Available ammunition types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmoType {
    NineMil,
    FiveFiveSix,
    SevenSixTwo,
    Magnum338,
    Buckshot,
    /// Grenade fragmentation, resolved as radial hits by the blast system.
    Shrapnel,
    TaserCharge,
    Blade,
}

/// Penetration characteristics of an ammunition type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmmoProfile {
    /// Capacity to pass through obstructions, consumed as it penetrates.
    pub penetration_power: f32,
    /// Beyond this total travel distance penetration is no longer considered.
    pub penetration_range: f32,
    pub class: AmmoClass,
}

impl AmmoType {
    /// Static profile lookup for this ammunition type.
    pub fn profile(&self) -> AmmoProfile {
        match self {
            AmmoType::NineMil => AmmoProfile {
                penetration_power: 100.0,
                penetration_range: 1000.0,
                class: AmmoClass::Bullet,
            },
            AmmoType::FiveFiveSix => AmmoProfile {
                penetration_power: 200.0,
                penetration_range: 3000.0,
                class: AmmoClass::Bullet,
            },
            AmmoType::SevenSixTwo => AmmoProfile {
                penetration_power: 250.0,
                penetration_range: 3000.0,
                class: AmmoClass::Bullet,
            },
            AmmoType::Magnum338 => AmmoProfile {
                penetration_power: 300.0,
                penetration_range: 4000.0,
                class: AmmoClass::Bullet,
            },
            AmmoType::Buckshot => AmmoProfile {
                penetration_power: 30.0,
                penetration_range: 500.0,
                class: AmmoClass::Buckshot,
            },
            AmmoType::Shrapnel => AmmoProfile {
                penetration_power: 1.0,
                penetration_range: 0.0,
                class: AmmoClass::Grenade,
            },
            AmmoType::TaserCharge => AmmoProfile {
                penetration_power: 1.0,
                penetration_range: 0.0,
                class: AmmoClass::Taser,
            },
            AmmoType::Blade => AmmoProfile {
                penetration_power: 1.0,
                penetration_range: 0.0,
                class: AmmoClass::Melee,
            },
        }
    }
}

/// Available weapon types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponType {
    #[default]
    Pistol,
    Smg,
    AssaultRifle,
    Sniper,
    Shotgun,
    Knife,
    Taser,
    FragGrenade,
}

/// Complete combat stats for a weapon type.
#[derive(Clone, Debug)]
pub struct WeaponStats {
    /// Base damage per bullet (per pellet for shotguns).
    pub damage: f32,
    /// Exponential falloff base per reference distance, < 1.0.
    pub range_modifier: f32,
    /// Fraction of damage that passes armor, before the global armor ratio.
    pub armor_ratio: f32,
    /// Flinch magnitude for light hits (fraction of speed removed).
    pub flinch_small: f32,
    /// Flinch magnitude for heavy hits.
    pub flinch_large: f32,
    /// Speed this weapon always leaves its victim; high values mean the
    /// weapon barely tags at all.
    pub min_tagged_speed: f32,
    /// Maximum hitscan reach (world units).
    pub max_distance: f32,
    /// Number of pellets per discharge (1 for everything but shotguns).
    pub pellet_count: u32,
    pub ammo: AmmoType,
}

impl WeaponType {
    /// Get the stats for this weapon type
    pub fn stats(&self) -> WeaponStats {
        match self {
            WeaponType::Pistol => WeaponStats {
                damage: 35.0,
                range_modifier: 0.91,
                armor_ratio: 0.95,
                flinch_small: 0.1,
                flinch_large: 0.3,
                min_tagged_speed: 150.0,
                max_distance: 4096.0,
                pellet_count: 1,
                ammo: AmmoType::NineMil,
            },
            WeaponType::Smg => WeaponStats {
                damage: 27.0,
                range_modifier: 0.85,
                armor_ratio: 0.6,
                flinch_small: 0.12,
                flinch_large: 0.28,
                min_tagged_speed: 110.0,
                max_distance: 4096.0,
                pellet_count: 1,
                ammo: AmmoType::NineMil,
            },
            WeaponType::AssaultRifle => WeaponStats {
                damage: 33.0,
                range_modifier: 0.98,
                armor_ratio: 0.78,
                flinch_small: 0.15,
                flinch_large: 0.4,
                min_tagged_speed: 90.0,
                max_distance: 8192.0,
                pellet_count: 1,
                ammo: AmmoType::SevenSixTwo,
            },
            WeaponType::Sniper => WeaponStats {
                damage: 115.0,
                range_modifier: 0.99,
                armor_ratio: 0.975,
                flinch_small: 0.25,
                flinch_large: 0.5,
                min_tagged_speed: 70.0,
                max_distance: 8192.0,
                pellet_count: 1,
                ammo: AmmoType::Magnum338,
            },
            WeaponType::Shotgun => WeaponStats {
                damage: 26.0,
                range_modifier: 0.7,
                armor_ratio: 0.5,
                flinch_small: 0.08,
                flinch_large: 0.35,
                min_tagged_speed: 130.0,
                max_distance: 3000.0,
                pellet_count: 9,
                ammo: AmmoType::Buckshot,
            },
            WeaponType::Knife => WeaponStats {
                damage: 40.0,
                range_modifier: 0.99,
                armor_ratio: 0.85,
                flinch_small: 0.02,
                flinch_large: 0.08,
                // Melee-cadence weapon: victims keep almost all their speed.
                min_tagged_speed: 245.0,
                max_distance: 48.0,
                pellet_count: 1,
                ammo: AmmoType::Blade,
            },
            WeaponType::Taser => WeaponStats {
                damage: 500.0,
                range_modifier: 0.99,
                armor_ratio: 1.0,
                flinch_small: 0.0,
                flinch_large: 0.0,
                min_tagged_speed: 250.0,
                max_distance: 190.0,
                pellet_count: 1,
                ammo: AmmoType::TaserCharge,
            },
            WeaponType::FragGrenade => WeaponStats {
                damage: 98.0,
                range_modifier: 0.99,
                armor_ratio: 0.65,
                flinch_small: 0.2,
                flinch_large: 0.6,
                min_tagged_speed: 60.0,
                max_distance: 0.0,
                pellet_count: 1,
                ammo: AmmoType::Shrapnel,
            },
        }
    }

    /// Behavior class of this weapon's ammunition.
    pub fn ammo_class(&self) -> AmmoClass {
        self.stats().ammo.profile().class
    }
}

impl Default for WeaponStats {
    fn default() -> Self {
        WeaponType::Pistol.stats()
    }
}
