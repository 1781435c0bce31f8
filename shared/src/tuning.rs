//! Combat tuning loaded from TOML.
//!
//! Every empirically tuned constant in the penetration/armor/flinch formulas
//! lives here so balance passes never require a recompile. Missing fields in
//! the TOML fall back to the built-in defaults, so a tuning file only needs
//! to name the values it overrides.

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Tuning file loading error
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which penetration damage model to run.
///
/// `Standard` is the canonical model. `Legacy` is the older power-budget
/// formula, kept selectable for A/B balance comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PenetrationModel {
    #[default]
    Standard,
    Legacy,
}

/// Root tuning resource for the combat resolution engine.
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub penetration: PenetrationTuning,
    pub armor: ArmorTuning,
    pub flinch: FlinchTuning,
}

/// Trace and penetration constants.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PenetrationTuning {
    pub model: PenetrationModel,
    /// Hard cap on surfaces one bullet may pass through.
    pub max_penetrations: u32,
    /// Residual damage below which the bullet is considered spent.
    pub min_damage: f32,
    /// Distance over which the weapon's range modifier is applied once.
    pub falloff_reference_distance: f32,
    /// Obstructions thicker than this always stop the bullet (world units).
    pub max_obstruction_thickness: f32,
    /// Fraction of current damage lost on impact with a penetrable surface.
    pub impact_damage_fraction: f32,
    /// Numerator of the ammo-power impact loss term.
    pub power_loss_base: f32,
    /// Scale of the ammo-power impact loss term.
    pub power_loss_scale: f32,
    /// Scale applied to the inverse material modifier in the impact loss.
    pub modifier_loss_scale: f32,
    /// Divisor of the squared-thickness loss term.
    pub thickness_divisor: f32,
    /// Penetration modifier forced for grate/no-draw class surfaces.
    pub grate_modifier: f32,
    /// Penetration modifier floor for same-class wood/plastic traversals
    /// (hollow-object heuristic).
    pub hollow_modifier: f32,
    /// How far past the world impact point combatant hit-volumes are still
    /// searched (world units).
    pub extended_hull_reach: f32,
    /// Scale from raw damage to impact impulse magnitude.
    pub impulse_scale: f32,
}

impl Default for PenetrationTuning {
    fn default() -> Self {
        Self {
            model: PenetrationModel::Standard,
            max_penetrations: 4,
            min_damage: 1.0,
            falloff_reference_distance: 500.0,
            max_obstruction_thickness: 90.0,
            impact_damage_fraction: 0.15,
            power_loss_base: 3.0,
            power_loss_scale: 1.25,
            modifier_loss_scale: 3.0,
            thickness_divisor: 24.0,
            grate_modifier: 3.0,
            hollow_modifier: 3.0,
            extended_hull_reach: 40.0,
            impulse_scale: 4.0,
        }
    }
}

/// Armor and hit-group constants.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorTuning {
    pub max_armor: i32,
    /// Base fraction of damage that reaches health through armor; multiplied
    /// by the weapon's own armor ratio.
    pub armor_ratio_base: f32,
    /// Fraction of the blocked damage charged to the armor pool.
    pub armor_bonus: f32,
    /// Replacement armor bonus while heavy armor is worn.
    pub heavy_armor_bonus: f32,
    /// Armor ratio scale while heavy armor is worn.
    pub heavy_armor_ratio_scale: f32,
    /// Head damage scale while heavy armor is worn.
    pub heavy_armor_head_scale: f32,
    pub head_multiplier: f32,
    pub stomach_multiplier: f32,
    pub leg_multiplier: f32,
    /// Per-team head damage scale, indexed by [`Team`](crate::Team).
    pub head_damage_scale: [f32; 2],
    pub body_damage_scale: f32,
}

impl Default for ArmorTuning {
    fn default() -> Self {
        Self {
            max_armor: 100,
            armor_ratio_base: 0.5,
            armor_bonus: 0.5,
            heavy_armor_bonus: 0.33,
            heavy_armor_ratio_scale: 0.5,
            heavy_armor_head_scale: 0.5,
            head_multiplier: 4.0,
            stomach_multiplier: 1.25,
            leg_multiplier: 0.75,
            head_damage_scale: [1.0, 1.0],
            body_damage_scale: 1.0,
        }
    }
}

/// Tagging (flinch) constants.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FlinchTuning {
    /// Recovery toward a scalar of 1.0, per second.
    pub decay_per_second: f32,
    /// Lowest movement scalar tagging may ever impose.
    pub min_scalar: f32,
    /// Health damage at which a hit counts as fully "heavy" and applies the
    /// weapon's large flinch magnitude.
    pub heavy_damage: f32,
    /// Extra flinch magnitude per point of grenade damage.
    pub grenade_damage_scale: f32,
    /// Cap on the grenade-scaled flinch magnitude.
    pub grenade_cap: f32,
}

impl Default for FlinchTuning {
    fn default() -> Self {
        Self {
            decay_per_second: 0.35,
            min_scalar: 0.1,
            heavy_damage: 20.0,
            grenade_damage_scale: 0.01,
            grenade_cap: 1.5,
        }
    }
}

/// Load combat tuning from a TOML file.
pub fn load_tuning(path: &Path) -> Result<CombatTuning, TuningError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Parse combat tuning from a TOML string.
pub fn parse_tuning(content: &str) -> Result<CombatTuning, TuningError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipping_values() {
        let tuning = CombatTuning::default();
        assert_eq!(tuning.penetration.max_penetrations, 4);
        assert!((tuning.penetration.impact_damage_fraction - 0.15).abs() < f32::EPSILON);
        assert!((tuning.penetration.thickness_divisor - 24.0).abs() < f32::EPSILON);
        assert!((tuning.flinch.decay_per_second - 0.35).abs() < f32::EPSILON);
        assert_eq!(tuning.armor.max_armor, 100);
        assert_eq!(tuning.penetration.model, PenetrationModel::Standard);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml = r#"
[penetration]
max_penetrations = 2
model = "legacy"

[armor]
head_multiplier = 3.0
"#;
        let tuning = parse_tuning(toml).unwrap();
        assert_eq!(tuning.penetration.max_penetrations, 2);
        assert_eq!(tuning.penetration.model, PenetrationModel::Legacy);
        // untouched fields keep their defaults
        assert!((tuning.penetration.min_damage - 1.0).abs() < f32::EPSILON);
        assert!((tuning.armor.head_multiplier - 3.0).abs() < f32::EPSILON);
        assert!((tuning.armor.stomach_multiplier - 1.25).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let tuning = parse_tuning("").unwrap();
        assert_eq!(tuning.penetration.max_penetrations, 4);
        assert!((tuning.armor.armor_bonus - 0.5).abs() < f32::EPSILON);
    }
}
