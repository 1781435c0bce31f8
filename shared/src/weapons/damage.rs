//! Hit-group multipliers and the armor/health damage split.

use serde::{Deserialize, Serialize};

use crate::components::{ArmorState, Team};
use crate::tuning::ArmorTuning;
use crate::weapons::AmmoClass;

// =============================================================================
// DAMAGE TYPE BITS
// =============================================================================

/// Damage carried by bullets and pellets.
pub const DMG_BULLET: u32 = 1 << 1;
/// Blade damage.
pub const DMG_SLASH: u32 = 1 << 2;
/// Explosive blast damage.
pub const DMG_BLAST: u32 = 1 << 6;
/// Electrical damage. Ignores armor entirely.
pub const DMG_SHOCK: u32 = 1 << 8;
/// Falling damage. Ignores armor.
pub const DMG_FALL: u32 = 1 << 5;

/// Whether a damage type is mitigated by armor at all.
pub fn interacts_with_armor(damage_bits: u32) -> bool {
    damage_bits & (DMG_BULLET | DMG_SLASH | DMG_BLAST) != 0
}

impl AmmoClass {
    /// Damage type bits carried by hits of this ammunition class.
    pub fn damage_bits(&self) -> u32 {
        match self {
            AmmoClass::Bullet | AmmoClass::Buckshot => DMG_BULLET,
            AmmoClass::Grenade => DMG_BLAST,
            AmmoClass::Taser => DMG_SHOCK,
            AmmoClass::Melee => DMG_SLASH,
        }
    }
}

// =============================================================================
// HIT GROUPS
// =============================================================================

/// Body region a hit landed in, selecting its damage multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HitGroup {
    #[default]
    Generic,
    Head,
    Chest,
    Stomach,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl HitGroup {
    /// Whether a vest (plus helmet, for the head) covers this region.
    ///
    /// Legs are never armored.
    pub fn is_armored(&self, has_helmet: bool) -> bool {
        match self {
            HitGroup::Head => has_helmet,
            HitGroup::Generic | HitGroup::Chest | HitGroup::Stomach => true,
            HitGroup::LeftArm | HitGroup::RightArm => true,
            HitGroup::LeftLeg | HitGroup::RightLeg => false,
        }
    }
}

/// Scale raw damage by the hit-group multiplier.
///
/// Head hits take the big multiplier plus the per-team head scale, halved
/// under heavy armor. Everything else scales off the body constant.
pub fn hit_group_damage(
    raw: f32,
    group: HitGroup,
    team: Team,
    has_heavy_armor: bool,
    tuning: &ArmorTuning,
) -> f32 {
    match group {
        HitGroup::Head => {
            let mut damage = raw * tuning.head_multiplier * tuning.head_damage_scale[team.index()];
            if has_heavy_armor {
                damage *= tuning.heavy_armor_head_scale;
            }
            damage
        }
        HitGroup::Generic | HitGroup::Chest | HitGroup::LeftArm | HitGroup::RightArm => {
            raw * tuning.body_damage_scale
        }
        HitGroup::Stomach => raw * tuning.stomach_multiplier * tuning.body_damage_scale,
        HitGroup::LeftLeg | HitGroup::RightLeg => raw * tuning.leg_multiplier * tuning.body_damage_scale,
    }
}

// =============================================================================
// ARMOR SPLIT
// =============================================================================

/// Result of splitting one damage application between health and armor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmorOutcome {
    /// Integer hit-point loss to apply to the victim.
    pub health_damage: i32,
    /// Integer armor loss already applied to the armor state.
    pub armor_damage: i32,
    /// Whether this application depleted the armor to zero.
    pub armor_broken: bool,
}

/// Split scaled damage between the victim's health and armor pools.
///
/// Mutates `armor` in place: subtracts the absorbed damage, clamps to
/// `[0, max_armor]`, and strips helmet/heavy flags when the vest breaks.
/// Damage types that do not interact with armor pass straight to health.
pub fn resolve_armor(
    armor: &mut ArmorState,
    group: HitGroup,
    scaled_damage: f32,
    damage_bits: u32,
    weapon_armor_ratio: f32,
    tuning: &ArmorTuning,
) -> ArmorOutcome {
    let covered = interacts_with_armor(damage_bits)
        && armor.armor > 0
        && group.is_armored(armor.has_helmet);

    if !covered {
        return ArmorOutcome {
            health_damage: scaled_damage.round() as i32,
            armor_damage: 0,
            armor_broken: false,
        };
    }

    let mut ratio = tuning.armor_ratio_base * weapon_armor_ratio;
    let bonus = if armor.has_heavy_armor {
        ratio *= tuning.heavy_armor_ratio_scale;
        tuning.heavy_armor_bonus
    } else {
        tuning.armor_bonus
    };

    let current = armor.armor as f32;
    let mut to_health = scaled_damage * ratio;
    let mut to_armor = (scaled_damage - to_health) * bonus;

    // Not enough armor left to absorb its share: the rest leaks to health.
    if to_armor > current {
        to_health = scaled_damage - current / bonus;
        to_armor = current;
    }

    let armor_damage = (to_armor.round() as i32).min(armor.armor);
    armor.armor = (armor.armor - armor_damage).clamp(0, tuning.max_armor);

    let armor_broken = armor.armor == 0;
    if armor_broken {
        armor.has_helmet = false;
        armor.has_heavy_armor = false;
    }

    ArmorOutcome {
        health_damage: to_health.round() as i32,
        armor_damage,
        armor_broken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::CombatTuning;

    fn vest(armor: i32, helmet: bool) -> ArmorState {
        ArmorState {
            armor,
            has_helmet: helmet,
            has_heavy_armor: false,
        }
    }

    #[test]
    fn chest_hit_splits_between_health_and_armor() {
        // 38.4 raw, armor ratio 0.5 weapon * 0.5 base = 0.25:
        // 9.6 to health (rounds to 10), 14.4 to armor (rounds to 14).
        let tuning = CombatTuning::default();
        let mut armor = vest(100, false);
        let out = resolve_armor(&mut armor, HitGroup::Chest, 38.4, DMG_BULLET, 0.5, &tuning.armor);
        assert_eq!(out.health_damage, 10);
        assert_eq!(out.armor_damage, 14);
        assert_eq!(armor.armor, 86);
        assert!(!out.armor_broken);
    }

    #[test]
    fn uncovered_head_takes_the_full_multiplier() {
        let tuning = CombatTuning::default();
        let scaled = hit_group_damage(30.0, HitGroup::Head, Team::Alpha, false, &tuning.armor);
        assert!((scaled - 120.0).abs() < f32::EPSILON);

        // No helmet: armor is not consulted, everything goes to health.
        let mut armor = vest(100, false);
        let out = resolve_armor(&mut armor, HitGroup::Head, scaled, DMG_BULLET, 0.5, &tuning.armor);
        assert_eq!(out.health_damage, 120);
        assert_eq!(out.armor_damage, 0);
        assert_eq!(armor.armor, 100);
    }

    #[test]
    fn helmet_covers_the_head() {
        let tuning = CombatTuning::default();
        let mut armor = vest(100, true);
        let out = resolve_armor(&mut armor, HitGroup::Head, 120.0, DMG_BULLET, 0.5, &tuning.armor);
        assert!(out.health_damage < 120);
        assert!(out.armor_damage > 0);
    }

    #[test]
    fn legs_are_never_armored() {
        let tuning = CombatTuning::default();
        let mut armor = vest(100, true);
        let out =
            resolve_armor(&mut armor, HitGroup::LeftLeg, 20.0, DMG_BULLET, 0.5, &tuning.armor);
        assert_eq!(out.health_damage, 20);
        assert_eq!(armor.armor, 100);
    }

    #[test]
    fn depleting_armor_leaks_the_rest_to_health_and_strips_flags() {
        let tuning = CombatTuning::default();
        let mut armor = ArmorState {
            armor: 5,
            has_helmet: true,
            has_heavy_armor: false,
        };
        let out = resolve_armor(&mut armor, HitGroup::Chest, 80.0, DMG_BULLET, 1.0, &tuning.armor);
        assert_eq!(armor.armor, 0);
        assert_eq!(out.armor_damage, 5);
        assert!(out.armor_broken);
        assert!(!armor.has_helmet);
        // 80 - 5 / 0.5 = 70 to health.
        assert_eq!(out.health_damage, 70);
    }

    #[test]
    fn heavy_armor_absorbs_more_and_halves_head_damage() {
        let tuning = CombatTuning::default();
        let light = hit_group_damage(30.0, HitGroup::Head, Team::Bravo, false, &tuning.armor);
        let heavy = hit_group_damage(30.0, HitGroup::Head, Team::Bravo, true, &tuning.armor);
        assert!((heavy - light * 0.5).abs() < f32::EPSILON);

        let mut armor = ArmorState {
            armor: 100,
            has_helmet: true,
            has_heavy_armor: true,
        };
        let out = resolve_armor(&mut armor, HitGroup::Chest, 40.0, DMG_BULLET, 1.0, &tuning.armor);
        // ratio 0.5 * 1.0 * 0.5 = 0.25 -> 10 to health
        assert_eq!(out.health_damage, 10);
    }

    #[test]
    fn shock_damage_ignores_armor() {
        let tuning = CombatTuning::default();
        let mut armor = vest(100, true);
        let out = resolve_armor(&mut armor, HitGroup::Chest, 500.0, DMG_SHOCK, 1.0, &tuning.armor);
        assert_eq!(out.health_damage, 500);
        assert_eq!(armor.armor, 100);
    }

    #[test]
    fn armor_never_goes_negative() {
        let tuning = CombatTuning::default();
        let mut armor = vest(2, false);
        resolve_armor(&mut armor, HitGroup::Stomach, 500.0, DMG_BULLET, 1.0, &tuning.armor);
        assert!(armor.armor >= 0);
        assert!(armor.armor <= tuning.armor.max_armor);
    }
}
