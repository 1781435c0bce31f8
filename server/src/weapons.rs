//! Shot resolution: the full outcome of one firearm discharge.
//!
//! `resolve_shot` walks the bullet through the world: trace the next hit,
//! bleed damage over the distance flown, book damage against any combatant
//! struck, then ask the penetration resolver whether the bullet carries on.
//! Everything a shot did is collected first and applied once, after the loop
//! terminates, so a victim clipped twice by one bullet is damaged exactly
//! once.

use bevy::prelude::*;

use shared::weapons::{ballistics, damage, tagging};
use shared::{
    AppliedDamage, ArmorState, Combatant, CombatantPosition, CombatantRotation, CombatTuning,
    DamageEvent, FlinchState, Health, Impact, ShotRequest, SurfaceMaterial,
};

use crate::colliders::WorldColliders;
use crate::penetration::resolve_penetration;
use crate::systems::RespawnTimer;
use crate::trace::{trace_segment, TargetVolume, TraceHit};

/// Nudge past an exit face before the next trace so the bullet cannot
/// re-enter the surface it just left.
const RESTART_EPSILON: f32 = 0.03125;

/// Shots queued by the firing layer for resolution this tick.
#[derive(Resource, Default)]
pub struct PendingShots {
    pub shots: Vec<ShotRequest>,
}

/// Damage applied this tick, for the scoring/HUD layer.
#[derive(Resource, Default)]
pub struct CombatLog {
    pub entries: Vec<AppliedDamage>,
}

/// Impact points produced this tick, for the effects/decal layer.
#[derive(Resource, Default)]
pub struct ImpactQueue {
    pub impacts: Vec<Impact>,
}

/// Everything one shot did to the world, before application.
#[derive(Debug, Default)]
pub struct ShotResolution {
    /// Coalesced per-victim damage, in trace order.
    pub events: Vec<DamageEvent>,
    /// Every surface and body impact along the path, in trace order.
    pub impacts: Vec<Impact>,
}

/// Per-victim coalescing of damage contributions within one shot.
///
/// The extended hit-volume search can register the same victim more than
/// once while resolving a single discharge; raw damage sums, and the first
/// (nearest) contribution fixes the hit-group and penetration count.
#[derive(Debug)]
struct MultiDamage {
    entries: Vec<DamageEvent>,
}

impl MultiDamage {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn accumulate(&mut self, event: DamageEvent) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|entry| entry.victim == event.victim)
        {
            existing.raw_damage += event.raw_damage;
            existing.force += event.force;
        } else {
            self.entries.push(event);
        }
    }

    /// Hand out the coalesced events, preserving trace order.
    fn flush(self) -> Vec<DamageEvent> {
        self.entries
    }
}

/// Resolve one discharge against the world. Pure and deterministic: equal
/// inputs produce byte-identical resolutions.
pub fn resolve_shot(
    shot: &ShotRequest,
    colliders: &WorldColliders,
    targets: &[TargetVolume],
    tuning: &CombatTuning,
) -> ShotResolution {
    let mut resolution = ShotResolution::default();

    let dir = ballistics::spread_direction(
        shot.forward,
        shot.right,
        shot.up,
        shot.spread_x,
        shot.spread_y,
    );
    // Degenerate request or shooter inside solid geometry: resolves to
    // nothing, not an error.
    if dir == Vec3::ZERO || shot.max_distance <= 0.0 || colliders.point_embedded(shot.origin) {
        return resolution;
    }

    let stats = shot.weapon.stats();
    let ammo = stats.ammo.profile();
    let damage_bits = ammo.class.damage_bits();
    let pen_tuning = &tuning.penetration;
    // The request may ask for fewer penetrations than the tuning allows,
    // never more.
    let max_penetrations = shot.max_penetrations.min(pen_tuning.max_penetrations);

    let mut start = shot.origin;
    let mut remaining_distance = shot.max_distance;
    let mut current_damage = shot.base_damage;
    let mut budget = shot.penetration_budget.unwrap_or(ammo.penetration_power);
    let mut distance_so_far = 0.0_f32;
    let mut penetrations_used = 0_u32;
    let mut skip_victim: Option<Entity> = None;
    let mut aggregator = MultiDamage::new();

    loop {
        let Some(hit) = trace_segment(
            colliders,
            targets,
            start,
            dir,
            remaining_distance,
            shot.attacker,
            skip_victim,
            pen_tuning.extended_hull_reach,
        ) else {
            // Unobstructed: the remaining energy is discarded.
            break;
        };

        let segment_length = hit.t_enter();
        current_damage = ballistics::apply_range_falloff(
            current_damage,
            segment_length,
            shot.range_modifier,
            pen_tuning.falloff_reference_distance,
        );
        distance_so_far += segment_length;
        if current_damage < pen_tuning.min_damage {
            break;
        }

        match &hit {
            TraceHit::Surface(world_hit) => {
                resolution.impacts.push(Impact {
                    point: world_hit.point,
                    normal: world_hit.normal,
                    material: world_hit.material,
                    entity: None,
                    bullet_id: shot.bullet_id,
                });
                skip_victim = None;
            }
            TraceHit::Combatant {
                entity,
                point,
                normal,
                hit_group,
                ..
            } => {
                resolution.impacts.push(Impact {
                    point: *point,
                    normal: *normal,
                    material: SurfaceMaterial::Flesh,
                    entity: Some(*entity),
                    bullet_id: shot.bullet_id,
                });
                aggregator.accumulate(DamageEvent {
                    victim: *entity,
                    attacker: shot.attacker,
                    weapon: shot.weapon,
                    raw_damage: current_damage,
                    hit_group: *hit_group,
                    damage_bits,
                    bullet_id: shot.bullet_id,
                    force: dir * current_damage * pen_tuning.impulse_scale,
                    penetrations_so_far: penetrations_used,
                });
                skip_victim = Some(*entity);
            }
        }

        if penetrations_used >= max_penetrations {
            break;
        }
        let Some(outcome) = resolve_penetration(
            colliders,
            &hit,
            start,
            dir,
            &ammo,
            current_damage,
            budget,
            distance_so_far,
            pen_tuning,
        ) else {
            break;
        };

        current_damage = outcome.new_damage;
        budget = outcome.new_budget;
        penetrations_used += 1;
        distance_so_far += outcome.thickness;

        // Each successive segment gets half the distance budget of its parent.
        remaining_distance =
            ((remaining_distance - segment_length - outcome.thickness).max(0.0)) * 0.5;
        if remaining_distance <= RESTART_EPSILON {
            break;
        }
        start = outcome.exit_point + dir * RESTART_EPSILON;
    }

    resolution.events = aggregator.flush();
    resolution
}

/// Snapshot the hit-volumes of every live combatant.
fn gather_targets(
    victims: &Query<(
        Entity,
        &Combatant,
        &CombatantPosition,
        &CombatantRotation,
        &mut Health,
        &mut ArmorState,
        &mut FlinchState,
    )>,
) -> Vec<TargetVolume> {
    victims
        .iter()
        .filter(|(_, _, _, _, health, _, _)| !health.is_dead())
        .map(|(entity, _, position, rotation, _, _, _)| TargetVolume {
            entity,
            bottom: position.0,
            yaw: rotation.0,
        })
        .collect()
}

/// Drain this tick's queued shots and apply their full outcome.
pub fn apply_shot_requests(
    mut commands: Commands,
    mut pending: ResMut<PendingShots>,
    colliders: Res<WorldColliders>,
    tuning: Res<CombatTuning>,
    mut log: ResMut<CombatLog>,
    mut impact_queue: ResMut<ImpactQueue>,
    mut victims: Query<(
        Entity,
        &Combatant,
        &CombatantPosition,
        &CombatantRotation,
        &mut Health,
        &mut ArmorState,
        &mut FlinchState,
    )>,
) {
    let shots = std::mem::take(&mut pending.shots);
    for shot in shots {
        // Re-snapshot per shot: an earlier shot this tick may have killed
        // someone, and the dead block no bullets.
        let targets = gather_targets(&victims);
        let resolution = resolve_shot(&shot, &colliders, &targets, &tuning);
        impact_queue.impacts.extend(resolution.impacts);

        for event in resolution.events {
            // A victim despawned or killed mid-resolution is silently dropped.
            let Ok((_, combatant, _, _, mut health, mut armor, mut flinch)) =
                victims.get_mut(event.victim)
            else {
                continue;
            };
            if health.is_dead() {
                continue;
            }

            let stats = event.weapon.stats();
            let scaled = damage::hit_group_damage(
                event.raw_damage,
                event.hit_group,
                combatant.team,
                armor.has_heavy_armor,
                &tuning.armor,
            );
            let outcome = damage::resolve_armor(
                &mut armor,
                event.hit_group,
                scaled,
                event.damage_bits,
                stats.armor_ratio,
                &tuning.armor,
            );
            let lethal = health.take_damage(outcome.health_damage);
            tagging::on_hit(
                &mut flinch,
                &stats,
                stats.ammo.profile().class,
                outcome.health_damage as f32,
                combatant.max_speed,
                &tuning.flinch,
            );

            if lethal {
                commands.entity(event.victim).insert(RespawnTimer::default());
                info!(
                    "{:?} killed {:?} with {:?} ({:?}, {} penetrations)",
                    event.attacker,
                    event.victim,
                    event.weapon,
                    event.hit_group,
                    event.penetrations_so_far
                );
            }

            log.entries.push(AppliedDamage {
                event,
                health_damage: outcome.health_damage,
                armor_damage: outcome.armor_damage,
                remaining_health: health.current,
                lethal,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Aabb, BulletId, HitGroup, Team, WeaponType, BASE_MOVE_SPEED};

    fn rifle_shot(attacker: Entity) -> ShotRequest {
        ShotRequest::from_weapon(
            attacker,
            WeaponType::AssaultRifle,
            Vec3::new(0.0, 40.0, 0.0),
            Vec3::Z,
            Vec3::X,
            Vec3::Y,
            BulletId::new(7, 2),
        )
    }

    fn spawn_combatant(world: &mut World, z: f32, armor: i32, helmet: bool) -> Entity {
        world
            .spawn((
                Combatant {
                    team: Team::Bravo,
                    max_speed: BASE_MOVE_SPEED,
                },
                CombatantPosition(Vec3::new(0.0, 0.0, z)),
                CombatantRotation(0.0),
                Health::new(100),
                ArmorState {
                    armor,
                    has_helmet: helmet,
                    has_heavy_armor: false,
                },
                FlinchState::default(),
            ))
            .id()
    }

    fn target_of(world: &mut World, entity: Entity) -> TargetVolume {
        let position = world.get::<CombatantPosition>(entity).unwrap().0;
        let yaw = world.get::<CombatantRotation>(entity).unwrap().0;
        TargetVolume {
            entity,
            bottom: position,
            yaw,
        }
    }

    fn partition(colliders: &mut WorldColliders, z: f32) {
        colliders.insert(
            Aabb::from_center_extents(Vec3::new(0.0, 60.0, z), Vec3::new(400.0, 60.0, 2.0)),
            SurfaceMaterial::Plaster,
        );
    }

    #[test]
    fn unobstructed_shot_resolves_to_nothing() {
        let mut world = World::new();
        let attacker = world.spawn_empty().id();
        let colliders = WorldColliders::default();
        let tuning = CombatTuning::default();

        let resolution = resolve_shot(&rifle_shot(attacker), &colliders, &[], &tuning);
        assert!(resolution.events.is_empty());
        assert!(resolution.impacts.is_empty());
    }

    #[test]
    fn degenerate_direction_resolves_to_nothing() {
        let mut world = World::new();
        let attacker = world.spawn_empty().id();
        let colliders = WorldColliders::default();
        let tuning = CombatTuning::default();

        let mut shot = rifle_shot(attacker);
        shot.forward = Vec3::ZERO;
        shot.right = Vec3::ZERO;
        shot.up = Vec3::ZERO;
        let resolution = resolve_shot(&shot, &colliders, &[], &tuning);
        assert!(resolution.events.is_empty());
    }

    #[test]
    fn direct_hit_books_one_event_with_falloff_damage() {
        let mut world = World::new();
        let attacker = world.spawn_empty().id();
        let victim = spawn_combatant(&mut world, 500.0, 0, false);
        let targets = vec![target_of(&mut world, victim)];
        let colliders = WorldColliders::default();
        let tuning = CombatTuning::default();

        let shot = rifle_shot(attacker);
        let resolution = resolve_shot(&shot, &colliders, &targets, &tuning);

        assert_eq!(resolution.events.len(), 1);
        let event = resolution.events[0];
        assert_eq!(event.victim, victim);
        assert_eq!(event.bullet_id, shot.bullet_id);
        assert_eq!(event.penetrations_so_far, 0);
        // Entry at ~480.8 units: 33 * 0.98^(d/500).
        assert!(event.raw_damage < 33.0);
        assert!(event.raw_damage > 31.0);
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut world = World::new();
        let attacker = world.spawn_empty().id();
        let victim = spawn_combatant(&mut world, 400.0, 0, false);
        let targets = vec![target_of(&mut world, victim)];
        let mut colliders = WorldColliders::default();
        partition(&mut colliders, 200.0);
        let tuning = CombatTuning::default();

        let shot = rifle_shot(attacker);
        let a = resolve_shot(&shot, &colliders, &targets, &tuning);
        let b = resolve_shot(&shot, &colliders, &targets, &tuning);
        assert_eq!(a.events.len(), b.events.len());
        assert_eq!(a.impacts.len(), b.impacts.len());
        for (x, y) in a.events.iter().zip(b.events.iter()) {
            assert_eq!(x.victim, y.victim);
            assert_eq!(x.raw_damage.to_bits(), y.raw_damage.to_bits());
            assert_eq!(x.hit_group, y.hit_group);
        }
    }

    #[test]
    fn shot_through_partitions_stops_at_the_penetration_cap() {
        let mut world = World::new();
        let attacker = world.spawn_empty().id();
        let mut colliders = WorldColliders::default();
        // More thin partitions than the cap allows.
        for i in 0..6 {
            partition(&mut colliders, 200.0 + 100.0 * i as f32);
        }
        let tuning = CombatTuning::default();

        let shot = rifle_shot(attacker);
        let resolution = resolve_shot(&shot, &colliders, &[], &tuning);

        // Cap of 4 penetrations: impacts on partitions 1..=5, never the 6th.
        assert_eq!(resolution.impacts.len(), (shot.max_penetrations + 1) as usize);
    }

    #[test]
    fn lined_up_combatants_share_the_bullet_id() {
        let mut world = World::new();
        let attacker = world.spawn_empty().id();
        let near = spawn_combatant(&mut world, 300.0, 0, false);
        let far = spawn_combatant(&mut world, 400.0, 0, false);
        let targets = vec![target_of(&mut world, near), target_of(&mut world, far)];
        let colliders = WorldColliders::default();
        let tuning = CombatTuning::default();

        // A sniper round: enough damage to survive a body traversal.
        let shot = ShotRequest::from_weapon(
            attacker,
            WeaponType::Sniper,
            Vec3::new(0.0, 40.0, 0.0),
            Vec3::Z,
            Vec3::X,
            Vec3::Y,
            BulletId::new(9, 0),
        );
        let resolution = resolve_shot(&shot, &colliders, &targets, &tuning);

        assert_eq!(resolution.events.len(), 2);
        assert_eq!(resolution.events[0].victim, near);
        assert_eq!(resolution.events[1].victim, far);
        assert!(resolution
            .events
            .iter()
            .all(|event| event.bullet_id == shot.bullet_id));
        assert_eq!(resolution.events[0].penetrations_so_far, 0);
        assert_eq!(resolution.events[1].penetrations_so_far, 1);
        assert!(resolution.events[1].raw_damage < resolution.events[0].raw_damage);
    }

    #[test]
    fn damage_never_goes_negative_along_the_path() {
        let mut world = World::new();
        let attacker = world.spawn_empty().id();
        let mut colliders = WorldColliders::default();
        for i in 0..4 {
            colliders.insert(
                Aabb::from_center_extents(
                    Vec3::new(0.0, 60.0, 150.0 + 60.0 * i as f32),
                    Vec3::new(400.0, 60.0, 8.0),
                ),
                SurfaceMaterial::Concrete,
            );
        }
        let tuning = CombatTuning::default();

        // A weak pistol round into thick concrete dies quickly but cleanly.
        let shot = ShotRequest::from_weapon(
            attacker,
            WeaponType::Pistol,
            Vec3::new(0.0, 60.0, 0.0),
            Vec3::Z,
            Vec3::X,
            Vec3::Y,
            BulletId::new(3, 1),
        );
        let resolution = resolve_shot(&shot, &colliders, &[], &tuning);
        assert!(!resolution.impacts.is_empty());
    }

    #[test]
    fn multi_damage_coalesces_same_victim_contributions() {
        let mut world = World::new();
        let victim = world.spawn_empty().id();
        let attacker = world.spawn_empty().id();
        let mut aggregator = MultiDamage::new();

        let base = DamageEvent {
            victim,
            attacker,
            weapon: WeaponType::AssaultRifle,
            raw_damage: 20.0,
            hit_group: HitGroup::Chest,
            damage_bits: damage::DMG_BULLET,
            bullet_id: BulletId::new(1, 0),
            force: Vec3::Z * 10.0,
            penetrations_so_far: 0,
        };
        aggregator.accumulate(base);
        aggregator.accumulate(DamageEvent {
            raw_damage: 5.0,
            hit_group: HitGroup::Stomach,
            penetrations_so_far: 1,
            ..base
        });

        let events = aggregator.flush();
        assert_eq!(events.len(), 1);
        assert!((events[0].raw_damage - 25.0).abs() < 1e-5);
        // First contribution decides the hit-group and penetration count.
        assert_eq!(events[0].hit_group, HitGroup::Chest);
        assert_eq!(events[0].penetrations_so_far, 0);
    }

    #[test]
    fn random_spread_sweep_holds_every_invariant() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut world = World::new();
        let attacker = world.spawn_empty().id();
        let victims = [
            spawn_combatant(&mut world, 250.0, 100, true),
            spawn_combatant(&mut world, 350.0, 50, false),
            spawn_combatant(&mut world, 450.0, 0, false),
        ];
        let targets: Vec<TargetVolume> = victims
            .iter()
            .map(|&victim| target_of(&mut world, victim))
            .collect();

        let mut colliders = WorldColliders::default();
        partition(&mut colliders, 150.0);
        partition(&mut colliders, 300.0);
        let tuning = CombatTuning::default();

        let mut rng = StdRng::seed_from_u64(0xB1A5);
        for i in 0..128u32 {
            let mut shot = rifle_shot(attacker);
            shot.spread_x = rng.gen_range(-0.1..0.1);
            shot.spread_y = rng.gen_range(-0.1..0.1);
            shot.bullet_id = BulletId::new(100 + i, 0);

            let resolution = resolve_shot(&shot, &colliders, &targets, &tuning);
            // Bounded penetration: never more victims than the cap allows.
            assert!(resolution.events.len() <= (shot.max_penetrations + 1) as usize);
            for event in &resolution.events {
                assert!(event.raw_damage >= 0.0);
                assert!(event.raw_damage <= shot.base_damage);
                assert_eq!(event.bullet_id, shot.bullet_id);
                assert!(event.penetrations_so_far <= shot.max_penetrations);
            }
        }
    }

    // --- full application through the ECS -----------------------------------

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(CombatTuning::default());
        app.init_resource::<WorldColliders>();
        app.init_resource::<PendingShots>();
        app.init_resource::<CombatLog>();
        app.init_resource::<ImpactQueue>();
        app.add_systems(Update, apply_shot_requests);
        app
    }

    #[test]
    fn applied_damage_updates_health_armor_and_flinch_once() {
        let mut app = test_app();
        let attacker = app.world_mut().spawn_empty().id();
        let victim = spawn_combatant(app.world_mut(), 500.0, 100, false);

        let shot = rifle_shot(attacker);
        app.world_mut()
            .resource_mut::<PendingShots>()
            .shots
            .push(shot);
        app.update();

        let log = app.world().resource::<CombatLog>();
        assert_eq!(log.entries.len(), 1);
        let applied = log.entries[0];
        assert_eq!(applied.event.victim, victim);
        assert!(applied.health_damage > 0);
        assert!(applied.armor_damage > 0);
        assert!(!applied.lethal);

        let health = app.world().get::<Health>(victim).unwrap();
        assert_eq!(health.current, 100 - applied.health_damage);
        let armor = app.world().get::<ArmorState>(victim).unwrap();
        assert_eq!(armor.armor, 100 - applied.armor_damage);
        let flinch = app.world().get::<FlinchState>(victim).unwrap();
        assert!(flinch.scalar < 1.0);
        assert!(flinch.scalar >= 0.1);
    }

    #[test]
    fn lethal_shot_logs_and_schedules_respawn() {
        let mut app = test_app();
        let attacker = app.world_mut().spawn_empty().id();
        let victim = spawn_combatant(app.world_mut(), 300.0, 0, false);

        let mut shot = ShotRequest::from_weapon(
            attacker,
            WeaponType::Sniper,
            Vec3::new(0.0, 40.0, 0.0),
            Vec3::Z,
            Vec3::X,
            Vec3::Y,
            BulletId::new(11, 0),
        );
        shot.base_damage = 500.0;
        app.world_mut()
            .resource_mut::<PendingShots>()
            .shots
            .push(shot);
        app.update();

        let health = app.world().get::<Health>(victim).unwrap();
        assert!(health.is_dead());
        assert!(app.world().get::<RespawnTimer>(victim).is_some());
        let log = app.world().resource::<CombatLog>();
        assert!(log.entries.iter().any(|entry| entry.lethal));
    }

    #[test]
    fn victim_killed_by_earlier_shot_is_dropped_from_later_ones() {
        let mut app = test_app();
        let attacker = app.world_mut().spawn_empty().id();
        let victim = spawn_combatant(app.world_mut(), 300.0, 0, false);

        let mut first = ShotRequest::from_weapon(
            attacker,
            WeaponType::Sniper,
            Vec3::new(0.0, 40.0, 0.0),
            Vec3::Z,
            Vec3::X,
            Vec3::Y,
            BulletId::new(20, 0),
        );
        first.base_damage = 500.0;
        let second = ShotRequest {
            bullet_id: BulletId::new(20, 1),
            ..first
        };
        {
            let mut pending = app.world_mut().resource_mut::<PendingShots>();
            pending.shots.push(first);
            pending.shots.push(second);
        }
        app.update();

        // Only the killing shot lands; the corpse neither blocks nor takes
        // the second bullet.
        let log = app.world().resource::<CombatLog>();
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.entries[0].event.victim, victim);
    }

    #[test]
    fn taser_damage_bypasses_armor_entirely() {
        let mut app = test_app();
        let attacker = app.world_mut().spawn_empty().id();
        let victim = spawn_combatant(app.world_mut(), 100.0, 100, true);

        let shot = ShotRequest::from_weapon(
            attacker,
            WeaponType::Taser,
            Vec3::new(0.0, 40.0, 0.0),
            Vec3::Z,
            Vec3::X,
            Vec3::Y,
            BulletId::new(30, 0),
        );
        app.world_mut()
            .resource_mut::<PendingShots>()
            .shots
            .push(shot);
        app.update();

        let armor = app.world().get::<ArmorState>(victim).unwrap();
        assert_eq!(armor.armor, 100);
        let health = app.world().get::<Health>(victim).unwrap();
        assert!(health.is_dead());
    }
}
