//! Demo arena: a shooting range that exercises the whole resolution path.

use bevy::prelude::*;

use shared::{
    Aabb, ArmorState, BulletId, Combatant, CombatantPosition, CombatantRotation, FlinchState,
    Health, ShotRequest, SurfaceMaterial, Team, WeaponType, BASE_MOVE_SPEED, EYE_HEIGHT,
};

use crate::colliders::WorldColliders;
use crate::weapons::PendingShots;

/// Build the static range geometry and both teams.
pub fn setup_world(mut commands: Commands, mut colliders: ResMut<WorldColliders>) {
    // Firing line looks down +Z. A thin plaster partition, a wooden crate and
    // a glass pane sit between the lanes; flank cover is sterner stuff.
    colliders.insert(
        Aabb::from_center_extents(Vec3::new(0.0, 48.0, 0.0), Vec3::new(256.0, 48.0, 2.0)),
        SurfaceMaterial::Plaster,
    );
    colliders.insert(
        Aabb::from_center_extents(Vec3::new(-64.0, 24.0, 120.0), Vec3::new(24.0, 24.0, 24.0)),
        SurfaceMaterial::Wood,
    );
    colliders.insert(
        Aabb::from_center_extents(Vec3::new(64.0, 48.0, 120.0), Vec3::new(48.0, 48.0, 1.0)),
        SurfaceMaterial::Glass,
    );
    colliders.insert(
        Aabb::from_center_extents(Vec3::new(-160.0, 48.0, 200.0), Vec3::new(16.0, 48.0, 16.0)),
        SurfaceMaterial::HeavyMetal,
    );
    colliders.insert(
        Aabb::from_center_extents(Vec3::new(160.0, 48.0, 200.0), Vec3::new(16.0, 48.0, 16.0)),
        SurfaceMaterial::Unknown,
    );
    colliders.insert(
        Aabb::from_center_extents(Vec3::new(0.0, 24.0, 480.0), Vec3::new(256.0, 24.0, 40.0)),
        SurfaceMaterial::Dirt,
    );
    info!("Arena built: {} surfaces", colliders.len());

    spawn_combatant(&mut commands, Team::Alpha, Vec3::new(0.0, 0.0, -400.0), 0.0);
    spawn_combatant(
        &mut commands,
        Team::Alpha,
        Vec3::new(-96.0, 0.0, -400.0),
        0.0,
    );
    // Bravo line stands past the partition, two of them in the same lane.
    spawn_combatant(
        &mut commands,
        Team::Bravo,
        Vec3::new(0.0, 0.0, 200.0),
        std::f32::consts::PI,
    );
    spawn_combatant(
        &mut commands,
        Team::Bravo,
        Vec3::new(0.0, 0.0, 360.0),
        std::f32::consts::PI,
    );
}

fn spawn_combatant(commands: &mut Commands, team: Team, position: Vec3, yaw: f32) -> Entity {
    commands
        .spawn((
            Combatant {
                team,
                max_speed: BASE_MOVE_SPEED,
            },
            CombatantPosition(position),
            CombatantRotation(yaw),
            Health::default(),
            ArmorState::full(100, true),
            FlinchState::default(),
        ))
        .id()
}

/// Queue a demonstration volley from the first Alpha combatant.
///
/// Stands in for the firing layer: spread offsets are precomputed here the
/// same way a recoil pattern would hand them over.
pub fn queue_demo_volley(
    mut pending: ResMut<PendingShots>,
    combatants: Query<(Entity, &Combatant, &CombatantPosition)>,
) {
    let Some((attacker, _, position)) = combatants
        .iter()
        .find(|(_, combatant, _)| combatant.team == Team::Alpha)
    else {
        warn!("No Alpha combatant to fire the demo volley");
        return;
    };

    let origin = position.0 + Vec3::new(0.0, EYE_HEIGHT, 0.0);
    // Chest height of the near Bravo combatant.
    let aim = (Vec3::new(0.0, 40.0, 200.0) - origin).normalize();
    let mut volley = Vec::new();

    // Two rifle rounds through the partition, one pulled by recoil.
    let rifle = ShotRequest::from_weapon(
        attacker,
        WeaponType::AssaultRifle,
        origin,
        aim,
        Vec3::X,
        Vec3::Y,
        BulletId::new(1, 0),
    );
    volley.push(rifle);

    let mut pulled = rifle;
    pulled.bullet_id = BulletId::new(1, 1);
    pulled.spread_x = 0.012;
    pulled.spread_y = 0.034;
    volley.push(pulled);

    // One sniper round down the double lane.
    let mut sniper = ShotRequest::from_weapon(
        attacker,
        WeaponType::Sniper,
        origin,
        aim,
        Vec3::X,
        Vec3::Y,
        BulletId::new(2, 0),
    );
    sniper.spread_y = 0.001;
    volley.push(sniper);

    info!("Demo volley queued: {} shots", volley.len());
    pending.shots.extend(volley);
}
