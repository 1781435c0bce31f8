//! Static world collision surfaces for bullet traces.
//!
//! Surfaces are material-tagged boxes indexed by a spatial hash over the XZ
//! plane. The trace only visits cells the segment overlaps, so arena size
//! does not matter to per-shot cost.

use bevy::prelude::*;
use std::collections::HashMap;

use shared::{segment_aabb, Aabb, SurfaceMaterial};

/// Spatial hash cell size in world units.
const COLLIDER_CELL_SIZE: f32 = 128.0;

/// Merge tolerance when chaining abutting surfaces into one obstruction.
const OBSTRUCTION_MERGE_GAP: f32 = 0.5;

fn cell_key(x: f32, z: f32) -> (i32, i32) {
    (
        (x / COLLIDER_CELL_SIZE).floor() as i32,
        (z / COLLIDER_CELL_SIZE).floor() as i32,
    )
}

/// A single bullet-blocking surface.
#[derive(Clone, Debug)]
pub struct Surface {
    pub aabb: Aabb,
    pub material: SurfaceMaterial,
}

/// Nearest world-geometry intersection of a trace.
#[derive(Clone, Copy, Debug)]
pub struct WorldHit {
    pub surface: u32,
    pub material: SurfaceMaterial,
    /// Distance along the trace direction to the entry face.
    pub t_enter: f32,
    /// Distance along the trace direction to this surface's own exit face.
    pub t_exit: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// All static bullet-blocking geometry in the world.
#[derive(Resource, Default)]
pub struct WorldColliders {
    surfaces: Vec<Surface>,
    /// Spatial hash cell -> surface ids overlapping that cell.
    cells: HashMap<(i32, i32), Vec<u32>>,
}

impl WorldColliders {
    /// Register a surface, indexing it into every cell it overlaps.
    pub fn insert(&mut self, aabb: Aabb, material: SurfaceMaterial) -> u32 {
        let id = self.surfaces.len() as u32;
        self.surfaces.push(Surface { aabb, material });

        let min_cell = cell_key(aabb.min.x, aabb.min.z);
        let max_cell = cell_key(aabb.max.x, aabb.max.z);
        for cx in min_cell.0..=max_cell.0 {
            for cz in min_cell.1..=max_cell.1 {
                self.cells.entry((cx, cz)).or_default().push(id);
            }
        }
        id
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Surface ids in every cell the segment's XZ footprint overlaps,
    /// deduplicated and in id order so traversal is deterministic.
    fn candidates(&self, start: Vec3, end: Vec3) -> Vec<u32> {
        let min_cell = cell_key(start.x.min(end.x), start.z.min(end.z));
        let max_cell = cell_key(start.x.max(end.x), start.z.max(end.z));

        let mut ids = Vec::new();
        for cx in min_cell.0..=max_cell.0 {
            for cz in min_cell.1..=max_cell.1 {
                if let Some(cell_ids) = self.cells.get(&(cx, cz)) {
                    ids.extend_from_slice(cell_ids);
                }
            }
        }
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Nearest surface hit along the segment. `dir` must be normalized.
    pub fn trace(&self, start: Vec3, dir: Vec3, length: f32) -> Option<WorldHit> {
        let end = start + dir * length;
        let mut best: Option<WorldHit> = None;

        for id in self.candidates(start, end) {
            let surface = &self.surfaces[id as usize];
            let Some(hit) = segment_aabb(start, dir, length, &surface.aabb) else {
                continue;
            };
            let closer = match &best {
                Some(b) => hit.t_enter < b.t_enter,
                None => true,
            };
            if closer {
                best = Some(WorldHit {
                    surface: id,
                    material: surface.material,
                    t_enter: hit.t_enter,
                    t_exit: hit.t_exit,
                    point: start + dir * hit.t_enter,
                    normal: hit.normal,
                });
            }
        }
        best
    }

    /// Whether a point sits inside any surface.
    pub fn point_embedded(&self, p: Vec3) -> bool {
        let cell = cell_key(p.x, p.z);
        let Some(ids) = self.cells.get(&cell) else {
            return false;
        };
        ids.iter().any(|&id| self.surfaces[id as usize].aabb.contains(p))
    }

    /// Exit face of the obstruction entered at `entry_t`.
    ///
    /// Abutting or overlapping surfaces chain into a single obstruction: the
    /// exit is the end of the contiguous solid interval containing the entry.
    /// Returns the exit distance and the material of the surface providing the
    /// exit face, or None when the obstruction extends past `max_thickness`.
    pub fn obstruction_exit(
        &self,
        start: Vec3,
        dir: Vec3,
        hit: &WorldHit,
        max_thickness: f32,
    ) -> Option<(f32, SurfaceMaterial)> {
        let search_len = hit.t_enter + max_thickness + OBSTRUCTION_MERGE_GAP;
        let end = start + dir * search_len;

        // Forward intervals of every surface the extended segment crosses.
        let mut intervals: Vec<(f32, f32, SurfaceMaterial)> = Vec::new();
        for id in self.candidates(start, end) {
            if id == hit.surface {
                continue;
            }
            let surface = &self.surfaces[id as usize];
            if let Some(h) = segment_aabb(start, dir, search_len, &surface.aabb) {
                intervals.push((h.t_enter, h.t_exit, surface.material));
            }
        }
        intervals.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut exit_t = hit.t_exit;
        let mut exit_material = hit.material;
        for (t_enter, t_exit, material) in intervals {
            if t_enter > exit_t + OBSTRUCTION_MERGE_GAP {
                break;
            }
            if t_exit > exit_t {
                exit_t = t_exit;
                exit_material = material;
            }
        }

        if exit_t - hit.t_enter > max_thickness {
            return None;
        }
        Some((exit_t, exit_material))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(colliders: &mut WorldColliders, z: f32, thickness: f32, material: SurfaceMaterial) -> u32 {
        colliders.insert(
            Aabb::from_center_extents(
                Vec3::new(0.0, 50.0, z),
                Vec3::new(200.0, 50.0, thickness * 0.5),
            ),
            material,
        )
    }

    #[test]
    fn trace_finds_nearest_surface() {
        let mut colliders = WorldColliders::default();
        wall(&mut colliders, 300.0, 16.0, SurfaceMaterial::Wood);
        wall(&mut colliders, 100.0, 16.0, SurfaceMaterial::Concrete);

        let hit = colliders
            .trace(Vec3::new(0.0, 50.0, 0.0), Vec3::Z, 1000.0)
            .unwrap();
        assert_eq!(hit.material, SurfaceMaterial::Concrete);
        assert!((hit.t_enter - 92.0).abs() < 1e-3);
        assert!((hit.t_exit - 108.0).abs() < 1e-3);
    }

    #[test]
    fn trace_misses_everything() {
        let mut colliders = WorldColliders::default();
        wall(&mut colliders, 100.0, 16.0, SurfaceMaterial::Concrete);
        assert!(colliders
            .trace(Vec3::new(0.0, 200.0, 0.0), Vec3::Z, 1000.0)
            .is_none());
    }

    #[test]
    fn point_embedded_probe() {
        let mut colliders = WorldColliders::default();
        wall(&mut colliders, 100.0, 16.0, SurfaceMaterial::Concrete);
        assert!(colliders.point_embedded(Vec3::new(0.0, 50.0, 100.0)));
        assert!(!colliders.point_embedded(Vec3::new(0.0, 50.0, 0.0)));
    }

    #[test]
    fn abutting_surfaces_merge_into_one_obstruction() {
        let mut colliders = WorldColliders::default();
        // Two 16-thick walls back to back: one 32-thick obstruction.
        wall(&mut colliders, 100.0, 16.0, SurfaceMaterial::Concrete);
        wall(&mut colliders, 116.0, 16.0, SurfaceMaterial::Wood);

        let start = Vec3::new(0.0, 50.0, 0.0);
        let hit = colliders.trace(start, Vec3::Z, 1000.0).unwrap();
        let (exit_t, exit_material) = colliders
            .obstruction_exit(start, Vec3::Z, &hit, 90.0)
            .unwrap();
        assert!((exit_t - 124.0).abs() < 1e-3);
        assert_eq!(exit_material, SurfaceMaterial::Wood);
    }

    #[test]
    fn obstruction_thicker_than_cap_has_no_exit() {
        let mut colliders = WorldColliders::default();
        wall(&mut colliders, 200.0, 120.0, SurfaceMaterial::Concrete);

        let start = Vec3::new(0.0, 50.0, 0.0);
        let hit = colliders.trace(start, Vec3::Z, 1000.0).unwrap();
        assert!(colliders
            .obstruction_exit(start, Vec3::Z, &hit, 90.0)
            .is_none());
    }
}
