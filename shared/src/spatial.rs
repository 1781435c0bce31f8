//! Segment intersection primitives for bullet traces.
//!
//! All tests report distances *along the segment direction* (not normalized
//! fractions), and report both the entry and exit distance where the shape
//! has volume — penetration needs the exit to measure obstruction thickness.

use bevy::prelude::*;

/// An axis-aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create from center position and half-extents.
    pub fn from_center_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// Entry/exit of a segment through a volume.
#[derive(Clone, Copy, Debug)]
pub struct SegmentHit {
    /// Distance along the direction where the segment enters the volume.
    pub t_enter: f32,
    /// Distance along the direction where the segment leaves the volume.
    pub t_exit: f32,
    /// Outward surface normal at the entry face (zero when the segment
    /// starts inside the volume).
    pub normal: Vec3,
}

/// Slab test of a segment against an AABB.
///
/// `dir` must be normalized; `length` bounds the entry distance (the exit may
/// lie beyond it, which is exactly what the thickness computation needs).
pub fn segment_aabb(start: Vec3, dir: Vec3, length: f32, aabb: &Aabb) -> Option<SegmentHit> {
    let mut tmin = 0.0_f32;
    let mut tmax = f32::MAX;
    let mut hit_normal = Vec3::ZERO;

    for axis in 0..3 {
        let s = start[axis];
        let d = dir[axis];
        let min = aabb.min[axis];
        let max = aabb.max[axis];

        if d.abs() < 1e-6 {
            if s < min || s > max {
                return None;
            }
            continue;
        }

        let inv_d = 1.0 / d;
        let mut t1 = (min - s) * inv_d;
        let mut t2 = (max - s) * inv_d;

        let mut n = Vec3::ZERO;
        n[axis] = if d > 0.0 { -1.0 } else { 1.0 };

        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
            n = -n;
        }

        if t1 > tmin {
            tmin = t1;
            hit_normal = n;
        }

        tmax = tmax.min(t2);

        if tmin > tmax {
            return None;
        }
    }

    if tmin > length {
        return None;
    }

    Some(SegmentHit {
        t_enter: tmin,
        t_exit: tmax,
        normal: hit_normal,
    })
}

/// Segment against a sphere, via the closest-approach chord.
pub fn segment_sphere(
    start: Vec3,
    dir: Vec3,
    length: f32,
    center: Vec3,
    radius: f32,
) -> Option<SegmentHit> {
    let to_center = center - start;
    let closest_t = to_center.dot(dir).clamp(0.0, length);
    let closest = start + dir * closest_t;
    let d = (closest - center).length();
    if d > radius {
        return None;
    }

    let half_chord = (radius * radius - d * d).max(0.0).sqrt();
    let t_enter = (closest_t - half_chord).max(0.0);
    if t_enter > length {
        return None;
    }
    let entry = start + dir * t_enter;
    Some(SegmentHit {
        t_enter,
        t_exit: closest_t + half_chord,
        normal: (entry - center).normalize_or_zero(),
    })
}

/// Segment against a vertical capsule spanning `bottom..bottom + height`.
///
/// Approximate: the closest approach to the capsule axis decides the hit and
/// the chord through an equivalent circle supplies entry/exit. Good enough
/// for hit registration; exact conic intersection is not worth the cost here.
pub fn segment_vertical_capsule(
    start: Vec3,
    dir: Vec3,
    length: f32,
    bottom: Vec3,
    height: f32,
    radius: f32,
) -> Option<SegmentHit> {
    let center = bottom + Vec3::new(0.0, height * 0.5, 0.0);
    let half_height = height * 0.5;

    let to_center = center - start;
    let closest_t = to_center.dot(dir).clamp(0.0, length);
    let closest = start + dir * closest_t;

    let horizontal = Vec2::new(closest.x - center.x, closest.z - center.z);
    let d = horizontal.length();
    if d > radius {
        return None;
    }

    let height_diff = closest.y - center.y;
    if height_diff.abs() > half_height + radius {
        return None;
    }

    let half_chord = (radius * radius - d * d).max(0.0).sqrt();
    let t_enter = (closest_t - half_chord).max(0.0);
    if t_enter > length {
        return None;
    }

    // Radial normal off the capsule axis at the entry point.
    let entry = start + dir * t_enter;
    let axis_y = (entry.y - bottom.y).clamp(0.0, height);
    let axis_point = Vec3::new(bottom.x, bottom.y + axis_y, bottom.z);
    Some(SegmentHit {
        t_enter,
        t_exit: closest_t + half_chord,
        normal: (entry - axis_point).normalize_or_zero(),
    })
}
