//! Surface material classification and penetration profiles.
//!
//! Every bullet-blocking surface in the world carries a [`SurfaceMaterial`];
//! the profile table maps it to how hard the material is to shoot through and
//! how much damage it strips. Surfaces the map pipeline failed to classify use
//! [`SurfaceMaterial::Unknown`], which is deliberately conservative: full
//! damage on impact, no penetration.

use serde::{Deserialize, Serialize};

/// Material class of a bullet-blocking surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceMaterial {
    Concrete,
    Brick,
    Metal,
    /// Thick structural steel. Never penetrable.
    HeavyMetal,
    Rock,
    Wood,
    Plastic,
    Glass,
    Grate,
    Dirt,
    Plaster,
    /// Tool-textured clip/skybox faces. Bullets pass almost untouched.
    NoDraw,
    /// Combatant bodies, when traversed as an obstruction.
    Flesh,
    /// Surface with no material classification.
    Unknown,
}

/// Penetration behavior of one material class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceProfile {
    /// Higher is easier to shoot through; the loss formulas use its inverse.
    pub penetration_modifier: f32,
    /// Fraction of damage kept when crossing this material (legacy model).
    pub damage_modifier: f32,
    /// Whether bullets may pass through at all.
    pub penetrable: bool,
}

impl SurfaceMaterial {
    /// Static profile lookup for this material class.
    pub fn profile(&self) -> SurfaceProfile {
        let (penetration_modifier, damage_modifier, penetrable) = match self {
            SurfaceMaterial::Concrete => (0.4, 0.6, true),
            SurfaceMaterial::Brick => (0.35, 0.55, true),
            SurfaceMaterial::Metal => (0.45, 0.45, true),
            SurfaceMaterial::HeavyMetal => (0.15, 0.3, false),
            SurfaceMaterial::Rock => (0.2, 0.4, false),
            SurfaceMaterial::Wood => (0.9, 0.8, true),
            SurfaceMaterial::Plastic => (1.0, 0.9, true),
            SurfaceMaterial::Glass => (3.0, 0.99, true),
            SurfaceMaterial::Grate => (3.0, 0.99, true),
            SurfaceMaterial::Dirt => (0.5, 0.45, true),
            SurfaceMaterial::Plaster => (1.8, 0.9, true),
            SurfaceMaterial::NoDraw => (10.0, 1.0, true),
            SurfaceMaterial::Flesh => (0.9, 0.9, true),
            // Conservative fallback: stops the bullet, keeps full damage.
            SurfaceMaterial::Unknown => (0.25, 1.0, false),
        };
        SurfaceProfile {
            penetration_modifier,
            damage_modifier,
            penetrable,
        }
    }

    /// Grate/glass/no-draw class surfaces barely resist a bullet at all.
    pub fn is_pass_through(&self) -> bool {
        matches!(
            self,
            SurfaceMaterial::Glass | SurfaceMaterial::Grate | SurfaceMaterial::NoDraw
        )
    }

    /// Materials that usually enclose hollow objects (crates, barrels).
    pub fn is_hollow_candidate(&self) -> bool {
        matches!(self, SurfaceMaterial::Wood | SurfaceMaterial::Plastic)
    }
}
