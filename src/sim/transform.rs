//! Position and footprint shared by every world entity

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::tile_of;

/// Axis-aligned footprint in tile units
///
/// `pos` is the lower-left corner; an entity resting at integer `pos`
/// occupies the tile with that index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Transform {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self {
            pos,
            size: Vec2::splat(size),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Tile under the center point
    #[inline]
    pub fn tile(&self) -> IVec2 {
        let c = self.center();
        IVec2::new(tile_of(c.x), tile_of(c.y))
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.size.x * 0.5
    }

    /// Center-to-center distance
    #[inline]
    pub fn distance_to(&self, other: &Transform) -> f32 {
        self.center().distance(other.center())
    }
}
