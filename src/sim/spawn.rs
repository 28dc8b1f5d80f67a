//! Spawn placement around the player
//!
//! A bounded random search over a ring; when it runs out of attempts the
//! spawn is skipped, never retried.

use std::f32::consts::TAU;

use glam::{IVec2, Vec2};
use rand::Rng;

use super::collision::CollisionOracle;
use crate::tile_of;
use crate::tuning::SpawnConfig;

/// Random walkable tile between `min_distance` and `max_distance` of `center`
pub fn find_spawn_tile<O, R>(
    oracle: &O,
    center: Vec2,
    cfg: &SpawnConfig,
    rng: &mut R,
) -> Option<IVec2>
where
    O: CollisionOracle + ?Sized,
    R: Rng,
{
    let min = cfg.min_distance.max(0.0);
    let max = cfg.max_distance.max(min);
    (0..cfg.max_attempts).find_map(|_| {
        let angle = rng.random::<f32>() * TAU;
        let dist = min + rng.random::<f32>() * (max - min);
        candidate(oracle, center, angle, dist, min)
    })
}

/// Boss placement: on the outer edge of the ring
pub fn find_boss_tile<O, R>(
    oracle: &O,
    center: Vec2,
    cfg: &SpawnConfig,
    rng: &mut R,
) -> Option<IVec2>
where
    O: CollisionOracle + ?Sized,
    R: Rng,
{
    let min = cfg.min_distance.max(0.0);
    let dist = cfg.max_distance.max(min);
    (0..cfg.max_attempts).find_map(|_| {
        let angle = rng.random::<f32>() * TAU;
        candidate(oracle, center, angle, dist, min)
    })
}

fn candidate<O: CollisionOracle + ?Sized>(
    oracle: &O,
    center: Vec2,
    angle: f32,
    dist: f32,
    min: f32,
) -> Option<IVec2> {
    let p = center + Vec2::new(angle.cos(), angle.sin()) * dist;
    let tile = IVec2::new(tile_of(p.x), tile_of(p.y));
    // Tile centers must still clear the minimum distance after rounding down
    let far_enough = (tile.as_vec2() + Vec2::splat(0.5)).distance(center) >= min;
    (far_enough && oracle.is_walkable(tile.x, tile.y)).then_some(tile)
}
