//! Endless Maze - real-time entity simulation core for a top-down survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, grid collision, combat, AI, meta systems)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Snapshot of the fields an external save layer stores
//! - `leaderboard`: Endless-mode best runs
//! - `error`: Error type for the fallible edges (files, JSON)

pub mod error;
pub mod leaderboard;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use leaderboard::Leaderboard;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Weapon slots in the player inventory
    pub const MAX_INVENTORY: usize = 4;

    /// Directions with a smaller length are treated as "no input"
    pub const DIRECTION_EPSILON: f32 = 1e-4;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negatives
    if a >= 360.0 { 0.0 } else { a }
}

/// Smallest absolute difference between two angles in degrees, in [0, 180]
#[inline]
pub fn angle_diff_degrees(a: f32, b: f32) -> f32 {
    let d = normalize_degrees(a - b);
    if d > 180.0 { 360.0 - d } else { d }
}

/// Direction of a vector in degrees, counter-clockwise from +X, in [0, 360)
#[inline]
pub fn angle_degrees(v: Vec2) -> f32 {
    normalize_degrees(v.y.atan2(v.x).to_degrees())
}

/// Tile index containing a continuous coordinate
#[inline]
pub fn tile_of(coord: f32) -> i32 {
    coord.floor() as i32
}

/// Clamp between two bounds given in either order
///
/// Never panics: NaN bounds are ignored, unlike `f32::clamp`.
#[inline]
pub fn clamp_between(value: f32, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    value.max(lo).min(hi)
}

/// Normalize a direction, or `None` if it is too short to have one
#[inline]
pub fn try_direction(v: Vec2) -> Option<Vec2> {
    if v.length_squared() < consts::DIRECTION_EPSILON * consts::DIRECTION_EPSILON {
        None
    } else {
        Some(v.normalize())
    }
}
