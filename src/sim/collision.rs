//! Grid collision for axis-aligned actors
//!
//! Walkability comes from a `CollisionOracle`. Movement is resolved one axis at
//! a time against the four corners of a padded bounding box, so a diagonal move
//! blocked on X still completes its Y component (wall sliding).

use glam::{IVec2, Vec2};

use crate::tile_of;
use crate::tuning::PhysicsConfig;

/// Read-only wall occupancy query
pub trait CollisionOracle {
    fn is_walkable(&self, x: i32, y: i32) -> bool;

    /// Walkability for the player, who may pass key-gated tiles
    fn is_walkable_for_player(&self, x: i32, y: i32, has_key: bool) -> bool {
        let _ = has_key;
        self.is_walkable(x, y)
    }
}

/// Who is asking to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Player { has_key: bool },
    Hostile,
}

impl Access {
    #[inline]
    pub fn allows<O: CollisionOracle + ?Sized>(self, oracle: &O, x: i32, y: i32) -> bool {
        match self {
            Access::Player { has_key } => oracle.is_walkable_for_player(x, y, has_key),
            Access::Hostile => oracle.is_walkable(x, y),
        }
    }
}

/// Tile kinds of the built-in grid oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Wall,
    /// Passable only for a player holding the key
    Locked,
}

/// Dense rectangular tile map; everything outside it is solid
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Open floor of the given size
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![Tile::Floor; (width * height) as usize],
        }
    }

    /// Open floor surrounded by a one-tile wall
    pub fn bordered(width: i32, height: i32) -> Self {
        let mut grid = Self::new(width, height);
        for x in 0..width {
            grid.set(x, 0, Tile::Wall);
            grid.set(x, height - 1, Tile::Wall);
        }
        for y in 0..height {
            grid.set(0, y, Tile::Wall);
            grid.set(width - 1, y, Tile::Wall);
        }
        grid
    }

    /// Parse a map where `#` is a wall and `D` a locked door
    ///
    /// The first line is row y = 0. Short lines are padded with floor.
    pub fn from_ascii(map: &str) -> Self {
        let rows: Vec<&str> = map.lines().filter(|l| !l.trim().is_empty()).collect();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut grid = Self::new(width, rows.len() as i32);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::Wall,
                    'D' => Tile::Locked,
                    _ => Tile::Floor,
                };
                grid.set(x as i32, y as i32, tile);
            }
        }
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    /// Out-of-bounds writes are ignored
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }
}

impl CollisionOracle for TileGrid {
    fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == Some(Tile::Floor)
    }

    fn is_walkable_for_player(&self, x: i32, y: i32, has_key: bool) -> bool {
        match self.get(x, y) {
            Some(Tile::Floor) => true,
            Some(Tile::Locked) => has_key,
            _ => false,
        }
    }
}

/// Whether all four padded corners of a box sit on walkable tiles
pub fn can_occupy<O: CollisionOracle + ?Sized>(
    oracle: &O,
    pos: Vec2,
    size: Vec2,
    padding: f32,
    access: Access,
) -> bool {
    let x0 = tile_of(pos.x + padding);
    let y0 = tile_of(pos.y + padding);
    let x1 = tile_of(pos.x + size.x - padding);
    let y1 = tile_of(pos.y + size.y - padding);

    access.allows(oracle, x0, y0)
        && access.allows(oracle, x1, y0)
        && access.allows(oracle, x0, y1)
        && access.allows(oracle, x1, y1)
}

/// Which axes were refused during a move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisBlock {
    pub x: bool,
    pub y: bool,
}

impl AxisBlock {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Apply a displacement X first, then Y, each axis checked independently
///
/// Returns the resolved position and which axes were blocked.
pub fn move_axis_separated<O: CollisionOracle + ?Sized>(
    oracle: &O,
    pos: Vec2,
    size: Vec2,
    delta: Vec2,
    padding: f32,
    access: Access,
) -> (Vec2, AxisBlock) {
    let mut resolved = pos;
    let mut blocked = AxisBlock::default();

    if delta.x != 0.0 {
        let candidate = Vec2::new(resolved.x + delta.x, resolved.y);
        if can_occupy(oracle, candidate, size, padding, access) {
            resolved = candidate;
        } else {
            blocked.x = true;
        }
    }

    if delta.y != 0.0 {
        let candidate = Vec2::new(resolved.x, resolved.y + delta.y);
        if can_occupy(oracle, candidate, size, padding, access) {
            resolved = candidate;
        } else {
            blocked.y = true;
        }
    }

    (resolved, blocked)
}

/// Player velocity response to hitting a wall
///
/// A fast blocked axis bounces back scaled by `wall_bounce`, a slow one stops.
/// The free axis is damped by `wall_slide_mult` to glance off the wall.
pub fn wall_response(vel: Vec2, blocked: AxisBlock, cfg: &PhysicsConfig) -> Vec2 {
    let respond = |v: f32| {
        if v.abs() > cfg.high_speed {
            -v * cfg.wall_bounce
        } else {
            0.0
        }
    };

    let mut out = vel;
    if blocked.x {
        out.x = respond(vel.x);
        if !blocked.y {
            out.y *= cfg.wall_slide_mult;
        }
    }
    if blocked.y {
        out.y = respond(vel.y);
        if !blocked.x {
            out.x *= cfg.wall_slide_mult;
        }
    }
    out
}

/// One-tile step for a hostile actor: primary direction, else secondary
///
/// Returns the destination tile, or `None` when both are blocked.
pub fn step_with_fallback<O: CollisionOracle + ?Sized>(
    oracle: &O,
    from: IVec2,
    primary: IVec2,
    secondary: IVec2,
) -> Option<IVec2> {
    [primary, secondary]
        .into_iter()
        .filter(|dir| *dir != IVec2::ZERO)
        .map(|dir| from + dir)
        .find(|tile| oracle.is_walkable(tile.x, tile.y))
}
