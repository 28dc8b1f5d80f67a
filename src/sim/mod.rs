//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (one per world)
//! - Stable iteration order; removal only in the end-of-tick compaction pass
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod collision;
pub mod combat;
pub mod combo;
pub mod enemy;
pub mod events;
pub mod motion;
pub mod player;
pub mod projectile;
pub mod rage;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod transform;
pub mod wave;

pub use collision::{Access, AxisBlock, CollisionOracle, Tile, TileGrid};
pub use combat::{DamageType, Facing, Strike, Weapon, WeaponEffect, WeaponKind};
pub use combo::ComboSystem;
pub use enemy::{AiState, Enemy, Shield};
pub use events::{GameEvent, LootKind};
pub use player::{Armor, BuffKind, Buffs, LifeState, Player};
pub use projectile::{Owner, Projectile};
pub use rage::RageSystem;
pub use state::{RunStats, World};
pub use tick::{FixedStep, TickInput, tick};
pub use transform::Transform;
pub use wave::WaveSystem;
