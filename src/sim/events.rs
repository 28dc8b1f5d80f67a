//! Discrete happenings reported by the simulation
//!
//! Systems push events into a queue during `tick`; the owning screen drains
//! it once per frame to drive audio, floating text and achievements.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat::WeaponEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LootKind {
    HealthPotion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ComboIncreased { combo: u32, multiplier: f32 },
    /// `final_combo` is the count before it was cleared
    ComboReset { final_combo: u32 },
    MilestoneReached { combo: u32, name: String },
    RageLevelChanged { level: usize, name: String },
    WaveChanged {
        index: usize,
        spawn_interval: f32,
        health_multiplier: f32,
    },
    SpawnEnemy,
    SpawnBoss,
    EnemyKilled { pos: Vec2, boss: bool, score: u64 },
    /// Pickup handling lives outside the core
    LootDropped { pos: Vec2, kind: LootKind },
    PlayerDamaged { amount: i32 },
    PlayerDied,
    ProjectileHit {
        pos: Vec2,
        damage: i32,
        effect: WeaponEffect,
    },
    WeaponFired { ranged: bool },
}
