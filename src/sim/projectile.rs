//! Ranged projectiles
//!
//! A projectile flies in a straight line until its lifetime runs out, it
//! enters a non-walkable tile, or it is consumed by a hit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::CollisionOracle;
use super::combat::{DamageType, Weapon, WeaponEffect, WeaponKind};
use super::transform::Transform;
use crate::tuning::CombatConfig;
use crate::try_direction;

/// Which side fired the projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Hostile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub transform: Transform,
    pub vel: Vec2,
    pub damage: i32,
    pub damage_type: DamageType,
    pub effect: WeaponEffect,
    pub owner: Owner,
    /// Opaque key for the renderer
    pub visual: String,
    /// Center at launch, for distance-based knockback falloff
    pub origin: Vec2,
    lifetime: f32,
    expired: bool,
}

impl Projectile {
    /// Fire a ranged weapon from `center` toward `aim`
    ///
    /// Returns `None` for melee weapons or a zero-length aim.
    pub fn fire(
        id: u32,
        center: Vec2,
        aim: Vec2,
        weapon: &Weapon,
        damage_bonus: i32,
        owner: Owner,
        cfg: &CombatConfig,
    ) -> Option<Self> {
        let WeaponKind::Ranged { projectile_speed } = weapon.kind else {
            return None;
        };
        let dir = try_direction(aim)?;

        let start = center + dir * cfg.projectile_spawn_offset;
        let size = Vec2::splat(cfg.projectile_size);
        Some(Self {
            id,
            transform: Transform {
                pos: start - size * 0.5,
                size,
            },
            vel: dir * projectile_speed,
            damage: weapon.damage + damage_bonus,
            damage_type: weapon.damage_type,
            effect: weapon.effect,
            owner,
            visual: weapon.name.clone(),
            origin: start,
            lifetime: cfg.projectile_lifetime,
            expired: false,
        })
    }

    /// Move one step; expires on timeout or when entering a wall
    pub fn advance<O: CollisionOracle + ?Sized>(&mut self, oracle: &O, dt: f32) {
        if self.expired {
            return;
        }
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.expired = true;
            return;
        }

        self.transform.pos += self.vel * dt;
        let tile = self.transform.tile();
        if !oracle.is_walkable(tile.x, tile.y) {
            self.expired = true;
        }
    }

    /// Circle-vs-circle overlap using both half-widths as the combined radius
    pub fn hits(&self, target: &Transform) -> bool {
        if self.expired {
            return false;
        }
        let reach = self.transform.half_width() + target.half_width();
        self.transform.center().distance_squared(target.center()) <= reach * reach
    }

    /// Consume the projectile after it struck something
    pub fn mark_hit(&mut self) {
        self.expired = true;
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn is_player_owned(&self) -> bool {
        self.owner == Owner::Player
    }

    pub fn remaining_lifetime(&self) -> f32 {
        self.lifetime.max(0.0)
    }

    pub fn travelled(&self) -> f32 {
        self.transform.center().distance(self.origin)
    }
}
