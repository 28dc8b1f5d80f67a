//! Hostile actors
//!
//! An enemy keeps a continuous visual position and a discrete target tile.
//! Death and removal are separate: a dead enemy lingers as a corpse until its
//! timer runs out, then the world drops it in the batch compaction pass.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::collision::{self, Access, CollisionOracle};
use super::combat::{DamageType, Strike, WeaponEffect};
use super::motion;
use super::transform::Transform;
use crate::try_direction;
use crate::tuning::{CombatConfig, EffectConfig, PhysicsConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Patrol,
    Chase,
}

/// Absorbs damage of one type before it reaches health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shield {
    pub kind: DamageType,
    pub amount: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyLife {
    Alive,
    Dead {
        corpse_timer: f32,
        /// Death hook already ran
        claimed: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub transform: Transform,
    pub target_tile: IVec2,
    pub state: AiState,
    pub boss: bool,
    health: i32,
    max_health: i32,
    /// Type of the damage this enemy deals on contact
    pub attack_type: DamageType,
    pub shield: Option<Shield>,
    pub decision_cooldown: f32,
    pub patrol_dir: IVec2,
    pub patrol_timer: f32,
    pub knockback: Vec2,
    stun_timer: f32,
    hurt_timer: f32,
    effect: WeaponEffect,
    effect_timer: f32,
    dot_timer: f32,
    life: EnemyLife,
}

impl Enemy {
    /// New enemy resting on `tile`
    pub fn new(id: u32, tile: IVec2, health: i32, size: f32) -> Self {
        let health = health.max(1);
        Self {
            id,
            transform: Transform::new(tile.as_vec2(), size),
            target_tile: tile,
            state: AiState::Patrol,
            boss: false,
            health,
            max_health: health,
            attack_type: DamageType::Physical,
            shield: None,
            decision_cooldown: 0.0,
            patrol_dir: IVec2::ZERO,
            patrol_timer: 0.0,
            knockback: Vec2::ZERO,
            stun_timer: 0.0,
            hurt_timer: 0.0,
            effect: WeaponEffect::None,
            effect_timer: 0.0,
            dot_timer: 0.0,
            life: EnemyLife::Alive,
        }
    }

    pub fn with_shield(mut self, kind: DamageType, amount: i32) -> Self {
        self.shield = Some(Shield {
            kind,
            amount,
            max: amount,
        });
        self
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.life, EnemyLife::Dead { .. })
    }

    /// Corpse timer elapsed; safe to drop from the world
    pub fn is_removable(&self) -> bool {
        matches!(self.life, EnemyLife::Dead { corpse_timer, .. } if corpse_timer <= 0.0)
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_timer > 0.0
    }

    /// Cosmetic hit flash
    pub fn is_hurt(&self) -> bool {
        self.hurt_timer > 0.0
    }

    pub fn effect(&self) -> WeaponEffect {
        self.effect
    }

    pub fn is_frozen(&self) -> bool {
        self.effect == WeaponEffect::Freeze
    }

    pub fn slow_multiplier(&self, cfg: &EffectConfig) -> f32 {
        if self.effect == WeaponEffect::Slow {
            cfg.slow_multiplier
        } else {
            1.0
        }
    }

    /// Apply damage through the shield; returns true on the hit that kills
    pub fn take_damage(&mut self, amount: i32, kind: DamageType, cfg: &CombatConfig) -> bool {
        if self.is_dead() || amount <= 0 {
            return false;
        }

        let mut remaining = amount;
        if let Some(shield) = self.shield.as_mut().filter(|s| s.kind == kind && s.amount > 0) {
            let absorbed = remaining.min(shield.amount);
            shield.amount -= absorbed;
            remaining -= absorbed;
        }

        self.health = (self.health - remaining).max(0);
        self.hurt_timer = cfg.hurt_duration;

        if self.health == 0 {
            self.life = EnemyLife::Dead {
                corpse_timer: cfg.corpse_duration,
                claimed: false,
            };
            self.effect = WeaponEffect::None;
            self.effect_timer = 0.0;
            self.dot_timer = 0.0;
            return true;
        }
        false
    }

    /// Kill outright, ignoring shields; returns false if already dead
    pub fn kill(&mut self, cfg: &CombatConfig) -> bool {
        if self.is_dead() {
            return false;
        }
        self.shield = None;
        let health = self.health;
        self.take_damage(health, DamageType::Physical, cfg)
    }

    /// Mark the death as handled; true only the first time after dying
    pub fn claim_death(&mut self) -> bool {
        match &mut self.life {
            EnemyLife::Dead { claimed, .. } if !*claimed => {
                *claimed = true;
                true
            }
            _ => false,
        }
    }

    pub fn apply_effect(&mut self, effect: WeaponEffect, cfg: &EffectConfig) {
        if self.is_dead() {
            return;
        }
        let duration = match effect {
            WeaponEffect::None => return,
            WeaponEffect::Freeze => cfg.freeze_duration,
            WeaponEffect::Slow => cfg.slow_duration,
            WeaponEffect::Burn => cfg.burn_duration,
            WeaponEffect::Poison => cfg.poison_duration,
        };
        if self.effect != effect {
            self.dot_timer = 0.0;
        }
        self.effect = effect;
        self.effect_timer = duration;
    }

    /// Impulse away from `source`, plus a short stun
    pub fn apply_knockback(&mut self, source: Vec2, strength: f32, cfg: &CombatConfig) {
        if let Some(dir) = try_direction(self.transform.center() - source) {
            self.knockback = dir * cfg.enemy_knockback * strength;
        }
        if !self.is_dead() {
            self.stun_timer = cfg.stun_duration;
        }
    }

    /// Full hit pipeline: damage, then effect if it survived, then knockback
    ///
    /// Returns true on the killing hit.
    pub fn receive_strike(
        &mut self,
        strike: &Strike,
        combat: &CombatConfig,
        effects: &EffectConfig,
    ) -> bool {
        if self.is_dead() {
            return false;
        }
        let killed = self.take_damage(strike.damage, strike.damage_type, combat);
        if !killed {
            self.apply_effect(strike.effect, effects);
        }
        self.apply_knockback(strike.source, strike.knockback, combat);
        killed
    }

    /// Knockback travel with wall bounce; hard wall hits hurt
    ///
    /// Runs for corpses too, so killing blows still send bodies flying.
    pub fn update_physics<O: CollisionOracle + ?Sized>(
        &mut self,
        oracle: &O,
        combat: &CombatConfig,
        physics: &PhysicsConfig,
        dt: f32,
    ) {
        if self.knockback == Vec2::ZERO {
            return;
        }

        let (pos, blocked) = collision::move_axis_separated(
            oracle,
            self.transform.pos,
            self.transform.size,
            self.knockback * dt,
            physics.collision_padding,
            Access::Hostile,
        );
        self.transform.pos = pos;

        if blocked.x {
            if self.knockback.x.abs() > combat.wall_impact_speed {
                self.take_damage(1, DamageType::Physical, combat);
            }
            self.knockback.x = -self.knockback.x * combat.wall_impact_bounce;
        }
        if blocked.y {
            if self.knockback.y.abs() > combat.wall_impact_speed {
                self.take_damage(1, DamageType::Physical, combat);
            }
            self.knockback.y = -self.knockback.y * combat.wall_impact_bounce;
        }

        self.knockback = motion::decay_impulse(
            self.knockback,
            combat.knockback_friction,
            combat.knockback_stop,
            dt,
        );

        // Re-anchor the decision grid where the push left us
        let rounded = self.transform.pos.round().as_ivec2();
        if oracle.is_walkable(rounded.x, rounded.y) {
            self.target_tile = rounded;
        }
    }

    /// Count down corpse, stun, hurt and status timers; applies damage over time
    pub fn update_timers(&mut self, combat: &CombatConfig, effects: &EffectConfig, dt: f32) {
        if let EnemyLife::Dead { corpse_timer, .. } = &mut self.life {
            *corpse_timer -= dt;
            return;
        }

        self.stun_timer = (self.stun_timer - dt).max(0.0);
        self.hurt_timer = (self.hurt_timer - dt).max(0.0);

        if self.effect == WeaponEffect::None {
            return;
        }
        self.effect_timer -= dt;
        if matches!(self.effect, WeaponEffect::Burn | WeaponEffect::Poison) {
            self.dot_timer += dt;
            if self.dot_timer >= effects.dot_interval {
                self.dot_timer -= effects.dot_interval;
                if self.take_damage(effects.dot_damage, DamageType::Magical, combat) {
                    return;
                }
            }
        }
        if self.effect_timer <= 0.0 {
            self.effect = WeaponEffect::None;
            self.effect_timer = 0.0;
            self.dot_timer = 0.0;
        }
    }
}
