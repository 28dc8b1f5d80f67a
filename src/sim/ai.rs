//! Enemy patrol/chase state machine
//!
//! Decisions happen only on a decision tick: the enemy has arrived on its
//! target tile and its cooldown has run out. Between decisions the visual
//! position glides toward the target tile.
//!
//! - Patrol: wander one tile at a time in a random cardinal direction
//! - Chase: greedy single step toward the player's tile, X axis first

use glam::{IVec2, Vec2};
use rand::Rng;

use super::collision::{self, CollisionOracle};
use super::enemy::{AiState, Enemy};
use super::motion::approach;
use crate::tuning::AiConfig;

const CARDINALS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// What an enemy knows about the world this frame
#[derive(Debug, Clone, Copy)]
pub struct AiContext {
    /// Live continuous player center (chase trigger distance)
    pub player_center: Vec2,
    /// Player's current tile (chase step direction)
    pub player_tile: IVec2,
    /// Difficulty speed scale
    pub speed_multiplier: f32,
    /// Status-effect speed scale (slow)
    pub slow_multiplier: f32,
}

/// Visual position has converged on the target tile
pub fn has_arrived(enemy: &Enemy, cfg: &AiConfig) -> bool {
    enemy.transform.pos.distance(enemy.target_tile.as_vec2()) <= cfg.arrive_epsilon
}

/// One frame of AI for a live, unstunned, unfrozen enemy
pub fn update_enemy<O, R>(
    enemy: &mut Enemy,
    oracle: &O,
    ctx: &AiContext,
    cfg: &AiConfig,
    rng: &mut R,
    dt: f32,
) where
    O: CollisionOracle + ?Sized,
    R: Rng,
{
    if enemy.is_dead() || enemy.is_stunned() || enemy.is_frozen() || enemy.knockback != Vec2::ZERO
    {
        return;
    }

    enemy.decision_cooldown = (enemy.decision_cooldown - dt).max(0.0);
    enemy.patrol_timer -= dt;

    if has_arrived(enemy, cfg) && enemy.decision_cooldown <= 0.0 {
        decide(enemy, oracle, ctx, cfg, rng);
    }

    let base = match enemy.state {
        AiState::Patrol => cfg.patrol_speed,
        AiState::Chase => cfg.chase_speed,
    };
    let speed = base * ctx.speed_multiplier * ctx.slow_multiplier;
    glide_to_target(enemy, speed * dt, cfg);
}

fn decide<O, R>(enemy: &mut Enemy, oracle: &O, ctx: &AiContext, cfg: &AiConfig, rng: &mut R)
where
    O: CollisionOracle + ?Sized,
    R: Rng,
{
    let distance = enemy.transform.center().distance(ctx.player_center);
    let next_state = if distance < cfg.detect_range {
        AiState::Chase
    } else {
        AiState::Patrol
    };
    if next_state != enemy.state {
        log::debug!("Enemy {} {:?} -> {:?}", enemy.id, enemy.state, next_state);
        enemy.state = next_state;
    }

    match enemy.state {
        AiState::Chase => {
            chase_step(enemy, oracle, ctx.player_tile);
            enemy.decision_cooldown = cfg.chase_cooldown;
        }
        AiState::Patrol => {
            patrol_step(enemy, oracle, cfg, rng);
            enemy.decision_cooldown = cfg.patrol_cooldown;
        }
    }
}

/// Step toward the player's tile, X first; stay put if both are blocked
pub fn chase_step<O: CollisionOracle + ?Sized>(enemy: &mut Enemy, oracle: &O, player_tile: IVec2) {
    let here = enemy.target_tile;
    let sign = (player_tile - here).signum();
    let x_step = IVec2::new(sign.x, 0);
    let y_step = IVec2::new(0, sign.y);
    if let Some(tile) = collision::step_with_fallback(oracle, here, x_step, y_step) {
        enemy.target_tile = tile;
    }
}

/// Wander; a blocked step re-rolls the direction at once
pub fn patrol_step<O, R>(enemy: &mut Enemy, oracle: &O, cfg: &AiConfig, rng: &mut R)
where
    O: CollisionOracle + ?Sized,
    R: Rng,
{
    if enemy.patrol_timer <= 0.0 || enemy.patrol_dir == IVec2::ZERO {
        reroll_patrol(enemy, cfg, rng);
    }

    let next = enemy.target_tile + enemy.patrol_dir;
    if oracle.is_walkable(next.x, next.y) {
        enemy.target_tile = next;
    } else {
        reroll_patrol(enemy, cfg, rng);
    }
}

fn reroll_patrol<R: Rng>(enemy: &mut Enemy, cfg: &AiConfig, rng: &mut R) {
    enemy.patrol_dir = CARDINALS[rng.random_range(0..CARDINALS.len())];
    enemy.patrol_timer = cfg.patrol_reroll_base + rng.random::<f32>() * cfg.patrol_reroll_jitter;
}

/// Move the visual position toward the target tile without overshooting
fn glide_to_target(enemy: &mut Enemy, step: f32, cfg: &AiConfig) {
    let target = enemy.target_tile.as_vec2();
    let pos = &mut enemy.transform.pos;
    pos.x = approach(pos.x, target.x, step);
    pos.y = approach(pos.y, target.y, step);
    if pos.distance(target) <= cfg.arrive_epsilon {
        *pos = target;
    }
}
