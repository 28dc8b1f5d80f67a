//! Acceleration-based movement
//!
//! Input intent becomes a target velocity; the actual velocity chases it at a
//! bounded rate. The same friction model decays knockback impulses.

use glam::Vec2;

use crate::clamp_between;
use crate::tuning::PhysicsConfig;

/// Target velocity for a movement intent
///
/// The intent is clamped to unit length so diagonals are not faster.
/// Non-finite input is treated as no input.
pub fn target_velocity(intent: Vec2, speed: f32) -> Vec2 {
    if !intent.is_finite() {
        return Vec2::ZERO;
    }
    intent.clamp_length_max(1.0) * speed
}

/// Move one velocity component toward its target
pub fn accelerate_axis(vel: f32, target: f32, cfg: &PhysicsConfig, dt: f32) -> f32 {
    let diff = target - vel;
    let mut accel = if target != 0.0 { cfg.accel } else { cfg.decel };

    // Sharp reversal
    if target != 0.0 && vel != 0.0 && target.signum() != vel.signum() {
        accel *= cfg.turn_boost;
    }

    let max_change = (accel * dt).abs();
    let mut next = vel + clamp_between(diff, -max_change, max_change);

    if target == 0.0 && next.abs() < cfg.stop_threshold {
        next = 0.0;
    }
    next
}

/// Per-axis acceleration toward a target velocity
pub fn accelerate(vel: Vec2, target: Vec2, cfg: &PhysicsConfig, dt: f32) -> Vec2 {
    Vec2::new(
        accelerate_axis(vel.x, target.x, cfg, dt),
        accelerate_axis(vel.y, target.y, cfg, dt),
    )
}

/// Exponential friction toward zero; components under `stop` are zeroed
pub fn decay_impulse(impulse: Vec2, friction: f32, stop: f32, dt: f32) -> Vec2 {
    let factor = (1.0 - friction * dt).max(0.0);
    let mut out = impulse * factor;
    if out.x.abs() < stop {
        out.x = 0.0;
    }
    if out.y.abs() < stop {
        out.y = 0.0;
    }
    out
}

/// Pull a resting position toward the nearest integer tile
pub fn grid_snap(pos: Vec2, snap_speed: f32, dt: f32) -> Vec2 {
    let goal = pos.round();
    let step = snap_speed * dt;
    Vec2::new(
        approach(pos.x, goal.x, step),
        approach(pos.y, goal.y, step),
    )
}

/// Move `from` toward `to` by at most `step`
#[inline]
pub fn approach(from: f32, to: f32, step: f32) -> f32 {
    if from < to {
        (from + step).min(to)
    } else {
        (from - step).max(to)
    }
}
