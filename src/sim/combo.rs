//! Kill combo
//!
//! Each kill bumps the combo and restarts a decay window. When the window runs
//! out with no further kill, the combo breaks.

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use crate::tuning::ComboConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboSystem {
    current: u32,
    max: u32,
    decay_timer: f32,
    active: bool,
}

impl ComboSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kill; returns the score multiplier for it
    pub fn on_kill(&mut self, cfg: &ComboConfig, events: &mut Vec<GameEvent>) -> f32 {
        self.current = self.current.saturating_add(1);
        self.active = true;
        self.decay_timer = cfg.decay_time;
        self.max = self.max.max(self.current);

        let multiplier = cfg.multiplier(self.current);
        events.push(GameEvent::ComboIncreased {
            combo: self.current,
            multiplier,
        });
        if let Some(name) = cfg.milestone(self.current) {
            log::info!("Combo milestone {} ({})", self.current, name);
            events.push(GameEvent::MilestoneReached {
                combo: self.current,
                name: name.to_string(),
            });
        }
        multiplier
    }

    pub fn update(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        if !self.active || self.current == 0 {
            return;
        }
        self.decay_timer -= dt;
        if self.decay_timer <= 0.0 {
            let final_combo = self.current;
            self.current = 0;
            self.decay_timer = 0.0;
            self.active = false;
            log::debug!("Combo broken at {}", final_combo);
            events.push(GameEvent::ComboReset { final_combo });
        }
    }

    /// Add time to the running window (buff hook)
    pub fn extend_decay(&mut self, extra: f32) {
        if self.active && extra > 0.0 {
            self.decay_timer += extra;
        }
    }

    /// Clear everything, including the best combo
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clear the running combo but keep the best
    pub fn soft_reset(&mut self) {
        self.current = 0;
        self.decay_timer = 0.0;
        self.active = false;
    }

    /// Restore a saved combo; a nonzero combo gets a fresh window
    pub fn restore(&mut self, current: u32, max: u32, cfg: &ComboConfig) {
        self.current = current;
        self.max = max.max(current);
        self.active = current > 0;
        self.decay_timer = if current > 0 { cfg.decay_time } else { 0.0 };
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn decay_timer(&self) -> f32 {
        self.decay_timer
    }

    pub fn multiplier(&self, cfg: &ComboConfig) -> f32 {
        cfg.multiplier(self.current)
    }

    pub fn name<'a>(&self, cfg: &'a ComboConfig) -> &'a str {
        cfg.name(self.current)
    }

    /// Remaining fraction of the decay window, 0 when idle
    pub fn decay_progress(&self, cfg: &ComboConfig) -> f32 {
        if !self.active || self.current == 0 || cfg.decay_time <= 0.0 {
            0.0
        } else {
            self.decay_timer / cfg.decay_time
        }
    }
}
