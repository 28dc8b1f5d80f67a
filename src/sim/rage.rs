//! Rage: difficulty from kill rate
//!
//! Rage is `kills / max(time, 1) * 100`, clamped to [0, 100], and mapped to a
//! discrete level. Level changes are edge-triggered.

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use crate::tuning::RageConfig;

pub const MAX_RAGE: f32 = 100.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RageSystem {
    rage: f32,
    level: usize,
}

impl RageSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute rage from totals; reports a level change only on a new level
    pub fn update(
        &mut self,
        kills: u32,
        survival_time: f32,
        cfg: &RageConfig,
        events: &mut Vec<GameEvent>,
    ) {
        let time = survival_time.max(1.0);
        let rage = kills as f32 / time * 100.0;
        self.rage = if rage.is_finite() {
            rage.clamp(0.0, MAX_RAGE)
        } else {
            MAX_RAGE
        };

        let level = cfg.level_for(self.rage);
        if level != self.level {
            self.level = level;
            let name = cfg.name(level).to_string();
            log::info!("Rage level {} ({:.0}%): {}", level, self.rage, name);
            events.push(GameEvent::RageLevelChanged { level, name });
        }
    }

    /// Continuous rage in [0, 100]
    pub fn rage(&self) -> f32 {
        self.rage
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn normalized(&self) -> f32 {
        self.rage / MAX_RAGE
    }

    pub fn speed_multiplier(&self, cfg: &RageConfig) -> f32 {
        cfg.speed_multipliers.get(self.level).copied().unwrap_or(1.0)
    }

    pub fn damage_multiplier(&self, cfg: &RageConfig) -> f32 {
        cfg.damage_multipliers.get(self.level).copied().unwrap_or(1.0)
    }

    pub fn level_name<'a>(&self, cfg: &'a RageConfig) -> &'a str {
        cfg.name(self.level)
    }

    pub fn is_berserk(&self, cfg: &RageConfig) -> bool {
        self.level == cfg.last_level()
    }

    /// Set rage directly (console/restore); no event is reported
    pub fn set_level(&mut self, rage: f32, cfg: &RageConfig) {
        self.rage = if rage.is_nan() {
            0.0
        } else {
            rage.clamp(0.0, MAX_RAGE)
        };
        self.level = cfg.level_for(self.rage);
    }

    /// Set rage from a 0..1 fraction
    pub fn set_progress(&mut self, progress: f32, cfg: &RageConfig) {
        self.set_level(progress * MAX_RAGE, cfg);
    }

    pub fn max_out(&mut self, cfg: &RageConfig) {
        self.set_level(MAX_RAGE, cfg);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_to_max() {
        let cfg = RageConfig::default();
        let mut rage = RageSystem::new();
        let mut events = Vec::new();
        rage.update(1000, 1.0, &cfg, &mut events);
        assert_eq!(rage.rage(), 100.0);
        assert_eq!(rage.level(), cfg.last_level());
        assert!(rage.is_berserk(&cfg));
        assert_eq!(rage.speed_multiplier(&cfg), 1.5);
    }

    #[test]
    fn test_zero_time_floors_to_one_second() {
        let cfg = RageConfig::default();
        let mut rage = RageSystem::new();
        rage.update(0, 0.0, &cfg, &mut Vec::new());
        assert_eq!(rage.rage(), 0.0);
        rage.update(0, -5.0, &cfg, &mut Vec::new());
        assert_eq!(rage.rage(), 0.0);
    }

    #[test]
    fn test_level_change_is_edge_triggered() {
        let cfg = RageConfig::default();
        let mut rage = RageSystem::new();
        let mut events = Vec::new();
        // 30% rate: Alert
        rage.update(3, 10.0, &cfg, &mut events);
        rage.update(6, 20.0, &cfg, &mut events);
        rage.update(9, 30.0, &cfg, &mut events);
        assert_eq!(
            events,
            vec![GameEvent::RageLevelChanged {
                level: 1,
                name: "Alert".to_string()
            }]
        );
    }

    #[test]
    fn test_converges_under_constant_rate() {
        let cfg = RageConfig::default();
        let mut rage = RageSystem::new();
        let ratio = 0.45;
        for t in 1..=600 {
            let time = t as f32;
            let kills = (time * ratio).floor() as u32;
            rage.update(kills, time, &cfg, &mut Vec::new());
        }
        assert!((rage.rage() - 45.0).abs() < 0.5);
        assert_eq!(rage.level_name(&cfg), "Aggressive");
    }

    #[test]
    fn test_set_level_and_progress() {
        let cfg = RageConfig::default();
        let mut rage = RageSystem::new();
        rage.set_level(150.0, &cfg);
        assert_eq!(rage.rage(), 100.0);
        rage.set_progress(0.5, &cfg);
        assert_eq!(rage.level(), 2);
        assert!((rage.normalized() - 0.5).abs() < 1e-6);
        rage.max_out(&cfg);
        assert!(rage.is_berserk(&cfg));
    }
}
