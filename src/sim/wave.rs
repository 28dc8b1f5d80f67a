//! Time-driven waves and spawn schedules
//!
//! Survival time selects the wave tier. Normal and boss spawns run on two
//! independent absolute schedules; each reschedules from "now", so a long
//! frame never produces a burst of catch-up spawns.

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use crate::tuning::WaveConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveSystem {
    survival_time: f32,
    wave: usize,
    next_spawn_time: f32,
    next_boss_time: f32,
}

impl WaveSystem {
    pub fn new(cfg: &WaveConfig) -> Self {
        Self {
            survival_time: 0.0,
            wave: 0,
            next_spawn_time: cfg.spawn_interval(0),
            next_boss_time: cfg.first_boss_time,
        }
    }

    pub fn update(&mut self, dt: f32, cfg: &WaveConfig, events: &mut Vec<GameEvent>) {
        self.survival_time += dt.max(0.0);

        let wave = cfg.index_for(self.survival_time);
        if wave != self.wave {
            self.wave = wave;
            log::info!(
                "Wave {} at {} (spawn every {:.1}s, health x{:.2})",
                wave + 1,
                self.formatted_time(),
                cfg.spawn_interval(wave),
                cfg.health_multiplier(wave)
            );
            events.push(GameEvent::WaveChanged {
                index: wave,
                spawn_interval: cfg.spawn_interval(wave),
                health_multiplier: cfg.health_multiplier(wave),
            });
        }

        if self.survival_time >= cfg.safe_period && self.survival_time >= self.next_spawn_time {
            self.next_spawn_time = self.survival_time + cfg.spawn_interval(self.wave);
            events.push(GameEvent::SpawnEnemy);
        }

        if self.survival_time >= cfg.first_boss_time && self.survival_time >= self.next_boss_time {
            self.next_boss_time = self.survival_time + cfg.boss_interval;
            events.push(GameEvent::SpawnBoss);
        }
    }

    /// Jump to a saved survival time, rebuilding the wave and both schedules
    ///
    /// The next boss lands on the `first_boss_time + k * boss_interval` grid.
    pub fn restore_survival_time(&mut self, time: f32, cfg: &WaveConfig) {
        let time = if time.is_finite() { time.max(0.0) } else { 0.0 };
        self.survival_time = time;
        self.wave = cfg.index_for(time);
        self.next_spawn_time = time + cfg.spawn_interval(self.wave);
        self.next_boss_time = if time >= cfg.first_boss_time {
            let bosses = ((time - cfg.first_boss_time) / cfg.boss_interval).floor();
            cfg.first_boss_time + (bosses + 1.0) * cfg.boss_interval
        } else {
            cfg.first_boss_time
        };
    }

    pub fn reset(&mut self, cfg: &WaveConfig) {
        *self = Self::new(cfg);
    }

    pub fn survival_time(&self) -> f32 {
        self.survival_time
    }

    pub fn wave(&self) -> usize {
        self.wave
    }

    pub fn wave_name(&self) -> String {
        format!("Wave {}", self.wave + 1)
    }

    pub fn next_spawn_time(&self) -> f32 {
        self.next_spawn_time
    }

    pub fn next_boss_time(&self) -> f32 {
        self.next_boss_time
    }

    pub fn spawn_interval(&self, cfg: &WaveConfig) -> f32 {
        cfg.spawn_interval(self.wave)
    }

    pub fn health_multiplier(&self, cfg: &WaveConfig) -> f32 {
        cfg.health_multiplier(self.wave)
    }

    /// Seconds until the next tier, `None` on the last tier
    pub fn time_to_next_wave(&self, cfg: &WaveConfig) -> Option<f32> {
        cfg.time_thresholds
            .get(self.wave + 1)
            .map(|&t| (t - self.survival_time).max(0.0))
    }

    pub fn is_boss_phase(&self, cfg: &WaveConfig) -> bool {
        self.survival_time >= cfg.first_boss_time
    }

    pub fn time_to_next_boss(&self, cfg: &WaveConfig) -> f32 {
        if self.is_boss_phase(cfg) {
            (self.next_boss_time - self.survival_time).max(0.0)
        } else {
            cfg.first_boss_time - self.survival_time
        }
    }

    /// Survival time as MM:SS
    pub fn formatted_time(&self) -> String {
        let total = self.survival_time as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(events: &[GameEvent], want: &GameEvent) -> usize {
        events.iter().filter(|e| *e == want).count()
    }

    #[test]
    fn test_safe_period_suppresses_spawns() {
        let cfg = WaveConfig::default();
        let mut wave = WaveSystem::new(&cfg);
        let mut events = Vec::new();
        for _ in 0..14 {
            wave.update(1.0, &cfg, &mut events);
        }
        assert_eq!(count(&events, &GameEvent::SpawnEnemy), 0);
        wave.update(1.0, &cfg, &mut events);
        assert_eq!(count(&events, &GameEvent::SpawnEnemy), 1);
        assert!((wave.next_spawn_time() - 19.0).abs() < 1e-4);
    }

    #[test]
    fn test_hitch_does_not_cause_catch_up() {
        let cfg = WaveConfig::default();
        let mut wave = WaveSystem::new(&cfg);
        wave.restore_survival_time(20.0, &cfg);
        let mut events = Vec::new();
        // One huge frame spanning many intervals
        wave.update(30.0, &cfg, &mut events);
        assert_eq!(count(&events, &GameEvent::SpawnEnemy), 1);
        assert!((wave.next_spawn_time() - 54.0).abs() < 1e-4);
    }

    #[test]
    fn test_wave_changes_at_thresholds() {
        let cfg = WaveConfig::default();
        let mut wave = WaveSystem::new(&cfg);
        let mut events = Vec::new();
        for _ in 0..359 {
            wave.update(0.25, &cfg, &mut events);
        }
        assert_eq!(wave.wave(), 0);
        wave.update(0.25, &cfg, &mut events);
        assert_eq!(wave.wave(), 1);
        let changes: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::WaveChanged { .. }))
            .collect();
        assert_eq!(
            changes,
            vec![&GameEvent::WaveChanged {
                index: 1,
                spawn_interval: 3.0,
                health_multiplier: 1.1
            }]
        );
    }

    #[test]
    fn test_boss_schedule() {
        let cfg = WaveConfig::default();
        let mut wave = WaveSystem::new(&cfg);
        wave.restore_survival_time(719.0, &cfg);
        assert!(!wave.is_boss_phase(&cfg));
        assert!((wave.time_to_next_boss(&cfg) - 1.0).abs() < 1e-3);

        let mut events = Vec::new();
        wave.update(1.0, &cfg, &mut events);
        assert_eq!(count(&events, &GameEvent::SpawnBoss), 1);
        assert!((wave.next_boss_time() - 840.0).abs() < 1e-3);
    }

    #[test]
    fn test_restore_aligns_boss_grid() {
        let cfg = WaveConfig::default();
        let mut wave = WaveSystem::new(&cfg);
        wave.restore_survival_time(900.0, &cfg);
        assert_eq!(wave.wave(), 5);
        assert!((wave.next_boss_time() - 960.0).abs() < 1e-3);
        assert!((wave.next_spawn_time() - 901.0).abs() < 1e-3);
        assert_eq!(wave.time_to_next_wave(&cfg), None);
    }

    #[test]
    fn test_formatted_time() {
        let cfg = WaveConfig::default();
        let mut wave = WaveSystem::new(&cfg);
        wave.restore_survival_time(754.9, &cfg);
        assert_eq!(wave.formatted_time(), "12:34");
        assert_eq!(wave.wave_name(), "Wave 5");
    }

    #[test]
    fn test_time_to_next_wave() {
        let cfg = WaveConfig::default();
        let mut wave = WaveSystem::new(&cfg);
        wave.restore_survival_time(100.0, &cfg);
        assert_eq!(wave.time_to_next_wave(&cfg), Some(140.0));
    }
}
