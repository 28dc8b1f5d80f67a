//! Data-driven game balance
//!
//! Every number the simulation reads lives here. The world owns one `Tuning`
//! by value and lends it out by reference, so a developer console can tweak
//! values between frames without any global state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Movement and wall-response constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Walking speed (tiles/s)
    pub walk_speed: f32,
    /// Sprinting speed (tiles/s)
    pub run_speed: f32,
    /// Move speed multiplier while the speed buff is active
    pub speed_buff_multiplier: f32,
    /// Acceleration toward a nonzero target velocity (tiles/s²)
    pub accel: f32,
    /// Deceleration toward a zero target velocity (tiles/s²)
    pub decel: f32,
    /// Acceleration multiplier on a sharp direction reversal
    pub turn_boost: f32,
    /// Velocity below this snaps to exactly zero when stopping
    pub stop_threshold: f32,
    /// Blocked-axis speed above which the player bounces off a wall
    pub high_speed: f32,
    /// Restitution on a high-speed wall hit
    pub wall_bounce: f32,
    /// Scale applied to the unblocked axis when glancing off a wall
    pub wall_slide_mult: f32,
    /// Inward padding of the four collision corners
    pub collision_padding: f32,
    /// Player footprint edge (tiles)
    pub player_size: f32,
    /// Grid snap assist pull speed (tiles/s)
    pub snap_speed: f32,
    /// Snap assist only engages below this speed
    pub snap_assist_speed: f32,
    /// Player knockback impulse per unit of strength (tiles/s)
    pub player_knockback: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            walk_speed: 3.5,
            run_speed: 7.0,
            speed_buff_multiplier: 1.5,
            accel: 40.0,
            decel: 30.0,
            turn_boost: 2.0,
            stop_threshold: 0.1,
            high_speed: 4.0,
            wall_bounce: 0.25,
            wall_slide_mult: 0.85,
            collision_padding: 0.1,
            player_size: 0.9,
            snap_speed: 10.0,
            snap_assist_speed: 0.5,
            player_knockback: 6.0,
        }
    }
}

/// Attack, damage and knockback constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub player_max_health: i32,
    pub energy_max: f32,
    /// Energy regenerated per second while alive
    pub energy_regen: f32,
    /// Half-width of the melee cone around the facing direction (degrees)
    pub melee_half_angle: f32,
    /// Targets closer than this are hit regardless of facing
    pub point_blank_radius: f32,
    pub knockback_base: f32,
    pub knockback_min: f32,
    pub knockback_max: f32,
    pub sprint_knockback: f32,
    /// Enemy knockback impulse per unit of strength (tiles/s)
    pub enemy_knockback: f32,
    /// Exponential friction applied to knockback impulses (1/s)
    pub knockback_friction: f32,
    /// Knockback components below this are zeroed
    pub knockback_stop: f32,
    /// Knockback speed above which a wall hit hurts the enemy
    pub wall_impact_speed: f32,
    pub wall_impact_bounce: f32,
    pub stun_duration: f32,
    pub hurt_duration: f32,
    /// Dead enemies stay in the world this long before removal
    pub corpse_duration: f32,
    /// Player death animation length
    pub death_duration: f32,
    pub invincibility_duration: f32,
    pub ranged_knockback: f32,
    /// Projectile travel distance at which knockback bottoms out
    pub ranged_falloff_range: f32,
    pub ranged_min_falloff: f32,
    /// Projectiles spawn this far in front of the shooter
    pub projectile_spawn_offset: f32,
    pub projectile_lifetime: f32,
    pub projectile_size: f32,
    /// Enemy-player distance that counts as a touch
    pub contact_distance: f32,
    pub contact_damage: i32,
    pub contact_knockback: f32,
    /// Attack cooldown multiplier while the haste buff is active
    pub haste_cooldown_mult: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            player_max_health: 3,
            energy_max: 100.0,
            energy_regen: 10.0,
            melee_half_angle: 90.0,
            point_blank_radius: 0.5,
            knockback_base: 1.0,
            knockback_min: 1.0,
            knockback_max: 4.0,
            sprint_knockback: 2.0,
            enemy_knockback: 10.0,
            knockback_friction: 5.0,
            knockback_stop: 0.5,
            wall_impact_speed: 5.0,
            wall_impact_bounce: 0.5,
            stun_duration: 0.5,
            hurt_duration: 0.2,
            corpse_duration: 5.0,
            death_duration: 2.0,
            invincibility_duration: 1.0,
            ranged_knockback: 1.5,
            ranged_falloff_range: 10.0,
            ranged_min_falloff: 0.2,
            projectile_spawn_offset: 0.5,
            projectile_lifetime: 3.0,
            projectile_size: 0.3,
            contact_distance: 0.8,
            contact_damage: 1,
            contact_knockback: 1.5,
            haste_cooldown_mult: 0.5,
        }
    }
}

/// Status effect durations and strengths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub freeze_duration: f32,
    pub slow_duration: f32,
    pub slow_multiplier: f32,
    pub burn_duration: f32,
    pub poison_duration: f32,
    /// Seconds between damage-over-time ticks
    pub dot_interval: f32,
    pub dot_damage: i32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            freeze_duration: 3.0,
            slow_duration: 3.0,
            slow_multiplier: 0.5,
            burn_duration: 3.0,
            poison_duration: 5.0,
            dot_interval: 1.0,
            dot_damage: 1,
        }
    }
}

/// Enemy decision making and interpolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Patrol switches to chase inside this distance from the player
    pub detect_range: f32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    /// Seconds between decisions while patrolling
    pub patrol_cooldown: f32,
    /// Seconds between decisions while chasing
    pub chase_cooldown: f32,
    pub patrol_reroll_base: f32,
    pub patrol_reroll_jitter: f32,
    /// Enemies farther than this from the player are not simulated
    pub update_radius: f32,
    pub enemy_size: f32,
    /// Distance under which an enemy counts as arrived on its target tile
    pub arrive_epsilon: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            detect_range: 30.0,
            patrol_speed: 1.5,
            chase_speed: 2.5,
            patrol_cooldown: 0.3,
            chase_cooldown: 0.1,
            patrol_reroll_base: 2.0,
            patrol_reroll_jitter: 2.0,
            update_radius: 40.0,
            enemy_size: 0.9,
            arrive_epsilon: 0.01,
        }
    }
}

/// Kill-combo curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// Seconds without a kill before the combo breaks
    pub decay_time: f32,
    /// Ascending combo counts; index 0 is the base tier and never a milestone
    pub thresholds: Vec<u32>,
    pub multipliers: Vec<f32>,
    pub names: Vec<String>,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            decay_time: 5.0,
            thresholds: vec![0, 5, 10, 20, 50],
            multipliers: vec![1.0, 1.5, 2.0, 3.0, 5.0],
            names: ["", "NICE!", "GREAT!", "UNSTOPPABLE!", "GODLIKE!"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ComboConfig {
    /// Highest tier whose threshold the combo has reached
    pub fn tier(&self, combo: u32) -> usize {
        self.thresholds
            .iter()
            .rposition(|&t| combo >= t)
            .unwrap_or(0)
    }

    /// Score multiplier for a combo count
    pub fn multiplier(&self, combo: u32) -> f32 {
        self.multipliers.get(self.tier(combo)).copied().unwrap_or(1.0)
    }

    pub fn name(&self, combo: u32) -> &str {
        self.names.get(self.tier(combo)).map(String::as_str).unwrap_or("")
    }

    /// Milestone reached by landing exactly on a threshold (top-down, tier 0 excluded)
    pub fn milestone(&self, combo: u32) -> Option<&str> {
        (1..self.thresholds.len())
            .rev()
            .find(|&i| self.thresholds[i] == combo)
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }
}

/// Kill-rate difficulty levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RageConfig {
    /// Ascending rage values (0-100) at which each level begins
    pub thresholds: Vec<f32>,
    pub names: Vec<String>,
    pub speed_multipliers: Vec<f32>,
    pub damage_multipliers: Vec<f32>,
}

impl Default for RageConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![0.0, 21.0, 41.0, 61.0, 81.0],
            names: ["Calm", "Alert", "Aggressive", "Furious", "Berserk"]
                .into_iter()
                .map(String::from)
                .collect(),
            speed_multipliers: vec![1.0, 1.1, 1.2, 1.3, 1.5],
            damage_multipliers: vec![1.0, 1.0, 1.0, 1.2, 1.5],
        }
    }
}

impl RageConfig {
    pub fn level_for(&self, rage: f32) -> usize {
        self.thresholds
            .iter()
            .rposition(|&t| rage >= t)
            .unwrap_or(0)
    }

    pub fn name(&self, level: usize) -> &str {
        self.names.get(level).map(String::as_str).unwrap_or("")
    }

    pub fn last_level(&self) -> usize {
        self.thresholds.len().saturating_sub(1)
    }
}

/// Time-based wave tiers and spawn schedules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Ascending survival times (s) at which each wave begins
    pub time_thresholds: Vec<f32>,
    pub spawn_intervals: Vec<f32>,
    pub health_multipliers: Vec<f32>,
    /// No normal spawns before this much survival time
    pub safe_period: f32,
    pub first_boss_time: f32,
    pub boss_interval: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            time_thresholds: vec![0.0, 90.0, 240.0, 420.0, 600.0, 900.0],
            spawn_intervals: vec![4.0, 3.0, 2.5, 2.0, 1.5, 1.0],
            health_multipliers: vec![1.0, 1.1, 1.25, 1.5, 1.75, 2.0],
            safe_period: 15.0,
            first_boss_time: 720.0,
            boss_interval: 120.0,
        }
    }
}

impl WaveConfig {
    pub fn index_for(&self, survival_time: f32) -> usize {
        self.time_thresholds
            .iter()
            .rposition(|&t| survival_time >= t)
            .unwrap_or(0)
    }

    pub fn spawn_interval(&self, wave: usize) -> f32 {
        self.spawn_intervals.get(wave).copied().unwrap_or(1.0)
    }

    pub fn health_multiplier(&self, wave: usize) -> f32 {
        self.health_multipliers.get(wave).copied().unwrap_or(1.0)
    }
}

/// Spawn placement and enemy stat scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Random placement attempts before a spawn is skipped
    pub max_attempts: u32,
    pub max_enemies: usize,
    pub enemy_base_health: i32,
    pub enemy_health_per_mult: f32,
    pub boss_base_health: i32,
    pub boss_health_per_mult: f32,
    pub boss_shield: i32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            min_distance: 20.0,
            max_distance: 50.0,
            max_attempts: 100,
            max_enemies: 200,
            enemy_base_health: 30,
            enemy_health_per_mult: 20.0,
            boss_base_health: 300,
            boss_health_per_mult: 100.0,
            boss_shield: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub score_per_kill: u64,
    /// Chance a kill drops a health potion
    pub potion_drop_rate: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            score_per_kill: 100,
            potion_drop_rate: 0.15,
        }
    }
}

/// All balance tables in one place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsConfig,
    pub combat: CombatConfig,
    pub effects: EffectConfig,
    pub ai: AiConfig,
    pub combo: ComboConfig,
    pub rage: RageConfig,
    pub wave: WaveConfig,
    pub spawn: SpawnConfig,
    pub score: ScoreConfig,
}

impl Tuning {
    /// Parse and validate tuning from JSON (missing fields fall back to defaults)
    pub fn from_json_str(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load a tuning file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(err) => {
                log::warn!("Using default tuning ({}): {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that parallel tables line up, thresholds ascend and ranges are sane
    pub fn validate(&self) -> Result<()> {
        let physics = &self.physics;
        check_non_negative("physics.accel", physics.accel)?;
        check_non_negative("physics.decel", physics.decel)?;
        check_non_negative("physics.turn_boost", physics.turn_boost)?;

        let combat = &self.combat;
        if !(combat.knockback_min <= combat.knockback_max) {
            return Err(Error::InvalidTuning(format!(
                "combat.knockback_min {} exceeds combat.knockback_max {}",
                combat.knockback_min, combat.knockback_max
            )));
        }
        if !(0.0..=1.0).contains(&combat.ranged_min_falloff) {
            return Err(Error::InvalidTuning(format!(
                "combat.ranged_min_falloff {} is outside [0, 1]",
                combat.ranged_min_falloff
            )));
        }

        let combo = &self.combo;
        check_parallel(
            "combo",
            combo.thresholds.len(),
            &[combo.multipliers.len(), combo.names.len()],
        )?;
        check_ascending("combo.thresholds", &combo.thresholds)?;

        let rage = &self.rage;
        check_parallel(
            "rage",
            rage.thresholds.len(),
            &[
                rage.names.len(),
                rage.speed_multipliers.len(),
                rage.damage_multipliers.len(),
            ],
        )?;
        check_ascending("rage.thresholds", &rage.thresholds)?;

        let wave = &self.wave;
        check_parallel(
            "wave",
            wave.time_thresholds.len(),
            &[wave.spawn_intervals.len(), wave.health_multipliers.len()],
        )?;
        check_ascending("wave.time_thresholds", &wave.time_thresholds)?;
        if wave.spawn_intervals.iter().any(|&i| i <= 0.0) || wave.boss_interval <= 0.0 {
            return Err(Error::InvalidTuning(
                "spawn intervals must be positive".to_string(),
            ));
        }

        if self.spawn.min_distance > self.spawn.max_distance {
            return Err(Error::InvalidTuning(format!(
                "spawn.min_distance {} exceeds spawn.max_distance {}",
                self.spawn.min_distance, self.spawn.max_distance
            )));
        }
        if self.combat.player_max_health <= 0 {
            return Err(Error::InvalidTuning(
                "combat.player_max_health must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_parallel(table: &str, len: usize, others: &[usize]) -> Result<()> {
    if len == 0 {
        return Err(Error::InvalidTuning(format!("{table} tables are empty")));
    }
    if let Some(other) = others.iter().find(|&&n| n != len) {
        return Err(Error::InvalidTuning(format!(
            "{table} tables differ in length ({len} vs {other})"
        )));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f32) -> Result<()> {
    if !(value >= 0.0) {
        return Err(Error::InvalidTuning(format!(
            "{field} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

fn check_ascending<T: PartialOrd + Copy>(table: &str, values: &[T]) -> Result<()> {
    if values.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::InvalidTuning(format!("{table} must be strictly ascending")));
    }
    Ok(())
}
