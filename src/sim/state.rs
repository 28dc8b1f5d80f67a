//! World state for one survival run
//!
//! The world owns every actor, the meta systems, the tuning and a seeded RNG.
//! Nothing here is global: two worlds with the same seed, tuning and inputs
//! produce the same run.

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::CollisionOracle;
use super::combat::DamageType;
use super::combo::ComboSystem;
use super::enemy::Enemy;
use super::events::{GameEvent, LootKind};
use super::player::Player;
use super::projectile::Projectile;
use super::rage::RageSystem;
use super::spawn;
use super::wave::WaveSystem;
use crate::tuning::Tuning;

/// Running totals for the current run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub kills: u32,
    pub score: u64,
    pub coins: u32,
}

#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) tuning: Tuning,
    pub player: Player,
    /// Hostiles, including corpses awaiting removal
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub combo: ComboSystem,
    pub rage: RageSystem,
    pub wave: WaveSystem,
    pub stats: RunStats,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl World {
    /// Fresh run with the player resting at `spawn`
    pub fn new(seed: u64, spawn: Vec2, tuning: Tuning) -> Self {
        let player = Player::new(spawn, &tuning.physics, &tuning.combat);
        let wave = WaveSystem::new(&tuning.wave);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            combo: ComboSystem::new(),
            rage: RageSystem::new(),
            wave,
            stats: RunStats::default(),
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Live tuning access (developer console)
    pub fn tuning_mut(&mut self) -> &mut Tuning {
        &mut self.tuning
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Events raised since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending events; call once per frame
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn survival_time(&self) -> f32 {
        self.wave.survival_time()
    }

    /// Live (not dead) enemy count
    pub fn live_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_dead()).count()
    }

    /// Run is over once the death animation has played out
    pub fn is_over(&self) -> bool {
        self.player.is_death_complete()
    }

    fn enemy_health(&self, boss: bool) -> i32 {
        let spawn = &self.tuning.spawn;
        let hm = self.wave.health_multiplier(&self.tuning.wave);
        if boss {
            spawn.boss_base_health + (hm * spawn.boss_health_per_mult) as i32
        } else {
            spawn.enemy_base_health + (hm * spawn.enemy_health_per_mult) as i32
        }
    }

    /// Place a regular enemy on `tile` (also a console command)
    pub fn spawn_enemy_at(&mut self, tile: IVec2) -> u32 {
        let id = self.next_entity_id();
        let health = self.enemy_health(false);
        let enemy = Enemy::new(id, tile, health, self.tuning.ai.enemy_size);
        self.enemies.push(enemy);
        id
    }

    /// Place a boss on `tile`: physical shield, magical attack
    pub fn spawn_boss_at(&mut self, tile: IVec2) -> u32 {
        let id = self.next_entity_id();
        let health = self.enemy_health(true);
        let mut boss = Enemy::new(id, tile, health, self.tuning.ai.enemy_size)
            .with_shield(DamageType::Physical, self.tuning.spawn.boss_shield);
        boss.boss = true;
        boss.attack_type = DamageType::Magical;
        self.enemies.push(boss);
        log::info!("Boss {} spawned at {:?} with {} health", id, tile, health);
        id
    }

    /// Spawn a regular enemy in the ring around the player
    ///
    /// Skipped at the live-enemy cap or when no tile is found.
    pub fn spawn_enemy<O: CollisionOracle + ?Sized>(&mut self, oracle: &O) -> Option<u32> {
        if self.live_enemies() >= self.tuning.spawn.max_enemies {
            log::debug!("Spawn skipped: enemy cap reached");
            return None;
        }
        let center = self.player.transform.center();
        match spawn::find_spawn_tile(oracle, center, &self.tuning.spawn, &mut self.rng) {
            Some(tile) => Some(self.spawn_enemy_at(tile)),
            None => {
                log::debug!("Spawn skipped: no walkable tile near {:?}", center);
                None
            }
        }
    }

    /// Spawn a boss on the outer edge of the spawn ring
    pub fn spawn_boss<O: CollisionOracle + ?Sized>(&mut self, oracle: &O) -> Option<u32> {
        let center = self.player.transform.center();
        match spawn::find_boss_tile(oracle, center, &self.tuning.spawn, &mut self.rng) {
            Some(tile) => Some(self.spawn_boss_at(tile)),
            None => {
                log::debug!("Boss spawn skipped: no walkable tile near {:?}", center);
                None
            }
        }
    }

    /// Kill every live enemy through the normal death hook
    pub fn kill_all_enemies(&mut self) -> usize {
        self.kill_where(|_| true)
    }

    /// Kill live enemies whose center lies within `radius` of `center`
    pub fn kill_enemies_near(&mut self, center: Vec2, radius: f32) -> usize {
        let r2 = radius * radius;
        self.kill_where(|e| e.transform.center().distance_squared(center) <= r2)
    }

    fn kill_where(&mut self, pred: impl Fn(&Enemy) -> bool) -> usize {
        let combat = &self.tuning.combat;
        let killed = self
            .enemies
            .iter_mut()
            .filter(|e| !e.is_dead() && pred(e))
            .map(|e| e.kill(combat))
            .filter(|&k| k)
            .count();
        self.resolve_deaths();
        killed
    }

    /// Run the death hook for every enemy that died since the last call
    ///
    /// Each death is handled exactly once, whatever killed it.
    pub fn resolve_deaths(&mut self) {
        for i in 0..self.enemies.len() {
            if self.enemies[i].claim_death() {
                let pos = self.enemies[i].transform.center();
                let boss = self.enemies[i].boss;
                self.on_enemy_killed(pos, boss);
            }
        }
    }

    fn on_enemy_killed(&mut self, pos: Vec2, boss: bool) {
        self.stats.kills += 1;
        let multiplier = self.combo.on_kill(&self.tuning.combo, &mut self.events);
        let score = (self.tuning.score.score_per_kill as f32 * multiplier).floor() as u64;
        self.stats.score += score;
        log::debug!("Enemy killed at {:?} (+{} score)", pos, score);
        self.events.push(GameEvent::EnemyKilled { pos, boss, score });

        if self.rng.random::<f32>() < self.tuning.score.potion_drop_rate {
            self.events.push(GameEvent::LootDropped {
                pos,
                kind: LootKind::HealthPotion,
            });
        }
    }

    /// Damage the player and report it; returns health actually lost
    pub fn damage_player(&mut self, amount: i32, kind: DamageType) -> i32 {
        let was_dead = self.player.is_dead();
        let lost = self.player.take_damage(amount, kind, &self.tuning.combat);
        if lost > 0 {
            self.events.push(GameEvent::PlayerDamaged { amount: lost });
        }
        if !was_dead && self.player.is_dead() {
            log::info!(
                "Player died at {} with {} kills",
                self.wave.formatted_time(),
                self.stats.kills
            );
            self.events.push(GameEvent::PlayerDied);
        }
        lost
    }

    /// Drop expired projectiles and removable corpses in one pass
    pub fn compact(&mut self) {
        self.projectiles.retain(|p| !p.is_expired());
        self.enemies.retain(|e| !e.is_removable());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::TileGrid;

    fn world() -> World {
        World::new(12345, Vec2::new(50.0, 50.0), Tuning::default())
    }

    #[test]
    fn test_new_world() {
        let w = world();
        assert_eq!(w.player.health(), w.tuning().combat.player_max_health);
        assert!(w.enemies.is_empty());
        assert_eq!(w.survival_time(), 0.0);
        assert!(!w.is_over());
    }

    #[test]
    fn test_entity_ids_unique() {
        let mut w = world();
        let a = w.spawn_enemy_at(IVec2::new(1, 1));
        let b = w.spawn_boss_at(IVec2::new(2, 2));
        assert_ne!(a, b);
        assert!(w.enemies[1].boss);
        assert_eq!(w.enemies[1].attack_type, DamageType::Magical);
        assert_eq!(w.enemies[0].health(), 50);
        assert_eq!(w.enemies[1].health(), 400);
    }

    #[test]
    fn test_kill_all_runs_hook_once() {
        let mut w = world();
        for x in 0..3 {
            w.spawn_enemy_at(IVec2::new(10 + x, 10));
        }
        assert_eq!(w.kill_all_enemies(), 3);
        assert_eq!(w.stats.kills, 3);
        assert_eq!(w.combo.current(), 3);
        assert_eq!(w.stats.score, 300);

        // Second pass finds nothing new
        assert_eq!(w.kill_all_enemies(), 0);
        w.resolve_deaths();
        assert_eq!(w.stats.kills, 3);
    }

    #[test]
    fn test_kill_near_radius() {
        let mut w = world();
        w.spawn_enemy_at(IVec2::new(50, 52));
        w.spawn_enemy_at(IVec2::new(80, 80));
        let center = w.player.transform.center();
        assert_eq!(w.kill_enemies_near(center, 5.0), 1);
        assert_eq!(w.live_enemies(), 1);
    }

    #[test]
    fn test_spawn_respects_cap() {
        let grid = TileGrid::new(200, 200);
        let mut w = world();
        w.tuning_mut().spawn.max_enemies = 2;
        assert!(w.spawn_enemy(&grid).is_some());
        assert!(w.spawn_enemy(&grid).is_some());
        assert!(w.spawn_enemy(&grid).is_none());
    }

    #[test]
    fn test_player_death_reported_once() {
        let mut w = world();
        w.damage_player(99, DamageType::Physical);
        w.damage_player(99, DamageType::Physical);
        let deaths = w
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::PlayerDied)
            .count();
        assert_eq!(deaths, 1);
        assert!(w.events().is_empty());
    }

    #[test]
    fn test_compact_keeps_fresh_corpses() {
        let mut w = world();
        w.spawn_enemy_at(IVec2::new(1, 1));
        w.kill_all_enemies();
        w.compact();
        assert_eq!(w.enemies.len(), 1);
        let combat = w.tuning().combat.clone();
        let effects = w.tuning().effects.clone();
        w.enemies[0].update_timers(&combat, &effects, combat.corpse_duration + 0.1);
        w.compact();
        assert!(w.enemies.is_empty());
    }
}
