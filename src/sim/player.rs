//! The player actor
//!
//! Health, buffs, inventory and energy live here, along with the per-frame
//! movement step (acceleration, axis-separated collision, wall response).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Access, CollisionOracle};
use super::combat::{DamageType, Facing, Weapon};
use super::motion;
use super::transform::Transform;
use crate::consts::MAX_INVENTORY;
use crate::tuning::{CombatConfig, PhysicsConfig};
use crate::try_direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffKind {
    /// Faster movement
    Speed,
    /// Shorter attack cooldown
    Haste,
    /// Absorbs the next hit, then ends
    Shield,
    Invincibility,
}

/// Independent countdown timers, one per buff
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Buffs {
    speed: f32,
    haste: f32,
    shield: f32,
    invincibility: f32,
}

impl Buffs {
    fn slot(&mut self, kind: BuffKind) -> &mut f32 {
        match kind {
            BuffKind::Speed => &mut self.speed,
            BuffKind::Haste => &mut self.haste,
            BuffKind::Shield => &mut self.shield,
            BuffKind::Invincibility => &mut self.invincibility,
        }
    }

    /// Start or refresh a buff; never shortens a longer remaining time
    pub fn grant(&mut self, kind: BuffKind, duration: f32) {
        let slot = self.slot(kind);
        *slot = slot.max(duration);
    }

    pub fn is_active(&self, kind: BuffKind) -> bool {
        self.remaining(kind) > 0.0
    }

    pub fn remaining(&self, kind: BuffKind) -> f32 {
        match kind {
            BuffKind::Speed => self.speed,
            BuffKind::Haste => self.haste,
            BuffKind::Shield => self.shield,
            BuffKind::Invincibility => self.invincibility,
        }
    }

    /// Use up the shield if it is up
    pub fn consume_shield(&mut self) -> bool {
        if self.shield > 0.0 {
            self.shield = 0.0;
            true
        } else {
            false
        }
    }

    pub fn tick(&mut self, dt: f32) {
        for t in [
            &mut self.speed,
            &mut self.haste,
            &mut self.shield,
            &mut self.invincibility,
        ] {
            *t = (*t - dt).max(0.0);
        }
    }
}

/// Worn armor: blocks one point of matching damage per hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armor {
    pub kind: DamageType,
    pub durability: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    /// Terminal; the timer drives the death animation
    Dead { timer: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub transform: Transform,
    pub vel: Vec2,
    pub facing: Facing,
    pub running: bool,
    pub has_key: bool,
    health: i32,
    base_max_health: i32,
    bonus_max_health: i32,
    invincibility_timer: f32,
    attack_cooldown: f32,
    inventory: Vec<Weapon>,
    current_weapon: usize,
    pub energy: f32,
    pub buffs: Buffs,
    pub armor: Option<Armor>,
    /// Flat bonus added to every weapon hit
    pub damage_bonus: i32,
    /// Persistent knockback stat
    pub knockback_multiplier: f32,
    life: LifeState,
}

impl Player {
    pub fn new(pos: Vec2, physics: &PhysicsConfig, combat: &CombatConfig) -> Self {
        Self {
            transform: Transform::new(pos, physics.player_size),
            vel: Vec2::ZERO,
            facing: Facing::Down,
            running: false,
            has_key: false,
            health: combat.player_max_health,
            base_max_health: combat.player_max_health,
            bonus_max_health: 0,
            invincibility_timer: 0.0,
            attack_cooldown: 0.0,
            inventory: vec![Weapon::sword()],
            current_weapon: 0,
            energy: combat.energy_max,
            buffs: Buffs::default(),
            armor: None,
            damage_bonus: 0,
            knockback_multiplier: 1.0,
            life: LifeState::Alive,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.base_max_health + self.bonus_max_health
    }

    /// Set health, clamped to `[0, max]`; reaching 0 kills
    ///
    /// Ignored while dead, use `revive` first.
    pub fn set_health(&mut self, health: i32, cfg: &CombatConfig) {
        if self.is_dead() {
            return;
        }
        self.health = health.clamp(0, self.max_health());
        if self.health == 0 {
            self.die(cfg);
        }
    }

    /// Leave the dead state at full health with fresh timers (continued run)
    pub fn revive(&mut self) {
        self.life = LifeState::Alive;
        self.health = self.max_health();
        self.vel = Vec2::ZERO;
        self.invincibility_timer = 0.0;
        self.attack_cooldown = 0.0;
    }

    pub fn set_max_health_bonus(&mut self, bonus: i32) {
        self.bonus_max_health = bonus.max(-self.base_max_health + 1);
        self.health = self.health.min(self.max_health());
    }

    pub fn heal(&mut self, amount: i32) {
        if self.is_dead() || amount <= 0 {
            return;
        }
        self.health = (self.health + amount).min(self.max_health());
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.life, LifeState::Dead { .. })
    }

    pub fn life(&self) -> LifeState {
        self.life
    }

    /// Death animation finished
    pub fn is_death_complete(&self) -> bool {
        matches!(self.life, LifeState::Dead { timer } if timer <= 0.0)
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0 || self.buffs.is_active(BuffKind::Invincibility)
    }

    /// Enter the terminal dead state; returns false if already dead
    pub fn die(&mut self, cfg: &CombatConfig) -> bool {
        if self.is_dead() {
            return false;
        }
        self.health = 0;
        self.vel = Vec2::ZERO;
        self.life = LifeState::Dead {
            timer: cfg.death_duration,
        };
        true
    }

    /// Apply incoming damage; returns how much health was actually lost
    ///
    /// Order: dead/invincible → shield buff → armor → health (clamped) → death.
    pub fn take_damage(&mut self, amount: i32, kind: DamageType, cfg: &CombatConfig) -> i32 {
        if self.is_dead() || self.is_invincible() || amount <= 0 {
            return 0;
        }
        if self.buffs.consume_shield() {
            return 0;
        }

        let mut amount = amount;
        if let Some(armor) = self.armor.as_mut() {
            if armor.kind == kind && armor.durability > 0 {
                armor.durability -= 1;
                amount -= 1;
            }
        }
        if self.armor.is_some_and(|a| a.durability <= 0) {
            self.armor = None;
        }
        if amount <= 0 {
            return 0;
        }

        let before = self.health;
        self.health = (self.health - amount).max(0);
        self.invincibility_timer = cfg.invincibility_duration;
        if self.health == 0 {
            self.die(cfg);
        }
        before - self.health
    }

    /// Push the player away from `source`
    pub fn apply_knockback(&mut self, source: Vec2, strength: f32, physics: &PhysicsConfig) {
        if self.is_dead() {
            return;
        }
        if let Some(dir) = try_direction(self.transform.center() - source) {
            self.vel += dir * strength * physics.player_knockback;
        }
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.inventory
    }

    pub fn equipped(&self) -> Option<&Weapon> {
        self.inventory.get(self.current_weapon)
    }

    pub fn current_weapon_index(&self) -> usize {
        self.current_weapon
    }

    /// Cycle to the next weapon slot
    pub fn switch_weapon(&mut self) {
        if !self.inventory.is_empty() {
            self.current_weapon = (self.current_weapon + 1) % self.inventory.len();
        }
    }

    /// Add a weapon; rejects duplicates and a full inventory
    pub fn add_weapon(&mut self, weapon: Weapon) -> bool {
        if self.inventory.len() >= MAX_INVENTORY
            || self.inventory.iter().any(|w| w.name == weapon.name)
        {
            return false;
        }
        self.inventory.push(weapon);
        true
    }

    /// Replace the whole inventory (used when restoring a run)
    pub fn set_inventory(&mut self, weapons: Vec<Weapon>, current: usize) {
        self.inventory = weapons;
        self.inventory.truncate(MAX_INVENTORY);
        self.current_weapon = if self.inventory.is_empty() {
            0
        } else {
            current.min(self.inventory.len() - 1)
        };
    }

    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    /// Start an attack with the equipped weapon if cooldown and energy allow
    ///
    /// Consumes energy and arms the cooldown; returns the weapon used.
    pub fn try_begin_attack(&mut self, cfg: &CombatConfig) -> Option<Weapon> {
        if self.is_dead() || self.attack_cooldown > 0.0 {
            return None;
        }
        let weapon = self.equipped()?.clone();
        if self.energy < weapon.energy_cost {
            return None;
        }
        self.energy -= weapon.energy_cost;
        let haste = if self.buffs.is_active(BuffKind::Haste) {
            cfg.haste_cooldown_mult
        } else {
            1.0
        };
        self.attack_cooldown = weapon.cooldown * haste;
        Some(weapon)
    }

    pub fn move_speed(&self, physics: &PhysicsConfig) -> f32 {
        let base = if self.running {
            physics.run_speed
        } else {
            physics.walk_speed
        };
        if self.buffs.is_active(BuffKind::Speed) {
            base * physics.speed_buff_multiplier
        } else {
            base
        }
    }

    /// Count down timers and regenerate energy
    pub fn update_timers(&mut self, cfg: &CombatConfig, dt: f32) {
        if let LifeState::Dead { timer } = &mut self.life {
            *timer = (*timer - dt).max(0.0);
            return;
        }
        self.invincibility_timer = (self.invincibility_timer - dt).max(0.0);
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        self.buffs.tick(dt);
        self.energy = (self.energy + cfg.energy_regen * dt).min(cfg.energy_max);
    }

    /// Movement for one frame: accelerate, resolve against walls, snap when resting
    pub fn update_movement<O: CollisionOracle + ?Sized>(
        &mut self,
        intent: Vec2,
        oracle: &O,
        physics: &PhysicsConfig,
        dt: f32,
    ) {
        if self.is_dead() {
            return;
        }
        if let Some(facing) = Facing::from_vector(intent) {
            self.facing = facing;
        }

        let target = motion::target_velocity(intent, self.move_speed(physics));
        self.vel = motion::accelerate(self.vel, target, physics, dt);

        let (pos, blocked) = collision::move_axis_separated(
            oracle,
            self.transform.pos,
            self.transform.size,
            self.vel * dt,
            physics.collision_padding,
            Access::Player {
                has_key: self.has_key,
            },
        );
        self.transform.pos = pos;
        if blocked.any() {
            self.vel = collision::wall_response(self.vel, blocked, physics);
        }

        if target == Vec2::ZERO && self.vel.length() < physics.snap_assist_speed {
            let snapped = motion::grid_snap(self.transform.pos, physics.snap_speed, dt);
            let access = Access::Player {
                has_key: self.has_key,
            };
            if collision::can_occupy(
                oracle,
                snapped,
                self.transform.size,
                physics.collision_padding,
                access,
            ) {
                self.transform.pos = snapped;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::TileGrid;

    fn player() -> Player {
        Player::new(
            Vec2::new(3.0, 3.0),
            &PhysicsConfig::default(),
            &CombatConfig::default(),
        )
    }

    #[test]
    fn test_damage_and_invincibility() {
        let cfg = CombatConfig::default();
        let mut p = player();
        assert_eq!(p.take_damage(1, DamageType::Physical, &cfg), 1);
        assert_eq!(p.health(), 2);
        // Invincible right after a hit
        assert_eq!(p.take_damage(1, DamageType::Physical, &cfg), 0);
        p.update_timers(&cfg, cfg.invincibility_duration + 0.01);
        assert_eq!(p.take_damage(1, DamageType::Physical, &cfg), 1);
    }

    #[test]
    fn test_shield_buff_consumes_once() {
        let cfg = CombatConfig::default();
        let mut p = player();
        p.buffs.grant(BuffKind::Shield, 10.0);
        assert_eq!(p.take_damage(2, DamageType::Physical, &cfg), 0);
        assert!(!p.buffs.is_active(BuffKind::Shield));
        assert_eq!(p.take_damage(2, DamageType::Physical, &cfg), 2);
    }

    #[test]
    fn test_armor_matching_type_only() {
        let cfg = CombatConfig::default();
        let mut p = player();
        p.armor = Some(Armor {
            kind: DamageType::Magical,
            durability: 1,
        });
        assert_eq!(p.take_damage(1, DamageType::Physical, &cfg), 1);
        p.update_timers(&cfg, 2.0);
        // Fully absorbed and armor breaks
        assert_eq!(p.take_damage(1, DamageType::Magical, &cfg), 0);
        assert!(p.armor.is_none());
    }

    #[test]
    fn test_death_is_idempotent() {
        let cfg = CombatConfig::default();
        let mut p = player();
        assert_eq!(p.take_damage(99, DamageType::Physical, &cfg), 3);
        assert!(p.is_dead());
        assert_eq!(p.health(), 0);
        assert!(!p.die(&cfg));
        assert_eq!(p.take_damage(1, DamageType::Physical, &cfg), 0);
        p.heal(2);
        assert_eq!(p.health(), 0);

        p.update_timers(&cfg, cfg.death_duration);
        assert!(p.is_death_complete());
    }

    #[test]
    fn test_set_health_zero_kills() {
        let combat = CombatConfig::default();
        let mut p = player();
        p.set_health(-4, &combat);
        assert_eq!(p.health(), 0);
        assert!(p.is_dead());
        p.heal(2);
        assert_eq!(p.health(), 0);
        p.set_health(2, &combat);
        assert_eq!(p.health(), 0);
        assert!(p.is_dead());
    }

    #[test]
    fn test_revive_after_death() {
        let combat = CombatConfig::default();
        let mut p = player();
        p.take_damage(99, DamageType::Physical, &combat);
        assert!(p.is_dead());
        p.revive();
        assert!(!p.is_dead());
        assert_eq!(p.health(), p.max_health());
        assert!(!p.is_invincible());
        p.set_health(1, &combat);
        assert_eq!(p.health(), 1);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut p = player();
        p.set_max_health_bonus(2);
        p.heal(10);
        assert_eq!(p.health(), 5);
        p.set_max_health_bonus(0);
        assert_eq!(p.health(), 3);
    }

    #[test]
    fn test_inventory_limits() {
        let mut p = player();
        assert!(!p.add_weapon(Weapon::sword()));
        assert!(p.add_weapon(Weapon::ice_bow()));
        assert!(p.add_weapon(Weapon::fire_staff()));
        assert!(p.add_weapon(Weapon::magic_wand()));
        let mut extra = Weapon::sword();
        extra.name = "Spare Sword".to_string();
        assert!(!p.add_weapon(extra));
        assert_eq!(p.weapons().len(), MAX_INVENTORY);

        p.switch_weapon();
        assert_eq!(p.equipped().map(|w| w.name.as_str()), Some("Ice Bow"));
        for _ in 0..3 {
            p.switch_weapon();
        }
        assert_eq!(p.current_weapon_index(), 0);
    }

    #[test]
    fn test_attack_gated_by_cooldown_and_energy() {
        let cfg = CombatConfig::default();
        let mut p = player();
        assert!(p.try_begin_attack(&cfg).is_some());
        assert!(p.try_begin_attack(&cfg).is_none());

        p.update_timers(&cfg, 1.0);
        p.energy = 5.0;
        assert!(p.try_begin_attack(&cfg).is_none());

        p.set_inventory(Vec::new(), 0);
        p.energy = cfg.energy_max;
        assert!(p.try_begin_attack(&cfg).is_none());
    }

    #[test]
    fn test_haste_halves_cooldown() {
        let cfg = CombatConfig::default();
        let mut p = player();
        p.buffs.grant(BuffKind::Haste, 5.0);
        let sword = p.try_begin_attack(&cfg).unwrap();
        assert!((p.attack_cooldown() - sword.cooldown * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_movement_slides_along_wall() {
        let grid = TileGrid::bordered(8, 8);
        let physics = PhysicsConfig::default();
        let mut p = Player::new(Vec2::new(1.0, 3.0), &physics, &CombatConfig::default());
        for _ in 0..30 {
            p.update_movement(Vec2::new(-1.0, 1.0), &grid, &physics, 1.0 / 60.0);
        }
        assert!(p.transform.pos.x >= 1.0 - physics.collision_padding);
        assert!(p.transform.pos.y > 3.2);
    }

    #[test]
    fn test_resting_player_snaps_to_tile() {
        let grid = TileGrid::new(10, 10);
        let physics = PhysicsConfig::default();
        let mut p = Player::new(Vec2::new(4.3, 4.0), &physics, &CombatConfig::default());
        for _ in 0..60 {
            p.update_movement(Vec2::ZERO, &grid, &physics, 1.0 / 60.0);
        }
        assert_eq!(p.transform.pos, Vec2::new(4.0, 4.0));
    }
}
