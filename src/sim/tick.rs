//! Fixed timestep simulation tick
//!
//! One call advances the whole world in a fixed order:
//! 1. Player timers, movement and attack
//! 2. Projectiles
//! 3. Enemies (knockback physics, timers, AI, contact damage)
//! 4. Death hooks for anything that died this frame
//! 5. Combo decay, rage recompute, wave schedules
//! 6. Spawn requests, then one batch removal pass

use glam::Vec2;

use super::ai::{self, AiContext};
use super::collision::CollisionOracle;
use super::combat::{self, DamageType, Strike, Weapon};
use super::events::GameEvent;
use super::projectile::{Owner, Projectile};
use super::state::World;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::try_direction;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent, each axis in -1..1
    pub movement: Vec2,
    /// Sprint modifier
    pub running: bool,
    /// Use the equipped weapon
    pub attack: bool,
    /// Aim for ranged weapons; falls back to the facing direction
    pub aim: Option<Vec2>,
    /// Cycle to the next inventory slot
    pub switch_weapon: bool,
}

/// Advance the world by one fixed timestep
pub fn tick<O: CollisionOracle + ?Sized>(
    world: &mut World,
    oracle: &O,
    input: &TickInput,
    dt: f32,
) {
    if !(dt.is_finite() && dt > 0.0) {
        return;
    }
    world.time_ticks += 1;

    world.player.update_timers(&world.tuning.combat, dt);
    if !world.player.is_dead() {
        if input.switch_weapon {
            world.player.switch_weapon();
        }
        world.player.running = input.running;
        world
            .player
            .update_movement(input.movement, oracle, &world.tuning.physics, dt);
        if input.attack {
            player_attack(world, input.aim);
        }
    }

    update_projectiles(world, oracle, dt);
    update_enemies(world, oracle, dt);
    world.resolve_deaths();

    world.combo.update(dt, &mut world.events);
    let mark = world.events.len();
    if !world.player.is_dead() {
        world.rage.update(
            world.stats.kills,
            world.wave.survival_time(),
            &world.tuning.rage,
            &mut world.events,
        );
        world.wave.update(dt, &world.tuning.wave, &mut world.events);
    }
    process_spawn_requests(world, oracle, mark);

    world.compact();
}

/// Fire or swing the equipped weapon
fn player_attack(world: &mut World, aim: Option<Vec2>) {
    let Some(weapon) = world.player.try_begin_attack(&world.tuning.combat) else {
        return;
    };
    world.events.push(GameEvent::WeaponFired {
        ranged: weapon.is_ranged(),
    });

    if weapon.is_ranged() {
        fire_projectile(world, &weapon, aim);
    } else {
        swing_melee(world, &weapon);
    }
}

fn fire_projectile(world: &mut World, weapon: &Weapon, aim: Option<Vec2>) {
    let aim = aim
        .and_then(try_direction)
        .unwrap_or_else(|| world.player.facing.vector());
    let center = world.player.transform.center();
    let id = world.next_entity_id();
    let Some(projectile) = Projectile::fire(
        id,
        center,
        aim,
        weapon,
        world.player.damage_bonus,
        Owner::Player,
        &world.tuning.combat,
    ) else {
        return;
    };
    world.projectiles.push(projectile);

    if weapon.recoil > 0.0 {
        world
            .player
            .apply_knockback(center + aim, weapon.recoil, &world.tuning.physics);
    }
}

fn swing_melee(world: &mut World, weapon: &Weapon) {
    let cfg = &world.tuning.combat;
    let player = &world.player;
    let origin = player.transform.center();
    let sprinting = player.running && player.vel != Vec2::ZERO;

    let targets = combat::melee_targets(origin, player.facing, weapon.range, &world.enemies, cfg);
    for (index, distance) in targets {
        let strike = Strike {
            damage: weapon.damage + player.damage_bonus,
            damage_type: weapon.damage_type,
            effect: weapon.effect,
            source: origin,
            knockback: combat::knockback_multiplier(
                distance,
                weapon.range,
                sprinting,
                player.knockback_multiplier,
                cfg,
            ),
        };
        world.enemies[index].receive_strike(&strike, cfg, &world.tuning.effects);
    }
}

fn update_projectiles<O: CollisionOracle + ?Sized>(world: &mut World, oracle: &O, dt: f32) {
    let cfg = &world.tuning.combat;
    let mut hostile_hits: Vec<(i32, DamageType, Vec2)> = Vec::new();

    for projectile in world.projectiles.iter_mut() {
        projectile.advance(oracle, dt);
        if projectile.is_expired() {
            continue;
        }

        match projectile.owner {
            Owner::Player => {
                let Some(enemy) = world
                    .enemies
                    .iter_mut()
                    .find(|e| !e.is_dead() && projectile.hits(&e.transform))
                else {
                    continue;
                };
                let pos = projectile.transform.center();
                let dir = try_direction(projectile.vel).unwrap_or(Vec2::ZERO);
                let strike = Strike {
                    damage: projectile.damage,
                    damage_type: projectile.damage_type,
                    effect: projectile.effect,
                    source: enemy.transform.center() - dir,
                    knockback: combat::ranged_knockback(projectile.travelled(), cfg),
                };
                enemy.receive_strike(&strike, cfg, &world.tuning.effects);
                projectile.mark_hit();
                world.events.push(GameEvent::ProjectileHit {
                    pos,
                    damage: projectile.damage,
                    effect: projectile.effect,
                });
            }
            Owner::Hostile => {
                if !world.player.is_dead() && projectile.hits(&world.player.transform) {
                    projectile.mark_hit();
                    hostile_hits.push((
                        projectile.damage,
                        projectile.damage_type,
                        projectile.transform.center(),
                    ));
                }
            }
        }
    }

    for (damage, kind, source) in hostile_hits {
        if world.damage_player(damage, kind) > 0 {
            let strength = world.tuning.combat.contact_knockback;
            world
                .player
                .apply_knockback(source, strength, &world.tuning.physics);
        }
    }
}

fn update_enemies<O: CollisionOracle + ?Sized>(world: &mut World, oracle: &O, dt: f32) {
    let tuning = &world.tuning;
    let player_center = world.player.transform.center();
    let ctx = AiContext {
        player_center,
        player_tile: world.player.transform.tile(),
        speed_multiplier: world.rage.speed_multiplier(&tuning.rage),
        slow_multiplier: 1.0,
    };
    let cull_sq = tuning.ai.update_radius * tuning.ai.update_radius;
    let contact_sq = tuning.combat.contact_distance * tuning.combat.contact_distance;
    let player_alive = !world.player.is_dead();
    let mut contacts: Vec<(DamageType, Vec2)> = Vec::new();

    for enemy in world.enemies.iter_mut() {
        // Corpses always tick so they eventually become removable
        let far = enemy.transform.center().distance_squared(player_center) > cull_sq;
        if far && !enemy.is_dead() {
            continue;
        }

        enemy.update_physics(oracle, &tuning.combat, &tuning.physics, dt);
        enemy.update_timers(&tuning.combat, &tuning.effects, dt);
        if enemy.is_dead() {
            continue;
        }

        let ctx = AiContext {
            slow_multiplier: enemy.slow_multiplier(&tuning.effects),
            ..ctx
        };
        ai::update_enemy(enemy, oracle, &ctx, &tuning.ai, &mut world.rng, dt);

        let touching = enemy.transform.center().distance_squared(player_center) < contact_sq;
        if player_alive && touching && !enemy.is_frozen() {
            contacts.push((enemy.attack_type, enemy.transform.center()));
        }
    }

    let damage_mult = world.rage.damage_multiplier(&world.tuning.rage);
    // Truncates: Berserk x1.5 on one base damage still deals one
    let damage = (world.tuning.combat.contact_damage as f32 * damage_mult) as i32;
    for (kind, source) in contacts {
        if world.damage_player(damage, kind) > 0 {
            let strength = world.tuning.combat.contact_knockback;
            world
                .player
                .apply_knockback(source, strength, &world.tuning.physics);
        }
    }
}

/// Turn this frame's spawn events into enemies
fn process_spawn_requests<O: CollisionOracle + ?Sized>(world: &mut World, oracle: &O, mark: usize) {
    let (normal, bosses) = world.events[mark..]
        .iter()
        .fold((0, 0), |(n, b), e| match e {
            GameEvent::SpawnEnemy => (n + 1, b),
            GameEvent::SpawnBoss => (n, b + 1),
            _ => (n, b),
        });
    for _ in 0..normal {
        world.spawn_enemy(oracle);
    }
    for _ in 0..bosses {
        world.spawn_boss(oracle);
    }
}

/// Accumulates frame time and runs whole fixed steps
///
/// Caps the number of substeps per frame to avoid a spiral of death.
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many `SIM_DT` ticks as `frame_dt` covers; returns the count
    pub fn advance<O: CollisionOracle + ?Sized>(
        &mut self,
        world: &mut World,
        oracle: &O,
        input: &TickInput,
        frame_dt: f32,
    ) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(world, oracle, input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        substeps
    }

    /// Drop leftover time (after a pause)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::TileGrid;
    use crate::sim::combat::WeaponEffect;
    use crate::tuning::Tuning;
    use glam::IVec2;

    fn arena() -> TileGrid {
        TileGrid::bordered(40, 40)
    }

    fn world_at(pos: Vec2) -> World {
        World::new(7, pos, Tuning::default())
    }

    fn attack() -> TickInput {
        TickInput {
            attack: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_melee_kill_updates_meta_same_frame() {
        let grid = arena();
        let mut world = world_at(Vec2::new(10.0, 10.0));
        world.player.damage_bonus = 100;
        // Player faces down by default; enemy one tile below
        world.spawn_enemy_at(IVec2::new(10, 9));

        tick(&mut world, &grid, &attack(), SIM_DT);

        assert_eq!(world.stats.kills, 1);
        assert_eq!(world.stats.score, 100);
        assert_eq!(world.combo.current(), 1);
        assert!(world.rage.rage() > 0.0);
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::WeaponFired { ranged: false }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::EnemyKilled { .. })));
        // Corpse lingers until its timer runs out
        assert_eq!(world.enemies.len(), 1);
        assert!(world.enemies[0].is_dead());
    }

    #[test]
    fn test_melee_misses_behind() {
        let grid = arena();
        let mut world = world_at(Vec2::new(10.0, 10.0));
        world.player.damage_bonus = 100;
        world.spawn_enemy_at(IVec2::new(10, 11));
        tick(&mut world, &grid, &attack(), SIM_DT);
        assert_eq!(world.stats.kills, 0);
    }

    #[test]
    fn test_projectile_hits_enemy() {
        let grid = arena();
        let mut world = world_at(Vec2::new(5.0, 10.0));
        world.player.add_weapon(Weapon::ice_bow());
        world.player.switch_weapon();
        world.spawn_enemy_at(IVec2::new(9, 10));

        let fire = TickInput {
            attack: true,
            aim: Some(Vec2::X),
            ..Default::default()
        };
        tick(&mut world, &grid, &fire, SIM_DT);
        assert_eq!(world.projectiles.len(), 1);

        for _ in 0..60 {
            tick(&mut world, &grid, &TickInput::default(), SIM_DT);
        }
        assert!(world.projectiles.is_empty());
        let enemy = &world.enemies[0];
        assert_eq!(enemy.health(), enemy.max_health() - 1);
        assert_eq!(enemy.effect(), WeaponEffect::Freeze);
    }

    #[test]
    fn test_contact_damage_and_invincibility() {
        let grid = arena();
        let mut world = world_at(Vec2::new(10.0, 10.0));
        world.spawn_enemy_at(IVec2::new(10, 10));
        tick(&mut world, &grid, &TickInput::default(), SIM_DT);
        assert_eq!(world.player.health(), 2);
        tick(&mut world, &grid, &TickInput::default(), SIM_DT);
        assert_eq!(world.player.health(), 2);
        assert!(world
            .drain_events()
            .contains(&GameEvent::PlayerDamaged { amount: 1 }));
    }

    #[test]
    fn test_dead_player_does_not_move() {
        let grid = arena();
        let mut world = world_at(Vec2::new(10.0, 10.0));
        world.damage_player(99, DamageType::Physical);
        let before = world.player.transform.pos;
        let input = TickInput {
            movement: Vec2::X,
            attack: true,
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut world, &grid, &input, SIM_DT);
        }
        assert_eq!(world.player.transform.pos, before);
        assert!(world.projectiles.is_empty());
        assert_eq!(world.survival_time(), 0.0);
    }

    #[test]
    fn test_spawns_after_safe_period() {
        let grid = TileGrid::bordered(120, 120);
        let mut world = world_at(Vec2::new(60.0, 60.0));
        world.player.buffs.grant(crate::sim::player::BuffKind::Invincibility, 1000.0);
        let ticks = (16.0 / SIM_DT) as usize;
        for _ in 0..ticks {
            tick(&mut world, &grid, &TickInput::default(), SIM_DT);
        }
        assert_eq!(world.enemies.len(), 1);
    }

    #[test]
    fn test_fixed_step_caps_substeps() {
        let grid = arena();
        let mut world = world_at(Vec2::new(10.0, 10.0));
        let mut stepper = FixedStep::new();
        assert_eq!(stepper.advance(&mut world, &grid, &TickInput::default(), SIM_DT * 2.5), 2);
        assert_eq!(stepper.advance(&mut world, &grid, &TickInput::default(), 10.0), MAX_SUBSTEPS);
        assert_eq!(world.time_ticks, 2 + MAX_SUBSTEPS as u64);
    }

    fn launch_bolt(world: &mut World, from: Vec2, aim: Vec2, owner: Owner) {
        let id = world.next_entity_id();
        let cfg = world.tuning().combat.clone();
        let bolt = Projectile::fire(id, from, aim, &Weapon::ice_bow(), 0, owner, &cfg).unwrap();
        world.projectiles.push(bolt);
    }

    #[test]
    fn test_hostile_projectile_skips_enemies_and_hits_player() {
        let grid = arena();
        let mut world = world_at(Vec2::new(10.0, 10.0));
        world.spawn_enemy_at(IVec2::new(8, 10));
        let effects = world.tuning().effects.clone();
        // Frozen so it neither walks into the player nor touches them
        world.enemies[0].apply_effect(WeaponEffect::Freeze, &effects);

        launch_bolt(&mut world, Vec2::new(6.45, 10.45), Vec2::X, Owner::Hostile);
        for _ in 0..40 {
            tick(&mut world, &grid, &TickInput::default(), SIM_DT);
            if world.player.health() < world.player.max_health() {
                break;
            }
        }
        assert!(world.projectiles.is_empty());
        assert_eq!(world.player.health(), 2);
        assert_eq!(world.enemies[0].health(), world.enemies[0].max_health());

        // Still invincible from that hit: the next bolt is spent harmlessly
        let center = world.player.transform.center();
        launch_bolt(&mut world, center - Vec2::new(1.0, 0.0), Vec2::X, Owner::Hostile);
        for _ in 0..10 {
            tick(&mut world, &grid, &TickInput::default(), SIM_DT);
        }
        assert!(world.projectiles.is_empty());
        assert_eq!(world.player.health(), 2);
    }

    #[test]
    fn test_player_projectile_ignores_player() {
        let grid = arena();
        let mut world = world_at(Vec2::new(10.0, 10.0));
        let center = world.player.transform.center();
        launch_bolt(&mut world, center, Vec2::X, Owner::Player);
        let bolt = &mut world.projectiles[0];
        bolt.vel = Vec2::ZERO;
        bolt.transform.pos = center - bolt.transform.size / 2.0;
        assert!(world.projectiles[0].hits(&world.player.transform));

        for _ in 0..10 {
            tick(&mut world, &grid, &TickInput::default(), SIM_DT);
        }
        assert_eq!(world.projectiles.len(), 1);
        assert_eq!(world.player.health(), world.player.max_health());
    }

    #[test]
    fn test_far_enemies_are_culled_but_corpses_expire() {
        let grid = TileGrid::bordered(120, 120);
        let mut world = world_at(Vec2::new(10.0, 10.0));
        let live = world.spawn_enemy_at(IVec2::new(70, 10));
        world.spawn_enemy_at(IVec2::new(70, 20));
        let corpse_center = world.enemies[1].transform.center();
        assert_eq!(world.kill_enemies_near(corpse_center, 0.5), 1);

        world.enemies[0].decision_cooldown = 0.25;
        world.enemies[0].patrol_timer = 1.0;
        let before = world.enemies[0].clone();

        let corpse_ticks = ((world.tuning().combat.corpse_duration + 0.5) / SIM_DT) as usize;
        for _ in 0..corpse_ticks {
            tick(&mut world, &grid, &TickInput::default(), SIM_DT);
        }

        assert_eq!(world.enemies.len(), 1);
        let enemy = &world.enemies[0];
        assert_eq!(enemy.id, live);
        assert_eq!(enemy.transform, before.transform);
        assert_eq!(enemy.target_tile, before.target_tile);
        assert_eq!(enemy.decision_cooldown, before.decision_cooldown);
        assert_eq!(enemy.patrol_timer, before.patrol_timer);
    }

    fn first_chase_step(world: &mut World) -> f32 {
        let grid = arena();
        let start = world.enemies[0].transform.pos.x;
        tick(world, &grid, &TickInput::default(), SIM_DT);
        assert_eq!(world.enemies[0].target_tile, IVec2::new(6, 10));
        world.enemies[0].transform.pos.x - start
    }

    #[test]
    fn test_glide_speed_scaled_by_rage_and_slow() {
        let chase = world_at(Vec2::new(10.0, 10.0)).tuning().ai.chase_speed;

        let mut calm = world_at(Vec2::new(10.0, 10.0));
        calm.spawn_enemy_at(IVec2::new(5, 10));
        let step = first_chase_step(&mut calm);
        assert!((step - chase * SIM_DT).abs() < 1e-5);

        let mut berserk = world_at(Vec2::new(10.0, 10.0));
        berserk.spawn_enemy_at(IVec2::new(5, 10));
        let rage_cfg = berserk.tuning().rage.clone();
        berserk.rage.max_out(&rage_cfg);
        let step = first_chase_step(&mut berserk);
        assert!((step - chase * 1.5 * SIM_DT).abs() < 1e-5);

        let mut slowed = world_at(Vec2::new(10.0, 10.0));
        slowed.spawn_enemy_at(IVec2::new(5, 10));
        let effects = slowed.tuning().effects.clone();
        slowed.enemies[0].apply_effect(WeaponEffect::Slow, &effects);
        let step = first_chase_step(&mut slowed);
        assert!((step - chase * effects.slow_multiplier * SIM_DT).abs() < 1e-5);
    }

    #[test]
    fn test_contact_damage_truncates_rage_scaling() {
        let grid = arena();
        let mut world = world_at(Vec2::new(10.0, 10.0));
        let rage_cfg = world.tuning().rage.clone();
        world.rage.max_out(&rage_cfg);
        world.spawn_enemy_at(IVec2::new(10, 10));
        tick(&mut world, &grid, &TickInput::default(), SIM_DT);
        assert_eq!(world.player.health(), 2);

        let mut world = world_at(Vec2::new(10.0, 10.0));
        world.tuning_mut().combat.contact_damage = 3;
        world.player.set_max_health_bonus(10);
        world.player.heal(10);
        world.rage.max_out(&rage_cfg);
        world.spawn_enemy_at(IVec2::new(10, 10));
        tick(&mut world, &grid, &TickInput::default(), SIM_DT);
        assert_eq!(world.player.health(), 13 - 4);
    }

    #[test]
    fn test_live_edited_bad_tuning_does_not_panic() {
        let grid = arena();
        let mut world = world_at(Vec2::new(10.0, 10.0));
        world.tuning_mut().physics.accel = -1.0;
        world.tuning_mut().combat.knockback_min = 5.0;
        world.tuning_mut().combat.knockback_max = 4.0;
        world.tuning_mut().combat.ranged_min_falloff = 2.0;
        world.spawn_enemy_at(IVec2::new(10, 9));

        let input = TickInput {
            movement: Vec2::X,
            attack: true,
            ..Default::default()
        };
        for _ in 0..5 {
            tick(&mut world, &grid, &input, SIM_DT);
        }
        assert!(world.player.vel.x > 0.0);
        assert!(world.enemies[0].health() < world.enemies[0].max_health());
    }

    #[test]
    fn test_rejects_bad_dt() {
        let grid = arena();
        let mut world = world_at(Vec2::new(10.0, 10.0));
        tick(&mut world, &grid, &TickInput::default(), f32::NAN);
        tick(&mut world, &grid, &TickInput::default(), -1.0);
        assert_eq!(world.time_ticks, 0);
    }
}
