//! Endless Maze headless runner
//!
//! Plays a seeded survival session with a scripted player and prints a summary.
//!
//! Usage: endless-maze [--seconds N] [--seed S] [--tuning tuning.json] [--leaderboard board.json]

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use glam::Vec2;

use endless_maze::consts::SIM_DT;
use endless_maze::leaderboard::LeaderboardEntry;
use endless_maze::sim::{FixedStep, GameEvent, TickInput, Tile, TileGrid, Weapon, World};
use endless_maze::{Leaderboard, Tuning};

const ARENA_SIZE: i32 = 120;

struct Options {
    seconds: f32,
    seed: u64,
    tuning: Option<String>,
    leaderboard: Option<String>,
}

fn parse_args() -> Options {
    let args: Vec<String> = env::args().skip(1).collect();
    let value = |flag: &str| {
        args.iter()
            .skip_while(|a| a.as_str() != flag)
            .nth(1)
            .cloned()
    };
    Options {
        seconds: value("--seconds")
            .and_then(|s| s.parse().ok())
            .unwrap_or(180.0),
        seed: value("--seed").and_then(|s| s.parse().ok()).unwrap_or(1),
        tuning: value("--tuning"),
        leaderboard: value("--leaderboard"),
    }
}

/// Open arena with a border and a lattice of pillars
fn build_arena() -> TileGrid {
    let mut grid = TileGrid::bordered(ARENA_SIZE, ARENA_SIZE);
    for y in (8..ARENA_SIZE - 8).step_by(12) {
        for x in (8..ARENA_SIZE - 8).step_by(12) {
            grid.set(x, y, Tile::Wall);
            grid.set(x + 1, y, Tile::Wall);
            grid.set(x, y + 1, Tile::Wall);
            grid.set(x + 1, y + 1, Tile::Wall);
        }
    }
    grid
}

/// Kite in a slow circle, shoot at the nearest enemy in range
fn scripted_input(world: &World, t: f32) -> TickInput {
    let center = world.player.transform.center();
    let nearest = world
        .enemies
        .iter()
        .filter(|e| !e.is_dead())
        .map(|e| e.transform.center())
        .min_by(|a, b| a.distance_squared(center).total_cmp(&b.distance_squared(center)));

    let heading = t * 0.4;
    let mut input = TickInput {
        movement: Vec2::new(heading.cos(), heading.sin()),
        running: (t as u32) % 10 < 3,
        switch_weapon: world.time_ticks > 0 && world.time_ticks % 900 == 0,
        ..Default::default()
    };
    if let Some(target) = nearest {
        let to_target = target - center;
        if to_target.length() < 8.0 {
            input.attack = true;
            input.aim = Some(to_target);
        }
    }
    input
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    let opts = parse_args();

    let tuning = match &opts.tuning {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let grid = build_arena();
    let spawn = Vec2::splat(ARENA_SIZE as f32 / 2.0);
    let mut world = World::new(opts.seed, spawn, tuning);
    world.player.add_weapon(Weapon::ice_bow());
    world.player.add_weapon(Weapon::magic_wand());

    log::info!(
        "Endless Maze: seed {}, {:.0}s on a {}x{} arena",
        opts.seed,
        opts.seconds,
        ARENA_SIZE,
        ARENA_SIZE
    );

    let mut stepper = FixedStep::new();
    let mut elapsed = 0.0;
    let mut shots = 0u32;
    let mut hits = 0u32;
    let mut damage_taken = 0;
    let mut bosses = 0u32;
    while elapsed < opts.seconds && !world.is_over() {
        let input = scripted_input(&world, elapsed);
        stepper.advance(&mut world, &grid, &input, SIM_DT);
        elapsed += SIM_DT;

        for event in world.drain_events() {
            match event {
                GameEvent::WeaponFired { .. } => shots += 1,
                GameEvent::ProjectileHit { .. } => hits += 1,
                GameEvent::PlayerDamaged { amount } => damage_taken += amount,
                GameEvent::SpawnBoss => bosses += 1,
                GameEvent::WaveChanged { index, .. } => {
                    println!("[{}] wave {}", world.wave.formatted_time(), index + 1)
                }
                GameEvent::PlayerDied => {
                    println!("[{}] player died", world.wave.formatted_time())
                }
                _ => {}
            }
        }
    }

    let tuning = world.tuning();
    println!();
    println!("Survived:     {}", world.wave.formatted_time());
    println!("Wave:         {}", world.wave.wave_name());
    println!("Kills:        {}", world.stats.kills);
    println!("Score:        {}", world.stats.score);
    println!("Best combo:   {}", world.combo.max());
    println!("Rage:         {}", world.rage.level_name(&tuning.rage));
    println!("Shots/hits:   {}/{}", shots, hits);
    println!("Damage taken: {}", damage_taken);
    println!("Bosses:       {}", bosses);
    println!("Enemies left: {}", world.live_enemies());

    match world.snapshot().to_json() {
        Ok(json) => println!("\nSnapshot:\n{}", json),
        Err(err) => log::error!("Snapshot encode failed: {}", err),
    }

    if let Some(path) = &opts.leaderboard {
        let mut board = Leaderboard::load_or_default(path);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let entry = LeaderboardEntry::from_world(&world, now);
        match board.add(entry) {
            Some(rank) => println!("Leaderboard rank: #{}", rank),
            None => println!("Did not make the leaderboard"),
        }
        if let Err(err) = board.save(path) {
            log::error!("Failed to save leaderboard: {}", err);
        }
    }
}
