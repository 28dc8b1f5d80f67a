//! Run snapshot for save/continue
//!
//! Only the plain fields a save layer needs; enemies and projectiles are not
//! persisted, a restored run starts with an empty arena.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::combat::Weapon;
use crate::sim::player::Armor;
use crate::sim::state::{RunStats, World};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Player lower-left corner, tile units
    pub player_pos: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub armor: Option<Armor>,
    /// Owned weapon names, in slot order
    pub weapons: Vec<String>,
    pub current_weapon: usize,
    pub combo: u32,
    pub max_combo: u32,
    pub rage: f32,
    pub wave: usize,
    pub survival_time: f32,
    pub score: u64,
    pub kills: u32,
    pub coins: u32,
}

impl RunSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl World {
    pub fn snapshot(&self) -> RunSnapshot {
        let player = &self.player;
        RunSnapshot {
            player_pos: player.transform.pos,
            health: player.health(),
            max_health: player.max_health(),
            armor: player.armor,
            weapons: player.weapons().iter().map(|w| w.name.clone()).collect(),
            current_weapon: player.current_weapon_index(),
            combo: self.combo.current(),
            max_combo: self.combo.max(),
            rage: self.rage.rage(),
            wave: self.wave.wave(),
            survival_time: self.survival_time(),
            score: self.stats.score,
            kills: self.stats.kills,
            coins: self.stats.coins,
        }
    }

    /// Continue a saved run
    ///
    /// The wave index is rebuilt from the survival time. Unknown weapon names
    /// are dropped; an empty result falls back to the sword.
    pub fn restore(&mut self, snap: &RunSnapshot) {
        let tuning = &self.tuning;

        let base = tuning.combat.player_max_health;
        self.player.revive();
        self.player.set_max_health_bonus(snap.max_health - base);
        self.player.set_health(snap.health.max(1), &tuning.combat);
        self.player.transform.pos = snap.player_pos;
        self.player.vel = Vec2::ZERO;
        self.player.armor = snap.armor.filter(|a| a.durability > 0);

        let mut weapons: Vec<Weapon> = snap
            .weapons
            .iter()
            .filter_map(|name| Weapon::by_name(name))
            .collect();
        if weapons.is_empty() {
            weapons.push(Weapon::sword());
        }
        self.player.set_inventory(weapons, snap.current_weapon);

        self.combo.restore(snap.combo, snap.max_combo, &tuning.combo);
        self.rage.set_level(snap.rage, &tuning.rage);
        self.wave.restore_survival_time(snap.survival_time, &tuning.wave);
        if self.wave.wave() != snap.wave {
            log::warn!(
                "Snapshot wave {} disagrees with survival time, using wave {}",
                snap.wave,
                self.wave.wave()
            );
        }
        self.stats = RunStats {
            kills: snap.kills,
            score: snap.score,
            coins: snap.coins,
        };

        self.enemies.clear();
        self.projectiles.clear();
        log::info!(
            "Run restored at {} (wave {}, score {})",
            self.wave.formatted_time(),
            self.wave.wave(),
            self.stats.score
        );
    }
}
