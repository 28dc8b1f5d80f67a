//! Endless-mode leaderboard
//!
//! Best runs sorted by score, highest first, capped at `MAX_ENTRIES`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::World;

/// Maximum number of runs to keep
pub const MAX_ENTRIES: usize = 100;

/// One finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u64,
    pub kills: u32,
    /// Wave reached (0-based)
    pub wave: usize,
    /// Seconds survived
    pub survival_time: f32,
    pub max_combo: u32,
    /// Unix timestamp (s), supplied by the caller
    pub timestamp: u64,
}

impl LeaderboardEntry {
    /// Summary of a world's run so far
    pub fn from_world(world: &World, timestamp: u64) -> Self {
        Self {
            score: world.stats.score,
            kills: world.stats.kills,
            wave: world.wave.wave(),
            survival_time: world.survival_time(),
            max_combo: world.combo.max(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would get (1-based), `None` if it does not qualify
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let pos = self.entries.iter().position(|e| score > e.score);
        Some(pos.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run; returns its rank (1-based) or `None` if it missed the cut
    ///
    /// Equal scores rank below the ones already on the board.
    pub fn add(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        let rank = self.potential_rank(entry.score)?;
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode, re-sorting and capping whatever was stored
    pub fn from_json(json: &str) -> Result<Self> {
        let mut board: Leaderboard = serde_json::from_str(json)?;
        board.entries.sort_by(|a, b| b.score.cmp(&a.score));
        board.entries.truncate(MAX_ENTRIES);
        Ok(board)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load, or start fresh when the file is missing or unreadable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(board) => {
                log::info!("Loaded {} leaderboard entries", board.entries.len());
                board
            }
            Err(err) => {
                log::info!("No leaderboard at {} ({}), starting fresh", path.display(), err);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Leaderboard saved ({} entries)", self.entries.len());
        Ok(())
    }
}
