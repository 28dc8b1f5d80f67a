//! Weapons, damage and melee resolution
//!
//! - Weapon templates and presets
//! - Melee arc test (cheap squared-distance reject, then facing cone)
//! - Knockback strength from hit distance

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use crate::tuning::CombatConfig;
use crate::{angle_degrees, angle_diff_degrees, clamp_between};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    Physical,
    Magical,
}

/// Status effect a weapon applies to surviving targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponEffect {
    #[default]
    None,
    Freeze,
    Slow,
    Burn,
    Poison,
}

/// One of four cardinal facings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Right,
    Up,
    Left,
    #[default]
    Down,
}

impl Facing {
    /// Reference angle in degrees, counter-clockwise from +X
    pub fn angle(self) -> f32 {
        match self {
            Facing::Right => 0.0,
            Facing::Up => 90.0,
            Facing::Left => 180.0,
            Facing::Down => 270.0,
        }
    }

    pub fn vector(self) -> Vec2 {
        match self {
            Facing::Right => Vec2::X,
            Facing::Up => Vec2::Y,
            Facing::Left => Vec2::NEG_X,
            Facing::Down => Vec2::NEG_Y,
        }
    }

    /// Dominant axis of a direction; `None` for a zero vector
    pub fn from_vector(v: Vec2) -> Option<Self> {
        if v == Vec2::ZERO || !v.is_finite() {
            return None;
        }
        Some(if v.x.abs() >= v.y.abs() {
            if v.x > 0.0 { Facing::Right } else { Facing::Left }
        } else if v.y > 0.0 {
            Facing::Up
        } else {
            Facing::Down
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WeaponKind {
    Melee,
    Ranged { projectile_speed: f32 },
}

/// Weapon template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: i32,
    pub range: f32,
    pub cooldown: f32,
    pub effect: WeaponEffect,
    pub damage_type: DamageType,
    pub kind: WeaponKind,
    pub energy_cost: f32,
    /// Push on the wielder opposite the aim when fired (0 = none)
    pub recoil: f32,
}

impl Weapon {
    pub fn sword() -> Self {
        Self {
            name: "Iron Sword".to_string(),
            damage: 1,
            range: 2.2,
            cooldown: 0.3,
            effect: WeaponEffect::None,
            damage_type: DamageType::Physical,
            kind: WeaponKind::Melee,
            energy_cost: 10.0,
            recoil: 0.0,
        }
    }

    pub fn ice_bow() -> Self {
        Self {
            name: "Ice Bow".to_string(),
            damage: 1,
            range: 5.0,
            cooldown: 0.8,
            effect: WeaponEffect::Freeze,
            damage_type: DamageType::Physical,
            kind: WeaponKind::Ranged {
                projectile_speed: 8.0,
            },
            energy_cost: 10.0,
            recoil: 0.0,
        }
    }

    pub fn fire_staff() -> Self {
        Self {
            name: "Fire Staff".to_string(),
            damage: 2,
            range: 3.0,
            cooldown: 1.2,
            effect: WeaponEffect::Burn,
            damage_type: DamageType::Magical,
            kind: WeaponKind::Ranged {
                projectile_speed: 6.0,
            },
            energy_cost: 15.0,
            recoil: 0.5,
        }
    }

    pub fn magic_wand() -> Self {
        Self {
            name: "Magic Wand".to_string(),
            damage: 1,
            range: 4.0,
            cooldown: 0.6,
            effect: WeaponEffect::Slow,
            damage_type: DamageType::Magical,
            kind: WeaponKind::Ranged {
                projectile_speed: 7.0,
            },
            energy_cost: 10.0,
            recoil: 0.0,
        }
    }

    /// Look up a preset by its display name
    pub fn by_name(name: &str) -> Option<Self> {
        [
            Self::sword(),
            Self::ice_bow(),
            Self::fire_staff(),
            Self::magic_wand(),
        ]
        .into_iter()
        .find(|w| w.name == name)
    }

    pub fn is_ranged(&self) -> bool {
        matches!(self.kind, WeaponKind::Ranged { .. })
    }
}

/// Everything the damage pipeline needs to know about one hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub damage: i32,
    pub damage_type: DamageType,
    pub effect: WeaponEffect,
    /// Where the hit came from (knockback points away from it)
    pub source: Vec2,
    /// Knockback strength multiplier
    pub knockback: f32,
}

/// Distance to the target if it lies inside the melee arc
///
/// Targets within `point_blank_radius` are hit regardless of facing.
pub fn melee_hit_distance(
    origin: Vec2,
    facing: Facing,
    target: Vec2,
    range: f32,
    cfg: &CombatConfig,
) -> Option<f32> {
    let offset = target - origin;
    let dist_sq = offset.length_squared();
    if dist_sq > range * range {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist < cfg.point_blank_radius {
        return Some(dist);
    }

    let approach = angle_degrees(offset);
    if angle_diff_degrees(approach, facing.angle()) <= cfg.melee_half_angle {
        Some(dist)
    } else {
        None
    }
}

/// Live enemies inside the melee arc, as (index, distance)
pub fn melee_targets(
    origin: Vec2,
    facing: Facing,
    range: f32,
    enemies: &[Enemy],
    cfg: &CombatConfig,
) -> Vec<(usize, f32)> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_dead())
        .filter_map(|(i, e)| {
            melee_hit_distance(origin, facing, e.transform.center(), range, cfg).map(|d| (i, d))
        })
        .collect()
}

/// Knockback strength for a melee hit
///
/// Closer hits knock back harder: `base + (1 - distance/range)`, clamped, then
/// doubled when sprinting (clamped again) and scaled by the wielder's stat.
pub fn knockback_multiplier(
    distance: f32,
    range: f32,
    sprinting: bool,
    stat_multiplier: f32,
    cfg: &CombatConfig,
) -> f32 {
    let falloff = if range > 0.0 {
        (1.0 - distance / range).max(0.0)
    } else {
        0.0
    };
    let (lo, hi) = (cfg.knockback_min, cfg.knockback_max);
    let mut mult = clamp_between(cfg.knockback_base + falloff, lo, hi);
    if sprinting {
        mult = clamp_between(mult * cfg.sprint_knockback, lo, hi);
    }
    mult * stat_multiplier
}

/// Knockback strength for a projectile hit, falling off with travel distance
pub fn ranged_knockback(travelled: f32, cfg: &CombatConfig) -> f32 {
    let falloff = if cfg.ranged_falloff_range > 0.0 {
        clamp_between(
            1.0 - travelled / cfg.ranged_falloff_range,
            cfg.ranged_min_falloff,
            1.0,
        )
    } else {
        1.0
    };
    cfg.ranged_knockback * falloff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_angle(deg: f32, dist: f32) -> Vec2 {
        let r = deg.to_radians();
        Vec2::new(r.cos(), r.sin()) * dist
    }

    #[test]
    fn test_melee_arc_facing_down() {
        let cfg = CombatConfig::default();
        let origin = Vec2::ZERO;

        let hit = melee_hit_distance(origin, Facing::Down, at_angle(260.0, 1.0), 2.2, &cfg);
        assert!(hit.is_some());

        let miss = melee_hit_distance(origin, Facing::Down, at_angle(100.0, 1.0), 2.2, &cfg);
        assert!(miss.is_none());

        // Same bearing, but point-blank
        let close = melee_hit_distance(origin, Facing::Down, at_angle(100.0, 0.4), 2.2, &cfg);
        assert!(close.is_some());
    }

    #[test]
    fn test_melee_out_of_range() {
        let cfg = CombatConfig::default();
        let target = at_angle(270.0, 2.5);
        assert!(melee_hit_distance(Vec2::ZERO, Facing::Down, target, 2.2, &cfg).is_none());
    }

    #[test]
    fn test_knockback_clamp() {
        let cfg = CombatConfig::default();
        assert!((knockback_multiplier(0.0, 2.0, false, 1.0, &cfg) - 2.0).abs() < 1e-6);
        assert!((knockback_multiplier(0.0, 2.0, true, 1.0, &cfg) - 4.0).abs() < 1e-6);
        // Edge of range bottoms out at the floor
        assert!((knockback_multiplier(2.0, 2.0, false, 1.0, &cfg) - 1.0).abs() < 1e-6);
        // Stat multiplier applies after clamping
        assert!((knockback_multiplier(0.0, 2.0, true, 1.5, &cfg) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_knockback_zero_range() {
        let cfg = CombatConfig::default();
        let m = knockback_multiplier(0.0, 0.0, false, 1.0, &cfg);
        assert!(m.is_finite());
        assert!((m - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_knockback_inverted_bounds_stay_in_range() {
        let cfg = CombatConfig {
            knockback_min: 5.0,
            knockback_max: 4.0,
            ranged_min_falloff: 2.0,
            ..CombatConfig::default()
        };
        let m = knockback_multiplier(0.0, 2.0, true, 1.0, &cfg);
        assert!((4.0..=5.0).contains(&m));
        let r = ranged_knockback(3.0, &cfg);
        assert!(r.is_finite());
    }

    #[test]
    fn test_ranged_knockback_falloff() {
        let cfg = CombatConfig::default();
        assert!((ranged_knockback(0.0, &cfg) - 1.5).abs() < 1e-6);
        assert!((ranged_knockback(100.0, &cfg) - 1.5 * 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_facing_from_vector() {
        assert_eq!(Facing::from_vector(Vec2::new(0.2, -1.0)), Some(Facing::Down));
        assert_eq!(Facing::from_vector(Vec2::new(-3.0, 1.0)), Some(Facing::Left));
        assert_eq!(Facing::from_vector(Vec2::ZERO), None);
    }

    #[test]
    fn test_weapon_lookup() {
        let bow = Weapon::by_name("Ice Bow").unwrap();
        assert!(bow.is_ranged());
        assert_eq!(bow.effect, WeaponEffect::Freeze);
        assert!(Weapon::by_name("Banana").is_none());
    }
}
