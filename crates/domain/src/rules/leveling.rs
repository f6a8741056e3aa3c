//! Experience thresholds, proficiency bonus, and hit-die-based level-up HP.

use crate::random::RandomSource;
use crate::rules::dice::DiceFormula;

const XP_THRESHOLDS: [i32; 20] = [
    0, 300, 900, 2700, 6500, 14000, 23000, 34000, 48000, 64000, 85000, 100000, 120000, 140000, 165000, 195000,
    225000, 265000, 305000, 355000,
];

/// XP required to reach `level` (1-20). Levels outside that range return 0.
pub fn xp_for_level(level: i32) -> i32 {
    XP_THRESHOLDS.get((level - 1) as usize).copied().unwrap_or(0)
}

/// Highest level whose threshold `xp` meets or exceeds.
pub fn level_for_xp(xp: i32) -> i32 {
    let mut level = 1;
    for (index, &threshold) in XP_THRESHOLDS.iter().enumerate() {
        if xp >= threshold {
            level = (index + 1) as i32;
        } else {
            break;
        }
    }
    level
}

pub fn proficiency_bonus(level: i32) -> i32 {
    match level.clamp(1, 20) {
        1..=4 => 2,
        5..=8 => 3,
        9..=12 => 4,
        13..=16 => 5,
        _ => 6,
    }
}

pub fn can_level_up(current_level: i32, current_xp: i32) -> bool {
    if current_level >= 20 {
        return false;
    }
    current_xp >= xp_for_level(current_level + 1)
}

pub fn hit_die(class_name: &str) -> &'static str {
    match class_name.to_lowercase().as_str() {
        "fighter" => "1d10",
        "wizard" => "1d6",
        "rogue" => "1d8",
        "cleric" => "1d8",
        _ => "1d8",
    }
}

/// Hit die roll + CON modifier, minimum 1 HP gained.
pub fn roll_hit_points_on_level_up(class_name: &str, con_modifier: i32, random: &dyn RandomSource) -> i32 {
    let formula = DiceFormula::parse(hit_die(class_name)).expect("hit_die always returns a valid formula");
    let gained = formula.roll(random).total + con_modifier;
    gained.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRandom(i32);
    impl RandomSource for FixedRandom {
        fn gen_range(&self, _min: i32, _max: i32) -> i32 {
            self.0
        }
        fn gen_probability(&self) -> f64 {
            0.0
        }
    }

    #[test]
    fn level_1_requires_no_xp() {
        assert_eq!(xp_for_level(1), 0);
        assert_eq!(level_for_xp(0), 1);
    }

    #[test]
    fn level_for_xp_picks_highest_met_threshold() {
        assert_eq!(level_for_xp(899), 1);
        assert_eq!(level_for_xp(900), 3);
    }

    #[test]
    fn proficiency_bonus_bands() {
        assert_eq!(proficiency_bonus(1), 2);
        assert_eq!(proficiency_bonus(5), 3);
        assert_eq!(proficiency_bonus(20), 6);
    }

    #[test]
    fn cannot_level_past_20() {
        assert!(!can_level_up(20, 10_000_000));
    }

    #[test]
    fn hp_gain_floors_at_one() {
        let rng = FixedRandom(1);
        assert_eq!(roll_hit_points_on_level_up("wizard", -10, &rng), 1);
    }

    #[test]
    fn hp_gain_adds_con_modifier() {
        let rng = FixedRandom(6);
        assert_eq!(roll_hit_points_on_level_up("fighter", 3, &rng), 9);
    }
}
