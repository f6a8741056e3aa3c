//! Per-class resource pools: rage, ki, sorcery points, lay on hands, bardic
//! inspiration, wild shape, divine smite, and warlock pact slots.

/// Rage uses per long rest. Level 20 barbarians rage without limit.
pub fn rage_uses(barbarian_level: i32) -> i32 {
    match barbarian_level.clamp(1, 20) {
        1..=2 => 2,
        3..=5 => 3,
        6..=11 => 4,
        12..=16 => 5,
        17..=19 => 6,
        _ => 999,
    }
}

pub fn rage_damage_bonus(barbarian_level: i32) -> i32 {
    match barbarian_level.clamp(1, 20) {
        1..=8 => 2,
        9..=15 => 3,
        _ => 4,
    }
}

pub fn rage_resistances() -> &'static [&'static str] {
    &["bludgeoning", "piercing", "slashing"]
}

pub fn ki_points(monk_level: i32) -> i32 {
    monk_level.max(0)
}

pub fn ki_ability_dc(wisdom_score: i32, prof_bonus: i32) -> i32 {
    8 + (wisdom_score - 10).div_euclid(2) + prof_bonus
}

pub fn sorcery_points(sorcerer_level: i32) -> i32 {
    if sorcerer_level < 2 {
        0
    } else {
        sorcerer_level
    }
}

pub fn slot_to_sorcery_points(slot_level: i32) -> i32 {
    match slot_level {
        1 => 2,
        2 => 3,
        3 => 5,
        4 => 6,
        5 => 7,
        other => other + 1,
    }
}

pub fn sorcery_points_to_slot(points: i32) -> Option<i32> {
    match points {
        2 => Some(1),
        3 => Some(2),
        5 => Some(3),
        6 => Some(4),
        7 => Some(5),
        _ => None,
    }
}

pub fn lay_on_hands_pool(paladin_level: i32) -> i32 {
    paladin_level.max(0) * 5
}

pub fn inspiration_uses(charisma_score: i32) -> i32 {
    let cha_mod = (charisma_score - 10).div_euclid(2);
    cha_mod.max(1)
}

pub fn inspiration_die(bard_level: i32) -> &'static str {
    if bard_level >= 15 {
        "1d12"
    } else if bard_level >= 10 {
        "1d10"
    } else if bard_level >= 5 {
        "1d8"
    } else {
        "1d6"
    }
}

pub fn wild_shape_uses() -> i32 {
    2
}

pub fn wild_shape_temp_hp(druid_level: i32) -> i32 {
    druid_level.max(0) * 4
}

/// Base 2d8 at slot level 1, +1d8 per slot above that (capped at 5d8), +1d8
/// more against undead or fiends.
pub fn smite_damage_dice(slot_level: i32, is_undead_or_fiend: bool) -> String {
    let mut num_dice = (1 + slot_level).min(5);
    if is_undead_or_fiend {
        num_dice += 1;
    }
    format!("{num_dice}d8")
}

/// `(num_slots, slot_level)` for warlock Pact Magic at a given level.
pub fn pact_slots(warlock_level: i32) -> (i32, i32) {
    match warlock_level.clamp(1, 20) {
        1 => (1, 1),
        2 => (2, 1),
        3 | 4 => (2, 2),
        5 | 6 => (2, 3),
        7 | 8 => (2, 4),
        9 | 10 => (2, 5),
        11..=16 => (3, 5),
        _ => (4, 5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rage_uses_caps_unlimited_at_20() {
        assert_eq!(rage_uses(20), 999);
        assert_eq!(rage_uses(1), 2);
    }

    #[test]
    fn sorcery_points_unlock_at_level_2() {
        assert_eq!(sorcery_points(1), 0);
        assert_eq!(sorcery_points(2), 2);
    }

    #[test]
    fn smite_caps_at_five_dice_plus_one_vs_undead() {
        assert_eq!(smite_damage_dice(10, false), "5d8");
        assert_eq!(smite_damage_dice(10, true), "6d8");
        assert_eq!(smite_damage_dice(1, false), "2d8");
    }

    #[test]
    fn pact_slots_progression() {
        assert_eq!(pact_slots(1), (1, 1));
        assert_eq!(pact_slots(17), (4, 5));
    }

    #[test]
    fn inspiration_uses_is_at_least_one() {
        assert_eq!(inspiration_uses(8), 1);
        assert_eq!(inspiration_uses(18), 4);
    }
}
