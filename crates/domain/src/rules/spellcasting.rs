//! Spell slots, DCs, cantrip scaling, and concentration.

use std::collections::HashMap;

use crate::rules::ability_scores::modifier;

pub const CANTRIP_SCALING_LEVELS: [i32; 3] = [5, 11, 17];

/// Max spell slots per spell level for a class at a given character level
/// (levels 1-5 only; higher levels clamp to the level-5 table).
pub fn spell_slots(class_name: &str, level: i32) -> HashMap<i32, i32> {
    let clamped = level.clamp(1, 5);
    let table: &[(i32, &[(i32, i32)])] = match class_name.to_lowercase().as_str() {
        "wizard" | "cleric" => &[
            (1, &[(1, 2)]),
            (2, &[(1, 3)]),
            (3, &[(1, 4), (2, 2)]),
            (4, &[(1, 4), (2, 3)]),
            (5, &[(1, 4), (2, 3), (3, 2)]),
        ],
        _ => &[],
    };
    table
        .iter()
        .find(|(lvl, _)| *lvl == clamped)
        .map(|(_, slots)| slots.iter().copied().collect())
        .unwrap_or_default()
}

pub fn calculate_spell_dc(ability_score: i32, prof_bonus: i32) -> i32 {
    8 + modifier(ability_score) + prof_bonus
}

pub fn calculate_spell_attack_bonus(ability_score: i32, prof_bonus: i32) -> i32 {
    modifier(ability_score) + prof_bonus
}

/// Lowest slot at or above `spell_level` that still has uses remaining.
pub fn find_usable_slot(spell_level: i32, slots_remaining: &HashMap<i32, i32>) -> Option<i32> {
    (spell_level..10).find(|sl| slots_remaining.get(sl).copied().unwrap_or(0) > 0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastError {
    SlotLevelUnavailable,
    NoSlotsRemaining,
}

/// Cantrips (level 0) are always castable; leveled spells need a class slot
/// table entry for their level and at least one usable slot.
pub fn can_cast_spell(
    spell_level: i32,
    char_level: i32,
    slots_remaining: &HashMap<i32, i32>,
    class_name: &str,
) -> Result<(), CastError> {
    if spell_level == 0 {
        return Ok(());
    }

    let max_slots = spell_slots(class_name, char_level);
    if !max_slots.contains_key(&spell_level) {
        return Err(CastError::SlotLevelUnavailable);
    }

    find_usable_slot(spell_level, slots_remaining)
        .map(|_| ())
        .ok_or(CastError::NoSlotsRemaining)
}

/// Extra dice gained at levels 5, 11, and 17.
pub fn scale_cantrip_dice(base_dice: &str, character_level: i32) -> String {
    let extra = CANTRIP_SCALING_LEVELS
        .iter()
        .filter(|&&threshold| character_level >= threshold)
        .count() as i32;
    if extra == 0 {
        return base_dice.to_string();
    }

    let Some((count_str, die_str)) = base_dice.to_lowercase().split_once('d') else {
        return base_dice.to_string();
    };
    let Ok(count) = count_str.parse::<i32>() else {
        return base_dice.to_string();
    };
    format!("{}d{die_str}", count + extra)
}

pub fn concentration_save_dc(damage_taken: i32) -> i32 {
    (damage_taken / 2).max(10)
}

pub fn arcane_recovery_slots(wizard_level: i32) -> i32 {
    (wizard_level + 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cantrips_are_always_castable() {
        assert!(can_cast_spell(0, 1, &HashMap::new(), "wizard").is_ok());
    }

    #[test]
    fn leveled_spell_needs_a_slot() {
        let slots = HashMap::new();
        assert_eq!(
            can_cast_spell(1, 3, &slots, "wizard"),
            Err(CastError::NoSlotsRemaining)
        );
    }

    #[test]
    fn higher_slot_can_cover_lower_spell() {
        let mut slots = HashMap::new();
        slots.insert(2, 1);
        assert_eq!(find_usable_slot(1, &slots), Some(2));
    }

    #[test]
    fn cantrip_scaling_kicks_in_at_thresholds() {
        assert_eq!(scale_cantrip_dice("1d10", 4), "1d10");
        assert_eq!(scale_cantrip_dice("1d10", 5), "2d10");
        assert_eq!(scale_cantrip_dice("1d10", 17), "4d10");
    }

    #[test]
    fn concentration_dc_has_a_floor_of_ten() {
        assert_eq!(concentration_save_dc(4), 10);
        assert_eq!(concentration_save_dc(30), 15);
    }

    #[test]
    fn arcane_recovery_rounds_up() {
        assert_eq!(arcane_recovery_slots(5), 3);
        assert_eq!(arcane_recovery_slots(4), 2);
    }
}
