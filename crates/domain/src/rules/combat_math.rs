//! Attack rolls, damage rolls, AC, initiative, and the other arithmetic combat
//! shares with the rest of the ruleset.

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;
use crate::rules::dice::{roll_d20_resolved, DiceFormula, DiceParseError, DiceRollResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorType {
    Light,
    Medium,
    Heavy,
    Unarmored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub hit: bool,
    pub critical: bool,
    pub roll: DiceRollResult,
}

/// Natural 20 always hits and is critical, natural 1 always misses, otherwise
/// hit iff the total meets or beats the target's AC.
pub fn attack_roll(
    attack_bonus: i32,
    target_ac: i32,
    advantage: bool,
    disadvantage: bool,
    random: &dyn RandomSource,
) -> AttackOutcome {
    let roll = roll_d20_resolved(attack_bonus, advantage, disadvantage, random);

    if roll.is_natural_1() {
        return AttackOutcome {
            hit: false,
            critical: false,
            roll,
        };
    }
    if roll.is_natural_20() {
        return AttackOutcome {
            hit: true,
            critical: true,
            roll,
        };
    }

    AttackOutcome {
        hit: roll.total >= target_ac,
        critical: false,
        roll,
    }
}

/// Roll damage, doubling dice (not the modifier) on a critical hit, floored at 0.
pub fn damage_roll(
    damage_dice: &str,
    damage_modifier: i32,
    is_critical: bool,
    random: &dyn RandomSource,
) -> Result<DiceRollResult, DiceParseError> {
    let mut formula = DiceFormula::parse(damage_dice)?;
    formula.modifier = damage_modifier;
    if is_critical {
        formula = formula.doubled();
    }

    let mut result = formula.roll(random);
    if result.total < 0 {
        result.total = 0;
    }
    Ok(result)
}

pub fn calculate_ac(
    armor_ac_base: i32,
    dex_modifier: i32,
    armor_type: ArmorType,
    shield: bool,
    other_bonuses: i32,
) -> i32 {
    let mut ac = match armor_type {
        ArmorType::Light | ArmorType::Unarmored => armor_ac_base + dex_modifier,
        ArmorType::Medium => armor_ac_base + dex_modifier.min(2),
        ArmorType::Heavy => armor_ac_base,
    };
    if shield {
        ac += 2;
    }
    ac + other_bonuses
}

pub fn calculate_ac_unarmored(dex_modifier: i32, other_bonuses: i32) -> i32 {
    10 + dex_modifier + other_bonuses
}

pub fn initiative_roll(dex_modifier: i32, random: &dyn RandomSource) -> DiceRollResult {
    crate::rules::dice::roll_d20(dex_modifier, random)
}

/// Sort combatants by initiative descending, breaking ties with a random draw
/// (fresh per call, so a tie is not guaranteed to resolve the same way twice).
pub fn determine_turn_order(combatants: &[(String, i32)], random: &dyn RandomSource) -> Vec<String> {
    let mut scored: Vec<(String, i32, i32)> = combatants
        .iter()
        .map(|(id, init)| (id.clone(), *init, random.gen_range(0, 1_000_000)))
        .collect();
    scored.sort_by(|a, b| (b.1, b.2).cmp(&(a.1, a.2)));
    scored.into_iter().map(|(id, _, _)| id).collect()
}

pub fn calculate_flee_dc(enemy_count: i32) -> i32 {
    10 + 2 * enemy_count.max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatLevel {
    Trivial,
    Easy,
    Normal,
    Hard,
    Deadly,
    Overwhelming,
}

pub fn assess_threat_level(player_level: i32, enemy_level: i32) -> ThreatLevel {
    match enemy_level - player_level {
        d if d <= -5 => ThreatLevel::Trivial,
        d if d <= -2 => ThreatLevel::Easy,
        d if d <= 1 => ThreatLevel::Normal,
        d if d <= 3 => ThreatLevel::Hard,
        d if d <= 5 => ThreatLevel::Deadly,
        _ => ThreatLevel::Overwhelming,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NpcAction {
    Flee,
    Dodge,
    Attack { target_id: String },
}

/// HP below 25% of max flees; otherwise attack the weakest still-alive target.
pub fn npc_choose_action(
    npc_hp_current: i32,
    npc_hp_max: i32,
    targets: &[(String, i32)],
) -> NpcAction {
    if npc_hp_max > 0 && (npc_hp_current as f64 / npc_hp_max as f64) < 0.25 {
        return NpcAction::Flee;
    }

    targets
        .iter()
        .filter(|(_, hp)| *hp > 0)
        .min_by_key(|(_, hp)| *hp)
        .map(|(id, _)| NpcAction::Attack {
            target_id: id.clone(),
        })
        .unwrap_or(NpcAction::Dodge)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StepRandom(std::cell::RefCell<Vec<i32>>);
    impl RandomSource for StepRandom {
        fn gen_range(&self, _min: i32, _max: i32) -> i32 {
            self.0.borrow_mut().remove(0)
        }
        fn gen_probability(&self) -> f64 {
            0.0
        }
    }

    #[test]
    fn natural_1_always_misses() {
        let rng = StepRandom(std::cell::RefCell::new(vec![1]));
        let outcome = attack_roll(99, 1, false, false, &rng);
        assert!(!outcome.hit);
        assert!(!outcome.critical);
    }

    #[test]
    fn natural_20_always_hits_and_crits() {
        let rng = StepRandom(std::cell::RefCell::new(vec![20]));
        let outcome = attack_roll(-99, 999, false, false, &rng);
        assert!(outcome.hit);
        assert!(outcome.critical);
    }

    #[test]
    fn damage_floors_at_zero() {
        let rng = StepRandom(std::cell::RefCell::new(vec![1]));
        let result = damage_roll("1d4", -10, false, &rng).unwrap();
        assert_eq!(result.total, 0);
    }

    #[test]
    fn critical_damage_doubles_dice_not_modifier() {
        let rng = StepRandom(std::cell::RefCell::new(vec![6, 6]));
        let result = damage_roll("1d8", 3, true, &rng).unwrap();
        assert_eq!(result.individual_rolls.len(), 2);
        assert_eq!(result.total, 6 + 6 + 3);
    }

    #[test]
    fn medium_armor_caps_dex_bonus_at_2() {
        assert_eq!(calculate_ac(14, 4, ArmorType::Medium, false, 0), 16);
    }

    #[test]
    fn heavy_armor_ignores_dex() {
        assert_eq!(calculate_ac(18, 5, ArmorType::Heavy, false, 0), 18);
    }

    #[test]
    fn flee_dc_scales_with_enemy_count() {
        assert_eq!(calculate_flee_dc(0), 12);
        assert_eq!(calculate_flee_dc(3), 16);
    }

    #[test]
    fn threat_level_buckets() {
        assert_eq!(assess_threat_level(10, 5), ThreatLevel::Trivial);
        assert_eq!(assess_threat_level(10, 10), ThreatLevel::Normal);
        assert_eq!(assess_threat_level(1, 20), ThreatLevel::Overwhelming);
    }

    #[test]
    fn low_hp_npc_flees() {
        let action = npc_choose_action(2, 10, &[("foe".into(), 10)]);
        assert_eq!(action, NpcAction::Flee);
    }

    #[test]
    fn npc_attacks_weakest_alive_target() {
        let action = npc_choose_action(10, 10, &[("a".into(), 5), ("b".into(), 1), ("c".into(), 0)]);
        assert_eq!(
            action,
            NpcAction::Attack {
                target_id: "b".into()
            }
        );
    }
}
