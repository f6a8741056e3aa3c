//! Lasting wounds: a single hit for more than half max HP leaves a lasting
//! ability penalty behind, on top of the HP loss itself.

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;
use crate::rules::ability_scores::Ability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WoundType {
    DeepGash,
    CrackedRib,
    Concussion,
    TornMuscle,
    SprainedWrist,
    BruisedRibs,
}

/// The four severe wound types, checked first when a hit deals >= 75% of max HP.
const SEVERE_WOUNDS: [WoundType; 4] = [
    WoundType::DeepGash,
    WoundType::CrackedRib,
    WoundType::Concussion,
    WoundType::TornMuscle,
];

const ALL_WOUNDS: [WoundType; 6] = [
    WoundType::DeepGash,
    WoundType::CrackedRib,
    WoundType::Concussion,
    WoundType::TornMuscle,
    WoundType::SprainedWrist,
    WoundType::BruisedRibs,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wound {
    pub wound_type: WoundType,
    pub ability: Ability,
    pub penalty: i32,
}

impl WoundType {
    pub fn ability(self) -> Ability {
        match self {
            WoundType::DeepGash | WoundType::SprainedWrist => Ability::Strength,
            WoundType::CrackedRib | WoundType::BruisedRibs => Ability::Constitution,
            WoundType::Concussion => Ability::Intelligence,
            WoundType::TornMuscle => Ability::Dexterity,
        }
    }

    pub fn penalty(self) -> i32 {
        match self {
            WoundType::DeepGash | WoundType::CrackedRib | WoundType::Concussion | WoundType::TornMuscle => -2,
            WoundType::SprainedWrist | WoundType::BruisedRibs => -1,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            WoundType::DeepGash => "A deep gash weakens your muscles.",
            WoundType::CrackedRib => "A cracked rib makes it hard to breathe.",
            WoundType::Concussion => "A blow to the head leaves you dazed.",
            WoundType::TornMuscle => "A torn muscle slows your movements.",
            WoundType::SprainedWrist => "A sprained wrist weakens your grip.",
            WoundType::BruisedRibs => "Bruised ribs make every breath painful.",
        }
    }
}

/// A single hit for more than half max HP causes a wound: severe (from the
/// first four types) at 75%+ of max HP, otherwise minor (from all six).
pub fn check_for_wound(damage: i32, hp_max: i32, random: &dyn RandomSource) -> Option<Wound> {
    if hp_max <= 0 {
        return None;
    }
    if (damage as f64) <= hp_max as f64 * 0.5 {
        return None;
    }

    let pool: &[WoundType] = if damage as f64 >= hp_max as f64 * 0.75 {
        &SEVERE_WOUNDS
    } else {
        &ALL_WOUNDS
    };

    let index = random.gen_range(0, pool.len() as i32 - 1) as usize;
    let wound_type = pool[index];
    Some(Wound {
        wound_type,
        ability: wound_type.ability(),
        penalty: wound_type.penalty(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealingMethod {
    LongRest,
    HealerNpc,
    Potion,
}

fn heal_chance(method: HealingMethod) -> f64 {
    match method {
        HealingMethod::LongRest => 0.50,
        HealingMethod::HealerNpc => 1.00,
        HealingMethod::Potion => 0.25,
    }
}

pub fn heal_wound(method: HealingMethod, random: &dyn RandomSource) -> bool {
    random.gen_probability() < heal_chance(method)
}

pub fn wound_penalties(wounds: &[Wound]) -> std::collections::HashMap<Ability, i32> {
    let mut totals = std::collections::HashMap::new();
    for wound in wounds {
        *totals.entry(wound.ability).or_insert(0) += wound.penalty;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRandom {
        range: i32,
        probability: f64,
    }
    impl RandomSource for FixedRandom {
        fn gen_range(&self, _min: i32, _max: i32) -> i32 {
            self.range
        }
        fn gen_probability(&self) -> f64 {
            self.probability
        }
    }

    #[test]
    fn no_wound_under_half_max_hp() {
        let rng = FixedRandom {
            range: 0,
            probability: 0.0,
        };
        assert!(check_for_wound(5, 20, &rng).is_none());
    }

    #[test]
    fn severe_wound_comes_from_first_four_types() {
        let rng = FixedRandom {
            range: 3,
            probability: 0.0,
        };
        let wound = check_for_wound(16, 20, &rng).unwrap();
        assert!(SEVERE_WOUNDS.contains(&wound.wound_type));
    }

    #[test]
    fn minor_wound_can_come_from_any_type() {
        let rng = FixedRandom {
            range: 5,
            probability: 0.0,
        };
        let wound = check_for_wound(11, 20, &rng).unwrap();
        assert_eq!(wound.wound_type, WoundType::BruisedRibs);
    }

    #[test]
    fn healer_npc_always_heals() {
        let rng = FixedRandom {
            range: 0,
            probability: 0.99,
        };
        assert!(heal_wound(HealingMethod::HealerNpc, &rng));
    }

    #[test]
    fn wound_penalties_sum_per_ability() {
        let wounds = vec![
            Wound {
                wound_type: WoundType::DeepGash,
                ability: Ability::Strength,
                penalty: -2,
            },
            Wound {
                wound_type: WoundType::SprainedWrist,
                ability: Ability::Strength,
                penalty: -1,
            },
        ];
        let totals = wound_penalties(&wounds);
        assert_eq!(totals[&Ability::Strength], -3);
    }
}
