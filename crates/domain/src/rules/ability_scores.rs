//! Ability scores: the six base stats everything else derives a modifier from.

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;
use crate::rules::dice::DiceFormula;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Ability::Strength => "strength",
            Ability::Dexterity => "dexterity",
            Ability::Constitution => "constitution",
            Ability::Intelligence => "intelligence",
            Ability::Wisdom => "wisdom",
            Ability::Charisma => "charisma",
        }
    }
}

pub const STANDARD_ARRAY: [i32; 6] = [15, 14, 13, 12, 10, 8];
pub const POINT_BUY_ARRAY: [i32; 6] = [13, 13, 13, 12, 12, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMethod {
    StandardArray,
    Roll4d6,
    PointBuy,
}

/// `(score - 10) / 2`, floored toward negative infinity (not truncated).
pub fn modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

pub fn generate_ability_scores(method: GenerationMethod, random: &dyn RandomSource) -> Vec<i32> {
    match method {
        GenerationMethod::StandardArray => STANDARD_ARRAY.to_vec(),
        GenerationMethod::PointBuy => POINT_BUY_ARRAY.to_vec(),
        GenerationMethod::Roll4d6 => {
            let formula = DiceFormula::parse("4d6kh3").expect("4d6kh3 is a valid formula");
            let mut scores: Vec<i32> = (0..6).map(|_| formula.roll(random).total).collect();
            scores.sort_unstable_by(|a, b| b.cmp(a));
            scores
        }
    }
}

pub fn racial_bonus(race: &str, ability: Ability) -> i32 {
    match (race.to_lowercase().as_str(), ability) {
        ("human", _) => 1,
        ("elf", Ability::Dexterity) => 2,
        ("dwarf", Ability::Constitution) => 2,
        ("halfling", Ability::Dexterity) => 2,
        ("half_orc", Ability::Strength) => 2,
        ("half_orc", Ability::Constitution) => 1,
        _ => 0,
    }
}

pub fn apply_racial_bonuses(
    scores: &std::collections::HashMap<Ability, i32>,
    race: &str,
) -> std::collections::HashMap<Ability, i32> {
    scores
        .iter()
        .map(|(&ability, &score)| (ability, score + racial_bonus(race, ability)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_rounds_down() {
        assert_eq!(modifier(10), 0);
        assert_eq!(modifier(11), 0);
        assert_eq!(modifier(8), -1);
        assert_eq!(modifier(7), -2);
        assert_eq!(modifier(20), 5);
    }

    #[test]
    fn human_gets_plus_one_everywhere() {
        for ability in Ability::ALL {
            assert_eq!(racial_bonus("human", ability), 1);
        }
    }

    #[test]
    fn elf_gets_dex_only() {
        assert_eq!(racial_bonus("elf", Ability::Dexterity), 2);
        assert_eq!(racial_bonus("elf", Ability::Strength), 0);
    }

    #[test]
    fn half_orc_splits_bonus() {
        assert_eq!(racial_bonus("half_orc", Ability::Strength), 2);
        assert_eq!(racial_bonus("half_orc", Ability::Constitution), 1);
    }

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
    fn standard_array_is_fixed() {
        assert_eq!(
            generate_ability_scores(GenerationMethod::StandardArray, &FixedRandom(3)),
            STANDARD_ARRAY.to_vec()
        );
    }

    #[test]
    fn roll_4d6_keep_highest_3_sums_kept_dice() {
        let scores = generate_ability_scores(GenerationMethod::Roll4d6, &FixedRandom(4));
        assert_eq!(scores, vec![12, 12, 12, 12, 12, 12]);
    }
}
