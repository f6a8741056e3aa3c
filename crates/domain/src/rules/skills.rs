//! Skill checks and passive scores.

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;
use crate::rules::ability_scores::{modifier, Ability};
use crate::rules::dice::{roll_d20_resolved, DiceRollResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    Acrobatics,
    AnimalHandling,
    Arcana,
    Athletics,
    Deception,
    History,
    Insight,
    Intimidation,
    Investigation,
    Medicine,
    Nature,
    Perception,
    Performance,
    Persuasion,
    Religion,
    SleightOfHand,
    Stealth,
    Survival,
}

impl Skill {
    pub fn governing_ability(self) -> Ability {
        use Ability::*;
        match self {
            Skill::Acrobatics | Skill::SleightOfHand | Skill::Stealth => Dexterity,
            Skill::AnimalHandling | Skill::Insight | Skill::Medicine | Skill::Perception | Skill::Survival => Wisdom,
            Skill::Arcana | Skill::History | Skill::Investigation | Skill::Nature | Skill::Religion => Intelligence,
            Skill::Deception | Skill::Intimidation | Skill::Performance | Skill::Persuasion => Charisma,
            Skill::Athletics => Strength,
        }
    }
}

pub struct SkillCheckOutcome {
    pub success: bool,
    pub roll: DiceRollResult,
}

pub fn skill_check(
    ability_score: i32,
    proficiency_bonus: i32,
    is_proficient: bool,
    dc: i32,
    advantage: bool,
    disadvantage: bool,
    random: &dyn RandomSource,
) -> SkillCheckOutcome {
    let mut modifier_total = modifier(ability_score);
    if is_proficient {
        modifier_total += proficiency_bonus;
    }

    let roll = roll_d20_resolved(modifier_total, advantage, disadvantage, random);
    SkillCheckOutcome {
        success: roll.total >= dc,
        roll,
    }
}

pub fn passive_score(ability_score: i32, proficiency_bonus: i32, is_proficient: bool) -> i32 {
    let mut modifier_total = modifier(ability_score);
    if is_proficient {
        modifier_total += proficiency_bonus;
    }
    10 + modifier_total
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
    fn proficiency_adds_to_check() {
        let rng = StepRandom(std::cell::RefCell::new(vec![10]));
        let outcome = skill_check(16, 2, true, 15, false, false, &rng);
        assert!(outcome.success);
        assert_eq!(outcome.roll.total, 10 + 3 + 2);
    }

    #[test]
    fn passive_perception_has_no_roll() {
        assert_eq!(passive_score(14, 2, true), 10 + 2 + 2);
    }

    #[test]
    fn athletics_is_strength_based() {
        assert_eq!(Skill::Athletics.governing_ability(), Ability::Strength);
    }
}
