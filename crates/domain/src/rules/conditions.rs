//! Status conditions and the mechanical flags they carry. Pure data lookup —
//! applying/removing conditions on a character is the engine's job.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Blinded,
    Charmed,
    Deafened,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
}

/// The subset of mechanical flags a condition can set. Every field defaults to
/// `false`; a condition's entry in [`effects`] only sets the ones it needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionEffects {
    pub attack_advantage: bool,
    pub attack_disadvantage: bool,
    pub grants_advantage_to_attackers: bool,
    pub grants_disadvantage_to_attackers: bool,
    pub auto_fail_sight_checks: bool,
    pub auto_fail_hearing_checks: bool,
    pub cannot_attack_charmer: bool,
    pub attack_disadvantage_while_source_visible: bool,
    pub cannot_move_closer_to_source: bool,
    pub speed_zero: bool,
    pub cannot_take_actions: bool,
    pub cannot_take_reactions: bool,
    pub cannot_move: bool,
    pub auto_fail_str_dex_saves: bool,
    pub dex_save_disadvantage: bool,
    pub melee_hits_are_crits: bool,
    pub resistance_all_damage: bool,
    pub immune_poison_disease: bool,
    pub ability_check_disadvantage: bool,
    pub melee_attackers_have_advantage: bool,
    pub ranged_attackers_have_disadvantage: bool,
    pub implies_prone: bool,
}

pub fn effects(condition: Condition) -> ConditionEffects {
    let mut e = ConditionEffects::default();
    match condition {
        Condition::Blinded => {
            e.attack_disadvantage = true;
            e.grants_advantage_to_attackers = true;
            e.auto_fail_sight_checks = true;
        }
        Condition::Charmed => {
            e.cannot_attack_charmer = true;
        }
        Condition::Deafened => {
            e.auto_fail_hearing_checks = true;
        }
        Condition::Frightened => {
            e.attack_disadvantage_while_source_visible = true;
            e.cannot_move_closer_to_source = true;
        }
        Condition::Grappled => {
            e.speed_zero = true;
        }
        Condition::Incapacitated => {
            e.cannot_take_actions = true;
            e.cannot_take_reactions = true;
        }
        Condition::Invisible => {
            e.attack_advantage = true;
            e.grants_disadvantage_to_attackers = true;
        }
        Condition::Paralyzed => {
            e.cannot_take_actions = true;
            e.cannot_move = true;
            e.auto_fail_str_dex_saves = true;
            e.grants_advantage_to_attackers = true;
            e.melee_hits_are_crits = true;
        }
        Condition::Petrified => {
            e.cannot_take_actions = true;
            e.cannot_move = true;
            e.auto_fail_str_dex_saves = true;
            e.grants_advantage_to_attackers = true;
            e.resistance_all_damage = true;
            e.immune_poison_disease = true;
        }
        Condition::Poisoned => {
            e.attack_disadvantage = true;
            e.ability_check_disadvantage = true;
        }
        Condition::Prone => {
            e.attack_disadvantage = true;
            e.melee_attackers_have_advantage = true;
            e.ranged_attackers_have_disadvantage = true;
        }
        Condition::Restrained => {
            e.speed_zero = true;
            e.attack_disadvantage = true;
            e.grants_advantage_to_attackers = true;
            e.dex_save_disadvantage = true;
        }
        Condition::Stunned => {
            e.cannot_take_actions = true;
            e.cannot_move = true;
            e.auto_fail_str_dex_saves = true;
            e.grants_advantage_to_attackers = true;
        }
        Condition::Unconscious => {
            e.cannot_take_actions = true;
            e.cannot_move = true;
            e.auto_fail_str_dex_saves = true;
            e.grants_advantage_to_attackers = true;
            e.melee_hits_are_crits = true;
            e.implies_prone = true;
        }
    }
    e
}

pub fn has_attack_advantage(active: &[Condition]) -> bool {
    active.iter().any(|&c| effects(c).attack_advantage)
}

pub fn has_attack_disadvantage(active: &[Condition]) -> bool {
    active.iter().any(|&c| effects(c).attack_disadvantage)
}

pub fn can_take_actions(active: &[Condition]) -> bool {
    !active.iter().any(|&c| effects(c).cannot_take_actions)
}

pub fn is_incapacitated(active: &[Condition]) -> bool {
    !can_take_actions(active)
}

pub fn grants_advantage_to_attackers(active: &[Condition]) -> bool {
    active.iter().any(|&c| effects(c).grants_advantage_to_attackers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paralyzed_auto_fails_str_dex_and_crits_melee() {
        let e = effects(Condition::Paralyzed);
        assert!(e.auto_fail_str_dex_saves);
        assert!(e.melee_hits_are_crits);
    }

    #[test]
    fn stunned_cannot_take_actions() {
        assert!(!can_take_actions(&[Condition::Stunned]));
        assert!(is_incapacitated(&[Condition::Stunned]));
    }

    #[test]
    fn invisible_grants_attack_advantage() {
        assert!(has_attack_advantage(&[Condition::Invisible]));
    }

    #[test]
    fn no_conditions_means_unimpaired() {
        assert!(can_take_actions(&[]));
        assert!(!has_attack_advantage(&[]));
        assert!(!grants_advantage_to_attackers(&[]));
    }
}
