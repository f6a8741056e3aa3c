//! Per-faction reputation: a clamped [-100, 100] score with named tiers and
//! gameplay effects (shop pricing, quest availability, hostility).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::FactionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationTier {
    Hated,
    Hostile,
    Unfriendly,
    Neutral,
    Friendly,
    Trusted,
    Honored,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReputationEffects {
    pub shop_price_mult: f64,
    pub quest_available: bool,
    pub attack_on_sight: bool,
}

pub fn clamp_reputation(value: i32) -> i32 {
    value.clamp(-100, 100)
}

pub fn adjust_reputation(current: i32, delta: i32) -> i32 {
    clamp_reputation(current + delta)
}

pub fn tier(reputation: i32) -> ReputationTier {
    match clamp_reputation(reputation) {
        -100..=-61 => ReputationTier::Hated,
        -60..=-21 => ReputationTier::Hostile,
        -20..=-6 => ReputationTier::Unfriendly,
        -5..=5 => ReputationTier::Neutral,
        6..=20 => ReputationTier::Friendly,
        21..=60 => ReputationTier::Trusted,
        _ => ReputationTier::Honored,
    }
}

pub fn effects(reputation: i32) -> ReputationEffects {
    match tier(reputation) {
        ReputationTier::Hated => ReputationEffects {
            shop_price_mult: 2.0,
            quest_available: false,
            attack_on_sight: true,
        },
        ReputationTier::Hostile => ReputationEffects {
            shop_price_mult: 1.5,
            quest_available: false,
            attack_on_sight: false,
        },
        ReputationTier::Unfriendly => ReputationEffects {
            shop_price_mult: 1.25,
            quest_available: false,
            attack_on_sight: false,
        },
        ReputationTier::Neutral => ReputationEffects {
            shop_price_mult: 1.0,
            quest_available: true,
            attack_on_sight: false,
        },
        ReputationTier::Friendly => ReputationEffects {
            shop_price_mult: 0.9,
            quest_available: true,
            attack_on_sight: false,
        },
        ReputationTier::Trusted => ReputationEffects {
            shop_price_mult: 0.75,
            quest_available: true,
            attack_on_sight: false,
        },
        ReputationTier::Honored => ReputationEffects {
            shop_price_mult: 0.5,
            quest_available: true,
            attack_on_sight: false,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    KillNpc,
    KillHostile,
    CompleteQuest,
    FailQuest,
    Steal,
    Help,
    Donate,
    Assault,
    Trespass,
}

fn base_delta(action: ActionType) -> i32 {
    match action {
        ActionType::KillNpc => -15,
        ActionType::KillHostile => 5,
        ActionType::CompleteQuest => 10,
        ActionType::FailQuest => -5,
        ActionType::Steal => -10,
        ActionType::Help => 5,
        ActionType::Donate => 8,
        ActionType::Assault => -12,
        ActionType::Trespass => -3,
    }
}

/// Context an action carries when it affects reputation: who it's aimed at,
/// who benefits from the opposite swing, and how many people saw it happen.
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    pub faction_id: Option<FactionId>,
    pub opposing_faction_id: Option<FactionId>,
    pub witnesses: u32,
}

/// Reputation deltas this action causes, per faction. Witnesses amplify the
/// primary faction's delta; an opposing faction (if any) takes half the
/// magnitude in the opposite direction.
pub fn reputation_from_action(action: ActionType, context: &ActionContext) -> HashMap<FactionId, i32> {
    let base = base_delta(action);
    let mut result = HashMap::new();
    if base == 0 {
        return result;
    }

    if let Some(faction_id) = context.faction_id {
        let multiplier = 1.0 + 0.25 * context.witnesses.min(4) as f64;
        result.insert(faction_id, (base as f64 * multiplier) as i32);
    }

    if let Some(opposing) = context.opposing_faction_id {
        if Some(opposing) != context.faction_id {
            result.insert(opposing, (-base as f64 * 0.5) as i32);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_match_named_tiers() {
        assert_eq!(tier(-100), ReputationTier::Hated);
        assert_eq!(tier(-61), ReputationTier::Hated);
        assert_eq!(tier(-60), ReputationTier::Hostile);
        assert_eq!(tier(0), ReputationTier::Neutral);
        assert_eq!(tier(100), ReputationTier::Honored);
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(clamp_reputation(500), 100);
        assert_eq!(clamp_reputation(-500), -100);
    }

    #[test]
    fn hated_attacks_on_sight_and_doubles_prices() {
        let e = effects(-80);
        assert!(e.attack_on_sight);
        assert_eq!(e.shop_price_mult, 2.0);
    }

    #[test]
    fn witnesses_amplify_the_primary_delta() {
        let faction = FactionId::new();
        let ctx = ActionContext {
            faction_id: Some(faction),
            opposing_faction_id: None,
            witnesses: 4,
        };
        let deltas = reputation_from_action(ActionType::KillNpc, &ctx);
        assert_eq!(deltas[&faction], (-15.0 * 2.0) as i32);
    }

    #[test]
    fn opposing_faction_gets_half_magnitude_inverse() {
        let a = FactionId::new();
        let b = FactionId::new();
        let ctx = ActionContext {
            faction_id: Some(a),
            opposing_faction_id: Some(b),
            witnesses: 0,
        };
        let deltas = reputation_from_action(ActionType::CompleteQuest, &ctx);
        assert_eq!(deltas[&a], 10);
        assert_eq!(deltas[&b], -5);
    }
}
