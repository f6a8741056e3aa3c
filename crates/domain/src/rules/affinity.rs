//! Per-NPC affinity: a 0-100 relationship score, separate from faction
//! reputation, that gates companion recruitment and shop discounts with a
//! single individual rather than their whole faction.

pub struct AffinityTier {
    pub name: &'static str,
    pub min_score: i32,
    pub shop_discount: f64,
}

pub const AFFINITY_TIERS: [AffinityTier; 7] = [
    AffinityTier {
        name: "Stranger",
        min_score: 0,
        shop_discount: 0.0,
    },
    AffinityTier {
        name: "Acquaintance",
        min_score: 5,
        shop_discount: 0.0,
    },
    AffinityTier {
        name: "Companion",
        min_score: 15,
        shop_discount: 0.05,
    },
    AffinityTier {
        name: "Friend",
        min_score: 30,
        shop_discount: 0.10,
    },
    AffinityTier {
        name: "Close Friend",
        min_score: 50,
        shop_discount: 0.15,
    },
    AffinityTier {
        name: "Trusted Ally",
        min_score: 75,
        shop_discount: 0.20,
    },
    AffinityTier {
        name: "Sworn Bond",
        min_score: 100,
        shop_discount: 0.25,
    },
];

pub const RECRUIT_THRESHOLD: i32 = 15;

pub fn tier(score: i32) -> &'static AffinityTier {
    AFFINITY_TIERS
        .iter()
        .rev()
        .find(|t| score >= t.min_score)
        .unwrap_or(&AFFINITY_TIERS[0])
}

pub fn tier_name(score: i32) -> &'static str {
    tier(score).name
}

pub fn shop_discount(score: i32) -> f64 {
    tier(score).shop_discount
}

pub fn can_recruit(score: i32) -> bool {
    score >= RECRUIT_THRESHOLD
}

pub fn affinity_from_gift(item_id: &str, preferred_gifts: &[String], disliked_gifts: &[String]) -> i32 {
    if preferred_gifts.iter().any(|g| g == item_id) {
        5
    } else if disliked_gifts.iter().any(|g| g == item_id) {
        -2
    } else {
        2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffinityAction {
    CompleteQuest,
    HelpNpc,
    SuccessfulPersuasion,
    Conversation,
    FailedIntimidation,
    TheftWitnessed,
    AttackNpc,
    KillAlly,
}

pub fn affinity_from_action(action: AffinityAction) -> i32 {
    match action {
        AffinityAction::CompleteQuest => 5,
        AffinityAction::HelpNpc => 3,
        AffinityAction::SuccessfulPersuasion => 2,
        AffinityAction::Conversation => 1,
        AffinityAction::FailedIntimidation => -3,
        AffinityAction::TheftWitnessed => -5,
        AffinityAction::AttackNpc => -10,
        AffinityAction::KillAlly => -20,
    }
}

pub fn clamp_affinity(value: i32) -> i32 {
    value.clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stranger_at_zero() {
        assert_eq!(tier_name(0), "Stranger");
    }

    #[test]
    fn companion_tier_matches_recruit_threshold() {
        assert!(can_recruit(RECRUIT_THRESHOLD));
        assert!(!can_recruit(RECRUIT_THRESHOLD - 1));
        assert_eq!(tier_name(RECRUIT_THRESHOLD), "Companion");
    }

    #[test]
    fn sworn_bond_gives_max_discount() {
        assert_eq!(shop_discount(100), 0.25);
    }

    #[test]
    fn preferred_gift_beats_neutral_beats_disliked() {
        let preferred = vec!["flower".to_string()];
        let disliked = vec!["weeds".to_string()];
        assert_eq!(affinity_from_gift("flower", &preferred, &disliked), 5);
        assert_eq!(affinity_from_gift("weeds", &preferred, &disliked), -2);
        assert_eq!(affinity_from_gift("rock", &preferred, &disliked), 2);
    }

    #[test]
    fn clamp_affinity_bounds() {
        assert_eq!(clamp_affinity(-10), 0);
        assert_eq!(clamp_affinity(200), 100);
    }
}
