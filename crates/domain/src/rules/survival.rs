//! Hunger, thirst, warmth, and morale: four 0-100 needs that decay per turn
//! and impose the worst of their penalties on ability checks, D&D-style
//! (penalties don't stack — the character is only as impaired as their worst need).

use serde::{Deserialize, Serialize};

pub const HUNGER_DECAY_PER_TURN: i32 = 1;
pub const THIRST_DECAY_PER_TURN: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Need {
    Hunger,
    Thirst,
    Warmth,
    Morale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Climate {
    Freezing,
    Cold,
    Cool,
    Temperate,
    Warm,
    Hot,
    Arid,
}

impl Climate {
    fn warmth_decay(self) -> i32 {
        match self {
            Climate::Freezing => 3,
            Climate::Cold => 2,
            Climate::Cool => 1,
            Climate::Temperate | Climate::Warm | Climate::Hot | Climate::Arid => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedStatus {
    pub need: Need,
    pub value: i32,
    pub label: &'static str,
    pub penalty: i32,
}

impl NeedStatus {
    pub fn is_critical(&self) -> bool {
        self.value < 25
    }
}

fn labels(need: Need) -> [&'static str; 4] {
    match need {
        Need::Hunger => ["Starving", "Very Hungry", "Hungry", "Satisfied"],
        Need::Thirst => ["Parched", "Dehydrated", "Thirsty", "Hydrated"],
        Need::Warmth => ["Freezing", "Cold", "Chilly", "Warm"],
        Need::Morale => ["Broken", "Despondent", "Low Spirits", "Good Spirits"],
    }
}

pub fn classify_need(need: Need, value: i32) -> NeedStatus {
    let label_set = labels(need);
    let (label, penalty) = if value < 25 {
        (label_set[0], -5)
    } else if value < 50 {
        (label_set[1], -2)
    } else if value < 75 {
        (label_set[2], -1)
    } else {
        (label_set[3], 0)
    };
    NeedStatus {
        need,
        value,
        label,
        penalty,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Needs {
    pub hunger: i32,
    pub thirst: i32,
    pub warmth: i32,
    pub morale: i32,
}

/// Worst single penalty across all four needs, not cumulative.
pub fn total_needs_penalty(needs: Needs) -> i32 {
    [
        classify_need(Need::Hunger, needs.hunger).penalty,
        classify_need(Need::Thirst, needs.thirst).penalty,
        classify_need(Need::Warmth, needs.warmth).penalty,
        classify_need(Need::Morale, needs.morale).penalty,
    ]
    .into_iter()
    .min()
    .unwrap_or(0)
}

fn con_decay_reduction(con_modifier: i32) -> i32 {
    if con_modifier.min(5) >= 4 {
        1
    } else {
        0
    }
}

pub fn tick_needs(
    needs: Needs,
    climate: Climate,
    con_modifier: i32,
    is_resting: bool,
    is_long_rest: bool,
) -> Needs {
    let reduction = con_decay_reduction(con_modifier);
    let mut hunger_decay = (HUNGER_DECAY_PER_TURN - reduction).max(0);
    let mut thirst_decay = (THIRST_DECAY_PER_TURN - reduction).max(0);
    let warmth_decay = climate.warmth_decay();

    if is_resting {
        hunger_decay = (hunger_decay - 1).max(0);
        thirst_decay = (thirst_decay - 1).max(0);
    }

    let mut warmth = needs.warmth;
    let mut morale = needs.morale;
    if is_long_rest {
        warmth = (warmth + 20).min(100);
        morale = (morale + 15).min(100);
    }

    let new_hunger = (needs.hunger - hunger_decay).max(0);
    let new_thirst = (needs.thirst - thirst_decay).max(0);
    let new_warmth = (warmth - warmth_decay).max(0);

    if needs.hunger >= 75 && needs.thirst >= 75 && warmth >= 50 {
        morale = (morale + 1).min(100);
    } else if needs.hunger < 25 || needs.thirst < 25 || warmth < 25 {
        morale = (morale - 1).max(0);
    }

    Needs {
        hunger: new_hunger,
        thirst: new_thirst,
        warmth: new_warmth,
        morale,
    }
}

/// Consumable need effects, keyed by item id. Content-driven items not in this
/// table simply have no survival effect.
pub fn item_need_effects(item_id: &str) -> Option<Needs> {
    let zero = Needs {
        hunger: 0,
        thirst: 0,
        warmth: 0,
        morale: 0,
    };
    let effects = match item_id {
        "rations" => Needs { hunger: 40, ..zero },
        "waterskin" => Needs { thirst: 50, ..zero },
        "torch" => Needs {
            warmth: 10,
            morale: 5,
            ..zero
        },
        "bedroll" => Needs { morale: 10, ..zero },
        "healing_potion" => Needs { morale: 5, ..zero },
        "cooked_meal" => Needs {
            hunger: 60,
            morale: 15,
            ..zero
        },
        "hearty_stew" => Needs {
            hunger: 80,
            thirst: 20,
            warmth: 15,
            morale: 25,
        },
        "healing_herb" => Needs { hunger: 5, ..zero },
        _ => return None,
    };
    Some(effects)
}

pub fn apply_item_to_needs(item_id: &str, needs: Needs) -> Option<Needs> {
    let effects = item_need_effects(item_id)?;
    Some(Needs {
        hunger: (needs.hunger + effects.hunger).min(100),
        thirst: (needs.thirst + effects.thirst).min(100),
        warmth: (needs.warmth + effects.warmth).min(100),
        morale: (needs.morale + effects.morale).min(100),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestType {
    Short,
    Long,
}

pub fn rest_effects(needs: Needs, rest_type: RestType) -> Needs {
    match rest_type {
        RestType::Long => Needs {
            hunger: (needs.hunger - 15).max(0),
            thirst: (needs.thirst - 10).max(0),
            warmth: (needs.warmth + 20).min(100),
            morale: (needs.morale + 20).min(100),
        },
        RestType::Short => Needs {
            hunger: (needs.hunger - 5).max(0),
            thirst: (needs.thirst - 5).max(0),
            warmth: (needs.warmth + 5).min(100),
            morale: (needs.morale + 10).min(100),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_need_wins_not_sum() {
        let needs = Needs {
            hunger: 10,
            thirst: 40,
            warmth: 100,
            morale: 100,
        };
        assert_eq!(total_needs_penalty(needs), -5);
    }

    #[test]
    fn high_constitution_slows_decay() {
        let needs = Needs {
            hunger: 50,
            thirst: 50,
            warmth: 100,
            morale: 50,
        };
        let ticked = tick_needs(needs, Climate::Temperate, 4, false, false);
        assert_eq!(ticked.hunger, 50);
        assert_eq!(ticked.thirst, 49);
    }

    #[test]
    fn freezing_climate_burns_warmth() {
        let needs = Needs {
            hunger: 100,
            thirst: 100,
            warmth: 100,
            morale: 50,
        };
        let ticked = tick_needs(needs, Climate::Freezing, 0, false, false);
        assert_eq!(ticked.warmth, 97);
    }

    #[test]
    fn long_rest_restores_warmth_and_morale_before_decay() {
        let needs = Needs {
            hunger: 100,
            thirst: 100,
            warmth: 50,
            morale: 50,
        };
        let ticked = tick_needs(needs, Climate::Cold, 0, false, true);
        assert_eq!(ticked.warmth, 68);
        assert_eq!(ticked.morale, 65);
    }

    #[test]
    fn item_effects_cap_at_100() {
        let needs = Needs {
            hunger: 90,
            thirst: 0,
            warmth: 0,
            morale: 0,
        };
        let applied = apply_item_to_needs("hearty_stew", needs).unwrap();
        assert_eq!(applied.hunger, 100);
    }

    #[test]
    fn unknown_item_has_no_effect() {
        assert!(item_need_effects("a_sword").is_none());
    }
}
