//! Turns a raw input string into a structured [`Action`]. Every
//! verb pattern is a fixed regex with named capture groups; nothing here
//! touches game state, so classification never fails — unrecognized input
//! still produces an `Action`, just one no registered system claims.

use std::sync::LazyLock;

use regex::Regex;
use wrldcore_domain::model::action::Action;

static MOVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:go|move|walk|head)\s+(?P<direction>\w+)$").expect("move regex"));
static BARE_DIRECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<direction>north|south|east|west|up|down|in|out|n|s|e|w|u|d)$").expect("direction regex")
});
static LOOK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^look(?:\s+around)?$").expect("look regex"));
static SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^search(?:\s+(?P<target>.+))?$").expect("search regex"));
static ATTACK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:attack|fight|hit|strike)\s+(?P<target>.+)$").expect("attack regex"));
static FLEE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(?:flee|run|run away)$").expect("flee regex"));
static CAST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^cast\s+(?P<spell>[\w\s]+?)(?:\s+(?:at|on)\s+(?P<target>.+))?$").expect("cast regex")
});
static PREPARE_SPELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^prepare\s+(?P<spell>.+)$").expect("prepare regex"));
static PICKUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:take|get|pick up|pickup|grab)\s+(?P<item>.+)$").expect("pickup regex"));
static DROP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^drop\s+(?P<item>.+)$").expect("drop regex"));
static EQUIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(?:equip|wield|wear)\s+(?P<item>.+)$").expect("equip regex"));
static UNEQUIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:unequip|remove)\s+(?P<item>.+)$").expect("unequip regex"));
static USE_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^use\s+(?P<item>.+)$").expect("use regex"));
static STORE_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^store\s+(?P<item>.+)$").expect("store regex"));
static RETRIEVE_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^retrieve\s+(?P<item>.+)$").expect("retrieve regex"));
static TALK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:talk to|talk|speak to|speak with)\s+(?P<target>.+)$").expect("talk regex"));
static GIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^give\s+(?P<item>.+?)\s+to\s+(?P<target>.+)$").expect("give regex"));
static PERSUADE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:persuade|convince)\s+(?P<target>.+)$").expect("persuade regex"));
static INTIMIDATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^intimidate\s+(?P<target>.+)$").expect("intimidate regex"));
static BUY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^buy\s+(?P<item>.+)$").expect("buy regex"));
static SELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^sell\s+(?P<item>.+)$").expect("sell regex"));
static CRAFT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^craft\s+(?P<recipe>.+)$").expect("craft regex"));
static REST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?P<kind>short|long)?\s*rest$").expect("rest regex"));
static RECRUIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^recruit\s+(?P<target>.+)$").expect("recruit regex"));
static DISMISS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^dismiss\s+(?P<target>.+)$").expect("dismiss regex"));
static PURCHASE_HOME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:buy|purchase)\s+(?:a\s+)?(?:house|home)$").expect("purchase home regex"));
static INVENTORY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(?:inventory|inv|i)$").expect("inventory regex"));
static HELP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^help$").expect("help regex"));
static MAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^map$").expect("map regex"));

pub struct InputClassifier;

impl InputClassifier {
    pub fn classify(raw_input: &str, actor_id: &str) -> Action {
        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            return Action::new("unrecognized", actor_id, raw_input);
        }

        if let Some(caps) = MOVE_RE.captures(trimmed).or_else(|| BARE_DIRECTION_RE.captures(trimmed)) {
            return with_param(Action::new("move", actor_id, raw_input), "direction", &caps["direction"]);
        }
        if LOOK_RE.is_match(trimmed) {
            return Action::new("look", actor_id, raw_input);
        }
        if let Some(caps) = SEARCH_RE.captures(trimmed) {
            let mut action = Action::new("search", actor_id, raw_input);
            if let Some(target) = caps.name("target") {
                action = with_param(action, "target", target.as_str());
            }
            return action;
        }
        if FLEE_RE.is_match(trimmed) {
            return Action::new("flee", actor_id, raw_input);
        }
        if let Some(caps) = ATTACK_RE.captures(trimmed) {
            let target = caps["target"].trim().to_string();
            return Action::new("attack", actor_id, raw_input).with_target(target);
        }
        if let Some(caps) = CAST_RE.captures(trimmed) {
            let mut action = with_param(Action::new("cast_spell", actor_id, raw_input), "spell", caps["spell"].trim());
            if let Some(target) = caps.name("target") {
                action = action.with_target(target.as_str().trim().to_string());
            }
            return action;
        }
        if let Some(caps) = PREPARE_SPELL_RE.captures(trimmed) {
            return with_param(Action::new("prepare_spell", actor_id, raw_input), "spell", caps["spell"].trim());
        }
        if let Some(caps) = PICKUP_RE.captures(trimmed) {
            return with_param(Action::new("pickup_item", actor_id, raw_input), "item", caps["item"].trim());
        }
        if let Some(caps) = DROP_RE.captures(trimmed) {
            return with_param(Action::new("drop_item", actor_id, raw_input), "item", caps["item"].trim());
        }
        if let Some(caps) = EQUIP_RE.captures(trimmed) {
            return with_param(Action::new("equip_item", actor_id, raw_input), "item", caps["item"].trim());
        }
        if let Some(caps) = UNEQUIP_RE.captures(trimmed) {
            return with_param(Action::new("unequip_item", actor_id, raw_input), "item", caps["item"].trim());
        }
        if let Some(caps) = STORE_ITEM_RE.captures(trimmed) {
            return with_param(Action::new("store_item", actor_id, raw_input), "item", caps["item"].trim());
        }
        if let Some(caps) = RETRIEVE_ITEM_RE.captures(trimmed) {
            return with_param(Action::new("retrieve_item", actor_id, raw_input), "item", caps["item"].trim());
        }
        if let Some(caps) = GIVE_RE.captures(trimmed) {
            let mut action = with_param(Action::new("give_item", actor_id, raw_input), "item", caps["item"].trim());
            action = action.with_target(caps["target"].trim().to_string());
            return action;
        }
        if let Some(caps) = USE_ITEM_RE.captures(trimmed) {
            return with_param(Action::new("use_item", actor_id, raw_input), "item", caps["item"].trim());
        }
        if let Some(caps) = TALK_RE.captures(trimmed) {
            return Action::new("talk", actor_id, raw_input).with_target(caps["target"].trim().to_string());
        }
        if let Some(caps) = PERSUADE_RE.captures(trimmed) {
            return Action::new("persuade", actor_id, raw_input).with_target(caps["target"].trim().to_string());
        }
        if let Some(caps) = INTIMIDATE_RE.captures(trimmed) {
            return Action::new("intimidate", actor_id, raw_input).with_target(caps["target"].trim().to_string());
        }
        if let Some(caps) = BUY_RE.captures(trimmed) {
            return with_param(Action::new("buy_item", actor_id, raw_input), "item", caps["item"].trim());
        }
        if let Some(caps) = SELL_RE.captures(trimmed) {
            return with_param(Action::new("sell_item", actor_id, raw_input), "item", caps["item"].trim());
        }
        if let Some(caps) = CRAFT_RE.captures(trimmed) {
            return with_param(Action::new("craft", actor_id, raw_input), "recipe", caps["recipe"].trim());
        }
        if let Some(caps) = REST_RE.captures(trimmed) {
            let kind = caps.name("kind").map(|m| m.as_str().to_lowercase()).unwrap_or_else(|| "short".to_string());
            return with_param(Action::new("rest", actor_id, raw_input), "kind", &kind);
        }
        if let Some(caps) = RECRUIT_RE.captures(trimmed) {
            return Action::new("recruit_companion", actor_id, raw_input).with_target(caps["target"].trim().to_string());
        }
        if let Some(caps) = DISMISS_RE.captures(trimmed) {
            return Action::new("dismiss_companion", actor_id, raw_input).with_target(caps["target"].trim().to_string());
        }
        if PURCHASE_HOME_RE.is_match(trimmed) {
            return Action::new("purchase_housing", actor_id, raw_input);
        }
        if INVENTORY_RE.is_match(trimmed) {
            let mut action = Action::new("view_inventory", actor_id, raw_input);
            action.is_meta = true;
            return action;
        }
        if HELP_RE.is_match(trimmed) {
            let mut action = Action::new("help", actor_id, raw_input);
            action.is_meta = true;
            return action;
        }
        if MAP_RE.is_match(trimmed) {
            let mut action = Action::new("view_map", actor_id, raw_input);
            action.is_meta = true;
            return action;
        }

        Action::new("custom", actor_id, raw_input)
    }
}

fn with_param(mut action: Action, key: &str, value: &str) -> Action {
    action.parameters.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_cardinal_movement() {
        let action = InputClassifier::classify("go north", "player");
        assert_eq!(action.action_type, "move");
        assert_eq!(action.param_str("direction"), Some("north"));
    }

    #[test]
    fn bare_direction_is_also_movement() {
        let action = InputClassifier::classify("n", "player");
        assert_eq!(action.action_type, "move");
    }

    #[test]
    fn attack_captures_target() {
        let action = InputClassifier::classify("attack goblin", "player");
        assert_eq!(action.action_type, "attack");
        assert_eq!(action.target_id.as_deref(), Some("goblin"));
    }

    #[test]
    fn cast_captures_spell_and_optional_target() {
        let action = InputClassifier::classify("cast firebolt at goblin", "player");
        assert_eq!(action.action_type, "cast_spell");
        assert_eq!(action.param_str("spell"), Some("firebolt"));
        assert_eq!(action.target_id.as_deref(), Some("goblin"));
    }

    #[test]
    fn meta_commands_are_flagged_but_still_actions() {
        let action = InputClassifier::classify("inventory", "player");
        assert!(action.is_meta);
        assert_eq!(action.action_type, "view_inventory");
    }

    #[test]
    fn empty_input_is_unrecognized_not_a_panic() {
        let action = InputClassifier::classify("   ", "player");
        assert_eq!(action.action_type, "unrecognized");
    }

    #[test]
    fn unmatched_verb_becomes_custom() {
        let action = InputClassifier::classify("throw sand at the goblin's eyes", "player");
        assert_eq!(action.action_type, "custom");
    }
}
