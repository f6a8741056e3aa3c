//! Ambient NPC scheduling: where an NPC is and what they're doing at a given
//! time of day, independent of whether the player is there to see it. Content
//! (schedules, professions) lives in the entity data; this module only knows
//! how to interpret it.

use crate::ids::LocationId;
use crate::rules::world_clock::Period;

/// Flavor text for a profession at a given period. Professions with no entry
/// fall back to [`default_activity`].
pub fn profession_activity(profession: &str, period: Period) -> Option<&'static str> {
    let activities: &[(Period, &str)] = match profession.to_lowercase().as_str() {
        "innkeeper" => &[
            (Period::Dawn, "preparing the morning fire and breakfast"),
            (Period::Morning, "serving porridge and ale to early risers"),
            (Period::Midday, "out buying supplies from local farmers"),
            (Period::Afternoon, "chopping vegetables and roasting meat for the evening"),
            (Period::Evening, "bustling behind the bar during the busy hours"),
            (Period::Night, "wiping down tables and counting the day's coins"),
            (Period::LateNight, "sleeping upstairs above the tavern"),
        ],
        "blacksmith" => &[
            (Period::Dawn, "stoking the forge and heating the first ingots"),
            (Period::Morning, "hammering steel at the anvil, sparks flying"),
            (Period::Midday, "taking a break, sharing a meal near the forge"),
            (Period::Afternoon, "tempering blades and fitting handles"),
            (Period::Evening, "banking the forge coals and tidying the shop"),
            (Period::Night, "examining a commission by lantern light"),
            (Period::LateNight, "sleeping in the back room"),
        ],
        "guard" => &[
            (Period::Dawn, "starting the morning patrol, checking the perimeter"),
            (Period::Morning, "standing watch at the village entrance"),
            (Period::Midday, "rotating shifts with fellow guards"),
            (Period::Afternoon, "patrolling the outskirts and nearby roads"),
            (Period::Evening, "lighting torches along the main roads"),
            (Period::Night, "standing night watch, alert for trouble"),
            (Period::LateNight, "dozing at the guard post between rounds"),
        ],
        "healer" => &[
            (Period::Dawn, "gathering fresh herbs from the garden"),
            (Period::Morning, "tending to patients and preparing remedies"),
            (Period::Midday, "offering prayers and blessings at the shrine"),
            (Period::Afternoon, "mixing poultices and checking on the sick"),
            (Period::Evening, "meditating quietly in the sanctuary"),
            (Period::Night, "reading ancient texts by candlelight"),
            (Period::LateNight, "resting in the temple quarters"),
        ],
        "farmer" => &[
            (Period::Dawn, "heading out to the fields with tools over one shoulder"),
            (Period::Morning, "working the soil, tending crops row by row"),
            (Period::Midday, "resting under a tree, eating bread and cheese"),
            (Period::Afternoon, "hauling water from the well to the fields"),
            (Period::Evening, "returning home, tired but satisfied"),
            (Period::Night, "mending tools by the hearth"),
            (Period::LateNight, "sleeping soundly after a long day"),
        ],
        "merchant" => &[
            (Period::Dawn, "unlocking the shop and arranging displays"),
            (Period::Morning, "greeting customers and haggling over prices"),
            (Period::Midday, "restocking shelves from the back storeroom"),
            (Period::Afternoon, "tallying accounts and writing orders"),
            (Period::Evening, "closing up shop and counting profits"),
            (Period::Night, "reviewing ledgers at home"),
            (Period::LateNight, "sleeping above the shop"),
        ],
        "priest" => &[
            (Period::Dawn, "leading the dawn prayers for early worshippers"),
            (Period::Morning, "counseling villagers who seek guidance"),
            (Period::Midday, "leading a midday service"),
            (Period::Afternoon, "visiting the sick and offering comfort"),
            (Period::Evening, "lighting votive candles and tending the altar"),
            (Period::Night, "studying sacred texts"),
            (Period::LateNight, "in deep meditation"),
        ],
        _ => return None,
    };
    activities
        .iter()
        .find(|(p, _)| *p == period)
        .map(|(_, text)| *text)
}

pub fn default_activity(period: Period) -> &'static str {
    match period {
        Period::Dawn => "beginning their daily routine",
        Period::Morning => "going about their morning tasks",
        Period::Midday => "taking a midday break",
        Period::Afternoon => "busy with afternoon work",
        Period::Evening => "winding down for the evening",
        Period::Night => "settling in for the night",
        Period::LateNight => "sleeping",
    }
}

pub fn npc_activity(profession: &str, period: Period) -> &'static str {
    profession_activity(profession, period).unwrap_or_else(|| default_activity(period))
}

/// True if the NPC is alive and this period isn't in their unavailable list.
pub fn is_npc_available(is_alive: bool, unavailable_periods: &[Period], period: Period) -> bool {
    is_alive && !unavailable_periods.contains(&period)
}

/// Where the NPC should be during `period`, or `None` if unavailable. A
/// schedule entry for the period overrides the NPC's default location.
pub fn npc_location_for_period(
    schedule: &[(Period, LocationId)],
    default_location: LocationId,
    unavailable_periods: &[Period],
    is_alive: bool,
    period: Period,
) -> Option<LocationId> {
    if !is_npc_available(is_alive, unavailable_periods, period) {
        return None;
    }
    Some(
        schedule
            .iter()
            .find(|(p, _)| *p == period)
            .map(|(_, loc)| *loc)
            .unwrap_or(default_location),
    )
}

/// One ambient flavor line per NPC present at `location_id` during `period`.
pub struct AmbientNpc {
    pub name: String,
    pub profession: String,
    pub location_id: LocationId,
    pub is_alive: bool,
    pub schedule: Vec<(Period, LocationId)>,
    pub unavailable_periods: Vec<Period>,
}

pub fn ambient_activity_at(location_id: LocationId, npcs: &[AmbientNpc], period: Period) -> Vec<String> {
    npcs.iter()
        .filter_map(|npc| {
            let npc_loc = npc_location_for_period(
                &npc.schedule,
                npc.location_id,
                &npc.unavailable_periods,
                npc.is_alive,
                period,
            )?;
            if npc_loc != location_id {
                return None;
            }
            Some(format!("{} is {}.", npc.name, npc_activity(&npc.profession, period)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_profession_has_period_specific_flavor() {
        assert_eq!(
            npc_activity("innkeeper", Period::Dawn),
            "preparing the morning fire and breakfast"
        );
    }

    #[test]
    fn unknown_profession_falls_back_to_default() {
        assert_eq!(npc_activity("adventurer", Period::Night), default_activity(Period::Night));
    }

    #[test]
    fn unavailable_period_means_not_available() {
        assert!(!is_npc_available(true, &[Period::Night], Period::Night));
        assert!(is_npc_available(true, &[Period::Night], Period::Dawn));
    }

    #[test]
    fn dead_npc_is_never_available() {
        assert!(!is_npc_available(false, &[], Period::Dawn));
    }

    #[test]
    fn ambient_activity_only_lists_npcs_present_at_location() {
        let here = LocationId::new();
        let elsewhere = LocationId::new();
        let npcs = vec![
            AmbientNpc {
                name: "Mira".into(),
                profession: "innkeeper".into(),
                location_id: here,
                is_alive: true,
                schedule: vec![],
                unavailable_periods: vec![],
            },
            AmbientNpc {
                name: "Borin".into(),
                profession: "blacksmith".into(),
                location_id: elsewhere,
                is_alive: true,
                schedule: vec![],
                unavailable_periods: vec![],
            },
        ];
        let hints = ambient_activity_at(here, &npcs, Period::Morning);
        assert_eq!(hints.len(), 1);
        assert!(hints[0].starts_with("Mira is"));
    }
}
