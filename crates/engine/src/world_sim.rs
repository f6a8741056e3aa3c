//! The ambient pass that runs after a turn commits: NPCs move along their
//! schedules whether or not the player is watching, temporary entities the
//! Director spawned expire, and a standing `economy_effect` world event
//! nudges shop prices. Each step is its own transaction so one failing
//! doesn't roll back ticks that already landed.

use tracing::warn;

use wrldcore_domain::ids::GameId;
use wrldcore_domain::rules::world_clock;
use wrldcore_domain::rules::world_sim::npc_location_for_period;

use crate::error::EngineResult;
use crate::store::{repos, DataStore};

/// Run the world tick for `game_id` at the clock position the just-completed
/// turn left it at. `turn_number` scopes the economy-effect scan to events
/// produced by that turn, so a standing price shift is never re-applied.
pub async fn tick(store: &DataStore, game_id: GameId, world_time: i32, turn_number: i64) -> EngineResult<()> {
    let period = world_clock::period(world_time);

    advance_npc_schedules(store, game_id, period).await?;
    expire_temporary_entities(store, game_id, world_time).await?;
    adjust_shop_prices(store, game_id, turn_number).await?;

    Ok(())
}

async fn advance_npc_schedules(store: &DataStore, game_id: GameId, period: world_clock::Period) -> EngineResult<()> {
    let pool = store.pool();
    let entities = repos::entity::list_for_game(pool, game_id).await?;

    for mut entity in entities {
        if !entity.is_alive || entity.schedule.is_empty() {
            continue;
        }
        let schedule: Vec<_> = entity.schedule.iter().map(|(period, location)| (*period, *location)).collect();
        let unavailable: Vec<_> = entity.unavailable_periods.iter().copied().collect();

        let Some(next_location) = npc_location_for_period(&schedule, entity.current_location_id, &unavailable, entity.is_alive, period) else {
            continue;
        };
        if next_location != entity.current_location_id {
            entity.current_location_id = next_location;
            repos::entity::save(pool, &entity).await?;
        }
    }
    Ok(())
}

/// Deletes entities the Director generated once their lifespan runs out.
/// Authored (non-generated) entities never carry an expiry, but a foreign
/// one is left alone rather than deleted outright.
async fn expire_temporary_entities(store: &DataStore, game_id: GameId, world_time: i32) -> EngineResult<()> {
    let pool = store.pool();
    let expired = repos::entity::list_expired(pool, game_id, world_time).await?;
    for entity in expired {
        if entity.generated {
            repos::entity::delete(pool, entity.id).await?;
        } else {
            warn!(entity_id = %entity.id, "authored entity carries an expiry, leaving it alone");
        }
    }
    Ok(())
}

/// Multiplies every shop's ambient `price_modifier` by the product of any
/// `economy_effect` figures attached to this turn's `WorldEvent`s, clamped
/// so a run of effects can't push prices to the floor or the moon.
async fn adjust_shop_prices(store: &DataStore, game_id: GameId, turn_number: i64) -> EngineResult<()> {
    let pool = store.pool();
    let game = repos::game::get(pool, game_id).await?;
    let effects = repos::event::world_events_for_turn(pool, game_id, &game.timeline_id, turn_number).await?;

    let multiplier = effects
        .iter()
        .filter_map(|event| event.mechanical_details.get("economy_effect").and_then(|v| v.as_f64()))
        .fold(1.0_f64, |acc, delta| acc * delta);

    if (multiplier - 1.0).abs() < f64::EPSILON {
        return Ok(());
    }

    let shops = repos::shop::list_for_game(pool, game_id).await?;
    for mut shop in shops {
        shop.price_modifier = (shop.price_modifier * multiplier).clamp(0.5, 2.0);
        repos::shop::save(pool, &shop).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrldcore_domain::rules::world_clock::Period;

    #[test]
    fn period_for_midnight_is_late_night() {
        assert_eq!(world_clock::period(0), Period::LateNight);
    }
}
