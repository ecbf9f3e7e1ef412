//! Stage setup - pushes the active buffs into the world once per stage.

use hecs::World;

use crate::components::{Player, Stove};
use kitchenrush_logic::session::{GameSession, SessionState};
use kitchenrush_logic::stage::StageParams;

/// Apply the stage's move and cook speed multipliers on the first playing
/// tick. Later ticks are no-ops until the next stage begins, however many
/// ticks run per second.
pub fn stage_setup_system(world: &mut World, session: &mut GameSession, params: &StageParams) {
    if session.state != SessionState::Playing || session.stage_initialized {
        return;
    }

    for (_, player) in world.query_mut::<&mut Player>() {
        player.speed_multiplier = params.move_speed_multiplier;
    }
    for (_, stove) in world.query_mut::<&mut Stove>() {
        stove.cook_speed = params.cook_speed_multiplier;
    }

    session.stage_initialized = true;
    log::info!(
        "stage {} initialised: move x{:.2}, cook x{:.2}",
        session.stage_level,
        params.move_speed_multiplier,
        params.cook_speed_multiplier
    );
}
