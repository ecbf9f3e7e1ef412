//! Stage definitions and the per-stage parameters derived from them.

use serde::{Deserialize, Serialize};

use crate::effects::Effect;
use crate::ids::{IngredientId, SkillId};

/// Shortest spawn interval a stack of buffs may produce, in seconds.
pub const MIN_SPAWN_INTERVAL: f32 = 0.5;
/// Lowest patience a stack of buffs may produce, in seconds.
pub const MIN_PATIENCE: f32 = 1.0;

fn default_queue_capacity() -> u32 {
    4
}

/// A content-table stage: one service shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDef {
    pub name: String,
    /// Customers to process before the stage clears.
    pub customers: u32,
    pub max_failures: u32,
    /// Seconds between customer spawns.
    pub spawn_interval: f32,
    /// Starting patience of each customer, in seconds.
    pub patience: f32,
    #[serde(default = "one")]
    pub score_multiplier: f32,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: u32,
    /// Dishes customers may order.
    pub menu: Vec<IngredientId>,
    /// Skills offered after clearing this stage.
    #[serde(default)]
    pub reward_pool: Vec<SkillId>,
}

fn one() -> f32 {
    1.0
}

impl StageDef {
    /// A stage with the default score multiplier, queue capacity and no rewards.
    pub fn new(
        name: impl Into<String>,
        customers: u32,
        max_failures: u32,
        spawn_interval: f32,
        patience: f32,
        menu: Vec<IngredientId>,
    ) -> Self {
        Self {
            name: name.into(),
            customers,
            max_failures,
            spawn_interval,
            patience,
            score_multiplier: 1.0,
            queue_capacity: default_queue_capacity(),
            menu,
            reward_pool: Vec::new(),
        }
    }
}

/// Concrete parameters for one stage after buffs and loadout are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageParams {
    pub customer_cap: u32,
    pub max_failures: u32,
    pub spawn_interval: f32,
    pub patience: f32,
    pub score_multiplier: f32,
    pub queue_capacity: u32,
    pub move_speed_multiplier: f32,
    pub cook_speed_multiplier: f32,
}

fn apply_delta(base: u32, delta: i32) -> u32 {
    let value = i64::from(base) + i64::from(delta);
    value.clamp(1, i64::from(u32::MAX)) as u32
}

/// Derive a stage's parameters from its base values, the active buffs and the loadout.
///
/// Counts add the buff and loadout deltas to the stage base; rates multiply
/// the stage base by both. Counts never fall below one.
pub fn compute_stage_params(stage: &StageDef, buffs: &Effect, loadout: &Effect) -> StageParams {
    StageParams {
        customer_cap: apply_delta(stage.customers, buffs.customer_delta + loadout.customer_delta),
        max_failures: apply_delta(stage.max_failures, buffs.failure_bonus + loadout.failure_bonus),
        spawn_interval: (stage.spawn_interval
            * buffs.spawn_interval_mult
            * loadout.spawn_interval_mult)
            .max(MIN_SPAWN_INTERVAL),
        patience: (stage.patience * buffs.patience_mult * loadout.patience_mult).max(MIN_PATIENCE),
        score_multiplier: stage.score_multiplier * buffs.score_mult * loadout.score_mult,
        queue_capacity: stage.queue_capacity.max(1),
        move_speed_multiplier: buffs.move_speed_mult * loadout.move_speed_mult,
        cook_speed_multiplier: buffs.cook_speed_mult * loadout.cook_speed_mult,
    }
}
