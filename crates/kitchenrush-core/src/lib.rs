//! KitchenRush Core - Kitchen Service Simulation Engine
//!
//! An ECS-based simulation of a restaurant kitchen: customers arrive, queue
//! and order, while the player gathers ingredients, cooks them, combines
//! them into dishes and serves them across a run of timed stages.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: The player, stations, items, customers
//! - **Components**: Pure data attached to entities (Item, Station, Stove, Customer, etc.)
//! - **Systems**: Logic that queries and updates components, run in a fixed
//!   order each tick with structural changes deferred to a command buffer
//!
//! Rules that need no world (recipes, cook transitions, scoring, run
//! progression) live in `kitchenrush-logic`.
//!
//! # Example
//!
//! ```rust,no_run
//! use kitchenrush_core::prelude::*;
//!
//! let mut engine = KitchenEngine::with_builtin_content(EngineConfig::default()).unwrap();
//! engine.build_kitchen(&KitchenConfig::default()).unwrap();
//! engine.start_run(Loadout::default()).unwrap();
//!
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod components;
pub mod content;
pub mod engine;
pub mod generation;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::content::{Content, ContentError};
    pub use crate::engine::{EngineConfig, EngineError, KitchenEngine};
    pub use crate::generation::{KitchenConfig, KitchenLayout, StationPlan, StationSpec};
    pub use kitchenrush_logic::effects::Loadout;
    pub use kitchenrush_logic::ids::{EquipmentId, IngredientId, SkillId};
    pub use kitchenrush_logic::run::{RunOutcome, RunPhase, RunStep};
    pub use kitchenrush_logic::session::{GameSession, SessionState};
}
