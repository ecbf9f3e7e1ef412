//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod actors;
mod common;
mod events;
mod item;
mod station;

pub use actors::*;
pub use common::*;
pub use events::*;
pub use item::*;
pub use station::*;
