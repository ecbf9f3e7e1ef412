//! Generation - builds the kitchen floor in the ECS world.

mod kitchen;

pub use kitchen::*;
