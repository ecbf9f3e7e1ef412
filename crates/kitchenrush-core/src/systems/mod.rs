//! Systems - logic that operates on components
//!
//! Systems that create, destroy or attach records write them to a
//! [`hecs::CommandBuffer`]; the engine plays the buffer back at fixed sync
//! points so no system mutates a collection it is iterating.

mod cooking;
mod customers;
mod integrity;
mod interaction;
mod items;
mod recipe;
mod serving;
mod session;
mod spawner;
mod stations;

pub use cooking::*;
pub use customers::*;
pub use integrity::*;
pub use interaction::*;
pub use items::*;
pub use recipe::*;
pub use serving::*;
pub use session::*;
pub use spawner::*;
pub use stations::*;
