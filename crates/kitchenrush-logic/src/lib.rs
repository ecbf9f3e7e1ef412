//! Pure kitchen rules for KitchenRush.
//!
//! This crate contains all game logic that is independent of the ECS world
//! or any runtime. Functions take plain data and return results, making them
//! unit-testable and reusable from the simulation engine, the headless
//! harness and any future front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`ids`] | Copyable identifiers for ingredients, skills and equipment |
//! | [`item`] | Item kinds and states, ingredient definitions, cook profiles |
//! | [`cooking`] | Raw → Cooked → Burnt transition rules |
//! | [`recipe`] | Immutable recipe table and pairwise combination lookup |
//! | [`effects`] | Skill / equipment effects and the active buff set |
//! | [`stage`] | Stage definitions and per-stage parameter derivation |
//! | [`session`] | Per-stage session record, watcher and star rating |
//! | [`run`] | Run progression across stages, rewards and final outcome |
//! | [`content`] | Declarative content tables consumed read-only by the engine |

pub mod content;
pub mod cooking;
pub mod effects;
pub mod ids;
pub mod item;
pub mod recipe;
pub mod run;
pub mod session;
pub mod stage;
