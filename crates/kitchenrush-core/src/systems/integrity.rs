//! Integrity checks over the cross-references between items, holders and
//! serving lines. Cheap enough to run after every tick in tests and the
//! headless harness.

use std::collections::HashMap;

use hecs::{Entity, World};

use crate::components::{Counter, Customer, Item, Player, ServingCounter, Station, Stove};

/// A broken item/holder link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderMismatch {
    /// A holder references an item whose `holder` points elsewhere.
    HolderNotBack { holder: Entity, item: Entity },
    /// An item's `holder` does not reference the item back.
    ItemNotHeld { item: Entity, holder: Option<Entity> },
    /// A station's `placed_item` disagrees with its stack or occupant.
    PlacedItemStale { station: Entity },
}

/// A serving line whose `queue_count` disagrees with its customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueMismatch {
    pub station: Entity,
    pub queue_count: u32,
    pub targeting: u32,
    /// Customers at queue index 0 who are not leaving.
    pub fronts: u32,
}

fn holds(world: &World, holder: Entity, item: Entity) -> bool {
    if let Ok(player) = world.get::<&Player>(holder) {
        return player.held_item == Some(item);
    }
    if let Ok(counter) = world.get::<&Counter>(holder) {
        return counter.stack.contains(&item);
    }
    if let Ok(stove) = world.get::<&Stove>(holder) {
        return stove.occupant == Some(item);
    }
    false
}

fn points_back(world: &World, item: Entity, holder: Entity) -> bool {
    world
        .get::<&Item>(item)
        .map(|record| record.holder == Some(holder))
        .unwrap_or(false)
}

/// Every broken item/holder link in the world.
pub fn holder_mismatches(world: &World) -> Vec<HolderMismatch> {
    let mut found = Vec::new();

    for (holder, player) in world.query::<&Player>().iter() {
        if let Some(item) = player.held_item {
            if !points_back(world, item, holder) {
                found.push(HolderMismatch::HolderNotBack { holder, item });
            }
        }
    }
    for (station, (record, counter)) in world.query::<(&Station, &Counter)>().iter() {
        for &item in &counter.stack {
            if !points_back(world, item, station) {
                found.push(HolderMismatch::HolderNotBack { holder: station, item });
            }
        }
        if record.placed_item != counter.top() {
            found.push(HolderMismatch::PlacedItemStale { station });
        }
    }
    for (station, (record, stove)) in world.query::<(&Station, &Stove)>().iter() {
        if let Some(item) = stove.occupant {
            if !points_back(world, item, station) {
                found.push(HolderMismatch::HolderNotBack { holder: station, item });
            }
        }
        if record.placed_item != stove.occupant {
            found.push(HolderMismatch::PlacedItemStale { station });
        }
    }
    for (item, record) in world.query::<&Item>().iter() {
        let linked = record.holder.is_some_and(|holder| holds(world, holder, item));
        if !linked {
            found.push(HolderMismatch::ItemNotHeld {
                item,
                holder: record.holder,
            });
        }
    }

    found
}

/// Every serving line whose count disagrees with the customers targeting
/// it, or that has more than one customer at the front.
pub fn queue_mismatches(world: &World) -> Vec<QueueMismatch> {
    let mut targeting: HashMap<Entity, (u32, u32)> = HashMap::new();
    for (_, customer) in world.query::<&Customer>().iter() {
        if let Some(station) = customer.target_station {
            let entry = targeting.entry(station).or_default();
            entry.0 += 1;
            if customer.is_front() {
                entry.1 += 1;
            }
        }
    }

    let mut found: Vec<QueueMismatch> = world
        .query::<&ServingCounter>()
        .iter()
        .filter_map(|(station, serving)| {
            let (count, fronts) = targeting.get(&station).copied().unwrap_or_default();
            (count != serving.queue_count || fronts > 1).then_some(QueueMismatch {
                station,
                queue_count: serving.queue_count,
                targeting: count,
                fronts,
            })
        })
        .collect();
    found.sort_by_key(|m| m.station.id());
    found
}
