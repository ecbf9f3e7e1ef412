//! Per-entity event queues drained by presentation collaborators.
//!
//! Systems append; presentation drains and clears once per tick. The
//! simulation never reads events back.

use hecs::{Entity, World};

use kitchenrush_logic::ids::IngredientId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KitchenEvent {
    ItemSpawned { item: Entity },
    ItemPickedUp { item: Entity },
    ItemPlaced { item: Entity },
    ItemReturned { ingredient: IngredientId },
    ItemTrashed { ingredient: IngredientId },
    RecipeCombined { output: IngredientId },
    InteractionRejected,
    StartCooking { item: Entity },
    StopCooking { item: Entity },
    ItemCooked { item: Entity },
    ItemBurned { item: Entity },
    CustomerSpawned { dish: IngredientId },
    CustomerJoinedQueue { station: Entity, index: u32 },
    CustomerOrdering { dish: IngredientId },
    CustomerImpatient,
    CustomerLeftHappy,
    CustomerLeftAngry,
    ServeSuccess { dish: IngredientId, points: u32 },
    ServeRejected { offered: IngredientId },
}

/// Append-only event buffer attached to players, stations and customers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQueue {
    events: Vec<KitchenEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: KitchenEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[KitchenEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = KitchenEvent> + '_ {
        self.events.drain(..)
    }
}

/// Append `event` to `entity`'s queue. Entities without a queue are skipped.
pub fn emit(world: &World, entity: Entity, event: KitchenEvent) {
    if let Ok(mut queue) = world.get::<&mut EventQueue>(entity) {
        queue.push(event);
    }
}

/// Drain every queue in the world, in entity iteration order.
pub fn drain_events(world: &mut World) -> Vec<(Entity, KitchenEvent)> {
    let mut drained = Vec::new();
    for (entity, queue) in world.query_mut::<&mut EventQueue>() {
        drained.extend(queue.drain().map(|event| (entity, event)));
    }
    drained
}
