//! Station components: fixed interactables and their per-kind payloads.
//!
//! Every station carries a [`Station`] record plus exactly one payload
//! component matching its [`StationKind`].

use hecs::Entity;

use super::Vec3;
use kitchenrush_logic::ids::IngredientId;

/// Closed set of station kinds. Interaction requests are routed on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationKind {
    Container,
    Counter,
    Stove,
    ServingCounter,
    TrashCan,
}

/// Shared station record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    /// Registration order; breaks ties between otherwise equal stations.
    pub id: u32,
    pub kind: StationKind,
    /// Item currently exposed to players: a counter's top item or a stove's occupant.
    pub placed_item: Option<Entity>,
}

impl Station {
    pub fn new(id: u32, kind: StationKind) -> Self {
        Self {
            id,
            kind,
            placed_item: None,
        }
    }
}

/// Dispenser of one ingredient. Never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub ingredient: IngredientId,
    /// Whether a raw item of the same ingredient may be handed back.
    pub allows_return: bool,
}

impl Container {
    pub fn new(ingredient: IngredientId) -> Self {
        Self {
            ingredient,
            allows_return: true,
        }
    }

    pub fn with_returns(mut self, allows_return: bool) -> Self {
        self.allows_return = allows_return;
        self
    }
}

/// Bounded LIFO stack of items with fixed slot positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    pub stack: Vec<Entity>,
    pub capacity: usize,
    /// Local offsets for each stack position, bottom first.
    pub slots: Vec<Vec3>,
}

impl Counter {
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|i| Vec3::new(0.0, 0.1 + i as f32 * 0.15, 0.0))
            .collect();
        Self {
            stack: Vec::with_capacity(capacity),
            capacity,
            slots,
        }
    }

    pub fn is_full(&self) -> bool {
        self.stack.len() >= self.capacity
    }

    pub fn top(&self) -> Option<Entity> {
        self.stack.last().copied()
    }

    /// Local offset for the next pushed item.
    pub fn next_slot(&self) -> Vec3 {
        self.slots
            .get(self.stack.len())
            .copied()
            .unwrap_or(Vec3::ZERO)
    }
}

/// Cooking surface holding at most one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stove {
    pub occupant: Option<Entity>,
    /// Authoritative cook progress while cooking.
    pub progress: f32,
    pub is_cooking: bool,
    /// Progress gained per second; set from buffs at stage start.
    pub cook_speed: f32,
}

impl Default for Stove {
    fn default() -> Self {
        Self {
            occupant: None,
            progress: 0.0,
            is_cooking: false,
            cook_speed: 1.0,
        }
    }
}

impl Stove {
    pub fn clear(&mut self) {
        self.occupant = None;
        self.progress = 0.0;
        self.is_cooking = false;
    }
}

/// Counter where customers queue and dishes are served.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServingCounter {
    /// Customers currently targeting this counter, including those leaving.
    pub queue_count: u32,
    pub max_queue_capacity: u32,
    /// Local offset of the front queue position.
    pub queue_start: Vec3,
    /// Local offset between consecutive queue positions.
    pub queue_interval: Vec3,
}

impl ServingCounter {
    pub fn new(max_queue_capacity: u32) -> Self {
        Self {
            queue_count: 0,
            max_queue_capacity,
            queue_start: Vec3::flat(0.0, 1.5),
            queue_interval: Vec3::flat(0.0, 1.2),
        }
    }

    pub fn has_room(&self) -> bool {
        self.queue_count < self.max_queue_capacity
    }

    /// Local offset of queue position `index`.
    pub fn queue_offset(&self, index: u32) -> Vec3 {
        self.queue_start + self.queue_interval * index as f32
    }
}

/// Marker for trash cans.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrashCan;
