//! Item components: ingredients, dishes and plates being carried around the kitchen.

use hecs::Entity;

use kitchenrush_logic::ids::IngredientId;
pub use kitchenrush_logic::item::{CookProfile, IngredientKey, ItemKind, ItemState};

/// An item entity. Its entity handle is its identity.
///
/// `holder` is the player or station currently possessing the item; it is
/// kept in step with that holder's own reference to the item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub ingredient: IngredientId,
    pub state: ItemState,
    pub holder: Option<Entity>,
}

impl Item {
    pub fn new(kind: ItemKind, ingredient: IngredientId, state: ItemState) -> Self {
        Self {
            kind,
            ingredient,
            state,
            holder: None,
        }
    }

    pub fn held_by(mut self, holder: Entity) -> Self {
        self.holder = Some(holder);
        self
    }

    /// Recipe lookup key for this item.
    pub fn key(&self) -> IngredientKey {
        IngredientKey::new(self.ingredient, self.state)
    }
}

/// Present on items that can go on a stove.
///
/// `progress` mirrors the stove's progress while the item is cooking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cookable {
    pub profile: CookProfile,
    pub progress: f32,
}

impl Cookable {
    pub fn new(profile: CookProfile) -> Self {
        Self {
            profile,
            progress: 0.0,
        }
    }
}
