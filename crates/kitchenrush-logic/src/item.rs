//! Item kinds, item states and ingredient definitions.

use serde::{Deserialize, Serialize};

use crate::ids::IngredientId;

/// What an item entity represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemKind {
    #[default]
    Ingredient,
    Dish,
    Plate,
}

/// Preparation state of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum ItemState {
    #[default]
    Raw,
    Chopped,
    Cooked,
    Burnt,
    Dirty,
    Clean,
}

/// The (ingredient, state) pair recipes are keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IngredientKey {
    pub ingredient: IngredientId,
    #[serde(default)]
    pub state: ItemState,
}

impl IngredientKey {
    pub const fn new(ingredient: IngredientId, state: ItemState) -> Self {
        Self { ingredient, state }
    }

    pub const fn raw(ingredient: IngredientId) -> Self {
        Self::new(ingredient, ItemState::Raw)
    }
}

/// Stove thresholds for a cookable ingredient, in seconds of cook progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CookProfile {
    /// Progress at which a raw item becomes cooked.
    pub cook_time: f32,
    /// Additional progress after `cook_time` before burning. 0 never burns.
    #[serde(default)]
    pub burn_time: f32,
}

impl CookProfile {
    pub const fn new(cook_time: f32, burn_time: f32) -> Self {
        Self { cook_time, burn_time }
    }

    /// Whether this profile ever reaches [`ItemState::Burnt`].
    pub fn burns(&self) -> bool {
        self.burn_time > 0.0
    }

    /// Total progress at which a cooked item burns.
    pub fn burn_at(&self) -> f32 {
        self.cook_time + self.burn_time
    }
}

/// A content-table entry describing an ingredient or dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDef {
    pub id: IngredientId,
    pub name: String,
    #[serde(default)]
    pub kind: ItemKind,
    /// Present only for items that can be put on a stove.
    #[serde(default)]
    pub cook: Option<CookProfile>,
}

impl IngredientDef {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: IngredientId(id),
            name: name.into(),
            kind: ItemKind::Ingredient,
            cook: None,
        }
    }

    pub fn dish(mut self) -> Self {
        self.kind = ItemKind::Dish;
        self
    }

    pub fn with_cook(mut self, cook_time: f32, burn_time: f32) -> Self {
        self.cook = Some(CookProfile::new(cook_time, burn_time));
        self
    }
}
