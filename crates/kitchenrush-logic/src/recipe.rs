//! Recipe table - immutable lookup from input keys to an output ingredient.
//!
//! Recipes combine the item a player is holding with the item a station
//! exposes. Each recipe lists its inputs as `(ingredient, state)` keys and
//! is either order-independent (the inputs are a multiset) or ordered
//! (`inputs[0]` must be the held item, `inputs[1]` the station's item).
//!
//! The table is built once from content and never mutated. Lookups go
//! through a pair index built in table order with first-insert-wins, so
//! when two definitions could match the same pair the earlier one wins.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::IngredientId;
use crate::item::IngredientKey;

fn default_order_independent() -> bool {
    true
}

/// A content-table recipe entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDef {
    pub inputs: Vec<IngredientKey>,
    #[serde(default = "default_order_independent")]
    pub order_independent: bool,
    pub output: IngredientId,
}

impl RecipeDef {
    /// Order-independent two-input recipe.
    pub fn pair(a: IngredientKey, b: IngredientKey, output: IngredientId) -> Self {
        Self {
            inputs: vec![a, b],
            order_independent: true,
            output,
        }
    }

    /// Ordered two-input recipe: `held` must be the held item.
    pub fn ordered(held: IngredientKey, target: IngredientKey, output: IngredientId) -> Self {
        Self {
            inputs: vec![held, target],
            order_independent: false,
            output,
        }
    }

}

/// Immutable recipe lookup structure.
#[derive(Debug, Clone, Default)]
pub struct RecipeTable {
    recipes: Vec<RecipeDef>,
    pairs: HashMap<(IngredientKey, IngredientKey), usize>,
}

impl RecipeTable {
    /// Build the table. Recipes keep their given order.
    pub fn new(recipes: Vec<RecipeDef>) -> Self {
        let mut pairs = HashMap::new();
        for (index, recipe) in recipes.iter().enumerate() {
            let [a, b] = match recipe.inputs.as_slice() {
                [a, b] => [*a, *b],
                _ => continue,
            };
            pairs.entry((a, b)).or_insert(index);
            if recipe.order_independent {
                pairs.entry((b, a)).or_insert(index);
            }
        }
        Self { recipes, pairs }
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn recipes(&self) -> &[RecipeDef] {
        &self.recipes
    }

    /// Look up the recipe combining a held item with a station's item.
    pub fn combine(&self, held: IngredientKey, target: IngredientKey) -> Option<&RecipeDef> {
        self.pairs
            .get(&(held, target))
            .and_then(|&index| self.recipes.get(index))
    }

    /// Output ingredient for `held` + `target`, if any recipe matches.
    pub fn output_for(&self, held: IngredientKey, target: IngredientKey) -> Option<IngredientId> {
        self.combine(held, target).map(|recipe| recipe.output)
    }
}
