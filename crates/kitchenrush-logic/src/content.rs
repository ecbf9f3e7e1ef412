//! Declarative content tables: ingredients, recipes, stages, skills and equipment.
//!
//! These are read once at startup and never mutated by the simulation.

use serde::{Deserialize, Serialize};

use crate::effects::{EquipmentDef, SkillDef};
use crate::ids::{EquipmentId, IngredientId, SkillId};
use crate::item::IngredientDef;
use crate::recipe::RecipeDef;
use crate::stage::StageDef;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentTables {
    pub ingredients: Vec<IngredientDef>,
    #[serde(default)]
    pub recipes: Vec<RecipeDef>,
    pub stages: Vec<StageDef>,
    #[serde(default)]
    pub skills: Vec<SkillDef>,
    #[serde(default)]
    pub equipment: Vec<EquipmentDef>,
}

impl ContentTables {
    pub fn ingredient(&self, id: IngredientId) -> Option<&IngredientDef> {
        self.ingredients.iter().find(|def| def.id == id)
    }

    pub fn ingredient_named(&self, name: &str) -> Option<&IngredientDef> {
        self.ingredients
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name))
    }

    pub fn skill(&self, id: SkillId) -> Option<&SkillDef> {
        self.skills.iter().find(|def| def.id == id)
    }

    pub fn equipment(&self, id: EquipmentId) -> Option<&EquipmentDef> {
        self.equipment.iter().find(|def| def.id == id)
    }

    pub fn stage(&self, index: usize) -> Option<&StageDef> {
        self.stages.get(index)
    }

    /// Display name for an ingredient, or `"#id"` when unknown.
    pub fn ingredient_name(&self, id: IngredientId) -> String {
        self.ingredient(id)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| format!("#{}", id.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_ignores_case() {
        let tables = ContentTables {
            ingredients: vec![IngredientDef::new(1, "Bread")],
            ..Default::default()
        };
        assert_eq!(tables.ingredient_named("bread").map(|d| d.id), Some(IngredientId(1)));
        assert_eq!(tables.ingredient_name(IngredientId(9)), "#9");
    }
}
