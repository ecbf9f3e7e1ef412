//! Content loading - validates the declarative tables and builds the recipe table.
//!
//! Content is deserialized from JSON once, checked for dangling references,
//! and frozen into a [`Content`] value the engine only ever reads.

use std::collections::HashSet;
use std::path::Path;

use kitchenrush_logic::content::ContentTables;
use kitchenrush_logic::effects::Loadout;
use kitchenrush_logic::ids::{IngredientId, SkillId};
use kitchenrush_logic::item::IngredientDef;
use kitchenrush_logic::recipe::RecipeTable;
use thiserror::Error;

/// Content shipped with the crate.
const BUILTIN_CONTENT: &str = include_str!("../../../data/content.json");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse content: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate ingredient id {0}")]
    DuplicateIngredient(u32),
    #[error("duplicate skill id {0}")]
    DuplicateSkill(u32),
    #[error("duplicate equipment id {0}")]
    DuplicateEquipment(u32),
    #[error("{context} references unknown ingredient {id}")]
    UnknownIngredient { context: String, id: u32 },
    #[error("{context} references unknown skill {id}")]
    UnknownSkill { context: String, id: u32 },
    #[error("{context} references unknown equipment {id}")]
    UnknownEquipment { context: String, id: u32 },
    #[error("ingredient {0} has a non-positive cook time or negative burn time")]
    InvalidCookProfile(u32),
    #[error("recipe {index} has {count} inputs; recipes combine exactly two items")]
    RecipeArity { index: usize, count: usize },
    #[error("stage '{0}' has an empty menu")]
    EmptyMenu(String),
    #[error("content defines no stages")]
    NoStages,
}

/// Validated, immutable content.
#[derive(Debug, Clone)]
pub struct Content {
    pub tables: ContentTables,
    pub recipes: RecipeTable,
}

impl Content {
    /// Validate `tables` and build the lookup structures.
    pub fn new(tables: ContentTables) -> Result<Self, ContentError> {
        validate(&tables)?;
        if tables.recipes.is_empty() {
            log::warn!("content has no recipes; every interaction falls through to stations");
        }
        let recipes = RecipeTable::new(tables.recipes.clone());
        Ok(Self { tables, recipes })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let tables: ContentTables = serde_json::from_str(json)?;
        Self::new(tables)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The bundled content.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json_str(BUILTIN_CONTENT)
    }

    pub fn ingredient(&self, id: IngredientId) -> Option<&IngredientDef> {
        self.tables.ingredient(id)
    }

    /// Look up an ingredient id by name, ignoring case.
    pub fn ingredient_id(&self, name: &str) -> Option<IngredientId> {
        self.tables.ingredient_named(name).map(|def| def.id)
    }

    /// Every piece in `loadout` must exist in the equipment table.
    pub fn check_loadout(&self, loadout: &Loadout) -> Result<(), ContentError> {
        match loadout
            .equipment
            .iter()
            .find(|id| self.tables.equipment(**id).is_none())
        {
            Some(id) => Err(ContentError::UnknownEquipment {
                context: "loadout".into(),
                id: id.0,
            }),
            None => Ok(()),
        }
    }
}

fn validate(tables: &ContentTables) -> Result<(), ContentError> {
    let mut ingredient_ids = HashSet::new();
    for def in &tables.ingredients {
        if !ingredient_ids.insert(def.id) {
            return Err(ContentError::DuplicateIngredient(def.id.0));
        }
        if let Some(cook) = def.cook {
            if cook.cook_time <= 0.0 || cook.burn_time < 0.0 {
                return Err(ContentError::InvalidCookProfile(def.id.0));
            }
        }
    }

    let check_ingredient = |context: String, id: IngredientId| {
        if ingredient_ids.contains(&id) {
            Ok(())
        } else {
            Err(ContentError::UnknownIngredient { context, id: id.0 })
        }
    };

    for (index, recipe) in tables.recipes.iter().enumerate() {
        if recipe.inputs.len() != 2 {
            return Err(ContentError::RecipeArity {
                index,
                count: recipe.inputs.len(),
            });
        }
        for key in &recipe.inputs {
            check_ingredient(format!("recipe {index}"), key.ingredient)?;
        }
        check_ingredient(format!("recipe {index}"), recipe.output)?;
    }

    let mut skill_ids = HashSet::new();
    for skill in &tables.skills {
        if !skill_ids.insert(skill.id) {
            return Err(ContentError::DuplicateSkill(skill.id.0));
        }
    }
    let mut equipment_ids = HashSet::new();
    for piece in &tables.equipment {
        if !equipment_ids.insert(piece.id) {
            return Err(ContentError::DuplicateEquipment(piece.id.0));
        }
    }

    let check_skill = |context: String, id: SkillId| {
        if skill_ids.contains(&id) {
            Ok(())
        } else {
            Err(ContentError::UnknownSkill { context, id: id.0 })
        }
    };

    if tables.stages.is_empty() {
        return Err(ContentError::NoStages);
    }
    for stage in &tables.stages {
        if stage.menu.is_empty() {
            return Err(ContentError::EmptyMenu(stage.name.clone()));
        }
        for dish in &stage.menu {
            check_ingredient(format!("stage '{}' menu", stage.name), *dish)?;
        }
        for skill in &stage.reward_pool {
            check_skill(format!("stage '{}' reward pool", stage.name), *skill)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitchenrush_logic::ids::EquipmentId;

    #[test]
    fn test_builtin_content_is_valid() {
        let content = Content::builtin().unwrap();
        assert!(!content.tables.stages.is_empty());
        assert!(!content.recipes.is_empty());
        assert!(content.ingredient_id("patty").is_some());
    }

    #[test]
    fn test_rejects_unknown_menu_dish() {
        let json = r#"{
            "ingredients": [ { "id": 1, "name": "Bread" } ],
            "stages": [ {
                "name": "Test", "customers": 1, "max_failures": 1,
                "spawn_interval": 1.0, "patience": 10.0, "menu": [ 9 ]
            } ]
        }"#;
        let err = Content::from_json_str(json).unwrap_err();
        assert!(matches!(err, ContentError::UnknownIngredient { id: 9, .. }));
    }

    #[test]
    fn test_rejects_duplicate_ingredient() {
        let json = r#"{
            "ingredients": [ { "id": 1, "name": "Bread" }, { "id": 1, "name": "Bun" } ],
            "stages": []
        }"#;
        assert!(matches!(
            Content::from_json_str(json),
            Err(ContentError::DuplicateIngredient(1))
        ));
    }

    #[test]
    fn test_rejects_duplicate_equipment() {
        let mut tables = Content::builtin().unwrap().tables;
        let mut twin = tables.equipment[0].clone();
        twin.name = "Twin".into();
        tables.equipment.push(twin);
        let first = tables.equipment[0].id.0;
        assert!(matches!(
            Content::new(tables),
            Err(ContentError::DuplicateEquipment(id)) if id == first
        ));
    }

    #[test]
    fn test_loadout_must_use_known_equipment() {
        let content = Content::builtin().unwrap();
        let known = content.tables.equipment[0].id;
        assert!(content.check_loadout(&Loadout::new(vec![known])).is_ok());
        assert!(content.check_loadout(&Loadout::default()).is_ok());
        assert!(matches!(
            content.check_loadout(&Loadout::new(vec![known, EquipmentId(999)])),
            Err(ContentError::UnknownEquipment { id: 999, .. })
        ));
    }

    #[test]
    fn test_rejects_missing_stages() {
        let json = r#"{ "ingredients": [ { "id": 1, "name": "Bread" } ], "stages": [] }"#;
        assert!(matches!(Content::from_json_str(json), Err(ContentError::NoStages)));
    }

    #[test]
    fn test_empty_recipe_table_is_allowed() {
        let json = r#"{
            "ingredients": [ { "id": 1, "name": "Bread", "kind": "Dish" } ],
            "stages": [ {
                "name": "Test", "customers": 1, "max_failures": 1,
                "spawn_interval": 1.0, "patience": 10.0, "menu": [ 1 ]
            } ]
        }"#;
        let content = Content::from_json_str(json).unwrap();
        assert!(content.recipes.is_empty());
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(Content::from_json_str("{"), Err(ContentError::Parse(_))));
    }
}
