//! Recipe resolution - the priority handler that runs before any station
//! handler and may consume a request by combining two items.

use hecs::{CommandBuffer, World};

use super::items::{detach_from_station, exposed_item, held_item, set_held, spawn_item, Exposed};
use crate::components::{emit, InteractionRequest, Item, ItemState, KitchenEvent};
use crate::content::Content;

/// Combine the held item with the station's exposed item when a recipe
/// matches.
///
/// Both inputs are destroyed (a container's supply is not an item and is
/// left alone), the output is created `Raw` in the player's hands and the
/// request is removed so no station handler sees it. Requests without a
/// match stay live.
pub fn recipe_resolution_system(world: &mut World, content: &Content, cmd: &mut CommandBuffer) {
    if content.recipes.is_empty() {
        return;
    }

    let requests: Vec<InteractionRequest> = world
        .query::<&InteractionRequest>()
        .iter()
        .map(|(_, request)| *request)
        .collect();

    for request in requests {
        let Some(held) = held_item(world, request.player) else {
            continue;
        };
        let Some(exposed) = exposed_item(world, request.station) else {
            continue;
        };
        let held_key = match world.get::<&Item>(held) {
            Ok(item) => item.key(),
            Err(_) => continue,
        };
        let Some(output) = content.recipes.output_for(held_key, exposed.key()) else {
            continue;
        };

        if let Exposed::Item(target, _) = exposed {
            if !detach_from_station(world, request.station, target) {
                log::debug!("recipe target {target:?} was not on station {:?}", request.station);
                continue;
            }
            cmd.despawn(target);
        }
        cmd.despawn(held);

        let combined = spawn_item(world, cmd, content, output, ItemState::Raw, request.player);
        set_held(world, request.player, Some(combined));
        cmd.remove_one::<InteractionRequest>(request.player);

        log::debug!(
            "combined {:?} with {:?} into {}",
            held_key,
            exposed.key(),
            content.tables.ingredient_name(output)
        );
        emit(world, request.player, KitchenEvent::RecipeCombined { output });
        emit(world, request.player, KitchenEvent::ItemSpawned { item: combined });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        Container, Counter, EventQueue, Player, Station, StationKind, Transform,
    };
    use hecs::Entity;
    use kitchenrush_logic::content::ContentTables;
    use kitchenrush_logic::ids::IngredientId;
    use kitchenrush_logic::item::{IngredientDef, IngredientKey};
    use kitchenrush_logic::recipe::RecipeDef;
    use kitchenrush_logic::stage::StageDef;

    const BREAD: IngredientId = IngredientId(1);
    const MEAT: IngredientId = IngredientId(2);
    const BURGER: IngredientId = IngredientId(5);

    fn content() -> Content {
        let tables = ContentTables {
            ingredients: vec![
                IngredientDef::new(1, "Bread"),
                IngredientDef::new(2, "Meat").with_cook(5.0, 3.0),
                IngredientDef::new(5, "Burger").dish(),
            ],
            recipes: vec![RecipeDef::pair(
                IngredientKey::raw(BREAD),
                IngredientKey::new(MEAT, ItemState::Cooked),
                BURGER,
            )],
            stages: vec![StageDef::new("Test", 1, 3, 10.0, 60.0, vec![BURGER])],
            skills: Vec::new(),
            equipment: Vec::new(),
        };
        Content::new(tables).unwrap()
    }

    fn holding(world: &mut World, ingredient: IngredientId, state: ItemState) -> (Entity, Entity) {
        let player = world.spawn((Player::default(), Transform::default(), EventQueue::default()));
        let item = world.spawn((Item::new(Default::default(), ingredient, state).held_by(player),));
        world.get::<&mut Player>(player).unwrap().held_item = Some(item);
        (player, item)
    }

    fn request(world: &mut World, player: Entity, station: Entity, kind: StationKind) {
        world
            .insert_one(
                player,
                InteractionRequest {
                    player,
                    station,
                    station_kind: kind,
                },
            )
            .unwrap();
    }

    #[test]
    fn test_combines_with_counter_top() {
        let content = content();
        let mut world = World::new();
        let (player, bread) = holding(&mut world, BREAD, ItemState::Raw);
        let counter_entity = world.reserve_entity();
        let meat = world.spawn((
            Item::new(Default::default(), MEAT, ItemState::Cooked).held_by(counter_entity),
        ));
        let mut counter = Counter::new(4);
        counter.stack.push(meat);
        let mut station = Station::new(0, StationKind::Counter);
        station.placed_item = Some(meat);
        world.insert(counter_entity, (station, counter)).unwrap();
        request(&mut world, player, counter_entity, StationKind::Counter);

        let mut cmd = CommandBuffer::new();
        recipe_resolution_system(&mut world, &content, &mut cmd);
        cmd.run_on(&mut world);

        assert!(!world.contains(bread));
        assert!(!world.contains(meat));
        assert!(world.get::<&Counter>(counter_entity).unwrap().stack.is_empty());
        assert!(world.get::<&InteractionRequest>(player).is_err());

        let held = world.get::<&Player>(player).unwrap().held_item.unwrap();
        let item = *world.get::<&Item>(held).unwrap();
        assert_eq!(item.ingredient, BURGER);
        assert_eq!(item.state, ItemState::Raw);
        assert_eq!(item.holder, Some(player));
    }

    #[test]
    fn test_order_independent_match_from_either_side() {
        let content = content();
        let mut world = World::new();
        let (player, _) = holding(&mut world, MEAT, ItemState::Cooked);
        let container = world.spawn((
            Station::new(0, StationKind::Container),
            Container::new(BREAD),
        ));
        request(&mut world, player, container, StationKind::Container);

        let mut cmd = CommandBuffer::new();
        recipe_resolution_system(&mut world, &content, &mut cmd);
        cmd.run_on(&mut world);

        let held = world.get::<&Player>(player).unwrap().held_item.unwrap();
        assert_eq!(world.get::<&Item>(held).unwrap().ingredient, BURGER);
        assert!(world.contains(container));
    }

    #[test]
    fn test_no_match_leaves_request_live() {
        let content = content();
        let mut world = World::new();
        let (player, bread) = holding(&mut world, BREAD, ItemState::Raw);
        let container = world.spawn((
            Station::new(0, StationKind::Container),
            Container::new(BREAD),
        ));
        request(&mut world, player, container, StationKind::Container);

        let mut cmd = CommandBuffer::new();
        recipe_resolution_system(&mut world, &content, &mut cmd);
        cmd.run_on(&mut world);

        assert!(world.get::<&InteractionRequest>(player).is_ok());
        assert_eq!(world.get::<&Player>(player).unwrap().held_item, Some(bread));
    }
}
