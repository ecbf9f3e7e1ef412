//! Station handlers - plain pick-up and put-down for each station kind.
//!
//! Each handler consumes only requests tagged with its own kind that are
//! still live after recipe resolution, and always removes the request,
//! whether or not the action succeeded.

use hecs::{CommandBuffer, Entity, World};

use super::items::{
    held_item, pending_requests, place_at, position_of, reject, set_held, set_holder, spawn_item,
};
use crate::components::{
    emit, Container, Cookable, Counter, InteractionRequest, Item, ItemState, KitchenEvent,
    Station, StationKind, Stove, Transform,
};
use crate::content::Content;

/// Containers dispense their ingredient to empty hands and take back an
/// unprocessed item of the same ingredient.
pub fn container_system(world: &mut World, content: &Content, cmd: &mut CommandBuffer) {
    for (player, request) in pending_requests(world, StationKind::Container) {
        cmd.remove_one::<InteractionRequest>(player);

        let container = match world.get::<&Container>(request.station) {
            Ok(container) => *container,
            Err(_) => {
                reject(world, &request, "container is gone");
                continue;
            }
        };

        match held_item(world, player) {
            None => {
                let item = spawn_item(
                    world,
                    cmd,
                    content,
                    container.ingredient,
                    ItemState::Raw,
                    player,
                );
                set_held(world, player, Some(item));
                emit(world, player, KitchenEvent::ItemSpawned { item });
            }
            Some(held) => {
                let returnable = world
                    .get::<&Item>(held)
                    .map(|item| {
                        container.allows_return
                            && item.ingredient == container.ingredient
                            && item.state == ItemState::Raw
                    })
                    .unwrap_or(false);
                if !returnable {
                    reject(world, &request, "container does not take this item");
                    continue;
                }
                cmd.despawn(held);
                set_held(world, player, None);
                emit(
                    world,
                    player,
                    KitchenEvent::ItemReturned {
                        ingredient: container.ingredient,
                    },
                );
            }
        }
    }
}

/// Counters stack items: holding pushes onto the stack, empty hands pop the
/// top item.
pub fn counter_system(world: &mut World, cmd: &mut CommandBuffer) {
    for (player, request) in pending_requests(world, StationKind::Counter) {
        cmd.remove_one::<InteractionRequest>(player);

        if world.get::<&Counter>(request.station).is_err() {
            reject(world, &request, "counter is gone");
            continue;
        }
        prune_counter(world, request.station);

        match held_item(world, player) {
            Some(held) => put_on_counter(world, &request, held),
            None => take_from_counter(world, &request),
        }
    }
}

/// Drop stack entries whose item no longer exists.
fn prune_counter(world: &World, station: Entity) {
    let Ok(mut counter) = world.get::<&mut Counter>(station) else {
        return;
    };
    let before = counter.stack.len();
    counter.stack.retain(|item| world.contains(*item));
    if counter.stack.len() != before {
        log::debug!("pruned {} stale items from counter {station:?}", before - counter.stack.len());
        let top = counter.top();
        drop(counter);
        if let Ok(mut record) = world.get::<&mut Station>(station) {
            record.placed_item = top;
        }
    }
}

fn put_on_counter(world: &World, request: &InteractionRequest, held: Entity) {
    let slot = {
        let Ok(mut counter) = world.get::<&mut Counter>(request.station) else {
            return;
        };
        if counter.is_full() {
            drop(counter);
            reject(world, request, "counter is full");
            return;
        }
        let slot = counter.next_slot();
        counter.stack.push(held);
        slot
    };

    let anchor = world
        .get::<&Transform>(request.station)
        .map(|t| *t)
        .unwrap_or_default();
    place_at(world, held, anchor.local_to_world(slot));
    if let Ok(mut record) = world.get::<&mut Station>(request.station) {
        record.placed_item = Some(held);
    }
    set_holder(world, held, Some(request.station));
    set_held(world, request.player, None);

    emit(world, request.player, KitchenEvent::ItemPlaced { item: held });
    emit(world, request.station, KitchenEvent::ItemPlaced { item: held });
}

fn take_from_counter(world: &World, request: &InteractionRequest) {
    let taken = {
        let Ok(mut counter) = world.get::<&mut Counter>(request.station) else {
            return;
        };
        let taken = counter.stack.pop();
        let top = counter.top();
        drop(counter);
        if let Ok(mut record) = world.get::<&mut Station>(request.station) {
            record.placed_item = top;
        }
        taken
    };

    let Some(item) = taken else {
        reject(world, request, "counter is empty");
        return;
    };
    give_to_player(world, request.player, item);
    emit(world, request.station, KitchenEvent::ItemPickedUp { item });
}

/// Stoves cook one cookable item: holding places it and starts cooking,
/// empty hands take the occupant back.
pub fn stove_system(world: &mut World, cmd: &mut CommandBuffer) {
    for (player, request) in pending_requests(world, StationKind::Stove) {
        cmd.remove_one::<InteractionRequest>(player);

        let occupant = match world.get::<&mut Stove>(request.station) {
            Ok(mut stove) => {
                if let Some(occupant) = stove.occupant {
                    if !world.contains(occupant) {
                        log::debug!("clearing stale stove occupant {occupant:?}");
                        stove.clear();
                        if let Ok(mut record) = world.get::<&mut Station>(request.station) {
                            record.placed_item = None;
                        }
                    }
                }
                stove.occupant
            }
            Err(_) => {
                reject(world, &request, "stove is gone");
                continue;
            }
        };

        match (held_item(world, player), occupant) {
            (Some(held), None) => put_on_stove(world, &request, held),
            (None, Some(item)) => take_from_stove(world, &request, item),
            (Some(_), Some(_)) => reject(world, &request, "stove is occupied"),
            (None, None) => reject(world, &request, "stove is empty"),
        }
    }
}

fn put_on_stove(world: &World, request: &InteractionRequest, held: Entity) {
    match world.get::<&mut Cookable>(held) {
        Ok(mut cookable) => cookable.progress = 0.0,
        Err(_) => {
            reject(world, request, "item is not cookable");
            return;
        }
    }

    if let Ok(mut stove) = world.get::<&mut Stove>(request.station) {
        stove.occupant = Some(held);
        stove.progress = 0.0;
        stove.is_cooking = true;
    }
    if let Ok(mut record) = world.get::<&mut Station>(request.station) {
        record.placed_item = Some(held);
    }
    place_at(world, held, position_of(world, request.station));
    set_holder(world, held, Some(request.station));
    set_held(world, request.player, None);

    emit(world, request.player, KitchenEvent::ItemPlaced { item: held });
    emit(world, request.station, KitchenEvent::StartCooking { item: held });
}

fn take_from_stove(world: &World, request: &InteractionRequest, item: Entity) {
    if let Ok(mut stove) = world.get::<&mut Stove>(request.station) {
        stove.clear();
    }
    if let Ok(mut record) = world.get::<&mut Station>(request.station) {
        record.placed_item = None;
    }
    if let Ok(mut cookable) = world.get::<&mut Cookable>(item) {
        cookable.progress = 0.0;
    }
    give_to_player(world, request.player, item);
    emit(world, request.station, KitchenEvent::StopCooking { item });
}

fn give_to_player(world: &World, player: Entity, item: Entity) {
    place_at(world, item, position_of(world, player));
    set_holder(world, item, Some(player));
    set_held(world, player, Some(item));
    emit(world, player, KitchenEvent::ItemPickedUp { item });
}

/// Trash cans destroy whatever the player holds.
pub fn trash_system(world: &mut World, cmd: &mut CommandBuffer) {
    for (player, request) in pending_requests(world, StationKind::TrashCan) {
        cmd.remove_one::<InteractionRequest>(player);

        let Some(held) = held_item(world, player) else {
            reject(world, &request, "nothing to throw away");
            continue;
        };
        let ingredient = world.get::<&Item>(held).map(|item| item.ingredient).ok();
        cmd.despawn(held);
        set_held(world, player, None);
        if let Some(ingredient) = ingredient {
            emit(world, player, KitchenEvent::ItemTrashed { ingredient });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{EventQueue, Player, TrashCan, Vec3};
    use crate::systems::holder_mismatches;
    use kitchenrush_logic::content::ContentTables;
    use kitchenrush_logic::ids::IngredientId;
    use kitchenrush_logic::item::IngredientDef;
    use kitchenrush_logic::stage::StageDef;

    const BREAD: IngredientId = IngredientId(1);
    const PATTY: IngredientId = IngredientId(2);

    fn content() -> Content {
        Content::new(ContentTables {
            ingredients: vec![
                IngredientDef::new(1, "Bread"),
                IngredientDef::new(2, "Patty").with_cook(5.0, 3.0),
            ],
            stages: vec![StageDef::new("Test", 1, 3, 10.0, 60.0, vec![BREAD])],
            ..Default::default()
        })
        .unwrap()
    }

    fn spawn_player(world: &mut World) -> Entity {
        world.spawn((Player::default(), Transform::default(), EventQueue::default()))
    }

    fn give(world: &mut World, player: Entity, content: &Content, ingredient: IngredientId) -> Entity {
        let mut item = (
            Item::new(Default::default(), ingredient, ItemState::Raw).held_by(player),
            Transform::default(),
        );
        item.0.kind = content.ingredient(ingredient).unwrap().kind;
        let entity = match content.ingredient(ingredient).unwrap().cook {
            Some(profile) => world.spawn((item.0, item.1, Cookable::new(profile))),
            None => world.spawn(item),
        };
        world.get::<&mut Player>(player).unwrap().held_item = Some(entity);
        entity
    }

    fn interact(world: &mut World, player: Entity, station: Entity) {
        let kind = world.get::<&Station>(station).unwrap().kind;
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

    fn run(world: &mut World, content: &Content) {
        let mut cmd = CommandBuffer::new();
        container_system(world, content, &mut cmd);
        counter_system(world, &mut cmd);
        stove_system(world, &mut cmd);
        trash_system(world, &mut cmd);
        cmd.run_on(world);
    }

    fn held(world: &World, player: Entity) -> Option<Entity> {
        world.get::<&Player>(player).unwrap().held_item
    }

    #[test]
    fn test_container_dispenses_raw_item() {
        let content = content();
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let container = world.spawn((
            Station::new(0, StationKind::Container),
            Container::new(BREAD),
        ));

        interact(&mut world, player, container);
        run(&mut world, &content);

        let item = *world.get::<&Item>(held(&world, player).unwrap()).unwrap();
        assert_eq!(item.ingredient, BREAD);
        assert_eq!(item.state, ItemState::Raw);
        assert_eq!(item.holder, Some(player));
        assert!(world.get::<&InteractionRequest>(player).is_err());
    }

    #[test]
    fn test_container_rejects_foreign_item() {
        let content = content();
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let patty = give(&mut world, player, &content, PATTY);
        let container = world.spawn((
            Station::new(0, StationKind::Container),
            Container::new(BREAD),
        ));

        interact(&mut world, player, container);
        run(&mut world, &content);

        assert_eq!(held(&world, player), Some(patty));
        assert!(world.contains(patty));
        let events = world.get::<&EventQueue>(player).unwrap().events().to_vec();
        assert_eq!(events, vec![KitchenEvent::InteractionRejected]);
    }

    #[test]
    fn test_closed_container_keeps_returned_item() {
        let content = content();
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let container = world.spawn((
            Station::new(0, StationKind::Container),
            Container::new(BREAD).with_returns(false),
        ));
        let bread = give(&mut world, player, &content, BREAD);

        interact(&mut world, player, container);
        run(&mut world, &content);

        assert_eq!(held(&world, player), Some(bread));
        assert_eq!(world.get::<&Item>(bread).unwrap().holder, Some(player));
        assert_eq!(world.query::<&Item>().iter().count(), 1);
        let events = world.get::<&EventQueue>(player).unwrap().events().to_vec();
        assert_eq!(events, vec![KitchenEvent::InteractionRejected]);
    }

    #[test]
    fn test_counter_is_lifo() {
        let content = content();
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let counter = world.spawn((
            Station::new(0, StationKind::Counter),
            Counter::new(2),
            Transform::at(Vec3::flat(2.0, 0.0)),
        ));

        let first = give(&mut world, player, &content, BREAD);
        interact(&mut world, player, counter);
        run(&mut world, &content);
        let second = give(&mut world, player, &content, PATTY);
        interact(&mut world, player, counter);
        run(&mut world, &content);

        assert_eq!(world.get::<&Counter>(counter).unwrap().stack, vec![first, second]);
        assert_eq!(world.get::<&Item>(second).unwrap().holder, Some(counter));
        assert_eq!(world.get::<&Station>(counter).unwrap().placed_item, Some(second));
        assert!(world.get::<&Transform>(second).unwrap().position.y > 0.0);

        interact(&mut world, player, counter);
        run(&mut world, &content);
        assert_eq!(held(&world, player), Some(second));
        assert_eq!(world.get::<&Station>(counter).unwrap().placed_item, Some(first));
    }

    #[test]
    fn test_full_counter_is_noop() {
        let content = content();
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let counter = world.spawn((Station::new(0, StationKind::Counter), Counter::new(1)));

        give(&mut world, player, &content, BREAD);
        interact(&mut world, player, counter);
        run(&mut world, &content);
        let extra = give(&mut world, player, &content, BREAD);
        interact(&mut world, player, counter);
        run(&mut world, &content);

        assert_eq!(held(&world, player), Some(extra));
        assert_eq!(world.get::<&Counter>(counter).unwrap().stack.len(), 1);
    }

    #[test]
    fn test_stove_accepts_only_cookable() {
        let content = content();
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let stove = world.spawn((Station::new(0, StationKind::Stove), Stove::default()));

        let bread = give(&mut world, player, &content, BREAD);
        interact(&mut world, player, stove);
        run(&mut world, &content);
        assert_eq!(held(&world, player), Some(bread));
        assert!(!world.get::<&Stove>(stove).unwrap().is_cooking);

        world.despawn(bread).unwrap();
        let patty = give(&mut world, player, &content, PATTY);
        interact(&mut world, player, stove);
        run(&mut world, &content);
        let state = *world.get::<&Stove>(stove).unwrap();
        assert_eq!(state.occupant, Some(patty));
        assert!(state.is_cooking);
        assert_eq!(held(&world, player), None);
        assert_eq!(world.get::<&Item>(patty).unwrap().holder, Some(stove));
    }

    #[test]
    fn test_stove_pickup_clears_progress() {
        let content = content();
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let stove = world.spawn((Station::new(0, StationKind::Stove), Stove::default()));
        let patty = give(&mut world, player, &content, PATTY);
        interact(&mut world, player, stove);
        run(&mut world, &content);
        world.get::<&mut Stove>(stove).unwrap().progress = 2.5;

        interact(&mut world, player, stove);
        run(&mut world, &content);

        let state = *world.get::<&Stove>(stove).unwrap();
        assert_eq!(state.occupant, None);
        assert_eq!(state.progress, 0.0);
        assert!(!state.is_cooking);
        assert_eq!(held(&world, player), Some(patty));
    }

    #[test]
    fn test_vanished_occupant_clears_stove_and_station() {
        let content = content();
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let stove = world.spawn((Station::new(0, StationKind::Stove), Stove::default()));
        let patty = give(&mut world, player, &content, PATTY);
        interact(&mut world, player, stove);
        run(&mut world, &content);
        assert_eq!(world.get::<&Station>(stove).unwrap().placed_item, Some(patty));

        world.despawn(patty).unwrap();
        interact(&mut world, player, stove);
        run(&mut world, &content);

        let state = *world.get::<&Stove>(stove).unwrap();
        assert_eq!(state.occupant, None);
        assert!(!state.is_cooking);
        assert_eq!(world.get::<&Station>(stove).unwrap().placed_item, None);
        assert_eq!(held(&world, player), None);
        assert!(holder_mismatches(&world).is_empty());
    }

    #[test]
    fn test_trash_destroys_held_item() {
        let content = content();
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let trash = world.spawn((Station::new(0, StationKind::TrashCan), TrashCan));
        let bread = give(&mut world, player, &content, BREAD);

        interact(&mut world, player, trash);
        run(&mut world, &content);

        assert!(!world.contains(bread));
        assert_eq!(held(&world, player), None);
    }

    #[test]
    fn test_requests_for_other_kinds_are_ignored() {
        let content = content();
        let mut world = World::new();
        let player = spawn_player(&mut world);
        let trash = world.spawn((Station::new(0, StationKind::TrashCan), TrashCan));
        world
            .insert_one(
                player,
                InteractionRequest {
                    player,
                    station: trash,
                    station_kind: StationKind::ServingCounter,
                },
            )
            .unwrap();

        run(&mut world, &content);

        assert!(world.get::<&InteractionRequest>(player).is_ok());
    }
}
