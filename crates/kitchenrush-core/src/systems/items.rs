//! Item helpers shared by the interaction systems: spawning, holder transfer
//! and station detachment.

use hecs::{CommandBuffer, Entity, World};

use crate::components::{
    emit, Container, Cookable, Counter, InteractionRequest, Item, ItemState, KitchenEvent,
    Player, Station, StationKind, Stove, Transform, Vec3,
};
use crate::content::Content;
use kitchenrush_logic::ids::IngredientId;
use kitchenrush_logic::item::IngredientKey;

/// What a station offers to a held item when looking for a recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exposed {
    /// A container's fixed supply. Nothing to destroy.
    Supply(IngredientKey),
    /// A real item resting on the station.
    Item(Entity, IngredientKey),
}

impl Exposed {
    pub fn key(&self) -> IngredientKey {
        match self {
            Exposed::Supply(key) | Exposed::Item(_, key) => *key,
        }
    }
}

/// The item (or supply) a station currently exposes.
pub fn exposed_item(world: &World, station: Entity) -> Option<Exposed> {
    let kind = world.get::<&Station>(station).ok()?.kind;
    match kind {
        StationKind::Container => {
            let container = world.get::<&Container>(station).ok()?;
            Some(Exposed::Supply(IngredientKey::raw(container.ingredient)))
        }
        StationKind::Counter => {
            let top = world.get::<&Counter>(station).ok()?.top()?;
            live_item(world, top)
        }
        StationKind::Stove => {
            let occupant = world.get::<&Stove>(station).ok()?.occupant?;
            live_item(world, occupant)
        }
        StationKind::ServingCounter | StationKind::TrashCan => None,
    }
}

fn live_item(world: &World, entity: Entity) -> Option<Exposed> {
    let item = world.get::<&Item>(entity).ok()?;
    Some(Exposed::Item(entity, item.key()))
}

/// The player's held item, clearing the field if the handle went stale.
pub fn held_item(world: &World, player: Entity) -> Option<Entity> {
    let mut player = world.get::<&mut Player>(player).ok()?;
    let held = player.held_item?;
    if world.get::<&Item>(held).is_ok() {
        Some(held)
    } else {
        log::debug!("clearing stale held item {held:?}");
        player.held_item = None;
        None
    }
}

/// Set the player's held item.
pub fn set_held(world: &World, player: Entity, item: Option<Entity>) {
    if let Ok(mut player) = world.get::<&mut Player>(player) {
        player.held_item = item;
    }
}

/// Point an item's `holder` at a new owner.
pub fn set_holder(world: &World, item: Entity, holder: Option<Entity>) {
    if let Ok(mut item) = world.get::<&mut Item>(item) {
        item.holder = holder;
    }
}

/// World position of an entity, or the origin if it has none.
pub fn position_of(world: &World, entity: Entity) -> Vec3 {
    world
        .get::<&Transform>(entity)
        .map(|t| t.position)
        .unwrap_or(Vec3::ZERO)
}

/// Move an item's transform to `position`.
pub fn place_at(world: &World, item: Entity, position: Vec3) {
    if let Ok(mut transform) = world.get::<&mut Transform>(item) {
        transform.position = position;
    }
}

/// Record a rejected interaction. State is left untouched.
pub fn reject(world: &World, request: &InteractionRequest, reason: &str) {
    log::debug!(
        "rejected {:?} interaction at {:?}: {reason}",
        request.station_kind,
        request.station
    );
    emit(world, request.player, KitchenEvent::InteractionRejected);
}

/// Queue creation of a new item held by `holder`. The returned handle is
/// reserved immediately and becomes live at the next command playback.
pub fn spawn_item(
    world: &World,
    cmd: &mut CommandBuffer,
    content: &Content,
    ingredient: IngredientId,
    state: ItemState,
    holder: Entity,
) -> Entity {
    let def = content.ingredient(ingredient);
    let kind = def.map(|d| d.kind).unwrap_or_default();
    let item = Item::new(kind, ingredient, state).held_by(holder);
    let transform = Transform::at(position_of(world, holder));

    let entity = world.reserve_entity();
    match def.and_then(|d| d.cook) {
        Some(profile) => cmd.insert(entity, (item, Cookable::new(profile), transform)),
        None => cmd.insert(entity, (item, transform)),
    }
    entity
}

/// Remove `item` from the station's native structure: pop it off a counter
/// or clear a stove. Returns whether the item was found there.
pub fn detach_from_station(world: &World, station: Entity, item: Entity) -> bool {
    let Ok(mut record) = world.get::<&mut Station>(station) else {
        return false;
    };
    match record.kind {
        StationKind::Counter => {
            let Ok(mut counter) = world.get::<&mut Counter>(station) else {
                return false;
            };
            if counter.top() != Some(item) {
                return false;
            }
            counter.stack.pop();
            record.placed_item = counter.top();
            true
        }
        StationKind::Stove => {
            let Ok(mut stove) = world.get::<&mut Stove>(station) else {
                return false;
            };
            if stove.occupant != Some(item) {
                return false;
            }
            stove.clear();
            record.placed_item = None;
            true
        }
        _ => false,
    }
}

/// Live requests tagged for `kind`, in player iteration order.
pub fn pending_requests(world: &World, kind: StationKind) -> Vec<(Entity, InteractionRequest)> {
    world
        .query::<&InteractionRequest>()
        .iter()
        .filter(|(_, request)| request.station_kind == kind)
        .map(|(entity, request)| (entity, *request))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_item_clears_stale_handle() {
        let mut world = World::new();
        let item = world.spawn((Item::new(
            Default::default(),
            IngredientId(1),
            ItemState::Raw,
        ),));
        let player = world.spawn((Player {
            held_item: Some(item),
            ..Default::default()
        },));
        world.despawn(item).unwrap();

        assert_eq!(held_item(&world, player), None);
        assert_eq!(world.get::<&Player>(player).unwrap().held_item, None);
    }

    #[test]
    fn test_detach_only_pops_top() {
        let mut world = World::new();
        let a = world.spawn((1u8,));
        let b = world.spawn((2u8,));
        let mut counter = Counter::new(4);
        counter.stack = vec![a, b];
        let mut station = Station::new(0, StationKind::Counter);
        station.placed_item = Some(b);
        let counter_entity = world.spawn((station, counter));

        assert!(!detach_from_station(&world, counter_entity, a));
        assert!(detach_from_station(&world, counter_entity, b));
        assert_eq!(world.get::<&Counter>(counter_entity).unwrap().stack, vec![a]);
        assert_eq!(world.get::<&Station>(counter_entity).unwrap().placed_item, Some(a));
    }

    #[test]
    fn test_container_exposes_raw_supply() {
        let mut world = World::new();
        let station = world.spawn((
            Station::new(0, StationKind::Container),
            Container::new(IngredientId(4)),
        ));
        assert_eq!(
            exposed_item(&world, station),
            Some(Exposed::Supply(IngredientKey::raw(IngredientId(4))))
        );
    }
}
