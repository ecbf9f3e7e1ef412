//! Serving - hands the held dish to the customer at the front of a line.

use hecs::{CommandBuffer, Entity, World};

use super::items::{held_item, pending_requests, reject, set_held};
use crate::components::{
    emit, Customer, CustomerState, InteractionRequest, Item, KitchenEvent, StationKind,
};
use kitchenrush_logic::session::GameSession;

/// The customer at queue index 0 of `station`, if any.
pub fn front_customer(world: &World, station: Entity) -> Option<Entity> {
    world
        .query::<&Customer>()
        .iter()
        .filter(|(_, customer)| customer.target_station == Some(station) && customer.is_front())
        .min_by_key(|(_, customer)| customer.id)
        .map(|(entity, _)| entity)
}

/// Serve the front customer of each requested serving counter.
///
/// A dish matching the order is destroyed, the customer leaves happy and
/// the session scores `reward`. A mismatch changes nothing.
pub fn serving_system(
    world: &mut World,
    session: &mut GameSession,
    reward: u32,
    cmd: &mut CommandBuffer,
) {
    for (player, request) in pending_requests(world, StationKind::ServingCounter) {
        cmd.remove_one::<InteractionRequest>(player);

        let Some(held) = held_item(world, player) else {
            reject(world, &request, "nothing to serve");
            continue;
        };
        let Some(customer) = front_customer(world, request.station) else {
            reject(world, &request, "no customer at the counter");
            continue;
        };
        let offered = match world.get::<&Item>(held) {
            Ok(item) => item.ingredient,
            Err(_) => continue,
        };

        let ordered = match world.get::<&mut Customer>(customer) {
            Ok(mut record) if record.ordered_dish == offered => {
                record.state = CustomerState::LeavingHappy;
                record.patience = 0.0;
                record.leave_timer = None;
                Some(record.ordered_dish)
            }
            _ => None,
        };

        let Some(dish) = ordered else {
            reject(world, &request, "dish does not match the order");
            emit(world, player, KitchenEvent::ServeRejected { offered });
            continue;
        };

        cmd.despawn(held);
        set_held(world, player, None);
        let points = session.record_serve(reward);
        log::debug!("served dish {dish:?} for {points} points");

        emit(world, player, KitchenEvent::ServeSuccess { dish, points });
        emit(world, request.station, KitchenEvent::ServeSuccess { dish, points });
        emit(world, customer, KitchenEvent::CustomerLeftHappy);
    }
}
