//! Customer lifecycle - line selection, walking to the queue, patience,
//! leaving and queue compaction.
//!
//! ```text
//! Spawned → FindingLine → MovingToLine → WaitingInQueue | Ordering
//!         → WaitingLate → LeavingHappy | LeavingAngry → removed
//! ```

use hecs::{CommandBuffer, Entity, World};

use crate::components::{
    emit, Customer, CustomerState, KitchenEvent, ServingCounter, Station, Transform, Vec3,
};
use kitchenrush_logic::session::GameSession;

/// Seconds a leaving customer lingers before removal.
pub const LEAVE_DURATION: f32 = 3.0;
/// Patience fraction below which a waiting customer turns impatient.
pub const IMPATIENT_RATIO: f32 = 0.3;
/// Squared distance at which a walking customer counts as arrived.
pub const ARRIVAL_EPSILON_SQ: f32 = 0.0025;

/// Route fresh customers to the shortest serving line with room.
///
/// Customers are considered in id order; lines are compared on
/// `queue_count`, ties going to the lower station id. Customers that find
/// no room stay in `FindingLine` and retry next tick.
pub fn find_line_system(world: &mut World) {
    for (_, customer) in world.query_mut::<&mut Customer>() {
        if customer.state == CustomerState::Spawned {
            customer.state = CustomerState::FindingLine;
        }
    }

    let mut seekers: Vec<(u32, Entity)> = world
        .query::<&Customer>()
        .iter()
        .filter(|(_, c)| c.state == CustomerState::FindingLine)
        .map(|(entity, c)| (c.id, entity))
        .collect();
    if seekers.is_empty() {
        return;
    }
    seekers.sort_unstable();

    let mut lines: Vec<(u32, Entity)> = world
        .query::<(&Station, &ServingCounter)>()
        .iter()
        .map(|(entity, (station, _))| (station.id, entity))
        .collect();
    lines.sort_unstable();

    for (_, customer) in seekers {
        let mut best: Option<(u32, Entity)> = None;
        for &(_, station) in &lines {
            let Ok(serving) = world.get::<&ServingCounter>(station) else {
                continue;
            };
            if !serving.has_room() {
                continue;
            }
            if best.map_or(true, |(count, _)| serving.queue_count < count) {
                best = Some((serving.queue_count, station));
            }
        }
        let Some((index, station)) = best else {
            continue;
        };

        if let Ok(mut serving) = world.get::<&mut ServingCounter>(station) {
            serving.queue_count += 1;
        }
        if let Ok(mut record) = world.get::<&mut Customer>(customer) {
            record.target_station = Some(station);
            record.queue_index = index;
            record.state = CustomerState::MovingToLine;
        }
        emit(world, customer, KitchenEvent::CustomerJoinedQueue { station, index });
    }
}

/// World position of queue slot `index` at `station`.
pub fn queue_position(world: &World, station: Entity, index: u32) -> Option<Vec3> {
    let serving = world.get::<&ServingCounter>(station).ok()?;
    let anchor = world
        .get::<&Transform>(station)
        .map(|t| *t)
        .unwrap_or_default();
    Some(anchor.local_to_world(serving.queue_offset(index)))
}

/// Walk customers toward their queue slot and settle them on arrival.
pub fn queue_movement_system(world: &mut World, delta_seconds: f32) {
    let mut moves: Vec<(Entity, Option<(Vec3, bool)>)> = Vec::new();

    for (entity, (customer, transform)) in world.query::<(&Customer, &Transform)>().iter() {
        if customer.state != CustomerState::MovingToLine {
            continue;
        }
        let target = customer
            .target_station
            .and_then(|station| queue_position(world, station, customer.queue_index));
        let Some(target) = target else {
            moves.push((entity, None));
            continue;
        };

        let offset = target - transform.position;
        let distance = offset.length();
        let step = customer.walk_speed * delta_seconds;
        let arrived = step >= distance
            || offset.dot(&offset) < ARRIVAL_EPSILON_SQ;
        let position = if arrived {
            target
        } else {
            transform.position + offset.normalize() * step
        };
        moves.push((entity, Some((position, arrived))));
    }

    for (entity, movement) in moves {
        let Some((position, arrived)) = movement else {
            log::debug!("customer {entity:?} lost its line; searching again");
            if let Ok(mut customer) = world.get::<&mut Customer>(entity) {
                customer.target_station = None;
                customer.state = CustomerState::FindingLine;
            }
            continue;
        };

        if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
            transform.position = position;
        }
        if !arrived {
            continue;
        }
        let ordering = match world.get::<&mut Customer>(entity) {
            Ok(mut customer) => {
                customer.state = if customer.queue_index == 0 {
                    CustomerState::Ordering
                } else {
                    CustomerState::WaitingInQueue
                };
                (customer.state == CustomerState::Ordering).then_some(customer.ordered_dish)
            }
            Err(_) => None,
        };
        if let Some(dish) = ordering {
            emit(world, entity, KitchenEvent::CustomerOrdering { dish });
        }
    }
}

/// Drain patience of waiting customers; an empty patience bar is a failure.
pub fn patience_system(world: &mut World, session: &mut GameSession, delta_seconds: f32) {
    let mut events = Vec::new();

    for (entity, customer) in world.query_mut::<&mut Customer>() {
        if !customer.state.is_waiting() {
            continue;
        }
        let ratio_before = customer.patience_ratio();
        customer.patience -= delta_seconds;
        if customer.patience <= 0.0 {
            customer.patience = 0.0;
            customer.state = CustomerState::LeavingAngry;
            customer.leave_timer = None;
            session.record_failure();
            events.push((entity, KitchenEvent::CustomerLeftAngry));
        } else if customer.patience_ratio() < IMPATIENT_RATIO
            && customer.state != CustomerState::WaitingLate
        {
            customer.state = CustomerState::WaitingLate;
            // Re-entering after compaction does not announce again.
            if ratio_before >= IMPATIENT_RATIO {
                events.push((entity, KitchenEvent::CustomerImpatient));
            }
        }
    }

    for (entity, event) in events {
        emit(world, entity, event);
    }
}

/// Count down leave timers and remove customers whose timer ran out,
/// compacting the line behind them.
pub fn leaving_system(
    world: &mut World,
    delta_seconds: f32,
    leave_duration: f32,
    cmd: &mut CommandBuffer,
) {
    let mut departed: Vec<(u32, Entity)> = Vec::new();

    for (entity, customer) in world.query_mut::<&mut Customer>() {
        if !customer.state.is_leaving() {
            continue;
        }
        match customer.leave_timer {
            None => customer.leave_timer = Some(leave_duration),
            Some(remaining) => {
                let remaining = remaining - delta_seconds;
                customer.leave_timer = Some(remaining);
                if remaining <= 0.0 {
                    departed.push((customer.id, entity));
                }
            }
        }
    }
    departed.sort_unstable();

    for (_, entity) in departed {
        remove_from_line(world, entity);
        cmd.despawn(entity);
    }
}

/// Release `customer`'s slot: decrement the line's count and move everyone
/// behind it forward by one.
fn remove_from_line(world: &mut World, customer: Entity) {
    let (station, index) = match world.get::<&mut Customer>(customer) {
        Ok(mut record) => match record.target_station.take() {
            Some(station) => (station, record.queue_index),
            None => return,
        },
        Err(_) => return,
    };

    if let Ok(mut serving) = world.get::<&mut ServingCounter>(station) {
        serving.queue_count = serving.queue_count.saturating_sub(1);
    }

    for (_, other) in world.query_mut::<&mut Customer>() {
        if other.target_station != Some(station) || other.queue_index <= index {
            continue;
        }
        other.queue_index -= 1;
        if matches!(
            other.state,
            CustomerState::WaitingInQueue | CustomerState::WaitingLate
        ) {
            other.state = CustomerState::MovingToLine;
        }
    }
}

/// Run the whole customer lifecycle for one tick.
pub fn customer_system(
    world: &mut World,
    session: &mut GameSession,
    delta_seconds: f32,
    leave_duration: f32,
    cmd: &mut CommandBuffer,
) {
    find_line_system(world);
    queue_movement_system(world, delta_seconds);
    patience_system(world, session, delta_seconds);
    leaving_system(world, delta_seconds, leave_duration, cmd);
}
