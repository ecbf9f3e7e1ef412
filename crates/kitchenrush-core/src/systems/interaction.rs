//! Interaction dispatch - player movement, the optional built-in proximity
//! probe, and turning an interact tap into a one-tick request.

use hecs::{CommandBuffer, Entity, World};

use crate::components::{InteractionRequest, Player, PlayerInput, Station, Transform, Vec3};

/// Move players along their input vector and remember the facing direction.
pub fn player_movement_system(world: &mut World, delta_seconds: f32) {
    for (_, (player, input, transform)) in
        world.query_mut::<(&mut Player, &PlayerInput, &mut Transform)>()
    {
        let direction = Vec3::flat(input.movement[0], input.movement[1]);
        let length = direction.length();
        if length <= f32::EPSILON {
            continue;
        }
        // Diagonal input must not be faster than straight input.
        let direction = if length > 1.0 {
            direction.normalize()
        } else {
            direction
        };
        player.facing = direction.normalize();
        let speed = player.move_speed * player.speed_multiplier;
        transform.position = transform.position + direction * (speed * delta_seconds);
    }
}

/// Built-in stand-in for the proximity collaborator.
///
/// Picks the nearest station within `range` that lies in front of the
/// player's facing direction (ties go to the lower station id) and writes
/// it to `near_station`.
pub fn proximity_system(world: &mut World, range: f32) {
    let stations: Vec<(Entity, u32, Vec3)> = world
        .query::<(&Station, &Transform)>()
        .iter()
        .map(|(entity, (station, transform))| (entity, station.id, transform.position))
        .collect();
    let range_sq = range * range;

    for (_, (player, transform)) in world.query_mut::<(&mut Player, &Transform)>() {
        let mut best: Option<(f32, u32, Entity)> = None;
        for &(entity, id, position) in &stations {
            let mut offset = position - transform.position;
            offset.y = 0.0;
            let distance_sq = offset.dot(&offset);
            if distance_sq > range_sq {
                continue;
            }
            if distance_sq > f32::EPSILON && offset.normalize().dot(&player.facing) <= 0.0 {
                continue;
            }
            let closer = match best {
                None => true,
                Some((best_sq, best_id, _)) => {
                    distance_sq < best_sq || (distance_sq == best_sq && id < best_id)
                }
            };
            if closer {
                best = Some((distance_sq, id, entity));
            }
        }
        player.near_station = best.map(|(_, _, entity)| entity);
    }
}

/// Attach an [`InteractionRequest`] to every player that tapped interact
/// while near a station. Stale station handles are cleared instead.
pub fn interaction_dispatch_system(world: &mut World, cmd: &mut CommandBuffer) {
    let mut stale = Vec::new();

    for (entity, (player, input)) in world.query::<(&Player, &PlayerInput)>().iter() {
        if !input.interact_tapped {
            continue;
        }
        let Some(station) = player.near_station else {
            continue;
        };
        match world.get::<&Station>(station) {
            Ok(record) => cmd.insert_one(
                entity,
                InteractionRequest {
                    player: entity,
                    station,
                    station_kind: record.kind,
                },
            ),
            Err(_) => stale.push(entity),
        }
    }

    for entity in stale {
        log::debug!("player {entity:?} was near a station that no longer exists");
        if let Ok(mut player) = world.get::<&mut Player>(entity) {
            player.near_station = None;
        }
    }
}

/// Clear the one-shot input flags after a tick has consumed them.
pub fn clear_input_edges(world: &mut World) {
    for (_, input) in world.query_mut::<&mut PlayerInput>() {
        input.interact_tapped = false;
        input.interact_hold_started = false;
    }
}
