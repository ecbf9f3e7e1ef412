//! Cooking system - advances stove progress and moves occupants through
//! `Raw → Cooked → Burnt`.

use hecs::{Entity, World};

use crate::components::{emit, Cookable, Item, ItemState, KitchenEvent, Station, Stove};
use kitchenrush_logic::cooking::{settle, CookTransition};

enum StoveUpdate {
    /// Occupant handle went stale.
    Vacate,
    /// Occupant has no cook profile or is already burnt.
    Stop,
    Advance {
        item: Entity,
        progress: f32,
        state: ItemState,
        transitions: Vec<CookTransition>,
    },
}

/// Advance every cooking stove by `delta_seconds` scaled by its cook speed.
pub fn cooking_system(world: &mut World, delta_seconds: f32) {
    let mut updates: Vec<(Entity, StoveUpdate)> = Vec::new();

    for (entity, stove) in world.query::<&Stove>().iter() {
        if !stove.is_cooking {
            continue;
        }
        let update = match stove.occupant {
            None => StoveUpdate::Stop,
            Some(item) if !world.contains(item) => StoveUpdate::Vacate,
            Some(item) => {
                let state = world.get::<&Item>(item).map(|i| i.state).ok();
                let profile = world.get::<&Cookable>(item).map(|c| c.profile).ok();
                match (state, profile) {
                    (Some(state), Some(profile)) if state != ItemState::Burnt => {
                        let progress = stove.progress + delta_seconds * stove.cook_speed;
                        let (state, transitions) = settle(state, progress, &profile);
                        StoveUpdate::Advance {
                            item,
                            progress,
                            state,
                            transitions,
                        }
                    }
                    _ => StoveUpdate::Stop,
                }
            }
        };
        updates.push((entity, update));
    }

    for (stove_entity, update) in updates {
        match update {
            StoveUpdate::Vacate => {
                log::debug!("stove {stove_entity:?} lost its occupant");
                if let Ok(mut stove) = world.get::<&mut Stove>(stove_entity) {
                    stove.clear();
                }
                if let Ok(mut station) = world.get::<&mut Station>(stove_entity) {
                    station.placed_item = None;
                }
            }
            StoveUpdate::Stop => {
                if let Ok(mut stove) = world.get::<&mut Stove>(stove_entity) {
                    stove.is_cooking = false;
                }
            }
            StoveUpdate::Advance {
                item,
                progress,
                state,
                transitions,
            } => {
                let burnt = state == ItemState::Burnt;
                if let Ok(mut stove) = world.get::<&mut Stove>(stove_entity) {
                    stove.progress = progress;
                    if burnt {
                        stove.is_cooking = false;
                    }
                }
                if let Ok(mut cookable) = world.get::<&mut Cookable>(item) {
                    cookable.progress = progress;
                }
                if let Ok(mut record) = world.get::<&mut Item>(item) {
                    record.state = state;
                }
                for transition in transitions {
                    let event = match transition {
                        CookTransition::Cooked => KitchenEvent::ItemCooked { item },
                        CookTransition::Burnt => KitchenEvent::ItemBurned { item },
                        CookTransition::Hold => continue,
                    };
                    emit(world, stove_entity, event);
                }
                if burnt {
                    emit(world, stove_entity, KitchenEvent::StopCooking { item });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{EventQueue, StationKind};
    use kitchenrush_logic::ids::IngredientId;
    use kitchenrush_logic::item::CookProfile;

    fn cooking_stove(world: &mut World, burn_time: f32) -> (Entity, Entity) {
        let stove_entity = world.reserve_entity();
        let item = world.spawn((
            Item::new(Default::default(), IngredientId(2), ItemState::Raw).held_by(stove_entity),
            Cookable::new(CookProfile::new(5.0, burn_time)),
        ));
        let stove = Stove {
            occupant: Some(item),
            is_cooking: true,
            ..Default::default()
        };
        let mut station = Station::new(0, StationKind::Stove);
        station.placed_item = Some(item);
        world
            .insert(stove_entity, (station, stove, EventQueue::default()))
            .unwrap();
        (stove_entity, item)
    }

    fn tick(world: &mut World, seconds: f32, dt: f32) {
        let steps = (seconds / dt).round() as usize;
        for _ in 0..steps {
            cooking_system(world, dt);
        }
    }

    #[test]
    fn test_cooks_then_burns() {
        let mut world = World::new();
        let (stove, item) = cooking_stove(&mut world, 3.0);

        tick(&mut world, 5.0, 0.5);
        assert_eq!(world.get::<&Item>(item).unwrap().state, ItemState::Cooked);
        assert!(world.get::<&Stove>(stove).unwrap().is_cooking);

        tick(&mut world, 3.0, 0.5);
        assert_eq!(world.get::<&Item>(item).unwrap().state, ItemState::Burnt);
        assert!(!world.get::<&Stove>(stove).unwrap().is_cooking);
    }

    #[test]
    fn test_progress_is_mirrored_on_item() {
        let mut world = World::new();
        let (stove, item) = cooking_stove(&mut world, 3.0);

        tick(&mut world, 2.0, 0.25);

        let stove_progress = world.get::<&Stove>(stove).unwrap().progress;
        let item_progress = world.get::<&Cookable>(item).unwrap().progress;
        assert_eq!(stove_progress, item_progress);
        assert!((stove_progress - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_cook_speed_scales_progress() {
        let mut world = World::new();
        let (stove, item) = cooking_stove(&mut world, 3.0);
        world.get::<&mut Stove>(stove).unwrap().cook_speed = 2.0;

        tick(&mut world, 2.5, 0.5);

        assert_eq!(world.get::<&Item>(item).unwrap().state, ItemState::Cooked);
    }

    #[test]
    fn test_zero_burn_time_keeps_cooking() {
        let mut world = World::new();
        let (stove, item) = cooking_stove(&mut world, 0.0);

        tick(&mut world, 60.0, 1.0);

        assert_eq!(world.get::<&Item>(item).unwrap().state, ItemState::Cooked);
        assert!(world.get::<&Stove>(stove).unwrap().is_cooking);
    }

    #[test]
    fn test_large_step_reports_both_transitions() {
        let mut world = World::new();
        let (stove, item) = cooking_stove(&mut world, 3.0);

        cooking_system(&mut world, 10.0);

        assert_eq!(world.get::<&Item>(item).unwrap().state, ItemState::Burnt);
        let events = world.get::<&EventQueue>(stove).unwrap().events().to_vec();
        assert_eq!(
            events,
            vec![
                KitchenEvent::ItemCooked { item },
                KitchenEvent::ItemBurned { item },
                KitchenEvent::StopCooking { item },
            ]
        );
    }

    #[test]
    fn test_stale_occupant_clears_stove() {
        let mut world = World::new();
        let (stove, item) = cooking_stove(&mut world, 3.0);
        world.despawn(item).unwrap();

        cooking_system(&mut world, 1.0);

        let state = *world.get::<&Stove>(stove).unwrap();
        assert!(!state.is_cooking);
        assert_eq!(state.occupant, None);
        assert_eq!(world.get::<&Station>(stove).unwrap().placed_item, None);
    }

    #[test]
    fn test_missing_profile_stops_cooking() {
        let mut world = World::new();
        let (stove, item) = cooking_stove(&mut world, 3.0);
        world.remove_one::<Cookable>(item).unwrap();

        cooking_system(&mut world, 1.0);

        let state = *world.get::<&Stove>(stove).unwrap();
        assert!(!state.is_cooking);
        assert_eq!(state.occupant, Some(item));
    }
}
