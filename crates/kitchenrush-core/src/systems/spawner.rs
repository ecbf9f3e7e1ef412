//! Customer spawner - emits customers at the stage's cadence until the
//! stage's customer cap is reached.

use hecs::{CommandBuffer, Entity, World};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::components::{Customer, EventQueue, KitchenEvent, Transform, Vec3};
use kitchenrush_logic::ids::IngredientId;
use kitchenrush_logic::stage::StageParams;

/// Spawner singleton, owned by the engine and re-seeded for every stage.
#[derive(Debug, Clone)]
pub struct CustomerSpawner {
    seed: u64,
    rng: StdRng,
    walk_speed: f32,
    spawn_point: Vec3,
    interval: f32,
    patience: f32,
    cap: u32,
    menu: Vec<IngredientId>,
    timer: f32,
    spawned: u32,
    next_id: u32,
}

impl CustomerSpawner {
    pub fn new(seed: u64, walk_speed: f32, spawn_point: Vec3) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            walk_speed,
            spawn_point,
            interval: f32::INFINITY,
            patience: 0.0,
            cap: 0,
            menu: Vec::new(),
            timer: 0.0,
            spawned: 0,
            next_id: 1,
        }
    }

    /// Load the parameters of stage `level`. The first customer arrives on
    /// the next spawner tick.
    pub fn configure(&mut self, level: u32, params: &StageParams, menu: &[IngredientId]) {
        self.rng = StdRng::seed_from_u64(self.seed.wrapping_add(u64::from(level)));
        self.interval = params.spawn_interval;
        self.patience = params.patience;
        self.cap = params.customer_cap;
        self.menu = menu.to_vec();
        self.timer = self.interval;
        self.spawned = 0;
        if self.menu.is_empty() {
            log::warn!("stage {level} has an empty menu; no customers will spawn");
        }
    }

    /// Stop spawning until the next `configure`.
    pub fn reset(&mut self) {
        self.cap = 0;
        self.spawned = 0;
        self.timer = 0.0;
        self.menu.clear();
    }

    pub fn set_spawn_point(&mut self, spawn_point: Vec3) {
        self.spawn_point = spawn_point;
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn is_exhausted(&self) -> bool {
        self.spawned >= self.cap
    }
}

/// Advance the spawn timer and queue at most one new customer.
pub fn customer_spawn_system(
    world: &World,
    spawner: &mut CustomerSpawner,
    delta_seconds: f32,
    cmd: &mut CommandBuffer,
) -> Option<Entity> {
    if spawner.is_exhausted() {
        return None;
    }
    spawner.timer += delta_seconds;
    if spawner.timer < spawner.interval {
        return None;
    }
    let dish = *spawner.menu.choose(&mut spawner.rng)?;
    spawner.timer -= spawner.interval;

    let customer = Customer::new(spawner.next_id, dish, spawner.patience, spawner.walk_speed);
    spawner.next_id += 1;
    spawner.spawned += 1;

    let mut events = EventQueue::default();
    events.push(KitchenEvent::CustomerSpawned { dish });

    let entity = world.reserve_entity();
    cmd.insert(entity, (customer, Transform::at(spawner.spawn_point), events));
    log::debug!(
        "spawned customer {} ({}/{}) ordering {dish:?}",
        customer.id,
        spawner.spawned,
        spawner.cap
    );
    Some(entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(cap: u32, interval: f32) -> StageParams {
        StageParams {
            customer_cap: cap,
            max_failures: 3,
            spawn_interval: interval,
            patience: 30.0,
            score_multiplier: 1.0,
            queue_capacity: 4,
            move_speed_multiplier: 1.0,
            cook_speed_multiplier: 1.0,
        }
    }

    fn run_for(world: &mut World, spawner: &mut CustomerSpawner, seconds: f32, dt: f32) -> u32 {
        let mut count = 0;
        let steps = (seconds / dt).round() as usize;
        for _ in 0..steps {
            let mut cmd = CommandBuffer::new();
            if customer_spawn_system(world, spawner, dt, &mut cmd).is_some() {
                count += 1;
            }
            cmd.run_on(world);
        }
        count
    }

    #[test]
    fn test_first_customer_is_immediate() {
        let mut world = World::new();
        let mut spawner = CustomerSpawner::new(7, 2.0, Vec3::ZERO);
        spawner.configure(0, &params(3, 10.0), &[IngredientId(5)]);

        assert_eq!(run_for(&mut world, &mut spawner, 0.5, 0.5), 1);
        assert_eq!(run_for(&mut world, &mut spawner, 9.0, 0.5), 0);
        assert_eq!(run_for(&mut world, &mut spawner, 1.0, 0.5), 1);
    }

    #[test]
    fn test_stops_at_cap() {
        let mut world = World::new();
        let mut spawner = CustomerSpawner::new(7, 2.0, Vec3::ZERO);
        spawner.configure(0, &params(2, 1.0), &[IngredientId(5)]);

        assert_eq!(run_for(&mut world, &mut spawner, 20.0, 0.5), 2);
        assert!(spawner.is_exhausted());
        assert_eq!(world.query::<&Customer>().iter().count(), 2);
    }

    #[test]
    fn test_same_seed_same_orders() {
        let menu = [IngredientId(5), IngredientId(6), IngredientId(8)];
        let orders = |seed: u64| {
            let mut world = World::new();
            let mut spawner = CustomerSpawner::new(seed, 2.0, Vec3::ZERO);
            spawner.configure(1, &params(6, 1.0), &menu);
            run_for(&mut world, &mut spawner, 6.0, 1.0);
            let mut dishes: Vec<(u32, IngredientId)> = world
                .query::<&Customer>()
                .iter()
                .map(|(_, c)| (c.id, c.ordered_dish))
                .collect();
            dishes.sort();
            dishes
        };
        assert_eq!(orders(42), orders(42));
    }

    #[test]
    fn test_spawned_customer_carries_event() {
        let mut world = World::new();
        let mut spawner = CustomerSpawner::new(1, 2.0, Vec3::flat(0.0, 9.0));
        spawner.configure(0, &params(1, 5.0), &[IngredientId(6)]);
        let mut cmd = CommandBuffer::new();
        let entity = customer_spawn_system(&world, &mut spawner, 0.1, &mut cmd).unwrap();
        cmd.run_on(&mut world);

        let events = world.get::<&EventQueue>(entity).unwrap().events().to_vec();
        assert_eq!(events, vec![KitchenEvent::CustomerSpawned { dish: IngredientId(6) }]);
        assert_eq!(world.get::<&Transform>(entity).unwrap().position.z, 9.0);
    }
}
