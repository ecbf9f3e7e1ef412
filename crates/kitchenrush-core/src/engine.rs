//! Simulation engine - owns the world and runs the fixed per-tick schedule.
//!
//! Tick order:
//!
//! 1. stage setup (buffs, once per stage)
//! 2. player movement and the optional proximity probe
//! 3. while playing: dispatch, recipe resolution, station handlers,
//!    serving, cooking, spawning, customer lifecycle
//! 4. clear one-shot input
//! 5. session watcher, then run progression on a transition
//!
//! Structural changes are recorded into one [`CommandBuffer`] and played
//! back after each phase that writes them.

use hecs::{CommandBuffer, Entity, World};
use thiserror::Error;

use crate::components::*;
use crate::content::{Content, ContentError};
use crate::generation::{build_kitchen, KitchenConfig, KitchenLayout};
use crate::systems::*;
use kitchenrush_logic::effects::Loadout;
use kitchenrush_logic::run::{RunPhase, RunProgress, RunStep};
use kitchenrush_logic::session::{GameSession, SessionState, SERVE_REWARD};
use kitchenrush_logic::stage::StageParams;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("kitchen has not been built")]
    NoKitchen,
    #[error("run has not been started")]
    RunNotStarted,
    #[error("no reward is pending")]
    NoRewardPending,
    #[error("reward choice {pick} is out of range ({offered} offered)")]
    InvalidRewardChoice { pick: usize, offered: usize },
    #[error("stage {0} does not exist")]
    UnknownStage(usize),
    #[error("entity {0:?} is not a player")]
    NotAPlayer(Entity),
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Engine knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Seed for dish selection and reward offers.
    pub seed: u64,
    pub time_scale: f32,
    /// Range of the built-in proximity probe. `None` leaves `near_station`
    /// to an external collaborator.
    pub proximity_range: Option<f32>,
    pub customer_walk_speed: f32,
    /// Seconds a leaving customer lingers before removal.
    pub leave_duration: f32,
    /// Base points for a served dish before the score multiplier.
    pub serve_reward: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0x6b69_7463_6865_6e21,
            time_scale: 1.0,
            proximity_range: Some(1.8),
            customer_walk_speed: 3.0,
            leave_duration: LEAVE_DURATION,
            serve_reward: SERVE_REWARD,
        }
    }
}

/// Main simulation engine
pub struct KitchenEngine {
    /// ECS world containing all entities
    pub world: World,
    pub content: Content,
    pub session: GameSession,
    run: RunProgress,
    spawner: CustomerSpawner,
    layout: Option<KitchenLayout>,
    params: Option<StageParams>,
    config: EngineConfig,
    commands: CommandBuffer,
    tick: u64,
    sim_time: f64,
}

impl KitchenEngine {
    pub fn new(content: Content, config: EngineConfig) -> Self {
        Self {
            world: World::new(),
            content,
            session: GameSession::new(),
            run: RunProgress::new(Loadout::default(), config.seed),
            spawner: CustomerSpawner::new(config.seed, config.customer_walk_speed, Vec3::ZERO),
            layout: None,
            params: None,
            config,
            commands: CommandBuffer::new(),
            tick: 0,
            sim_time: 0.0,
        }
    }

    /// Engine over the bundled content.
    pub fn with_builtin_content(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::new(Content::builtin()?, config))
    }

    /// Replace the world with a freshly built kitchen.
    pub fn build_kitchen(&mut self, kitchen: &KitchenConfig) -> Result<&KitchenLayout, EngineError> {
        self.world.clear();
        self.session.restart();
        self.run.restart();
        self.params = None;
        let layout = build_kitchen(&mut self.world, kitchen, &self.content)?;
        self.spawner.reset();
        self.spawner.set_spawn_point(layout.customer_spawn);
        Ok(self.layout.insert(layout))
    }

    pub fn layout(&self) -> Option<&KitchenLayout> {
        self.layout.as_ref()
    }

    pub fn player(&self) -> Result<Entity, EngineError> {
        self.layout
            .as_ref()
            .map(|layout| layout.player)
            .ok_or(EngineError::NoKitchen)
    }

    /// Station entity by floor-plan name.
    pub fn station(&self, name: &str) -> Option<Entity> {
        self.layout.as_ref()?.station(name)
    }

    /// Start a new run with `loadout` and enter the first stage.
    pub fn start_run(&mut self, loadout: Loadout) -> Result<RunStep, EngineError> {
        if self.layout.is_none() {
            return Err(EngineError::NoKitchen);
        }
        self.content.check_loadout(&loadout)?;
        self.run.set_loadout(loadout);
        let step = self.run.start();
        log::info!("run started");
        self.follow(&step)?;
        Ok(step)
    }

    /// Grant the offered reward at `pick` and start the next stage.
    pub fn choose_reward(&mut self, pick: usize) -> Result<RunStep, EngineError> {
        let offered = match self.run.phase() {
            RunPhase::AwaitingReward { offers } => offers.len(),
            RunPhase::NotStarted => return Err(EngineError::RunNotStarted),
            _ => return Err(EngineError::NoRewardPending),
        };
        let step = self
            .run
            .choose_reward(pick, &self.content.tables)
            .ok_or(EngineError::InvalidRewardChoice { pick, offered })?;
        self.follow(&step)?;
        Ok(step)
    }

    /// Back to the `Ready` baseline: session counters, buffs and the floor
    /// are reset; the world and kitchen are kept.
    pub fn restart(&mut self) {
        self.session.restart();
        self.run.restart();
        self.spawner.reset();
        self.params = None;
        let capacity = self
            .world
            .query::<&ServingCounter>()
            .iter()
            .map(|(_, serving)| serving.max_queue_capacity)
            .next()
            .unwrap_or(1);
        self.reset_floor(capacity);
        log::info!("run restarted");
    }

    /// Advance the simulation by `delta_seconds` of real time.
    ///
    /// Returns the run step when the session reached a terminal state this
    /// tick.
    pub fn update(&mut self, delta_seconds: f32) -> Option<RunStep> {
        let dt = delta_seconds * self.config.time_scale;
        self.tick += 1;
        self.sim_time += f64::from(dt);
        if self.layout.is_none() {
            return None;
        }

        if let Some(params) = self.params {
            stage_setup_system(&mut self.world, &mut self.session, &params);
        }

        player_movement_system(&mut self.world, dt);
        if let Some(range) = self.config.proximity_range {
            proximity_system(&mut self.world, range);
        }

        if self.session.is_playing() {
            let world = &mut self.world;
            let cmd = &mut self.commands;

            interaction_dispatch_system(world, cmd);
            cmd.run_on(world);

            recipe_resolution_system(world, &self.content, cmd);
            cmd.run_on(world);

            container_system(world, &self.content, cmd);
            counter_system(world, cmd);
            stove_system(world, cmd);
            trash_system(world, cmd);
            serving_system(world, &mut self.session, self.config.serve_reward, cmd);
            cmd.run_on(world);

            cooking_system(world, dt);

            customer_spawn_system(world, &mut self.spawner, dt, cmd);
            cmd.run_on(world);

            customer_system(world, &mut self.session, dt, self.config.leave_duration, cmd);
            cmd.run_on(world);
        }

        clear_input_edges(&mut self.world);

        let step = match self.session.evaluate()? {
            SessionState::StageClear => {
                log::info!(
                    "stage {} cleared: score {}, failures {}",
                    self.session.stage_level,
                    self.session.score,
                    self.session.current_failures
                );
                self.run.on_stage_clear(&self.session, &self.content.tables)
            }
            SessionState::GameOver => {
                log::info!(
                    "game over in stage {} after {} failures",
                    self.session.stage_level,
                    self.session.current_failures
                );
                self.run.on_game_over(&self.session)
            }
            SessionState::Ready | SessionState::Playing => return None,
        };
        if let Err(err) = self.follow(&step) {
            log::warn!("could not follow {step:?}: {err}");
        }
        Some(step)
    }

    /// Act on a run step: start the stage it names, or idle the spawner.
    fn follow(&mut self, step: &RunStep) -> Result<(), EngineError> {
        match step {
            RunStep::StartStage(index) => self.begin_stage(*index),
            RunStep::AwaitReward(offers) => {
                log::info!("awaiting reward choice from {} offers", offers.len());
                self.spawner.reset();
                Ok(())
            }
            RunStep::Finished(outcome) => {
                log::info!(
                    "run finished: victory {}, score {}",
                    outcome.victory,
                    outcome.total_score
                );
                self.spawner.reset();
                Ok(())
            }
        }
    }

    /// Reset the floor and enter `Playing` for stage `index`.
    fn begin_stage(&mut self, index: usize) -> Result<(), EngineError> {
        let stage = self
            .content
            .tables
            .stage(index)
            .ok_or(EngineError::UnknownStage(index))?;
        let params = self
            .run
            .stage_params(&self.content.tables)
            .ok_or(EngineError::UnknownStage(index))?;

        self.spawner.configure(index as u32, &params, &stage.menu);
        log::info!(
            "stage {index} '{}': {} customers, {} failures allowed",
            stage.name,
            params.customer_cap,
            params.max_failures
        );
        self.reset_floor(params.queue_capacity);
        self.session.begin_stage(index as u32, &params);
        self.params = Some(params);
        Ok(())
    }

    /// Remove customers and items, empty every station, drop buff speeds
    /// back to 1.0 and push the queue capacity to all serving counters.
    fn reset_floor(&mut self, queue_capacity: u32) {
        let leftovers: Vec<Entity> = self
            .world
            .query::<()>()
            .with::<&Customer>()
            .iter()
            .chain(self.world.query::<()>().with::<&Item>().iter())
            .map(|(entity, _)| entity)
            .collect();
        for entity in leftovers {
            let _ = self.world.despawn(entity);
        }

        for (_, station) in self.world.query_mut::<&mut Station>() {
            station.placed_item = None;
        }
        for (_, counter) in self.world.query_mut::<&mut Counter>() {
            counter.stack.clear();
        }
        for (_, stove) in self.world.query_mut::<&mut Stove>() {
            stove.clear();
            stove.cook_speed = 1.0;
        }
        for (_, serving) in self.world.query_mut::<&mut ServingCounter>() {
            serving.queue_count = 0;
            serving.max_queue_capacity = queue_capacity;
        }

        let spawn = self
            .layout
            .as_ref()
            .map(|layout| layout.player_spawn)
            .unwrap_or(Vec3::ZERO);
        for (_, (player, input, transform)) in
            self.world
                .query_mut::<(&mut Player, &mut PlayerInput, &mut Transform)>()
        {
            player.held_item = None;
            player.near_station = None;
            player.speed_multiplier = 1.0;
            *input = PlayerInput::default();
            transform.position = spawn;
        }

        let requests: Vec<Entity> = self
            .world
            .query::<&InteractionRequest>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        for entity in requests {
            let _ = self.world.remove_one::<InteractionRequest>(entity);
        }
    }

    /// Replace the player's input for the next tick.
    pub fn set_input(&mut self, input: PlayerInput) -> Result<(), EngineError> {
        let player = self.player()?;
        let mut current = self
            .world
            .get::<&mut PlayerInput>(player)
            .map_err(|_| EngineError::NotAPlayer(player))?;
        *current = input;
        Ok(())
    }

    /// Tap interact on the next tick.
    pub fn tap(&mut self) -> Result<(), EngineError> {
        self.set_input(PlayerInput::tap())
    }

    /// Write the proximity result directly, standing in for an external
    /// detection collaborator.
    pub fn set_near_station(&mut self, station: Option<Entity>) -> Result<(), EngineError> {
        let player = self.player()?;
        let mut record = self
            .world
            .get::<&mut Player>(player)
            .map_err(|_| EngineError::NotAPlayer(player))?;
        record.near_station = station;
        Ok(())
    }

    /// Drain every per-entity event queue.
    pub fn drain_events(&mut self) -> Vec<(Entity, KitchenEvent)> {
        drain_events(&mut self.world)
    }

    /// The item the player is holding, with its record.
    pub fn held_item(&self) -> Option<(Entity, Item)> {
        let player = self.player().ok()?;
        let held = self.world.get::<&Player>(player).ok()?.held_item?;
        let item = *self.world.get::<&Item>(held).ok()?;
        Some((held, item))
    }

    pub fn customers(&self) -> Vec<(Entity, Customer)> {
        let mut customers: Vec<(Entity, Customer)> = self
            .world
            .query::<&Customer>()
            .iter()
            .map(|(entity, customer)| (entity, *customer))
            .collect();
        customers.sort_by_key(|(_, customer)| customer.id);
        customers
    }

    pub fn customer_count(&self) -> usize {
        self.world.query::<&Customer>().iter().count()
    }

    pub fn item_count(&self) -> usize {
        self.world.query::<&Item>().iter().count()
    }

    /// Broken item/holder links and serving-line counts, both empty when
    /// the world is consistent.
    pub fn integrity(&self) -> (Vec<HolderMismatch>, Vec<QueueMismatch>) {
        (holder_mismatches(&self.world), queue_mismatches(&self.world))
    }

    pub fn run(&self) -> &RunProgress {
        &self.run
    }

    pub fn stage_params(&self) -> Option<&StageParams> {
        self.params.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Set time scale (1.0 = real-time)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.config.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.config.time_scale
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since the engine was created.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}
