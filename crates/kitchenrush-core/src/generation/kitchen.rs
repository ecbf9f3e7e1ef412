//! Kitchen construction - turns a floor plan into station and player entities.

use hecs::{Entity, EntityBuilder, World};

use crate::components::{
    Container, Counter, EventQueue, Player, PlayerInput, ServingCounter, Station, StationKind,
    Stove, Transform, TrashCan, Vec3,
};
use crate::content::{Content, ContentError};
use kitchenrush_logic::ids::IngredientId;

/// Default number of items a counter can stack.
pub const DEFAULT_COUNTER_CAPACITY: usize = 4;

/// What to build at one spot on the floor.
#[derive(Debug, Clone, PartialEq)]
pub enum StationPlan {
    Container {
        ingredient: IngredientId,
        allows_return: bool,
    },
    Counter { capacity: usize },
    Stove,
    ServingCounter { queue_capacity: u32 },
    TrashCan,
}

impl StationPlan {
    /// Container that takes back raw items of its ingredient.
    pub fn container(ingredient: IngredientId) -> Self {
        StationPlan::Container {
            ingredient,
            allows_return: true,
        }
    }

    pub fn kind(&self) -> StationKind {
        match self {
            StationPlan::Container { .. } => StationKind::Container,
            StationPlan::Counter { .. } => StationKind::Counter,
            StationPlan::Stove => StationKind::Stove,
            StationPlan::ServingCounter { .. } => StationKind::ServingCounter,
            StationPlan::TrashCan => StationKind::TrashCan,
        }
    }
}

/// One placed station in a floor plan.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSpec {
    pub name: String,
    pub plan: StationPlan,
    pub position: Vec3,
    /// Rotation about the vertical axis, in radians.
    pub yaw: f32,
}

impl StationSpec {
    pub fn new(name: impl Into<String>, plan: StationPlan, x: f32, z: f32) -> Self {
        Self {
            name: name.into(),
            plan,
            position: Vec3::flat(x, z),
            yaw: 0.0,
        }
    }
}

/// Floor plan of a kitchen.
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    pub stations: Vec<StationSpec>,
    pub player_spawn: Vec3,
    pub customer_spawn: Vec3,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let container = |ingredient: u32| StationPlan::container(IngredientId(ingredient));
        let counter = StationPlan::Counter {
            capacity: DEFAULT_COUNTER_CAPACITY,
        };
        let serving = StationPlan::ServingCounter { queue_capacity: 4 };
        Self {
            stations: vec![
                StationSpec::new("bread", container(1), -6.0, -3.0),
                StationSpec::new("patty", container(2), -4.0, -3.0),
                StationSpec::new("lettuce", container(3), -2.0, -3.0),
                StationSpec::new("tomato", container(4), 0.0, -3.0),
                StationSpec::new("cheese", container(7), 2.0, -3.0),
                StationSpec::new("counter-1", counter.clone(), 4.0, -3.0),
                StationSpec::new("counter-2", counter, 6.0, -3.0),
                StationSpec::new("stove-1", StationPlan::Stove, -7.0, 0.0),
                StationSpec::new("stove-2", StationPlan::Stove, -7.0, 1.5),
                StationSpec::new("trash", StationPlan::TrashCan, 7.0, 0.0),
                StationSpec::new("serving-1", serving.clone(), -2.0, 3.0),
                StationSpec::new("serving-2", serving, 2.0, 3.0),
            ],
            player_spawn: Vec3::ZERO,
            customer_spawn: Vec3::flat(0.0, 14.0),
        }
    }
}

/// A station as built.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedStation {
    pub name: String,
    pub kind: StationKind,
    pub entity: Entity,
}

/// Result of kitchen construction.
#[derive(Debug, Clone)]
pub struct KitchenLayout {
    pub stations: Vec<PlacedStation>,
    pub player: Entity,
    pub player_spawn: Vec3,
    pub customer_spawn: Vec3,
}

impl KitchenLayout {
    /// Station entity by floor-plan name.
    pub fn station(&self, name: &str) -> Option<Entity> {
        self.stations
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.entity)
    }

    /// Station entities of one kind, in registration order.
    pub fn stations_of(&self, kind: StationKind) -> impl Iterator<Item = Entity> + '_ {
        self.stations
            .iter()
            .filter(move |s| s.kind == kind)
            .map(|s| s.entity)
    }
}

/// Spawn every station in `config` plus the player.
///
/// Station ids follow floor-plan order. Containers must supply an
/// ingredient known to `content`.
pub fn build_kitchen(
    world: &mut World,
    config: &KitchenConfig,
    content: &Content,
) -> Result<KitchenLayout, ContentError> {
    for spec in &config.stations {
        if let StationPlan::Container { ingredient, .. } = spec.plan {
            if content.ingredient(ingredient).is_none() {
                return Err(ContentError::UnknownIngredient {
                    context: format!("container '{}'", spec.name),
                    id: ingredient.0,
                });
            }
        }
    }

    let mut stations = Vec::with_capacity(config.stations.len());
    for (id, spec) in config.stations.iter().enumerate() {
        let mut builder = EntityBuilder::new();
        builder.add(Station::new(id as u32, spec.plan.kind()));
        builder.add(Transform::at(spec.position).with_yaw(spec.yaw));
        builder.add(EventQueue::default());
        match &spec.plan {
            StationPlan::Container {
                ingredient,
                allows_return,
            } => builder.add(Container::new(*ingredient).with_returns(*allows_return)),
            StationPlan::Counter { capacity } => builder.add(Counter::new(*capacity)),
            StationPlan::Stove => builder.add(Stove::default()),
            StationPlan::ServingCounter { queue_capacity } => {
                builder.add(ServingCounter::new(*queue_capacity))
            }
            StationPlan::TrashCan => builder.add(TrashCan),
        };
        let entity = world.spawn(builder.build());
        stations.push(PlacedStation {
            name: spec.name.clone(),
            kind: spec.plan.kind(),
            entity,
        });
    }

    let player = world.spawn((
        Player::default(),
        PlayerInput::default(),
        Transform::at(config.player_spawn),
        EventQueue::default(),
    ));

    log::info!("built kitchen with {} stations", stations.len());
    Ok(KitchenLayout {
        stations,
        player,
        player_spawn: config.player_spawn,
        customer_spawn: config.customer_spawn,
    })
}
