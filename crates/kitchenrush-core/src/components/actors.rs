//! Actor components: the player, its input, interaction requests and customers.

use hecs::Entity;

use super::{StationKind, Vec3};
use kitchenrush_logic::ids::IngredientId;

/// Base walking speed of the player, units per second.
pub const PLAYER_BASE_SPEED: f32 = 4.0;

/// Player state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub held_item: Option<Entity>,
    /// Written by the proximity collaborator once per tick.
    pub near_station: Option<Entity>,
    /// Last non-zero movement direction.
    pub facing: Vec3,
    pub move_speed: f32,
    /// Set from buffs at stage start.
    pub speed_multiplier: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            held_item: None,
            near_station: None,
            facing: Vec3::FORWARD,
            move_speed: PLAYER_BASE_SPEED,
            speed_multiplier: 1.0,
        }
    }
}

impl Player {
    pub fn is_holding_item(&self) -> bool {
        self.held_item.is_some()
    }

    pub fn is_near_station(&self) -> bool {
        self.near_station.is_some()
    }
}

/// Per-tick input snapshot written by the input collaborator.
///
/// Tap-versus-hold debouncing is the collaborator's job; the simulation only
/// reads these flags.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub interact_tapped: bool,
    pub interact_holding: bool,
    pub interact_hold_started: bool,
    /// Movement on the floor plane: `[x, z]`, each in `-1.0..=1.0`.
    pub movement: [f32; 2],
}

impl PlayerInput {
    pub fn tap() -> Self {
        Self {
            interact_tapped: true,
            ..Default::default()
        }
    }

    pub fn moving(x: f32, z: f32) -> Self {
        Self {
            movement: [x, z],
            ..Default::default()
        }
    }
}

/// One-tick request to interact with a station.
///
/// Attached to the player by interaction dispatch and removed by exactly one
/// handler in the same tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRequest {
    pub player: Entity,
    pub station: Entity,
    pub station_kind: StationKind,
}

/// Customer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerState {
    Spawned,
    FindingLine,
    MovingToLine,
    WaitingInQueue,
    Ordering,
    /// Patience below the impatience threshold.
    WaitingLate,
    LeavingHappy,
    LeavingAngry,
}

impl CustomerState {
    /// Standing in line and losing patience.
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            CustomerState::WaitingInQueue | CustomerState::Ordering | CustomerState::WaitingLate
        )
    }

    pub fn is_leaving(&self) -> bool {
        matches!(self, CustomerState::LeavingHappy | CustomerState::LeavingAngry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Customer {
    pub id: u32,
    pub state: CustomerState,
    pub target_station: Option<Entity>,
    pub queue_index: u32,
    pub ordered_dish: IngredientId,
    pub patience: f32,
    pub max_patience: f32,
    pub walk_speed: f32,
    /// Armed on the first tick of a leaving state.
    pub leave_timer: Option<f32>,
}

impl Customer {
    pub fn new(id: u32, ordered_dish: IngredientId, patience: f32, walk_speed: f32) -> Self {
        Self {
            id,
            state: CustomerState::Spawned,
            target_station: None,
            queue_index: 0,
            ordered_dish,
            patience,
            max_patience: patience,
            walk_speed,
            leave_timer: None,
        }
    }

    /// Remaining patience as a fraction of the maximum.
    pub fn patience_ratio(&self) -> f32 {
        if self.max_patience > 0.0 {
            self.patience / self.max_patience
        } else {
            0.0
        }
    }

    /// At the head of its line and still being served.
    pub fn is_front(&self) -> bool {
        self.queue_index == 0 && self.target_station.is_some() && !self.state.is_leaving()
    }
}
