//! Per-stage game session: counters, the win/lose watcher and star rating.
//!
//! A session moves `Ready → Playing → {StageClear | GameOver}`. Clear and
//! game over are terminal for the stage; the run starts the next stage by
//! calling [`GameSession::begin_stage`] again. The watcher checks failures
//! before the customer quota, so hitting the failure cap always loses even
//! if the quota is met on the same tick.

use serde::{Deserialize, Serialize};

use crate::stage::StageParams;

/// Score granted for each successful serve, before the stage multiplier.
pub const SERVE_REWARD: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Ready,
    Playing,
    StageClear,
    GameOver,
}

/// Singleton session record for the stage being played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub state: SessionState,
    pub max_failures: u32,
    pub current_failures: u32,
    pub total_customers: u32,
    pub served_customers: u32,
    pub processed_count: u32,
    pub score: u32,
    pub score_multiplier: f32,
    pub stage_level: u32,
    /// Set once stage-start buffs have been pushed into the world.
    pub stage_initialized: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Ready,
            max_failures: 0,
            current_failures: 0,
            total_customers: 0,
            served_customers: 0,
            processed_count: 0,
            score: 0,
            score_multiplier: 1.0,
            stage_level: 0,
            stage_initialized: false,
        }
    }

    /// Reset counters for a new stage and enter `Playing`.
    pub fn begin_stage(&mut self, stage_level: u32, params: &StageParams) {
        *self = Self {
            state: SessionState::Playing,
            max_failures: params.max_failures,
            total_customers: params.customer_cap,
            score_multiplier: params.score_multiplier,
            stage_level,
            ..Self::new()
        };
    }

    /// Return to the `Ready` baseline.
    pub fn restart(&mut self) {
        *self = Self::new();
    }

    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    /// A customer gave up.
    pub fn record_failure(&mut self) {
        self.current_failures += 1;
        self.processed_count += 1;
    }

    /// A customer was served. Returns the points awarded.
    pub fn record_serve(&mut self, reward: u32) -> u32 {
        let points = (reward as f32 * self.score_multiplier).round().max(0.0) as u32;
        self.score += points;
        self.served_customers += 1;
        self.processed_count += 1;
        points
    }

    /// Watcher step. Returns the new state when a transition happens.
    pub fn evaluate(&mut self) -> Option<SessionState> {
        if self.state != SessionState::Playing {
            return None;
        }
        let next = if self.current_failures >= self.max_failures {
            SessionState::GameOver
        } else if self.processed_count >= self.total_customers {
            SessionState::StageClear
        } else {
            return None;
        };
        self.state = next;
        Some(next)
    }

    /// Star rating for the stage as it stands.
    pub fn stars(&self) -> u8 {
        star_rating(self.current_failures)
    }
}

/// Star rating from the failure count: 0 → 3, 1 → 2, 2 or more → 1.
pub fn star_rating(failures: u32) -> u8 {
    match failures {
        0 => 3,
        1 => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(customers: u32, failures: u32) -> StageParams {
        StageParams {
            customer_cap: customers,
            max_failures: failures,
            spawn_interval: 5.0,
            patience: 60.0,
            score_multiplier: 1.0,
            queue_capacity: 4,
            move_speed_multiplier: 1.0,
            cook_speed_multiplier: 1.0,
        }
    }

    #[test]
    fn test_new_session_is_ready() {
        let session = GameSession::new();
        assert_eq!(session.state, SessionState::Ready);
        assert!(!session.stage_initialized);
    }

    #[test]
    fn test_ready_session_never_transitions() {
        let mut session = GameSession::new();
        assert_eq!(session.evaluate(), None);
    }

    #[test]
    fn test_clear_when_quota_met() {
        let mut session = GameSession::new();
        session.begin_stage(1, &params(2, 3));
        session.record_serve(SERVE_REWARD);
        assert_eq!(session.evaluate(), None);
        session.record_serve(SERVE_REWARD);
        assert_eq!(session.evaluate(), Some(SessionState::StageClear));
        assert_eq!(session.evaluate(), None);
    }

    #[test]
    fn test_failure_cap_beats_quota() {
        let mut session = GameSession::new();
        session.begin_stage(1, &params(3, 3));
        session.record_failure();
        session.record_failure();
        session.record_failure();
        assert_eq!(session.processed_count, session.total_customers);
        assert_eq!(session.evaluate(), Some(SessionState::GameOver));
    }

    #[test]
    fn test_serve_applies_multiplier() {
        let mut session = GameSession::new();
        let mut p = params(5, 3);
        p.score_multiplier = 1.5;
        session.begin_stage(1, &p);
        assert_eq!(session.record_serve(SERVE_REWARD), 150);
        assert_eq!(session.score, 150);
        assert_eq!(session.served_customers, 1);
    }

    #[test]
    fn test_restart_returns_to_ready() {
        let mut session = GameSession::new();
        session.begin_stage(2, &params(5, 3));
        session.record_failure();
        session.stage_initialized = true;
        session.restart();
        assert_eq!(session, GameSession::new());
    }

    #[test]
    fn test_star_breakpoints() {
        assert_eq!(star_rating(0), 3);
        assert_eq!(star_rating(1), 2);
        assert_eq!(star_rating(2), 1);
        assert_eq!(star_rating(7), 1);
    }
}
