//! Run progression - an ordered sequence of stages with buffs carried between them.
//!
//! The run reacts to session transitions rather than watching every tick:
//!
//! - `StageClear` records the stage, expires one-stage buffs, then either
//!   offers rewards from the cleared stage's pool, starts the next stage
//!   straight away (empty pool), or finishes the run when no stage remains.
//! - `GameOver` records the stage and finishes the run as a loss.
//!
//! Reward offers are picked with a deterministic hash of the run seed and
//! stage index, so a seeded run always offers the same choices.

use serde::{Deserialize, Serialize};

use crate::content::ContentTables;
use crate::effects::{ActiveBuffs, Loadout};
use crate::ids::SkillId;
use crate::session::GameSession;
use crate::stage::{compute_stage_params, StageParams};

/// Maximum number of skills offered after a clear.
pub const REWARD_OFFER_COUNT: usize = 3;

/// Result of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub victory: bool,
    pub total_score: u64,
    pub stages_cleared: u32,
    pub total_failures: u32,
}

/// Summary of one played stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub level: u32,
    pub score: u32,
    pub failures: u32,
    pub stars: u8,
    pub cleared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    InStage,
    AwaitingReward { offers: Vec<SkillId> },
    Finished(RunOutcome),
}

/// What the owner of the run must do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStep {
    /// Start the stage at this index.
    StartStage(usize),
    /// Present these skills and wait for [`RunProgress::choose_reward`].
    AwaitReward(Vec<SkillId>),
    Finished(RunOutcome),
}

#[derive(Debug, Clone)]
pub struct RunProgress {
    phase: RunPhase,
    stage_index: usize,
    buffs: ActiveBuffs,
    loadout: Loadout,
    records: Vec<StageRecord>,
    seed: u64,
}

impl RunProgress {
    pub fn new(loadout: Loadout, seed: u64) -> Self {
        Self {
            phase: RunPhase::NotStarted,
            stage_index: 0,
            buffs: ActiveBuffs::new(),
            loadout,
            records: Vec::new(),
            seed,
        }
    }

    /// Begin a fresh run at the first stage.
    pub fn start(&mut self) -> RunStep {
        self.restart();
        self.phase = RunPhase::InStage;
        RunStep::StartStage(0)
    }

    /// Forget all progress and buffs. The loadout is kept.
    pub fn restart(&mut self) {
        self.phase = RunPhase::NotStarted;
        self.stage_index = 0;
        self.buffs.clear();
        self.records.clear();
    }

    pub fn phase(&self) -> &RunPhase {
        &self.phase
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn buffs(&self) -> &ActiveBuffs {
        &self.buffs
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    pub fn set_loadout(&mut self, loadout: Loadout) {
        self.loadout = loadout;
    }

    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    pub fn total_score(&self) -> u64 {
        self.records.iter().map(|r| u64::from(r.score)).sum()
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.phase {
            RunPhase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Parameters for the current stage, or `None` past the last stage.
    pub fn stage_params(&self, tables: &ContentTables) -> Option<StageParams> {
        let stage = tables.stage(self.stage_index)?;
        Some(compute_stage_params(
            stage,
            &self.buffs.effect(&tables.skills),
            &self.loadout.effect(&tables.equipment),
        ))
    }

    /// React to the session reaching `StageClear`.
    pub fn on_stage_clear(&mut self, session: &GameSession, tables: &ContentTables) -> RunStep {
        self.record(session, true);
        self.buffs.expire_temporary();

        let next = self.stage_index + 1;
        if next >= tables.stages.len() {
            return self.finish(true);
        }

        let pool = tables
            .stage(self.stage_index)
            .map(|stage| stage.reward_pool.as_slice())
            .unwrap_or(&[]);
        let offers = reward_offers(pool, self.seed, self.stage_index);
        if offers.is_empty() {
            self.stage_index = next;
            self.phase = RunPhase::InStage;
            RunStep::StartStage(next)
        } else {
            self.phase = RunPhase::AwaitingReward {
                offers: offers.clone(),
            };
            RunStep::AwaitReward(offers)
        }
    }

    /// React to the session reaching `GameOver`.
    pub fn on_game_over(&mut self, session: &GameSession) -> RunStep {
        self.record(session, false);
        self.finish(false)
    }

    /// Grant the offered skill at `pick` and advance to the next stage.
    ///
    /// Returns `None` when no reward is pending or `pick` is out of range.
    pub fn choose_reward(&mut self, pick: usize, tables: &ContentTables) -> Option<RunStep> {
        let RunPhase::AwaitingReward { offers } = &self.phase else {
            return None;
        };
        let skill = tables.skill(*offers.get(pick)?)?;
        self.buffs.grant(skill);
        self.stage_index += 1;
        self.phase = RunPhase::InStage;
        Some(RunStep::StartStage(self.stage_index))
    }

    fn record(&mut self, session: &GameSession, cleared: bool) {
        self.records.push(StageRecord {
            level: session.stage_level,
            score: session.score,
            failures: session.current_failures,
            stars: if cleared {
                session.stars()
            } else {
                0
            },
            cleared,
        });
    }

    fn finish(&mut self, victory: bool) -> RunStep {
        let outcome = RunOutcome {
            victory,
            total_score: self.total_score(),
            stages_cleared: self.records.iter().filter(|r| r.cleared).count() as u32,
            total_failures: self.records.iter().map(|r| r.failures).sum(),
        };
        self.phase = RunPhase::Finished(outcome);
        RunStep::Finished(outcome)
    }
}

/// Pick up to [`REWARD_OFFER_COUNT`] distinct skills from `pool`.
pub fn reward_offers(pool: &[SkillId], seed: u64, stage_index: usize) -> Vec<SkillId> {
    let mut candidates: Vec<SkillId> = Vec::with_capacity(pool.len());
    for id in pool {
        if !candidates.contains(id) {
            candidates.push(*id);
        }
    }
    let stage_seed = seed ^ (stage_index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    candidates.sort_by_key(|id| simple_hash(stage_seed, id.0 as usize));
    candidates.truncate(REWARD_OFFER_COUNT);
    candidates
}

/// Deterministic 64-bit mix of a seed and an index.
fn simple_hash(seed: u64, index: usize) -> u64 {
    let mut h = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(index as u64);
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51afd7ed558ccd);
    h ^= h >> 33;
    h
}
