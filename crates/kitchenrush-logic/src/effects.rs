//! Skill and equipment effects, and the set of buffs active in a run.
//!
//! An [`Effect`] carries additive deltas (customer count, failure
//! tolerance) and multipliers (spawn interval, patience, score, move speed,
//! cook speed). Effects stack by adding deltas and multiplying multipliers,
//! so the identity effect is all-zero deltas and all-one multipliers.

use serde::{Deserialize, Serialize};

use crate::ids::{EquipmentId, SkillId};

fn one() -> f32 {
    1.0
}

/// Stackable modifier bundle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(default)]
    pub customer_delta: i32,
    #[serde(default)]
    pub failure_bonus: i32,
    #[serde(default = "one")]
    pub spawn_interval_mult: f32,
    #[serde(default = "one")]
    pub patience_mult: f32,
    #[serde(default = "one")]
    pub score_mult: f32,
    #[serde(default = "one")]
    pub move_speed_mult: f32,
    #[serde(default = "one")]
    pub cook_speed_mult: f32,
}

impl Default for Effect {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Effect {
    pub const IDENTITY: Self = Self {
        customer_delta: 0,
        failure_bonus: 0,
        spawn_interval_mult: 1.0,
        patience_mult: 1.0,
        score_mult: 1.0,
        move_speed_mult: 1.0,
        cook_speed_mult: 1.0,
    };

    /// Combine two effects.
    pub fn stack(&self, other: &Effect) -> Effect {
        Effect {
            customer_delta: self.customer_delta + other.customer_delta,
            failure_bonus: self.failure_bonus + other.failure_bonus,
            spawn_interval_mult: self.spawn_interval_mult * other.spawn_interval_mult,
            patience_mult: self.patience_mult * other.patience_mult,
            score_mult: self.score_mult * other.score_mult,
            move_speed_mult: self.move_speed_mult * other.move_speed_mult,
            cook_speed_mult: self.cook_speed_mult * other.cook_speed_mult,
        }
    }

    /// Stack every effect in `effects` onto the identity.
    pub fn stack_all<'a>(effects: impl IntoIterator<Item = &'a Effect>) -> Effect {
        effects
            .into_iter()
            .fold(Effect::IDENTITY, |acc, effect| acc.stack(effect))
    }
}

/// How long a granted skill stays active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuffDuration {
    /// Carried for the rest of the run.
    Permanent,
    /// Active for the next stage only.
    #[default]
    Stage,
}

/// A content-table skill, offered as a stage reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: SkillId,
    pub name: String,
    #[serde(default)]
    pub duration: BuffDuration,
    #[serde(default)]
    pub effect: Effect,
}

/// A content-table equipment piece, chosen before a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentDef {
    pub id: EquipmentId,
    pub name: String,
    #[serde(default)]
    pub effect: Effect,
}

/// Skills active in the current run, split by duration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveBuffs {
    permanent: Vec<SkillId>,
    temporary: Vec<SkillId>,
}

impl ActiveBuffs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a skill according to its duration. Stacking the same skill twice is allowed.
    pub fn grant(&mut self, skill: &SkillDef) {
        match skill.duration {
            BuffDuration::Permanent => self.permanent.push(skill.id),
            BuffDuration::Stage => self.temporary.push(skill.id),
        }
    }

    /// Drop all one-stage buffs.
    pub fn expire_temporary(&mut self) {
        self.temporary.clear();
    }

    pub fn clear(&mut self) {
        self.permanent.clear();
        self.temporary.clear();
    }

    pub fn permanent(&self) -> &[SkillId] {
        &self.permanent
    }

    pub fn temporary(&self) -> &[SkillId] {
        &self.temporary
    }

    pub fn is_empty(&self) -> bool {
        self.permanent.is_empty() && self.temporary.is_empty()
    }

    /// Combined effect of every active skill. Unknown ids are ignored.
    pub fn effect(&self, skills: &[SkillDef]) -> Effect {
        let active = self.permanent.iter().chain(self.temporary.iter());
        Effect::stack_all(
            active.filter_map(|id| skills.iter().find(|s| s.id == *id).map(|s| &s.effect)),
        )
    }
}

/// Equipment picked for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    pub equipment: Vec<EquipmentId>,
}

impl Loadout {
    pub fn new(equipment: Vec<EquipmentId>) -> Self {
        Self { equipment }
    }

    /// Combined effect of the equipped pieces. Unknown ids are ignored.
    pub fn effect(&self, catalog: &[EquipmentDef]) -> Effect {
        Effect::stack_all(
            self.equipment
                .iter()
                .filter_map(|id| catalog.iter().find(|e| e.id == *id).map(|e| &e.effect)),
        )
    }
}
