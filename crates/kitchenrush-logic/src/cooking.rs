//! Cooking state machine: `Raw → Cooked → Burnt`.
//!
//! Progress is a single accumulating number. An item turns cooked once
//! progress reaches `cook_time`, and burns once it reaches
//! `cook_time + burn_time` (never, when `burn_time` is zero). Burnt is
//! terminal. Cooking does not stop on its own at cooked; it stops on burn.

use crate::item::{CookProfile, ItemState};

/// Result of checking an item against its cook profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookTransition {
    /// No state change this step.
    Hold,
    /// Raw item reached `cook_time`.
    Cooked,
    /// Cooked item reached `cook_time + burn_time`.
    Burnt,
}

/// Single transition check for an item in `state` at `progress`.
pub fn cook_transition(state: ItemState, progress: f32, profile: &CookProfile) -> CookTransition {
    match state {
        ItemState::Raw if progress >= profile.cook_time => CookTransition::Cooked,
        ItemState::Cooked if profile.burns() && progress >= profile.burn_at() => {
            CookTransition::Burnt
        }
        _ => CookTransition::Hold,
    }
}

/// Apply every transition reachable at `progress`, in order.
///
/// Returns the final state and the transitions taken, so a large step can
/// move an item straight from raw to burnt while still reporting both.
pub fn settle(
    mut state: ItemState,
    progress: f32,
    profile: &CookProfile,
) -> (ItemState, Vec<CookTransition>) {
    let mut taken = Vec::new();
    loop {
        let step = cook_transition(state, progress, profile);
        match step {
            CookTransition::Hold => break,
            CookTransition::Cooked => state = ItemState::Cooked,
            CookTransition::Burnt => state = ItemState::Burnt,
        }
        taken.push(step);
    }
    (state, taken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patty() -> CookProfile {
        CookProfile::new(5.0, 3.0)
    }

    #[test]
    fn test_raw_stays_raw_before_cook_time() {
        assert_eq!(cook_transition(ItemState::Raw, 4.9, &patty()), CookTransition::Hold);
    }

    #[test]
    fn test_raw_cooks_at_threshold() {
        assert_eq!(cook_transition(ItemState::Raw, 5.0, &patty()), CookTransition::Cooked);
    }

    #[test]
    fn test_cooked_burns_at_sum() {
        assert_eq!(cook_transition(ItemState::Cooked, 7.9, &patty()), CookTransition::Hold);
        assert_eq!(cook_transition(ItemState::Cooked, 8.0, &patty()), CookTransition::Burnt);
    }

    #[test]
    fn test_zero_burn_time_never_burns() {
        let profile = CookProfile::new(5.0, 0.0);
        assert_eq!(cook_transition(ItemState::Cooked, 1000.0, &profile), CookTransition::Hold);
    }

    #[test]
    fn test_burnt_is_terminal() {
        assert_eq!(cook_transition(ItemState::Burnt, 1000.0, &patty()), CookTransition::Hold);
    }

    #[test]
    fn test_settle_takes_both_steps() {
        let (state, taken) = settle(ItemState::Raw, 9.0, &patty());
        assert_eq!(state, ItemState::Burnt);
        assert_eq!(taken, vec![CookTransition::Cooked, CookTransition::Burnt]);
    }

    #[test]
    fn test_chopped_items_do_not_cook() {
        let (state, taken) = settle(ItemState::Chopped, 9.0, &patty());
        assert_eq!(state, ItemState::Chopped);
        assert!(taken.is_empty());
    }
}
