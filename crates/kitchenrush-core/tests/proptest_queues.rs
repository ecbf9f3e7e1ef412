//! Property-based tests for the kitchen simulation.
//!
//! Uses proptest to generate random stages and input sequences, then
//! verifies that serving-line counts and item/holder links stay consistent
//! after every tick.

use kitchenrush_core::prelude::*;
use kitchenrush_logic::stage::StageDef;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
enum Op {
    /// Advance time by `n * 0.05` seconds.
    Wait(u8),
    /// Tap interact at the station with this floor-plan index.
    Interact(usize),
}

fn arb_ops(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(
        prop_oneof![
            3 => (1..20u8).prop_map(Op::Wait),
            2 => (0..64usize).prop_map(Op::Interact),
        ],
        1..=max_ops,
    )
}

fn arb_stage() -> impl Strategy<Value = StageDef> {
    (2..12u32, 0.5..4.0f32, 1.0..25.0f32, 1..5u32).prop_map(
        |(customers, spawn_interval, patience, queue_capacity)| {
            let mut stage = StageDef::new(
                "Random",
                customers,
                customers,
                spawn_interval,
                patience,
                vec![IngredientId(5), IngredientId(6)],
            );
            stage.queue_capacity = queue_capacity;
            stage
        },
    )
}

fn engine_for(stage: StageDef) -> KitchenEngine {
    let mut tables = Content::builtin().unwrap().tables;
    tables.stages = vec![stage];
    let mut engine = KitchenEngine::new(
        Content::new(tables).unwrap(),
        EngineConfig {
            proximity_range: None,
            customer_walk_speed: 6.0,
            leave_duration: 1.0,
            ..Default::default()
        },
    );
    engine.build_kitchen(&KitchenConfig::default()).unwrap();
    engine.start_run(Loadout::default()).unwrap();
    engine
}

fn check(engine: &KitchenEngine) -> Result<(), TestCaseError> {
    let (holders, queues) = engine.integrity();
    prop_assert!(holders.is_empty(), "holder mismatches: {:?}", holders);
    prop_assert!(queues.is_empty(), "queue mismatches: {:?}", queues);
    Ok(())
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every serving line's count equals the customers targeting it, with
    /// at most one customer at the front, after any tick.
    #[test]
    fn queue_counts_match_customers(stage in arb_stage(), ops in arb_ops(120)) {
        let mut engine = engine_for(stage);
        for op in ops {
            match op {
                Op::Wait(n) => {
                    engine.update(f32::from(n) * 0.05);
                }
                Op::Interact(index) => {
                    let stations = engine.layout().unwrap().stations.len();
                    let target = engine.layout().unwrap().stations[index % stations].entity;
                    engine.set_near_station(Some(target)).unwrap();
                    engine.tap().unwrap();
                    engine.update(0.05);
                }
            }
            check(&engine)?;
        }
    }

    /// Customers never outnumber the stage's quota and the session never
    /// counts more processed customers than it spawned.
    #[test]
    fn processed_never_exceeds_quota(stage in arb_stage(), waits in proptest::collection::vec(1..40u8, 1..200)) {
        let quota = stage.customers;
        let mut engine = engine_for(stage);
        for n in waits {
            engine.update(f32::from(n) * 0.05);
            prop_assert!(engine.customer_count() as u32 <= quota);
            prop_assert!(engine.session.processed_count <= quota);
            prop_assert!(engine.session.current_failures <= engine.session.max_failures);
            check(&engine)?;
        }
    }
}
