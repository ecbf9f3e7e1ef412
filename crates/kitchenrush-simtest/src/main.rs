//! KitchenRush Headless Simulation Harness
//!
//! Builds the default kitchen on the bundled content, replays the core
//! kitchen scenarios and plays a full run with a scripted chef.
//! Runs entirely in-process; no rendering, no input devices.
//!
//! Usage:
//!   cargo run -p kitchenrush-simtest
//!   cargo run -p kitchenrush-simtest -- --verbose
//!   RUST_LOG=kitchenrush_core=debug cargo run -p kitchenrush-simtest

use kitchenrush_core::prelude::*;
use kitchenrush_core::systems::{customer_system, find_line_system};

const TICK: f32 = 0.1;
/// Upper bound on scripted-run length, in ticks.
const MAX_RUN_TICKS: usize = 60_000;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== KitchenRush Simulation Harness ===\n");

    let content = match Content::builtin() {
        Ok(content) => content,
        Err(err) => {
            println!("  ✗ content_load: {err}");
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Content tables
    results.extend(validate_content(&content));

    // 2. Kitchen construction
    results.extend(validate_kitchen(&content));

    // 3. Station interactions
    results.extend(validate_interactions(&content));

    // 4. Cooking timer
    results.extend(validate_cooking(&content));

    // 5. Customer lifecycle
    results.extend(validate_customers(&content));

    // 6. Movement and proximity
    results.extend(validate_movement(&content));

    // 7. Scripted full run
    results.extend(validate_scripted_run(&content, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn engine(content: &Content, proximity_range: Option<f32>) -> Option<KitchenEngine> {
    let mut engine = KitchenEngine::new(
        content.clone(),
        EngineConfig {
            proximity_range,
            ..Default::default()
        },
    );
    engine.build_kitchen(&KitchenConfig::default()).ok()?;
    engine.start_run(Loadout::default()).ok()?;
    Some(engine)
}

fn interact(engine: &mut KitchenEngine, station: &str) -> Option<RunStep> {
    let target = engine.station(station)?;
    engine.set_near_station(Some(target)).ok()?;
    engine.tap().ok()?;
    engine.update(TICK)
}

fn held_name(engine: &KitchenEngine) -> String {
    match engine.held_item() {
        Some((_, item)) => format!(
            "{} ({:?})",
            engine.content.tables.ingredient_name(item.ingredient),
            item.state
        ),
        None => "nothing".into(),
    }
}

fn consistent(engine: &KitchenEngine) -> bool {
    let (holders, queues) = engine.integrity();
    holders.is_empty() && queues.is_empty()
}

// ── 1. Content ──────────────────────────────────────────────────────────

fn validate_content(content: &Content) -> Vec<TestResult> {
    println!("--- Content ---");
    let tables = &content.tables;
    let mut results = Vec::new();

    results.push(TestResult::new(
        "content_counts",
        !tables.ingredients.is_empty() && !tables.stages.is_empty(),
        format!(
            "{} ingredients, {} recipes, {} stages, {} skills, {} equipment",
            tables.ingredients.len(),
            content.recipes.len(),
            tables.stages.len(),
            tables.skills.len(),
            tables.equipment.len()
        ),
    ));

    // Every menu dish must be a recipe output.
    let unreachable: Vec<String> = tables
        .stages
        .iter()
        .flat_map(|stage| stage.menu.iter())
        .filter(|dish| !content.recipes.recipes().iter().any(|r| r.output == **dish))
        .map(|dish| tables.ingredient_name(*dish))
        .collect();
    results.push(TestResult::new(
        "menu_dishes_craftable",
        unreachable.is_empty(),
        if unreachable.is_empty() {
            "every menu dish has a recipe".to_string()
        } else {
            format!("no recipe for {}", unreachable.join(", "))
        },
    ));

    let dishes_are_dishes = tables
        .stages
        .iter()
        .flat_map(|stage| stage.menu.iter())
        .all(|dish| {
            content
                .ingredient(*dish)
                .is_some_and(|def| def.kind == ItemKind::Dish)
        });
    results.push(TestResult::new(
        "menu_items_are_dishes",
        dishes_are_dishes,
        "menus only list dish ingredients",
    ));

    results
}

// ── 2. Kitchen ──────────────────────────────────────────────────────────

fn validate_kitchen(content: &Content) -> Vec<TestResult> {
    println!("--- Kitchen ---");
    let mut results = Vec::new();

    let Some(engine) = engine(content, None) else {
        results.push(TestResult::new("kitchen_build", false, "kitchen failed to build"));
        return results;
    };
    let layout = engine.layout().map(|l| l.stations.len()).unwrap_or(0);
    results.push(TestResult::new(
        "kitchen_build",
        layout == KitchenConfig::default().stations.len(),
        format!("{layout} stations placed"),
    ));
    results.push(TestResult::new(
        "kitchen_consistent",
        consistent(&engine),
        "no holder or queue mismatches after build",
    ));
    results.push(TestResult::new(
        "stage_one_playing",
        engine.session.state == SessionState::Playing,
        format!(
            "state {:?}, {} customers, {} failures allowed",
            engine.session.state, engine.session.total_customers, engine.session.max_failures
        ),
    ));

    results
}

// ── 3. Interactions ─────────────────────────────────────────────────────

fn validate_interactions(content: &Content) -> Vec<TestResult> {
    println!("--- Interactions ---");
    let mut results = Vec::new();
    let Some(mut engine) = engine(content, None) else {
        results.push(TestResult::new("interaction_setup", false, "kitchen failed to build"));
        return results;
    };

    interact(&mut engine, "bread");
    let bread = held_name(&engine);
    results.push(TestResult::new(
        "container_dispenses",
        bread == "Bread (Raw)",
        format!("holding {bread}"),
    ));

    interact(&mut engine, "bread");
    results.push(TestResult::new(
        "container_round_trip",
        engine.held_item().is_none() && engine.item_count() == 0,
        format!("{} items after return", engine.item_count()),
    ));

    interact(&mut engine, "lettuce");
    interact(&mut engine, "tomato");
    let salad = held_name(&engine);
    results.push(TestResult::new(
        "recipe_with_supply",
        salad == "Salad (Raw)",
        format!("lettuce + tomato supply gave {salad}"),
    ));

    interact(&mut engine, "counter-1");
    interact(&mut engine, "cheese");
    interact(&mut engine, "counter-1");
    let stacked = engine
        .station("counter-1")
        .and_then(|c| engine.world.get::<&Counter>(c).ok().map(|c| c.stack.len()))
        .unwrap_or(0);
    results.push(TestResult::new(
        "counter_stacks",
        stacked == 2 && engine.held_item().is_none(),
        format!("{stacked} items on counter-1"),
    ));

    interact(&mut engine, "counter-1");
    let top = held_name(&engine);
    results.push(TestResult::new(
        "counter_is_lifo",
        top == "Cheese (Raw)",
        format!("took {top}"),
    ));

    interact(&mut engine, "trash");
    results.push(TestResult::new(
        "trash_destroys",
        engine.held_item().is_none() && engine.item_count() == 1,
        format!("{} items remain", engine.item_count()),
    ));

    interact(&mut engine, "bread");
    interact(&mut engine, "stove-1");
    let rejected = held_name(&engine);
    results.push(TestResult::new(
        "stove_rejects_uncookable",
        rejected == "Bread (Raw)",
        format!("still holding {rejected}"),
    ));

    results.push(TestResult::new(
        "interactions_consistent",
        consistent(&engine),
        "holder links intact",
    ));

    results
}

// ── 4. Cooking ──────────────────────────────────────────────────────────

fn validate_cooking(content: &Content) -> Vec<TestResult> {
    println!("--- Cooking ---");
    let mut results = Vec::new();
    let Some(mut engine) = engine(content, None) else {
        results.push(TestResult::new("cooking_setup", false, "kitchen failed to build"));
        return results;
    };
    let Some(stove) = engine.station("stove-1") else {
        results.push(TestResult::new("cooking_setup", false, "no stove-1"));
        return results;
    };

    interact(&mut engine, "patty");
    let patty = engine.held_item().map(|(entity, _)| entity);
    let _ = engine.set_near_station(Some(stove));
    let _ = engine.tap();
    let state = |engine: &KitchenEngine| {
        patty.and_then(|p| engine.world.get::<&Item>(p).ok().map(|i| i.state))
    };

    for _ in 0..10 {
        engine.update(0.5);
    }
    let at_five = state(&engine);
    results.push(TestResult::new(
        "cooked_at_cook_time",
        at_five == Some(ItemState::Cooked),
        format!("state after 5.0s: {at_five:?}"),
    ));

    for _ in 0..6 {
        engine.update(0.5);
    }
    let at_eight = state(&engine);
    let cooking = engine
        .world
        .get::<&Stove>(stove)
        .map(|s| s.is_cooking)
        .unwrap_or(true);
    results.push(TestResult::new(
        "burnt_at_burn_time",
        at_eight == Some(ItemState::Burnt) && !cooking,
        format!("state after 8.0s: {at_eight:?}, cooking {cooking}"),
    ));

    results
}

// ── 5. Customers ────────────────────────────────────────────────────────

fn validate_customers(content: &Content) -> Vec<TestResult> {
    println!("--- Customers ---");
    let mut results = Vec::new();
    let Some(mut engine) = engine(content, None) else {
        results.push(TestResult::new("customer_setup", false, "kitchen failed to build"));
        return results;
    };

    let mut reached_front = false;
    let mut first_failure_tick = None;
    for tick in 0..3000 {
        engine.update(TICK);
        if !consistent(&engine) {
            results.push(TestResult::new(
                "queue_invariant",
                false,
                format!("mismatch at tick {tick}: {:?}", engine.integrity().1),
            ));
            return results;
        }
        reached_front |= engine
            .customers()
            .iter()
            .any(|(_, c)| c.state == CustomerState::Ordering);
        if first_failure_tick.is_none() && engine.session.current_failures > 0 {
            first_failure_tick = Some(tick);
        }
        if engine.session.state != SessionState::Playing {
            break;
        }
    }

    results.push(TestResult::new(
        "queue_invariant",
        true,
        "queue counts matched customers every tick",
    ));
    results.push(TestResult::new(
        "customer_reaches_front",
        reached_front,
        "a customer reached the front and ordered",
    ));
    results.push(TestResult::new(
        "neglect_is_game_over",
        engine.session.state == SessionState::GameOver,
        format!(
            "state {:?} with {} failures (first at tick {:?})",
            engine.session.state, engine.session.current_failures, first_failure_tick
        ),
    ));

    // Line choice on a bare world: two lines, three customers.
    let mut world = hecs::World::new();
    let lines: Vec<hecs::Entity> = (0..2)
        .map(|id| {
            world.spawn((
                Station::new(id, StationKind::ServingCounter),
                ServingCounter::new(4),
                Transform::at(Vec3::flat(id as f32 * 4.0, 0.0)),
            ))
        })
        .collect();
    for id in 1..=3 {
        world.spawn((
            Customer::new(id, IngredientId(6), 30.0, 2.0),
            Transform::default(),
        ));
    }
    find_line_system(&mut world);
    let counts: Vec<u32> = lines
        .iter()
        .filter_map(|l| world.get::<&ServingCounter>(*l).ok().map(|s| s.queue_count))
        .collect();
    results.push(TestResult::new(
        "shortest_line_routing",
        counts == vec![2, 1],
        format!("queue counts {counts:?}"),
    ));

    let mut session = GameSession::new();
    let mut cmd = hecs::CommandBuffer::new();
    for _ in 0..10 {
        customer_system(&mut world, &mut session, 1.0, 3.0, &mut cmd);
        cmd.run_on(&mut world);
    }
    let waiting = world
        .query::<&Customer>()
        .iter()
        .filter(|(_, c)| c.state.is_waiting())
        .count();
    results.push(TestResult::new(
        "customers_settle",
        waiting == 3,
        format!("{waiting} customers waiting in line"),
    ));

    results
}

// ── 6. Movement ─────────────────────────────────────────────────────────

fn validate_movement(content: &Content) -> Vec<TestResult> {
    println!("--- Movement ---");
    let mut results = Vec::new();
    let Some(mut engine) = engine(content, Some(1.8)) else {
        results.push(TestResult::new("movement_setup", false, "kitchen failed to build"));
        return results;
    };
    let (Ok(player), Some(bread)) = (engine.player(), engine.station("bread")) else {
        results.push(TestResult::new("movement_setup", false, "no player or bread"));
        return results;
    };

    // Walk toward the bread container until the probe picks it up.
    let mut found_after = None;
    for tick in 0..200 {
        let here = engine
            .world
            .get::<&Transform>(player)
            .map(|t| t.position)
            .unwrap_or(Vec3::ZERO);
        let there = engine
            .world
            .get::<&Transform>(bread)
            .map(|t| t.position)
            .unwrap_or(Vec3::ZERO);
        let direction = (there - here).normalize();
        let _ = engine.set_input(PlayerInput::moving(direction.x, direction.z));
        engine.update(TICK);
        let near = engine
            .world
            .get::<&Player>(player)
            .ok()
            .and_then(|p| p.near_station);
        if near == Some(bread) {
            found_after = Some(tick);
            break;
        }
    }
    results.push(TestResult::new(
        "proximity_finds_station",
        found_after.is_some(),
        format!("bread container in reach after {found_after:?} ticks"),
    ));

    let _ = engine.tap();
    engine.update(TICK);
    let bread_held = held_name(&engine);
    results.push(TestResult::new(
        "walk_and_take",
        bread_held == "Bread (Raw)",
        format!("holding {bread_held}"),
    ));

    results
}

// ── 7. Scripted run ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum ChefStep {
    Tap(&'static str),
    WaitCooked(&'static str),
    Serve(IngredientId),
}

/// Station sequence that produces `dish`, ending with the dish in hand.
fn recipe_plan(content: &Content, dish: IngredientId) -> Option<Vec<ChefStep>> {
    let name = content.tables.ingredient_name(dish);
    let mut steps = match name.as_str() {
        "Salad" => vec![ChefStep::Tap("lettuce"), ChefStep::Tap("tomato")],
        "Burger" | "Cheeseburger" => vec![
            ChefStep::Tap("patty"),
            ChefStep::Tap("stove-1"),
            ChefStep::WaitCooked("stove-1"),
            ChefStep::Tap("stove-1"),
            ChefStep::Tap("bread"),
        ],
        _ => return None,
    };
    if name == "Cheeseburger" {
        steps.push(ChefStep::Tap("cheese"));
    }
    steps.push(ChefStep::Serve(dish));
    Some(steps)
}

/// Serving counter whose front customer wants `dish`.
fn serving_for(engine: &KitchenEngine, dish: IngredientId) -> Option<&'static str> {
    ["serving-1", "serving-2"].into_iter().find(|name| {
        engine.station(name).is_some_and(|station| {
            engine.customers().iter().any(|(_, c)| {
                c.target_station == Some(station) && c.is_front() && c.ordered_dish == dish
            })
        })
    })
}

/// Most urgent front customer's dish.
fn next_order(engine: &KitchenEngine) -> Option<IngredientId> {
    engine
        .customers()
        .into_iter()
        .filter(|(_, c)| c.is_front())
        .min_by(|(_, a), (_, b)| a.patience.total_cmp(&b.patience))
        .map(|(_, c)| c.ordered_dish)
}

fn stove_cooked(engine: &KitchenEngine, stove: &str) -> bool {
    let Some(stove) = engine.station(stove) else {
        return false;
    };
    let occupant = engine.world.get::<&Stove>(stove).ok().and_then(|s| s.occupant);
    occupant
        .and_then(|item| engine.world.get::<&Item>(item).ok().map(|i| i.state))
        .is_some_and(|state| state != ItemState::Raw)
}

/// Play a whole run, always taking the first reward offered.
fn play_run(content: &Content, seed: u64) -> Option<(RunOutcome, usize)> {
    let mut engine = KitchenEngine::new(
        content.clone(),
        EngineConfig {
            seed,
            proximity_range: None,
            ..Default::default()
        },
    );
    engine.build_kitchen(&KitchenConfig::default()).ok()?;
    engine.start_run(Loadout::default()).ok()?;

    let mut plan: Vec<ChefStep> = Vec::new();
    for tick in 0..MAX_RUN_TICKS {
        match engine.run().phase() {
            RunPhase::Finished(outcome) => {
                log::info!("seed {seed}: run finished after {tick} ticks: {outcome:?}");
                return Some((*outcome, tick));
            }
            RunPhase::AwaitingReward { .. } => {
                engine.choose_reward(0).ok()?;
                plan.clear();
                continue;
            }
            _ => {}
        }

        if plan.is_empty() {
            if let Some(dish) = next_order(&engine) {
                plan = recipe_plan(&engine.content, dish).unwrap_or_default();
                plan.reverse();
            }
        }

        match plan.last().cloned() {
            None => {
                engine.update(TICK);
            }
            Some(ChefStep::Tap(station)) => {
                plan.pop();
                interact(&mut engine, station);
            }
            Some(ChefStep::WaitCooked(stove)) => {
                if stove_cooked(&engine, stove) {
                    plan.pop();
                } else {
                    engine.update(TICK);
                }
            }
            Some(ChefStep::Serve(dish)) => {
                plan.pop();
                let ready = engine
                    .held_item()
                    .is_some_and(|(_, item)| item.ingredient == dish);
                match serving_for(&engine, dish).filter(|_| ready) {
                    Some(counter) => interact(&mut engine, counter),
                    None => interact(&mut engine, "trash"),
                };
            }
        }
    }
    None
}

fn validate_scripted_run(content: &Content, verbose: bool) -> Vec<TestResult> {
    println!("--- Scripted run ---");
    let mut results = Vec::new();

    let first = play_run(content, 7);
    let Some((outcome, ticks)) = first else {
        results.push(TestResult::new(
            "scripted_run_finishes",
            false,
            format!("run did not finish within {MAX_RUN_TICKS} ticks"),
        ));
        return results;
    };
    if verbose {
        println!("  run outcome after {ticks} ticks: {outcome:?}");
    }
    results.push(TestResult::new(
        "scripted_run_finishes",
        true,
        format!(
            "victory {}, score {}, {} stages cleared, {} failures",
            outcome.victory, outcome.total_score, outcome.stages_cleared, outcome.total_failures
        ),
    ));
    results.push(TestResult::new(
        "scripted_run_victory",
        outcome.victory && outcome.stages_cleared as usize == content.tables.stages.len(),
        format!("{} of {} stages", outcome.stages_cleared, content.tables.stages.len()),
    ));

    let replay = play_run(content, 7);
    results.push(TestResult::new(
        "scripted_run_deterministic",
        replay == first,
        "same seed, same outcome",
    ));

    results
}
