use std::fs;
use std::path::Path;

use anyhow::Result;
use wasteland::{
    action::{ActionBook, ActionIdAllocator, ActionKind},
    engine::{GameState, IdleResolver, TurnPlanner, TurnResolver},
    faction::{Controller, DiplomaticStatus, FactionId},
    scenario::ScenarioLoader,
};
use tempfile::tempdir;

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(Path::new(env!("CARGO_MANIFEST_DIR")))
}

/// Records the books it was handed.
#[derive(Default)]
struct Recorder {
    books: Vec<ActionBook>,
}

impl TurnResolver for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn resolve(&mut self, _state: &mut GameState, actions: &ActionBook) -> Result<()> {
        self.books.push(actions.clone());
        Ok(())
    }
}

#[test]
fn scenario_builds_factions_and_wars() {
    let scenario = scenario_loader()
        .load("scenarios/ash_valley.yaml")
        .expect("scenario should load");
    let state = scenario.build_game().expect("game builds");
    assert_eq!(state.factions().len(), scenario.factions.len());
    assert_eq!(state.turn(), 0);

    let raiders = &state.factions()[0];
    let settlers = &state.factions()[1];
    assert_eq!(raiders.location, state.starting_locations()[0]);
    assert_eq!(raiders.status_with(settlers.id), DiplomaticStatus::War);
    assert_eq!(settlers.status_with(raiders.id), DiplomaticStatus::War);
    assert!(!state.factions()[3].is_ai());
}

#[test]
fn planner_fills_in_ai_factions_only() {
    let scenario = scenario_loader()
        .load("scenarios/ash_valley.yaml")
        .expect("scenario should load");
    let state = scenario.build_game().expect("game builds");
    let planner = scenario.planner();
    let book = planner.plan(&state, ActionBook::new()).expect("plan");

    let ai_ids: Vec<FactionId> = state.factions().iter().filter(|f| f.is_ai()).map(|f| f.id).collect();
    assert_eq!(book.keys().copied().collect::<Vec<_>>(), ai_ids);
    assert!(book.values().all(|actions| !actions.is_empty()));
}

#[test]
fn submitted_actions_are_not_replaced() {
    let scenario = scenario_loader()
        .load("scenarios/ash_valley.yaml")
        .expect("scenario should load");
    let state = scenario.build_game().expect("game builds");
    let planner = scenario.planner();
    let raiders = state.factions()[0].id;

    let mut submitted = ActionBook::new();
    let mut ids = ActionIdAllocator::new(raiders, state.turn());
    submitted.insert(raiders, vec![ids.issue(ActionKind::Rest { troops: 1 })]);
    let book = planner.plan(&state, submitted.clone()).expect("plan");
    assert_eq!(book[&raiders], submitted[&raiders]);

    let mut unknown = ActionBook::new();
    unknown.insert(FactionId(404), Vec::new());
    assert!(planner.plan(&state, unknown).is_err());
}

#[test]
fn planning_is_reproducible() {
    let scenario = scenario_loader()
        .load("scenarios/ash_valley.yaml")
        .expect("scenario should load");
    let state = scenario.build_game().expect("game builds");
    let first = scenario.planner().plan(&state, ActionBook::new()).expect("plan");
    let second = scenario.planner().plan(&state, ActionBook::new()).expect("plan");
    assert_eq!(first, second);
}

#[test]
fn advance_hands_book_to_resolver_and_counts_turns() {
    let scenario = scenario_loader()
        .load("scenarios/ash_valley.yaml")
        .expect("scenario should load");
    let mut state = scenario.build_game().expect("game builds");
    let planner = scenario.planner();
    let mut recorder = Recorder::default();

    let mut turns = Vec::new();
    planner
        .run_with_hook(&mut state, 4, &mut recorder, |summary, _| turns.push(summary.turn))
        .expect("run succeeds");
    assert_eq!(turns, vec![0, 1, 2, 3]);
    assert_eq!(state.turn(), 4);
    assert_eq!(recorder.books.len(), 4);
    for (turn, book) in recorder.books.iter().enumerate() {
        for actions in book.values() {
            assert!(actions.iter().all(|a| a.id.turn == turn as u32));
        }
    }
}

#[test]
fn loads_scenario_from_temp_dir() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("duel.yaml"),
        "name: duel\nseed: 3\nturns: 2\nworld:\n  radius: 12\nfactions:\n  - name: Left\n    archetype: raiders\n  - name: Right\n    archetype: traders\n",
    )
    .expect("write scenario");
    let scenario = ScenarioLoader::new(dir.path()).load("duel.yaml").expect("load");
    let mut state = scenario.build_game().expect("game builds");
    let planner = TurnPlanner::new(scenario.seed, scenario.ai.clone());
    let (summary, book) = planner
        .advance(&mut state, ActionBook::new(), &mut IdleResolver)
        .expect("advance");
    assert_eq!(summary.turn, 0);
    assert_eq!(summary.ai_planned, 2);
    assert_eq!(book.len(), 2);
    assert_eq!(state.turn(), 1);
}

#[test]
fn missing_scenario_reports_path() {
    let err = scenario_loader().load("scenarios/nowhere.yaml").unwrap_err();
    assert!(err.to_string().contains("nowhere.yaml"));
}

#[test]
fn regenerate_keeps_factions() {
    let mut state = GameState::generate(14, 2, &Default::default());
    state.join("Solo", Controller::Human).expect("join");
    state.regenerate(9, 8, &Default::default());
    assert_eq!(state.factions().len(), 1);
    assert_eq!(state.map().radius(), 9);
}
