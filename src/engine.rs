use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::action::ActionBook;
use crate::ai::{AiTuning, FactionAi};
use crate::error::WastelandError;
use crate::faction::{Controller, DiplomaticStatus, Faction, FactionId, Garrison, Resources};
use crate::hex::{hexes_in_range, Axial};
use crate::rng::RngManager;
use crate::world::WorldMap;
use crate::worldgen::{self, GeneratedWorld, MapSettings};

/// What a faction starts with when it joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingKit {
    pub troops: u32,
    pub weapons: u32,
    pub food: u32,
    pub scrap: u32,
    pub morale: u32,
    pub explore_radius: i32,
}

impl Default for StartingKit {
    fn default() -> Self {
        Self {
            troops: 20,
            weapons: 10,
            food: 150,
            scrap: 60,
            morale: 50,
            explore_radius: 2,
        }
    }
}

/// The authoritative state of one game: an immutable map shared with
/// readers, the factions, and the turn counter.
#[derive(Debug, Clone)]
pub struct GameState {
    turn: u32,
    map: Arc<WorldMap>,
    starting_locations: Vec<Axial>,
    factions: Vec<Faction>,
    next_faction: u32,
    kit: StartingKit,
}

impl GameState {
    pub fn new(world: GeneratedWorld) -> Self {
        Self {
            turn: 0,
            map: Arc::new(world.map),
            starting_locations: world.starting_locations,
            factions: Vec::new(),
            next_faction: 1,
            kit: StartingKit::default(),
        }
    }

    pub fn generate(radius: i32, seed: u64, settings: &MapSettings) -> Self {
        Self::new(worldgen::generate(radius, seed, settings))
    }

    pub fn with_starting_kit(mut self, kit: StartingKit) -> Self {
        self.kit = kit;
        self
    }

    /// Replace the map and starting locations. Factions are kept as they are.
    pub fn regenerate(&mut self, radius: i32, seed: u64, settings: &MapSettings) {
        let world = worldgen::generate(radius, seed, settings);
        self.map = Arc::new(world.map);
        self.starting_locations = world.starting_locations;
        let stranded = self
            .factions
            .iter()
            .filter(|f| !self.map.contains(f.location))
            .count();
        if stranded > 0 {
            warn!(stranded, "capitals fall outside the regenerated map");
        }
        info!(radius, seed, hexes = self.map.len(), "world regenerated");
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    pub fn shared_map(&self) -> Arc<WorldMap> {
        Arc::clone(&self.map)
    }

    pub fn starting_locations(&self) -> &[Axial] {
        &self.starting_locations
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.iter().find(|f| f.id == id)
    }

    pub fn faction_mut(&mut self, id: FactionId) -> Option<&mut Faction> {
        self.factions.iter_mut().find(|f| f.id == id)
    }

    /// Add a faction at the first starting location not already taken.
    pub fn join(&mut self, name: &str, controller: Controller) -> crate::error::Result<FactionId> {
        let start = self
            .starting_locations
            .iter()
            .copied()
            .find(|loc| self.factions.iter().all(|f| f.location != *loc))
            .ok_or_else(|| WastelandError::NoStartingLocation(name.to_string()))?;

        let id = FactionId(self.next_faction);
        self.next_faction += 1;

        let mut faction = Faction::new(id, name, controller, start);
        faction
            .garrisons
            .insert(start, Garrison::new(self.kit.troops, self.kit.weapons));
        faction.resources = Resources {
            food: self.kit.food,
            scrap: self.kit.scrap,
            morale: self.kit.morale,
        };
        faction.explored = hexes_in_range(start, self.kit.explore_radius)
            .into_iter()
            .filter(|coord| self.map.contains(*coord))
            .collect();
        info!(faction = %id, name, location = %start, "faction joined");
        self.factions.push(faction);
        Ok(id)
    }

    pub fn set_relation(
        &mut self,
        a: FactionId,
        b: FactionId,
        status: DiplomaticStatus,
    ) -> crate::error::Result<()> {
        for (me, other) in [(a, b), (b, a)] {
            self.faction_mut(me)
                .ok_or(WastelandError::UnknownFaction(me))?
                .set_status(other, status);
        }
        Ok(())
    }

    /// Direct access for the turn resolver.
    pub fn factions_mut(&mut self) -> &mut [Faction] {
        &mut self.factions
    }
}

/// Applies a turn's actions to the game state. Combat, diplomacy and
/// economy rules live behind this seam.
pub trait TurnResolver {
    fn name(&self) -> &str;
    fn resolve(&mut self, state: &mut GameState, actions: &ActionBook) -> Result<()>;
}

/// Resolver that applies nothing; turns only advance the counter.
#[derive(Debug, Default)]
pub struct IdleResolver;

impl TurnResolver for IdleResolver {
    fn name(&self) -> &str {
        "idle"
    }

    fn resolve(&mut self, _state: &mut GameState, _actions: &ActionBook) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TurnSummary {
    pub turn: u32,
    pub ai_planned: usize,
    pub submitted: usize,
    pub actions: usize,
    pub resolver: String,
    pub duration_ms: f64,
}

/// Fills in AI action sets and hands each turn to the resolver.
pub struct TurnPlanner {
    ai: FactionAi,
    rng: RngManager,
}

impl TurnPlanner {
    pub fn new(seed: u64, tuning: AiTuning) -> Self {
        Self {
            ai: FactionAi::new(tuning),
            rng: RngManager::new(seed),
        }
    }

    /// Plan every AI faction that has no submitted action set. Each faction
    /// gets its own RNG stream, so the result does not depend on planning
    /// order.
    pub fn plan(&self, state: &GameState, mut submitted: ActionBook) -> Result<ActionBook> {
        if let Some(unknown) = submitted.keys().find(|id| state.faction(**id).is_none()) {
            return Err(WastelandError::UnknownFaction(*unknown).into());
        }
        let map = state.map();
        for faction in state.factions().iter().filter(|f| f.is_ai()) {
            if submitted.contains_key(&faction.id) {
                continue;
            }
            let mut rng = self.rng.faction_rng(faction.id.0, state.turn());
            let actions = self
                .ai
                .decide(faction, state.factions(), map, state.turn(), &mut rng);
            submitted.insert(faction.id, actions);
        }
        Ok(submitted)
    }

    /// Plan, resolve and advance one turn.
    pub fn advance(
        &self,
        state: &mut GameState,
        submitted: ActionBook,
        resolver: &mut dyn TurnResolver,
    ) -> Result<(TurnSummary, ActionBook)> {
        let start = Instant::now();
        let submitted_count = submitted.len();
        let book = self.plan(state, submitted)?;
        resolver.resolve(state, &book)?;
        let summary = TurnSummary {
            turn: state.turn,
            ai_planned: book.len() - submitted_count,
            submitted: submitted_count,
            actions: book.values().map(Vec::len).sum(),
            resolver: resolver.name().to_string(),
            duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
        };
        state.turn += 1;
        info!(
            turn = summary.turn,
            ai_planned = summary.ai_planned,
            actions = summary.actions,
            "turn advanced"
        );
        Ok((summary, book))
    }

    /// Advance `turns` turns with no human submissions, calling `hook` after
    /// each one.
    pub fn run_with_hook<F>(
        &self,
        state: &mut GameState,
        turns: u32,
        resolver: &mut dyn TurnResolver,
        mut hook: F,
    ) -> Result<()>
    where
        F: FnMut(&TurnSummary, &ActionBook),
    {
        for _ in 0..turns {
            let (summary, book) = self.advance(state, ActionBook::new(), resolver)?;
            hook(&summary, &book);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::Archetype;

    fn state() -> GameState {
        GameState::generate(12, 5, &MapSettings::default())
    }

    #[test]
    fn test_join_uses_starting_locations_in_order() {
        let mut state = state();
        let starts = state.starting_locations().to_vec();
        assert!(starts.len() >= 2, "fixture world should offer two starts");
        let a = state.join("Ash Walkers", Controller::Human).unwrap();
        let b = state
            .join(
                "Chrome Saints",
                Controller::Ai {
                    archetype: Archetype::Zealots,
                },
            )
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(state.faction(a).unwrap().location, starts[0]);
        assert_eq!(state.faction(b).unwrap().location, starts[1]);
        let faction = state.faction(a).unwrap();
        assert!(faction.explored.contains(&starts[0]));
        assert_eq!(faction.total_troops(), StartingKit::default().troops);
    }

    #[test]
    fn test_join_fails_when_starts_exhausted() {
        let mut state = GameState::generate(0, 1, &MapSettings::default());
        let available = state.starting_locations().len();
        for i in 0..available {
            state.join(&format!("tribe {i}"), Controller::Human).unwrap();
        }
        assert!(matches!(
            state.join("latecomer", Controller::Human),
            Err(WastelandError::NoStartingLocation(_))
        ));
    }

    #[test]
    fn test_set_relation_is_mutual() {
        let mut state = state();
        let a = state.join("A", Controller::Human).unwrap();
        let b = state.join("B", Controller::Human).unwrap();
        state.set_relation(a, b, DiplomaticStatus::War).unwrap();
        assert_eq!(state.faction(a).unwrap().status_with(b), DiplomaticStatus::War);
        assert_eq!(state.faction(b).unwrap().status_with(a), DiplomaticStatus::War);
        assert!(state
            .set_relation(a, FactionId(99), DiplomaticStatus::Alliance)
            .is_err());
    }

    #[test]
    fn test_regenerate_replaces_map() {
        let mut state = state();
        let before = state.shared_map();
        state.regenerate(4, 77, &MapSettings::default());
        assert_eq!(state.map().radius(), 4);
        assert_eq!(before.radius(), 12);
    }
}
