use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::ai::AiTuning;
use crate::engine::{GameState, StartingKit, TurnPlanner};
use crate::faction::{Archetype, Controller, DiplomaticStatus, FactionId};
use crate::worldgen::MapSettings;

fn default_turns() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub turns: Option<u32>,
    pub world: ScenarioWorld,
    #[serde(default)]
    pub starting_kit: StartingKit,
    #[serde(default)]
    pub factions: Vec<ScenarioFaction>,
    #[serde(default)]
    pub wars: Vec<[String; 2]>,
    #[serde(default)]
    pub ai: AiTuning,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioWorld {
    pub radius: i32,
    /// Map seed; the game seed is used when omitted.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub settings: MapSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFaction {
    pub name: String,
    /// Absent for human-controlled factions.
    #[serde(default)]
    pub archetype: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl ScenarioFaction {
    pub fn controller(&self) -> Result<Controller> {
        match &self.archetype {
            None => Ok(Controller::Human),
            Some(name) => {
                let archetype: Archetype = name
                    .parse()
                    .with_context(|| format!("faction '{}'", self.name))?;
                Ok(Controller::Ai { archetype })
            }
        }
    }
}

impl Scenario {
    pub fn map_seed(&self) -> u64 {
        self.world.seed.unwrap_or(self.seed)
    }

    pub fn turns(&self, override_turns: Option<u32>) -> u32 {
        override_turns.or(self.turns).unwrap_or_else(default_turns)
    }

    /// Generate the map, join every faction in listed order and declare the
    /// listed wars.
    pub fn build_game(&self) -> Result<GameState> {
        let mut state = GameState::generate(self.world.radius, self.map_seed(), &self.world.settings)
            .with_starting_kit(self.starting_kit.clone());
        for faction in &self.factions {
            let controller = faction.controller()?;
            state
                .join(&faction.name, controller)
                .with_context(|| format!("scenario '{}'", self.name))?;
        }
        for [a, b] in &self.wars {
            let a = self.faction_id(&state, a)?;
            let b = self.faction_id(&state, b)?;
            state.set_relation(a, b, DiplomaticStatus::War)?;
        }
        Ok(state)
    }

    pub fn planner(&self) -> TurnPlanner {
        TurnPlanner::new(self.seed, self.ai.clone())
    }

    fn faction_id(&self, state: &GameState, name: &str) -> Result<FactionId> {
        state
            .factions()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.id)
            .ok_or_else(|| anyhow!("war declared on unknown faction '{name}'"))
    }
}
