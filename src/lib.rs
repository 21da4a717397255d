pub mod action;
pub mod ai;
pub mod engine;
pub mod error;
pub mod faction;
pub mod hex;
pub mod noise;
pub mod pathfinding;
pub mod rng;
pub mod scenario;
pub mod technology;
pub mod world;
pub mod worldgen;

pub use engine::{GameState, TurnPlanner, TurnResolver, TurnSummary};
pub use error::{Result, WastelandError};
pub use hex::Axial;
pub use scenario::{Scenario, ScenarioLoader};
pub use world::WorldMap;
