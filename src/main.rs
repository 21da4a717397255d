use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use wasteland::{
    engine::IdleResolver,
    scenario::ScenarioLoader,
    world::TerrainKind,
    worldgen::{self, MapSettings},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Wasteland world generator and turn planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a world and print it as JSON
    Generate {
        #[arg(long, default_value_t = 20)]
        radius: i32,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Terrain bias as `terrain=weight`; repeatable
        #[arg(long = "bias", value_parser = parse_bias)]
        biases: Vec<(TerrainKind, f64)>,

        /// Minimum distance between starting locations
        #[arg(long)]
        start_spacing: Option<i32>,

        /// Write the JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load a scenario and print the planned actions for each turn
    Plan {
        /// Path to the scenario YAML file
        #[arg(long, default_value = "scenarios/ash_valley.yaml")]
        scenario: PathBuf,

        /// Override turn count (uses scenario default when omitted)
        #[arg(long)]
        turns: Option<u32>,
    },
}

fn parse_bias(value: &str) -> std::result::Result<(TerrainKind, f64), String> {
    let (terrain, weight) = value
        .split_once('=')
        .ok_or_else(|| format!("expected terrain=weight, got '{value}'"))?;
    let terrain: TerrainKind = terrain.trim().parse().map_err(|err| format!("{err}"))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("invalid weight '{weight}'"))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("weight for {terrain} must be a non-negative number"));
    }
    Ok((terrain, weight))
}

fn map_settings(biases: Vec<(TerrainKind, f64)>, start_spacing: Option<i32>) -> MapSettings {
    let mut settings = biases
        .into_iter()
        .fold(MapSettings::default(), |settings, (terrain, weight)| {
            settings.with_bias(terrain, weight)
        });
    if let Some(spacing) = start_spacing {
        settings.start_spacing = spacing;
    }
    settings
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            radius,
            seed,
            biases,
            start_spacing,
            out,
        } => {
            init_logging("info");
            let settings = map_settings(biases, start_spacing);
            let world = worldgen::generate(radius, seed, &settings);
            info!(
                hexes = world.map.len(),
                pois = world.map.poi_count(),
                starts = world.starting_locations.len(),
                "world generated"
            );
            let json = serde_json::to_string_pretty(&world)?;
            match out {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Plan { scenario, turns } => {
            let scenario = ScenarioLoader::new(".").load(&scenario)?;
            init_logging(&scenario.logging.level);
            let mut state = scenario.build_game()?;
            let planner = scenario.planner();
            let turns = scenario.turns(turns);
            let mut resolver = IdleResolver;
            let mut failure = None;
            planner.run_with_hook(&mut state, turns, &mut resolver, |summary, book| {
                match serde_json::to_string(book) {
                    Ok(json) => println!("{{\"turn\":{},\"actions\":{json}}}", summary.turn),
                    Err(err) => {
                        failure.get_or_insert(err);
                    }
                }
            })?;
            if let Some(err) = failure {
                return Err(err).context("Failed to encode action book");
            }
            println!(
                "Scenario '{}' planned for {} turns with {} factions.",
                scenario.name,
                turns,
                state.factions().len()
            );
        }
    }
    Ok(())
}
