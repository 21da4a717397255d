//! Procedural world generation.
//!
//! Terrain comes from two blended noise fields bucketed into elevation bands,
//! then a seeded weighted pick inside each band. Ruins are scattered on top,
//! points of interest are dealt out per kind, and finally starting locations
//! are picked from a ring around the centre.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hex::{axial_distance, hexes_in_range, Axial};
use crate::noise::NoiseField;
use crate::rng::LcgRng;
use crate::world::{HexCell, PoiId, PoiKind, PointOfInterest, TerrainKind, WorldMap};

const NOISE_FREQUENCY: f64 = 0.12;
const SECOND_FIELD_OFFSET: u64 = 7919;
const RUINS_FRACTION: f64 = 0.05;
const START_INNER_FRACTION: f64 = 0.3;
const START_OUTER_FRACTION: f64 = 0.8;
pub const MAX_STARTING_LOCATIONS: usize = 16;

fn default_start_spacing() -> i32 {
    4
}

/// Terrain bias weights plus starting-location spacing.
///
/// Bias weights are relative: a terrain missing from the map counts as `1.0`,
/// and the weights are normalized against their mean before use, so only the
/// ratios matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    #[serde(default)]
    pub terrain_bias: BTreeMap<TerrainKind, f64>,
    #[serde(default = "default_start_spacing")]
    pub start_spacing: i32,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            terrain_bias: BTreeMap::new(),
            start_spacing: default_start_spacing(),
        }
    }
}

impl MapSettings {
    pub fn with_bias(mut self, terrain: TerrainKind, weight: f64) -> Self {
        self.terrain_bias.insert(terrain, weight);
        self
    }

    fn bias_multipliers(&self) -> BTreeMap<TerrainKind, f64> {
        let raw: Vec<(TerrainKind, f64)> = TerrainKind::ALL
            .into_iter()
            .map(|kind| {
                let weight = self.terrain_bias.get(&kind).copied().unwrap_or(1.0);
                let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
                (kind, weight)
            })
            .collect();
        let mean = raw.iter().map(|(_, w)| w).sum::<f64>() / raw.len() as f64;
        raw.into_iter()
            .map(|(kind, weight)| {
                let multiplier = if mean > 0.0 { weight / mean } else { 1.0 };
                (kind, multiplier)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWorld {
    pub map: WorldMap,
    pub starting_locations: Vec<Axial>,
}

struct Band {
    upper: f64,
    terrains: &'static [(TerrainKind, f64)],
}

static BANDS: [Band; 5] = [
    Band {
        upper: -0.2,
        terrains: &[(TerrainKind::Water, 0.7), (TerrainKind::Swamp, 0.3)],
    },
    Band {
        upper: -0.06,
        terrains: &[
            (TerrainKind::Plains, 0.45),
            (TerrainKind::Forest, 0.35),
            (TerrainKind::Swamp, 0.2),
        ],
    },
    Band {
        upper: 0.06,
        terrains: &[
            (TerrainKind::Plains, 0.4),
            (TerrainKind::Desert, 0.3),
            (TerrainKind::Wasteland, 0.3),
        ],
    },
    Band {
        upper: 0.2,
        terrains: &[
            (TerrainKind::Wasteland, 0.4),
            (TerrainKind::Mountains, 0.35),
            (TerrainKind::Crater, 0.25),
        ],
    },
    Band {
        upper: f64::INFINITY,
        terrains: &[
            (TerrainKind::Mountains, 0.6),
            (TerrainKind::Radiation, 0.25),
            (TerrainKind::Crater, 0.15),
        ],
    },
];

struct PoiRule {
    kind: PoiKind,
    count: usize,
    terrains: &'static [TerrainKind],
}

static POI_RULES: [PoiRule; 13] = [
    PoiRule {
        kind: PoiKind::Scrapyard,
        count: 6,
        terrains: &[TerrainKind::Ruins, TerrainKind::Wasteland, TerrainKind::Desert],
    },
    PoiRule {
        kind: PoiKind::FoodSource,
        count: 6,
        terrains: &[TerrainKind::Plains, TerrainKind::Forest, TerrainKind::Swamp],
    },
    PoiRule {
        kind: PoiKind::WeaponsCache,
        count: 4,
        terrains: &[TerrainKind::Ruins, TerrainKind::Mountains, TerrainKind::Wasteland],
    },
    PoiRule {
        kind: PoiKind::ResearchLab,
        count: 2,
        terrains: &[TerrainKind::Ruins, TerrainKind::Desert, TerrainKind::Plains],
    },
    PoiRule {
        kind: PoiKind::Settlement,
        count: 4,
        terrains: &[TerrainKind::Plains, TerrainKind::Forest, TerrainKind::Desert],
    },
    PoiRule {
        kind: PoiKind::Ruins,
        count: 5,
        terrains: &[TerrainKind::Ruins],
    },
    PoiRule {
        kind: PoiKind::BanditCamp,
        count: 4,
        terrains: &[
            TerrainKind::Wasteland,
            TerrainKind::Desert,
            TerrainKind::Mountains,
            TerrainKind::Forest,
        ],
    },
    PoiRule {
        kind: PoiKind::Mine,
        count: 3,
        terrains: &[TerrainKind::Mountains],
    },
    PoiRule {
        kind: PoiKind::Vault,
        count: 1,
        terrains: &[TerrainKind::Mountains, TerrainKind::Ruins],
    },
    PoiRule {
        kind: PoiKind::Battlefield,
        count: 3,
        terrains: &[TerrainKind::Wasteland, TerrainKind::Crater, TerrainKind::Plains],
    },
    PoiRule {
        kind: PoiKind::Factory,
        count: 2,
        terrains: &[TerrainKind::Ruins, TerrainKind::Wasteland],
    },
    PoiRule {
        kind: PoiKind::Crater,
        count: 3,
        terrains: &[TerrainKind::Crater],
    },
    PoiRule {
        kind: PoiKind::Radiation,
        count: 3,
        terrains: &[TerrainKind::Radiation],
    },
];

/// Generate a world. Identical inputs always produce an identical world.
pub fn generate(radius: i32, seed: u64, settings: &MapSettings) -> GeneratedWorld {
    let radius = radius.max(0);
    let mut rng = LcgRng::new(seed);
    let primary = NoiseField::new(seed);
    let secondary = NoiseField::new(seed.wrapping_add(SECOND_FIELD_OFFSET));
    let multipliers = settings.bias_multipliers();

    let mut cells: BTreeMap<Axial, HexCell> = BTreeMap::new();
    for coord in hexes_in_range(Axial::ORIGIN, radius) {
        let (x, y) = coord.to_planar();
        let a = primary.sample(x * NOISE_FREQUENCY, y * NOISE_FREQUENCY);
        // Rotate the second sample so both fields don't share lattice axes.
        let b = secondary.sample(
            (x * 0.6 - y * 0.8) * NOISE_FREQUENCY,
            (x * 0.8 + y * 0.6) * NOISE_FREQUENCY,
        );
        let terrain = pick_terrain((a + b) / 2.0, &multipliers, &mut rng);
        cells.insert(coord, HexCell::new(coord, terrain));
    }
    debug!(radius, seed, hexes = cells.len(), "terrain assigned");

    let ruins = scatter_ruins(&mut cells, &mut rng);
    debug!(ruins, "landmark ruins scattered");

    let placed = place_points_of_interest(&mut cells, &mut rng);
    debug!(placed, "points of interest placed");

    let starting_locations = pick_starting_locations(&cells, radius, settings.start_spacing, &mut rng);
    debug!(count = starting_locations.len(), "starting locations selected");

    GeneratedWorld {
        map: WorldMap::from_parts(radius, cells),
        starting_locations,
    }
}

fn pick_terrain(
    value: f64,
    multipliers: &BTreeMap<TerrainKind, f64>,
    rng: &mut LcgRng,
) -> TerrainKind {
    let band = BANDS
        .iter()
        .find(|band| value < band.upper)
        .unwrap_or(&BANDS[BANDS.len() - 1]);
    let weights: Vec<f64> = band
        .terrains
        .iter()
        .map(|(kind, base)| base * multipliers.get(kind).copied().unwrap_or(1.0))
        .collect();
    let index = match rng.weighted_index(&weights) {
        Some(index) => index,
        // Every terrain in this band was biased to zero; fall back to the
        // band's own weights.
        None => {
            let base: Vec<f64> = band.terrains.iter().map(|(_, w)| *w).collect();
            rng.weighted_index(&base).unwrap_or(0)
        }
    };
    band.terrains[index].0
}

fn scatter_ruins(cells: &mut BTreeMap<Axial, HexCell>, rng: &mut LcgRng) -> usize {
    let mut pool: Vec<Axial> = cells
        .values()
        .filter(|cell| cell.terrain != TerrainKind::Water)
        .map(HexCell::coord)
        .collect();
    let count = (pool.len() as f64 * RUINS_FRACTION).round() as usize;
    for _ in 0..count {
        let coord = pool.swap_remove(rng.below(pool.len()));
        if let Some(cell) = cells.get_mut(&coord) {
            cell.terrain = TerrainKind::Ruins;
        }
    }
    count
}

fn place_points_of_interest(cells: &mut BTreeMap<Axial, HexCell>, rng: &mut LcgRng) -> usize {
    let mut next_id = 0u32;
    for rule in &POI_RULES {
        let mut candidates: Vec<Axial> = cells
            .values()
            .filter(|cell| cell.poi.is_none() && rule.terrains.contains(&cell.terrain))
            .map(HexCell::coord)
            .collect();
        for _ in 0..rule.count {
            if candidates.is_empty() {
                break;
            }
            let coord = candidates.swap_remove(rng.below(candidates.len()));
            let difficulty = rng.range_inclusive(1, 10);
            if let Some(cell) = cells.get_mut(&coord) {
                cell.poi = Some(PointOfInterest {
                    id: PoiId(next_id),
                    kind: rule.kind,
                    difficulty,
                    rarity: rule.kind.rarity(),
                });
                next_id += 1;
            }
        }
    }
    next_id as usize
}

fn pick_starting_locations(
    cells: &BTreeMap<Axial, HexCell>,
    radius: i32,
    spacing: i32,
    rng: &mut LcgRng,
) -> Vec<Axial> {
    let inner = radius as f64 * START_INNER_FRACTION;
    let outer = radius as f64 * START_OUTER_FRACTION;
    let mut candidates: Vec<Axial> = cells
        .values()
        .filter(|cell| matches!(cell.terrain, TerrainKind::Plains | TerrainKind::Forest))
        .filter(|cell| cell.poi.is_none())
        .map(HexCell::coord)
        .filter(|coord| {
            let distance = axial_distance(Axial::ORIGIN, *coord) as f64;
            distance >= inner && distance <= outer
        })
        .collect();
    rng.shuffle(&mut candidates);

    let mut accepted: Vec<Axial> = Vec::new();
    for candidate in candidates {
        if accepted.len() >= MAX_STARTING_LOCATIONS {
            break;
        }
        if accepted
            .iter()
            .all(|other| axial_distance(*other, candidate) >= spacing)
        {
            accepted.push(candidate);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_covers_radius() {
        let world = generate(6, 11, &MapSettings::default());
        assert_eq!(world.map.len(), 1 + 3 * 6 * 7);
        assert_eq!(world.map.radius(), 6);
        assert!(world
            .map
            .coords()
            .all(|c| axial_distance(Axial::ORIGIN, c) <= 6));
    }

    #[test]
    fn test_bias_multipliers_normalize() {
        let uniform = MapSettings::default().bias_multipliers();
        assert!(uniform.values().all(|m| (*m - 1.0).abs() < 1e-9));

        let all_zero = TerrainKind::ALL
            .into_iter()
            .fold(MapSettings::default(), |s, kind| s.with_bias(kind, 0.0));
        assert!(all_zero.bias_multipliers().values().all(|m| *m == 1.0));

        let skewed = MapSettings::default().with_bias(TerrainKind::Forest, 11.0);
        let multipliers = skewed.bias_multipliers();
        assert!(multipliers[&TerrainKind::Forest] > multipliers[&TerrainKind::Plains]);
    }

    #[test]
    fn test_zero_bias_excludes_terrain() {
        let settings = MapSettings::default()
            .with_bias(TerrainKind::Water, 0.0)
            .with_bias(TerrainKind::Radiation, 0.0);
        let world = generate(10, 3, &settings);
        assert!(world.map.cells().all(|cell| cell.terrain != TerrainKind::Water));
        assert!(world
            .map
            .cells()
            .all(|cell| cell.terrain != TerrainKind::Radiation));
    }

    #[test]
    fn test_ruins_scattered() {
        let settings = MapSettings::default().with_bias(TerrainKind::Ruins, 0.0);
        let world = generate(12, 21, &settings);
        let non_water = world
            .map
            .cells()
            .filter(|cell| cell.terrain != TerrainKind::Water)
            .count();
        let ruins = world
            .map
            .cells()
            .filter(|cell| cell.terrain == TerrainKind::Ruins)
            .count();
        assert_eq!(ruins, (non_water as f64 * RUINS_FRACTION).round() as usize);
    }

    #[test]
    fn test_poi_terrain_compatibility() {
        let world = generate(14, 8, &MapSettings::default());
        for cell in world.map.cells() {
            if let Some(poi) = &cell.poi {
                let rule = POI_RULES.iter().find(|r| r.kind == poi.kind).unwrap();
                assert!(rule.terrains.contains(&cell.terrain));
                assert!((1..=10).contains(&poi.difficulty));
                assert_eq!(poi.rarity, poi.kind.rarity());
            }
        }
    }
}
