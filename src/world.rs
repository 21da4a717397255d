use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WastelandError};
use crate::hex::{axial_distance, Axial};

/// Terrain cost above which a hex cannot be entered.
pub const IMPASSABLE_COST: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Plains,
    Desert,
    Mountains,
    Forest,
    Ruins,
    Wasteland,
    Water,
    Radiation,
    Crater,
    Swamp,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 10] = [
        TerrainKind::Plains,
        TerrainKind::Desert,
        TerrainKind::Mountains,
        TerrainKind::Forest,
        TerrainKind::Ruins,
        TerrainKind::Wasteland,
        TerrainKind::Water,
        TerrainKind::Radiation,
        TerrainKind::Crater,
        TerrainKind::Swamp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TerrainKind::Plains => "plains",
            TerrainKind::Desert => "desert",
            TerrainKind::Mountains => "mountains",
            TerrainKind::Forest => "forest",
            TerrainKind::Ruins => "ruins",
            TerrainKind::Wasteland => "wasteland",
            TerrainKind::Water => "water",
            TerrainKind::Radiation => "radiation",
            TerrainKind::Crater => "crater",
            TerrainKind::Swamp => "swamp",
        }
    }

    /// Cost of stepping onto a hex of this terrain.
    pub fn movement_cost(self) -> f64 {
        match self {
            TerrainKind::Plains => 1.0,
            TerrainKind::Desert | TerrainKind::Ruins | TerrainKind::Wasteland => 1.5,
            TerrainKind::Forest | TerrainKind::Crater => 2.0,
            TerrainKind::Swamp => 2.5,
            TerrainKind::Mountains => 3.0,
            TerrainKind::Radiation => 10.0,
            TerrainKind::Water => 20.0,
        }
    }

    pub fn is_passable(self) -> bool {
        self.movement_cost() <= IMPASSABLE_COST
    }

    pub fn is_settleable(self) -> bool {
        !matches!(self, TerrainKind::Water | TerrainKind::Radiation)
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerrainKind {
    type Err = WastelandError;

    fn from_str(value: &str) -> Result<Self> {
        TerrainKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| WastelandError::UnknownTerrain(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    Scrapyard,
    FoodSource,
    WeaponsCache,
    ResearchLab,
    Settlement,
    Ruins,
    BanditCamp,
    Mine,
    Vault,
    Battlefield,
    Factory,
    Crater,
    Radiation,
}

impl PoiKind {
    pub const ALL: [PoiKind; 13] = [
        PoiKind::Scrapyard,
        PoiKind::FoodSource,
        PoiKind::WeaponsCache,
        PoiKind::ResearchLab,
        PoiKind::Settlement,
        PoiKind::Ruins,
        PoiKind::BanditCamp,
        PoiKind::Mine,
        PoiKind::Vault,
        PoiKind::Battlefield,
        PoiKind::Factory,
        PoiKind::Crater,
        PoiKind::Radiation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PoiKind::Scrapyard => "scrapyard",
            PoiKind::FoodSource => "food_source",
            PoiKind::WeaponsCache => "weapons_cache",
            PoiKind::ResearchLab => "research_lab",
            PoiKind::Settlement => "settlement",
            PoiKind::Ruins => "ruins",
            PoiKind::BanditCamp => "bandit_camp",
            PoiKind::Mine => "mine",
            PoiKind::Vault => "vault",
            PoiKind::Battlefield => "battlefield",
            PoiKind::Factory => "factory",
            PoiKind::Crater => "crater",
            PoiKind::Radiation => "radiation",
        }
    }

    pub fn rarity(self) -> Rarity {
        match self {
            PoiKind::Scrapyard | PoiKind::FoodSource | PoiKind::Ruins | PoiKind::Crater => {
                Rarity::Common
            }
            PoiKind::WeaponsCache
            | PoiKind::Settlement
            | PoiKind::BanditCamp
            | PoiKind::Mine
            | PoiKind::Radiation => Rarity::Uncommon,
            PoiKind::ResearchLab | PoiKind::Battlefield | PoiKind::Factory => Rarity::Rare,
            PoiKind::Vault => Rarity::Legendary,
        }
    }
}

impl fmt::Display for PoiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoiKind {
    type Err = WastelandError;

    fn from_str(value: &str) -> Result<Self> {
        PoiKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| WastelandError::UnknownPoiKind(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoiId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: PoiId,
    pub kind: PoiKind,
    pub difficulty: u8,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexCell {
    pub q: i32,
    pub r: i32,
    pub terrain: TerrainKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poi: Option<PointOfInterest>,
}

impl HexCell {
    pub fn new(coord: Axial, terrain: TerrainKind) -> Self {
        Self {
            q: coord.q,
            r: coord.r,
            terrain,
            poi: None,
        }
    }

    pub fn coord(&self) -> Axial {
        Axial::new(self.q, self.r)
    }
}

/// Serialized form of a [`WorldMap`]. Hex order is not significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRecord {
    pub radius: i32,
    pub hexes: Vec<HexCell>,
}

/// The generated world: one cell per coordinate, keyed by coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MapRecord", into = "MapRecord")]
pub struct WorldMap {
    radius: i32,
    cells: BTreeMap<Axial, HexCell>,
}

impl WorldMap {
    /// Build a map from arbitrary cells. Duplicate coordinates are rejected.
    pub fn from_cells(cells: impl IntoIterator<Item = HexCell>) -> Result<Self> {
        let mut map = BTreeMap::new();
        let mut radius = 0;
        for cell in cells {
            let coord = cell.coord();
            radius = radius.max(axial_distance(Axial::ORIGIN, coord));
            if map.insert(coord, cell).is_some() {
                return Err(WastelandError::DuplicateHex(coord));
            }
        }
        Ok(Self { radius, cells: map })
    }

    pub(crate) fn from_parts(radius: i32, cells: BTreeMap<Axial, HexCell>) -> Self {
        Self { radius, cells }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Axial) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn get(&self, coord: Axial) -> Option<&HexCell> {
        self.cells.get(&coord)
    }

    pub fn terrain(&self, coord: Axial) -> Option<TerrainKind> {
        self.cells.get(&coord).map(|cell| cell.terrain)
    }

    pub fn poi(&self, coord: Axial) -> Option<&PointOfInterest> {
        self.cells.get(&coord).and_then(|cell| cell.poi.as_ref())
    }

    /// Cells in ascending coordinate order.
    pub fn cells(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.values()
    }

    pub fn coords(&self) -> impl Iterator<Item = Axial> + '_ {
        self.cells.keys().copied()
    }

    pub fn poi_count(&self) -> usize {
        self.cells.values().filter(|cell| cell.poi.is_some()).count()
    }

    pub fn to_record(&self) -> MapRecord {
        MapRecord {
            radius: self.radius,
            hexes: self.cells.values().cloned().collect(),
        }
    }
}

impl TryFrom<MapRecord> for WorldMap {
    type Error = WastelandError;

    fn try_from(record: MapRecord) -> Result<Self> {
        let mut map = WorldMap::from_cells(record.hexes)?;
        map.radius = map.radius.max(record.radius);
        Ok(map)
    }
}

impl From<WorldMap> for MapRecord {
    fn from(map: WorldMap) -> Self {
        MapRecord {
            radius: map.radius,
            hexes: map.cells.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_names_round_trip() {
        for kind in TerrainKind::ALL {
            assert_eq!(kind.as_str().parse::<TerrainKind>().unwrap(), kind);
        }
        assert!(matches!(
            "lava".parse::<TerrainKind>(),
            Err(WastelandError::UnknownTerrain(_))
        ));
    }

    #[test]
    fn test_poi_names_round_trip() {
        for kind in PoiKind::ALL {
            assert_eq!(kind.as_str().parse::<PoiKind>().unwrap(), kind);
        }
        assert!("castle".parse::<PoiKind>().is_err());
    }

    #[test]
    fn test_movement_costs() {
        let plains = TerrainKind::Plains.movement_cost();
        assert!(TerrainKind::ALL
            .iter()
            .all(|kind| kind.movement_cost() >= plains));
        assert!(!TerrainKind::Water.is_passable());
        assert!(TerrainKind::Radiation.is_passable());
        assert!(TerrainKind::Mountains.is_passable());
    }

    #[test]
    fn test_duplicate_cells_rejected() {
        let cells = vec![
            HexCell::new(Axial::new(0, 0), TerrainKind::Plains),
            HexCell::new(Axial::new(0, 0), TerrainKind::Forest),
        ];
        assert!(matches!(
            WorldMap::from_cells(cells),
            Err(WastelandError::DuplicateHex(_))
        ));
    }

    #[test]
    fn test_map_record_serde() {
        let map = WorldMap::from_cells(vec![
            HexCell::new(Axial::new(0, 0), TerrainKind::Plains),
            HexCell::new(Axial::new(1, -1), TerrainKind::Swamp),
        ])
        .unwrap();
        assert_eq!(map.radius(), 1);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"swamp\""));
        let back: WorldMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);

        let duplicated = r#"{"radius":0,"hexes":[{"q":0,"r":0,"terrain":"plains"},{"q":0,"r":0,"terrain":"water"}]}"#;
        assert!(serde_json::from_str::<WorldMap>(duplicated).is_err());
        let unknown = r#"{"radius":0,"hexes":[{"q":0,"r":0,"terrain":"lava"}]}"#;
        assert!(serde_json::from_str::<WorldMap>(unknown).is_err());
    }
}
