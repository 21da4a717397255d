use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WastelandError};
use crate::hex::Axial;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactionId(pub u32);

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Raiders,
    Settlers,
    Traders,
    Survivalists,
    Zealots,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::Raiders,
        Archetype::Settlers,
        Archetype::Traders,
        Archetype::Survivalists,
        Archetype::Zealots,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Raiders => "raiders",
            Archetype::Settlers => "settlers",
            Archetype::Traders => "traders",
            Archetype::Survivalists => "survivalists",
            Archetype::Zealots => "zealots",
        }
    }

    pub fn personality(self) -> Personality {
        match self {
            Archetype::Raiders => Personality::new(0.8, 0.3, 0.1),
            Archetype::Settlers => Personality::new(0.2, 0.8, 0.5),
            Archetype::Traders => Personality::new(0.1, 0.4, 0.9),
            Archetype::Survivalists => Personality::new(0.15, 0.2, 0.3),
            Archetype::Zealots => Personality::new(0.6, 0.6, 0.0),
        }
    }
}

impl FromStr for Archetype {
    type Err = WastelandError;

    fn from_str(value: &str) -> Result<Self> {
        Archetype::ALL
            .into_iter()
            .find(|a| a.as_str() == value)
            .ok_or_else(|| WastelandError::UnknownArchetype(value.to_string()))
    }
}

/// Decision weights, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub aggressiveness: f64,
    pub expansionism: f64,
    pub trading: f64,
}

impl Personality {
    pub fn new(aggressiveness: f64, expansionism: f64, trading: f64) -> Self {
        Self {
            aggressiveness: aggressiveness.clamp(0.0, 1.0),
            expansionism: expansionism.clamp(0.0, 1.0),
            trading: trading.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Controller {
    Human,
    Ai { archetype: Archetype },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RationLevel {
    Hard,
    #[default]
    Normal,
    Generous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiplomaticStatus {
    #[default]
    Neutral,
    Alliance,
    War,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Relation {
    pub status: DiplomaticStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Garrison {
    pub troops: u32,
    pub weapons: u32,
    #[serde(default)]
    pub leaders: Vec<String>,
}

impl Garrison {
    pub fn new(troops: u32, weapons: u32) -> Self {
        Self {
            troops,
            weapons,
            leaders: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Resources {
    pub food: u32,
    pub scrap: u32,
    pub morale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchProgress {
    pub tech_id: String,
    pub progress: u32,
}

/// A tribe, human or AI controlled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub controller: Controller,
    /// Capital.
    pub location: Axial,
    pub garrisons: BTreeMap<Axial, Garrison>,
    pub resources: Resources,
    #[serde(default)]
    pub explored: BTreeSet<Axial>,
    #[serde(default)]
    pub rations: RationLevel,
    #[serde(default)]
    pub completed_research: BTreeSet<String>,
    #[serde(default)]
    pub research: Option<ResearchProgress>,
    #[serde(default)]
    pub assets: Vec<String>,
    #[serde(default)]
    pub relations: BTreeMap<FactionId, Relation>,
}

impl Faction {
    pub fn new(id: FactionId, name: impl Into<String>, controller: Controller, location: Axial) -> Self {
        Self {
            id,
            name: name.into(),
            controller,
            location,
            garrisons: BTreeMap::new(),
            resources: Resources::default(),
            explored: BTreeSet::new(),
            rations: RationLevel::default(),
            completed_research: BTreeSet::new(),
            research: None,
            assets: Vec::new(),
            relations: BTreeMap::new(),
        }
    }

    pub fn archetype(&self) -> Option<Archetype> {
        match self.controller {
            Controller::Ai { archetype } => Some(archetype),
            Controller::Human => None,
        }
    }

    pub fn is_ai(&self) -> bool {
        self.archetype().is_some()
    }

    pub fn total_troops(&self) -> u32 {
        self.garrisons.values().map(|g| g.troops).sum()
    }

    pub fn total_weapons(&self) -> u32 {
        self.garrisons.values().map(|g| g.weapons).sum()
    }

    pub fn status_with(&self, other: FactionId) -> DiplomaticStatus {
        self.relations
            .get(&other)
            .map(|relation| relation.status)
            .unwrap_or_default()
    }

    pub fn set_status(&mut self, other: FactionId, status: DiplomaticStatus) {
        self.relations.entry(other).or_default().status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_sum_garrisons() {
        let mut faction = Faction::new(FactionId(1), "Rust Eaters", Controller::Human, Axial::ORIGIN);
        faction.garrisons.insert(Axial::ORIGIN, Garrison::new(10, 4));
        faction.garrisons.insert(Axial::new(2, -1), Garrison::new(5, 1));
        assert_eq!(faction.total_troops(), 15);
        assert_eq!(faction.total_weapons(), 5);
        assert!(!faction.is_ai());
    }

    #[test]
    fn test_personality_table_in_unit_range() {
        for archetype in Archetype::ALL {
            let p = archetype.personality();
            for v in [p.aggressiveness, p.expansionism, p.trading] {
                assert!((0.0..=1.0).contains(&v));
            }
            assert_eq!(archetype.as_str().parse::<Archetype>().unwrap(), archetype);
        }
        assert!("pirates".parse::<Archetype>().is_err());
    }

    #[test]
    fn test_relations_default_neutral() {
        let mut faction = Faction::new(
            FactionId(1),
            "Dust Kings",
            Controller::Ai {
                archetype: Archetype::Raiders,
            },
            Axial::ORIGIN,
        );
        assert_eq!(faction.status_with(FactionId(2)), DiplomaticStatus::Neutral);
        faction.set_status(FactionId(2), DiplomaticStatus::War);
        assert_eq!(faction.status_with(FactionId(2)), DiplomaticStatus::War);
    }

    #[test]
    fn test_faction_serde_uses_tokens() {
        let mut faction = Faction::new(FactionId(3), "Glass Wardens", Controller::Human, Axial::new(-2, 1));
        faction.garrisons.insert(Axial::new(-2, 1), Garrison::new(8, 2));
        let json = serde_json::to_string(&faction).unwrap();
        assert!(json.contains("\"-002.001\""));
        let back: Faction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, faction);
    }
}
