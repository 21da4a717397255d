use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::world::TerrainKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Food,
    Scrap,
    Weapons,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TechEffect {
    /// Flat amount generated every turn.
    PassiveIncome { resource: ResourceKind, amount: u32 },
    /// Percentage bonus to scavenged yield of one resource.
    ScavengeBonus { resource: ResourceKind, percent: u32 },
    /// Percentage combat bonus, optionally limited to one terrain.
    CombatBonus {
        terrain: Option<TerrainKind>,
        percent: u32,
    },
    MovementBonus { hexes: u32 },
}

#[derive(Debug, Clone, Copy)]
pub struct TechDefinition {
    pub id: &'static str,
    pub display: &'static str,
    pub prerequisites: &'static [&'static str],
    pub scrap_cost: u32,
    pub required_troops: u32,
    pub effects: &'static [TechEffect],
}

impl TechDefinition {
    pub fn generates_food(&self) -> bool {
        self.effects.iter().any(|effect| {
            matches!(
                effect,
                TechEffect::PassiveIncome {
                    resource: ResourceKind::Food,
                    ..
                }
            )
        })
    }

    pub fn improves_combat(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, TechEffect::CombatBonus { .. }))
    }
}

const TECH_TREE: &[TechDefinition] = &[
    TechDefinition {
        id: "salvage_tools",
        display: "Salvage Tools",
        prerequisites: &[],
        scrap_cost: 20,
        required_troops: 2,
        effects: &[TechEffect::ScavengeBonus {
            resource: ResourceKind::Scrap,
            percent: 25,
        }],
    },
    TechDefinition {
        id: "hydroponics",
        display: "Hydroponics",
        prerequisites: &[],
        scrap_cost: 30,
        required_troops: 3,
        effects: &[TechEffect::PassiveIncome {
            resource: ResourceKind::Food,
            amount: 10,
        }],
    },
    TechDefinition {
        id: "scrap_armor",
        display: "Scrap Armor",
        prerequisites: &["salvage_tools"],
        scrap_cost: 35,
        required_troops: 3,
        effects: &[TechEffect::CombatBonus {
            terrain: None,
            percent: 10,
        }],
    },
    TechDefinition {
        id: "foraging",
        display: "Foraging",
        prerequisites: &["hydroponics"],
        scrap_cost: 25,
        required_troops: 2,
        effects: &[TechEffect::ScavengeBonus {
            resource: ResourceKind::Food,
            percent: 30,
        }],
    },
    TechDefinition {
        id: "dune_buggies",
        display: "Dune Buggies",
        prerequisites: &["salvage_tools"],
        scrap_cost: 45,
        required_troops: 4,
        effects: &[TechEffect::MovementBonus { hexes: 1 }],
    },
    TechDefinition {
        id: "mountain_warfare",
        display: "Mountain Warfare",
        prerequisites: &["scrap_armor"],
        scrap_cost: 50,
        required_troops: 5,
        effects: &[TechEffect::CombatBonus {
            terrain: Some(TerrainKind::Mountains),
            percent: 25,
        }],
    },
    TechDefinition {
        id: "greenhouse_domes",
        display: "Greenhouse Domes",
        prerequisites: &["hydroponics", "salvage_tools"],
        scrap_cost: 60,
        required_troops: 5,
        effects: &[
            TechEffect::PassiveIncome {
                resource: ResourceKind::Food,
                amount: 20,
            },
            TechEffect::PassiveIncome {
                resource: ResourceKind::Scrap,
                amount: 5,
            },
        ],
    },
    TechDefinition {
        id: "gunsmithing",
        display: "Gunsmithing",
        prerequisites: &["scrap_armor"],
        scrap_cost: 70,
        required_troops: 6,
        effects: &[
            TechEffect::PassiveIncome {
                resource: ResourceKind::Weapons,
                amount: 3,
            },
            TechEffect::CombatBonus {
                terrain: None,
                percent: 15,
            },
        ],
    },
];

pub fn catalog() -> &'static [TechDefinition] {
    TECH_TREE
}

pub fn definition(id: &str) -> Option<&'static TechDefinition> {
    TECH_TREE.iter().find(|def| def.id == id)
}

/// Technologies not yet completed whose prerequisites all are, in catalog
/// order.
pub fn available<'a>(
    completed: &'a BTreeSet<String>,
) -> impl Iterator<Item = &'static TechDefinition> + 'a {
    TECH_TREE.iter().filter(move |def| {
        !completed.contains(def.id)
            && def
                .prerequisites
                .iter()
                .all(|dep| completed.contains(*dep))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_prerequisites_exist_and_precede() {
        for (index, def) in TECH_TREE.iter().enumerate() {
            for dep in def.prerequisites {
                let position = TECH_TREE.iter().position(|d| d.id == *dep);
                assert!(matches!(position, Some(p) if p < index), "{} -> {}", def.id, dep);
            }
        }
    }

    #[test]
    fn test_available_respects_prerequisites() {
        let none = completed(&[]);
        let ids: Vec<_> = available(&none).map(|d| d.id).collect();
        assert_eq!(ids, vec!["salvage_tools", "hydroponics"]);

        let some = completed(&["salvage_tools"]);
        let ids: Vec<_> = available(&some).map(|d| d.id).collect();
        assert_eq!(ids, vec!["hydroponics", "scrap_armor", "dune_buggies"]);
    }

    #[test]
    fn test_effect_queries() {
        assert!(definition("hydroponics").unwrap().generates_food());
        assert!(!definition("foraging").unwrap().generates_food());
        assert!(definition("mountain_warfare").unwrap().improves_combat());
        assert!(definition("unknown").is_none());
    }
}
