use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::faction::{FactionId, RationLevel};
use crate::hex::Axial;

/// Identifier scoped to the issuing faction and turn, unique within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId {
    pub faction: FactionId,
    pub turn: u32,
    pub seq: u16,
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-t{}-{}", self.faction, self.turn, self.seq)
    }
}

/// A troop/weapon detachment leaving `from` for `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detachment {
    pub from: Axial,
    pub to: Axial,
    pub troops: u32,
    pub weapons: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "actionType", content = "actionData", rename_all = "kebab-case")]
pub enum ActionKind {
    SetRations {
        level: RationLevel,
    },
    Recruit {
        location: Axial,
        food: u32,
    },
    BuildWeapons {
        location: Axial,
        scrap: u32,
    },
    StartResearch {
        tech_id: String,
        location: Axial,
        troops: u32,
        scrap: u32,
    },
    Scavenge(Detachment),
    Scout(Detachment),
    BuildOutpost {
        from: Axial,
        to: Axial,
        troops: u32,
        weapons: u32,
        scrap: u32,
    },
    Attack {
        from: Axial,
        to: Axial,
        troops: u32,
        weapons: u32,
        target: FactionId,
    },
    Rest {
        troops: u32,
    },
}

impl ActionKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ActionKind::SetRations { .. } => "set-rations",
            ActionKind::Recruit { .. } => "recruit",
            ActionKind::BuildWeapons { .. } => "build-weapons",
            ActionKind::StartResearch { .. } => "start-research",
            ActionKind::Scavenge(_) => "scavenge",
            ActionKind::Scout(_) => "scout",
            ActionKind::BuildOutpost { .. } => "build-outpost",
            ActionKind::Attack { .. } => "attack",
            ActionKind::Rest { .. } => "rest",
        }
    }

    pub fn detachment(&self) -> Option<Detachment> {
        match *self {
            ActionKind::Scavenge(detachment) | ActionKind::Scout(detachment) => Some(detachment),
            ActionKind::BuildOutpost {
                from,
                to,
                troops,
                weapons,
                ..
            }
            | ActionKind::Attack {
                from,
                to,
                troops,
                weapons,
                ..
            } => Some(Detachment {
                from,
                to,
                troops,
                weapons,
            }),
            _ => None,
        }
    }

    /// Troops taken out of the garrison at the returned location.
    pub fn committed_troops(&self) -> Option<(Axial, u32)> {
        match self {
            ActionKind::StartResearch {
                location, troops, ..
            } => Some((*location, *troops)),
            other => other.detachment().map(|d| (d.from, d.troops)),
        }
    }

    pub fn committed_food(&self) -> u32 {
        match self {
            ActionKind::Recruit { food, .. } => *food,
            _ => 0,
        }
    }

    pub fn committed_scrap(&self) -> u32 {
        match self {
            ActionKind::BuildWeapons { scrap, .. }
            | ActionKind::StartResearch { scrap, .. }
            | ActionKind::BuildOutpost { scrap, .. } => *scrap,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAction {
    pub id: ActionId,
    #[serde(flatten)]
    pub kind: ActionKind,
}

/// Action sets for one turn, keyed per faction.
pub type ActionBook = BTreeMap<FactionId, Vec<PlannedAction>>;

/// Hands out sequential action ids for one faction's turn.
#[derive(Debug)]
pub struct ActionIdAllocator {
    faction: FactionId,
    turn: u32,
    next: u16,
}

impl ActionIdAllocator {
    pub fn new(faction: FactionId, turn: u32) -> Self {
        Self {
            faction,
            turn,
            next: 0,
        }
    }

    pub fn issue(&mut self, kind: ActionKind) -> PlannedAction {
        let id = ActionId {
            faction: self.faction,
            turn: self.turn,
            seq: self.next,
        };
        self.next = self.next.wrapping_add(1);
        PlannedAction { id, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut ids = ActionIdAllocator::new(FactionId(4), 9);
        let a = ids.issue(ActionKind::Rest { troops: 3 });
        let b = ids.issue(ActionKind::Rest { troops: 3 });
        assert_ne!(a.id, b.id);
        assert!(a.id < b.id);
        assert_eq!(a.id.to_string(), "f4-t9-0");
    }

    #[test]
    fn test_tagged_serialization() {
        let mut ids = ActionIdAllocator::new(FactionId(1), 2);
        let action = ids.issue(ActionKind::Attack {
            from: Axial::new(0, 0),
            to: Axial::new(2, -1),
            troops: 6,
            weapons: 3,
            target: FactionId(2),
        });
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["actionType"], "attack");
        assert_eq!(json["actionData"]["to"], "002.-001");
        assert_eq!(json["actionData"]["troops"], 6);
        let back: PlannedAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_unknown_action_type_rejected() {
        let json = r#"{"id":{"faction":1,"turn":0,"seq":0},"actionType":"trade","actionData":{}}"#;
        assert!(serde_json::from_str::<PlannedAction>(json).is_err());
    }

    #[test]
    fn test_committed_amounts() {
        let research = ActionKind::StartResearch {
            tech_id: "hydroponics".into(),
            location: Axial::ORIGIN,
            troops: 4,
            scrap: 30,
        };
        assert_eq!(research.committed_troops(), Some((Axial::ORIGIN, 4)));
        assert_eq!(research.committed_scrap(), 30);
        assert_eq!(ActionKind::Recruit { location: Axial::ORIGIN, food: 12 }.committed_food(), 12);
        assert_eq!(ActionKind::Rest { troops: 5 }.committed_troops(), None);
    }
}
