//! Heuristic planning for AI-controlled factions.
//!
//! Each call looks at one faction and the world around it and proposes a
//! turn's worth of actions. Rules run in a fixed order and draw from a
//! scratch [`Ledger`], so later rules only see what earlier ones left behind.

mod ledger;
mod tuning;

use std::collections::BTreeSet;

use rand::RngCore;
use tracing::debug;

use crate::action::{ActionIdAllocator, ActionKind, Detachment, PlannedAction};
use crate::faction::{DiplomaticStatus, Faction, FactionId, RationLevel};
use crate::hex::{axial_distance, hexes_in_range, Axial};
use crate::pathfinding::RouteCache;
use crate::rng::RngExt;
use crate::technology::{self, TechDefinition};
use crate::world::{HexCell, PoiKind, TerrainKind, WorldMap};

use self::ledger::Ledger;
pub use self::tuning::AiTuning;
use self::tuning::portion;

#[derive(Debug, Clone, Default)]
pub struct FactionAi {
    tuning: AiTuning,
}

impl FactionAi {
    pub fn new(tuning: AiTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &AiTuning {
        &self.tuning
    }

    /// Plan `faction`'s actions for `turn`. Human factions get an empty plan.
    ///
    /// Exactly three probability rolls are drawn from `rng` per AI faction
    /// (scouting, expansion, aggression), in that order.
    pub fn decide<R: RngCore + ?Sized>(
        &self,
        faction: &Faction,
        factions: &[Faction],
        map: &WorldMap,
        turn: u32,
        rng: &mut R,
    ) -> Vec<PlannedAction> {
        let Some(archetype) = faction.archetype() else {
            return Vec::new();
        };
        let personality = archetype.personality();
        let rolls = Rolls {
            scout: rng.chance(self.tuning.scout_chance),
            expand: rng.chance(personality.expansionism),
            attack: rng.chance(personality.aggressiveness),
        };

        let mut pass = Pass {
            tuning: &self.tuning,
            faction,
            factions,
            map,
            home: faction.location,
            total_troops: faction.total_troops(),
            total_weapons: faction.total_weapons(),
            ledger: Ledger::from_faction(faction),
            routes: RouteCache::new(map),
            ids: ActionIdAllocator::new(faction.id, turn),
            actions: Vec::new(),
        };

        pass.adjust_rations();
        pass.recruit();
        pass.build_weapons();
        pass.start_research();
        pass.scavenge();
        if rolls.scout {
            pass.scout();
        }
        if rolls.expand {
            pass.expand();
        }
        if rolls.attack {
            pass.attack();
        }
        // Never rest zero troops; such a faction submits an empty plan.
        let resting = pass.total_troops / 2;
        if pass.actions.is_empty() && resting > 0 {
            pass.push(ActionKind::Rest { troops: resting });
        }

        debug!(
            faction = %faction.id,
            turn,
            actions = pass.actions.len(),
            route_queries = pass.routes.len(),
            "faction plan ready"
        );
        pass.actions
    }
}

struct Rolls {
    scout: bool,
    expand: bool,
    attack: bool,
}

struct Pass<'a> {
    tuning: &'a AiTuning,
    faction: &'a Faction,
    factions: &'a [Faction],
    map: &'a WorldMap,
    home: Axial,
    total_troops: u32,
    total_weapons: u32,
    ledger: Ledger,
    routes: RouteCache<'a>,
    ids: ActionIdAllocator,
    actions: Vec<PlannedAction>,
}

impl<'a> Pass<'a> {
    fn push(&mut self, kind: ActionKind) {
        debug!(faction = %self.faction.id, action = kind.tag(), "rule fired");
        let action = self.ids.issue(kind);
        self.actions.push(action);
    }

    fn food_short(&self) -> bool {
        self.faction.resources.food < self.tuning.food_short
    }

    fn scrap_short(&self) -> bool {
        self.faction.resources.scrap < self.tuning.scrap_short
    }

    fn weapons_short(&self) -> bool {
        self.total_weapons < self.total_troops
    }

    fn adjust_rations(&mut self) {
        let food = self.faction.resources.food;
        let wanted = if food < self.tuning.critical_food {
            Some(RationLevel::Hard)
        } else if food >= self.tuning.abundant_food {
            Some(RationLevel::default())
        } else {
            None
        };
        if let Some(level) = wanted {
            if level != self.faction.rations {
                self.push(ActionKind::SetRations { level });
            }
        }
    }

    fn recruit(&mut self) {
        if self.ledger.food() <= self.tuning.recruit_food_floor
            || self.total_troops >= self.tuning.troop_target
        {
            return;
        }
        let food = portion(self.ledger.food(), self.tuning.recruit_food_fraction)
            .min(self.tuning.recruit_food_cap);
        if self.ledger.spend_food(food) {
            self.push(ActionKind::Recruit {
                location: self.home,
                food,
            });
        }
    }

    fn build_weapons(&mut self) {
        if self.ledger.scrap() <= self.tuning.weapon_scrap_floor || !self.weapons_short() {
            return;
        }
        let scrap = portion(self.ledger.scrap(), self.tuning.weapon_scrap_fraction)
            .min(self.tuning.weapon_scrap_cap);
        if scrap > 0 && self.ledger.spend_scrap(scrap) {
            self.push(ActionKind::BuildWeapons {
                location: self.home,
                scrap,
            });
        }
    }

    fn pick_research(&self) -> Option<&'static TechDefinition> {
        let available: Vec<&'static TechDefinition> =
            technology::available(&self.faction.completed_research).collect();
        let food_pick = self
            .food_short()
            .then(|| available.iter().copied().find(|t| t.generates_food()))
            .flatten();
        let combat_pick = || {
            self.weapons_short()
                .then(|| available.iter().copied().find(|t| t.improves_combat()))
                .flatten()
        };
        food_pick
            .or_else(combat_pick)
            .or_else(|| available.first().copied())
    }

    fn start_research(&mut self) {
        if self.faction.research.is_some() {
            return;
        }
        let Some(tech) = self.pick_research() else {
            return;
        };
        let home_troops = self.ledger.stock(self.home).troops;
        if tech.scrap_cost > self.ledger.scrap() || home_troops < tech.required_troops {
            return;
        }
        let troops = home_troops.min(tech.required_troops + 2);
        if !self.ledger.spend_scrap(tech.scrap_cost) {
            return;
        }
        let reserved = self.ledger.reserve(self.home, troops, 0);
        self.push(ActionKind::StartResearch {
            tech_id: tech.id.to_string(),
            location: self.home,
            troops: reserved.troops,
            scrap: tech.scrap_cost,
        });
    }

    fn scavenge(&mut self) {
        let food_short = self.food_short();
        let scrap_short = self.scrap_short();
        if !(food_short || scrap_short) || self.total_troops <= self.tuning.scavenge_min_troops {
            return;
        }
        let Some(from) = self.ledger.staging(self.home) else {
            return;
        };
        let occupied = self.foreign_garrisons();
        let candidates: Vec<Axial> = self
            .faction
            .explored
            .iter()
            .copied()
            .filter(|coord| *coord != from && !occupied.contains(coord))
            .filter(|coord| {
                self.map
                    .get(*coord)
                    .is_some_and(|cell| yields(cell, food_short, scrap_short))
            })
            .collect();
        let Some(to) = self.nearest_reachable(from, candidates) else {
            return;
        };
        let stock = self.ledger.stock(from);
        let troops = portion(stock.troops, self.tuning.scavenge_troop_fraction).max(1);
        let weapons = portion(stock.weapons, self.tuning.scavenge_weapon_fraction);
        let reserved = self.ledger.reserve(from, troops, weapons);
        if reserved.troops == 0 {
            return;
        }
        self.push(ActionKind::Scavenge(Detachment {
            from,
            to,
            troops: reserved.troops,
            weapons: reserved.weapons,
        }));
    }

    fn scout(&mut self) {
        if self.total_troops < self.tuning.scout_min_troops || self.tuning.scout_troops == 0 {
            return;
        }
        let Some(from) = self.ledger.staging(self.home) else {
            return;
        };
        if self.ledger.stock(from).troops < self.tuning.scout_troops {
            return;
        }
        let explored = &self.faction.explored;
        let frontier: BTreeSet<Axial> = explored
            .iter()
            .flat_map(|coord| hexes_in_range(*coord, 1))
            .filter(|coord| !explored.contains(coord) && self.map.contains(*coord))
            .collect();
        let Some(to) = self.nearest_reachable(from, frontier.into_iter().collect()) else {
            return;
        };
        let reserved = self.ledger.reserve(from, self.tuning.scout_troops, 0);
        self.push(ActionKind::Scout(Detachment {
            from,
            to,
            troops: reserved.troops,
            weapons: 0,
        }));
    }

    fn expand(&mut self) {
        let cost = self.tuning.outpost_scrap_cost;
        if self.total_troops < self.tuning.expand_min_troops || self.ledger.scrap() < cost {
            return;
        }
        let Some(from) = self.ledger.staging(self.home) else {
            return;
        };
        let occupied: BTreeSet<Axial> = self
            .factions
            .iter()
            .flat_map(|f| f.garrisons.keys().copied())
            .chain(self.faction.garrisons.keys().copied())
            .collect();
        let own = &self.faction.garrisons;
        let spacing = self.tuning.outpost_min_spacing;
        let candidates: Vec<Axial> = self
            .faction
            .explored
            .iter()
            .copied()
            .filter(|coord| !occupied.contains(coord))
            .filter(|coord| {
                self.map
                    .terrain(*coord)
                    .is_some_and(TerrainKind::is_settleable)
            })
            .filter(|coord| own.keys().all(|g| axial_distance(*g, *coord) >= spacing))
            .collect();
        let Some(to) = self.nearest_reachable(from, candidates) else {
            return;
        };
        let stock = self.ledger.stock(from);
        if stock.troops == 0 || !self.ledger.spend_scrap(cost) {
            return;
        }
        let reserved = self.ledger.reserve(from, self.tuning.outpost_troops, self.tuning.outpost_weapons);
        self.push(ActionKind::BuildOutpost {
            from,
            to,
            troops: reserved.troops,
            weapons: reserved.weapons,
            scrap: cost,
        });
    }

    fn attack(&mut self) {
        if self.total_troops < self.tuning.attack_min_troops
            || self.total_weapons < self.tuning.attack_min_weapons
        {
            return;
        }
        let Some(from) = self.ledger.staging(self.home) else {
            return;
        };
        let me = self.faction;
        let max_defenders = self.total_troops as f64 * self.tuning.attack_strength_ratio;
        let mut targets: Vec<(Axial, FactionId)> = self
            .factions
            .iter()
            .filter(|other| other.id != me.id && at_war(me, other))
            .flat_map(move |enemy| {
                enemy
                    .garrisons
                    .iter()
                    .filter(move |(coord, garrison)| {
                        me.explored.contains(*coord) && garrison.troops as f64 <= max_defenders
                    })
                    .map(move |(coord, _)| (*coord, enemy.id))
            })
            .collect();
        targets.sort_by_key(|(coord, id)| (axial_distance(self.home, *coord), *coord, *id));
        let coords: Vec<Axial> = targets.iter().map(|(coord, _)| *coord).collect();
        let Some(to) = self.nearest_reachable(from, coords) else {
            return;
        };
        let Some(target) = targets.iter().find(|(coord, _)| *coord == to).map(|(_, id)| *id) else {
            return;
        };
        let stock = self.ledger.stock(from);
        let troops = portion(stock.troops, self.tuning.attack_troop_fraction);
        let weapons = portion(stock.weapons, self.tuning.attack_weapon_fraction);
        if troops == 0 {
            return;
        }
        let reserved = self.ledger.reserve(from, troops, weapons);
        self.push(ActionKind::Attack {
            from,
            to,
            troops: reserved.troops,
            weapons: reserved.weapons,
            target,
        });
    }

    fn foreign_garrisons(&self) -> BTreeSet<Axial> {
        self.factions
            .iter()
            .filter(|f| f.id != self.faction.id)
            .flat_map(|f| f.garrisons.keys().copied())
            .collect()
    }

    /// Nearest candidate to the capital that `from` can reach. Ties resolve
    /// by coordinate.
    fn nearest_reachable(&mut self, from: Axial, mut candidates: Vec<Axial>) -> Option<Axial> {
        let home = self.home;
        candidates.sort_by_key(|coord| (axial_distance(home, *coord), *coord));
        candidates.dedup();
        candidates
            .into_iter()
            .take(self.tuning.max_path_probes)
            .find(|to| self.routes.reachable(from, *to))
    }
}

fn at_war(me: &Faction, other: &Faction) -> bool {
    me.status_with(other.id) == DiplomaticStatus::War
        || other.status_with(me.id) == DiplomaticStatus::War
}

fn yields(cell: &HexCell, food: bool, scrap: bool) -> bool {
    let food_terrain = matches!(
        cell.terrain,
        TerrainKind::Plains | TerrainKind::Forest | TerrainKind::Swamp
    );
    let scrap_terrain = matches!(
        cell.terrain,
        TerrainKind::Ruins | TerrainKind::Wasteland | TerrainKind::Crater
    );
    let (food_poi, scrap_poi) = match cell.poi.as_ref().map(|poi| poi.kind) {
        Some(PoiKind::FoodSource | PoiKind::Settlement) => (true, false),
        Some(
            PoiKind::Scrapyard
            | PoiKind::Ruins
            | PoiKind::Factory
            | PoiKind::Mine
            | PoiKind::Vault
            | PoiKind::Battlefield
            | PoiKind::WeaponsCache,
        ) => (false, true),
        _ => (false, false),
    };
    (food && (food_terrain || food_poi)) || (scrap && (scrap_terrain || scrap_poi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{PoiId, PointOfInterest, Rarity};

    #[test]
    fn test_yields_matches_shortage() {
        let plains = HexCell::new(Axial::ORIGIN, TerrainKind::Plains);
        assert!(yields(&plains, true, false));
        assert!(!yields(&plains, false, true));

        let mut mountain_mine = HexCell::new(Axial::ORIGIN, TerrainKind::Mountains);
        assert!(!yields(&mountain_mine, true, true));
        mountain_mine.poi = Some(PointOfInterest {
            id: PoiId(0),
            kind: PoiKind::Mine,
            difficulty: 3,
            rarity: Rarity::Uncommon,
        });
        assert!(yields(&mountain_mine, false, true));
        assert!(!yields(&mountain_mine, true, false));
    }
}
