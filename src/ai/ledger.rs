use std::collections::BTreeMap;

use crate::faction::Faction;
use crate::hex::Axial;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Stock {
    pub troops: u32,
    pub weapons: u32,
}

/// Scratch copy of a faction's holdings for one decision pass. Every rule
/// draws from here, so the actions of one pass never add up to more than the
/// faction actually holds.
#[derive(Debug, Clone)]
pub(crate) struct Ledger {
    food: u32,
    scrap: u32,
    garrisons: BTreeMap<Axial, Stock>,
}

impl Ledger {
    pub fn from_faction(faction: &Faction) -> Self {
        Self {
            food: faction.resources.food,
            scrap: faction.resources.scrap,
            garrisons: faction
                .garrisons
                .iter()
                .map(|(coord, g)| {
                    (
                        *coord,
                        Stock {
                            troops: g.troops,
                            weapons: g.weapons,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn food(&self) -> u32 {
        self.food
    }

    pub fn scrap(&self) -> u32 {
        self.scrap
    }

    pub fn stock(&self, at: Axial) -> Stock {
        self.garrisons.get(&at).copied().unwrap_or_default()
    }

    /// Takes `amount` food if available in full.
    pub fn spend_food(&mut self, amount: u32) -> bool {
        if amount == 0 || amount > self.food {
            return false;
        }
        self.food -= amount;
        true
    }

    pub fn spend_scrap(&mut self, amount: u32) -> bool {
        if amount > self.scrap {
            return false;
        }
        self.scrap -= amount;
        true
    }

    /// Reserves up to the requested troops and weapons at `at`, returning
    /// what was actually reserved.
    pub fn reserve(&mut self, at: Axial, troops: u32, weapons: u32) -> Stock {
        let Some(stock) = self.garrisons.get_mut(&at) else {
            return Stock::default();
        };
        let taken = Stock {
            troops: troops.min(stock.troops),
            weapons: weapons.min(stock.weapons),
        };
        stock.troops -= taken.troops;
        stock.weapons -= taken.weapons;
        taken
    }

    /// Where detachments leave from: the capital while it still has troops,
    /// otherwise the largest remaining garrison.
    pub fn staging(&self, home: Axial) -> Option<Axial> {
        if self.stock(home).troops > 0 {
            return Some(home);
        }
        self.garrisons
            .iter()
            .filter(|(_, stock)| stock.troops > 0)
            .max_by(|a, b| a.1.troops.cmp(&b.1.troops).then_with(|| b.0.cmp(a.0)))
            .map(|(coord, _)| *coord)
    }
}
