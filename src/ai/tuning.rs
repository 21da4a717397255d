use serde::{Deserialize, Serialize};

/// Thresholds and detachment sizes for the faction AI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Below this much food the strictest rations are requested.
    pub critical_food: u32,
    /// At or above this much food rations return to normal.
    pub abundant_food: u32,
    /// Food below this counts as a shortage for research and scavenging.
    pub food_short: u32,
    pub scrap_short: u32,

    pub recruit_food_floor: u32,
    pub troop_target: u32,
    pub recruit_food_fraction: f64,
    pub recruit_food_cap: u32,

    pub weapon_scrap_floor: u32,
    pub weapon_scrap_fraction: f64,
    pub weapon_scrap_cap: u32,

    pub scavenge_min_troops: u32,
    pub scavenge_troop_fraction: f64,
    pub scavenge_weapon_fraction: f64,

    pub scout_chance: f64,
    pub scout_min_troops: u32,
    pub scout_troops: u32,

    pub expand_min_troops: u32,
    pub outpost_scrap_cost: u32,
    pub outpost_min_spacing: i32,
    pub outpost_troops: u32,
    pub outpost_weapons: u32,

    pub attack_min_troops: u32,
    pub attack_min_weapons: u32,
    /// Only garrisons holding at most this fraction of our total troops are
    /// considered.
    pub attack_strength_ratio: f64,
    pub attack_troop_fraction: f64,
    pub attack_weapon_fraction: f64,

    /// Upper bound on pathfinding queries per target search.
    pub max_path_probes: usize,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            critical_food: 40,
            abundant_food: 200,
            food_short: 100,
            scrap_short: 40,
            recruit_food_floor: 80,
            troop_target: 60,
            recruit_food_fraction: 0.3,
            recruit_food_cap: 60,
            weapon_scrap_floor: 50,
            weapon_scrap_fraction: 0.3,
            weapon_scrap_cap: 40,
            scavenge_min_troops: 8,
            scavenge_troop_fraction: 0.3,
            scavenge_weapon_fraction: 0.2,
            scout_chance: 0.35,
            scout_min_troops: 6,
            scout_troops: 2,
            expand_min_troops: 20,
            outpost_scrap_cost: 30,
            outpost_min_spacing: 3,
            outpost_troops: 5,
            outpost_weapons: 2,
            attack_min_troops: 15,
            attack_min_weapons: 5,
            attack_strength_ratio: 0.5,
            attack_troop_fraction: 0.6,
            attack_weapon_fraction: 0.6,
            max_path_probes: 16,
        }
    }
}

/// `fraction` of `amount`, rounded down.
pub(crate) fn portion(amount: u32, fraction: f64) -> u32 {
    (amount as f64 * fraction.clamp(0.0, 1.0)).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let tuning: AiTuning = serde_yaml::from_str("scout_chance: 0.0\ntroop_target: 10\n").unwrap();
        assert_eq!(tuning.scout_chance, 0.0);
        assert_eq!(tuning.troop_target, 10);
        assert_eq!(tuning.critical_food, AiTuning::default().critical_food);
    }

    #[test]
    fn test_portion_clamps_fraction() {
        assert_eq!(portion(10, 0.35), 3);
        assert_eq!(portion(10, 2.0), 10);
        assert_eq!(portion(10, -1.0), 0);
    }
}
