use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::hash::Hash;

use crate::hex::{axial_distance, Axial};
use crate::world::{WorldMap, IMPASSABLE_COST};

/// A graph that can be searched with [`AStar`].
pub trait Graph<Node> {
    fn neighbors(&self, node: Node) -> Vec<Node>;

    /// Cost of moving from `from` to `to`, or `None` if the edge cannot be
    /// traversed.
    fn cost(&self, from: Node, to: Node) -> Option<f64>;

    /// Estimated remaining cost. Must never overestimate.
    fn heuristic(&self, from: Node, goal: Node) -> f64;
}

/// A found route. `path` lists every node stepped onto, excluding the start
/// and including the goal, so a route from a node to itself has an empty path.
#[derive(Debug, Clone, PartialEq)]
pub struct Route<Node> {
    pub path: Vec<Node>,
    pub cost: f64,
}

impl<Node> Route<Node> {
    /// Total cost rounded up for display.
    pub fn display_cost(&self) -> u32 {
        self.cost.ceil() as u32
    }
}

pub struct AStar;

impl AStar {
    /// Minimum-cost route from `start` to `goal`, or `None` if the goal
    /// cannot be reached.
    pub fn find_path<Node, G>(graph: &G, start: Node, goal: Node) -> Option<Route<Node>>
    where
        Node: Copy + Eq + Hash,
        G: Graph<Node>,
    {
        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<Node, Node> = HashMap::new();
        let mut g_score: HashMap<Node, f64> = HashMap::new();
        let mut closed_set: HashSet<Node> = HashSet::new();

        g_score.insert(start, 0.0);
        open_set.push(State {
            node: start,
            cost: 0.0,
            priority: graph.heuristic(start, goal),
        });

        while let Some(State { node: current, .. }) = open_set.pop() {
            if !closed_set.insert(current) {
                continue;
            }

            let current_g = *g_score.get(&current)?;
            if current == goal {
                let mut path = Vec::new();
                let mut curr = current;
                while let Some(&prev) = came_from.get(&curr) {
                    path.push(curr);
                    curr = prev;
                }
                path.reverse();
                return Some(Route {
                    path,
                    cost: current_g,
                });
            }

            for neighbor in graph.neighbors(current) {
                if closed_set.contains(&neighbor) {
                    continue;
                }
                let Some(step) = graph.cost(current, neighbor) else {
                    continue;
                };
                let tentative_g = current_g + step;
                if tentative_g < *g_score.get(&neighbor).unwrap_or(&f64::INFINITY) {
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative_g);
                    open_set.push(State {
                        node: neighbor,
                        cost: tentative_g,
                        priority: tentative_g + graph.heuristic(neighbor, goal),
                    });
                }
            }
        }

        None
    }
}

struct State<Node> {
    node: Node,
    cost: f64,
    priority: f64,
}

impl<Node> PartialEq for State<Node> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<Node> Eq for State<Node> {}

// Reversed so the max-heap pops the lowest f-score first; among equal
// f-scores the deeper node wins.
impl<Node> Ord for State<Node> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| self.cost.total_cmp(&other.cost))
    }
}

impl<Node> PartialOrd for State<Node> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Graph<Axial> for WorldMap {
    fn neighbors(&self, node: Axial) -> Vec<Axial> {
        node.neighbors()
            .into_iter()
            .filter(|n| self.contains(*n))
            .collect()
    }

    fn cost(&self, _from: Axial, to: Axial) -> Option<f64> {
        let cost = self.terrain(to)?.movement_cost();
        (cost <= IMPASSABLE_COST).then_some(cost)
    }

    fn heuristic(&self, from: Axial, goal: Axial) -> f64 {
        // Cheapest terrain costs 1 per hex.
        axial_distance(from, goal) as f64
    }
}

/// Minimum-cost route across the map. Off-map endpoints have no route.
pub fn find_path(map: &WorldMap, start: Axial, goal: Axial) -> Option<Route<Axial>> {
    if !map.contains(start) || !map.contains(goal) {
        return None;
    }
    AStar::find_path(map, start, goal)
}

/// Memoizes route queries against one immutable map.
pub struct RouteCache<'a> {
    map: &'a WorldMap,
    routes: HashMap<(Axial, Axial), Option<Route<Axial>>>,
}

impl<'a> RouteCache<'a> {
    pub fn new(map: &'a WorldMap) -> Self {
        Self {
            map,
            routes: HashMap::new(),
        }
    }

    pub fn route(&mut self, start: Axial, goal: Axial) -> Option<&Route<Axial>> {
        let map = self.map;
        self.routes
            .entry((start, goal))
            .or_insert_with(|| find_path(map, start, goal))
            .as_ref()
    }

    pub fn reachable(&mut self, start: Axial, goal: Axial) -> bool {
        self.route(start, goal).is_some()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{HexCell, TerrainKind};

    // Simple grid graph for testing
    // 0 1 2
    // 3 4 5
    // 6 7 8
    struct GridGraph;

    impl Graph<u32> for GridGraph {
        fn neighbors(&self, node: u32) -> Vec<u32> {
            let mut n = Vec::new();
            let x = node % 3;
            let y = node / 3;
            if x > 0 {
                n.push(node - 1);
            }
            if x < 2 {
                n.push(node + 1);
            }
            if y > 0 {
                n.push(node - 3);
            }
            if y < 2 {
                n.push(node + 3);
            }
            n
        }

        fn cost(&self, _from: u32, to: u32) -> Option<f64> {
            // Centre tile is blocked.
            (to != 4).then_some(1.0)
        }

        fn heuristic(&self, from: u32, target: u32) -> f64 {
            let x1 = (from % 3) as i32;
            let y1 = (from / 3) as i32;
            let x2 = (target % 3) as i32;
            let y2 = (target / 3) as i32;
            ((x1 - x2).abs() + (y1 - y2).abs()) as f64
        }
    }

    #[test]
    fn test_grid_pathfinding_avoids_blocked_edges() {
        let route = AStar::find_path(&GridGraph, 1, 7).unwrap();
        assert_eq!(route.cost, 4.0);
        assert_eq!(route.path.len(), 4);
        assert!(!route.path.contains(&4));
        assert_eq!(route.path.last(), Some(&7));
    }

    #[test]
    fn test_route_to_self_is_empty() {
        let route = AStar::find_path(&GridGraph, 3, 3).unwrap();
        assert!(route.path.is_empty());
        assert_eq!(route.cost, 0.0);
    }

    #[test]
    fn test_display_cost_rounds_up() {
        let route = Route {
            path: vec![Axial::new(1, 0)],
            cost: 2.5,
        };
        assert_eq!(route.display_cost(), 3);
    }

    #[test]
    fn test_route_cache_memoizes() {
        let map = WorldMap::from_cells(
            crate::hex::hexes_in_range(Axial::ORIGIN, 2)
                .into_iter()
                .map(|c| HexCell::new(c, TerrainKind::Desert)),
        )
        .unwrap();
        let mut cache = RouteCache::new(&map);
        let cost = cache.route(Axial::ORIGIN, Axial::new(2, 0)).unwrap().cost;
        assert_eq!(cost, 3.0);
        assert!(cache.reachable(Axial::ORIGIN, Axial::new(2, 0)));
        assert!(!cache.reachable(Axial::ORIGIN, Axial::new(9, 0)));
        assert_eq!(cache.len(), 2);
    }
}
