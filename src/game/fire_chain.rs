//! Fire connectivity analysis
//!
//! Finds the largest cluster of burning tiles, where two tiles are connected
//! when they are hex neighbours and both burning.

use crate::core::{CubeCoord, TownMap};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// The largest connected group of burning tiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireChain {
    pub length: usize,
    /// Member tiles, sorted
    pub tiles: Vec<CubeCoord>,
}

impl FireChain {
    /// Whether the chain reaches the uncontrolled-fire threshold
    pub fn is_uncontrolled(&self, threshold: usize) -> bool {
        self.length >= threshold
    }
}

/// Largest connected component among `burning`
///
/// Components are explored from the smallest unvisited coordinate up, and a
/// later component replaces the best only when strictly larger, so ties go to
/// the component containing the smallest coordinate.
pub fn largest_component(burning: &[CubeCoord]) -> FireChain {
    let burning_set: FxHashSet<CubeCoord> = burning.iter().copied().collect();
    let mut starts: Vec<CubeCoord> = burning_set.iter().copied().collect();
    starts.sort_unstable();

    let mut visited: FxHashSet<CubeCoord> = FxHashSet::default();
    let mut best = FireChain::default();
    let mut stack = Vec::new();

    for start in starts {
        if !visited.insert(start) {
            continue;
        }
        let mut component = vec![start];
        stack.push(start);
        while let Some(current) = stack.pop() {
            for next in current.neighbors() {
                if burning_set.contains(&next) && visited.insert(next) {
                    component.push(next);
                    stack.push(next);
                }
            }
        }
        if component.len() > best.length {
            component.sort_unstable();
            best = FireChain {
                length: component.len(),
                tiles: component,
            };
        }
    }
    best
}

/// Largest burning cluster on the map
pub fn longest_fire_chain(map: &TownMap) -> FireChain {
    largest_component(&map.burning())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Tile, TileType};

    fn line(n: i32) -> Vec<CubeCoord> {
        (0..n).map(|q| CubeCoord::from_axial(q, 0)).collect()
    }

    #[test]
    fn test_empty() {
        let chain = largest_component(&[]);
        assert_eq!(chain.length, 0);
        assert!(chain.tiles.is_empty());
    }

    #[test]
    fn test_six_in_a_line_is_uncontrolled() {
        let chain = largest_component(&line(6));
        assert_eq!(chain.length, 6);
        assert!(chain.is_uncontrolled(6));
        assert!(!largest_component(&line(5)).is_uncontrolled(6));
    }

    #[test]
    fn test_cluster_plus_isolated_tiles() {
        // A centre and its full ring form one cluster of 7
        let cluster = CubeCoord::ORIGIN.spiral(1);
        let isolated = vec![
            CubeCoord::from_axial(5, 0),
            CubeCoord::from_axial(-5, 0),
            CubeCoord::from_axial(0, 5),
        ];
        let mut burning = cluster.clone();
        burning.extend(&isolated);

        let chain = largest_component(&burning);
        assert_eq!(chain.length, 7);
        let mut expected = cluster;
        expected.sort_unstable();
        assert_eq!(chain.tiles, expected);
    }

    #[test]
    fn test_tie_keeps_first_component() {
        let a = vec![CubeCoord::from_axial(-9, 0), CubeCoord::from_axial(-8, 0)];
        let b = vec![CubeCoord::from_axial(8, 0), CubeCoord::from_axial(9, 0)];
        let mut burning = b.clone();
        burning.extend(&a);
        let chain = largest_component(&burning);
        assert_eq!(chain.length, 2);
        assert_eq!(chain.tiles, a);
    }

    #[test]
    fn test_reads_burning_tiles_from_map() {
        let mut map = TownMap::generate_standard(2);
        for c in line(3) {
            map.get_mut(c).unwrap().set_fire_level(1);
        }
        map.insert(
            CubeCoord::from_axial(7, 0),
            Tile::new("Outpost", TileType::Forest, 2),
        );
        map.get_mut(CubeCoord::from_axial(7, 0)).unwrap().set_fire_level(2);
        let chain = longest_fire_chain(&map);
        assert_eq!(chain.length, 3);
    }
}
