//! Cube coordinates for the hexagonal town map
//!
//! A tile position is a cube coordinate `(x, y, z)` with `x + y + z == 0`.
//! The constructor enforces the invariant, so every `CubeCoord` in the engine
//! is a valid hex position.

use crate::{EngineError, Result};
use nom::{
    bytes::complete::tag,
    character::complete::{char, i32 as parse_i32, multispace0},
    combinator::{all_consuming, map},
    multi::separated_list1,
    sequence::{delimited, tuple},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a tile on the hex grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[i32; 3]", into = "[i32; 3]")]
pub struct CubeCoord {
    x: i32,
    y: i32,
    z: i32,
}

impl CubeCoord {
    /// The six neighbour offsets
    pub const DIRECTIONS: [CubeCoord; 6] = [
        CubeCoord { x: 1, y: -1, z: 0 },
        CubeCoord { x: 1, y: 0, z: -1 },
        CubeCoord { x: 0, y: 1, z: -1 },
        CubeCoord { x: -1, y: 1, z: 0 },
        CubeCoord { x: -1, y: 0, z: 1 },
        CubeCoord { x: 0, y: -1, z: 1 },
    ];

    pub const ORIGIN: CubeCoord = CubeCoord { x: 0, y: 0, z: 0 };

    /// Build a coordinate, rejecting triples that do not sum to zero
    pub fn new(x: i32, y: i32, z: i32) -> Result<Self> {
        if i64::from(x) + i64::from(y) + i64::from(z) != 0 {
            return Err(EngineError::InvalidCoordinate { x, y, z });
        }
        Ok(CubeCoord { x, y, z })
    }

    /// Build from axial `(q, r)`; always valid
    pub const fn from_axial(q: i32, r: i32) -> Self {
        CubeCoord {
            x: q,
            y: -q - r,
            z: r,
        }
    }

    pub const fn x(self) -> i32 {
        self.x
    }

    pub const fn y(self) -> i32 {
        self.y
    }

    pub const fn z(self) -> i32 {
        self.z
    }

    pub fn neighbors(self) -> impl Iterator<Item = CubeCoord> {
        Self::DIRECTIONS.into_iter().map(move |d| self.offset(d, 1))
    }

    pub fn distance(self, other: CubeCoord) -> i32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()) / 2
    }

    pub fn is_adjacent(self, other: CubeCoord) -> bool {
        self.distance(other) == 1
    }

    fn offset(self, dir: CubeCoord, steps: i32) -> CubeCoord {
        CubeCoord {
            x: self.x + dir.x * steps,
            y: self.y + dir.y * steps,
            z: self.z + dir.z * steps,
        }
    }

    /// All coordinates at exactly `radius` steps, walking the ring in a fixed order
    pub fn ring(self, radius: i32) -> Vec<CubeCoord> {
        if radius <= 0 {
            return vec![self];
        }
        let mut out = Vec::with_capacity(6 * radius as usize);
        let mut current = self.offset(Self::DIRECTIONS[4], radius);
        for side in 0..6 {
            for _ in 0..radius {
                out.push(current);
                current = current.offset(Self::DIRECTIONS[side], 1);
            }
        }
        out
    }

    /// All coordinates within `radius` steps: centre first, then ring by ring
    pub fn spiral(self, radius: i32) -> Vec<CubeCoord> {
        let mut out = vec![self];
        for r in 1..=radius.max(0) {
            out.extend(self.ring(r));
        }
        out
    }
}

impl TryFrom<[i32; 3]> for CubeCoord {
    type Error = EngineError;

    fn try_from(v: [i32; 3]) -> Result<Self> {
        CubeCoord::new(v[0], v[1], v[2])
    }
}

impl From<CubeCoord> for [i32; 3] {
    fn from(c: CubeCoord) -> Self {
        [c.x, c.y, c.z]
    }
}

impl fmt::Display for CubeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

fn triple(input: &str) -> IResult<&str, (i32, i32, i32)> {
    map(
        tuple((
            ws(char('(')),
            ws(parse_i32),
            ws(char(',')),
            ws(parse_i32),
            ws(char(',')),
            ws(parse_i32),
            ws(char(')')),
        )),
        |(_, x, _, y, _, z, _)| (x, y, z),
    )(input)
}

/// Parse a tile selection such as `(1,-1,0), (0,0,0)`
///
/// Each triple must satisfy the cube invariant.
pub fn parse_coord_list(input: &str) -> Result<Vec<CubeCoord>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let (_, triples) = all_consuming(separated_list1(tag(","), triple))(trimmed).map_err(|_| {
        EngineError::ParseError(format!(
            "Bad tile list '{trimmed}'. Expected e.g. (0,0,0), (1,-1,0)"
        ))
    })?;
    triples
        .into_iter()
        .map(|(x, y, z)| CubeCoord::new(x, y, z))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_rejects_non_zero_sum() {
        assert!(CubeCoord::new(1, 1, 0).is_err());
        assert!(CubeCoord::new(1, -1, 0).is_ok());
    }

    #[test]
    fn test_extreme_components_do_not_wrap() {
        // Wraps to zero in i32 arithmetic
        assert!(matches!(
            CubeCoord::new(i32::MAX, 1, i32::MIN),
            Err(EngineError::InvalidCoordinate { .. })
        ));
        assert!(parse_coord_list("(2147483647,1,-2147483648)").is_err());
        assert!(CubeCoord::new(i32::MAX, i32::MIN, 1).is_ok());
    }

    #[test]
    fn test_neighbors_are_adjacent_and_valid() {
        let c = CubeCoord::new(2, -1, -1).unwrap();
        let ns: Vec<_> = c.neighbors().collect();
        assert_eq!(ns.len(), 6);
        for n in ns {
            assert_eq!(n.x() + n.y() + n.z(), 0);
            assert!(c.is_adjacent(n));
        }
    }

    #[test]
    fn test_spiral_counts() {
        let spiral = CubeCoord::ORIGIN.spiral(2);
        assert_eq!(spiral.len(), 19);
        let unique: FxHashSet<_> = spiral.iter().copied().collect();
        assert_eq!(unique.len(), 19);
        assert!(spiral.iter().all(|c| c.distance(CubeCoord::ORIGIN) <= 2));
        assert_eq!(spiral[0], CubeCoord::ORIGIN);
    }

    #[test]
    fn test_parse_coord_list() {
        let coords = parse_coord_list(" (0,0,0), ( 1 , -1 , 0 )").unwrap();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[1], CubeCoord::new(1, -1, 0).unwrap());

        assert!(parse_coord_list("(1,1,1)").is_err());
        assert!(parse_coord_list("(1,-1)").is_err());
        assert!(parse_coord_list("").unwrap().is_empty());
    }

    #[test]
    fn test_serde_validates() {
        let c: CubeCoord = serde_json::from_str("[1,0,-1]").unwrap();
        assert_eq!(c, CubeCoord::new(1, 0, -1).unwrap());
        assert!(serde_json::from_str::<CubeCoord>("[1,1,1]").is_err());
    }
}
