//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the coordinate type every other layer keys on:
//! - `HexCoord`: identifies a single board location
//! - `Direction`: the six neighbour directions
//!
//! Coordinates have a textual form used by the move protocol: `"-3x4"` is
//! `q = -3, r = 4`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Direction of a neighbouring hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Northeast (top-right)
    NorthEast,
    /// East (right)
    East,
    /// Southeast (bottom-right)
    SouthEast,
    /// Southwest (bottom-left)
    SouthWest,
    /// West (left)
    West,
    /// Northwest (top-left)
    NorthWest,
}

impl Direction {
    /// All directions in clockwise order starting from NorthEast
    pub const ALL: [Direction; 6] = [
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Axial offset (dq, dr) of this direction
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (0, -1),
            Direction::West => (-1, 0),
            Direction::SouthWest => (-1, 1),
            Direction::SouthEast => (0, 1),
        }
    }
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The six neighboring hexes in clockwise order starting from NorthEast
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: Direction) -> HexCoord {
        let (dq, dr) = direction.offset();
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Every coordinate at distance `radius` or less, this one included.
    ///
    /// Ordered by `q` then `r`, so results are stable across calls.
    pub fn within(&self, radius: u32) -> Vec<HexCoord> {
        let n = radius as i32;
        let mut coords = Vec::with_capacity((3 * n * (n + 1) + 1) as usize);
        for dq in -n..=n {
            let lo = (-n).max(-dq - n);
            let hi = n.min(-dq + n);
            for dr in lo..=hi {
                coords.push(HexCoord::new(self.q + dq, self.r + dr));
            }
        }
        coords
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.q, self.r)
    }
}

/// Error parsing a `"{q}x{r}"` coordinate
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("invalid hex coordinate: {0:?}")]
pub struct ParseCoordError(pub String);

impl FromStr for HexCoord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCoordError(s.to_string());
        let (q, r) = s.trim().split_once('x').ok_or_else(err)?;
        let q = q.parse().map_err(|_| err())?;
        let r = r.parse().map_err(|_| err())?;
        Ok(HexCoord::new(q, r))
    }
}
