//! Federation tiles and formation checks.
//!
//! Forming a federation claims a connected group of hexes. Hexes with the
//! player's buildings contribute their building value; planet-less hexes in
//! between hold satellites, one power token each. Checking is pure: it reads
//! the grid through cell predicates and returns a [`FederationPlan`] that the
//! engine commits later.

use crate::board::PlayerId;
use crate::buildings::std_building_value;
use crate::cell::HexCell;
use crate::game::GameError;
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::player::Resources;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Building value a federation needs
pub const MIN_FEDERATION_VALUE: u32 = 7;

/// Copies of each tile at game start
pub const TILES_PER_KIND: u8 = 3;

/// Federation tile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FederationTile {
    Fed1,
    Fed2,
    Fed3,
    Fed4,
    Fed5,
    Fed6,
}

impl FederationTile {
    pub const ALL: [FederationTile; 6] = [
        FederationTile::Fed1,
        FederationTile::Fed2,
        FederationTile::Fed3,
        FederationTile::Fed4,
        FederationTile::Fed5,
        FederationTile::Fed6,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            FederationTile::Fed1 => "fed1",
            FederationTile::Fed2 => "fed2",
            FederationTile::Fed3 => "fed3",
            FederationTile::Fed4 => "fed4",
            FederationTile::Fed5 => "fed5",
            FederationTile::Fed6 => "fed6",
        }
    }

    pub fn from_token(token: &str) -> Option<FederationTile> {
        Self::ALL.into_iter().find(|t| t.token() == token)
    }

    /// What taking this tile gives
    pub fn reward(&self) -> FederationReward {
        let (victory_points, resources, power_tokens) = match self {
            FederationTile::Fed1 => (12, Resources::new(), 0),
            FederationTile::Fed2 => (8, Resources::with_amounts(0, 0, 0, 1), 0),
            FederationTile::Fed3 => (8, Resources::new(), 2),
            FederationTile::Fed4 => (7, Resources::with_amounts(6, 0, 0, 0), 0),
            FederationTile::Fed5 => (7, Resources::with_amounts(0, 2, 0, 0), 0),
            FederationTile::Fed6 => (6, Resources::with_amounts(0, 0, 2, 0), 0),
        };
        FederationReward {
            victory_points,
            resources,
            power_tokens,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FederationTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationReward {
    pub victory_points: u32,
    pub resources: Resources,
    pub power_tokens: u32,
}

/// A tile held by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationToken {
    pub tile: FederationTile,
    /// Unspent; flipped when used to reach level 5 of a research track
    pub green: bool,
}

/// Tiles still available to take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationSupply([u8; 6]);

impl FederationSupply {
    pub fn available(&self, tile: FederationTile) -> u8 {
        self.0[tile.index()]
    }

    /// Take one copy (panics if none left)
    pub fn take(&mut self, tile: FederationTile) {
        let count = &mut self.0[tile.index()];
        assert!(*count > 0, "No {} tile left", tile);
        *count -= 1;
    }
}

impl Default for FederationSupply {
    fn default() -> Self {
        Self([TILES_PER_KIND; 6])
    }
}

/// A validated federation, ready to commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationPlan {
    pub player: PlayerId,
    pub hexes: Vec<HexCoord>,
    pub tile: FederationTile,
    /// Power tokens to discard, one per satellite
    pub satellites: u32,
    /// Summed building value of the contributing hexes
    pub value: u32,
}

/// Check that `player` may federate `hexes` and take `tile`.
pub fn plan_federation<G>(
    grid: &G,
    player: PlayerId,
    hexes: &[HexCoord],
    tile: FederationTile,
    supply: &FederationSupply,
    power_tokens: u32,
) -> Result<FederationPlan, GameError>
where
    G: HexGrid<Cell = HexCell>,
{
    if hexes.is_empty() {
        return Err(GameError::EmptyFederation);
    }

    let mut seen = HashSet::new();
    let mut value = 0;
    let mut satellites = 0;

    for &coord in hexes {
        if !seen.insert(coord) {
            return Err(GameError::DuplicateHex(coord));
        }
        let cell = grid.get(coord).ok_or(GameError::UnknownHex(coord))?;
        if cell.belongs_to_federation_of(player) {
            return Err(GameError::AlreadyFederated(coord));
        }

        if cell.occupying_players().contains(&player) {
            value += std_building_value(cell.building_of(player));
        } else if !cell.has_planet() && !cell.occupied() {
            satellites += 1;
        } else {
            return Err(GameError::NotFederatable(coord));
        }
    }

    if !is_connected(grid, &seen) {
        return Err(GameError::FederationNotConnected);
    }
    if value < MIN_FEDERATION_VALUE {
        return Err(GameError::FederationTooWeak { value });
    }
    if satellites > power_tokens {
        return Err(GameError::NotEnoughPowerTokens);
    }
    if supply.available(tile) == 0 {
        return Err(GameError::FederationTileUnavailable(tile));
    }

    Ok(FederationPlan {
        player,
        hexes: hexes.to_vec(),
        tile,
        satellites,
        value,
    })
}

/// Breadth-first walk over `hexes` only
fn is_connected<G: HexGrid>(grid: &G, hexes: &HashSet<HexCoord>) -> bool {
    let Some(&start) = hexes.iter().next() else {
        return true;
    };

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(coord) = queue.pop_front() {
        for next in grid.neighbors(coord) {
            if hexes.contains(&next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    visited.len() == hexes.len()
}
