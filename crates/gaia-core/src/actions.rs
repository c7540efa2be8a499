//! Commands players issue and the events they produce.
//!
//! A move is a sequence of commands applied as one unit; every command that
//! succeeds yields one or more events.

use crate::board::{Building, Faction, PlayerId};
use crate::federation::FederationTile;
use crate::hex::HexCoord;
use crate::player::Resources;
use crate::research::ResearchField;
use serde::{Deserialize, Serialize};

/// Everything a player can do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    // ==================== Setup ====================
    /// Pick a faction before the first placement
    ChooseFaction(Faction),

    // ==================== Building ====================
    /// Place a new building or upgrade an existing one
    Build { building: Building, coord: HexCoord },

    // ==================== Research ====================
    /// Advance one level on a research track
    Up(ResearchField),

    // ==================== Federation ====================
    /// Federate a group of hexes and take a tile
    FormFederation {
        hexes: Vec<HexCoord>,
        tile: FederationTile,
    },

    // ==================== Turn Management ====================
    /// Stop acting for the rest of the round
    Pass,
}

/// Events that occur as a result of commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A faction was chosen
    FactionChosen { player: PlayerId, faction: Faction },

    /// A building was placed or upgraded
    BuildingPlaced {
        player: PlayerId,
        building: Building,
        coord: HexCoord,
        /// Whether the player joined an occupied planet as secondary occupant
        shared: bool,
        cost: Resources,
    },

    /// A research level was reached
    ResearchAdvanced {
        player: PlayerId,
        field: ResearchField,
        level: u8,
    },

    /// A federation was formed
    FederationFormed {
        player: PlayerId,
        tile: FederationTile,
        hexes: Vec<HexCoord>,
        satellites: u32,
    },

    /// A player passed
    Passed { player: PlayerId },

    /// Setup placements are over and the first round begins
    SetupFinished,

    /// Everyone passed
    RoundEnded { round: u8 },

    /// The final round ended
    GameFinished { scores: Vec<(PlayerId, u32)> },
}
