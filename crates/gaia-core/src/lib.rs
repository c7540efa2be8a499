//! Gaia - a hex-map space colonization game engine
//!
//! This crate provides the core game logic, including:
//! - Axial hex coordinates and a generic hex-grid contract
//! - Per-hex occupancy (main and secondary occupants, federations, ships, trade markers)
//! - Building values, costs and upgrade paths
//! - Research tracks and federations
//! - A validate-then-commit rules engine driven by a textual move protocol
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system for hex cells
//! - [`grid`]: The `HexGrid` trait
//! - [`cell`]: Occupancy and membership of a single hex
//! - [`board`]: Planets, factions and the game board
//! - [`buildings`]: Building table
//! - [`player`]: Player state and resources
//! - [`research`]: Research tracks
//! - [`federation`]: Federation tiles and formation
//! - [`game`]: Game state machine
//! - [`protocol`]: Move log parsing and replay

pub mod actions;
pub mod board;
pub mod buildings;
pub mod cell;
pub mod federation;
pub mod game;
pub mod grid;
pub mod hex;
pub mod player;
pub mod protocol;
pub mod research;

// Re-export commonly used types
pub use actions::{Command, GameEvent};
pub use board::{Board, BoardJson, Building, Faction, Planet, PlayerId, TradeMarker};
pub use buildings::std_building_value;
pub use cell::{HexCell, Occupancy};
pub use federation::{FederationPlan, FederationSupply, FederationTile, FederationToken};
pub use game::{GameError, GameOptions, GamePhase, GameState, Placement, Plan, ROUNDS};
pub use grid::HexGrid;
pub use hex::{Direction, HexCoord, ParseCoordError};
pub use player::{Player, PowerBowls, Resources};
pub use protocol::{parse_line, parse_moves, replay, Actor, MoveError, MoveLine, ParseError, ReplayError};
pub use research::{ResearchField, ResearchLevels};
