//! Game board representation: planets, buildings, factions and the cell map.
//!
//! This module contains:
//! - Player identifiers and factions
//! - Planet and building types
//! - Trade markers placed on cells
//! - The `Board` container holding one `HexCell` per coordinate

use crate::cell::HexCell;
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Player identifier (seat index, 0-4 for a 5-player game)
pub type PlayerId = u8;

/// Radius of the generated map (91 hexes)
pub const DEFAULT_MAP_RADIUS: u32 = 5;

/// Planet types.
///
/// The seven habitable types sit on the terraforming wheel; Gaia and
/// Transdim planets are colonized through special means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Planet {
    /// Blue
    Terra,
    /// Yellow
    Desert,
    /// Brown
    Swamp,
    /// Red
    Oxide,
    /// Orange
    Volcanic,
    /// Gray
    Titanium,
    /// White
    Ice,
    /// Green, costs a qic to colonize
    Gaia,
    /// Purple, needs a gaia-former first
    Transdim,
    /// The lost planet, never buildable
    Lost,
    /// No planet: open space
    #[default]
    Empty,
}

impl Planet {
    /// Planets that appear on the terraforming wheel
    pub const HABITABLE: [Planet; 7] = [
        Planet::Terra,
        Planet::Oxide,
        Planet::Volcanic,
        Planet::Desert,
        Planet::Swamp,
        Planet::Titanium,
        Planet::Ice,
    ];

    /// Whether this planet is on the terraforming wheel
    pub fn is_habitable(&self) -> bool {
        Self::HABITABLE.contains(self)
    }
}

/// Structures that can occupy a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Building {
    Mine,
    TradingStation,
    PlanetaryInstitute,
    ResearchLab,
    Academy1,
    Academy2,
    /// Prepares a transdim planet; not a colony
    GaiaFormer,
    /// Ivits range extender; not a colony
    SpaceStation,
}

impl Building {
    pub const ALL: [Building; 8] = [
        Building::Mine,
        Building::TradingStation,
        Building::PlanetaryInstitute,
        Building::ResearchLab,
        Building::Academy1,
        Building::Academy2,
        Building::GaiaFormer,
        Building::SpaceStation,
    ];

    /// Token used by the move protocol
    pub fn token(&self) -> &'static str {
        match self {
            Building::Mine => "m",
            Building::TradingStation => "ts",
            Building::PlanetaryInstitute => "PI",
            Building::ResearchLab => "lab",
            Building::Academy1 => "ac1",
            Building::Academy2 => "ac2",
            Building::GaiaFormer => "gf",
            Building::SpaceStation => "sp",
        }
    }

    pub fn from_token(token: &str) -> Option<Building> {
        Self::ALL.into_iter().find(|b| b.token() == token)
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A trade marker placed on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeMarker {
    /// Marker of a specific player
    Player(PlayerId),
    /// Counts for anybody
    Wild,
}

/// The playable factions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Terrans,
    Lantids,
    Xenos,
    Gleens,
    Taklons,
    Ambas,
    HadschHallas,
    Ivits,
    Geodens,
    BalTaks,
    Firaks,
    Bescods,
    Nevlas,
    Itars,
}

impl Faction {
    pub const ALL: [Faction; 14] = [
        Faction::Terrans,
        Faction::Lantids,
        Faction::Xenos,
        Faction::Gleens,
        Faction::Taklons,
        Faction::Ambas,
        Faction::HadschHallas,
        Faction::Ivits,
        Faction::Geodens,
        Faction::BalTaks,
        Faction::Firaks,
        Faction::Bescods,
        Faction::Nevlas,
        Faction::Itars,
    ];

    /// Planet type this faction lives on
    pub fn home_planet(&self) -> Planet {
        match self {
            Faction::Terrans | Faction::Lantids => Planet::Terra,
            Faction::Xenos | Faction::Gleens => Planet::Desert,
            Faction::Taklons | Faction::Ambas => Planet::Swamp,
            Faction::HadschHallas | Faction::Ivits => Planet::Oxide,
            Faction::Geodens | Faction::BalTaks => Planet::Volcanic,
            Faction::Firaks | Faction::Bescods => Planet::Titanium,
            Faction::Nevlas | Faction::Itars => Planet::Ice,
        }
    }

    /// Lantids may put a mine on a planet someone else already occupies
    pub fn shares_planets(&self) -> bool {
        matches!(self, Faction::Lantids)
    }

    /// Ivits extend their reach with space stations
    pub fn builds_space_stations(&self) -> bool {
        matches!(self, Faction::Ivits)
    }

    /// Name used by the move protocol
    pub fn name(&self) -> &'static str {
        match self {
            Faction::Terrans => "terrans",
            Faction::Lantids => "lantids",
            Faction::Xenos => "xenos",
            Faction::Gleens => "gleens",
            Faction::Taklons => "taklons",
            Faction::Ambas => "ambas",
            Faction::HadschHallas => "hadsch-hallas",
            Faction::Ivits => "ivits",
            Faction::Geodens => "geodens",
            Faction::BalTaks => "baltaks",
            Faction::Firaks => "firaks",
            Faction::Bescods => "bescods",
            Faction::Nevlas => "nevlas",
            Faction::Itars => "itars",
        }
    }

    pub fn from_name(name: &str) -> Option<Faction> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The complete game board
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "BoardJson", into = "BoardJson")]
pub struct Board {
    /// All cells indexed by coordinate
    cells: HashMap<HexCoord, HexCell>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    /// Build a board from explicit planet placements
    pub fn from_planets<I>(planets: I) -> Self
    where
        I: IntoIterator<Item = (HexCoord, Planet)>,
    {
        let mut board = Self::new();
        for (coord, planet) in planets {
            board.insert(HexCell::new(coord, planet));
        }
        board
    }

    /// Create the default map for a seed
    pub fn standard(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::generate(DEFAULT_MAP_RADIUS, &mut rng)
    }

    /// Generate a hexagon-shaped map of the given radius with a provided RNG.
    ///
    /// Every habitable planet type appears at least twice so that any faction
    /// can place its two starting mines.
    pub fn generate<R: Rng>(radius: u32, rng: &mut R) -> Self {
        let coords = HexCoord::default().within(radius);
        let per_type = (coords.len() / 25).max(2);

        let mut planets: Vec<Planet> = Vec::with_capacity(coords.len());
        for planet in Planet::HABITABLE {
            planets.extend(std::iter::repeat(planet).take(per_type));
        }
        planets.extend(std::iter::repeat(Planet::Gaia).take(per_type));
        planets.extend(std::iter::repeat(Planet::Transdim).take(per_type));
        // Remaining hexes are open space; a tiny map just gets fewer planets
        planets.truncate(coords.len());
        planets.resize(coords.len(), Planet::Empty);

        planets.shuffle(rng);

        Self::from_planets(coords.into_iter().zip(planets))
    }

    /// Add or replace a cell
    pub fn insert(&mut self, cell: HexCell) {
        self.cells.insert(cell.coord, cell);
    }

    /// Number of cells on the board
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells, in no particular order
    pub fn cells(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.values()
    }

    /// Cells where the player has a building attributed to them
    pub fn cells_of(&self, player: PlayerId) -> impl Iterator<Item = &HexCell> {
        self.cells
            .values()
            .filter(move |c| c.building_of(player).is_some())
    }

    /// Distance from `coord` to the closest cell the player may measure range from
    pub fn distance_to_nearest_range_point(&self, player: PlayerId, coord: HexCoord) -> Option<u32> {
        self.cells
            .values()
            .filter(|c| c.is_range_starting_point(player))
            .map(|c| c.coord.distance_to(&coord))
            .min()
    }

    /// Whether no other player has a structure within distance 2 of `coord`.
    ///
    /// Space stations and gaia-formers are not structures, so they never
    /// break isolation.
    pub fn is_isolated_from_others(&self, player: PlayerId, coord: HexCoord) -> bool {
        !self.within_distance(coord, 2).into_iter().any(|c| {
            self.get(c).is_some_and(|cell| {
                cell.has_structure() && cell.occupying_players().iter().any(|p| *p != player)
            })
        })
    }

    /// Convert to a JSON-friendly representation with a list instead of a map.
    /// JSON doesn't support structs as object keys.
    pub fn to_json_friendly(&self) -> BoardJson {
        let mut cells: Vec<HexCell> = self.cells.values().cloned().collect();
        cells.sort_by_key(|c| c.coord);
        BoardJson { cells }
    }
}

impl HexGrid for Board {
    type Cell = HexCell;

    fn get(&self, coord: HexCoord) -> Option<&HexCell> {
        self.cells.get(&coord)
    }

    fn get_mut(&mut self, coord: HexCoord) -> Option<&mut HexCell> {
        self.cells.get_mut(&coord)
    }

    fn coords(&self) -> Vec<HexCoord> {
        let mut coords: Vec<HexCoord> = self.cells.keys().copied().collect();
        coords.sort();
        coords
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON-friendly board representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardJson {
    pub cells: Vec<HexCell>,
}

impl From<BoardJson> for Board {
    fn from(json: BoardJson) -> Self {
        let mut board = Board::new();
        for cell in json.cells {
            board.insert(cell);
        }
        board
    }
}

impl From<Board> for BoardJson {
    fn from(board: Board) -> Self {
        board.to_json_friendly()
    }
}
