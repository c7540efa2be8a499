//! A single board location and its occupancy ledger.
//!
//! A `HexCell` records what sits on one coordinate: the planet, who built
//! what, which players count it toward a federation, whose ships are parked
//! there and which trade markers were dropped on it. It knows nothing about
//! turn order or costs; the rules engine queries it, decides, then mutates.
//!
//! Ownership is a tagged [`Occupancy`] rather than three loose optionals, so a
//! secondary occupant can only exist next to a distinct main occupant.
//!
//! Collections are always present. A cell "has ships" when the ship list is
//! non-empty; removing the last ship leaves it empty, which reads exactly like
//! a cell that never had one.

use crate::board::{Building, Planet, PlayerId, TradeMarker};
use crate::buildings::std_building_value;
use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};

/// Who owns the structure on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "OccupancyRepr")]
pub enum Occupancy {
    /// Nothing built
    #[default]
    Unoccupied,
    /// One owner
    Main { building: Building, owner: PlayerId },
    /// Main owner plus a second player holding a mine through a faction ability
    Shared {
        building: Building,
        owner: PlayerId,
        secondary: PlayerId,
    },
}

impl Occupancy {
    /// The main occupant, if any
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            Occupancy::Unoccupied => None,
            Occupancy::Main { owner, .. } | Occupancy::Shared { owner, .. } => Some(*owner),
        }
    }

    /// The secondary occupant, if any
    pub fn secondary(&self) -> Option<PlayerId> {
        match self {
            Occupancy::Shared { secondary, .. } => Some(*secondary),
            _ => None,
        }
    }

    /// The main occupant's building
    pub fn building(&self) -> Option<Building> {
        match self {
            Occupancy::Unoccupied => None,
            Occupancy::Main { building, .. } | Occupancy::Shared { building, .. } => {
                Some(*building)
            }
        }
    }
}

/// Wire form of [`Occupancy`], checked on the way in
#[derive(Deserialize)]
enum OccupancyRepr {
    Unoccupied,
    Main {
        building: Building,
        owner: PlayerId,
    },
    Shared {
        building: Building,
        owner: PlayerId,
        secondary: PlayerId,
    },
}

impl TryFrom<OccupancyRepr> for Occupancy {
    type Error = String;

    fn try_from(repr: OccupancyRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            OccupancyRepr::Unoccupied => Occupancy::Unoccupied,
            OccupancyRepr::Main { building, owner } => Occupancy::Main { building, owner },
            OccupancyRepr::Shared {
                building,
                owner,
                secondary,
            } => {
                if secondary == owner {
                    return Err(format!(
                        "player {} cannot be both main and secondary occupant",
                        owner
                    ));
                }
                Occupancy::Shared {
                    building,
                    owner,
                    secondary,
                }
            }
        })
    }
}

/// One addressable board location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexCell {
    /// Position on the hex grid
    pub coord: HexCoord,
    /// What body sits here, fixed once the board is generated
    pub planet: Planet,
    occupancy: Occupancy,
    /// Players counting this cell toward one of their federations
    #[serde(default)]
    federations: Vec<PlayerId>,
    /// One entry per ship; a player may have several
    #[serde(default)]
    ships: Vec<PlayerId>,
    #[serde(default)]
    trade_markers: Vec<TradeMarker>,
}

impl HexCell {
    /// Create an unbuilt cell
    pub fn new(coord: HexCoord, planet: Planet) -> Self {
        Self {
            coord,
            planet,
            occupancy: Occupancy::Unoccupied,
            federations: Vec::new(),
            ships: Vec::new(),
            trade_markers: Vec::new(),
        }
    }

    // ==================== Query Methods ====================

    pub fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    pub fn main_occupant(&self) -> Option<PlayerId> {
        self.occupancy.owner()
    }

    pub fn secondary_occupant(&self) -> Option<PlayerId> {
        self.occupancy.secondary()
    }

    /// The main occupant's building
    pub fn building(&self) -> Option<Building> {
        self.occupancy.building()
    }

    pub fn has_planet(&self) -> bool {
        self.planet != Planet::Empty
    }

    pub fn occupied(&self) -> bool {
        self.main_occupant().is_some()
    }

    /// Players whose presence counts for federations and adjacency.
    ///
    /// Main occupant first, then the secondary one. A gaia-former occupies
    /// the cell but counts for nobody.
    pub fn occupying_players(&self) -> Vec<PlayerId> {
        match self.occupancy {
            Occupancy::Unoccupied => Vec::new(),
            Occupancy::Main {
                building: Building::GaiaFormer,
                ..
            }
            | Occupancy::Shared {
                building: Building::GaiaFormer,
                ..
            } => Vec::new(),
            Occupancy::Main { owner, .. } => vec![owner],
            Occupancy::Shared {
                owner, secondary, ..
            } => vec![owner, secondary],
        }
    }

    /// Whether the building attributed to `player` here counts as a colony.
    ///
    /// Gaia-formers and space stations have no building value, so they never
    /// colonize.
    pub fn colonized_by(&self, player: PlayerId) -> bool {
        std_building_value(self.building_of(player)) > 0
    }

    /// Colonized by `player` as the principal owner, not through a shared mine
    pub fn is_main_occupier(&self, player: PlayerId) -> bool {
        self.colonized_by(player) && self.secondary_occupant() != Some(player)
    }

    /// Whether the cell anchors structural adjacency (trading station isolation).
    ///
    /// Requires an occupant; gaia-formers and space stations never count.
    pub fn has_structure(&self) -> bool {
        self.occupied()
            && !matches!(
                self.building(),
                Some(Building::GaiaFormer) | Some(Building::SpaceStation)
            )
    }

    /// Can `player` measure building range from this cell?
    pub fn is_range_starting_point(&self, player: PlayerId) -> bool {
        self.colonized_by(player) || self.building_of(player) == Some(Building::SpaceStation)
    }

    /// The building attributed to `player` on this cell.
    ///
    /// A secondary occupant always holds a mine, whatever the main building is.
    pub fn building_of(&self, player: PlayerId) -> Option<Building> {
        if self.secondary_occupant() == Some(player) {
            return Some(Building::Mine);
        }
        if self.main_occupant() != Some(player) {
            return None;
        }
        self.building()
    }

    pub fn belongs_to_federation_of(&self, player: PlayerId) -> bool {
        self.federations.contains(&player)
    }

    /// Players counting this cell toward a federation
    pub fn federation_members(&self) -> &[PlayerId] {
        &self.federations
    }

    pub fn ships(&self) -> &[PlayerId] {
        &self.ships
    }

    pub fn has_ships(&self) -> bool {
        !self.ships.is_empty()
    }

    pub fn has_ship(&self, player: PlayerId) -> bool {
        self.ships.contains(&player)
    }

    pub fn ship_count(&self, player: PlayerId) -> usize {
        self.ships.iter().filter(|p| **p == player).count()
    }

    pub fn trade_markers(&self) -> &[TradeMarker] {
        &self.trade_markers
    }

    pub fn has_trade_token(&self, player: PlayerId) -> bool {
        self.trade_markers.contains(&TradeMarker::Player(player))
    }

    pub fn has_wild_trade_token(&self) -> bool {
        self.trade_markers.contains(&TradeMarker::Wild)
    }

    pub fn has_trade_tokens(&self) -> bool {
        !self.trade_markers.is_empty()
    }

    // ==================== Mutation Methods ====================
    //
    // None of these check game rules. Callers validate through the queries
    // above first; breaking the cell's own invariants panics.

    /// Build for `player`, or upgrade in place if `player` already owns the cell.
    ///
    /// # Panics
    ///
    /// Panics if another player is the main occupant.
    pub fn claim(&mut self, player: PlayerId, building: Building) {
        self.occupancy = match self.occupancy {
            Occupancy::Unoccupied => Occupancy::Main {
                building,
                owner: player,
            },
            Occupancy::Main { owner, .. } if owner == player => Occupancy::Main { building, owner },
            Occupancy::Shared {
                owner, secondary, ..
            } if owner == player => Occupancy::Shared {
                building,
                owner,
                secondary,
            },
            other => panic!(
                "player {} cannot claim {}: main occupant is {:?}",
                player,
                self.coord,
                other.owner()
            ),
        };
    }

    /// Add `player` as the secondary occupant (always a mine).
    ///
    /// # Panics
    ///
    /// Panics unless the cell has a different main occupant and no secondary one.
    pub fn add_secondary(&mut self, player: PlayerId) {
        self.occupancy = match self.occupancy {
            Occupancy::Main { building, owner } if owner != player => Occupancy::Shared {
                building,
                owner,
                secondary: player,
            },
            other => panic!(
                "player {} cannot share {} with occupancy {:?}",
                player, self.coord, other
            ),
        };
    }

    /// Count this cell toward `player`'s federations. Idempotent.
    pub fn add_to_federation_of(&mut self, player: PlayerId) {
        if self.belongs_to_federation_of(player) {
            return;
        }
        self.federations.push(player);
    }

    pub fn add_ship(&mut self, player: PlayerId) {
        self.ships.push(player);
    }

    /// Remove exactly one of `player`'s ships.
    ///
    /// # Panics
    ///
    /// Panics if `player` has no ship here; callers check `has_ship` first.
    pub fn remove_ship(&mut self, player: PlayerId) {
        let pos = self
            .ships
            .iter()
            .position(|p| *p == player)
            .unwrap_or_else(|| panic!("player {} has no ship on {}", player, self.coord));
        self.ships.remove(pos);
    }

    /// Drop a trade marker. Duplicates are kept.
    pub fn add_trade_token(&mut self, marker: TradeMarker) {
        self.trade_markers.push(marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const P1: PlayerId = 0;
    const P2: PlayerId = 1;
    const P3: PlayerId = 2;

    fn terra() -> HexCell {
        HexCell::new(HexCoord::new(-4, -1), Planet::Terra)
    }

    #[test]
    fn test_empty_space_has_no_planet() {
        let cell = HexCell::new(HexCoord::new(0, 0), Planet::Empty);
        assert!(!cell.has_planet());
        assert!(terra().has_planet());
    }

    #[test]
    fn test_unoccupied_cell_counts_for_nobody() {
        let cell = terra();
        assert!(!cell.occupied());
        assert!(cell.occupying_players().is_empty());
        for player in [P1, P2, P3] {
            assert!(!cell.colonized_by(player));
            assert!(!cell.is_range_starting_point(player));
            assert_eq!(cell.building_of(player), None);
        }
        assert!(!cell.has_structure());
    }

    #[test]
    fn test_build_mine_colonizes() {
        let mut cell = terra();
        cell.claim(P1, Building::Mine);

        assert!(cell.colonized_by(P1));
        assert_eq!(cell.occupying_players(), vec![P1]);
        assert!(cell.is_main_occupier(P1));
        assert!(cell.has_structure());
        assert!(cell.is_range_starting_point(P1));
        assert!(!cell.colonized_by(P2));
    }

    #[test]
    fn test_upgrade_in_place_keeps_owner() {
        let mut cell = terra();
        cell.claim(P1, Building::Mine);
        cell.claim(P1, Building::TradingStation);
        assert_eq!(cell.main_occupant(), Some(P1));
        assert_eq!(cell.building_of(P1), Some(Building::TradingStation));
    }

    #[test]
    #[should_panic(expected = "cannot claim")]
    fn test_claiming_foreign_cell_panics() {
        let mut cell = terra();
        cell.claim(P1, Building::Mine);
        cell.claim(P2, Building::Mine);
    }

    #[test]
    fn test_gaia_former_occupies_but_never_counts() {
        let mut cell = HexCell::new(HexCoord::new(-2, 3), Planet::Transdim);
        cell.claim(P1, Building::GaiaFormer);

        assert!(cell.occupied());
        assert!(cell.occupying_players().is_empty());
        assert!(!cell.colonized_by(P1));
        assert!(!cell.is_range_starting_point(P1));
        assert!(!cell.has_structure());
    }

    #[test]
    fn test_space_station_extends_range_only() {
        let mut cell = HexCell::new(HexCoord::new(3, 3), Planet::Empty);
        cell.claim(P2, Building::SpaceStation);

        assert!(cell.occupied());
        assert_eq!(cell.occupying_players(), vec![P2]);
        assert!(!cell.colonized_by(P2));
        assert!(cell.is_range_starting_point(P2));
        assert!(!cell.has_structure());
        assert!(!cell.is_range_starting_point(P1));
    }

    #[test]
    fn test_secondary_occupant_always_holds_a_mine() {
        let mut cell = terra();
        cell.claim(P1, Building::Mine);
        cell.add_secondary(P2);

        assert_eq!(cell.occupying_players(), vec![P1, P2]);
        assert_eq!(cell.building_of(P2), Some(Building::Mine));
        assert!(cell.colonized_by(P2));
        assert!(!cell.is_main_occupier(P2));
        assert!(cell.is_main_occupier(P1));

        // Upgrading the main building doesn't touch the secondary mine
        cell.claim(P1, Building::PlanetaryInstitute);
        assert_eq!(cell.building_of(P1), Some(Building::PlanetaryInstitute));
        assert_eq!(cell.building_of(P2), Some(Building::Mine));
        assert_ne!(cell.secondary_occupant(), cell.main_occupant());
    }

    #[test]
    #[should_panic(expected = "cannot share")]
    fn test_secondary_needs_a_different_main_occupant() {
        let mut cell = terra();
        cell.claim(P1, Building::Mine);
        cell.add_secondary(P1);
    }

    #[test]
    #[should_panic(expected = "cannot share")]
    fn test_secondary_needs_a_main_occupant() {
        let mut cell = terra();
        cell.add_secondary(P2);
    }

    #[test]
    fn test_federation_membership_is_idempotent() {
        let mut cell = terra();
        cell.add_to_federation_of(P1);
        let once = cell.federation_members().to_vec();
        cell.add_to_federation_of(P1);
        assert_eq!(cell.federation_members(), once.as_slice());

        cell.add_to_federation_of(P2);
        assert!(cell.belongs_to_federation_of(P1));
        assert!(cell.belongs_to_federation_of(P2));
        assert!(!cell.belongs_to_federation_of(P3));
    }

    #[test]
    fn test_ships_stack_and_unstack() {
        let mut cell = HexCell::new(HexCoord::new(1, 1), Planet::Empty);
        assert!(!cell.has_ships());

        cell.add_ship(P1);
        cell.add_ship(P2);
        cell.add_ship(P1);
        assert_eq!(cell.ship_count(P1), 2);

        cell.remove_ship(P1);
        assert_eq!(cell.ship_count(P1), 1);
        assert!(cell.has_ship(P2));

        cell.remove_ship(P2);
        cell.remove_ship(P1);
        assert!(!cell.has_ships());
        assert!(!cell.has_ship(P1));
    }

    #[test]
    fn test_add_then_remove_ship_restores_presence() {
        let mut cell = HexCell::new(HexCoord::new(1, 1), Planet::Empty);
        cell.add_ship(P3);
        cell.remove_ship(P3);
        assert!(!cell.has_ships());
        assert_eq!(cell, HexCell::new(HexCoord::new(1, 1), Planet::Empty));
    }

    #[test]
    #[should_panic(expected = "has no ship")]
    fn test_removing_missing_ship_panics() {
        let mut cell = HexCell::new(HexCoord::new(1, 1), Planet::Empty);
        cell.add_ship(P1);
        cell.remove_ship(P2);
    }

    #[test]
    fn test_trade_tokens() {
        let mut cell = terra();
        assert!(!cell.has_trade_tokens());

        cell.add_trade_token(TradeMarker::Player(P1));
        cell.add_trade_token(TradeMarker::Player(P1));
        assert!(cell.has_trade_tokens());
        assert!(cell.has_trade_token(P1));
        assert!(!cell.has_trade_token(P2));
        assert!(!cell.has_wild_trade_token());
        assert_eq!(cell.trade_markers().len(), 2);

        cell.add_trade_token(TradeMarker::Wild);
        assert!(cell.has_wild_trade_token());
    }

    #[test]
    fn test_shared_occupancy_rejects_same_player_on_load() {
        let json = r#"{"Shared":{"building":"Mine","owner":1,"secondary":1}}"#;
        assert!(serde_json::from_str::<Occupancy>(json).is_err());

        let json = r#"{"Shared":{"building":"Mine","owner":1,"secondary":2}}"#;
        let occupancy: Occupancy = serde_json::from_str(json).unwrap();
        assert_eq!(occupancy.secondary(), Some(2));
    }
}
