//! Player state and resource management.
//!
//! This module contains:
//! - `Resources` for credits, ore, knowledge and qic
//! - `PowerBowls`, the three-bowl power cycle
//! - `Player`, the per-seat ledger (faction, research, federations, pieces)

use crate::board::{Building, Faction, PlayerId};
use crate::buildings::piece_limit;
use crate::federation::{FederationTile, FederationToken};
use crate::research::{navigation_range, terraform_ore_cost, ResearchField, ResearchLevels};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Victory points every player starts with
pub const STARTING_VICTORY_POINTS: u32 = 10;

/// A stash of the four spendable resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub credits: u32,
    pub ore: u32,
    pub knowledge: u32,
    pub qic: u32,
}

impl Resources {
    /// Create an empty stash
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stash with specific amounts
    pub fn with_amounts(credits: u32, ore: u32, knowledge: u32, qic: u32) -> Self {
        Self {
            credits,
            ore,
            knowledge,
            qic,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &Resources) -> bool {
        self.credits >= cost.credits
            && self.ore >= cost.ore
            && self.knowledge >= cost.knowledge
            && self.qic >= cost.qic
    }

    /// Add another stash to this one
    pub fn add(&mut self, other: &Resources) {
        self.credits += other.credits;
        self.ore += other.ore;
        self.knowledge += other.knowledge;
        self.qic += other.qic;
    }

    /// Subtract a cost (panics if insufficient)
    pub fn subtract(&mut self, cost: &Resources) {
        assert!(self.can_afford(cost), "Cannot afford this cost");
        self.credits -= cost.credits;
        self.ore -= cost.ore;
        self.knowledge -= cost.knowledge;
        self.qic -= cost.qic;
    }

    /// Sum of two stashes
    pub fn plus(mut self, other: Resources) -> Resources {
        self.add(&other);
        self
    }
}

/// Power tokens cycling through three bowls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerBowls {
    pub bowl1: u32,
    pub bowl2: u32,
    pub bowl3: u32,
}

impl PowerBowls {
    pub fn new(bowl1: u32, bowl2: u32, bowl3: u32) -> Self {
        Self {
            bowl1,
            bowl2,
            bowl3,
        }
    }

    /// Tokens in all bowls
    pub fn tokens(&self) -> u32 {
        self.bowl1 + self.bowl2 + self.bowl3
    }

    /// Move `amount` power forward: bowl 1 empties into 2 before 2 feeds 3.
    /// Returns how much power was actually charged.
    pub fn charge(&mut self, amount: u32) -> u32 {
        let from_first = amount.min(self.bowl1);
        self.bowl1 -= from_first;
        self.bowl2 += from_first;

        let from_second = (amount - from_first).min(self.bowl2);
        self.bowl2 -= from_second;
        self.bowl3 += from_second;

        from_first + from_second
    }

    /// New tokens always start in bowl 1
    pub fn gain_tokens(&mut self, amount: u32) {
        self.bowl1 += amount;
    }

    /// Remove tokens from the game, taking from bowl 1 first (panics if insufficient)
    pub fn discard(&mut self, amount: u32) {
        assert!(self.tokens() >= amount, "Not enough power tokens");
        let mut remaining = amount;
        for bowl in [&mut self.bowl1, &mut self.bowl2, &mut self.bowl3] {
            let take = remaining.min(*bowl);
            *bowl -= take;
            remaining -= take;
        }
    }
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Seat index
    pub id: PlayerId,
    /// Chosen faction, `None` until picked
    pub faction: Option<Faction>,
    pub resources: Resources,
    pub power: PowerBowls,
    pub research: ResearchLevels,
    /// Federation tiles taken, green until spent on a level-5 advance
    pub federations: Vec<FederationToken>,
    /// Gaia-formers available to place
    pub gaia_formers: u32,
    pub victory_points: u32,
    /// Whether this player has passed for the round
    pub passed: bool,
    /// Pieces currently on the board
    placed: HashMap<Building, u32>,
}

impl Player {
    /// Create a new player with the standard starting stash
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            faction: None,
            resources: Resources::with_amounts(15, 4, 3, 1),
            power: PowerBowls::new(2, 4, 0),
            research: ResearchLevels::default(),
            federations: Vec::new(),
            gaia_formers: 0,
            victory_points: STARTING_VICTORY_POINTS,
            passed: false,
            placed: HashMap::new(),
        }
    }

    /// How many of a piece are on the board
    pub fn placed(&self, building: Building) -> u32 {
        self.placed.get(&building).copied().unwrap_or(0)
    }

    /// How many of a piece are still in the supply
    pub fn pieces_left(&self, building: Building) -> u32 {
        piece_limit(building).saturating_sub(self.placed(building))
    }

    /// Record a piece moving to the board; an upgraded piece goes back to the supply
    pub fn place_piece(&mut self, building: Building, replaces: Option<Building>) {
        *self.placed.entry(building).or_insert(0) += 1;
        if let Some(old) = replaces {
            if let Some(count) = self.placed.get_mut(&old) {
                *count = count.saturating_sub(1);
            }
        }
    }

    /// Current building range
    pub fn range(&self) -> u32 {
        navigation_range(self.research.level(ResearchField::Navigation))
    }

    /// Ore paid per terraforming step
    pub fn ore_per_terraform_step(&self) -> u32 {
        terraform_ore_cost(self.research.level(ResearchField::Terraforming))
    }

    /// Federation tokens not yet spent
    pub fn green_federations(&self) -> usize {
        self.federations.iter().filter(|f| f.green).count()
    }

    /// Spend a green federation token, returning whether one was available
    pub fn flip_green_federation(&mut self) -> bool {
        match self.federations.iter_mut().find(|f| f.green) {
            Some(token) => {
                token.green = false;
                true
            }
            None => false,
        }
    }

    /// Take a federation tile (it arrives green)
    pub fn take_federation(&mut self, tile: FederationTile) {
        self.federations.push(FederationToken { tile, green: true });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resources_can_afford() {
        let stash = Resources::with_amounts(2, 2, 2, 2);
        assert!(stash.can_afford(&Resources::with_amounts(1, 2, 0, 2)));
        assert!(!stash.can_afford(&Resources::with_amounts(0, 0, 3, 0)));
    }

    #[test]
    fn test_resources_subtract() {
        let mut stash = Resources::with_amounts(3, 3, 3, 3);
        stash.subtract(&Resources::with_amounts(1, 1, 1, 1));
        assert_eq!(stash, Resources::with_amounts(2, 2, 2, 2));
    }

    #[test]
    #[should_panic(expected = "Cannot afford")]
    fn test_resources_subtract_panics_when_short() {
        let mut stash = Resources::with_amounts(0, 0, 0, 0);
        stash.subtract(&Resources::with_amounts(1, 0, 0, 0));
    }

    #[test]
    fn test_power_charge_fills_bowl_two_first() {
        let mut power = PowerBowls::new(2, 4, 0);
        assert_eq!(power.charge(3), 3);
        assert_eq!(power, PowerBowls::new(0, 5, 1));

        assert_eq!(power.charge(10), 5);
        assert_eq!(power, PowerBowls::new(0, 0, 6));
        assert_eq!(power.charge(1), 0);
    }

    #[test]
    fn test_power_discard_order() {
        let mut power = PowerBowls::new(1, 2, 3);
        power.discard(2);
        assert_eq!(power, PowerBowls::new(0, 1, 3));
        power.discard(4);
        assert_eq!(power.tokens(), 0);
    }

    #[test]
    fn test_pieces_left() {
        let mut player = Player::new(0);
        assert_eq!(player.pieces_left(Building::Mine), 8);

        player.place_piece(Building::Mine, None);
        player.place_piece(Building::Mine, None);
        player.place_piece(Building::TradingStation, Some(Building::Mine));

        assert_eq!(player.pieces_left(Building::Mine), 7);
        assert_eq!(player.pieces_left(Building::TradingStation), 3);
    }

    #[test]
    fn test_green_federation_flip() {
        let mut player = Player::new(1);
        assert!(!player.flip_green_federation());

        player.take_federation(FederationTile::Fed2);
        assert_eq!(player.green_federations(), 1);
        assert!(player.flip_green_federation());
        assert_eq!(player.green_federations(), 0);
        assert_eq!(player.federations.len(), 1);
    }

    #[test]
    fn test_starting_range_and_terraform_cost() {
        let player = Player::new(0);
        assert_eq!(player.range(), 1);
        assert_eq!(player.ore_per_terraform_step(), 3);
    }
}
