//! Research tracks and what climbing them gives.

use crate::player::Resources;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest level on any track
pub const MAX_LEVEL: u8 = 5;

/// Knowledge paid to advance one level
pub const RESEARCH_COST: u32 = 4;

/// The six research tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResearchField {
    Terraforming,
    Navigation,
    Intelligence,
    GaiaProject,
    Economy,
    Science,
}

impl ResearchField {
    pub const ALL: [ResearchField; 6] = [
        ResearchField::Terraforming,
        ResearchField::Navigation,
        ResearchField::Intelligence,
        ResearchField::GaiaProject,
        ResearchField::Economy,
        ResearchField::Science,
    ];

    /// Token used by the move protocol
    pub fn token(&self) -> &'static str {
        match self {
            ResearchField::Terraforming => "terra",
            ResearchField::Navigation => "nav",
            ResearchField::Intelligence => "int",
            ResearchField::GaiaProject => "gaia",
            ResearchField::Economy => "eco",
            ResearchField::Science => "sci",
        }
    }

    pub fn from_token(token: &str) -> Option<ResearchField> {
        Self::ALL.into_iter().find(|f| f.token() == token)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ResearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A player's level on every track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchLevels([u8; 6]);

impl ResearchLevels {
    pub fn level(&self, field: ResearchField) -> u8 {
        self.0[field.index()]
    }

    pub fn set(&mut self, field: ResearchField, level: u8) {
        self.0[field.index()] = level.min(MAX_LEVEL);
    }
}

/// One-off gains for reaching a level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelReward {
    pub resources: Resources,
    pub gaia_formers: u32,
    /// Power charged (not tokens gained)
    pub power: u32,
}

/// What reaching `level` on `field` gives
pub fn level_reward(field: ResearchField, level: u8) -> LevelReward {
    let mut reward = LevelReward::default();
    match (field, level) {
        (ResearchField::Terraforming, 1 | 4) => reward.resources.ore = 2,
        (ResearchField::Navigation, 1 | 3) => reward.resources.qic = 1,
        (ResearchField::GaiaProject, 1 | 3 | 4) => reward.gaia_formers = 1,
        _ => {}
    }
    if level == 3 {
        reward.power = 3;
    }
    reward
}

/// Building range granted by a navigation level
pub fn navigation_range(level: u8) -> u32 {
    const RANGE: [u32; 6] = [1, 1, 2, 2, 3, 4];
    RANGE[usize::from(level.min(MAX_LEVEL))]
}

/// Ore per terraforming step at a terraforming level
pub fn terraform_ore_cost(level: u8) -> u32 {
    const COST: [u32; 6] = [3, 3, 2, 1, 1, 1];
    COST[usize::from(level.min(MAX_LEVEL))]
}
