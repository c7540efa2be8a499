//! Building values, costs, piece limits and upgrade paths.

use crate::board::{Building, Planet};
use crate::player::Resources;

/// Standard value of a building.
///
/// Zero for gaia-formers and space stations (and for no building at all);
/// every colonizing structure is worth at least one. The same value is the
/// building's weight when forming a federation.
pub fn std_building_value(building: Option<Building>) -> u32 {
    match building {
        None => 0,
        Some(Building::GaiaFormer) | Some(Building::SpaceStation) => 0,
        Some(Building::Mine) => 1,
        Some(Building::TradingStation) | Some(Building::ResearchLab) => 2,
        Some(Building::PlanetaryInstitute) | Some(Building::Academy1) | Some(Building::Academy2) => {
            3
        }
    }
}

/// How many of each piece a player owns
pub fn piece_limit(building: Building) -> u32 {
    match building {
        Building::Mine => 8,
        Building::TradingStation => 4,
        Building::ResearchLab => 3,
        Building::PlanetaryInstitute | Building::Academy1 | Building::Academy2 => 1,
        // Gaia-formers come from research; space stations are unlimited
        Building::GaiaFormer | Building::SpaceStation => u32::MAX,
    }
}

/// The building an upgrade replaces, or `None` if it isn't an upgrade
pub fn upgrade_source(building: Building) -> Option<&'static [Building]> {
    match building {
        Building::TradingStation => Some(&[Building::Mine]),
        Building::ResearchLab | Building::PlanetaryInstitute => Some(&[Building::TradingStation]),
        Building::Academy1 | Building::Academy2 => Some(&[Building::ResearchLab]),
        Building::Mine | Building::GaiaFormer | Building::SpaceStation => None,
    }
}

/// Whether `from` can be upgraded into `to`
pub fn can_upgrade(from: Building, to: Building) -> bool {
    upgrade_source(to).is_some_and(|sources| sources.contains(&from))
}

/// Cost to place a building (terraforming and range not included).
///
/// A trading station is cheaper when another player has a structure nearby.
pub fn cost(building: Building, isolated: bool) -> Resources {
    match building {
        Building::Mine => Resources::with_amounts(1, 2, 0, 0),
        Building::TradingStation if isolated => Resources::with_amounts(6, 2, 0, 0),
        Building::TradingStation => Resources::with_amounts(3, 2, 0, 0),
        Building::ResearchLab => Resources::with_amounts(5, 3, 0, 0),
        Building::PlanetaryInstitute => Resources::with_amounts(6, 4, 0, 0),
        Building::Academy1 | Building::Academy2 => Resources::with_amounts(6, 6, 0, 0),
        Building::GaiaFormer => Resources::new(),
        Building::SpaceStation => Resources::with_amounts(0, 0, 0, 1),
    }
}

/// Terraforming steps between two habitable planets, the short way round the wheel.
///
/// `None` if either planet is not on the wheel.
pub fn terraform_steps(from: Planet, to: Planet) -> Option<u32> {
    let wheel = &Planet::HABITABLE;
    let a = wheel.iter().position(|p| *p == from)? as i32;
    let b = wheel.iter().position(|p| *p == to)? as i32;
    let len = wheel.len() as i32;
    let diff = (a - b).rem_euclid(len);
    Some(diff.min(len - diff) as u32)
}
