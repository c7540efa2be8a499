//! The hex-map container contract.
//!
//! Rules code only talks to the board through this trait, so any container
//! keyed by axial coordinates can stand in for [`crate::board::Board`].

use crate::hex::HexCoord;

/// A collection of cells keyed by axial coordinates
pub trait HexGrid {
    type Cell;

    /// Cell at a coordinate, if that coordinate is on the map
    fn get(&self, coord: HexCoord) -> Option<&Self::Cell>;

    fn get_mut(&mut self, coord: HexCoord) -> Option<&mut Self::Cell>;

    /// Every coordinate on the map, sorted
    fn coords(&self) -> Vec<HexCoord>;

    fn contains(&self, coord: HexCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Neighbours of `coord` that exist on the map
    fn neighbors(&self, coord: HexCoord) -> Vec<HexCoord> {
        coord
            .neighbors()
            .into_iter()
            .filter(|c| self.contains(*c))
            .collect()
    }

    /// Coordinates on the map within `radius` of `coord`, `coord` included
    fn within_distance(&self, coord: HexCoord, radius: u32) -> Vec<HexCoord> {
        coord
            .within(radius)
            .into_iter()
            .filter(|c| self.contains(*c))
            .collect()
    }
}
