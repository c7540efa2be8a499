//! Replay output, as text or JSON lines.

use gaia_core::{Building, Faction, GameEvent, GamePhase, GameState, PlayerId, Resources};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of replay output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Report {
    /// A line was played
    Applied {
        line: usize,
        text: String,
        events: Vec<GameEvent>,
    },

    /// A line was refused; the game is unchanged
    Rejected {
        line: usize,
        text: String,
        error: String,
    },

    /// State after the last line
    Summary(Summary),
}

/// Final standings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub phase: GamePhase,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player: PlayerId,
    pub faction: Option<Faction>,
    pub victory_points: u32,
    pub resources: Resources,
    /// Hexes where the player has a building
    pub buildings: usize,
    pub federations: usize,
}

impl Summary {
    pub fn of(game: &GameState) -> Self {
        Self {
            phase: game.phase.clone(),
            players: game
                .players
                .iter()
                .map(|p| PlayerSummary {
                    player: p.id,
                    faction: p.faction,
                    victory_points: p.victory_points,
                    resources: p.resources,
                    buildings: game.board.cells_of(p.id).count(),
                    federations: p.federations.len(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Applied { line, text, events } => {
                write!(f, "{:>4}  {}", line, text)?;
                for event in events {
                    write!(f, "\n        {}", describe(event))?;
                }
                Ok(())
            }
            Report::Rejected { line, text, error } => {
                write!(f, "{:>4}  {}\n        rejected: {}", line, text, error)
            }
            Report::Summary(summary) => write!(f, "{}", summary),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "phase: {}", phase_name(&self.phase))?;
        for p in &self.players {
            let faction = p.faction.map_or("-", |faction| faction.name());
            write!(
                f,
                "\np{} {:<14} {:>3} vp  {}c {}o {}k {}q  {} buildings  {} federations",
                p.player + 1,
                faction,
                p.victory_points,
                p.resources.credits,
                p.resources.ore,
                p.resources.knowledge,
                p.resources.qic,
                p.buildings,
                p.federations,
            )?;
        }
        Ok(())
    }
}

fn phase_name(phase: &GamePhase) -> String {
    match phase {
        GamePhase::FactionSelection => "faction selection".to_string(),
        GamePhase::Setup { .. } => "setup".to_string(),
        GamePhase::Main { round } => format!("round {}", round),
        GamePhase::Finished => "finished".to_string(),
    }
}

/// One-line description of an event
pub fn describe(event: &GameEvent) -> String {
    match event {
        GameEvent::FactionChosen { player, faction } => {
            format!("p{} plays {}", player + 1, faction)
        }
        GameEvent::BuildingPlaced {
            player,
            building,
            coord,
            shared,
            cost,
        } => {
            let verb = if *shared && *building == Building::Mine {
                "shares"
            } else {
                "builds"
            };
            format!(
                "p{} {} {} on {} for {}c {}o {}q",
                player + 1,
                verb,
                building,
                coord,
                cost.credits,
                cost.ore,
                cost.qic
            )
        }
        GameEvent::ResearchAdvanced {
            player,
            field,
            level,
        } => format!("p{} reaches {} {}", player + 1, field, level),
        GameEvent::FederationFormed {
            player,
            tile,
            hexes,
            satellites,
        } => format!(
            "p{} forms a federation of {} hexes ({} satellites) and takes {}",
            player + 1,
            hexes.len(),
            satellites,
            tile
        ),
        GameEvent::Passed { player } => format!("p{} passes", player + 1),
        GameEvent::SetupFinished => "setup finished".to_string(),
        GameEvent::RoundEnded { round } => format!("round {} ended", round),
        GameEvent::GameFinished { scores } => {
            let scores: Vec<String> = scores
                .iter()
                .map(|(player, vp)| format!("p{} {}", player + 1, vp))
                .collect();
            format!("game over: {}", scores.join(", "))
        }
    }
}
