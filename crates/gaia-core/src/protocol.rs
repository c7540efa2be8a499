//! Textual move protocol.
//!
//! One move per line: an actor (`p1`..`p5` or a faction name) followed by
//! period-separated commands, e.g.
//!
//! ```text
//! init 2 randomSeed
//! p1 faction terrans
//! p1 build m -4x-1
//! geodens build lab 3x-2. up nav.
//! lantids federation 1x-3,2x-1,2x-3,3x-1 fed3.
//! ```

use crate::actions::{Command, GameEvent};
use crate::board::{Building, Faction, PlayerId};
use crate::federation::FederationTile;
use crate::game::{GameError, GameOptions, GameState, MAX_PLAYERS};
use crate::hex::{HexCoord, ParseCoordError};
use crate::research::ResearchField;
use thiserror::Error;

/// Commands of the full game this engine does not execute
const UNSUPPORTED: &[&str] = &[
    "charge",
    "decline",
    "booster",
    "income",
    "tech",
    "spend",
    "burn",
    "action",
    "special",
    "fedtile",
    "lostPlanet",
    "swap-PI",
];

/// Who a move line is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// `pN`, seat `N - 1`
    Seat(PlayerId),
    /// Resolved against the factions chosen so far
    Faction(Faction),
}

/// A parsed line of a move log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveLine {
    /// `init <players> <seed>`
    Init { players: u8, seed: u64 },
    /// A player's move
    Move { actor: Actor, commands: Vec<Command> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty move")]
    Empty,

    #[error("unknown actor {0:?}")]
    UnknownActor(String),

    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("command {0:?} is not supported")]
    Unsupported(String),

    #[error("missing {0}")]
    MissingArgument(&'static str),

    #[error("unexpected token {0:?}")]
    UnexpectedToken(String),

    #[error("invalid {kind}: {token:?}")]
    InvalidToken { kind: &'static str, token: String },

    #[error(transparent)]
    Coord(#[from] ParseCoordError),
}

/// Parse every non-blank line of a move log
pub fn parse_moves(text: &str) -> Result<Vec<MoveLine>, ParseError> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(parse_line)
        .collect()
}

/// Parse a single line
pub fn parse_line(line: &str) -> Result<MoveLine, ParseError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    if head.is_empty() {
        return Err(ParseError::Empty);
    }
    if head == "init" {
        return parse_init(rest);
    }

    let actor = parse_actor(head)?;
    let commands = rest
        .split('.')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(parse_command)
        .collect::<Result<Vec<_>, _>>()?;

    if commands.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(MoveLine::Move { actor, commands })
}

fn parse_init(rest: &str) -> Result<MoveLine, ParseError> {
    let mut tokens = rest.split_whitespace();
    let players_token = tokens.next().ok_or(ParseError::MissingArgument("player count"))?;
    let players = players_token
        .parse::<u8>()
        .map_err(|_| invalid("player count", players_token))?;
    let seed = tokens.next().ok_or(ParseError::MissingArgument("seed"))?;
    expect_end(tokens)?;

    Ok(MoveLine::Init {
        players,
        seed: seed_from_str(seed),
    })
}

fn parse_actor(token: &str) -> Result<Actor, ParseError> {
    if let Some(n) = token.strip_prefix('p').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=MAX_PLAYERS).contains(&n) {
            return Ok(Actor::Seat(n - 1));
        }
    }
    Faction::from_name(token)
        .map(Actor::Faction)
        .ok_or_else(|| ParseError::UnknownActor(token.to_string()))
}

/// Parse one command such as `build m -4x-1`
pub fn parse_command(text: &str) -> Result<Command, ParseError> {
    let mut tokens = text.split_whitespace();
    let name = tokens.next().ok_or(ParseError::Empty)?;

    let command = match name {
        "faction" => {
            let token = tokens.next().ok_or(ParseError::MissingArgument("faction"))?;
            let faction = Faction::from_name(token).ok_or_else(|| invalid("faction", token))?;
            Command::ChooseFaction(faction)
        }
        "build" => {
            let token = tokens.next().ok_or(ParseError::MissingArgument("building"))?;
            let building = Building::from_token(token).ok_or_else(|| invalid("building", token))?;
            let coord = tokens
                .next()
                .ok_or(ParseError::MissingArgument("coordinate"))?
                .parse::<HexCoord>()?;
            Command::Build { building, coord }
        }
        "up" => {
            let token = tokens.next().ok_or(ParseError::MissingArgument("research field"))?;
            let field =
                ResearchField::from_token(token).ok_or_else(|| invalid("research field", token))?;
            Command::Up(field)
        }
        "federation" => {
            let list = tokens.next().ok_or(ParseError::MissingArgument("federation hexes"))?;
            let hexes = list
                .split(',')
                .map(str::parse::<HexCoord>)
                .collect::<Result<Vec<_>, _>>()?;
            let token = tokens.next().ok_or(ParseError::MissingArgument("federation tile"))?;
            let tile =
                FederationTile::from_token(token).ok_or_else(|| invalid("federation tile", token))?;
            Command::FormFederation { hexes, tile }
        }
        "pass" => {
            // Round boosters are not modelled; the booster taken is dropped
            tokens.next();
            Command::Pass
        }
        other if UNSUPPORTED.contains(&other) => {
            return Err(ParseError::Unsupported(other.to_string()))
        }
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    expect_end(tokens)?;
    Ok(command)
}

fn expect_end<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<(), ParseError> {
    match tokens.next() {
        Some(extra) => Err(ParseError::UnexpectedToken(extra.to_string())),
        None => Ok(()),
    }
}

fn invalid(kind: &'static str, token: &str) -> ParseError {
    ParseError::InvalidToken {
        kind,
        token: token.to_string(),
    }
}

/// Numeric seeds are used as-is; any other word is hashed (FNV-1a) so the
/// same word always generates the same map.
pub fn seed_from_str(seed: &str) -> u64 {
    if let Ok(n) = seed.parse::<u64>() {
        return n;
    }
    seed.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

// ==================== Driving a game ====================

/// Why a line could not be played
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Rule(#[from] GameError),

    #[error("nobody plays {0}")]
    UnknownFaction(Faction),

    #[error("the log must start with an init line")]
    MissingInit,

    #[error("the game is already initialized")]
    AlreadyInitialized,
}

/// A failed line of a move log, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {error}")]
pub struct ReplayError {
    pub line: usize,
    #[source]
    pub error: MoveError,
}

impl GameState {
    /// Start a game from an `init` line
    pub fn from_init(line: &str) -> Result<Self, MoveError> {
        match parse_line(line)? {
            MoveLine::Init { players, seed } => Ok(GameState::new(GameOptions {
                player_count: players,
                seed,
                ..GameOptions::default()
            })?),
            MoveLine::Move { .. } => Err(MoveError::MissingInit),
        }
    }

    /// Seat an actor refers to
    pub fn resolve_actor(&self, actor: Actor) -> Result<PlayerId, MoveError> {
        match actor {
            Actor::Seat(id) if usize::from(id) < self.player_count() => Ok(id),
            Actor::Seat(id) => Err(GameError::UnknownPlayer(id).into()),
            Actor::Faction(faction) => self
                .player_of(faction)
                .ok_or(MoveError::UnknownFaction(faction)),
        }
    }

    /// Parse and play one move line
    pub fn execute(&mut self, line: &str) -> Result<Vec<GameEvent>, MoveError> {
        match parse_line(line)? {
            MoveLine::Init { .. } => Err(MoveError::AlreadyInitialized),
            MoveLine::Move { actor, commands } => {
                let player = self.resolve_actor(actor)?;
                Ok(self.apply_move(player, &commands)?)
            }
        }
    }
}

/// Play a whole log: an `init` line followed by moves. Blank lines are skipped.
pub fn replay(log: &str) -> Result<GameState, ReplayError> {
    let mut lines = log
        .lines()
        .enumerate()
        .map(|(i, text)| (i + 1, text))
        .filter(|(_, text)| !text.trim().is_empty());

    let (line, init) = lines.next().ok_or(ReplayError {
        line: 1,
        error: MoveError::MissingInit,
    })?;
    let mut game = GameState::from_init(init).map_err(|error| ReplayError { line, error })?;

    for (line, text) in lines {
        game.execute(text)
            .map_err(|error| ReplayError { line, error })?;
    }
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_build() {
        let line = parse_line("p1 build m -4x-1").unwrap();
        assert_eq!(
            line,
            MoveLine::Move {
                actor: Actor::Seat(0),
                commands: vec![Command::Build {
                    building: Building::Mine,
                    coord: HexCoord::new(-4, -1),
                }],
            }
        );
    }

    #[test]
    fn test_parse_faction_actor_and_federation() {
        let line = parse_line("geodens federation 1x-3,2x-1 fed3.").unwrap();
        assert_eq!(
            line,
            MoveLine::Move {
                actor: Actor::Faction(Faction::Geodens),
                commands: vec![Command::FormFederation {
                    hexes: vec![HexCoord::new(1, -3), HexCoord::new(2, -1)],
                    tile: FederationTile::Fed3,
                }],
            }
        );
    }

    #[test]
    fn test_parse_chained_commands() {
        let line = parse_line("p1 build lab -3x4. up gaia.").unwrap();
        let MoveLine::Move { commands, .. } = line else {
            panic!("expected a move");
        };
        assert_eq!(
            commands,
            vec![
                Command::Build {
                    building: Building::ResearchLab,
                    coord: HexCoord::new(-3, 4),
                },
                Command::Up(ResearchField::GaiaProject),
            ]
        );
    }

    #[test]
    fn test_parse_up_and_pass() {
        assert_eq!(
            parse_line("p2 up nav").unwrap(),
            MoveLine::Move {
                actor: Actor::Seat(1),
                commands: vec![Command::Up(ResearchField::Navigation)],
            }
        );
        assert_eq!(
            parse_line("lantids pass booster10").unwrap(),
            MoveLine::Move {
                actor: Actor::Faction(Faction::Lantids),
                commands: vec![Command::Pass],
            }
        );
    }

    #[test]
    fn test_parse_init() {
        assert_eq!(
            parse_line("init 2 12345").unwrap(),
            MoveLine::Init {
                players: 2,
                seed: 12345
            }
        );
        let MoveLine::Init { seed, .. } = parse_line("init 2 randomSeed").unwrap() else {
            panic!("expected init");
        };
        assert_eq!(seed, seed_from_str("randomSeed"));
        assert_ne!(seed, seed_from_str("zadbd"));
    }

    #[test]
    fn test_unsupported_commands_are_reported() {
        assert_eq!(
            parse_line("p2 charge 1pw"),
            Err(ParseError::Unsupported("charge".into()))
        );
        assert_eq!(
            parse_line("p1 build lab -3x4. tech free1. up gaia."),
            Err(ParseError::Unsupported("tech".into()))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_line("p9 up nav"), Err(ParseError::UnknownActor("p9".into())));
        assert_eq!(parse_line("p1"), Err(ParseError::Empty));
        assert_eq!(
            parse_line("p1 dance"),
            Err(ParseError::UnknownCommand("dance".into()))
        );
        assert_eq!(
            parse_line("p1 build castle 0x0"),
            Err(ParseError::InvalidToken {
                kind: "building",
                token: "castle".into()
            })
        );
        assert!(matches!(
            parse_line("p1 build m 0y0"),
            Err(ParseError::Coord(_))
        ));
        assert_eq!(
            parse_line("p1 up nav now"),
            Err(ParseError::UnexpectedToken("now".into()))
        );
    }

    #[test]
    fn test_parse_moves_skips_blank_lines() {
        let moves = parse_moves(
            "
            init 2 seed

            p1 faction terrans
            p2 faction gleens
            ",
        )
        .unwrap();
        assert_eq!(moves.len(), 3);
    }

    #[test]
    fn test_execute_resolves_factions() {
        let mut game = GameState::from_init("init 2 7").unwrap();
        game.execute("p1 faction terrans").unwrap();
        game.execute("p2 faction gleens").unwrap();

        assert_eq!(game.resolve_actor(Actor::Faction(Faction::Gleens)), Ok(1));
        assert_eq!(
            game.resolve_actor(Actor::Faction(Faction::Ivits)),
            Err(MoveError::UnknownFaction(Faction::Ivits))
        );
        assert_eq!(
            game.execute("p3 pass"),
            Err(MoveError::Rule(GameError::UnknownPlayer(2)))
        );
        assert_eq!(game.execute("init 2 7"), Err(MoveError::AlreadyInitialized));
    }

    #[test]
    fn test_replay_reports_the_failing_line() {
        let log = "init 2 7\n\np1 faction terrans\np1 faction xenos\n";
        let err = replay(log).unwrap_err();
        assert_eq!(err.line, 4);
        assert_eq!(err.error, MoveError::Rule(GameError::NotYourTurn));

        let err = replay("p1 faction terrans").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.error, MoveError::MissingInit);
    }
}
