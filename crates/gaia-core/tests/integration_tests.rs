//! Integration tests for the Gaia game engine.
//!
//! These tests drive complete games through the move protocol, from the
//! `init` line to the final round.

use gaia_core::*;
use pretty_assertions::assert_eq;

const P1: PlayerId = 0;
const P2: PlayerId = 1;

/// Free hexes of a planet type, in coordinate order
fn free_planets(game: &GameState, planet: Planet) -> Vec<HexCoord> {
    let mut coords: Vec<HexCoord> = game
        .board
        .cells()
        .filter(|c| c.planet == planet && !c.occupied())
        .map(|c| c.coord)
        .collect();
    coords.sort();
    coords
}

/// Log for a two-player game on a generated map, through setup
fn setup_log(seed: u64) -> String {
    let init = format!("init 2 {}", seed);
    let game = GameState::from_init(&init).unwrap();
    let terra = free_planets(&game, Planet::Terra);
    let desert = free_planets(&game, Planet::Desert);

    [
        init,
        "p1 faction terrans".to_string(),
        "p2 faction xenos".to_string(),
        format!("terrans build m {}", terra[0]),
        format!("xenos build m {}", desert[0]),
        format!("xenos build m {}", desert[1]),
        format!("terrans build m {}", terra[1]),
    ]
    .join("\n")
}

/// Play lines one at a time, failing on the first rejected one
fn play(game: &mut GameState, lines: &[&str]) {
    for line in lines {
        if let Err(err) = game.execute(line) {
            panic!("{:?} was rejected: {}", line, err);
        }
    }
}

/// A game on a fixed row of planets along r = 0, factions chosen
fn row_game(planets: &[Planet], factions: [&str; 2]) -> GameState {
    let board = Board::from_planets(
        planets
            .iter()
            .enumerate()
            .map(|(q, planet)| (HexCoord::new(q as i32, 0), *planet)),
    );
    let mut game = GameState::with_board(GameOptions::default(), board).unwrap();
    for (seat, faction) in factions.iter().enumerate() {
        game.execute(&format!("p{} faction {}", seat + 1, faction))
            .unwrap();
    }
    game
}

#[test]
fn test_setup_phase_completes() {
    let game = replay(&setup_log(42)).unwrap();

    assert_eq!(game.phase, GamePhase::Main { round: 1 });
    assert_eq!(game.current_player, P1);
    for player in &game.players {
        assert_eq!(player.placed(Building::Mine), 2);
        assert_eq!(game.board.cells_of(player.id).count(), 2);
    }
}

#[test]
fn test_game_plays_to_the_end() {
    let mut log = setup_log(7);
    for _ in 0..ROUNDS {
        // Terrans pass first each round, so they keep opening
        log.push_str("\nterrans pass booster3\nxenos pass booster5");
    }

    let game = replay(&log).unwrap();
    assert!(game.is_finished());
    assert_eq!(game.scores(), vec![(P1, 10), (P2, 10)]);
}

#[test]
fn test_same_seed_same_map() {
    let a = GameState::from_init("init 2 randomSeed").unwrap();
    let b = GameState::from_init("init 2 randomSeed").unwrap();
    let c = GameState::from_init("init 2 otherSeed").unwrap();

    let json = |game: &GameState| serde_json::to_string(&game.board).unwrap();
    assert_eq!(json(&a), json(&b));
    assert_ne!(json(&a), json(&c));
}

#[test]
fn test_rejected_line_leaves_state_unchanged() {
    let mut game = replay(&setup_log(3)).unwrap();
    game.players[0].resources.knowledge = 8;
    let before = serde_json::to_string(&game).unwrap();

    // Second command is a second main action
    let result = game.execute("terrans up nav. up terra");
    assert_eq!(result, Err(MoveError::Rule(GameError::ActionAlreadyTaken)));
    assert_eq!(serde_json::to_string(&game).unwrap(), before);

    let result = game.execute("p1 build m 0x0. charge 2pw");
    assert!(matches!(result, Err(MoveError::Parse(ParseError::Unsupported(_)))));
    assert_eq!(serde_json::to_string(&game).unwrap(), before);
}

#[test]
fn test_federation_through_protocol() {
    let mut game = row_game(
        &[
            Planet::Terra,
            Planet::Terra,
            Planet::Empty,
            Planet::Terra,
            Planet::Desert,
            Planet::Desert,
        ],
        ["terrans", "xenos"],
    );
    play(
        &mut game,
        &[
            "terrans build m 0x0",
            "xenos build m 4x0",
            "xenos build m 5x0",
            "terrans build m 1x0",
        ],
    );
    game.players[0].resources = Resources::with_amounts(50, 50, 20, 5);

    play(
        &mut game,
        &[
            "terrans build ts 0x0",
            "xenos pass booster1",
            "terrans build PI 0x0",
            "terrans build ts 1x0",
            "terrans build m 3x0",
            "terrans build ts 3x0",
        ],
    );

    // A gap at 2x0 is bridged by a satellite
    let events = game
        .execute("terrans federation 0x0,1x0,2x0,3x0 fed2.")
        .unwrap();
    assert!(matches!(
        events[0],
        GameEvent::FederationFormed { satellites: 1, .. }
    ));

    let terrans = &game.players[0];
    assert_eq!(terrans.victory_points, 18);
    // One qic paid to reach 3x0, one from the tile
    assert_eq!(terrans.resources.qic, 5);
    assert_eq!(terrans.power.tokens(), 5);
    assert_eq!(terrans.green_federations(), 1);
    assert_eq!(terrans.placed(Building::TradingStation), 2);
    assert_eq!(terrans.placed(Building::PlanetaryInstitute), 1);
    for q in 0..4 {
        assert!(game
            .board
            .get(HexCoord::new(q, 0))
            .unwrap()
            .belongs_to_federation_of(P1));
    }

    // The green token pays for the top of a track
    game.players[0].research.set(ResearchField::Economy, 4);
    play(&mut game, &["terrans up eco"]);
    assert_eq!(game.players[0].green_federations(), 0);
    assert_eq!(
        game.players[0].research.level(ResearchField::Economy),
        5
    );
}

#[test]
fn test_lantids_share_through_protocol() {
    let mut game = row_game(
        &[Planet::Desert, Planet::Terra, Planet::Desert, Planet::Terra],
        ["xenos", "lantids"],
    );
    play(
        &mut game,
        &[
            "xenos build m 0x0",
            "lantids build m 1x0",
            "lantids build m 3x0",
            "xenos build m 2x0",
            "xenos pass",
            "lantids build m 2x0",
        ],
    );

    let cell = game.board.get(HexCoord::new(2, 0)).unwrap();
    assert_eq!(
        cell.occupancy(),
        Occupancy::Shared {
            building: Building::Mine,
            owner: P1,
            secondary: P2,
        }
    );
    assert_eq!(cell.occupying_players(), vec![P1, P2]);
    assert!(cell.colonized_by(P2));
    assert!(!cell.is_main_occupier(P2));

    // Two mines down, one more spent sharing
    let lantids = &game.players[1];
    assert_eq!(lantids.placed(Building::Mine), 3);
    assert_eq!(lantids.resources, Resources::with_amounts(14, 2, 3, 1));
}

#[test]
fn test_range_costs_qic_through_protocol() {
    let mut game = row_game(
        &[
            Planet::Terra,
            Planet::Terra,
            Planet::Desert,
            Planet::Desert,
            Planet::Empty,
            Planet::Empty,
            Planet::Terra,
        ],
        ["terrans", "xenos"],
    );
    play(
        &mut game,
        &[
            "terrans build m 0x0",
            "xenos build m 2x0",
            "xenos build m 3x0",
            "terrans build m 1x0",
        ],
    );

    // Five hexes from 1x0 with range 1: two qic
    assert_eq!(
        game.execute("terrans build m 6x0"),
        Err(MoveError::Rule(GameError::CannotAfford))
    );

    game.players[0].resources.qic = 2;
    play(&mut game, &["terrans build m 6x0"]);
    assert_eq!(game.players[0].resources.qic, 0);
    assert!(game.board.get(HexCoord::new(6, 0)).unwrap().colonized_by(P1));
    assert_eq!(game.current_player, P2);
}
