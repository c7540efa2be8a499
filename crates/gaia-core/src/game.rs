//! Core game state machine.
//!
//! Every command goes through two steps: [`GameState::plan`] checks it against
//! the current state without touching anything, and [`GameState::commit`]
//! applies the resulting [`Plan`]. A move of several commands is played on a
//! working copy by [`GameState::apply_move`] and only kept if all of them pass.

use crate::actions::{Command, GameEvent};
use crate::board::{Board, Building, Faction, Planet, PlayerId, DEFAULT_MAP_RADIUS};
use crate::buildings::{self, can_upgrade, terraform_steps};
use crate::cell::HexCell;
use crate::federation::{plan_federation, FederationPlan, FederationSupply, FederationTile};
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::player::{Player, Resources};
use crate::research::{level_reward, ResearchField, MAX_LEVEL, RESEARCH_COST};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Number of rounds in a game
pub const ROUNDS: u8 = 6;

/// Smallest table
pub const MIN_PLAYERS: u8 = 2;

/// Largest table
pub const MAX_PLAYERS: u8 = 5;

/// Game phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Players pick factions in seat order
    FactionSelection,

    /// Starting mines are placed
    Setup {
        /// Seats still to place, next first
        order: Vec<PlayerId>,
    },

    /// The regular rounds
    Main { round: u8 },

    /// Game is over
    Finished,
}

/// Errors that can occur when planning a command
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid command for current phase")]
    InvalidPhase,

    #[error("Game is over")]
    GameOver,

    #[error("A game needs 2 to 5 players, not {0}")]
    InvalidPlayerCount(u8),

    #[error("No player in seat {0}")]
    UnknownPlayer(PlayerId),

    #[error("A move needs at least one command")]
    EmptyMove,

    #[error("Main action already taken this move")]
    ActionAlreadyTaken,

    #[error("Already passed this round")]
    AlreadyPassed,

    #[error("No faction chosen")]
    NoFaction,

    #[error("Faction already chosen")]
    FactionAlreadyChosen,

    #[error("{0} is already taken")]
    FactionTaken(Faction),

    #[error("{faction} cannot build {building}")]
    FactionCannotBuild { faction: Faction, building: Building },

    #[error("Hex {0} is not on the board")]
    UnknownHex(HexCoord),

    #[error("Hex {0} listed twice")]
    DuplicateHex(HexCoord),

    #[error("Hex {0} is already occupied")]
    AlreadyOccupied(HexCoord),

    #[error("Cannot build that on {0}")]
    NotBuildable(HexCoord),

    #[error("Hex {0} is out of range")]
    OutOfRange(HexCoord),

    #[error("You do not own the building on {0}")]
    NotOwner(HexCoord),

    #[error("Cannot upgrade {from} to {to}")]
    InvalidUpgrade { from: Building, to: Building },

    #[error("Cannot afford this")]
    CannotAfford,

    #[error("No {0} pieces remaining")]
    NoPiecesRemaining(Building),

    #[error("No gaia-former available")]
    NoGaiaFormer,

    #[error("Already at the top of {0}")]
    TrackMaxed(ResearchField),

    #[error("Another player holds the top of {0}")]
    TrackTopTaken(ResearchField),

    #[error("The last level needs a green federation token")]
    NoGreenFederation,

    #[error("A federation needs at least one hex")]
    EmptyFederation,

    #[error("Hex {0} is already in one of your federations")]
    AlreadyFederated(HexCoord),

    #[error("Hex {0} can neither contribute nor hold a satellite")]
    NotFederatable(HexCoord),

    #[error("Federation hexes are not connected")]
    FederationNotConnected,

    #[error("Federation value {value} is too low")]
    FederationTooWeak { value: u32 },

    #[error("Not enough power tokens for the satellites")]
    NotEnoughPowerTokens,

    #[error("No {0} tile left")]
    FederationTileUnavailable(FederationTile),
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub player_count: u8,
    /// Seeds board generation
    pub seed: u64,
    pub map_radius: u32,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            player_count: 2,
            seed: 0,
            map_radius: DEFAULT_MAP_RADIUS,
        }
    }
}

/// How a planned building reaches the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// On an empty hex
    New,
    /// Replacing the player's own building
    Upgrade(Building),
    /// Lantids joining another player's planet
    Share,
    /// A mine replacing the player's gaia-former
    OverGaiaFormer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub player: PlayerId,
    pub building: Building,
    pub coord: HexCoord,
    pub placement: Placement,
    pub cost: Resources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchPlan {
    pub player: PlayerId,
    pub field: ResearchField,
    /// Level reached
    pub level: u8,
    pub cost: Resources,
    /// Paid for by a lab or academy built earlier in the move
    pub free: bool,
}

/// A validated command, ready to commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    ChooseFaction { player: PlayerId, faction: Faction },
    Build(BuildPlan),
    Research(ResearchPlan),
    Federation(FederationPlan),
    Pass { player: PlayerId },
}

/// Bookkeeping that lasts for one move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct TurnState {
    main_action_taken: bool,
    free_research: bool,
}

/// The complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub options: GameOptions,
    /// The game board
    pub board: Board,
    /// All players, indexed by seat
    pub players: Vec<Player>,
    /// Seat to move
    pub current_player: PlayerId,
    /// Current game phase
    pub phase: GamePhase,
    pub federation_supply: FederationSupply,
    turn: TurnState,
    /// Seats in the order they passed this round
    pass_order: Vec<PlayerId>,
}

impl GameState {
    /// Create a new game on a generated map
    pub fn new(options: GameOptions) -> Result<Self, GameError> {
        let mut rng = StdRng::seed_from_u64(options.seed);
        let board = Board::generate(options.map_radius, &mut rng);
        Self::with_board(options, board)
    }

    /// Create a new game on a given board
    pub fn with_board(options: GameOptions, board: Board) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&options.player_count) {
            return Err(GameError::InvalidPlayerCount(options.player_count));
        }

        Ok(Self {
            options,
            board,
            players: (0..options.player_count).map(Player::new).collect(),
            current_player: 0,
            phase: GamePhase::FactionSelection,
            federation_supply: FederationSupply::default(),
            turn: TurnState::default(),
            pass_order: Vec::new(),
        })
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by seat
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(usize::from(id))
    }

    /// Seat of the player who chose `faction`
    pub fn player_of(&self, faction: Faction) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| p.faction == Some(faction))
            .map(|p| p.id)
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::Finished
    }

    /// Victory points per seat
    pub fn scores(&self) -> Vec<(PlayerId, u32)> {
        self.players
            .iter()
            .map(|p| (p.id, p.victory_points))
            .collect()
    }

    // Commit only runs on plans produced by this state, so seats are valid
    fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[usize::from(id)]
    }

    /// Play a whole move for `player`.
    ///
    /// Either every command succeeds and the turn passes on, or the state is
    /// left exactly as it was.
    pub fn apply_move(
        &mut self,
        player: PlayerId,
        commands: &[Command],
    ) -> Result<Vec<GameEvent>, GameError> {
        if commands.is_empty() {
            return Err(GameError::EmptyMove);
        }

        let mut working = self.clone();
        let mut events = Vec::new();
        for command in commands {
            let plan = working.plan(player, command)?;
            events.extend(working.commit(plan));
        }
        events.extend(working.finish_move());

        *self = working;
        Ok(events)
    }

    // ==================== Planning ====================

    /// Check a command without changing anything
    pub fn plan(&self, player: PlayerId, command: &Command) -> Result<Plan, GameError> {
        let state = self
            .get_player(player)
            .ok_or(GameError::UnknownPlayer(player))?;

        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        if player != self.current_player {
            return Err(GameError::NotYourTurn);
        }

        match (&self.phase, command) {
            (GamePhase::FactionSelection, Command::ChooseFaction(faction)) => {
                self.plan_faction(state, *faction)
            }
            (GamePhase::Setup { .. }, Command::Build { building, coord })
                if *building == Building::Mine =>
            {
                self.plan_setup_mine(state, *coord)
            }
            (GamePhase::Main { .. }, _) if state.passed => Err(GameError::AlreadyPassed),
            (GamePhase::Main { .. }, Command::Build { building, coord }) => {
                self.require_main_action()?;
                self.plan_build(state, *building, *coord)
            }
            (GamePhase::Main { .. }, Command::Up(field)) => self.plan_research(state, *field),
            (GamePhase::Main { .. }, Command::FormFederation { hexes, tile }) => {
                self.require_main_action()?;
                plan_federation(
                    &self.board,
                    player,
                    hexes,
                    *tile,
                    &self.federation_supply,
                    state.power.tokens(),
                )
                .map(Plan::Federation)
            }
            (GamePhase::Main { .. }, Command::Pass) => {
                self.require_main_action()?;
                Ok(Plan::Pass { player })
            }
            _ => Err(GameError::InvalidPhase),
        }
    }

    fn require_main_action(&self) -> Result<(), GameError> {
        if self.turn.main_action_taken {
            return Err(GameError::ActionAlreadyTaken);
        }
        Ok(())
    }

    fn plan_faction(&self, state: &Player, faction: Faction) -> Result<Plan, GameError> {
        self.require_main_action()?;
        if state.faction.is_some() {
            return Err(GameError::FactionAlreadyChosen);
        }
        if self.player_of(faction).is_some() {
            return Err(GameError::FactionTaken(faction));
        }
        Ok(Plan::ChooseFaction {
            player: state.id,
            faction,
        })
    }

    fn plan_setup_mine(&self, state: &Player, coord: HexCoord) -> Result<Plan, GameError> {
        self.require_main_action()?;
        let faction = state.faction.ok_or(GameError::NoFaction)?;
        let cell = self.board.get(coord).ok_or(GameError::UnknownHex(coord))?;

        if cell.occupied() {
            return Err(GameError::AlreadyOccupied(coord));
        }
        if cell.planet != faction.home_planet() {
            return Err(GameError::NotBuildable(coord));
        }
        if state.pieces_left(Building::Mine) == 0 {
            return Err(GameError::NoPiecesRemaining(Building::Mine));
        }

        Ok(Plan::Build(BuildPlan {
            player: state.id,
            building: Building::Mine,
            coord,
            placement: Placement::New,
            cost: Resources::new(),
        }))
    }

    fn plan_build(
        &self,
        state: &Player,
        building: Building,
        coord: HexCoord,
    ) -> Result<Plan, GameError> {
        let player = state.id;
        let faction = state.faction.ok_or(GameError::NoFaction)?;
        let cell = self.board.get(coord).ok_or(GameError::UnknownHex(coord))?;

        let (placement, cost) = match building {
            Building::Mine => self.plan_mine(state, faction, cell)?,
            Building::GaiaFormer => {
                if state.gaia_formers == 0 {
                    return Err(GameError::NoGaiaFormer);
                }
                if cell.occupied() {
                    return Err(GameError::AlreadyOccupied(coord));
                }
                if cell.planet != Planet::Transdim {
                    return Err(GameError::NotBuildable(coord));
                }
                (Placement::New, self.range_cost(state, coord)?)
            }
            Building::SpaceStation => {
                if !faction.builds_space_stations() {
                    return Err(GameError::FactionCannotBuild { faction, building });
                }
                if cell.occupied() {
                    return Err(GameError::AlreadyOccupied(coord));
                }
                if cell.has_planet() {
                    return Err(GameError::NotBuildable(coord));
                }
                let cost = buildings::cost(building, true).plus(self.range_cost(state, coord)?);
                (Placement::New, cost)
            }
            _ => {
                let from = match cell.building() {
                    Some(from) if cell.is_main_occupier(player) => from,
                    _ => return Err(GameError::NotOwner(coord)),
                };
                if !can_upgrade(from, building) {
                    return Err(GameError::InvalidUpgrade { from, to: building });
                }
                let isolated = self.board.is_isolated_from_others(player, coord);
                (Placement::Upgrade(from), buildings::cost(building, isolated))
            }
        };

        if state.pieces_left(building) == 0 {
            return Err(GameError::NoPiecesRemaining(building));
        }
        if !state.resources.can_afford(&cost) {
            return Err(GameError::CannotAfford);
        }

        Ok(Plan::Build(BuildPlan {
            player,
            building,
            coord,
            placement,
            cost,
        }))
    }

    fn plan_mine(
        &self,
        state: &Player,
        faction: Faction,
        cell: &HexCell,
    ) -> Result<(Placement, Resources), GameError> {
        let player = state.id;
        let coord = cell.coord;
        let base = buildings::cost(Building::Mine, true);

        if cell.building_of(player) == Some(Building::GaiaFormer) {
            return Ok((Placement::OverGaiaFormer, base));
        }

        if cell.occupied() {
            let shareable = faction.shares_planets()
                && cell.secondary_occupant().is_none()
                && cell
                    .main_occupant()
                    .is_some_and(|owner| owner != player && cell.colonized_by(owner));
            if !shareable {
                return Err(GameError::AlreadyOccupied(coord));
            }
            return Ok((Placement::Share, base.plus(self.range_cost(state, coord)?)));
        }

        let mut cost = base.plus(self.range_cost(state, coord)?);
        if cell.planet == Planet::Gaia {
            cost.qic += 1;
        } else {
            let steps = terraform_steps(cell.planet, faction.home_planet())
                .ok_or(GameError::NotBuildable(coord))?;
            cost.ore += steps * state.ore_per_terraform_step();
        }
        Ok((Placement::New, cost))
    }

    /// Qic needed to reach `coord`: each one extends range by two
    fn range_cost(&self, state: &Player, coord: HexCoord) -> Result<Resources, GameError> {
        let distance = self
            .board
            .distance_to_nearest_range_point(state.id, coord)
            .ok_or(GameError::OutOfRange(coord))?;
        let range = state.range();
        let qic = if distance <= range {
            0
        } else {
            (distance - range + 1) / 2
        };
        Ok(Resources::with_amounts(0, 0, 0, qic))
    }

    fn plan_research(&self, state: &Player, field: ResearchField) -> Result<Plan, GameError> {
        let free = self.turn.free_research;
        if !free {
            self.require_main_action()?;
        }

        let current = state.research.level(field);
        if current >= MAX_LEVEL {
            return Err(GameError::TrackMaxed(field));
        }
        let level = current + 1;

        if level == MAX_LEVEL {
            let taken = self
                .players
                .iter()
                .any(|p| p.id != state.id && p.research.level(field) == MAX_LEVEL);
            if taken {
                return Err(GameError::TrackTopTaken(field));
            }
            if state.green_federations() == 0 {
                return Err(GameError::NoGreenFederation);
            }
        }

        let cost = if free {
            Resources::new()
        } else {
            Resources::with_amounts(0, 0, RESEARCH_COST, 0)
        };
        if !state.resources.can_afford(&cost) {
            return Err(GameError::CannotAfford);
        }

        Ok(Plan::Research(ResearchPlan {
            player: state.id,
            field,
            level,
            cost,
            free,
        }))
    }

    // ==================== Committing ====================

    /// Apply a plan produced by [`GameState::plan`] on this same state
    pub fn commit(&mut self, plan: Plan) -> Vec<GameEvent> {
        match plan {
            Plan::ChooseFaction { player, faction } => {
                self.turn.main_action_taken = true;
                self.player_mut(player).faction = Some(faction);
                debug!(player, %faction, "faction chosen");
                vec![GameEvent::FactionChosen { player, faction }]
            }
            Plan::Build(build) => self.commit_build(build),
            Plan::Research(research) => self.commit_research(research),
            Plan::Federation(federation) => self.commit_federation(federation),
            Plan::Pass { player } => {
                self.turn.main_action_taken = true;
                self.player_mut(player).passed = true;
                self.pass_order.push(player);
                debug!(player, "passed");
                vec![GameEvent::Passed { player }]
            }
        }
    }

    fn commit_build(&mut self, plan: BuildPlan) -> Vec<GameEvent> {
        let BuildPlan {
            player,
            building,
            coord,
            placement,
            cost,
        } = plan;

        self.turn.main_action_taken = true;
        if matches!(
            building,
            Building::ResearchLab | Building::Academy1 | Building::Academy2
        ) {
            self.turn.free_research = true;
        }

        let state = self.player_mut(player);
        state.resources.subtract(&cost);
        match placement {
            Placement::New if building == Building::GaiaFormer => state.gaia_formers -= 1,
            Placement::New => state.place_piece(building, None),
            Placement::Upgrade(from) => state.place_piece(building, Some(from)),
            Placement::Share => state.place_piece(Building::Mine, None),
            Placement::OverGaiaFormer => {
                state.gaia_formers += 1;
                state.place_piece(Building::Mine, None);
            }
        }

        if let Some(cell) = self.board.get_mut(coord) {
            match placement {
                Placement::Share => cell.add_secondary(player),
                _ => cell.claim(player, building),
            }
        }

        debug!(player, %building, %coord, ?placement, "building placed");
        vec![GameEvent::BuildingPlaced {
            player,
            building,
            coord,
            shared: placement == Placement::Share,
            cost,
        }]
    }

    fn commit_research(&mut self, plan: ResearchPlan) -> Vec<GameEvent> {
        let ResearchPlan {
            player,
            field,
            level,
            cost,
            free,
        } = plan;

        if free {
            self.turn.free_research = false;
        } else {
            self.turn.main_action_taken = true;
        }

        let state = self.player_mut(player);
        state.resources.subtract(&cost);
        state.research.set(field, level);
        if level == MAX_LEVEL {
            state.flip_green_federation();
        }

        let reward = level_reward(field, level);
        state.resources.add(&reward.resources);
        state.gaia_formers += reward.gaia_formers;
        state.power.charge(reward.power);

        debug!(player, %field, level, "research advanced");
        vec![GameEvent::ResearchAdvanced {
            player,
            field,
            level,
        }]
    }

    fn commit_federation(&mut self, plan: FederationPlan) -> Vec<GameEvent> {
        let FederationPlan {
            player,
            hexes,
            tile,
            satellites,
            value,
        } = plan;

        self.turn.main_action_taken = true;
        for coord in &hexes {
            if let Some(cell) = self.board.get_mut(*coord) {
                cell.add_to_federation_of(player);
            }
        }
        self.federation_supply.take(tile);

        let reward = tile.reward();
        let state = self.player_mut(player);
        state.power.discard(satellites);
        state.victory_points += reward.victory_points;
        state.resources.add(&reward.resources);
        state.power.gain_tokens(reward.power_tokens);
        state.take_federation(tile);

        debug!(player, %tile, value, satellites, "federation formed");
        vec![GameEvent::FederationFormed {
            player,
            tile,
            hexes,
            satellites,
        }]
    }

    // ==================== Turn Management ====================

    /// Close the current move and hand the turn on
    pub fn finish_move(&mut self) -> Vec<GameEvent> {
        self.turn = TurnState::default();
        let mut events = Vec::new();

        match &mut self.phase {
            GamePhase::FactionSelection => {
                match self.players.iter().find(|p| p.faction.is_none()) {
                    Some(next) => self.current_player = next.id,
                    None => {
                        let order = snake_order(self.options.player_count);
                        self.current_player = order[0];
                        self.phase = GamePhase::Setup { order };
                        info!("factions chosen, placing starting mines");
                    }
                }
            }
            GamePhase::Setup { order } => {
                if !order.is_empty() {
                    order.remove(0);
                }
                match order.first().copied() {
                    Some(next) => self.current_player = next,
                    None => {
                        self.phase = GamePhase::Main { round: 1 };
                        self.current_player = 0;
                        info!("setup finished, round 1 begins");
                        events.push(GameEvent::SetupFinished);
                    }
                }
            }
            GamePhase::Main { round } => {
                let round = *round;
                if self.players.iter().all(|p| p.passed) {
                    events.extend(self.end_round(round));
                } else {
                    self.current_player = self.next_active_player();
                }
            }
            GamePhase::Finished => {}
        }

        events
    }

    fn end_round(&mut self, round: u8) -> Vec<GameEvent> {
        info!(round, "round ended");
        let mut events = vec![GameEvent::RoundEnded { round }];

        if round >= ROUNDS {
            self.phase = GamePhase::Finished;
            let scores = self.scores();
            info!(?scores, "game finished");
            events.push(GameEvent::GameFinished { scores });
            return events;
        }

        // First to pass starts the next round
        self.current_player = self.pass_order.first().copied().unwrap_or(0);
        self.pass_order.clear();
        for player in &mut self.players {
            player.passed = false;
        }
        self.phase = GamePhase::Main { round: round + 1 };
        events
    }

    fn next_active_player(&self) -> PlayerId {
        let count = self.options.player_count;
        (1..=count)
            .map(|offset| (self.current_player + offset) % count)
            .find(|id| !self.players[usize::from(*id)].passed)
            .unwrap_or(self.current_player)
    }
}

/// Setup placement order: seats forward, then back
fn snake_order(player_count: u8) -> Vec<PlayerId> {
    (0..player_count).chain((0..player_count).rev()).collect()
}
