//! Replay session management.

use gaia_core::{GameEvent, GameState, MoveError};
use tracing::{debug, warn};

use crate::report::{Report, Summary};

/// One game, fed a move log line by line.
pub struct Session {
    /// The game state (once the init line has been read)
    game: Option<GameState>,
    /// Carry on after a rejected line
    keep_going: bool,
    pub applied: usize,
    pub rejected: usize,
}

impl Session {
    pub fn new(keep_going: bool) -> Self {
        Self {
            game: None,
            keep_going,
            applied: 0,
            rejected: 0,
        }
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    /// Play one line. The first line must be `init`.
    pub fn feed(&mut self, text: &str) -> Result<Vec<GameEvent>, MoveError> {
        match &mut self.game {
            Some(game) => game.execute(text),
            None => {
                self.game = Some(GameState::from_init(text)?);
                Ok(Vec::new())
            }
        }
    }

    /// Play a whole log, ending with a summary of the final state
    pub fn run(&mut self, log: &str) -> Vec<Report> {
        let mut reports = Vec::new();

        for (index, text) in log.lines().enumerate() {
            let line = index + 1;
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            match self.feed(text) {
                Ok(events) => {
                    self.applied += 1;
                    debug!(line, events = events.len(), "move applied");
                    reports.push(Report::Applied {
                        line,
                        text: text.to_string(),
                        events,
                    });
                }
                Err(error) => {
                    self.rejected += 1;
                    warn!(line, %error, "move rejected");
                    reports.push(Report::Rejected {
                        line,
                        text: text.to_string(),
                        error: error.to_string(),
                    });
                    if !self.keep_going {
                        break;
                    }
                }
            }
        }

        if let Some(game) = &self.game {
            reports.push(Report::Summary(Summary::of(game)));
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaia_core::{Faction, GamePhase};

    #[test]
    fn test_first_line_must_be_init() {
        let mut session = Session::new(false);
        assert!(session.feed("p1 faction terrans").is_err());
        assert!(session.game().is_none());

        session.feed("init 3 seed").unwrap();
        assert_eq!(session.game().unwrap().player_count(), 3);
    }

    #[test]
    fn test_run_stops_at_first_rejection() {
        let mut session = Session::new(false);
        let reports = session.run("init 2 1\np1 faction terrans\np1 faction xenos\np2 faction xenos\n");

        assert_eq!(session.applied, 2);
        assert_eq!(session.rejected, 1);
        assert!(matches!(reports[2], Report::Rejected { line: 3, .. }));
        assert!(matches!(reports.last(), Some(Report::Summary(_))));
        assert_eq!(session.game().unwrap().player_of(Faction::Xenos), None);
    }

    #[test]
    fn test_keep_going_skips_bad_lines() {
        let mut session = Session::new(true);
        session.run("init 2 1\np1 faction terrans\np2 charge 1pw\np2 faction xenos\n");

        assert_eq!(session.applied, 3);
        assert_eq!(session.rejected, 1);
        let game = session.game().unwrap();
        assert_eq!(game.player_of(Faction::Xenos), Some(1));
        assert!(matches!(game.phase, GamePhase::Setup { .. }));
    }
}
