//! The committed game: history, turn commit, undo, persistence.
//!
//! [`Game`] holds the committed board plus a per-ply delta log. A turn
//! string is composed against the board without mutating it; only a
//! complete, legal plan is committed, as an ordered list of reversible
//! [`DeltaOp`]s. Undo replays the last ply's ops inverted, so no
//! historical board is ever deep-copied.

use thiserror::Error;

use crate::board::{BoardState, Cell, DeltaOp, GridTopology, Player, Snapshot};
use crate::turn::{
    compose_turn, legal_turns, parse_turn, phase_for_ply, player_for_ply, ActionKind, Composition,
    Pending, RuleViolation, TurnPhase, TurnPlan, Validation, ValidationMode,
};
use crate::GameConfig;

/// Commit-time failure. Validation-time callers never see this; it
/// signals input that bypassed validation, or play in a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is already over")]
    Terminal,

    #[error("illegal turn '{notation}': {reason}")]
    Illegal { notation: String, reason: RuleViolation },

    #[error("incomplete turn: {0}")]
    Incomplete(String),
}

/// What a committed turn did to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub player: Player,
    pub notation: String,
    /// Every roamer removed this turn, in removal order.
    pub captures: Vec<Cell>,
    /// Set when this turn ended the game.
    pub winner: Option<Player>,
}

/// One committed ply: who played what, and the ops that realize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyRecord {
    pub player: Player,
    pub notation: String,
    pub delta: Vec<DeltaOp>,
}

/// The minimal surface a game-playing harness needs.
pub trait Ruleset {
    fn moves(&self) -> Vec<String>;
    fn apply_turn(&mut self, notation: &str) -> Result<TurnOutcome, MoveError>;
    fn is_terminal(&self) -> bool;
}

/// A game in progress.
#[derive(Debug, Clone)]
pub struct Game {
    topo: GridTopology,
    config: GameConfig,
    state: BoardState,
    history: Vec<PlyRecord>,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let topo = GridTopology::new(config.width, config.height);
        let state = BoardState::empty(&topo, &config);
        Game { topo, config, state, history: Vec::new() }
    }

    pub fn topology(&self) -> &GridTopology {
        &self.topo
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn history(&self) -> &[PlyRecord] {
        &self.history
    }

    /// The 1-based ply about to be played.
    pub fn ply(&self) -> u32 {
        self.history.len() as u32 + 1
    }

    pub fn to_act(&self) -> Player {
        player_for_ply(self.ply())
    }

    pub fn phase(&self) -> TurnPhase {
        phase_for_ply(self.ply(), &self.config)
    }

    /// Over iff a player has no roamers left once setup has finished.
    pub fn is_over(&self) -> bool {
        self.phase() != TurnPhase::Setup
            && (self.state.roamer_count(Player::White) == 0
                || self.state.roamer_count(Player::Black) == 0)
    }

    /// The winner of a finished game. When the final turn wiped out
    /// both sides at once, the player who made it loses.
    pub fn winner(&self) -> Option<Player> {
        if !self.is_over() {
            return None;
        }
        let last = self.history.last()?.player;
        if self.state.roamer_count(last) == 0 {
            Some(last.opponent())
        } else {
            Some(last)
        }
    }

    /// All complete legal turn strings for the position.
    pub fn moves(&self) -> Vec<String> {
        if self.is_over() {
            return Vec::new();
        }
        legal_turns(&self.topo, &self.state, &self.config, self.ply())
    }

    /// A uniformly random legal turn, or `None` when the position is
    /// over or dead.
    pub fn random_turn<R: rand::Rng>(&self, rng: &mut R) -> Option<String> {
        if self.is_over() {
            return None;
        }
        crate::turn::random_turn(&self.topo, &self.state, &self.config, self.ply(), rng)
    }

    /// Checks a turn string without touching the board. Partial turns
    /// report what they still need rather than failing.
    pub fn validate(&self, notation: &str) -> Validation {
        if self.is_over() {
            return Validation::Invalid(RuleViolation::Terminal);
        }
        let parsed = match parse_turn(&self.topo, notation) {
            Ok(parsed) => parsed,
            Err(e) => return Validation::Invalid(RuleViolation::Format(e)),
        };
        compose_turn(
            &self.topo,
            &self.state,
            &self.config,
            self.ply(),
            &parsed,
            ValidationMode::InteractivePartial,
        )
        .verdict()
    }

    /// Commits a turn. `Strict` re-validates the string in full;
    /// `TrustedCommit` assumes a pre-validated string and skips the
    /// gates that only exist to reject illegal input;
    /// `InteractivePartial` is a validation mode and cannot commit.
    pub fn apply(&mut self, notation: &str, mode: ValidationMode) -> Result<TurnOutcome, MoveError> {
        if self.is_over() {
            return Err(MoveError::Terminal);
        }
        if mode == ValidationMode::InteractivePartial {
            return Err(MoveError::Incomplete("partial turns cannot be committed".to_string()));
        }
        let parsed = parse_turn(&self.topo, notation).map_err(|e| MoveError::Illegal {
            notation: notation.to_string(),
            reason: RuleViolation::Format(e),
        })?;
        let plan = match compose_turn(&self.topo, &self.state, &self.config, self.ply(), &parsed, mode)
        {
            Composition::Complete(plan) => plan,
            Composition::Incomplete(pending) => {
                return Err(MoveError::Incomplete(pending_message(&self.topo, &pending)))
            }
            Composition::Invalid(reason) => {
                return Err(MoveError::Illegal { notation: notation.to_string(), reason })
            }
        };
        Ok(self.commit(notation, plan))
    }

    /// Reverts the last ply. Returns its notation, or `None` at the
    /// starting position.
    pub fn undo(&mut self) -> Option<String> {
        let record = self.history.pop()?;
        self.state.revert_all(&self.topo, &record.delta);
        Some(record.notation)
    }

    /// The committed position as a serializable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            &self.state,
            self.to_act(),
            self.history.last().map(|r| r.notation.clone()),
        )
    }

    /// Turns a plan into delta ops, applying each as it is built so the
    /// arena ids of later ops resolve against the post-op board.
    fn commit(&mut self, notation: &str, plan: TurnPlan) -> TurnOutcome {
        let player = plan.player;
        let mut delta = Vec::new();
        let mut captures = Vec::new();

        for action in plan.actions {
            match action.kind {
                ActionKind::Place { cell } => {
                    let id = self.state.next_roamer_id();
                    self.push(&mut delta, DeltaOp::PlaceRoamer { id, owner: player, cell });
                }
                ActionKind::Move { from, to, jumped } => {
                    let (id, _) = self
                        .state
                        .roamer_at(&self.topo, from)
                        .expect("a composed move starts on a roamer");
                    self.push(&mut delta, DeltaOp::MoveRoamer { id, from, to });
                    if let Some(edge) = jumped {
                        let (id, _) = self
                            .state
                            .barrier_at(&self.topo, edge)
                            .expect("a composed leap crosses a placed barrier");
                        self.push(&mut delta, DeltaOp::SetJumped { id });
                    }
                }
                ActionKind::Wall { from: None, to } => {
                    let id = self.state.next_barrier_id();
                    self.push(&mut delta, DeltaOp::PlaceBarrier { id, owner: player, edge: to });
                    self.push(&mut delta, DeltaOp::DebitStash { player });
                }
                ActionKind::Wall { from: Some(from), to } => {
                    let (id, _) = self
                        .state
                        .barrier_at(&self.topo, from)
                        .expect("a composed relocation starts on a barrier");
                    self.push(&mut delta, DeltaOp::MoveBarrier { id, from, to });
                }
            }
            for cell in action.captures {
                let (id, _) = self
                    .state
                    .roamer_at(&self.topo, cell)
                    .expect("a composed capture names an occupied cell");
                self.push(&mut delta, DeltaOp::CaptureRoamer { id, from: cell });
                captures.push(cell);
            }
        }

        // Jump flags only scope the turn that set them.
        for id in self.state.jumped_barriers() {
            self.push(&mut delta, DeltaOp::ClearJumped { id });
        }

        self.history.push(PlyRecord { player, notation: notation.to_string(), delta });
        TurnOutcome { player, notation: notation.to_string(), captures, winner: self.winner() }
    }

    fn push(&mut self, delta: &mut Vec<DeltaOp>, op: DeltaOp) {
        self.state.apply(&self.topo, op);
        delta.push(op);
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new(GameConfig::default())
    }
}

impl Ruleset for Game {
    fn moves(&self) -> Vec<String> {
        Game::moves(self)
    }

    fn apply_turn(&mut self, notation: &str) -> Result<TurnOutcome, MoveError> {
        self.apply(notation, ValidationMode::Strict)
    }

    fn is_terminal(&self) -> bool {
        self.is_over()
    }
}

fn pending_message(topo: &GridTopology, pending: &Pending) -> String {
    match pending {
        Pending::DestinationNeeded { from } => {
            format!("the roamer at {} has no destination", topo.format_cell(*from))
        }
        Pending::ChoiceNeeded { candidates } => format!(
            "a /cell choice among {} is required",
            candidates
                .iter()
                .map(|c| topo.format_cell(*c))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Pending::SecondActionNeeded => "the turn grants a second action".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plays the six setup placements: White on row 2, Black on row 9.
    fn play_setup(game: &mut Game) {
        for s in ["c2", "c9", "e2", "e9", "g2", "g9"] {
            game.apply(s, ValidationMode::Strict).unwrap();
        }
    }

    #[test]
    fn setup_alternates_and_advances_phase() {
        let mut game = Game::default();
        assert_eq!(game.ply(), 1);
        assert_eq!(game.to_act(), Player::White);
        assert_eq!(game.phase(), TurnPhase::Setup);

        play_setup(&mut game);
        assert_eq!(game.ply(), 7);
        assert_eq!(game.to_act(), Player::White);
        assert_eq!(game.phase(), TurnPhase::FirstMove);
        assert_eq!(game.state().roamer_count(Player::White), 3);
        assert_eq!(game.state().roamer_count(Player::Black), 3);
    }

    #[test]
    fn first_move_then_normal_turns() {
        let mut game = Game::default();
        play_setup(&mut game);
        game.apply("c2-c5", ValidationMode::Strict).unwrap();
        assert_eq!(game.phase(), TurnPhase::Normal);

        let outcome = game.apply("c9-c6,d6h", ValidationMode::Strict).unwrap();
        assert_eq!(outcome.player, Player::Black);
        assert!(outcome.captures.is_empty());
        assert_eq!(outcome.winner, None);
        // The placement came out of Black's stash.
        assert_eq!(game.state().stash(Player::Black), 5);
        assert_eq!(game.state().stash(Player::White), 6);
    }

    #[test]
    fn commit_rejects_what_validation_rejects() {
        let mut game = Game::default();
        play_setup(&mut game);
        // Two actions on the single-action ply.
        let err = game.apply("c2-c5,e5v", ValidationMode::Strict).unwrap_err();
        assert!(matches!(err, MoveError::Illegal { reason: RuleViolation::Phase(_), .. }));
        assert!(matches!(
            game.validate("c2-c5,e5v"),
            Validation::Invalid(RuleViolation::Phase(_))
        ));
        // The failed commit left no trace.
        assert_eq!(game.ply(), 7);
    }

    #[test]
    fn interactive_partials_validate_but_do_not_commit() {
        let mut game = Game::default();
        play_setup(&mut game);
        game.apply("c2-c5", ValidationMode::Strict).unwrap();
        assert_eq!(
            game.validate("c9-c6"),
            Validation::Incomplete(Pending::SecondActionNeeded)
        );
        assert!(matches!(
            game.apply("c9-c6", ValidationMode::InteractivePartial),
            Err(MoveError::Incomplete(_))
        ));
    }

    #[test]
    fn undo_restores_the_exact_position() {
        let mut game = Game::default();
        play_setup(&mut game);
        game.apply("c2-c5", ValidationMode::Strict).unwrap();
        let before = game.state().clone();

        game.apply("c9-c6,d6h", ValidationMode::Strict).unwrap();
        assert_ne!(*game.state(), before);
        assert_eq!(game.undo(), Some("c9-c6,d6h".to_string()));
        assert_eq!(*game.state(), before);
        assert_eq!(game.ply(), 8);
    }

    #[test]
    fn undo_at_the_start_is_a_no_op() {
        let mut game = Game::default();
        assert_eq!(game.undo(), None);
    }

    #[test]
    fn jump_flags_do_not_outlive_the_turn() {
        let mut game = Game::default();
        play_setup(&mut game);
        game.apply("c2-c5", ValidationMode::Strict).unwrap();
        // Black raises a wall north of c6, then leaps it next turn.
        game.apply("c9-c6,c6h", ValidationMode::Strict).unwrap();
        game.apply("e2-e5,e5h", ValidationMode::Strict).unwrap();
        game.apply("c6-c8,d8v", ValidationMode::Strict).unwrap();
        assert!(game.state().jumped_barriers().is_empty());
    }

    #[test]
    fn snapshot_roundtrip_preserves_the_position() {
        let mut game = Game::default();
        play_setup(&mut game);
        game.apply("c2-c5", ValidationMode::Strict).unwrap();

        let snap = game.snapshot();
        assert_eq!(snap.produced_by.as_deref(), Some("c2-c5"));
        let restored = snap.restore(game.topology()).unwrap();
        assert_eq!(restored, *game.state());

        let json = snap.to_json();
        let back = Snapshot::from_json(&json).unwrap();
        assert_eq!(back.restore(game.topology()).unwrap(), *game.state());
    }

    #[test]
    fn every_enumerated_turn_commits_cleanly() {
        let mut game = Game::default();
        play_setup(&mut game);
        game.apply("c2-c5", ValidationMode::Strict).unwrap();
        for turn in game.moves() {
            let mut scratch = game.clone();
            scratch.apply(&turn, ValidationMode::TrustedCommit).unwrap();
        }
    }

    #[test]
    fn boxing_in_the_last_roamer_ends_the_game() {
        // One roamer each keeps the hunt short.
        let mut game = Game::new(GameConfig { roamers_per_player: 1, ..GameConfig::default() });
        game.apply("f5", ValidationMode::Strict).unwrap();
        game.apply("c7", ValidationMode::Strict).unwrap();

        // White walls Black's north line; Black shuttles while the east
        // wall goes up, then wanders back into the half-built box.
        game.apply("c7h", ValidationMode::Strict).unwrap();
        game.apply("c7-b7,h9h", ValidationMode::Strict).unwrap();
        game.apply("f5-f6,c7v", ValidationMode::Strict).unwrap();
        game.apply("b7-c7,h2h", ValidationMode::Strict).unwrap();
        assert!(!game.is_over());

        // Landing on c6 blocks the south line; the west wall closes the
        // last one and the entrapment cascade takes the roamer.
        let outcome = game.apply("f6-c6,b7v", ValidationMode::Strict).unwrap();
        assert_eq!(outcome.captures, vec![game.topology().parse_cell("c7").unwrap()]);
        assert_eq!(outcome.winner, Some(Player::White));

        assert!(game.is_over());
        assert_eq!(game.winner(), Some(Player::White));
        assert_eq!(game.apply("c7-c8", ValidationMode::Strict), Err(MoveError::Terminal));
        assert_eq!(game.validate("c6-c5"), Validation::Invalid(RuleViolation::Terminal));
        assert!(game.moves().is_empty());

        // Undoing the final turn reopens play.
        game.undo();
        assert!(!game.is_over());
        assert_eq!(game.winner(), None);
    }
}
