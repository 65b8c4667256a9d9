//! Turn composition and validation.
//!
//! A parsed turn is checked action by action against a speculative
//! overlay of the committed board. Each action produces its capture set
//! and any barrier jump; nothing here mutates the board. The result of
//! composition is either a [`TurnPlan`] ready to commit, a [`Pending`]
//! describing what a partial turn still needs, or a [`RuleViolation`].
//!
//! The forced-piece rules thread through here in two places. At the
//! start of a turn, a forced piece of the acting player constrains the
//! first action: it must move that piece, or relieve it. After each
//! action, any player left with two or more simultaneously forced
//! pieces loses all but one of them, and the action's `/cell` suffix
//! names the survivor.

use thiserror::Error;

use crate::board::{BoardState, Cell, Edge, GridTopology, Player};
use crate::rules::{
    all_forced, captures_after_move, captures_after_wall, forced_at_turn_start, is_forced,
    reach_to, sole_forced, validate_wall_action, Overlay, ReachMode, WallIssue,
};
use crate::GameConfig;

use super::notation::{ActionToken, NotationError, ParsedAction, ParsedTurn};
use super::phase::{phase_for_ply, player_for_ply, TurnPhase};

/// How strictly a turn string is held to completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Full validation; partial turns are rejected.
    Strict,
    /// The caller vouches for legality; the structural gates that only
    /// exist to reject illegal input are skipped.
    TrustedCommit,
    /// Partial turns are reported as [`Pending`] so an interface can
    /// build a turn incrementally.
    InteractivePartial,
}

/// A rule the turn string breaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error(transparent)]
    Format(#[from] NotationError),

    #[error("occupancy: {0}")]
    Occupancy(String),

    #[error("phase: {0}")]
    Phase(String),

    #[error("forced piece: {0}")]
    Forced(String),

    #[error("stash mode: {0}")]
    StashMode(String),

    #[error("forced choice: {0}")]
    AmbiguousForced(String),

    #[error("the game is already over")]
    Terminal,
}

/// What a structurally valid but incomplete turn still needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// A roamer is selected but its destination is not given yet.
    DestinationNeeded { from: Cell },
    /// Several pieces of one player became forced at once; a `/cell`
    /// suffix must name the survivor.
    ChoiceNeeded { candidates: Vec<Cell> },
    /// The turn grants a second action and none was given.
    SecondActionNeeded,
}

/// Validation verdict for a turn string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Incomplete(Pending),
    Invalid(RuleViolation),
}

/// One fully resolved action of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub kind: ActionKind,
    /// Every roamer removed by this action, suicide and forced-choice
    /// losses included.
    pub captures: Vec<Cell>,
}

/// The board effect of one action, before captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Setup placement of a new roamer.
    Place { cell: Cell },
    /// A roamer slide, with the friendly barrier it leapt, if any.
    Move { from: Cell, to: Cell, jumped: Option<Edge> },
    /// A barrier placement (`from` empty) or relocation.
    Wall { from: Option<Edge>, to: Edge },
}

/// A committed-ready turn: the actions in order, pre-resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnPlan {
    pub player: Player,
    pub actions: Vec<PlannedAction>,
}

/// The outcome of composing a parsed turn against a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composition {
    Complete(TurnPlan),
    Incomplete(Pending),
    Invalid(RuleViolation),
}

impl Composition {
    /// Drops the plan, keeping the verdict.
    pub fn verdict(&self) -> Validation {
        match self {
            Composition::Complete(_) => Validation::Valid,
            Composition::Incomplete(p) => Validation::Incomplete(p.clone()),
            Composition::Invalid(v) => Validation::Invalid(v.clone()),
        }
    }
}

/// Composes `turn` for the 1-based ply `ply` of `state`.
///
/// The caller is responsible for rejecting turns in a finished game.
pub fn compose_turn(
    topo: &GridTopology,
    state: &BoardState,
    config: &GameConfig,
    ply: u32,
    turn: &ParsedTurn,
    mode: ValidationMode,
) -> Composition {
    Composer { topo, state, mode, player: player_for_ply(ply) }
        .compose(phase_for_ply(ply, config), turn)
}

struct Composer<'a> {
    topo: &'a GridTopology,
    state: &'a BoardState,
    mode: ValidationMode,
    player: Player,
}

/// Effect of one successfully composed action.
struct ActionEffect {
    planned: PlannedAction,
    overlay: Overlay,
}

enum ActionStep {
    Done(ActionEffect),
    Pending(Pending),
    Broken(RuleViolation),
}

impl Composer<'_> {
    fn compose(&self, phase: TurnPhase, turn: &ParsedTurn) -> Composition {
        match phase {
            TurnPhase::Setup => self.compose_setup(turn),
            TurnPhase::FirstMove => self.compose_first_move(turn),
            TurnPhase::Normal => self.compose_normal(turn),
        }
    }

    fn compose_setup(&self, turn: &ParsedTurn) -> Composition {
        if turn.actions.len() != 1 {
            return self.phase_gate("a setup ply takes exactly one placement");
        }
        let action = &turn.actions[0];
        let cell = match action.token {
            ActionToken::CellOnly(cell) => cell,
            _ => return self.phase_gate("a setup ply takes a single cell placement"),
        };
        if action.choice.is_some() {
            return Composition::Invalid(RuleViolation::AmbiguousForced(
                "no forced ambiguity to resolve".to_string(),
            ));
        }
        if self.state.roamer_at(self.topo, cell).is_some() {
            return Composition::Invalid(RuleViolation::Occupancy(format!(
                "{} is occupied",
                self.topo.format_cell(cell)
            )));
        }
        Composition::Complete(TurnPlan {
            player: self.player,
            actions: vec![PlannedAction {
                kind: ActionKind::Place { cell },
                captures: Vec::new(),
            }],
        })
    }

    fn compose_first_move(&self, turn: &ParsedTurn) -> Composition {
        if turn.actions.len() != 1 {
            return self.phase_gate("the first post-setup ply grants a single action");
        }
        let forced_before = forced_at_turn_start(
            self.topo,
            self.state,
            [self.player, self.player.opponent()],
        );
        let effect = match self.compose_action(&turn.actions[0], &Overlay::new(), &forced_before) {
            ActionStep::Done(effect) => effect,
            ActionStep::Pending(p) => return self.incomplete(p),
            ActionStep::Broken(v) => return Composition::Invalid(v),
        };
        if let Some(violation) = self.forced_gate(&turn.actions[0], &effect) {
            return Composition::Invalid(violation);
        }
        Composition::Complete(TurnPlan { player: self.player, actions: vec![effect.planned] })
    }

    fn compose_normal(&self, turn: &ParsedTurn) -> Composition {
        let forced_before = forced_at_turn_start(
            self.topo,
            self.state,
            [self.player, self.player.opponent()],
        );

        // Action 1 is always a roamer move.
        let first_token = &turn.actions[0];
        match first_token.token {
            ActionToken::CellOnly(_) | ActionToken::RoamerMove { .. } => {}
            ActionToken::WallPlace { .. } | ActionToken::WallMove { .. } => {
                return self.phase_gate("the first action of a turn must move a roamer");
            }
        }
        let first = match self.compose_action(first_token, &Overlay::new(), &forced_before) {
            ActionStep::Done(effect) => effect,
            ActionStep::Pending(p) => return self.incomplete(p),
            ActionStep::Broken(v) => return Composition::Invalid(v),
        };
        if let Some(violation) = self.forced_gate(first_token, &first) {
            return Composition::Invalid(violation);
        }

        // A turn truncates the moment either player runs out of roamers.
        let wiped = [self.player, self.player.opponent()]
            .iter()
            .any(|p| first.overlay.roamer_count(self.state, *p) == 0);
        if wiped {
            if turn.actions.len() > 1 {
                return self.phase_gate("no second action: the game ended on the first");
            }
            return Composition::Complete(TurnPlan {
                player: self.player,
                actions: vec![first.planned],
            });
        }

        let second_token = match turn.actions.get(1) {
            Some(action) => action,
            None => return self.incomplete(Pending::SecondActionNeeded),
        };
        // The deferred-capture oracle for action 2 still reads the
        // start-of-turn forced set, not one recomputed after action 1.
        let second = match self.compose_action(second_token, &first.overlay, &forced_before) {
            ActionStep::Done(effect) => effect,
            ActionStep::Pending(p) => return self.incomplete(p),
            ActionStep::Broken(v) => return Composition::Invalid(v),
        };
        Composition::Complete(TurnPlan {
            player: self.player,
            actions: vec![first.planned, second.planned],
        })
    }

    /// The acting player's start-of-turn forced piece must be the piece
    /// moved by action 1, or must no longer be forced once action 1 is
    /// applied. Skipped under [`ValidationMode::TrustedCommit`].
    fn forced_gate(
        &self,
        action: &ParsedAction,
        effect: &ActionEffect,
    ) -> Option<RuleViolation> {
        if self.mode == ValidationMode::TrustedCommit {
            return None;
        }
        let mine = sole_forced(self.topo, self.state, &Overlay::new(), self.player)?;
        if let ActionToken::RoamerMove { from, .. } = action.token {
            if from == mine {
                return None;
            }
        }
        // The forced piece may have been captured by the action, or its
        // escape may have been opened; both relieve the obligation.
        if !is_forced(self.topo, self.state, &effect.overlay, self.player, mine) {
            return None;
        }
        Some(RuleViolation::Forced(format!(
            "the piece at {} is forced and must move or be relieved",
            self.topo.format_cell(mine)
        )))
    }

    fn compose_action(
        &self,
        action: &ParsedAction,
        overlay: &Overlay,
        forced_before: &[Cell],
    ) -> ActionStep {
        match action.token {
            ActionToken::CellOnly(from) | ActionToken::RoamerMove { from, to: None } => {
                self.partial_move(from, overlay)
            }
            ActionToken::RoamerMove { from, to: Some(to) } => {
                self.move_action(from, to, action.choice, overlay, forced_before)
            }
            ActionToken::WallPlace { at } => {
                self.wall_action(None, at, action.choice, overlay, forced_before)
            }
            ActionToken::WallMove { from, to } => {
                self.wall_action(Some(from), to, action.choice, overlay, forced_before)
            }
        }
    }

    fn partial_move(&self, from: Cell, overlay: &Overlay) -> ActionStep {
        if let Some(violation) = self.check_source(from, overlay) {
            return ActionStep::Broken(violation);
        }
        match self.mode {
            ValidationMode::InteractivePartial => {
                ActionStep::Pending(Pending::DestinationNeeded { from })
            }
            _ => ActionStep::Broken(RuleViolation::Phase(
                "a committed action needs a destination".to_string(),
            )),
        }
    }

    fn check_source(&self, from: Cell, overlay: &Overlay) -> Option<RuleViolation> {
        match overlay.roamer_owner_at(self.topo, self.state, from) {
            Some(p) if p == self.player => None,
            Some(_) => Some(RuleViolation::Occupancy(format!(
                "the roamer at {} is not yours",
                self.topo.format_cell(from)
            ))),
            None => Some(RuleViolation::Occupancy(format!(
                "no roamer at {}",
                self.topo.format_cell(from)
            ))),
        }
    }

    fn move_action(
        &self,
        from: Cell,
        to: Cell,
        choice: Option<Cell>,
        overlay: &Overlay,
        forced_before: &[Cell],
    ) -> ActionStep {
        if let Some(violation) = self.check_source(from, overlay) {
            return ActionStep::Broken(violation);
        }
        let reach = match reach_to(
            self.topo,
            self.state,
            overlay,
            self.player,
            from,
            to,
            ReachMode::Normal,
        ) {
            Some(reach) => reach,
            None => {
                return ActionStep::Broken(RuleViolation::Occupancy(format!(
                    "{} is not reachable from {}",
                    self.topo.format_cell(to),
                    self.topo.format_cell(from)
                )))
            }
        };

        let mut next = overlay.with_roamer_moved(from, to, self.player);
        if let Some(edge) = reach.jumped_wall {
            next = next.with_jumped(edge);
        }
        let captures = captures_after_move(self.topo, self.state, &next, self.player, to, forced_before);
        self.finish_action(ActionKind::Move { from, to, jumped: reach.jumped_wall }, next, captures, choice)
    }

    fn wall_action(
        &self,
        from: Option<Edge>,
        to: Edge,
        choice: Option<Cell>,
        overlay: &Overlay,
        forced_before: &[Cell],
    ) -> ActionStep {
        if !self.topo.valid_edge(to) || from.is_some_and(|f| !self.topo.valid_edge(f)) {
            return ActionStep::Broken(RuleViolation::Occupancy("no such barrier slot".to_string()));
        }
        if let Err(issue) = validate_wall_action(self.topo, self.state, overlay, self.player, from, to) {
            return ActionStep::Broken(wall_violation(self.topo, issue));
        }
        let owner = match from {
            // Ownership survives relocation, the opponent's included.
            Some(from) => match overlay.wall_at(self.topo, self.state, from) {
                Some(wall) => wall.owner,
                None => {
                    return ActionStep::Broken(RuleViolation::Occupancy(format!(
                        "no barrier at {}",
                        self.topo.format_edge(from)
                    )))
                }
            },
            None => self.player,
        };

        let mut next = overlay.clone();
        if let Some(from) = from {
            next = next.with_wall_removed(from);
        }
        next = next.with_wall_added(to, owner, self.player);
        let captures = captures_after_wall(self.topo, self.state, &next, from, to, forced_before);
        self.finish_action(ActionKind::Wall { from, to }, next, captures, choice)
    }

    /// Applies `captures` to the overlay, then settles any multiple
    /// forced-piece ambiguity with the action's choice.
    fn finish_action(
        &self,
        kind: ActionKind,
        overlay: Overlay,
        captures: Vec<Cell>,
        choice: Option<Cell>,
    ) -> ActionStep {
        let mut overlay = overlay;
        let mut captures = captures;
        for cell in &captures {
            overlay = overlay.with_roamer_removed(*cell);
        }

        let mut choice = choice;
        for player in [self.player, self.player.opponent()] {
            let forced = all_forced(self.topo, self.state, &overlay, player);
            if forced.len() < 2 {
                continue;
            }
            let survivor = match choice.take() {
                None => return ActionStep::Pending(Pending::ChoiceNeeded { candidates: forced }),
                Some(c) if !forced.contains(&c) => {
                    return ActionStep::Broken(RuleViolation::AmbiguousForced(format!(
                        "{} is not one of the simultaneously forced pieces",
                        self.topo.format_cell(c)
                    )))
                }
                Some(c) => c,
            };
            for cell in forced {
                if cell != survivor {
                    overlay = overlay.with_roamer_removed(cell);
                    captures.push(cell);
                }
            }
        }
        if let Some(c) = choice {
            return ActionStep::Broken(RuleViolation::AmbiguousForced(format!(
                "choice {} given but no forced ambiguity arose",
                self.topo.format_cell(c)
            )));
        }

        ActionStep::Done(ActionEffect { planned: PlannedAction { kind, captures }, overlay })
    }

    fn phase_gate(&self, message: &str) -> Composition {
        if self.mode == ValidationMode::TrustedCommit {
            debug_assert!(false, "trusted commit of a phase-illegal turn: {}", message);
        }
        Composition::Invalid(RuleViolation::Phase(message.to_string()))
    }

    fn incomplete(&self, pending: Pending) -> Composition {
        // An unresolved forced choice stays incomplete in every mode;
        // any other gap is a hard failure outside interactive entry.
        if self.mode != ValidationMode::InteractivePartial
            && !matches!(pending, Pending::ChoiceNeeded { .. })
        {
            return Composition::Invalid(RuleViolation::Phase(
                "turn is incomplete and cannot be committed".to_string(),
            ));
        }
        Composition::Incomplete(pending)
    }
}

fn wall_violation(topo: &GridTopology, issue: WallIssue) -> RuleViolation {
    match issue {
        WallIssue::MustPlace => {
            RuleViolation::StashMode("stash is not empty: place a barrier instead".to_string())
        }
        WallIssue::MustRelocate => {
            RuleViolation::StashMode("stash is empty: relocate a barrier instead".to_string())
        }
        WallIssue::SlotOccupied(e) => RuleViolation::Occupancy(format!(
            "a barrier already sits at {}",
            topo.format_edge(e)
        )),
        WallIssue::NoBarrierAt(e) => {
            RuleViolation::Occupancy(format!("no barrier at {}", topo.format_edge(e)))
        }
        WallIssue::BarrierJumped(e) => RuleViolation::Occupancy(format!(
            "the barrier at {} was jumped this turn",
            topo.format_edge(e)
        )),
        WallIssue::NotRelocatable(e) => RuleViolation::Occupancy(format!(
            "the barrier at {} belongs to the opponent and no roamer of yours touches the destination",
            topo.format_edge(e)
        )),
        WallIssue::SameSlot(e) => RuleViolation::Occupancy(format!(
            "the barrier at {} would not move",
            topo.format_edge(e)
        )),
    }
}
