//! Turn phases of a game.
//!
//! The opening plies place roamers one per ply; the first ply after
//! setup grants a single action; every later ply grants two.

use crate::board::Player;
use crate::GameConfig;

/// The phase a given ply falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// One roamer placement per ply, alternating players.
    Setup,
    /// The single-action ply immediately after setup.
    FirstMove,
    /// Two actions, the first of which must be a roamer move.
    Normal,
}

/// The phase of the 1-based ply `ply`.
pub fn phase_for_ply(ply: u32, config: &GameConfig) -> TurnPhase {
    let setup_plies = 2 * u32::from(config.roamers_per_player);
    if ply <= setup_plies {
        TurnPhase::Setup
    } else if ply == setup_plies + 1 {
        TurnPhase::FirstMove
    } else {
        TurnPhase::Normal
    }
}

/// The player to act on the 1-based ply `ply`. White acts on odd plies.
pub fn player_for_ply(ply: u32) -> Player {
    if ply % 2 == 1 {
        Player::White
    } else {
        Player::Black
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_with_default_config() {
        let config = GameConfig::default();
        assert_eq!(phase_for_ply(1, &config), TurnPhase::Setup);
        assert_eq!(phase_for_ply(6, &config), TurnPhase::Setup);
        assert_eq!(phase_for_ply(7, &config), TurnPhase::FirstMove);
        assert_eq!(phase_for_ply(8, &config), TurnPhase::Normal);
        assert_eq!(phase_for_ply(100, &config), TurnPhase::Normal);
    }

    #[test]
    fn phases_scale_with_roamer_count() {
        let config = GameConfig { roamers_per_player: 5, ..GameConfig::default() };
        assert_eq!(phase_for_ply(10, &config), TurnPhase::Setup);
        assert_eq!(phase_for_ply(11, &config), TurnPhase::FirstMove);
        assert_eq!(phase_for_ply(12, &config), TurnPhase::Normal);
    }

    #[test]
    fn white_acts_on_odd_plies() {
        assert_eq!(player_for_ply(1), Player::White);
        assert_eq!(player_for_ply(2), Player::Black);
        assert_eq!(player_for_ply(7), Player::White);
        assert_eq!(player_for_ply(8), Player::Black);
    }
}
