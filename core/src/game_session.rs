//! Client-side view of a running game.
//!
//! Both the cherry-pick game and the preference game go through the same
//! phases:
//!
//! ```text
//! Started -> InProgress(round) -> AwaitingNextRound(round) -> InProgress(round) ...
//!                              \-> Completed(recommendation)
//! ```
//!
//! Only successful swipe responses move the session forward. A swipe that
//! fails leaves it `InProgress` so the caller can simply retry the swipe.

use thiserror::Error;

use crate::types::{
    GameResponse, UserPreferenceResponse, UserPreferenceStartResponse, GAME_STATUS_COMPLETED,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Started { round: u32 },
    InProgress { round: u32 },
    AwaitingNextRound { round: u32 },
    /// `recommendation` is the picked shop; the preference game never has one.
    Completed { recommendation: Option<i64> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameSessionError {
    #[error("no round is in progress")]
    NoRoundInProgress,
    #[error("a round is already in progress")]
    RoundAlreadyInProgress,
    #[error("the game is already completed")]
    AlreadyCompleted,
    #[error("swipe response is for game {got}, expected {expected}")]
    WrongGame { expected: i64, got: i64 },
}

/// A swipe response, from either game.
pub trait RoundUpdate {
    fn cur_round(&self) -> u32;
    fn total_round(&self) -> u32;
    /// `Some(recommendation)` once the game is over.
    fn outcome(&self) -> Option<Option<i64>>;
    fn game_id(&self) -> Option<i64> {
        None
    }
}

impl RoundUpdate for GameResponse {
    fn cur_round(&self) -> u32 {
        self.cur_round
    }

    fn total_round(&self) -> u32 {
        self.total_round
    }

    fn outcome(&self) -> Option<Option<i64>> {
        match self.recommended_shop_id {
            Some(shop_id) => Some(Some(shop_id)),
            None if self.game_status == GAME_STATUS_COMPLETED => Some(None),
            None => None,
        }
    }

    fn game_id(&self) -> Option<i64> {
        Some(self.game_id)
    }
}

impl RoundUpdate for UserPreferenceResponse {
    fn cur_round(&self) -> u32 {
        self.cur_round
    }

    fn total_round(&self) -> u32 {
        self.total_round
    }

    fn outcome(&self) -> Option<Option<i64>> {
        self.is_completed().then_some(None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    game_id: Option<i64>,
    total_round: u32,
    phase: GamePhase,
}

impl GameSession {
    /// Session for a cherry-pick game just started by `start`.
    pub fn from_game(start: &GameResponse) -> Self {
        Self {
            game_id: Some(start.game_id),
            total_round: start.total_round,
            phase: GamePhase::Started {
                round: start.cur_round,
            },
        }
    }

    /// Session for a preference game just started by `start`.
    pub fn from_preference(start: &UserPreferenceStartResponse) -> Self {
        Self {
            game_id: None,
            total_round: start.total_round,
            phase: GamePhase::Started {
                round: start.cur_round,
            },
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn game_id(&self) -> Option<i64> {
        self.game_id
    }

    pub fn total_round(&self) -> u32 {
        self.total_round
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.phase, GamePhase::Completed { .. })
    }

    /// Show the next round's cards.
    pub fn begin_round(&mut self) -> Result<u32, GameSessionError> {
        match self.phase {
            GamePhase::Started { round } | GamePhase::AwaitingNextRound { round } => {
                self.phase = GamePhase::InProgress { round };
                Ok(round)
            }
            GamePhase::InProgress { .. } => Err(GameSessionError::RoundAlreadyInProgress),
            GamePhase::Completed { .. } => Err(GameSessionError::AlreadyCompleted),
        }
    }

    /// Apply a successful swipe response to the round in progress.
    pub fn apply_swipe(&mut self, update: &impl RoundUpdate) -> Result<GamePhase, GameSessionError> {
        match self.phase {
            GamePhase::InProgress { .. } => {}
            GamePhase::Completed { .. } => return Err(GameSessionError::AlreadyCompleted),
            _ => return Err(GameSessionError::NoRoundInProgress),
        }
        if let (Some(expected), Some(got)) = (self.game_id, update.game_id()) {
            if expected != got {
                return Err(GameSessionError::WrongGame { expected, got });
            }
        }

        self.total_round = update.total_round();
        self.phase = match update.outcome() {
            Some(recommendation) => GamePhase::Completed { recommendation },
            None => GamePhase::AwaitingNextRound {
                round: update.cur_round(),
            },
        };
        Ok(self.phase)
    }
}
