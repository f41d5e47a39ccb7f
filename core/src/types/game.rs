//! Records for the preference game and the cherry-pick game.
//!
//! # Design
//! Both games report progress the same way: a current round, a total and a
//! `gameStatus` that flips to [`GAME_STATUS_COMPLETED`] on the last swipe.
//! `GameSession` in `game_session` tracks that progression on top of these
//! records.

use serde::{Deserialize, Serialize};

use super::GameCategory;

/// `gameStatus` while rounds remain.
pub const GAME_STATUS_IN_PROGRESS: i32 = 0;
/// `gameStatus` once the game has finished.
pub const GAME_STATUS_COMPLETED: i32 = 1;

/// JSON body form of the start-game parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStartRequest {
    pub game_mode: GameCategory,
}

/// State of a cherry-pick game after a start or swipe call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub game_id: i64,
    pub total_round: u32,
    pub cur_round: u32,
    pub game_status: i32,
    #[serde(default)]
    pub recommend_shop_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_shop_id: Option<i64>,
}

impl GameResponse {
    pub fn is_completed(&self) -> bool {
        self.recommended_shop_id.is_some() || self.game_status == GAME_STATUS_COMPLETED
    }
}

/// JSON body form of the preference swipe parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferenceRequest {
    pub shop_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferenceCheckResponse {
    pub preference_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferenceStartResponse {
    pub total_round: u32,
    pub cur_round: u32,
    pub shop_id: i64,
}

/// State of the preference game after a swipe. `shop_id` is the next card,
/// absent once the game is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferenceResponse {
    pub total_round: u32,
    pub cur_round: u32,
    pub game_status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<i64>,
}

impl UserPreferenceResponse {
    pub fn is_completed(&self) -> bool {
        self.game_status == GAME_STATUS_COMPLETED
    }
}
