//! Fixed code tables shared with the backend.
//!
//! Unknown codes decode to an `Unknown` fallback so a backend that adds a new
//! category does not break older clients.

use serde::{Deserialize, Serialize};

/// Restaurant category a cherry-pick game is played over, sent as a numeric
/// `gameMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum GameCategory {
    All,
    Korean,
    Chinese,
    Japanese,
    Western,
    Asian,
    Cafe,
    Pub,
    Unknown(u8),
}

impl GameCategory {
    pub fn code(&self) -> u8 {
        (*self).into()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GameCategory::All => "Anything",
            GameCategory::Korean => "Korean",
            GameCategory::Chinese => "Chinese",
            GameCategory::Japanese => "Japanese",
            GameCategory::Western => "Western",
            GameCategory::Asian => "Asian",
            GameCategory::Cafe => "Cafe & Dessert",
            GameCategory::Pub => "Pub",
            GameCategory::Unknown(_) => "Other",
        }
    }
}

impl From<u8> for GameCategory {
    fn from(code: u8) -> Self {
        match code {
            0 => GameCategory::All,
            1 => GameCategory::Korean,
            2 => GameCategory::Chinese,
            3 => GameCategory::Japanese,
            4 => GameCategory::Western,
            5 => GameCategory::Asian,
            6 => GameCategory::Cafe,
            7 => GameCategory::Pub,
            other => GameCategory::Unknown(other),
        }
    }
}

impl From<GameCategory> for u8 {
    fn from(category: GameCategory) -> Self {
        match category {
            GameCategory::All => 0,
            GameCategory::Korean => 1,
            GameCategory::Chinese => 2,
            GameCategory::Japanese => 3,
            GameCategory::Western => 4,
            GameCategory::Asian => 5,
            GameCategory::Cafe => 6,
            GameCategory::Pub => 7,
            GameCategory::Unknown(code) => code,
        }
    }
}

/// One axis of the user's taste radar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagTitle {
    Taste,
    Mood,
    Price,
    Service,
    Cleanliness,
    Portion,
    Accessibility,
    #[serde(other)]
    Unknown,
}

impl TagTitle {
    /// Radar axes in the order the backend sends `radarValues`.
    pub const RADAR_AXES: [TagTitle; 7] = [
        TagTitle::Taste,
        TagTitle::Mood,
        TagTitle::Price,
        TagTitle::Service,
        TagTitle::Cleanliness,
        TagTitle::Portion,
        TagTitle::Accessibility,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            TagTitle::Taste => "Taste",
            TagTitle::Mood => "Mood",
            TagTitle::Price => "Price",
            TagTitle::Service => "Service",
            TagTitle::Cleanliness => "Cleanliness",
            TagTitle::Portion => "Portion",
            TagTitle::Accessibility => "Accessibility",
            TagTitle::Unknown => "Other",
        }
    }
}

/// Class label the backend assigns from the user's activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserClass {
    Beginner,
    Explorer,
    Gourmet,
    Connoisseur,
    #[serde(other)]
    Unknown,
}

impl UserClass {
    pub fn display_name(&self) -> &'static str {
        match self {
            UserClass::Beginner => "Beginner Picker",
            UserClass::Explorer => "Explorer",
            UserClass::Gourmet => "Gourmet",
            UserClass::Connoisseur => "Connoisseur",
            UserClass::Unknown => "Picker",
        }
    }
}
