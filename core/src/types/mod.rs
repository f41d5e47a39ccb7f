//! Wire records for the CherryPicker API.
//!
//! # Design
//! Every record is a plain immutable value with camelCase JSON field names,
//! matching the backend's schema. The mock-server crate defines its own
//! copies of these shapes; integration tests catch any drift between the two.

mod auth;
mod codes;
mod game;
mod shop;
mod tags;
mod user;

pub use auth::{LoginCallback, LoginPlatform, LoginResponse};
pub(crate) use auth::LoginCallbackBody;
pub use codes::{GameCategory, TagTitle, UserClass};
pub use game::{
    GameResponse, GameStartRequest, UserPreferenceCheckResponse, UserPreferenceRequest,
    UserPreferenceResponse, UserPreferenceStartResponse, GAME_STATUS_COMPLETED,
    GAME_STATUS_IN_PROGRESS,
};
pub use shop::{
    ClippingResponse, Menu, ShopCardResponse, ShopDetailResponse, ShopSimple, SimpleShopResponse,
};
pub use tags::{TagWeight, TopTags, TopTagsError, PERCENTILE_BUDGET};
pub use user::{UserAnalyzeResponse, UserNicknameResponse};
