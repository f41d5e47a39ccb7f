//! Symbolic endpoints and URL construction.
//!
//! # Design
//! `Endpoint` has one variant per backend operation, carrying exactly the
//! parameters that operation needs. Everything operation-specific about a
//! call (path, query items, method, auth, dispatch priority, retry policy and
//! the error substituted for HTTP 400) is derived from the variant here, so
//! the rest of the crate stays generic.

use url::Url;

use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::session::Priority;
use crate::types::{GameCategory, LoginPlatform};

/// Direction of a swipe in either game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    fn path_segment(&self) -> &'static str {
        match self {
            SwipeDirection::Left => "swipe-left",
            SwipeDirection::Right => "swipe-right",
        }
    }
}

/// How many automatic attempts an operation gets after a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    Never,
    Once,
}

impl RetryPolicy {
    pub fn extra_attempts(&self) -> u32 {
        match self {
            RetryPolicy::Never => 0,
            RetryPolicy::Once => 1,
        }
    }
}

/// One backend operation together with its parameters.
///
/// The variant alone decides the path, query, method, whether a bearer token
/// is attached, the dispatch [`Priority`], the
/// [`RetryPolicy`] and what a 400 response means.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login {
        platform: LoginPlatform,
    },
    LoginCallback {
        platform: LoginPlatform,
        code: String,
    },
    PreferenceCheck,
    PreferenceStart,
    PreferenceSwipe {
        direction: SwipeDirection,
        shop_id: i64,
    },
    GameStart {
        mode: GameCategory,
    },
    GameSwipe {
        direction: SwipeDirection,
        game_id: i64,
        shop_id: i64,
    },
    ShopCard {
        shop_id: i64,
    },
    ShopDetail {
        shop_id: i64,
    },
    ShopResults {
        game_id: i64,
    },
    ShopClippings,
    UserAnalyze,
    /// `change` switches the call from a read (GET) to a rename (PATCH).
    UserNickname {
        change: Option<String>,
    },
    UserUnregister,
    ClippingDo {
        shop_id: i64,
    },
    ClippingUndo {
        shop_id: i64,
    },
}

impl Endpoint {
    /// Short stable name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Login { .. } => "login",
            Endpoint::LoginCallback { .. } => "login_callback",
            Endpoint::PreferenceCheck => "preference_check",
            Endpoint::PreferenceStart => "preference_start",
            Endpoint::PreferenceSwipe { .. } => "preference_swipe",
            Endpoint::GameStart { .. } => "game_start",
            Endpoint::GameSwipe { .. } => "game_swipe",
            Endpoint::ShopCard { .. } => "shop_card",
            Endpoint::ShopDetail { .. } => "shop_detail",
            Endpoint::ShopResults { .. } => "shop_results",
            Endpoint::ShopClippings => "shop_clippings",
            Endpoint::UserAnalyze => "user_analyze",
            Endpoint::UserNickname { .. } => "user_nickname",
            Endpoint::UserUnregister => "user_unregister",
            Endpoint::ClippingDo { .. } => "clipping_do",
            Endpoint::ClippingUndo { .. } => "clipping_undo",
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::Login { platform } => format!("/api/v1/auth/{platform}/login"),
            Endpoint::LoginCallback { platform, .. } => {
                format!("/api/v1/auth/{platform}/callback")
            }
            Endpoint::PreferenceCheck => "/api/v1/preference/check".to_string(),
            Endpoint::PreferenceStart => "/api/v1/preference/start-game".to_string(),
            Endpoint::PreferenceSwipe { direction, .. } => {
                format!("/api/v1/preference/{}", direction.path_segment())
            }
            Endpoint::GameStart { .. } => "/api/v1/game/start-game".to_string(),
            Endpoint::GameSwipe { direction, .. } => {
                format!("/api/v1/game/{}", direction.path_segment())
            }
            Endpoint::ShopCard { .. } => "/api/v1/shop/card".to_string(),
            Endpoint::ShopDetail { .. } => "/api/v1/shop/detail".to_string(),
            Endpoint::ShopResults { .. } => "/api/v1/shop/results-simple".to_string(),
            Endpoint::ShopClippings => "/api/v1/shop/clippings-simple".to_string(),
            Endpoint::UserAnalyze => "/api/v1/user/analyze".to_string(),
            Endpoint::UserNickname { .. } => "/api/v1/user/nickname".to_string(),
            Endpoint::UserUnregister => "/api/v1/user/unregister".to_string(),
            Endpoint::ClippingDo { .. } => "/api/v1/clipping/do".to_string(),
            Endpoint::ClippingUndo { .. } => "/api/v1/clipping/undo".to_string(),
        }
    }

    /// Query items in the order they are emitted.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::LoginCallback { code, .. } => vec![("code", code.clone())],
            Endpoint::PreferenceSwipe { shop_id, .. }
            | Endpoint::ShopCard { shop_id }
            | Endpoint::ShopDetail { shop_id }
            | Endpoint::ClippingDo { shop_id }
            | Endpoint::ClippingUndo { shop_id } => vec![("shopId", shop_id.to_string())],
            Endpoint::GameStart { mode } => vec![("gameMode", mode.code().to_string())],
            Endpoint::GameSwipe {
                game_id, shop_id, ..
            } => vec![
                ("gameId", game_id.to_string()),
                ("shopId", shop_id.to_string()),
            ],
            Endpoint::ShopResults { game_id } => vec![("gameId", game_id.to_string())],
            Endpoint::UserNickname { change: Some(name) } => {
                vec![("changeUserNickname", name.clone())]
            }
            Endpoint::Login { .. }
            | Endpoint::PreferenceCheck
            | Endpoint::PreferenceStart
            | Endpoint::ShopClippings
            | Endpoint::UserAnalyze
            | Endpoint::UserNickname { change: None }
            | Endpoint::UserUnregister => Vec::new(),
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            Endpoint::PreferenceStart
            | Endpoint::PreferenceSwipe { .. }
            | Endpoint::GameStart { .. }
            | Endpoint::GameSwipe { .. }
            | Endpoint::ClippingDo { .. } => HttpMethod::Post,
            Endpoint::UserNickname { change: Some(_) } => HttpMethod::Patch,
            Endpoint::UserUnregister | Endpoint::ClippingUndo { .. } => HttpMethod::Delete,
            _ => HttpMethod::Get,
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Endpoint::Login { .. } | Endpoint::LoginCallback { .. })
    }

    /// Default dispatch priority when the operation runs through a session.
    pub fn priority(&self) -> Priority {
        match self {
            Endpoint::ShopResults { .. } | Endpoint::ShopClippings | Endpoint::UserAnalyze => {
                Priority::Background
            }
            _ => Priority::UserInitiated,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Endpoint::Login { .. } | Endpoint::LoginCallback { .. } => RetryPolicy::Once,
            _ => RetryPolicy::Never,
        }
    }

    /// The error an HTTP 400 turns into for this operation.
    ///
    /// The backend uses 400 for every rejected call, including expired
    /// tokens, so every operation reports it as an authentication failure.
    pub fn bad_request_error(&self) -> ApiError {
        ApiError::AuthenticationFailure
    }

    /// Absolute URL of this endpoint under `base`.
    ///
    /// Any path on `base` is kept as a prefix. Query items are
    /// form-urlencoded; absent optional parameters produce no item at all.
    pub fn url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        let path = format!("{}{}", base.path().trim_end_matches('/'), self.path());
        url.set_path(&path);
        url.set_fragment(None);
        let query = self.query();
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut()
                .clear()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        url
    }
}
