//! In-memory stand-in for the CherryPicker backend.
//!
//! Serves the `/api/v1` routes the client talks to, with a handful of seeded
//! shops and a single user. Like the real backend it answers every rejected
//! call (missing token, unknown shop or game, bad parameters) with 400.
//! `POST /echo` returns its JSON body unchanged.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

/// Rounds in both games.
pub const TOTAL_ROUNDS: u32 = 5;
const STATUS_IN_PROGRESS: i32 = 0;
const STATUS_COMPLETED: i32 = 1;

/// Login code that makes the callback "forget" the Authorization header.
pub const HEADERLESS_CODE: &str = "no-header";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TagWeight {
    pub description: String,
    pub weight: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub shop_id: i64,
    pub shop_name: String,
    pub shop_category: String,
    pub category_code: u8,
    pub shop_address: String,
    pub one_line_review: String,
    pub photo_urls: Vec<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub menus: Vec<Menu>,
    pub top_tags: Vec<TagWeight>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub name: String,
    pub price: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub game_id: i64,
    pub total_round: u32,
    pub cur_round: u32,
    pub game_status: i32,
    pub recommend_shop_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_shop_id: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceResponse {
    pub total_round: u32,
    pub cur_round: u32,
    pub game_status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShopSimple {
    pub shop_id: i64,
    pub shop_name: String,
    pub shop_category: String,
    pub shop_address: String,
    pub main_photo_url: Option<String>,
    pub shop_clipping: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClippingResponse {
    pub shop_id: i64,
    pub shop_clipping: bool,
}

#[derive(Debug)]
struct Game {
    cur_round: u32,
    candidates: Vec<i64>,
    liked: Vec<i64>,
    recommended: Option<i64>,
}

#[derive(Debug)]
pub struct Backend {
    shops: Vec<Shop>,
    clippings: BTreeSet<i64>,
    nickname: String,
    games: HashMap<i64, Game>,
    next_game_id: i64,
    preference_round: u32,
    preference_completed: bool,
}

impl Backend {
    pub fn seeded() -> Self {
        Self {
            shops: seed_shops(),
            clippings: BTreeSet::new(),
            nickname: "cherry".to_string(),
            games: HashMap::new(),
            next_game_id: 1,
            preference_round: 0,
            preference_completed: false,
        }
    }

    fn shop(&self, shop_id: i64) -> Result<&Shop, StatusCode> {
        self.shops
            .iter()
            .find(|shop| shop.shop_id == shop_id)
            .ok_or(StatusCode::BAD_REQUEST)
    }

    fn simple(&self, shop: &Shop) -> ShopSimple {
        ShopSimple {
            shop_id: shop.shop_id,
            shop_name: shop.shop_name.clone(),
            shop_category: shop.shop_category.clone(),
            shop_address: shop.shop_address.clone(),
            main_photo_url: shop.photo_urls.first().cloned(),
            shop_clipping: self.clippings.contains(&shop.shop_id),
        }
    }

    fn simples(&self, ids: &[i64]) -> Vec<ShopSimple> {
        ids.iter()
            .filter_map(|id| self.shop(*id).ok())
            .map(|shop| self.simple(shop))
            .collect()
    }
}

pub type Db = Arc<RwLock<Backend>>;

fn seed_shops() -> Vec<Shop> {
    let shop = |shop_id: i64, name: &str, category: &str, code: u8, tags: &[(&str, u32)]| Shop {
        shop_id,
        shop_name: name.to_string(),
        shop_category: category.to_string(),
        category_code: code,
        shop_address: format!("{shop_id} Cherry-ro, Seoul"),
        one_line_review: format!("People keep coming back to {name}."),
        photo_urls: vec![format!("https://img.cherrypicker.test/shops/{shop_id}.jpg")],
        latitude: 37.5 + shop_id as f64 / 1000.0,
        longitude: 127.0 + shop_id as f64 / 1000.0,
        menus: vec![Menu {
            name: format!("{name} special"),
            price: 12000,
        }],
        top_tags: tags
            .iter()
            .map(|(description, weight)| TagWeight {
                description: description.to_string(),
                weight: *weight,
            })
            .collect(),
    };
    vec![
        shop(11, "Gukbap House", "Korean", 1, &[("hearty", 40), ("cheap", 30)]),
        shop(12, "Bibim Bar", "Korean", 1, &[("fresh", 35), ("colorful", 35)]),
        shop(13, "Dumpling Lab", "Chinese", 2, &[("juicy", 50), ("fast", 20)]),
        shop(14, "Sushi Corner", "Japanese", 3, &[("fresh", 60), ("quiet", 25)]),
        shop(15, "Pasta Street", "Western", 4, &[("cozy", 30), ("date", 30)]),
        shop(16, "Pho Station", "Asian", 5, &[("light", 45)]),
        shop(17, "Bean There", "Cafe & Dessert", 6, &[("quiet", 40), ("cake", 40)]),
    ]
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Backend::seeded()));
    Router::new()
        .route("/echo", post(echo))
        .route("/api/v1/auth/{platform}/login", get(login))
        .route("/api/v1/auth/{platform}/callback", get(login_callback))
        .route("/api/v1/preference/check", get(preference_check))
        .route("/api/v1/preference/start-game", post(preference_start))
        .route("/api/v1/preference/{direction}", post(preference_swipe))
        .route("/api/v1/game/start-game", post(game_start))
        .route("/api/v1/game/{direction}", post(game_swipe))
        .route("/api/v1/shop/card", get(shop_card))
        .route("/api/v1/shop/detail", get(shop_detail))
        .route("/api/v1/shop/results-simple", get(shop_results))
        .route("/api/v1/shop/clippings-simple", get(shop_clippings))
        .route("/api/v1/user/analyze", get(user_analyze))
        .route("/api/v1/user/nickname", get(user_nickname).patch(user_nickname))
        .route("/api/v1/user/unregister", delete(user_unregister))
        .route("/api/v1/clipping/do", post(clipping_do))
        .route("/api/v1/clipping/undo", delete(clipping_undo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("mock backend listening on {addr}");
    }
    axum::serve(listener, app()).await
}

type Reply<T> = Result<Json<T>, StatusCode>;

/// The backend answers a missing or malformed token with 400.
fn authorize(headers: &HeaderMap) -> Result<(), StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or("");
    if token.trim().is_empty() {
        debug!("rejecting call without bearer token");
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

fn known_platform(platform: &str) -> Result<(), StatusCode> {
    match platform {
        "apple" | "kakao" | "google" => Ok(()),
        _ => Err(StatusCode::BAD_REQUEST),
    }
}

fn swipe_right(direction: &str) -> Result<bool, StatusCode> {
    match direction {
        "swipe-right" => Ok(true),
        "swipe-left" => Ok(false),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn echo(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn login(Path(platform): Path<String>) -> Reply<Value> {
    known_platform(&platform)?;
    Ok(Json(serde_json::json!({
        "platform": platform,
        "redirectUrl": format!("https://auth.cherrypicker.test/{platform}/authorize"),
    })))
}

#[derive(Deserialize)]
struct CodeQuery {
    code: String,
}

async fn login_callback(
    Path(platform): Path<String>,
    Query(query): Query<CodeQuery>,
) -> Result<Response, StatusCode> {
    known_platform(&platform)?;
    if query.code.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    info!(%platform, "login callback");
    let body = Json(serde_json::json!({ "email": format!("{}@{platform}.example", query.code) }));
    if query.code == HEADERLESS_CODE {
        return Ok(body.into_response());
    }
    let token = format!("Bearer token-{}", query.code);
    Ok(([(header::AUTHORIZATION, token)], body).into_response())
}

async fn preference_check(State(db): State<Db>, headers: HeaderMap) -> Reply<Value> {
    authorize(&headers)?;
    let backend = db.read().await;
    Ok(Json(serde_json::json!({ "preferenceCompleted": backend.preference_completed })))
}

async fn preference_start(State(db): State<Db>, headers: HeaderMap) -> Reply<Value> {
    authorize(&headers)?;
    let mut backend = db.write().await;
    backend.preference_round = 1;
    backend.preference_completed = false;
    let first = backend.shops[0].shop_id;
    Ok(Json(serde_json::json!({
        "totalRound": TOTAL_ROUNDS,
        "curRound": 1,
        "shopId": first,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShopQuery {
    shop_id: i64,
}

async fn preference_swipe(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(direction): Path<String>,
    Query(query): Query<ShopQuery>,
) -> Reply<PreferenceResponse> {
    authorize(&headers)?;
    swipe_right(&direction)?;
    let mut backend = db.write().await;
    backend.shop(query.shop_id)?;
    if backend.preference_round == 0 || backend.preference_completed {
        return Err(StatusCode::BAD_REQUEST);
    }
    backend.preference_round += 1;
    if backend.preference_round > TOTAL_ROUNDS {
        backend.preference_completed = true;
        return Ok(Json(PreferenceResponse {
            total_round: TOTAL_ROUNDS,
            cur_round: TOTAL_ROUNDS,
            game_status: STATUS_COMPLETED,
            shop_id: None,
        }));
    }
    let index = (backend.preference_round as usize - 1) % backend.shops.len();
    Ok(Json(PreferenceResponse {
        total_round: TOTAL_ROUNDS,
        cur_round: backend.preference_round,
        game_status: STATUS_IN_PROGRESS,
        shop_id: Some(backend.shops[index].shop_id),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameModeQuery {
    game_mode: u8,
}

async fn game_start(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<GameModeQuery>,
) -> Reply<GameResponse> {
    authorize(&headers)?;
    let mut backend = db.write().await;
    let mut candidates: Vec<i64> = backend
        .shops
        .iter()
        .filter(|shop| query.game_mode == 0 || shop.category_code == query.game_mode)
        .map(|shop| shop.shop_id)
        .collect();
    if candidates.is_empty() {
        candidates = backend.shops.iter().map(|shop| shop.shop_id).collect();
    }
    candidates.truncate(3);

    let game_id = backend.next_game_id;
    backend.next_game_id += 1;
    backend.games.insert(
        game_id,
        Game {
            cur_round: 1,
            candidates: candidates.clone(),
            liked: Vec::new(),
            recommended: None,
        },
    );
    Ok(Json(GameResponse {
        game_id,
        total_round: TOTAL_ROUNDS,
        cur_round: 1,
        game_status: STATUS_IN_PROGRESS,
        recommend_shop_ids: candidates,
        recommended_shop_id: None,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwipeQuery {
    game_id: i64,
    shop_id: i64,
}

async fn game_swipe(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(direction): Path<String>,
    Query(query): Query<SwipeQuery>,
) -> Reply<GameResponse> {
    authorize(&headers)?;
    let liked = swipe_right(&direction)?;
    let mut backend = db.write().await;
    backend.shop(query.shop_id)?;
    let game = backend
        .games
        .get_mut(&query.game_id)
        .ok_or(StatusCode::BAD_REQUEST)?;
    if game.recommended.is_some() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if liked && !game.liked.contains(&query.shop_id) {
        game.liked.push(query.shop_id);
    }
    game.cur_round += 1;

    let finished = game.cur_round > TOTAL_ROUNDS;
    if finished {
        game.recommended = game
            .liked
            .first()
            .or_else(|| game.candidates.first())
            .copied();
    }
    Ok(Json(GameResponse {
        game_id: query.game_id,
        total_round: TOTAL_ROUNDS,
        cur_round: game.cur_round.min(TOTAL_ROUNDS),
        game_status: if finished {
            STATUS_COMPLETED
        } else {
            STATUS_IN_PROGRESS
        },
        recommend_shop_ids: game.candidates.clone(),
        recommended_shop_id: game.recommended,
    }))
}

async fn shop_card(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ShopQuery>,
) -> Reply<Value> {
    authorize(&headers)?;
    let backend = db.read().await;
    let shop = backend.shop(query.shop_id)?;
    Ok(Json(serde_json::json!({
        "shopId": shop.shop_id,
        "shopName": shop.shop_name,
        "shopCategory": shop.shop_category,
        "shopAddress": shop.shop_address,
        "oneLineReview": shop.one_line_review,
        "photoUrls": shop.photo_urls,
        "shopClipping": backend.clippings.contains(&shop.shop_id),
        "topTags": shop.top_tags,
    })))
}

async fn shop_detail(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ShopQuery>,
) -> Reply<Value> {
    authorize(&headers)?;
    let backend = db.read().await;
    let shop = backend.shop(query.shop_id)?;
    Ok(Json(serde_json::json!({
        "shopId": shop.shop_id,
        "shopName": shop.shop_name,
        "shopCategory": shop.shop_category,
        "shopAddress": shop.shop_address,
        "shopHours": "11:00 - 22:00",
        "shopPhone": format!("02-000-{:04}", shop.shop_id),
        "latitude": shop.latitude,
        "longitude": shop.longitude,
        "photoUrls": shop.photo_urls,
        "menus": shop.menus,
        "totalReviewCount": 42,
        "shopClipping": backend.clippings.contains(&shop.shop_id),
        "topTags": shop.top_tags,
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameQuery {
    game_id: i64,
}

async fn shop_results(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<GameQuery>,
) -> Reply<Value> {
    authorize(&headers)?;
    let backend = db.read().await;
    let game = backend
        .games
        .get(&query.game_id)
        .ok_or(StatusCode::BAD_REQUEST)?;
    let ids: Vec<i64> = game.recommended.into_iter().chain(game.liked.iter().copied()).collect();
    let mut seen = BTreeSet::new();
    let ids: Vec<i64> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
    Ok(Json(serde_json::json!({ "shops": backend.simples(&ids) })))
}

async fn shop_clippings(State(db): State<Db>, headers: HeaderMap) -> Reply<Value> {
    authorize(&headers)?;
    let backend = db.read().await;
    let ids: Vec<i64> = backend.clippings.iter().copied().collect();
    Ok(Json(serde_json::json!({ "shops": backend.simples(&ids) })))
}

async fn user_analyze(State(db): State<Db>, headers: HeaderMap) -> Reply<Value> {
    authorize(&headers)?;
    let backend = db.read().await;
    let clipped: Vec<i64> = backend.clippings.iter().copied().collect();
    let results: Vec<i64> = backend
        .games
        .values()
        .filter_map(|game| game.recommended)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    Ok(Json(serde_json::json!({
        "nickname": backend.nickname,
        "percentile": 12.5,
        "userClass": "EXPLORER",
        "radarValues": [0.9, 0.4, 0.3, 0.7, 0.5, 0.6, 0.2],
        "recentClippings": backend.simples(&clipped),
        "recentResults": backend.simples(&results),
        "tags": [
            { "description": "fresh", "weight": 30 },
            { "description": "cozy", "weight": 45 },
        ],
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NicknameQuery {
    change_user_nickname: Option<String>,
}

async fn user_nickname(
    State(db): State<Db>,
    method: Method,
    headers: HeaderMap,
    Query(query): Query<NicknameQuery>,
) -> Reply<Value> {
    authorize(&headers)?;
    let mut backend = db.write().await;
    match (method, query.change_user_nickname) {
        (Method::GET, None) => {}
        (Method::PATCH, Some(nickname)) if !nickname.trim().is_empty() => {
            backend.nickname = nickname;
        }
        _ => return Err(StatusCode::BAD_REQUEST),
    }
    Ok(Json(serde_json::json!({ "nickname": backend.nickname })))
}

async fn user_unregister(State(db): State<Db>, headers: HeaderMap) -> Result<StatusCode, StatusCode> {
    authorize(&headers)?;
    *db.write().await = Backend::seeded();
    Ok(StatusCode::OK)
}

async fn clipping_do(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ShopQuery>,
) -> Reply<ClippingResponse> {
    authorize(&headers)?;
    let mut backend = db.write().await;
    backend.shop(query.shop_id)?;
    backend.clippings.insert(query.shop_id);
    Ok(Json(ClippingResponse {
        shop_id: query.shop_id,
        shop_clipping: true,
    }))
}

async fn clipping_undo(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ShopQuery>,
) -> Reply<ClippingResponse> {
    authorize(&headers)?;
    let mut backend = db.write().await;
    backend.shop(query.shop_id)?;
    backend.clippings.remove(&query.shop_id);
    Ok(Json(ClippingResponse {
        shop_id: query.shop_id,
        shop_clipping: false,
    }))
}
