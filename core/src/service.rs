//! The operation catalog.
//!
//! # Design
//! `ApiService` composes the stateless [`CherryPickerClient`] with a
//! [`Transport`] and the shared [`CredentialStore`]. Every public method is
//! one backend operation: pick the endpoint, attach the stored token when the
//! endpoint needs one, execute (retrying once on transport failure for the
//! login operations), interpret and decode. Methods block; `dispatch` runs them
//! through a [`Session`] at the endpoint's own priority for one-shot async
//! delivery.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::client::CherryPickerClient;
use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, Credentials};
use crate::endpoint::{Endpoint, SwipeDirection};
use crate::error::{ApiError, TransportErrorKind};
use crate::http::{HttpRequest, HttpResponse};
use crate::session::{CancelToken, Failure, Session};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    ClippingResponse, GameCategory, GameResponse, LoginCallback, LoginPlatform, LoginResponse,
    ShopCardResponse, ShopDetailResponse, SimpleShopResponse, UserAnalyzeResponse,
    UserNicknameResponse, UserPreferenceCheckResponse, UserPreferenceResponse,
    UserPreferenceStartResponse,
};

/// Runs backend operations over a [`Transport`] with the stored credentials.
///
/// Every operation resolves to exactly one typed value or one [`ApiError`].
/// Authenticated endpoints read the token from the [`CredentialStore`] at call
/// time; the login callback writes it and `delete_user` and `logout` clear it.
/// Wrap the service in an `Arc` to use the `dispatch*` helpers.
pub struct ApiService<T> {
    client: CherryPickerClient,
    transport: T,
    credentials: Arc<CredentialStore>,
}

impl ApiService<UreqTransport> {
    /// Service over the blocking ureq transport configured from `config`.
    pub fn with_ureq(config: &ClientConfig, credentials: Arc<CredentialStore>) -> Self {
        Self::new(config, UreqTransport::new(config.timeout), credentials)
    }
}

impl<T: Transport> ApiService<T> {
    pub fn new(config: &ClientConfig, transport: T, credentials: Arc<CredentialStore>) -> Self {
        Self {
            client: CherryPickerClient::new(config),
            transport,
            credentials,
        }
    }

    pub fn client(&self) -> &CherryPickerClient {
        &self.client
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn fetch_login_response(
        &self,
        platform: LoginPlatform,
        cancel: &CancelToken,
    ) -> Result<LoginResponse, ApiError> {
        self.perform(Endpoint::Login { platform }, cancel)
    }

    /// Complete a login and store the returned credentials.
    #[instrument(level = "debug", skip(self, code, cancel), fields(endpoint = "login_callback"))]
    pub fn fetch_login_callback(
        &self,
        platform: LoginPlatform,
        code: &str,
        cancel: &CancelToken,
    ) -> Result<LoginCallback, ApiError> {
        let endpoint = Endpoint::LoginCallback {
            platform,
            code: code.to_string(),
        };
        let request = self.request(&endpoint)?;
        let response = self.send(&endpoint, &request, cancel)?;
        let callback = self.client.parse_login_callback(&endpoint, &response)?;
        // the login itself succeeded; a keychain failure is only logged
        let _ = self.credentials.write(Credentials::from(callback.clone()));
        debug!(email = %callback.email, "signed in");
        Ok(callback)
    }

    /// Forget the stored credentials.
    pub fn logout(&self) {
        let _ = self.credentials.clear();
    }

    pub fn check_user_preference(
        &self,
        cancel: &CancelToken,
    ) -> Result<UserPreferenceCheckResponse, ApiError> {
        self.perform(Endpoint::PreferenceCheck, cancel)
    }

    pub fn start_user_preference(
        &self,
        cancel: &CancelToken,
    ) -> Result<UserPreferenceStartResponse, ApiError> {
        self.perform(Endpoint::PreferenceStart, cancel)
    }

    pub fn swipe_user_preference(
        &self,
        direction: SwipeDirection,
        shop_id: i64,
        cancel: &CancelToken,
    ) -> Result<UserPreferenceResponse, ApiError> {
        self.perform(Endpoint::PreferenceSwipe { direction, shop_id }, cancel)
    }

    pub fn swipe_user_preference_left(
        &self,
        shop_id: i64,
        cancel: &CancelToken,
    ) -> Result<UserPreferenceResponse, ApiError> {
        self.swipe_user_preference(SwipeDirection::Left, shop_id, cancel)
    }

    pub fn swipe_user_preference_right(
        &self,
        shop_id: i64,
        cancel: &CancelToken,
    ) -> Result<UserPreferenceResponse, ApiError> {
        self.swipe_user_preference(SwipeDirection::Right, shop_id, cancel)
    }

    pub fn start_game(
        &self,
        mode: GameCategory,
        cancel: &CancelToken,
    ) -> Result<GameResponse, ApiError> {
        self.perform(Endpoint::GameStart { mode }, cancel)
    }

    pub fn swipe_game(
        &self,
        direction: SwipeDirection,
        game_id: i64,
        shop_id: i64,
        cancel: &CancelToken,
    ) -> Result<GameResponse, ApiError> {
        self.perform(
            Endpoint::GameSwipe {
                direction,
                game_id,
                shop_id,
            },
            cancel,
        )
    }

    pub fn swipe_game_left(
        &self,
        game_id: i64,
        shop_id: i64,
        cancel: &CancelToken,
    ) -> Result<GameResponse, ApiError> {
        self.swipe_game(SwipeDirection::Left, game_id, shop_id, cancel)
    }

    pub fn swipe_game_right(
        &self,
        game_id: i64,
        shop_id: i64,
        cancel: &CancelToken,
    ) -> Result<GameResponse, ApiError> {
        self.swipe_game(SwipeDirection::Right, game_id, shop_id, cancel)
    }

    pub fn fetch_shop_card(
        &self,
        shop_id: i64,
        cancel: &CancelToken,
    ) -> Result<ShopCardResponse, ApiError> {
        self.perform(Endpoint::ShopCard { shop_id }, cancel)
    }

    pub fn fetch_shop_detail(
        &self,
        shop_id: i64,
        cancel: &CancelToken,
    ) -> Result<ShopDetailResponse, ApiError> {
        self.perform(Endpoint::ShopDetail { shop_id }, cancel)
    }

    /// Shops recommended by a finished game.
    pub fn fetch_result_shops(
        &self,
        game_id: i64,
        cancel: &CancelToken,
    ) -> Result<SimpleShopResponse, ApiError> {
        self.perform(Endpoint::ShopResults { game_id }, cancel)
    }

    pub fn fetch_clipped_shops(&self, cancel: &CancelToken) -> Result<SimpleShopResponse, ApiError> {
        self.perform(Endpoint::ShopClippings, cancel)
    }

    pub fn fetch_user_analyze(&self, cancel: &CancelToken) -> Result<UserAnalyzeResponse, ApiError> {
        self.perform(Endpoint::UserAnalyze, cancel)
    }

    /// Read the nickname, or rename the user when `change` is given.
    pub fn fetch_or_change_user_nickname(
        &self,
        change: Option<String>,
        cancel: &CancelToken,
    ) -> Result<UserNicknameResponse, ApiError> {
        self.perform(Endpoint::UserNickname { change }, cancel)
    }

    /// Delete the account and forget the stored credentials.
    #[instrument(level = "debug", skip(self, cancel), fields(endpoint = "user_unregister"))]
    pub fn delete_user(&self, cancel: &CancelToken) -> Result<(), ApiError> {
        let endpoint = Endpoint::UserUnregister;
        let request = self.request(&endpoint)?;
        let response = self.send(&endpoint, &request, cancel)?;
        self.client.parse_empty(&endpoint, &response)?;
        self.logout();
        Ok(())
    }

    pub fn clipping_do(
        &self,
        shop_id: i64,
        cancel: &CancelToken,
    ) -> Result<ClippingResponse, ApiError> {
        self.perform(Endpoint::ClippingDo { shop_id }, cancel)
    }

    pub fn clipping_undo(
        &self,
        shop_id: i64,
        cancel: &CancelToken,
    ) -> Result<ClippingResponse, ApiError> {
        self.perform(Endpoint::ClippingUndo { shop_id }, cancel)
    }

    /// Run `endpoint` with `body` sent as JSON instead of relying on query
    /// items alone.
    #[instrument(level = "debug", skip_all, fields(endpoint = endpoint.name()))]
    pub fn perform_with_body<B, R>(
        &self,
        endpoint: Endpoint,
        body: &B,
        cancel: &CancelToken,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let bearer = self.bearer(&endpoint)?;
        let request = self
            .client
            .build_with_body(&endpoint, bearer.as_deref(), body)?;
        let response = self.send(&endpoint, &request, cancel)?;
        self.client.parse(&endpoint, &response)
    }

    #[instrument(level = "debug", skip_all, fields(endpoint = endpoint.name()))]
    fn perform<R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        cancel: &CancelToken,
    ) -> Result<R, ApiError> {
        let request = self.request(&endpoint)?;
        let response = self.send(&endpoint, &request, cancel)?;
        self.client.parse(&endpoint, &response)
    }

    fn request(&self, endpoint: &Endpoint) -> Result<HttpRequest, ApiError> {
        let bearer = self.bearer(endpoint)?;
        Ok(self.client.build(endpoint, bearer.as_deref()))
    }

    /// The stored token when `endpoint` needs one.
    fn bearer(&self, endpoint: &Endpoint) -> Result<Option<String>, ApiError> {
        if !endpoint.requires_auth() {
            return Ok(None);
        }
        match self.credentials.token() {
            Some(token) => Ok(Some(token)),
            None => {
                debug!("no stored credentials for an authenticated call");
                Err(ApiError::AuthenticationFailure)
            }
        }
    }

    fn send(
        &self,
        endpoint: &Endpoint,
        request: &HttpRequest,
        cancel: &CancelToken,
    ) -> Result<HttpResponse, ApiError> {
        let attempts = 1 + endpoint.retry_policy().extra_attempts();
        let mut attempt = 1;
        loop {
            match self.transport.execute(request, cancel) {
                Ok(response) => return Ok(response),
                Err(error)
                    if attempt < attempts && error.kind != TransportErrorKind::Cancelled =>
                {
                    warn!(%error, attempt, "transport failure, retrying");
                    attempt += 1;
                }
                Err(error) => {
                    warn!(%error, attempt, "transport failure");
                    return Err(error.into());
                }
            }
        }
    }
}

impl<T: Transport + 'static> ApiService<T> {
    /// Run `endpoint` on `session` at the endpoint's own priority and deliver
    /// its decoded JSON result to `on_complete`.
    ///
    /// For the login callback and account deletion, which also update the
    /// stored credentials, use [`dispatch_login_callback`](Self::dispatch_login_callback)
    /// and [`dispatch_delete_user`](Self::dispatch_delete_user).
    pub fn dispatch<R, C>(
        self: &Arc<Self>,
        session: &Session,
        endpoint: Endpoint,
        on_complete: C,
    ) -> CancelToken
    where
        R: DeserializeOwned + Send + 'static,
        C: Fn(Result<R, Failure>) + Send + Sync + 'static,
    {
        let service = Arc::clone(self);
        let priority = endpoint.priority();
        session.submit(
            priority,
            move |cancel| service.perform(endpoint.clone(), cancel),
            on_complete,
        )
    }

    pub fn dispatch_login_callback<C>(
        self: &Arc<Self>,
        session: &Session,
        platform: LoginPlatform,
        code: String,
        on_complete: C,
    ) -> CancelToken
    where
        C: Fn(Result<LoginCallback, Failure>) + Send + Sync + 'static,
    {
        let service = Arc::clone(self);
        let priority = Endpoint::LoginCallback {
            platform,
            code: code.clone(),
        }
        .priority();
        session.submit(
            priority,
            move |cancel| service.fetch_login_callback(platform, &code, cancel),
            on_complete,
        )
    }

    pub fn dispatch_delete_user<C>(self: &Arc<Self>, session: &Session, on_complete: C) -> CancelToken
    where
        C: Fn(Result<(), Failure>) + Send + Sync + 'static,
    {
        let service = Arc::clone(self);
        session.submit(
            Endpoint::UserUnregister.priority(),
            move |cancel| service.delete_user(cancel),
            on_complete,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::error::TransportError;
    use crate::http::HttpMethod;

    /// Replays canned results and records every request it was given.
    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::default(),
            })
        }

        fn seen(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Transport for Scripted {
        fn execute(
            &self,
            request: &HttpRequest,
            cancel: &CancelToken,
        ) -> Result<HttpResponse, TransportError> {
            if cancel.is_cancelled() {
                return Err(TransportError::cancelled());
            }
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }
    }

    fn signed_in() -> Arc<CredentialStore> {
        let store = CredentialStore::in_memory();
        store
            .write(Credentials {
                token: "tok".to_string(),
                email: "cherry@example.com".to_string(),
            })
            .unwrap();
        Arc::new(store)
    }

    fn service(transport: Arc<Scripted>, credentials: Arc<CredentialStore>) -> ApiService<Arc<Scripted>> {
        let config = ClientConfig::new("http://localhost:3000").unwrap();
        ApiService::new(&config, transport, credentials)
    }

    fn timeout() -> Result<HttpResponse, TransportError> {
        Err(TransportError::new(TransportErrorKind::TimedOut, "timed out"))
    }

    #[test]
    fn authenticated_call_without_credentials_never_hits_the_network() {
        let transport = Scripted::new(Vec::new());
        let service = service(transport.clone(), Arc::new(CredentialStore::in_memory()));
        let err = service
            .fetch_shop_detail(1, &CancelToken::new())
            .unwrap_err();
        assert_eq!(err, ApiError::AuthenticationFailure);
        assert!(transport.seen().is_empty());
    }

    #[test]
    fn login_retries_once_after_transport_failure() {
        let transport = Scripted::new(vec![
            timeout(),
            Ok(HttpResponse::with_status(
                200,
                r#"{"platform":"google","redirectUrl":"https://accounts.example"}"#,
            )),
        ]);
        let service = service(transport.clone(), Arc::new(CredentialStore::in_memory()));
        let login = service
            .fetch_login_response(LoginPlatform::Google, &CancelToken::new())
            .unwrap();
        assert_eq!(login.platform, LoginPlatform::Google);
        assert_eq!(transport.seen().len(), 2);
    }

    #[test]
    fn other_operations_do_not_retry() {
        let transport = Scripted::new(vec![timeout()]);
        let service = service(transport.clone(), signed_in());
        let err = service.fetch_user_analyze(&CancelToken::new()).unwrap_err();
        assert_eq!(err, ApiError::Transport(TransportErrorKind::TimedOut));
        assert_eq!(transport.seen().len(), 1);
    }

    #[test]
    fn cancelled_login_is_not_retried() {
        let transport = Scripted::new(Vec::new());
        let service = service(transport.clone(), Arc::new(CredentialStore::in_memory()));
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = service
            .fetch_login_response(LoginPlatform::Apple, &cancel)
            .unwrap_err();
        assert_eq!(err, ApiError::Transport(TransportErrorKind::Cancelled));
        assert!(transport.seen().is_empty());
    }

    #[test]
    fn login_callback_stores_credentials() {
        let transport = Scripted::new(vec![Ok(HttpResponse {
            status: Some(200),
            headers: vec![("authorization".to_string(), "Bearer fresh".to_string())],
            body: r#"{"email":"new@example.com"}"#.to_string(),
        })]);
        let credentials = Arc::new(CredentialStore::in_memory());
        let service = service(transport.clone(), credentials.clone());
        service
            .fetch_login_callback(LoginPlatform::Kakao, "code-1", &CancelToken::new())
            .unwrap();
        let stored = credentials.read().unwrap();
        assert_eq!(stored.token, "fresh");
        assert_eq!(stored.email, "new@example.com");
        assert!(transport.seen()[0].header("authorization").is_none());
    }

    #[test]
    fn delete_user_clears_credentials() {
        let transport = Scripted::new(vec![Ok(HttpResponse::with_status(200, ""))]);
        let credentials = signed_in();
        let service = service(transport.clone(), credentials.clone());
        service.delete_user(&CancelToken::new()).unwrap();
        assert!(!credentials.is_signed_in());
        let seen = transport.seen();
        assert_eq!(seen[0].method, HttpMethod::Delete);
        assert_eq!(seen[0].header("authorization"), Some("Bearer tok"));
    }

    #[test]
    fn failed_delete_keeps_credentials() {
        let transport = Scripted::new(vec![Ok(HttpResponse::with_status(500, ""))]);
        let credentials = signed_in();
        let service = service(transport, credentials.clone());
        assert_eq!(
            service.delete_user(&CancelToken::new()).unwrap_err(),
            ApiError::ServerError
        );
        assert!(credentials.is_signed_in());
    }

    #[test]
    fn perform_with_body_sends_json() {
        let transport = Scripted::new(vec![Ok(HttpResponse::with_status(
            200,
            r#"{"gameId":1,"totalRound":3,"curRound":1,"gameStatus":0}"#,
        ))]);
        let service = service(transport.clone(), signed_in());
        let body = crate::types::GameStartRequest {
            game_mode: GameCategory::Cafe,
        };
        let game: GameResponse = service
            .perform_with_body(
                Endpoint::GameStart {
                    mode: GameCategory::Cafe,
                },
                &body,
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(game.total_round, 3);
        let seen = transport.seen();
        assert_eq!(seen[0].body.as_deref(), Some(r#"{"gameMode":6}"#));
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
    }
}
