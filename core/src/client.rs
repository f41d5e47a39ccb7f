//! Stateless request builder and response parser for the CherryPicker API.
//!
//! # Design
//! `CherryPickerClient` holds only the request factory (base URL and user
//! agent) and carries no mutable state between calls. Each operation is
//! split into building an `HttpRequest` and parsing an `HttpResponse`; the
//! caller (usually [`ApiService`](crate::service::ApiService)) executes the
//! round-trip in between, keeping this layer deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::{RequestFactory, AUTHORIZATION};
use crate::response::{decode, interpret, interpret_json};
use crate::types::{LoginCallback, LoginCallbackBody};

/// Builds requests and parses responses without doing any I/O.
///
/// The caller executes each built [`HttpRequest`](crate::http::HttpRequest)
/// however it likes and hands the response back to the matching `parse*`
/// method. Building the same operation twice yields identical requests.
#[derive(Debug, Clone)]
pub struct CherryPickerClient {
    factory: RequestFactory,
}

impl CherryPickerClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            factory: RequestFactory::new(config.base_url.clone())
                .with_user_agent(config.user_agent.clone()),
        }
    }

    pub fn factory(&self) -> &RequestFactory {
        &self.factory
    }

    /// Request for `endpoint`, authenticated when `bearer` is given.
    pub fn build(&self, endpoint: &Endpoint, bearer: Option<&str>) -> HttpRequest {
        self.factory.endpoint(endpoint, bearer)
    }

    /// Request for `endpoint` carrying `body` as JSON.
    pub fn build_with_body<B: Serialize + ?Sized>(
        &self,
        endpoint: &Endpoint,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        self.factory.endpoint_with_body(endpoint, bearer, body)
    }

    /// Parse the JSON result of `endpoint`.
    pub fn parse<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        response: &HttpResponse,
    ) -> Result<T, ApiError> {
        interpret_json(response, endpoint.bad_request_error())
    }

    /// Parse a response whose body carries nothing of interest.
    pub fn parse_empty(&self, endpoint: &Endpoint, response: &HttpResponse) -> Result<(), ApiError> {
        interpret(response, endpoint.bad_request_error()).map(|_| ())
    }

    /// Parse the login-callback response.
    ///
    /// A 200 without an `Authorization` header is an `InvalidResponse`,
    /// checked before the body is looked at.
    pub fn parse_login_callback(
        &self,
        endpoint: &Endpoint,
        response: &HttpResponse,
    ) -> Result<LoginCallback, ApiError> {
        let body = interpret(response, endpoint.bad_request_error())?;
        let token = response
            .header(AUTHORIZATION)
            .map(strip_bearer)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::InvalidResponse)?;
        let LoginCallbackBody { email } = decode(body)?;
        Ok(LoginCallback {
            token: token.to_string(),
            email,
        })
    }
}

fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    }
}
