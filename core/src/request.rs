//! Request factory.
//!
//! Turns a URL, a method, an optional bearer token and an optional JSON
//! payload into an immutable [`HttpRequest`]. Headers are only added for the
//! parts that are present.

use serde::Serialize;
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::{ApiError, EncodeError};
use crate::http::{HttpMethod, HttpRequest};

pub const CONTENT_TYPE: &str = "content-type";
pub const AUTHORIZATION: &str = "authorization";
pub const USER_AGENT: &str = "user-agent";
pub const JSON: &str = "application/json";

/// Builds requests against a fixed base URL.
#[derive(Debug, Clone)]
pub struct RequestFactory {
    base_url: Url,
    user_agent: Option<String>,
}

impl RequestFactory {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the request for `endpoint`, with its own method and no body.
    pub fn endpoint(&self, endpoint: &Endpoint, bearer: Option<&str>) -> HttpRequest {
        self.assemble(endpoint.url(&self.base_url), endpoint.method(), bearer, None)
    }

    /// Build the request for `endpoint` carrying `body` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EncodingError`] when `body` cannot be serialized;
    /// no request is produced in that case.
    pub fn endpoint_with_body<B: Serialize + ?Sized>(
        &self,
        endpoint: &Endpoint,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        self.build(endpoint.url(&self.base_url), endpoint.method(), bearer, Some(body))
    }

    /// Lowest-level builder: any URL, method, token and optional JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EncodingError`] when `body` cannot be serialized.
    pub fn build<B: Serialize + ?Sized>(
        &self,
        url: Url,
        method: HttpMethod,
        bearer: Option<&str>,
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError> {
        let body = body.map(encode_json).transpose()?;
        Ok(self.assemble(url, method, bearer, body))
    }

    fn assemble(
        &self,
        url: Url,
        method: HttpMethod,
        bearer: Option<&str>,
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push((CONTENT_TYPE.to_string(), JSON.to_string()));
        }
        if let Some(token) = bearer {
            headers.push((AUTHORIZATION.to_string(), format!("Bearer {token}")));
        }
        if let Some(agent) = &self.user_agent {
            headers.push((USER_AGENT.to_string(), agent.clone()));
        }
        HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        }
    }
}

fn encode_json<B: Serialize + ?Sized>(body: &B) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(body)?)
}
