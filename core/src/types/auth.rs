//! Login records.
//!
//! # Design
//! The callback token arrives in a response header, not the body, so
//! `LoginCallback` is assembled by the client rather than decoded directly,
//! and its `Debug` output never shows the token.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Social login providers supported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginPlatform {
    Apple,
    Kakao,
    Google,
}

impl LoginPlatform {
    /// Path segment used under `/api/v1/auth/`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginPlatform::Apple => "apple",
            LoginPlatform::Kakao => "kakao",
            LoginPlatform::Google => "google",
        }
    }
}

impl fmt::Display for LoginPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where to send the user to authenticate with `platform`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub platform: LoginPlatform,
    pub redirect_url: String,
}

/// Result of a completed login: the bearer token from the `Authorization`
/// response header and the email from the body.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCallback {
    pub token: String,
    pub email: String,
}

impl fmt::Debug for LoginCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCallback")
            .field("token", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

/// Body half of the login-callback response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginCallbackBody {
    pub(crate) email: String,
}
