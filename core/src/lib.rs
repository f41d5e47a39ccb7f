//! Typed API client core for the CherryPicker backend.
//!
//! # Overview
//! Builds `HttpRequest` values and interprets `HttpResponse` values for every
//! backend operation (login, the preference and cherry-pick games, shop
//! browsing, clipping and the user profile), and composes them with a
//! pluggable transport, the stored credentials and one-shot dispatch.
//!
//! # Design
//! - `Endpoint` is the single source of per-operation facts: URL, method,
//!   auth, priority, retry policy and the error an HTTP 400 becomes.
//! - `CherryPickerClient` is stateless: `build*` produces a request,
//!   `parse*` consumes a response, no I/O in between (host-does-IO).
//! - `ApiService` runs operations over a `Transport` and resolves each one
//!   to exactly one typed success or one `ApiError`.
//! - `Session` dispatches operations onto tokio workers with joint
//!   cancellation and a retry thunk on failure.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod game_session;
pub mod http;
pub mod request;
pub mod response;
pub mod service;
pub mod session;
pub mod transport;
pub mod types;

pub use client::CherryPickerClient;
pub use config::{ClientConfig, ConfigError};
pub use credentials::{CredentialStore, CredentialVault, Credentials, MemoryVault, VaultError};
pub use endpoint::{Endpoint, RetryPolicy, SwipeDirection};
pub use error::{ApiError, TransportError, TransportErrorKind};
pub use game_session::{GamePhase, GameSession, GameSessionError, RoundUpdate};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::RequestFactory;
pub use service::ApiService;
pub use session::{CancelToken, Dispatcher, Failure, Priority, Retry, Session};
pub use transport::{Transport, UreqTransport};
pub use types::*;
