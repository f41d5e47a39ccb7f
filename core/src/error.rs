//! Error taxonomy for the CherryPicker API client.
//!
//! # Design
//! `ApiError` is the closed set of failures every operation resolves to. Its
//! `Display` output is the user-facing message, so the presentation layer
//! never has to match on variants to show something sensible. Lower-level
//! failures (JSON, transport, I/O) have their own types and are folded into
//! `ApiError` through `From` impls or the catch-all [`ApiError::convert`].

use std::error::Error as StdError;
use std::fmt;
use std::io;

use thiserror::Error;

/// Sub-classification of transport failures, used to pick a more specific
/// user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    HostUnreachable,
    ConnectionRefused,
    ConnectionLost,
    TimedOut,
    Cancelled,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            TransportErrorKind::HostUnreachable => {
                "Cannot reach the server. Check your network connection."
            }
            TransportErrorKind::ConnectionRefused => {
                "The server refused the connection. Please try again later."
            }
            TransportErrorKind::ConnectionLost => "The network connection was lost. Please try again.",
            TransportErrorKind::TimedOut => "The request timed out. Please try again.",
            TransportErrorKind::Cancelled => "The request was cancelled.",
            TransportErrorKind::Other => "A network error occurred. Please try again.",
        };
        f.write_str(message)
    }
}

/// Errors surfaced by every operation of the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// HTTP 400, or an authenticated call made without stored credentials.
    #[error("Authentication failed. Please sign in again.")]
    AuthenticationFailure,

    /// No HTTP status, or a response missing something the operation needs.
    #[error("The server returned an invalid response.")]
    InvalidResponse,

    #[error("Could not read the data sent by the server.")]
    DecodingError,

    #[error("Could not prepare the request data.")]
    EncodingError,

    #[error("{0}")]
    Transport(TransportErrorKind),

    /// HTTP 500.
    #[error("An internal server error occurred.")]
    ServerError,

    /// Any other status code, or a failure nothing else recognises.
    #[error("{}", unknown_message(.0))]
    Unknown(Option<u16>),
}

fn unknown_message(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("An unknown error occurred (status {code})."),
        None => "An unknown error occurred.".to_string(),
    }
}

impl ApiError {
    /// The stable user-facing message for this error.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Classify an arbitrary error into the closed `ApiError` set.
    ///
    /// Walks the `source()` chain and returns the first recognised failure
    /// family; anything unrecognised becomes `Unknown(None)`.
    ///
    /// `serde_json` uses one error type for both directions, so a bare
    /// `serde_json::Error` is always classified as `DecodingError`. Wrap
    /// serialization failures in [`EncodeError`] to get `EncodingError`.
    pub fn convert(error: &(dyn StdError + 'static)) -> ApiError {
        let mut current = Some(error);
        while let Some(error) = current {
            if let Some(converted) = classify(error) {
                return converted;
            }
            current = error.source();
        }
        ApiError::Unknown(None)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

fn classify(error: &(dyn StdError + 'static)) -> Option<ApiError> {
    if let Some(api) = error.downcast_ref::<ApiError>() {
        return Some(api.clone());
    }
    if error.is::<EncodeError>() {
        return Some(ApiError::EncodingError);
    }
    if error.is::<DecodeError>() || error.is::<serde_json::Error>() {
        return Some(ApiError::DecodingError);
    }
    if let Some(transport) = error.downcast_ref::<TransportError>() {
        return Some(ApiError::Transport(transport.kind));
    }
    if let Some(ureq) = error.downcast_ref::<ureq::Error>() {
        return Some(ApiError::Transport(classify_ureq(ureq)));
    }
    if let Some(io) = error.downcast_ref::<io::Error>() {
        return Some(ApiError::Transport(classify_io(io)));
    }
    None
}

/// A request body that could not be serialized.
#[derive(Debug, Error)]
#[error("failed to encode request body: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// A response body that could not be deserialized into the expected record.
#[derive(Debug, Error)]
#[error("failed to decode response body: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

impl From<EncodeError> for ApiError {
    fn from(_: EncodeError) -> Self {
        ApiError::EncodingError
    }
}

impl From<DecodeError> for ApiError {
    fn from(_: DecodeError) -> Self {
        ApiError::DecodingError
    }
}

/// A failure below HTTP: the request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failure ({kind:?}): {detail}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub detail: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(TransportErrorKind::Cancelled, "operation cancelled")
    }
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        ApiError::Transport(error.kind)
    }
}

impl From<ureq::Error> for TransportError {
    fn from(error: ureq::Error) -> Self {
        TransportError::new(classify_ureq(&error), error.to_string())
    }
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        TransportError::new(classify_io(&error), error.to_string())
    }
}

fn classify_ureq(error: &ureq::Error) -> TransportErrorKind {
    match error {
        ureq::Error::Timeout(_) => TransportErrorKind::TimedOut,
        ureq::Error::HostNotFound => TransportErrorKind::HostUnreachable,
        ureq::Error::ConnectionFailed => TransportErrorKind::ConnectionRefused,
        ureq::Error::Io(io) => classify_io(io),
        _ => TransportErrorKind::Other,
    }
}

fn classify_io(error: &io::Error) -> TransportErrorKind {
    match error.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportErrorKind::TimedOut,
        io::ErrorKind::ConnectionRefused => TransportErrorKind::ConnectionRefused,
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::UnexpectedEof => TransportErrorKind::ConnectionLost,
        io::ErrorKind::AddrNotAvailable => TransportErrorKind::HostUnreachable,
        _ => TransportErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApiError::AuthenticationFailure, "Authentication failed. Please sign in again.")]
    #[case(ApiError::InvalidResponse, "The server returned an invalid response.")]
    #[case(ApiError::DecodingError, "Could not read the data sent by the server.")]
    #[case(ApiError::EncodingError, "Could not prepare the request data.")]
    #[case(ApiError::ServerError, "An internal server error occurred.")]
    #[case(ApiError::Unknown(Some(404)), "An unknown error occurred (status 404).")]
    #[case(ApiError::Unknown(None), "An unknown error occurred.")]
    #[case(
        ApiError::Transport(TransportErrorKind::TimedOut),
        "The request timed out. Please try again."
    )]
    #[case(
        ApiError::Transport(TransportErrorKind::HostUnreachable),
        "Cannot reach the server. Check your network connection."
    )]
    #[case(
        ApiError::Transport(TransportErrorKind::ConnectionLost),
        "The network connection was lost. Please try again."
    )]
    #[case(ApiError::Transport(TransportErrorKind::Cancelled), "The request was cancelled.")]
    fn every_variant_has_a_stable_message(#[case] error: ApiError, #[case] expected: &str) {
        assert_eq!(error.message(), expected);
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn transport_kinds_have_distinct_messages() {
        let kinds = [
            TransportErrorKind::HostUnreachable,
            TransportErrorKind::ConnectionRefused,
            TransportErrorKind::ConnectionLost,
            TransportErrorKind::TimedOut,
            TransportErrorKind::Cancelled,
            TransportErrorKind::Other,
        ];
        let messages: std::collections::HashSet<String> =
            kinds.iter().map(|k| k.to_string()).collect();
        assert_eq!(messages.len(), kinds.len());
    }

    #[test]
    fn convert_returns_api_errors_unchanged() {
        let error = ApiError::Unknown(Some(503));
        assert_eq!(ApiError::convert(&error), ApiError::Unknown(Some(503)));
    }

    #[test]
    fn convert_classifies_decode_failures() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert_eq!(ApiError::convert(&json_err), ApiError::DecodingError);

        let json_err = serde_json::from_str::<u32>("{").unwrap_err();
        assert_eq!(ApiError::convert(&DecodeError(json_err)), ApiError::DecodingError);
    }

    #[test]
    fn convert_classifies_encode_failures() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], 1u8);
        let json_err = serde_json::to_string(&map).unwrap_err();
        assert_eq!(ApiError::convert(&EncodeError(json_err)), ApiError::EncodingError);

        // unwrapped, the same failure reads as decoding
        let json_err = serde_json::to_string(&map).unwrap_err();
        assert_eq!(ApiError::convert(&json_err), ApiError::DecodingError);
    }

    #[test]
    fn convert_classifies_io_failures() {
        let io_err = io::Error::new(io::ErrorKind::TimedOut, "slow");
        assert_eq!(
            ApiError::convert(&io_err),
            ApiError::Transport(TransportErrorKind::TimedOut)
        );
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert_eq!(
            ApiError::convert(&io_err),
            ApiError::Transport(TransportErrorKind::ConnectionLost)
        );
    }

    #[test]
    fn convert_classifies_transport_errors() {
        let err = TransportError::new(TransportErrorKind::ConnectionRefused, "refused");
        assert_eq!(
            ApiError::convert(&err),
            ApiError::Transport(TransportErrorKind::ConnectionRefused)
        );
        let err = ureq::Error::HostNotFound;
        assert_eq!(
            ApiError::convert(&err),
            ApiError::Transport(TransportErrorKind::HostUnreachable)
        );
    }

    #[derive(Debug, Error)]
    #[error("wrapper")]
    struct Wrapper(#[source] io::Error);

    #[derive(Debug, Error)]
    #[error("unrelated")]
    struct Unrelated;

    #[test]
    fn convert_follows_the_source_chain() {
        let err = Wrapper(io::Error::new(io::ErrorKind::ConnectionRefused, "no"));
        assert_eq!(
            ApiError::convert(&err),
            ApiError::Transport(TransportErrorKind::ConnectionRefused)
        );
    }

    #[test]
    fn convert_falls_back_to_unknown() {
        assert_eq!(ApiError::convert(&Unrelated), ApiError::Unknown(None));
        let fmt_err = fmt::Error;
        assert_eq!(ApiError::convert(&fmt_err), ApiError::Unknown(None));
    }
}
