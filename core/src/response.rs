//! Response interpreter.
//!
//! Status interpretation is shared by every operation:
//!
//! | status | result |
//! |---|---|
//! | none | `InvalidResponse` |
//! | 200 | body |
//! | 400 | the operation's bad-request error |
//! | 500 | `ServerError` |
//! | other | `Unknown(status)` |
//!
//! Decoding only ever happens after a 200.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, DecodeError};
use crate::http::HttpResponse;

/// Validate the status of `response` and hand back its body.
pub fn interpret(response: &HttpResponse, on_bad_request: ApiError) -> Result<&str, ApiError> {
    match response.status {
        None => Err(ApiError::InvalidResponse),
        Some(200) => Ok(response.body.as_str()),
        Some(400) => Err(on_bad_request),
        Some(500) => Err(ApiError::ServerError),
        Some(status) => Err(ApiError::Unknown(Some(status))),
    }
}

/// Decode a JSON body into `T`. The decoder diagnostic is logged, not kept.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    decode_json(body).map_err(|error| {
        debug!(%error, "response body did not match the expected record");
        ApiError::from(error)
    })
}

/// Interpret then decode: the common path for operations with a JSON result.
pub fn interpret_json<T: DeserializeOwned>(
    response: &HttpResponse,
    on_bad_request: ApiError,
) -> Result<T, ApiError> {
    let body = interpret(response, on_bad_request)?;
    decode(body)
}

fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, DecodeError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::types::GameResponse;

    #[rstest]
    #[case(Some(400), ApiError::AuthenticationFailure)]
    #[case(Some(500), ApiError::ServerError)]
    #[case(Some(403), ApiError::Unknown(Some(403)))]
    #[case(Some(404), ApiError::Unknown(Some(404)))]
    #[case(Some(503), ApiError::Unknown(Some(503)))]
    #[case(Some(201), ApiError::Unknown(Some(201)))]
    #[case(None, ApiError::InvalidResponse)]
    fn non_200_statuses_map_to_errors(#[case] status: Option<u16>, #[case] expected: ApiError) {
        let response = HttpResponse {
            status,
            headers: Vec::new(),
            body: "{}".to_string(),
        };
        assert_eq!(
            interpret(&response, ApiError::AuthenticationFailure).unwrap_err(),
            expected
        );
    }

    #[test]
    fn bad_request_uses_the_supplied_error() {
        let response = HttpResponse::with_status(400, "");
        assert_eq!(
            interpret(&response, ApiError::InvalidResponse).unwrap_err(),
            ApiError::InvalidResponse
        );
    }

    #[test]
    fn ok_returns_the_body() {
        let response = HttpResponse::with_status(200, "hello");
        assert_eq!(interpret(&response, ApiError::AuthenticationFailure), Ok("hello"));
    }

    #[test]
    fn decode_failure_is_generic() {
        let response = HttpResponse::with_status(200, r#"{"gameId":"seven"}"#);
        let err = interpret_json::<GameResponse>(&response, ApiError::AuthenticationFailure)
            .unwrap_err();
        assert_eq!(err, ApiError::DecodingError);
    }

    #[test]
    fn error_status_skips_decoding() {
        let response = HttpResponse::with_status(500, "not json at all");
        let err = interpret_json::<GameResponse>(&response, ApiError::AuthenticationFailure)
            .unwrap_err();
        assert_eq!(err, ApiError::ServerError);
    }
}
