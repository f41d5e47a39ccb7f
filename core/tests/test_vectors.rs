//! Verify request building and response parsing against the JSON vectors in
//! `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings, so field order in the
//! vector files does not matter.

use cherrypicker_core::{
    ApiError, ClippingResponse, Endpoint, GameCategory, GameResponse, HttpMethod, HttpResponse,
    LoginPlatform, Priority, RequestFactory, RetryPolicy, ShopCardResponse, SwipeDirection,
};
use serde_json::Value;
use url::Url;

const TOKEN: &str = "tok";

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn platform(v: &Value) -> LoginPlatform {
    serde_json::from_value(v["platform"].clone()).unwrap()
}

fn direction(v: &Value) -> SwipeDirection {
    match v["direction"].as_str().unwrap() {
        "left" => SwipeDirection::Left,
        "right" => SwipeDirection::Right,
        other => panic!("unknown direction: {other}"),
    }
}

fn int(v: &Value, key: &str) -> i64 {
    v[key].as_i64().unwrap()
}

fn endpoint(v: &Value) -> Endpoint {
    match v["kind"].as_str().unwrap() {
        "login" => Endpoint::Login { platform: platform(v) },
        "login_callback" => Endpoint::LoginCallback {
            platform: platform(v),
            code: v["code"].as_str().unwrap().to_string(),
        },
        "preference_check" => Endpoint::PreferenceCheck,
        "preference_start" => Endpoint::PreferenceStart,
        "preference_swipe" => Endpoint::PreferenceSwipe {
            direction: direction(v),
            shop_id: int(v, "shop_id"),
        },
        "game_start" => Endpoint::GameStart {
            mode: GameCategory::from(v["mode"].as_u64().unwrap() as u8),
        },
        "game_swipe" => Endpoint::GameSwipe {
            direction: direction(v),
            game_id: int(v, "game_id"),
            shop_id: int(v, "shop_id"),
        },
        "shop_card" => Endpoint::ShopCard { shop_id: int(v, "shop_id") },
        "shop_detail" => Endpoint::ShopDetail { shop_id: int(v, "shop_id") },
        "shop_results" => Endpoint::ShopResults { game_id: int(v, "game_id") },
        "shop_clippings" => Endpoint::ShopClippings,
        "user_analyze" => Endpoint::UserAnalyze,
        "user_nickname" => Endpoint::UserNickname {
            change: v["change"].as_str().map(str::to_string),
        },
        "user_unregister" => Endpoint::UserUnregister,
        "clipping_do" => Endpoint::ClippingDo { shop_id: int(v, "shop_id") },
        "clipping_undo" => Endpoint::ClippingUndo { shop_id: int(v, "shop_id") },
        other => panic!("unknown endpoint kind: {other}"),
    }
}

#[test]
fn endpoint_test_vectors() {
    let raw = include_str!("../../test-vectors/endpoints.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();
    let factory = RequestFactory::new(Url::parse(base_url).unwrap());

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = endpoint(&case["endpoint"]);
        let expected = &case["expected_request"];
        let auth = expected["auth"].as_bool().unwrap();

        assert_eq!(endpoint.requires_auth(), auth, "{name}: auth");
        let req = factory.endpoint(&endpoint, auth.then_some(TOKEN));
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(
            req.url,
            format!("{base_url}{}", expected["url"].as_str().unwrap()),
            "{name}: url"
        );
        assert!(req.body.is_none(), "{name}: body");

        let expected_headers: Vec<(String, String)> = if auth {
            vec![("authorization".to_string(), format!("Bearer {TOKEN}"))]
        } else {
            Vec::new()
        };
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        let priority = match case["priority"].as_str().unwrap() {
            "background" => Priority::Background,
            _ => Priority::UserInitiated,
        };
        assert_eq!(endpoint.priority(), priority, "{name}: priority");
        let retry = match case["retry"].as_str().unwrap() {
            "once" => RetryPolicy::Once,
            _ => RetryPolicy::Never,
        };
        assert_eq!(endpoint.retry_policy(), retry, "{name}: retry");

        // same inputs, byte-identical request
        assert_eq!(factory.endpoint(&endpoint, auth.then_some(TOKEN)), req, "{name}: determinism");
    }
}

#[test]
fn status_test_vectors() {
    let raw = include_str!("../../test-vectors/status.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let endpoint = Endpoint::ShopClippings;

    for case in vectors["cases"].as_array().unwrap() {
        let status = case["status"].as_u64().map(|s| s as u16);
        let response = HttpResponse {
            status,
            headers: Vec::new(),
            body: r#"{"shops":[]}"#.to_string(),
        };
        let result = cherrypicker_core::response::interpret(&response, endpoint.bad_request_error());
        let expected = match case["expected"].as_str().unwrap() {
            "ok" => Ok(r#"{"shops":[]}"#),
            "authentication_failure" => Err(ApiError::AuthenticationFailure),
            "server_error" => Err(ApiError::ServerError),
            "unknown" => Err(ApiError::Unknown(status)),
            "invalid_response" => Err(ApiError::InvalidResponse),
            other => panic!("unknown expectation: {other}"),
        };
        assert_eq!(result, expected, "status {status:?}");
    }
}

fn decode_as(record: &str, response: &HttpResponse) -> Result<Value, ApiError> {
    use cherrypicker_core::response::interpret_json;
    let bad_request = ApiError::AuthenticationFailure;
    match record {
        "game" => interpret_json::<GameResponse>(response, bad_request)
            .map(|r| serde_json::to_value(r).unwrap()),
        "shop_card" => interpret_json::<ShopCardResponse>(response, bad_request)
            .map(|r| serde_json::to_value(r).unwrap()),
        "clipping" => interpret_json::<ClippingResponse>(response, bad_request)
            .map(|r| serde_json::to_value(r).unwrap()),
        other => panic!("unknown record: {other}"),
    }
}

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response = HttpResponse::with_status(200, case["body"].to_string());
        let result = decode_as(case["record"].as_str().unwrap(), &response);

        match case.get("expected_error").and_then(Value::as_str) {
            Some("decoding_error") => {
                assert_eq!(result, Err(ApiError::DecodingError), "{name}");
            }
            Some(other) => panic!("unknown expected_error: {other}"),
            None => assert_eq!(result.unwrap(), case["expected"], "{name}"),
        }
    }
}
