//! Verify settlement and decoding against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each vector describes a simulated response and the expected outcome of
//! the call. Decoded results are compared as parsed JSON values.

mod common;

use common::{Reply, Script};
use http_service::{Error, HttpService, Payload, ServiceOptions};

const URL: &str = "http://service.test/vector";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_test_vectors() {
    let raw = include_str!("../../test-vectors/status.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let status_text = case["status_text"].as_str().unwrap();
        let body = case["body"].as_str().unwrap();

        let script = Script::new();
        script.reply(
            URL,
            Reply::Load {
                status,
                status_text: status_text.to_string(),
                text: body.to_string(),
            },
        );
        let service = HttpService::new(ServiceOptions::new().url(URL), script.connector());
        let result = service.get(None).await;

        match case["expected"].as_str().unwrap() {
            "resolve" => {
                let payload = result.unwrap();
                assert_eq!(payload.as_text(), Some(body), "{name}: resolved text");
                assert_eq!(*service.data().unwrap(), payload, "{name}: cache");
            }
            "reject" => {
                let err = result.unwrap_err();
                assert!(matches!(err, Error::Status(_)), "{name}: expected Status");
                let rejection = err.rejection().unwrap();
                assert_eq!(rejection.status, status, "{name}: status");
                assert_eq!(rejection.status_text, status_text, "{name}: status text");
                assert!(service.data().is_none(), "{name}: cache untouched");
            }
            other => panic!("{name}: unknown expectation: {other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn decode_test_vectors() {
    let raw = include_str!("../../test-vectors/decode.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response_type = case["type"].as_str().unwrap();
        let body = case["body"].as_str().unwrap();

        let script = Script::new();
        script.reply(URL, Reply::ok(body));
        let service = HttpService::new(
            ServiceOptions::new().url(URL).response_type(response_type),
            script.connector(),
        );

        let result = match case["verb"].as_str().unwrap() {
            "GET" => service.get(None).await,
            "POST" => service.post(None, None).await,
            "PUT" => service.put(None, None).await,
            "DELETE" => service.delete(None).await,
            other => panic!("{name}: unknown verb: {other}"),
        };

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Decode" => assert!(matches!(err, Error::Decode(_)), "{name}: expected Decode"),
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else if let Some(expected) = case.get("expected_json") {
            let payload = result.unwrap();
            assert_eq!(payload, Payload::Json(expected.clone()), "{name}: decoded value");
        } else {
            let payload = result.unwrap();
            let expected = case["expected_text"].as_str().unwrap();
            assert_eq!(payload.as_text(), Some(expected), "{name}: raw text");
        }
    }
}
