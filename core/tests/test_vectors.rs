//! Verify casing, classification and request shaping against the JSON test
//! vectors stored in `test-vectors/`.
//!
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

use courier_core::classify::{self, StatusClass};
use courier_core::logging::status_target;
use courier_core::{
    convert_key, transform_keys, ClientConfig, HttpMethod, HttpResponse, KeyCase, RedirectPolicy,
    RequestOptions,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn load(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

// ---------------------------------------------------------------------------
// Casing
// ---------------------------------------------------------------------------

#[test]
fn casing_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/casing.json"));

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = case["input"].as_str().unwrap();
        for (case_name, expected) in case["expected"].as_object().unwrap() {
            let key_case: KeyCase = case_name.parse().unwrap();
            assert_eq!(
                convert_key(input, key_case),
                expected.as_str().unwrap(),
                "{name}: {case_name}"
            );
        }
    }

    for doc in vectors["documents"].as_array().unwrap() {
        let name = doc["name"].as_str().unwrap();
        let key_case: KeyCase = doc["case"].as_str().unwrap().parse().unwrap();
        let out = transform_keys(doc["input"].clone(), key_case);
        assert_eq!(out, doc["expected"], "{name}");
    }
}

// ---------------------------------------------------------------------------
// Status classification and log channels
// ---------------------------------------------------------------------------

#[test]
fn status_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/status.json"));

    for case in vectors["cases"].as_array().unwrap() {
        let status = case["status"].as_u64().unwrap() as u16;
        let policy = if case["follow"].as_bool().unwrap() {
            RedirectPolicy::Follow(10)
        } else {
            RedirectPolicy::Manual
        };

        assert_eq!(
            StatusClass::of(status).label(),
            case["class"].as_str().unwrap(),
            "{status}: class"
        );
        assert_eq!(
            status_target(status),
            case["target"].as_str().unwrap(),
            "{status}: target"
        );

        let response = HttpResponse {
            status,
            headers: Vec::new(),
            body: b"payload".to_vec(),
        };
        let result = classify::check(response, policy);
        if case["accepted"].as_bool().unwrap() {
            assert_eq!(result.unwrap().status, status, "{status}: accepted");
        } else {
            let err = result.unwrap_err();
            assert_eq!(err.status(), Some(status), "{status}: rejected");
            assert_eq!(err.body(), Some("payload"), "{status}: body kept");
        }
    }
}

// ---------------------------------------------------------------------------
// Request shaping
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/requests.json"));
    let config = ClientConfig::with_base_url(BASE_URL);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method: HttpMethod = case["method"].as_str().unwrap().parse().unwrap();
        let mut options = RequestOptions::new(method, case["url"].as_str().unwrap());

        if let Some(params) = case.get("params") {
            for pair in params.as_array().unwrap() {
                options = options.param(pair[0].as_str().unwrap(), pair[1].as_str().unwrap());
            }
        }
        if let Some(headers) = case.get("headers") {
            for pair in headers.as_array().unwrap() {
                options = options.header(pair[0].as_str().unwrap(), pair[1].as_str().unwrap());
            }
        }
        if let Some(body) = case.get("json") {
            options = options.json_value(body.clone());
        }
        if let Some(key_case) = case.get("key_case") {
            options = options.key_case(key_case.as_str().unwrap().parse().unwrap());
        }

        let req = options.build(&config, None).unwrap();
        let expected = &case["expected_request"];

        assert_eq!(req.method.as_str(), expected["method"].as_str().unwrap(), "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");
        for (header, value) in expected["headers"].as_object().unwrap() {
            assert_eq!(req.header(header), value.as_str(), "{name}: header {header}");
        }

        match expected.get("body") {
            Some(body) => {
                let sent: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(&sent, body, "{name}: body");
            }
            None => assert!(req.body.is_none(), "{name}: body should be None"),
        }
    }
}
