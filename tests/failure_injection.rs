//! Failure injection tests: the Gemini client and credential failover
//! against a scripted provider.

use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use paper_generator::generation::{DedicationInput, ReferencesInput};
use paper_generator::{GenerationError, ProviderError};

mod common;

#[tokio::test]
async fn test_rotates_past_rate_limited_key() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let provider = common::start_programmable_backend(move |req| {
        let log = log.clone();
        async move {
            let key = req.api_key.unwrap_or_default();
            log.lock().unwrap().push(key.clone());
            if key == "key-alpha-0001" {
                (429, common::gemini_error(429, "RESOURCE_EXHAUSTED", "Quota exceeded"))
            } else {
                (200, common::gemini_reply(&json!({"dedication": "For the curious."})))
            }
        }
    })
    .await;

    let (generator, store) = common::generator_for(provider, &["key-alpha-0001", "key-bravo-0002"]);
    let out = generator
        .generate_dedication(DedicationInput { topic: "Bird migration".into() })
        .await
        .expect("second key should succeed");

    assert_eq!(out.dedication, "For the curious.");
    assert_eq!(*seen.lock().unwrap(), vec!["key-alpha-0001", "key-bravo-0002"]);

    let statuses = store.statuses();
    assert!(statuses[0].expired, "rate limited key is rotated out");
    assert!(!statuses[1].expired);
    assert_eq!(store.active_count(), 1);
}

#[tokio::test]
async fn test_all_keys_rate_limited() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let provider = common::start_programmable_backend(move |_req| {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (429, common::gemini_error(429, "RESOURCE_EXHAUSTED", "Quota exceeded"))
        }
    })
    .await;

    let (generator, store) = common::generator_for(provider, &["key-alpha-0001", "key-bravo-0002"]);
    let err = generator
        .generate_references(ReferencesInput { topic: "Topology".into() })
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::CredentialsExhausted { .. }), "got {err:?}");
    assert!(err.is_rate_limited());
    assert!(err.to_string().starts_with("no active credentials available"));
    assert_eq!(calls.load(Ordering::SeqCst), 2, "one call per key, no same-key retry on quota");
    assert_eq!(store.active_count(), 0);

    // Nothing left to try: the next request fails without reaching the provider
    let err = generator
        .generate_references(ReferencesInput { topic: "Topology".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::NoActiveCredentials));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    let provider = common::closed_addr().await;

    let (generator, store) = common::generator_for(provider, &["key-alpha-0001"]);
    let err = generator
        .generate_dedication(DedicationInput { topic: "Glaciers".into() })
        .await
        .unwrap_err();

    match &err {
        GenerationError::CredentialsExhausted { last, .. } => {
            assert!(matches!(last, ProviderError::Network(_)), "got {last:?}");
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert!(!err.is_rate_limited());
    assert_eq!(store.active_count(), 0, "key retired after exhausting transient retries");
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let provider = common::start_programmable_backend(move |_req| {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (500, common::gemini_error(500, "INTERNAL", "Internal error"))
        }
    })
    .await;

    let (generator, store) = common::generator_for(provider, &["key-alpha-0001", "key-bravo-0002"]);
    let err = generator
        .generate_dedication(DedicationInput { topic: "Glaciers".into() })
        .await
        .unwrap_err();

    match err {
        GenerationError::Provider(ProviderError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal error (INTERNAL)");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.active_count(), 2);
}

#[tokio::test]
async fn test_request_shape() {
    let captured = Arc::new(Mutex::new(None));
    let slot = captured.clone();
    let provider = common::start_programmable_backend(move |req| {
        let slot = slot.clone();
        async move {
            *slot.lock().unwrap() = Some(req);
            (200, common::gemini_reply(&json!({"references": ["A", "B"]})))
        }
    })
    .await;

    let (generator, _store) = common::generator_for(provider, &["key-alpha-0001"]);
    let out = generator
        .generate_references(ReferencesInput { topic: "Cryptography".into() })
        .await
        .unwrap();
    assert_eq!(out.references, vec!["A", "B"]);

    let req = captured.lock().unwrap().clone().expect("provider was called");
    assert_eq!(req.path, "/v1beta/models/gemini-test:generateContent");
    assert_eq!(req.api_key.as_deref(), Some("key-alpha-0001"));
    assert_eq!(req.body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(req.body["generationConfig"]["responseSchema"]["properties"]["references"]["type"], "ARRAY");
    let text = req.body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(text.contains("Cryptography"));
}

#[tokio::test]
async fn test_non_json_output_is_reported() {
    let provider = common::start_programmable_backend(|_req| async {
        let envelope = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Sorry, I cannot help." }] } }]
        });
        (200, envelope.to_string())
    })
    .await;

    let (generator, store) = common::generator_for(provider, &["key-alpha-0001"]);
    let err = generator
        .generate_dedication(DedicationInput { topic: "Glaciers".into() })
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Provider(ProviderError::Decode(_))), "got {err:?}");
    assert_eq!(store.active_count(), 1);
}
