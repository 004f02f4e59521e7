use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use salon_api::{build_app, ApiConfig};
use salon_core::Catalog;
use serde_json::{json, Value};
use tower::ServiceExt;

fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../catalog/salon_catalog.json")
}

fn catalog() -> Catalog {
    Catalog::load(catalog_path()).expect("catalog should load")
}

async fn app() -> Router {
    build_app(ApiConfig {
        catalog_path: catalog_path(),
        whatsapp_verify_token: Some("wa-token".to_string()),
        instagram_verify_token: Some("ig-token".to_string()),
        allowed_origins: vec!["http://localhost:5000".to_string()],
    })
    .await
    .expect("app should build")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn read_text(response: axum::response::Response) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn whatsapp_envelope(from: &str, body: &str) -> Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA_ID",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "messages": [{ "from": from, "id": "wamid.1", "type": "text", "text": { "body": body } }]
                }
            }]
        }]
    })
}

#[tokio::test]
async fn health_reports_bot_name() {
    let response = app()
        .await
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["status"], json!("healthy"));
    assert_eq!(parsed["bot_name"], json!(catalog().bot_name()));
    assert!(parsed["metrics"].get("requests_total").is_some());
}

#[tokio::test]
async fn web_greeting_returns_greeting_and_quick_replies() {
    let response = app()
        .await
        .oneshot(post_json("/webhook/web", json!({ "message": "Hola, buenos días" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let greeting = catalog().greeting().clone();
    assert_eq!(
        read_json(response).await,
        json!({ "text": greeting.text, "quick_replies": greeting.quick_replies })
    );
}

#[tokio::test]
async fn web_price_question_returns_services_text() {
    let response = app()
        .await
        .oneshot(post_json(
            "/webhook/web",
            json!({ "user_id": "ana", "message": "¿Cuánto cuesta un corte?" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    let catalog = catalog();
    let expected = catalog.lookup("services_prices").unwrap();
    assert_eq!(parsed["text"], json!(expected.text));
    assert_eq!(parsed["quick_replies"], json!(expected.quick_replies));
}

#[tokio::test]
async fn web_unmatched_text_gets_fallback_and_main_menu() {
    let response = app()
        .await
        .oneshot(post_json("/webhook/web", json!({ "message": "xyzzy-unmatched-text" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    let catalog = catalog();
    let text = parsed["text"].as_str().unwrap().to_string();
    assert!(catalog.fallback_responses().contains(&text));
    assert_eq!(parsed["quick_replies"], json!(catalog.main_menu_quick_replies()));
}

#[tokio::test]
async fn web_non_object_payload_is_rejected() {
    let response = app()
        .await
        .oneshot(post_json("/webhook/web", json!(["hola"])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], json!("invalid_payload"));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/whatsapp")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], json!("invalid_json"));
}

#[tokio::test]
async fn whatsapp_hours_question_is_addressed_to_sender() {
    let response = app()
        .await
        .oneshot(post_json(
            "/webhook/whatsapp",
            whatsapp_envelope("34600111222", "horarios"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let hours = catalog().lookup("working_hours").unwrap().text.clone();
    assert_eq!(
        read_json(response).await,
        json!({
            "messaging_product": "whatsapp",
            "to": "34600111222",
            "type": "text",
            "text": { "body": hours }
        })
    );
}

#[tokio::test]
async fn whatsapp_status_update_is_acknowledged() {
    let response = app()
        .await
        .oneshot(post_json(
            "/webhook/whatsapp",
            json!({ "object": "whatsapp_business_account" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn instagram_reply_has_no_quick_replies() {
    let payload = json!({
        "object": "instagram",
        "entry": [{
            "messaging": [{
                "sender": { "id": "1789" },
                "message": { "text": "¿Aceptan Bizum?" }
            }]
        }]
    });

    let response = app()
        .await
        .oneshot(post_json("/webhook/instagram", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let payment = catalog().lookup("payment").unwrap().text.clone();
    let parsed = read_json(response).await;
    assert_eq!(
        parsed,
        json!({ "recipient": { "id": "1789" }, "message": { "text": payment } })
    );
    assert!(!parsed.to_string().contains("quick_replies"));
}

#[tokio::test]
async fn subscription_handshake_echoes_challenge() {
    let request = Request::builder()
        .uri("/webhook/whatsapp?hub.mode=subscribe&hub.verify_token=wa-token&hub.challenge=1158201444")
        .body(Body::empty())
        .unwrap();

    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_text(response).await, "1158201444");
}

#[tokio::test]
async fn subscription_handshake_rejects_wrong_token() {
    let request = Request::builder()
        .uri("/webhook/instagram?hub.mode=subscribe&hub.verify_token=wa-token&hub.challenge=42")
        .body(Body::empty())
        .unwrap();

    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn post_with_verify_token_echoes_challenge() {
    let response = app()
        .await
        .oneshot(post_json(
            "/webhook/instagram?hub.verify_token=ig-token&hub.challenge=abc",
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_text(response).await, "abc");
}

#[tokio::test]
async fn config_exposes_business_profile() {
    let response = app()
        .await
        .oneshot(Request::builder().uri("/config").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["bot_name"], json!("SalonBot Madrid"));
    assert!(parsed["services"].is_array());
    assert!(parsed["working_hours"].is_object());
    assert!(parsed.get("intents").is_none());
}

#[tokio::test]
async fn demo_booking_and_slots() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/booking/demo",
            json!({ "user_id": "ana", "service": "Tinte", "date": "2024-01-15", "time": "11:00" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["success"], json!(true));
    let booking_id = parsed["booking"]["booking_id"].as_str().unwrap();
    assert!(booking_id.starts_with("BK") && booking_id.len() == 6);
    assert_eq!(parsed["booking"]["service"], json!("Tinte"));
    assert_eq!(parsed["booking"]["status"], json!("confirmed"));

    let response = app
        .oneshot(Request::builder().uri("/slots/2024-01-15").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["date"], json!("2024-01-15"));
    let count = parsed["available_slots"].as_array().unwrap().len();
    assert!((3..=7).contains(&count));
}

#[tokio::test]
async fn demo_booking_without_body_uses_defaults() {
    let request = Request::builder()
        .method("POST")
        .uri("/booking/demo")
        .body(Body::empty())
        .unwrap();

    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["booking"]["user_id"], json!("demo_user"));
    assert_eq!(parsed["booking"]["service"], json!("Corte de cabello"));
    assert_eq!(parsed["booking"]["time"], json!("10:00"));
}

#[tokio::test]
async fn demo_booking_with_malformed_body_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/booking/demo")
        .header("content-type", "application/json")
        .body(Body::from("{\"service\": "))
        .unwrap();

    let response = app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], json!("invalid_json"));
}

#[tokio::test]
async fn missing_catalog_fails_startup() {
    let result = build_app(ApiConfig {
        catalog_path: PathBuf::from("does/not/exist.json"),
        ..ApiConfig::default()
    })
    .await;

    assert!(result.is_err());
}
