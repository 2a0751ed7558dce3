//! End-to-end HTTP scenarios driven through the public router, covering
//! registration, listing lifecycle, favorites, inquiries, and the
//! newsletter popup flow.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use primrose_api::infra::ApiContext;
use primrose_api::routes::api_router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> Router {
    api_router(ApiContext::new())
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body reads");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is json")
    };
    (status, value)
}

async fn register(router: &Router, username: &str) -> String {
    let (status, body) = send(
        router,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct-horse-battery",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["token"].as_str().expect("token issued").to_string()
}

fn listing_payload(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "description": "Two bedrooms near the park",
        "property_type": "sale",
        "status": status,
        "address": "12 Elm St",
        "city": "Des Moines",
        "state": "IA",
        "zip_code": "50309",
        "price": "250000",
        "bedrooms": 2,
    })
}

async fn create_listing(router: &Router, token: &str, title: &str, status: &str) -> u64 {
    let (status_code, body) = send(
        router,
        "POST",
        "/api/properties",
        Some(token),
        Some(listing_payload(title, status)),
    )
    .await;
    assert_eq!(status_code, StatusCode::CREATED, "create failed: {body}");
    body["id"].as_u64().expect("listing id")
}

#[tokio::test]
async fn published_listings_are_publicly_searchable() {
    let app = router();
    let seller = register(&app, "sam").await;
    create_listing(&app, &seller, "Sunny bungalow", "published").await;
    create_listing(&app, &seller, "Secret draft", "draft").await;

    let (status, body) = send(&app, "GET", "/api/properties", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["results"][0]["title"], json!("Sunny bungalow"));
    assert_eq!(body["results"][0]["seller_name"], json!("sam"));
}

#[tokio::test]
async fn search_honors_the_minimum_bedroom_filter() {
    let app = router();
    let seller = register(&app, "sam").await;
    let mut studio = listing_payload("Studio", "published");
    studio["bedrooms"] = json!(1);
    let (status, _) = send(&app, "POST", "/api/properties", Some(&seller), Some(studio)).await;
    assert_eq!(status, StatusCode::CREATED);
    create_listing(&app, &seller, "Family home", "published").await;

    let (status, body) = send(&app, "GET", "/api/properties?min_bedrooms=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["results"][0]["title"], json!("Family home"));
}

#[tokio::test]
async fn draft_retrieval_is_not_found_and_views_skip_the_owner() {
    let app = router();
    let seller = register(&app, "sam").await;
    let draft = create_listing(&app, &seller, "Draft", "draft").await;
    let live = create_listing(&app, &seller, "Live", "published").await;

    let (status, _) = send(&app, "GET", &format!("/api/properties/{draft}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, owner_view) = send(
        &app,
        "GET",
        &format!("/api/properties/{live}"),
        Some(&seller),
        None,
    )
    .await;
    assert_eq!(owner_view["views_count"], json!(0));

    let (_, public_view) = send(&app, "GET", &format!("/api/properties/{live}"), None, None).await;
    assert_eq!(public_view["views_count"], json!(1));
}

#[tokio::test]
async fn mutations_require_authentication_and_ownership() {
    let app = router();
    let seller = register(&app, "sam").await;
    let intruder = register(&app, "eve").await;
    let live = create_listing(&app, &seller, "Live", "published").await;

    let rename = json!({ "title": "Hijacked" });
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/properties/{live}"),
        None,
        Some(rename.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/properties/{live}"),
        Some(&intruder),
        Some(rename),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn invalid_listing_payload_reports_field_errors() {
    let app = router();
    let seller = register(&app, "sam").await;
    let mut payload = listing_payload("Freebie", "published");
    payload["price"] = json!("0");
    payload["title"] = json!("  ");

    let (status, body) = send(&app, "POST", "/api/properties", Some(&seller), Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["errors"]["price"], json!("must be greater than zero"));
    assert_eq!(body["errors"]["title"], json!("this field is required"));
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = router();
    register(&app, "sam").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "sam",
            "email": "sam2@example.com",
            "password": "correct-horse-battery",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("Username already exists"));
}

#[tokio::test]
async fn favorite_toggle_round_trips() {
    let app = router();
    let seller = register(&app, "sam").await;
    let buyer = register(&app, "pat").await;
    let live = create_listing(&app, &seller, "Live", "published").await;
    let uri = format!("/api/properties/{live}/favorite");

    let (status, body) = send(&app, "POST", &uri, Some(&buyer), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], json!("added to favorites"));

    let (_, favorites) = send(&app, "GET", "/api/properties/my_favorites", Some(&buyer), None).await;
    assert_eq!(favorites["count"], json!(1));
    assert_eq!(favorites["results"][0]["property_title"], json!("Live"));

    let (status, body) = send(&app, "POST", &uri, Some(&buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("removed from favorites"));
}

#[tokio::test]
async fn public_inquiry_survives_a_bogus_property_reference() {
    let app = router();
    let (status, body) = send(
        &app,
        "POST",
        "/api/inquiries/public",
        None,
        Some(json!({
            "name": "Walk In",
            "email": "walkin@example.com",
            "message": "Saw your sign on 5th street",
            "property_id": 9999,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["inquiry"]["property_id"], Value::Null);
}

#[tokio::test]
async fn authenticated_inquiry_lands_in_my_inquiries() {
    let app = router();
    let seller = register(&app, "sam").await;
    let buyer = register(&app, "pat").await;
    let live = create_listing(&app, &seller, "Live", "published").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/properties/{live}/inquire"),
        Some(&buyer),
        Some(json!({ "message": "Is it still available?" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, "GET", "/api/inquiries", Some(&buyer), None).await;
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["results"][0]["property_title"], json!("Live"));
    assert_eq!(body["results"][0]["status"], json!("new"));
}

#[tokio::test]
async fn newsletter_subscribe_and_popup_window() {
    let app = router();
    let (status, body) = send(
        &app,
        "POST",
        "/api/newsletter/subscribe",
        None,
        Some(json!({ "email": "pat@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["message"],
        json!("Successfully subscribed to our newsletter!")
    );

    let (status, body) = send(
        &app,
        "POST",
        "/api/newsletter/subscribe",
        None,
        Some(json!({ "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["email"].is_string());

    let (_, before) = send(
        &app,
        "GET",
        "/api/newsletter/popup/status?session_key=sess-1",
        None,
        None,
    )
    .await;
    assert_eq!(before["show_popup"], json!(true));

    let (status, body) = send(
        &app,
        "POST",
        "/api/newsletter/popup/dismiss",
        None,
        Some(json!({ "session_key": "sess-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Popup dismissed for 3 days"));

    let (_, after) = send(
        &app,
        "GET",
        "/api/newsletter/popup/status?session_key=sess-1",
        None,
        None,
    )
    .await;
    assert_eq!(after["show_popup"], json!(false));
    assert!(after["dismissed_at"].is_string());
}

#[tokio::test]
async fn unsubscribe_requires_an_active_subscription() {
    let app = router();
    let (status, body) = send(
        &app,
        "POST",
        "/api/newsletter/unsubscribe",
        None,
        Some(json!({ "email": "ghost@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        json!("Email not found in our subscription list")
    );
}

#[tokio::test]
async fn logout_revokes_the_session_token() {
    let app = router();
    let token = register(&app, "sam").await;

    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_removes_the_listing_and_its_favorites() {
    let app = router();
    let seller = register(&app, "sam").await;
    let buyer = register(&app, "pat").await;
    let live = create_listing(&app, &seller, "Live", "published").await;

    send(
        &app,
        "POST",
        &format!("/api/properties/{live}/favorite"),
        Some(&buyer),
        None,
    )
    .await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/properties/{live}"),
        Some(&seller),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/properties/{live}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, favorites) = send(&app, "GET", "/api/properties/my_favorites", Some(&buyer), None).await;
    assert_eq!(favorites["count"], json!(0));
}
