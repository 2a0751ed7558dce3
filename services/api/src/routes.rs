use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use primrose::accounts::domain::{ApplicationData, ApplicationId, User};
use primrose::accounts::service::{
    LoginRequest, ProfileUpdate, RegisterRequest, ReviewDecision,
};
use primrose::engagement::domain::{
    FavoriteToggle, InquiryId, InquiryRequest, PublicInquiryRequest,
};
use primrose::engagement::service::StatusUpdate;
use primrose::error::ApiError;
use primrose::listings::domain::{ImageUpload, NewProperty, PropertyId, PropertyPatch};
use primrose::listings::filter::{ListingFilter, ListingOrdering};
use primrose::listings::visibility::parse_featured;
use primrose::listings::ListingQuery;

use crate::infra::{ApiContext, AppState};

pub fn api_router(context: ApiContext) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(current_user))
        .route("/api/auth/profile", patch(update_profile).put(update_profile))
        .route("/api/auth/seller/apply", post(apply_seller))
        .route("/api/auth/seller/applications", get(my_applications))
        .route(
            "/api/auth/seller/applications/:id/review",
            patch(review_application),
        )
        .route("/api/properties", get(search_properties).post(create_property))
        .route("/api/properties/my_properties", get(my_properties))
        .route("/api/properties/my_favorites", get(my_favorites))
        .route(
            "/api/properties/:id",
            get(retrieve_property)
                .put(update_property)
                .patch(update_property)
                .delete(delete_property),
        )
        .route("/api/properties/:id/favorite", post(toggle_favorite))
        .route("/api/properties/:id/inquire", post(inquire))
        .route("/api/properties/:id/images", post(add_image))
        .route("/api/inquiries", get(my_inquiries))
        .route("/api/inquiries/public", post(public_inquiry))
        .route("/api/inquiries/:id/status", patch(update_inquiry_status))
        .route("/api/newsletter/subscribe", post(subscribe_newsletter))
        .route("/api/newsletter/unsubscribe", post(unsubscribe_newsletter))
        .route("/api/newsletter/popup/dismiss", post(dismiss_popup))
        .route("/api/newsletter/popup/status", get(popup_status))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(context)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

/// Resolve the caller or fail with 401.
fn require_user(context: &ApiContext, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    Ok(context.accounts.authenticate(&token)?)
}

/// Resolve the caller when a valid token is present; anonymous otherwise.
fn optional_user(context: &ApiContext, headers: &HeaderMap) -> Option<User> {
    let token = bearer_token(headers)?;
    context.accounts.authenticate(&token).ok()
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };
    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn register(
    State(context): State<ApiContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = context.accounts.register(payload)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "user": session.user,
            "token": session.token,
            "message": "Registration successful",
        })),
    ))
}

async fn login(
    State(context): State<ApiContext>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = context.accounts.login(payload)?;
    Ok(Json(json!({
        "success": true,
        "user": session.user,
        "token": session.token,
        "message": "Login successful",
    })))
}

async fn logout(
    State(context): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    context.accounts.logout(&token)?;
    Ok(Json(json!({ "success": true, "message": "Logout successful" })))
}

async fn current_user(
    State(context): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&context, &headers)?;
    let view = context.accounts.current_user(user.id)?;
    Ok(Json(json!({ "success": true, "user": view })))
}

async fn update_profile(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&context, &headers)?;
    let view = context.accounts.update_profile(user.id, payload)?;
    Ok(Json(json!({ "success": true, "user": view })))
}

async fn apply_seller(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Json(payload): Json<ApplicationData>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&context, &headers)?;
    let application = context.accounts.apply_seller(user.id, payload)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Application submitted successfully",
            "application": application,
        })),
    ))
}

async fn my_applications(
    State(context): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&context, &headers)?;
    let applications = context.accounts.my_applications(user.id)?;
    Ok(Json(json!({ "success": true, "applications": applications })))
}

async fn review_application(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(payload): Json<ReviewDecision>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reviewer = require_user(&context, &headers)?;
    let application =
        context
            .accounts
            .review_application(&reviewer, ApplicationId(id), payload)?;
    Ok(Json(json!({ "success": true, "application": application })))
}

/// Query-string surface of the listing search. Unknown property types and
/// malformed featured flags are dropped rather than rejected.
#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    property_type: Option<String>,
    city: Option<String>,
    state: Option<String>,
    min_bedrooms: Option<u32>,
    min_bathrooms: Option<Decimal>,
    min_square_feet: Option<u32>,
    has_garage: Option<bool>,
    has_pool: Option<bool>,
    has_garden: Option<bool>,
    search: Option<String>,
    featured: Option<String>,
    ordering: Option<String>,
}

impl SearchParams {
    fn into_query(self) -> ListingQuery {
        let filter = ListingFilter {
            min_price: self.min_price,
            max_price: self.max_price,
            property_types: self
                .property_type
                .as_deref()
                .map(|raw| raw.split(',').filter_map(|part| part.parse().ok()).collect())
                .unwrap_or_default(),
            city: self.city,
            state: self.state,
            min_bedrooms: self.min_bedrooms,
            min_bathrooms: self.min_bathrooms,
            min_square_feet: self.min_square_feet,
            has_garage: self.has_garage,
            has_pool: self.has_pool,
            has_garden: self.has_garden,
            search: self.search,
        };
        ListingQuery {
            filter,
            featured: parse_featured(self.featured.as_deref()),
            ordering: self
                .ordering
                .as_deref()
                .map(ListingOrdering::parse)
                .unwrap_or_default(),
        }
    }
}

async fn search_properties(
    State(context): State<ApiContext>,
    Query(params): Query<SearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let listings = context.listings.search(&params.into_query())?;
    Ok(Json(json!({ "count": listings.len(), "results": listings })))
}

async fn create_property(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Json(payload): Json<NewProperty>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&context, &headers)?;
    let detail = context.listings.create(&user, payload)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn retrieve_property(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<primrose::listings::PropertyDetail>, ApiError> {
    let caller = optional_user(&context, &headers).map(|user| user.id);
    let detail = context.listings.retrieve(caller, PropertyId(id))?;
    Ok(Json(detail))
}

async fn update_property(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(payload): Json<PropertyPatch>,
) -> Result<Json<primrose::listings::PropertyDetail>, ApiError> {
    let user = require_user(&context, &headers)?;
    let detail = context.listings.update(&user, PropertyId(id), payload)?;
    Ok(Json(detail))
}

async fn delete_property(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let user = require_user(&context, &headers)?;
    context.listings.delete(&user, PropertyId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn my_properties(
    State(context): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&context, &headers)?;
    let listings = context.listings.my_properties(user.id)?;
    Ok(Json(json!({ "count": listings.len(), "results": listings })))
}

async fn add_image(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(payload): Json<ImageUpload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&context, &headers)?;
    let image = context.listings.add_image(&user, PropertyId(id), payload)?;
    Ok((StatusCode::CREATED, Json(image)))
}

async fn toggle_favorite(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&context, &headers)?;
    let outcome = context.engagement.toggle_favorite(&user, PropertyId(id))?;
    let (status, message) = match outcome {
        FavoriteToggle::Added => (StatusCode::CREATED, "added to favorites"),
        FavoriteToggle::Removed => (StatusCode::OK, "removed from favorites"),
    };
    Ok((status, Json(json!({ "status": message }))))
}

async fn my_favorites(
    State(context): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&context, &headers)?;
    let favorites = context.engagement.my_favorites(user.id)?;
    Ok(Json(json!({ "count": favorites.len(), "results": favorites })))
}

async fn inquire(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(payload): Json<InquiryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&context, &headers)?;
    let inquiry = context.engagement.inquire(&user, PropertyId(id), payload)?;
    Ok((StatusCode::CREATED, Json(inquiry)))
}

async fn public_inquiry(
    State(context): State<ApiContext>,
    Json(payload): Json<PublicInquiryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let inquiry = context.engagement.public_inquiry(payload)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Your inquiry has been received",
            "inquiry": inquiry,
        })),
    ))
}

async fn my_inquiries(
    State(context): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&context, &headers)?;
    let inquiries = context.engagement.my_inquiries(user.id)?;
    Ok(Json(json!({ "count": inquiries.len(), "results": inquiries })))
}

async fn update_inquiry_status(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<primrose::engagement::Inquiry>, ApiError> {
    let user = require_user(&context, &headers)?;
    let inquiry = context
        .engagement
        .update_status(&user, InquiryId(id), payload)?;
    Ok(Json(inquiry))
}

#[derive(Debug, Deserialize)]
struct EmailPayload {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct DismissPayload {
    #[serde(default)]
    session_key: String,
}

#[derive(Debug, Deserialize)]
struct PopupParams {
    session_key: Option<String>,
}

async fn subscribe_newsletter(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Json(payload): Json<EmailPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = optional_user(&context, &headers).map(|user| user.id);
    context.newsletter.subscribe(&payload.email, user)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Successfully subscribed to our newsletter!",
        })),
    ))
}

async fn unsubscribe_newsletter(
    State(context): State<ApiContext>,
    Json(payload): Json<EmailPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    context.newsletter.unsubscribe(&payload.email)?;
    Ok(Json(json!({
        "success": true,
        "message": "Successfully unsubscribed from newsletter",
    })))
}

async fn dismiss_popup(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Json(payload): Json<DismissPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = optional_user(&context, &headers).map(|user| user.id);
    context.newsletter.dismiss(&payload.session_key, user)?;
    Ok(Json(json!({
        "success": true,
        "message": "Popup dismissed for 3 days",
    })))
}

async fn popup_status(
    State(context): State<ApiContext>,
    headers: HeaderMap,
    Query(params): Query<PopupParams>,
) -> Result<Json<primrose::newsletter::PopupStatus>, ApiError> {
    let user = optional_user(&context, &headers).map(|user| user.id);
    let status = context
        .newsletter
        .popup_status(params.session_key.as_deref(), user)?;
    Ok(Json(status))
}
