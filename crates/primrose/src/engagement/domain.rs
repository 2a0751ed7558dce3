use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::domain::UserId;
use crate::listings::domain::PropertyId;

/// Identifier wrapper for favorite rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FavoriteId(pub u64);

/// Identifier wrapper for inquiries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InquiryId(pub u64);

/// One (user, property) bookmark. The pair is unique; toggling flips the
/// row's existence.
#[derive(Debug, Clone, Serialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub property_id: PropertyId,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a favorite toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}

/// Favorite row joined with enough listing detail to render a card.
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteView {
    pub id: FavoriteId,
    pub property_id: PropertyId,
    pub property_title: String,
    pub property_price: Decimal,
    pub property_city: String,
    pub property_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryType {
    #[default]
    General,
    Tour,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    #[default]
    New,
    Contacted,
    Scheduled,
    Closed,
}

/// A buyer's message about a listing. Anonymous site-wide inquiries carry
/// no user and may carry no property when the referenced listing cannot be
/// resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Inquiry {
    pub id: InquiryId,
    pub property_id: Option<PropertyId>,
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub inquiry_type: InquiryType,
    pub status: InquiryStatus,
    pub preferred_tour_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inquiry joined with the listing title for display.
#[derive(Debug, Clone, Serialize)]
pub struct InquiryView {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub property_title: Option<String>,
}

/// Authenticated inquiry payload about one listing.
#[derive(Debug, Clone, Deserialize)]
pub struct InquiryRequest {
    pub message: String,
    #[serde(default)]
    pub inquiry_type: InquiryType,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub preferred_tour_date: Option<DateTime<Utc>>,
}

/// Anonymous contact-form payload. The property reference is a free-form
/// hint and may not resolve to a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicInquiryRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub property_id: Option<u64>,
    #[serde(default)]
    pub inquiry_type: InquiryType,
}
