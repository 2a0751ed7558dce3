use chrono::{DateTime, Utc};

use crate::accounts::domain::UserId;
use crate::listings::domain::PropertyId;
use crate::store::StoreError;

use super::domain::{Favorite, FavoriteToggle, Inquiry, InquiryId};

/// Insert payload for an inquiry; the id and timestamps are assigned by the
/// store.
#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub property_id: Option<PropertyId>,
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub inquiry_type: super::domain::InquiryType,
    pub preferred_tour_date: Option<DateTime<Utc>>,
}

/// Storage abstraction for favorites and inquiries.
///
/// `toggle_favorite` is atomic: the existence check and the insert or
/// delete happen in one store operation, so two concurrent toggles cannot
/// both insert.
pub trait EngagementRepository: Send + Sync {
    fn toggle_favorite(
        &self,
        user: UserId,
        property: PropertyId,
        at: DateTime<Utc>,
    ) -> Result<FavoriteToggle, StoreError>;
    /// The user's favorites, newest first.
    fn favorites_for(&self, user: UserId) -> Result<Vec<Favorite>, StoreError>;
    fn insert_inquiry(&self, inquiry: NewInquiry, at: DateTime<Utc>)
        -> Result<Inquiry, StoreError>;
    fn inquiry(&self, id: InquiryId) -> Result<Option<Inquiry>, StoreError>;
    fn update_inquiry(&self, inquiry: Inquiry) -> Result<(), StoreError>;
    /// The user's inquiries, newest first.
    fn inquiries_for(&self, user: UserId) -> Result<Vec<Inquiry>, StoreError>;
    /// Cascade for a deleted listing: drop its favorites and its linked
    /// inquiries. Inquiries with no property link are untouched.
    fn purge_property(&self, property: PropertyId) -> Result<(), StoreError>;
}
