use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::accounts::domain::UserId;
use crate::listings::domain::PropertyId;
use crate::store::StoreError;

use super::domain::{Favorite, FavoriteId, FavoriteToggle, Inquiry, InquiryId, InquiryStatus};
use super::repository::{EngagementRepository, NewInquiry};

#[derive(Default)]
struct EngagementTables {
    favorites: HashMap<FavoriteId, Favorite>,
    inquiries: HashMap<InquiryId, Inquiry>,
    next_favorite: u64,
    next_inquiry: u64,
}

/// In-memory engagement store. The favorite toggle runs its existence
/// check and its insert or delete under one lock acquisition.
#[derive(Default)]
pub struct InMemoryEngagementRepository {
    tables: Mutex<EngagementTables>,
}

impl InMemoryEngagementRepository {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, EngagementTables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("engagement store mutex poisoned".to_string()))
    }
}

impl EngagementRepository for InMemoryEngagementRepository {
    fn toggle_favorite(
        &self,
        user: UserId,
        property: PropertyId,
        at: DateTime<Utc>,
    ) -> Result<FavoriteToggle, StoreError> {
        let mut tables = self.lock()?;
        let existing = tables
            .favorites
            .iter()
            .find(|(_, fav)| fav.user_id == user && fav.property_id == property)
            .map(|(id, _)| *id);
        match existing {
            Some(id) => {
                tables.favorites.remove(&id);
                Ok(FavoriteToggle::Removed)
            }
            None => {
                tables.next_favorite += 1;
                let favorite = Favorite {
                    id: FavoriteId(tables.next_favorite),
                    user_id: user,
                    property_id: property,
                    created_at: at,
                };
                tables.favorites.insert(favorite.id, favorite);
                Ok(FavoriteToggle::Added)
            }
        }
    }

    fn favorites_for(&self, user: UserId) -> Result<Vec<Favorite>, StoreError> {
        let tables = self.lock()?;
        let mut favorites: Vec<Favorite> = tables
            .favorites
            .values()
            .filter(|fav| fav.user_id == user)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(favorites)
    }

    fn insert_inquiry(
        &self,
        inquiry: NewInquiry,
        at: DateTime<Utc>,
    ) -> Result<Inquiry, StoreError> {
        let mut tables = self.lock()?;
        tables.next_inquiry += 1;
        let stored = Inquiry {
            id: InquiryId(tables.next_inquiry),
            property_id: inquiry.property_id,
            user_id: inquiry.user_id,
            name: inquiry.name,
            email: inquiry.email,
            phone: inquiry.phone,
            message: inquiry.message,
            inquiry_type: inquiry.inquiry_type,
            status: InquiryStatus::New,
            preferred_tour_date: inquiry.preferred_tour_date,
            created_at: at,
            updated_at: at,
        };
        tables.inquiries.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn inquiry(&self, id: InquiryId) -> Result<Option<Inquiry>, StoreError> {
        Ok(self.lock()?.inquiries.get(&id).cloned())
    }

    fn update_inquiry(&self, inquiry: Inquiry) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.inquiries.contains_key(&inquiry.id) {
            return Err(StoreError::NotFound);
        }
        tables.inquiries.insert(inquiry.id, inquiry);
        Ok(())
    }

    fn inquiries_for(&self, user: UserId) -> Result<Vec<Inquiry>, StoreError> {
        let tables = self.lock()?;
        let mut inquiries: Vec<Inquiry> = tables
            .inquiries
            .values()
            .filter(|inquiry| inquiry.user_id == Some(user))
            .cloned()
            .collect();
        inquiries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(inquiries)
    }

    fn purge_property(&self, property: PropertyId) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        tables.favorites.retain(|_, fav| fav.property_id != property);
        tables
            .inquiries
            .retain(|_, inquiry| inquiry.property_id != Some(property));
        Ok(())
    }
}
