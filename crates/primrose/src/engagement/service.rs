//! Engagement workflows: favorite toggling, listing inquiries, and the
//! anonymous contact form.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::accounts::domain::{User, UserId, UserRole};
use crate::error::ApiError;
use crate::listings::domain::PropertyId;
use crate::listings::repository::ListingRepository;
use crate::listings::visibility::{ListingAction, VisibilityScope};
use crate::store::StoreError;
use crate::validate::email_is_valid;

use super::domain::{
    FavoriteToggle, FavoriteView, Inquiry, InquiryId, InquiryRequest, InquiryStatus, InquiryView,
    PublicInquiryRequest,
};
use super::repository::{EngagementRepository, NewInquiry};

#[derive(Debug, thiserror::Error)]
pub enum EngagementError {
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<EngagementError> for ApiError {
    fn from(value: EngagementError) -> Self {
        match value {
            EngagementError::Validation(errors) => ApiError::Validation(errors),
            EngagementError::NotFound(message) => ApiError::NotFound(message),
            EngagementError::Forbidden(message) => ApiError::Forbidden(message),
            EngagementError::Store(err) => err.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: InquiryStatus,
}

pub struct EngagementService<E, L> {
    engagement: Arc<E>,
    listings: Arc<L>,
}

impl<E, L> EngagementService<E, L>
where
    E: EngagementRepository,
    L: ListingRepository,
{
    pub fn new(engagement: Arc<E>, listings: Arc<L>) -> Self {
        Self {
            engagement,
            listings,
        }
    }

    /// Flip the caller's bookmark on a listing they can see.
    pub fn toggle_favorite(
        &self,
        caller: &User,
        property: PropertyId,
    ) -> Result<FavoriteToggle, EngagementError> {
        self.visible_property(Some(caller.id), property)?;
        let outcome = self
            .engagement
            .toggle_favorite(caller.id, property, Utc::now())?;
        tracing::debug!(user = %caller.id, property = %property, ?outcome, "favorite toggled");
        Ok(outcome)
    }

    /// The caller's favorites joined with listing details, newest first.
    pub fn my_favorites(&self, caller: UserId) -> Result<Vec<FavoriteView>, EngagementError> {
        let mut views = Vec::new();
        for favorite in self.engagement.favorites_for(caller)? {
            let Some(property) = self.listings.fetch(favorite.property_id)? else {
                continue;
            };
            let image = self
                .listings
                .primary_image(property.id)?
                .map(|image| image.url);
            views.push(FavoriteView {
                id: favorite.id,
                property_id: property.id,
                property_title: property.title,
                property_price: property.price,
                property_city: property.city,
                property_image: image,
                created_at: favorite.created_at,
            });
        }
        Ok(views)
    }

    /// Authenticated inquiry about one listing. Contact details come from
    /// the account.
    pub fn inquire(
        &self,
        caller: &User,
        property: PropertyId,
        request: InquiryRequest,
    ) -> Result<Inquiry, EngagementError> {
        if request.message.trim().is_empty() {
            return Err(single_error("message", "this field is required"));
        }
        self.visible_property(Some(caller.id), property)?;
        let phone = if request.phone.trim().is_empty() {
            caller.phone_number.clone()
        } else {
            request.phone
        };
        let inquiry = self.engagement.insert_inquiry(
            NewInquiry {
                property_id: Some(property),
                user_id: Some(caller.id),
                name: caller.full_name(),
                email: caller.email.clone(),
                phone,
                message: request.message,
                inquiry_type: request.inquiry_type,
                preferred_tour_date: request.preferred_tour_date,
            },
            Utc::now(),
        )?;
        tracing::info!(inquiry = %inquiry.id.0, property = %property, "inquiry submitted");
        Ok(inquiry)
    }

    /// Anonymous contact form. A property hint that does not resolve to a
    /// published listing is dropped, and the inquiry is recorded unlinked.
    pub fn public_inquiry(
        &self,
        request: PublicInquiryRequest,
    ) -> Result<Inquiry, EngagementError> {
        let mut errors = BTreeMap::new();
        if request.name.trim().is_empty() {
            errors.insert("name".to_string(), "this field is required".to_string());
        }
        if !email_is_valid(&request.email) {
            errors.insert("email".to_string(), "enter a valid email address".to_string());
        }
        if request.message.trim().is_empty() {
            errors.insert("message".to_string(), "this field is required".to_string());
        }
        if !errors.is_empty() {
            return Err(EngagementError::Validation(errors));
        }

        let property_id = match request.property_id.map(PropertyId) {
            Some(id) => self
                .listings
                .fetch(id)?
                .filter(|property| VisibilityScope::PublishedOnly.allows(property))
                .map(|property| property.id),
            None => None,
        };
        let inquiry = self.engagement.insert_inquiry(
            NewInquiry {
                property_id,
                user_id: None,
                name: request.name.trim().to_string(),
                email: request.email.trim().to_string(),
                phone: request.phone,
                message: request.message,
                inquiry_type: request.inquiry_type,
                preferred_tour_date: None,
            },
            Utc::now(),
        )?;
        Ok(inquiry)
    }

    /// The caller's inquiries joined with listing titles, newest first.
    pub fn my_inquiries(&self, caller: UserId) -> Result<Vec<InquiryView>, EngagementError> {
        let mut views = Vec::new();
        for inquiry in self.engagement.inquiries_for(caller)? {
            let property_title = match inquiry.property_id {
                Some(id) => self.listings.fetch(id)?.map(|property| property.title),
                None => None,
            };
            views.push(InquiryView {
                inquiry,
                property_title,
            });
        }
        Ok(views)
    }

    /// Staff-only status transition: admins always, agents only on
    /// inquiries about a listing they are assigned to.
    pub fn update_status(
        &self,
        caller: &User,
        id: InquiryId,
        update: StatusUpdate,
    ) -> Result<Inquiry, EngagementError> {
        if !caller.role.is_staff() {
            return Err(EngagementError::Forbidden(
                "only staff may update inquiries".to_string(),
            ));
        }
        let mut inquiry = self
            .engagement
            .inquiry(id)?
            .ok_or_else(|| EngagementError::NotFound("inquiry not found".to_string()))?;
        if caller.role == UserRole::Agent {
            let assigned = match inquiry.property_id {
                Some(property_id) => self
                    .listings
                    .fetch(property_id)?
                    .is_some_and(|property| property.agent == Some(caller.id)),
                None => false,
            };
            if !assigned {
                return Err(EngagementError::Forbidden(
                    "only the assigned agent may update this inquiry".to_string(),
                ));
            }
        }
        inquiry.status = update.status;
        inquiry.updated_at = Utc::now();
        self.engagement.update_inquiry(inquiry.clone())?;
        Ok(inquiry)
    }

    fn visible_property(
        &self,
        caller: Option<UserId>,
        id: PropertyId,
    ) -> Result<(), EngagementError> {
        let property = self
            .listings
            .fetch(id)?
            .ok_or_else(|| EngagementError::NotFound("property not found".to_string()))?;
        let scope = VisibilityScope::for_caller(caller, ListingAction::Mutate);
        if !scope.allows(&property) {
            return Err(EngagementError::NotFound("property not found".to_string()));
        }
        Ok(())
    }
}

fn single_error(field: &str, message: &str) -> EngagementError {
    let mut errors = BTreeMap::new();
    errors.insert(field.to_string(), message.to_string());
    EngagementError::Validation(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::domain::UserRole;
    use crate::engagement::domain::InquiryType;
    use crate::engagement::memory::InMemoryEngagementRepository;
    use crate::listings::domain::{
        Amenities, ListingStatus, PriceUnit, Property, PropertyType,
    };
    use crate::listings::memory::InMemoryListingRepository;
    use rust_decimal::Decimal;

    type Service = EngagementService<InMemoryEngagementRepository, InMemoryListingRepository>;

    fn service() -> (Service, Arc<InMemoryListingRepository>) {
        let listings = Arc::new(InMemoryListingRepository::default());
        let service = EngagementService::new(
            Arc::new(InMemoryEngagementRepository::default()),
            Arc::clone(&listings),
        );
        (service, listings)
    }

    fn user(id: u64, role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: UserId(id),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password_hash: String::new(),
            first_name: "Pat".to_string(),
            last_name: "Doe".to_string(),
            role,
            phone_number: "555-0100".to_string(),
            is_verified: false,
            company_name: String::new(),
            license_number: String::new(),
            bio: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn listing(
        listings: &InMemoryListingRepository,
        seller: UserId,
        status: ListingStatus,
    ) -> Property {
        let now = Utc::now();
        listings
            .insert(Property {
                id: crate::listings::domain::PropertyId(0),
                title: "Bungalow".to_string(),
                description: "Near the park".to_string(),
                property_type: PropertyType::Sale,
                status,
                address: "12 Elm St".to_string(),
                city: "Ames".to_string(),
                state: "IA".to_string(),
                zip_code: "50010".to_string(),
                latitude: None,
                longitude: None,
                price: Decimal::new(250_000, 0),
                price_unit: PriceUnit::Total,
                bedrooms: Some(2),
                bathrooms: None,
                square_feet: None,
                lot_size: None,
                year_built: None,
                amenities: Amenities::default(),
                seller,
                agent: None,
                featured: false,
                views_count: 0,
                created_at: now,
                updated_at: now,
                published_at: Some(now),
            })
            .expect("insert")
    }

    fn inquiry_request(message: &str) -> InquiryRequest {
        InquiryRequest {
            message: message.to_string(),
            inquiry_type: InquiryType::General,
            phone: String::new(),
            preferred_tour_date: None,
        }
    }

    #[test]
    fn toggle_round_trips_through_the_joined_view() {
        let (service, listings) = service();
        let buyer = user(1, UserRole::Buyer);
        let property = listing(&listings, UserId(2), ListingStatus::Published);

        assert_eq!(
            service.toggle_favorite(&buyer, property.id).expect("toggle"),
            FavoriteToggle::Added
        );
        let favorites = service.my_favorites(buyer.id).expect("favorites");
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].property_title, "Bungalow");

        assert_eq!(
            service.toggle_favorite(&buyer, property.id).expect("toggle"),
            FavoriteToggle::Removed
        );
        assert!(service.my_favorites(buyer.id).expect("favorites").is_empty());
    }

    #[test]
    fn favoriting_an_invisible_draft_is_not_found() {
        let (service, listings) = service();
        let buyer = user(1, UserRole::Buyer);
        let draft = listing(&listings, UserId(2), ListingStatus::Draft);
        assert!(matches!(
            service.toggle_favorite(&buyer, draft.id),
            Err(EngagementError::NotFound(_))
        ));
    }

    #[test]
    fn owners_can_favorite_their_own_drafts() {
        let (service, listings) = service();
        let owner = user(2, UserRole::Seller);
        let draft = listing(&listings, owner.id, ListingStatus::Draft);
        assert_eq!(
            service.toggle_favorite(&owner, draft.id).expect("toggle"),
            FavoriteToggle::Added
        );
    }

    #[test]
    fn inquiries_carry_the_account_contact_details() {
        let (service, listings) = service();
        let buyer = user(1, UserRole::Buyer);
        let property = listing(&listings, UserId(2), ListingStatus::Published);

        let inquiry = service
            .inquire(&buyer, property.id, inquiry_request("Still available?"))
            .expect("inquire");
        assert_eq!(inquiry.name, "Pat Doe");
        assert_eq!(inquiry.email, "user1@example.com");
        assert_eq!(inquiry.phone, "555-0100");
        assert_eq!(inquiry.status, InquiryStatus::New);

        let mine = service.my_inquiries(buyer.id).expect("list");
        assert_eq!(mine[0].property_title.as_deref(), Some("Bungalow"));
    }

    #[test]
    fn blank_message_fails_validation() {
        let (service, listings) = service();
        let buyer = user(1, UserRole::Buyer);
        let property = listing(&listings, UserId(2), ListingStatus::Published);
        assert!(matches!(
            service.inquire(&buyer, property.id, inquiry_request("   ")),
            Err(EngagementError::Validation(_))
        ));
    }

    #[test]
    fn public_inquiry_with_bogus_property_is_recorded_unlinked() {
        let (service, _) = service();
        let inquiry = service
            .public_inquiry(PublicInquiryRequest {
                name: "Walk In".to_string(),
                email: "walkin@example.com".to_string(),
                message: "Saw your sign".to_string(),
                phone: String::new(),
                property_id: Some(9999),
                inquiry_type: InquiryType::General,
            })
            .expect("public inquiry");
        assert!(inquiry.property_id.is_none());
        assert!(inquiry.user_id.is_none());
    }

    #[test]
    fn public_inquiry_requires_contact_fields() {
        let (service, _) = service();
        let err = service
            .public_inquiry(PublicInquiryRequest {
                name: String::new(),
                email: "not-an-email".to_string(),
                message: String::new(),
                phone: String::new(),
                property_id: None,
                inquiry_type: InquiryType::General,
            })
            .expect_err("invalid");
        match err {
            EngagementError::Validation(errors) => {
                assert!(errors.contains_key("name"));
                assert!(errors.contains_key("email"));
                assert!(errors.contains_key("message"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn only_staff_update_inquiry_status() {
        let (service, listings) = service();
        let buyer = user(1, UserRole::Buyer);
        let admin = user(4, UserRole::Admin);
        let property = listing(&listings, UserId(2), ListingStatus::Published);
        let inquiry = service
            .inquire(&buyer, property.id, inquiry_request("Tour?"))
            .expect("inquire");

        assert!(matches!(
            service.update_status(
                &buyer,
                inquiry.id,
                StatusUpdate {
                    status: InquiryStatus::Contacted
                }
            ),
            Err(EngagementError::Forbidden(_))
        ));

        let updated = service
            .update_status(
                &admin,
                inquiry.id,
                StatusUpdate {
                    status: InquiryStatus::Contacted,
                },
            )
            .expect("admin update");
        assert_eq!(updated.status, InquiryStatus::Contacted);
    }

    #[test]
    fn agents_update_only_their_assigned_listings() {
        let (service, listings) = service();
        let buyer = user(1, UserRole::Buyer);
        let assigned = user(3, UserRole::Agent);
        let outsider = user(5, UserRole::Agent);
        let mut property = listing(&listings, UserId(2), ListingStatus::Published);
        property.agent = Some(assigned.id);
        listings.update(property.clone()).expect("assign agent");

        let inquiry = service
            .inquire(&buyer, property.id, inquiry_request("Tour?"))
            .expect("inquire");

        assert!(matches!(
            service.update_status(
                &outsider,
                inquiry.id,
                StatusUpdate {
                    status: InquiryStatus::Scheduled
                }
            ),
            Err(EngagementError::Forbidden(_))
        ));

        let updated = service
            .update_status(
                &assigned,
                inquiry.id,
                StatusUpdate {
                    status: InquiryStatus::Scheduled,
                },
            )
            .expect("assigned agent update");
        assert_eq!(updated.status, InquiryStatus::Scheduled);
    }
}
