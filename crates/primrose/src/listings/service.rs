//! Listing workflows: create, search, retrieve, update, delete, and image
//! attachment, with the visibility policy applied at every edge.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;

use crate::accounts::domain::{User, UserId, UserRole};
use crate::accounts::repository::AccountRepository;
use crate::engagement::repository::EngagementRepository;
use crate::error::ApiError;
use crate::store::StoreError;

use super::domain::{
    ImageUpload, ListingStatus, NewProperty, Property, PropertyDetail, PropertyId, PropertyImage,
    PropertyPatch, PropertySummary,
};
use super::filter::{ListingFilter, ListingOrdering};
use super::repository::ListingRepository;
use super::visibility::{ListingAction, VisibilityScope};

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),
    #[error("property not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ListingError> for ApiError {
    fn from(value: ListingError) -> Self {
        match value {
            ListingError::Validation(errors) => ApiError::Validation(errors),
            ListingError::NotFound => ApiError::NotFound("property not found".to_string()),
            ListingError::Forbidden(message) => ApiError::Forbidden(message),
            ListingError::Store(err) => err.into(),
        }
    }
}

/// Search parameters after query-string parsing.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub filter: ListingFilter,
    pub featured: Option<bool>,
    pub ordering: ListingOrdering,
}

pub struct ListingService<L, A, E> {
    listings: Arc<L>,
    accounts: Arc<A>,
    engagement: Arc<E>,
}

impl<L, A, E> ListingService<L, A, E>
where
    L: ListingRepository,
    A: AccountRepository,
    E: EngagementRepository,
{
    pub fn new(listings: Arc<L>, accounts: Arc<A>, engagement: Arc<E>) -> Self {
        Self {
            listings,
            accounts,
            engagement,
        }
    }

    /// Create a listing owned by the caller, attaching any inline images.
    pub fn create(
        &self,
        seller: &User,
        payload: NewProperty,
    ) -> Result<PropertyDetail, ListingError> {
        let errors = payload.validation_errors();
        if !errors.is_empty() {
            return Err(ListingError::Validation(errors));
        }

        let now = Utc::now();
        let published = payload.status == ListingStatus::Published;
        let property = Property {
            id: PropertyId(0),
            title: payload.title,
            description: payload.description,
            property_type: payload.property_type,
            status: payload.status,
            address: payload.address,
            city: payload.city,
            state: payload.state,
            zip_code: payload.zip_code,
            latitude: payload.latitude,
            longitude: payload.longitude,
            price: payload.price,
            price_unit: payload.price_unit,
            bedrooms: payload.bedrooms,
            bathrooms: payload.bathrooms,
            square_feet: payload.square_feet,
            lot_size: payload.lot_size,
            year_built: payload.year_built,
            amenities: payload.amenities,
            seller: seller.id,
            agent: payload.agent,
            featured: payload.featured,
            views_count: 0,
            created_at: now,
            updated_at: now,
            published_at: published.then_some(now),
        };
        let property = self.listings.insert(property)?;
        for upload in payload.images {
            self.listings.add_image(property.id, upload)?;
        }
        tracing::info!(property = %property.id, seller = %seller.id, "listing created");
        self.detail_of(property)
    }

    /// Public retrieve. Draft and pending listings look like they do not
    /// exist; views count for everyone but the owner.
    pub fn retrieve(
        &self,
        caller: Option<UserId>,
        id: PropertyId,
    ) -> Result<PropertyDetail, ListingError> {
        let property = self
            .listings
            .fetch(id)?
            .ok_or(ListingError::NotFound)?;
        let scope = VisibilityScope::for_caller(caller, ListingAction::Read);
        if !scope.allows(&property) {
            return Err(ListingError::NotFound);
        }
        let mut property = property;
        if caller != Some(property.seller) {
            self.listings.record_view(property.id)?;
            property.views_count += 1;
        }
        self.detail_of(property)
    }

    /// Published listings matching the query, in the requested order, with
    /// the optional featured flag applied after filtering.
    pub fn search(&self, query: &ListingQuery) -> Result<Vec<PropertySummary>, ListingError> {
        let mut matches: Vec<Property> = self
            .listings
            .list()?
            .into_iter()
            .filter(|property| VisibilityScope::PublishedOnly.allows(property))
            .filter(|property| query.filter.matches(property))
            .filter(|property| match query.featured {
                Some(wanted) => property.featured == wanted,
                None => true,
            })
            .collect();
        query.ordering.sort(&mut matches);
        matches
            .into_iter()
            .map(|property| self.summary_of(property))
            .collect()
    }

    /// The caller's own listings in every status, newest first.
    pub fn my_properties(&self, caller: UserId) -> Result<Vec<PropertySummary>, ListingError> {
        let scope = VisibilityScope::OwnedBy(caller);
        let mut owned: Vec<Property> = self
            .listings
            .by_seller(caller)?
            .into_iter()
            .filter(|property| scope.allows(property))
            .collect();
        ListingOrdering::default().sort(&mut owned);
        owned
            .into_iter()
            .map(|property| self.summary_of(property))
            .collect()
    }

    pub fn update(
        &self,
        caller: &User,
        id: PropertyId,
        patch: PropertyPatch,
    ) -> Result<PropertyDetail, ListingError> {
        let errors = patch.validation_errors();
        if !errors.is_empty() {
            return Err(ListingError::Validation(errors));
        }
        let mut property = self.mutable_fetch(caller, id)?;
        patch.apply(&mut property, Utc::now());
        self.listings.update(property.clone())?;
        self.detail_of(property)
    }

    /// Delete the listing and cascade to its images, favorites, and linked
    /// inquiries.
    pub fn delete(&self, caller: &User, id: PropertyId) -> Result<(), ListingError> {
        let property = self.mutable_fetch(caller, id)?;
        self.listings.delete(property.id)?;
        self.engagement.purge_property(property.id)?;
        tracing::info!(property = %property.id, user = %caller.id, "listing deleted");
        Ok(())
    }

    pub fn add_image(
        &self,
        caller: &User,
        id: PropertyId,
        upload: ImageUpload,
    ) -> Result<PropertyImage, ListingError> {
        if upload.url.trim().is_empty() {
            let mut errors = BTreeMap::new();
            errors.insert("url".to_string(), "this field is required".to_string());
            return Err(ListingError::Validation(errors));
        }
        let property = self.mutable_fetch(caller, id)?;
        Ok(self.listings.add_image(property.id, upload)?)
    }

    /// Fetch for mutation: listings outside the caller's mutate scope look
    /// absent, and visible listings still require ownership or admin.
    fn mutable_fetch(&self, caller: &User, id: PropertyId) -> Result<Property, ListingError> {
        let property = self
            .listings
            .fetch(id)?
            .ok_or(ListingError::NotFound)?;
        let scope = VisibilityScope::for_caller(Some(caller.id), ListingAction::Mutate);
        if !scope.allows(&property) {
            return Err(ListingError::NotFound);
        }
        if property.seller != caller.id && caller.role != UserRole::Admin {
            return Err(ListingError::Forbidden(
                "you do not own this property".to_string(),
            ));
        }
        Ok(property)
    }

    fn seller_name(&self, seller: UserId) -> Result<String, ListingError> {
        Ok(self
            .accounts
            .user_by_id(seller)?
            .map(|user| user.full_name())
            .unwrap_or_default())
    }

    fn detail_of(&self, property: Property) -> Result<PropertyDetail, ListingError> {
        let seller_name = self.seller_name(property.seller)?;
        let images = self.listings.images_for(property.id)?;
        Ok(PropertyDetail {
            property,
            seller_name,
            images,
        })
    }

    fn summary_of(&self, property: Property) -> Result<PropertySummary, ListingError> {
        let seller_name = self.seller_name(property.seller)?;
        let primary_image = self
            .listings
            .primary_image(property.id)?
            .map(|image| image.url);
        Ok(PropertySummary {
            id: property.id,
            title: property.title,
            property_type: property.property_type,
            status: property.status,
            price: property.price,
            price_unit: property.price_unit,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            square_feet: property.square_feet,
            city: property.city,
            state: property.state,
            primary_image,
            seller_name,
            created_at: property.created_at,
            featured: property.featured,
        })
    }
}
