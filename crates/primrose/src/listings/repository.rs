use crate::accounts::domain::UserId;
use crate::store::StoreError;

use super::domain::{ImageUpload, Property, PropertyId, PropertyImage};

/// Storage abstraction for listings and their images, so the service layer
/// can be exercised against the in-memory implementation or a SQL store.
///
/// `add_image` is the single-primary enforcement point: marking an image
/// primary must clear any previous primary of the same property within the
/// same store operation.
pub trait ListingRepository: Send + Sync {
    /// Persist a new listing, assigning its id.
    fn insert(&self, property: Property) -> Result<Property, StoreError>;
    fn fetch(&self, id: PropertyId) -> Result<Option<Property>, StoreError>;
    fn update(&self, property: Property) -> Result<(), StoreError>;
    /// Remove the listing and its images. Favorites and inquiries are owned
    /// by the engagement store; the service layer drives that part of the
    /// cascade.
    fn delete(&self, id: PropertyId) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<Property>, StoreError>;
    fn by_seller(&self, seller: UserId) -> Result<Vec<Property>, StoreError>;
    /// Bump the view counter without touching `updated_at`.
    fn record_view(&self, id: PropertyId) -> Result<(), StoreError>;
    fn add_image(&self, property: PropertyId, upload: ImageUpload)
        -> Result<PropertyImage, StoreError>;
    /// Images ordered by (order, id).
    fn images_for(&self, property: PropertyId) -> Result<Vec<PropertyImage>, StoreError>;
    fn primary_image(&self, property: PropertyId) -> Result<Option<PropertyImage>, StoreError>;
}
