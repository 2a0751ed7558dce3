use std::collections::HashMap;
use std::sync::Mutex;

use crate::accounts::domain::UserId;
use crate::store::StoreError;

use super::domain::{ImageId, ImageUpload, Property, PropertyId, PropertyImage};
use super::repository::ListingRepository;

#[derive(Default)]
struct ListingTables {
    properties: HashMap<PropertyId, Property>,
    images: HashMap<ImageId, PropertyImage>,
    next_property: u64,
    next_image: u64,
}

/// In-memory listing store. Every trait method takes the lock once, which
/// is what makes `add_image`'s primary swap and `delete`'s image cascade
/// atomic with respect to concurrent requests.
#[derive(Default)]
pub struct InMemoryListingRepository {
    tables: Mutex<ListingTables>,
}

impl InMemoryListingRepository {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ListingTables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("listing store mutex poisoned".to_string()))
    }
}

impl ListingRepository for InMemoryListingRepository {
    fn insert(&self, mut property: Property) -> Result<Property, StoreError> {
        let mut tables = self.lock()?;
        tables.next_property += 1;
        property.id = PropertyId(tables.next_property);
        tables.properties.insert(property.id, property.clone());
        Ok(property)
    }

    fn fetch(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        Ok(self.lock()?.properties.get(&id).cloned())
    }

    fn update(&self, property: Property) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.properties.contains_key(&property.id) {
            return Err(StoreError::NotFound);
        }
        tables.properties.insert(property.id, property);
        Ok(())
    }

    fn delete(&self, id: PropertyId) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.properties.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        tables.images.retain(|_, image| image.property_id != id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Property>, StoreError> {
        Ok(self.lock()?.properties.values().cloned().collect())
    }

    fn by_seller(&self, seller: UserId) -> Result<Vec<Property>, StoreError> {
        Ok(self
            .lock()?
            .properties
            .values()
            .filter(|property| property.seller == seller)
            .cloned()
            .collect())
    }

    fn record_view(&self, id: PropertyId) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let property = tables.properties.get_mut(&id).ok_or(StoreError::NotFound)?;
        property.views_count += 1;
        Ok(())
    }

    fn add_image(
        &self,
        property: PropertyId,
        upload: ImageUpload,
    ) -> Result<PropertyImage, StoreError> {
        let mut tables = self.lock()?;
        if !tables.properties.contains_key(&property) {
            return Err(StoreError::NotFound);
        }
        if upload.is_primary {
            for image in tables.images.values_mut() {
                if image.property_id == property {
                    image.is_primary = false;
                }
            }
        }
        tables.next_image += 1;
        let image = PropertyImage {
            id: ImageId(tables.next_image),
            property_id: property,
            url: upload.url,
            caption: upload.caption,
            is_primary: upload.is_primary,
            order: upload.order,
        };
        tables.images.insert(image.id, image.clone());
        Ok(image)
    }

    fn images_for(&self, property: PropertyId) -> Result<Vec<PropertyImage>, StoreError> {
        let tables = self.lock()?;
        let mut images: Vec<PropertyImage> = tables
            .images
            .values()
            .filter(|image| image.property_id == property)
            .cloned()
            .collect();
        images.sort_by_key(|image| (image.order, image.id));
        Ok(images)
    }

    fn primary_image(&self, property: PropertyId) -> Result<Option<PropertyImage>, StoreError> {
        Ok(self
            .lock()?
            .images
            .values()
            .find(|image| image.property_id == property && image.is_primary)
            .cloned())
    }
}
