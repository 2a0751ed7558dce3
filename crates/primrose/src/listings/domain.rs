use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::domain::UserId;

/// Identifier wrapper for listed properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier wrapper for listing images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Land,
    Commercial,
    Rental,
    Apartment,
    Sale,
}

impl FromStr for PropertyType {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "land" => Ok(Self::Land),
            "commercial" => Ok(Self::Commercial),
            "rental" => Ok(Self::Rental),
            "apartment" => Ok(Self::Apartment),
            "sale" => Ok(Self::Sale),
            _ => Err(()),
        }
    }
}

/// Lifecycle state of a listing. Only `Published` listings are publicly
/// visible; owners see the rest of their own through owner-scoped reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Draft,
    Pending,
    Published,
    Sold,
    Rented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceUnit {
    #[default]
    Total,
    PerSqft,
    PerMonth,
}

/// The five amenity flags carried by every listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenities {
    #[serde(default)]
    pub has_garage: bool,
    #[serde(default)]
    pub has_pool: bool,
    #[serde(default)]
    pub has_garden: bool,
    #[serde(default)]
    pub has_fireplace: bool,
    #[serde(default)]
    pub has_central_air: bool,
}

/// A property listing. Owned by exactly one seller; destroyed only by an
/// explicit delete, which cascades to images, favorites, and inquiries.
#[derive(Debug, Clone, Serialize)]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: Decimal,
    pub price_unit: PriceUnit,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<Decimal>,
    pub square_feet: Option<u32>,
    pub lot_size: Option<Decimal>,
    pub year_built: Option<i32>,
    #[serde(flatten)]
    pub amenities: Amenities,
    pub seller: UserId,
    pub agent: Option<UserId>,
    pub featured: bool,
    pub views_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Property {
    pub fn is_published(&self) -> bool {
        self.status == ListingStatus::Published
    }
}

/// Image reference attached to a listing. File storage lives elsewhere;
/// listings carry URLs only.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyImage {
    pub id: ImageId,
    pub property_id: PropertyId,
    pub url: String,
    pub caption: String,
    pub is_primary: bool,
    pub order: i32,
}

/// Inbound payload for creating a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    #[serde(default)]
    pub status: ListingStatus,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub price: Decimal,
    #[serde(default)]
    pub price_unit: PriceUnit,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<Decimal>,
    #[serde(default)]
    pub square_feet: Option<u32>,
    #[serde(default)]
    pub lot_size: Option<Decimal>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(flatten)]
    pub amenities: Amenities,
    #[serde(default)]
    pub agent: Option<UserId>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<ImageUpload>,
}

impl NewProperty {
    /// Field-level validation for creation; an empty map means valid.
    pub fn validation_errors(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        require_text(&mut errors, "title", &self.title);
        require_text(&mut errors, "description", &self.description);
        require_text(&mut errors, "address", &self.address);
        require_text(&mut errors, "city", &self.city);
        require_text(&mut errors, "state", &self.state);
        require_text(&mut errors, "zip_code", &self.zip_code);
        if let Some(message) = price_error(self.price) {
            errors.insert("price".to_string(), message);
        }
        errors
    }
}

/// Inbound payload for attaching an image to a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpload {
    pub url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub order: i32,
}

/// Partial update: absent fields leave the listing untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<PropertyType>,
    pub status: Option<ListingStatus>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: Option<Decimal>,
    pub price_unit: Option<PriceUnit>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<Decimal>,
    pub square_feet: Option<u32>,
    pub lot_size: Option<Decimal>,
    pub year_built: Option<i32>,
    pub has_garage: Option<bool>,
    pub has_pool: Option<bool>,
    pub has_garden: Option<bool>,
    pub has_fireplace: Option<bool>,
    pub has_central_air: Option<bool>,
    pub agent: Option<UserId>,
    pub featured: Option<bool>,
}

impl PropertyPatch {
    pub fn validation_errors(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        if let Some(price) = self.price {
            if let Some(message) = price_error(price) {
                errors.insert("price".to_string(), message);
            }
        }
        if let Some(title) = &self.title {
            require_text(&mut errors, "title", title);
        }
        errors
    }

    /// Fold the patch into an existing listing. Returns true when the
    /// status transitioned to `Published` for the first time.
    pub fn apply(&self, property: &mut Property, now: DateTime<Utc>) -> bool {
        let mut newly_published = false;
        if let Some(value) = &self.title {
            property.title = value.clone();
        }
        if let Some(value) = &self.description {
            property.description = value.clone();
        }
        if let Some(value) = self.property_type {
            property.property_type = value;
        }
        if let Some(value) = self.status {
            if value == ListingStatus::Published && property.published_at.is_none() {
                property.published_at = Some(now);
                newly_published = true;
            }
            property.status = value;
        }
        if let Some(value) = &self.address {
            property.address = value.clone();
        }
        if let Some(value) = &self.city {
            property.city = value.clone();
        }
        if let Some(value) = &self.state {
            property.state = value.clone();
        }
        if let Some(value) = &self.zip_code {
            property.zip_code = value.clone();
        }
        if let Some(value) = self.latitude {
            property.latitude = Some(value);
        }
        if let Some(value) = self.longitude {
            property.longitude = Some(value);
        }
        if let Some(value) = self.price {
            property.price = value;
        }
        if let Some(value) = self.price_unit {
            property.price_unit = value;
        }
        if let Some(value) = self.bedrooms {
            property.bedrooms = Some(value);
        }
        if let Some(value) = self.bathrooms {
            property.bathrooms = Some(value);
        }
        if let Some(value) = self.square_feet {
            property.square_feet = Some(value);
        }
        if let Some(value) = self.lot_size {
            property.lot_size = Some(value);
        }
        if let Some(value) = self.year_built {
            property.year_built = Some(value);
        }
        if let Some(value) = self.has_garage {
            property.amenities.has_garage = value;
        }
        if let Some(value) = self.has_pool {
            property.amenities.has_pool = value;
        }
        if let Some(value) = self.has_garden {
            property.amenities.has_garden = value;
        }
        if let Some(value) = self.has_fireplace {
            property.amenities.has_fireplace = value;
        }
        if let Some(value) = self.has_central_air {
            property.amenities.has_central_air = value;
        }
        if let Some(value) = self.agent {
            property.agent = Some(value);
        }
        if let Some(value) = self.featured {
            property.featured = value;
        }
        property.updated_at = now;
        newly_published
    }
}

/// Compact row for list/search responses.
#[derive(Debug, Clone, Serialize)]
pub struct PropertySummary {
    pub id: PropertyId,
    pub title: String,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    pub price: Decimal,
    pub price_unit: PriceUnit,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<Decimal>,
    pub square_feet: Option<u32>,
    pub city: String,
    pub state: String,
    pub primary_image: Option<String>,
    pub seller_name: String,
    pub created_at: DateTime<Utc>,
    pub featured: bool,
}

/// Full row for detail responses, images included.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub property: Property,
    pub seller_name: String,
    pub images: Vec<PropertyImage>,
}

fn require_text(errors: &mut BTreeMap<String, String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), "this field is required".to_string());
    }
}

fn price_error(price: Decimal) -> Option<String> {
    if price <= Decimal::ZERO {
        Some("must be greater than zero".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewProperty {
        NewProperty {
            title: "Sunny bungalow".to_string(),
            description: "Two bedrooms near the park".to_string(),
            property_type: PropertyType::Sale,
            status: ListingStatus::default(),
            address: "12 Elm St".to_string(),
            city: "Des Moines".to_string(),
            state: "IA".to_string(),
            zip_code: "50309".to_string(),
            latitude: None,
            longitude: None,
            price: Decimal::new(250_000, 0),
            price_unit: PriceUnit::default(),
            bedrooms: Some(2),
            bathrooms: Some(Decimal::new(15, 1)),
            square_feet: Some(1400),
            lot_size: None,
            year_built: Some(1962),
            amenities: Amenities::default(),
            agent: None,
            featured: false,
            images: Vec::new(),
        }
    }

    #[test]
    fn one_cent_price_is_valid_but_zero_is_not() {
        let mut payload = draft();
        payload.price = Decimal::new(1, 2);
        assert!(payload.validation_errors().is_empty());

        payload.price = Decimal::ZERO;
        let errors = payload.validation_errors();
        assert_eq!(
            errors.get("price").map(String::as_str),
            Some("must be greater than zero")
        );

        payload.price = Decimal::new(-5, 0);
        assert!(payload.validation_errors().contains_key("price"));
    }

    #[test]
    fn missing_required_fields_are_reported_per_field() {
        let mut payload = draft();
        payload.title = "  ".to_string();
        payload.city = String::new();
        let errors = payload.validation_errors();
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("city"));
        assert!(!errors.contains_key("state"));
    }

    #[test]
    fn patch_stamps_published_at_exactly_once() {
        let now = Utc::now();
        let mut property = Property {
            id: PropertyId(1),
            title: "Loft".to_string(),
            description: "Open plan".to_string(),
            property_type: PropertyType::Apartment,
            status: ListingStatus::Draft,
            address: "1 Main".to_string(),
            city: "Ames".to_string(),
            state: "IA".to_string(),
            zip_code: "50010".to_string(),
            latitude: None,
            longitude: None,
            price: Decimal::new(1200, 0),
            price_unit: PriceUnit::PerMonth,
            bedrooms: Some(1),
            bathrooms: None,
            square_feet: None,
            lot_size: None,
            year_built: None,
            amenities: Amenities::default(),
            seller: UserId(7),
            agent: None,
            featured: false,
            views_count: 0,
            created_at: now,
            updated_at: now,
            published_at: None,
        };

        let patch = PropertyPatch {
            status: Some(ListingStatus::Published),
            ..PropertyPatch::default()
        };
        let later = now + chrono::Duration::hours(1);
        assert!(patch.apply(&mut property, later));
        assert_eq!(property.published_at, Some(later));

        let relist = PropertyPatch {
            status: Some(ListingStatus::Published),
            ..PropertyPatch::default()
        };
        let much_later = now + chrono::Duration::days(2);
        assert!(!relist.apply(&mut property, much_later));
        assert_eq!(property.published_at, Some(later), "first stamp is kept");
    }
}
