//! Search filter layer: request parameters become conjunctive predicates
//! over listings, plus the ordering overrides callers may request.

use rust_decimal::Decimal;

use super::domain::{Property, PropertyType};

/// Every provided field is an AND constraint; omitted fields constrain
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub property_types: Vec<PropertyType>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<Decimal>,
    pub min_square_feet: Option<u32>,
    pub has_garage: Option<bool>,
    pub has_pool: Option<bool>,
    pub has_garden: Option<bool>,
    pub search: Option<String>,
}

impl ListingFilter {
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(min) = self.min_price {
            if property.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if property.price > max {
                return false;
            }
        }
        if !self.property_types.is_empty() && !self.property_types.contains(&property.property_type)
        {
            return false;
        }
        if let Some(city) = &self.city {
            if !contains_ci(&property.city, city) {
                return false;
            }
        }
        if let Some(state) = &self.state {
            if !contains_ci(&property.state, state) {
                return false;
            }
        }
        if let Some(min) = self.min_bedrooms {
            if property.bedrooms.unwrap_or(0) < min {
                return false;
            }
        }
        if let Some(min) = self.min_bathrooms {
            if property.bathrooms.unwrap_or(Decimal::ZERO) < min {
                return false;
            }
        }
        if let Some(min) = self.min_square_feet {
            if property.square_feet.unwrap_or(0) < min {
                return false;
            }
        }
        if let Some(wanted) = self.has_garage {
            if property.amenities.has_garage != wanted {
                return false;
            }
        }
        if let Some(wanted) = self.has_pool {
            if property.amenities.has_pool != wanted {
                return false;
            }
        }
        if let Some(wanted) = self.has_garden {
            if property.amenities.has_garden != wanted {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.trim();
            if !needle.is_empty()
                && ![
                    &property.title,
                    &property.description,
                    &property.address,
                    &property.city,
                    &property.state,
                ]
                .iter()
                .any(|haystack| contains_ci(haystack, needle))
            {
                return false;
            }
        }
        true
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Price,
    SquareFeet,
    Bedrooms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering override, parsed from the DRF-style `ordering` parameter
/// (`price`, `-price`, `created_at`, `square_feet`, `bedrooms`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOrdering {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for ListingOrdering {
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            direction: SortDirection::Descending,
        }
    }
}

impl ListingOrdering {
    /// Unknown keys fall back to newest-created-first.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (direction, key) = match raw.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest),
            None => (SortDirection::Ascending, raw),
        };
        let key = match key {
            "created_at" => SortKey::CreatedAt,
            "price" => SortKey::Price,
            "square_feet" => SortKey::SquareFeet,
            "bedrooms" => SortKey::Bedrooms,
            _ => return Self::default(),
        };
        Self { key, direction }
    }

    pub fn sort(&self, items: &mut [Property]) {
        items.sort_by(|a, b| {
            let ordering = match self.key {
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                SortKey::Price => a.price.cmp(&b.price),
                SortKey::SquareFeet => a.square_feet.unwrap_or(0).cmp(&b.square_feet.unwrap_or(0)),
                SortKey::Bedrooms => a.bedrooms.unwrap_or(0).cmp(&b.bedrooms.unwrap_or(0)),
            };
            match self.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
}
