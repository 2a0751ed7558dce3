//! Authorization policy deciding which listings a caller may see.
//!
//! The policy is a pure function from (caller, action) to a predicate, so it
//! can be tested without touching the store.

use crate::accounts::domain::UserId;

use super::domain::Property;

/// What the caller is about to do with the listings it can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingAction {
    /// Public list/retrieve.
    Read,
    /// Anything that changes state: update, delete, favorite, inquire.
    Mutate,
}

/// Predicate over listings for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Only published listings.
    PublishedOnly,
    /// Published listings plus the caller's own in any status.
    PublishedOrOwned(UserId),
    /// The caller's own listings in any status, nothing else.
    OwnedBy(UserId),
}

impl VisibilityScope {
    pub fn for_caller(caller: Option<UserId>, action: ListingAction) -> Self {
        match (caller, action) {
            (Some(user), ListingAction::Mutate) => Self::PublishedOrOwned(user),
            _ => Self::PublishedOnly,
        }
    }

    pub fn allows(&self, property: &Property) -> bool {
        match self {
            Self::PublishedOnly => property.is_published(),
            Self::PublishedOrOwned(user) => property.is_published() || property.seller == *user,
            Self::OwnedBy(user) => property.seller == *user,
        }
    }
}

/// Lenient parse of the `featured` query parameter: only the well-formed
/// boolean strings narrow the result; anything else applies no filter.
pub fn parse_featured(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
