//! Property listings: the catalog, its search surface, and the visibility
//! policy that keeps drafts private.

pub mod domain;
pub mod filter;
pub mod memory;
pub mod repository;
pub mod service;
pub mod visibility;

pub use domain::{Property, PropertyDetail, PropertyId, PropertySummary};
pub use service::{ListingError, ListingQuery, ListingService};
