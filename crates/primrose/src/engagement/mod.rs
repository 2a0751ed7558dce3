//! Engagement: favorites, listing inquiries, and the public contact form.

pub mod domain;
pub mod memory;
pub mod repository;
pub mod service;

pub use domain::{Favorite, FavoriteToggle, Inquiry, InquiryId};
pub use service::{EngagementError, EngagementService};
