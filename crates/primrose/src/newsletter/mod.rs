//! Newsletter: mailing-list subscriptions and the popup dismissal window.

pub mod domain;
pub mod memory;
pub mod repository;
pub mod service;

pub use domain::{PopupStatus, DISMISSAL_WINDOW_DAYS};
pub use service::{NewsletterError, NewsletterService};
