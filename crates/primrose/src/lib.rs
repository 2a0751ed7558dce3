//! Core domain library for the Primrose real-estate listing platform.
//!
//! Each top-level module owns one store: `accounts` (users, profiles, seller
//! applications, sessions), `listings` (properties and their images, the
//! search filter layer, and the visibility policy), `engagement` (favorites
//! and inquiries), and `newsletter` (subscribers and popup dismissals).
//! Storage sits behind per-store repository traits; the shipped
//! implementations are in-memory maps where every logical operation runs
//! under a single lock acquisition, which is what gives the toggle/upsert
//! operations their single-transaction semantics.

pub mod accounts;
pub mod config;
pub mod engagement;
pub mod error;
pub mod listings;
pub mod newsletter;
pub mod store;
pub mod telemetry;
pub mod validate;
