//! Accounts: registration, sessions, profiles, and seller applications.

pub mod domain;
pub mod memory;
pub mod repository;
pub mod service;
pub mod session;

pub use domain::{User, UserId, UserRole, UserView};
pub use service::{AccountError, AccountService, AuthenticatedUser};
