use chrono::{DateTime, Utc};

use crate::store::StoreError;

use super::domain::{
    ApplicationData, ApplicationId, SellerApplication, User, UserId, UserProfile, UserRole,
};

/// Insert payload for a new account. The id, timestamps, and profile row
/// are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction for accounts, profiles, and seller applications.
///
/// `insert_user` owns the uniqueness checks: it must reject a duplicate
/// username or email with `StoreError::Conflict` naming the field, in one
/// store operation with the insert. `insert_application` likewise rejects a
/// second pending application for the same user.
pub trait AccountRepository: Send + Sync {
    fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
    fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    fn update_user(&self, user: User) -> Result<(), StoreError>;
    fn profile(&self, user: UserId) -> Result<Option<UserProfile>, StoreError>;
    fn upsert_profile(&self, profile: UserProfile) -> Result<(), StoreError>;
    fn insert_application(
        &self,
        user: UserId,
        data: ApplicationData,
        submitted_at: DateTime<Utc>,
    ) -> Result<SellerApplication, StoreError>;
    fn application_by_id(&self, id: ApplicationId)
        -> Result<Option<SellerApplication>, StoreError>;
    fn update_application(&self, application: SellerApplication) -> Result<(), StoreError>;
    /// Applications for one user, newest submission first.
    fn applications_for(&self, user: UserId) -> Result<Vec<SellerApplication>, StoreError>;
}
