use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::listings::domain::PropertyType;

/// Identifier wrapper for registered users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier wrapper for seller applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Buyer,
    Seller,
    Agent,
    Admin,
    ManagementClient,
}

impl UserRole {
    /// Staff may mutate inquiry statuses.
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Agent)
    }
}

/// A registered account. The password hash never leaves this struct; API
/// responses go through [`UserView`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub phone_number: String,
    pub is_verified: bool,
    pub company_name: String,
    pub license_number: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name: "First Last", falling back to the username.
    pub fn full_name(&self) -> String {
        let joined = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let joined = joined.trim();
        if joined.is_empty() {
            self.username.clone()
        } else {
            joined.to_string()
        }
    }
}

/// Typed buyer search preferences. Known keys are validated at the
/// boundary; unknown keys are dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyerPreferences {
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub price_range_min: Option<Decimal>,
    #[serde(default)]
    pub price_range_max: Option<Decimal>,
    #[serde(default)]
    pub preferred_property_types: Vec<PropertyType>,
}

/// One profile per user, created at registration.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub preferences: BuyerPreferences,
}

impl UserProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: String::new(),
            email_notifications: true,
            sms_notifications: false,
            preferences: BuyerPreferences::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    NeedsMoreInfo,
}

/// Seller application payload, with every field optional at submission
/// time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationData {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub years_experience: Option<u8>,
    #[serde(default)]
    pub message: String,
}

/// A request to be promoted to the seller role. At most one pending
/// application per user; approval performs the promotion.
#[derive(Debug, Clone, Serialize)]
pub struct SellerApplication {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub status: ApplicationStatus,
    pub data: ApplicationData,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<UserId>,
    pub admin_notes: String,
}

/// Sanitized account representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserRole,
    pub phone_number: String,
    pub is_verified: bool,
    pub company_name: String,
    pub license_number: String,
    pub bio: String,
    pub date_joined: DateTime<Utc>,
    pub profile: Option<UserProfile>,
}

impl UserView {
    pub fn from_parts(user: &User, profile: Option<UserProfile>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            user_type: user.role,
            phone_number: user.phone_number.clone(),
            is_verified: user.is_verified,
            company_name: user.company_name.clone(),
            license_number: user.license_number.clone(),
            bio: user.bio.clone(),
            date_joined: user.created_at,
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_falls_back_to_username() {
        let now = Utc::now();
        let mut user = User {
            id: UserId(1),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::Buyer,
            phone_number: String::new(),
            is_verified: false,
            company_name: String::new(),
            license_number: String::new(),
            bio: String::new(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(user.full_name(), "jdoe");

        user.first_name = "Jane".to_string();
        user.last_name = "Doe".to_string();
        assert_eq!(user.full_name(), "Jane Doe");
    }

    #[test]
    fn roles_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&UserRole::ManagementClient).expect("serialize"),
            "\"management_client\""
        );
        assert!(UserRole::Agent.is_staff());
        assert!(!UserRole::Seller.is_staff());
    }
}
