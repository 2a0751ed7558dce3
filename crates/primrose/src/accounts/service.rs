//! Account workflows: registration, login, profile upkeep, and the seller
//! application review queue.

use std::collections::BTreeMap;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ApiError;
use crate::store::StoreError;
use crate::validate::email_is_valid;

use super::domain::{
    ApplicationData, ApplicationId, ApplicationStatus, BuyerPreferences, SellerApplication, User,
    UserId, UserRole, UserView,
};
use super::repository::{AccountRepository, NewUser};
use super::session::SessionStore;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<AccountError> for ApiError {
    fn from(value: AccountError) -> Self {
        match value {
            AccountError::Validation(errors) => ApiError::Validation(errors),
            AccountError::InvalidCredentials => ApiError::Unauthorized,
            AccountError::Forbidden(message) => ApiError::Forbidden(message),
            AccountError::NotFound => ApiError::NotFound("record not found".to_string()),
            AccountError::Store(err) => err.into(),
            AccountError::Hashing(detail) => ApiError::Internal(detail),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub user_type: Option<UserRole>,
    #[serde(default)]
    pub phone_number: String,
}

impl RegisterRequest {
    fn validation_errors(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        if self.username.trim().is_empty() {
            errors.insert("username".to_string(), "username is required".to_string());
        }
        if !email_is_valid(&self.email) {
            errors.insert("email".to_string(), "enter a valid email address".to_string());
        }
        if self.password.len() < MIN_PASSWORD_LENGTH {
            errors.insert(
                "password".to_string(),
                format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Partial update over the account row and its profile. Omitted fields are
/// left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub company_name: Option<String>,
    pub license_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub email_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    pub preferences: Option<BuyerPreferences>,
}

impl ProfileUpdate {
    fn validation_errors(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        if let Some(preferences) = &self.preferences {
            if let (Some(min), Some(max)) =
                (preferences.price_range_min, preferences.price_range_max)
            {
                if min > max {
                    errors.insert(
                        "preferences".to_string(),
                        "price_range_min cannot exceed price_range_max".to_string(),
                    );
                }
            }
            for bound in [preferences.price_range_min, preferences.price_range_max]
                .into_iter()
                .flatten()
            {
                if bound < Decimal::ZERO {
                    errors.insert(
                        "preferences".to_string(),
                        "price range bounds cannot be negative".to_string(),
                    );
                }
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewDecision {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub admin_notes: String,
}

/// Successful registration or login: the account plus its session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: UserView,
    pub token: String,
}

pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AccountError::Hashing(err.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub struct AccountService<R, S> {
    accounts: Arc<R>,
    sessions: Arc<S>,
}

impl<R, S> AccountService<R, S>
where
    R: AccountRepository,
    S: SessionStore,
{
    pub fn new(accounts: Arc<R>, sessions: Arc<S>) -> Self {
        Self { accounts, sessions }
    }

    /// Register an account and log it in.
    ///
    /// Requesting the seller role does not grant it. The account starts as
    /// a buyer with a pending seller application; an admin approval performs
    /// the promotion.
    pub fn register(&self, request: RegisterRequest) -> Result<AuthenticatedUser, AccountError> {
        let errors = request.validation_errors();
        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        let wants_seller = matches!(request.user_type, Some(UserRole::Seller));
        // The admin role is never self-assignable; it only exists through
        // the boot-time bootstrap.
        let role = match request.user_type {
            Some(UserRole::Seller) | Some(UserRole::Admin) | None => UserRole::Buyer,
            Some(other) => other,
        };
        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();
        let user = self.accounts.insert_user(NewUser {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_string(),
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            role,
            phone_number: request.phone_number,
            created_at: now,
        })?;

        if wants_seller {
            self.accounts
                .insert_application(user.id, ApplicationData::default(), now)?;
        }

        let token = self.sessions.create(user.id)?;
        tracing::info!(user = %user.id, username = %user.username, "account registered");
        Ok(AuthenticatedUser {
            user: self.view(&user)?,
            token,
        })
    }

    pub fn login(&self, request: LoginRequest) -> Result<AuthenticatedUser, AccountError> {
        let user = self
            .accounts
            .user_by_username(request.username.trim())?
            .ok_or(AccountError::InvalidCredentials)?;
        if !verify_password(&request.password, &user.password_hash) {
            return Err(AccountError::InvalidCredentials);
        }
        let token = self.sessions.create(user.id)?;
        tracing::info!(user = %user.id, "login succeeded");
        Ok(AuthenticatedUser {
            user: self.view(&user)?,
            token,
        })
    }

    pub fn logout(&self, token: &str) -> Result<(), AccountError> {
        self.sessions.revoke(token)?;
        Ok(())
    }

    /// Resolve a bearer token to its account, or fail as bad credentials.
    pub fn authenticate(&self, token: &str) -> Result<User, AccountError> {
        let user_id = self
            .sessions
            .resolve(token)?
            .ok_or(AccountError::InvalidCredentials)?;
        self.accounts
            .user_by_id(user_id)?
            .ok_or(AccountError::InvalidCredentials)
    }

    pub fn current_user(&self, user: UserId) -> Result<UserView, AccountError> {
        let user = self
            .accounts
            .user_by_id(user)?
            .ok_or(AccountError::NotFound)?;
        self.view(&user)
    }

    pub fn update_profile(
        &self,
        user: UserId,
        update: ProfileUpdate,
    ) -> Result<UserView, AccountError> {
        let errors = update.validation_errors();
        if !errors.is_empty() {
            return Err(AccountError::Validation(errors));
        }

        let mut account = self
            .accounts
            .user_by_id(user)?
            .ok_or(AccountError::NotFound)?;
        let mut profile = self
            .accounts
            .profile(user)?
            .unwrap_or_else(|| super::domain::UserProfile::new(user));

        let mut touched_account = false;
        if let Some(value) = update.first_name {
            account.first_name = value;
            touched_account = true;
        }
        if let Some(value) = update.last_name {
            account.last_name = value;
            touched_account = true;
        }
        if let Some(value) = update.phone_number {
            account.phone_number = value;
            touched_account = true;
        }
        if let Some(value) = update.bio {
            account.bio = value;
            touched_account = true;
        }
        if let Some(value) = update.company_name {
            account.company_name = value;
            touched_account = true;
        }
        if let Some(value) = update.license_number {
            account.license_number = value;
            touched_account = true;
        }
        if touched_account {
            account.updated_at = Utc::now();
            self.accounts.update_user(account.clone())?;
        }

        if let Some(value) = update.address {
            profile.address = value;
        }
        if let Some(value) = update.city {
            profile.city = value;
        }
        if let Some(value) = update.state {
            profile.state = value;
        }
        if let Some(value) = update.zip_code {
            profile.zip_code = value;
        }
        if let Some(value) = update.country {
            profile.country = value;
        }
        if let Some(value) = update.email_notifications {
            profile.email_notifications = value;
        }
        if let Some(value) = update.sms_notifications {
            profile.sms_notifications = value;
        }
        if let Some(value) = update.preferences {
            profile.preferences = value;
        }
        self.accounts.upsert_profile(profile.clone())?;

        Ok(UserView::from_parts(&account, Some(profile)))
    }

    /// Submit a seller application for the calling user. Sellers and admins
    /// have nothing to apply for.
    pub fn apply_seller(
        &self,
        user: UserId,
        data: ApplicationData,
    ) -> Result<SellerApplication, AccountError> {
        let account = self
            .accounts
            .user_by_id(user)?
            .ok_or(AccountError::NotFound)?;
        if matches!(account.role, UserRole::Seller | UserRole::Admin) {
            return Err(AccountError::Forbidden(
                "account already has seller privileges".to_string(),
            ));
        }
        let application = self
            .accounts
            .insert_application(user, data, Utc::now())?;
        tracing::info!(user = %user, application = %application.id.0, "seller application submitted");
        Ok(application)
    }

    pub fn my_applications(&self, user: UserId) -> Result<Vec<SellerApplication>, AccountError> {
        Ok(self.accounts.applications_for(user)?)
    }

    /// Admin review. Approval promotes the applicant to the seller role in
    /// the same call.
    pub fn review_application(
        &self,
        reviewer: &User,
        id: ApplicationId,
        decision: ReviewDecision,
    ) -> Result<SellerApplication, AccountError> {
        if reviewer.role != UserRole::Admin {
            return Err(AccountError::Forbidden(
                "only admins may review seller applications".to_string(),
            ));
        }
        if decision.status == ApplicationStatus::Pending {
            let mut errors = BTreeMap::new();
            errors.insert(
                "status".to_string(),
                "a review must resolve the application".to_string(),
            );
            return Err(AccountError::Validation(errors));
        }

        let mut application = self
            .accounts
            .application_by_id(id)?
            .ok_or(AccountError::NotFound)?;
        application.status = decision.status;
        application.admin_notes = decision.admin_notes;
        application.reviewed_at = Some(Utc::now());
        application.reviewed_by = Some(reviewer.id);
        self.accounts.update_application(application.clone())?;

        if decision.status == ApplicationStatus::Approved {
            let mut applicant = self
                .accounts
                .user_by_id(application.user_id)?
                .ok_or(AccountError::NotFound)?;
            applicant.role = UserRole::Seller;
            applicant.updated_at = Utc::now();
            self.accounts.update_user(applicant)?;
            tracing::info!(user = %application.user_id, "applicant promoted to seller");
        }

        Ok(application)
    }

    /// Seed the admin account at boot. A no-op when the username is taken,
    /// so restarts against a persistent store stay idempotent.
    pub fn bootstrap_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AccountError> {
        if self.accounts.user_by_username(username)?.is_some() {
            return Ok(());
        }
        let password_hash = hash_password(password)?;
        let user = self.accounts.insert_user(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::Admin,
            phone_number: String::new(),
            created_at: Utc::now(),
        })?;
        tracing::info!(user = %user.id, "admin account bootstrapped");
        Ok(())
    }

    fn view(&self, user: &User) -> Result<UserView, AccountError> {
        let profile = self.accounts.profile(user.id)?;
        Ok(UserView::from_parts(user, profile))
    }
}
