use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::store::StoreError;

use super::domain::{
    ApplicationData, ApplicationId, ApplicationStatus, SellerApplication, User, UserId,
    UserProfile,
};
use super::repository::{AccountRepository, NewUser};

#[derive(Default)]
struct AccountTables {
    users: HashMap<UserId, User>,
    profiles: HashMap<UserId, UserProfile>,
    applications: HashMap<ApplicationId, SellerApplication>,
    next_user: u64,
    next_application: u64,
}

/// In-memory account store. Uniqueness checks run under the same lock as
/// the insert they guard.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    tables: Mutex<AccountTables>,
}

impl InMemoryAccountRepository {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, AccountTables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("account store mutex poisoned".to_string()))
    }
}

impl AccountRepository for InMemoryAccountRepository {
    fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables
            .users
            .values()
            .any(|existing| existing.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(StoreError::conflict("Username already exists"));
        }
        if tables
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::conflict("Email already exists"));
        }
        tables.next_user += 1;
        let id = UserId(tables.next_user);
        let stored = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            phone_number: user.phone_number,
            is_verified: false,
            company_name: String::new(),
            license_number: String::new(),
            bio: String::new(),
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        tables.users.insert(id, stored.clone());
        tables.profiles.insert(id, UserProfile::new(id));
        Ok(stored)
    }

    fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| user.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    fn update_user(&self, user: User) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        tables.users.insert(user.id, user);
        Ok(())
    }

    fn profile(&self, user: UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.lock()?.profiles.get(&user).cloned())
    }

    fn upsert_profile(&self, profile: UserProfile) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&profile.user_id) {
            return Err(StoreError::NotFound);
        }
        tables.profiles.insert(profile.user_id, profile);
        Ok(())
    }

    fn insert_application(
        &self,
        user: UserId,
        data: ApplicationData,
        submitted_at: DateTime<Utc>,
    ) -> Result<SellerApplication, StoreError> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&user) {
            return Err(StoreError::NotFound);
        }
        if tables
            .applications
            .values()
            .any(|app| app.user_id == user && app.status == ApplicationStatus::Pending)
        {
            return Err(StoreError::conflict(
                "You already have a pending seller application",
            ));
        }
        tables.next_application += 1;
        let application = SellerApplication {
            id: ApplicationId(tables.next_application),
            user_id: user,
            status: ApplicationStatus::Pending,
            data,
            submitted_at,
            reviewed_at: None,
            reviewed_by: None,
            admin_notes: String::new(),
        };
        tables
            .applications
            .insert(application.id, application.clone());
        Ok(application)
    }

    fn application_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<SellerApplication>, StoreError> {
        Ok(self.lock()?.applications.get(&id).cloned())
    }

    fn update_application(&self, application: SellerApplication) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.applications.contains_key(&application.id) {
            return Err(StoreError::NotFound);
        }
        tables.applications.insert(application.id, application);
        Ok(())
    }

    fn applications_for(&self, user: UserId) -> Result<Vec<SellerApplication>, StoreError> {
        let tables = self.lock()?;
        let mut applications: Vec<SellerApplication> = tables
            .applications
            .values()
            .filter(|app| app.user_id == user)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
        Ok(applications)
    }
}
