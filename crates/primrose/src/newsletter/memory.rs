use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::accounts::domain::UserId;
use crate::store::StoreError;

use super::domain::{NewsletterSubscriber, PopupDismissal};
use super::repository::{NewsletterRepository, SubscribeOutcome};

#[derive(Default)]
struct NewsletterTables {
    subscribers: HashMap<String, NewsletterSubscriber>,
    dismissals: HashMap<(String, Option<UserId>), PopupDismissal>,
}

/// In-memory newsletter store, keyed by normalized email and by
/// (session key, user).
#[derive(Default)]
pub struct InMemoryNewsletterRepository {
    tables: Mutex<NewsletterTables>,
}

impl InMemoryNewsletterRepository {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, NewsletterTables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("newsletter store mutex poisoned".to_string()))
    }
}

impl NewsletterRepository for InMemoryNewsletterRepository {
    fn upsert_subscriber(
        &self,
        email: &str,
        user: Option<UserId>,
        at: DateTime<Utc>,
    ) -> Result<(NewsletterSubscriber, SubscribeOutcome), StoreError> {
        let mut tables = self.lock()?;
        if let Some(existing) = tables.subscribers.get_mut(email) {
            existing.is_active = true;
            existing.unsubscribed_at = None;
            if user.is_some() {
                existing.user_id = user;
            }
            return Ok((existing.clone(), SubscribeOutcome::Reactivated));
        }
        let subscriber = NewsletterSubscriber {
            email: email.to_string(),
            user_id: user,
            is_active: true,
            subscribed_at: at,
            unsubscribed_at: None,
        };
        tables
            .subscribers
            .insert(email.to_string(), subscriber.clone());
        Ok((subscriber, SubscribeOutcome::Created))
    }

    fn deactivate_subscriber(
        &self,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<NewsletterSubscriber, StoreError> {
        let mut tables = self.lock()?;
        let subscriber = tables
            .subscribers
            .get_mut(email)
            .filter(|subscriber| subscriber.is_active)
            .ok_or(StoreError::NotFound)?;
        subscriber.is_active = false;
        subscriber.unsubscribed_at = Some(at);
        Ok(subscriber.clone())
    }

    fn upsert_dismissal(
        &self,
        session_key: &str,
        user: Option<UserId>,
        at: DateTime<Utc>,
    ) -> Result<PopupDismissal, StoreError> {
        let mut tables = self.lock()?;
        let dismissal = PopupDismissal {
            session_key: session_key.to_string(),
            user_id: user,
            dismissed_at: at,
        };
        tables
            .dismissals
            .insert((session_key.to_string(), user), dismissal.clone());
        Ok(dismissal)
    }

    fn dismissal(
        &self,
        session_key: &str,
        user: Option<UserId>,
    ) -> Result<Option<PopupDismissal>, StoreError> {
        Ok(self
            .lock()?
            .dismissals
            .get(&(session_key.to_string(), user))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resubscribe_reactivates_the_same_row() {
        let repo = InMemoryNewsletterRepository::default();
        let first = Utc::now();
        let (_, outcome) = repo
            .upsert_subscriber("pat@example.com", None, first)
            .expect("subscribe");
        assert_eq!(outcome, SubscribeOutcome::Created);

        repo.deactivate_subscriber("pat@example.com", first + chrono::Duration::days(1))
            .expect("unsubscribe");

        let (row, outcome) = repo
            .upsert_subscriber(
                "pat@example.com",
                Some(UserId(4)),
                first + chrono::Duration::days(2),
            )
            .expect("resubscribe");
        assert_eq!(outcome, SubscribeOutcome::Reactivated);
        assert!(row.is_active);
        assert!(row.unsubscribed_at.is_none());
        assert_eq!(row.user_id, Some(UserId(4)));
        assert_eq!(row.subscribed_at, first, "original subscription date survives");
    }

    #[test]
    fn deactivating_an_inactive_row_is_not_found() {
        let repo = InMemoryNewsletterRepository::default();
        assert!(matches!(
            repo.deactivate_subscriber("ghost@example.com", Utc::now()),
            Err(StoreError::NotFound)
        ));
        repo.upsert_subscriber("pat@example.com", None, Utc::now())
            .expect("subscribe");
        repo.deactivate_subscriber("pat@example.com", Utc::now())
            .expect("unsubscribe");
        assert!(matches!(
            repo.deactivate_subscriber("pat@example.com", Utc::now()),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn dismissals_are_keyed_by_session_and_user() {
        let repo = InMemoryNewsletterRepository::default();
        let now = Utc::now();
        repo.upsert_dismissal("sess-1", None, now).expect("dismiss");
        assert!(repo.dismissal("sess-1", None).expect("fetch").is_some());
        assert!(repo.dismissal("sess-1", Some(UserId(1))).expect("fetch").is_none());
        assert!(repo.dismissal("sess-2", None).expect("fetch").is_none());

        let later = now + chrono::Duration::hours(1);
        let refreshed = repo.upsert_dismissal("sess-1", None, later).expect("dismiss");
        assert_eq!(refreshed.dismissed_at, later);
    }
}
