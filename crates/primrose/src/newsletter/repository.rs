use chrono::{DateTime, Utc};

use crate::accounts::domain::UserId;
use crate::store::StoreError;

use super::domain::{NewsletterSubscriber, PopupDismissal};

/// Whether a subscribe call created a row or reactivated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Created,
    Reactivated,
}

/// Storage abstraction for the mailing list and popup dismissals.
///
/// `upsert_subscriber` and `upsert_dismissal` are atomic reactivate-or-
/// create operations: the lookup and the write happen in one store
/// operation.
pub trait NewsletterRepository: Send + Sync {
    /// Subscribe the email: reactivate an existing row in place (clearing
    /// `unsubscribed_at` and adopting the user link when present) or create
    /// a fresh one.
    fn upsert_subscriber(
        &self,
        email: &str,
        user: Option<UserId>,
        at: DateTime<Utc>,
    ) -> Result<(NewsletterSubscriber, SubscribeOutcome), StoreError>;
    /// Deactivate the active row for the email, stamping `unsubscribed_at`.
    /// Fails with `NotFound` when no active row exists.
    fn deactivate_subscriber(
        &self,
        email: &str,
        at: DateTime<Utc>,
    ) -> Result<NewsletterSubscriber, StoreError>;
    /// Record or refresh the dismissal for (session key, user).
    fn upsert_dismissal(
        &self,
        session_key: &str,
        user: Option<UserId>,
        at: DateTime<Utc>,
    ) -> Result<PopupDismissal, StoreError>;
    fn dismissal(
        &self,
        session_key: &str,
        user: Option<UserId>,
    ) -> Result<Option<PopupDismissal>, StoreError>;
}
