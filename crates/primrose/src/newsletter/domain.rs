use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::accounts::domain::UserId;

/// How long a popup dismissal suppresses the newsletter popup.
pub const DISMISSAL_WINDOW_DAYS: i64 = 3;

/// One email on the mailing list. The row survives unsubscription so a
/// later subscribe reactivates it in place.
#[derive(Debug, Clone, Serialize)]
pub struct NewsletterSubscriber {
    pub email: String,
    pub user_id: Option<UserId>,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

/// Popup suppression record, keyed by (session key, user).
#[derive(Debug, Clone, Serialize)]
pub struct PopupDismissal {
    pub session_key: String,
    pub user_id: Option<UserId>,
    pub dismissed_at: DateTime<Utc>,
}

impl PopupDismissal {
    /// A dismissal suppresses the popup for strictly less than the window;
    /// at exactly three days it expires.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now - self.dismissed_at < Duration::days(DISMISSAL_WINDOW_DAYS)
    }
}

/// Answer to a popup status check.
#[derive(Debug, Clone, Serialize)]
pub struct PopupStatus {
    pub show_popup: bool,
    pub dismissed_at: Option<DateTime<Utc>>,
}
