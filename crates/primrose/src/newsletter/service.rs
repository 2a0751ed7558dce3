//! Newsletter workflows: the subscription state machine and the popup
//! suppression window.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::accounts::domain::UserId;
use crate::error::ApiError;
use crate::store::StoreError;
use crate::validate::email_is_valid;

use super::domain::{NewsletterSubscriber, PopupDismissal, PopupStatus};
use super::repository::{NewsletterRepository, SubscribeOutcome};

#[derive(Debug, thiserror::Error)]
pub enum NewsletterError {
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),
    #[error("email not found in our subscription list")]
    UnknownEmail,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<NewsletterError> for ApiError {
    fn from(value: NewsletterError) -> Self {
        match value {
            NewsletterError::Validation(errors) => ApiError::Validation(errors),
            NewsletterError::UnknownEmail => {
                ApiError::NotFound("Email not found in our subscription list".to_string())
            }
            NewsletterError::Store(err) => err.into(),
        }
    }
}

pub struct NewsletterService<R> {
    newsletter: Arc<R>,
}

impl<R> NewsletterService<R>
where
    R: NewsletterRepository,
{
    pub fn new(newsletter: Arc<R>) -> Self {
        Self { newsletter }
    }

    /// Subscribe the email, reactivating a previously unsubscribed row in
    /// place. Subscribing while already active is not an error.
    pub fn subscribe(
        &self,
        email: &str,
        user: Option<UserId>,
    ) -> Result<(NewsletterSubscriber, SubscribeOutcome), NewsletterError> {
        let email = normalize_email(email)?;
        let result = self
            .newsletter
            .upsert_subscriber(&email, user, Utc::now())?;
        tracing::info!(%email, outcome = ?result.1, "newsletter subscription");
        Ok(result)
    }

    pub fn unsubscribe(&self, email: &str) -> Result<NewsletterSubscriber, NewsletterError> {
        let email = normalize_email(email)?;
        match self.newsletter.deactivate_subscriber(&email, Utc::now()) {
            Ok(subscriber) => Ok(subscriber),
            Err(StoreError::NotFound) => Err(NewsletterError::UnknownEmail),
            Err(err) => Err(err.into()),
        }
    }

    /// Record the popup dismissal for (session key, user).
    pub fn dismiss(
        &self,
        session_key: &str,
        user: Option<UserId>,
    ) -> Result<PopupDismissal, NewsletterError> {
        let session_key = session_key.trim();
        if session_key.is_empty() {
            let mut errors = BTreeMap::new();
            errors.insert(
                "session_key".to_string(),
                "session key is required".to_string(),
            );
            return Err(NewsletterError::Validation(errors));
        }
        Ok(self
            .newsletter
            .upsert_dismissal(session_key, user, Utc::now())?)
    }

    /// Whether the popup should show right now. A missing session key
    /// always shows the popup.
    pub fn popup_status(
        &self,
        session_key: Option<&str>,
        user: Option<UserId>,
    ) -> Result<PopupStatus, NewsletterError> {
        self.popup_status_at(session_key, user, Utc::now())
    }

    /// The popup decision evaluated at an explicit instant. The dismissal
    /// timestamp is reported even when the window has lapsed.
    pub fn popup_status_at(
        &self,
        session_key: Option<&str>,
        user: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<PopupStatus, NewsletterError> {
        let Some(session_key) = session_key.map(str::trim).filter(|key| !key.is_empty()) else {
            return Ok(PopupStatus {
                show_popup: true,
                dismissed_at: None,
            });
        };
        let dismissal = self.newsletter.dismissal(session_key, user)?;
        let show_popup = match &dismissal {
            Some(dismissal) => !dismissal.is_valid_at(now),
            None => true,
        };
        Ok(PopupStatus {
            show_popup,
            dismissed_at: dismissal.map(|d| d.dismissed_at),
        })
    }
}

fn normalize_email(email: &str) -> Result<String, NewsletterError> {
    let email = email.trim().to_lowercase();
    if !email_is_valid(&email) {
        let mut errors = BTreeMap::new();
        errors.insert("email".to_string(), "enter a valid email address".to_string());
        return Err(NewsletterError::Validation(errors));
    }
    Ok(email)
}
