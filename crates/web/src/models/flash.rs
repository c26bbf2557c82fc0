//! One-shot notifications shown on the next rendered page.
//!
//! Every failed user action ends in a flash. They are queued in the session,
//! taken when a page renders, and shown as dismissible dialogs.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Success,
    Error,
}

impl FlashLevel {
    /// CSS class suffix used by the stylesheet.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Queue a notification for the next page.
///
/// A storage failure only loses the notification, so it is logged rather
/// than returned.
pub async fn push(session: &Session, flash: Flash) {
    let mut queued: Vec<Flash> = session
        .get(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(flash);

    if let Err(e) = session.insert(session_keys::FLASH, queued).await {
        tracing::warn!(error = %e, "Failed to queue notification");
    }
}

/// Take every queued notification, leaving the queue empty.
pub async fn take(session: &Session) -> Vec<Flash> {
    match session.remove::<Vec<Flash>>(session_keys::FLASH).await {
        Ok(queued) => queued.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable notifications");
            if let Err(e) = session.remove_value(session_keys::FLASH).await {
                tracing::error!(error = %e, "Failed to remove notifications from session");
            }
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flashes_are_taken_once_in_order() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        push(&session, Flash::error("first")).await;
        push(&session, Flash::success("second")).await;

        let taken = take(&session).await;
        assert_eq!(taken, vec![Flash::error("first"), Flash::success("second")]);
        assert!(take(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_queue_is_discarded() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session.insert(session_keys::FLASH, "not a list").await.unwrap();

        assert!(take(&session).await.is_empty());
        assert!(session.get_value(session_keys::FLASH).await.unwrap().is_none());
    }
}
