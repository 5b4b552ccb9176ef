//! Two-step confirmation for destructive actions.
//!
//! The first request for an identity issues a token that expires after the window; a
//! second request inside the window confirms and consumes it. Once the window has passed
//! the next request starts over.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// First request; confirm again before `expires_at`.
    Issued { expires_at: DateTime<Utc> },
    Confirmed,
}

pub struct ConfirmationStore {
    window: Duration,
    pending: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl ConfirmationStore {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_window_secs(secs: i64) -> Self {
        Self::new(Duration::seconds(secs))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register a request from `id` at `now`.
    pub fn confirm(&self, id: &str, now: DateTime<Utc>) -> Confirmation {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        // Drop anything stale so the map does not grow without bound.
        pending.retain(|_, expires_at| *expires_at >= now);
        if pending.remove(id).is_some() {
            return Confirmation::Confirmed;
        }
        let expires_at = now + self.window;
        pending.insert(id.to_string(), expires_at);
        Confirmation::Issued { expires_at }
    }

    /// Forget any pending request from `id`.
    pub fn cancel(&self, id: &str) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(id);
    }

    pub fn is_pending(&self, id: &str, now: DateTime<Utc>) -> bool {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.get(id).is_some_and(|expires_at| *expires_at >= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn second_request_inside_window_confirms() {
        let store = ConfirmationStore::with_window_secs(60);
        assert!(matches!(store.confirm("u1", t0()), Confirmation::Issued { .. }));
        assert_eq!(
            store.confirm("u1", t0() + Duration::seconds(59)),
            Confirmation::Confirmed
        );
        assert!(!store.is_pending("u1", t0() + Duration::seconds(59)));
    }

    #[test]
    fn expired_request_starts_over() {
        let store = ConfirmationStore::with_window_secs(60);
        store.confirm("u1", t0());
        let later = t0() + Duration::seconds(61);
        assert_eq!(
            store.confirm("u1", later),
            Confirmation::Issued {
                expires_at: later + Duration::seconds(60)
            }
        );
        assert_eq!(
            store.confirm("u1", later + Duration::seconds(1)),
            Confirmation::Confirmed
        );
    }

    #[test]
    fn identities_do_not_share_tokens() {
        let store = ConfirmationStore::with_window_secs(60);
        store.confirm("u1", t0());
        assert!(matches!(store.confirm("u2", t0()), Confirmation::Issued { .. }));
        store.cancel("u1");
        assert!(matches!(store.confirm("u1", t0()), Confirmation::Issued { .. }));
    }
}
