//! Process-wide session change notifications.
//!
//! One [`SessionContext`] is created at start-up and shared through the app state.
//! Sign-in, sign-out and role grants are published on it; anything that needs to
//! react holds a [`Subscription`] for as long as it cares. Dropping the
//! subscription (or calling [`Subscription::unsubscribe`]) detaches it.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn { user_id: Uuid, email: String },
    SignedOut { user_id: Uuid },
    RoleGranted { user_id: Uuid, role: String },
}

impl SessionChange {
    pub fn user_id(&self) -> Uuid {
        match self {
            SessionChange::SignedIn { user_id, .. }
            | SessionChange::SignedOut { user_id }
            | SessionChange::RoleGranted { user_id, .. } => *user_id,
        }
    }
}

#[derive(Clone)]
pub struct SessionContext {
    tx: broadcast::Sender<SessionChange>,
}

impl SessionContext {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Deliver to current subscribers. Returns how many received it.
    pub fn publish(&self, change: SessionChange) -> usize {
        log::debug!("Session change: {change:?}");
        self.tx.send(change).unwrap_or(0)
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription { rx: self.tx.subscribe() }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(64)
    }
}

pub struct Subscription {
    rx: broadcast::Receiver<SessionChange>,
}

impl Subscription {
    /// Next change, or `None` once the context is gone. A subscriber that fell
    /// behind skips the changes it missed.
    pub async fn next(&mut self) -> Option<SessionChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Session subscriber lagged, skipped {skipped} change(s)");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

/// Log every change until the context shuts down. Runs for the life of the server.
pub async fn log_changes(mut subscription: Subscription) {
    while let Some(change) = subscription.next().await {
        match change {
            SessionChange::SignedIn { user_id, email } => log::info!("Signed in: {email} ({user_id})"),
            SessionChange::SignedOut { user_id } => log::info!("Signed out: {user_id}"),
            SessionChange::RoleGranted { user_id, role } => log::info!("Role '{role}' granted to {user_id}"),
        }
    }
    log::info!("Session context closed");
}
