//! Session Guard: decides whether the current visitor may see the dashboard.

use crate::models::account::Identity;
use crate::models::role::SUPERVISOR;
use crate::store::RoleStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// Not evaluated yet.
    Loading,
    /// No session; the visitor is sent to the sign-in page.
    Unauthenticated,
    Authorized(Identity),
    /// Signed in but not a supervisor. Only the access-denied view is shown.
    Forbidden(Identity),
}

pub struct SessionGuard<'a> {
    roles: &'a dyn RoleStore,
    state: GuardState,
}

impl<'a> SessionGuard<'a> {
    pub fn new(roles: &'a dyn RoleStore) -> Self {
        Self { roles, state: GuardState::Loading }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Re-run the role check for `identity`. Called on every guarded request, so a
    /// granted or revoked role applies from the next page load.
    pub async fn evaluate(&mut self, identity: Option<Identity>) -> &GuardState {
        self.state = match identity {
            None => GuardState::Unauthenticated,
            Some(identity) => match self.roles.has_role(identity.user_id, SUPERVISOR).await {
                Ok(true) => GuardState::Authorized(identity),
                Ok(false) => GuardState::Forbidden(identity),
                Err(e) => {
                    log::error!("Role check for {} failed: {e}", identity.user_id);
                    GuardState::Forbidden(identity)
                }
            },
        };
        &self.state
    }
}
