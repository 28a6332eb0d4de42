//! Identity/session collaborator, used only to stamp `changed_by`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub display_name: String,
}

/// Source of the signed-in user. `None` means no session.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<Identity>;
}

/// Fixed identity (or fixed "no session").
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<Identity>);

impl StaticIdentity {
    pub fn signed_in(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self(Some(Identity {
            id: id.into(),
            display_name: display_name.into(),
        }))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<Identity> {
        self.0.clone()
    }
}
