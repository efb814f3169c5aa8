use uuid::Uuid;

use crate::error::DomainError;

/// The identity a request acts as.
///
/// Passed explicitly into every service call that checks permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User(Uuid),
}

impl Actor {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::Anonymous => None,
            Actor::User(id) => Some(*id),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    /// The acting user's id, or [`DomainError::Unauthenticated`].
    pub fn require_user(&self) -> Result<Uuid, DomainError> {
        self.user_id().ok_or(DomainError::Unauthenticated)
    }

    /// Fail with [`DomainError::Forbidden`] unless the actor is `owner_id`.
    ///
    /// Anonymous actors get [`DomainError::Unauthenticated`] instead.
    pub fn ensure_owner(&self, owner_id: Option<Uuid>) -> Result<Uuid, DomainError> {
        let user_id = self.require_user()?;
        if owner_id == Some(user_id) {
            Ok(user_id)
        } else {
            Err(DomainError::Forbidden)
        }
    }
}

impl From<Option<Uuid>> for Actor {
    fn from(user_id: Option<Uuid>) -> Self {
        user_id.map_or(Actor::Anonymous, Actor::User)
    }
}
