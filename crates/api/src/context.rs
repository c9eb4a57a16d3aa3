use storefront_core::UserId;

/// Caller identity for a request.
///
/// Resolved once by the middleware and immutable afterwards; every cart and
/// order route requires it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: UserId,
}

impl UserContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
