use axum::Extension;

use refhub_core::UserId;

/// Authenticated caller, as carried by a verified access token.
///
/// Only the subject is kept. Services re-read the stored account, role
/// included, before authorizing anything.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
}

impl PrincipalContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The caller id handed to services; `None` for anonymous requests.
    pub fn caller(principal: Option<Extension<PrincipalContext>>) -> Option<UserId> {
        principal.map(|Extension(p)| p.user_id)
    }
}
