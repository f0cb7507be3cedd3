use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use refhub_auth::{AccountRole, AccountStatus, StaffTier};
use refhub_core::{DomainError, Email, Entity, FileRef, UserId};

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Canonical authenticated user record.
///
/// # Invariants
/// - `email` is unique and normalized.
/// - `role` never changes after creation.
/// - Identities are never hard-deleted; `status` and `is_active` carry the lifecycle.
/// - `is_staff`/`is_superuser` are only set for admins and follow their staff tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: AccountRole,
    pub status: AccountStatus,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub referral_code: String,
    pub profile_picture: Option<FileRef>,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn new(
        email: Email,
        password_hash: String,
        name: String,
        role: AccountRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email,
            password_hash,
            name,
            role,
            status: AccountStatus::Pending,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            referral_code: generate_referral_code(),
            profile_picture: None,
            date_joined: now,
            last_login: None,
        }
    }

    /// Whether this identity may log in at all.
    pub fn can_authenticate(&self) -> bool {
        self.is_active && self.status != AccountStatus::Declined
    }

    pub fn approve(&mut self) {
        self.status = AccountStatus::Approved;
    }

    pub fn decline(&mut self) {
        self.status = AccountStatus::Declined;
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login = Some(now);
    }

    pub(crate) fn apply_staff_tier(&mut self, tier: Option<StaffTier>) {
        self.is_staff = tier.is_some_and(|t| t.is_staff());
        self.is_superuser = tier.is_some_and(|t| t.is_superuser());
    }
}

impl Entity for Identity {
    const KIND: &'static str = "identity";

    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Short shareable code another user can register with.
pub fn generate_referral_code() -> String {
    // Low bits of a v7 UUID are random.
    let simple = Uuid::now_v7().simple().to_string();
    simple[simple.len() - 10..].to_uppercase()
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    if password.trim().is_empty() {
        return Err(DomainError::validation("password cannot be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::new(
            Email::parse("a@example.com").unwrap(),
            "hash".to_string(),
            "A".to_string(),
            AccountRole::Individual,
            Utc::now(),
        )
    }

    #[test]
    fn new_identity_is_pending_and_active() {
        let id = identity();
        assert_eq!(id.status, AccountStatus::Pending);
        assert!(id.is_active);
        assert!(!id.is_staff && !id.is_superuser);
        assert!(id.can_authenticate());
    }

    #[test]
    fn declined_or_inactive_identity_cannot_authenticate() {
        let mut id = identity();
        id.decline();
        assert!(!id.can_authenticate());

        let mut id = identity();
        id.deactivate();
        assert!(!id.can_authenticate());
        id.activate();
        assert!(id.can_authenticate());
    }

    #[test]
    fn referral_codes_look_random() {
        let a = generate_referral_code();
        let b = generate_referral_code();
        assert_eq!(a.len(), 10);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn password_length_is_enforced() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("        ").is_err());
        assert!(validate_password("long enough").is_ok());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let json = serde_json::to_value(identity()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "individual");
    }
}
