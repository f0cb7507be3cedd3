//! Staff member creation.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use refhub_auth::{AccountRole, StaffTier};
use refhub_core::{DomainError, Email, Fields};

use crate::account::Account;
use crate::identity::{validate_password, Identity};
use crate::profile::{Profile, StaffProfile};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStaffForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    /// Defaults to [`StaffTier::Admin`].
    pub tier: Option<StaffTier>,
}

/// Changes an admin may make to a staff member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub tier: Option<StaffTier>,
}

impl StaffUpdate {
    /// Apply to an admin account; returns whether anything changed.
    pub fn apply(self, account: &mut Account) -> Result<bool, DomainError> {
        let mut fields = Fields::default();
        let name = fields.optional("name", self.name, 100);
        fields.finish()?;

        let mut changed = false;
        if let Some(tier) = self.tier {
            if account.profile().staff_tier() != Some(tier) {
                account.set_staff_tier(tier)?;
                changed = true;
            }
        }
        if let Some(name) = name {
            if account.identity().name != name {
                account.set_name(name);
                changed = true;
            }
        }
        Ok(changed)
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedStaff {
    pub email: Email,
    pub password: String,
    pub name: String,
    pub tier: StaffTier,
}

impl NewStaffForm {
    pub fn validate(self) -> Result<ValidatedStaff, DomainError> {
        let mut fields = Fields::default();
        let email = fields.required("email", self.email, 254);
        let name = fields.optional("name", self.name, 100);
        let password = self.password.filter(|p| !p.is_empty());
        if password.is_none() {
            fields.mark_missing("password");
        }
        fields.finish()?;

        let (Some(email), Some(password)) = (email, password) else {
            return Err(DomainError::invariant("required staff field vanished"));
        };
        let email = Email::parse(&email)?;
        validate_password(&password)?;
        let name = name.unwrap_or_else(|| email.as_str().to_string());

        Ok(ValidatedStaff {
            email,
            password,
            name,
            tier: self.tier.unwrap_or(StaffTier::Admin),
        })
    }
}

impl ValidatedStaff {
    /// Admin identity plus staff profile. Staff accounts start approved.
    pub fn into_account(self, password_hash: String, now: DateTime<Utc>) -> Result<Account, DomainError> {
        let mut identity = Identity::new(self.email, password_hash, self.name, AccountRole::Admin, now);
        identity.approve();
        Account::new(identity, Profile::Admin(StaffProfile { tier: self.tier }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refhub_auth::AccountStatus;

    fn form() -> NewStaffForm {
        NewStaffForm {
            email: Some("Staff@RefHub.io".to_string()),
            password: Some("correct horse".to_string()),
            name: None,
            tier: None,
        }
    }

    #[test]
    fn defaults_to_admin_tier_and_email_name() {
        let staff = form().validate().unwrap();
        assert_eq!(staff.tier, StaffTier::Admin);
        assert_eq!(staff.name, "staff@refhub.io");
    }

    #[test]
    fn missing_credentials_reported() {
        let err = NewStaffForm::default().validate().unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingFields(vec!["email".to_string(), "password".to_string()])
        );
    }

    #[test]
    fn update_changes_tier_and_name() {
        let mut account = form().validate().unwrap().into_account("hash".to_string(), Utc::now()).unwrap();
        let changed = StaffUpdate {
            name: Some("Ops Lead".to_string()),
            tier: Some(StaffTier::Superadmin),
        }
        .apply(&mut account)
        .unwrap();
        assert!(changed);
        assert!(account.identity().is_superuser);
        assert_eq!(account.identity().name, "Ops Lead");

        let unchanged = StaffUpdate {
            name: None,
            tier: Some(StaffTier::Superadmin),
        }
        .apply(&mut account)
        .unwrap();
        assert!(!unchanged);
    }

    #[test]
    fn superadmin_account_flags() {
        let staff = NewStaffForm {
            tier: Some(StaffTier::Superadmin),
            ..form()
        }
        .validate()
        .unwrap();
        let account = staff.into_account("hash".to_string(), Utc::now()).unwrap();
        let identity = account.identity();
        assert_eq!(identity.role, AccountRole::Admin);
        assert_eq!(identity.status, AccountStatus::Approved);
        assert!(identity.is_staff && identity.is_superuser);
    }
}
