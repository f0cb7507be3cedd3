use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use refhub_accounts::{Account, NewStaffForm, StaffUpdate};
use refhub_auth::{hash_password, AccountRole, Action, Resource, StaffTier};
use refhub_core::UserId;

use super::{check, Callers};
use crate::error::ServiceError;
use crate::store::{AccountStore, NewAccount};

/// Staff (admin account) management.
#[derive(Clone)]
pub struct StaffService {
    accounts: Arc<dyn AccountStore>,
    callers: Callers,
}

impl StaffService {
    pub(crate) fn new(accounts: Arc<dyn AccountStore>, callers: Callers) -> Self {
        Self { accounts, callers }
    }

    pub async fn list(&self, caller: Option<UserId>) -> Result<Vec<Account>, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::List, &Resource::Staff { tier: None })?;
        Ok(self.accounts.list_accounts(Some(AccountRole::Admin)).await?)
    }

    pub async fn get(&self, caller: Option<UserId>, id: UserId) -> Result<Account, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::Retrieve, &Resource::Staff { tier: None })?;
        self.load_staff(id).await
    }

    /// Create an admin identity with its staff profile in one write.
    pub async fn create(&self, caller: Option<UserId>, form: NewStaffForm) -> Result<Account, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(
            Some(&principal),
            Action::Create,
            &Resource::Staff {
                tier: Some(form.tier.unwrap_or(StaffTier::Admin)),
            },
        )?;

        let staff = form.validate()?;
        if self.accounts.find_by_email(&staff.email).await?.is_some() {
            return Err(ServiceError::Conflict("email already registered".to_string()));
        }
        let hash = hash_password(&staff.password)?;
        let account = staff.into_account(hash, Utc::now())?;
        let account = self
            .accounts
            .create_account(NewAccount {
                account,
                referral: None,
            })
            .await?;

        info!(
            admin_id = %principal.user_id,
            staff_id = %account.id(),
            tier = ?account.profile().staff_tier(),
            "staff member created"
        );
        Ok(account)
    }

    /// Changing anything about a superadmin, or granting the tier, needs a superadmin.
    pub async fn update(&self, caller: Option<UserId>, id: UserId, update: StaffUpdate) -> Result<Account, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::Update, &Resource::Staff { tier: None })?;

        let mut account = self.load_staff(id).await?;
        let involved = account.profile().staff_tier().max(update.tier);
        check(Some(&principal), Action::Update, &Resource::Staff { tier: involved })?;

        if update.apply(&mut account)? {
            // Tier lives with the access fields, the name with the profile.
            self.accounts.update_access(&account).await?;
            self.accounts.update_profile(&account).await?;
            info!(
                admin_id = %principal.user_id,
                staff_id = %id,
                tier = ?account.profile().staff_tier(),
                "staff member updated"
            );
        }
        Ok(account)
    }

    /// Soft delete: the identity is deactivated, never removed.
    pub async fn deactivate(&self, caller: Option<UserId>, id: UserId) -> Result<Account, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::Delete, &Resource::Staff { tier: None })?;
        if id == principal.user_id {
            return Err(ServiceError::Forbidden("staff cannot deactivate themselves".to_string()));
        }

        let mut account = self.load_staff(id).await?;
        check(
            Some(&principal),
            Action::Delete,
            &Resource::Staff {
                tier: account.profile().staff_tier(),
            },
        )?;
        if account.deactivate() {
            self.accounts.update_access(&account).await?;
            info!(admin_id = %principal.user_id, staff_id = %id, "staff member deactivated");
        }
        Ok(account)
    }

    /// Startup seeding: create a superadmin unless the email is already taken.
    /// Runs outside the authorization policy since there is no caller yet.
    pub async fn ensure_superadmin(&self, email: &str, password: &str) -> Result<Option<Account>, ServiceError> {
        let staff = NewStaffForm {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            name: None,
            tier: Some(StaffTier::Superadmin),
        }
        .validate()?;
        if self.accounts.find_by_email(&staff.email).await?.is_some() {
            return Ok(None);
        }

        let hash = hash_password(&staff.password)?;
        let account = staff.into_account(hash, Utc::now())?;
        let account = self
            .accounts
            .create_account(NewAccount {
                account,
                referral: None,
            })
            .await?;
        info!(staff_id = %account.id(), "bootstrap superadmin created");
        Ok(Some(account))
    }

    async fn load_staff(&self, id: UserId) -> Result<Account, ServiceError> {
        match self.accounts.get_account(id).await? {
            Some(account) if account.role() == AccountRole::Admin => Ok(account),
            _ => Err(ServiceError::NotFound),
        }
    }
}
