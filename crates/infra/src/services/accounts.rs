use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use refhub_accounts::{validate_password, Account, ProfileUpdate, RegistrationForm};
use refhub_auth::{
    hash_password, verify_password, AccountRole, Action, JwtValidator, Resource, TokenIssuer, TokenKind,
    TokenPair,
};
use refhub_core::{Email, UserId};
use refhub_referrals::Referral;

use super::{check, Callers};
use crate::error::ServiceError;
use crate::store::{AccountStore, NewAccount};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Accepted for compatibility with older clients and otherwise ignored.
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Registered {
    pub account: Account,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: Account,
    pub tokens: TokenPair,
}

/// Registration, login, token refresh, self-service and account administration.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    callers: Callers,
    tokens: Arc<TokenIssuer>,
    validator: Arc<dyn JwtValidator>,
    referral_reward: i64,
}

impl AccountService {
    pub(crate) fn new(
        accounts: Arc<dyn AccountStore>,
        callers: Callers,
        tokens: Arc<TokenIssuer>,
        validator: Arc<dyn JwtValidator>,
        referral_reward: i64,
    ) -> Self {
        Self {
            accounts,
            callers,
            tokens,
            validator,
            referral_reward,
        }
    }

    /// Create an individual or company account.
    ///
    /// Identity, profile and any referral credit are written in one store call;
    /// on failure nothing is persisted.
    pub async fn register(&self, role: AccountRole, form: RegistrationForm) -> Result<Registered, ServiceError> {
        let registration = form.validate(role)?;

        if self.accounts.find_by_email(&registration.email).await?.is_some() {
            return Err(ServiceError::Conflict("email already registered".to_string()));
        }

        let referrer = match &registration.referral_code {
            Some(code) => match self.accounts.find_by_referral_code(code).await? {
                Some(referrer) => Some(referrer.id()),
                None => return Err(ServiceError::Validation(format!("unknown referral code '{code}'"))),
            },
            None => None,
        };

        let now = Utc::now();
        let hash = hash_password(&registration.password)?;
        let account = registration.into_account(hash, now)?;
        let referral = referrer
            .map(|referrer| Referral::new(referrer, account.id(), self.referral_reward, now))
            .transpose()?;
        let referred_by = referral.as_ref().map(|r| r.referrer);

        let account = self.accounts.create_account(NewAccount { account, referral }).await?;
        let tokens = self.tokens.issue_pair(account.id(), account.role(), now)?;

        info!(
            user_id = %account.id(),
            role = %account.role(),
            referred_by = ?referred_by,
            "account registered"
        );
        Ok(Registered { account, tokens })
    }

    /// Every failure mode answers with the same `InvalidCredentials`.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, ServiceError> {
        let Ok(email) = Email::parse(&request.email) else {
            warn!("login rejected: malformed email");
            return Err(ServiceError::InvalidCredentials);
        };

        let Some(mut account) = self.accounts.find_by_email(&email).await? else {
            warn!("login rejected: unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(&request.password, &account.identity().password_hash)? {
            warn!(user_id = %account.id(), "login rejected: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }
        if !account.can_authenticate() {
            warn!(user_id = %account.id(), "login rejected: account inactive or declined");
            return Err(ServiceError::InvalidCredentials);
        }

        if let Some(declared) = request.role.as_deref() {
            if declared.trim().to_lowercase() != account.role().as_str() {
                debug!(
                    user_id = %account.id(),
                    declared,
                    stored = %account.role(),
                    "ignoring declared role"
                );
            }
        }

        let now = Utc::now();
        self.accounts.record_login(account.id(), now).await?;
        account.record_login(now);
        let tokens = self.tokens.issue_pair(account.id(), account.role(), now)?;

        info!(user_id = %account.id(), role = %account.role(), "login succeeded");
        Ok(LoginOutcome { account, tokens })
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = self.validator.validate(refresh_token, TokenKind::Refresh, now)?;
        match self.accounts.get_account(claims.sub).await? {
            Some(account) if account.can_authenticate() => {
                Ok(self.tokens.issue_access(account.id(), account.role(), now)?)
            }
            _ => Err(ServiceError::Unauthenticated),
        }
    }

    pub async fn me(&self, caller: Option<UserId>) -> Result<Account, ServiceError> {
        let account = self.callers.require(caller).await?;
        check(
            Some(&account.principal()),
            Action::Retrieve,
            &Resource::Account { id: Some(account.id()) },
        )?;
        Ok(account)
    }

    pub async fn update_me(&self, caller: Option<UserId>, update: ProfileUpdate) -> Result<Account, ServiceError> {
        let mut account = self.callers.require(caller).await?;
        check(
            Some(&account.principal()),
            Action::Update,
            &Resource::Account { id: Some(account.id()) },
        )?;
        account.apply_update(update)?;
        self.accounts.update_profile(&account).await?;
        self.accounts
            .get_account(account.id())
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn change_password(
        &self,
        caller: Option<UserId>,
        current: &str,
        new: &str,
    ) -> Result<(), ServiceError> {
        let account = self.callers.require(caller).await?;
        check(
            Some(&account.principal()),
            Action::Update,
            &Resource::Account { id: Some(account.id()) },
        )?;
        if !verify_password(current, &account.identity().password_hash)? {
            warn!(user_id = %account.id(), "password change rejected: wrong current password");
            return Err(ServiceError::Validation("current password is incorrect".to_string()));
        }
        validate_password(new)?;
        self.accounts
            .set_password_hash(account.id(), &hash_password(new)?)
            .await?;
        info!(user_id = %account.id(), "password changed");
        Ok(())
    }

    pub async fn list(&self, caller: Option<UserId>, role: Option<AccountRole>) -> Result<Vec<Account>, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::List, &Resource::Account { id: None })?;
        Ok(self.accounts.list_accounts(role).await?)
    }

    pub async fn get(&self, caller: Option<UserId>, id: UserId) -> Result<Account, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::Retrieve, &Resource::Account { id: Some(id) })?;
        self.accounts.get_account(id).await?.ok_or(ServiceError::NotFound)
    }

    pub async fn approve(&self, caller: Option<UserId>, id: UserId) -> Result<Account, ServiceError> {
        self.change_status(caller, id, "approved", Account::approve).await
    }

    pub async fn decline(&self, caller: Option<UserId>, id: UserId) -> Result<Account, ServiceError> {
        self.change_status(caller, id, "declined", Account::decline).await
    }

    pub async fn activate(&self, caller: Option<UserId>, id: UserId) -> Result<Account, ServiceError> {
        self.change_status(caller, id, "activated", Account::activate).await
    }

    pub async fn deactivate(&self, caller: Option<UserId>, id: UserId) -> Result<Account, ServiceError> {
        self.change_status(caller, id, "deactivated", Account::deactivate).await
    }

    /// Shared path for the admin lifecycle actions. Repeating an action is a no-op.
    async fn change_status(
        &self,
        caller: Option<UserId>,
        id: UserId,
        verb: &'static str,
        apply: fn(&mut Account) -> bool,
    ) -> Result<Account, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::ChangeStatus, &Resource::Account { id: Some(id) })?;
        if id == principal.user_id {
            return Err(ServiceError::Forbidden(format!(
                "admins cannot mark their own account {verb}"
            )));
        }

        let mut account = self.accounts.get_account(id).await?.ok_or(ServiceError::NotFound)?;
        if account.role() == AccountRole::Admin {
            check(
                Some(&principal),
                Action::ChangeStatus,
                &Resource::Staff {
                    tier: account.profile().staff_tier(),
                },
            )?;
        }
        if apply(&mut account) {
            self.accounts.update_access(&account).await?;
            info!(admin_id = %principal.user_id, user_id = %id, status = verb, "account status changed");
        }
        Ok(account)
    }
}
