//! Persistence ports and their implementations.
//!
//! Services only see the traits below, injected as `Arc<dyn ...>`. Two
//! implementations exist: [`InMemoryStore`] for development and tests, and
//! [`PgStore`] backed by Postgres.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use refhub_accounts::Account;
use refhub_auth::{AccountRole, TicketVisibility};
use refhub_core::{Email, ProductId, RankingId, TicketId, UserId};
use refhub_referrals::{Product, Referral, SupportTicket, UserRanking, Wallet};

use crate::error::StoreError;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Everything written by one registration. Applied all-or-nothing.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account: Account,
    /// Present when the account registered with someone's referral code; the
    /// referrer's wallet is credited with `reward` in the same write.
    pub referral: Option<Referral>,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert identity, profile and optional referral credit atomically.
    ///
    /// Fails with [`StoreError::Conflict`] on a duplicate email, company
    /// registration number or referred identity.
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError>;

    async fn get_account(&self, id: UserId) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError>;

    async fn find_by_referral_code(&self, code: &str) -> Result<Option<Account>, StoreError>;

    /// Persist the self-service fields of `account`: display name, picture
    /// and the individual or company profile. Lifecycle status, activation,
    /// credentials and staff tier keep their stored values.
    async fn update_profile(&self, account: &Account) -> Result<(), StoreError>;

    /// Persist the admin-controlled fields of `account`: lifecycle status,
    /// activation and staff tier (with the flags derived from it).
    async fn update_access(&self, account: &Account) -> Result<(), StoreError>;

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), StoreError>;

    /// Stamp `last_login` and nothing else.
    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn list_accounts(&self, role: Option<AccountRole>) -> Result<Vec<Account>, StoreError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    async fn update_product(&self, product: &Product) -> Result<(), StoreError>;
    /// Returns whether a row was removed.
    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError>;
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn insert_ticket(&self, ticket: &SupportTicket) -> Result<(), StoreError>;
    async fn get_ticket(&self, id: TicketId) -> Result<Option<SupportTicket>, StoreError>;
    async fn update_ticket(&self, ticket: &SupportTicket) -> Result<(), StoreError>;
    async fn delete_ticket(&self, id: TicketId) -> Result<bool, StoreError>;
    async fn list_tickets(&self, visibility: TicketVisibility) -> Result<Vec<SupportTicket>, StoreError>;
}

#[async_trait]
pub trait RankingStore: Send + Sync {
    async fn insert_ranking(&self, ranking: &UserRanking) -> Result<(), StoreError>;
    async fn get_ranking(&self, id: RankingId) -> Result<Option<UserRanking>, StoreError>;
    async fn update_ranking(&self, ranking: &UserRanking) -> Result<(), StoreError>;
    async fn delete_ranking(&self, id: RankingId) -> Result<bool, StoreError>;
    async fn list_rankings(&self) -> Result<Vec<UserRanking>, StoreError>;
}

#[async_trait]
pub trait ReferralStore: Send + Sync {
    /// `referrer = None` lists every referral.
    async fn list_referrals(&self, referrer: Option<UserId>) -> Result<Vec<Referral>, StoreError>;
    async fn get_wallet(&self, owner: UserId) -> Result<Option<Wallet>, StoreError>;
}

/// The full set of stores a deployment runs with.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub products: Arc<dyn ProductStore>,
    pub tickets: Arc<dyn TicketStore>,
    pub rankings: Arc<dyn RankingStore>,
    pub referrals: Arc<dyn ReferralStore>,
}

impl Stores {
    /// Every port served by one backend.
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: AccountStore + ProductStore + TicketStore + RankingStore + ReferralStore + 'static,
    {
        Self {
            accounts: backend.clone(),
            products: backend.clone(),
            tickets: backend.clone(),
            rankings: backend.clone(),
            referrals: backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(InMemoryStore::new()))
    }
}
