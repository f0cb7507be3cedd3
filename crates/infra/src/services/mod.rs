//! Application services.
//!
//! Every call follows the same order: resolve the caller's current account
//! from the store, ask the authorization policy, validate fields, then write.
//! The caller's role always comes from the store, never from the token.

use std::sync::Arc;

use tracing::warn;

use refhub_accounts::Account;
use refhub_auth::{authorize, Action, AuthzError, JwtValidator, Principal, Resource, TokenIssuer};
use refhub_core::UserId;

use crate::bank::BankVerifier;
use crate::error::ServiceError;
use crate::store::{AccountStore, Stores};

pub mod accounts;
pub mod bank;
pub mod products;
pub mod rankings;
pub mod referrals;
pub mod staff;
pub mod tickets;

pub use accounts::{AccountService, LoginOutcome, LoginRequest, Registered};
pub use bank::BankService;
pub use products::ProductService;
pub use rankings::RankingService;
pub use referrals::ReferralService;
pub use staff::StaffService;
pub use tickets::TicketService;

/// All application services, sharing one set of stores.
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub staff: StaffService,
    pub products: ProductService,
    pub tickets: TicketService,
    pub rankings: RankingService,
    pub referrals: ReferralService,
    pub bank: BankService,
}

impl Services {
    pub fn new(
        stores: Stores,
        tokens: TokenIssuer,
        validator: Arc<dyn JwtValidator>,
        bank: Arc<dyn BankVerifier>,
        referral_reward: i64,
    ) -> Self {
        let callers = Callers::new(stores.accounts.clone());
        Self {
            accounts: AccountService::new(
                stores.accounts.clone(),
                callers.clone(),
                Arc::new(tokens),
                validator,
                referral_reward,
            ),
            staff: StaffService::new(stores.accounts.clone(), callers.clone()),
            products: ProductService::new(stores.products, stores.accounts.clone(), callers.clone()),
            tickets: TicketService::new(stores.tickets, callers.clone()),
            rankings: RankingService::new(stores.rankings, callers.clone()),
            referrals: ReferralService::new(stores.referrals, callers.clone()),
            bank: BankService::new(bank, callers),
        }
    }
}

/// Turns the user id from a verified token into the caller's current account.
#[derive(Clone)]
pub(crate) struct Callers {
    accounts: Arc<dyn AccountStore>,
}

impl Callers {
    fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// `None` stays anonymous. A token for a missing or deactivated account is
    /// treated as no authentication at all.
    pub(crate) async fn optional(&self, caller: Option<UserId>) -> Result<Option<Account>, ServiceError> {
        let Some(id) = caller else {
            return Ok(None);
        };
        match self.accounts.get_account(id).await? {
            Some(account) if account.identity().is_active => Ok(Some(account)),
            _ => Err(ServiceError::Unauthenticated),
        }
    }

    pub(crate) async fn require(&self, caller: Option<UserId>) -> Result<Account, ServiceError> {
        self.optional(caller).await?.ok_or(ServiceError::Unauthenticated)
    }
}

/// Run the authorization policy, logging denials.
pub(crate) fn check(principal: Option<&Principal>, action: Action, resource: &Resource) -> Result<(), ServiceError> {
    authorize(principal, action, resource).map_err(|e| {
        if let AuthzError::Forbidden(reason) = &e {
            warn!(
                user_id = ?principal.map(|p| p.user_id),
                action = action.as_str(),
                resource = resource.name(),
                %reason,
                "authorization denied"
            );
        }
        e.into()
    })
}
