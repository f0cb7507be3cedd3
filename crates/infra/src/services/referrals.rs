use std::sync::Arc;

use chrono::Utc;

use refhub_auth::{Action, Resource};
use refhub_core::UserId;
use refhub_referrals::{Referral, Wallet};

use super::{check, Callers};
use crate::error::ServiceError;
use crate::store::ReferralStore;

/// Read side of the referral program.
#[derive(Clone)]
pub struct ReferralService {
    referrals: Arc<dyn ReferralStore>,
    callers: Callers,
}

impl ReferralService {
    pub(crate) fn new(referrals: Arc<dyn ReferralStore>, callers: Callers) -> Self {
        Self { referrals, callers }
    }

    /// Admins see every referral; everyone else the ones they made.
    pub async fn list(&self, caller: Option<UserId>) -> Result<Vec<Referral>, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::List, &Resource::Referral)?;
        let referrer = (!principal.is_admin()).then_some(principal.user_id);
        Ok(self.referrals.list_referrals(referrer).await?)
    }

    /// A caller nobody has been referred by yet has an empty wallet.
    pub async fn wallet(&self, caller: Option<UserId>) -> Result<Wallet, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::Retrieve, &Resource::Referral)?;
        let wallet = self.referrals.get_wallet(principal.user_id).await?;
        Ok(wallet.unwrap_or_else(|| Wallet::empty(principal.user_id, Utc::now())))
    }
}
