use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use refhub_auth::{Action, Resource};
use refhub_core::{RankingId, UserId};
use refhub_referrals::{RankingForm, UserRanking};

use super::{check, Callers};
use crate::error::ServiceError;
use crate::store::RankingStore;

/// Leaderboard entries: readable by any signed-in user, maintained by admins.
#[derive(Clone)]
pub struct RankingService {
    rankings: Arc<dyn RankingStore>,
    callers: Callers,
}

impl RankingService {
    pub(crate) fn new(rankings: Arc<dyn RankingStore>, callers: Callers) -> Self {
        Self { rankings, callers }
    }

    pub async fn list(&self, caller: Option<UserId>) -> Result<Vec<UserRanking>, ServiceError> {
        self.authorize(caller, Action::List).await?;
        Ok(self.rankings.list_rankings().await?)
    }

    pub async fn get(&self, caller: Option<UserId>, id: RankingId) -> Result<UserRanking, ServiceError> {
        self.authorize(caller, Action::Retrieve).await?;
        self.rankings.get_ranking(id).await?.ok_or(ServiceError::NotFound)
    }

    pub async fn create(&self, caller: Option<UserId>, form: RankingForm) -> Result<UserRanking, ServiceError> {
        let admin = self.authorize(caller, Action::Create).await?;
        let ranking = UserRanking::create(form, Utc::now())?;
        self.rankings.insert_ranking(&ranking).await?;
        info!(admin_id = %admin, ranking_id = %ranking.id, tier = %ranking.name, "user ranking created");
        Ok(ranking)
    }

    pub async fn replace(&self, caller: Option<UserId>, id: RankingId, form: RankingForm) -> Result<UserRanking, ServiceError> {
        self.authorize(caller, Action::Update).await?;
        let mut ranking = self.rankings.get_ranking(id).await?.ok_or(ServiceError::NotFound)?;
        ranking.replace(form)?;
        self.rankings.update_ranking(&ranking).await?;
        Ok(ranking)
    }

    pub async fn patch(&self, caller: Option<UserId>, id: RankingId, form: RankingForm) -> Result<UserRanking, ServiceError> {
        self.authorize(caller, Action::Update).await?;
        let mut ranking = self.rankings.get_ranking(id).await?.ok_or(ServiceError::NotFound)?;
        ranking.patch(form)?;
        self.rankings.update_ranking(&ranking).await?;
        Ok(ranking)
    }

    pub async fn delete(&self, caller: Option<UserId>, id: RankingId) -> Result<(), ServiceError> {
        let admin = self.authorize(caller, Action::Delete).await?;
        if !self.rankings.delete_ranking(id).await? {
            return Err(ServiceError::NotFound);
        }
        info!(admin_id = %admin, ranking_id = %id, "user ranking deleted");
        Ok(())
    }

    async fn authorize(&self, caller: Option<UserId>, action: Action) -> Result<UserId, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), action, &Resource::UserRanking)?;
        Ok(principal.user_id)
    }
}
