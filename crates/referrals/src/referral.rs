use chrono::{DateTime, Utc};
use serde::Serialize;

use refhub_core::{DomainError, Entity, ReferralId, UserId};

/// Record that `referred` registered with `referrer`'s code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Referral {
    pub id: ReferralId,
    pub referrer: UserId,
    /// Unique: an identity is referred at most once.
    pub referred: UserId,
    pub reward: i64,
    pub created_at: DateTime<Utc>,
}

impl Referral {
    pub fn new(referrer: UserId, referred: UserId, reward: i64, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if referrer == referred {
            return Err(DomainError::validation("an account cannot refer itself"));
        }
        if reward < 0 {
            return Err(DomainError::validation("referral reward cannot be negative"));
        }
        Ok(Self {
            id: ReferralId::new(),
            referrer,
            referred,
            reward,
            created_at: now,
        })
    }
}

impl Entity for Referral {
    const KIND: &'static str = "referral";

    type Id = ReferralId;

    fn id(&self) -> ReferralId {
        self.id
    }
}

/// Referral earnings in minor units. A missing wallet reads as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wallet {
    pub owner: UserId,
    pub balance: i64,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn empty(owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            owner,
            balance: 0,
            updated_at: now,
        }
    }

    pub fn credit(&mut self, amount: i64, now: DateTime<Utc>) -> Result<(), DomainError> {
        if amount < 0 {
            return Err(DomainError::validation("credit amount cannot be negative"));
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| DomainError::invariant("wallet balance overflow"))?;
        self.updated_at = now;
        Ok(())
    }
}
