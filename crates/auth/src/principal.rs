use core::str::FromStr;

use serde::{Deserialize, Serialize};

use refhub_core::{DomainError, UserId};

use crate::{AccountRole, StaffTier};

/// Lifecycle status of an identity (admin approval workflow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Pending,
    #[serde(alias = "active")]
    Approved,
    Declined,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Approved => "approved",
            AccountStatus::Declined => "declined",
        }
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(AccountStatus::Pending),
            "approved" | "active" => Ok(AccountStatus::Approved),
            "declined" => Ok(AccountStatus::Declined),
            other => Err(DomainError::validation(format!("unknown account status '{other}'"))),
        }
    }
}

/// A fully resolved principal for authorization decisions.
///
/// Built from the *stored* identity, never from client-supplied data, so the
/// role here is the role the policy trusts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: AccountRole,
    pub status: AccountStatus,
    pub is_active: bool,
    /// Present only for admins.
    pub staff_tier: Option<StaffTier>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_superadmin(&self) -> bool {
        self.is_admin() && self.staff_tier == Some(StaffTier::Superadmin)
    }
}
