//! Vocabulary of the authorization policy: what is being done to what.

use refhub_core::UserId;

use crate::StaffTier;

/// Operation a principal wants to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
    /// Lifecycle transition (product status, account approval, ...).
    ChangeStatus,
}

impl Action {
    /// Whether the action writes state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::List | Action::Retrieve)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::ChangeStatus => "change_status",
        }
    }
}

/// Resource being acted on, carrying the ownership facts the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// `company` is the owning company identity, if any.
    Product { company: Option<UserId> },
    /// `submitter` is `None` only for collection-level actions (list/create).
    SupportTicket { submitter: Option<UserId> },
    UserRanking,
    /// `tier` is the highest tier involved: the target's current tier and/or the
    /// tier being granted.
    Staff { tier: Option<StaffTier> },
    /// `id` is the target identity (`None` for collection-level actions).
    Account { id: Option<UserId> },
    Referral,
    BankLookup,
}

impl Resource {
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Product { .. } => "product",
            Resource::SupportTicket { .. } => "support_ticket",
            Resource::UserRanking => "user_ranking",
            Resource::Staff { .. } => "staff",
            Resource::Account { .. } => "account",
            Resource::Referral => "referral",
            Resource::BankLookup => "bank_lookup",
        }
    }
}
