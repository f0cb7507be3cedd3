//! Authorization policy.
//!
//! - No IO
//! - No panics
//! - Pure function of (principal, action, resource)

use thiserror::Error;

use refhub_core::UserId;

use crate::{AccountRole, AccountStatus, Action, Principal, Resource, StaffTier};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl AuthzError {
    fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

/// Authorize `action` on `resource` for an (optionally anonymous) principal.
///
/// Inactive identities are treated as unauthenticated. Declined identities may
/// still read what they could read before, but every mutation is denied.
pub fn authorize(
    principal: Option<&Principal>,
    action: Action,
    resource: &Resource,
) -> Result<(), AuthzError> {
    if let Resource::Product { .. } = resource {
        if !action.is_mutation() {
            return Ok(());
        }
    }

    let principal = match principal {
        Some(p) if p.is_active => p,
        _ => return Err(AuthzError::Unauthenticated),
    };

    if action.is_mutation() && principal.status == AccountStatus::Declined {
        return Err(AuthzError::forbidden("account has been declined"));
    }

    match resource {
        Resource::Product { company } => authorize_product(principal, action, *company),
        Resource::SupportTicket { submitter } => authorize_ticket(principal, action, *submitter),
        Resource::UserRanking => {
            if action.is_mutation() && !principal.is_admin() {
                return Err(AuthzError::forbidden("only admins can maintain user rankings"));
            }
            Ok(())
        }
        Resource::Staff { tier } => authorize_staff(principal, *tier),
        Resource::Account { id } => authorize_account(principal, action, *id),
        Resource::Referral | Resource::BankLookup => {
            if action.is_mutation() {
                return Err(AuthzError::forbidden(format!(
                    "{} is read-only",
                    resource.name()
                )));
            }
            Ok(())
        }
    }
}

fn authorize_product(
    principal: &Principal,
    action: Action,
    company: Option<UserId>,
) -> Result<(), AuthzError> {
    match principal.role {
        AccountRole::Admin => Ok(()),
        AccountRole::Company => {
            // Creating with no owner yet means "owned by me".
            let owns = match company {
                Some(owner) => owner == principal.user_id,
                None => action == Action::Create,
            };
            if owns {
                Ok(())
            } else {
                Err(AuthzError::forbidden(format!(
                    "companies can only {} their own products",
                    action.as_str()
                )))
            }
        }
        AccountRole::Individual => Err(AuthzError::forbidden(
            "only companies or admins can manage products",
        )),
    }
}

fn authorize_ticket(
    principal: &Principal,
    action: Action,
    submitter: Option<UserId>,
) -> Result<(), AuthzError> {
    match action {
        Action::Create => {
            if principal.is_admin() {
                Err(AuthzError::forbidden(
                    "only individuals and companies can submit support tickets",
                ))
            } else {
                Ok(())
            }
        }
        Action::List => Ok(()),
        _ => {
            if principal.is_admin() || submitter == Some(principal.user_id) {
                Ok(())
            } else {
                Err(AuthzError::forbidden("ticket belongs to another user"))
            }
        }
    }
}

fn authorize_staff(principal: &Principal, tier: Option<StaffTier>) -> Result<(), AuthzError> {
    if !principal.is_admin() {
        return Err(AuthzError::forbidden("staff management requires an admin"));
    }
    if tier == Some(StaffTier::Superadmin) && !principal.is_superadmin() {
        return Err(AuthzError::forbidden(
            "only a superadmin can grant, revoke or modify the superadmin tier",
        ));
    }
    Ok(())
}

fn authorize_account(
    principal: &Principal,
    action: Action,
    id: Option<UserId>,
) -> Result<(), AuthzError> {
    if principal.is_admin() {
        return Ok(());
    }
    match action {
        Action::Retrieve | Action::Update if id == Some(principal.user_id) => Ok(()),
        _ => Err(AuthzError::forbidden("account administration requires an admin")),
    }
}

/// Scoped visibility for support ticket reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketVisibility {
    All,
    SubmittedBy(UserId),
}

impl TicketVisibility {
    pub fn allows(&self, submitter: UserId) -> bool {
        match self {
            TicketVisibility::All => true,
            TicketVisibility::SubmittedBy(id) => *id == submitter,
        }
    }
}

/// Staff see every ticket; everyone else only their own.
pub fn ticket_visibility(principal: &Principal) -> TicketVisibility {
    if principal.is_admin() {
        TicketVisibility::All
    } else {
        TicketVisibility::SubmittedBy(principal.user_id)
    }
}
