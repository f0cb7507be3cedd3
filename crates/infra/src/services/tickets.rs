use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use refhub_auth::{ticket_visibility, Action, Principal, Resource};
use refhub_core::{TicketId, UserId};
use refhub_referrals::{SupportTicket, TicketForm};

use super::{check, Callers};
use crate::error::ServiceError;
use crate::store::TicketStore;

/// Support tickets, scoped to their submitter unless the caller is staff.
#[derive(Clone)]
pub struct TicketService {
    tickets: Arc<dyn TicketStore>,
    callers: Callers,
}

impl TicketService {
    pub(crate) fn new(tickets: Arc<dyn TicketStore>, callers: Callers) -> Self {
        Self { tickets, callers }
    }

    pub async fn list(&self, caller: Option<UserId>) -> Result<Vec<SupportTicket>, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::List, &Resource::SupportTicket { submitter: None })?;
        Ok(self.tickets.list_tickets(ticket_visibility(&principal)).await?)
    }

    pub async fn get(&self, caller: Option<UserId>, id: TicketId) -> Result<SupportTicket, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        self.load_for(&principal, Action::Retrieve, id).await
    }

    /// The submitter is always the caller.
    pub async fn create(&self, caller: Option<UserId>, form: TicketForm) -> Result<SupportTicket, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(
            Some(&principal),
            Action::Create,
            &Resource::SupportTicket {
                submitter: Some(principal.user_id),
            },
        )?;

        let ticket = SupportTicket::open(form, principal.user_id, Utc::now())?;
        self.tickets.insert_ticket(&ticket).await?;
        info!(user_id = %principal.user_id, ticket_id = %ticket.id, category = %ticket.category, "support ticket opened");
        Ok(ticket)
    }

    pub async fn replace(&self, caller: Option<UserId>, id: TicketId, form: TicketForm) -> Result<SupportTicket, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        let mut ticket = self.load_for(&principal, Action::Update, id).await?;
        ticket.replace(form, Utc::now())?;
        self.tickets.update_ticket(&ticket).await?;
        Ok(ticket)
    }

    pub async fn patch(&self, caller: Option<UserId>, id: TicketId, form: TicketForm) -> Result<SupportTicket, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        let mut ticket = self.load_for(&principal, Action::Update, id).await?;
        ticket.patch(form, Utc::now())?;
        self.tickets.update_ticket(&ticket).await?;
        Ok(ticket)
    }

    /// Resolving an already resolved ticket is a no-op.
    pub async fn resolve(&self, caller: Option<UserId>, id: TicketId) -> Result<SupportTicket, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        let mut ticket = self.load_for(&principal, Action::ChangeStatus, id).await?;
        if ticket.resolve(Utc::now()) {
            self.tickets.update_ticket(&ticket).await?;
            info!(user_id = %principal.user_id, ticket_id = %id, "support ticket resolved");
        }
        Ok(ticket)
    }

    pub async fn delete(&self, caller: Option<UserId>, id: TicketId) -> Result<(), ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        self.load_for(&principal, Action::Delete, id).await?;
        if !self.tickets.delete_ticket(id).await? {
            return Err(ServiceError::NotFound);
        }
        info!(user_id = %principal.user_id, ticket_id = %id, "support ticket deleted");
        Ok(())
    }

    /// Tickets outside the caller's visibility read as missing.
    async fn load_for(&self, principal: &Principal, action: Action, id: TicketId) -> Result<SupportTicket, ServiceError> {
        let ticket = self.tickets.get_ticket(id).await?.ok_or(ServiceError::NotFound)?;
        if !ticket_visibility(principal).allows(ticket.submitted_by) {
            return Err(ServiceError::NotFound);
        }
        check(
            Some(principal),
            action,
            &Resource::SupportTicket {
                submitter: Some(ticket.submitted_by),
            },
        )?;
        Ok(ticket)
    }
}
