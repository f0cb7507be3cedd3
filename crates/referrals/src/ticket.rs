use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use refhub_core::{DomainError, Entity, Fields, FileRef, TicketId, Upload, UploadKind, UserId};

use crate::MAX_TEXT_LEN;

text_enum! {
    TicketCategory("category") {
        Support => "support",
        Suggestion => "suggestion",
    }
    default Support
}

text_enum! {
    /// Resolution is one-way.
    TicketStatus("status") {
        InProgress => "in-progress",
        Resolved => "resolved",
    }
    default InProgress
}

text_enum! {
    TicketPriority("priority") {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
    default Low
}

/// Support request raised by an individual or company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportTicket {
    pub id: TicketId,
    /// Set from the authenticated caller at creation; never changes.
    pub submitted_by: UserId,
    pub category: TicketCategory,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub attachment: Option<FileRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client payload. Has no submitter field; the submitter is always the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketForm {
    pub category: Option<TicketCategory>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    pub attachment: Option<Upload>,
}

impl SupportTicket {
    pub fn open(form: TicketForm, submitted_by: UserId, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let mut fields = Fields::default();
        let title = fields.required("title", form.title, 255);
        let description = fields.required("description", form.description, MAX_TEXT_LEN);
        if form.status == Some(TicketStatus::Resolved) {
            fields.invalid("a new ticket cannot already be resolved");
        }
        fields.finish()?;
        let attachment = accept_attachment(form.attachment)?;

        let (Some(title), Some(description)) = (title, description) else {
            return Err(DomainError::invariant("required ticket field vanished"));
        };
        Ok(Self {
            id: TicketId::new(),
            submitted_by,
            category: form.category.unwrap_or_default(),
            title,
            description,
            status: TicketStatus::InProgress,
            priority: form.priority.unwrap_or_default(),
            attachment,
            created_at: now,
            updated_at: now,
        })
    }

    /// Full update. Category and priority fall back to their defaults when absent.
    pub fn replace(&mut self, form: TicketForm, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut fields = Fields::default();
        let title = fields.required("title", form.title, 255);
        let description = fields.required("description", form.description, MAX_TEXT_LEN);
        fields.finish()?;
        let attachment = accept_attachment(form.attachment)?;
        let (Some(title), Some(description)) = (title, description) else {
            return Err(DomainError::invariant("required ticket field vanished"));
        };

        if let Some(status) = form.status {
            self.check_transition(status)?;
        }
        self.title = title;
        self.description = description;
        self.category = form.category.unwrap_or_default();
        self.priority = form.priority.unwrap_or_default();
        if attachment.is_some() {
            self.attachment = attachment;
        }
        if let Some(status) = form.status {
            self.status = status;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn patch(&mut self, form: TicketForm, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut fields = Fields::default();
        let title = fields.optional("title", form.title, 255);
        let description = fields.optional("description", form.description, MAX_TEXT_LEN);
        fields.finish()?;
        let attachment = accept_attachment(form.attachment)?;
        if let Some(status) = form.status {
            self.check_transition(status)?;
        }

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = form.category {
            self.category = v;
        }
        if let Some(v) = form.priority {
            self.priority = v;
        }
        if attachment.is_some() {
            self.attachment = attachment;
        }
        if let Some(status) = form.status {
            self.status = status;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Mark the ticket resolved. Returns whether anything changed.
    pub fn resolve(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == TicketStatus::Resolved {
            return false;
        }
        self.status = TicketStatus::Resolved;
        self.updated_at = now;
        true
    }

    fn check_transition(&self, to: TicketStatus) -> Result<(), DomainError> {
        if self.status == TicketStatus::Resolved && to == TicketStatus::InProgress {
            return Err(DomainError::validation("a resolved ticket cannot be reopened"));
        }
        Ok(())
    }
}

fn accept_attachment(upload: Option<Upload>) -> Result<Option<FileRef>, DomainError> {
    upload
        .map(|u| u.accept(UploadKind::TicketAttachment))
        .transpose()
}

impl Entity for SupportTicket {
    const KIND: &'static str = "support ticket";

    type Id = TicketId;

    fn id(&self) -> TicketId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> TicketForm {
        TicketForm {
            title: Some("Payout missing".to_string()),
            description: Some("My bonus did not arrive".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn open_applies_defaults() {
        let submitter = UserId::new();
        let t = SupportTicket::open(form(), submitter, Utc::now()).unwrap();
        assert_eq!(t.submitted_by, submitter);
        assert_eq!(t.category, TicketCategory::Support);
        assert_eq!(t.status, TicketStatus::InProgress);
        assert_eq!(t.priority, TicketPriority::Low);
    }

    #[test]
    fn open_requires_title_and_description() {
        let err = SupportTicket::open(TicketForm::default(), UserId::new(), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingFields(vec!["title".to_string(), "description".to_string()])
        );
    }

    #[test]
    fn attachments_allow_pdf_but_not_exe() {
        let t = SupportTicket::open(
            TicketForm {
                attachment: Some(Upload {
                    file_name: "invoice.pdf".to_string(),
                    size_bytes: 2048,
                }),
                ..form()
            },
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        assert!(t.attachment.is_some());

        assert!(SupportTicket::open(
            TicketForm {
                attachment: Some(Upload {
                    file_name: "run.exe".to_string(),
                    size_bytes: 2048,
                }),
                ..form()
            },
            UserId::new(),
            Utc::now(),
        )
        .is_err());
    }

    #[test]
    fn resolution_is_one_way() {
        let now = Utc::now();
        let mut t = SupportTicket::open(form(), UserId::new(), now).unwrap();
        assert!(t.resolve(now));
        assert!(!t.resolve(now));

        let before = t.clone();
        let err = t
            .patch(
                TicketForm {
                    status: Some(TicketStatus::InProgress),
                    title: Some("reopen".to_string()),
                    ..Default::default()
                },
                now,
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(t, before);
    }

    #[test]
    fn patch_can_resolve() {
        let mut t = SupportTicket::open(form(), UserId::new(), Utc::now()).unwrap();
        t.patch(
            TicketForm {
                status: Some(TicketStatus::Resolved),
                priority: Some(TicketPriority::High),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(t.status, TicketStatus::Resolved);
        assert_eq!(t.priority, TicketPriority::High);
    }

    #[test]
    fn status_spelling() {
        assert_eq!(serde_json::to_string(&TicketStatus::InProgress).unwrap(), "\"in-progress\"");
        let form: TicketForm = serde_json::from_str(r#"{"status":"resolved","category":"suggestion"}"#).unwrap();
        assert_eq!(form.status, Some(TicketStatus::Resolved));
        assert_eq!(form.category, Some(TicketCategory::Suggestion));
    }
}
