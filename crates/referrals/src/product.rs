use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use refhub_core::{DomainError, Entity, Fields, FileRef, ProductId, Upload, UploadKind, UserId};

use crate::{bounded, MAX_TEXT_LEN};

/// Upper bound for `shares` and `traffic`.
pub const MAX_PRODUCT_COUNTER: i64 = 1_000_000_000;

text_enum! {
    /// Product review lifecycle.
    ProductStatus("status") {
        Pending => "pending",
        Active => "active",
        Declined => "declined",
    }
    default Pending
}

/// A product listed by a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub company: Option<UserId>,
    pub name: String,
    pub description: String,
    pub image: Option<FileRef>,
    pub link: String,
    pub status: ProductStatus,
    pub shares: i64,
    pub traffic: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client payload for create, replace and partial update.
///
/// `status` is not applied by [`Product::replace`] or [`Product::patch`];
/// callers route it through [`Product::transition`] so the lifecycle rules hold.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    pub company: Option<UserId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub image: Option<Upload>,
    pub status: Option<ProductStatus>,
    pub shares: Option<i64>,
    pub traffic: Option<i64>,
}

struct Checked {
    name: Option<String>,
    description: Option<String>,
    link: Option<String>,
    image: Option<FileRef>,
    shares: Option<i64>,
    traffic: Option<i64>,
}

impl ProductForm {
    fn check(self, full: bool) -> Result<Checked, DomainError> {
        let mut fields = Fields::default();
        let (name, description, link) = if full {
            (
                fields.required("name", self.name, 255),
                fields.required("description", self.description, MAX_TEXT_LEN),
                fields.required("link", self.link, 255),
            )
        } else {
            (
                fields.optional("name", self.name, 255),
                fields.optional("description", self.description, MAX_TEXT_LEN),
                fields.optional("link", self.link, 255),
            )
        };
        let shares = bounded(&mut fields, "shares", self.shares, MAX_PRODUCT_COUNTER);
        let traffic = bounded(&mut fields, "traffic", self.traffic, MAX_PRODUCT_COUNTER);
        fields.finish()?;

        let image = self
            .image
            .map(|upload| upload.accept(UploadKind::ProductImage))
            .transpose()?;

        Ok(Checked {
            name,
            description,
            link,
            image,
            shares,
            traffic,
        })
    }
}

impl Product {
    /// New products always start `pending`.
    pub fn create(form: ProductForm, company: Option<UserId>, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let checked = form.check(true)?;
        let (Some(name), Some(description), Some(link)) = (checked.name, checked.description, checked.link) else {
            return Err(DomainError::invariant("required product field vanished"));
        };
        Ok(Self {
            id: ProductId::new(),
            company,
            name,
            description,
            image: checked.image,
            link,
            status: ProductStatus::Pending,
            shares: checked.shares.unwrap_or(0),
            traffic: checked.traffic.unwrap_or(0),
            created_at: now,
            updated_at: now,
        })
    }

    /// Full update: name, description and link are required again. Counters
    /// missing from the payload reset to zero; a missing image keeps the old one.
    pub fn replace(&mut self, form: ProductForm, now: DateTime<Utc>) -> Result<(), DomainError> {
        let checked = form.check(true)?;
        let (Some(name), Some(description), Some(link)) = (checked.name, checked.description, checked.link) else {
            return Err(DomainError::invariant("required product field vanished"));
        };
        self.name = name;
        self.description = description;
        self.link = link;
        self.shares = checked.shares.unwrap_or(0);
        self.traffic = checked.traffic.unwrap_or(0);
        if checked.image.is_some() {
            self.image = checked.image;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn patch(&mut self, form: ProductForm, now: DateTime<Utc>) -> Result<(), DomainError> {
        let checked = form.check(false)?;
        if let Some(v) = checked.name {
            self.name = v;
        }
        if let Some(v) = checked.description {
            self.description = v;
        }
        if let Some(v) = checked.link {
            self.link = v;
        }
        if let Some(v) = checked.shares {
            self.shares = v;
        }
        if let Some(v) = checked.traffic {
            self.traffic = v;
        }
        if checked.image.is_some() {
            self.image = checked.image;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Move the product to `to`. Returns whether anything changed.
    ///
    /// `pending` may go to `active` or `declined`; only an admin may send a
    /// reviewed product back to `pending`. Ownership is checked by the caller.
    pub fn transition(&mut self, to: ProductStatus, by_admin: bool, now: DateTime<Utc>) -> Result<bool, DomainError> {
        use ProductStatus::*;

        match (self.status, to) {
            (from, to) if from == to => return Ok(false),
            (Pending, Active | Declined) => {}
            (Active | Declined, Pending) if by_admin => {}
            (Active | Declined, Pending) => {
                return Err(DomainError::forbidden("only an admin can reopen a reviewed product"));
            }
            (from, to) => {
                return Err(DomainError::validation(format!(
                    "product status cannot change from {from} to {to}"
                )));
            }
        }
        self.status = to;
        self.updated_at = now;
        Ok(true)
    }
}

impl Entity for Product {
    const KIND: &'static str = "product";

    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}
