use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use refhub_auth::{AccountRole, Action, Principal, Resource};
use refhub_core::{ProductId, UserId};
use refhub_referrals::{Product, ProductForm};

use super::{check, Callers};
use crate::error::ServiceError;
use crate::store::{AccountStore, ProductStore};

/// Product listings. Reads are public; writes belong to the owning company or an admin.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductStore>,
    accounts: Arc<dyn AccountStore>,
    callers: Callers,
}

impl ProductService {
    pub(crate) fn new(products: Arc<dyn ProductStore>, accounts: Arc<dyn AccountStore>, callers: Callers) -> Self {
        Self {
            products,
            accounts,
            callers,
        }
    }

    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        check(None, Action::List, &Resource::Product { company: None })?;
        Ok(self.products.list_products().await?)
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, ServiceError> {
        let product = self.products.get_product(id).await?.ok_or(ServiceError::NotFound)?;
        check(None, Action::Retrieve, &Resource::Product { company: product.company })?;
        Ok(product)
    }

    /// Companies always own what they create; admins may name an owning company.
    pub async fn create(&self, caller: Option<UserId>, mut form: ProductForm) -> Result<Product, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::Create, &Resource::Product { company: form.company })?;

        let owner = if principal.is_admin() {
            match form.company {
                Some(company) => Some(self.require_company(company).await?),
                None => None,
            }
        } else {
            Some(principal.user_id)
        };

        let status = form.status.take();
        let now = Utc::now();
        let mut product = Product::create(form, owner, now)?;
        if let Some(status) = status {
            self.transition(&principal, &mut product, status)?;
        }
        self.products.insert_product(&product).await?;

        info!(user_id = %principal.user_id, product_id = %product.id, "product created");
        Ok(product)
    }

    /// Full update (PUT).
    pub async fn replace(&self, caller: Option<UserId>, id: ProductId, form: ProductForm) -> Result<Product, ServiceError> {
        self.modify(caller, id, form, true).await
    }

    /// Partial update (PATCH).
    pub async fn patch(&self, caller: Option<UserId>, id: ProductId, form: ProductForm) -> Result<Product, ServiceError> {
        self.modify(caller, id, form, false).await
    }

    pub async fn delete(&self, caller: Option<UserId>, id: ProductId) -> Result<(), ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        let product = self.products.get_product(id).await?.ok_or(ServiceError::NotFound)?;
        check(Some(&principal), Action::Delete, &Resource::Product { company: product.company })?;

        if !self.products.delete_product(id).await? {
            return Err(ServiceError::NotFound);
        }
        info!(user_id = %principal.user_id, product_id = %id, "product deleted");
        Ok(())
    }

    async fn modify(
        &self,
        caller: Option<UserId>,
        id: ProductId,
        mut form: ProductForm,
        full: bool,
    ) -> Result<Product, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        let mut product = self.products.get_product(id).await?.ok_or(ServiceError::NotFound)?;
        check(Some(&principal), Action::Update, &Resource::Product { company: product.company })?;

        if let Some(company) = form.company.take() {
            if product.company != Some(company) {
                if !principal.is_admin() {
                    return Err(ServiceError::Forbidden(
                        "only admins can move a product to another company".to_string(),
                    ));
                }
                product.company = Some(self.require_company(company).await?);
            }
        }

        let status = form.status.take();
        let now = Utc::now();
        if full {
            product.replace(form, now)?;
        } else {
            product.patch(form, now)?;
        }
        if let Some(status) = status {
            if status != product.status {
                check(Some(&principal), Action::ChangeStatus, &Resource::Product { company: product.company })?;
            }
            self.transition(&principal, &mut product, status)?;
        }

        // Only the fully updated copy is written; a failure above leaves the stored product as it was.
        self.products.update_product(&product).await?;
        Ok(product)
    }

    fn transition(
        &self,
        principal: &Principal,
        product: &mut Product,
        status: refhub_referrals::ProductStatus,
    ) -> Result<(), ServiceError> {
        if product.transition(status, principal.is_admin(), Utc::now())? {
            info!(
                user_id = %principal.user_id,
                product_id = %product.id,
                status = %product.status,
                "product status changed"
            );
        }
        Ok(())
    }

    async fn require_company(&self, id: UserId) -> Result<UserId, ServiceError> {
        match self.accounts.get_account(id).await? {
            Some(account) if account.role() == AccountRole::Company => Ok(id),
            _ => Err(ServiceError::Validation(format!("{id} is not a company account"))),
        }
    }
}
