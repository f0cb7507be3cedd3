use std::sync::Arc;

use serde_json::Value as JsonValue;

use refhub_auth::{Action, Resource};
use refhub_core::{Fields, UserId};

use super::{check, Callers};
use crate::bank::BankVerifier;
use crate::error::ServiceError;

const MAX_ACCOUNT_NUMBER_LEN: usize = 20;
const MAX_BANK_CODE_LEN: usize = 10;

/// Authenticated pass-through to the bank account lookup.
#[derive(Clone)]
pub struct BankService {
    verifier: Arc<dyn BankVerifier>,
    callers: Callers,
}

impl BankService {
    pub(crate) fn new(verifier: Arc<dyn BankVerifier>, callers: Callers) -> Self {
        Self { verifier, callers }
    }

    pub async fn verify(
        &self,
        caller: Option<UserId>,
        account_number: Option<String>,
        bank_code: Option<String>,
    ) -> Result<JsonValue, ServiceError> {
        let principal = self.callers.require(caller).await?.principal();
        check(Some(&principal), Action::Retrieve, &Resource::BankLookup)?;

        let mut fields = Fields::default();
        let account_number = fields.required("account_number", account_number, MAX_ACCOUNT_NUMBER_LEN);
        let bank_code = fields.required("bank_code", bank_code, MAX_BANK_CODE_LEN);
        fields.finish()?;
        let (Some(account_number), Some(bank_code)) = (account_number, bank_code) else {
            return Err(ServiceError::Internal("validated lookup fields are absent".to_string()));
        };

        Ok(self.verifier.verify(&account_number, &bank_code).await?)
    }
}
