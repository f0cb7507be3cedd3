use std::collections::{btree_map::Entry, BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use refhub_accounts::{Account, Profile};
use refhub_auth::{AccountRole, TicketVisibility};
use refhub_core::{Email, Entity, ProductId, RankingId, TicketId, UserId};
use refhub_referrals::{Product, Referral, SupportTicket, UserRanking, Wallet};

use super::{AccountStore, NewAccount, ProductStore, RankingStore, ReferralStore, TicketStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct State {
    // v7 ids sort by creation time, so BTreeMap iteration is oldest-first.
    accounts: BTreeMap<UserId, Account>,
    products: BTreeMap<ProductId, Product>,
    tickets: BTreeMap<TicketId, SupportTicket>,
    rankings: BTreeMap<RankingId, UserRanking>,
    referrals: Vec<Referral>,
    wallets: HashMap<UserId, Wallet>,
}

impl State {
    fn email_taken(&self, email: &Email) -> bool {
        self.accounts.values().any(|a| &a.identity().email == email)
    }

    fn stored_mut(&mut self, id: UserId) -> Result<&mut Account, StoreError> {
        self.accounts.get_mut(&id).ok_or(StoreError::NotFound)
    }

    fn registration_number_taken(&self, number: &str, except: Option<UserId>) -> bool {
        self.accounts.values().any(|a| {
            Some(a.id()) != except
                && a
                    .profile()
                    .as_company()
                    .is_some_and(|c| c.company_registration_number == number)
        })
    }
}

fn insert_new<E: Entity + Clone>(table: &mut BTreeMap<E::Id, E>, record: &E) -> Result<(), StoreError> {
    match table.entry(record.id()) {
        Entry::Occupied(_) => Err(StoreError::Conflict(format!(
            "{} {} already exists",
            E::KIND,
            record.id()
        ))),
        Entry::Vacant(slot) => {
            slot.insert(record.clone());
            Ok(())
        }
    }
}

fn replace_existing<E: Entity + Clone>(table: &mut BTreeMap<E::Id, E>, record: &E) -> Result<(), StoreError> {
    match table.get_mut(&record.id()) {
        Some(slot) => {
            *slot = record.clone();
            Ok(())
        }
        None => Err(StoreError::NotFound),
    }
}

/// In-memory store for development and tests.
///
/// A single lock guards all tables, so every multi-table write is atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut state = self.write()?;
        let account = new.account;

        // All checks first: nothing is written unless every one passes.
        if state.email_taken(&account.identity().email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        if let Profile::Company(company) = account.profile() {
            if state.registration_number_taken(&company.company_registration_number, None) {
                return Err(StoreError::Conflict(
                    "company registration number already registered".to_string(),
                ));
            }
        }
        if let Some(referral) = &new.referral {
            if !state.accounts.contains_key(&referral.referrer) {
                return Err(StoreError::NotFound);
            }
            if state.referrals.iter().any(|r| r.referred == referral.referred) {
                return Err(StoreError::Conflict("account was already referred".to_string()));
            }
        }

        if let Some(referral) = new.referral {
            let mut wallet = state
                .wallets
                .get(&referral.referrer)
                .cloned()
                .unwrap_or_else(|| Wallet::empty(referral.referrer, referral.created_at));
            wallet
                .credit(referral.reward, referral.created_at)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            state.wallets.insert(referral.referrer, wallet);
            state.referrals.push(referral);
        }
        state.accounts.insert(account.id(), account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: UserId) -> Result<Option<Account>, StoreError> {
        Ok(self.read()?.accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        Ok(self
            .read()?
            .accounts
            .values()
            .find(|a| &a.identity().email == email)
            .cloned())
    }

    async fn find_by_referral_code(&self, code: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .read()?
            .accounts
            .values()
            .find(|a| a.identity().referral_code == code)
            .cloned())
    }

    async fn update_profile(&self, account: &Account) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if let Profile::Company(company) = account.profile() {
            if state.registration_number_taken(&company.company_registration_number, Some(account.id())) {
                return Err(StoreError::Conflict(
                    "company registration number already registered".to_string(),
                ));
            }
        }
        state.stored_mut(account.id())?.take_profile_from(account);
        Ok(())
    }

    async fn update_access(&self, account: &Account) -> Result<(), StoreError> {
        self.write()?.stored_mut(account.id())?.take_access_from(account);
        Ok(())
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), StoreError> {
        self.write()?.stored_mut(id)?.set_password_hash(hash.to_string());
        Ok(())
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.write()?.stored_mut(id)?.record_login(at);
        Ok(())
    }

    async fn list_accounts(&self, role: Option<AccountRole>) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .read()?
            .accounts
            .values()
            .filter(|a| role.is_none_or(|r| a.role() == r))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        insert_new(&mut self.write()?.products, product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        replace_existing(&mut self.write()?.products, product)
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self.write()?.products.remove(&id).is_some())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.products.values().cloned().collect())
    }
}

#[async_trait]
impl TicketStore for InMemoryStore {
    async fn insert_ticket(&self, ticket: &SupportTicket) -> Result<(), StoreError> {
        insert_new(&mut self.write()?.tickets, ticket)
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<SupportTicket>, StoreError> {
        Ok(self.read()?.tickets.get(&id).cloned())
    }

    async fn update_ticket(&self, ticket: &SupportTicket) -> Result<(), StoreError> {
        replace_existing(&mut self.write()?.tickets, ticket)
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool, StoreError> {
        Ok(self.write()?.tickets.remove(&id).is_some())
    }

    async fn list_tickets(&self, visibility: TicketVisibility) -> Result<Vec<SupportTicket>, StoreError> {
        Ok(self
            .read()?
            .tickets
            .values()
            .filter(|t| visibility.allows(t.submitted_by))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RankingStore for InMemoryStore {
    async fn insert_ranking(&self, ranking: &UserRanking) -> Result<(), StoreError> {
        insert_new(&mut self.write()?.rankings, ranking)
    }

    async fn get_ranking(&self, id: RankingId) -> Result<Option<UserRanking>, StoreError> {
        Ok(self.read()?.rankings.get(&id).cloned())
    }

    async fn update_ranking(&self, ranking: &UserRanking) -> Result<(), StoreError> {
        replace_existing(&mut self.write()?.rankings, ranking)
    }

    async fn delete_ranking(&self, id: RankingId) -> Result<bool, StoreError> {
        Ok(self.write()?.rankings.remove(&id).is_some())
    }

    async fn list_rankings(&self) -> Result<Vec<UserRanking>, StoreError> {
        Ok(self.read()?.rankings.values().cloned().collect())
    }
}

#[async_trait]
impl ReferralStore for InMemoryStore {
    async fn list_referrals(&self, referrer: Option<UserId>) -> Result<Vec<Referral>, StoreError> {
        Ok(self
            .read()?
            .referrals
            .iter()
            .filter(|r| referrer.is_none_or(|id| r.referrer == id))
            .cloned()
            .collect())
    }

    async fn get_wallet(&self, owner: UserId) -> Result<Option<Wallet>, StoreError> {
        Ok(self.read()?.wallets.get(&owner).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refhub_accounts::{CompanyProfile, Identity};

    fn company(email: &str, reg: &str) -> Account {
        let identity = Identity::new(
            Email::parse(email).unwrap(),
            "hash".to_string(),
            "Co".to_string(),
            AccountRole::Company,
            Utc::now(),
        );
        Account::new(
            identity,
            Profile::Company(CompanyProfile {
                company_name: "Co".to_string(),
                company_registration_number: reg.to_string(),
                phone_number: None,
                address: None,
                country: None,
            }),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_registration_number_conflicts() {
        let store = InMemoryStore::new();
        store
            .create_account(NewAccount {
                account: company("a@example.com", "RC1"),
                referral: None,
            })
            .await
            .unwrap();
        let err = store
            .create_account(NewAccount {
                account: company("b@example.com", "RC1"),
                referral: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list_accounts(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn referral_and_wallet_written_with_account() {
        let store = InMemoryStore::new();
        let referrer = store
            .create_account(NewAccount {
                account: company("a@example.com", "RC1"),
                referral: None,
            })
            .await
            .unwrap();
        let referred = company("b@example.com", "RC2");
        let referral = Referral::new(referrer.id(), referred.id(), 100, Utc::now()).unwrap();
        store
            .create_account(NewAccount {
                account: referred,
                referral: Some(referral),
            })
            .await
            .unwrap();

        assert_eq!(store.get_wallet(referrer.id()).await.unwrap().unwrap().balance, 100);
        assert_eq!(store.list_referrals(Some(referrer.id())).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_referral_writes_nothing() {
        let store = InMemoryStore::new();
        let referred = company("b@example.com", "RC2");
        let referral = Referral::new(UserId::new(), referred.id(), 100, Utc::now()).unwrap();
        let err = store
            .create_account(NewAccount {
                account: referred,
                referral: Some(referral),
            })
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound);
        assert!(store.list_accounts(None).await.unwrap().is_empty());
        assert!(store.list_referrals(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_credit_leaves_no_wallet_behind() {
        let store = InMemoryStore::new();
        let referrer = store
            .create_account(NewAccount {
                account: company("a@example.com", "RC1"),
                referral: None,
            })
            .await
            .unwrap();
        let referred = company("b@example.com", "RC2");
        let mut referral = Referral::new(referrer.id(), referred.id(), 100, Utc::now()).unwrap();
        referral.reward = -1;

        let err = store
            .create_account(NewAccount {
                account: referred,
                referral: Some(referral),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(store.get_wallet(referrer.id()).await.unwrap(), None);
        assert!(store.list_referrals(None).await.unwrap().is_empty());
        assert_eq!(store.list_accounts(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ticket_listing_respects_visibility() {
        let store = InMemoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        for submitter in [alice, bob, bob] {
            let ticket = SupportTicket::open(
                refhub_referrals::TicketForm {
                    title: Some("t".to_string()),
                    description: Some("d".to_string()),
                    ..Default::default()
                },
                submitter,
                Utc::now(),
            )
            .unwrap();
            store.insert_ticket(&ticket).await.unwrap();
        }
        assert_eq!(store.list_tickets(TicketVisibility::All).await.unwrap().len(), 3);
        assert_eq!(store.list_tickets(TicketVisibility::SubmittedBy(bob)).await.unwrap().len(), 2);
    }
}
