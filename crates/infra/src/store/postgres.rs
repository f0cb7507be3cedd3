//! Postgres-backed store.
//!
//! ## Error mapping
//!
//! | Postgres code | Meaning | `StoreError` |
//! |---|---|---|
//! | `23505` | unique violation | `Conflict` (message names the duplicated field) |
//! | `23503` | foreign key violation | `NotFound` (referenced identity missing) |
//! | anything else | | `Backend` |
//!
//! Multi-table writes (registration, profile and access updates) run in one transaction;
//! dropping the transaction on an early `?` rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use refhub_accounts::{Account, CompanyProfile, IndividualProfile, Identity, Profile, StaffProfile};
use refhub_auth::{AccountRole, TicketVisibility};
use refhub_core::{Email, FileRef, ProductId, RankingId, ReferralId, TicketId, UserId};
use refhub_referrals::{Product, Referral, SupportTicket, UserRanking, Wallet};

use super::{AccountStore, NewAccount, ProductStore, RankingStore, ReferralStore, TicketStore};
use crate::error::StoreError;

const SCHEMA: &str = include_str!("schema.sql");

const ACCOUNT_SELECT: &str = r#"
    SELECT
        i.id, i.email, i.password_hash, i.name, i.role, i.status, i.is_active,
        i.is_staff, i.is_superuser, i.referral_code, i.profile_picture,
        i.date_joined, i.last_login,
        ip.first_name, ip.last_name, ip.gender, ip.phone_number AS ip_phone_number,
        ip.address AS ip_address, ip.country AS ip_country, ip.state, ip.city,
        cp.company_name, cp.company_registration_number,
        cp.phone_number AS cp_phone_number, cp.address AS cp_address, cp.country AS cp_country,
        sp.tier
    FROM identities i
    LEFT JOIN individual_profiles ip ON ip.identity_id = i.id
    LEFT JOIN company_profiles cp ON cp.identity_id = i.id
    LEFT JOIN staff_profiles sp ON sp.identity_id = i.id
"#;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool and apply the embedded schema.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.apply_schema().await?;
        Ok(store)
    }

    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("apply_schema", e))?;
        Ok(())
    }

    async fn fetch_account(&self, clause: &str, bind: String) -> Result<Option<Account>, StoreError> {
        let sql = format!("{ACCOUNT_SELECT} WHERE {clause}");
        let row = sqlx::query(&sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_account", e))?;
        row.as_ref().map(account_from_row).transpose()
    }
}

#[async_trait]
impl AccountStore for PgStore {
    #[instrument(skip(self, new), fields(user_id = %new.account.id()), err)]
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let identity = new.account.identity();
        sqlx::query(
            r#"
            INSERT INTO identities (
                id, email, password_hash, name, role, status, is_active, is_staff,
                is_superuser, referral_code, profile_picture, date_joined, last_login
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(*identity.id.as_uuid())
        .bind(identity.email.as_str())
        .bind(&identity.password_hash)
        .bind(&identity.name)
        .bind(identity.role.as_str())
        .bind(identity.status.as_str())
        .bind(identity.is_active)
        .bind(identity.is_staff)
        .bind(identity.is_superuser)
        .bind(&identity.referral_code)
        .bind(identity.profile_picture.as_ref().map(|p| p.as_str()))
        .bind(identity.date_joined)
        .bind(identity.last_login)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_identity", e))?;

        insert_profile(&mut tx, identity.id, new.account.profile()).await?;

        if let Some(referral) = &new.referral {
            sqlx::query(
                r#"
                INSERT INTO referrals (id, referrer_id, referred_id, reward, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(*referral.id.as_uuid())
            .bind(*referral.referrer.as_uuid())
            .bind(*referral.referred.as_uuid())
            .bind(referral.reward)
            .bind(referral.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_referral", e))?;

            // Concurrent signups on the same code serialize on this row.
            sqlx::query(
                r#"
                INSERT INTO wallets (owner_id, balance, updated_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (owner_id)
                DO UPDATE SET
                    balance = wallets.balance + EXCLUDED.balance,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(*referral.referrer.as_uuid())
            .bind(referral.reward)
            .bind(referral.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("credit_wallet", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(new.account)
    }

    async fn get_account(&self, id: UserId) -> Result<Option<Account>, StoreError> {
        let sql = format!("{ACCOUNT_SELECT} WHERE i.id = $1");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_account", e))?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        self.fetch_account("i.email = $1", email.as_str().to_string()).await
    }

    async fn find_by_referral_code(&self, code: &str) -> Result<Option<Account>, StoreError> {
        self.fetch_account("i.referral_code = $1", code.to_string()).await
    }

    #[instrument(skip(self, account), fields(user_id = %account.id()), err)]
    async fn update_profile(&self, account: &Account) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let identity = account.identity();
        let result = sqlx::query("UPDATE identities SET name = $2, profile_picture = $3 WHERE id = $1")
            .bind(*identity.id.as_uuid())
            .bind(&identity.name)
            .bind(identity.profile_picture.as_ref().map(|p| p.as_str()))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_identity", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        if !matches!(account.profile(), Profile::Admin(_)) {
            write_profile_row(&mut tx, identity.id, account.profile()).await?;
        }
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(())
    }

    #[instrument(skip(self, account), fields(user_id = %account.id()), err)]
    async fn update_access(&self, account: &Account) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let identity = account.identity();
        let result = sqlx::query(
            r#"
            UPDATE identities SET
                status = $2,
                is_active = $3,
                is_staff = $4,
                is_superuser = $5
            WHERE id = $1
            "#,
        )
        .bind(*identity.id.as_uuid())
        .bind(identity.status.as_str())
        .bind(identity.is_active)
        .bind(identity.is_staff)
        .bind(identity.is_superuser)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_access", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        if matches!(account.profile(), Profile::Admin(_)) {
            write_profile_row(&mut tx, identity.id, account.profile()).await?;
        }
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(())
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE identities SET password_hash = $2 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(hash)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_password_hash", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE identities SET last_login = $2 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("record_login", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_accounts(&self, role: Option<AccountRole>) -> Result<Vec<Account>, StoreError> {
        let sql = format!("{ACCOUNT_SELECT} WHERE ($1::TEXT IS NULL OR i.role = $1) ORDER BY i.id");
        let rows = sqlx::query(&sql)
            .bind(role.map(|r| r.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_accounts", e))?;
        rows.iter().map(account_from_row).collect()
    }
}

async fn insert_profile(
    tx: &mut Transaction<'_, Postgres>,
    id: UserId,
    profile: &Profile,
) -> Result<(), StoreError> {
    let query = match profile {
        Profile::Individual(p) => sqlx::query(
            r#"
            INSERT INTO individual_profiles (
                identity_id, first_name, last_name, gender, phone_number, address, country, state, city
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*id.as_uuid())
        .bind(&p.first_name)
        .bind(&p.last_name)
        .bind(p.gender.as_str())
        .bind(&p.phone_number)
        .bind(&p.address)
        .bind(&p.country)
        .bind(&p.state)
        .bind(&p.city),
        Profile::Company(p) => sqlx::query(
            r#"
            INSERT INTO company_profiles (
                identity_id, company_name, company_registration_number, phone_number, address, country
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*id.as_uuid())
        .bind(&p.company_name)
        .bind(&p.company_registration_number)
        .bind(&p.phone_number)
        .bind(&p.address)
        .bind(&p.country),
        Profile::Admin(p) => sqlx::query("INSERT INTO staff_profiles (identity_id, tier) VALUES ($1, $2)")
            .bind(*id.as_uuid())
            .bind(p.tier.as_str()),
    };
    query
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_profile", e))?;
    Ok(())
}

async fn write_profile_row(
    tx: &mut Transaction<'_, Postgres>,
    id: UserId,
    profile: &Profile,
) -> Result<(), StoreError> {
    let query = match profile {
        Profile::Individual(p) => sqlx::query(
            r#"
            UPDATE individual_profiles SET
                first_name = $2, last_name = $3, gender = $4, phone_number = $5,
                address = $6, country = $7, state = $8, city = $9
            WHERE identity_id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .bind(&p.first_name)
        .bind(&p.last_name)
        .bind(p.gender.as_str())
        .bind(&p.phone_number)
        .bind(&p.address)
        .bind(&p.country)
        .bind(&p.state)
        .bind(&p.city),
        Profile::Company(p) => sqlx::query(
            r#"
            UPDATE company_profiles SET
                company_name = $2, company_registration_number = $3,
                phone_number = $4, address = $5, country = $6
            WHERE identity_id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .bind(&p.company_name)
        .bind(&p.company_registration_number)
        .bind(&p.phone_number)
        .bind(&p.address)
        .bind(&p.country),
        Profile::Admin(p) => sqlx::query("UPDATE staff_profiles SET tier = $2 WHERE identity_id = $1")
            .bind(*id.as_uuid())
            .bind(p.tier.as_str()),
    };
    query
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("write_profile_row", e))?;
    Ok(())
}

#[async_trait]
impl ProductStore for PgStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, company_id, name, description, image, link, status, shares, traffic,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(*product.id.as_uuid())
        .bind(product.company.map(Uuid::from))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.image.as_ref().map(|i| i.as_str()))
        .bind(&product.link)
        .bind(product.status.as_str())
        .bind(product.shares)
        .bind(product.traffic)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = $2, description = $3, image = $4, link = $5, status = $6,
                shares = $7, traffic = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(*product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.image.as_ref().map(|i| i.as_str()))
        .bind(&product.link)
        .bind(product.status.as_str())
        .bind(product.shares)
        .bind(product.traffic)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;
        rows.iter().map(product_from_row).collect()
    }
}

#[async_trait]
impl TicketStore for PgStore {
    async fn insert_ticket(&self, ticket: &SupportTicket) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO support_tickets (
                id, submitted_by, category, title, description, status, priority,
                attachment, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*ticket.id.as_uuid())
        .bind(*ticket.submitted_by.as_uuid())
        .bind(ticket.category.as_str())
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.status.as_str())
        .bind(ticket.priority.as_str())
        .bind(ticket.attachment.as_ref().map(|a| a.as_str()))
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_ticket", e))?;
        Ok(())
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<SupportTicket>, StoreError> {
        let row = sqlx::query("SELECT * FROM support_tickets WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_ticket", e))?;
        row.as_ref().map(ticket_from_row).transpose()
    }

    async fn update_ticket(&self, ticket: &SupportTicket) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE support_tickets SET
                category = $2, title = $3, description = $4, status = $5,
                priority = $6, attachment = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(*ticket.id.as_uuid())
        .bind(ticket.category.as_str())
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.status.as_str())
        .bind(ticket.priority.as_str())
        .bind(ticket.attachment.as_ref().map(|a| a.as_str()))
        .bind(ticket.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_ticket", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM support_tickets WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_ticket", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tickets(&self, visibility: TicketVisibility) -> Result<Vec<SupportTicket>, StoreError> {
        let submitter = match visibility {
            TicketVisibility::All => None,
            TicketVisibility::SubmittedBy(id) => Some(*id.as_uuid()),
        };
        let rows = sqlx::query(
            "SELECT * FROM support_tickets WHERE ($1::UUID IS NULL OR submitted_by = $1) ORDER BY id",
        )
        .bind(submitter)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_tickets", e))?;
        rows.iter().map(ticket_from_row).collect()
    }
}

#[async_trait]
impl RankingStore for PgStore {
    async fn insert_ranking(&self, ranking: &UserRanking) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_rankings (
                id, icon, "user", rank_level, name, total_recruits, bonus, status, date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*ranking.id.as_uuid())
        .bind(ranking.icon.as_str())
        .bind(&ranking.user)
        .bind(ranking.rank_level)
        .bind(ranking.name.as_str())
        .bind(ranking.total_recruits)
        .bind(ranking.bonus)
        .bind(ranking.status.as_str())
        .bind(ranking.date)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_ranking", e))?;
        Ok(())
    }

    async fn get_ranking(&self, id: RankingId) -> Result<Option<UserRanking>, StoreError> {
        let row = sqlx::query("SELECT * FROM user_rankings WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_ranking", e))?;
        row.as_ref().map(ranking_from_row).transpose()
    }

    async fn update_ranking(&self, ranking: &UserRanking) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE user_rankings SET
                icon = $2, "user" = $3, rank_level = $4, name = $5,
                total_recruits = $6, bonus = $7, status = $8
            WHERE id = $1
            "#,
        )
        .bind(*ranking.id.as_uuid())
        .bind(ranking.icon.as_str())
        .bind(&ranking.user)
        .bind(ranking.rank_level)
        .bind(ranking.name.as_str())
        .bind(ranking.total_recruits)
        .bind(ranking.bonus)
        .bind(ranking.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_ranking", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_ranking(&self, id: RankingId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM user_rankings WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_ranking", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_rankings(&self) -> Result<Vec<UserRanking>, StoreError> {
        let rows = sqlx::query("SELECT * FROM user_rankings ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_rankings", e))?;
        rows.iter().map(ranking_from_row).collect()
    }
}

#[async_trait]
impl ReferralStore for PgStore {
    async fn list_referrals(&self, referrer: Option<UserId>) -> Result<Vec<Referral>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM referrals WHERE ($1::UUID IS NULL OR referrer_id = $1) ORDER BY id",
        )
        .bind(referrer.map(Uuid::from))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_referrals", e))?;

        rows.iter()
            .map(|row| -> Result<Referral, StoreError> {
                Ok(Referral {
                    id: ReferralId::from_uuid(get(row, "id")?),
                    referrer: UserId::from_uuid(get(row, "referrer_id")?),
                    referred: UserId::from_uuid(get(row, "referred_id")?),
                    reward: get(row, "reward")?,
                    created_at: get(row, "created_at")?,
                })
            })
            .collect()
    }

    async fn get_wallet(&self, owner: UserId) -> Result<Option<Wallet>, StoreError> {
        let row = sqlx::query("SELECT owner_id, balance, updated_at FROM wallets WHERE owner_id = $1")
            .bind(*owner.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_wallet", e))?;
        row.map(|row| -> Result<Wallet, StoreError> {
            Ok(Wallet {
                owner: UserId::from_uuid(get(&row, "owner_id")?),
                balance: get(&row, "balance")?,
                updated_at: get(&row, "updated_at")?,
            })
        })
        .transpose()
    }
}

// -------------------------
// Row mapping
// -------------------------

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Backend(format!("failed to read column {column}: {e}")))
}

/// Parse a text column into one of the domain enums.
fn parse<T>(row: &PgRow, column: &str) -> Result<T, StoreError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    let raw: String = get(row, column)?;
    raw.parse()
        .map_err(|e| StoreError::Backend(format!("bad value in column {column}: {e}")))
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let email: String = get(row, "email")?;
    let role: AccountRole = parse(row, "role")?;
    let identity = Identity {
        id: UserId::from_uuid(get(row, "id")?),
        email: Email::parse(&email).map_err(|e| StoreError::Backend(e.to_string()))?,
        password_hash: get(row, "password_hash")?,
        name: get(row, "name")?,
        role,
        status: parse(row, "status")?,
        is_active: get(row, "is_active")?,
        is_staff: get(row, "is_staff")?,
        is_superuser: get(row, "is_superuser")?,
        referral_code: get(row, "referral_code")?,
        profile_picture: get::<Option<String>>(row, "profile_picture")?.map(FileRef::from_stored),
        date_joined: get(row, "date_joined")?,
        last_login: get(row, "last_login")?,
    };

    let profile = match role {
        AccountRole::Individual => Profile::Individual(IndividualProfile {
            first_name: get(row, "first_name")?,
            last_name: get(row, "last_name")?,
            gender: parse(row, "gender")?,
            phone_number: get(row, "ip_phone_number")?,
            address: get(row, "ip_address")?,
            country: get(row, "ip_country")?,
            state: get(row, "state")?,
            city: get(row, "city")?,
        }),
        AccountRole::Company => Profile::Company(CompanyProfile {
            company_name: get(row, "company_name")?,
            company_registration_number: get(row, "company_registration_number")?,
            phone_number: get(row, "cp_phone_number")?,
            address: get(row, "cp_address")?,
            country: get(row, "cp_country")?,
        }),
        AccountRole::Admin => Profile::Admin(StaffProfile {
            tier: parse(row, "tier")?,
        }),
    };

    Account::new(identity, profile).map_err(|e| StoreError::Backend(e.to_string()))
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId::from_uuid(get(row, "id")?),
        company: get::<Option<Uuid>>(row, "company_id")?.map(UserId::from_uuid),
        name: get(row, "name")?,
        description: get(row, "description")?,
        image: get::<Option<String>>(row, "image")?.map(FileRef::from_stored),
        link: get(row, "link")?,
        status: parse(row, "status")?,
        shares: get(row, "shares")?,
        traffic: get(row, "traffic")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn ticket_from_row(row: &PgRow) -> Result<SupportTicket, StoreError> {
    Ok(SupportTicket {
        id: TicketId::from_uuid(get(row, "id")?),
        submitted_by: UserId::from_uuid(get(row, "submitted_by")?),
        category: parse(row, "category")?,
        title: get(row, "title")?,
        description: get(row, "description")?,
        status: parse(row, "status")?,
        priority: parse(row, "priority")?,
        attachment: get::<Option<String>>(row, "attachment")?.map(FileRef::from_stored),
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

fn ranking_from_row(row: &PgRow) -> Result<UserRanking, StoreError> {
    Ok(UserRanking {
        id: RankingId::from_uuid(get(row, "id")?),
        icon: FileRef::from_stored(get::<String>(row, "icon")?),
        user: get(row, "user")?,
        rank_level: get(row, "rank_level")?,
        name: parse(row, "name")?,
        total_recruits: get(row, "total_recruits")?,
        bonus: get(row, "bonus")?,
        status: parse(row, "status")?,
        date: get(row, "date")?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::Conflict(conflict_message(db_err.constraint()).to_string()),
            Some("23503") => StoreError::NotFound,
            _ => StoreError::Backend(format!("database error in {operation}: {}", db_err.message())),
        },
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("identities_email_key") => "email already registered",
        Some("company_profiles_company_registration_number_key") => {
            "company registration number already registered"
        }
        Some("referrals_referred_id_key") => "account was already referred",
        Some("identities_referral_code_key") => "referral code collision, retry",
        _ => "duplicate record",
    }
}
