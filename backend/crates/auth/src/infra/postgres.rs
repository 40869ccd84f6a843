//! PostgreSQL Repository Implementation
//!
//! Refresh tokens live in a `TEXT[]` column and are changed with
//! `array_append` / `array_remove` / `array_replace` so concurrent sign-ins
//! and refreshes on one account never overwrite each other.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountPage, AccountQuery, AccountRepository};
use crate::domain::value_object::{
    account_id::AccountId, account_password::AccountPassword, display_name::DisplayName,
    email::Email, role::Role,
};
use crate::error::{AuthError, AuthResult};

const ACCOUNT_COLUMNS: &str = r#"
    account_id,
    email,
    display_name,
    password_hash,
    role,
    active,
    refresh_tokens,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, value: Uuid) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {clause}");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }
}

/// Unique violations on `accounts.email` become `EmailTaken`
fn map_write_error(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::EmailTaken,
        _ => AuthError::Database(err),
    }
}

/// Escape LIKE wildcards so the search term matches literally
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                email,
                display_name,
                password_hash,
                role,
                active,
                refresh_tokens,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.email.as_str())
        .bind(account.display_name.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.role.id())
        .bind(account.active)
        .bind(&account.refresh_tokens)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        self.fetch_one_where("account_id = $1", *account_id.as_uuid())
            .await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update_profile(&self, account: &Account) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                email = $2,
                display_name = $3,
                password_hash = $4,
                role = $5,
                active = $6,
                updated_at = $7
            WHERE account_id = $1
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.email.as_str())
        .bind(account.display_name.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.role.id())
        .bind(account.active)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::AccountNotFound);
        }

        Ok(())
    }

    async fn delete(&self, account_id: &AccountId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM accounts WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn push_refresh_token(
        &self,
        account_id: &AccountId,
        token: &str,
        retire: &[String],
    ) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_tokens = array_append(
                ARRAY(
                    SELECT held
                    FROM unnest(refresh_tokens) WITH ORDINALITY AS t(held, ord)
                    WHERE held <> ALL($3)
                    ORDER BY ord
                ),
                $2
            )
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(token)
        .bind(retire)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn remove_refresh_token(&self, account_id: &AccountId, token: &str) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_tokens = array_remove(refresh_tokens, $2)
            WHERE account_id = $1 AND $2 = ANY(refresh_tokens)
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(token)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn replace_refresh_token(
        &self,
        account_id: &AccountId,
        old: &str,
        new: &str,
    ) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_tokens = array_replace(refresh_tokens, $2, $3)
            WHERE account_id = $1 AND $2 = ANY(refresh_tokens)
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(old)
        .bind(new)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn clear_refresh_tokens(&self, account_id: &AccountId) -> AuthResult<u64> {
        let removed: Option<i32> = sqlx::query_scalar(
            r#"
            WITH previous AS (
                SELECT cardinality(refresh_tokens) AS n
                FROM accounts
                WHERE account_id = $1
                FOR UPDATE
            )
            UPDATE accounts
            SET refresh_tokens = '{}'
            FROM previous
            WHERE accounts.account_id = $1
            RETURNING previous.n
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let removed = u64::try_from(removed.unwrap_or(0)).unwrap_or(0);
        if removed > 0 {
            tracing::info!(account_id = %account_id, sessions_revoked = removed, "Revoked all sessions");
        }

        Ok(removed)
    }

    async fn list(&self, query: &AccountQuery) -> AuthResult<AccountPage> {
        let roles: Vec<i16> = query.roles.iter().map(Role::id).collect();
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM accounts
            WHERE role = ANY($1)
              AND ($2::text IS NULL OR email ILIKE $2 OR display_name ILIKE $2)
            "#,
        )
        .bind(&roles)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            r#"
            SELECT {ACCOUNT_COLUMNS} FROM accounts
            WHERE role = ANY($1)
              AND ($2::text IS NULL OR email ILIKE $2 OR display_name ILIKE $2)
            ORDER BY created_at DESC, email ASC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(&roles)
            .bind(pattern.as_deref())
            .bind(i64::from(query.per_page))
            .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(AccountRow::into_account)
            .collect::<AuthResult<Vec<_>>>()?;

        Ok(AccountPage {
            items,
            total: u64::try_from(total).unwrap_or(0),
        })
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    email: String,
    display_name: String,
    password_hash: String,
    role: i16,
    active: bool,
    refresh_tokens: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let role = Role::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Unknown role id: {}", self.role)))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            email: Email::from_db(self.email),
            display_name: DisplayName::from_db(self.display_name),
            password_hash: AccountPassword::from_phc_string(self.password_hash)?,
            role,
            active: self.active,
            refresh_tokens: self.refresh_tokens,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ada"), "%ada%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
