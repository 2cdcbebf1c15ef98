use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Account, AccountId, AccountType, Cents, Transaction, TransactionId, TransactionStatus,
};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying accounts and transactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    /// Creates the database file if it doesn't exist. Foreign keys are
    /// enabled on every connection so ON DELETE CASCADE holds.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Account operations
    // ========================

    /// Save a new account to the database.
    pub async fn save_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, document_number, account_type, balance_cents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id.to_string())
        .bind(&account.document_number)
        .bind(account.account_type.as_str())
        .bind(account.balance)
        .bind(account.created_at.timestamp())
        .bind(account.updated_at.timestamp())
        .execute(&self.pool)
        .await
        .context("Failed to save account")?;
        Ok(())
    }

    /// Get an account by ID.
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, document_number, account_type, balance_cents, created_at, updated_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    /// Get an account by document number.
    pub async fn get_account_by_document(&self, document_number: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, document_number, account_type, balance_cents, created_at, updated_at
            FROM accounts
            WHERE document_number = ?
            "#,
        )
        .bind(document_number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account by document number")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    /// Partially update an account. Only supplied fields overwrite existing
    /// values; updated_at is always refreshed. Returns the number of rows
    /// affected (zero when the account does not exist).
    pub async fn update_account(
        &self,
        id: AccountId,
        document_number: Option<&str>,
        account_type: Option<AccountType>,
        updated_at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET document_number = COALESCE(?, document_number),
                account_type    = COALESCE(?, account_type),
                updated_at      = ?
            WHERE id = ?
            "#,
        )
        .bind(document_number)
        .bind(account_type.map(|t| t.as_str()))
        .bind(updated_at.timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update account")?;

        Ok(result.rows_affected())
    }

    /// Delete an account. Cascades to its transactions.
    /// Returns the number of rows affected.
    pub async fn delete_account(&self, id: AccountId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete account")?;

        Ok(result.rows_affected())
    }

    /// Get the current balance for an account.
    pub async fn get_balance(&self, id: AccountId) -> Result<Option<Cents>> {
        let row = sqlx::query("SELECT balance_cents FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch balance")?;

        Ok(row.map(|r| r.get("balance_cents")))
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let id_str: String = row.get("id");
        let account_type_str: String = row.get("account_type");
        let created_at: i64 = row.get("created_at");
        let updated_at: i64 = row.get("updated_at");

        Ok(Account {
            id: Uuid::parse_str(&id_str).context("Invalid account ID")?,
            document_number: row.get("document_number"),
            account_type: AccountType::from_str(&account_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid account type: {}", account_type_str))?,
            balance: row.get("balance_cents"),
            created_at: DateTime::from_timestamp(created_at, 0)
                .context("Invalid created_at timestamp")?,
            updated_at: DateTime::from_timestamp(updated_at, 0)
                .context("Invalid updated_at timestamp")?,
        })
    }

    // ========================
    // Transaction operations
    // ========================

    /// Atomically apply a transaction: adjust the account balance and insert
    /// the transaction row in a single database transaction, so either both
    /// persist or neither does.
    ///
    /// The balance update is guarded so the non-negative invariant is
    /// enforced at write time: a concurrent debit that would drive the
    /// balance negative affects zero rows, the unit rolls back, and
    /// `Ok(false)` is returned. The transaction's amount must already be
    /// sign-normalized.
    pub async fn record_transaction(&self, transaction: &Transaction) -> Result<bool> {
        let mut dbtx = self
            .pool
            .begin()
            .await
            .context("Failed to begin database transaction")?;

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET balance_cents = balance_cents + ?, updated_at = ?
            WHERE id = ? AND balance_cents + ? >= 0
            "#,
        )
        .bind(transaction.amount)
        .bind(transaction.created_at.timestamp())
        .bind(transaction.account_id.to_string())
        .bind(transaction.amount)
        .execute(&mut *dbtx)
        .await
        .context("Failed to update balance")?;

        if result.rows_affected() == 0 {
            dbtx.rollback()
                .await
                .context("Failed to roll back database transaction")?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO transactions (id, account_id, operation_type, amount_cents, description, created_at, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.id.to_string())
        .bind(transaction.account_id.to_string())
        .bind(transaction.operation_type.as_str())
        .bind(transaction.amount)
        .bind(&transaction.description)
        .bind(transaction.created_at.timestamp())
        .bind(transaction.status.as_str())
        .execute(&mut *dbtx)
        .await
        .context("Failed to insert transaction")?;

        dbtx.commit()
            .await
            .context("Failed to commit database transaction")?;

        Ok(true)
    }

    /// Get a transaction by ID.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, operation_type, amount_cents, description, created_at, status
            FROM transactions
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transaction(&row)?)),
            None => Ok(None),
        }
    }

    /// List transactions for an account, newest first, with pagination.
    /// The rowid tie-break keeps ordering stable for rows that share a
    /// created_at second.
    pub async fn list_transactions_for_account(
        &self,
        account_id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, operation_type, amount_cents, description, created_at, status
            FROM transactions
            WHERE account_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(account_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Count all transactions for an account, ignoring pagination.
    pub async fn count_transactions_for_account(&self, account_id: AccountId) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM transactions WHERE account_id = ?")
            .bind(account_id.to_string())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transactions")?;

        Ok(row.get("count"))
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        use crate::domain::OperationType;

        let id_str: String = row.get("id");
        let account_id_str: String = row.get("account_id");
        let operation_type_str: String = row.get("operation_type");
        let status_str: String = row.get("status");
        let created_at: i64 = row.get("created_at");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            account_id: Uuid::parse_str(&account_id_str).context("Invalid account ID")?,
            operation_type: OperationType::from_str(&operation_type_str).ok_or_else(|| {
                anyhow::anyhow!("Invalid operation type: {}", operation_type_str)
            })?,
            amount: row.get("amount_cents"),
            description: row.get("description"),
            created_at: DateTime::from_timestamp(created_at, 0)
                .context("Invalid created_at timestamp")?,
            status: TransactionStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction status: {}", status_str))?,
        })
    }
}
