use tracing::{debug, error};

use crate::domain::{
    Account, AccountId, AccountType, Cents, OperationType, Transaction, TransactionId,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct LedgerService {
    repo: Repository,
}

/// One page of an account's transaction history.
/// `total` is the full unfiltered count for pagination metadata.
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total: i64,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Account operations
    // ========================

    /// Create a new account.
    pub async fn create_account(
        &self,
        document_number: String,
        account_type: AccountType,
        initial_balance: Cents,
    ) -> Result<Account, AppError> {
        if document_number.trim().is_empty() {
            return Err(AppError::MissingFields);
        }
        if initial_balance < 0 {
            return Err(AppError::NegativeInitialBalance);
        }

        // Document numbers are unique across accounts
        if self
            .repo
            .get_account_by_document(&document_number)
            .await?
            .is_some()
        {
            return Err(AppError::DocumentNumberTaken(document_number));
        }

        let account = Account::new(document_number, account_type, initial_balance);
        self.repo.save_account(&account).await.map_err(|e| {
            error!(account_id = %account.id, "account insert failed: {e:#}");
            AppError::Database(e)
        })?;

        debug!(account_id = %account.id, account_type = %account.account_type, "account created");
        Ok(account)
    }

    /// Get an account by ID.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AppError> {
        self.repo
            .get_account(id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))
    }

    /// Partially update an account: only non-empty supplied fields overwrite
    /// existing values. Zero rows affected means the account does not exist.
    pub async fn update_account(
        &self,
        id: AccountId,
        document_number: Option<String>,
        account_type: Option<AccountType>,
    ) -> Result<Account, AppError> {
        let document_number = document_number.filter(|d| !d.trim().is_empty());

        let rows = self
            .repo
            .update_account(
                id,
                document_number.as_deref(),
                account_type,
                chrono::Utc::now(),
            )
            .await?;

        if rows == 0 {
            return Err(AppError::AccountNotFound(id.to_string()));
        }

        self.get_account(id).await
    }

    /// Delete an account. Its transactions are removed with it.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), AppError> {
        let rows = self.repo.delete_account(id).await?;
        if rows == 0 {
            return Err(AppError::AccountNotFound(id.to_string()));
        }

        debug!(account_id = %id, "account deleted");
        Ok(())
    }

    /// Get the current balance for an account.
    pub async fn get_balance(&self, id: AccountId) -> Result<Cents, AppError> {
        self.repo
            .get_balance(id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))
    }

    // ========================
    // Transaction operations
    // ========================

    /// Create a transaction and apply it to the account's balance.
    ///
    /// PAYMENT credits the balance and requires a positive amount. All other
    /// operation types debit: the stored amount is normalized to negative
    /// regardless of the caller-supplied sign, and the transaction is
    /// rejected when it would drive the balance below zero. The balance
    /// update and the transaction insert persist atomically.
    pub async fn create_transaction(
        &self,
        account_id: AccountId,
        operation_type: OperationType,
        amount: Cents,
        description: Option<String>,
    ) -> Result<Transaction, AppError> {
        let account = self
            .repo
            .get_account(account_id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))?;

        if operation_type == OperationType::Payment && amount <= 0 {
            return Err(AppError::NonPositivePayment);
        }

        let mut transaction = Transaction::new(account_id, operation_type, amount);
        if let Some(desc) = description {
            transaction = transaction.with_description(desc);
        }

        // Friendly pre-check against the balance we just read. The guarded
        // update inside record_transaction is the authoritative check.
        if operation_type.is_debit() && account.balance + transaction.amount < 0 {
            return Err(AppError::InsufficientBalance {
                balance: account.balance,
                requested: transaction.amount.abs(),
            });
        }

        let transaction = transaction.completed();
        let applied = self
            .repo
            .record_transaction(&transaction)
            .await
            .map_err(|e| {
                error!(account_id = %account_id, "transaction write failed: {e:#}");
                AppError::Database(e)
            })?;

        if !applied {
            // A concurrent writer consumed the balance between our read and
            // the guarded update, or the account was deleted under us.
            let balance = self
                .repo
                .get_balance(account_id)
                .await?
                .ok_or_else(|| AppError::AccountNotFound(account_id.to_string()))?;
            return Err(AppError::InsufficientBalance {
                balance,
                requested: transaction.amount.abs(),
            });
        }

        debug!(
            transaction_id = %transaction.id,
            account_id = %account_id,
            operation_type = %operation_type,
            amount = transaction.amount,
            "transaction recorded"
        );
        Ok(transaction)
    }

    /// Get a transaction by ID.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        self.repo
            .get_transaction(id)
            .await?
            .ok_or_else(|| AppError::TransactionNotFound(id.to_string()))
    }

    /// Get one page of an account's transaction history, newest first.
    ///
    /// The limit falls back to 50 when out of range (<= 0 or > 100) and the
    /// offset is clamped to >= 0. An unknown account is not an error: the
    /// page is empty and the total is zero.
    pub async fn transaction_history(
        &self,
        account_id: AccountId,
        limit: i64,
        offset: i64,
    ) -> Result<TransactionPage, AppError> {
        let limit = if limit <= 0 || limit > 100 { 50 } else { limit };
        let offset = offset.max(0);

        let total = self.repo.count_transactions_for_account(account_id).await?;
        let transactions = self
            .repo
            .list_transactions_for_account(account_id, limit, offset)
            .await?;

        Ok(TransactionPage {
            transactions,
            total,
        })
    }

    /// Convenience wrapper: a payment is a PAYMENT transaction.
    pub async fn process_payment(
        &self,
        account_id: AccountId,
        amount: Cents,
        description: Option<String>,
    ) -> Result<Transaction, AppError> {
        self.create_transaction(account_id, OperationType::Payment, amount, description)
            .await
    }
}
