use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, Cents};

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    CashPurchase,
    InstallmentPurchase,
    Withdrawal,
    Payment,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::CashPurchase => "CASH_PURCHASE",
            OperationType::InstallmentPurchase => "INSTALLMENT_PURCHASE",
            OperationType::Withdrawal => "WITHDRAWAL",
            OperationType::Payment => "PAYMENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CASH_PURCHASE" => Some(OperationType::CashPurchase),
            "INSTALLMENT_PURCHASE" => Some(OperationType::InstallmentPurchase),
            "WITHDRAWAL" => Some(OperationType::Withdrawal),
            "PAYMENT" => Some(OperationType::Payment),
            _ => None,
        }
    }

    /// Debit operations reduce the account balance; PAYMENT is the only credit.
    pub fn is_debit(&self) -> bool {
        !matches!(self, OperationType::Payment)
    }

    /// Normalize a caller-supplied amount to its stored, signed form.
    ///
    /// Payments keep their sign (callers must supply a positive amount,
    /// enforced upstream). Debits always store a negative amount, whichever
    /// sign the caller passed.
    pub fn signed_amount(&self, amount: Cents) -> Cents {
        if self.is_debit() { -amount.abs() } else { amount }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(TransactionStatus::Pending),
            "COMPLETED" => Some(TransactionStatus::Completed),
            "FAILED" => Some(TransactionStatus::Failed),
            "CANCELLED" => Some(TransactionStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction is the append-only record of a balance-affecting event.
/// The stored amount is signed: positive for credits, negative for debits.
/// Transactions are never updated or deleted once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub operation_type: OperationType,
    /// Signed amount in cents as stored
    pub amount: Cents,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: TransactionStatus,
}

impl Transaction {
    /// Create a new pending transaction with the amount sign-normalized
    /// for its operation type.
    pub fn new(account_id: AccountId, operation_type: OperationType, amount: Cents) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            operation_type,
            amount: operation_type.signed_amount(amount),
            description: None,
            created_at: Utc::now().trunc_subsecs(0),
            status: TransactionStatus::Pending,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn completed(mut self) -> Self {
        self.status = TransactionStatus::Completed;
        self
    }
}
