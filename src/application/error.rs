use thiserror::Error;

use crate::domain::Cents;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("missing required fields")]
    MissingFields,

    #[error("invalid account type: {0}")]
    InvalidAccountType(String),

    #[error("invalid operation type: {0}")]
    InvalidOperationType(String),

    #[error("initial balance cannot be negative")]
    NegativeInitialBalance,

    #[error("document number already registered: {0}")]
    DocumentNumberTaken(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("insufficient balance: have {balance}, need {requested}")]
    InsufficientBalance { balance: Cents, requested: Cents },

    #[error("payment amount must be positive")]
    NonPositivePayment,

    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// True for bad input or business-rule violations the caller can fix.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::MissingFields
                | AppError::InvalidAccountType(_)
                | AppError::InvalidOperationType(_)
                | AppError::NegativeInitialBalance
                | AppError::DocumentNumberTaken(_)
                | AppError::InsufficientBalance { .. }
                | AppError::NonPositivePayment
        )
    }

    /// True when the requested entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::AccountNotFound(_) | AppError::TransactionNotFound(_)
        )
    }
}
