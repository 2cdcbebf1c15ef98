use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type AccountId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Everyday spending account
    Checking,
    /// Interest-bearing deposit account
    Savings,
    /// Credit line account
    Credit,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "CHECKING",
            AccountType::Savings => "SAVINGS",
            AccountType::Credit => "CREDIT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CHECKING" => Some(AccountType::Checking),
            "SAVINGS" => Some(AccountType::Savings),
            "CREDIT" => Some(AccountType::Credit),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account owns a balance that only transaction processing may mutate.
/// The balance is never negative at rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// External customer identifier, unique across accounts
    pub document_number: String,
    pub account_type: AccountType,
    /// Current balance in cents, >= 0
    pub balance: Cents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account. Timestamps are truncated to whole seconds,
    /// matching the storage representation.
    pub fn new(document_number: String, account_type: AccountType, initial_balance: Cents) -> Self {
        let now = Utc::now().trunc_subsecs(0);
        Self {
            id: Uuid::new_v4(),
            document_number,
            account_type,
            balance: initial_balance,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_roundtrip() {
        for at in [
            AccountType::Checking,
            AccountType::Savings,
            AccountType::Credit,
        ] {
            let s = at.as_str();
            let parsed = AccountType::from_str(s).unwrap();
            assert_eq!(at, parsed);
        }
    }

    #[test]
    fn test_account_type_parse_is_case_insensitive() {
        assert_eq!(
            AccountType::from_str("checking"),
            Some(AccountType::Checking)
        );
        assert_eq!(AccountType::from_str("Savings"), Some(AccountType::Savings));
        assert_eq!(AccountType::from_str("brokerage"), None);
        assert_eq!(AccountType::from_str(""), None);
    }

    #[test]
    fn test_new_account_fields() {
        let account = Account::new("12345678901".into(), AccountType::Checking, 100_000);
        assert_eq!(account.document_number, "12345678901");
        assert_eq!(account.balance, 100_000);
        assert_eq!(account.created_at, account.updated_at);
        assert_eq!(account.created_at.timestamp_subsec_nanos(), 0);
    }
}
