// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use tally::application::LedgerService;
use tally::domain::{Account, AccountType};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to create a checking account with the given balance in cents
pub async fn checking_account(service: &LedgerService, balance: i64) -> Result<Account> {
    let account = service
        .create_account("12345678901".into(), AccountType::Checking, balance)
        .await?;
    Ok(account)
}
