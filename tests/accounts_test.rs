mod common;

use anyhow::Result;
use common::{checking_account, test_service};
use tally::application::AppError;
use tally::domain::AccountType;
use uuid::Uuid;

#[tokio::test]
async fn test_create_and_get_account() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let created = service
        .create_account("12345678901".to_string(), AccountType::Checking, 100_000)
        .await?;

    let fetched = service.get_account(created.id).await?;
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.document_number, "12345678901");
    assert_eq!(fetched.account_type, AccountType::Checking);
    assert_eq!(fetched.balance, 100_000);
    assert_eq!(fetched.created_at, created.created_at);
    assert_eq!(fetched.updated_at, created.updated_at);

    Ok(())
}

#[tokio::test]
async fn test_create_account_with_zero_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let account = service
        .create_account("98765432100".to_string(), AccountType::Savings, 0)
        .await?;
    assert_eq!(account.balance, 0);
    assert_eq!(service.get_balance(account.id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_create_account_rejects_empty_document() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .create_account("".to_string(), AccountType::Checking, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingFields));

    let err = service
        .create_account("   ".to_string(), AccountType::Checking, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingFields));

    Ok(())
}

#[tokio::test]
async fn test_create_account_rejects_negative_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .create_account("12345678901".to_string(), AccountType::Checking, -1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NegativeInitialBalance));

    Ok(())
}

#[tokio::test]
async fn test_create_account_rejects_duplicate_document() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .create_account("12345678901".to_string(), AccountType::Checking, 0)
        .await?;

    let err = service
        .create_account("12345678901".to_string(), AccountType::Savings, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DocumentNumberTaken(_)));

    Ok(())
}

#[tokio::test]
async fn test_get_account_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.get_account(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(_)));
    assert!(err.is_not_found());

    Ok(())
}

#[tokio::test]
async fn test_update_account_partial_fields() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = checking_account(&service, 50_000).await?;

    // Update only the document number; type and balance are preserved
    let updated = service
        .update_account(account.id, Some("20987654321".to_string()), None)
        .await?;
    assert_eq!(updated.document_number, "20987654321");
    assert_eq!(updated.account_type, AccountType::Checking);
    assert_eq!(updated.balance, 50_000);

    // Update only the type; document number is preserved
    let updated = service
        .update_account(account.id, None, Some(AccountType::Credit))
        .await?;
    assert_eq!(updated.document_number, "20987654321");
    assert_eq!(updated.account_type, AccountType::Credit);

    // An empty document number is treated as not supplied
    let updated = service
        .update_account(account.id, Some("".to_string()), None)
        .await?;
    assert_eq!(updated.document_number, "20987654321");

    Ok(())
}

#[tokio::test]
async fn test_update_account_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .update_account(Uuid::new_v4(), Some("20987654321".to_string()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_delete_account() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = checking_account(&service, 0).await?;

    service.delete_account(account.id).await?;

    let err = service.get_account(account.id).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(_)));

    // Deleting again reports not found
    let err = service.delete_account(account.id).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_delete_account_cascades_to_transactions() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = checking_account(&service, 0).await?;

    let transaction = service
        .process_payment(account.id, 10_000, Some("initial deposit".to_string()))
        .await?;

    service.delete_account(account.id).await?;

    let err = service.get_transaction(transaction.id).await.unwrap_err();
    assert!(matches!(err, AppError::TransactionNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_get_balance_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.get_balance(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(_)));

    Ok(())
}
