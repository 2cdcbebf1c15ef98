use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{AppError, LedgerService};
use crate::domain::{format_cents, parse_cents, AccountType, OperationType, Transaction};

/// Tally - Minimal Account Ledger
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "A minimal ledger: accounts, balances, and typed transactions")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "tally.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Transaction commands
    #[command(subcommand)]
    Tx(TxCommands),

    /// Record a payment (shorthand for a PAYMENT transaction)
    Pay {
        /// Account ID
        account: String,

        /// Payment amount (e.g., "100.50" or "100")
        #[arg(short, long)]
        amount: String,

        /// Description of the payment
        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Document number (unique external customer identifier)
        document: String,

        /// Account type: checking, savings, credit
        #[arg(short = 't', long = "type")]
        account_type: String,

        /// Initial balance (e.g., "1000.00", defaults to 0)
        #[arg(short, long)]
        balance: Option<String>,
    },

    /// Show an account
    Show {
        /// Account ID
        id: String,
    },

    /// Update an account's document number and/or type
    Update {
        /// Account ID
        id: String,

        /// New document number
        #[arg(long)]
        document: Option<String>,

        /// New account type: checking, savings, credit
        #[arg(short = 't', long = "type")]
        account_type: Option<String>,
    },

    /// Delete an account and its transactions
    Delete {
        /// Account ID
        id: String,
    },

    /// Show an account's current balance
    Balance {
        /// Account ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Create a transaction against an account
    Create {
        /// Account ID
        account: String,

        /// Operation type: cash_purchase, installment_purchase, withdrawal, payment
        #[arg(short = 't', long = "type")]
        operation_type: String,

        /// Amount (e.g., "50.00" or "50"; debits are stored negative)
        #[arg(short, long)]
        amount: String,

        /// Description of the transaction
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Show a transaction
    Show {
        /// Transaction ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an account's transaction history, newest first
    History {
        /// Account ID
        account: String,

        /// Maximum transactions per page (out-of-range values fall back to 50)
        #[arg(short, long, default_value = "50")]
        limit: i64,

        /// Number of transactions to skip
        #[arg(short, long, default_value = "0")]
        offset: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Account(account_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_account_command(&service, account_cmd).await?;
            }

            Commands::Tx(tx_cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_tx_command(&service, tx_cmd).await?;
            }

            Commands::Pay {
                account,
                amount,
                description,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let account_id = parse_account_id(&account)?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

                let transaction = service
                    .process_payment(account_id, amount_cents, description)
                    .await?;

                println!(
                    "Recorded payment: {} -> account {} ({})",
                    format_cents(transaction.amount),
                    transaction.account_id,
                    transaction.id
                );
            }
        }

        Ok(())
    }
}

async fn run_account_command(service: &LedgerService, cmd: AccountCommands) -> Result<()> {
    match cmd {
        AccountCommands::Create {
            document,
            account_type,
            balance,
        } => {
            let account_type = parse_account_type(&account_type)?;
            let initial_balance = balance
                .map(|b| parse_cents(&b))
                .transpose()
                .context("Invalid balance format. Use '1000.00' or '1000'")?
                .unwrap_or(0);

            let account = service
                .create_account(document, account_type, initial_balance)
                .await?;

            println!(
                "Created {} account {} (document {}, balance {})",
                account.account_type,
                account.id,
                account.document_number,
                format_cents(account.balance)
            );
        }

        AccountCommands::Show { id } => {
            let account = service.get_account(parse_account_id(&id)?).await?;

            println!("Account:   {}", account.id);
            println!("Document:  {}", account.document_number);
            println!("Type:      {}", account.account_type);
            println!("Balance:   {}", format_cents(account.balance));
            println!("Created:   {}", account.created_at);
            println!("Updated:   {}", account.updated_at);
        }

        AccountCommands::Update {
            id,
            document,
            account_type,
        } => {
            let account_type = account_type
                .map(|t| parse_account_type(&t))
                .transpose()?;

            let account = service
                .update_account(parse_account_id(&id)?, document, account_type)
                .await?;

            println!(
                "Updated account {} (document {}, type {})",
                account.id, account.document_number, account.account_type
            );
        }

        AccountCommands::Delete { id } => {
            let account_id = parse_account_id(&id)?;
            service.delete_account(account_id).await?;
            println!("Deleted account {}", account_id);
        }

        AccountCommands::Balance { id } => {
            let balance = service.get_balance(parse_account_id(&id)?).await?;
            println!("{}", format_cents(balance));
        }
    }

    Ok(())
}

async fn run_tx_command(service: &LedgerService, cmd: TxCommands) -> Result<()> {
    match cmd {
        TxCommands::Create {
            account,
            operation_type,
            amount,
            description,
        } => {
            let account_id = parse_account_id(&account)?;
            let operation_type = parse_operation_type(&operation_type)?;
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;

            let transaction = service
                .create_transaction(account_id, operation_type, amount_cents, description)
                .await?;

            println!(
                "Recorded {} of {} against account {} ({})",
                transaction.operation_type,
                format_cents(transaction.amount),
                transaction.account_id,
                transaction.id
            );
        }

        TxCommands::Show { id, json } => {
            let transaction_id =
                Uuid::parse_str(&id).context("Invalid transaction ID format (expected UUID)")?;
            let transaction = service.get_transaction(transaction_id).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&transaction)?);
            } else {
                print_transaction(&transaction);
            }
        }

        TxCommands::History {
            account,
            limit,
            offset,
            json,
        } => {
            let account_id = parse_account_id(&account)?;
            let page = service.transaction_history(account_id, limit, offset).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&page.transactions)?);
                return Ok(());
            }

            if page.transactions.is_empty() {
                println!("No transactions found ({} total)", page.total);
                return Ok(());
            }

            for transaction in &page.transactions {
                println!(
                    "{}  {:>12}  {:<21}  {}  {}",
                    transaction.created_at,
                    format_cents(transaction.amount),
                    transaction.operation_type,
                    transaction.id,
                    transaction.description.as_deref().unwrap_or("")
                );
            }
            println!(
                "Showing {} of {} transaction(s)",
                page.transactions.len(),
                page.total
            );
        }
    }

    Ok(())
}

fn print_transaction(transaction: &Transaction) {
    println!("Transaction: {}", transaction.id);
    println!("Account:     {}", transaction.account_id);
    println!("Operation:   {}", transaction.operation_type);
    println!("Amount:      {}", format_cents(transaction.amount));
    println!("Status:      {}", transaction.status);
    println!("Created:     {}", transaction.created_at);
    if let Some(description) = &transaction.description {
        println!("Description: {}", description);
    }
}

fn parse_account_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).context("Invalid account ID format (expected UUID)")
}

fn parse_account_type(s: &str) -> Result<AccountType> {
    if s.trim().is_empty() {
        return Err(AppError::MissingFields.into());
    }
    AccountType::from_str(s).ok_or_else(|| AppError::InvalidAccountType(s.to_string()).into())
}

fn parse_operation_type(s: &str) -> Result<OperationType> {
    if s.trim().is_empty() {
        return Err(AppError::MissingFields.into());
    }
    OperationType::from_str(s).ok_or_else(|| AppError::InvalidOperationType(s.to_string()).into())
}
