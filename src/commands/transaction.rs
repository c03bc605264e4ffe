//! Transaction command handlers.

use crate::args::{AddTransactionArgs, ListTransactionsArgs, UpdateTransactionArgs};
use crate::commands::{count, Out};
use crate::dashboard::UNCATEGORIZED;
use crate::model::{generate_id, Transaction, TransactionFields, TransactionType};
use crate::{App, Config, Result};
use anyhow::bail;
use chrono::Local;

/// Handles `hotelflow transaction list`, optionally narrowed by a search text and a project.
/// Transactions are listed newest first; those on the same date keep their stored order.
/// Requires `viewTransactions`.
pub async fn list_transactions(
    config: Config,
    args: ListTransactionsArgs,
) -> Result<Out<Vec<Transaction>>> {
    let app = config.open()?;
    let mut found: Vec<Transaction> = app
        .search_transactions(args.search().unwrap_or_default())?
        .into_iter()
        .filter(|t| args.project().map_or(true, |p| t.project_id() == p))
        .cloned()
        .collect();
    found.sort_by(|a, b| b.date().cmp(&a.date()));
    let mut message = count(found.len(), "transaction");
    for t in &found {
        message.push_str(&format!("\n{}", line(&app, t)));
    }
    Ok(Out::new(message, found))
}

/// Handles `hotelflow transaction add`. The transaction gets a fresh id and goes to the top of
/// the list. Requires `addTransactions`.
///
/// # Errors
/// - Returns an error if the project does not exist or the category does not match the type.
pub async fn add_transaction(
    config: Config,
    args: AddTransactionArgs,
) -> Result<Out<Transaction>> {
    let mut app = config.open()?;
    let transaction = Transaction::try_from(TransactionFields {
        id: generate_id(),
        project_id: args.project().to_string(),
        date: args.date().unwrap_or_else(|| Local::now().date_naive()),
        transaction_type: args.transaction_type(),
        category: args.category(),
        amount: args.amount(),
        description: args.description().trim().to_string(),
    })?;
    app.add_transaction(transaction.clone())?;
    Ok(Out::new(
        format!("Added transaction {}", line(&app, &transaction)),
        transaction,
    ))
}

/// Handles `hotelflow transaction update`. Requires `editTransactions`.
///
/// # Errors
/// - Returns an error if there is no transaction with the given id, if the new project does not
///   exist, or if the resulting category does not match the resulting type.
pub async fn update_transaction(
    config: Config,
    args: UpdateTransactionArgs,
) -> Result<Out<Transaction>> {
    let mut app = config.open()?;
    let mut fields = match app.transactions().get(args.id()) {
        Some(t) => t.fields(),
        None => bail!("Transaction not found: {}", args.id()),
    };
    if let Some(project) = args.project() {
        fields.project_id = project.to_string();
    }
    if let Some(transaction_type) = args.transaction_type() {
        fields.transaction_type = transaction_type;
    }
    if let Some(category) = args.category() {
        fields.category = Some(category);
    }
    if let Some(amount) = args.amount() {
        fields.amount = amount;
    }
    if let Some(date) = args.date() {
        fields.date = date;
    }
    if let Some(description) = args.description() {
        fields.description = description.trim().to_string();
    }
    let transaction = Transaction::try_from(fields)?;
    let _ = app.update_transaction(transaction.clone())?;
    Ok(Out::new(
        format!("Updated transaction {}", transaction.id()),
        transaction,
    ))
}

/// Handles `hotelflow transaction delete`. Requires `deleteTransactions`.
pub async fn delete_transaction(config: Config, id: &str) -> Result<Out<Transaction>> {
    let mut app = config.open()?;
    match app.delete_transaction(id)? {
        Some(t) => Ok(Out::new(format!("Deleted transaction {id}"), t)),
        None => bail!("Transaction not found: {id}"),
    }
}

fn line(app: &App, t: &Transaction) -> String {
    let sign = match t.transaction_type() {
        TransactionType::Income => "+",
        TransactionType::Expense => "-",
    };
    format!(
        "{}  {}  {}  {}  {}{}  {}",
        t.id(),
        t.date(),
        app.ledger().project_name(t.project_id()),
        t.category()
            .map(|c| c.to_string())
            .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        sign,
        t.amount().currency(),
        t.description()
    )
}
