//! Handlers that change the transaction collection.

use crate::args::{DeleteArgs, TransactionArgs, UpdateArgs};
use crate::commands::{money, Out};
use crate::controller::Controller;
use crate::model::Transaction;
use crate::{Config, Result};
use anyhow::Context;
use chrono::NaiveDate;

/// Validates and records a new transaction. The id assigned by the store is part of the output.
///
/// # Errors
/// - Returns an error listing every rejected field if validation fails. Nothing is stored.
/// - Returns an error if the store fails.
pub async fn add(
    config: &Config,
    controller: &Controller,
    args: &TransactionArgs,
    today: NaiveDate,
) -> Result<Out<Transaction>> {
    let id = controller.create(&args.input(today)).await?;
    let transaction = find(controller, &id)?;
    let message = format!(
        "Added {} {} of {} on {} with ID: {id}",
        transaction.category,
        transaction.r#type,
        money(config.currency_symbol(), transaction.amount.signed()),
        transaction.date,
    );
    Ok(Out::new(message, transaction))
}

/// Validates the new field values and overwrites transaction `args.id()` with them.
///
/// # Errors
/// - Returns an error if validation fails, or if the store fails, e.g. because there is no
///   transaction with that id.
pub async fn update(
    controller: &Controller,
    args: &UpdateArgs,
    today: NaiveDate,
) -> Result<Out<Transaction>> {
    let id = args.id();
    controller
        .update(&args.transaction().input(today), id)
        .await?;
    let transaction = find(controller, id)?;
    Ok(Out::new(format!("Updated transaction {id}"), transaction))
}

/// Deletes transaction `args.id()`. Deleting an id that does not exist is not an error.
pub async fn delete(controller: &Controller, args: &DeleteArgs) -> Result<Out<String>> {
    let id = args.id();
    controller.delete(id).await?;
    Ok(Out::new(format!("Deleted transaction {id}"), id.to_string()))
}

fn find(controller: &Controller, id: &str) -> Result<Transaction> {
    controller
        .snapshot()
        .transactions()
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .with_context(|| format!("Transaction {id} is missing after it was saved"))
}
