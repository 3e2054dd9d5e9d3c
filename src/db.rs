/*! This module sets up the application's database schema. */

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error, auth::create_user_table, budget_goal::create_budget_goal_table,
    transaction::create_transaction_table,
};

/// Enable foreign keys and create the tables for users, transactions and budget goals.
///
/// Tables that already exist are left untouched, so this is safe to call on
/// every start-up.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Must be set outside of a transaction to take effect.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_goal_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
