//! Defines the core data models and database schema for transactions.

use rusqlite::{Connection, Row, types::Type};
use serde::Serialize;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

use crate::{
    auth::UserID,
    database_id::TransactionId,
    money::Amount,
    transaction::category::{Category, TransactionType},
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction, assigned by the store.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
    /// How much money was earned or spent. Always positive.
    pub amount: Amount,
    /// What the money was earned or spent on.
    pub category: Category,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction was first saved.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// The user editable fields of the transaction.
    pub fn fields(&self) -> TransactionFields {
        TransactionFields {
            transaction_type: self.transaction_type,
            amount: self.amount,
            category: self.category,
            description: self.description.clone(),
            date: self.date,
        }
    }
}

/// The validated, user editable content of a transaction.
///
/// Creating a transaction stores these fields under a new ID, and editing a
/// transaction replaces all of them at once.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFields {
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
    /// Must be positive.
    pub amount: Amount,
    /// Must be one of [Category::allowed_for] the transaction type.
    pub category: Category,
    /// At least two characters.
    pub description: String,
    /// No later than today.
    pub date: Date,
}

// ============================================================================
// DATES
// ============================================================================

/// Turn a stored date into a calendar date.
///
/// Dates are written as `YYYY-MM-DD`, but a row may also hold a full RFC 3339
/// date-time (e.g. `2025-10-05T14:30:00+13:00`) or a SQLite style date-time
/// (`2025-10-05 14:30:00`). The calendar date in the value's own offset is kept.
pub fn normalize_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();

    if let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) {
        return Some(date);
    }

    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(date_time.date());
    }

    raw.get(..10)
        .filter(|_| matches!(raw.as_bytes().get(10), Some(b' ') | Some(b'T')))
        .and_then(|prefix| Date::parse(prefix, format_description!("[year]-[month]-[day]")).ok())
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// Requires the user table to exist.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount INTEGER NOT NULL CHECK (amount > 0),
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// The columns expected by [map_transaction_row], in order.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, user_id, type, amount, category, description, date, created_at";

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_date: String = row.get(6)?;
    let date = normalize_date(&raw_date).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            Type::Text,
            format!("could not read \"{raw_date}\" as a date").into(),
        )
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        transaction_type: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        date,
        created_at: row.get(7)?,
    })
}
