//! The state shared by the transaction pages and endpoints.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::extract::FromRef;
use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{AppState, Error, timezone::get_local_offset, transaction::SQLiteTransactionStore};

/// The state needed to show and change transactions.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// How long to wait for the store before reporting a failed write.
    pub submit_timeout: Duration,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            submit_timeout: state.submit_timeout,
        }
    }
}

impl TransactionState {
    pub fn store(&self) -> SQLiteTransactionStore {
        SQLiteTransactionStore::new(self.db_connection.clone())
    }

    /// Today's date in the server's timezone.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezoneError] if the configured timezone is unknown.
    pub fn today(&self) -> Result<Date, Error> {
        let Some(local_offset) = get_local_offset(&self.local_timezone) else {
            tracing::error!("Invalid timezone {}", self.local_timezone);
            return Err(Error::InvalidTimezoneError(self.local_timezone.clone()));
        };

        Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
    }
}
