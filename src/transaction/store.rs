//! Defines the transaction store trait and its SQLite implementation.
//!
//! Every operation is scoped to a single user. A transaction that exists but
//! belongs to someone else is reported the same way as one that does not exist.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    transaction::core::{
        TRANSACTION_COLUMNS, Transaction, TransactionFields, map_transaction_row,
    },
};

/// Handles the creation, retrieval and modification of a user's transactions.
///
/// The store is the single source of truth: callers never keep a writable
/// copy of the collection and re-read it with [TransactionStore::list] after
/// every change.
pub trait TransactionStore: Clone + Send + Sync + 'static {
    /// Save a new transaction for `user_id`, assigning its ID and creation time.
    fn create(
        &self,
        user_id: UserID,
        fields: TransactionFields,
        created_at: OffsetDateTime,
    ) -> Result<Transaction, Error>;

    /// Retrieve a single transaction.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `user_id` does not own a transaction with `id`.
    fn get(&self, user_id: UserID, id: TransactionId) -> Result<Transaction, Error>;

    /// Replace all of the user editable fields of a transaction.
    ///
    /// The ID and creation time are preserved.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingTransaction] if `user_id` does not own a
    /// transaction with `id`.
    fn update(
        &self,
        user_id: UserID,
        id: TransactionId,
        fields: TransactionFields,
    ) -> Result<Transaction, Error>;

    /// Remove a transaction.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingTransaction] if `user_id` does not own a
    /// transaction with `id`.
    fn delete(&self, user_id: UserID, id: TransactionId) -> Result<(), Error>;

    /// All of the user's transactions, newest first.
    fn list(&self, user_id: UserID) -> Result<Vec<Transaction>, Error>;
}

/// Stores transactions in a SQLite database.
///
/// The user table must exist before the transaction table, see [crate::initialize_db].
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    pub(super) connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl TransactionStore for SQLiteTransactionStore {
    fn create(
        &self,
        user_id: UserID,
        fields: TransactionFields,
        created_at: OffsetDateTime,
    ) -> Result<Transaction, Error> {
        let connection = self.lock()?;

        connection
            .prepare(&format!(
                "INSERT INTO \"transaction\"
                    (user_id, type, amount, category, description, date, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    user_id.as_i64(),
                    fields.transaction_type,
                    fields.amount,
                    fields.category,
                    &fields.description,
                    fields.date,
                    created_at,
                ),
                map_transaction_row,
            )
            .map_err(Error::from)
    }

    fn get(&self, user_id: UserID, id: TransactionId) -> Result<Transaction, Error> {
        let connection = self.lock()?;

        connection
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
                WHERE id = :id AND user_id = :user_id"
            ))?
            .query_row(
                &[(":id", &id), (":user_id", &user_id.as_i64())],
                map_transaction_row,
            )
            .map_err(Error::from)
    }

    fn update(
        &self,
        user_id: UserID,
        id: TransactionId,
        fields: TransactionFields,
    ) -> Result<Transaction, Error> {
        let connection = self.lock()?;

        let result = connection
            .prepare(&format!(
                "UPDATE \"transaction\"
                SET type = ?1, amount = ?2, category = ?3, description = ?4, date = ?5
                WHERE id = ?6 AND user_id = ?7
                RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    fields.transaction_type,
                    fields.amount,
                    fields.category,
                    &fields.description,
                    fields.date,
                    id,
                    user_id.as_i64(),
                ),
                map_transaction_row,
            );

        match result {
            Ok(transaction) => Ok(transaction),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::UpdateMissingTransaction),
            Err(error) => Err(error.into()),
        }
    }

    fn delete(&self, user_id: UserID, id: TransactionId) -> Result<(), Error> {
        let connection = self.lock()?;

        let rows_affected = connection.execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingTransaction);
        }

        Ok(())
    }

    fn list(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;

        connection
            .prepare(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
                WHERE user_id = :user_id
                ORDER BY date DESC, id DESC"
            ))?
            .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
            .map(|row| row.map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        Error,
        auth::{Email, PasswordHash, User, UserID, create_user},
        db::initialize,
        money::Amount,
        transaction::{
            category::{Category, TransactionType},
            core::TransactionFields,
        },
    };

    use super::{SQLiteTransactionStore, TransactionStore};

    pub(crate) fn get_store_with_user() -> (SQLiteTransactionStore, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            Email::new("test@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            None,
            &connection,
        )
        .unwrap();

        (
            SQLiteTransactionStore::new(Arc::new(Mutex::new(connection))),
            user,
        )
    }

    fn add_other_user(store: &SQLiteTransactionStore) -> UserID {
        let connection = store.connection.lock().unwrap();

        create_user(
            Email::new("other@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter3"),
            None,
            &connection,
        )
        .unwrap()
        .id
    }

    fn groceries() -> TransactionFields {
        TransactionFields {
            transaction_type: TransactionType::Expense,
            amount: Amount::from_cents(15075),
            category: Category::Food,
            description: "Groceries".to_owned(),
            date: date!(2025 - 10 - 05),
        }
    }

    #[test]
    fn create_assigns_id_and_created_at() {
        let (store, user) = get_store_with_user();
        let created_at = OffsetDateTime::now_utc();

        let transaction = store.create(user.id, groceries(), created_at).unwrap();

        assert!(transaction.id > 0);
        assert_eq!(transaction.user_id, user.id);
        assert_eq!(transaction.fields(), groceries());
        assert_eq!(transaction.created_at, created_at);
    }

    #[test]
    fn get_returns_created_transaction() {
        let (store, user) = get_store_with_user();
        let want = store
            .create(user.id, groceries(), OffsetDateTime::now_utc())
            .unwrap();

        let got = store.get(user.id, want.id).unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn get_hides_other_users_transactions() {
        let (store, user) = get_store_with_user();
        let other_user = add_other_user(&store);
        let transaction = store
            .create(user.id, groceries(), OffsetDateTime::now_utc())
            .unwrap();

        assert_eq!(store.get(other_user, transaction.id), Err(Error::NotFound));
    }

    #[test]
    fn update_replaces_fields_and_keeps_identity() {
        let (store, user) = get_store_with_user();
        let original = store
            .create(user.id, groceries(), OffsetDateTime::now_utc())
            .unwrap();
        let new_fields = TransactionFields {
            transaction_type: TransactionType::Income,
            amount: Amount::from_cents(500000),
            category: Category::Salary,
            description: "October pay".to_owned(),
            date: date!(2025 - 10 - 01),
        };

        let updated = store
            .update(user.id, original.id, new_fields.clone())
            .unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.fields(), new_fields);
        assert_eq!(store.get(user.id, original.id).unwrap(), updated);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let (store, user) = get_store_with_user();

        assert_eq!(
            store.update(user.id, 42, groceries()),
            Err(Error::UpdateMissingTransaction)
        );
    }

    #[test]
    fn update_other_users_transaction_fails() {
        let (store, user) = get_store_with_user();
        let other_user = add_other_user(&store);
        let transaction = store
            .create(user.id, groceries(), OffsetDateTime::now_utc())
            .unwrap();

        let mut fields = groceries();
        fields.description = "Hijacked".to_owned();

        assert_eq!(
            store.update(other_user, transaction.id, fields),
            Err(Error::UpdateMissingTransaction)
        );
        assert_eq!(store.get(user.id, transaction.id).unwrap(), transaction);
    }

    #[test]
    fn delete_removes_transaction() {
        let (store, user) = get_store_with_user();
        let transaction = store
            .create(user.id, groceries(), OffsetDateTime::now_utc())
            .unwrap();

        store.delete(user.id, transaction.id).unwrap();

        assert_eq!(store.get(user.id, transaction.id), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_transaction_fails() {
        let (store, user) = get_store_with_user();

        assert_eq!(store.delete(user.id, 7), Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn list_is_newest_first_and_scoped_to_user() {
        let (store, user) = get_store_with_user();
        let other_user = add_other_user(&store);
        let now = OffsetDateTime::now_utc();
        let older = store.create(user.id, groceries(), now).unwrap();
        let mut newer_fields = groceries();
        newer_fields.date = date!(2025 - 10 - 06);
        let newer = store.create(user.id, newer_fields, now).unwrap();
        store.create(other_user, groceries(), now).unwrap();

        let got = store.list(user.id).unwrap();

        assert_eq!(got, vec![newer, older]);
    }

    #[test]
    fn reads_rfc3339_dates_as_calendar_dates() {
        let (store, user) = get_store_with_user();
        let transaction = store
            .create(user.id, groceries(), OffsetDateTime::now_utc())
            .unwrap();
        store
            .connection
            .lock()
            .unwrap()
            .execute(
                "UPDATE \"transaction\" SET date = '2025-10-05T21:15:00+13:00' WHERE id = ?1",
                (transaction.id,),
            )
            .unwrap();

        let got = store.get(user.id, transaction.id).unwrap();

        assert_eq!(got.date, date!(2025 - 10 - 05));
    }
}
