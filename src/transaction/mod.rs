//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model, its type and category, and the SQLite store
//! - The editor state machine that validates and submits the transaction form
//! - View and endpoint handlers for the transaction pages

mod category;
mod category_options;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod lifecycle;
mod state;
mod store;
mod transactions_page;

pub use category::{Category, CategoryIcon, TransactionType, icon_for_name};
pub use category_options::get_category_options;
pub use core::{Transaction, TransactionFields, create_transaction_table};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use lifecycle::{
    ConfirmedDeletion, DEFAULT_SUBMIT_TIMEOUT, EditorMode, EditorState, FieldErrors,
    MIN_TRANSACTION_DATE, PendingDeletion, TransactionDraft, TransactionEditor,
    delete_transaction, validate,
};
pub use state::TransactionState;
pub use store::{SQLiteTransactionStore, TransactionStore};
pub use transactions_page::get_transactions_page;
