//! SpendWise is a web app for tracking income and expenses against monthly
//! budget goals.
//!
//! This library provides a REST API that directly serves HTML pages. Pages are
//! rendered on the server and updated in place with htmx.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod advice;
mod alert;
mod app_state;
mod auth;
mod budget_goal;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod error;
mod html;
mod internal_server_error;
mod logging;
mod money;
mod navigation;
mod not_found;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use advice::{
    DEFAULT_ADVICE_TIMEOUT, DisabledGenerativeService, GenerativeService, GenkitClient,
};
pub use app_state::AppState;
pub use auth::{Email, PasswordHash, User, UserID, ValidatedPassword, create_user};
pub use budget_goal::{BudgetGoalFields, set_budget_goal};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Amount;
pub use routing::build_router;
pub use transaction::{
    Category, DEFAULT_SUBMIT_TIMEOUT, SQLiteTransactionStore, TransactionFields, TransactionStore,
    TransactionType,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
