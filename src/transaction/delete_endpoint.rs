//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    alert::Alert,
    auth::Session,
    database_id::TransactionId,
    transaction::{
        lifecycle::{PendingDeletion, delete_transaction},
        state::TransactionState,
    },
};

/// Whether the user confirmed the delete.
///
/// The delete button asks for confirmation in the browser and sends
/// `?confirmed=true` once the user agrees.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirmed: bool,
}

/// A route handler for deleting a transaction, returns an alert with the outcome.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<DeleteQuery>,
    State(state): State<TransactionState>,
    session: Option<Extension<Session>>,
) -> Response {
    let pending = PendingDeletion::new(transaction_id);

    if !query.confirmed {
        tracing::debug!("delete of transaction {} was not confirmed", pending.id());

        return (
            StatusCode::BAD_REQUEST,
            Alert::ErrorSimple {
                message: "Deleting a transaction must be confirmed.".to_owned(),
            },
        )
            .into_response();
    }

    let session = session.map(|Extension(session)| session);

    match delete_transaction(
        session.as_ref(),
        &state.store(),
        pending.confirm(),
        state.submit_timeout,
    )
    .await
    {
        Ok(()) => {
            tracing::info!("Deleted transaction {transaction_id}");

            Alert::SuccessSimple {
                message: "Transaction deleted.".to_owned(),
            }
            .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
