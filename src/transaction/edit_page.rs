//! Defines the route handler for the page for editing an existing transaction.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::Session,
    database_id::TransactionId,
    transaction::{
        create_page::transaction_editor_page,
        form::transaction_form,
        lifecycle::{EditorMode, FieldErrors, TransactionDraft},
        state::TransactionState,
        store::TransactionStore,
    },
};

/// Renders the form pre-filled with the transaction's fields, or the 404 page
/// if the user has no such transaction.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let today = state.today()?;
    let transaction = state
        .store()
        .get(session.user_id, transaction_id)
        .inspect_err(|error| {
            tracing::warn!("could not open transaction {transaction_id} for editing: {error}")
        })?;

    let form = transaction_form(
        EditorMode::Edit(transaction.id),
        &TransactionDraft::from(&transaction),
        &FieldErrors::default(),
        today,
    );

    Ok(transaction_editor_page("Edit Transaction", form).into_response())
}
