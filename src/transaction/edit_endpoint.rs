//! Defines the endpoint for replacing the fields of an existing transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    auth::Session,
    database_id::TransactionId,
    endpoints,
    transaction::{
        form::{TransactionForm, transaction_form},
        lifecycle::{EditorMode, TransactionEditor},
        state::TransactionState,
        store::TransactionStore,
    },
};

/// A route handler for editing a transaction, redirects to transactions view on success.
pub async fn edit_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<TransactionState>,
    session: Option<Extension<Session>>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(Extension(session)) = session else {
        return Error::NotAuthenticated.into_alert_response();
    };

    let today = match state.today() {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let store = state.store();
    let existing = match store.get(session.user_id, transaction_id) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::warn!("could not edit transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };

    let draft = form.into_draft();
    let mut editor = TransactionEditor::new();

    if let Err(error) = editor
        .open_edit(&existing)
        .and_then(|_| editor.update_draft(draft.clone()))
    {
        return error.into_alert_response();
    }

    match editor
        .submit(Some(&session), &store, today, state.submit_timeout)
        .await
    {
        Ok(transaction) => {
            tracing::info!("Updated transaction {}", transaction.id);

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::InvalidForm(errors)) => Html(
            transaction_form(EditorMode::Edit(transaction_id), &draft, &errors, today)
                .into_string(),
        )
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        auth::{Email, PasswordHash, Session, create_user},
        endpoints,
        money::Amount,
        test_utils::{assert_hx_redirect, parse_html_fragment},
        transaction::{
            category::{Category, TransactionType},
            core::TransactionFields,
            form::TransactionForm,
            state::tests::get_state_with_session,
            store::TransactionStore,
        },
    };

    use super::edit_transaction_endpoint;

    fn rent() -> TransactionFields {
        TransactionFields {
            transaction_type: TransactionType::Expense,
            amount: Amount::from_cents(120000),
            category: Category::Rent,
            description: "Rent".to_owned(),
            date: date!(2025 - 10 - 01),
        }
    }

    #[tokio::test]
    async fn can_edit_transaction() {
        let (state, session) = get_state_with_session();
        let original = state
            .store()
            .create(session.user_id, rent(), OffsetDateTime::now_utc())
            .unwrap();

        let response = edit_transaction_endpoint(
            Path(original.id),
            State(state.clone()),
            Some(Extension(session)),
            Form(TransactionForm {
                type_: TransactionType::Expense,
                amount: "1250".to_owned(),
                description: "Rent (October)".to_owned(),
                category: Some("Rent".to_owned()),
                date: Some("2025-10-02".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let updated = state.store().get(session.user_id, original.id).unwrap();
        assert_eq!(updated.amount, Amount::from_cents(125000));
        assert_eq!(updated.description, "Rent (October)");
        assert_eq!(updated.date, date!(2025 - 10 - 02));
        assert_eq!(updated.created_at, original.created_at);
    }

    #[tokio::test]
    async fn invalid_edit_keeps_original() {
        let (state, session) = get_state_with_session();
        let original = state
            .store()
            .create(session.user_id, rent(), OffsetDateTime::now_utc())
            .unwrap();

        let response = edit_transaction_endpoint(
            Path(original.id),
            State(state.clone()),
            Some(Extension(session)),
            Form(TransactionForm {
                type_: TransactionType::Expense,
                amount: "abc".to_owned(),
                description: "Rent".to_owned(),
                category: Some("Rent".to_owned()),
                date: Some("2025-10-01".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Amount must be a number."), "got {text}");
        assert_eq!(
            state.store().get(session.user_id, original.id).unwrap(),
            original
        );
    }

    #[tokio::test]
    async fn cannot_edit_another_users_transaction() {
        let (state, session) = get_state_with_session();
        let original = state
            .store()
            .create(session.user_id, rent(), OffsetDateTime::now_utc())
            .unwrap();
        let other_user = create_user(
            Email::new("other@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter3"),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = edit_transaction_endpoint(
            Path(original.id),
            State(state.clone()),
            Some(Extension(Session {
                user_id: other_user.id,
            })),
            Form(TransactionForm {
                type_: TransactionType::Expense,
                amount: "1".to_owned(),
                description: "Stolen".to_owned(),
                category: Some("Rent".to_owned()),
                date: Some("2025-10-01".to_owned()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            state.store().get(session.user_id, original.id).unwrap(),
            original
        );
    }
}
