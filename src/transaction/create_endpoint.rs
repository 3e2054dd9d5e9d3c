//! Defines the endpoint for creating a new transaction.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    Error,
    auth::Session,
    endpoints,
    transaction::{
        form::{TransactionForm, transaction_form},
        lifecycle::{EditorMode, TransactionEditor},
        state::TransactionState,
    },
};

/// A route handler for creating a new transaction, redirects to transactions view on success.
///
/// Invalid input returns the form with a message next to each invalid field.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    session: Option<Extension<Session>>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = match state.today() {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let draft = form.into_draft();
    let mut editor = TransactionEditor::new();

    if let Err(error) = editor
        .open_create(today)
        .and_then(|_| editor.update_draft(draft.clone()))
    {
        return error.into_alert_response();
    }

    let session = session.map(|Extension(session)| session);
    let store = state.store();

    match editor
        .submit(session.as_ref(), &store, today, state.submit_timeout)
        .await
    {
        Ok(transaction) => {
            tracing::info!("Created transaction {}", transaction.id);

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::InvalidForm(errors)) => {
            Html(transaction_form(EditorMode::Create, &draft, &errors, today).into_string())
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        endpoints,
        money::Amount,
        test_utils::{assert_hx_redirect, parse_html_fragment},
        transaction::{
            category::{Category, TransactionType},
            form::TransactionForm,
            state::tests::get_state_with_session,
            store::TransactionStore,
        },
    };

    use super::create_transaction_endpoint;

    fn groceries_form(date: String) -> TransactionForm {
        TransactionForm {
            type_: TransactionType::Expense,
            amount: "150.75".to_owned(),
            description: "Groceries".to_owned(),
            category: Some("Food".to_owned()),
            date: Some(date),
        }
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, session) = get_state_with_session();
        let today = OffsetDateTime::now_utc().date();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Some(Extension(session)),
            Form(groceries_form(today.to_string())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);

        let transactions = state.store().list(session.user_id).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, Amount::from_cents(15075));
        assert_eq!(transactions[0].category, Category::Food);
        assert_eq!(transactions[0].date, today);
    }

    #[tokio::test]
    async fn invalid_form_returns_form_with_errors() {
        let (state, session) = get_state_with_session();
        let mut form = groceries_form(OffsetDateTime::now_utc().date().to_string());
        form.amount = "-5".to_owned();
        form.description = "x".to_owned();

        let response =
            create_transaction_endpoint(State(state.clone()), Some(Extension(session)), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let messages = html
            .select(&Selector::parse("form p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(
            messages,
            vec![
                "Amount must be positive.",
                "Description must be at least 2 characters."
            ]
        );
        assert!(state.store().list(session.user_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn future_date_is_rejected() {
        let (state, session) = get_state_with_session();
        let tomorrow = OffsetDateTime::now_utc().date().next_day().unwrap();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Some(Extension(session)),
            Form(groceries_form(tomorrow.to_string())),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Date cannot be in the future."), "got {text}");
        assert!(state.store().list(session.user_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_must_match_type() {
        let (state, session) = get_state_with_session();
        let mut form = groceries_form(OffsetDateTime::now_utc().date().to_string());
        form.type_ = TransactionType::Income;

        let response =
            create_transaction_endpoint(State(state.clone()), Some(Extension(session)), Form(form))
                .await;

        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Please select a category."), "got {text}");
    }

    #[tokio::test]
    async fn requires_session() {
        let (state, session) = get_state_with_session();

        let response = create_transaction_endpoint(
            State(state.clone()),
            None,
            Form(groceries_form(OffsetDateTime::now_utc().date().to_string())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(state.store().list(session.user_id).unwrap().is_empty());
    }
}
