//! Defines the route handler for the page for creating a new transaction.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error, endpoints,
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    transaction::{
        form::transaction_form,
        lifecycle::{EditorMode, FieldErrors, TransactionDraft},
        state::TransactionState,
    },
};

/// Wrap a transaction form in a full page with the nav bar.
pub(super) fn transaction_editor_page(title: &str, form: Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                div class="flex items-center justify-between"
                {
                    h2 class="text-xl font-bold" { (title) }
                    a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Cancel" }
                }

                (form)
            }
        }
    };

    base(title, &[dollar_input_styles()], &content)
}

/// Renders the page for creating a transaction.
pub async fn get_create_transaction_page(
    State(state): State<TransactionState>,
) -> Result<Response, Error> {
    let today = state.today()?;
    let form = transaction_form(
        EditorMode::Create,
        &TransactionDraft::new(today),
        &FieldErrors::default(),
        today,
    );

    Ok(transaction_editor_page("New Transaction", form).into_response())
}

#[cfg(test)]
mod view_tests {
    use axum::{extract::State, http::StatusCode};
    use time::OffsetDateTime;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
        transaction::state::tests::get_state_with_session,
    };

    use super::get_create_transaction_page;

    #[tokio::test]
    async fn render_page() {
        let (state, _) = get_state_with_session();

        let response = get_create_transaction_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        let today = OffsetDateTime::now_utc().date().to_string();
        assert_form_input_with_value(&form, "date", "date", &today);
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let (mut state, _) = get_state_with_session();
        state.local_timezone = "Middle/Earth".to_owned();

        let result = get_create_transaction_page(State(state)).await;

        assert!(result.is_err());
    }
}
