//! Defines the route handler for the page that lists a user's transactions.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    auth::Session,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, category_badge, format_currency,
    },
    navigation::NavBar,
    transaction::{
        category::TransactionType, core::Transaction, state::TransactionState,
        store::TransactionStore,
    },
};

fn signed_amount(transaction: &Transaction) -> Markup {
    match transaction.transaction_type {
        TransactionType::Income => html! {
            span class="text-green-600 dark:text-green-400" { "+" (format_currency(transaction.amount)) }
        },
        TransactionType::Expense => html! {
            span class="text-red-600 dark:text-red-400" { (format_currency(-transaction.amount)) }
        },
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format!(
        "{}?confirmed=true",
        format_endpoint(endpoints::TRANSACTION, transaction.id)
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (category_badge(transaction.category)) }
            td class={ (TABLE_CELL_STYLE) " text-right" } { (signed_amount(transaction)) }
            td class={ (TABLE_CELL_STYLE) " flex gap-4" }
            {
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                button
                    hx-delete=(delete_url)
                    hx-confirm={
                        "Are you sure you want to delete '" (transaction.description) "'? This cannot be undone."
                    }
                    hx-target="closest tr"
                    hx-target-error="#alert-container"
                    hx-swap="delete"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

fn transactions_view(transactions: &[Transaction]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex items-center justify-between mb-4"
            {
                h1 class="text-xl font-bold" { "Transactions" }
                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Add transaction" }
            }

            @if transactions.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "No transactions yet. "
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Add your first transaction" }
                    " to start tracking your budget."
                }
            } @else {
                div class="overflow-x-auto rounded"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction))
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

/// Render all of the user's transactions, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let transactions = state
        .store()
        .list(session.user_id)
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;

    Ok(transactions_view(&transactions).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        money::Amount,
        test_utils::{assert_hx_endpoint, assert_valid_html, parse_html_document},
        transaction::{
            category::{Category, TransactionType},
            core::TransactionFields,
            state::tests::get_state_with_session,
            store::TransactionStore,
        },
    };

    use super::get_transactions_page;

    #[tokio::test]
    async fn lists_transactions_newest_first() {
        let (state, session) = get_state_with_session();
        let store = state.store();
        for (description, date, cents) in [
            ("Groceries", date!(2025 - 10 - 05), 15075),
            ("Coffee", date!(2025 - 10 - 07), 350),
            ("Bus fare", date!(2025 - 10 - 06), 420),
        ] {
            store
                .create(
                    session.user_id,
                    TransactionFields {
                        transaction_type: TransactionType::Expense,
                        amount: Amount::from_cents(cents),
                        category: Category::Food,
                        description: description.to_owned(),
                        date,
                    },
                    OffsetDateTime::now_utc(),
                )
                .unwrap();
        }

        let response = get_transactions_page(State(state), Extension(session))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let rows = document
            .select(&Selector::parse("tbody tr").unwrap())
            .collect::<Vec<_>>();
        let descriptions = rows
            .iter()
            .map(|row| {
                row.select(&Selector::parse("td:nth-child(2)").unwrap())
                    .next()
                    .unwrap()
                    .text()
                    .collect::<String>()
            })
            .collect::<Vec<_>>();
        assert_eq!(descriptions, vec!["Coffee", "Bus fare", "Groceries"]);

        let first_row_text = rows[0].text().collect::<String>();
        assert!(first_row_text.contains("-$3.50"), "got {first_row_text}");

        let delete_button = rows[0]
            .select(&Selector::parse("button").unwrap())
            .next()
            .unwrap();
        let id = rows[0].value().attr("data-transaction-id").unwrap();
        assert_hx_endpoint(
            &delete_button,
            &format!("/api/transactions/{id}?confirmed=true"),
            "hx-delete",
        );
        assert!(delete_button.value().attr("hx-confirm").is_some());
    }

    #[tokio::test]
    async fn shows_empty_state() {
        let (state, session) = get_state_with_session();

        let response = get_transactions_page(State(state), Extension(session))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("No transactions yet."), "got {text}");
    }
}
