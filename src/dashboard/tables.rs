//! Table views for dashboard data display.
//!
//! Provides the table of the user's most recent transactions.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{LINK_STYLE, TABLE_CELL_STYLE, TABLE_ROW_STYLE, category_badge, format_currency},
    transaction::{Transaction, TransactionType},
};

/// How many transactions the dashboard shows.
pub(super) const RECENT_TRANSACTION_COUNT: usize = 5;

const TABLE_CELL_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const TABLE_CELL_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Renders the first [RECENT_TRANSACTION_COUNT] of `transactions`.
///
/// `transactions` should already be ordered newest first.
pub(super) fn recent_transactions_table(transactions: &[Transaction]) -> Markup {
    html! {
        div class="w-full" data-testid="recent-transactions"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Recent Transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            div class="overflow-x-auto rounded-lg shadow" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class="text-xs text-gray-900 uppercase bg-gray-100 dark:bg-gray-700 dark:text-gray-400" {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                        }
                    }
                    tbody {
                        @for transaction in transactions.iter().take(RECENT_TRANSACTION_COUNT) {
                            tr class=(TABLE_ROW_STYLE) {
                                td class={(TABLE_CELL_STYLE) " whitespace-nowrap"} { (transaction.date) }
                                td class=(TABLE_CELL_STYLE) { (transaction.description) }
                                td class=(TABLE_CELL_STYLE) { (category_badge(transaction.category)) }
                                @match transaction.transaction_type {
                                    TransactionType::Income => {
                                        td class={(TABLE_CELL_STYLE) " text-right " (TABLE_CELL_GREEN_STYLE)} {
                                            "+" (format_currency(transaction.amount))
                                        }
                                    }
                                    TransactionType::Expense => {
                                        td class={(TABLE_CELL_STYLE) " text-right " (TABLE_CELL_RED_STYLE)} {
                                            (format_currency(-transaction.amount))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::{OffsetDateTime, macros::date};

    use crate::{
        auth::UserID,
        money::Amount,
        transaction::{Category, Transaction, TransactionType},
    };

    use super::{RECENT_TRANSACTION_COUNT, recent_transactions_table};

    fn transaction(id: i64, transaction_type: TransactionType, cents: i64) -> Transaction {
        Transaction {
            id,
            user_id: UserID::new(1),
            transaction_type,
            amount: Amount::from_cents(cents),
            category: match transaction_type {
                TransactionType::Income => Category::Salary,
                TransactionType::Expense => Category::Food,
            },
            description: format!("Transaction {id}"),
            date: date!(2025 - 10 - 01),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn shows_at_most_five_transactions() {
        let transactions = (1..=8)
            .map(|id| transaction(id, TransactionType::Expense, 100))
            .collect::<Vec<_>>();

        let html = Html::parse_fragment(&recent_transactions_table(&transactions).into_string());

        let rows = html.select(&Selector::parse("tbody tr").unwrap()).count();
        assert_eq!(rows, RECENT_TRANSACTION_COUNT);
    }

    #[test]
    fn amounts_are_signed_by_type() {
        let transactions = [
            transaction(1, TransactionType::Income, 500000),
            transaction(2, TransactionType::Expense, 350),
        ];

        let html = Html::parse_fragment(&recent_transactions_table(&transactions).into_string());

        let amounts = html
            .select(&Selector::parse("tbody td.text-right").unwrap())
            .map(|cell| cell.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(amounts, vec!["+$5,000.00", "-$3.50"]);
    }
}
