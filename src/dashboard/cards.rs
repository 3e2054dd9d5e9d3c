//! Card components for the dashboard overview.
//!
//! Provides:
//! - Income, expense and balance totals
//! - Progress towards each budget goal

use maud::{Markup, html};

use crate::{
    dashboard::aggregation::{AggregateTotals, GoalProgress},
    endpoints,
    html::{LINK_STYLE, category_badge, format_currency, progress_bar},
    money::Amount,
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";

fn total_card(id: &str, title: &str, amount: Amount, amount_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) data-testid=(id)
        {
            h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { (title) }
            div class={ "text-3xl font-bold mt-1 " (amount_style) } { (format_currency(amount)) }
        }
    }
}

/// Renders the total income, total expenses and balance cards.
pub(super) fn overview_cards_view(totals: &AggregateTotals) -> Markup {
    let balance_style = if totals.balance.cents() < 0 {
        "text-red-600 dark:text-red-400"
    } else {
        ""
    };

    html! {
        section class="w-full grid grid-cols-1 md:grid-cols-3 gap-4 mb-8"
        {
            (total_card("total-income", "Total Income", totals.total_income, "text-green-600 dark:text-green-400"))
            (total_card("total-expenses", "Total Expenses", totals.total_expenses, "text-red-600 dark:text-red-400"))
            (total_card("balance", "Balance", totals.balance, balance_style))
        }
    }
}

/// Renders a card per budget goal with a bar showing how much has been spent.
pub(super) fn goal_progress_view(progress: &[GoalProgress]) -> Markup {
    html! {
        section class={ (CARD_STYLE) " w-full" } data-testid="goal-progress"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Budget Goals" }
                a href=(endpoints::BUDGET_GOALS_VIEW) class=(LINK_STYLE) { "Manage" }
            }

            @if progress.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "No budget goals yet. "
                    a href=(endpoints::BUDGET_GOALS_VIEW) class=(LINK_STYLE) { "Set a goal" }
                    " to see how your spending compares."
                }
            } @else {
                ul class="space-y-4"
                {
                    @for goal in progress {
                        li
                        {
                            div class="flex justify-between items-center mb-1 text-sm"
                            {
                                (category_badge(goal.goal.category))
                                span class=[goal.is_over_budget().then_some("text-red-600 dark:text-red-400 font-semibold")]
                                {
                                    (format_currency(goal.spent)) " of " (format_currency(goal.goal.goal))
                                }
                            }
                            (progress_bar(goal.percent))
                        }
                    }
                }
            }
        }
    }
}
