//! The page for setting budget goals and getting category suggestions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::Session,
    budget_goal::core::get_budget_goals,
    dashboard::{GoalProgress, goal_progress, summarize},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        category_badge, dollar_input_styles, format_currency, loading_spinner, progress_bar,
    },
    navigation::NavBar,
    transaction::{Category, SQLiteTransactionStore, TransactionStore, TransactionType},
};

/// The state needed for the budget goals page.
#[derive(Debug, Clone)]
pub struct BudgetGoalsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetGoalsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget goals page with the progress of each goal.
pub async fn get_budget_goals_page(
    State(state): State<BudgetGoalsPageState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let transactions =
        SQLiteTransactionStore::new(state.db_connection.clone()).list(session.user_id)?;

    let goals = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_budget_goals(session.user_id, &connection)?
    };

    let summary = summarize(&transactions);
    let progress = goal_progress(&goals, &summary.spending_by_category);

    Ok(budget_goals_view(&progress).into_response())
}

fn set_goal_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::BUDGET_GOALS_API)
            hx-target-error="#alert-container"
            hx-disabled-elt="#goal-submit-button"
            class="w-full space-y-4"
        {
            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    id="category"
                    name="category"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" disabled selected { "Select a category" }

                    @for category in Category::allowed_for(TransactionType::Expense) {
                        option value=(category.as_str()) { (category.as_str()) }
                    }
                }
            }

            div
            {
                label for="goal" class=(FORM_LABEL_STYLE) { "Monthly goal" }

                div class="input-wrapper w-full"
                {
                    input
                        id="goal"
                        name="goal"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            button type="submit" id="goal-submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                "Set Goal"
            }
        }
    }
}

fn goal_row(progress: &GoalProgress) -> Markup {
    let goal = &progress.goal;
    let delete_url = format_endpoint(endpoints::BUDGET_GOAL, goal.id);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (category_badge(goal.category)) }
            td class=(TABLE_CELL_STYLE) { (format_currency(goal.goal)) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=[progress.is_over_budget().then_some("text-red-600 dark:text-red-400 font-semibold")]
                {
                    (format_currency(progress.spent))
                }
            }
            td class={ (TABLE_CELL_STYLE) " min-w-32" }
            {
                (progress_bar(progress.percent))
                span class="text-xs" { (format!("{:.0}%", progress.percent)) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-delete=(delete_url)
                    hx-confirm={
                        "Are you sure you want to delete the goal for '" (goal.category) "'?"
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

fn category_suggestion_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::ADVICE_CATEGORIES)
            hx-target="#category-suggestions"
            hx-target-error="#alert-container"
            hx-indicator="#suggestion-indicator"
            hx-disabled-elt="#suggestion-submit-button"
            class="w-full space-y-4"
        {
            div
            {
                label for="income" class=(FORM_LABEL_STYLE) { "Monthly income" }

                div class="input-wrapper w-full"
                {
                    input
                        id="income"
                        name="income"
                        type="number"
                        step="0.01"
                        min="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="lifestyle" class=(FORM_LABEL_STYLE) { "Lifestyle" }

                textarea
                    id="lifestyle"
                    name="lifestyle"
                    rows="3"
                    required
                    placeholder="e.g. I rent in the city, cycle to work and have a dog."
                    class=(FORM_TEXT_INPUT_STYLE)
                {}
            }

            button type="submit" id="suggestion-submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="suggestion-indicator" class="inline htmx-indicator" { (loading_spinner()) }
                "Suggest Categories"
            }
        }

        div id="category-suggestions" class="mt-4" {}
    }
}

fn budget_goals_view(progress: &[GoalProgress]) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGET_GOALS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Budget Goals" }

            div class="grid gap-6 lg:grid-cols-3"
            {
                section class="lg:col-span-2 overflow-x-auto"
                {
                    @if progress.is_empty() {
                        p class="text-gray-600 dark:text-gray-400"
                        {
                            "No budget goals yet. Set a goal to track your spending in a category."
                        }
                    } @else {
                        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Goal" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Spent" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Progress" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                                }
                            }

                            tbody
                            {
                                @for goal in progress {
                                    (goal_row(goal))
                                }
                            }
                        }
                    }
                }

                section class="space-y-8"
                {
                    div
                    {
                        h2 class="text-lg font-semibold mb-2" { "Set a goal" }
                        (set_goal_form())
                    }

                    div
                    {
                        h2 class="text-lg font-semibold mb-2" { "Suggest categories" }
                        (category_suggestion_form())
                    }
                }
            }
        }
    };

    base("Budget Goals", &[dollar_input_styles()], &content)
}
