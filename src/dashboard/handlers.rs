//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for the dashboard page
//! - HTML view functions for the overview, chart, goals and advice sections
//! - State and query types used by the handler

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    advice::RiskTolerance,
    auth::{LOGO_UNAVAILABLE_NOTICE, Session},
    budget_goal::get_budget_goals,
    dashboard::{
        aggregation::{Summary, goal_progress, summarize},
        cards::{goal_progress_view, overview_cards_view},
        charts::{DashboardChart, charts_script, charts_view, spending_pie_chart},
        tables::recent_transactions_table,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, HeadElement, base, link, loading_spinner,
    },
    navigation::NavBar,
    transaction::{SQLiteTransactionStore, Transaction, TransactionStore},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Optional notices shown at the top of the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub notice: Option<String>,
}

/// Display a page with an overview of the user's finances.
///
/// Transactions and goals are read from the database on every request, so
/// the page always reflects the latest writes.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let transactions = SQLiteTransactionStore::new(state.db_connection.clone())
        .list(session.user_id)
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;

    let goals = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_budget_goals(session.user_id, &connection)
            .inspect_err(|error| tracing::error!("could not get budget goals: {error}"))?
    };

    let show_logo_notice = query.notice.as_deref() == Some(LOGO_UNAVAILABLE_NOTICE);
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar, show_logo_notice).into_response());
    }

    let summary = summarize(&transactions);
    let progress = goal_progress(&goals, &summary.spending_by_category);
    let goals_view = goal_progress_view(&progress);

    Ok(dashboard_view(
        nav_bar,
        show_logo_notice,
        &summary,
        &goals_view,
        &transactions,
    )
    .into_response())
}

fn logo_notice() -> Markup {
    html! {
        div
            role="status"
            data-testid="logo-notice"
            class="w-full p-4 mb-4 text-sm text-yellow-800 rounded-lg bg-yellow-50
                dark:bg-gray-800 dark:text-yellow-300"
        {
            "Your account was created, but we could not generate a logo for you. "
            "You can try again from your "
            (link(endpoints::PROFILE_VIEW, "profile"))
            "."
        }
    }
}

/// Renders the dashboard page when the user has no transactions.
fn dashboard_no_data_view(nav_bar: NavBar, show_logo_notice: bool) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding a transaction");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            @if show_logo_notice {
                (logo_notice())
            }

            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your totals and charts will show up here once you add some transactions.
                Get started by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn smart_budget_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::ADVICE)
            hx-target="#advice-result"
            hx-target-error="#alert-container"
            hx-indicator="#advice-indicator"
            hx-disabled-elt="#advice-submit-button, #summary-button"
            class="space-y-4"
        {
            fieldset
            {
                legend class="mb-2 text-sm font-medium" { "Risk tolerance" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for risk in RiskTolerance::ALL {
                        @let id = format!("risk-{}", risk.as_str());
                        label for=(id) class=(FORM_RADIO_LABEL_STYLE)
                        {
                            input
                                type="radio"
                                id=(id)
                                name="risk_tolerance"
                                value=(risk.as_str())
                                required
                                checked[risk == RiskTolerance::Medium]
                                class=(FORM_RADIO_INPUT_STYLE);

                            span class="capitalize" { (risk.as_str()) }
                        }
                    }
                }
            }

            button type="submit" id="advice-submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="advice-indicator" class="inline htmx-indicator" { (loading_spinner()) }
                "Get Savings Advice"
            }
        }

        button
            id="summary-button"
            hx-post=(endpoints::ADVICE_SUMMARY)
            hx-target="#advice-result"
            hx-target-error="#alert-container"
            hx-indicator="#summary-indicator"
            hx-disabled-elt="this, #advice-submit-button"
            class={ (BUTTON_SECONDARY_STYLE) " mt-4" }
        {
            span id="summary-indicator" class="inline htmx-indicator" { (loading_spinner()) }
            "Summarize My Spending"
        }
    }
}

fn advice_view() -> Markup {
    html! {
        section class="w-full" data-testid="advice"
        {
            h3 class="text-xl font-semibold mb-4" { "Smart Budgeting" }

            (smart_budget_form())

            div id="advice-result" class="mt-4" aria-live="polite" {}
        }
    }
}

/// Renders the main dashboard page with totals, the spending chart, goals,
/// recent transactions and the advice tools.
fn dashboard_view(
    nav_bar: NavBar,
    show_logo_notice: bool,
    summary: &Summary,
    goals_view: &Markup,
    transactions: &[Transaction],
) -> Markup {
    let nav_bar = nav_bar.into_html();
    let charts = if summary.spending_by_category.is_empty() {
        vec![]
    } else {
        vec![DashboardChart {
            id: "spending-chart",
            options: spending_pie_chart(&summary.spending_by_category).to_string(),
        }]
    };

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            @if show_logo_notice {
                (logo_notice())
            }

            (overview_cards_view(&summary.totals))

            section
                id="charts"
                class="w-full mx-auto mb-8"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    (charts_view(&charts))
                    (goals_view)
                }
            }

            div class="w-full grid grid-cols-1 xl:grid-cols-2 gap-8 mb-8"
            {
                (recent_transactions_table(transactions))
                (advice_view())
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}
