//! Endpoints that ask the generative flows for advice and render the answer as a fragment.
//!
//! Failures are rendered as an alert and never affect the rest of the page.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    advice::service::{
        CategorySuggestionRequest, CategorySuggestions, GenerativeService, RiskTolerance,
        SmartBudgetAdvice, SmartBudgetRequest, SpendingSummary, SpendingSummaryRequest,
    },
    alert::Alert,
    auth::{Session, UserID},
    budget_goal::{BudgetGoal, get_budget_goals},
    dashboard::{expense_lines, goal_lines, goals_by_category, summarize},
    html::CATEGORY_BADGE_STYLE,
    money::Amount,
    transaction::{SQLiteTransactionStore, Transaction, TransactionStore, icon_for_name},
};

/// The state needed to request advice.
#[derive(Clone)]
pub struct AdviceState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub generative_service: Arc<dyn GenerativeService>,
}

impl FromRef<AppState> for AdviceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            generative_service: state.generative_service.clone(),
        }
    }
}

fn load_transactions_and_goals(
    user_id: UserID,
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<(Vec<Transaction>, Vec<BudgetGoal>), Error> {
    let transactions = SQLiteTransactionStore::new(db_connection.clone()).list(user_id)?;

    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    let goals = get_budget_goals(user_id, &connection)?;

    Ok((transactions, goals))
}

/// The form data for the smart budgeting tool.
#[derive(Debug, Deserialize)]
pub struct SmartBudgetForm {
    pub risk_tolerance: RiskTolerance,
}

/// Ask for savings suggestions and a forecast based on the user's transactions and goals.
pub async fn get_smart_budget_advice(
    State(state): State<AdviceState>,
    Extension(session): Extension<Session>,
    Form(form): Form<SmartBudgetForm>,
) -> Response {
    let (transactions, goals) =
        match load_transactions_and_goals(session.user_id, &state.db_connection) {
            Ok(data) => data,
            Err(error) => return error.into_alert_response(),
        };

    let request = SmartBudgetRequest {
        income: summarize(&transactions).totals.total_income,
        expenses: expense_lines(&transactions),
        budget_goals: goal_lines(&goals),
        risk_tolerance: form.risk_tolerance,
    };

    match state.generative_service.smart_budget(&request).await {
        Ok(advice) => smart_budget_view(&advice).into_response(),
        Err(error) => Error::from(error).into_alert_response(),
    }
}

/// Ask for a written summary of the user's spending against their goals.
pub async fn get_spending_summary(
    State(state): State<AdviceState>,
    Extension(session): Extension<Session>,
) -> Response {
    let (transactions, goals) =
        match load_transactions_and_goals(session.user_id, &state.db_connection) {
            Ok(data) => data,
            Err(error) => return error.into_alert_response(),
        };

    let summary = summarize(&transactions);
    let request = SpendingSummaryRequest {
        income: summary.totals.total_income,
        expenses: summary.spending_by_category,
        budget_goals: goals_by_category(&goals),
    };

    match state.generative_service.summarize_spending(&request).await {
        Ok(summary) => spending_summary_view(&summary).into_response(),
        Err(error) => Error::from(error).into_alert_response(),
    }
}

/// The form data for suggesting budget categories.
#[derive(Debug, Deserialize)]
pub struct CategorySuggestionForm {
    pub income: String,
    pub lifestyle: String,
}

/// Ask for budget categories that suit the user's income and lifestyle.
pub async fn get_category_suggestions(
    State(state): State<AdviceState>,
    Form(form): Form<CategorySuggestionForm>,
) -> Response {
    let Some(income) = Amount::from_str(&form.income)
        .ok()
        .filter(|income| income.is_positive())
    else {
        return invalid_input_alert("Income must be a positive amount.");
    };

    let lifestyle = form.lifestyle.trim();
    if lifestyle.is_empty() {
        return invalid_input_alert("Describe your lifestyle to get suggestions.");
    }

    let request = CategorySuggestionRequest {
        income,
        lifestyle: lifestyle.to_owned(),
    };

    match state.generative_service.suggest_categories(&request).await {
        Ok(suggestions) => category_suggestions_view(&suggestions).into_response(),
        Err(error) => Error::from(error).into_alert_response(),
    }
}

fn invalid_input_alert(details: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Alert::Error {
            message: "Could not get suggestions".to_owned(),
            details: details.to_owned(),
        }
        .into_html(),
    )
        .into_response()
}

fn paragraphs(text: &str) -> Markup {
    html! {
        @for paragraph in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            p class="mb-2" { (paragraph) }
        }
    }
}

fn smart_budget_view(advice: &SmartBudgetAdvice) -> Markup {
    html! {
        div class="space-y-4" data-testid="smart-budget-advice"
        {
            section
            {
                h3 class="text-lg font-semibold mb-1" { "Savings suggestions" }
                (paragraphs(&advice.savings_suggestions))
            }

            section
            {
                h3 class="text-lg font-semibold mb-1" { "Financial forecast" }
                (paragraphs(&advice.financial_forecast))
            }
        }
    }
}

fn spending_summary_view(summary: &SpendingSummary) -> Markup {
    html! {
        div data-testid="spending-summary" { (paragraphs(&summary.summary)) }
    }
}

fn category_suggestions_view(suggestions: &CategorySuggestions) -> Markup {
    html! {
        @if suggestions.categories.is_empty() {
            p { "No suggestions this time, try describing your lifestyle in more detail." }
        } @else {
            ul class="flex flex-wrap gap-2" data-testid="category-suggestions"
            {
                @for name in &suggestions.categories {
                    @let icon = icon_for_name(name);
                    li class=(CATEGORY_BADGE_STYLE) data-icon=(icon.name())
                    {
                        span aria-hidden="true" { (icon.glyph()) }
                        (name)
                    }
                }
            }
        }
    }
}
