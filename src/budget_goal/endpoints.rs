//! Endpoints for setting and deleting budget goals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::Session,
    budget_goal::core::{BudgetGoalFields, delete_budget_goal, set_budget_goal},
    database_id::BudgetGoalId,
    endpoints,
};

/// The state needed for changing budget goals.
#[derive(Debug, Clone)]
pub struct BudgetGoalEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetGoalEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw form data for a budget goal.
#[derive(Debug, Deserialize)]
pub struct BudgetGoalForm {
    pub category: String,
    pub goal: String,
}

/// Set the goal for a category and reload the budget goals page.
pub async fn set_budget_goal_endpoint(
    State(state): State<BudgetGoalEndpointState>,
    Extension(session): Extension<Session>,
    Form(form): Form<BudgetGoalForm>,
) -> Response {
    let fields = match BudgetGoalFields::parse(&form.category, &form.goal) {
        Ok(fields) => fields,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_budget_goal(session.user_id, fields, &connection) {
        Ok(goal) => {
            tracing::info!(
                "Set {} budget goal to {} for user {}",
                goal.category,
                goal.goal,
                session.user_id
            );

            (
                HxRedirect(endpoints::BUDGET_GOALS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while setting a budget goal: {error}");
            error.into_alert_response()
        }
    }
}

/// Delete a budget goal. Returns a success alert or an error alert.
pub async fn delete_budget_goal_endpoint(
    Path(goal_id): Path<BudgetGoalId>,
    State(state): State<BudgetGoalEndpointState>,
    Extension(session): Extension<Session>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_budget_goal(session.user_id, goal_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Budget goal deleted".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingBudgetGoal) => Error::DeleteMissingBudgetGoal.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting budget goal {goal_id}: {error}");
            error.into_alert_response()
        }
    }
}
