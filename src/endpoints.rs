//! The page and API route paths.
//!
//! For routes that take a parameter, e.g., `/transactions/{transaction_id}/edit`, use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing a transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for setting budget goals.
pub const BUDGET_GOALS_VIEW: &str = "/budget_goals";
/// The page for editing the user's email and display image.
pub const PROFILE_VIEW: &str = "/profile";
/// The registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The log-in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for registering a new user.
pub const USERS: &str = "/api/users";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the category select matching a transaction type.
pub const CATEGORY_OPTIONS: &str = "/api/transactions/category_options";
/// The route to set a budget goal.
pub const BUDGET_GOALS_API: &str = "/api/budget_goals";
/// The route to delete a budget goal.
pub const BUDGET_GOAL: &str = "/api/budget_goals/{goal_id}";
/// The route for savings suggestions and a forecast.
pub const ADVICE: &str = "/api/advice";
/// The route for a written summary of the user's spending.
pub const ADVICE_SUMMARY: &str = "/api/advice/summary";
/// The route for suggested budget categories.
pub const ADVICE_CATEGORIES: &str = "/api/advice/categories";
/// The route to update the user's profile.
pub const PROFILE_API: &str = "/api/profile";
/// The route to generate a new logo for the user.
pub const PROFILE_LOGO: &str = "/api/profile/logo";

/// Replace the first `{parameter}` in `endpoint_path` with `id`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
