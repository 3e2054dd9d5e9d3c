//! Dashboard module
//!
//! Provides an overview page showing totals, spending by category, goal
//! progress and the advice tools. The aggregation functions are shared with
//! the budget goal page and the advice endpoints.

mod aggregation;
mod cards;
mod charts;
mod handlers;
mod tables;

pub use aggregation::{
    AggregateTotals, GoalProgress, SpendingByCategory, Summary, expense_lines, goal_lines,
    goal_progress, goals_by_category, summarize,
};
pub use handlers::get_dashboard_page;
