//! Budget goals: a spending ceiling per expense category.

mod core;
mod endpoints;
mod page;

pub use core::{
    BudgetGoal, BudgetGoalFields, create_budget_goal_table, delete_budget_goal, get_budget_goals,
    set_budget_goal,
};
pub use endpoints::{delete_budget_goal_endpoint, set_budget_goal_endpoint};
pub use page::get_budget_goals_page;

#[cfg(test)]
pub(crate) use core::tests::get_connection_with_user;
