//! Folds a user's transactions into totals and per-category spending.
//!
//! Amounts are whole cents, so the results do not depend on the order of the
//! transactions.

use std::collections::BTreeMap;

use crate::{
    advice::{ExpenseLine, GoalLine},
    budget_goal::BudgetGoal,
    money::Amount,
    transaction::{Category, Transaction, TransactionType},
};

/// Expenses summed per category. Only categories with at least one expense are present.
pub type SpendingByCategory = BTreeMap<Category, Amount>;

/// Income, expenses and the difference between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateTotals {
    pub total_income: Amount,
    pub total_expenses: Amount,
    /// `total_income - total_expenses`.
    pub balance: Amount,
}

/// The result of [summarize].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub totals: AggregateTotals,
    pub spending_by_category: SpendingByCategory,
}

/// Sum income and expenses and group expenses by category in a single pass.
///
/// Amounts are not re-validated.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut total_income = Amount::ZERO;
    let mut total_expenses = Amount::ZERO;
    let mut spending_by_category = SpendingByCategory::new();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => total_income += transaction.amount,
            TransactionType::Expense => {
                total_expenses += transaction.amount;
                *spending_by_category
                    .entry(transaction.category)
                    .or_insert(Amount::ZERO) += transaction.amount;
            }
        }
    }

    Summary {
        totals: AggregateTotals {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
        },
        spending_by_category,
    }
}

/// How much of a budget goal has been spent.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    pub goal: BudgetGoal,
    pub spent: Amount,
    /// `spent / goal * 100`. Exceeds 100 when the goal is overspent.
    pub percent: f64,
}

impl GoalProgress {
    /// Whether more than the goal has been spent.
    pub fn is_over_budget(&self) -> bool {
        self.spent > self.goal.goal
    }
}

/// Match each goal with the spending in its category.
pub fn goal_progress(goals: &[BudgetGoal], spending: &SpendingByCategory) -> Vec<GoalProgress> {
    goals
        .iter()
        .map(|goal| {
            let spent = spending.get(&goal.category).copied().unwrap_or_default();
            let percent = if goal.goal.is_positive() {
                spent.cents() as f64 * 100.0 / goal.goal.cents() as f64
            } else {
                0.0
            };

            GoalProgress {
                goal: goal.clone(),
                spent,
                percent,
            }
        })
        .collect()
}

/// One line per expense transaction.
pub fn expense_lines(transactions: &[Transaction]) -> Vec<ExpenseLine> {
    transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Expense)
        .map(|transaction| ExpenseLine {
            category: transaction.category,
            amount: transaction.amount,
        })
        .collect()
}

/// One line per budget goal.
pub fn goal_lines(goals: &[BudgetGoal]) -> Vec<GoalLine> {
    goals
        .iter()
        .map(|goal| GoalLine {
            category: goal.category,
            goal: goal.goal,
        })
        .collect()
}

/// Budget goals keyed by category.
pub fn goals_by_category(goals: &[BudgetGoal]) -> BTreeMap<Category, Amount> {
    goals.iter().map(|goal| (goal.category, goal.goal)).collect()
}
