//! Per-category spending ceilings.

use std::str::FromStr;

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    database_id::BudgetGoalId,
    money::{Amount, AmountParseError},
    transaction::{Category, TransactionType},
};

/// A spending ceiling a user sets for one expense category.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetGoal {
    /// The ID of the goal.
    pub id: BudgetGoalId,
    /// The user the goal belongs to.
    pub user_id: UserID,
    /// The expense category the goal applies to.
    pub category: Category,
    /// The most the user wants to spend in the category.
    pub goal: Amount,
}

/// A validated category and goal, ready to be saved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetGoalFields {
    /// Must be an expense category.
    pub category: Category,
    /// Must be positive.
    pub goal: Amount,
}

impl BudgetGoalFields {
    /// Validate the raw form values for a budget goal.
    ///
    /// # Errors
    /// Returns [Error::InvalidBudgetGoal] with a user facing message if the
    /// category is not an expense category or the goal is not a positive amount.
    pub fn parse(category: &str, goal: &str) -> Result<Self, Error> {
        let category = Category::from_str(category)
            .ok()
            .filter(|category| category.is_allowed_for(TransactionType::Expense))
            .ok_or_else(|| Error::InvalidBudgetGoal("Please select an expense category.".to_owned()))?;

        let goal = match Amount::from_str(goal) {
            Ok(goal) if goal.is_positive() => goal,
            Err(AmountParseError::OutOfRange) => {
                return Err(Error::InvalidBudgetGoal(
                    "Goal cannot be more than $1,000,000,000,000.".to_owned(),
                ));
            }
            _ => {
                return Err(Error::InvalidBudgetGoal(
                    "Goal must be a positive amount.".to_owned(),
                ));
            }
        };

        Ok(Self { category, goal })
    }
}

/// Create the budget goal table in the database.
///
/// Requires the user table to exist.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget_goal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                goal INTEGER NOT NULL CHECK (goal > 0),
                UNIQUE(user_id, category),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

fn map_budget_goal_row(row: &Row) -> Result<BudgetGoal, rusqlite::Error> {
    Ok(BudgetGoal {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category: row.get(2)?,
        goal: row.get(3)?,
    })
}

/// Set the goal for a category, replacing the existing goal for that category if there is one.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn set_budget_goal(
    user_id: UserID,
    fields: BudgetGoalFields,
    connection: &Connection,
) -> Result<BudgetGoal, Error> {
    connection
        .prepare(
            "INSERT INTO budget_goal (user_id, category, goal) VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, category) DO UPDATE SET goal = excluded.goal
            RETURNING id, user_id, category, goal",
        )?
        .query_row(
            (user_id.as_i64(), fields.category, fields.goal),
            map_budget_goal_row,
        )
        .map_err(Error::from)
}

/// All of the user's budget goals, ordered by category.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an unexpected SQL error.
pub fn get_budget_goals(user_id: UserID, connection: &Connection) -> Result<Vec<BudgetGoal>, Error> {
    let mut goals = connection
        .prepare("SELECT id, user_id, category, goal FROM budget_goal WHERE user_id = ?1")?
        .query_map([user_id.as_i64()], map_budget_goal_row)?
        .collect::<Result<Vec<_>, _>>()?;

    goals.sort_by_key(|goal| goal.category);

    Ok(goals)
}

/// Delete one of the user's budget goals.
///
/// # Errors
/// Returns [Error::DeleteMissingBudgetGoal] if `user_id` has no goal with `id`.
pub fn delete_budget_goal(
    user_id: UserID,
    id: BudgetGoalId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget_goal WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudgetGoal);
    }

    Ok(())
}
