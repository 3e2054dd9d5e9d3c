//! Integer IDs for rows in the application database.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The ID of a transaction, assigned by the database on insert.
pub type TransactionId = DatabaseId;

/// The ID of a budget goal.
pub type BudgetGoalId = DatabaseId;
