//! Transaction types, the fixed set of categories, and the icon shown for each category.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in forms and in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string was not `income` or `expense`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a transaction type")]
pub struct UnknownTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(UnknownTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// What a transaction was for.
///
/// Which categories may be used depends on the [TransactionType], see
/// [Category::allowed_for].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Category {
    Salary,
    Investments,
    Food,
    Transport,
    Utilities,
    Rent,
    Bills,
    Shopping,
    Entertainment,
    Other,
}

const INCOME_CATEGORIES: [Category; 3] = [Category::Salary, Category::Investments, Category::Other];

const EXPENSE_CATEGORIES: [Category; 8] = [
    Category::Food,
    Category::Transport,
    Category::Utilities,
    Category::Rent,
    Category::Bills,
    Category::Shopping,
    Category::Entertainment,
    Category::Other,
];

impl Category {
    /// The display name, which is also the name stored in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Salary => "Salary",
            Category::Investments => "Investments",
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Utilities => "Utilities",
            Category::Rent => "Rent",
            Category::Bills => "Bills",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }

    /// The categories that can be selected for `transaction_type`, in display order.
    pub const fn allowed_for(transaction_type: TransactionType) -> &'static [Category] {
        match transaction_type {
            TransactionType::Income => &INCOME_CATEGORIES,
            TransactionType::Expense => &EXPENSE_CATEGORIES,
        }
    }

    /// Whether this category can be used with `transaction_type`.
    pub fn is_allowed_for(self, transaction_type: TransactionType) -> bool {
        Self::allowed_for(transaction_type).contains(&self)
    }

    /// The icon displayed next to transactions in this category.
    pub const fn icon(self) -> CategoryIcon {
        match self {
            Category::Food => CategoryIcon::Utensils,
            Category::Transport => CategoryIcon::Car,
            Category::Utilities | Category::Rent => CategoryIcon::Home,
            Category::Bills => CategoryIcon::Receipt,
            Category::Shopping => CategoryIcon::Shirt,
            Category::Entertainment => CategoryIcon::Clapperboard,
            Category::Salary => CategoryIcon::Landmark,
            Category::Investments => CategoryIcon::TrendingUp,
            Category::Other => CategoryIcon::HelpCircle,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The string did not name a category. Names are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{0}\" is not a category")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        INCOME_CATEGORIES
            .iter()
            .chain(EXPENSE_CATEGORIES.iter())
            .find(|category| category.as_str() == text)
            .copied()
            .ok_or_else(|| UnknownCategory(text.to_owned()))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// The icons used to decorate categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryIcon {
    Utensils,
    Car,
    Home,
    Receipt,
    Shirt,
    Clapperboard,
    Landmark,
    TrendingUp,
    HelpCircle,
}

impl CategoryIcon {
    /// The icon's identifier, used as a CSS hook and for accessibility labels.
    pub const fn name(self) -> &'static str {
        match self {
            CategoryIcon::Utensils => "utensils",
            CategoryIcon::Car => "car",
            CategoryIcon::Home => "home",
            CategoryIcon::Receipt => "receipt",
            CategoryIcon::Shirt => "shirt",
            CategoryIcon::Clapperboard => "clapperboard",
            CategoryIcon::Landmark => "landmark",
            CategoryIcon::TrendingUp => "trending-up",
            CategoryIcon::HelpCircle => "help-circle",
        }
    }

    /// The glyph rendered in the page.
    pub const fn glyph(self) -> &'static str {
        match self {
            CategoryIcon::Utensils => "🍴",
            CategoryIcon::Car => "🚗",
            CategoryIcon::Home => "🏠",
            CategoryIcon::Receipt => "🧾",
            CategoryIcon::Shirt => "👕",
            CategoryIcon::Clapperboard => "🎬",
            CategoryIcon::Landmark => "🏛",
            CategoryIcon::TrendingUp => "📈",
            CategoryIcon::HelpCircle => "❔",
        }
    }
}

/// Look up the icon for a category name, falling back to [CategoryIcon::HelpCircle]
/// for names that are not a known category.
pub fn icon_for_name(name: &str) -> CategoryIcon {
    name.parse::<Category>()
        .map(Category::icon)
        .unwrap_or(CategoryIcon::HelpCircle)
}
