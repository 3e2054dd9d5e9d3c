//! AI generated advice, category suggestions and user logos.
//!
//! The flows run on an external Genkit flow server. Every call is best effort:
//! a failure is logged and shown as an alert, and never undoes the action
//! that triggered it.

mod genkit;
mod handlers;
mod service;

pub use genkit::{DEFAULT_ADVICE_TIMEOUT, GenkitClient};
pub use handlers::{get_category_suggestions, get_smart_budget_advice, get_spending_summary};
pub use service::{
    AdviceError, DisabledGenerativeService, ExpenseLine, GenerativeService, GoalLine, LogoRequest,
    RiskTolerance,
};

#[cfg(test)]
pub(crate) use service::{
    CategorySuggestionRequest, CategorySuggestions, GeneratedLogo, LogoStub, SmartBudgetAdvice,
    SmartBudgetRequest, SpendingSummary, SpendingSummaryRequest,
};
