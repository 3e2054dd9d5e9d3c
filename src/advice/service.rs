//! The generative flows behind the AI features and the data they exchange.

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{money::Amount, transaction::Category};

/// The errors that may occur when calling a generative flow.
///
/// These never roll back the operation that triggered the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdviceError {
    /// The server was started without a flow server URL.
    #[error("no generative flow server is configured")]
    NotConfigured,

    /// The flow server URL could not be parsed.
    #[error("invalid flow server URL \"{0}\"")]
    InvalidBaseUrl(String),

    /// The flow did not answer within the request timeout.
    #[error("the flow {flow} did not respond within {timeout:?}")]
    Timeout {
        /// The name of the flow that was called.
        flow: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The request could not be sent or the connection failed.
    #[error("could not reach the flow server: {0}")]
    Transport(String),

    /// The flow server answered with a non-success status.
    #[error("the flow server returned {status}: {body}")]
    Server {
        /// The HTTP status code of the response.
        status: u16,
        /// The response body, for the server logs.
        body: String,
    },

    /// The response was not the JSON the flow promises.
    #[error("could not read the flow server response: {0}")]
    InvalidResponse(String),
}

impl AdviceError {
    /// The status code to send with an alert for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdviceError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            AdviceError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// A message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AdviceError::NotConfigured => {
                "AI features are not enabled on this server.".to_owned()
            }
            AdviceError::Timeout { timeout, .. } => format!(
                "The AI assistant did not respond within {} seconds. Try again later.",
                timeout.as_secs()
            ),
            _ => "The AI assistant is unavailable right now. Try again later.".to_owned(),
        }
    }
}

/// How much risk the user is willing to take with their savings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    /// Prefer safe, predictable savings.
    Low,
    /// A balance of safety and growth.
    Medium,
    /// Prefer growth over safety.
    High,
}

impl RiskTolerance {
    /// All options, in the order they are offered to the user.
    pub const ALL: [RiskTolerance; 3] = [
        RiskTolerance::Low,
        RiskTolerance::Medium,
        RiskTolerance::High,
    ];

    /// The lowercase wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        }
    }
}

/// A single expense sent to the smart budgeting flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseLine {
    /// The expense's category.
    pub category: Category,
    /// The amount spent.
    pub amount: Amount,
}

/// A budget goal sent to the smart budgeting flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalLine {
    /// The budgeted category.
    pub category: Category,
    /// The spending ceiling for the category.
    pub goal: Amount,
}

/// Input for savings suggestions and a forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartBudgetRequest {
    pub income: Amount,
    pub expenses: Vec<ExpenseLine>,
    pub budget_goals: Vec<GoalLine>,
    pub risk_tolerance: RiskTolerance,
}

/// Savings suggestions and a forecast.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartBudgetAdvice {
    pub savings_suggestions: String,
    pub financial_forecast: String,
}

/// Input for a written summary of spending.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummaryRequest {
    pub income: Amount,
    pub expenses: BTreeMap<Category, Amount>,
    pub budget_goals: BTreeMap<Category, Amount>,
}

/// A written summary of spending habits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpendingSummary {
    pub summary: String,
}

/// Input for suggested budget categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySuggestionRequest {
    pub income: Amount,
    pub lifestyle: String,
}

/// Suggested budget category names.
///
/// These are free text and may not match a [Category].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategorySuggestions {
    pub categories: Vec<String>,
}

/// Input for generating a user's logo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoRequest {
    pub email: String,
}

/// A generated logo.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedLogo {
    /// The image as a `data:` URI.
    pub logo_data_uri: String,
}

/// The generative flows used by the app.
///
/// Calls may be slow or fail. Callers must treat failures as best effort.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Suggest how to save more and forecast the user's finances.
    async fn smart_budget(
        &self,
        request: &SmartBudgetRequest,
    ) -> Result<SmartBudgetAdvice, AdviceError>;

    /// Summarize spending habits against the user's budget goals.
    async fn summarize_spending(
        &self,
        request: &SpendingSummaryRequest,
    ) -> Result<SpendingSummary, AdviceError>;

    /// Suggest budget categories for the user's income and lifestyle.
    async fn suggest_categories(
        &self,
        request: &CategorySuggestionRequest,
    ) -> Result<CategorySuggestions, AdviceError>;

    /// Generate a logo for a new user.
    async fn generate_logo(&self, request: &LogoRequest) -> Result<GeneratedLogo, AdviceError>;
}

/// Used when no flow server is configured. Every call fails with [AdviceError::NotConfigured].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerativeService;

#[async_trait]
impl GenerativeService for DisabledGenerativeService {
    async fn smart_budget(&self, _: &SmartBudgetRequest) -> Result<SmartBudgetAdvice, AdviceError> {
        Err(AdviceError::NotConfigured)
    }

    async fn summarize_spending(
        &self,
        _: &SpendingSummaryRequest,
    ) -> Result<SpendingSummary, AdviceError> {
        Err(AdviceError::NotConfigured)
    }

    async fn suggest_categories(
        &self,
        _: &CategorySuggestionRequest,
    ) -> Result<CategorySuggestions, AdviceError> {
        Err(AdviceError::NotConfigured)
    }

    async fn generate_logo(&self, _: &LogoRequest) -> Result<GeneratedLogo, AdviceError> {
        Err(AdviceError::NotConfigured)
    }
}

/// Answers logo requests with a fixed image and fails every other flow.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct LogoStub {
    /// `None` makes `generate_logo` fail.
    pub logo: Option<String>,
}

#[cfg(test)]
#[async_trait]
impl GenerativeService for LogoStub {
    async fn smart_budget(&self, _: &SmartBudgetRequest) -> Result<SmartBudgetAdvice, AdviceError> {
        Err(AdviceError::NotConfigured)
    }

    async fn summarize_spending(
        &self,
        _: &SpendingSummaryRequest,
    ) -> Result<SpendingSummary, AdviceError> {
        Err(AdviceError::NotConfigured)
    }

    async fn suggest_categories(
        &self,
        _: &CategorySuggestionRequest,
    ) -> Result<CategorySuggestions, AdviceError> {
        Err(AdviceError::NotConfigured)
    }

    async fn generate_logo(&self, _: &LogoRequest) -> Result<GeneratedLogo, AdviceError> {
        match &self.logo {
            Some(logo) => Ok(GeneratedLogo {
                logo_data_uri: logo.clone(),
            }),
            None => Err(AdviceError::Transport("connection refused".to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, time::Duration};

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{money::Amount, transaction::Category};

    use super::{
        AdviceError, DisabledGenerativeService, ExpenseLine, GenerativeService, GoalLine,
        LogoRequest, RiskTolerance, SmartBudgetRequest, SpendingSummaryRequest,
    };

    #[test]
    fn smart_budget_request_uses_camel_case() {
        let request = SmartBudgetRequest {
            income: Amount::from_cents(500000),
            expenses: vec![ExpenseLine {
                category: Category::Food,
                amount: Amount::from_cents(15075),
            }],
            budget_goals: vec![GoalLine {
                category: Category::Food,
                goal: Amount::from_cents(40000),
            }],
            risk_tolerance: RiskTolerance::Medium,
        };

        let got = serde_json::to_value(&request).unwrap();

        assert_eq!(
            got,
            json!({
                "income": 5000.0,
                "expenses": [{"category": "Food", "amount": 150.75}],
                "budgetGoals": [{"category": "Food", "goal": 400.0}],
                "riskTolerance": "medium",
            })
        );
    }

    #[test]
    fn summary_request_uses_category_maps() {
        let request = SpendingSummaryRequest {
            income: Amount::from_cents(100000),
            expenses: BTreeMap::from([(Category::Rent, Amount::from_cents(120000))]),
            budget_goals: BTreeMap::new(),
        };

        let got = serde_json::to_value(&request).unwrap();

        assert_eq!(
            got,
            json!({"income": 1000.0, "expenses": {"Rent": 1200.0}, "budgetGoals": {}})
        );
    }

    #[test]
    fn status_codes_distinguish_causes() {
        assert_eq!(
            AdviceError::NotConfigured.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AdviceError::Timeout {
                flow: "summarizeSpendingFlow".to_owned(),
                timeout: Duration::from_secs(30)
            }
            .status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AdviceError::Transport("connection refused".to_owned()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn disabled_service_is_not_configured() {
        let got = DisabledGenerativeService
            .generate_logo(&LogoRequest {
                email: "test@example.com".to_owned(),
            })
            .await;

        assert_eq!(got, Err(AdviceError::NotConfigured));
    }
}
