//! A client for a Genkit flow server.
//!
//! Each flow is exposed as `POST {base_url}/{flow}` and takes `{"data": input}`,
//! answering with `{"result": output}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::service::{
    AdviceError, CategorySuggestionRequest, CategorySuggestions, GeneratedLogo, GenerativeService,
    LogoRequest, SmartBudgetAdvice, SmartBudgetRequest, SpendingSummary, SpendingSummaryRequest,
};

const SMART_BUDGET_FLOW: &str = "smartBudgetingToolFlow";
const SUMMARIZE_SPENDING_FLOW: &str = "summarizeSpendingFlow";
const SUGGEST_CATEGORIES_FLOW: &str = "suggestBudgetCategoriesFlow";
const GENERATE_LOGO_FLOW: &str = "generateUserLogoFlow";

/// How long to wait for a flow before giving up.
pub const DEFAULT_ADVICE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct FlowRequest<'a, I> {
    data: &'a I,
}

#[derive(Deserialize)]
struct FlowResponse<O> {
    result: O,
}

/// Calls generative flows on a Genkit flow server over HTTP.
#[derive(Debug, Clone)]
pub struct GenkitClient {
    base_url: Url,
    http: reqwest::Client,
    timeout: Duration,
}

impl GenkitClient {
    /// Create a client for the flow server at `base_url`, e.g. `http://localhost:3400`.
    ///
    /// # Errors
    /// Returns [AdviceError::InvalidBaseUrl] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AdviceError> {
        // Without a trailing slash `join` would replace the last path segment.
        let base_url = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&base_url).map_err(|error| AdviceError::InvalidBaseUrl(error.to_string()))?;

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            timeout,
        })
    }

    async fn run_flow<I, O>(&self, flow: &str, input: &I) -> Result<O, AdviceError>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        let endpoint = self
            .base_url
            .join(flow)
            .map_err(|error| AdviceError::InvalidBaseUrl(error.to_string()))?;

        tracing::debug!("Calling flow {flow} at {endpoint}");

        let response = self
            .http
            .post(endpoint)
            .timeout(self.timeout)
            .json(&FlowRequest { data: input })
            .send()
            .await
            .map_err(|error| self.map_transport_error(flow, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());

            return Err(AdviceError::Server {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<FlowResponse<O>>()
            .await
            .map(|response| response.result)
            .map_err(|error| {
                if error.is_timeout() {
                    self.map_transport_error(flow, error)
                } else {
                    AdviceError::InvalidResponse(error.to_string())
                }
            })
    }

    fn map_transport_error(&self, flow: &str, error: reqwest::Error) -> AdviceError {
        if error.is_timeout() {
            AdviceError::Timeout {
                flow: flow.to_owned(),
                timeout: self.timeout,
            }
        } else {
            AdviceError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl GenerativeService for GenkitClient {
    async fn smart_budget(
        &self,
        request: &SmartBudgetRequest,
    ) -> Result<SmartBudgetAdvice, AdviceError> {
        self.run_flow(SMART_BUDGET_FLOW, request).await
    }

    async fn summarize_spending(
        &self,
        request: &SpendingSummaryRequest,
    ) -> Result<SpendingSummary, AdviceError> {
        self.run_flow(SUMMARIZE_SPENDING_FLOW, request).await
    }

    async fn suggest_categories(
        &self,
        request: &CategorySuggestionRequest,
    ) -> Result<CategorySuggestions, AdviceError> {
        self.run_flow(SUGGEST_CATEGORIES_FLOW, request).await
    }

    async fn generate_logo(&self, request: &LogoRequest) -> Result<GeneratedLogo, AdviceError> {
        self.run_flow(GENERATE_LOGO_FLOW, request).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use crate::{
        advice::service::{CategorySuggestionRequest, GenerativeService, LogoRequest},
        money::Amount,
    };

    use super::{AdviceError, GenkitClient};

    /// Serve `app` on a random local port and return its base URL.
    async fn spawn_flow_server(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{address}")
    }

    #[tokio::test]
    async fn wraps_input_in_data_and_reads_result() {
        let app = Router::new().route(
            "/suggestBudgetCategoriesFlow",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(
                    body,
                    json!({"data": {"income": 4200.0, "lifestyle": "cyclist"}})
                );
                Json(json!({"result": {"categories": ["Bike maintenance", "Food"]}}))
            }),
        );
        let base_url = spawn_flow_server(app).await;
        let client = GenkitClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let got = client
            .suggest_categories(&CategorySuggestionRequest {
                income: Amount::from_cents(420000),
                lifestyle: "cyclist".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(got.categories, vec!["Bike maintenance", "Food"]);
    }

    #[tokio::test]
    async fn error_status_is_a_server_error() {
        let app = Router::new().route(
            "/generateUserLogoFlow",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "quota exceeded") }),
        );
        let base_url = spawn_flow_server(app).await;
        let client = GenkitClient::new(&base_url, Duration::from_secs(5)).unwrap();

        let got = client
            .generate_logo(&LogoRequest {
                email: "test@example.com".to_owned(),
            })
            .await;

        assert_eq!(
            got,
            Err(AdviceError::Server {
                status: 500,
                body: "quota exceeded".to_owned()
            })
        );
    }

    #[tokio::test]
    async fn slow_flow_times_out() {
        let app = Router::new().route(
            "/generateUserLogoFlow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"result": {"logoDataUri": "data:image/png;base64,"}}))
            }),
        );
        let base_url = spawn_flow_server(app).await;
        let client = GenkitClient::new(&base_url, Duration::from_millis(100)).unwrap();

        let got = client
            .generate_logo(&LogoRequest {
                email: "test@example.com".to_owned(),
            })
            .await;

        assert!(
            matches!(got, Err(AdviceError::Timeout { ref flow, .. }) if flow == "generateUserLogoFlow"),
            "got {got:?}"
        );
    }

    #[test]
    fn rejects_relative_base_url() {
        let got = GenkitClient::new("localhost", Duration::from_secs(1));

        assert!(matches!(got, Err(AdviceError::InvalidBaseUrl(_))));
    }
}
