//! WolframAlpha tool and its credential validating provider

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::tool::ToolParameters;
use crate::domain::{
    DomainError, Tool, ToolCredentials, ToolInvokeMessage, ToolProviderController, ToolRuntime,
};
use crate::infrastructure::http::{HttpClient, HttpClientTrait};

pub const WOLFRAMALPHA_API_URL: &str = "https://api.wolframalpha.com/v2/query";

/// Request timeout for the WolframAlpha API
pub const WOLFRAMALPHA_TIMEOUT: Duration = Duration::from_secs(20);

/// Query sent when probing credentials
const VALIDATION_QUERY: &str = "1+2+....+111";

/// Queries are retried with the best "did you mean" suggestion at most this many times
const MAX_ROUNDS: usize = 3;

/// Answers a natural-language or math query through the WolframAlpha Full Results API
#[derive(Debug, Clone)]
pub struct WolframAlphaTool {
    client: Arc<dyn HttpClientTrait>,
    api_url: String,
    runtime: ToolRuntime,
}

impl WolframAlphaTool {
    pub fn new(client: Arc<dyn HttpClientTrait>) -> Self {
        Self {
            client,
            api_url: WOLFRAMALPHA_API_URL.to_string(),
            runtime: ToolRuntime::new(),
        }
    }

    /// Client with the default request timeout
    pub fn with_default_client() -> Result<Self, DomainError> {
        let client = HttpClient::with_timeout(WOLFRAMALPHA_TIMEOUT)?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn runtime(&self) -> &ToolRuntime {
        &self.runtime
    }

    async fn query(&self, appid: &str, input: &str) -> Result<Value, DomainError> {
        let params = [
            ("appid", appid),
            ("input", input),
            ("includepodid", "Result"),
            ("format", "plaintext"),
            ("output", "json"),
        ];

        let response = self
            .client
            .get_json(&self.api_url, vec![], &params)
            .await
            .map_err(|e| {
                warn!(error = %e, "WolframAlpha request failed");
                DomainError::tool_invoke(format!("Failed to invoke tool: {}", e))
            })?;

        Ok(response["queryresult"].clone())
    }
}

/// What one round of querying produced
enum Round {
    Retry(String),
    Done(Vec<ToolInvokeMessage>),
}

fn check_success(result: &Value) -> Result<(), DomainError> {
    if result["success"].as_bool() == Some(true) {
        return Ok(());
    }

    if result["error"]["msg"].as_str() == Some("Invalid appid") {
        return Err(DomainError::credential_validation("Invalid appid"));
    }

    Err(DomainError::tool_invoke("Failed to invoke tool"))
}

/// Highest scoring suggestion; the API sends a single object or a list
fn best_suggestion(didyoumeans: &Value) -> String {
    let candidates: Vec<&Value> = match didyoumeans {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut best = String::new();
    let mut best_score = 0.0_f64;
    for candidate in candidates {
        let score: f64 = match &candidate["score"] {
            Value::String(s) => s.parse().unwrap_or(0.0),
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            _ => 0.0,
        };
        if score > best_score {
            best_score = score;
            best = candidate["val"].as_str().unwrap_or_default().to_string();
        }
    }
    best
}

fn evaluate(result: &Value) -> Result<Round, DomainError> {
    check_success(result)?;

    if !result["didyoumeans"].is_null() {
        return Ok(Round::Retry(best_suggestion(&result["didyoumeans"])));
    }

    if let Some(url) = result["sources"]["url"].as_str() {
        return Ok(Round::Done(vec![ToolInvokeMessage::link(url)]));
    }

    let plaintext = result["pods"][0]["subpods"][0]["plaintext"]
        .as_str()
        .filter(|text| !text.is_empty());

    Ok(Round::Done(vec![ToolInvokeMessage::text(
        plaintext.unwrap_or("No result found"),
    )]))
}

#[async_trait]
impl Tool for WolframAlphaTool {
    fn name(&self) -> &'static str {
        "wolframalpha"
    }

    fn fork_tool_runtime(&self, runtime: ToolRuntime) -> Self {
        Self {
            client: Arc::clone(&self.client),
            api_url: self.api_url.clone(),
            runtime,
        }
    }

    async fn invoke(
        &self,
        user_id: &str,
        tool_parameters: &ToolParameters,
    ) -> Result<Vec<ToolInvokeMessage>, DomainError> {
        let query = tool_parameters
            .get("query")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        if query.is_empty() {
            return Ok(vec![ToolInvokeMessage::text("Please input query")]);
        }

        let appid = self
            .runtime
            .credential_str("appid")
            .ok_or_else(|| DomainError::credential_validation("Please input appid"))?;

        debug!(user_id, query, "Invoking WolframAlpha");

        let mut input = query.to_string();
        for _ in 0..MAX_ROUNDS {
            let result = self.query(appid, &input).await?;
            match evaluate(&result)? {
                Round::Done(messages) => return Ok(messages),
                Round::Retry(suggestion) => {
                    debug!(from = %input, to = %suggestion, "Retrying with suggested query");
                    input = suggestion;
                }
            }
        }

        Ok(vec![ToolInvokeMessage::text("No result found")])
    }
}

/// Provider owning the WolframAlpha tool's credentials
#[derive(Debug, Clone)]
pub struct WolframAlphaProvider {
    tool: WolframAlphaTool,
}

impl WolframAlphaProvider {
    pub fn new(tool: WolframAlphaTool) -> Self {
        Self { tool }
    }
}

#[async_trait]
impl ToolProviderController for WolframAlphaProvider {
    fn provider_name(&self) -> &'static str {
        "wolframalpha"
    }

    /// Probe the API with a fixed arithmetic query
    async fn validate_credentials(&self, credentials: &ToolCredentials) -> Result<(), DomainError> {
        let tool = self
            .tool
            .fork_tool_runtime(ToolRuntime::new().with_credentials(credentials.clone()));
        let parameters: ToolParameters = HashMap::from([("query".to_string(), json!(VALIDATION_QUERY))]);

        tool.invoke("", &parameters)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                DomainError::CredentialValidation { message } => {
                    DomainError::credential_validation(message)
                }
                other => DomainError::credential_validation(other.to_string()),
            })
    }
}
