use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

/// HTTP verbs used by the backend and tool clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Trait for JSON-over-HTTP operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    /// Send a request and decode the JSON response body.
    ///
    /// An empty response body decodes to `Value::Null`. Non-2xx statuses are errors.
    async fn send_json(
        &self,
        method: HttpMethod,
        url: &str,
        headers: Vec<(&str, &str)>,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, DomainError>;

    async fn get_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, DomainError> {
        self.send_json(HttpMethod::Get, url, headers, query, None)
            .await
    }

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        self.send_json(HttpMethod::Post, url, headers, &[], Some(body))
            .await
    }

    async fn put_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        self.send_json(HttpMethod::Put, url, headers, &[], Some(body))
            .await
    }

    async fn delete_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, DomainError> {
        self.send_json(HttpMethod::Delete, url, headers, &[], body)
            .await
    }
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn send_json(
        &self,
        method: HttpMethod,
        url: &str,
        headers: Vec<(&str, &str)>,
        query: &[(&str, &str)],
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, DomainError> {
        let mut request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
            HttpMethod::Put => self.client.put(url),
            HttpMethod::Delete => self.client.delete(url),
        };

        for (key, value) in headers {
            request = request.header(key, value);
        }

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::trace!(%method, url, "Sending HTTP request");

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::provider("http", format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DomainError::provider("http", format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(DomainError::provider(
                "http",
                format!("HTTP {}: {}", status, text),
            ));
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| DomainError::provider("http", format!("Failed to parse response: {}", e)))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::RwLock;

    /// A request captured by [`MockHttpClient`]
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: HttpMethod,
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub query: Vec<(String, String)>,
        pub body: Option<serde_json::Value>,
    }

    impl RecordedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }

        pub fn query_param(&self, name: &str) -> Option<&str> {
            self.query
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Canned responses keyed by method and URL.
    ///
    /// Several responses registered for the same key are returned in order; the
    /// last one repeats.
    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<(HttpMethod, String), VecDeque<serde_json::Value>>>,
        errors: RwLock<HashMap<(HttpMethod, String), String>>,
        requests: RwLock<Vec<RecordedRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(
            self,
            method: HttpMethod,
            url: impl Into<String>,
            response: serde_json::Value,
        ) -> Self {
            self.responses
                .write()
                .unwrap()
                .entry((method, url.into()))
                .or_default()
                .push_back(response);
            self
        }

        pub fn with_error(
            self,
            method: HttpMethod,
            url: impl Into<String>,
            error: impl Into<String>,
        ) -> Self {
            self.errors
                .write()
                .unwrap()
                .insert((method, url.into()), error.into());
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.read().unwrap().clone()
        }

        pub fn requests_to(&self, method: HttpMethod, url: &str) -> Vec<RecordedRequest> {
            self.requests()
                .into_iter()
                .filter(|r| r.method == method && r.url == url)
                .collect()
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn send_json(
            &self,
            method: HttpMethod,
            url: &str,
            headers: Vec<(&str, &str)>,
            query: &[(&str, &str)],
            body: Option<&serde_json::Value>,
        ) -> Result<serde_json::Value, DomainError> {
            self.requests.write().unwrap().push(RecordedRequest {
                method,
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                query: query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.cloned(),
            });

            let key = (method, url.to_string());

            if let Some(error) = self.errors.read().unwrap().get(&key) {
                return Err(DomainError::provider("mock", error));
            }

            let mut responses = self.responses.write().unwrap();
            let queue = responses.get_mut(&key).ok_or_else(|| {
                DomainError::provider("mock", format!("No mock response for {} {}", method, url))
            })?;

            let response = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };

            response.ok_or_else(|| {
                DomainError::provider("mock", format!("No mock response for {} {}", method, url))
            })
        }
    }
}
