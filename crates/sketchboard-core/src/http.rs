//! HTTP transport abstraction used by the generation client and session lookup.

use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Transport-level failures (connection refused, DNS, TLS, body read).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

/// HTTP method for a transport request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A JSON request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Sent as `application/json` when present.
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Best-effort error message for a failed response: the body's `error`
    /// field, else the JSON body itself, else the status text. Empty strings,
    /// zero, `false` and `null` count as no `error` field.
    pub fn error_message(&self) -> String {
        let Ok(json) = self.json() else {
            return self.status_text.clone();
        };
        match json.get("error") {
            Some(Value::String(message)) if !message.is_empty() => message.clone(),
            Some(error) if !is_falsy(error) => error.to_string(),
            _ => json.to_string(),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Sends HTTP requests.
///
/// Note: On native platforms, implementations must be Send + Sync so clients
/// can be moved onto a worker thread. On WASM these bounds are relaxed.
#[cfg(not(target_arch = "wasm32"))]
pub trait HttpTransport: Send + Sync {
    /// Send a request and read the whole response.
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>>;
}

/// Sends HTTP requests (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait HttpTransport {
    /// Send a request and read the whole response.
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>>;
}

/// `reqwest`-backed transport (fetch on WASM, hyper natively).
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, headers).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Transport shared by [`PendingTask`](crate::task::PendingTask)s.
    ///
    /// Natively every task drives its own short-lived runtime, so idle
    /// connections must not be pooled past the request that opened them.
    pub fn for_tasks() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            match reqwest::Client::builder().pool_max_idle_per_host(0).build() {
                Ok(http) => Self::with_client(http),
                Err(e) => {
                    log::warn!("Falling back to default HTTP client: {e}");
                    Self::new()
                }
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            Self::new()
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            let builder = match request.method {
                Method::Get => self.http.get(&request.url),
                Method::Post => self.http.post(&request.url),
            };
            let builder = match &request.body {
                Some(body) => builder.json(body),
                None => builder,
            };

            let response = builder.send().await?;
            let status = response.status();
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            let body = response.text().await?;

            Ok(HttpResponse {
                status: status.as_u16(),
                status_text,
                body,
            })
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport for tests.

    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays canned responses and records every request.
    #[derive(Default)]
    pub struct MockTransport {
        responses: Mutex<Vec<Result<HttpResponse, String>>>,
        requests: Mutex<Vec<HttpRequest>>,
        calls: AtomicUsize,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response; responses are returned in order.
        pub fn respond(self, status: u16, status_text: &str, body: &str) -> Self {
            self.responses.lock().unwrap().push(Ok(HttpResponse {
                status,
                status_text: status_text.to_string(),
                body: body.to_string(),
            }));
            self
        }

        /// Queue a transport failure.
        pub fn fail(self, message: &str) -> Self {
            self.responses.lock().unwrap().push(Err(message.to_string()));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl HttpTransport for MockTransport {
        fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            let next = {
                let mut responses = self.responses.lock().unwrap();
                if responses.is_empty() {
                    Err("no canned response".to_string())
                } else {
                    responses.remove(0)
                }
            };
            Box::pin(async move { next.map_err(TransportError::Other) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let mut response = HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            body: "{}".to_string(),
        };
        assert!(response.is_success());
        response.status = 299;
        assert!(response.is_success());
        response.status = 300;
        assert!(!response.is_success());
        response.status = 404;
        assert!(!response.is_success());
    }

    fn failed(body: &str, status_text: &str) -> HttpResponse {
        HttpResponse {
            status: 400,
            status_text: status_text.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(failed(r#"{"error":"bad prompt"}"#, "Bad Request").error_message(), "bad prompt");
        assert_eq!(failed(r#"{"detail":"x"}"#, "Bad Request").error_message(), r#"{"detail":"x"}"#);
        assert_eq!(failed("<html>oops</html>", "Bad Gateway").error_message(), "Bad Gateway");
        assert_eq!(failed(r#"{"error":{"code":7}}"#, "Bad Request").error_message(), r#"{"code":7}"#);
    }

    #[test]
    fn test_falsy_error_field_falls_back_to_body() {
        for body in [r#"{"error":""}"#, r#"{"error":0}"#, r#"{"error":false}"#, r#"{"error":null}"#] {
            assert_eq!(failed(body, "Bad Request").error_message(), body);
        }
        assert_eq!(failed(r#"{"error":3}"#, "Bad Request").error_message(), "3");
    }

    #[test]
    fn test_post_json_request() {
        let request = HttpRequest::post_json("http://localhost/api", serde_json::json!({"a": 1}));
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, Some(serde_json::json!({"a": 1})));
        assert!(HttpRequest::get("http://localhost/api").body.is_none());
    }
}
