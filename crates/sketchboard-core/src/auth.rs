//! User session lookup and the auth gate.

use crate::http::{BoxFuture, HttpRequest, HttpTransport, TransportError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use url::Url;

/// Path of the current-user lookup.
pub const USER_PATH: &str = "/api/auth/user";
/// Path of the sign-in call.
pub const SIGN_IN_PATH: &str = "/api/auth/sign-in";
/// Path of the sign-out call.
pub const SIGN_OUT_PATH: &str = "/api/auth/sign-out";

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// Name shown in the user bar.
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// `{ "data": { "user": {..} | null } }`
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct UserData {
    #[serde(default)]
    user: Option<User>,
}

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Session failures.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("network error: {0}")]
    Network(#[from] TransportError),
    #[error("auth service error ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("malformed auth response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Looks up and changes the current user session.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since everything runs on one thread.
#[cfg(not(target_arch = "wasm32"))]
pub trait SessionProvider: Send + Sync {
    /// The signed-in user, if any.
    fn current_user(&self) -> BoxFuture<'_, Result<Option<User>, SessionError>>;

    /// Sign in with email and password.
    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, Result<User, SessionError>>;

    /// End the current session.
    fn sign_out(&self) -> BoxFuture<'_, Result<(), SessionError>>;
}

/// Looks up and changes the current user session (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait SessionProvider {
    /// The signed-in user, if any.
    fn current_user(&self) -> BoxFuture<'_, Result<Option<User>, SessionError>>;

    /// Sign in with email and password.
    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, Result<User, SessionError>>;

    /// End the current session.
    fn sign_out(&self) -> BoxFuture<'_, Result<(), SessionError>>;
}

/// Session provider backed by the app's auth HTTP API.
pub struct HttpSessionProvider<T: HttpTransport> {
    transport: Arc<T>,
    user_url: Url,
    sign_in_url: Url,
    sign_out_url: Url,
}

impl<T: HttpTransport> HttpSessionProvider<T> {
    pub fn new(transport: Arc<T>, api_base: &Url) -> Result<Self, SessionError> {
        Ok(Self {
            transport,
            user_url: api_base.join(USER_PATH)?,
            sign_in_url: api_base.join(SIGN_IN_PATH)?,
            sign_out_url: api_base.join(SIGN_OUT_PATH)?,
        })
    }

    async fn fetch_user(&self, request: HttpRequest) -> Result<Option<User>, SessionError> {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(SessionError::Rejected {
                status: response.status,
                message: response.error_message(),
            });
        }
        let envelope: UserEnvelope = serde_json::from_str(&response.body)?;
        Ok(envelope.data.user)
    }
}

impl<T: HttpTransport> SessionProvider for HttpSessionProvider<T> {
    fn current_user(&self) -> BoxFuture<'_, Result<Option<User>, SessionError>> {
        Box::pin(async move {
            let user = self.fetch_user(HttpRequest::get(self.user_url.as_str())).await?;
            log::debug!("Session lookup: {}", if user.is_some() { "signed in" } else { "no user" });
            Ok(user)
        })
    }

    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, Result<User, SessionError>> {
        Box::pin(async move {
            let body = serde_json::to_value(SignInRequest { email, password })?;
            let request = HttpRequest::post_json(self.sign_in_url.as_str(), body);
            match self.fetch_user(request).await {
                Ok(Some(user)) => Ok(user),
                Ok(None) | Err(SessionError::Rejected { status: 400 | 401 | 403, .. }) => {
                    Err(SessionError::InvalidCredentials)
                }
                Err(err) => Err(err),
            }
        })
    }

    fn sign_out(&self) -> BoxFuture<'_, Result<(), SessionError>> {
        Box::pin(async move {
            let request = HttpRequest::post_json(self.sign_out_url.as_str(), serde_json::json!({}));
            let response = self.transport.send(request).await?;
            if !response.is_success() {
                return Err(SessionError::Rejected {
                    status: response.status,
                    message: response.error_message(),
                });
            }
            Ok(())
        })
    }
}

/// In-memory session provider for offline use and tests.
#[derive(Debug, Default)]
pub struct MemorySessionProvider {
    current: Mutex<Option<User>>,
    accounts: HashMap<String, String>,
    /// Accept any non-empty email.
    permissive: bool,
}

impl MemorySessionProvider {
    /// Nobody signed in, no accounts.
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Start with `user` signed in.
    pub fn signed_in(user: User) -> Self {
        Self {
            current: Mutex::new(Some(user)),
            ..Self::default()
        }
    }

    /// Accept any non-empty email with any password.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Register an account that [`SessionProvider::sign_in`] accepts.
    pub fn with_account(mut self, email: &str, password: &str) -> Self {
        self.accounts.insert(email.to_string(), password.to_string());
        self
    }

    fn set_current(&self, user: Option<User>) {
        match self.current.lock() {
            Ok(mut current) => *current = user,
            Err(poisoned) => *poisoned.into_inner() = user,
        }
    }

    fn get_current(&self) -> Option<User> {
        match self.current.lock() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn check(&self, email: &str, password: &str) -> bool {
        let email = email.trim();
        if email.is_empty() {
            return false;
        }
        self.permissive || self.accounts.get(email).is_some_and(|p| p == password)
    }
}

impl SessionProvider for MemorySessionProvider {
    fn current_user(&self) -> BoxFuture<'_, Result<Option<User>, SessionError>> {
        let user = self.get_current();
        Box::pin(async move { Ok(user) })
    }

    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> BoxFuture<'a, Result<User, SessionError>> {
        let result = if self.check(email, password) {
            let user = User {
                id: format!("local-{}", email.trim()),
                email: Some(email.trim().to_string()),
            };
            self.set_current(Some(user.clone()));
            Ok(user)
        } else {
            Err(SessionError::InvalidCredentials)
        };
        Box::pin(async move { result })
    }

    fn sign_out(&self) -> BoxFuture<'_, Result<(), SessionError>> {
        self.set_current(None);
        Box::pin(async { Ok(()) })
    }
}

/// Whether the auth overlay is the only interactive surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthGate {
    /// The startup lookup has not answered yet.
    #[default]
    Pending,
    /// No user; the overlay is shown.
    SignedOut,
    SignedIn(User),
}

impl AuthGate {
    /// Whether the auth overlay is shown.
    pub fn is_gated(&self) -> bool {
        matches!(self, AuthGate::SignedOut)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthGate::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::http::testing::MockTransport;

    fn provider(transport: MockTransport) -> (HttpSessionProvider<MockTransport>, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        let base = Url::parse("http://localhost:3000").unwrap();
        (HttpSessionProvider::new(Arc::clone(&transport), &base).unwrap(), transport)
    }

    #[test]
    fn test_lookup_returns_user() {
        let body = r#"{"data":{"user":{"id":"u1","email":"a@b.c","role":"x"}}}"#;
        let (provider, transport) = provider(MockTransport::new().respond(200, "OK", body));

        let user = pollster::block_on(provider.current_user()).unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.display_name(), "a@b.c");

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "http://localhost:3000/api/auth/user");
    }

    #[test]
    fn test_lookup_without_user() {
        let (provider, _) = provider(MockTransport::new().respond(200, "OK", r#"{"data":{"user":null}}"#));
        assert_eq!(pollster::block_on(provider.current_user()).unwrap(), None);
    }

    #[test]
    fn test_lookup_failure_is_error() {
        let (provider, _) = provider(MockTransport::new().respond(500, "Internal Server Error", "oops"));
        let err = pollster::block_on(provider.current_user()).unwrap_err();
        assert!(matches!(err, SessionError::Rejected { status: 500, .. }));
    }

    #[test]
    fn test_sign_in_rejected_is_invalid_credentials() {
        let (provider, transport) = provider(
            MockTransport::new().respond(401, "Unauthorized", r#"{"error":"invalid login"}"#),
        );
        let err = pollster::block_on(provider.sign_in("a@b.c", "nope")).unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["email"], "a@b.c");
    }

    #[test]
    fn test_memory_provider_accounts() {
        let provider = MemorySessionProvider::signed_out().with_account("a@b.c", "pw");
        assert_eq!(pollster::block_on(provider.current_user()).unwrap(), None);

        assert!(pollster::block_on(provider.sign_in("a@b.c", "wrong")).is_err());
        let user = pollster::block_on(provider.sign_in("a@b.c", "pw")).unwrap();
        assert_eq!(pollster::block_on(provider.current_user()).unwrap(), Some(user));

        pollster::block_on(provider.sign_out()).unwrap();
        assert_eq!(pollster::block_on(provider.current_user()).unwrap(), None);
    }

    #[test]
    fn test_permissive_provider_needs_email() {
        let provider = MemorySessionProvider::permissive();
        assert!(pollster::block_on(provider.sign_in("  ", "x")).is_err());
        assert!(pollster::block_on(provider.sign_in("me@local", "")).is_ok());
    }

    #[test]
    fn test_gate_states() {
        assert!(!AuthGate::Pending.is_gated());
        assert!(AuthGate::SignedOut.is_gated());
        let user = User {
            id: "u1".into(),
            email: None,
        };
        let gate = AuthGate::SignedIn(user.clone());
        assert!(!gate.is_gated());
        assert_eq!(gate.user(), Some(&user));
        assert_eq!(user.display_name(), "u1");
    }
}
