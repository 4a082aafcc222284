// Session store - current token and user
//
// The token has exactly one write path, `set_token`, which updates the durable
// store and the credentials handed to every outgoing call together. Nothing
// else touches either, so the two cannot drift apart.

use std::fmt;

use crate::api::{ApiClient, ApiError, Credentials, FieldErrors, RegisterData, User};
use crate::storage::TokenStore;

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";
const UNEXPECTED: &str = "An unexpected error occurred";

/// Why login or registration did not produce a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    /// One-line message for a global banner
    pub message: String,
    /// Per-field messages for inline display (registration only)
    pub fields: FieldErrors,
}

impl AuthFailure {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    fn from_login_error(err: &ApiError) -> Self {
        match err {
            ApiError::Decode(_) => Self::message(UNEXPECTED),
            other => Self::message(
                other
                    .payload()
                    .and_then(|p| p.error_message())
                    .unwrap_or(LOGIN_FAILED),
            ),
        }
    }

    fn from_register_error(err: &ApiError) -> Self {
        match err {
            ApiError::Decode(_) => Self::message(UNEXPECTED),
            other => match other.payload() {
                Some(payload) => Self {
                    message: payload
                        .flatten()
                        .unwrap_or_else(|| REGISTER_FAILED.to_string()),
                    fields: payload.field_errors(),
                },
                None => Self::message(REGISTER_FAILED),
            },
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AuthFailure {}

/// Authentication state for one client
pub struct Session<S: TokenStore> {
    api: ApiClient,
    store: S,
    credentials: Credentials,
    user: Option<User>,
    loading: bool,
    last_error: Option<String>,
}

impl<S: TokenStore> Session<S> {
    /// New, unresolved session. Call [`initialize`](Self::initialize) before
    /// rendering anything that depends on the user.
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            api,
            store,
            credentials: Credentials::anonymous(),
            user: None,
            loading: true,
            last_error: None,
        }
    }

    /// Single sync point: durable store and outgoing credentials change together
    fn set_token(&mut self, token: Option<String>) {
        let result = match &token {
            Some(t) => self.store.save(t),
            None => self.store.clear(),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to persist session token: {}", e);
        }

        self.credentials = match token {
            Some(t) => Credentials::token(t),
            None => Credentials::anonymous(),
        };
    }

    /// Resolve a stored token into a user. Any failure drops the token and
    /// leaves the session anonymous; nothing is surfaced.
    pub async fn initialize(&mut self) {
        self.loading = true;

        let stored = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read stored token: {}", e);
                None
            }
        };

        if let Some(token) = stored {
            let creds = Credentials::token(token.clone());
            match self.api.current_user(&creds).await {
                Ok(user) => {
                    tracing::info!("Restored session for {}", user.email);
                    self.user = Some(user);
                    self.set_token(Some(token));
                }
                Err(e) => {
                    tracing::info!("Stored token rejected, continuing signed out: {}", e);
                    self.user = None;
                    self.set_token(None);
                }
            }
        }

        self.loading = false;
    }

    /// Exchange email and password for a session
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthFailure> {
        self.last_error = None;
        match self.api.login(email, password).await {
            Ok(resp) => {
                tracing::info!("Logged in as {}", resp.user.email);
                self.set_token(Some(resp.token));
                Ok(self.user.insert(resp.user))
            }
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                let failure = AuthFailure::from_login_error(&e);
                self.last_error = Some(failure.message.clone());
                Err(failure)
            }
        }
    }

    /// Create an account and start a session with it
    pub async fn register(&mut self, data: &RegisterData) -> Result<&User, AuthFailure> {
        self.last_error = None;

        if let Err(fields) = data.validate() {
            let failure = AuthFailure {
                message: fields.flatten(),
                fields,
            };
            self.last_error = Some(failure.message.clone());
            return Err(failure);
        }

        match self.api.register(data).await {
            Ok(resp) => {
                tracing::info!("Registered {}", resp.user.email);
                self.set_token(Some(resp.token));
                Ok(self.user.insert(resp.user))
            }
            Err(e) => {
                tracing::warn!("Registration failed: {}", e);
                let failure = AuthFailure::from_register_error(&e);
                self.last_error = Some(failure.message.clone());
                Err(failure)
            }
        }
    }

    /// Tell the server, then forget everything locally regardless of outcome
    pub async fn logout(&mut self) {
        if self.credentials.is_authenticated() {
            if let Err(e) = self.api.logout(&self.credentials).await {
                tracing::warn!("Logout error: {}", e);
            }
        }
        self.user = None;
        self.set_token(None);
        tracing::info!("Logged out");
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Staff accounts manage universities
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_staff)
    }

    /// True until `initialize` has finished
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}
