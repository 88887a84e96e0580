#![warn(missing_docs)]
//! # launcher-account-auth
//!
//! ## Purpose
//! Defines the online sign-in seam used by account resolution.
//!
//! ## Responsibilities
//! - Declare [`OnlineAuthService`], the capability the resolver calls for
//!   password logins, plus the [`AuthProgress`] notification sink.
//! - Provide [`AuthClient`], an [`OnlineAuthService`] that validates the auth
//!   endpoint policy and executes the login through an injectable
//!   [`AuthTransport`].
//!
//! ## Data flow
//! Resolver forwards username/password -> [`AuthClient::login`] builds a
//! [`LoginRequest`] -> [`AuthTransport`] returns a [`LoginResponse`] -> the
//! selected profile becomes an online [`AccountIdentity`].
//!
//! ## Ownership and lifetimes
//! Requests and responses own their strings so transports may move them across
//! threads without borrowing caller input.
//!
//! ## Error model
//! Endpoint policy violations, rejected credentials, transport failures and
//! cancellation surface as [`AuthError`]. [`AuthError::failure_reason`] gives
//! the text handed to the user unchanged.
//!
//! ## Security and privacy notes
//! This crate does not log credentials or token values.
//!
//! ## Example
//! ```rust
//! use launcher_account_auth::validate_auth_endpoint;
//!
//! assert!(validate_auth_endpoint("https://authserver.example.test/authenticate").is_ok());
//! assert!(validate_auth_endpoint("http://authserver.example.test/authenticate").is_err());
//! ```

use std::sync::Arc;

use launcher_account_core::{AccountIdentity, AccountMode, CANCELLED_REASON};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Required auth path suffix.
pub const REQUIRED_AUTH_PATH: &str = "/authenticate";

/// Login request payload forwarded to auth transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or e-mail for account lookup.
    pub username: String,
    /// Password for auth verification.
    pub password: String,
    /// Asks the server to include the user object in the response.
    #[serde(rename = "requestUser")]
    pub request_user: bool,
}

/// Profile reference returned by the auth server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRef {
    /// Profile UUID.
    pub id: String,
    /// Profile display name.
    pub name: String,
}

/// Login response payload returned by auth transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Access token used for game sessions.
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Profile the session is bound to.
    #[serde(rename = "selectedProfile")]
    pub selected_profile: Option<ProfileRef>,
}

/// Receives status text and progress from a running login.
///
/// Notifications are informational; they never change the login result.
pub trait AuthProgress: Send + Sync {
    /// Reports a human-readable status line.
    fn status(&self, status: &str);

    /// Reports `current` out of `total` steps.
    fn progress(&self, current: u64, total: u64);
}

/// Progress sink that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl AuthProgress for NoProgress {
    fn status(&self, _status: &str) {}

    fn progress(&self, _current: u64, _total: u64) {}
}

/// Capability used by the resolver for password logins.
pub trait OnlineAuthService: Send + Sync {
    /// Signs `username` in with `password`.
    ///
    /// # Errors
    /// Returns [`AuthError`] when the login is rejected, fails in transit or is
    /// cancelled.
    fn login(
        &self,
        username: &str,
        password: &str,
        progress: &dyn AuthProgress,
    ) -> Result<AccountIdentity, AuthError>;
}

/// Abstract transport used by auth client.
pub trait AuthTransport: Send + Sync {
    /// Sends login request to auth backend.
    fn authenticate(
        &self,
        endpoint: &str,
        request: &LoginRequest,
    ) -> Result<LoginResponse, AuthError>;
}

/// Auth client that validates endpoint policy and executes login flow.
#[derive(Clone)]
pub struct AuthClient {
    endpoint: String,
    transport: Arc<dyn AuthTransport>,
}

impl AuthClient {
    /// Creates a validated auth client.
    ///
    /// # Errors
    /// Returns [`AuthError::InvalidEndpoint`] when URL is not HTTPS or does not
    /// end with the required `/authenticate` path.
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn AuthTransport>,
    ) -> Result<Self, AuthError> {
        let endpoint = endpoint.into();
        validate_auth_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Returns configured auth endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl OnlineAuthService for AuthClient {
    fn login(
        &self,
        username: &str,
        password: &str,
        progress: &dyn AuthProgress,
    ) -> Result<AccountIdentity, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::EmptyCredential);
        }

        progress.status("Sending request to auth servers...");
        progress.progress(0, 2);
        debug!(endpoint = %self.endpoint, "auth request sent");

        let response = self.transport.authenticate(
            &self.endpoint,
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
                request_user: true,
            },
        )?;

        progress.status("Processing response...");
        progress.progress(1, 2);

        if response.access_token.trim().is_empty() {
            return Err(AuthError::InvalidResponse(
                "response missing access token".to_string(),
            ));
        }

        let profile = response.selected_profile.ok_or_else(|| {
            AuthError::InvalidResponse("account has no selected profile".to_string())
        })?;
        if profile.name.trim().is_empty() {
            return Err(AuthError::InvalidResponse(
                "selected profile has no name".to_string(),
            ));
        }

        let account = AccountIdentity::new(profile.name, profile.id, AccountMode::Online)
            .map_err(|error| AuthError::InvalidResponse(error.to_string()))?;

        progress.progress(2, 2);
        Ok(account)
    }
}

/// Validates auth endpoint constraints.
///
/// # Errors
/// Returns [`AuthError::InvalidEndpoint`] for non-HTTPS or path mismatch.
pub fn validate_auth_endpoint(endpoint: &str) -> Result<(), AuthError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| AuthError::InvalidEndpoint(format!("invalid auth url: {error}")))?;

    if parsed.scheme() != "https" {
        return Err(AuthError::InvalidEndpoint(
            "auth endpoint must use https".to_string(),
        ));
    }

    if !parsed.path().ends_with(REQUIRED_AUTH_PATH) {
        return Err(AuthError::InvalidEndpoint(format!(
            "auth endpoint path must end with {REQUIRED_AUTH_PATH}"
        )));
    }

    Ok(())
}

/// Errors produced by online sign-in.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Endpoint violates security or contract requirements.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Credentials are missing/blank.
    #[error("username and password must be non-empty")]
    EmptyCredential,
    /// Auth server refused the credentials.
    #[error("{0}")]
    Rejected(String),
    /// Transport failure from auth backend.
    #[error("auth transport failure: {0}")]
    Transport(String),
    /// Response payload violated auth contract expectations.
    #[error("invalid auth response: {0}")]
    InvalidResponse(String),
    /// The login was cancelled before completion.
    #[error("cancelled")]
    Cancelled,
}

impl AuthError {
    /// Text surfaced to the user as the resolution failure reason.
    ///
    /// Server-provided rejection and transport messages pass through verbatim.
    pub fn failure_reason(&self) -> String {
        match self {
            Self::Rejected(reason) | Self::Transport(reason) => reason.clone(),
            Self::Cancelled => CANCELLED_REASON.to_string(),
            other => other.to_string(),
        }
    }
}
