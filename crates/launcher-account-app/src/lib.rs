#![warn(missing_docs)]
//! # launcher-account-app
//!
//! ## Purpose
//! Wires configuration, logging and the resolver services for the launcher's
//! add-account flow.
//!
//! ## Responsibilities
//! - Load [`RuntimeConfig`] from the environment and validate its endpoints.
//! - Build [`RuntimeServices`] (auth and profile clients) from the config.
//! - Gate login submission (username required, online kill switch).
//! - Start background resolutions and summarize their reports for logs.
//! - Redact secrets from free-form log text.
//!
//! ## Data flow
//! Env -> [`RuntimeConfig`] -> [`RuntimeServices`] -> [`submit_login`]
//! checks [`login_gate`] ->
//! [`spawn_resolution`] -> [`ResolutionReport`] -> [`summarize_report`].
//!
//! ## Ownership and lifetimes
//! Services are shared through `Arc` so each submission can hand them to its
//! own worker thread.
//!
//! ## Error model
//! Configuration, client construction, gate and worker failures are wrapped
//! in [`AppError`].
//!
//! ## Security and privacy notes
//! - Passwords never leave [`Credentials`] except through the auth service.
//! - [`redact_sensitive`] strips token and credential values from log text.

use std::sync::Arc;

use launcher_account_auth::{
    AuthClient, AuthError, AuthTransport, LoginRequest, LoginResponse, OnlineAuthService,
    REQUIRED_AUTH_PATH, validate_auth_endpoint,
};
use launcher_account_core::{Credentials, ResolutionOutcome};
use launcher_account_profile::{
    DEFAULT_PROFILE_API, LookupError, ProfileClient, ProfileLookupService, ProfileTransport,
    validate_profile_api,
};
use launcher_account_resolver::{
    ResolutionHandle, ResolutionReport, ResolutionWarning, ResolverError, spawn_resolution,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("LAUNCHER_ACCOUNT_VERSION");

/// Env var overriding the profile lookup base URL.
pub const ENV_PROFILE_API: &str = "LAUNCHER_ACCOUNT_PROFILE_API";
/// Env var overriding the auth endpoint.
pub const ENV_AUTH_ENDPOINT: &str = "LAUNCHER_ACCOUNT_AUTH_ENDPOINT";
/// Env var switching password logins on or off.
pub const ENV_ONLINE_ENABLED: &str = "LAUNCHER_ACCOUNT_ONLINE_ENABLED";
/// Env var holding the log filter directive.
pub const ENV_LOG_FILTER: &str = "LAUNCHER_ACCOUNT_LOG";

/// Default auth endpoint.
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://authserver.mojang.com/authenticate";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Runtime settings for the add-account flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Base URL of the profile lookup API.
    pub profile_api: Url,
    /// Auth endpoint ending in `/authenticate`.
    pub auth_endpoint: String,
    /// Whether password logins may be submitted.
    pub online_enabled: bool,
}

impl RuntimeConfig {
    /// Loads configuration from process environment.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when an endpoint override is invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when an endpoint value is invalid.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let profile_api = var(ENV_PROFILE_API).unwrap_or_else(|| DEFAULT_PROFILE_API.to_string());
        let profile_api = validate_profile_api(&profile_api)
            .map_err(|error| AppError::Config(format!("{ENV_PROFILE_API}: {error}")))?;

        let auth_endpoint =
            var(ENV_AUTH_ENDPOINT).unwrap_or_else(|| DEFAULT_AUTH_ENDPOINT.to_string());
        validate_auth_endpoint(&auth_endpoint)
            .map_err(|error| AppError::Config(format!("{ENV_AUTH_ENDPOINT}: {error}")))?;

        Ok(Self {
            profile_api,
            auth_endpoint,
            online_enabled: switch_enabled(var(ENV_ONLINE_ENABLED).as_deref()),
        })
    }
}

/// Interprets the online-login kill switch.
///
/// Semantics:
/// - Unset => password logins enabled.
/// - `0`, `false`, `off` (case-insensitive) => disabled.
/// - Any other value => enabled.
fn switch_enabled(value: Option<&str>) -> bool {
    match value {
        Some(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            !(normalized == "0" || normalized == "false" || normalized == "off")
        }
        None => true,
    }
}

/// Installs the global `tracing` subscriber.
///
/// The filter comes from `LAUNCHER_ACCOUNT_LOG` and defaults to `info`.
///
/// # Errors
/// Returns [`AppError::Logging`] when a subscriber is already installed.
pub fn init_logging() -> Result<(), AppError> {
    let filter = tracing_subscriber::EnvFilter::try_from_env(ENV_LOG_FILTER)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .map_err(|error| AppError::Logging(error.to_string()))
}

/// Result of checking whether a login may be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginGate {
    /// Submission allowed.
    Ready,
    /// Username field is empty.
    MissingUsername,
    /// A password was given but password logins are switched off.
    OnlineDisabled,
}

/// Evaluates the submit gate for `credentials` under `config`.
pub fn login_gate(credentials: &Credentials, config: &RuntimeConfig) -> LoginGate {
    if !credentials.is_submittable() {
        return LoginGate::MissingUsername;
    }
    if credentials.effective_password().is_some() && !config.online_enabled {
        return LoginGate::OnlineDisabled;
    }
    LoginGate::Ready
}

/// Services a submission resolves against.
#[derive(Clone)]
pub struct RuntimeServices {
    /// Password login service.
    pub auth: Arc<dyn OnlineAuthService>,
    /// Profile lookup service for password-less accounts.
    pub lookup: Arc<dyn ProfileLookupService>,
}

impl RuntimeServices {
    /// Builds the auth and profile clients for `config` over the given
    /// transports.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] or [`AppError::Lookup`] when a configured
    /// endpoint is rejected by its client.
    pub fn from_config(
        config: &RuntimeConfig,
        auth_transport: Arc<dyn AuthTransport>,
        profile_transport: Arc<dyn ProfileTransport>,
    ) -> Result<Self, AppError> {
        let auth = AuthClient::new(config.auth_endpoint.as_str(), auth_transport)?;
        let lookup = ProfileClient::new(config.profile_api.as_str(), profile_transport)?;
        Ok(Self {
            auth: Arc::new(auth),
            lookup: Arc::new(lookup),
        })
    }

    /// Builds clients for `config` whose transports are not available in
    /// this build.
    ///
    /// # Errors
    /// Same as [`RuntimeServices::from_config`].
    pub fn unavailable(config: &RuntimeConfig) -> Result<Self, AppError> {
        Self::from_config(
            config,
            Arc::new(UnavailableAuthTransport),
            Arc::new(UnavailableProfileTransport),
        )
    }
}

/// Auth transport for builds without a network executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableAuthTransport;

impl AuthTransport for UnavailableAuthTransport {
    fn authenticate(
        &self,
        _endpoint: &str,
        _request: &LoginRequest,
    ) -> Result<LoginResponse, AuthError> {
        Err(AuthError::Transport(
            "online login is not available in this build".to_string(),
        ))
    }
}

/// Profile transport for builds without a network executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableProfileTransport;

impl ProfileTransport for UnavailableProfileTransport {
    fn fetch(&self, _url: &Url) -> Result<Vec<u8>, LookupError> {
        Err(LookupError::Transport(
            "profile lookup is not available in this build".to_string(),
        ))
    }
}

/// Validates the gate and starts a background resolution.
///
/// # Errors
/// Returns [`AppError::Gate`] when the gate refuses submission and
/// [`AppError::Resolver`] when the worker cannot start.
pub fn submit_login(
    config: &RuntimeConfig,
    services: &RuntimeServices,
    credentials: Credentials,
) -> Result<ResolutionHandle, AppError> {
    let gate = login_gate(&credentials, config);
    if gate != LoginGate::Ready {
        return Err(AppError::Gate(gate));
    }

    info!(
        online = credentials.effective_password().is_some(),
        "login submitted"
    );
    Ok(spawn_resolution(
        Arc::clone(&services.auth),
        Arc::clone(&services.lookup),
        credentials,
    )?)
}

/// Renders a one-line, log-safe summary of `report`.
pub fn summarize_report(report: &ResolutionReport) -> String {
    let mut summary = match &report.outcome {
        ResolutionOutcome::Success(account) => format!(
            "resolved username={} id={} mode={:?}",
            account.username(),
            account.id(),
            account.mode()
        ),
        ResolutionOutcome::Failure(reason) => {
            format!("failed reason={}", redact_sensitive(reason))
        }
    };

    for warning in &report.warnings {
        match warning {
            ResolutionWarning::NameMismatch { returned, .. } => summary.push_str(&format!(
                " warning=name_mismatch returned={}",
                returned.as_deref().unwrap_or("<none>")
            )),
            ResolutionWarning::SyntheticId => summary.push_str(" warning=synthetic_id"),
        }
    }

    summary
}

const SECRET_KEYS: [&str; 4] = ["password", "token", "authorization", "bearer"];

/// Redacts common secret markers in log-safe output.
///
/// A marker counts only as a key (followed by `=` or `:`) or as a `bearer`
/// scheme followed by whitespace; words merely containing a marker are kept.
/// Everything after the first marker is dropped, since the secret's extent
/// is unknown.
pub fn redact_sensitive(input: &str) -> String {
    match find_secret_marker(input) {
        Some((position, key)) => format!("{}{key}=<redacted>", &input[..position]),
        None => input.to_string(),
    }
}

fn find_secret_marker(input: &str) -> Option<(usize, &'static str)> {
    let lower = input.to_ascii_lowercase();
    SECRET_KEYS
        .iter()
        .flat_map(|key| {
            lower
                .match_indices(key)
                .filter(|(position, _)| is_marker_at(&lower, *position, key))
                .map(|(position, _)| (position, *key))
        })
        .min_by_key(|(position, _)| *position)
}

fn is_marker_at(lower: &str, position: usize, key: &str) -> bool {
    let starts_word = lower[..position]
        .chars()
        .next_back()
        .is_none_or(|previous| !previous.is_ascii_alphanumeric());
    if !starts_word {
        return false;
    }

    let rest = &lower[position + key.len()..];
    let after_space = rest.trim_start();
    if after_space.starts_with('=') || after_space.starts_with(':') {
        return true;
    }
    key == "bearer" && rest.starts_with(char::is_whitespace) && !after_space.is_empty()
}

/// Describes the auth endpoint policy for diagnostics.
pub fn auth_policy_summary(config: &RuntimeConfig) -> String {
    format!(
        "auth_endpoint={} required_suffix={REQUIRED_AUTH_PATH} online_enabled={}",
        config.auth_endpoint, config.online_enabled
    )
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid runtime configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Logging could not be initialized.
    #[error("logging error: {0}")]
    Logging(String),
    /// Login submission refused.
    #[error("login not submitted: {0:?}")]
    Gate(LoginGate),
    /// Auth client could not be built.
    #[error("auth client error: {0}")]
    Auth(#[from] AuthError),
    /// Profile client could not be built.
    #[error("profile client error: {0}")]
    Lookup(#[from] LookupError),
    /// Resolution worker failure.
    #[error("resolver error: {0}")]
    Resolver(#[from] ResolverError),
}
