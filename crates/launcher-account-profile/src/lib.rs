#![warn(missing_docs)]
//! # launcher-account-profile
//!
//! ## Purpose
//! Defines the remote profile lookup contract used for offline accounts.
//!
//! ## Responsibilities
//! - Declare [`ProfileLookupService`], the capability that fetches a profile
//!   by username.
//! - Provide [`ProfileClient`], a [`ProfileLookupService`] that builds the
//!   lookup URL and fetches it through an injectable [`ProfileTransport`].
//! - Build lookup URLs with the username as an encoded path segment.
//! - Parse lookup payloads and interpret them as a [`ProfileLookupResult`].
//!
//! ## Data flow
//! Resolver asks [`ProfileLookupService::lookup`] for raw bytes ->
//! [`interpret_lookup`] decodes them with [`parse_profile_payload`] -> the
//! resolver either adopts the returned id or falls back to a synthetic one.
//!
//! ## Ownership and lifetimes
//! Payloads are decoded into owned structs so nothing borrows from transient
//! network buffers.
//!
//! ## Error model
//! Transport failures, non-200 statuses and undecodable payloads are
//! [`LookupError`] values. [`interpret_lookup`] absorbs all of them into
//! [`ProfileLookupResult::not_found`].
//!
//! ## Security and privacy notes
//! Lookups carry only the public username; no credentials reach this crate.

use std::sync::Arc;

use launcher_account_core::ProfileLookupResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

/// Default base URL of the public profile lookup API.
pub const DEFAULT_PROFILE_API: &str = "https://api.mojang.com/users/profiles/minecraft/";

/// Profile object returned by the lookup API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePayload {
    /// Profile UUID.
    #[serde(default)]
    pub id: Option<String>,
    /// Canonical profile name.
    #[serde(default)]
    pub name: Option<String>,
    /// Alternate name field some mirrors use instead of `name`.
    #[serde(default)]
    pub player: Option<String>,
}

impl ProfilePayload {
    /// Name reported by the service, preferring `name` over `player`.
    pub fn reported_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.player.as_deref())
    }
}

/// Capability used by the resolver for password-less accounts.
pub trait ProfileLookupService: Send + Sync {
    /// Fetches the raw profile payload for `username`.
    ///
    /// # Errors
    /// Returns [`LookupError`] on transport failure, non-200 status or
    /// cancellation.
    fn lookup(&self, username: &str) -> Result<Vec<u8>, LookupError>;
}

/// Abstract transport used by profile client.
pub trait ProfileTransport: Send + Sync {
    /// Fetches the body at `url`.
    ///
    /// # Errors
    /// Returns [`LookupError`] on network failure, non-200 status or
    /// cancellation.
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, LookupError>;
}

/// Lookup client bound to one profile API base URL.
#[derive(Clone)]
pub struct ProfileClient {
    base: Url,
    transport: Arc<dyn ProfileTransport>,
}

impl ProfileClient {
    /// Creates a client for the profile API at `base`.
    ///
    /// # Errors
    /// Returns [`LookupError::InvalidBaseUrl`] when `base` does not parse or
    /// is not HTTPS.
    pub fn new(base: &str, transport: Arc<dyn ProfileTransport>) -> Result<Self, LookupError> {
        let base = validate_profile_api(base)?;
        Ok(Self { base, transport })
    }

    /// Returns configured profile API base.
    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl ProfileLookupService for ProfileClient {
    fn lookup(&self, username: &str) -> Result<Vec<u8>, LookupError> {
        let url = profile_lookup_url(self.base.as_str(), username)?;
        debug!(url = %url, "profile lookup sent");
        self.transport.fetch(&url)
    }
}

/// Builds the lookup URL for `username` under `base`.
///
/// # Errors
/// Returns [`LookupError::InvalidBaseUrl`] when `base` does not parse, is not
/// HTTPS, or cannot carry path segments.
pub fn profile_lookup_url(base: &str, username: &str) -> Result<Url, LookupError> {
    let mut url = validate_profile_api(base)?;

    url.path_segments_mut()
        .map_err(|_| LookupError::InvalidBaseUrl("base url cannot carry a path".to_string()))?
        .pop_if_empty()
        .push(username);

    Ok(url)
}

/// Validates the lookup API base URL.
///
/// # Errors
/// Returns [`LookupError::InvalidBaseUrl`] for unparsable or non-HTTPS URLs.
pub fn validate_profile_api(base: &str) -> Result<Url, LookupError> {
    let url = Url::parse(base)
        .map_err(|error| LookupError::InvalidBaseUrl(format!("invalid profile url: {error}")))?;

    if url.scheme() != "https" {
        return Err(LookupError::InvalidBaseUrl(
            "profile api must use https".to_string(),
        ));
    }

    Ok(url)
}

/// Decodes a lookup payload.
///
/// # Errors
/// Returns [`LookupError::Decode`] for invalid JSON or a non-object document.
pub fn parse_profile_payload(raw: &[u8]) -> Result<ProfilePayload, LookupError> {
    serde_json::from_slice(raw).map_err(LookupError::Decode)
}

/// Interprets one lookup attempt for `requested`.
///
/// Every failure maps to [`ProfileLookupResult::not_found`]. A returned name
/// that differs from `requested` sets `name_mismatch` without discarding the id.
pub fn interpret_lookup(
    requested: &str,
    lookup: Result<Vec<u8>, LookupError>,
) -> ProfileLookupResult {
    let raw = match lookup {
        Ok(raw) => raw,
        Err(lookup_error) => {
            error!(error = %lookup_error, "profile lookup failed");
            return ProfileLookupResult::not_found();
        }
    };

    let payload = match parse_profile_payload(&raw) {
        Ok(payload) => payload,
        Err(decode_error) => {
            error!(error = %decode_error, "failed to parse profile lookup payload");
            return ProfileLookupResult::not_found();
        }
    };

    let returned_name = payload.reported_name().map(str::to_string);
    let name_mismatch = payload.name.as_deref() != Some(requested);
    if name_mismatch {
        warn!(
            requested,
            returned = returned_name.as_deref().unwrap_or("<none>"),
            "profile lookup returned a different username than requested"
        );
    }

    ProfileLookupResult {
        found: true,
        id: payload.id.filter(|id| !id.trim().is_empty()),
        name_mismatch,
        returned_name,
    }
}

/// Profile lookup errors.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Configured base URL is unusable.
    #[error("invalid profile api: {0}")]
    InvalidBaseUrl(String),
    /// Network failure while fetching the profile.
    #[error("profile transport failure: {0}")]
    Transport(String),
    /// Service answered with a non-200 status.
    #[error("profile lookup returned status {0}")]
    Status(u16),
    /// JSON decode failure.
    #[error("profile decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Lookup was cancelled before completion.
    #[error("profile lookup cancelled")]
    Cancelled,
}
