#![warn(missing_docs)]
//! # launcher-account-core
//!
//! ## Purpose
//! Defines the pure data model shared by the `launcher-account` workspace.
//!
//! ## Responsibilities
//! - Represent login credentials and the submit gate used by the login form.
//! - Represent resolved account identities and resolution outcomes.
//! - Derive deterministic offline account ids from usernames.
//!
//! ## Data flow
//! The caller builds [`Credentials`], the resolver turns them into a
//! [`ResolutionOutcome`] carrying an [`AccountIdentity`] on success.
//! Offline paths without an authoritative id use [`offline_account_id`].
//!
//! ## Ownership and lifetimes
//! Identities own their strings and expose read-only accessors, so a resolved
//! account can be moved to the caller without borrowing resolver state.
//!
//! ## Error model
//! Identity construction with an empty id returns [`CoreError::EmptyAccountId`].
//!
//! ## Security and privacy notes
//! [`Credentials`] implements `Debug` manually and never prints the password.
//!
//! ## Example
//! ```rust
//! use launcher_account_core::{offline_account_id, AccountIdentity, AccountMode};
//!
//! let id = offline_account_id("Steve");
//! let account = AccountIdentity::new("Steve", id.clone(), AccountMode::Offline).unwrap();
//! assert_eq!(account.id(), id);
//! assert_eq!(account.id().len(), 32);
//! ```

use std::fmt;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reason reported when an in-flight request was cancelled.
pub const CANCELLED_REASON: &str = "cancelled";

/// User-provided login input.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account username or e-mail.
    pub username: String,
    /// Optional password; absent or empty selects offline resolution.
    pub password: Option<String>,
}

impl Credentials {
    /// Creates credentials for an online login attempt.
    pub fn online(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
        }
    }

    /// Creates password-less credentials.
    pub fn offline(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
        }
    }

    /// Returns the password only when it is present and non-empty.
    pub fn effective_password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .filter(|password| !password.is_empty())
    }

    /// Returns `true` when a login request may be submitted.
    ///
    /// The login form keeps its confirm action disabled until a username has
    /// been typed; the password never affects this gate.
    pub fn is_submittable(&self) -> bool {
        !self.username.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field(
                "password",
                &self.effective_password().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// How an account identity was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountMode {
    /// Authenticated against the remote identity service.
    Online,
    /// Assigned locally, with or without a remote profile lookup.
    Offline,
}

/// Resolved account identity handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountIdentity {
    username: String,
    id: String,
    mode: AccountMode,
}

impl AccountIdentity {
    /// Creates a validated identity.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyAccountId`] when `id` is blank.
    pub fn new(
        username: impl Into<String>,
        id: impl Into<String>,
        mode: AccountMode,
    ) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::EmptyAccountId);
        }

        Ok(Self {
            username: username.into(),
            id,
            mode,
        })
    }

    /// Creates an offline identity with the synthetic id for `username`.
    pub fn synthetic_offline(username: impl Into<String>) -> Self {
        let username = username.into();
        let id = offline_account_id(&username);
        Self {
            username,
            id,
            mode: AccountMode::Offline,
        }
    }

    /// Account username as requested by the user.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// UUID-shaped account id. Never empty.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resolution mode.
    pub fn mode(&self) -> AccountMode {
        self.mode
    }
}

/// Terminal result of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// An identity was resolved.
    Success(AccountIdentity),
    /// Resolution failed with a human-readable reason.
    Failure(String),
}

impl ResolutionOutcome {
    /// Returns `true` for [`ResolutionOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the resolved identity, if any.
    pub fn account(&self) -> Option<&AccountIdentity> {
        match self {
            Self::Success(account) => Some(account),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure reason, if any.
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(reason) => Some(reason),
        }
    }

    /// Consumes the outcome into a `Result`.
    pub fn into_result(self) -> Result<AccountIdentity, String> {
        match self {
            Self::Success(account) => Ok(account),
            Self::Failure(reason) => Err(reason),
        }
    }
}

/// Interpreted result of one remote profile lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileLookupResult {
    /// Whether the payload was well-formed.
    pub found: bool,
    /// Profile id when present and non-empty.
    pub id: Option<String>,
    /// Whether the returned profile name differs from the requested one.
    pub name_mismatch: bool,
    /// Name reported by the lookup service, kept for mismatch diagnostics.
    pub returned_name: Option<String>,
}

impl ProfileLookupResult {
    /// Result used when the lookup failed or returned nothing usable.
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Returns the authoritative id only for a found profile.
    pub fn usable_id(&self) -> Option<&str> {
        if !self.found {
            return None;
        }
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Derives the deterministic offline id for `username`.
///
/// The id is the MD5 digest of the UTF-8 username rendered as 32 lowercase hex
/// characters, so the same username always maps to the same id.
pub fn offline_account_id(username: &str) -> String {
    let digest = Md5::digest(username.as_bytes());
    hex::encode(digest)
}

/// Error type for core model validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Identities must carry a non-empty id.
    #[error("account id is empty")]
    EmptyAccountId,
}
