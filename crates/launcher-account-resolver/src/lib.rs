#![warn(missing_docs)]
//! # launcher-account-resolver
//!
//! ## Purpose
//! Turns login credentials into exactly one resolved account or failure.
//!
//! ## Responsibilities
//! - Route password logins to the injected [`OnlineAuthService`].
//! - Route password-less logins to the injected [`ProfileLookupService`], with a
//!   deterministic synthetic id when the lookup yields nothing usable.
//! - Relay status and progress as [`ResolverEvent`]s and run resolutions on a
//!   background worker via [`spawn_resolution`].
//!
//! ## Data flow
//! [`Credentials`] -> [`AccountResolver::resolve`] -> one auth call or one
//! lookup call -> [`ResolutionReport`] (outcome plus non-fatal warnings).
//!
//! ## Ownership and lifetimes
//! A resolver is single-use. The resolved [`AccountIdentity`] is moved to the
//! caller and the resolver keeps no reference to it.
//!
//! ## Error model
//! Online failures surface verbatim as [`ResolutionOutcome::Failure`].
//! Offline lookup failures are absorbed by the synthetic id fallback.
//! Cancellation on either path yields `Failure("cancelled")`.
//!
//! ## Security and privacy notes
//! Passwords are passed straight to the auth service and never logged.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//!
//! use launcher_account_auth::{AuthError, AuthProgress, OnlineAuthService};
//! use launcher_account_core::{offline_account_id, AccountIdentity, Credentials};
//! use launcher_account_profile::{LookupError, ProfileLookupService};
//! use launcher_account_resolver::AccountResolver;
//!
//! struct Offline;
//!
//! impl OnlineAuthService for Offline {
//!     fn login(
//!         &self,
//!         _: &str,
//!         _: &str,
//!         _: &dyn AuthProgress,
//!     ) -> Result<AccountIdentity, AuthError> {
//!         Err(AuthError::Transport("no network".to_string()))
//!     }
//! }
//!
//! impl ProfileLookupService for Offline {
//!     fn lookup(&self, _: &str) -> Result<Vec<u8>, LookupError> {
//!         Err(LookupError::Transport("no network".to_string()))
//!     }
//! }
//!
//! let service = Arc::new(Offline);
//! let mut resolver = AccountResolver::new(service.clone(), service);
//! let outcome = resolver.resolve(&Credentials::offline("Steve"));
//! assert_eq!(outcome.account().unwrap().id(), offline_account_id("Steve"));
//! ```

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use launcher_account_auth::{AuthProgress, OnlineAuthService};
use launcher_account_core::{
    AccountIdentity, AccountMode, CANCELLED_REASON, Credentials, ResolutionOutcome,
};
use launcher_account_profile::{LookupError, ProfileLookupService, interpret_lookup};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure reason for a second `resolve` call on the same resolver.
pub const ALREADY_USED_REASON: &str = "resolver already used";

/// Resolver lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    /// No request issued yet.
    Idle,
    /// Waiting for the online auth service.
    AwaitingOnlineAuth,
    /// Waiting for the profile lookup service.
    AwaitingLookup,
    /// Terminal; the outcome has been produced.
    Resolved,
}

/// Non-fatal observation recorded during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    /// The lookup answered for a different name than requested.
    NameMismatch {
        /// Username sent to the lookup service.
        requested: String,
        /// Name reported back, if any.
        returned: Option<String>,
    },
    /// No usable id came back, so the synthetic offline id was assigned.
    SyntheticId,
}

/// Outcome of one resolution plus the warnings gathered on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Terminal outcome.
    pub outcome: ResolutionOutcome,
    /// Non-fatal warnings, in the order they were observed.
    pub warnings: Vec<ResolutionWarning>,
}

impl ResolutionReport {
    fn failure(reason: impl Into<String>) -> Self {
        Self {
            outcome: ResolutionOutcome::Failure(reason.into()),
            warnings: Vec::new(),
        }
    }

    /// Returns `true` when a name mismatch was recorded.
    pub fn has_name_mismatch(&self) -> bool {
        self.warnings
            .iter()
            .any(|warning| matches!(warning, ResolutionWarning::NameMismatch { .. }))
    }
}

/// Notification emitted while a resolution runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverEvent {
    /// Resolver moved to a new state.
    StateChanged(ResolverState),
    /// Status text relayed from the auth service.
    Status(String),
    /// Step progress relayed from the auth service.
    Progress {
        /// Completed steps.
        current: u64,
        /// Total steps.
        total: u64,
    },
    /// Terminal event; always the last one sent.
    Finished(ResolutionReport),
}

/// Single-use account resolution state machine.
pub struct AccountResolver {
    auth: Arc<dyn OnlineAuthService>,
    lookup: Arc<dyn ProfileLookupService>,
    state: ResolverState,
    events: Option<Sender<ResolverEvent>>,
}

impl AccountResolver {
    /// Creates an idle resolver over the given services.
    pub fn new(auth: Arc<dyn OnlineAuthService>, lookup: Arc<dyn ProfileLookupService>) -> Self {
        Self {
            auth,
            lookup,
            state: ResolverState::Idle,
            events: None,
        }
    }

    /// Relays state, status, progress and the terminal report to `events`.
    pub fn with_events(mut self, events: Sender<ResolverEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Returns current state snapshot.
    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Resolves `credentials` into exactly one outcome.
    pub fn resolve(&mut self, credentials: &Credentials) -> ResolutionOutcome {
        self.resolve_with_report(credentials).outcome
    }

    /// Resolves `credentials` and returns the outcome with its warnings.
    ///
    /// A resolver that already left [`ResolverState::Idle`] issues no request
    /// and reports [`ALREADY_USED_REASON`].
    pub fn resolve_with_report(&mut self, credentials: &Credentials) -> ResolutionReport {
        if self.state != ResolverState::Idle {
            return ResolutionReport::failure(ALREADY_USED_REASON);
        }

        let report = match credentials.effective_password() {
            Some(password) => {
                self.transition(ResolverState::AwaitingOnlineAuth);
                self.resolve_online(&credentials.username, password)
            }
            None => {
                self.transition(ResolverState::AwaitingLookup);
                self.resolve_offline(&credentials.username)
            }
        };

        self.transition(ResolverState::Resolved);
        match &report.outcome {
            ResolutionOutcome::Success(account) => {
                info!(mode = ?account.mode(), warnings = report.warnings.len(), "account resolved");
            }
            ResolutionOutcome::Failure(reason) => {
                info!(reason = %reason, "account resolution failed");
            }
        }
        self.emit(ResolverEvent::Finished(report.clone()));
        report
    }

    fn resolve_online(&self, username: &str, password: &str) -> ResolutionReport {
        let relay = ProgressRelay {
            events: self.events.clone(),
        };

        let account = match self.auth.login(username, password, &relay) {
            Ok(account) => account,
            Err(error) => return ResolutionReport::failure(error.failure_reason()),
        };

        let outcome = match account.mode() {
            AccountMode::Online => ResolutionOutcome::Success(account),
            AccountMode::Offline => {
                match AccountIdentity::new(account.username(), account.id(), AccountMode::Online)
                {
                    Ok(account) => ResolutionOutcome::Success(account),
                    Err(error) => ResolutionOutcome::Failure(error.to_string()),
                }
            }
        };

        ResolutionReport {
            outcome,
            warnings: Vec::new(),
        }
    }

    fn resolve_offline(&self, username: &str) -> ResolutionReport {
        let lookup = self.lookup.lookup(username);
        if matches!(lookup, Err(LookupError::Cancelled)) {
            return ResolutionReport::failure(CANCELLED_REASON);
        }

        let result = interpret_lookup(username, lookup);
        let mut warnings = Vec::new();
        if result.name_mismatch {
            warnings.push(ResolutionWarning::NameMismatch {
                requested: username.to_string(),
                returned: result.returned_name.clone(),
            });
        }

        let account = match result
            .usable_id()
            .and_then(|id| AccountIdentity::new(username, id, AccountMode::Offline).ok())
        {
            Some(account) => account,
            None => {
                warn!("no usable profile id, assigning synthetic offline id");
                warnings.push(ResolutionWarning::SyntheticId);
                AccountIdentity::synthetic_offline(username)
            }
        };

        ResolutionReport {
            outcome: ResolutionOutcome::Success(account),
            warnings,
        }
    }

    fn transition(&mut self, next: ResolverState) {
        debug!(from = ?self.state, to = ?next, "resolver state transition");
        self.state = next;
        self.emit(ResolverEvent::StateChanged(next));
    }

    fn emit(&self, event: ResolverEvent) {
        if let Some(events) = &self.events {
            // Receiver may be gone; the caller still gets the return value.
            let _ = events.send(event);
        }
    }
}

struct ProgressRelay {
    events: Option<Sender<ResolverEvent>>,
}

impl AuthProgress for ProgressRelay {
    fn status(&self, status: &str) {
        if let Some(events) = &self.events {
            let _ = events.send(ResolverEvent::Status(status.to_string()));
        }
    }

    fn progress(&self, current: u64, total: u64) {
        if let Some(events) = &self.events {
            let _ = events.send(ResolverEvent::Progress { current, total });
        }
    }
}

/// Handle to a resolution running on a background worker thread.
pub struct ResolutionHandle {
    events: Receiver<ResolverEvent>,
    worker_join: JoinHandle<()>,
}

impl ResolutionHandle {
    /// Event stream; ends with [`ResolverEvent::Finished`] unless the worker
    /// dies first.
    pub fn events(&self) -> &Receiver<ResolverEvent> {
        &self.events
    }

    /// Blocks until the terminal report arrives.
    ///
    /// If the worker exits without a terminal event, the resolution is
    /// reported as cancelled instead of blocking forever.
    pub fn wait(self) -> ResolutionReport {
        self.wait_with(|_| {})
    }

    /// Like [`ResolutionHandle::wait`], passing every non-terminal event to
    /// `on_event` first.
    pub fn wait_with(self, mut on_event: impl FnMut(&ResolverEvent)) -> ResolutionReport {
        let report = loop {
            match self.events.recv() {
                Ok(ResolverEvent::Finished(report)) => break report,
                Ok(event) => on_event(&event),
                Err(_) => {
                    warn!("resolution worker exited without an outcome");
                    break ResolutionReport::failure(CANCELLED_REASON);
                }
            }
        };
        let _ = self.worker_join.join();
        report
    }
}

/// Runs one resolution of `credentials` on a dedicated worker thread.
///
/// # Errors
/// Returns [`ResolverError::Spawn`] when the worker thread cannot start.
pub fn spawn_resolution(
    auth: Arc<dyn OnlineAuthService>,
    lookup: Arc<dyn ProfileLookupService>,
    credentials: Credentials,
) -> Result<ResolutionHandle, ResolverError> {
    let (event_tx, event_rx) = mpsc::channel::<ResolverEvent>();

    let worker_join = std::thread::Builder::new()
        .name("launcher-account-resolver".to_string())
        .spawn(move || {
            let mut resolver = AccountResolver::new(auth, lookup).with_events(event_tx);
            resolver.resolve(&credentials);
        })?;

    Ok(ResolutionHandle {
        events: event_rx,
        worker_join,
    })
}

/// Errors raised around, not inside, a resolution.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Worker thread could not be started.
    #[error("failed to spawn resolution worker: {0}")]
    Spawn(#[from] std::io::Error),
}
