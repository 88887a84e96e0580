//! Shared scripted services for resolver integration tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use launcher_account_auth::{AuthError, AuthProgress, OnlineAuthService};
use launcher_account_core::{AccountIdentity, AccountMode};
use launcher_account_profile::{LookupError, ProfileLookupService};

/// Auth service returning one scripted result and counting calls.
pub struct ScriptedAuth {
    result: Mutex<Option<Result<AccountIdentity, AuthError>>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedAuth {
    pub fn succeeding(username: &str, id: &str) -> Self {
        let account = AccountIdentity::new(username, id, AccountMode::Online)
            .expect("fixture identity should be valid");
        Self::with_result(Ok(account))
    }

    pub fn failing(error: AuthError) -> Self {
        Self::with_result(Err(error))
    }

    pub fn unused() -> Self {
        Self::failing(AuthError::Transport("auth should not be called".to_string()))
    }

    fn with_result(result: Result<AccountIdentity, AuthError>) -> Self {
        Self {
            result: Mutex::new(Some(result)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OnlineAuthService for ScriptedAuth {
    fn login(
        &self,
        _username: &str,
        _password: &str,
        progress: &dyn AuthProgress,
    ) -> Result<AccountIdentity, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        progress.status("Authenticating...");
        progress.progress(1, 1);
        self.result
            .lock()
            .expect("result lock should work")
            .take()
            .unwrap_or_else(|| Err(AuthError::Transport("called twice".to_string())))
    }
}

/// Lookup service returning one scripted result and counting calls.
pub struct ScriptedLookup {
    result: Mutex<Option<Result<Vec<u8>, LookupError>>>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedLookup {
    pub fn payload(raw: &str) -> Self {
        Self::with_result(Ok(raw.as_bytes().to_vec()))
    }

    pub fn failing(error: LookupError) -> Self {
        Self::with_result(Err(error))
    }

    pub fn unused() -> Self {
        Self::failing(LookupError::Transport("lookup should not be called".to_string()))
    }

    fn with_result(result: Result<Vec<u8>, LookupError>) -> Self {
        Self {
            result: Mutex::new(Some(result)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProfileLookupService for ScriptedLookup {
    fn lookup(&self, _username: &str) -> Result<Vec<u8>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .lock()
            .expect("result lock should work")
            .take()
            .unwrap_or_else(|| Err(LookupError::Transport("called twice".to_string())))
    }
}
