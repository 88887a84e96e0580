//! Integration tests for building services from runtime config.

use std::sync::{Arc, Mutex};

use launcher_account_app::{
    AppError, ENV_AUTH_ENDPOINT, ENV_PROFILE_API, RuntimeConfig, RuntimeServices, submit_login,
};
use launcher_account_auth::{AuthError, AuthTransport, LoginRequest, LoginResponse, ProfileRef};
use launcher_account_core::{AccountMode, Credentials, offline_account_id};
use launcher_account_profile::{LookupError, ProfileTransport};
use url::Url;

#[derive(Default)]
struct RecordingProfileTransport {
    urls: Mutex<Vec<String>>,
}

impl ProfileTransport for RecordingProfileTransport {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, LookupError> {
        self.urls
            .lock()
            .expect("url lock should work")
            .push(url.to_string());
        Ok(br#"{"id":"d0d0-5555","name":"Dave Smith"}"#.to_vec())
    }
}

#[derive(Default)]
struct RecordingAuthTransport {
    endpoints: Mutex<Vec<String>>,
}

impl AuthTransport for RecordingAuthTransport {
    fn authenticate(
        &self,
        endpoint: &str,
        request: &LoginRequest,
    ) -> Result<LoginResponse, AuthError> {
        self.endpoints
            .lock()
            .expect("endpoint lock should work")
            .push(endpoint.to_string());
        Ok(LoginResponse {
            access_token: "session".to_string(),
            selected_profile: Some(ProfileRef {
                id: "a11ce-0001".to_string(),
                name: request.username.clone(),
            }),
        })
    }
}

fn mirror_config() -> RuntimeConfig {
    RuntimeConfig::from_vars(|key| match key {
        ENV_PROFILE_API => Some("https://mirror.example.test/p/".to_string()),
        ENV_AUTH_ENDPOINT => Some("https://auth.example.test/v1/authenticate".to_string()),
        _ => None,
    })
    .expect("mirror config should load")
}

#[test]
fn service_wiring_tests_lookup_uses_configured_profile_api() {
    let config = mirror_config();
    let profiles = Arc::new(RecordingProfileTransport::default());
    let services = RuntimeServices::from_config(
        &config,
        Arc::new(RecordingAuthTransport::default()),
        profiles.clone(),
    )
    .expect("services should build");

    let report = submit_login(&config, &services, Credentials::offline("Dave Smith"))
        .expect("submission should start")
        .wait();

    assert_eq!(
        *profiles.urls.lock().expect("url lock should work"),
        vec!["https://mirror.example.test/p/Dave%20Smith".to_string()]
    );
    let account = report.outcome.account().expect("lookup should resolve");
    assert_eq!(account.id(), "d0d0-5555");
    assert_eq!(account.mode(), AccountMode::Offline);
}

#[test]
fn service_wiring_tests_login_uses_configured_auth_endpoint() {
    let config = mirror_config();
    let auth = Arc::new(RecordingAuthTransport::default());
    let services = RuntimeServices::from_config(
        &config,
        auth.clone(),
        Arc::new(RecordingProfileTransport::default()),
    )
    .expect("services should build");

    let report = submit_login(&config, &services, Credentials::online("Alice", "pw"))
        .expect("submission should start")
        .wait();

    assert_eq!(
        *auth.endpoints.lock().expect("endpoint lock should work"),
        vec!["https://auth.example.test/v1/authenticate".to_string()]
    );
    let account = report.outcome.account().expect("login should resolve");
    assert_eq!(account.id(), "a11ce-0001");
    assert_eq!(account.mode(), AccountMode::Online);
}

#[test]
fn service_wiring_tests_unavailable_lookup_falls_back_to_synthetic_id() {
    let config = mirror_config();
    let services = RuntimeServices::unavailable(&config).expect("services should build");

    let report = submit_login(&config, &services, Credentials::offline("Dave"))
        .expect("submission should start")
        .wait();

    let account = report.outcome.account().expect("offline should succeed");
    assert_eq!(account.id(), offline_account_id("Dave"));
}

#[test]
fn service_wiring_tests_rejects_hand_built_config_with_bad_endpoint() {
    let mut config = mirror_config();
    config.auth_endpoint = "https://auth.example.test/refresh".to_string();

    let result = RuntimeServices::unavailable(&config);

    assert!(matches!(
        result,
        Err(AppError::Auth(AuthError::InvalidEndpoint(_)))
    ));
}
