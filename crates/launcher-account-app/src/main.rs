#![warn(missing_docs)]
//! # launcher-account binary
//!
//! Resolves one account from the command line: `launcher-account <username>
//! [password]`. The auth and profile clients are built from the runtime
//! config; their transports are not available in this build, so the offline
//! path always lands on the synthetic id.

use launcher_account_app::{
    AppError, RuntimeConfig, RuntimeServices, app_version, auth_policy_summary, init_logging,
    submit_login, summarize_report,
};
use launcher_account_core::Credentials;
use launcher_account_resolver::ResolverEvent;

/// CLI entry point.
fn main() {
    if let Err(error) = run() {
        eprintln!("launcher-account: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    init_logging()?;
    let config = RuntimeConfig::from_env()?;
    let services = RuntimeServices::unavailable(&config)?;

    println!("launcher-account {}", app_version());
    println!("{}", auth_policy_summary(&config));

    let mut args = std::env::args().skip(1);
    let Some(username) = args.next() else {
        println!("usage: launcher-account <username> [password]");
        return Ok(());
    };
    let credentials = Credentials {
        username,
        password: args.next(),
    };

    let handle = submit_login(&config, &services, credentials)?;
    let report = handle.wait_with(|event| match event {
        ResolverEvent::Status(status) => println!("status: {status}"),
        ResolverEvent::Progress { current, total } => println!("progress: {current}/{total}"),
        _ => {}
    });

    println!("{}", summarize_report(&report));
    Ok(())
}
