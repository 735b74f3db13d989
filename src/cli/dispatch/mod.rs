//! Command-line argument dispatch and server initialization.

use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::store::StorePolicy;
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action plus shared globals.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let store_url = matches
        .get_one::<String>("store-url")
        .cloned()
        .context("missing required argument: --store-url")?;

    let token_secret = matches
        .get_one::<String>("token-secret")
        .cloned()
        .context("missing required argument: --token-secret")?;

    let store_policy = match matches
        .get_one::<String>("store-policy")
        .map(String::as_str)
    {
        Some("fail-closed") => StorePolicy::FailClosed,
        _ => StorePolicy::FailOpen,
    };

    let mut globals = GlobalArgs::new(store_url, SecretString::from(token_secret));
    globals.store_policy = store_policy;
    if let Some(frontend_url) = matches.get_one::<String>("frontend-url") {
        globals.frontend_url = frontend_url.clone();
    }

    Ok((Action::Server { port, dsn }, globals))
}
