//! Core client implementation (decomposed into focused submodules)
//!
//! [`Client`] owns everything one wiki connection needs: the HTTP transport,
//! the pacing gate, the authenticated session and the cached namespace
//! table. All mutating operations take `&mut self`; a client is therefore a
//! single-owner value, and callers that need sharing must wrap it in their
//! own `Mutex` or actor. Requests are strictly sequential per client, which
//! is exactly what the server-side throttling rules assume.

mod actions;
mod enumerate;
mod query;
mod request;
mod session;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use actions::SaveOptions;
pub use session::Session;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pacing::PacingGate;
use std::collections::BTreeMap;
use url::Url;

/// A connection to one wiki's action API
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    /// `<base>/api.php`, the action API endpoint
    api_url: Url,
    /// `<base>/index.php`, the raw-content endpoint
    index_url: Url,
    config: Config,
    pacing: PacingGate,
    session: Session,
    /// Namespace name to number, populated by `fetch_namespaces` or a cache load
    namespaces: BTreeMap<String, i32>,
}

impl Client {
    /// Create a client for the wiki rooted at `base_url`
    /// (e.g. `https://en.wikipedia.org/w/`).
    ///
    /// No network traffic happens here; the session starts out empty.
    pub fn new(base_url: &str, config: Config) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::InvalidArgument(format!("invalid wiki URL '{base_url}': {e}")))?;
        let api_url = base
            .join("api.php")
            .map_err(|e| Error::InvalidArgument(format!("invalid wiki URL '{base_url}': {e}")))?;
        let index_url = base
            .join("index.php")
            .map_err(|e| Error::InvalidArgument(format!("invalid wiki URL '{base_url}': {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::InvalidArgument(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url,
            index_url,
            pacing: PacingGate::new(&config.pacing),
            config,
            session: Session::default(),
            namespaces: BTreeMap::new(),
        })
    }

    /// The action API endpoint this client talks to
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// The logged-in username, empty when unauthenticated
    pub fn user(&self) -> &str {
        self.session.username()
    }

    /// The session's csrf edit token, empty until login
    pub fn token(&self) -> &str {
        self.session.token()
    }

    /// Whether the server granted elevated query limits at login
    pub fn high_limits(&self) -> bool {
        self.session.high_limits()
    }

    /// Whether the account carries the bot flag
    pub fn is_bot(&self) -> bool {
        self.session.is_bot()
    }
}
