//! Session state: cookies, edit token, capability flags
//!
//! The session is empty at construction, replaced wholesale by a successful
//! login response's cookies and cleared wholesale on logout. Capability
//! flags (elevated limits, bot status) and the csrf edit token come from a
//! follow-up rights query after login.

use crate::codec::{Deserializer, Serializer};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::params::ParamList;
use crate::types::{Action, Cookie, PaceKind, QueryBy};
use reqwest::header::{self, HeaderMap};

use super::Client;

/// Authentication and capability state for one client
#[derive(Clone, Debug, Default)]
pub struct Session {
    cookies: Vec<Cookie>,
    token: String,
    username: String,
    high_limits: bool,
    is_bot: bool,
}

impl Session {
    /// The stored cookie jar
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// The csrf edit token, empty until login
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The authenticated username, empty when logged out
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether the server granted elevated query limits
    pub fn high_limits(&self) -> bool {
        self.high_limits
    }

    /// Whether the account carries the bot flag
    pub fn is_bot(&self) -> bool {
        self.is_bot
    }

    /// Replace the cookie jar wholesale (successful login)
    pub(crate) fn replace_cookies(&mut self, cookies: Vec<Cookie>) {
        self.cookies = cookies;
    }

    /// Drop all authentication state (logout)
    pub(crate) fn clear(&mut self) {
        *self = Session::default();
    }

    /// The `Cookie:` header value for outgoing requests, if any cookies are held
    pub(crate) fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        Some(pairs.join("; "))
    }
}

/// Collect session cookies from a response's `Set-Cookie` headers
pub(crate) fn cookies_from_headers(headers: &HeaderMap) -> Vec<Cookie> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(parse_set_cookie)
        .collect()
}

fn parse_set_cookie(raw: &str) -> Option<Cookie> {
    let mut parts = raw.split(';');
    let (name, value) = parts.next()?.trim().split_once('=')?;
    let mut cookie = Cookie {
        name: name.trim().to_string(),
        value: value.trim().to_string(),
        path: "/".to_string(),
        domain: String::new(),
    };
    for attribute in parts {
        let (key, val) = attribute.trim().split_once('=').unwrap_or((attribute.trim(), ""));
        match key.to_ascii_lowercase().as_str() {
            "path" => cookie.path = val.trim().to_string(),
            "domain" => cookie.domain = val.trim().to_string(),
            _ => {}
        }
    }
    Some(cookie)
}

impl Client {
    /// Log in with a username and password.
    ///
    /// A no-op when a non-empty cookie jar already authenticates the same
    /// username. Handles the `NeedToken` handshake transparently, then runs
    /// a follow-up rights query to populate capability flags and the edit
    /// token.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        if username.is_empty() {
            return Err(Error::InvalidArgument("username shouldn't be empty".to_string()));
        }
        if password.is_empty() {
            return Err(Error::InvalidArgument("password shouldn't be empty".to_string()));
        }
        if !self.session.cookies().is_empty() && self.session.username() == username {
            tracing::debug!(username, "already logged in, skipping login round-trip");
            return Ok(());
        }

        let mut params = ParamList::new();
        params.add("lgname", username)?;
        params.add("lgpassword", password)?;
        let mut doc = self.make_request(Action::Login, &params).await?;
        let mut result = login_result(&doc)?.to_string();

        if result == "NeedToken" {
            let token = doc
                .find("login")
                .and_then(|node| node.attr("token"))
                .ok_or_else(|| Error::Xml("login response missing token".to_string()))?
                .to_string();
            let mut params = ParamList::new();
            params.add("lgname", username)?;
            params.add("lgpassword", password)?;
            params.add("lgtoken", token)?;
            doc = self.make_request(Action::Login, &params).await?;
            result = login_result(&doc)?.to_string();
        }
        if result != "Success" {
            return Err(Error::Login { code: result });
        }

        self.session.username = username.to_string();
        tracing::info!(username, "logged in");
        self.refresh_rights_and_token().await
    }

    /// Refresh capability flags, username and edit token for a session
    /// restored from cached cookies.
    pub async fn login_cached(&mut self) -> Result<()> {
        self.refresh_rights_and_token().await?;
        tracing::info!(username = self.session.username(), "resumed cached session");
        Ok(())
    }

    /// Log out and clear the session.
    ///
    /// The local session state is cleared unconditionally, even when the
    /// logout request itself fails.
    pub async fn logout(&mut self) -> Result<()> {
        self.pacing.wait_turn(PaceKind::Read).await;
        let mut request = self
            .http
            .post(self.api_url.clone())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("action=logout");
        if let Some(cookies) = self.session.cookie_header() {
            request = request.header(header::COOKIE, cookies);
        }
        let outcome = request.send().await;
        self.pacing.mark(PaceKind::Read);
        self.session.clear();
        tracing::info!("logged out");
        outcome.map_err(|e| Error::network("logout", e))?;
        Ok(())
    }

    async fn refresh_rights_and_token(&mut self) -> Result<()> {
        let mut params = ParamList::new();
        params.add("meta", "userinfo|tokens")?;
        params.add("uiprop", "rights")?;
        params.add("type", "csrf")?;
        let doc = self.query(QueryBy::Titles, &params, ["Main Page"]).await?;

        self.session.high_limits = has_right(&doc, "apihighlimits");
        self.session.is_bot = has_right(&doc, "bot");
        self.session.token = doc
            .find("tokens")
            .and_then(|node| node.attr("csrftoken"))
            .unwrap_or_default()
            .to_string();
        if let Some(name) = doc.find("userinfo").and_then(|node| node.attr("name")) {
            self.session.username = name.to_string();
        }
        tracing::debug!(
            high_limits = self.session.high_limits,
            is_bot = self.session.is_bot,
            "session capabilities refreshed"
        );
        Ok(())
    }

    /// Serialize the cookie jar through the cache codec
    pub fn cookies_to_bytes(&self) -> Vec<u8> {
        let cookies = self.session.cookies();
        let mut serializer = Serializer::new();
        serializer.put_i32(cookies.len() as i32);
        for cookie in cookies {
            serializer.put_str(&cookie.name);
            serializer.put_str(&cookie.value);
            serializer.put_str(&cookie.path);
            serializer.put_str(&cookie.domain);
        }
        serializer.into_bytes()
    }

    /// Replace the cookie jar from a cache codec blob
    pub fn load_cookies(&mut self, data: &[u8]) -> Result<()> {
        let mut deserializer = Deserializer::new(data);
        let count = deserializer.get_i32()?;
        let mut cookies = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            cookies.push(Cookie {
                name: deserializer.get_str()?,
                value: deserializer.get_str()?,
                path: deserializer.get_str()?,
                domain: deserializer.get_str()?,
            });
        }
        self.session.replace_cookies(cookies);
        Ok(())
    }

    /// The current cookie jar
    pub fn cookies(&self) -> &[Cookie] {
        self.session.cookies()
    }
}

fn login_result(doc: &Document) -> Result<&str> {
    doc.action_result("login")
        .ok_or_else(|| Error::Xml("login response missing result".to_string()))
}

fn has_right(doc: &Document, right: &str) -> bool {
    doc.find("rights")
        .map(|node| node.children_named("r").any(|r| r.text == right))
        .unwrap_or(false)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cookie_parsing_extracts_name_value_path_domain() {
        let cookie = parse_set_cookie(
            "wikiSession=abc123; Path=/w; Domain=example.org; HttpOnly; Secure",
        )
        .unwrap();
        assert_eq!(cookie.name, "wikiSession");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.path, "/w");
        assert_eq!(cookie.domain, "example.org");
    }

    #[test]
    fn set_cookie_defaults_apply_when_attributes_are_missing() {
        let cookie = parse_set_cookie("token=xyz").unwrap();
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.domain, "");
    }

    #[test]
    fn malformed_set_cookie_is_ignored() {
        assert!(parse_set_cookie("no-equals-sign").is_none());
    }

    #[test]
    fn cookie_header_joins_pairs() {
        let mut session = Session::default();
        assert_eq!(session.cookie_header(), None);
        session.replace_cookies(vec![
            Cookie {
                name: "a".into(),
                value: "1".into(),
                path: "/".into(),
                domain: String::new(),
            },
            Cookie {
                name: "b".into(),
                value: "2".into(),
                path: "/".into(),
                domain: String::new(),
            },
        ]);
        assert_eq!(session.cookie_header().unwrap(), "a=1; b=2");
    }

    #[test]
    fn clear_drops_everything() {
        let mut session = Session {
            cookies: vec![Cookie {
                name: "a".into(),
                value: "1".into(),
                path: "/".into(),
                domain: String::new(),
            }],
            token: "tok".into(),
            username: "Bot".into(),
            high_limits: true,
            is_bot: true,
        };
        session.clear();
        assert!(session.cookies().is_empty());
        assert_eq!(session.token(), "");
        assert_eq!(session.username(), "");
        assert!(!session.high_limits());
        assert!(!session.is_bot());
    }

    #[test]
    fn rights_detection_reads_r_children() {
        let doc = Document::parse(
            r#"<api><query><userinfo name="Bot">
                 <rights><r>read</r><r>apihighlimits</r></rights>
               </userinfo></query></api>"#,
        )
        .unwrap();
        assert!(has_right(&doc, "apihighlimits"));
        assert!(!has_right(&doc, "bot"));
    }
}
