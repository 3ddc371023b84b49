//! Single-call request execution
//!
//! One logical action call: pace, serialize, send, and absorb the server's
//! throttle signals. Two throttle paths share a bounded attempt budget:
//! a `Retry-After` response header (sleep the announced seconds, resend)
//! and a top-level `maxlag` error in the body (sleep a growing backoff,
//! resend). Any other server-reported error code fails immediately as a
//! categorized error; transport failures propagate without local retries.
//!
//! When the budget runs out while the server is still lagging, the last
//! error-bearing document is returned instead of an error; callers inspect
//! [`Document::error`] to tell the two apart.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::params::ParamList;
use crate::types::{Action, PaceKind};
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap};
use url::Url;

use super::Client;
use super::session::cookies_from_headers;

/// Longest parameter value, in UTF-16 code units, encoded in one piece
const ESCAPE_CHUNK_UNITS: usize = 32_766;

impl Client {
    /// Issue one action call and return the parsed result document.
    ///
    /// Retries internally on throttle signals, up to the configured attempt
    /// budget. A successful `login` response carrying cookies replaces the
    /// session's cookie jar wholesale.
    pub async fn make_request(&mut self, action: Action, params: &ParamList) -> Result<Document> {
        let body = encode_body(action, params);
        let kind = action.pace_kind();
        self.pacing.wait_turn(kind).await;

        let max_attempts = self.config.throttle.max_attempts.max(1);
        let mut outcome: Option<(Document, Vec<crate::types::Cookie>)> = None;

        for attempt in 0..max_attempts {
            let mut request = self
                .http
                .post(self.api_url.clone())
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body.clone());
            if let Some(cookies) = self.session.cookie_header() {
                request = request.header(header::COOKIE, cookies);
            }
            let response = request
                .send()
                .await
                .map_err(|e| Error::network(action.as_str(), e))?;

            if let Some(seconds) = retry_after_seconds(response.headers()) {
                tracing::warn!(
                    action = %action,
                    attempt,
                    seconds,
                    "server sent Retry-After, backing off"
                );
                tokio::time::sleep(std::time::Duration::from_secs(seconds)).await;
                continue;
            }

            let cookies = cookies_from_headers(response.headers());
            let response = response
                .error_for_status()
                .map_err(|e| Error::network(action.as_str(), e))?;
            let text = response
                .text()
                .await
                .map_err(|e| Error::network(action.as_str(), e))?;
            let doc = Document::parse(&text)?;
            self.pacing.mark(kind);

            let lagging = matches!(doc.error(), Some(("maxlag", _)));
            outcome = Some((doc, cookies));
            if lagging && attempt + 1 < max_attempts {
                let delay = self.config.throttle.maxlag_delay * (attempt + 1);
                tracing::warn!(
                    action = %action,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "server is lagging, backing off"
                );
                tokio::time::sleep(delay).await;
                continue;
            }
            break;
        }

        let Some((doc, cookies)) = outcome else {
            // every attempt was consumed by Retry-After before any body was read
            tracing::warn!(action = %action, "attempt budget spent on Retry-After responses");
            return Ok(Document::new());
        };

        let server_error = doc
            .error()
            .map(|(code, info)| (code.to_string(), info.to_string()));
        if let Some((code, info)) = server_error {
            if code == "maxlag" {
                tracing::warn!(action = %action, info, "maxlag budget exhausted, returning error document");
                return Ok(doc);
            }
            return Err(Error::for_action(action, code));
        }

        if let Some(result) = doc.action_result(action.as_str())
            && result != "Success"
            && result != "NeedToken"
        {
            return Err(Error::for_action(action, result));
        }

        if action == Action::Login && !cookies.is_empty() {
            self.session.replace_cookies(cookies);
        }
        Ok(doc)
    }

    /// Fetch a raw (non-API) URL, used for raw page content.
    ///
    /// `context` names the page for error annotation; HTTP 404 maps to
    /// [`Error::PageNotFound`].
    pub(crate) async fn make_raw_request(&mut self, url: Url, context: &str) -> Result<String> {
        self.pacing.wait_turn(PaceKind::Read).await;
        let mut request = self.http.get(url);
        if let Some(cookies) = self.session.cookie_header() {
            request = request.header(header::COOKIE, cookies);
        }
        let response = request
            .send()
            .await
            .map_err(|e| Error::network(context, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            self.pacing.mark(PaceKind::Read);
            return Err(Error::PageNotFound(context.to_string()));
        }
        let response = response
            .error_for_status()
            .map_err(|e| Error::network(context, e))?;
        let text = response
            .text()
            .await
            .map_err(|e| Error::network(context, e))?;
        self.pacing.mark(PaceKind::Read);
        Ok(text)
    }
}

fn retry_after_seconds(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Serialize an action call into a request body:
/// `action=<name>` followed by `&key=value` pairs with encoded values.
pub(crate) fn encode_body(action: Action, params: &ParamList) -> String {
    let mut body = format!("action={}", action.as_str());
    for (key, value) in params.iter() {
        body.push('&');
        body.push_str(key);
        body.push('=');
        body.push_str(&escape_value(value));
    }
    body
}

/// Percent-encode one parameter value.
///
/// Values longer than [`ESCAPE_CHUNK_UNITS`] UTF-16 code units are split
/// into chunks before encoding and each chunk is encoded independently.
/// Chunks break on `char` boundaries, so a split can never land inside a
/// surrogate pair.
pub(crate) fn escape_value(value: &str) -> String {
    if value.encode_utf16().count() <= ESCAPE_CHUNK_UNITS {
        return urlencoding::encode(value).into_owned();
    }
    let mut encoded = String::new();
    let mut chunk = String::new();
    let mut units = 0;
    for ch in value.chars() {
        let width = ch.len_utf16();
        if units + width > ESCAPE_CHUNK_UNITS {
            encoded.push_str(&urlencoding::encode(&chunk));
            chunk.clear();
            units = 0;
        }
        chunk.push(ch);
        units += width;
    }
    if !chunk.is_empty() {
        encoded.push_str(&urlencoding::encode(&chunk));
    }
    encoded
}
