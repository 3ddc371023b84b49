//! Integration tests against a mock action API endpoint.
//!
//! Throttle backoffs use millisecond delays here so retry paths run fast;
//! per-request pacing still applies at its floor, which keeps multi-round
//! tests honest about request sequencing without making them minutes long.

use std::time::Duration;

use wiremock::matchers::{body_string, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::{Config, MIN_PACING_SECONDS, PacingConfig, ThrottleConfig};
use crate::document::Document;
use crate::error::Error;
use crate::params::ParamList;
use crate::types::{Action, QueryBy};

use super::Client;

mod query;
mod request;

const API_PATH: &str = "/w/api.php";

fn test_config() -> Config {
    Config {
        pacing: PacingConfig {
            // zero clamps to the gate's floor, the fastest legal cadence
            seconds_between_queries: 0,
            seconds_between_edits: 0,
        },
        throttle: ThrottleConfig {
            max_attempts: 3,
            maxlag_delay: Duration::from_millis(10),
        },
        ..Default::default()
    }
}

#[test]
fn test_config_paces_at_the_gate_floor() {
    // multi-request tests sleep one pacing interval per extra request, so
    // the shared config must not pace any slower than the floor allows
    let config = test_config();
    assert!(config.pacing.seconds_between_queries <= MIN_PACING_SECONDS);
    assert!(config.pacing.seconds_between_edits <= MIN_PACING_SECONDS);
}

async fn client_for(server: &MockServer) -> Client {
    Client::new(&format!("{}/w/", server.uri()), test_config()).unwrap()
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/xml")
}

fn api_post() -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(path(API_PATH))
}

fn page_titles(doc: &Document, module: &str, child: &str) -> Vec<String> {
    doc.find(module)
        .map(|node| {
            node.children_named(child)
                .filter_map(|c| c.attr("title"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
