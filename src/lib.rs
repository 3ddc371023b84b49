//! Async client library for the MediaWiki action API.
//!
//! The crate wraps the action API's request conventions — form-encoded
//! POSTs, XML responses, `query-continue` pagination, maxlag throttling and
//! per-action pacing — behind a typed [`Client`]. Identifier lists are
//! batched to the server's limits automatically and continuation rounds are
//! merged back into a single [`Document`], so callers see one logical
//! response per logical request.
//!
//! ```no_run
//! use wikiclient::{Client, Config, ParamList, QueryBy};
//!
//! # async fn run() -> wikiclient::Result<()> {
//! let mut wiki = Client::new("https://en.wikipedia.org/w/", Config::default())?;
//! wiki.login("ExampleBot", "hunter2").await?;
//!
//! let mut params = ParamList::new();
//! params.add("prop", "revisions")?;
//! params.add("rvprop", "timestamp|user")?;
//! let doc = wiki
//!     .query(QueryBy::Titles, &params, ["Main Page", "Sandbox"])
//!     .await?;
//! if let Some(pages) = doc.find("pages") {
//!     for page in pages.children_named("page") {
//!         println!("{:?}", page.attr("title"));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

pub mod cache;
mod client;
pub mod codec;
mod config;
mod document;
mod error;
mod pacing;
mod params;
mod types;

pub use client::{Client, SaveOptions, Session};
pub use codec::{Deserializer, Serializer};
pub use config::{Config, MIN_PACING_SECONDS, PacingConfig, ThrottleConfig};
pub use document::{Document, Element};
pub use error::{CodecError, Error, Result};
pub use params::ParamList;
pub use types::{
    Action, Cookie, CreateFlags, MinorFlags, PaceKind, Protection, QueryBy, SaveFlags, UserGroup,
    WatchFlags,
};
