//! Batched identifier queries
//!
//! The server caps how many identifiers one query may name: 500 for
//! sessions with elevated limits, 50 otherwise. A query over more
//! identifiers is planned as contiguous chunks, each chunk runs through
//! full continuation enumeration, and the chunks merge into one running
//! document with the same append rule continuation rounds use.

use crate::document::Document;
use crate::error::Result;
use crate::params::ParamList;
use crate::types::QueryBy;

use super::Client;

/// Chunk limit for sessions holding the `apihighlimits` right
const HIGH_LIMIT: usize = 500;
/// Chunk limit for everyone else
const LOW_LIMIT: usize = 50;

impl Client {
    /// Query the given identifiers, chunked to the session's limit, with
    /// all continuation rounds followed.
    pub async fn query<I, S>(&mut self, by: QueryBy, params: &ParamList, ids: I) -> Result<Document>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let limit = if self.session.high_limits() {
            HIGH_LIMIT
        } else {
            LOW_LIMIT
        };
        self.query_with_limit(by, params, ids, limit, true).await
    }

    /// Query with an explicit chunk limit and continuation policy.
    ///
    /// An empty identifier collection yields an empty document and performs
    /// zero network calls.
    pub async fn query_with_limit<I, S>(
        &mut self,
        by: QueryBy,
        params: &ParamList,
        ids: I,
        limit: usize,
        get_all: bool,
    ) -> Result<Document>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<String> = ids.into_iter().map(|id| id.as_ref().to_string()).collect();
        let mut result = Document::new();
        let chunks = plan_chunks(&ids, limit);
        tracing::debug!(ids = ids.len(), chunks = chunks.len(), keyword = by.keyword(), "planned query batches");
        for chunk in chunks {
            let mut local = params.clone();
            local.add(by.keyword(), chunk)?;
            self.enumerate_into(&mut result, &local, get_all).await?;
        }
        Ok(result)
    }
}

/// Partition identifiers into contiguous pipe-joined chunks of at most
/// `limit` entries, preserving order.
pub(crate) fn plan_chunks(ids: &[String], limit: usize) -> Vec<String> {
    ids.chunks(limit.max(1))
        .map(|chunk| chunk.join("|"))
        .collect()
}
