//! Continuation-driven query enumeration
//!
//! A paginated query answers with a partial document plus a continuation
//! cursor whose parameter name varies per query module. Enumeration keeps
//! re-issuing derived requests until the cursor disappears, merging each
//! round's partial tree into the running result.
//!
//! Every derived round starts from a copy of the caller's ORIGINAL
//! parameters, never a previous round's derived copy, with only the cursor
//! and the module's limit parameter set on top. The caller's parameter set
//! is never mutated.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::params::ParamList;
use crate::types::Action;

use super::Client;

impl Client {
    /// Run a query through all of its continuation rounds and return the
    /// merged document. With `get_all` false, a single round is issued and
    /// any cursor is ignored.
    pub async fn enumerate(&mut self, params: &ParamList, get_all: bool) -> Result<Document> {
        let mut result = Document::new();
        self.enumerate_into(&mut result, params, get_all).await?;
        Ok(result)
    }

    /// Enumerate into an existing running document. Batched queries reuse
    /// this so that chunk-to-chunk merging follows the exact same rule as
    /// round-to-round merging.
    pub(crate) async fn enumerate_into(
        &mut self,
        result: &mut Document,
        params: &ParamList,
        get_all: bool,
    ) -> Result<()> {
        let mut current = params.clone();
        let mut rounds = 0usize;

        loop {
            let seeding = result.is_empty();
            let round = self.make_request(Action::Query, &current).await?;

            // the executor only hands back an error-bearing document when
            // its maxlag budget ran out; a seeding round passes it to the
            // caller for inspection, any later round fails the enumeration
            if !seeding && let Some((code, _)) = round.error() {
                return Err(Error::for_action(Action::Query, code.to_string()));
            }

            let cursor = round.continuation();
            result.merge_query(&round);
            rounds += 1;

            let Some((cursor_name, cursor_value)) = cursor else {
                break;
            };
            if !get_all {
                break;
            }
            if rounds >= self.config.max_continuation_rounds {
                tracing::warn!(
                    rounds,
                    cap = self.config.max_continuation_rounds,
                    "continuation round cap reached, returning partial result"
                );
                break;
            }

            tracing::debug!(round = rounds, cursor = %cursor_name, "following continuation cursor");
            let mut derived = params.clone();
            derived.set(cursor_name.as_str(), cursor_value.as_str())?;
            if let Some(prefix) = cursor_name.get(..2) {
                derived.set(format!("{prefix}limit"), "max")?;
            }
            current = derived;
        }
        Ok(())
    }
}
