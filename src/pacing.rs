//! Minimum-interval request pacing
//!
//! The gate enforces a minimum spacing between consecutive calls, tracked
//! separately for read-class and edit-class actions. The timestamp is
//! recorded after the response is received, so the spacing measures full
//! round-trip-inclusive cadence rather than send times.

use crate::config::{MIN_PACING_SECONDS, PacingConfig};
use crate::types::PaceKind;
use std::time::Duration;
use tokio::time::Instant;

/// Per-kind minimum-interval gate
#[derive(Debug)]
pub struct PacingGate {
    read_interval: Duration,
    edit_interval: Duration,
    last_read: Option<Instant>,
    last_edit: Option<Instant>,
}

impl PacingGate {
    /// Build a gate from configured intervals, clamping both to the
    /// [`MIN_PACING_SECONDS`] floor.
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            read_interval: Duration::from_secs(
                config.seconds_between_queries.max(MIN_PACING_SECONDS),
            ),
            edit_interval: Duration::from_secs(
                config.seconds_between_edits.max(MIN_PACING_SECONDS),
            ),
            last_read: None,
            last_edit: None,
        }
    }

    /// Sleep until the minimum interval since the last marked call of this
    /// kind has elapsed. The first call of each kind passes immediately.
    pub async fn wait_turn(&mut self, kind: PaceKind) {
        let (last, interval) = match kind {
            PaceKind::Read => (self.last_read, self.read_interval),
            PaceKind::Edit => (self.last_edit, self.edit_interval),
        };
        if let Some(last) = last {
            let elapsed = last.elapsed();
            if elapsed < interval {
                let wait = interval - elapsed;
                tracing::debug!(?kind, wait_ms = wait.as_millis() as u64, "pacing request");
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Record that a call of this kind just completed (response received)
    pub fn mark(&mut self, kind: PaceKind) {
        let now = Instant::now();
        match kind {
            PaceKind::Read => self.last_read = Some(now),
            PaceKind::Edit => self.last_edit = Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(read_secs: u64, edit_secs: u64) -> PacingGate {
        PacingGate::new(&PacingConfig {
            seconds_between_queries: read_secs,
            seconds_between_edits: edit_secs,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn first_call_passes_immediately() {
        let mut gate = gate(2, 2);
        let start = Instant::now();
        gate.wait_turn(PaceKind::Read).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_waits_out_the_remainder() {
        let mut gate = gate(2, 2);
        gate.wait_turn(PaceKind::Read).await;
        gate.mark(PaceKind::Read);

        tokio::time::advance(Duration::from_millis(500)).await;

        let start = Instant::now();
        gate.wait_turn(PaceKind::Read).await;
        let waited = start.elapsed();
        assert!(
            waited >= Duration::from_millis(1500),
            "expected >= 1500ms wait, got {waited:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_interval_means_no_wait() {
        let mut gate = gate(2, 2);
        gate.mark(PaceKind::Read);
        tokio::time::advance(Duration::from_secs(3)).await;

        let start = Instant::now();
        gate.wait_turn(PaceKind::Read).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn read_and_edit_lanes_are_independent() {
        let mut gate = gate(2, 10);
        gate.mark(PaceKind::Edit);

        // a fresh read is not held back by the recent edit
        let start = Instant::now();
        gate.wait_turn(PaceKind::Read).await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        // but the next edit is
        let start = Instant::now();
        gate.wait_turn(PaceKind::Edit).await;
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn intervals_are_floor_clamped() {
        let mut gate = gate(0, 0);
        gate.mark(PaceKind::Read);

        let start = Instant::now();
        gate.wait_turn(PaceKind::Read).await;
        assert!(
            start.elapsed() >= Duration::from_secs(2),
            "zero-second config must still pace at the 2s floor"
        );
    }
}
