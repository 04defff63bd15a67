//! Statistics aggregator
//!
//! Counters accumulate from two independent event sources: blocked-request
//! decisions out of the match engine and forced closures out of the popup
//! classifier. Updates from one event are applied as a single atomic step
//! behind a mutex so interleaved handlers never lose increments and
//! snapshots are never torn.
//!
//! A request that is both blocked as a popup-looking navigation and whose
//! tab is closed by the classifier increments `total_popups` twice, once
//! per path. That duplication mirrors the host-observed behavior and is
//! covered by a test rather than collapsed.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::lists::{KNOWN_TRACKERS, SUSPECT_URL_TOKENS};
use crate::types::{MatchDecision, RequestDescriptor};

/// A point-in-time copy of all counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total_blocked_requests: u64,
    pub total_trackers: u64,
    pub total_popups: u64,
    /// Blocked-request count per registrable domain.
    pub domain_stats: HashMap<String, u64>,
}

/// Accumulates decision counters. Cheap to share by reference between the
/// engine's event handlers.
pub struct StatsAggregator {
    inner: Mutex<StatsSnapshot>,
    suspect_tokens: Vec<String>,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAggregator {
    /// Aggregator with the default popup-heuristic token list.
    pub fn new() -> Self {
        Self::with_suspect_tokens(SUSPECT_URL_TOKENS.iter().map(|t| t.to_string()).collect())
    }

    /// Aggregator with a custom popup-heuristic token list, so the policy
    /// can be tuned independently of the counting logic.
    pub fn with_suspect_tokens(suspect_tokens: Vec<String>) -> Self {
        Self {
            inner: Mutex::new(StatsSnapshot::default()),
            suspect_tokens,
        }
    }

    /// Record a match-engine decision. No-op unless the decision blocks.
    ///
    /// Blocked requests bump the total and the per-domain count; requests
    /// to a known tracker domain bump the tracker total; a blocked
    /// main-frame navigation whose URL carries a popup-heuristic token
    /// counts as a popup, independently of what the tab classifier does.
    pub fn record_match(&self, decision: &MatchDecision, request: &RequestDescriptor) {
        if !decision.is_block() {
            return;
        }

        let is_popup_navigation = request.is_main_frame()
            && self.suspect_tokens.iter().any(|t| request.url.contains(t.as_str()));
        let is_tracker = is_known_tracker(&decision.domain);

        let mut stats = self.inner.lock().unwrap();
        stats.total_blocked_requests += 1;
        *stats.domain_stats.entry(decision.domain.clone()).or_insert(0) += 1;
        if is_tracker {
            stats.total_trackers += 1;
        }
        if is_popup_navigation {
            stats.total_popups += 1;
        }
    }

    /// Record a popup tab the classifier forced closed.
    pub fn record_popup_closed(&self) {
        self.inner.lock().unwrap().total_popups += 1;
    }

    /// A consistent copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.lock().unwrap().clone()
    }

    /// Zero every counter and clear the domain map in one step.
    pub fn reset(&self) {
        *self.inner.lock().unwrap() = StatsSnapshot::default();
    }
}

/// Exact or dotted-suffix match against the known-tracker domain list.
fn is_known_tracker(domain: &str) -> bool {
    KNOWN_TRACKERS
        .iter()
        .any(|tracker| domain == *tracker || domain.ends_with(&format!(".{tracker}")))
}
