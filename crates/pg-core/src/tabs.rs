//! Per-tab popup classifier
//!
//! A small state machine keyed by tab id. Freshly created tabs are either
//! closed on the spot as suspected popups or tracked until a fixed TTL
//! expires, at which point they have settled into legitimate navigation
//! and are evicted. The eviction sweep rides on tab-created events; there
//! is no timer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::host::HostActions;
use crate::lists::{AD_DOMAINS, SUSPECT_URL_TOKENS};
use crate::stats::StatsAggregator;

/// How long a tracked tab stays interesting.
pub const TAB_TTL: Duration = Duration::from_secs(30);

/// Lifecycle state of a tracked tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabState {
    Tracked,
    ClosedAsPopup,
}

/// What the classifier did with a tab-created event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabVerdict {
    /// Tab had no URL; nothing to classify.
    Ignored,
    Tracked,
    ClosedAsPopup,
}

/// A tab under observation.
#[derive(Debug, Clone)]
pub struct TabRecord {
    pub tab_id: i64,
    pub created_at: Instant,
    pub opener_tab_id: Option<i64>,
    pub url: String,
    pub state: TabState,
}

/// A tab-created event as delivered by the host.
#[derive(Debug, Clone)]
pub struct TabCreated {
    pub tab_id: i64,
    pub url: String,
    pub opener_tab_id: Option<i64>,
}

/// The per-tab state machine. Owns all TabRecords; nothing else reads or
/// writes them.
pub struct PopupClassifier {
    tabs: HashMap<i64, TabRecord>,
    ad_domains: Vec<String>,
    suspect_tokens: Vec<String>,
    ttl: Duration,
}

impl Default for PopupClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PopupClassifier {
    /// Classifier with the built-in ad-domain and token lists.
    pub fn new() -> Self {
        Self::with_heuristics(
            AD_DOMAINS.iter().map(|d| d.to_string()).collect(),
            SUSPECT_URL_TOKENS.iter().map(|t| t.to_string()).collect(),
        )
    }

    /// Classifier with custom heuristic lists.
    pub fn with_heuristics(ad_domains: Vec<String>, suspect_tokens: Vec<String>) -> Self {
        Self {
            tabs: HashMap::new(),
            ad_domains,
            suspect_tokens,
            ttl: TAB_TTL,
        }
    }

    /// Classify a freshly created tab.
    ///
    /// Suspect tabs are closed through the host exactly once and counted;
    /// no record is kept for them. Everything else is tracked. The eviction
    /// sweep runs first on every call.
    pub fn classify(
        &mut self,
        event: TabCreated,
        now: Instant,
        host: &dyn HostActions,
        stats: &StatsAggregator,
    ) -> TabVerdict {
        self.sweep(now);

        if event.url.is_empty() {
            return TabVerdict::Ignored;
        }

        if self.is_suspect(&event.url) {
            debug!("closing suspected popup tab {} ({})", event.tab_id, event.url);
            if let Err(err) = host.close_tab(event.tab_id) {
                // Not retried: if the tab is already gone the popup is moot.
                warn!("failed to close popup tab {}: {err}", event.tab_id);
            }
            stats.record_popup_closed();
            return TabVerdict::ClosedAsPopup;
        }

        self.insert(event, now);
        TabVerdict::Tracked
    }

    /// Track a tab without classifying it, for when popup blocking is
    /// disabled: every tab is treated as non-suspect but the sweep still
    /// runs.
    pub fn track(&mut self, event: TabCreated, now: Instant) -> TabVerdict {
        self.sweep(now);

        if event.url.is_empty() {
            return TabVerdict::Ignored;
        }

        self.insert(event, now);
        TabVerdict::Tracked
    }

    /// Number of currently tracked tabs.
    pub fn tracked_count(&self) -> usize {
        self.tabs.len()
    }

    /// Look up a tracked tab.
    pub fn record(&self, tab_id: i64) -> Option<&TabRecord> {
        self.tabs.get(&tab_id)
    }

    fn insert(&mut self, event: TabCreated, now: Instant) {
        self.tabs.insert(
            event.tab_id,
            TabRecord {
                tab_id: event.tab_id,
                created_at: now,
                opener_tab_id: event.opener_tab_id,
                url: event.url,
                state: TabState::Tracked,
            },
        );
    }

    /// Drop records older than the TTL. Evicted tabs need no further
    /// action; they have settled into legitimate navigation.
    fn sweep(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.tabs
            .retain(|_, record| now.duration_since(record.created_at) <= ttl);
    }

    fn is_suspect(&self, url: &str) -> bool {
        self.ad_domains.iter().any(|domain| url.contains(domain.as_str()))
            || self.suspect_tokens.iter().any(|token| url.contains(token.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostError;
    use std::cell::RefCell;

    /// Records close commands; optionally fails them.
    struct RecordingHost {
        closed: RefCell<Vec<i64>>,
        fail: bool,
    }

    impl RecordingHost {
        fn new() -> Self {
            Self {
                closed: RefCell::new(Vec::new()),
                fail: false,
            }
        }
    }

    impl HostActions for RecordingHost {
        fn close_tab(&self, tab_id: i64) -> Result<(), HostError> {
            self.closed.borrow_mut().push(tab_id);
            if self.fail {
                Err(HostError::TabGone(tab_id))
            } else {
                Ok(())
            }
        }
    }

    fn tab(tab_id: i64, url: &str, opener: Option<i64>) -> TabCreated {
        TabCreated {
            tab_id,
            url: url.to_string(),
            opener_tab_id: opener,
        }
    }

    #[test]
    fn test_opened_click_url_closed_exactly_once() {
        let mut classifier = PopupClassifier::new();
        let host = RecordingHost::new();
        let stats = StatsAggregator::new();

        let verdict = classifier.classify(
            tab(7, "https://landing.example.com/click-through", Some(1)),
            Instant::now(),
            &host,
            &stats,
        );

        assert_eq!(verdict, TabVerdict::ClosedAsPopup);
        assert_eq!(*host.closed.borrow(), vec![7]);
        assert_eq!(stats.snapshot().total_popups, 1);
        assert_eq!(classifier.tracked_count(), 0);
    }

    #[test]
    fn test_known_ad_domain_closed_without_opener() {
        let mut classifier = PopupClassifier::new();
        let host = RecordingHost::new();
        let stats = StatsAggregator::new();

        let verdict = classifier.classify(
            tab(3, "https://popads.net/landing", None),
            Instant::now(),
            &host,
            &stats,
        );
        assert_eq!(verdict, TabVerdict::ClosedAsPopup);
    }

    #[test]
    fn test_clean_tab_is_tracked() {
        let mut classifier = PopupClassifier::new();
        let host = RecordingHost::new();
        let stats = StatsAggregator::new();

        let verdict = classifier.classify(
            tab(4, "https://en.wikipedia.org/wiki/Rust", None),
            Instant::now(),
            &host,
            &stats,
        );

        assert_eq!(verdict, TabVerdict::Tracked);
        assert!(host.closed.borrow().is_empty());
        let record = classifier.record(4).unwrap();
        assert_eq!(record.state, TabState::Tracked);
        assert_eq!(record.url, "https://en.wikipedia.org/wiki/Rust");
    }

    #[test]
    fn test_empty_url_ignored() {
        let mut classifier = PopupClassifier::new();
        let verdict = classifier.track(tab(5, "", None), Instant::now());
        assert_eq!(verdict, TabVerdict::Ignored);
        assert_eq!(classifier.tracked_count(), 0);
    }

    #[test]
    fn test_expired_record_swept_on_next_event() {
        let mut classifier = PopupClassifier::new();
        let t0 = Instant::now();

        classifier.track(tab(1, "https://en.wikipedia.org/", None), t0);
        assert_eq!(classifier.tracked_count(), 1);

        // Still inside the TTL.
        classifier.track(tab(2, "https://www.rust-lang.org/", None), t0 + Duration::from_secs(10));
        assert_eq!(classifier.tracked_count(), 2);

        // Tab 1 is now past the TTL; tab 2 is not.
        classifier.track(tab(3, "https://docs.rs/", None), t0 + Duration::from_secs(35));
        assert!(classifier.record(1).is_none());
        assert!(classifier.record(2).is_some());
        assert!(classifier.record(3).is_some());
    }

    #[test]
    fn test_failed_close_is_not_retried() {
        let mut classifier = PopupClassifier::new();
        let host = RecordingHost {
            closed: RefCell::new(Vec::new()),
            fail: true,
        };
        let stats = StatsAggregator::new();

        let verdict = classifier.classify(
            tab(9, "https://popcash.net/x", Some(2)),
            Instant::now(),
            &host,
            &stats,
        );

        // Still counted and reported closed; the command went out once.
        assert_eq!(verdict, TabVerdict::ClosedAsPopup);
        assert_eq!(host.closed.borrow().len(), 1);
        assert_eq!(stats.snapshot().total_popups, 1);
    }

    #[test]
    fn test_custom_token_list() {
        let mut classifier =
            PopupClassifier::with_heuristics(Vec::new(), vec!["sponsored".to_string()]);
        let host = RecordingHost::new();
        let stats = StatsAggregator::new();

        // "click" is not in the custom list.
        let verdict = classifier.classify(
            tab(1, "https://example.com/click", None),
            Instant::now(),
            &host,
            &stats,
        );
        assert_eq!(verdict, TabVerdict::Tracked);

        let verdict = classifier.classify(
            tab(2, "https://example.com/sponsored", None),
            Instant::now(),
            &host,
            &stats,
        );
        assert_eq!(verdict, TabVerdict::ClosedAsPopup);
    }
}
