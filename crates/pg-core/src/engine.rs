//! Event-driven filter engine
//!
//! The controller the host talks to. It owns the rule store, the popup
//! classifier, the stats aggregator, and the current configuration, and is
//! constructed with an explicit host handle rather than ambient listener
//! registration, so the whole core can be instantiated and driven in tests
//! without a browser attached.
//!
//! Events arrive one at a time and every handler runs to completion. The
//! worst case on any internal fault is fail-open: allow the request, leave
//! the tab alone.

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use crate::config::FilterConfig;
use crate::host::HostActions;
use crate::matcher::evaluate;
use crate::rules::{LoadReport, RuleSet, RuleStore};
use crate::stats::{StatsAggregator, StatsSnapshot};
use crate::tabs::{PopupClassifier, TabCreated, TabVerdict};
use crate::types::{MatchDecision, RequestDescriptor, ResourceTypes, RuleDefinition};

/// Discrete events the host delivers to the core.
#[derive(Debug)]
pub enum Event {
    /// A request the host chose to hand over for observation.
    RequestObserved(RequestDescriptor),
    /// A tab was created.
    TabCreated(TabCreated),
    /// A fetched rule batch is ready to be applied.
    RulesLoadRequested(Vec<RuleDefinition>),
    /// The host's settings store changed.
    SettingsChanged(FilterConfig),
}

/// The decision core, one instance per host session.
pub struct FilterEngine<H: HostActions> {
    host: H,
    store: RuleStore,
    classifier: PopupClassifier,
    stats: StatsAggregator,
    config: FilterConfig,
}

impl<H: HostActions> FilterEngine<H> {
    /// Engine with default configuration and heuristics.
    pub fn new(host: H) -> Self {
        Self::with_config(host, FilterConfig::default())
    }

    pub fn with_config(host: H, config: FilterConfig) -> Self {
        Self {
            host,
            store: RuleStore::new(),
            classifier: PopupClassifier::new(),
            stats: StatsAggregator::new(),
            config,
        }
    }

    /// Dispatch one host event. Never panics on malformed input.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::RequestObserved(request) => self.handle_request(request),
            Event::TabCreated(tab) => self.handle_tab_created(tab),
            Event::RulesLoadRequested(definitions) => {
                self.reload_rules(definitions);
            }
            Event::SettingsChanged(config) => {
                info!("settings changed: {config:?}");
                self.config = config;
            }
        }
    }

    /// Evaluate a request against the current snapshot and record the
    /// outcome. Used for statistics-only observation; enforcement happens
    /// in the host's native rule substrate.
    fn handle_request(&mut self, request: RequestDescriptor) {
        if !self.config.enabled || !self.config.block_ads {
            return;
        }
        let decision = evaluate(&request, &self.store.current());
        self.stats.record_match(&decision, &request);
    }

    fn handle_tab_created(&mut self, tab: TabCreated) {
        self.handle_tab_created_at(tab, Instant::now());
    }

    /// Classify a tab at an explicit instant. Exposed for deterministic
    /// replay; `handle_event` uses the wall clock.
    pub fn handle_tab_created_at(&mut self, tab: TabCreated, now: Instant) -> TabVerdict {
        if !self.config.enabled {
            return TabVerdict::Ignored;
        }
        if self.config.block_popups {
            self.classifier.classify(tab, now, &self.host, &self.stats)
        } else {
            // Popup blocking off: every tab is non-suspect, sweep still runs.
            self.classifier.track(tab, now)
        }
    }

    /// Evaluate one request directly, returning the decision to the host.
    pub fn evaluate_request(&self, request: &RequestDescriptor) -> MatchDecision {
        if !self.config.enabled || !self.config.block_ads {
            return MatchDecision::default_allow(&request.registrable_domain);
        }
        evaluate(request, &self.store.current())
    }

    /// Evaluate a raw URL, degrading to default-allow when it cannot be
    /// parsed into a descriptor. Fail open, never fail closed.
    pub fn evaluate_url(&self, url: &str, resource_type: ResourceTypes) -> MatchDecision {
        match RequestDescriptor::parse(url, resource_type, None, None) {
            Ok(request) => self.evaluate_request(&request),
            Err(err) => {
                warn!("unparseable request URL, allowing: {err}");
                MatchDecision::default_allow("")
            }
        }
    }

    /// Validate and atomically install a new rule batch.
    pub fn reload_rules(&mut self, definitions: Vec<RuleDefinition>) -> LoadReport {
        let report = self.store.load(definitions);
        info!(
            "rules reloaded: {} loaded, {} skipped (version {})",
            report.loaded, report.skipped, report.version
        );
        report
    }

    /// The current rule-set snapshot, exported wholesale for the host's
    /// own rule-matching substrate.
    pub fn rule_set(&self) -> Arc<RuleSet> {
        self.store.current()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}
