//! PopGuard Core Library
//!
//! This crate provides the decision core of the PopGuard blocker: given a
//! normalized rule feed and a stream of request/tab events from the host
//! browser, it decides what to allow, block, or close, and keeps running
//! statistics about those decisions.
//!
//! # Architecture
//!
//! The core is single-threaded and event-driven. The host delivers discrete
//! events to a [`FilterEngine`], which dispatches them to the owned
//! components. Rule sets are immutable snapshots swapped atomically, so an
//! in-flight match pass always sees one consistent rule-set version even if
//! a reload interleaves with it.
//!
//! # Modules
//!
//! - `types`: shared type definitions (rules, requests, decisions)
//! - `url`: fast URL parsing without allocations
//! - `rules`: the capacity-bounded rule store and batch builders
//! - `matcher`: request-against-rule-set evaluation
//! - `tabs`: the per-tab popup classifier
//! - `stats`: the statistics aggregator
//! - `config`: host-owned feature flags
//! - `host`: the host-action boundary (close-tab commands)
//! - `engine`: the event-driven controller tying it all together
//! - `lists`: built-in ad-domain, tracker, and heuristic-token lists

pub mod config;
pub mod engine;
pub mod host;
pub mod lists;
pub mod matcher;
pub mod rules;
pub mod stats;
pub mod tabs;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use config::FilterConfig;
pub use engine::{Event, FilterEngine};
pub use host::{HostActions, HostError};
pub use matcher::evaluate;
pub use rules::{LoadReport, RuleSet, RuleStore};
pub use stats::{StatsAggregator, StatsSnapshot};
pub use tabs::{PopupClassifier, TabCreated, TabRecord, TabState, TabVerdict};
pub use types::{MatchDecision, RequestDescriptor, ResourceTypes, RuleAction, RuleDefinition};
