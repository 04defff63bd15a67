//! Rule store with atomic snapshot swap
//!
//! The store owns the authoritative, capacity-bounded set of blocking rules.
//! Each `load` builds a complete new [`RuleSet`] version and swaps it in
//! atomically; readers holding the previous snapshot keep a consistent view
//! for the duration of their match pass.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use log::warn;

use crate::types::{ResourceTypes, RuleAction, RuleDefinition};

/// Maximum number of rules one set may hold. Definitions beyond the cap are
/// skipped and counted, never silently truncated mid-list.
pub const MAX_RULES: usize = 5000;

/// First id of the built-in domain-rule range. Externally fed rules must
/// stay below this; the ranges keep independently maintained rule sources
/// from colliding.
pub const DOMAIN_RULE_ID_BASE: u32 = 100_000;

/// First id of the built-in pattern-rule range.
pub const PATTERN_RULE_ID_BASE: u32 = 200_000;

// =============================================================================
// Rule Set
// =============================================================================

/// An immutable, versioned, ordered rule-set snapshot.
///
/// Rules are sorted by `(priority desc, insertion order asc)`; the match
/// engine iterates in this order and the first hit wins.
#[derive(Debug, Default)]
pub struct RuleSet {
    version: u64,
    rules: Vec<RuleDefinition>,
}

impl RuleSet {
    /// Snapshot version, monotonically increasing across loads.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter()
    }

    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }
}

/// Outcome of one `load` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Rules accepted into the new snapshot.
    pub loaded: usize,
    /// Rules skipped: failed validation or past the capacity cap.
    pub skipped: usize,
    /// Version of the snapshot that was swapped in.
    pub version: u64,
}

// =============================================================================
// Rule Store
// =============================================================================

/// Owner of the current rule-set snapshot.
pub struct RuleStore {
    current: ArcSwap<RuleSet>,
    next_version: AtomicU64,
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleStore {
    /// Create a store holding an empty rule set (version 0).
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(RuleSet::default()),
            next_version: AtomicU64::new(1),
        }
    }

    /// Validate, sort, and atomically install a new rule set.
    ///
    /// Definitions that fail validation (duplicate id within the batch,
    /// empty pattern) are skipped and counted, as are valid definitions
    /// past the [`MAX_RULES`] cap. The swap is all-or-nothing: readers see
    /// either the previous set or the complete new one. An empty batch is
    /// valid and clears the rules.
    pub fn load(&self, definitions: Vec<RuleDefinition>) -> LoadReport {
        let mut seen_ids: HashSet<u32> = HashSet::with_capacity(definitions.len());
        let mut accepted: Vec<RuleDefinition> = Vec::with_capacity(definitions.len().min(MAX_RULES));
        let mut skipped = 0usize;

        for def in definitions {
            if def.url_pattern.is_empty() {
                warn!("rule {}: empty url pattern, skipping", def.id);
                skipped += 1;
                continue;
            }
            if !seen_ids.insert(def.id) {
                warn!("rule {}: duplicate id in batch, skipping", def.id);
                skipped += 1;
                continue;
            }
            if accepted.len() >= MAX_RULES {
                skipped += 1;
                continue;
            }
            accepted.push(def);
        }

        if skipped > 0 {
            warn!("rule load skipped {skipped} definitions");
        }

        // Stable sort keeps insertion order within equal priorities.
        accepted.sort_by_key(|r| std::cmp::Reverse(r.priority));

        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        let loaded = accepted.len();
        self.current.store(Arc::new(RuleSet {
            version,
            rules: accepted,
        }));

        LoadReport {
            loaded,
            skipped,
            version,
        }
    }

    /// The current immutable snapshot.
    ///
    /// The returned `Arc` stays valid and unchanged across concurrent
    /// `load` calls; a match pass holds it for its whole duration.
    pub fn current(&self) -> Arc<RuleSet> {
        self.current.load_full()
    }
}

// =============================================================================
// Batch Builders
// =============================================================================

/// Resource types covered by the built-in domain block rules.
fn domain_rule_types() -> ResourceTypes {
    ResourceTypes::MAIN_FRAME
        | ResourceTypes::SUB_FRAME
        | ResourceTypes::SCRIPT
        | ResourceTypes::IMAGE
        | ResourceTypes::STYLESHEET
        | ResourceTypes::OBJECT
        | ResourceTypes::XMLHTTPREQUEST
        | ResourceTypes::PING
        | ResourceTypes::MEDIA
        | ResourceTypes::WEBSOCKET
}

/// Build contains-match block rules for a list of domains.
///
/// Ids are assigned from [`DOMAIN_RULE_ID_BASE`] in list order, so the
/// batch is deterministic and disjoint from the other rule origins.
pub fn domain_block_rules(domains: &[&str], base_priority: i32) -> Vec<RuleDefinition> {
    domains
        .iter()
        .enumerate()
        .map(|(index, domain)| RuleDefinition {
            id: DOMAIN_RULE_ID_BASE + index as u32,
            priority: base_priority,
            action: RuleAction::Block,
            url_pattern: format!("*{domain}*"),
            resource_types: domain_rule_types(),
            domain_allow: Vec::new(),
            domain_deny: Vec::new(),
        })
        .collect()
}

/// Build contains-match block rules for a list of URL patterns.
///
/// Pattern rules only cover document and script loads; ids come from
/// [`PATTERN_RULE_ID_BASE`].
pub fn pattern_block_rules(patterns: &[&str], base_priority: i32) -> Vec<RuleDefinition> {
    patterns
        .iter()
        .enumerate()
        .map(|(index, pattern)| RuleDefinition {
            id: PATTERN_RULE_ID_BASE + index as u32,
            priority: base_priority,
            action: RuleAction::Block,
            url_pattern: format!("*{pattern}*"),
            resource_types: ResourceTypes::MAIN_FRAME | ResourceTypes::SUB_FRAME | ResourceTypes::SCRIPT,
            domain_allow: Vec::new(),
            domain_deny: Vec::new(),
        })
        .collect()
}
