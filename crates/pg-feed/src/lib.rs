//! PopGuard rule feed
//!
//! The boundary between the core and whatever fetches rule batches:
//! decodes the JSON wire shape into [`RuleDefinition`]s and produces the
//! built-in batches derived from the bundled ad-domain and popup-pattern
//! lists. The core consumes the result; it never fetches anything itself.

pub mod schema;

pub use schema::{decode_rules, FeedBatch, FeedError};

use pg_core::lists::{AD_DOMAINS, POPUP_PATTERNS};
use pg_core::rules::{domain_block_rules, pattern_block_rules};
use pg_core::types::RuleDefinition;

/// Priority of the built-in domain block rules.
pub const DOMAIN_RULE_PRIORITY: i32 = 100;

/// Priority of the built-in pattern block rules.
pub const PATTERN_RULE_PRIORITY: i32 = 90;

/// The built-in rule batches: known ad domains at priority 100, popup URL
/// patterns at priority 90. Ids land in the reserved builtin ranges and
/// never collide with an external feed.
pub fn builtin_rules() -> Vec<RuleDefinition> {
    let mut rules = domain_block_rules(AD_DOMAINS, DOMAIN_RULE_PRIORITY);
    rules.extend(pattern_block_rules(POPUP_PATTERNS, PATTERN_RULE_PRIORITY));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_core::rules::{RuleStore, DOMAIN_RULE_ID_BASE, PATTERN_RULE_ID_BASE};

    #[test]
    fn test_builtin_rules_fit_reserved_ranges() {
        let rules = builtin_rules();
        assert_eq!(rules.len(), AD_DOMAINS.len() + POPUP_PATTERNS.len());

        for rule in &rules {
            assert!(rule.id >= DOMAIN_RULE_ID_BASE);
            if rule.id >= PATTERN_RULE_ID_BASE {
                assert_eq!(rule.priority, PATTERN_RULE_PRIORITY);
            } else {
                assert_eq!(rule.priority, DOMAIN_RULE_PRIORITY);
            }
        }
    }

    #[test]
    fn test_builtin_rules_load_cleanly() {
        let store = RuleStore::new();
        let report = store.load(builtin_rules());
        assert_eq!(report.skipped, 0);
        assert_eq!(report.loaded, AD_DOMAINS.len() + POPUP_PATTERNS.len());
    }
}
