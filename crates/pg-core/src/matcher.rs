//! Request match engine
//!
//! This is the hot path: every observed request is evaluated against the
//! current rule-set snapshot. Evaluation is a pure function of its inputs
//! and never fails; a request nothing matches falls through to the
//! default-allow decision (the system is a blocklist, not an allowlist).

use crate::rules::RuleSet;
use crate::types::{MatchDecision, RequestDescriptor, RuleDefinition};
use crate::url::find_case_insensitive;

/// Evaluate a request against a rule-set snapshot.
///
/// Rules are visited in `(priority desc, insertion order asc)` order; the
/// first matching rule decides. Ties in priority break by insertion order,
/// never by id value, so the outcome is independent of id assignment.
pub fn evaluate(request: &RequestDescriptor, rules: &RuleSet) -> MatchDecision {
    for rule in rules.iter() {
        if rule_matches(rule, request) {
            return MatchDecision {
                action: rule.action,
                matched_rule_id: Some(rule.id),
                domain: request.registrable_domain.clone(),
            };
        }
    }

    MatchDecision::default_allow(&request.registrable_domain)
}

/// Check a single rule against a request.
fn rule_matches(rule: &RuleDefinition, request: &RequestDescriptor) -> bool {
    if !rule.resource_types.is_empty() && !rule.resource_types.intersects(request.resource_type) {
        return false;
    }

    let domain = request.registrable_domain.as_str();
    if !rule.domain_allow.is_empty() && !rule.domain_allow.iter().any(|d| d == domain) {
        return false;
    }
    if rule.domain_deny.iter().any(|d| d == domain) {
        return false;
    }

    pattern_matches(&rule.url_pattern, &request.url)
}

/// Wildcard-glob match of a URL pattern against a URL.
///
/// The pattern is split into literal segments on `*`; each segment must
/// appear in the URL in order, `*` may match the empty string, and the
/// pattern is not anchored at either end (patterns authored as `*domain*`
/// are plain contains-matches). Comparison ignores ASCII case.
pub fn pattern_matches(pattern: &str, url: &str) -> bool {
    let url_bytes = url.as_bytes();
    let mut pos = 0usize;

    for segment in pattern.split('*') {
        if segment.is_empty() {
            continue;
        }
        match find_case_insensitive(&url_bytes[pos..], segment.as_bytes()) {
            Some(found) => pos += found + segment.len(),
            None => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleStore;
    use crate::types::{ResourceTypes, RuleAction, RuleDefinition};

    fn request(url: &str, resource_type: ResourceTypes) -> RequestDescriptor {
        RequestDescriptor::parse(url, resource_type, None, None).unwrap()
    }

    fn rule(id: u32, priority: i32, action: RuleAction, pattern: &str) -> RuleDefinition {
        RuleDefinition {
            id,
            priority,
            action,
            url_pattern: pattern.to_string(),
            resource_types: ResourceTypes::empty(),
            domain_allow: Vec::new(),
            domain_deny: Vec::new(),
        }
    }

    #[test]
    fn test_empty_set_defaults_to_allow() {
        let store = RuleStore::new();
        let decision = evaluate(
            &request("https://example.com/x", ResourceTypes::SCRIPT),
            &store.current(),
        );
        assert_eq!(decision.action, RuleAction::Allow);
        assert_eq!(decision.matched_rule_id, None);
    }

    #[test]
    fn test_block_and_miss_scenario() {
        let store = RuleStore::new();
        store.load(vec![rule(1, 100, RuleAction::Block, "*ads.example*")]);
        let set = store.current();

        let blocked = evaluate(&request("https://ads.example.com/x", ResourceTypes::SCRIPT), &set);
        assert_eq!(blocked.action, RuleAction::Block);
        assert_eq!(blocked.matched_rule_id, Some(1));
        assert_eq!(blocked.domain, "example.com");

        let allowed = evaluate(&request("https://safe.example.com/x", ResourceTypes::SCRIPT), &set);
        assert_eq!(allowed.action, RuleAction::Allow);
        assert_eq!(allowed.matched_rule_id, None);
    }

    #[test]
    fn test_higher_priority_wins() {
        let store = RuleStore::new();
        store.load(vec![
            rule(1, 50, RuleAction::Block, "*track*"),
            rule(2, 90, RuleAction::Allow, "*track.safe.com*"),
        ]);

        let decision = evaluate(
            &request("https://track.safe.com/a", ResourceTypes::SCRIPT),
            &store.current(),
        );
        assert_eq!(decision.action, RuleAction::Allow);
        assert_eq!(decision.matched_rule_id, Some(2));
    }

    #[test]
    fn test_priority_tie_breaks_by_insertion_order() {
        let store = RuleStore::new();
        // Higher id inserted first; insertion order must win over id value.
        store.load(vec![
            rule(9, 50, RuleAction::Allow, "*example*"),
            rule(1, 50, RuleAction::Block, "*example*"),
        ]);

        let decision = evaluate(
            &request("https://example.com/x", ResourceTypes::SCRIPT),
            &store.current(),
        );
        assert_eq!(decision.matched_rule_id, Some(9));
    }

    #[test]
    fn test_resource_type_filter() {
        let store = RuleStore::new();
        let mut r = rule(1, 0, RuleAction::Block, "*example*");
        r.resource_types = ResourceTypes::SCRIPT;
        store.load(vec![r]);
        let set = store.current();

        let script = evaluate(&request("https://example.com/x", ResourceTypes::SCRIPT), &set);
        assert!(script.is_block());

        let image = evaluate(&request("https://example.com/x", ResourceTypes::IMAGE), &set);
        assert!(!image.is_block());
    }

    #[test]
    fn test_domain_allow_and_deny() {
        let store = RuleStore::new();
        let mut scoped = rule(1, 10, RuleAction::Block, "*banner*");
        scoped.domain_allow = vec!["example.com".to_string()];
        let mut exempt = rule(2, 5, RuleAction::Block, "*banner*");
        exempt.domain_deny = vec!["trusted.org".to_string()];
        store.load(vec![scoped, exempt]);
        let set = store.current();

        let on_listed = evaluate(&request("https://example.com/banner.png", ResourceTypes::IMAGE), &set);
        assert_eq!(on_listed.matched_rule_id, Some(1));

        let on_other = evaluate(&request("https://other.net/banner.png", ResourceTypes::IMAGE), &set);
        assert_eq!(on_other.matched_rule_id, Some(2));

        let on_denied = evaluate(&request("https://trusted.org/banner.png", ResourceTypes::IMAGE), &set);
        assert_eq!(on_denied.matched_rule_id, None);
    }

    #[test]
    fn test_pattern_semantics() {
        // Unanchored: segments are contains-matches in order.
        assert!(pattern_matches("*ads.example*", "https://ads.example.com/x"));
        assert!(pattern_matches("ads.example", "https://ads.example.com/x"));
        assert!(pattern_matches("*example*banner*", "https://example.com/img/banner.png"));
        assert!(!pattern_matches("*banner*example*", "https://example.com/img/banner.png"));
        // `*` may match the empty string.
        assert!(pattern_matches("**example**", "https://example.com"));
        assert!(pattern_matches("*", "https://example.com"));
        // ASCII case-insensitive, like the host's urlFilter.
        assert!(pattern_matches("*ADS.Example*", "https://ads.example.com/x"));
    }
}
