//! JSON wire shape of the rule feed
//!
//! Batches arrive as an array of `{id, priority, action:{type},
//! condition:{urlFilter, resourceTypes[], domains?[], excludedDomains?[]}}`
//! objects. Decoding is lenient per entry: anything the core cannot
//! represent (negative id, an action type outside block/allow, an id
//! inside a reserved builtin range) is skipped and counted, never fatal.

use log::warn;
use serde::Deserialize;

use pg_core::rules::DOMAIN_RULE_ID_BASE;
use pg_core::types::{ResourceTypes, RuleAction, RuleDefinition};

/// Error decoding a feed document.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("malformed rule feed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One decoded feed: the usable rules plus a count of entries that were
/// skipped during conversion.
#[derive(Debug)]
pub struct FeedBatch {
    pub rules: Vec<RuleDefinition>,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct FeedRule {
    id: i64,
    priority: i32,
    action: FeedAction,
    condition: FeedCondition,
}

#[derive(Debug, Deserialize)]
struct FeedAction {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedCondition {
    url_filter: String,
    #[serde(default)]
    resource_types: Vec<String>,
    #[serde(default)]
    domains: Option<Vec<String>>,
    #[serde(default)]
    excluded_domains: Option<Vec<String>>,
}

/// Decode a JSON rule feed document.
///
/// Fails only on malformed JSON; individual unusable entries are skipped
/// with a warning and counted in the returned batch.
pub fn decode_rules(json: &str) -> Result<FeedBatch, FeedError> {
    let raw: Vec<FeedRule> = serde_json::from_str(json)?;

    let mut rules = Vec::with_capacity(raw.len());
    let mut skipped = 0usize;

    for entry in raw {
        match convert(entry) {
            Some(rule) => rules.push(rule),
            None => skipped += 1,
        }
    }

    Ok(FeedBatch { rules, skipped })
}

fn convert(entry: FeedRule) -> Option<RuleDefinition> {
    let id = match u32::try_from(entry.id) {
        Ok(id) => id,
        Err(_) => {
            warn!("feed rule {}: id out of range, skipping", entry.id);
            return None;
        }
    };

    if id >= DOMAIN_RULE_ID_BASE {
        warn!("feed rule {id}: id inside a reserved builtin range, skipping");
        return None;
    }

    let action = match entry.action.kind.as_str() {
        "block" => RuleAction::Block,
        "allow" => RuleAction::Allow,
        other => {
            // The feed generator also emits redirect/upgradeScheme/
            // modifyHeaders rules; those have no core counterpart.
            warn!("feed rule {id}: unsupported action type {other:?}, skipping");
            return None;
        }
    };

    let mut resource_types = ResourceTypes::empty();
    for name in &entry.condition.resource_types {
        resource_types |= ResourceTypes::from_name(name);
    }

    Some(RuleDefinition {
        id,
        priority: entry.priority,
        action,
        url_pattern: entry.condition.url_filter,
        resource_types,
        domain_allow: entry.condition.domains.unwrap_or_default(),
        domain_deny: entry.condition.excluded_domains.unwrap_or_default(),
    })
}
