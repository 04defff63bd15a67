//! Core type definitions for PopGuard
//!
//! These types are the currency between the rule feed, the match engine,
//! and the statistics aggregator.

use std::time::SystemTime;

use crate::url::{extract_host, registrable_domain};

// =============================================================================
// Rule Actions
// =============================================================================

/// Action to take for a matched rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleAction {
    /// Exception rule - allows the request
    Allow,
    /// Block rule - cancels the request
    Block,
}

// =============================================================================
// Resource Types (bit mask for type filtering)
// =============================================================================

bitflags::bitflags! {
    /// Request resource type bit mask.
    ///
    /// A rule's type set with no bits set matches any resource type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceTypes: u32 {
        const OTHER = 1 << 0;
        const SCRIPT = 1 << 1;
        const IMAGE = 1 << 2;
        const STYLESHEET = 1 << 3;
        const OBJECT = 1 << 4;
        const SUB_FRAME = 1 << 5;
        const MAIN_FRAME = 1 << 6;
        const XMLHTTPREQUEST = 1 << 7;
        const WEBSOCKET = 1 << 8;
        const FONT = 1 << 9;
        const MEDIA = 1 << 10;
        const PING = 1 << 11;
        const CSP_REPORT = 1 << 12;

        /// Document types (main_frame + sub_frame)
        const DOCUMENT = Self::MAIN_FRAME.bits() | Self::SUB_FRAME.bits();
    }
}

impl ResourceTypes {
    /// Parse from the browser's request type string.
    pub fn from_name(s: &str) -> Self {
        match s {
            "main_frame" => Self::MAIN_FRAME,
            "sub_frame" => Self::SUB_FRAME,
            "stylesheet" => Self::STYLESHEET,
            "script" => Self::SCRIPT,
            "image" => Self::IMAGE,
            "font" => Self::FONT,
            "object" => Self::OBJECT,
            "xmlhttprequest" => Self::XMLHTTPREQUEST,
            "ping" => Self::PING,
            "csp_report" => Self::CSP_REPORT,
            "media" => Self::MEDIA,
            "websocket" => Self::WEBSOCKET,
            _ => Self::OTHER,
        }
    }
}

// =============================================================================
// Rule Definition
// =============================================================================

/// A single blocking rule as consumed from the rule feed.
///
/// `id` must be unique within one rule-set snapshot. Rule origins are kept
/// collision-free by reserving disjoint id ranges per source (see
/// [`crate::rules`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDefinition {
    pub id: u32,
    /// Higher priority rules are evaluated first.
    pub priority: i32,
    pub action: RuleAction,
    /// URL pattern with `*` wildcards. Literal segments must appear in
    /// order as substrings; the pattern is not anchored at either end.
    pub url_pattern: String,
    /// Resource types this rule applies to; empty matches any.
    pub resource_types: ResourceTypes,
    /// If non-empty, the rule only applies to these registrable domains.
    pub domain_allow: Vec<String>,
    /// The rule never applies to these registrable domains.
    pub domain_deny: Vec<String>,
}

// =============================================================================
// Request Descriptor
// =============================================================================

/// Error building a request descriptor from a raw URL.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("URL has no recognizable host: {0}")]
    NoHost(String),
}

/// A normalized view of one outbound request, as delivered by the host.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Full request URL
    pub url: String,
    /// Registrable domain (eTLD+1) derived from the URL host
    pub registrable_domain: String,
    /// Request resource type (a single flag)
    pub resource_type: ResourceTypes,
    /// Tab the request originated from, if known
    pub tab_id: Option<i64>,
    /// Registrable domain of the initiating document, if known
    pub initiator_domain: Option<String>,
    /// When the host observed the request
    pub timestamp: SystemTime,
}

impl RequestDescriptor {
    /// Build a descriptor from a raw URL, deriving the registrable domain.
    ///
    /// Fails with [`RequestError::NoHost`] when no host can be extracted;
    /// callers are expected to degrade to a default-allow decision.
    pub fn parse(
        url: &str,
        resource_type: ResourceTypes,
        tab_id: Option<i64>,
        initiator_domain: Option<String>,
    ) -> Result<Self, RequestError> {
        let host = extract_host(url).ok_or_else(|| RequestError::NoHost(url.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            registrable_domain: registrable_domain(host),
            resource_type,
            tab_id,
            initiator_domain,
            timestamp: SystemTime::now(),
        })
    }

    /// Whether this request is a top-level document navigation.
    #[inline]
    pub fn is_main_frame(&self) -> bool {
        self.resource_type.contains(ResourceTypes::MAIN_FRAME)
    }
}

// =============================================================================
// Match Decision
// =============================================================================

/// Final decision for an evaluated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDecision {
    pub action: RuleAction,
    /// Rule that determined the decision; `None` means default-allow.
    pub matched_rule_id: Option<u32>,
    /// Registrable domain of the request, carried for stats attribution.
    pub domain: String,
}

impl MatchDecision {
    /// The default-allow decision for a request nothing matched.
    pub fn default_allow(domain: &str) -> Self {
        Self {
            action: RuleAction::Allow,
            matched_rule_id: None,
            domain: domain.to_string(),
        }
    }

    #[inline]
    pub fn is_block(&self) -> bool {
        self.action == RuleAction::Block
    }
}
