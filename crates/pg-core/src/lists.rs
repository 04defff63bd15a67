//! Built-in domain and heuristic-token lists
//!
//! These are the default inputs to the popup classifier, the stats
//! aggregator's tracker check, and the built-in rule batches. The token
//! lists are deliberately loose substring heuristics; both the classifier
//! and the aggregator accept replacement lists so the policy can be tuned
//! without touching the matching code.

/// Known ad/popup-serving domains used for tab classification and the
/// built-in domain block rules.
pub const AD_DOMAINS: &[&str] = &[
    // User reported domains
    "tzegilo.com",
    "goggletagmanager.com",
    "paupsoborofoow.net",
    "wasm",
    // Common popup networks
    "popads.net",
    "popunder.net",
    "popcash.net",
    "propellerads.com",
    "adcash.com",
    "exosrv.com",
    "clickadu.com",
    "aclickads.com",
    "doubleclick.net",
    "googlesyndication.com",
    "adservice.google.com",
    "advertising.com",
    "taboola.com",
    "outbrain.com",
    "revcontent.com",
    "mgid.com",
    "adsterra.com",
    "hilltopads.net",
];

/// URL substrings that flag a request or tab as a suspected popup.
///
/// Substring matching is case-sensitive and known to produce false
/// positives (any URL containing "ad" inside an unrelated word trips it).
pub const SUSPECT_URL_TOKENS: &[&str] = &["ad", "pop", "click", "track", "redirect"];

/// URL patterns for the built-in pattern block rules.
pub const POPUP_PATTERNS: &[&str] = &[
    "popup", "popunder", "pop.js", "pop_", "click", "redirect", "/rd/", "track",
];

/// Known tracker domains, matched exactly or as a dotted suffix.
pub const KNOWN_TRACKERS: &[&str] = &[
    "google-analytics.com",
    "analytics.google.com",
    "googletagmanager.com",
    "doubleclick.net",
    "googleadservices.com",
    "facebook.net",
    "facebook.com",
    "connect.facebook.net",
    "x.com",
    "twimg.com",
    "t.co",
    "linkedin.com",
    "licdn.com",
    "adnxs.com",
    "adform.net",
    "adroll.com",
    "criteo.com",
    "taboola.com",
    "outbrain.com",
    "pubmatic.com",
    "rubiconproject.com",
    "hotjar.com",
    "mixpanel.com",
    "segment.io",
    "optimizely.com",
    "newrelic.com",
    "pingdom.net",
];
