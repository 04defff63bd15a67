//! Feature flags owned by the host's settings store
//!
//! The core reads these but never persists them; the host delivers the
//! current values at construction and again on every settings change.

/// Blocking feature flags. Everything defaults to on, matching a fresh
/// install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    /// Master switch; when off the core treats every request and tab as
    /// uninteresting.
    pub enabled: bool,
    pub block_ads: bool,
    pub block_trackers: bool,
    pub block_malware: bool,
    pub block_popups: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            block_ads: true,
            block_trackers: true,
            block_malware: true,
            block_popups: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_all_on() {
        let config = FilterConfig::default();
        assert!(config.enabled);
        assert!(config.block_ads);
        assert!(config.block_popups);
    }
}
