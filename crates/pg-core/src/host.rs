//! Host action boundary
//!
//! The core never talks to the browser directly. Anything with a side
//! effect outside the core (today, closing a tab) goes through this
//! trait, injected at engine construction. Tests substitute a recording
//! implementation.

/// Error returned when the host rejects an action.
///
/// Host failures are logged and never retried: if a close-tab command
/// fails because the tab is already gone, the popup is moot anyway.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("tab {0} no longer exists")]
    TabGone(i64),
    #[error("host rejected the action: {0}")]
    Rejected(String),
}

/// Commands the core issues back to the host platform.
pub trait HostActions {
    /// Ask the host to close a tab.
    fn close_tab(&self, tab_id: i64) -> Result<(), HostError>;
}

/// Host that drops all commands. Useful for offline evaluation, where no
/// real browser is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl HostActions for NullHost {
    fn close_tab(&self, _tab_id: i64) -> Result<(), HostError> {
        Ok(())
    }
}
