use std::time::Duration;

/// Timing knobs shared by the selection services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Upper bound for every call to a persistence collaborator.
    pub store_timeout: Duration,
    /// Maximum age of the cached gate value before a read refreshes it.
    pub gate_staleness: Duration,
    /// Cadence of the mirror's full reload.
    pub mirror_reload_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(3),
            gate_staleness: Duration::from_secs(5),
            mirror_reload_interval: Duration::from_secs(300),
        }
    }
}
