//! Configuration for watch establishment.

use serde::{Deserialize, Serialize};

/// Configuration for one [`crate::watch::watch_path`] call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Use the per-directory fan-out even where a native recursive
    /// watch is available.
    pub force_fallback: bool,

    /// Capacity of the change channel handed to the consumer.
    pub channel_capacity: usize,
}

impl WatchConfig {
    /// Create a config with the defaults.
    pub fn new() -> Self {
        Self {
            force_fallback: false,
            channel_capacity: 1000,
        }
    }

    /// Force the per-directory fan-out strategy.
    pub fn force_fallback(mut self) -> Self {
        self.force_fallback = true;
        self
    }

    /// Set the change channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = WatchConfig::default();
        assert!(!config.force_fallback);
        assert_eq!(config.channel_capacity, 1000);
    }

    #[test]
    fn test_builder_methods() {
        let config = WatchConfig::new().force_fallback().with_channel_capacity(8);
        assert!(config.force_fallback);
        assert_eq!(config.channel_capacity, 8);
    }
}
