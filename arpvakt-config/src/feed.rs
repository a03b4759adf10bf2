//! Change feed sizing.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Capacity applied to each change feed (settings and reports).
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct FeedConfig {
    /// Maximum queued events per feed before publishers see backpressure.
    #[validate(range(min = 16, max = 1048576))]
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    1024
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undersized_feed_rejected() {
        let config = FeedConfig { capacity: 1 };
        assert!(config.validate().is_err());
    }
}
