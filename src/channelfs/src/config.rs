use serde::{Deserialize, Serialize};

/// Mount policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Keep the synthetic size of random-write channels after close, so a
    /// reopened channel still reports what was written.
    pub retain_synthetic_size: bool,
}

impl Default for MountConfig {
    fn default() -> Self {
        MountConfig {
            retain_synthetic_size: true,
        }
    }
}
