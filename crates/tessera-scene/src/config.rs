use serde::{Deserialize, Serialize};
use tessera_core::ClockConfig;

/// Per-world settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Name used as the source tag in world-level log lines.
    pub name: String,
    /// Whether the render pass runs the render-debug hook.
    pub render_debug: bool,
    pub clock: ClockConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "world".to_string(),
            render_debug: false,
            clock: ClockConfig::default(),
        }
    }
}
