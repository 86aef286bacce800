pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::collections::HashMap;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::load;
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Outer wrapper sizing for modals, keyed by dialog class name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalLayoutConfig {
    /// Width in percent of the terminal for dialogs without an entry in `widths`.
    pub default_width: u16,
    pub widths: HashMap<String, u16>,
}

impl Default for ModalLayoutConfig {
    fn default() -> Self {
        Self {
            default_width: 50,
            widths: HashMap::from([
                ("LogInModal".to_string(), 40),
                ("LogOutModal".to_string(), 35),
            ]),
        }
    }
}

impl ModalLayoutConfig {
    /// Width percentage for the given class name, clamped to 10..=100.
    #[must_use]
    pub fn width_for(&self, class_name: &str) -> u16 {
        self.widths
            .get(class_name)
            .copied()
            .unwrap_or(self.default_width)
            .clamp(10, 100)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    /// Simulated round-trip time of the in-memory forum.
    pub latency_ms: u64,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self { latency_ms: 600 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub modal: ModalLayoutConfig,
    #[serde(default)]
    pub forum: ForumConfig,
}
