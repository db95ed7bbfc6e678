use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bridge settings that can be customized via Rhai config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Guest namespace
    pub module_name: String,
    pub reserved_name: String, // never installed by refresh

    // Execution limits
    pub max_operations: u64, // 0 = unlimited
    pub max_expr_depth: usize,
    pub max_fn_depth: usize,
    pub timeout_ms: Option<u64>,

    // Data size limits, 0 = unlimited
    pub max_string_size: usize,
    pub max_array_size: usize,
    pub max_map_size: usize,

    // Diagnostics
    pub diagnostics_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            module_name: "emacs".to_string(),
            reserved_name: "refresh".to_string(),

            max_operations: 100_000,
            max_expr_depth: 64,
            max_fn_depth: 64,
            timeout_ms: Some(5_000),

            max_string_size: 1 << 20,
            max_array_size: 1 << 16,
            max_map_size: 1 << 16,

            diagnostics_capacity: 256,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.module_name, "emacs");
        assert_eq!(settings.reserved_name, "refresh");
        assert_eq!(settings.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(settings.max_string_size, 1_048_576);
        assert_eq!(settings.max_array_size, 65_536);
        assert_eq!(settings.max_map_size, 65_536);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"timeout_ms": null}"#).unwrap();
        assert_eq!(settings.timeout(), None);
        assert_eq!(settings.max_operations, 100_000);
    }
}
