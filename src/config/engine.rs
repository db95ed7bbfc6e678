use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use rhai::{Engine, Scope};

use super::Settings;
use crate::error::{BridgeError, Result};

/// The Rhai scripting engine for configuration
pub struct ConfigEngine {
    engine: Engine,
    settings: Arc<RwLock<Settings>>,
}

impl ConfigEngine {
    pub fn new() -> Self {
        let settings = Arc::new(RwLock::new(Settings::default()));
        let engine = Self::create_engine(Arc::clone(&settings));

        Self { engine, settings }
    }

    fn create_engine(settings: Arc<RwLock<Settings>>) -> Engine {
        let mut engine = Engine::new();

        // Limit script execution for safety
        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(100_000);

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_module_name", move |name: &str| {
                if let Ok(mut settings) = s.write() {
                    settings.module_name = name.to_string();
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_reserved_name", move |name: &str| {
                if let Ok(mut settings) = s.write() {
                    settings.reserved_name = name.to_string();
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_max_operations", move |ops: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.max_operations = ops.max(0) as u64;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_max_expr_depth", move |depth: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.max_expr_depth = depth.clamp(1, 1024) as usize;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_max_fn_depth", move |depth: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.max_fn_depth = depth.clamp(1, 1024) as usize;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_timeout_ms", move |ms: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.timeout_ms = Some(ms.max(0) as u64);
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("disable_timeout", move || {
                if let Ok(mut settings) = s.write() {
                    settings.timeout_ms = None;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_max_string_size", move |size: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.max_string_size = size.max(0) as usize;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_max_array_size", move |size: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.max_array_size = size.max(0) as usize;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_max_map_size", move |size: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.max_map_size = size.max(0) as usize;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_diagnostics_capacity", move |capacity: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.diagnostics_capacity = capacity.max(1) as usize;
                }
            });
        }

        engine.on_print(|msg| tracing::info!(target: "config", "{}", msg));

        engine
    }

    /// Load and execute a config file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("failed to read {}: {}", path.display(), e)))?;

        self.eval(&content)
    }

    /// Evaluate a Rhai config script
    pub fn eval(&mut self, script: &str) -> Result<()> {
        let ast = self
            .engine
            .compile(script)
            .map_err(|e| BridgeError::Config(format!("parse error: {}", e)))?;

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| BridgeError::Config(e.to_string()))?;

        Ok(())
    }

    /// Get the current settings (cloned)
    pub fn settings(&self) -> Settings {
        self.settings.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lisp-bridge"))
    }

    /// Get the default config file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("init.rhai"))
    }

    /// Load the default config file if it exists
    pub fn load_default(&mut self) -> Result<()> {
        if let Some(config_file) = Self::config_file() {
            if config_file.exists() {
                tracing::debug!(path = %config_file.display(), "loading config");
                return self.load_file(&config_file);
            }
        }
        Ok(()) // No config file is fine
    }
}

impl Default for ConfigEngine {
    fn default() -> Self {
        Self::new()
    }
}
