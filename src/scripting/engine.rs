//! The guest interpreter and its execution claim
//!
//! An [`Interpreter`] owns the Rhai engine, the guest global namespace and the
//! bridging module. Every entry point that touches guest state takes the
//! claim (one mutex around all guest state) and releases it on every exit
//! path, so concurrent callers serialize.

use std::sync::Arc;

use parking_lot::Mutex;
use rhai::packages::{Package, StandardPackage};
use rhai::{AST, Dynamic, Engine, Scope};

use super::api;
use super::namespace::{NamespaceBridge, RefreshReport};
use super::watchdog::{CancelHandle, Watchdog};
use super::wrapper;
use crate::config::Settings;
use crate::diagnostics::Diagnostics;
use crate::error::{BridgeError, Result};
use crate::host::{Host, HostRef};

/// Guest state guarded by the claim
struct Guest {
    engine: Engine,
    globals: Scope<'static>,
    conversion: AST,
    modules: Vec<String>,
    builtins: bool,
}

pub struct Interpreter {
    claim: Mutex<Guest>,
    bridge: Arc<NamespaceBridge>,
    diagnostics: Diagnostics,
    watchdog: Arc<Watchdog>,
    settings: Settings,
}

impl Interpreter {
    /// Bring up a guest interpreter bridged to `host`
    #[tracing::instrument(level = "debug", skip_all, fields(module = %settings.module_name))]
    pub fn new(host: Arc<dyn Host>, settings: Settings) -> Result<Self> {
        // (a) raw runtime, no packages yet
        let mut engine = Engine::new_raw();
        tracing::debug!("guest runtime created");

        // (b) limits and the progress hook used for deadlines and cancellation
        let watchdog = Watchdog::new();
        engine.set_max_operations(settings.max_operations);
        engine.set_max_expr_depths(settings.max_expr_depth, settings.max_fn_depth);
        engine.set_max_string_size(settings.max_string_size);
        engine.set_max_array_size(settings.max_array_size);
        engine.set_max_map_size(settings.max_map_size);
        {
            let w = Arc::clone(&watchdog);
            engine.on_progress(move |_| w.check());
        }
        engine.on_print(|msg| tracing::info!(target: "guest", "{}", msg));
        engine.on_debug(|msg, _, pos| tracing::debug!(target: "guest", ?pos, "{}", msg));

        let conversion = engine
            .compile_expression("to_string(value)")
            .map_err(|e| BridgeError::Compile(e.to_string()))?;

        // (c) the claim starts out free
        let claim = Mutex::new(Guest {
            engine,
            globals: Scope::new(),
            conversion,
            modules: Vec::new(),
            builtins: false,
        });
        let diagnostics = Diagnostics::new(settings.diagnostics_capacity);
        let bridge = Arc::new(NamespaceBridge::new(
            host,
            &settings.reserved_name,
            diagnostics.clone(),
        ));

        {
            // (d) take the claim for setup
            let mut guest = claim.lock();
            let guest = &mut *guest;

            // (e) global namespace
            guest.globals = Scope::new();
            tracing::debug!("global namespace created");

            // (f) built-ins
            guest
                .engine
                .register_global_module(StandardPackage::new().as_shared_module());
            guest.builtins = true;
            guest
                .globals
                .push_constant("version", env!("CARGO_PKG_VERSION").to_string());
            tracing::debug!("built-in namespace linked");

            // (g) bridging module and wrapper type
            wrapper::register(&mut guest.engine);
            let module = api::emacs::create_module(Arc::clone(&bridge));

            // (h) register it under its fixed name
            guest
                .engine
                .register_static_module(settings.module_name.as_str(), module.into());
            guest.modules.push(settings.module_name.clone());
            tracing::debug!("bridging module registered");

            // (i) claim released here
        }

        Ok(Self {
            claim,
            bridge,
            diagnostics,
            watchdog,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn bridge(&self) -> &NamespaceBridge {
        &self.bridge
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        self.bridge.host()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(Arc::clone(&self.watchdog))
    }

    /// Evaluate `source` as a single guest expression and print the result.
    ///
    /// Failures are recorded in the diagnostic stream before being returned.
    pub fn evaluate(&self, source: &str) -> Result<String> {
        tracing::trace!(source, "evaluating");
        let result = self.evaluate_claimed(source);
        if let Err(err) = &result {
            self.diagnostics.record_error(err);
        }
        result
    }

    fn evaluate_claimed(&self, source: &str) -> Result<String> {
        let guest = self.claim.lock();
        let _armed = self.watchdog.arm(self.settings.timeout());

        // Call-scoped locals; discarded on every path
        let mut locals = guest.globals.clone();

        let ast = guest
            .engine
            .compile_expression_with_scope(&locals, source)
            .map_err(|e| BridgeError::Compile(e.to_string()))?;

        let value: Dynamic = guest
            .engine
            .eval_ast_with_scope(&mut locals, &ast)
            .map_err(|e| self.watchdog.classify(e))?;

        Self::stringify(&guest, value)
    }

    /// Convert through the guest's own `to_string` protocol
    fn stringify(guest: &Guest, value: Dynamic) -> Result<String> {
        let mut scope = Scope::new();
        scope.push("value", value);
        guest
            .engine
            .eval_ast_with_scope::<String>(&mut scope, &guest.conversion)
            .map_err(|e| BridgeError::Conversion(e.to_string()))
    }

    /// Host-facing entry point.
    ///
    /// `text` must be a host string. Returns a new host string holding the
    /// printed result, or the host's `nil` on any failure.
    pub fn evaluate_expression(&self, text: HostRef) -> HostRef {
        let host = self.host();
        let source = match host.string_value(text) {
            Ok(Some(source)) => source,
            Ok(None) => {
                let found = host.type_of(text).unwrap_or("unknown");
                self.diagnostics.record_error(&BridgeError::WrongType {
                    expected: "string",
                    found,
                });
                return host.nil();
            }
            Err(err) => {
                self.diagnostics.record_error(&err.into());
                return host.nil();
            }
        };

        match self.evaluate(&source) {
            Ok(printed) => host.make_string(&printed),
            Err(_) => host.nil(),
        }
    }

    /// Reinstall every host symbol in the bridging module
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn refresh_all(&self) -> RefreshReport {
        let _guest = self.claim.lock();
        self.bridge.refresh_all()
    }

    /// Bind a global visible to every later evaluation
    pub fn define_global(&self, name: &str, value: impl Into<Dynamic>) {
        let mut guest = self.claim.lock();
        guest.globals.set_or_push(name.to_string(), value.into());
    }

    pub fn global_names(&self) -> Vec<String> {
        let guest = self.claim.lock();
        guest
            .globals
            .iter()
            .map(|(name, _, _)| name.to_string())
            .collect()
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.claim.lock().modules.iter().any(|m| m == name)
    }

    pub fn has_builtins(&self) -> bool {
        self.claim.lock().builtins
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        // Wrappers never outlive the session that created them
        self.bridge.clear();
    }
}
