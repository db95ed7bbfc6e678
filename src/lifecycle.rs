//! Process-wide interpreter
//!
//! Editors that cannot thread an [`Interpreter`] through their own call paths
//! install exactly one with [`initialize_once`] and reach it through
//! [`global`] and [`evaluate_expression`]. Initialize before the editor starts
//! any other thread that might evaluate guest code.

use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, const_mutex};

use crate::config::Settings;
use crate::error::{BridgeError, Result};
use crate::host::{Host, HostRef};
use crate::scripting::Interpreter;

static INTERPRETER: OnceLock<Interpreter> = OnceLock::new();
static INIT: Mutex<()> = const_mutex(());

/// Create the process-wide interpreter. A second call fails with
/// [`BridgeError::AlreadyInitialized`] and leaves the first one untouched.
pub fn initialize_once(host: Arc<dyn Host>, settings: Settings) -> Result<&'static Interpreter> {
    let _init = INIT.lock();
    if INTERPRETER.get().is_some() {
        return Err(BridgeError::AlreadyInitialized);
    }
    let interpreter = Interpreter::new(host, settings)?;
    Ok(INTERPRETER.get_or_init(|| interpreter))
}

pub fn global() -> Option<&'static Interpreter> {
    INTERPRETER.get()
}

/// Host entry point against the process-wide interpreter.
///
/// `None` means the bridge was never initialized; every other failure yields
/// the host's `nil`.
pub fn evaluate_expression(text: HostRef) -> Option<HostRef> {
    match global() {
        Some(interpreter) => Some(interpreter.evaluate_expression(text)),
        None => {
            tracing::error!("evaluate_expression called before initialize_once");
            None
        }
    }
}
