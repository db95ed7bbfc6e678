//! Bridge between a Lisp-based editor and an embedded Rhai interpreter
//!
//! The editor evaluates guest expressions through [`Interpreter::evaluate`]
//! (or the sentinel-returning [`Interpreter::evaluate_expression`]); guest
//! code sees editor state through the `emacs` module and wraps host values as
//! [`LispObject`]s that keep them pinned.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod scripting;

pub use config::{ConfigEngine, Settings};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{BridgeError, Result};
pub use host::{Editor, Host, HostError, HostRef};
pub use scripting::{CancelHandle, Interpreter, LispObject, RefreshReport};
