//! Scripting module - Rhai guest runtime bridged to the host editor
//!
//! Host primitives are exposed under one static module, `emacs` by default:
//! - `emacs::point()`, `emacs::mark()`, `emacs::goto_char(pos)`, ...
//! - `emacs::refresh()` / `emacs::symbols()` / `emacs::symbol(name)`
//! - `emacs::LispObject(name)` - wrap a host symbol

mod api;
mod engine;
pub mod names;
mod namespace;
mod watchdog;
mod wrapper;

pub use engine::Interpreter;
pub use namespace::{NamespaceBridge, RefreshReport};
pub use watchdog::CancelHandle;
pub use wrapper::{LispObject, TYPE_NAME, marshal};
