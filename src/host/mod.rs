//! Host side of the bridge
//!
//! The bridge only talks to the editor through the [`Host`] trait. Values are
//! passed as [`HostRef`] handles; the host keeps ownership and garbage
//! collection, and the bridge registers pins for every handle it retains.

mod buffer;
mod editor;
mod heap;
mod obarray;
mod value;

pub use buffer::Buffer;
pub use editor::Editor;
pub use value::{HostRef, LispValue, Subr};

use thiserror::Error;

/// Errors reported by the host
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("object {0} has been reclaimed")]
    Reclaimed(HostRef),

    #[error("invalid function: {0}")]
    NotCallable(String),

    #[error("symbol's function definition is void: {0}")]
    Void(String),
}

/// Narrow interface the bridge needs from the editor.
///
/// Implementations must tolerate calls from any thread; the bridge never calls
/// back into the host while holding a host-internal lock.
pub trait Host: Send + Sync {
    /// Every symbol in the global symbol table, in iteration order
    fn global_symbols(&self) -> Vec<HostRef>;

    /// Look up or create the symbol called `name`
    fn intern(&self, name: &str) -> HostRef;

    /// The "no value" sentinel
    fn nil(&self) -> HostRef;

    fn make_string(&self, s: &str) -> HostRef;

    fn type_of(&self, value: HostRef) -> Result<&'static str, HostError>;

    /// `Some(name)` for symbols, `None` for anything else
    fn symbol_name(&self, value: HostRef) -> Result<Option<String>, HostError>;

    fn string_value(&self, value: HostRef) -> Result<Option<String>, HostError>;

    fn integer_value(&self, value: HostRef) -> Result<Option<i64>, HostError>;

    /// Printed representation using the host's own printer
    fn prin1(&self, value: HostRef) -> Result<String, HostError>;

    /// Keep `value` alive until a matching [`Host::unpin`]
    fn pin(&self, value: HostRef) -> Result<(), HostError>;

    fn unpin(&self, value: HostRef);

    fn is_callable(&self, value: HostRef) -> Result<bool, HostError>;

    /// Call `function` with no arguments
    fn funcall(&self, function: HostRef) -> Result<HostRef, HostError>;

    fn point(&self) -> i64;

    fn point_min(&self) -> i64;

    fn point_max(&self) -> i64;

    fn mark(&self) -> Option<i64>;

    fn goto_char(&self, pos: i64) -> i64;

    fn set_mark(&self, pos: i64) -> i64;
}
