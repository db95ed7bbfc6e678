//! `LispObject`: guest-side wrapper around one host value
//!
//! A wrapper pins its host value for as long as it exists. Every clone adds a
//! pin and every drop removes one, so the host collector never reclaims a
//! value the guest can still reach.

use std::fmt;
use std::sync::Arc;

use rhai::{Dynamic, Engine, EvalAltResult};

use crate::error::BridgeError;
use crate::host::{Host, HostError, HostRef};

/// Name the type is registered under in the guest
pub const TYPE_NAME: &str = "LispObject";

pub struct LispObject {
    host: Arc<dyn Host>,
    value: HostRef,
}

impl LispObject {
    /// Wrap and pin `value`. Fails if the handle is already stale.
    pub fn new(host: Arc<dyn Host>, value: HostRef) -> Result<Self, HostError> {
        host.pin(value)?;
        Ok(Self { host, value })
    }

    pub fn value(&self) -> HostRef {
        self.value
    }

    pub fn kind(&self) -> Result<&'static str, HostError> {
        self.host.type_of(self.value)
    }

    pub fn name(&self) -> Result<Option<String>, HostError> {
        self.host.symbol_name(self.value)
    }

    pub fn is_callable(&self) -> Result<bool, HostError> {
        self.host.is_callable(self.value)
    }

    /// Display form: `LispObject symbol: <name>` or `LispObject: '<printed>'`
    pub fn represent(&self) -> Result<String, HostError> {
        match self.name()? {
            Some(name) => Ok(format!("{} symbol: {}", TYPE_NAME, name)),
            None => Ok(format!("{}: '{}'", TYPE_NAME, self.host.prin1(self.value)?)),
        }
    }

    /// Call the wrapped value with no arguments and marshal the result
    pub fn invoke(&self) -> Result<Dynamic, BridgeError> {
        if !self.is_callable()? {
            return Err(HostError::NotCallable(self.host.prin1(self.value)?).into());
        }
        let result = self.host.funcall(self.value)?;
        marshal(&self.host, result)
    }
}

/// Convert a host value into a guest value.
///
/// Integers and strings cross as native values, `nil` becomes `()`, and
/// everything else is wrapped.
pub fn marshal(host: &Arc<dyn Host>, value: HostRef) -> Result<Dynamic, BridgeError> {
    if value == host.nil() {
        return Ok(Dynamic::UNIT);
    }
    if let Some(n) = host.integer_value(value)? {
        return Ok(Dynamic::from(n));
    }
    if let Some(s) = host.string_value(value)? {
        return Ok(Dynamic::from(s));
    }
    Ok(Dynamic::from(LispObject::new(Arc::clone(host), value)?))
}

impl Clone for LispObject {
    fn clone(&self) -> Self {
        // A live pin guarantees the slot is still valid
        if let Err(err) = self.host.pin(self.value) {
            tracing::warn!(%err, "failed to pin cloned wrapper");
        }
        Self {
            host: Arc::clone(&self.host),
            value: self.value,
        }
    }
}

impl Drop for LispObject {
    fn drop(&mut self) {
        self.host.unpin(self.value);
    }
}

impl fmt::Debug for LispObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(TYPE_NAME).field("value", &self.value).finish()
    }
}

pub(crate) fn guest_error(err: impl fmt::Display) -> Box<EvalAltResult> {
    err.to_string().into()
}

/// Register the `LispObject` type and its methods on `engine`
pub fn register(engine: &mut Engine) {
    engine.register_type_with_name::<LispObject>(TYPE_NAME);

    engine.register_fn(
        "to_string",
        |obj: &mut LispObject| -> Result<String, Box<EvalAltResult>> {
            obj.represent().map_err(guest_error)
        },
    );
    engine.register_fn(
        "to_debug",
        |obj: &mut LispObject| -> Result<String, Box<EvalAltResult>> {
            obj.represent().map_err(guest_error)
        },
    );

    engine.register_get(
        "kind",
        |obj: &mut LispObject| -> Result<String, Box<EvalAltResult>> {
            obj.kind().map(str::to_string).map_err(guest_error)
        },
    );
    engine.register_get(
        "name",
        |obj: &mut LispObject| -> Result<String, Box<EvalAltResult>> {
            obj.name().map(Option::unwrap_or_default).map_err(guest_error)
        },
    );
    engine.register_get(
        "is_symbol",
        |obj: &mut LispObject| -> Result<bool, Box<EvalAltResult>> {
            obj.name().map(|name| name.is_some()).map_err(guest_error)
        },
    );
    engine.register_get(
        "is_callable",
        |obj: &mut LispObject| -> Result<bool, Box<EvalAltResult>> {
            obj.is_callable().map_err(guest_error)
        },
    );

    engine.register_fn(
        "invoke",
        |obj: &mut LispObject| -> Result<Dynamic, Box<EvalAltResult>> {
            obj.invoke().map_err(guest_error)
        },
    );

    engine.register_fn("==", |a: &mut LispObject, b: LispObject| a.value == b.value);
    engine.register_fn("!=", |a: &mut LispObject, b: LispObject| a.value != b.value);
}
