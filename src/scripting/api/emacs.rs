//! emacs - host primitives, symbol dictionary and the wrapper constructor
//!
//! Usage in Rhai:
//! ```rhai
//! emacs::goto_char(emacs::point_max());
//! emacs::refresh();
//! emacs::symbol("fill-column").name
//! emacs::LispObject("buffer-string").invoke()
//! ```

use rhai::plugin::*;
use std::sync::Arc;

use crate::scripting::names;
use crate::scripting::namespace::NamespaceBridge;
use crate::scripting::wrapper::{LispObject, guest_error};

/// Create the bridging module backed by `bridge`
pub fn create_module(bridge: Arc<NamespaceBridge>) -> rhai::Module {
    let mut module = rhai::Module::new();

    // point() -> i64
    {
        let b = Arc::clone(&bridge);
        module.set_native_fn(
            "point",
            move || -> Result<i64, Box<EvalAltResult>> { Ok(b.host().point()) },
        );
    }

    // point_min() -> i64
    {
        let b = Arc::clone(&bridge);
        module.set_native_fn(
            "point_min",
            move || -> Result<i64, Box<EvalAltResult>> { Ok(b.host().point_min()) },
        );
    }

    // point_max() -> i64
    {
        let b = Arc::clone(&bridge);
        module.set_native_fn(
            "point_max",
            move || -> Result<i64, Box<EvalAltResult>> { Ok(b.host().point_max()) },
        );
    }

    // mark() -> i64 or ()
    {
        let b = Arc::clone(&bridge);
        module.set_native_fn(
            "mark",
            move || -> Result<Dynamic, Box<EvalAltResult>> {
                Ok(b.host().mark().map(Dynamic::from).unwrap_or(Dynamic::UNIT))
            },
        );
    }

    // goto_char(pos: i64) -> i64
    {
        let b = Arc::clone(&bridge);
        module.set_native_fn(
            "goto_char",
            move |pos: i64| -> Result<i64, Box<EvalAltResult>> { Ok(b.host().goto_char(pos)) },
        );
    }

    // set_mark(pos: i64) -> i64
    {
        let b = Arc::clone(&bridge);
        module.set_native_fn(
            "set_mark",
            move |pos: i64| -> Result<i64, Box<EvalAltResult>> { Ok(b.host().set_mark(pos)) },
        );
    }

    // refresh()
    {
        let b = Arc::clone(&bridge);
        module.set_native_fn("refresh", move || -> Result<(), Box<EvalAltResult>> {
            b.refresh_all();
            Ok(())
        });
    }

    // symbols() -> Map
    {
        let b = Arc::clone(&bridge);
        module.set_native_fn(
            "symbols",
            move || -> Result<rhai::Map, Box<EvalAltResult>> { Ok(b.to_map()) },
        );
    }

    // symbol(name: &str) -> LispObject or ()
    {
        let b = Arc::clone(&bridge);
        module.set_native_fn(
            "symbol",
            move |name: &str| -> Result<Dynamic, Box<EvalAltResult>> {
                Ok(b.get(name).map(Dynamic::from).unwrap_or(Dynamic::UNIT))
            },
        );
    }

    // LispObject(name: &str) -> LispObject
    {
        let b = Arc::clone(&bridge);
        module.set_native_fn(
            "LispObject",
            move |name: &str| -> Result<LispObject, Box<EvalAltResult>> {
                let host = Arc::clone(b.host());
                let symbol = host.intern(name);
                LispObject::new(host, symbol).map_err(guest_error)
            },
        );
    }

    // guest_name(name: &str) -> String
    module.set_native_fn(
        "guest_name",
        |name: &str| -> Result<String, Box<EvalAltResult>> { Ok(names::guest_name(name)) },
    );

    // host_name(name: &str) -> String
    module.set_native_fn(
        "host_name",
        |name: &str| -> Result<String, Box<EvalAltResult>> { Ok(names::host_name(name)) },
    );

    module
}
