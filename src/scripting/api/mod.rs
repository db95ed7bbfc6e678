//! API modules exposed to guest code
//!
//! Each submodule builds one static module registered on the engine.

pub mod emacs;
