//! Host-side values and the opaque handle the guest sees

use std::fmt;

/// Opaque reference to a value living in the host heap.
///
/// The handle owns nothing. It stays meaningful only while the slot it names
/// has not been reclaimed; a stale handle is detected by its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostRef {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<object {}.{}>", self.index, self.generation)
    }
}

/// Editor primitives reachable through `funcall`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subr {
    Point,
    PointMin,
    PointMax,
    BufferSize,
    BufferString,
    Mark,
    LineNumberAtPos,
}

impl Subr {
    pub const ALL: [Subr; 7] = [
        Subr::Point,
        Subr::PointMin,
        Subr::PointMax,
        Subr::BufferSize,
        Subr::BufferString,
        Subr::Mark,
        Subr::LineNumberAtPos,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Subr::Point => "point",
            Subr::PointMin => "point-min",
            Subr::PointMax => "point-max",
            Subr::BufferSize => "buffer-size",
            Subr::BufferString => "buffer-string",
            Subr::Mark => "mark",
            Subr::LineNumberAtPos => "line-number-at-pos",
        }
    }
}

/// A value stored in the host heap
#[derive(Debug, Clone, PartialEq)]
pub enum LispValue {
    Nil,
    T,
    Int(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    Marker(Option<usize>),
    Subr(Subr),
}

impl LispValue {
    /// Name reported by `type-of`
    pub fn type_name(&self) -> &'static str {
        match self {
            LispValue::Nil | LispValue::T | LispValue::Symbol(_) => "symbol",
            LispValue::Int(_) => "integer",
            LispValue::Float(_) => "float",
            LispValue::Str(_) => "string",
            LispValue::Marker(_) => "marker",
            LispValue::Subr(_) => "subr",
        }
    }

    pub fn symbol_name(&self) -> Option<&str> {
        match self {
            LispValue::Nil => Some("nil"),
            LispValue::T => Some("t"),
            LispValue::Symbol(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Readable printed representation, as `prin1` would produce it
    pub fn prin1(&self) -> String {
        match self {
            LispValue::Nil => "nil".to_string(),
            LispValue::T => "t".to_string(),
            LispValue::Int(n) => n.to_string(),
            LispValue::Float(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    format!("{:.1}", x)
                } else {
                    x.to_string()
                }
            }
            LispValue::Str(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
                out
            }
            LispValue::Symbol(name) => name.clone(),
            LispValue::Marker(Some(pos)) => format!("#<marker at {}>", pos),
            LispValue::Marker(None) => "#<marker in no buffer>".to_string(),
            LispValue::Subr(subr) => format!("#<subr {}>", subr.name()),
        }
    }
}
