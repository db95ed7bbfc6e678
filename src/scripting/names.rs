//! Symbol-name translation between host names and guest identifiers
//!
//! Host symbol names may contain almost any character (`fill-column`,
//! `*scratch*`, `1+`). Guest identifiers are `[A-Za-z_][A-Za-z0-9_]*`.
//!
//! Mapping: ASCII alphanumerics and `_` pass through, `-` becomes `_`, any
//! other char becomes `_u<hex>_`, and a leading digit gets a `_` prefix.
//! `host_name` undoes this exactly for every host name that contains no `_`
//! and no `-u<hex>-` run that would read back as an escape.

use std::fmt::Write;

pub fn guest_name(host: &str) -> String {
    let mut out = String::with_capacity(host.len());
    if host.starts_with(|c: char| c.is_ascii_digit()) {
        out.push('_');
    }
    for c in host.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => out.push(c),
            '-' => out.push('_'),
            other => {
                let _ = write!(out, "_u{:x}_", other as u32);
            }
        }
    }
    out
}

pub fn host_name(guest: &str) -> String {
    let chars: Vec<char> = guest.chars().collect();
    let mut out = String::with_capacity(guest.len());

    // A `_` prefix before a digit was added by `guest_name`
    let mut i = match chars.as_slice() {
        ['_', d, ..] if d.is_ascii_digit() => 1,
        _ => 0,
    };

    while i < chars.len() {
        if chars[i] == '_' {
            if let Some((decoded, next)) = decode_escape(&chars, i) {
                out.push(decoded);
                i = next;
                continue;
            }
            out.push('-');
        } else {
            out.push(chars[i]);
        }
        i += 1;
    }
    out
}

/// Decode `_u<hex>_` starting at `start`; returns the char and the index after it
fn decode_escape(chars: &[char], start: usize) -> Option<(char, usize)> {
    if chars.get(start + 1) != Some(&'u') {
        return None;
    }
    let digits_start = start + 2;
    let len = chars[digits_start..]
        .iter()
        .take_while(|c| c.is_ascii_hexdigit())
        .count();
    let end = digits_start + len;
    if len == 0 || chars.get(end) != Some(&'_') {
        return None;
    }
    let hex: String = chars[digits_start..end].iter().collect();
    let code = u32::from_str_radix(&hex, 16).ok()?;
    let decoded = char::from_u32(code)?;
    // Only chars that `guest_name` escapes are valid escapes
    if decoded.is_ascii_alphanumeric() || decoded == '_' || decoded == '-' {
        return None;
    }
    Some((decoded, end + 1))
}
