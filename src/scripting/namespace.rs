//! Namespace bridge: installs host symbols into the guest
//!
//! `refresh_all` walks the host obarray and installs one [`LispObject`] per
//! symbol in the bridging module's dictionary, keyed by the printable name.
//! The walk is best effort: each symbol succeeds or fails on its own, and a
//! failure never aborts the rest of the refresh.
//!
//! Entries for symbols that disappeared from the host are not pruned. They
//! stay pinned and therefore valid; a later refresh simply never touches them.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rhai::{Dynamic, Map};

use super::names;
use super::wrapper::LispObject;
use crate::diagnostics::Diagnostics;
use crate::error::BridgeError;
use crate::host::{Host, HostRef};

/// Per-symbol outcome of one walk over the obarray
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub entries: Vec<(String, Result<LispObject, BridgeError>)>,
    pub skipped: usize,
}

impl RefreshReport {
    pub fn installed(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &BridgeError)> {
        self.entries
            .iter()
            .filter_map(|(name, r)| r.as_ref().err().map(|e| (name.as_str(), e)))
    }
}

pub struct NamespaceBridge {
    host: Arc<dyn Host>,
    reserved_name: String,
    dictionary: RwLock<BTreeMap<String, LispObject>>,
    diagnostics: Diagnostics,
}

impl NamespaceBridge {
    pub fn new(host: Arc<dyn Host>, reserved_name: &str, diagnostics: Diagnostics) -> Self {
        Self {
            host,
            reserved_name: reserved_name.to_string(),
            dictionary: RwLock::new(BTreeMap::new()),
            diagnostics,
        }
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    fn wrap_symbol(&self, symbol: HostRef) -> Result<(String, LispObject), (String, BridgeError)> {
        let name = match self.host.symbol_name(symbol) {
            Ok(Some(name)) => name,
            Ok(None) => {
                let found = self.host.type_of(symbol).unwrap_or("unknown");
                return Err((
                    symbol.to_string(),
                    BridgeError::WrongType {
                        expected: "symbol",
                        found,
                    },
                ));
            }
            Err(err) => return Err((symbol.to_string(), err.into())),
        };
        match LispObject::new(Arc::clone(&self.host), symbol) {
            Ok(obj) => Ok((name, obj)),
            Err(err) => Err((name, err.into())),
        }
    }

    /// Wrap every host symbol except the reserved one, without installing
    /// anything. The caller decides what to do with failures.
    pub(crate) fn scan(&self) -> RefreshReport {
        let mut report = RefreshReport::default();
        for symbol in self.host.global_symbols() {
            match self.wrap_symbol(symbol) {
                Ok((name, _)) if name == self.reserved_name => report.skipped += 1,
                Ok((name, obj)) => report.entries.push((name, Ok(obj))),
                Err((name, err)) => report.entries.push((name, Err(err))),
            }
        }
        report
    }

    /// Install the successful entries of `report`. Last write wins.
    pub(crate) fn install(&self, report: &RefreshReport) -> usize {
        let mut dictionary = self.dictionary.write();
        let mut installed = 0;
        for (name, result) in &report.entries {
            if let Ok(obj) = result {
                dictionary.insert(name.clone(), obj.clone());
                installed += 1;
            }
        }
        installed
    }

    /// Scan, install what succeeded, and log what failed.
    ///
    /// Callers must hold the execution claim.
    pub(crate) fn refresh_all(&self) -> RefreshReport {
        let report = self.scan();
        let installed = self.install(&report);
        for (name, err) in report.failures() {
            self.diagnostics
                .record("installing symbol", format!("{}: {}", name, err));
        }
        tracing::debug!(
            installed,
            skipped = report.skipped,
            failed = report.entries.len() - installed,
            "refreshed host symbols"
        );
        report
    }

    /// Look up an installed symbol by host name or translated guest name
    pub fn get(&self, name: &str) -> Option<LispObject> {
        let dictionary = self.dictionary.read();
        dictionary
            .get(name)
            .or_else(|| dictionary.get(&names::host_name(name)))
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dictionary.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.dictionary.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.dictionary.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.read().is_empty()
    }

    /// Snapshot of the dictionary as a guest object map
    pub fn to_map(&self) -> Map {
        self.dictionary
            .read()
            .iter()
            .map(|(name, obj)| (name.as_str().into(), Dynamic::from(obj.clone())))
            .collect()
    }

    /// Drop every installed wrapper, releasing their pins
    pub(crate) fn clear(&self) {
        self.dictionary.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Editor, LispValue};

    fn bridge() -> (Arc<Editor>, NamespaceBridge, Diagnostics) {
        let editor = Arc::new(Editor::new());
        let diagnostics = Diagnostics::new(16);
        let host: Arc<dyn Host> = editor.clone();
        let bridge = NamespaceBridge::new(host, "refresh", diagnostics.clone());
        (editor, bridge, diagnostics)
    }

    #[test]
    fn refresh_installs_every_symbol_but_reserved() {
        let (editor, bridge, diagnostics) = bridge();
        editor.intern("refresh");
        editor.set_variable("user-name", LispValue::Str("ada".into()));

        let report = bridge.refresh_all();

        assert_eq!(report.skipped, 1);
        assert_eq!(bridge.len(), editor.symbol_count() - 1);
        assert!(bridge.contains("user-name"));
        assert!(bridge.contains("fill-column"));
        assert!(!bridge.contains("refresh"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn refresh_twice_is_idempotent() {
        let (editor, bridge, _) = bridge();
        bridge.refresh_all();
        let first = bridge.names();
        bridge.refresh_all();
        assert_eq!(bridge.names(), first);

        // Only the dictionary holds pins after the reports are dropped
        let point = editor.intern("point");
        assert_eq!(editor.pin_count(point), 1);
    }

    #[test]
    fn removed_symbols_are_left_orphaned() {
        let (editor, bridge, _) = bridge();
        editor.intern("short-lived");
        bridge.refresh_all();

        editor.unintern("short-lived");
        editor.collect();
        bridge.refresh_all();

        let orphan = bridge.get("short-lived").unwrap();
        assert_eq!(orphan.represent().unwrap(), "LispObject symbol: short-lived");
    }

    #[test]
    fn get_accepts_guest_names() {
        let (_, bridge, _) = bridge();
        bridge.refresh_all();
        let obj = bridge.get("buffer_file_name").unwrap();
        assert_eq!(obj.name().unwrap().as_deref(), Some("buffer-file-name"));
        assert!(bridge.get("no_such_symbol").is_none());
    }

    #[test]
    fn scan_does_not_install() {
        let (_, bridge, _) = bridge();
        let report = bridge.scan();
        assert!(report.installed() > 0);
        assert!(bridge.is_empty());
    }

    #[test]
    fn map_snapshot_uses_printable_names() {
        let (_, bridge, _) = bridge();
        bridge.refresh_all();
        let map = bridge.to_map();
        assert!(map.contains_key("fill-column"));
        assert!(map["fill-column"].is::<LispObject>());
    }

    #[test]
    fn clear_releases_pins() {
        let (editor, bridge, _) = bridge();
        bridge.refresh_all();
        bridge.clear();
        assert_eq!(editor.pin_count(editor.intern("point")), 0);
    }
}
