//! Obarray: the host's global symbol table
//!
//! Each interned name maps to a symbol object in the heap plus its value and
//! function cells. Iteration order is the order of interning.

use std::collections::HashMap;

use super::HostRef;

#[derive(Debug, Clone)]
pub struct SymbolCell {
    pub symbol: HostRef,
    pub value: Option<HostRef>,
    pub function: Option<HostRef>,
}

#[derive(Debug, Default)]
pub struct Obarray {
    index: HashMap<String, usize>,
    entries: Vec<(String, SymbolCell)>,
}

impl Obarray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&SymbolCell> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SymbolCell> {
        self.index.get(name).map(|&i| &mut self.entries[i].1)
    }

    /// Insert a freshly allocated symbol object under `name`
    pub fn insert(&mut self, name: &str, symbol: HostRef) -> &mut SymbolCell {
        let i = self.entries.len();
        self.entries.push((
            name.to_string(),
            SymbolCell {
                symbol,
                value: None,
                function: None,
            },
        ));
        self.index.insert(name.to_string(), i);
        &mut self.entries[i].1
    }

    pub fn remove(&mut self, name: &str) -> Option<SymbolCell> {
        let i = self.index.remove(name)?;
        let (_, cell) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolCell)> {
        self.entries.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
