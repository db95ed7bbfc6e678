//! In-process reference host: one buffer, an obarray and a small heap

use std::collections::HashSet;
use std::path::PathBuf;

use parking_lot::RwLock;

use super::heap::Heap;
use super::obarray::Obarray;
use super::{Buffer, Host, HostError, HostRef, LispValue, Subr};

struct EditorState {
    heap: Heap,
    obarray: Obarray,
    buffer: Buffer,
    nil: HostRef,
}

impl EditorState {
    fn new(buffer: Buffer) -> Self {
        let mut heap = Heap::new();
        let mut obarray = Obarray::new();

        let nil = heap.alloc(LispValue::Nil);
        obarray.insert("nil", nil).value = Some(nil);
        let t = heap.alloc(LispValue::T);
        obarray.insert("t", t).value = Some(t);

        let mut state = Self {
            heap,
            obarray,
            buffer,
            nil,
        };

        for subr in Subr::ALL {
            let function = state.heap.alloc(LispValue::Subr(subr));
            state.intern(subr.name());
            if let Some(cell) = state.obarray.get_mut(subr.name()) {
                cell.function = Some(function);
            }
        }

        state.set_variable("fill-column", LispValue::Int(70));
        state.set_variable("tab-width", LispValue::Int(8));
        let file_name = match state.buffer.filepath() {
            Some(path) => LispValue::Str(path.display().to_string()),
            None => LispValue::Nil,
        };
        state.set_variable("buffer-file-name", file_name);

        state
    }

    fn intern(&mut self, name: &str) -> HostRef {
        if let Some(cell) = self.obarray.get(name) {
            return cell.symbol;
        }
        let symbol = self.heap.alloc(LispValue::Symbol(name.to_string()));
        self.obarray.insert(name, symbol);
        symbol
    }

    fn set_variable(&mut self, name: &str, value: LispValue) -> HostRef {
        let value = match value {
            LispValue::Nil => self.nil,
            other => self.heap.alloc(other),
        };
        self.intern(name);
        if let Some(cell) = self.obarray.get_mut(name) {
            cell.value = Some(value);
        }
        value
    }

    fn resolve_function(&self, function: HostRef) -> Result<Subr, HostError> {
        match self.heap.get(function)? {
            LispValue::Subr(subr) => Ok(*subr),
            value => {
                let Some(name) = value.symbol_name() else {
                    return Err(HostError::NotCallable(value.prin1()));
                };
                let cell = self
                    .obarray
                    .get(name)
                    .and_then(|cell| cell.function)
                    .ok_or_else(|| HostError::Void(name.to_string()))?;
                match self.heap.get(cell)? {
                    LispValue::Subr(subr) => Ok(*subr),
                    other => Err(HostError::NotCallable(other.prin1())),
                }
            }
        }
    }

    fn call_subr(&mut self, subr: Subr) -> HostRef {
        let result = match subr {
            Subr::Point => LispValue::Int(self.buffer.point() as i64),
            Subr::PointMin => LispValue::Int(self.buffer.point_min() as i64),
            Subr::PointMax => LispValue::Int(self.buffer.point_max() as i64),
            Subr::BufferSize => LispValue::Int(self.buffer.size() as i64),
            Subr::BufferString => LispValue::Str(self.buffer.contents()),
            Subr::Mark => match self.buffer.mark() {
                Some(mark) => LispValue::Int(mark as i64),
                None => return self.nil,
            },
            Subr::LineNumberAtPos => {
                LispValue::Int(self.buffer.line_number_at(self.buffer.point()) as i64)
            }
        };
        self.heap.alloc(result)
    }

    fn roots(&self) -> HashSet<HostRef> {
        let mut roots = HashSet::new();
        roots.insert(self.nil);
        for (_, cell) in self.obarray.iter() {
            roots.insert(cell.symbol);
            roots.extend(cell.value);
            roots.extend(cell.function);
        }
        roots
    }
}

/// Reference [`Host`] implementation.
///
/// All state sits behind one lock, so the editor can be shared with the bridge
/// as `Arc<Editor>`.
pub struct Editor {
    state: RwLock<EditorState>,
}

impl Editor {
    pub fn new() -> Self {
        Self::with_buffer(Buffer::new())
    }

    pub fn with_text(text: &str) -> Self {
        Self::with_buffer(Buffer::from_text(text))
    }

    pub fn open(path: PathBuf) -> std::io::Result<Self> {
        Ok(Self::with_buffer(Buffer::from_file(path)?))
    }

    pub fn with_buffer(buffer: Buffer) -> Self {
        Self {
            state: RwLock::new(EditorState::new(buffer)),
        }
    }

    /// Bind `name` as a global variable, interning it if needed
    pub fn set_variable(&self, name: &str, value: LispValue) -> HostRef {
        self.state.write().set_variable(name, value)
    }

    pub fn symbol_value(&self, name: &str) -> Option<LispValue> {
        let state = self.state.read();
        let cell = state.obarray.get(name)?.value?;
        state.heap.get(cell).ok().cloned()
    }

    /// Remove `name` from the obarray. The symbol object itself survives until
    /// the next collection, or longer if it is pinned.
    pub fn unintern(&self, name: &str) -> bool {
        self.state.write().obarray.remove(name).is_some()
    }

    pub fn symbol_count(&self) -> usize {
        self.state.read().obarray.len()
    }

    /// Run a collection. Returns the number of reclaimed objects.
    pub fn collect(&self) -> usize {
        let mut state = self.state.write();
        let roots = state.roots();
        state.heap.collect(&roots)
    }

    pub fn is_live(&self, value: HostRef) -> bool {
        self.state.read().heap.is_live(value)
    }

    pub fn pin_count(&self, value: HostRef) -> usize {
        self.state.read().heap.pin_count(value)
    }

    pub fn live_objects(&self) -> usize {
        self.state.read().heap.live_count()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for Editor {
    fn global_symbols(&self) -> Vec<HostRef> {
        self.state
            .read()
            .obarray
            .iter()
            .map(|(_, cell)| cell.symbol)
            .collect()
    }

    fn intern(&self, name: &str) -> HostRef {
        self.state.write().intern(name)
    }

    fn nil(&self) -> HostRef {
        self.state.read().nil
    }

    fn make_string(&self, s: &str) -> HostRef {
        self.state.write().heap.alloc(LispValue::Str(s.to_string()))
    }

    fn type_of(&self, value: HostRef) -> Result<&'static str, HostError> {
        Ok(self.state.read().heap.get(value)?.type_name())
    }

    fn symbol_name(&self, value: HostRef) -> Result<Option<String>, HostError> {
        Ok(self
            .state
            .read()
            .heap
            .get(value)?
            .symbol_name()
            .map(str::to_string))
    }

    fn string_value(&self, value: HostRef) -> Result<Option<String>, HostError> {
        match self.state.read().heap.get(value)? {
            LispValue::Str(s) => Ok(Some(s.clone())),
            _ => Ok(None),
        }
    }

    fn integer_value(&self, value: HostRef) -> Result<Option<i64>, HostError> {
        match self.state.read().heap.get(value)? {
            LispValue::Int(n) => Ok(Some(*n)),
            _ => Ok(None),
        }
    }

    fn prin1(&self, value: HostRef) -> Result<String, HostError> {
        Ok(self.state.read().heap.get(value)?.prin1())
    }

    fn pin(&self, value: HostRef) -> Result<(), HostError> {
        self.state.write().heap.pin(value)
    }

    fn unpin(&self, value: HostRef) {
        self.state.write().heap.unpin(value);
    }

    fn is_callable(&self, value: HostRef) -> Result<bool, HostError> {
        let state = self.state.read();
        match state.resolve_function(value) {
            Ok(_) => Ok(true),
            Err(HostError::Reclaimed(handle)) => Err(HostError::Reclaimed(handle)),
            Err(_) => Ok(false),
        }
    }

    fn funcall(&self, function: HostRef) -> Result<HostRef, HostError> {
        let mut state = self.state.write();
        let subr = state.resolve_function(function)?;
        Ok(state.call_subr(subr))
    }

    fn point(&self) -> i64 {
        self.state.read().buffer.point() as i64
    }

    fn point_min(&self) -> i64 {
        self.state.read().buffer.point_min() as i64
    }

    fn point_max(&self) -> i64 {
        self.state.read().buffer.point_max() as i64
    }

    fn mark(&self) -> Option<i64> {
        self.state.read().buffer.mark().map(|m| m as i64)
    }

    fn goto_char(&self, pos: i64) -> i64 {
        self.state.write().buffer.goto_char(pos) as i64
    }

    fn set_mark(&self, pos: i64) -> i64 {
        self.state.write().buffer.set_mark(pos) as i64
    }
}
