//! Generational object heap with pin counts
//!
//! Slots are reused after collection; every reuse bumps the slot generation so
//! that handles issued for the previous occupant are recognised as stale.

use std::collections::HashSet;

use super::{HostError, HostRef, LispValue};

#[derive(Debug)]
struct Slot {
    generation: u32,
    value: Option<LispValue>,
    pins: usize,
}

#[derive(Debug, Default)]
pub struct Heap {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, value: LispValue) -> HostRef {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.value = Some(value);
            slot.pins = 0;
            return HostRef {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
            pins: 0,
        });
        HostRef {
            index,
            generation: 0,
        }
    }

    fn slot(&self, handle: HostRef) -> Result<&Slot, HostError> {
        match self.slots.get(handle.index as usize) {
            Some(slot) if slot.generation == handle.generation && slot.value.is_some() => Ok(slot),
            _ => Err(HostError::Reclaimed(handle)),
        }
    }

    fn slot_mut(&mut self, handle: HostRef) -> Result<&mut Slot, HostError> {
        match self.slots.get_mut(handle.index as usize) {
            Some(slot) if slot.generation == handle.generation && slot.value.is_some() => Ok(slot),
            _ => Err(HostError::Reclaimed(handle)),
        }
    }

    pub fn get(&self, handle: HostRef) -> Result<&LispValue, HostError> {
        self.slot(handle)
            .and_then(|slot| slot.value.as_ref().ok_or(HostError::Reclaimed(handle)))
    }

    pub fn is_live(&self, handle: HostRef) -> bool {
        self.slot(handle).is_ok()
    }

    pub fn pin(&mut self, handle: HostRef) -> Result<(), HostError> {
        self.slot_mut(handle)?.pins += 1;
        Ok(())
    }

    /// Unpinning a stale handle is a no-op
    pub fn unpin(&mut self, handle: HostRef) {
        if let Ok(slot) = self.slot_mut(handle) {
            slot.pins = slot.pins.saturating_sub(1);
        }
    }

    pub fn pin_count(&self, handle: HostRef) -> usize {
        self.slot(handle).map(|slot| slot.pins).unwrap_or(0)
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value.is_some()).count()
    }

    /// Reclaim every slot that is neither pinned nor in `roots`.
    /// Returns the number of reclaimed slots.
    pub fn collect(&mut self, roots: &HashSet<HostRef>) -> usize {
        let mut reclaimed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.is_none() || slot.pins > 0 {
                continue;
            }
            let handle = HostRef {
                index: index as u32,
                generation: slot.generation,
            };
            if roots.contains(&handle) {
                continue;
            }
            slot.value = None;
            self.free.push(index as u32);
            reclaimed += 1;
        }
        reclaimed
    }
}
