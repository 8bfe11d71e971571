use crate::{PostingError, Result};

/// Handle into a [`SlotArena`].
///
/// The handle carries the generation of the slot it was issued for, so it stops
/// resolving as soon as that slot is freed, even if the slot is reused later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: u32,
    generation: u32,
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Growable slot storage with a free list of indices.
///
/// Not thread safe: one arena serves one query.
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn alloc(&mut self, value: T) -> SlotId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return SlotId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        SlotId {
            index,
            generation: 0,
        }
    }

    pub fn free(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn try_get(&self, id: SlotId) -> Result<&T> {
        self.get(id).ok_or(PostingError::StaleHandle)
    }

    pub fn try_get_mut(&mut self, id: SlotId) -> Result<&mut T> {
        self.get_mut(id).ok_or(PostingError::StaleHandle)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::SlotArena;

    #[test]
    fn test_alloc_and_free() {
        let mut arena = SlotArena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&1));
        assert_eq!(arena.get(b), Some(&2));

        assert_eq!(arena.free(a), Some(1));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.free(a), None);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_reused_slot_rejects_old_handle() {
        let mut arena = SlotArena::new();
        let a = arena.alloc("first");
        arena.free(a);
        let b = arena.alloc("second");
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert!(arena.try_get(a).is_err());
        assert_eq!(arena.get(b), Some(&"second"));
        *arena.get_mut(b).unwrap() = "third";
        assert_eq!(arena.try_get(b).unwrap(), &"third");
    }
}
