use std::ops::{Index, IndexMut};

use crate::engine::label::Label;

/// Handle into a [`LabelArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub(crate) u32);

impl LabelId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Bump allocator for labels.
///
/// Labels are only ever created, never freed individually; a search that
/// finishes (or aborts) resets the whole arena at once. Predecessor links
/// between labels are [`LabelId`] handles, which keeps labels `Copy` and
/// sidesteps any ownership cycles.
#[derive(Debug)]
pub struct LabelArena {
    labels: Vec<Label>,
    capacity: usize,
}

impl LabelArena {
    /// `capacity` is the logical label cap; memory is grown on demand.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            labels: Vec::new(),
            capacity,
        }
    }

    pub fn alloc(&mut self, label: Label) -> LabelId {
        debug_assert!(self.labels.len() < u32::MAX as usize);
        let id = LabelId(self.labels.len() as u32);
        self.labels.push(label);
        id
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.labels.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops all labels but keeps the allocation for the next search.
    pub fn reset(&mut self) {
        self.labels.clear();
    }
}

impl Index<LabelId> for LabelArena {
    type Output = Label;

    fn index(&self, id: LabelId) -> &Label {
        &self.labels[id.index()]
    }
}

impl IndexMut<LabelId> for LabelArena {
    fn index_mut(&mut self, id: LabelId) -> &mut Label {
        &mut self.labels[id.index()]
    }
}
