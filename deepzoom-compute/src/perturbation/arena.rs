use super::Approximation;
use std::ops::Index;

/// Handle of an [`Approximation`] inside an [`ApproxArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ApproxId(pub usize);

/// Stack-like storage for the approximations of one worker.
///
/// Tiles push their approximation on entry and truncate back on exit, so
/// the arena never holds more than one chain of the quadtree at a time.
#[derive(Debug, Default)]
pub struct ApproxArena {
    items: Vec<Approximation>,
}

impl ApproxArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, approximation: Approximation) -> ApproxId {
        self.items.push(approximation);
        ApproxId(self.items.len() - 1)
    }

    pub fn get(&self, id: ApproxId) -> Option<&Approximation> {
        self.items.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every approximation pushed after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Follow `original` links back to the approximation the chain started from.
    pub fn relocation_chain(&self, id: ApproxId) -> Vec<ApproxId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(previous) = self.get(current).and_then(|a| a.original) {
            chain.push(previous);
            current = previous;
        }
        chain
    }
}

impl Index<ApproxId> for ApproxArena {
    type Output = Approximation;

    fn index(&self, id: ApproxId) -> &Approximation {
        &self.items[id.0]
    }
}
