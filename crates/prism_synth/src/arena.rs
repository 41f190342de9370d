//! Dense, ID-indexed storage for decision diagram nodes.
//!
//! Nodes are only ever appended. Subtrees dropped by a join stay allocated
//! but unreachable until the whole diagram is dropped.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Trait for opaque ID types used as arena keys.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw `u32` index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw `u32` index.
    fn as_raw(self) -> u32;
}

/// Opaque, copyable ID for a node of the decision diagram.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(u32);

impl ArenaId for NodeId {
    fn from_raw(index: u32) -> Self {
        Self(index)
    }

    fn as_raw(self) -> u32 {
        self.0
    }
}

/// A dense container addressed by [`ArenaId`] keys.
#[derive(Debug, Clone)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Allocates a new item and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Returns the number of items ever allocated.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing was allocated yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }
}
