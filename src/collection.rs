use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Stable handle to a level inside a [`LevelCollection`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u32);

impl LevelId {
    pub fn get(self) -> u32 {
        self.0
    }

    fn slot(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Node {
    level: Level,
    prev: Option<LevelId>,
    next: Option<LevelId>,
}

/// Ordered, bidirectionally navigable levels with a cursor.
///
/// Levels live in an arena; `prev`/`next` are ids, so removing a node can
/// only ever leave a vacant slot behind, never a dangling link.
#[derive(Debug, Clone, Default)]
pub struct LevelCollection {
    nodes: Vec<Option<Node>>,
    first: Option<LevelId>,
    current: Option<LevelId>,
    len: usize,
}

impl LevelCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first_id(&self) -> Option<LevelId> {
        self.first
    }

    pub fn last_id(&self) -> Option<LevelId> {
        let mut id = self.first?;
        while let Some(next) = self.node(id)?.next {
            id = next;
        }
        Some(id)
    }

    pub fn current_id(&self) -> Option<LevelId> {
        self.current
    }

    pub fn current(&self) -> Option<&Level> {
        self.get(self.current?)
    }

    pub fn current_mut(&mut self) -> Option<&mut Level> {
        let id = self.current?;
        self.get_mut(id)
    }

    pub fn get(&self, id: LevelId) -> Option<&Level> {
        self.node(id).map(|n| &n.level)
    }

    pub fn get_mut(&mut self, id: LevelId) -> Option<&mut Level> {
        self.nodes
            .get_mut(id.slot())
            .and_then(Option::as_mut)
            .map(|n| &mut n.level)
    }

    pub fn contains(&self, id: LevelId) -> bool {
        self.node(id).is_some()
    }

    pub fn next_of(&self, id: LevelId) -> Option<LevelId> {
        self.node(id)?.next
    }

    pub fn prev_of(&self, id: LevelId) -> Option<LevelId> {
        self.node(id)?.prev
    }

    pub fn has_next(&self) -> bool {
        self.current.and_then(|id| self.next_of(id)).is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.current.and_then(|id| self.prev_of(id)).is_some()
    }

    /// Moves the cursor to `id`. Returns false if `id` is not in the collection.
    pub fn select(&mut self, id: LevelId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.current = Some(id);
        true
    }

    /// Appends after the tail. The cursor only moves if the collection was empty.
    pub fn push_back(&mut self, level: Level) -> LevelId {
        match self.last_id() {
            Some(tail) => self.link(level, Some(tail), None),
            None => self.insert_into_empty(level),
        }
    }

    pub fn insert_before(&mut self, level: Level) -> LevelId {
        let Some(at) = self.current else {
            return self.insert_into_empty(level);
        };
        let prev = self.prev_of(at);
        self.link(level, prev, Some(at))
    }

    pub fn insert_after(&mut self, level: Level) -> LevelId {
        let Some(at) = self.current else {
            return self.insert_into_empty(level);
        };
        let next = self.next_of(at);
        self.link(level, Some(at), next)
    }

    /// Unlinks and returns the current level.
    ///
    /// The cursor lands on the old `next`, or the old `prev` when the tail was
    /// removed, or nowhere when the collection becomes empty.
    pub fn remove_current(&mut self) -> Option<Level> {
        let id = self.current?;
        let node = self.nodes.get_mut(id.slot())?.take()?;
        self.len -= 1;

        match (node.prev, node.next) {
            (None, None) => {
                self.first = None;
                self.current = None;
            }
            (None, Some(next)) => {
                self.set_prev(next, None);
                self.first = Some(next);
                self.current = Some(next);
            }
            (Some(prev), None) => {
                self.set_next(prev, None);
                self.current = Some(prev);
            }
            (Some(prev), Some(next)) => {
                self.set_next(prev, Some(next));
                self.set_prev(next, Some(prev));
                self.current = Some(next);
            }
        }
        Some(node.level)
    }

    /// Steps the cursor forward. No wraparound; returns whether it moved.
    pub fn next(&mut self) -> bool {
        match self.current.and_then(|id| self.next_of(id)) {
            Some(next) => {
                self.current = Some(next);
                true
            }
            None => false,
        }
    }

    pub fn prev(&mut self) -> bool {
        match self.current.and_then(|id| self.prev_of(id)) {
            Some(prev) => {
                self.current = Some(prev);
                true
            }
            None => false,
        }
    }

    /// Zero-based index of `id` counted from the head.
    pub fn position(&self, id: LevelId) -> Option<usize> {
        self.ids().position(|other| other == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = LevelId> + '_ {
        std::iter::successors(self.first, move |id| self.next_of(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> + '_ {
        self.ids().filter_map(move |id| self.get(id))
    }

    /// Walks `prev` links from the tail back to the head.
    pub fn iter_rev(&self) -> impl Iterator<Item = &Level> + '_ {
        std::iter::successors(self.last_id(), move |id| self.prev_of(*id))
            .filter_map(move |id| self.get(id))
    }

    fn node(&self, id: LevelId) -> Option<&Node> {
        self.nodes.get(id.slot()).and_then(Option::as_ref)
    }

    fn set_prev(&mut self, id: LevelId, prev: Option<LevelId>) {
        if let Some(Some(node)) = self.nodes.get_mut(id.slot()) {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, id: LevelId, next: Option<LevelId>) {
        if let Some(Some(node)) = self.nodes.get_mut(id.slot()) {
            node.next = next;
        }
    }

    fn insert_into_empty(&mut self, level: Level) -> LevelId {
        let id = self.link(level, None, None);
        self.current = Some(id);
        id
    }

    fn link(&mut self, level: Level, prev: Option<LevelId>, next: Option<LevelId>) -> LevelId {
        let id = LevelId(self.nodes.len() as u32);
        self.nodes.push(Some(Node { level, prev, next }));
        self.len += 1;
        match prev {
            Some(prev) => self.set_next(prev, Some(id)),
            None => self.first = Some(id),
        }
        if let Some(next) = next {
            self.set_prev(next, Some(id));
        }
        id
    }
}
