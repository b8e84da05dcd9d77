// Licensed under the Apache-2.0 license

//! Doubly linked circular lists over a fixed pool of links.
//!
//! Every node, including a list head, is a slot in a [`Links`] pool and is
//! named by its [`NodeId`]. An owner that embeds a node (a timer, for example)
//! uses the same index for its own table, so the link identity *is* the owner's
//! identity and no pointer arithmetic is needed to get from one to the other.
//!
//! A head is a sentinel: structurally identical to a member node, initialised
//! to point at itself. A member node belongs to exactly one list, or is
//! detached with both links cleared after [`Links::delete`].
//!
//! All operations are O(1) and nothing is allocated. `delete` is not
//! idempotent: deleting a detached node is a fatal error, so callers track
//! membership themselves (see [`Links::is_linked`]).

use core::ops::ControlFlow;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u16);

impl NodeId {
    #[must_use]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Link {
    next: Option<NodeId>,
    prev: Option<NodeId>,
}

impl Link {
    const DETACHED: Self = Self {
        next: None,
        prev: None,
    };
}

/// Pool of `N` list links.
#[derive(Clone, Debug)]
pub struct Links<const N: usize> {
    nodes: [Link; N],
}

impl<const N: usize> Default for Links<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Links<N> {
    /// A pool with every node detached.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: [Link::DETACHED; N],
        }
    }

    /// A pool with `head` initialised as an empty list and every other node
    /// detached.
    #[must_use]
    #[allow(clippy::indexing_slicing)]
    pub const fn with_head(head: NodeId) -> Self {
        assert!(head.index() < N, "list head outside pool");
        let mut nodes = [Link::DETACHED; N];
        nodes[head.index()] = Link {
            next: Some(head),
            prev: Some(head),
        };
        Self { nodes }
    }

    /// Number of nodes in the pool.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    fn link(&self, id: NodeId) -> &Link {
        match self.nodes.get(id.index()) {
            Some(link) => link,
            None => panic!("list node {} outside pool of {}", id.0, N),
        }
    }

    fn link_mut(&mut self, id: NodeId) -> &mut Link {
        match self.nodes.get_mut(id.index()) {
            Some(link) => link,
            None => panic!("list node {} outside pool of {}", id.0, N),
        }
    }

    fn next_of(&self, id: NodeId) -> NodeId {
        match self.link(id).next {
            Some(next) => next,
            None => panic!("list node {} is not linked", id.0),
        }
    }

    fn prev_of(&self, id: NodeId) -> NodeId {
        match self.link(id).prev {
            Some(prev) => prev,
            None => panic!("list node {} is not linked", id.0),
        }
    }

    /// Initialise `head` as an empty list.
    pub fn init_head(&mut self, head: NodeId) {
        *self.link_mut(head) = Link {
            next: Some(head),
            prev: Some(head),
        };
    }

    /// True if `head` has no members.
    #[must_use]
    pub fn is_empty(&self, head: NodeId) -> bool {
        self.next_of(head) == head
    }

    /// True if `node` is currently part of some list (or a head).
    #[must_use]
    pub fn is_linked(&self, node: NodeId) -> bool {
        self.link(node).next.is_some()
    }

    /// Link `node` directly after `anchor`.
    pub fn add_after(&mut self, anchor: NodeId, node: NodeId) {
        let next = self.next_of(anchor);
        self.link_mut(next).prev = Some(node);
        *self.link_mut(node) = Link {
            next: Some(next),
            prev: Some(anchor),
        };
        self.link_mut(anchor).next = Some(node);
    }

    /// Link `node` directly before `anchor`.
    ///
    /// With `anchor` a head this appends at the tail.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        let prev = self.prev_of(anchor);
        self.link_mut(prev).next = Some(node);
        *self.link_mut(node) = Link {
            next: Some(anchor),
            prev: Some(prev),
        };
        self.link_mut(anchor).prev = Some(node);
    }

    /// Unlink `node` and clear both of its links.
    ///
    /// # Panics
    ///
    /// Panics if `node` is already detached.
    pub fn delete(&mut self, node: NodeId) {
        let next = self.next_of(node);
        let prev = self.prev_of(node);
        self.link_mut(prev).next = Some(next);
        self.link_mut(next).prev = Some(prev);
        *self.link_mut(node) = Link::DETACHED;
    }

    /// First member of the list, without removing it.
    #[must_use]
    pub fn first(&self, head: NodeId) -> Option<NodeId> {
        let next = self.next_of(head);
        (next != head).then_some(next)
    }

    /// Last member of the list, without removing it.
    #[must_use]
    pub fn last(&self, head: NodeId) -> Option<NodeId> {
        let prev = self.prev_of(head);
        (prev != head).then_some(prev)
    }

    /// Remove and return the first member.
    pub fn pop_first(&mut self, head: NodeId) -> Option<NodeId> {
        let node = self.first(head)?;
        self.delete(node);
        Some(node)
    }

    /// Remove and return the last member.
    pub fn pop_last(&mut self, head: NodeId) -> Option<NodeId> {
        let node = self.last(head)?;
        self.delete(node);
        Some(node)
    }

    // stack

    pub fn push(&mut self, head: NodeId, node: NodeId) {
        self.insert_before(head, node);
    }

    pub fn pop(&mut self, head: NodeId) -> Option<NodeId> {
        self.pop_last(head)
    }

    #[must_use]
    pub fn top(&self, head: NodeId) -> Option<NodeId> {
        self.last(head)
    }

    // FIFO queue

    pub fn enqueue(&mut self, head: NodeId, node: NodeId) {
        self.insert_before(head, node);
    }

    pub fn dequeue(&mut self, head: NodeId) -> Option<NodeId> {
        self.pop_first(head)
    }

    /// Members of the list from first to last.
    ///
    /// The list must not change while the iterator is alive; use
    /// [`Links::for_each_safe`] to unlink nodes during a walk.
    #[must_use]
    pub fn iter(&self, head: NodeId) -> Iter<'_, N> {
        Iter {
            links: self,
            head,
            cursor: self.next_of(head),
        }
    }

    /// Visit each member, tolerating removal of the visited node.
    ///
    /// The successor is captured before `f` runs, so `f` may delete the node
    /// it was handed. Returning `ControlFlow::Break` ends the walk early.
    pub fn for_each_safe<F>(&mut self, head: NodeId, mut f: F)
    where
        F: FnMut(&mut Self, NodeId) -> ControlFlow<()>,
    {
        let mut item = self.next_of(head);
        while item != head {
            let next = self.next_of(item);
            if f(self, item).is_break() {
                break;
            }
            item = next;
        }
    }
}

pub struct Iter<'a, const N: usize> {
    links: &'a Links<N>,
    head: NodeId,
    cursor: NodeId,
}

impl<const N: usize> Iterator for Iter<'_, N> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.cursor == self.head {
            return None;
        }
        let item = self.cursor;
        self.cursor = self.links.next_of(item);
        Some(item)
    }
}
