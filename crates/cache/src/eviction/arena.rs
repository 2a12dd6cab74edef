//! Slot arena backing the recency list
//!
//! Entries live in a contiguous `Vec` and link to each other through slot
//! indices. Freed slots are recycled through a free list, so the list never
//! holds pointers and never reallocates nodes.

/// Sentinel for "no slot"
pub(crate) const NIL: usize = usize::MAX;

struct Node<V> {
    key: String,
    value: V,
    prev: usize,
    next: usize,
}

enum Slot<V> {
    Occupied(Node<V>),
    Free { next_free: usize },
}

/// Doubly-linked list stored in an arena. Head is the most recently used end.
pub(crate) struct RecencyList<V> {
    slots: Vec<Slot<V>>,
    head: usize,
    tail: usize,
    free_head: usize,
    len: usize,
}

impl<V> RecencyList<V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: NIL,
            tail: NIL,
            free_head: NIL,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Least recently used slot, if any
    pub(crate) fn tail(&self) -> Option<usize> {
        (self.tail != NIL).then_some(self.tail)
    }

    /// Insert a new entry at the head and return its slot
    pub(crate) fn push_front(&mut self, key: String, value: V) -> usize {
        let node = Node {
            key,
            value,
            prev: NIL,
            next: self.head,
        };

        let idx = if self.free_head != NIL {
            let idx = self.free_head;
            if let Slot::Free { next_free } = self.slots[idx] {
                self.free_head = next_free;
            }
            self.slots[idx] = Slot::Occupied(node);
            idx
        } else {
            self.slots.push(Slot::Occupied(node));
            self.slots.len() - 1
        };

        if self.head != NIL {
            self.node_mut(self.head).prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
        self.len += 1;
        idx
    }

    /// Move an occupied slot to the head
    pub(crate) fn move_to_front(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);

        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head != NIL {
            self.node_mut(old_head).prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    /// Unlink and free a slot, handing back its key and value
    pub(crate) fn remove(&mut self, idx: usize) -> (String, V) {
        self.unlink(idx);
        let slot = std::mem::replace(
            &mut self.slots[idx],
            Slot::Free {
                next_free: self.free_head,
            },
        );
        self.free_head = idx;
        self.len -= 1;

        match slot {
            Slot::Occupied(node) => (node.key, node.value),
            Slot::Free { .. } => unreachable!("removed a free slot"),
        }
    }

    #[cfg(test)]
    pub(crate) fn key(&self, idx: usize) -> &str {
        &self.node(idx).key
    }

    pub(crate) fn value(&self, idx: usize) -> &V {
        &self.node(idx).value
    }

    pub(crate) fn replace_value(&mut self, idx: usize, value: V) -> V {
        std::mem::replace(&mut self.node_mut(idx).value, value)
    }

    /// Keys from most to least recently used
    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            if cursor == NIL {
                return None;
            }
            let node = self.node(cursor);
            cursor = node.next;
            Some(node.key.as_str())
        })
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.head = NIL;
        self.tail = NIL;
        self.free_head = NIL;
        self.len = 0;
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };

        if prev != NIL {
            self.node_mut(prev).next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.node_mut(next).prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn node(&self, idx: usize) -> &Node<V> {
        match &self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => unreachable!("slot {idx} is free"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<V> {
        match &mut self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => unreachable!("slot {idx} is free"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(list: &RecencyList<u32>) -> Vec<String> {
        list.keys().map(str::to_string).collect()
    }

    #[test]
    fn test_push_and_move() {
        let mut list = RecencyList::new();
        let a = list.push_front("a".to_string(), 1);
        list.push_front("b".to_string(), 2);
        list.push_front("c".to_string(), 3);
        assert_eq!(order(&list), vec!["c", "b", "a"]);

        list.move_to_front(a);
        assert_eq!(order(&list), vec!["a", "c", "b"]);
        assert_eq!(list.key(list.tail().unwrap()), "b");
    }

    #[test]
    fn test_free_slots_are_reused() {
        let mut list = RecencyList::new();
        let a = list.push_front("a".to_string(), 1);
        list.push_front("b".to_string(), 2);

        let (key, value) = list.remove(a);
        assert_eq!((key.as_str(), value), ("a", 1));
        assert_eq!(list.len(), 1);

        let c = list.push_front("c".to_string(), 3);
        assert_eq!(c, a);
        assert_eq!(order(&list), vec!["c", "b"]);
    }

    #[test]
    fn test_remove_only_entry() {
        let mut list = RecencyList::new();
        let a = list.push_front("a".to_string(), 1);
        list.remove(a);
        assert_eq!(list.len(), 0);
        assert!(list.tail().is_none());
        assert_eq!(order(&list), Vec::<String>::new());
    }
}
