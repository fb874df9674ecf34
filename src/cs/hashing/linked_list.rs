//! # Doubly Linked List (arena)
//!
//! A doubly linked list of `(key, value)` pairs used as the chain of a
//! [separate-chaining](super::separate) bucket.
//!
//! Nodes live in a `Vec` and refer to each other by index (`prev`/`next`), so there is no
//! manual allocation to pair with deallocation and no `unsafe`. Removed nodes become vacant
//! slots threaded into a free list and are reused by later inserts.
//!
//! ```rust
//! use hashtables::cs::hashing::linked_list::DLinkedList;
//!
//! let mut list = DLinkedList::new();
//! list.push_back(("b", 2));
//! list.push_front(("a", 1));
//! list.insert(2, ("c", 3));
//! assert_eq!(list.find(&"b"), Some(&("b", 2)));
//! assert_eq!(list.remove(&"a"), Some(("a", 1)));
//! assert_eq!(list.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec!["b", "c"]);
//! ```

#[derive(Debug, Clone)]
struct Node<K, V> {
    entry: (K, V),
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    /// Vacant slot, linking to the next vacant one.
    Vacant(Option<usize>),
}

/// Arena-backed doubly linked list of `(K, V)` pairs.
#[derive(Debug, Clone)]
pub struct DLinkedList<K, V> {
    nodes: Vec<Slot<K, V>>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Option<usize>,
    len: usize,
}

impl<K, V> Default for DLinkedList<K, V> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            tail: None,
            free: None,
            len: 0,
        }
    }
}

impl<K, V> DLinkedList<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `entry` so that it ends up at position `pos` (clamped to `len`).
    pub fn insert(&mut self, pos: usize, entry: (K, V)) {
        if pos >= self.len {
            self.push_back(entry);
            return;
        }
        let Some(next) = self.index_at(pos) else {
            self.push_back(entry);
            return;
        };
        let prev = self.node(next).prev;
        let idx = self.alloc(Node {
            entry,
            prev,
            next: Some(next),
        });
        self.node_mut(next).prev = Some(idx);
        match prev {
            Some(p) => self.node_mut(p).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.len += 1;
    }

    pub fn push_front(&mut self, entry: (K, V)) {
        self.insert(0, entry);
    }

    pub fn push_back(&mut self, entry: (K, V)) {
        let prev = self.tail;
        let idx = self.alloc(Node {
            entry,
            prev,
            next: None,
        });
        match prev {
            Some(t) => self.node_mut(t).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
    }

    /// Removes and returns the first entry.
    pub fn pop_front(&mut self) -> Option<(K, V)> {
        let idx = self.head?;
        Some(self.unlink(idx))
    }

    /// Entry at position `pos`.
    pub fn get(&self, pos: usize) -> Option<&(K, V)> {
        self.index_at(pos).map(|i| &self.node(i).entry)
    }

    pub fn get_mut(&mut self, pos: usize) -> Option<&mut (K, V)> {
        let i = self.index_at(pos)?;
        Some(&mut self.node_mut(i).entry)
    }

    /// Removes all entries and releases the arena.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Front-to-back iterator; also iterates back-to-front via `rev()`.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Arena index of the node at `pos`, walking from whichever end is closer.
    fn index_at(&self, pos: usize) -> Option<usize> {
        if pos >= self.len {
            return None;
        }
        if pos <= self.len / 2 {
            let mut cur = self.head;
            for _ in 0..pos {
                cur = self.node(cur?).next;
            }
            cur
        } else {
            let mut cur = self.tail;
            for _ in 0..(self.len - 1 - pos) {
                cur = self.node(cur?).prev;
            }
            cur
        }
    }

    fn unlink(&mut self, idx: usize) -> (K, V) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
        self.release(idx)
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free {
            Some(i) => {
                match std::mem::replace(&mut self.nodes[i], Slot::Occupied(node)) {
                    Slot::Vacant(next_free) => self.free = next_free,
                    Slot::Occupied(_) => unreachable!("free list points at a live node"),
                }
                i
            }
            None => {
                self.nodes.push(Slot::Occupied(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> (K, V) {
        match std::mem::replace(&mut self.nodes[idx], Slot::Vacant(self.free)) {
            Slot::Occupied(node) => {
                self.free = Some(idx);
                node.entry
            }
            Slot::Vacant(_) => unreachable!("released a vacant slot"),
        }
    }

    fn node(&self, idx: usize) -> &Node<K, V> {
        match &self.nodes[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("link to a vacant slot"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        match &mut self.nodes[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("link to a vacant slot"),
        }
    }
}

impl<K: PartialEq, V> DLinkedList<K, V> {
    /// First entry whose key equals `key`.
    pub fn find(&self, key: &K) -> Option<&(K, V)> {
        self.find_index(key).map(|i| &self.node(i).entry)
    }

    pub fn find_mut(&mut self, key: &K) -> Option<&mut (K, V)> {
        let i = self.find_index(key)?;
        Some(&mut self.node_mut(i).entry)
    }

    /// Unlinks the first entry with `key`. `None` if there is none.
    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let i = self.find_index(key)?;
        Some(self.unlink(i))
    }

    fn find_index(&self, key: &K) -> Option<usize> {
        let mut cur = self.head;
        while let Some(i) = cur {
            let node = self.node(i);
            if node.entry.0 == *key {
                return Some(i);
            }
            cur = node.next;
        }
        None
    }
}

impl<K, V> FromIterator<(K, V)> for DLinkedList<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = DLinkedList::new();
        for entry in iter {
            list.push_back(entry);
        }
        list
    }
}

/// Borrowing iterator over a [`DLinkedList`].
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    list: &'a DLinkedList<K, V>,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.node(self.front?);
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.list.node(self.back?);
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.entry)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a DLinkedList<K, V> {
    type Item = &'a (K, V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &DLinkedList<i32, char>) -> Vec<i32> {
        list.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn insert_at_positions() {
        let mut list = DLinkedList::new();
        list.insert(0, (2, 'b'));
        list.insert(0, (1, 'a'));
        list.insert(2, (4, 'd'));
        list.insert(2, (3, 'c'));
        // past the end is clamped
        list.insert(100, (5, 'e'));
        assert_eq!(keys(&list), vec![1, 2, 3, 4, 5]);
        assert_eq!(list.len(), 5);
        assert_eq!(list.get(0), Some(&(1, 'a')));
        assert_eq!(list.get(3), Some(&(4, 'd')));
        assert_eq!(list.get(5), None);
    }

    #[test]
    fn find_and_remove() {
        let mut list: DLinkedList<i32, char> =
            vec![(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
        assert_eq!(list.find(&2), Some(&(2, 'b')));
        assert_eq!(list.find(&9), None);

        list.find_mut(&2).unwrap().1 = 'B';
        assert_eq!(list.remove(&2), Some((2, 'B')));
        assert_eq!(list.remove(&2), None);
        assert_eq!(keys(&list), vec![1, 3]);

        // head and tail removal keep links consistent
        assert_eq!(list.remove(&1), Some((1, 'a')));
        assert_eq!(list.remove(&3), Some((3, 'c')));
        assert!(list.is_empty());
        assert_eq!(list.iter().next(), None);
        list.push_back((7, 'g'));
        assert_eq!(keys(&list), vec![7]);
    }

    #[test]
    fn vacant_slots_are_reused() {
        let mut list: DLinkedList<i32, char> = (0..4).map(|i| (i, 'x')).collect();
        list.remove(&1);
        list.remove(&2);
        list.push_front((10, 'y'));
        list.push_back((11, 'z'));
        assert_eq!(list.nodes.len(), 4);
        assert_eq!(keys(&list), vec![10, 0, 3, 11]);
    }

    #[test]
    fn double_ended_iteration() {
        let mut list: DLinkedList<i32, char> = (1..=5).map(|i| (i, 'x')).collect();
        let rev: Vec<i32> = list.iter().rev().map(|(k, _)| *k).collect();
        assert_eq!(rev, vec![5, 4, 3, 2, 1]);

        let mut it = list.iter();
        assert_eq!(it.len(), 5);
        assert_eq!(it.next().map(|e| e.0), Some(1));
        assert_eq!(it.next_back().map(|e| e.0), Some(5));
        assert_eq!(it.len(), 3);
        assert_eq!(it.map(|e| e.0).collect::<Vec<_>>(), vec![2, 3, 4]);

        assert_eq!(list.get_mut(4).map(|e| e.0), Some(5));
        assert_eq!(list.pop_front(), Some((1, 'x')));
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.pop_front(), None);
    }
}
