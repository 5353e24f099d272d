//! This file contains a low-level RbTree implementation. The tree is a classic
//! red-black tree: children are exclusively owned links, the parent is a
//! non-owning back-reference used only during the insertion fixup.
//!
//! It is not recommend to use the [`RbTree`] directly since it is a low level data structure
//! and does only provide basic functionalities. Instead we advise you to look at the
//! [crate::index] module.

use std::borrow::Borrow;
use std::cmp::Ordering::{Equal, Greater, Less};
#[cfg(test)]
use std::fmt;

#[cfg(test)]
pub(crate) mod debug_alloc;

pub mod entry;
pub mod iterator;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

// 1. All leaves are black.
// 2. Children of a red node are black.
// 3. Every path from a node goes through the same number of black
//    nodes.
struct Node<K, V> {
    key: K,
    value: V,
    left: *mut Node<K, V>,
    right: *mut Node<K, V>,
    /// Non-owning back-reference, only followed by the insertion fixup.
    parent: *mut Node<K, V>,
    color: Color,
}

impl<K: 'static + Ord, V: 'static> Node<K, V> {
    #[allow(clippy::let_and_return)]
    fn new(key: K, value: V) -> *mut Self {
        let node = Box::into_raw(Box::new(Self {
            key,
            value,
            left: Node::null(),
            right: Node::null(),
            parent: Node::null(),
            color: Color::Red,
        }));

        #[cfg(test)]
        debug_alloc::mark_pointer_allocated(node);

        node
    }

    fn null() -> *mut Self {
        std::ptr::null::<Self>() as *mut Node<K, V>
    }

    unsafe fn delete(n: *mut Self) {
        if n.is_null() {
            return;
        }
        Self::delete((*n).left);
        Self::delete((*n).right);
        drop(Box::from_raw(n));

        #[cfg(test)]
        debug_alloc::mark_pointer_deleted(n);
    }
}

/// An ordered map from difficulty-style keys to values, implemented as a
/// mutable red-black tree with the insertion fixup described in CLRS.
pub struct RbTree<K: 'static + Ord, V: 'static> {
    len: usize,
    root: *mut Node<K, V>,
}

impl<K: 'static + Ord, V: 'static> Drop for RbTree<K, V> {
    fn drop(&mut self) {
        unsafe {
            Node::delete(self.root);
        }
    }
}

impl<K: 'static + Ord, V: 'static> Default for RbTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: 'static + Ord, V: 'static> RbTree<K, V> {
    #[inline]
    pub fn new() -> Self {
        Self {
            len: 0,
            root: Node::null(),
        }
    }

    /// Number of distinct keys in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }

    pub fn entry(&mut self, key: K) -> entry::Entry<K, V> {
        let node = unsafe { self.get_node(&key) };

        if node.is_null() {
            entry::Entry::Vacant(entry::VacantEntry { map: self, key })
        } else {
            entry::Entry::Occupied(entry::OccupiedEntry {
                key,
                node,
                lifetime: std::marker::PhantomData,
            })
        }
    }

    #[inline]
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        unsafe {
            let mut root = self.root;
            while !root.is_null() {
                match key.cmp((*root).key.borrow()) {
                    Equal => return Some(&(*root).value),
                    Less => root = (*root).left,
                    Greater => root = (*root).right,
                }
            }
            None
        }
    }

    /// Returns a mutable reference to the value corresponding to the key.
    #[inline]
    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord,
    {
        unsafe {
            let mut root = self.root;
            while !root.is_null() {
                match key.cmp((*root).key.borrow()) {
                    Equal => return Some(&mut (*root).value),
                    Less => root = (*root).left,
                    Greater => root = (*root).right,
                }
            }
            None
        }
    }

    #[inline]
    unsafe fn get_node(&self, key: &K) -> *mut Node<K, V> {
        let mut root = self.root;
        while !root.is_null() {
            match key.cmp(&(*root).key) {
                Equal => return root,
                Less => root = (*root).left,
                Greater => root = (*root).right,
            }
        }
        Node::null()
    }

    /// Inserts a key-value entry into the map. If the key is already present
    /// the value is replaced in place and the previous value is returned; a
    /// new key allocates a single red node and rebalances.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> (Option<V>, &mut V) {
        unsafe {
            let mut parent = Node::null();
            let mut cursor = self.root;
            let mut went_left = false;

            while !cursor.is_null() {
                match key.cmp(&(*cursor).key) {
                    Equal => {
                        let old = std::mem::replace(&mut (*cursor).value, value);
                        return (Some(old), &mut (*cursor).value);
                    }
                    Less => {
                        parent = cursor;
                        went_left = true;
                        cursor = (*cursor).left;
                    }
                    Greater => {
                        parent = cursor;
                        went_left = false;
                        cursor = (*cursor).right;
                    }
                }
            }

            let node = Node::new(key, value);
            (*node).parent = parent;
            if parent.is_null() {
                self.root = node;
            } else if went_left {
                (*parent).left = node;
            } else {
                (*parent).right = node;
            }

            self.insert_fixup(node);
            self.len += 1;

            #[cfg(test)]
            debug_assert!(
                is_balanced(self.root),
                "the tree is not balanced:\n{:?}",
                DebugView(self.root)
            );
            #[cfg(test)]
            debug_assert!(!has_dangling_pointers(self.root));

            (None, &mut (*node).value)
        }
    }

    /// Restores the coloring invariants after `z` was linked in as a red
    /// leaf. Re-entered after every recoloring step until the violation is
    /// resolved; each rotation terminates the loop on the next check.
    unsafe fn insert_fixup(&mut self, mut z: *mut Node<K, V>) {
        while is_red((*z).parent) {
            let parent = (*z).parent;
            // A red parent is never the root, so the grandparent exists.
            let grandparent = (*parent).parent;
            debug_assert!(!grandparent.is_null());

            if parent == (*grandparent).left {
                let uncle = (*grandparent).right;
                if is_red(uncle) {
                    // Red uncle: push the violation up the tree.
                    (*parent).color = Color::Black;
                    (*uncle).color = Color::Black;
                    (*grandparent).color = Color::Red;
                    z = grandparent;
                } else {
                    if z == (*parent).right {
                        // Triangle: straighten it into a line first.
                        z = parent;
                        self.rotate_left(z);
                    }
                    let parent = (*z).parent;
                    let grandparent = (*parent).parent;
                    (*parent).color = Color::Black;
                    (*grandparent).color = Color::Red;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = (*grandparent).left;
                if is_red(uncle) {
                    (*parent).color = Color::Black;
                    (*uncle).color = Color::Black;
                    (*grandparent).color = Color::Red;
                    z = grandparent;
                } else {
                    if z == (*parent).left {
                        z = parent;
                        self.rotate_right(z);
                    }
                    let parent = (*z).parent;
                    let grandparent = (*parent).parent;
                    (*parent).color = Color::Black;
                    (*grandparent).color = Color::Red;
                    self.rotate_left(grandparent);
                }
            }
        }

        (*self.root).color = Color::Black;
    }

    unsafe fn rotate_left(&mut self, x: *mut Node<K, V>) {
        debug_assert!(!x.is_null());
        let y = (*x).right;
        debug_assert!(!y.is_null());

        (*x).right = (*y).left;
        if !(*y).left.is_null() {
            (*(*y).left).parent = x;
        }
        (*y).parent = (*x).parent;
        if (*x).parent.is_null() {
            self.root = y;
        } else if x == (*(*x).parent).left {
            (*(*x).parent).left = y;
        } else {
            (*(*x).parent).right = y;
        }
        (*y).left = x;
        (*x).parent = y;
    }

    unsafe fn rotate_right(&mut self, x: *mut Node<K, V>) {
        debug_assert!(!x.is_null());
        let y = (*x).left;
        debug_assert!(!y.is_null());

        (*x).left = (*y).right;
        if !(*y).right.is_null() {
            (*(*y).right).parent = x;
        }
        (*y).parent = (*x).parent;
        if (*x).parent.is_null() {
            self.root = y;
        } else if x == (*(*x).parent).right {
            (*(*x).parent).right = y;
        } else {
            (*(*x).parent).left = y;
        }
        (*y).right = x;
        (*x).parent = y;
    }

    /// Visits every entry whose key lies in the closed interval `[lo, hi]`,
    /// in ascending key order. Subtrees that cannot intersect the interval
    /// are pruned, so the visit costs O(log n + m) instead of a full scan.
    pub fn for_each_in_range<'a, F>(&'a self, lo: &K, hi: &K, mut f: F)
    where
        F: FnMut(&'a K, &'a V),
    {
        unsafe fn visit<'a, K, V, F>(n: *mut Node<K, V>, lo: &K, hi: &K, f: &mut F)
        where
            F: FnMut(&'a K, &'a V),
            K: 'static + Ord,
            V: 'static,
        {
            if n.is_null() {
                return;
            }
            let k = &(*n).key;
            match (lo.cmp(k), k.cmp(hi)) {
                // The node and its whole left subtree sit below the interval.
                (Greater, _) => visit((*n).right, lo, hi, f),
                // The node and its whole right subtree sit above the interval.
                (_, Greater) => visit((*n).left, lo, hi, f),
                _ => {
                    visit((*n).left, lo, hi, f);
                    (*f)(k, &(*n).value);
                    visit((*n).right, lo, hi, f);
                }
            }
        }

        if lo > hi {
            return;
        }
        unsafe { visit(self.root, lo, hi, &mut f) }
    }
}

// helper functions
unsafe fn is_red<K, V>(x: *const Node<K, V>) -> bool {
    if x.is_null() {
        false
    } else {
        (*x).color == Color::Red
    }
}

#[cfg(test)]
unsafe fn is_balanced<K, V>(root: *mut Node<K, V>) -> bool {
    unsafe fn go<K, V>(node: *mut Node<K, V>, mut num_black: usize) -> bool {
        if node.is_null() {
            return num_black == 0;
        }
        if !is_red(node) {
            debug_assert!(num_black > 0);
            num_black -= 1;
        } else {
            assert!(!is_red((*node).left));
            assert!(!is_red((*node).right));
        }
        go((*node).left, num_black) && go((*node).right, num_black)
    }

    if is_red(root) {
        return false;
    }

    let mut num_black = 0;
    let mut x = root;
    while !x.is_null() {
        if !is_red(x) {
            num_black += 1;
        }
        x = (*x).left;
    }
    go(root, num_black)
}

#[cfg(test)]
unsafe fn has_dangling_pointers<K, V>(root: *mut Node<K, V>) -> bool {
    if root.is_null() {
        return false;
    }

    !debug_alloc::is_live(root)
        || has_dangling_pointers((*root).left)
        || has_dangling_pointers((*root).right)
}

#[cfg(test)]
struct DebugView<K, V>(*const Node<K, V>);

#[cfg(test)]
impl<K, V> fmt::Debug for DebugView<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        unsafe fn go<K, V>(
            f: &mut fmt::Formatter<'_>,
            h: *const Node<K, V>,
            offset: usize,
        ) -> fmt::Result {
            if h.is_null() {
                writeln!(f, "{:width$}[B] <null>", "", width = offset)
            } else {
                writeln!(
                    f,
                    "{:width$}[{}] {:p}",
                    "",
                    if is_red(h) { "R" } else { "B" },
                    h,
                    width = offset
                )?;
                go(f, (*h).left, offset + 2)?;
                go(f, (*h).right, offset + 2)
            }
        }
        unsafe { go(f, self.0, 0) }
    }
}

#[cfg(test)]
mod test;
