use super::{Node, RbTree};
use std::marker::PhantomData;

/// An iterator over key-values in a RbTree.
pub struct RbTreeIterator<'tree, K: 'static + Ord, V: 'static> {
    visit: *mut Node<K, V>,
    stack: Vec<*mut Node<K, V>>,
    remaining_elements: usize,
    lifetime: PhantomData<&'tree RbTree<K, V>>,
}

impl<'tree, K: 'static + Ord, V: 'static> RbTreeIterator<'tree, K, V> {
    pub fn new(tree: &'tree RbTree<K, V>) -> Self {
        Self {
            visit: tree.root,
            stack: Vec::with_capacity(8),
            remaining_elements: tree.len(),
            lifetime: PhantomData,
        }
    }
}

impl<'tree, K: 'static + Ord, V: 'static> Iterator for RbTreeIterator<'tree, K, V> {
    type Item = (&'tree K, &'tree V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            while !self.visit.is_null() {
                self.stack.push(self.visit);
                self.visit = (*self.visit).left;
            }

            if let Some(node) = self.stack.pop() {
                self.visit = (*node).right;
                self.remaining_elements -= 1;
                return Some((&(*node).key, &(*node).value));
            }

            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining_elements, Some(self.remaining_elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_visit_all_in_order() {
        let mut tree = RbTree::<u8, u8>::new();

        for i in 0..250u8 {
            tree.insert(i, i);
        }

        let iter = RbTreeIterator::new(&tree);

        let mut expected = 0u8;

        for (k, v) in iter {
            assert_eq!(k, &expected);
            assert_eq!(v, &expected);
            expected += 1;
        }

        assert_eq!(expected, 250);
    }

    #[test]
    fn size_hint_tracks_remaining() {
        let mut tree = RbTree::<u32, ()>::new();
        for i in 0..10u32 {
            tree.insert(i, ());
        }

        let mut iter = RbTreeIterator::new(&tree);
        assert_eq!(iter.size_hint(), (10, Some(10)));
        iter.next();
        assert_eq!(iter.size_hint(), (9, Some(9)));
    }
}
