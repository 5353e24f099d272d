//! Test-only bookkeeping of every node pointer handed out by the tree, so
//! tests can assert that no node leaks and no freed node is still reachable.

use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
    static LIVE_POINTERS: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

pub(crate) fn mark_pointer_allocated<T>(ptr: *mut T) {
    LIVE_POINTERS.with(|live| {
        let inserted = live.borrow_mut().insert(ptr as usize);
        assert!(inserted, "pointer {:p} allocated twice", ptr);
    });
}

pub(crate) fn mark_pointer_deleted<T>(ptr: *mut T) {
    LIVE_POINTERS.with(|live| {
        let removed = live.borrow_mut().remove(&(ptr as usize));
        assert!(removed, "pointer {:p} freed twice", ptr);
    });
}

pub(crate) fn is_live<T>(ptr: *mut T) -> bool {
    LIVE_POINTERS.with(|live| live.borrow().contains(&(ptr as usize)))
}

pub(crate) fn count_allocated_pointers() -> usize {
    LIVE_POINTERS.with(|live| live.borrow().len())
}
