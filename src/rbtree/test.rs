use super::{debug_alloc, is_balanced, is_red, Node, RbTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Checks every structural invariant the tree promises: ordering, black
/// root, no red-red edges, uniform black-height, and consistent parent
/// back-references.
fn check_invariants<K: 'static + Ord, V: 'static>(tree: &RbTree<K, V>) {
    unsafe {
        assert!(!is_red(tree.root), "the root must be black");
        assert!(is_balanced(tree.root), "black-height differs between paths");
        check_order(tree.root, None, None);
        check_parent_links(tree.root, Node::null());
    }
}

unsafe fn check_order<K: Ord, V>(n: *mut Node<K, V>, lo: Option<&K>, hi: Option<&K>) {
    if n.is_null() {
        return;
    }
    let k = &(*n).key;
    if let Some(lo) = lo {
        assert!(k > lo, "left subtree key is not smaller than its ancestor");
    }
    if let Some(hi) = hi {
        assert!(k < hi, "right subtree key is not greater than its ancestor");
    }
    check_order((*n).left, lo, Some(k));
    check_order((*n).right, Some(k), hi);
}

unsafe fn check_parent_links<K, V>(n: *mut Node<K, V>, expected: *mut Node<K, V>) {
    if n.is_null() {
        return;
    }
    assert_eq!((*n).parent, expected, "parent back-reference out of sync");
    check_parent_links((*n).left, n);
    check_parent_links((*n).right, n);
}

unsafe fn height<K, V>(n: *const Node<K, V>) -> usize {
    if n.is_null() {
        0
    } else {
        1 + height((*n).left).max(height((*n).right))
    }
}

fn assert_height_bound<K: 'static + Ord, V: 'static>(tree: &RbTree<K, V>) {
    let h = unsafe { height(tree.root) } as f64;
    let bound = 2.0 * ((tree.len() + 1) as f64).log2();
    assert!(
        h <= bound + 1e-9,
        "height {} exceeds red-black bound {} for {} keys",
        h,
        bound,
        tree.len()
    );
}

#[test]
fn ascending_inserts_stay_balanced() {
    let mut tree = RbTree::<u64, u64>::new();

    for i in 0..2048u64 {
        tree.insert(i, i);
        check_invariants(&tree);
    }

    assert_eq!(tree.len(), 2048);
    assert_height_bound(&tree);
}

#[test]
fn descending_inserts_stay_balanced() {
    let mut tree = RbTree::<u64, u64>::new();

    for i in (0..2048u64).rev() {
        tree.insert(i, i);
        check_invariants(&tree);
    }

    assert_eq!(tree.len(), 2048);
    assert_height_bound(&tree);
}

#[test]
fn shuffled_inserts_stay_balanced() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut tree = RbTree::<u64, u64>::new();

    for _ in 0..4096 {
        let key = rng.gen_range(0..100_000u64);
        tree.insert(key, key);
    }

    check_invariants(&tree);
    assert_height_bound(&tree);
}

// An ascending run of a handful of keys already exercises the red-uncle
// recoloring and both the triangle and line rotations.
#[test]
fn short_ascending_run_is_height_balanced() {
    let mut tree = RbTree::<u8, ()>::new();

    for i in 0..10u8 {
        tree.insert(i, ());
        check_invariants(&tree);
    }

    let h = unsafe { height(tree.root) };
    assert!(h <= 6, "height {} for 10 keys", h);
}

#[test]
fn map_model_test() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut model: BTreeMap<u32, u32> = BTreeMap::new();
    let mut tree = RbTree::<u32, u32>::new();

    for i in 0..1000u32 {
        let key = rng.gen_range(0..500u32);
        model.insert(key, i);
        tree.insert(key, i);

        assert_eq!(tree.len(), model.len());
    }

    for (k, v) in model.iter() {
        assert_eq!(tree.get(k), Some(v));
    }
    assert_eq!(tree.get(&501), None);

    let flattened: Vec<_> = super::iterator::RbTreeIterator::new(&tree)
        .map(|(k, v)| (*k, *v))
        .collect();
    let expected: Vec<_> = model.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(flattened, expected);

    check_invariants(&tree);
}

#[test]
fn range_visit_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut model: BTreeMap<i64, i64> = BTreeMap::new();
    let mut tree = RbTree::<i64, i64>::new();

    for _ in 0..300 {
        let key = rng.gen_range(-100..100i64);
        model.insert(key, key * 10);
        tree.insert(key, key * 10);
    }

    for _ in 0..200 {
        let a = rng.gen_range(-120..120i64);
        let b = rng.gen_range(-120..120i64);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let mut visited = Vec::new();
        tree.for_each_in_range(&lo, &hi, |k, v| visited.push((*k, *v)));

        let expected: Vec<_> = model.range(lo..=hi).map(|(k, v)| (*k, *v)).collect();
        assert_eq!(visited, expected, "interval [{}, {}]", lo, hi);
    }

    // Full coverage and guaranteed-empty intervals.
    let mut all = Vec::new();
    tree.for_each_in_range(&i64::MIN, &i64::MAX, |k, _| all.push(*k));
    assert_eq!(all.len(), model.len());

    let mut none = Vec::new();
    tree.for_each_in_range(&1000, &2000, |k, _| none.push(*k));
    assert!(none.is_empty());
}

#[test]
fn inverted_range_visits_nothing() {
    let mut tree = RbTree::<i64, ()>::new();
    tree.insert(1, ());
    tree.insert(2, ());

    let mut visited = 0;
    tree.for_each_in_range(&5, &-5, |_, _| visited += 1);
    assert_eq!(visited, 0);
}

#[test]
fn insert_replaces_value_at_existing_key() {
    let mut tree = RbTree::<String, u32>::new();

    assert_eq!(tree.insert("a".into(), 1).0, None);
    assert_eq!(tree.insert("a".into(), 2).0, Some(1));
    assert_eq!(tree.get("a"), Some(&2));
    assert_eq!(tree.len(), 1);
}

#[test]
fn get_mut_updates_in_place() {
    let mut tree = RbTree::<u32, Vec<u32>>::new();
    tree.insert(7, vec![1]);

    tree.get_mut(&7).unwrap().push(2);
    assert_eq!(tree.get(&7), Some(&vec![1, 2]));
    assert_eq!(tree.get_mut(&8), None);
}

#[test]
fn entry_api() {
    let mut tree = RbTree::<u32, Vec<&'static str>>::new();

    tree.entry(5).or_default().push("A");
    tree.entry(5).or_default().push("B");
    tree.entry(9).or_insert_with(Vec::new).push("C");
    tree.entry(5).and_modify(|v| v.push("D"));

    assert_eq!(tree.get(&5), Some(&vec!["A", "B", "D"]));
    assert_eq!(tree.get(&9), Some(&vec!["C"]));
    assert_eq!(tree.len(), 2);

    match tree.entry(11) {
        super::entry::Entry::Vacant(e) => assert_eq!(e.into_key(), 11),
        super::entry::Entry::Occupied(_) => panic!("key 11 was never inserted"),
    }
}

#[test]
fn drop_frees_every_node() {
    {
        let mut tree = RbTree::<u64, u64>::new();
        for i in 0..512u64 {
            tree.insert(i, i);
        }
        assert_eq!(debug_alloc::count_allocated_pointers(), 512);
    }
    assert_eq!(debug_alloc::count_allocated_pointers(), 0);
}

#[test]
fn empty_tree() {
    let tree = RbTree::<u64, u64>::new();
    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.get(&0), None);

    let mut visited = 0;
    tree.for_each_in_range(&0, &100, |_, _| visited += 1);
    assert_eq!(visited, 0);
}
