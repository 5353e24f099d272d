//! The difficulty-keyed problem index. Maps a numeric difficulty score to the
//! ordered list of problems inserted at that score and answers exact and
//! windowed lookups.

use crate::rbtree::iterator::RbTreeIterator;
use crate::rbtree::RbTree;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Debug, Formatter};
use std::iter::FromIterator;
use std::marker::PhantomData;

/// An ordered index from difficulty score to problem payloads.
///
/// Multiple problems may share a difficulty; they accumulate on a single tree
/// node in insertion order and are returned together on lookup. The index is
/// single-threaded and synchronous; callers sharing it across threads must
/// wrap it in their own lock.
///
/// # Example
///
/// ```
/// use difficulty_index::DifficultyIndex;
///
/// let mut index = DifficultyIndex::new();
/// index.insert(5, "Easy Array Sum");
/// index.insert(10, "Medium String Reversal");
/// index.insert(7, "Medium-Easy Palindrome Check");
///
/// assert_eq!(index.range_query(8, 2), vec![&"Medium-Easy Palindrome Check", &"Medium String Reversal"]);
/// ```
pub struct DifficultyIndex<P: 'static> {
    tree: RbTree<i64, Vec<P>>,
    problems: usize,
}

impl<P: 'static> Default for DifficultyIndex<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static> DifficultyIndex<P> {
    #[inline]
    pub fn new() -> Self {
        Self {
            tree: RbTree::new(),
            problems: 0,
        }
    }

    /// Returns `true` if the index does not contain any problems.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.problems == 0
    }

    /// Total number of problems in the index, counting duplicates of a
    /// difficulty individually.
    #[inline]
    pub fn len(&self) -> usize {
        self.problems
    }

    /// Number of distinct difficulty levels.
    #[inline]
    pub fn levels(&self) -> usize {
        self.tree.len()
    }

    /// Clear the index.
    #[inline]
    pub fn clear(&mut self) {
        self.tree = RbTree::new();
        self.problems = 0;
    }

    /// Insert a problem at the given difficulty. Problems inserted at an
    /// already-present difficulty are appended to that level's list; nothing
    /// is overwritten or merged.
    pub fn insert(&mut self, difficulty: i64, problem: P) {
        self.tree.entry(difficulty).or_default().push(problem);
        self.problems += 1;
    }

    /// All problems at exactly the given difficulty, in insertion order.
    /// A difficulty nobody inserted at is a normal empty result.
    #[inline]
    pub fn search(&self, difficulty: i64) -> &[P] {
        self.tree
            .get(&difficulty)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All problems whose difficulty lies in `[target - offset, target + offset]`,
    /// grouped by difficulty in ascending order, insertion order within a
    /// level. A negative offset describes an empty interval and yields an
    /// empty result. Only subtrees that can intersect the interval are
    /// visited.
    pub fn range_query(&self, target: i64, offset: i64) -> Vec<&P> {
        if offset < 0 {
            return Vec::new();
        }

        let lo = target.saturating_sub(offset);
        let hi = target.saturating_add(offset);

        let mut out = Vec::new();
        self.tree
            .for_each_in_range(&lo, &hi, |_, problems| out.extend(problems.iter()));
        out
    }

    /// Removes every problem at the given difficulty matching the predicate
    /// and returns how many were removed. The difficulty level itself stays
    /// in the tree even when its list drains empty, so no rebalancing takes
    /// place.
    pub fn remove_where<F>(&mut self, difficulty: i64, mut predicate: F) -> usize
    where
        F: FnMut(&P) -> bool,
    {
        match self.tree.get_mut(&difficulty) {
            Some(problems) => {
                let before = problems.len();
                problems.retain(|p| !predicate(p));
                let removed = before - problems.len();
                self.problems -= removed;
                removed
            }
            None => 0,
        }
    }

    /// Return an iterator over `(difficulty, problems)` pairs in ascending
    /// difficulty order.
    #[inline]
    pub fn iter(&self) -> RbTreeIterator<i64, Vec<P>> {
        RbTreeIterator::new(&self.tree)
    }

    /// Return the underlying [`RbTree`] for this index.
    #[inline]
    pub fn as_tree(&self) -> &RbTree<i64, Vec<P>> {
        &self.tree
    }
}

impl<P: 'static> AsRef<RbTree<i64, Vec<P>>> for DifficultyIndex<P> {
    #[inline]
    fn as_ref(&self) -> &RbTree<i64, Vec<P>> {
        &self.tree
    }
}

impl<P: 'static> FromIterator<(i64, P)> for DifficultyIndex<P> {
    fn from_iter<I: IntoIterator<Item = (i64, P)>>(iter: I) -> Self {
        let mut result = DifficultyIndex::new();

        for (difficulty, problem) in iter {
            result.insert(difficulty, problem);
        }

        result
    }
}

impl<P: 'static + Debug> Debug for DifficultyIndex<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<P: 'static> Serialize for DifficultyIndex<P>
where
    P: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_map(Some(self.levels()))?;

        for (difficulty, problems) in self.iter() {
            s.serialize_entry(difficulty, problems)?;
        }

        s.end()
    }
}

impl<'de, P: 'static> Deserialize<'de> for DifficultyIndex<P>
where
    P: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(IndexVisitor(PhantomData))
    }
}

struct IndexVisitor<P>(PhantomData<P>);

impl<'de, P: 'static> Visitor<'de> for IndexVisitor<P>
where
    P: Deserialize<'de>,
{
    type Value = DifficultyIndex<P>;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        write!(formatter, "expected a map of difficulty to problem lists")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut result = DifficultyIndex::new();

        while let Some((difficulty, problems)) = map.next_entry::<i64, Vec<P>>()? {
            for problem in problems {
                result.insert(difficulty, problem);
            }
        }

        Ok(result)
    }
}
