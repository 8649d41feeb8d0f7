use std::cmp::Ordering;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::balanced::{BalancedTree, NodeId, TreeValue};

/// A named half-open interval [start, finish) on an integer timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub start: i64,
    pub finish: i64,
}

impl Event {
    pub fn new(name: impl Into<String>, start: i64, finish: i64) -> Self {
        Self {
            name: name.into(),
            start,
            finish,
        }
    }

    /// Half-open containment: `start <= t < finish`.
    pub fn contains(&self, t: i64) -> bool {
        self.start <= t && t < self.finish
    }
}

impl TreeValue for Event {
    type Max = i64;

    // Composite key: two events collide only when all three fields match,
    // which is exactly the duplicate the tree rejects. Events sharing a
    // start time coexist as distinct nodes.
    fn tree_cmp(&self, other: &Self) -> Ordering {
        (self.start, self.finish, self.name.as_str()).cmp(&(
            other.start,
            other.finish,
            other.name.as_str(),
        ))
    }

    fn measure(&self) -> i64 {
        self.finish
    }
}

/// Effective max-finish overrides for one query. `None` means the subtree
/// has no unreported finish left to offer.
type ShadowMax = FxHashMap<NodeId, Option<i64>>;

/// Interval tree over events: a [`BalancedTree`] whose subtree maximum is
/// the greatest finish time, plus a multi-result point-overlap query that
/// never mutates the tree.
#[derive(Debug)]
pub struct IntervalIndex {
    tree: BalancedTree<Event>,
}

impl IntervalIndex {
    /// Creates an index holding its first event.
    pub fn new(event: Event) -> Self {
        Self {
            tree: BalancedTree::new(event),
        }
    }

    /// Inserts an event. An exact (start, finish, name) duplicate is a
    /// silent no-op and returns `false`.
    pub fn insert(&mut self, event: Event) -> bool {
        self.tree.insert(event)
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Stored events in ascending (start, finish, name) order.
    pub fn events_in_order(&self) -> Vec<&Event> {
        self.tree.values_in_order()
    }

    /// Every stored event whose interval contains `t`, each exactly once,
    /// in ascending key order.
    ///
    /// Repeated single-hit descents are pruned by the shadow-max table: a
    /// query-local overlay giving already-reported nodes an effective
    /// max-finish that excludes their own contribution and that of reported
    /// descendants. The overlay is discarded on return; the persistent
    /// augmentation is never touched.
    pub fn query(&self, t: i64) -> Vec<&Event> {
        let mut shadow = ShadowMax::default();
        let mut found: FxHashSet<NodeId> = FxHashSet::default();
        let mut hits = Vec::new();
        while let Some(id) = self.find_one(self.tree.root(), t, &shadow, &found) {
            found.insert(id);
            self.mask(id, &mut shadow, &found);
            hits.push(self.tree.value(id));
        }
        hits
    }

    /// Overlay entry if present, stored subtree max otherwise.
    fn effective_max(&self, id: NodeId, shadow: &ShadowMax) -> Option<i64> {
        match shadow.get(&id) {
            Some(&masked) => masked,
            None => Some(self.tree.subtree_max(id)),
        }
    }

    // One pruned descent for the next unreported hit. Left first, so hits
    // come out in ascending key order; a left subtree whose effective max
    // cannot clear `t` is skipped entirely.
    fn find_one(
        &self,
        id: NodeId,
        t: i64,
        shadow: &ShadowMax,
        found: &FxHashSet<NodeId>,
    ) -> Option<NodeId> {
        if let Some(l) = self.tree.left(id)
            && self.effective_max(l, shadow).is_some_and(|m| m > t)
            && let Some(hit) = self.find_one(l, t, shadow, found)
        {
            return Some(hit);
        }
        if self.tree.value(id).contains(t) && !found.contains(&id) {
            return Some(id);
        }
        self.tree
            .right(id)
            .and_then(|r| self.find_one(r, t, shadow, found))
    }

    // After reporting `id`: its own entry keeps only its children's
    // contributions, and every ancestor re-derives from its children plus
    // its own finish, unless the ancestor has itself been reported. Walks
    // bottom-up so each parent sees the fresh entry below it.
    fn mask(&self, id: NodeId, shadow: &mut ShadowMax, found: &FxHashSet<NodeId>) {
        shadow.insert(id, self.children_max(id, shadow));
        let mut cur = self.tree.parent(id);
        while let Some(a) = cur {
            let mut eff = self.children_max(a, shadow);
            if !found.contains(&a) {
                eff = eff.max(Some(self.tree.value(a).finish));
            }
            shadow.insert(a, eff);
            cur = self.tree.parent(a);
        }
    }

    fn children_max(&self, id: NodeId, shadow: &ShadowMax) -> Option<i64> {
        let l = self.tree.left(id).and_then(|c| self.effective_max(c, shadow));
        let r = self
            .tree
            .right(id)
            .and_then(|c| self.effective_max(c, shadow));
        l.max(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(events: &[(&str, i64, i64)]) -> IntervalIndex {
        let mut it = events.iter();
        let &(name, start, finish) = it.next().unwrap();
        let mut index = IntervalIndex::new(Event::new(name, start, finish));
        for &(name, start, finish) in it {
            index.insert(Event::new(name, start, finish));
        }
        index
    }

    fn names(hits: &[&Event]) -> Vec<String> {
        hits.iter().map(|ev| ev.name.clone()).collect()
    }

    #[test]
    fn half_open_boundaries() {
        let index = index_of(&[("ev", 0, 10)]);
        assert_eq!(names(&index.query(0)), vec!["ev"]);
        assert_eq!(names(&index.query(9)), vec!["ev"]);
        assert!(index.query(10).is_empty());
        assert!(index.query(-1).is_empty());
    }

    #[test]
    fn overlapping_events_all_reported_once() {
        // a..e from the stabbing scenario: query(50) hits all but d.
        let index = index_of(&[
            ("a", 0, 100),
            ("b", 50, 60),
            ("c", 10, 90),
            ("d", 85, 110),
            ("e", 45, 55),
        ]);
        let mut got = names(&index.query(50));
        got.sort();
        assert_eq!(got, vec!["a", "b", "c", "e"]);

        let mut got = names(&index.query(90));
        got.sort();
        assert_eq!(got, vec!["a", "d"]);
    }

    #[test]
    fn hits_come_out_in_ascending_key_order() {
        let index = index_of(&[("late", 40, 60), ("early", 0, 100), ("mid", 20, 80)]);
        assert_eq!(names(&index.query(45)), vec!["early", "mid", "late"]);
    }

    #[test]
    fn duplicate_event_is_idempotent() {
        let mut index = index_of(&[("a", 0, 10), ("b", 5, 15)]);
        let before: Vec<Event> = index.events_in_order().into_iter().cloned().collect();
        assert!(!index.insert(Event::new("a", 0, 10)));
        assert_eq!(index.len(), 2);
        let after: Vec<Event> = index.events_in_order().into_iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn shared_start_events_are_distinct_nodes() {
        let index = index_of(&[("a", 5, 10), ("b", 5, 12), ("c", 5, 12)]);
        assert_eq!(index.len(), 3);
        let mut got = names(&index.query(6));
        got.sort();
        assert_eq!(got, vec!["a", "b", "c"]);
    }

    #[test]
    fn query_leaves_the_tree_untouched() {
        let index = index_of(&[("a", 0, 50), ("b", 10, 40), ("c", 20, 30)]);
        let before: Vec<Event> = index.events_in_order().into_iter().cloned().collect();
        for _ in 0..3 {
            let mut got = names(&index.query(25));
            got.sort();
            assert_eq!(got, vec!["a", "b", "c"]);
        }
        let after: Vec<Event> = index.events_in_order().into_iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn degenerate_intervals_never_match() {
        let index = index_of(&[("empty", 5, 5), ("backwards", 9, 3), ("real", 0, 10)]);
        for t in -2..12 {
            let got = names(&index.query(t));
            assert!(!got.contains(&"empty".to_string()));
            assert!(!got.contains(&"backwards".to_string()));
        }
        assert_eq!(names(&index.query(5)), vec!["real"]);
    }

    #[test]
    fn fuzz_query_matches_linear_scan() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0xCA1E);

        for trial in 0..50 {
            let mut events = Vec::new();
            for i in 0..120 {
                let start = rng.random_range(-500..500);
                let len = rng.random_range(1..120);
                events.push((format!("ev{trial}_{i}"), start, start + len));
            }

            let mut index =
                IntervalIndex::new(Event::new(events[0].0.clone(), events[0].1, events[0].2));
            for (name, start, finish) in &events[1..] {
                index.insert(Event::new(name.clone(), *start, *finish));
            }

            for _ in 0..60 {
                let t = rng.random_range(-600..600);
                let mut got = names(&index.query(t));
                got.sort();
                let mut expected: Vec<String> = events
                    .iter()
                    .filter(|&&(_, s, f)| s <= t && t < f)
                    .map(|(n, _, _)| n.clone())
                    .collect();
                expected.sort();
                assert_eq!(got, expected, "mismatch at t={t} (trial {trial})");
            }
        }
    }

    #[test]
    fn fuzz_match_count_is_exact_across_insert_orders() {
        use rand::rngs::StdRng;
        use rand::seq::SliceRandom;
        use rand::{Rng, SeedableRng};

        let t: i64 = 1000;
        let mut rng = StdRng::seed_from_u64(0xF1D0);

        for trial in 0..30 {
            // disjoint matching / non-matching populations around t
            let n_match = rng.random_range(1..40);
            let n_miss = rng.random_range(1..40);
            let mut events = Vec::new();
            for i in 0..n_match {
                let start = t - rng.random_range(0..100);
                let finish = t + rng.random_range(1..100);
                events.push((format!("hit{i}"), start, finish));
            }
            for i in 0..n_miss {
                if rng.random_range(0..2) == 0 {
                    // entirely before t
                    let finish = t - rng.random_range(0..50);
                    events.push((format!("miss{i}"), finish - rng.random_range(1..50), finish));
                } else {
                    // entirely after t
                    let start = t + rng.random_range(1..50);
                    events.push((format!("miss{i}"), start, start + rng.random_range(1..50)));
                }
            }
            events.shuffle(&mut rng);

            let mut index =
                IntervalIndex::new(Event::new(events[0].0.clone(), events[0].1, events[0].2));
            for (name, start, finish) in &events[1..] {
                index.insert(Event::new(name.clone(), *start, *finish));
            }

            let hits = index.query(t);
            assert_eq!(hits.len(), n_match, "trial {trial}");
            assert!(hits.iter().all(|ev| ev.name.starts_with("hit")));
        }
    }
}
