use rustc_hash::FxHashMap;

/// A max-priority queue over nodes keyed by bounded integer gains.
///
/// Gains must stay within `[-gain_span, +gain_span]`; the queue keeps one
/// bucket per possible gain and a running index of the highest non-empty
/// bucket, so all operations are O(1) amortized apart from the downward
/// rescan when the top bucket drains. Ties within a bucket pop in LIFO
/// order, which keeps replays deterministic.
pub struct BucketQueue {
    elements: usize,
    gain_span: i64,
    max_idx: usize,
    buckets: Vec<Vec<usize>>,
    // node -> (index inside its bucket, gain)
    queue_index: FxHashMap<usize, (usize, i64)>,
}

impl BucketQueue {
    pub fn new(gain_span: i64) -> Self {
        debug_assert!(gain_span >= 0);
        Self {
            elements: 0,
            gain_span,
            max_idx: 0,
            buckets: vec![Vec::new(); (2 * gain_span + 1) as usize],
            queue_index: FxHashMap::default(),
        }
    }

    fn address(&self, gain: i64) -> usize {
        debug_assert!(gain.abs() <= self.gain_span);
        (gain + self.gain_span) as usize
    }

    pub fn size(&self) -> usize {
        self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements == 0
    }

    pub fn contains(&self, node: usize) -> bool {
        self.queue_index.contains_key(&node)
    }

    /// The gain under which `node` is queued, or 0 if it is not queued.
    /// Callers use the 0 sentinel to mean "not a candidate".
    pub fn gain(&self, node: usize) -> i64 {
        self.queue_index.get(&node).map_or(0, |&(_, g)| g)
    }

    pub fn insert(&mut self, node: usize, gain: i64) {
        debug_assert!(!self.contains(node));
        let address = self.address(gain);
        if address > self.max_idx {
            self.max_idx = address;
        }
        self.buckets[address].push(node);
        self.queue_index
            .insert(node, (self.buckets[address].len() - 1, gain));
        self.elements += 1;
    }

    /// The highest gain currently queued.
    pub fn max_value(&self) -> i64 {
        self.max_idx as i64 - self.gain_span
    }

    /// The node that `delete_max` would return next.
    pub fn max_element(&self) -> usize {
        *self.buckets[self.max_idx].last().unwrap()
    }

    /// Pop the most recently inserted node of the highest gain.
    pub fn delete_max(&mut self) -> usize {
        let node = self.buckets[self.max_idx].pop().unwrap();
        self.queue_index.remove(&node);
        if self.buckets[self.max_idx].is_empty() {
            self.rescan_max();
        }
        self.elements -= 1;
        node
    }

    /// Remove `node` wherever it sits, in O(1) via swap-with-last.
    pub fn delete_node(&mut self, node: usize) {
        let (in_bucket_idx, old_gain) = self.queue_index[&node];
        let address = self.address(old_gain);

        if self.buckets[address].len() > 1 {
            let displaced = *self.buckets[address].last().unwrap();
            self.queue_index.get_mut(&displaced).unwrap().0 = in_bucket_idx;
            self.buckets[address].swap_remove(in_bucket_idx);
        } else {
            self.buckets[address].pop();
            if address == self.max_idx {
                self.rescan_max();
            }
        }

        self.elements -= 1;
        self.queue_index.remove(&node);
    }

    pub fn change_key(&mut self, node: usize, new_gain: i64) {
        self.delete_node(node);
        self.insert(node, new_gain);
    }

    pub fn decrease_key(&mut self, node: usize, new_gain: i64) {
        self.change_key(node, new_gain);
    }

    pub fn increase_key(&mut self, node: usize, new_gain: i64) {
        self.change_key(node, new_gain);
    }

    fn rescan_max(&mut self) {
        while self.max_idx != 0 {
            self.max_idx -= 1;
            if !self.buckets[self.max_idx].is_empty() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bucket_queue::BucketQueue;

    #[test]
    fn test_delete_max_pops_lifo_within_gain() {
        let mut queue = BucketQueue::new(3);
        queue.insert(7, 2);
        queue.insert(3, -1);
        queue.insert(9, 2);

        assert_eq!(queue.max_value(), 2);
        assert_eq!(queue.delete_max(), 9);
        assert_eq!(queue.delete_max(), 7);
        assert_eq!(queue.max_value(), -1);
        assert_eq!(queue.delete_max(), 3);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_delete_max_returns_nonincreasing_gains() {
        let mut queue = BucketQueue::new(5);
        for (node, gain) in [(0, -4), (1, 3), (2, 0), (3, 5), (4, 0), (5, -5)] {
            queue.insert(node, gain);
        }

        let mut previous = i64::MAX;
        while !queue.is_empty() {
            let node = queue.max_element();
            let gain = queue.gain(node);
            assert_eq!(queue.delete_max(), node);
            assert!(gain <= previous);
            previous = gain;
        }
    }

    #[test]
    fn test_drain_order_breaks_gain_ties_by_recency() {
        let mut queue = BucketQueue::new(3);
        queue.insert(0, 2);
        queue.insert(1, -1);
        queue.insert(2, 2);

        let drained = std::iter::from_fn(|| (!queue.is_empty()).then(|| queue.delete_max()));
        itertools::assert_equal(drained, [2, 0, 1]);
    }

    #[test]
    fn test_gain_of_absent_node_is_zero() {
        let mut queue = BucketQueue::new(2);
        queue.insert(1, 2);
        assert_eq!(queue.gain(1), 2);
        assert_eq!(queue.gain(42), 0);
        assert!(!queue.contains(42));
    }

    #[test]
    fn test_change_key_to_same_gain_keeps_queue_intact() {
        let mut queue = BucketQueue::new(4);
        queue.insert(0, 1);
        queue.insert(1, 3);
        queue.insert(2, -2);

        queue.change_key(1, queue.gain(1));

        assert_eq!(queue.size(), 3);
        assert_eq!(queue.max_value(), 3);
        assert_eq!(queue.delete_max(), 1);
        assert_eq!(queue.delete_max(), 0);
        assert_eq!(queue.delete_max(), 2);
    }

    #[test]
    fn test_delete_node_rescans_when_top_bucket_drains() {
        let mut queue = BucketQueue::new(3);
        queue.insert(0, 3);
        queue.insert(1, -1);
        queue.insert(2, -3);

        queue.delete_node(0);

        assert_eq!(queue.max_value(), -1);
        assert_eq!(queue.delete_max(), 1);
        assert_eq!(queue.delete_max(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_delete_node_updates_displaced_index() {
        let mut queue = BucketQueue::new(2);
        queue.insert(10, 1);
        queue.insert(11, 1);
        queue.insert(12, 1);

        // 10 sits at index 0; 12 is displaced into its slot
        queue.delete_node(10);
        queue.delete_node(12);

        assert_eq!(queue.size(), 1);
        assert_eq!(queue.delete_max(), 11);
    }
}
