//! Bounded holding area for batches that failed to write.
//!
//! A [`RetryBuffer`] keeps failed batches in arrival order and never grows
//! past the capacity it was built with. Overflow evicts the **oldest**
//! buffered batches first: under a long store outage the newest data is the
//! data most worth delivering once the store comes back.
//!
//! Reading and clearing are separate. [`elements`](RetryBuffer::elements)
//! only looks; the caller decides whether to [`clear`](RetryBuffer::clear)
//! after seeing how its retry write went.
//!
//! The buffer has no interior mutability. It is owned by exactly one export
//! task.

use std::collections::vec_deque::Iter;
use std::collections::VecDeque;

use metricbridge_domain::Batch;

const INITIAL_SLOTS: usize = 16;

/// Fixed-capacity, drop-oldest queue of failed batches.
#[derive(Debug, Clone)]
pub struct RetryBuffer {
    batches: VecDeque<Batch>,
    capacity: usize,
}

impl RetryBuffer {
    /// Creates an empty buffer holding at most `capacity` batches.
    ///
    /// A capacity of zero is clamped to `1`. Storage grows on demand, so a
    /// large capacity costs nothing until batches actually fail.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { batches: VecDeque::with_capacity(capacity.min(INITIAL_SLOTS)), capacity }
    }

    /// Appends `batches` in order, evicting the oldest entries once full.
    ///
    /// Returns the evicted batches, oldest first. When more batches are
    /// added at once than the buffer can hold, the earliest of the new ones
    /// are evicted too.
    pub fn add<I>(&mut self, batches: I) -> Vec<Batch>
    where
        I: IntoIterator<Item = Batch>,
    {
        let mut evicted = Vec::new();
        for batch in batches {
            if self.is_full() {
                if let Some(oldest) = self.batches.pop_front() {
                    evicted.push(oldest);
                }
            }
            self.batches.push_back(batch);
        }
        evicted
    }

    /// Buffered batches from oldest to newest. Does not remove anything.
    pub fn elements(&self) -> Iter<'_, Batch> {
        self.batches.iter()
    }

    /// Drops every buffered batch.
    pub fn clear(&mut self) {
        self.batches.clear();
    }

    /// Number of buffered batches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.batches.len() >= self.capacity
    }

    /// Maximum number of batches the buffer holds.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of points across all buffered batches.
    #[must_use]
    pub fn pending_points(&self) -> usize {
        self.batches.iter().map(Batch::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use metricbridge_domain::{Batch, BatchConfig, Point};
    use uuid::Uuid;

    use super::RetryBuffer;

    fn batch(points: usize) -> Batch {
        let points = (0..points)
            .map(|i| Point::builder("m").field("value", i as f64).build().expect("point"))
            .collect();
        Batch::new(BatchConfig::new("metrics"), points)
    }

    fn ids(buffer: &RetryBuffer) -> Vec<Uuid> {
        buffer.elements().map(Batch::id).collect()
    }

    #[test]
    fn add_keeps_arrival_order() {
        let mut buffer = RetryBuffer::new(3);
        let (a, b) = (batch(1), batch(2));
        let expected = vec![a.id(), b.id()];

        let evicted = buffer.add([a, b]);

        assert!(evicted.is_empty());
        assert_eq!(ids(&buffer), expected);
        assert_eq!(buffer.pending_points(), 3);
    }

    #[test]
    fn overflow_evicts_oldest_first() {
        let mut buffer = RetryBuffer::new(2);
        let (a, b, c) = (batch(1), batch(1), batch(1));
        let (a_id, b_id, c_id) = (a.id(), b.id(), c.id());

        buffer.add([a]);
        buffer.add([b]);
        let evicted = buffer.add([c]);

        assert_eq!(evicted.iter().map(Batch::id).collect::<Vec<_>>(), vec![a_id]);
        assert_eq!(ids(&buffer), vec![b_id, c_id]);
        assert_eq!(buffer.len(), buffer.capacity());
    }

    #[test]
    fn oversized_add_keeps_only_newest() {
        let mut buffer = RetryBuffer::new(2);
        let batches: Vec<_> = (0..5).map(|_| batch(1)).collect();
        let newest: Vec<_> = batches[3..].iter().map(Batch::id).collect();

        let evicted = buffer.add(batches);

        assert_eq!(evicted.len(), 3);
        assert_eq!(ids(&buffer), newest);
    }

    #[test]
    fn capacity_holds_under_sustained_overflow() {
        let mut buffer = RetryBuffer::new(4);
        for round in 0..50 {
            buffer.add([batch(round % 3 + 1)]);
            assert!(buffer.elements().len() <= 4);
        }
        assert!(buffer.is_full());
    }

    #[test]
    fn elements_does_not_drain() {
        let mut buffer = RetryBuffer::new(2);
        buffer.add([batch(2)]);

        assert_eq!(buffer.elements().count(), 1);
        assert_eq!(buffer.elements().count(), 1);

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 2);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut buffer = RetryBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);

        let last = batch(1);
        let last_id = last.id();
        buffer.add([batch(1), last]);

        assert_eq!(ids(&buffer), vec![last_id]);
    }

    #[test]
    fn huge_capacity_allocates_lazily() {
        let mut buffer = RetryBuffer::new(usize::MAX / 2);
        assert_eq!(buffer.capacity(), usize::MAX / 2);

        buffer.add([batch(1), batch(1)]);
        assert_eq!(buffer.len(), 2);
        assert!(!buffer.is_full());
    }
}
