//! Fixed-capacity ring buffer with blocking dequeue
//!
//! The ring distinguishes empty from full by capping occupancy at
//! `capacity - 1` items, so a queue built with capacity N holds at most N-1
//! pending items. Cursor arithmetic is modulo N throughout.

use std::sync::Mutex;

use tokio::sync::Notify;

/// Returned by [`HandoffQueue::enqueue`] when the queue is full.
///
/// Carries the rejected item back to the caller, which stays responsible for
/// disposing of it (the acceptor drops the connection).
#[derive(Debug)]
pub struct Rejected<T>(pub T);

impl<T> Rejected<T> {
    /// Take the rejected item back
    pub fn into_inner(self) -> T {
        self.0
    }
}

struct Ring<T> {
    slots: Vec<Option<T>>,
    read: usize,
    write: usize,
}

impl<T> Ring<T> {
    fn len(&self) -> usize {
        (self.slots.len() - self.read + self.write) % self.slots.len()
    }
}

/// Bounded FIFO handoff queue
///
/// `enqueue` never suspends; `dequeue` suspends until an item is available.
/// All cursor updates happen under one mutex; the wait side re-checks the
/// condition in a loop rather than trusting a single wakeup.
pub struct HandoffQueue<T> {
    ring: Mutex<Ring<T>>,
    available: Notify,
}

impl<T> HandoffQueue<T> {
    /// Create a queue with the given ring capacity.
    ///
    /// At most `capacity - 1` items can be pending at once.
    ///
    /// # Panics
    ///
    /// Panics if `capacity < 2` (such a ring could hold nothing).
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "handoff queue capacity must be at least 2");

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            ring: Mutex::new(Ring {
                slots,
                read: 0,
                write: 0,
            }),
            available: Notify::new(),
        }
    }

    /// Add an item to the queue without waiting.
    ///
    /// Returns the item back inside [`Rejected`] if `capacity - 1` items are
    /// already pending. On success, wakes one waiting consumer.
    pub fn enqueue(&self, item: T) -> Result<(), Rejected<T>> {
        let mut ring = self.ring.lock().unwrap();

        if ring.len() == ring.slots.len() - 1 {
            return Err(Rejected(item));
        }

        let write = ring.write;
        ring.slots[write] = Some(item);
        ring.write = (write + 1) % ring.slots.len();
        drop(ring);

        self.available.notify_one();
        Ok(())
    }

    /// Remove the oldest item, suspending until one is present.
    ///
    /// Items come out in strict FIFO order relative to `enqueue`.
    pub async fn dequeue(&self) -> T {
        loop {
            // Register for a wakeup before checking, so an enqueue landing
            // between the check and the await is not missed.
            let notified = self.available.notified();

            if let Some(item) = self.try_dequeue() {
                return item;
            }

            notified.await;
        }
    }

    /// Remove the oldest item if one is present.
    pub fn try_dequeue(&self) -> Option<T> {
        let mut ring = self.ring.lock().unwrap();

        if ring.len() == 0 {
            return None;
        }

        let read = ring.read;
        let item = ring.slots[read].take();
        ring.read = (read + 1) % ring.slots.len();
        item
    }

    /// Number of items currently pending
    pub fn len(&self) -> usize {
        self.ring.lock().unwrap().len()
    }

    /// Whether the queue is currently empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ring capacity (usable slots are `capacity() - 1`)
    pub fn capacity(&self) -> usize {
        self.ring.lock().unwrap().slots.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = HandoffQueue::new(8);

        for i in 0..7 {
            queue.enqueue(i).unwrap();
        }
        for i in 0..7 {
            assert_eq!(queue.try_dequeue(), Some(i));
        }
        assert_eq!(queue.try_dequeue(), None);
    }

    #[test]
    fn test_rejects_when_full() {
        let queue = HandoffQueue::new(4);

        queue.enqueue(1).unwrap();
        queue.enqueue(2).unwrap();
        queue.enqueue(3).unwrap();

        // Only capacity - 1 slots are usable.
        let rejected = queue.enqueue(4).unwrap_err();
        assert_eq!(rejected.into_inner(), 4);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_dequeue_frees_one_slot() {
        let queue = HandoffQueue::new(4);

        for i in 0..3 {
            queue.enqueue(i).unwrap();
        }
        assert!(queue.enqueue(99).is_err());

        assert_eq!(queue.try_dequeue(), Some(0));
        queue.enqueue(99).unwrap();
        assert!(queue.enqueue(100).is_err());
    }

    #[test]
    fn test_reference_capacity_scenario() {
        // Ring of 16: 15 pending connections fit, the 16th is rejected,
        // and draining one readmits it.
        let queue = HandoffQueue::new(16);

        for i in 0..15 {
            queue.enqueue(i).unwrap();
        }
        let rejected = queue.enqueue(15).unwrap_err();

        assert_eq!(queue.try_dequeue(), Some(0));
        queue.enqueue(rejected.into_inner()).unwrap();
        assert_eq!(queue.len(), 15);
    }

    #[test]
    fn test_cursor_wraparound() {
        let queue = HandoffQueue::new(4);

        // Push the cursors around the ring a few times.
        for round in 0..10 {
            queue.enqueue(round * 2).unwrap();
            queue.enqueue(round * 2 + 1).unwrap();
            assert_eq!(queue.try_dequeue(), Some(round * 2));
            assert_eq!(queue.try_dequeue(), Some(round * 2 + 1));
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_dequeue_waits_for_enqueue() {
        let queue = Arc::new(HandoffQueue::new(4));

        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.dequeue().await })
        };

        // Give the consumer a chance to park.
        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.enqueue(42u32).unwrap();

        let got = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("dequeue should wake after enqueue")
            .unwrap();
        assert_eq!(got, 42);
    }

    #[tokio::test]
    async fn test_multiple_waiters_each_get_one_item() {
        let queue = Arc::new(HandoffQueue::new(8));

        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move { queue.dequeue().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        for i in 0..3 {
            queue.enqueue(i).unwrap();
        }

        let mut got = Vec::new();
        for consumer in consumers {
            let item = timeout(Duration::from_secs(1), consumer)
                .await
                .expect("every waiter should be served")
                .unwrap();
            got.push(item);
        }
        got.sort_unstable();
        assert_eq!(got, vec![0, 1, 2]);
        assert!(queue.is_empty());
    }
}
