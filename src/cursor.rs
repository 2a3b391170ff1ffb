// Shared work partitioner for alignment workers.
//
// An owned cursor over an ordered snapshot of keys, guarded by a single
// mutex. Workers claim either one key (categorical/regional strategies) or a
// contiguous chunk (naive strategy); the underlying collection is never
// exposed across threads. The critical section is key manipulation only.

use std::collections::VecDeque;
use std::sync::Mutex;

pub struct GeneCursor<T> {
    queue: Mutex<VecDeque<T>>,
    chunk: usize,
}

impl<T> GeneCursor<T> {
    /// Build a cursor over `items`. The chunk size for `claim_chunk` is
    /// fixed here as `max(total / n_threads, 1)`.
    pub fn new(items: Vec<T>, n_threads: usize) -> Self {
        let chunk = (items.len() / n_threads.max(1)).max(1);
        Self {
            queue: Mutex::new(items.into()),
            chunk,
        }
    }

    /// Atomically claim the next key, or `None` when exhausted.
    pub fn claim_one(&self) -> Option<T> {
        self.queue.lock().unwrap().pop_front()
    }

    /// Atomically claim up to one chunk of keys from the front; empty when
    /// exhausted.
    pub fn claim_chunk(&self) -> Vec<T> {
        let mut queue = self.queue.lock().unwrap();
        let take = self.chunk.min(queue.len());
        queue.drain(..take).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn singleton_claims_each_key_once() {
        let cursor = GeneCursor::new((0..100).collect(), 4);
        let mut seen = Vec::new();
        while let Some(key) = cursor.claim_one() {
            seen.push(key);
        }
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
        assert!(cursor.claim_one().is_none());
    }

    #[test]
    fn chunked_claims_cover_everything_without_overlap() {
        let cursor = GeneCursor::new((0..103).collect::<Vec<i32>>(), 4);
        let mut seen = HashSet::new();
        loop {
            let chunk = cursor.claim_chunk();
            if chunk.is_empty() {
                break;
            }
            assert!(chunk.len() <= 103 / 4);
            for key in chunk {
                assert!(seen.insert(key), "key {key} claimed twice");
            }
        }
        assert_eq!(seen.len(), 103);
    }

    #[test]
    fn chunk_size_is_at_least_one() {
        let cursor = GeneCursor::new(vec![1, 2], 8);
        assert_eq!(cursor.claim_chunk(), vec![1]);
        assert_eq!(cursor.claim_chunk(), vec![2]);
        assert!(cursor.claim_chunk().is_empty());
    }

    // Exhaustiveness under concurrency: T claimers, union of claims equals
    // the full key set with no repeats.
    #[test]
    fn concurrent_claimers_partition_the_key_set() {
        for n_threads in [1usize, 2, 4, 7] {
            for chunked in [false, true] {
                let cursor = GeneCursor::new((0..500).collect::<Vec<u32>>(), n_threads);
                let claimed = Mutex::new(Vec::new());
                std::thread::scope(|s| {
                    for _ in 0..n_threads {
                        s.spawn(|| loop {
                            let batch = if chunked {
                                cursor.claim_chunk()
                            } else {
                                cursor.claim_one().into_iter().collect()
                            };
                            if batch.is_empty() {
                                break;
                            }
                            claimed.lock().unwrap().extend(batch);
                        });
                    }
                });
                let mut claimed = claimed.into_inner().unwrap();
                claimed.sort_unstable();
                assert_eq!(claimed, (0..500).collect::<Vec<_>>());
            }
        }
    }
}
