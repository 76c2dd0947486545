//! Parallel leaf hashing into a preallocated slot array

use crate::config::TreeConfig;
use crate::digest::{DefaultDigest, Digest};
use crate::{Error, Result};
use crossbeam::channel::{bounded, Receiver, Sender};
use std::thread;

/// Ordered leaf digests, sized before hashing starts
#[derive(Clone, Debug)]
pub struct LeafArray<D: Digest = DefaultDigest> {
    slots: Vec<D::Output>,
}

impl<D: Digest> LeafArray<D> {
    /// Allocate `len` empty slots
    pub fn with_len(len: usize) -> Self {
        LeafArray {
            slots: vec![D::Output::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn as_slice(&self) -> &[D::Output] {
        &self.slots
    }

    pub fn into_vec(self) -> Vec<D::Output> {
        self.slots
    }
}

impl<D: Digest> From<Vec<D::Output>> for LeafArray<D> {
    fn from(slots: Vec<D::Output>) -> Self {
        LeafArray { slots }
    }
}

/// One chunk waiting to be hashed, with the only slot it may write to
struct HashJob<'a, D: Digest> {
    chunk: Vec<u8>,
    slot: &'a mut D::Output,
}

/// Hands chunks to the worker pool in submission order
pub struct Submitter<'a, D: Digest> {
    jobs: Sender<HashJob<'a, D>>,
    slots: std::slice::IterMut<'a, D::Output>,
    next_index: usize,
    capacity: usize,
}

impl<'a, D: Digest> Submitter<'a, D> {
    /// Queue a chunk and return the slot index it was assigned.
    ///
    /// Blocks while the queue is full.
    pub fn submit(&mut self, chunk: Vec<u8>) -> Result<usize> {
        let slot = self.slots.next().ok_or(Error::CapacityExceeded {
            capacity: self.capacity,
        })?;
        let index = self.next_index;
        self.jobs
            .send(HashJob { chunk, slot })
            .map_err(|_| Error::Worker("all hash workers exited".into()))?;
        self.next_index += 1;
        Ok(index)
    }

    /// Number of chunks submitted so far
    pub fn submitted(&self) -> usize {
        self.next_index
    }
}

/// Fixed-size pool of hashing threads fed through a bounded queue
///
/// Slot indices are assigned when a chunk is submitted, and each job carries
/// an exclusive borrow of its slot, so workers never contend on the array and
/// the final order does not depend on scheduling.
#[derive(Clone, Copy, Debug)]
pub struct ConcurrentLeafHasher {
    workers: usize,
    queue_depth: usize,
}

impl ConcurrentLeafHasher {
    /// Create a hasher; zero values are raised to one
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        ConcurrentLeafHasher {
            workers: workers.max(1),
            queue_depth: queue_depth.max(1),
        }
    }

    pub fn from_config(config: &TreeConfig) -> Self {
        Self::new(config.workers, config.queue_depth)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Hash every chunk `produce` submits into `leaves`.
    ///
    /// The queue is closed once `produce` returns and all workers are joined
    /// before this returns, whether or not `produce` failed. On success the
    /// array is truncated to the number of submitted chunks and that number
    /// is returned.
    pub fn run<D, F>(&self, leaves: &mut LeafArray<D>, produce: F) -> Result<usize>
    where
        D: Digest,
        F: FnOnce(&mut Submitter<'_, D>) -> Result<()>,
    {
        let capacity = leaves.len();

        let (submitted, outcome, failed_workers) = thread::scope(|scope| {
            let (tx, rx) = bounded::<HashJob<'_, D>>(self.queue_depth);
            let handles: Vec<_> = (0..self.workers)
                .map(|_| {
                    let rx = rx.clone();
                    scope.spawn(move || hash_worker::<D>(rx))
                })
                .collect();
            drop(rx);

            let mut submitter = Submitter {
                jobs: tx,
                slots: leaves.slots.iter_mut(),
                next_index: 0,
                capacity,
            };
            let outcome = produce(&mut submitter);
            let submitted = submitter.submitted();
            // Closing the queue lets the workers drain and exit
            drop(submitter);

            let failed_workers = handles
                .into_iter()
                .map(|handle| handle.join())
                .filter(|joined| joined.is_err())
                .count();
            (submitted, outcome, failed_workers)
        });

        if failed_workers > 0 {
            return Err(Error::Worker(format!(
                "{} of {} hash workers panicked",
                failed_workers, self.workers
            )));
        }
        outcome?;

        leaves.slots.truncate(submitted);
        log::debug!(
            "hashed {} of {} leaf slots with {} workers",
            submitted,
            capacity,
            self.workers
        );
        Ok(submitted)
    }
}

impl Default for ConcurrentLeafHasher {
    fn default() -> Self {
        Self::from_config(&TreeConfig::default())
    }
}

fn hash_worker<D: Digest>(jobs: Receiver<HashJob<'_, D>>) -> usize {
    let mut hashed = 0;
    for job in jobs {
        *job.slot = D::digest(&job.chunk);
        hashed += 1;
    }
    hashed
}
