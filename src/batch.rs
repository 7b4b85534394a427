//! Bounded scatter/gather over registry calls
//!
//! Each batch builds its own pool, runs every call on it, and drops the pool
//! before returning. Results come back in input order.

use crate::{Error, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Pool with at most `workers` threads (at least one)
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("packsmith-fetch-{}", i))
            .build()
            .map_err(|e| Error::Other(format!("Failed to start worker pool: {}", e)))?;

        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Apply `call` to every input, result `i` belonging to input `i`
    pub fn scatter<I, T, F>(&self, inputs: &[I], call: F) -> Vec<T>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> T + Sync + Send,
    {
        self.pool
            .install(|| inputs.par_iter().map(|input| call(input)).collect())
    }

    /// Run two scatter calls over the same inputs side by side
    pub fn scatter_pair<I, A, B, FA, FB>(
        &self,
        inputs: &[I],
        first: FA,
        second: FB,
    ) -> (Vec<A>, Vec<B>)
    where
        I: Sync,
        A: Send,
        B: Send,
        FA: Fn(&I) -> A + Sync + Send,
        FB: Fn(&I) -> B + Sync + Send,
    {
        log::debug!(
            "Dispatching {} lookups on {} workers",
            inputs.len() * 2,
            self.workers
        );

        self.pool.install(|| {
            rayon::join(
                || inputs.par_iter().map(|input| first(input)).collect(),
                || inputs.par_iter().map(|input| second(input)).collect(),
            )
        })
    }
}
