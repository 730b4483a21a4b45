//! # tactus-exec
//!
//! Execution-mode dispatch for the data-parallel kernels.
//!
//! Kernels are written once as plain closures over an index and run under
//! whichever [`ExecMode`] the coupling scheme selected at `init()`. All
//! loops are bulk-synchronous: a call returns only after every index has
//! been processed.
//!
//! Nodal accumulation under `HostParallel` uses per-thread scratch buffers
//! merged by reduction, so results are deterministic up to floating-point
//! summation order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tactus_types::Scalar;

/// Where a mesh's arrays live.
///
/// This library executes on the host; `Dynamic` resolves to `Host` when the
/// execution mode is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemorySpace {
    Dynamic,
    Host,
}

/// How the per-pair kernels are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecMode {
    /// Plain sequential loop.
    Sequential,
    /// Work-stealing parallel loop over the host's threads.
    HostParallel,
}

impl ExecMode {
    /// Selects the execution mode for a mesh residing in `space` with `n`
    /// work items. Tiny batches are not worth the fork/join overhead.
    pub fn select(space: MemorySpace, n: usize) -> Self {
        match space {
            MemorySpace::Dynamic | MemorySpace::Host => {
                if n >= 64 {
                    ExecMode::HostParallel
                } else {
                    ExecMode::Sequential
                }
            }
        }
    }
}

/// Runs `body(i)` for every `i in 0..n` under the given execution mode.
pub fn for_all<F>(mode: ExecMode, n: usize, body: F)
where
    F: Fn(usize) + Sync + Send,
{
    match mode {
        ExecMode::Sequential => {
            for i in 0..n {
                body(i);
            }
        }
        ExecMode::HostParallel => {
            (0..n).into_par_iter().for_each(body);
        }
    }
}

/// Maps `body(i)` over `0..n`, keeping the `Some` results in index order.
///
/// This is the compaction primitive: the contact-plane builder yields
/// `Some(plane)` for active pairs and the result is the compacted active
/// array, deterministic for a given input regardless of execution mode.
pub fn filter_map_all<T, F>(mode: ExecMode, n: usize, body: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> Option<T> + Sync + Send,
{
    match mode {
        ExecMode::Sequential => (0..n).filter_map(body).collect(),
        ExecMode::HostParallel => (0..n).into_par_iter().filter_map(body).collect(),
    }
}

/// Accumulates scattered contributions into a shared buffer of length `len`.
///
/// `body(i, buf)` adds item `i`'s contribution into `buf`. Under
/// `HostParallel` each thread accumulates into its own zeroed buffer and the
/// buffers are summed afterwards; no atomics, no write races.
pub fn accumulate_all<F>(mode: ExecMode, n: usize, len: usize, body: F) -> Vec<Scalar>
where
    F: Fn(usize, &mut [Scalar]) + Sync + Send,
{
    match mode {
        ExecMode::Sequential => {
            let mut buf = vec![0.0; len];
            for i in 0..n {
                body(i, &mut buf);
            }
            buf
        }
        ExecMode::HostParallel => (0..n)
            .into_par_iter()
            .fold(
                || vec![0.0; len],
                |mut buf, i| {
                    body(i, &mut buf);
                    buf
                },
            )
            .reduce(
                || vec![0.0; len],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b.iter()) {
                        *x += *y;
                    }
                    a
                },
            ),
    }
}

/// Folds a per-item scalar into a running minimum, starting from `init`.
///
/// Used by the timestep vote: every face-pair proposes a dt and the
/// smallest one wins.
pub fn min_all<F>(mode: ExecMode, n: usize, init: Scalar, body: F) -> Scalar
where
    F: Fn(usize) -> Scalar + Sync + Send,
{
    match mode {
        ExecMode::Sequential => (0..n).map(body).fold(init, Scalar::min),
        ExecMode::HostParallel => (0..n)
            .into_par_iter()
            .map(body)
            .reduce(|| init, Scalar::min)
            .min(init),
    }
}
