//! Concurrency helper: limit the number of locations processed in parallel.

use crate::paths::LocationJob;
use rayon::prelude::*;

/// Run `f` over every location, at most `limit` at a time. Results come back
/// in job order; one failing location never stops the others.
pub fn map_locations_limited<T, F>(jobs: &[LocationJob], limit: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Sync + Fn(&LocationJob) -> T,
{
    if limit <= 1 {
        return jobs.iter().map(&f).collect();
    }
    let mut out = Vec::with_capacity(jobs.len());
    for chunk in jobs.chunks(limit) {
        let part: Vec<T> = chunk.par_iter().map(&f).collect();
        out.extend(part);
    }
    out
}
