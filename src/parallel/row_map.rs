use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::RowMapError;

/// Split `len` rows into at most `workers` contiguous, near-equal ranges.
///
/// The first `len % parts` ranges get one extra row. Never produces empty
/// ranges, so fewer than `workers` ranges come back when `len < workers`.
pub fn partition_bounds(len: usize, workers: usize) -> Vec<Range<usize>> {
    if len == 0 || workers == 0 {
        return vec![];
    }

    let parts = workers.min(len);
    let base_size = len / parts;
    let remainder = len % parts;

    let mut bounds = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let extra = if i < remainder { 1 } else { 0 };
        let end = start + base_size + extra;
        bounds.push(start..end);
        start = end;
    }

    bounds
}

/// Apply `f` to every row using `workers` workers.
///
/// Rows are moved into contiguous partitions (see [`partition_bounds`]), each
/// partition is processed by its own worker, and the results are concatenated
/// in partition order, so output order equals input order. The first failing
/// row fails the whole call; no partial results are returned.
pub fn map_rows<R, E, F>(rows: Vec<R>, f: F, workers: usize) -> Result<Vec<R>, RowMapError<E>>
where
    R: Send,
    E: Send,
    F: Fn(R) -> Result<R, E> + Sync,
{
    if workers == 0 {
        return Err(RowMapError::NoWorkers);
    }

    let bounds = partition_bounds(rows.len(), workers);
    let partitions = split_rows(rows, &bounds);
    run_partitions(partitions, &f, workers)
}

/// Apply `f` to every row on the calling thread
pub fn map_rows_sequential<R, E, F>(rows: Vec<R>, f: F) -> Result<Vec<R>, RowMapError<E>>
where
    F: Fn(R) -> Result<R, E>,
{
    apply_partition(0, rows, &f)
}

#[cfg(feature = "parallel")]
fn run_partitions<R, E, F>(
    partitions: Vec<(usize, Vec<R>)>,
    f: &F,
    workers: usize,
) -> Result<Vec<R>, RowMapError<E>>
where
    R: Send,
    E: Send,
    F: Fn(R) -> Result<R, E> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("msai-worker-{}", i))
        .build()
        .map_err(|e| RowMapError::Pool(e.to_string()))?;

    let results: Vec<Vec<R>> = pool.install(|| {
        partitions
            .into_par_iter()
            .map(|(offset, part)| apply_partition(offset, part, f))
            .collect::<Result<Vec<_>, _>>()
    })?;

    Ok(results.into_iter().flatten().collect())
}

#[cfg(not(feature = "parallel"))]
fn run_partitions<R, E, F>(
    partitions: Vec<(usize, Vec<R>)>,
    f: &F,
    _workers: usize,
) -> Result<Vec<R>, RowMapError<E>>
where
    F: Fn(R) -> Result<R, E>,
{
    let mut output = Vec::new();
    for (offset, part) in partitions {
        output.extend(apply_partition(offset, part, f)?);
    }
    Ok(output)
}

fn apply_partition<R, E, F>(offset: usize, rows: Vec<R>, f: &F) -> Result<Vec<R>, RowMapError<E>>
where
    F: Fn(R) -> Result<R, E>,
{
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| f(row).map_err(|error| RowMapError::Row { row: offset + i, error }))
        .collect()
}

/// Move rows into owned partitions, tagging each with its starting row
fn split_rows<R>(rows: Vec<R>, bounds: &[Range<usize>]) -> Vec<(usize, Vec<R>)> {
    let mut iter = rows.into_iter();
    bounds
        .iter()
        .map(|range| (range.start, iter.by_ref().take(range.len()).collect()))
        .collect()
}
