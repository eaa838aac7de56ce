use std::cmp::Ordering;

use rayon::prelude::*;

use crate::{
    CancelToken, City, Error, Progress, ProgressObserver, Result, Tour,
    algo::{
        nearest_neighbor::NearestNeighborSolver,
        solver::{IMPROVEMENT_EPSILON, Solver, build_problem},
    },
    parallel,
};

const DEFAULT_MAX_ITERATIONS: usize = 1_000;
const DEFAULT_PARALLEL_THRESHOLD: usize = 500;

#[derive(Clone, Debug, PartialEq)]
pub struct TwoOptConfig {
    /// Upper bound on improving passes; each pass applies one move.
    pub max_iterations: usize,
    /// Inputs larger than this scan moves across the worker pool.
    pub parallel_threshold: usize,
    /// Worker count; 0 means all cores, 1 forces the sequential scan.
    pub threads: usize,
}

impl Default for TwoOptConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            threads: 0,
        }
    }
}

impl TwoOptConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::invalid_config("two-opt max_iterations must be > 0"));
        }
        Ok(())
    }
}

/// Best-improvement 2-opt seeded by nearest neighbor.
#[derive(Clone, Debug, Default)]
pub struct TwoOptSolver {
    config: TwoOptConfig,
}

/// Reversal of positions `start..=end`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Move {
    start: usize,
    end: usize,
    delta: f64,
}

impl Move {
    /// Lower delta wins, ties go to the lowest `(start, end)` so every scan
    /// order picks the same move.
    fn cmp_priority(&self, other: &Self) -> Ordering {
        self.delta
            .total_cmp(&other.delta)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }
}

fn better(a: Option<Move>, b: Option<Move>) -> Option<Move> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.cmp_priority(&a).is_lt() { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Best improving reversal starting at `start`. Reversing `1..=n-1` only
/// flips the direction of the cycle and is skipped.
fn scan_row(tour: &Tour, start: usize) -> Option<Move> {
    let n = tour.len();
    let mut best: Option<Move> = None;
    for end in (start + 1)..n {
        if start == 1 && end == n - 1 {
            continue;
        }
        let delta = tour.edge_delta(start - 1, end);
        if delta < -IMPROVEMENT_EPSILON && best.is_none_or(|b| delta < b.delta) {
            best = Some(Move { start, end, delta });
        }
    }
    best
}

fn best_move_sequential(tour: &Tour, cancel: &CancelToken) -> Result<Option<Move>> {
    let mut best = None;
    for start in 1..tour.len().saturating_sub(1) {
        cancel.check()?;
        best = better(best, scan_row(tour, start));
    }
    Ok(best)
}

/// Scatter the outer index over the pool, gather through a single reduction.
/// Workers only read the tour.
fn best_move_parallel(tour: &Tour, cancel: &CancelToken) -> Result<Option<Move>> {
    let best = (1..tour.len().saturating_sub(1))
        .into_par_iter()
        .map(|start| {
            if cancel.is_cancelled() {
                None
            } else {
                scan_row(tour, start)
            }
        })
        .reduce(|| None, better);
    cancel.check()?;
    Ok(best)
}

impl TwoOptSolver {
    pub const NAME: &'static str = "two-opt";

    pub fn new(config: TwoOptConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TwoOptConfig {
        &self.config
    }

    fn improve(
        &self,
        seed: Tour,
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<Tour> {
        let n = seed.len();
        let use_parallel = parallel::resolve_threads(self.config.threads) > 1
            && n > self.config.parallel_threshold;
        let seed_length = seed.total_length();
        let mut tour = seed.clone();
        let mut applied = 0usize;

        log::debug!("solver.two_opt: seed length={seed_length:.3} parallel={use_parallel}");

        for iteration in 1..=self.config.max_iterations {
            cancel.check()?;

            let best = if use_parallel {
                best_move_parallel(&tour, cancel)?
            } else {
                best_move_sequential(&tour, cancel)?
            };
            let Some(mv) = best else {
                log::debug!("solver.two_opt: converged pass={iteration}");
                break;
            };

            tour.reverse(mv.start, mv.end)?;
            applied += 1;
            progress.on_progress(
                Self::NAME,
                &Progress::new(
                    iteration,
                    tour.total_length(),
                    format!("reversed {}..={} delta={:.3}", mv.start, mv.end, mv.delta),
                ),
            );
        }

        if tour.total_length() > seed_length + IMPROVEMENT_EPSILON {
            log::warn!(
                "solver.two_opt: result {:.3} worse than seed {seed_length:.3}, keeping seed",
                tour.total_length()
            );
            return Ok(seed);
        }

        log::debug!("solver.two_opt: moves_applied={applied}");
        Ok(tour)
    }
}

impl Solver for TwoOptSolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    #[tsp_heur_derive::timer("solver.two_opt")]
    fn solve(
        &self,
        cities: &[City],
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<Tour> {
        self.config.validate()?;
        cancel.check()?;
        log::info!(
            "solver.two_opt: start n={} max_iterations={}",
            cities.len(),
            self.config.max_iterations
        );

        let tour = parallel::run_with_threads(self.config.threads, || {
            let problem = build_problem(cities, self.config.threads != 1)?;
            let seed = NearestNeighborSolver::construct(problem, cancel, progress, Self::NAME)?;
            self.improve(seed, cancel, progress)
        })?;

        log::info!(
            "solver.two_opt: complete n={} length={:.3}",
            tour.len(),
            tour.total_length()
        );
        Ok(tour)
    }
}
