use std::sync::Arc;

use crate::{
    CancelToken, City, Problem, Progress, ProgressObserver, Result, Tour,
    algo::solver::{Solver, build_problem},
    parallel,
};

/// Inputs up to this size report after every placed city.
const FULL_PROGRESS_LIMIT: usize = 100;
const PROGRESS_STEPS: usize = 100;

/// Greedy constructor: start at the first city and always move to the closest
/// unvisited one. Deterministic for a given city order.
#[derive(Clone, Debug, Default)]
pub struct NearestNeighborSolver {
    /// Worker count for building the distance table; 0 means all cores.
    pub threads: usize,
}

impl NearestNeighborSolver {
    pub const NAME: &'static str = "nearest-neighbor";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Builds the greedy tour over an existing problem. Also used as the seed
    /// step of the improving solvers, which report under their own `label`.
    pub(crate) fn construct(
        problem: Arc<Problem>,
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
        label: &str,
    ) -> Result<Tour> {
        let n = problem.n();
        if n == 0 {
            return Ok(Tour::identity(problem));
        }

        let cadence = if n <= FULL_PROGRESS_LIMIT {
            1
        } else {
            n / PROGRESS_STEPS
        };

        let mut visited = vec![false; n];
        let mut order = Vec::with_capacity(n);
        let mut current = 0usize;
        let mut path_length = 0.0;
        visited[current] = true;
        order.push(current);

        while order.len() < n {
            cancel.check()?;

            let row = problem.table().row(current);
            let mut best: Option<(usize, f64)> = None;
            for (candidate, &dist) in row.iter().enumerate() {
                if visited[candidate] {
                    continue;
                }
                if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                    best = Some((candidate, dist));
                }
            }

            // loop condition guarantees an unvisited city remains
            let Some((next, dist)) = best else {
                break;
            };
            visited[next] = true;
            order.push(next);
            path_length += dist;
            current = next;

            let placed = order.len();
            if placed % cadence == 0 || placed == n {
                progress.on_progress(
                    label,
                    &Progress::new(placed, path_length, format!("placed {placed}/{n}")),
                );
            }
        }

        Tour::from_order(problem, order)
    }
}

impl Solver for NearestNeighborSolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    #[tsp_heur_derive::timer("solver.nearest_neighbor")]
    fn solve(
        &self,
        cities: &[City],
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<Tour> {
        cancel.check()?;
        log::info!("solver.nearest_neighbor: start n={}", cities.len());

        let tour = parallel::run_with_threads(self.threads, || {
            let problem = build_problem(cities, self.threads != 1)?;
            Self::construct(problem, cancel, progress, Self::NAME)
        })?;

        log::info!(
            "solver.nearest_neighbor: complete n={} length={:.3}",
            tour.len(),
            tour.total_length()
        );
        Ok(tour)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::NearestNeighborSolver;
    use crate::{
        CancelToken, NoProgress, Progress, Solver,
        algo::solver::fixtures::{cities, ids, random, square},
    };

    #[test]
    fn square_is_solved_optimally() {
        let tour = NearestNeighborSolver::new()
            .solve(&square(), &CancelToken::new(), &NoProgress)
            .expect("solve");
        assert!((tour.total_length() - 4.0).abs() < 0.1);
    }

    #[test]
    fn degenerate_inputs_have_zero_length() {
        let solver = NearestNeighborSolver::new();
        let empty = solver
            .solve(&[], &CancelToken::new(), &NoProgress)
            .expect("empty input");
        assert!(empty.is_empty());
        assert_eq!(empty.total_length(), 0.0);

        let single = solver
            .solve(&cities(&[(5.0, 5.0)]), &CancelToken::new(), &NoProgress)
            .expect("single city");
        assert_eq!(single.len(), 1);
        assert_eq!(single.total_length(), 0.0);
    }

    #[test]
    fn always_moves_to_closest_unvisited_city() {
        let input = cities(&[(0.0, 0.0), (10.0, 0.0), (1.0, 0.0), (3.0, 0.0)]);
        let tour = NearestNeighborSolver::new()
            .solve(&input, &CancelToken::new(), &NoProgress)
            .expect("solve");
        assert_eq!(tour.city_ids(), vec![0, 2, 3, 1]);
    }

    #[test]
    fn result_is_a_permutation_and_deterministic() {
        let input = random(150, 7);
        let solver = NearestNeighborSolver::new().with_threads(1);
        let first = solver
            .solve(&input, &CancelToken::new(), &NoProgress)
            .expect("solve");
        let second = solver
            .solve(&input, &CancelToken::new(), &NoProgress)
            .expect("solve");
        assert!(first.is_permutation_of(&ids(&input)));
        assert_eq!(first.order(), second.order());
    }

    #[test]
    fn reports_progress_per_city_for_small_inputs() {
        let events = Mutex::new(Vec::new());
        let observer = |_: &str, p: &Progress| events.lock().expect("lock").push(p.iteration);
        NearestNeighborSolver::new()
            .solve(&square(), &CancelToken::new(), &observer)
            .expect("solve");
        assert_eq!(events.into_inner().expect("lock"), vec![2, 3, 4]);
    }

    #[test]
    fn cancelled_token_aborts_before_building() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = NearestNeighborSolver::new()
            .solve(&square(), &cancel, &NoProgress)
            .expect_err("cancelled run should fail");
        assert!(err.is_cancelled());
    }
}
