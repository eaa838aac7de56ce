use std::{
    fmt,
    time::{Duration, Instant},
};

use rayon::prelude::*;

use crate::{CancelToken, City, ProgressObserver, Result, Solver, Tour};

/// One solver's outcome inside a benchmark run.
#[derive(Clone, Debug)]
pub struct BenchmarkResult {
    pub solver: String,
    pub length: f64,
    pub duration: Duration,
    pub tour: Tour,
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<18} length={:>14.3} time={:>9.3}s n={}",
            self.solver,
            self.length,
            self.duration.as_secs_f64(),
            self.tour.len()
        )
    }
}

/// Runs a set of solvers over the same cities and ranks them by tour length.
pub struct Benchmark {
    solvers: Vec<Box<dyn Solver>>,
    parallel: bool,
}

impl Benchmark {
    pub fn new(solvers: Vec<Box<dyn Solver>>) -> Self {
        Self {
            solvers,
            parallel: true,
        }
    }

    /// Runs solvers one after another instead of side by side.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn len(&self) -> usize {
        self.solvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solvers.is_empty()
    }

    /// Results sorted shortest first. Any solver error, including
    /// cancellation, fails the whole run.
    #[tsp_heur_derive::timer("benchmark")]
    pub fn run(
        &self,
        cities: &[City],
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<Vec<BenchmarkResult>> {
        log::info!(
            "benchmark: start solvers={} n={} parallel={}",
            self.solvers.len(),
            cities.len(),
            self.parallel
        );

        let run_one = |solver: &Box<dyn Solver>| -> Result<BenchmarkResult> {
            let started = Instant::now();
            let tour = solver.solve(cities, cancel, progress)?;
            let duration = started.elapsed();
            Ok(BenchmarkResult {
                solver: solver.name().to_string(),
                length: tour.total_length(),
                duration,
                tour,
            })
        };

        let mut results = if self.parallel {
            self.solvers
                .par_iter()
                .map(run_one)
                .collect::<Result<Vec<_>>>()?
        } else {
            self.solvers
                .iter()
                .map(run_one)
                .collect::<Result<Vec<_>>>()?
        };

        results.sort_by(|a, b| a.length.total_cmp(&b.length));

        if let Some(best) = results.first() {
            log::info!(
                "benchmark: best solver={} length={:.3}",
                best.solver,
                best.length
            );
        }
        Ok(results)
    }
}

/// Ranked table, one row per solver, with the gap to the winner.
pub fn render_report(results: &[BenchmarkResult]) -> String {
    let Some(best) = results.first() else {
        return String::from("no solvers were run\n");
    };

    let mut out = String::new();
    for (rank, result) in results.iter().enumerate() {
        let gap = if best.length > 0.0 {
            (result.length / best.length - 1.0) * 100.0
        } else {
            0.0
        };
        out.push_str(&format!("{:>2}. {result} gap={gap:.2}%\n", rank + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Benchmark, BenchmarkResult, render_report};
    use crate::{
        AnnealingConfig, AnnealingSolver, CancelToken, City, Error, GeneticConfig, GeneticSolver,
        NearestNeighborSolver, NoProgress, ProgressObserver, Result, Solver, Tour, TwoOptConfig,
        TwoOptSolver,
        algo::solver::fixtures::{random, square},
    };

    struct Failing;

    impl Solver for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn solve(
            &self,
            _cities: &[City],
            _cancel: &CancelToken,
            _progress: &dyn ProgressObserver,
        ) -> Result<Tour> {
            Err(Error::other("boom"))
        }
    }

    fn all_solvers() -> Vec<Box<dyn Solver>> {
        vec![
            Box::new(NearestNeighborSolver::new().with_threads(1)),
            Box::new(TwoOptSolver::new(TwoOptConfig::default().with_threads(1))),
            Box::new(AnnealingSolver::new(AnnealingConfig::default().with_seed(3))),
            Box::new(GeneticSolver::new(
                GeneticConfig::default()
                    .with_population_size(30)
                    .with_generations(50)
                    .with_threads(1)
                    .with_seed(3),
            )),
        ]
    }

    #[test]
    fn results_are_ranked_by_length() {
        let results = Benchmark::new(all_solvers())
            .run(&random(30, 12), &CancelToken::new(), &NoProgress)
            .expect("benchmark");
        assert_eq!(results.len(), 4);
        assert!(results.windows(2).all(|w| w[0].length <= w[1].length));
    }

    #[test]
    fn sequential_run_matches_solver_count() {
        let results = Benchmark::new(all_solvers())
            .sequential()
            .run(&square(), &CancelToken::new(), &NoProgress)
            .expect("benchmark");
        assert_eq!(results.len(), 4);
        for result in &results {
            assert!(
                (result.length - 4.0).abs() < 0.1,
                "{} found {}",
                result.solver,
                result.length
            );
        }
    }

    #[test]
    fn empty_solver_set_gives_empty_results() {
        let bench = Benchmark::new(Vec::new());
        assert!(bench.is_empty());
        let results = bench
            .run(&square(), &CancelToken::new(), &NoProgress)
            .expect("benchmark");
        assert!(results.is_empty());
        assert_eq!(render_report(&results), "no solvers were run\n");
    }

    #[test]
    fn one_failure_fails_the_run() {
        let mut solvers = all_solvers();
        solvers.push(Box::new(Failing));
        let err = Benchmark::new(solvers)
            .run(&square(), &CancelToken::new(), &NoProgress)
            .expect_err("failure should propagate");
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn cancellation_propagates() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = Benchmark::new(all_solvers())
            .run(&square(), &cancel, &NoProgress)
            .expect_err("cancelled");
        assert!(err.is_cancelled());
    }

    #[test]
    fn report_lists_every_solver_in_rank_order() {
        let results = Benchmark::new(all_solvers())
            .run(&random(20, 4), &CancelToken::new(), &NoProgress)
            .expect("benchmark");
        let report = render_report(&results);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with(" 1. "));
        assert!(lines[0].contains("gap=0.00%"));
    }

    #[test]
    fn result_row_shows_name_and_length() {
        let solvers: Vec<Box<dyn Solver>> = vec![Box::new(NearestNeighborSolver::new())];
        let results = Benchmark::new(solvers)
            .run(&square(), &CancelToken::new(), &NoProgress)
            .expect("benchmark");
        let row: &BenchmarkResult = &results[0];
        let text = row.to_string();
        assert!(text.starts_with("nearest-neighbor"));
        assert!(text.contains("length=         4.000"));
        assert!(row.duration < Duration::from_secs(60));
    }

    #[test]
    fn with_parallel_toggles_execution_mode() {
        let parallel = Benchmark::new(all_solvers())
            .sequential()
            .with_parallel(true)
            .run(&random(15, 7), &CancelToken::new(), &NoProgress)
            .expect("parallel benchmark");
        let sequential = Benchmark::new(all_solvers())
            .with_parallel(false)
            .run(&random(15, 7), &CancelToken::new(), &NoProgress)
            .expect("sequential benchmark");

        let lengths = |results: &[BenchmarkResult]| {
            let mut pairs: Vec<(String, f64)> = results
                .iter()
                .map(|r| (r.solver.clone(), r.length))
                .collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            pairs
        };
        assert_eq!(lengths(&parallel), lengths(&sequential));
    }
}
