//! Heuristic solvers for the symmetric Euclidean travelling salesman problem.
//!
//! Four solvers share one [`Solver`] trait: greedy nearest neighbor, best
//! improvement 2-opt, simulated annealing, and a genetic algorithm with order
//! crossover. [`Benchmark`] runs any set of them over the same cities and
//! ranks the resulting tours.

mod algo;
mod cancel;
mod error;
mod io;
pub mod logging;
mod model;
pub mod parallel;
mod progress;

pub use algo::annealing::{AnnealingConfig, AnnealingSolver};
pub use algo::benchmark::{Benchmark, BenchmarkResult, render_report};
pub use algo::genetic::{GeneticConfig, GeneticSolver};
pub use algo::nearest_neighbor::NearestNeighborSolver;
pub use algo::solver::{IMPROVEMENT_EPSILON, Solver, SolverKind};
pub use algo::two_opt::{TwoOptConfig, TwoOptSolver};
pub use cancel::CancelToken;
pub use error::{Error, Result};
pub use io::input::{parse_cities, read_cities};
pub use io::options::{LogFormat, LogLevel, RunOptions};
pub use io::output::write_tour;
pub use model::distance::TABLE_PARALLEL_THRESHOLD;
pub use model::{City, DistanceTable, Problem, Tour};
pub use progress::{LogProgress, NoProgress, Progress, ProgressObserver};
