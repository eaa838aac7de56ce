use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    CancelToken, City, Error, Progress, ProgressObserver, Result, Tour,
    algo::{
        nearest_neighbor::NearestNeighborSolver,
        solver::{IMPROVEMENT_EPSILON, Solver, build_problem},
    },
    parallel,
};

const DEFAULT_INITIAL_TEMPERATURE: f64 = 1_000.0;
const DEFAULT_COOLING_RATE: f64 = 0.995;
const DEFAULT_ITERATIONS_PER_TEMPERATURE: usize = 100;
const DEFAULT_MIN_TEMPERATURE: f64 = 0.1;
const PROGRESS_EVERY_LEVELS: usize = 50;
/// Moves between cancellation polls inside one temperature level.
const CANCEL_POLL_MOVES: usize = 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    /// Geometric decay factor applied after each temperature level.
    pub cooling_rate: f64,
    pub iterations_per_temperature: usize,
    /// The search stops once the temperature drops to this floor.
    pub min_temperature: f64,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Workers for the distance table; 0 means all cores, 1 is sequential.
    pub threads: usize,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: DEFAULT_INITIAL_TEMPERATURE,
            cooling_rate: DEFAULT_COOLING_RATE,
            iterations_per_temperature: DEFAULT_ITERATIONS_PER_TEMPERATURE,
            min_temperature: DEFAULT_MIN_TEMPERATURE,
            seed: None,
            threads: 0,
        }
    }
}

impl AnnealingConfig {
    pub fn with_initial_temperature(mut self, initial_temperature: f64) -> Self {
        self.initial_temperature = initial_temperature;
        self
    }

    pub fn with_cooling_rate(mut self, cooling_rate: f64) -> Self {
        self.cooling_rate = cooling_rate;
        self
    }

    pub fn with_iterations_per_temperature(mut self, iterations: usize) -> Self {
        self.iterations_per_temperature = iterations;
        self
    }

    pub fn with_min_temperature(mut self, min_temperature: f64) -> Self {
        self.min_temperature = min_temperature;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            return Err(Error::invalid_config(format!(
                "annealing initial_temperature must be > 0, got {}",
                self.initial_temperature
            )));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(Error::invalid_config(format!(
                "annealing cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if self.iterations_per_temperature == 0 {
            return Err(Error::invalid_config(
                "annealing iterations_per_temperature must be > 0",
            ));
        }
        if !(self.min_temperature.is_finite() && self.min_temperature > 0.0) {
            return Err(Error::invalid_config(format!(
                "annealing min_temperature must be > 0, got {}",
                self.min_temperature
            )));
        }
        Ok(())
    }
}

pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Metropolis acceptance over random 2-opt reversals with geometric cooling,
/// seeded by nearest neighbor. Keeps the best tour seen.
#[derive(Clone, Debug, Default)]
pub struct AnnealingSolver {
    config: AnnealingConfig,
}

impl AnnealingSolver {
    pub const NAME: &'static str = "annealing";

    pub fn new(config: AnnealingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    fn anneal(
        &self,
        seed: Tour,
        rng: &mut StdRng,
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<Tour> {
        let n = seed.len();
        if n <= 2 {
            return Ok(seed);
        }

        let cfg = &self.config;
        let seed_length = seed.total_length();
        let mut current = seed.clone();
        let mut current_length = seed_length;
        let mut best = seed.clone();
        let mut best_length = seed_length;
        let mut temperature = cfg.initial_temperature;
        let mut level = 0usize;
        let mut accepted = 0usize;

        while temperature > cfg.min_temperature {
            cancel.check()?;

            for step in 1..=cfg.iterations_per_temperature {
                if step % CANCEL_POLL_MOVES == 0 {
                    cancel.check()?;
                }
                let start = rng.random_range(1..n - 1);
                let end = rng.random_range(start + 1..n);
                let delta = current.edge_delta(start - 1, end);

                let accept = delta < 0.0 || rng.random::<f64>() < (-delta / temperature).exp();
                if !accept {
                    continue;
                }
                current.reverse(start, end)?;
                current_length += delta;
                accepted += 1;

                if current_length < best_length - IMPROVEMENT_EPSILON {
                    best = current.clone();
                    best_length = current_length;
                }
            }

            // drop accumulated rounding from the incremental deltas
            current_length = current.total_length();
            temperature *= cfg.cooling_rate;
            level += 1;

            if level % PROGRESS_EVERY_LEVELS == 0 {
                progress.on_progress(
                    Self::NAME,
                    &Progress::new(
                        level,
                        best_length,
                        format!("temperature={temperature:.4} current={current_length:.3}"),
                    ),
                );
            }
        }

        log::debug!("solver.annealing: levels={level} accepted={accepted}");

        if best.total_length() > seed_length + IMPROVEMENT_EPSILON {
            log::warn!(
                "solver.annealing: best {:.3} worse than seed {seed_length:.3}, keeping seed",
                best.total_length()
            );
            return Ok(seed);
        }
        Ok(best)
    }
}

impl Solver for AnnealingSolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    #[tsp_heur_derive::timer("solver.annealing")]
    fn solve(
        &self,
        cities: &[City],
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<Tour> {
        self.config.validate()?;
        cancel.check()?;
        log::info!(
            "solver.annealing: start n={} t0={} cooling={} seed={:?}",
            cities.len(),
            self.config.initial_temperature,
            self.config.cooling_rate,
            self.config.seed
        );

        let mut rng = seeded_rng(self.config.seed);
        let tour = parallel::run_with_threads(self.config.threads, || {
            let problem = build_problem(cities, self.config.threads != 1)?;
            let seed = NearestNeighborSolver::construct(problem, cancel, progress, Self::NAME)?;
            self.anneal(seed, &mut rng, cancel, progress)
        })?;

        log::info!(
            "solver.annealing: complete n={} length={:.3}",
            tour.len(),
            tour.total_length()
        );
        Ok(tour)
    }
}
