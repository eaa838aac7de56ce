use std::sync::Arc;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use rayon::prelude::*;

use crate::{
    CancelToken, City, Error, Problem, Progress, ProgressObserver, Result, Tour,
    algo::{
        annealing::seeded_rng,
        solver::{IMPROVEMENT_EPSILON, Solver, build_problem},
    },
    parallel,
};

const DEFAULT_POPULATION_SIZE: usize = 100;
const DEFAULT_GENERATIONS: usize = 500;
const DEFAULT_MUTATION_RATE: f64 = 0.02;
const DEFAULT_ELITISM_RATE: f64 = 0.1;
const DEFAULT_TOURNAMENT_SIZE: usize = 5;
const MAX_STAGNATION_WINDOW: usize = 200;
const PROGRESS_EVERY_GENERATIONS: usize = 10;

const SCALED_MIN_POPULATION: usize = 50;
const SCALED_MAX_POPULATION: usize = 400;
const SCALED_POPULATION_PER_CITY: usize = 2;
const SCALED_MIN_GENERATIONS: usize = 100;
const SCALED_MAX_GENERATIONS: usize = 2_000;
const SCALED_GENERATIONS_PER_CITY: usize = 20;

#[derive(Clone, Debug, PartialEq)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Probability that a child gets one random swap.
    pub mutation_rate: f64,
    /// Fraction of each generation copied unchanged into the next.
    pub elitism_rate: f64,
    pub tournament_size: usize,
    /// Generations without improvement before stopping early. `None` uses a
    /// quarter of `generations`, capped.
    pub stagnation_limit: Option<usize>,
    /// Worker count; 0 means all cores, 1 forces sequential breeding.
    pub threads: usize,
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            generations: DEFAULT_GENERATIONS,
            mutation_rate: DEFAULT_MUTATION_RATE,
            elitism_rate: DEFAULT_ELITISM_RATE,
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
            stagnation_limit: None,
            threads: 0,
            seed: None,
        }
    }
}

impl GeneticConfig {
    /// Population and generation count grow with the city count, within bounds.
    pub fn scaled(n: usize) -> Self {
        Self {
            population_size: (n * SCALED_POPULATION_PER_CITY)
                .clamp(SCALED_MIN_POPULATION, SCALED_MAX_POPULATION),
            generations: (n * SCALED_GENERATIONS_PER_CITY)
                .clamp(SCALED_MIN_GENERATIONS, SCALED_MAX_GENERATIONS),
            ..Self::default()
        }
    }

    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = mutation_rate;
        self
    }

    pub fn with_elitism_rate(mut self, elitism_rate: f64) -> Self {
        self.elitism_rate = elitism_rate;
        self
    }

    pub fn with_tournament_size(mut self, tournament_size: usize) -> Self {
        self.tournament_size = tournament_size;
        self
    }

    pub fn with_stagnation_limit(mut self, stagnation_limit: usize) -> Self {
        self.stagnation_limit = Some(stagnation_limit);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn stagnation_window(&self) -> usize {
        self.stagnation_limit
            .unwrap_or_else(|| (self.generations / 4).clamp(1, MAX_STAGNATION_WINDOW))
    }

    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64 * self.elitism_rate).round() as usize)
            .min(self.population_size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::invalid_config("genetic population_size must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::invalid_config(format!(
                "genetic mutation_rate must be in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.elitism_rate) {
            return Err(Error::invalid_config(format!(
                "genetic elitism_rate must be in [0, 1], got {}",
                self.elitism_rate
            )));
        }
        if self.tournament_size == 0 {
            return Err(Error::invalid_config("genetic tournament_size must be > 0"));
        }
        if self.stagnation_limit == Some(0) {
            return Err(Error::invalid_config("genetic stagnation_limit must be > 0"));
        }
        Ok(())
    }
}

/// Population search over tours that all start at the first city, so rotations
/// of one cycle are never counted as different individuals.
#[derive(Clone, Debug, Default)]
pub struct GeneticSolver {
    config: GeneticConfig,
}

/// Random order with slot 0 pinned to position 0.
fn random_individual(problem: &Arc<Problem>, seed: u64) -> Tour {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..problem.n()).collect();
    if order.len() > 1 {
        order[1..].shuffle(&mut rng);
    }
    primed(Tour::from_order_unchecked(Arc::clone(problem), order))
}

/// Computes the cached length on the worker that built the tour.
fn primed(tour: Tour) -> Tour {
    tour.total_length();
    tour
}

/// Samples `size` individuals with replacement and keeps the shortest.
fn tournament<'a>(population: &'a [Tour], size: usize, rng: &mut StdRng) -> &'a Tour {
    let mut winner = &population[rng.random_range(0..population.len())];
    for _ in 1..size {
        let challenger = &population[rng.random_range(0..population.len())];
        if challenger.total_length() < winner.total_length() {
            winner = challenger;
        }
    }
    winner
}

/// Order crossover: keep a random segment of `a` in place, fill the remaining
/// positions with the unused cities in `b`'s order. Position 0 stays fixed.
fn order_crossover(a: &[usize], b: &[usize], rng: &mut StdRng) -> Vec<usize> {
    let n = a.len();
    if n <= 2 {
        return a.to_vec();
    }

    let start = rng.random_range(1..n);
    let end = rng.random_range(start..n);

    let mut child = vec![usize::MAX; n];
    let mut used = vec![false; n];
    child[0] = a[0];
    used[a[0]] = true;
    for pos in start..=end {
        child[pos] = a[pos];
        used[a[pos]] = true;
    }

    let mut donors = b[1..].iter().copied().filter(|&slot| !used[slot]);
    for pos in (1..start).chain(end + 1..n) {
        if let Some(slot) = donors.next() {
            child[pos] = slot;
        }
    }
    child
}

fn mutate(order: &mut [usize], rate: f64, rng: &mut StdRng) {
    let n = order.len();
    if n <= 2 || !rng.random_bool(rate) {
        return;
    }
    let i = rng.random_range(1..n);
    // pick from the other n - 2 movable positions
    let mut j = rng.random_range(1..n - 1);
    if j >= i {
        j += 1;
    }
    order.swap(i, j);
}

fn breed(population: &[Tour], config: &GeneticConfig, seed: u64) -> Tour {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = tournament(population, config.tournament_size, &mut rng);
    let b = tournament(population, config.tournament_size, &mut rng);
    let mut child = order_crossover(a.order(), b.order(), &mut rng);
    mutate(&mut child, config.mutation_rate, &mut rng);
    primed(Tour::from_order_unchecked(Arc::clone(a.problem()), child))
}

/// Runs `make` once per seed, across the pool when `parallel` is set. Output
/// order follows seed order either way.
fn scatter<F>(seeds: Vec<u64>, parallel: bool, make: F) -> Vec<Tour>
where
    F: Fn(u64) -> Tour + Send + Sync,
{
    if parallel {
        seeds.into_par_iter().map(make).collect()
    } else {
        seeds.into_iter().map(make).collect()
    }
}

fn sort_by_length(population: &mut [Tour]) {
    population.sort_by(|a, b| a.total_length().total_cmp(&b.total_length()));
}

impl GeneticSolver {
    pub const NAME: &'static str = "genetic";

    pub fn new(config: GeneticConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    fn evolve(
        &self,
        problem: Arc<Problem>,
        parallel: bool,
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<Tour> {
        let cfg = &self.config;
        let n = problem.n();
        // with the first city fixed, at most one cycle exists up to direction
        if n <= 3 {
            return Ok(Tour::identity(problem));
        }

        let mut master = seeded_rng(cfg.seed);
        let window = cfg.stagnation_window();
        let elites = cfg.elite_count();

        let seeds = (0..cfg.population_size).map(|_| master.random()).collect();
        let mut population = scatter(seeds, parallel, |seed| random_individual(&problem, seed));
        cancel.check()?;
        sort_by_length(&mut population);

        let mut best = population[0].clone();
        let mut stagnant = 0usize;
        let mut generation = 0usize;

        while generation < cfg.generations {
            cancel.check()?;
            generation += 1;

            let seeds = (elites..cfg.population_size)
                .map(|_| master.random())
                .collect();
            let parents = &population;
            let offspring = scatter(seeds, parallel, |seed| breed(parents, cfg, seed));

            let mut next: Vec<Tour> = population[..elites].to_vec();
            next.extend(offspring);
            sort_by_length(&mut next);
            population = next;

            if population[0].total_length() < best.total_length() - IMPROVEMENT_EPSILON {
                best = population[0].clone();
                stagnant = 0;
            } else {
                stagnant += 1;
            }

            if generation % PROGRESS_EVERY_GENERATIONS == 0 {
                progress.on_progress(
                    Self::NAME,
                    &Progress::new(
                        generation,
                        best.total_length(),
                        format!("stagnant={stagnant}/{window}"),
                    ),
                );
            }

            if stagnant >= window {
                log::debug!("solver.genetic: stagnated generation={generation} window={window}");
                break;
            }
        }

        log::debug!("solver.genetic: generations_run={generation}");
        Ok(best)
    }
}

impl Solver for GeneticSolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    #[tsp_heur_derive::timer("solver.genetic")]
    fn solve(
        &self,
        cities: &[City],
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<Tour> {
        self.config.validate()?;
        cancel.check()?;
        log::info!(
            "solver.genetic: start n={} population={} generations={} seed={:?}",
            cities.len(),
            self.config.population_size,
            self.config.generations,
            self.config.seed
        );

        let parallel = parallel::resolve_threads(self.config.threads) > 1;
        let tour = parallel::run_with_threads(self.config.threads, || {
            let problem = build_problem(cities, parallel)?;
            self.evolve(problem, parallel, cancel, progress)
        })?;

        log::info!(
            "solver.genetic: complete n={} length={:.3}",
            tour.len(),
            tour.total_length()
        );
        Ok(tour)
    }
}
