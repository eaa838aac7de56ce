use std::{env, path::Path};

use log::LevelFilter;
use tsp_heur_derive::{CliOptions, CliValue, KvDisplay};

use crate::{
    AnnealingConfig, Error, GeneticConfig, Result, Solver, SolverKind, TwoOptConfig,
};

/// Command-line options for one benchmark run.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct RunOptions {
    /// Solvers to run: `all` or a comma list such as `nn,2opt,sa,ga`.
    #[cli(long = "solvers", parse_with = "SolverKind::parse_list")]
    #[kv(fmt = "list")]
    pub solvers: Vec<SolverKind>,
    /// Worker count per solver. 0 uses all cores but one, 1 is sequential.
    #[cli(long = "threads")]
    pub threads: usize,
    /// Seed for the stochastic solvers. Unset means a fresh OS seed per run.
    #[cli(long = "seed")]
    #[kv(fmt = "opt")]
    pub seed: Option<u64>,
    #[cli(long = "two-opt-max-iterations")]
    pub two_opt_max_iterations: usize,
    /// City count above which the 2-opt scan is split across workers.
    #[cli(long = "two-opt-parallel-threshold")]
    pub two_opt_parallel_threshold: usize,
    #[cli(long = "sa-initial-temperature")]
    pub sa_initial_temperature: f64,
    #[cli(long = "sa-cooling-rate")]
    pub sa_cooling_rate: f64,
    #[cli(long = "sa-iterations-per-temperature")]
    pub sa_iterations_per_temperature: usize,
    #[cli(long = "sa-min-temperature")]
    pub sa_min_temperature: f64,
    /// Unset scales with the city count.
    #[cli(long = "ga-population-size")]
    #[kv(fmt = "opt")]
    pub ga_population_size: Option<usize>,
    /// Unset scales with the city count.
    #[cli(long = "ga-generations")]
    #[kv(fmt = "opt")]
    pub ga_generations: Option<usize>,
    #[cli(long = "ga-mutation-rate")]
    pub ga_mutation_rate: f64,
    #[cli(long = "ga-elitism-rate")]
    pub ga_elitism_rate: f64,
    #[cli(long = "ga-tournament-size")]
    pub ga_tournament_size: usize,
    #[cli(long = "ga-stagnation-limit")]
    #[kv(fmt = "opt")]
    pub ga_stagnation_limit: Option<usize>,
    /// Structured logging level.
    #[cli(long = "log-level", parse_with = "LogLevel::parse")]
    pub log_level: LogLevel,
    /// Logging output format.
    #[cli(long = "log-format", parse_with = "LogFormat::parse")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    #[cli(long = "log-timestamp")]
    pub log_timestamp: bool,
    /// Optional output file path for logs. Empty means stderr.
    #[cli(long = "log-output")]
    pub log_output: String,
    /// Optional input file path for cities. Empty means stdin.
    #[cli(long = "input")]
    pub input: String,
    /// Optional output file path for the best tour. Empty means stdout.
    #[cli(long = "output")]
    pub output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for RunOptions {
    fn default() -> Self {
        let two_opt = TwoOptConfig::default();
        let annealing = AnnealingConfig::default();
        let genetic = GeneticConfig::default();
        Self {
            solvers: SolverKind::ALL.to_vec(),
            threads: 0,
            seed: None,
            two_opt_max_iterations: two_opt.max_iterations,
            two_opt_parallel_threshold: two_opt.parallel_threshold,
            sa_initial_temperature: annealing.initial_temperature,
            sa_cooling_rate: annealing.cooling_rate,
            sa_iterations_per_temperature: annealing.iterations_per_temperature,
            sa_min_temperature: annealing.min_temperature,
            ga_population_size: None,
            ga_generations: None,
            ga_mutation_rate: genetic.mutation_rate,
            ga_elitism_rate: genetic.elitism_rate,
            ga_tournament_size: genetic.tournament_size,
            ga_stagnation_limit: None,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
            input: String::new(),
            output: String::new(),
        }
    }
}

impl RunOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    pub fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::invalid_input(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        Ok(options)
    }

    pub fn usage() -> &'static str {
        concat!(
            "Usage:\n",
            "  tsp-heur [options] [--input cities.txt]\n",
            "  tsp-heur [options] < cities.txt\n\n",
            "Input is whitespace-separated `x,y` or `name,x,y` tokens.\n\n",
            "Options:\n",
            "  --solvers <all|nn,2opt,sa,ga>\n",
            "  --threads <usize>\n",
            "  --seed <u64>\n",
            "  --two-opt-max-iterations <usize>\n",
            "  --two-opt-parallel-threshold <usize>\n",
            "  --sa-initial-temperature <f64>\n",
            "  --sa-cooling-rate <f64>\n",
            "  --sa-iterations-per-temperature <usize>\n",
            "  --sa-min-temperature <f64>\n",
            "  --ga-population-size <usize>\n",
            "  --ga-generations <usize>\n",
            "  --ga-mutation-rate <f64>\n",
            "  --ga-elitism-rate <f64>\n",
            "  --ga-tournament-size <usize>\n",
            "  --ga-stagnation-limit <usize>\n",
            "  --log-level <error|warn|info|debug|trace|off>\n",
            "  --log-format <compact|pretty>\n",
            "  --log-timestamp[=<bool>]\n",
            "  --no-log-timestamp\n",
            "  --log-output <path>\n",
            "  --input <path>\n",
            "  --output <path>\n",
            "  --help\n",
            "\n",
            "Examples:\n",
            "  tsp-heur --solvers nn,2opt --output tour.txt < cities.txt\n",
            "  tsp-heur --input cities.txt --seed 7 --threads 1\n",
            "  tsp-heur --solvers=ga --ga-generations=2000 --log-level=info < cities.txt\n",
            "  tsp-heur --log-level=debug --log-format=pretty --log-output run.log < cities.txt\n",
        )
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        non_stdio_path(&self.log_output)
    }

    pub fn output_path(&self) -> Option<&Path> {
        non_stdio_path(&self.output)
    }

    pub fn input_path(&self) -> Option<&Path> {
        non_stdio_path(&self.input)
    }

    pub fn two_opt_config(&self) -> TwoOptConfig {
        TwoOptConfig::default()
            .with_max_iterations(self.two_opt_max_iterations)
            .with_parallel_threshold(self.two_opt_parallel_threshold)
            .with_threads(self.threads)
    }

    pub fn annealing_config(&self) -> AnnealingConfig {
        let config = AnnealingConfig::default()
            .with_initial_temperature(self.sa_initial_temperature)
            .with_cooling_rate(self.sa_cooling_rate)
            .with_iterations_per_temperature(self.sa_iterations_per_temperature)
            .with_min_temperature(self.sa_min_temperature)
            .with_threads(self.threads);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    /// Starts from the preset for `n` cities; explicit sizes win.
    pub fn genetic_config(&self, n: usize) -> GeneticConfig {
        let mut config = GeneticConfig::scaled(n)
            .with_mutation_rate(self.ga_mutation_rate)
            .with_elitism_rate(self.ga_elitism_rate)
            .with_tournament_size(self.ga_tournament_size)
            .with_threads(self.threads);
        if let Some(population_size) = self.ga_population_size {
            config = config.with_population_size(population_size);
        }
        if let Some(generations) = self.ga_generations {
            config = config.with_generations(generations);
        }
        if let Some(limit) = self.ga_stagnation_limit {
            config = config.with_stagnation_limit(limit);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    /// Validates every selected solver's config before any search starts.
    pub fn build_solvers(&self, n: usize) -> Result<Vec<Box<dyn Solver>>> {
        for kind in &self.solvers {
            match kind {
                SolverKind::NearestNeighbor => {}
                SolverKind::TwoOpt => self.two_opt_config().validate()?,
                SolverKind::Annealing => self.annealing_config().validate()?,
                SolverKind::Genetic => self.genetic_config(n).validate()?,
            }
        }
        Ok(self.solvers.iter().map(|kind| kind.build(self, n)).collect())
    }
}

fn non_stdio_path(raw: &str) -> Option<&Path> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        None
    } else {
        Some(Path::new(raw))
    }
}
