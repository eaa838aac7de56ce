use std::sync::Arc;

use tsp_heur_derive::CliValue;

use crate::{
    AnnealingSolver, CancelToken, City, Error, GeneticSolver, NearestNeighborSolver, Problem,
    ProgressObserver, Result, RunOptions, Tour, TwoOptSolver,
};

/// Moves must improve by more than this to count; absorbs floating-point noise.
pub const IMPROVEMENT_EPSILON: f64 = 1e-3;

/// A TSP heuristic. Each call builds its own [`Problem`] from `cities`, so
/// concurrent calls never share mutable state.
pub trait Solver: Send + Sync {
    fn name(&self) -> &str;

    /// Returns a tour over exactly the given cities, [`Error::Cancelled`] if
    /// `cancel` trips, or a validation error before any search starts.
    fn solve(
        &self,
        cities: &[City],
        cancel: &CancelToken,
        progress: &dyn ProgressObserver,
    ) -> Result<Tour>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, CliValue)]
#[cli_value(option = "solvers")]
pub enum SolverKind {
    #[cli(alias = "nn")]
    NearestNeighbor,
    #[cli(alias = "2opt")]
    TwoOpt,
    #[cli(alias = "sa")]
    Annealing,
    #[cli(alias = "ga")]
    Genetic,
}

impl SolverKind {
    pub const ALL: [Self; 4] = [
        Self::NearestNeighbor,
        Self::TwoOpt,
        Self::Annealing,
        Self::Genetic,
    ];

    /// `all` or a comma-separated list such as `nn,2opt,sa`.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::ALL.to_vec());
        }
        let mut kinds = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let kind = Self::parse(part)?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Err(Error::invalid_input("--solvers needs at least one solver"));
        }
        Ok(kinds)
    }

    /// Boxed solver configured from the run options. `n` sizes the genetic
    /// preset when population or generations are left unset.
    pub fn build(self, options: &RunOptions, n: usize) -> Box<dyn Solver> {
        match self {
            Self::NearestNeighbor => {
                Box::new(NearestNeighborSolver::new().with_threads(options.threads))
            }
            Self::TwoOpt => Box::new(TwoOptSolver::new(options.two_opt_config())),
            Self::Annealing => Box::new(AnnealingSolver::new(options.annealing_config())),
            Self::Genetic => Box::new(GeneticSolver::new(options.genetic_config(n))),
        }
    }
}

pub(crate) fn build_problem(cities: &[City], parallel: bool) -> Result<Arc<Problem>> {
    Problem::new(cities, parallel).map(Arc::new)
}


#[cfg(test)]
mod tests {
    use super::SolverKind;

    #[test]
    fn parse_list_accepts_all_and_aliases() {
        assert_eq!(SolverKind::parse_list("all").expect("parse"), SolverKind::ALL.to_vec());
        assert_eq!(
            SolverKind::parse_list("nn, 2opt,sa,nn").expect("parse"),
            vec![
                SolverKind::NearestNeighbor,
                SolverKind::TwoOpt,
                SolverKind::Annealing
            ]
        );
        assert_eq!(
            SolverKind::parse_list("genetic").expect("parse"),
            vec![SolverKind::Genetic]
        );
    }

    #[test]
    fn parse_list_rejects_unknown_and_empty() {
        let err = SolverKind::parse_list("nn,tabu").expect_err("unknown solver should fail");
        assert!(err.to_string().contains("Invalid value for --solvers: tabu"));
        assert!(SolverKind::parse_list(" , ").is_err());
    }

    #[test]
    fn built_solvers_report_their_kind_name() {
        let options = crate::RunOptions::default();
        for kind in SolverKind::ALL {
            assert_eq!(kind.build(&options, 10).name(), kind.as_str());
        }
    }

    #[test]
    fn kinds_display_in_kebab_case() {
        assert_eq!(SolverKind::NearestNeighbor.to_string(), "nearest-neighbor");
        assert_eq!(SolverKind::TwoOpt.to_string(), "two-opt");
    }
}
