use std::{
    collections::HashSet,
    sync::{Arc, OnceLock},
};

use super::{City, Problem};
use crate::{Error, Result};

/// A closed cycle visiting every city of a [`Problem`] exactly once.
///
/// The order holds dense city slots. Cloning copies the order and shares the
/// problem. The total length is computed lazily and cached until the next
/// mutation.
#[derive(Clone, Debug)]
pub struct Tour {
    problem: Arc<Problem>,
    order: Vec<usize>,
    length: OnceLock<f64>,
}

impl Tour {
    /// Cities in input order.
    pub fn identity(problem: Arc<Problem>) -> Self {
        let order = (0..problem.n()).collect();
        Self::from_order_unchecked(problem, order)
    }

    /// Validates that `order` is a permutation of `0..problem.n()`.
    pub fn from_order(problem: Arc<Problem>, order: Vec<usize>) -> Result<Self> {
        let n = problem.n();
        if order.len() != n {
            return Err(Error::invalid_input(format!(
                "tour order has {} entries, expected {n}",
                order.len()
            )));
        }
        let mut seen = vec![false; n];
        for &slot in &order {
            if slot >= n || std::mem::replace(&mut seen[slot], true) {
                return Err(Error::invalid_input(format!(
                    "tour order is not a permutation (slot {slot})"
                )));
            }
        }
        Ok(Self::from_order_unchecked(problem, order))
    }

    pub(crate) fn from_order_unchecked(problem: Arc<Problem>, order: Vec<usize>) -> Self {
        debug_assert_eq!(order.len(), problem.n());
        Self {
            problem,
            order,
            length: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn problem(&self) -> &Arc<Problem> {
        &self.problem
    }

    /// Dense city slots in visiting order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn city(&self, position: usize) -> &City {
        self.problem.city(self.order[position])
    }

    pub fn cities(&self) -> impl Iterator<Item = &City> + '_ {
        self.order.iter().map(|&slot| self.problem.city(slot))
    }

    pub fn city_ids(&self) -> Vec<usize> {
        self.cities().map(City::id).collect()
    }

    /// True when the tour visits exactly the given ids, each once.
    pub fn is_permutation_of(&self, ids: &[usize]) -> bool {
        if ids.len() != self.len() {
            return false;
        }
        let expected: HashSet<usize> = ids.iter().copied().collect();
        let mut seen = HashSet::with_capacity(ids.len());
        expected.len() == ids.len()
            && self
                .cities()
                .all(|c| expected.contains(&c.id()) && seen.insert(c.id()))
    }

    /// Sum of consecutive edges plus the closing edge; 0 for fewer than 2 cities.
    pub fn total_length(&self) -> f64 {
        *self.length.get_or_init(|| self.compute_length())
    }

    fn compute_length(&self) -> f64 {
        let n = self.order.len();
        if n < 2 {
            return 0.0;
        }
        let closing = self.problem.dist(self.order[n - 1], self.order[0]);
        self.order
            .windows(2)
            .map(|w| self.problem.dist(w[0], w[1]))
            .sum::<f64>()
            + closing
    }

    #[inline]
    fn invalidate(&mut self) {
        self.length.take();
    }

    fn check_index(&self, idx: usize) -> Result<()> {
        if idx >= self.order.len() {
            return Err(Error::invalid_input(format!(
                "tour index {idx} out of range for {} cities",
                self.order.len()
            )));
        }
        Ok(())
    }

    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        if i != j {
            self.order.swap(i, j);
            self.invalidate();
        }
        Ok(())
    }

    /// Reverses positions `start..=end` in place. `start > end` is rejected.
    pub fn reverse(&mut self, start: usize, end: usize) -> Result<()> {
        self.check_index(start)?;
        self.check_index(end)?;
        if start > end {
            return Err(Error::invalid_input(format!(
                "reverse range start {start} is after end {end}"
            )));
        }
        let (mut lo, mut hi) = (start, end);
        while lo < hi {
            self.order.swap(lo, hi);
            lo += 1;
            hi -= 1;
        }
        if start != end {
            self.invalidate();
        }
        Ok(())
    }

    /// Length change of replacing edges `(i, i+1)` and `(j, j+1)` with `(i, j)`
    /// and `(i+1, j+1)`, positions wrapping around the cycle. Does not mutate.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not a valid position.
    #[inline]
    pub fn edge_delta(&self, i: usize, j: usize) -> f64 {
        let n = self.order.len();
        let a = self.order[i];
        let b = self.order[(i + 1) % n];
        let c = self.order[j];
        let d = self.order[(j + 1) % n];
        let p = &self.problem;
        (p.dist(a, c) + p.dist(b, d)) - (p.dist(a, b) + p.dist(c, d))
    }

    /// Applies the exchange measured by [`Tour::edge_delta`] for `i < j`.
    pub fn two_opt_move(&mut self, i: usize, j: usize) -> Result<()> {
        if i >= j {
            return Err(Error::invalid_input(format!(
                "2-opt move needs i < j, got ({i}, {j})"
            )));
        }
        self.reverse(i + 1, j)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Tour;
    use crate::{City, Problem};

    fn problem(points: &[(f64, f64)]) -> Arc<Problem> {
        let cities: Vec<City> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| City::new(i, format!("C{i}"), x, y).expect("valid city"))
            .collect();
        Arc::new(Problem::new(&cities, false).expect("valid problem"))
    }

    fn square() -> Arc<Problem> {
        problem(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    #[test]
    fn length_is_zero_for_tiny_tours() {
        assert_eq!(Tour::identity(problem(&[])).total_length(), 0.0);
        assert_eq!(Tour::identity(problem(&[(3.0, 4.0)])).total_length(), 0.0);
    }

    #[test]
    fn length_includes_closing_edge() {
        let tour = Tour::identity(square());
        assert!((tour.total_length() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn cached_length_is_stable_and_refreshed_after_mutation() {
        let mut tour = Tour::identity(square());
        let first = tour.total_length();
        assert_eq!(first, tour.total_length());

        tour.swap(1, 2).expect("valid swap");
        let crossed = 2.0 + 2.0 * 2f64.sqrt();
        assert!((tour.total_length() - crossed).abs() < 1e-9);

        tour.reverse(1, 2).expect("valid reverse");
        assert!((tour.total_length() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn reverse_full_range_flips_order() {
        let mut tour = Tour::identity(problem(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]));
        tour.reverse(0, 2).expect("valid reverse");
        let names: Vec<&str> = tour.cities().map(|c| c.name()).collect();
        assert_eq!(names, vec!["C2", "C1", "C0"]);
    }

    #[test]
    fn reverse_rejects_inverted_range() {
        let mut tour = Tour::identity(square());
        let err = tour.reverse(3, 1).expect_err("start > end should fail");
        assert!(err.to_string().contains("after end"));
        assert_eq!(tour.order(), &[0, 1, 2, 3]);
    }

    #[test]
    fn swap_rejects_out_of_range_and_ignores_same_index() {
        let mut tour = Tour::identity(square());
        assert!(tour.swap(0, 4).is_err());
        tour.swap(2, 2).expect("same index is a no-op");
        assert_eq!(tour.order(), &[0, 1, 2, 3]);
    }

    #[test]
    fn edge_delta_predicts_two_opt_move() {
        let mut tour = Tour::identity(problem(&[
            (0.0, 0.0),
            (5.0, 3.0),
            (1.0, 4.0),
            (6.0, 0.5),
            (2.5, 7.0),
            (-1.0, 2.0),
        ]));
        for i in 0..tour.len() - 2 {
            for j in i + 2..tour.len() {
                let before = tour.total_length();
                let delta = tour.edge_delta(i, j);
                let mut moved = tour.clone();
                moved.two_opt_move(i, j).expect("valid move");
                assert!((moved.total_length() - (before + delta)).abs() < 1e-9);
            }
        }
        tour.swap(0, 5).expect("valid swap");
        assert!(tour.is_permutation_of(&[0, 1, 2, 3, 4, 5]));
    }

    #[test]
    fn clone_is_independent_but_shares_problem() {
        let tour = Tour::identity(square());
        let mut copy = tour.clone();
        copy.swap(0, 1).expect("valid swap");
        assert_eq!(tour.order(), &[0, 1, 2, 3]);
        assert_eq!(copy.order(), &[1, 0, 2, 3]);
        assert!(Arc::ptr_eq(tour.problem(), copy.problem()));
    }

    #[test]
    fn from_order_rejects_duplicates_and_omissions() {
        assert!(Tour::from_order(square(), vec![0, 1, 1, 3]).is_err());
        assert!(Tour::from_order(square(), vec![0, 1, 2]).is_err());
        assert!(Tour::from_order(square(), vec![0, 1, 2, 9]).is_err());
        assert!(Tour::from_order(square(), vec![3, 2, 1, 0]).is_ok());
    }

    #[test]
    fn is_permutation_of_checks_ids() {
        let tour = Tour::identity(square());
        assert!(tour.is_permutation_of(&[3, 1, 0, 2]));
        assert!(!tour.is_permutation_of(&[0, 1, 2]));
        assert!(!tour.is_permutation_of(&[0, 1, 2, 2]));
    }
}
