use rayon::prelude::*;

use super::City;

/// Cities at or above this count fill the table rows in parallel.
pub const TABLE_PARALLEL_THRESHOLD: usize = 256;

/// Symmetric pairwise Euclidean distances, stored row-major in one flat buffer.
///
/// Rows and columns are dense slots `0..n`, i.e. positions in the city list
/// the table was built from.
#[derive(Clone, Debug)]
pub struct DistanceTable {
    n: usize,
    data: Vec<f64>,
}

impl DistanceTable {
    /// Builds the table, splitting rows across the current rayon pool when
    /// `parallel` is set and the instance is large enough to benefit.
    pub fn build(cities: &[City], parallel: bool) -> Self {
        let n = cities.len();
        let mut data = vec![0.0; n * n];
        let fill_row = |(i, row): (usize, &mut [f64])| {
            let from = &cities[i];
            for (cell, to) in row.iter_mut().zip(cities) {
                *cell = from.dist(to);
            }
        };

        let parallel = parallel && n >= TABLE_PARALLEL_THRESHOLD;
        // chunk size must be non-zero
        if n > 0 {
            if parallel {
                data.par_chunks_mut(n).enumerate().for_each(fill_row);
            } else {
                data.chunks_mut(n).enumerate().for_each(fill_row);
            }
        }

        log::debug!("distance_table: built n={n} parallel={parallel}");
        Self { n, data }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.n + to]
    }

    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * self.n..(from + 1) * self.n]
    }
}
