use std::collections::HashSet;

use super::{City, DistanceTable};
use crate::{Error, Result};

/// One problem instance: the input cities plus their distance table.
///
/// Built once per solver run and shared read-only (behind an `Arc`) by every
/// tour and worker of that run.
#[derive(Debug)]
pub struct Problem {
    cities: Vec<City>,
    table: DistanceTable,
}

impl Problem {
    /// Fails if two cities share an id.
    pub fn new(cities: &[City], parallel: bool) -> Result<Self> {
        let mut seen = HashSet::with_capacity(cities.len());
        if let Some(dup) = cities.iter().find(|c| !seen.insert(c.id())) {
            return Err(Error::invalid_input(format!(
                "duplicate city id {} ({})",
                dup.id(),
                dup.name()
            )));
        }

        Ok(Self {
            cities: cities.to_vec(),
            table: DistanceTable::build(cities, parallel),
        })
    }

    pub fn n(&self) -> usize {
        self.cities.len()
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn city(&self, slot: usize) -> &City {
        &self.cities[slot]
    }

    pub fn table(&self) -> &DistanceTable {
        &self.table
    }

    #[inline]
    pub fn dist(&self, from: usize, to: usize) -> f64 {
        self.table.get(from, to)
    }
}
