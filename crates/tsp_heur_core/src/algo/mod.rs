pub mod annealing;
pub mod benchmark;
pub mod genetic;
pub mod nearest_neighbor;
pub mod solver;
pub mod two_opt;
