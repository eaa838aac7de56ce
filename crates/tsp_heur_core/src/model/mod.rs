pub mod city;
pub mod distance;
pub mod problem;
pub mod tour;

pub use city::City;
pub use distance::DistanceTable;
pub use problem::Problem;
pub use tour::Tour;
