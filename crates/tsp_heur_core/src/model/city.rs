use std::fmt;

use crate::{Error, Result};

/// Labeled 2-D point. Immutable once constructed.
#[derive(Clone, Debug)]
pub struct City {
    id: usize,
    name: String,
    x: f64,
    y: f64,
}

impl City {
    /// Rejects empty names and non-finite coordinates.
    pub fn new(id: usize, name: impl Into<String>, x: f64, y: f64) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_input(format!("city {id}: name must not be empty")));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::invalid_input(format!(
                "city {id} ({name}): coordinates must be finite, got ({x}, {y})"
            )));
        }
        Ok(Self { id, name, x, y })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn dist(&self, rhs: &Self) -> f64 {
        let dx = self.x - rhs.x;
        let dy = self.y - rhs.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl PartialEq for City {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.x == other.x && self.y == other.y
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bx = ryu::Buffer::new();
        let mut by = ryu::Buffer::new();
        write!(f, "{},{},{}", self.name, bx.format(self.x), by.format(self.y))
    }
}

#[cfg(test)]
mod tests {
    use super::City;

    #[test]
    fn dist_of_three_four_five_triangle() {
        let a = City::new(0, "A", 0.0, 0.0).expect("valid city");
        let b = City::new(1, "B", 3.0, 4.0).expect("valid city");
        assert!((a.dist(&b) - 5.0).abs() < 1e-2);
        assert!((b.dist(&a) - 5.0).abs() < 1e-2);
        assert_eq!(a.dist(&a), 0.0);
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        assert!(City::new(0, "A", f64::NAN, 0.0).is_err());
        assert!(City::new(0, "A", 0.0, f64::INFINITY).is_err());
        assert!(City::new(0, "A", f64::NEG_INFINITY, 1.0).is_err());
    }

    #[test]
    fn empty_names_are_rejected() {
        let err = City::new(7, "  ", 0.0, 0.0).expect_err("blank name should fail");
        assert!(err.to_string().contains("name must not be empty"));
    }

    #[test]
    fn equality_uses_id_and_coordinates() {
        let a = City::new(1, "A", 1.0, 2.0).expect("valid city");
        let same = City::new(1, "A", 1.0, 2.0).expect("valid city");
        let moved = City::new(1, "A", 1.5, 2.0).expect("valid city");
        assert_eq!(a, same);
        assert_ne!(a, moved);
    }

    #[test]
    fn display_formats_as_name_x_y() {
        let city = City::new(0, "Depot", 1.5, -2.25).expect("valid city");
        assert_eq!(city.to_string(), "Depot,1.5,-2.25");
    }
}
