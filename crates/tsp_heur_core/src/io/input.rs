use std::{fs, io::Read};

use crate::{City, Error, Result, RunOptions};

/// Reads cities from `--input`, or stdin when no path is set.
pub fn read_cities(options: &RunOptions) -> Result<Vec<City>> {
    let text = match options.input_path() {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            Error::invalid_input(format!("failed to read input {}: {e}", path.display()))
        })?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    parse_cities(&text)
}

/// Parses whitespace-separated `x,y` or `name,x,y` tokens. Ids follow input
/// order starting at 0; unnamed cities are called `C<id>`.
pub fn parse_cities(text: &str) -> Result<Vec<City>> {
    let mut cities = Vec::new();
    for (id, tok) in text.split_whitespace().enumerate() {
        let fields: Vec<&str> = tok.split(',').collect();
        let (name, x_s, y_s) = match fields.as_slice() {
            [x, y] => (format!("C{id}"), *x, *y),
            [name, x, y] => (name.to_string(), *x, *y),
            _ => {
                return Err(Error::invalid_input(format!(
                    "Token {}: expected 'x,y' or 'name,x,y' but got: {tok}",
                    id + 1
                )));
            }
        };

        let x: f64 = x_s.parse().map_err(|_| {
            Error::invalid_input(format!("Token {}: invalid x coordinate: {x_s}", id + 1))
        })?;
        let y: f64 = y_s.parse().map_err(|_| {
            Error::invalid_input(format!("Token {}: invalid y coordinate: {y_s}", id + 1))
        })?;

        cities.push(City::new(id, name, x, y)?);
    }

    if cities.is_empty() {
        return Err(Error::invalid_input("No cities provided."));
    }

    Ok(cities)
}
