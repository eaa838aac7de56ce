use std::{
    fs::File,
    io::{self, BufWriter, Write},
};

use crate::{Error, Result, RunOptions, Tour};

/// Writes one `name,x,y` line per city in tour order to `--output`, or stdout.
pub fn write_tour(options: &RunOptions, tour: &Tour) -> Result<()> {
    match options.output_path() {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                Error::other(format!(
                    "failed to create output file {}: {e}",
                    path.display()
                ))
            })?;
            write_lines(BufWriter::new(file), tour)
        }
        None => write_lines(io::stdout().lock(), tour),
    }
}

fn write_lines<W: Write>(mut out: W, tour: &Tour) -> Result<()> {
    for city in tour.cities() {
        writeln!(out, "{city}")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Arc};

    use super::{write_lines, write_tour};
    use crate::{Problem, RunOptions, Tour, algo::solver::fixtures::square};

    fn square_tour() -> Tour {
        let problem = Problem::new(&square(), false).expect("problem");
        Tour::from_order(Arc::new(problem), vec![0, 3, 2, 1]).expect("tour")
    }

    #[test]
    fn writes_cities_in_tour_order() {
        let mut buf = Vec::new();
        write_lines(&mut buf, &square_tour()).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "C0,0.0,0.0\nC3,0.0,1.0\nC2,1.0,1.0\nC1,1.0,0.0\n");
    }

    #[test]
    fn writes_to_output_file() {
        let path = std::env::temp_dir().join(format!(
            "tsp-heur-output-{}.txt",
            std::process::id()
        ));
        let options = RunOptions {
            output: path.display().to_string(),
            ..RunOptions::default()
        };
        write_tour(&options, &square_tour()).expect("write tour");
        let text = fs::read_to_string(&path).expect("read output");
        fs::remove_file(&path).expect("remove output");
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("C0,0.0,0.0\n"));
    }
}
