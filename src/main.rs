use std::time::Instant;

use log::{info, warn};

use tsp_heur_core::{
    Benchmark, CancelToken, Error, LogProgress, Result, RunOptions, logging, read_cities,
    render_report, write_tour,
};

fn main() -> Result<()> {
    let now = Instant::now();
    let options = RunOptions::from_args()?;
    logging::init_logger(&options)?;
    let cities = read_cities(&options)?;

    info!("input: n={}", cities.len());
    info!("options: {options}");

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("interrupt received, cancelling solvers");
        handler_token.cancel();
    })
    .map_err(|e| Error::other(format!("failed to install interrupt handler: {e}")))?;

    let solvers = options.build_solvers(cities.len())?;
    let results = Benchmark::new(solvers).run(&cities, &cancel, &LogProgress)?;

    eprint!("{}", render_report(&results));

    if let Some(best) = results.first() {
        write_tour(&options, &best.tour)?;
        info!(
            "output: solver={} n={} length={:.3} time={:.2}s",
            best.solver,
            best.tour.len(),
            best.length,
            now.elapsed().as_secs_f32()
        );
    }

    Ok(())
}
