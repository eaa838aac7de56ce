/// Snapshot emitted by a solver while it searches.
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    pub iteration: usize,
    pub best_length: f64,
    pub message: String,
}

impl Progress {
    pub fn new(iteration: usize, best_length: f64, message: impl Into<String>) -> Self {
        Self {
            iteration,
            best_length,
            message: message.into(),
        }
    }
}

/// Receives progress notifications. Observers must tolerate being called from
/// several solver threads at once when the benchmark harness runs in parallel.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, solver: &str, progress: &Progress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&str, &Progress) + Send + Sync,
{
    fn on_progress(&self, solver: &str, progress: &Progress) {
        self(solver, progress)
    }
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _solver: &str, _progress: &Progress) {}
}

/// Forwards notifications to the `log` facade at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, solver: &str, progress: &Progress) {
        log::debug!(
            "progress.{solver}: iter={} best={:.3} {}",
            progress.iteration,
            progress.best_length,
            progress.message
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::{NoProgress, Progress, ProgressObserver};

    #[test]
    fn closures_are_observers() {
        let seen = Mutex::new(Vec::new());
        let observer = |solver: &str, progress: &Progress| {
            seen.lock()
                .expect("lock")
                .push((solver.to_string(), progress.iteration));
        };

        observer.on_progress("two-opt", &Progress::new(3, 10.0, "pass"));
        NoProgress.on_progress("two-opt", &Progress::new(4, 9.0, "ignored"));

        let seen = seen.into_inner().expect("lock");
        assert_eq!(seen, vec![("two-opt".to_string(), 3)]);
    }
}
