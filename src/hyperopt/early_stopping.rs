//! Early stopping on a monitored cross-validation metric.

use crate::core::types::IterationIndex;
use crate::metrics::MetricDirection;

/// Tracks a metric and signals when it has stopped improving.
///
/// A value counts as an improvement only when it is strictly better than the
/// best value seen so far. Training stops once `patience` consecutive rounds
/// pass without improvement.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    direction: MetricDirection,
    best_metric: f64,
    best_round: IterationIndex,
    rounds_without_improvement: usize,
    stopped: bool,
}

impl EarlyStopping {
    /// Creates a new early stopping monitor.
    pub fn new(patience: usize, direction: MetricDirection) -> Self {
        EarlyStopping {
            patience,
            direction,
            best_metric: direction.worst_value(),
            best_round: 0,
            rounds_without_improvement: 0,
            stopped: false,
        }
    }

    /// Record the metric of 1-based `round`; returns true once training should stop.
    pub fn update(&mut self, metric: f64, round: IterationIndex) -> bool {
        if self.stopped {
            return true;
        }

        if !metric.is_nan() && self.direction.is_better(metric, self.best_metric) {
            self.best_metric = metric;
            self.best_round = round;
            self.rounds_without_improvement = 0;
        } else {
            self.rounds_without_improvement += 1;
        }

        if self.rounds_without_improvement >= self.patience {
            self.stopped = true;
            log::debug!(
                "Early stopping at round {} (best {} at round {})",
                round,
                self.best_metric,
                self.best_round
            );
        }

        self.stopped
    }

    pub fn should_stop(&self) -> bool {
        self.stopped
    }

    pub fn best_metric(&self) -> f64 {
        self.best_metric
    }

    /// Round of the best value, 0 before any improvement.
    pub fn best_round(&self) -> IterationIndex {
        self.best_round
    }

    pub fn patience(&self) -> usize {
        self.patience
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stops_after_patience_rounds() {
        let mut monitor = EarlyStopping::new(2, MetricDirection::Minimize);
        assert!(!monitor.update(0.30, 1));
        assert!(!monitor.update(0.25, 2));
        assert!(!monitor.update(0.25, 3));
        assert!(monitor.update(0.26, 4));
        assert_eq!(monitor.best_round(), 2);
        assert_eq!(monitor.best_metric(), 0.25);
        assert!(monitor.should_stop());
    }

    #[test]
    fn test_equal_values_do_not_reset_patience() {
        let mut monitor = EarlyStopping::new(3, MetricDirection::Maximize);
        monitor.update(0.7, 1);
        monitor.update(0.7, 2);
        monitor.update(0.7, 3);
        assert!(monitor.update(0.7, 4));
        assert_eq!(monitor.best_round(), 1);
    }

    #[test]
    fn test_nan_is_never_an_improvement() {
        let mut monitor = EarlyStopping::new(1, MetricDirection::Minimize);
        assert!(monitor.update(f64::NAN, 1));
        assert_eq!(monitor.best_round(), 0);
    }
}
