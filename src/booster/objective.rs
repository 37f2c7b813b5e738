//! Learning objectives.
//!
//! An objective turns the current margins and labels into first and second
//! order gradient statistics, and maps margins to the output scale.

use crate::core::constants::MIN_HESSIAN;
use crate::core::error::{BoostGridError, Result};
use crate::core::types::{Hist, Label, ObjectiveType, Score};
use std::fmt::Debug;

/// Gradient and hessian of the loss for one row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradientPair {
    pub grad: Hist,
    pub hess: Hist,
}

impl GradientPair {
    pub fn new(grad: Hist, hess: Hist) -> Self {
        GradientPair { grad, hess }
    }
}

impl std::ops::AddAssign for GradientPair {
    fn add_assign(&mut self, other: Self) {
        self.grad += other.grad;
        self.hess += other.hess;
    }
}

impl std::ops::Sub for GradientPair {
    type Output = GradientPair;

    fn sub(self, other: Self) -> GradientPair {
        GradientPair::new(self.grad - other.grad, self.hess - other.hess)
    }
}

impl std::ops::Add for GradientPair {
    type Output = GradientPair;

    fn add(self, other: Self) -> GradientPair {
        GradientPair::new(self.grad + other.grad, self.hess + other.hess)
    }
}

/// Loss function driving the booster.
pub trait Objective: Debug + Send + Sync {
    /// Objective name as used in parameter maps
    fn name(&self) -> &'static str;

    /// Margin every row starts from before the first tree
    fn base_margin(&self) -> Score;

    /// Gradient statistics for every row
    fn gradients(&self, margins: &[Score], labels: &[Label], out: &mut [GradientPair]) -> Result<()>;

    /// Map a margin to the output scale
    fn transform(&self, margin: Score) -> Score;
}

/// `binary:logistic`: log loss on a sigmoid of the margin.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticObjective;

/// Numerically stable logistic function.
#[inline]
pub fn sigmoid(x: Score) -> Score {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

impl Objective for LogisticObjective {
    fn name(&self) -> &'static str {
        "binary:logistic"
    }

    fn base_margin(&self) -> Score {
        // logit(0.5)
        0.0
    }

    fn gradients(&self, margins: &[Score], labels: &[Label], out: &mut [GradientPair]) -> Result<()> {
        if margins.len() != labels.len() || out.len() != labels.len() {
            return Err(BoostGridError::dimension_mismatch(
                format!("{} margins and gradient slots", labels.len()),
                format!("{} margins, {} slots", margins.len(), out.len()),
            ));
        }

        for ((slot, &margin), &label) in out.iter_mut().zip(margins).zip(labels) {
            let p = sigmoid(margin) as Hist;
            let y = label as Hist;
            *slot = GradientPair::new(p - y, (p * (1.0 - p)).max(MIN_HESSIAN));
        }
        Ok(())
    }

    fn transform(&self, margin: Score) -> Score {
        sigmoid(margin)
    }
}

/// Objective implementation for the configured type.
pub fn create_objective(objective: ObjectiveType) -> Box<dyn Objective> {
    match objective {
        ObjectiveType::BinaryLogistic => Box::new(LogisticObjective),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert_relative_eq!(sigmoid(2.0) + sigmoid(-2.0), 1.0, epsilon = 1e-6);
        assert!(sigmoid(-100.0) >= 0.0);
        assert!(sigmoid(100.0) <= 1.0);
    }

    #[test]
    fn test_logistic_gradients() {
        let objective = LogisticObjective;
        let mut out = vec![GradientPair::default(); 2];
        objective
            .gradients(&[0.0, 0.0], &[1.0, 0.0], &mut out)
            .unwrap();

        assert_relative_eq!(out[0].grad, -0.5);
        assert_relative_eq!(out[1].grad, 0.5);
        assert_relative_eq!(out[0].hess, 0.25);
    }

    #[test]
    fn test_hessian_floor() {
        let objective = LogisticObjective;
        let mut out = vec![GradientPair::default(); 1];
        objective.gradients(&[80.0], &[1.0], &mut out).unwrap();
        assert!(out[0].hess >= MIN_HESSIAN);
    }

    #[test]
    fn test_length_mismatch() {
        let objective = create_objective(ObjectiveType::BinaryLogistic);
        let mut out = vec![GradientPair::default(); 1];
        assert!(objective.gradients(&[0.0, 1.0], &[1.0], &mut out).is_err());
        assert_eq!(objective.name(), "binary:logistic");
    }
}
