//! Binary classification metrics.

use crate::core::constants::PROBABILITY_THRESHOLD;
use crate::core::types::{Label, Score};
use ndarray::ArrayView1;

const LOGLOSS_EPS: f64 = 1e-16;

/// Area under the ROC curve.
///
/// Computed from ranks: tied scores share their average rank, so a model
/// that outputs a constant gets exactly 0.5. Returns 0.5 when one of the two
/// classes is absent.
pub fn auc(probabilities: &ArrayView1<'_, Score>, labels: &ArrayView1<'_, Label>) -> f64 {
    let n = probabilities.len().min(labels.len());
    if n == 0 {
        return 0.5;
    }

    let mut pairs: Vec<(f64, bool)> = probabilities
        .iter()
        .zip(labels.iter())
        .map(|(&p, &y)| (p as f64, y > 0.5))
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let total_pos = pairs.iter().filter(|(_, positive)| *positive).count() as f64;
    let total_neg = n as f64 - total_pos;
    if total_pos == 0.0 || total_neg == 0.0 {
        return 0.5;
    }

    // Sum of positive ranks, with ties averaged.
    let mut rank_sum = 0.0;
    let mut i = 0;
    while i < pairs.len() {
        let mut j = i;
        while j + 1 < pairs.len() && pairs[j + 1].0 == pairs[i].0 {
            j += 1;
        }
        let average_rank = (i + j) as f64 / 2.0 + 1.0;
        let positives = pairs[i..=j].iter().filter(|(_, positive)| *positive).count();
        rank_sum += average_rank * positives as f64;
        i = j + 1;
    }

    (rank_sum - total_pos * (total_pos + 1.0) / 2.0) / (total_pos * total_neg)
}

/// Fraction of rows whose thresholded prediction disagrees with the label.
pub fn error_rate(probabilities: &ArrayView1<'_, Score>, labels: &ArrayView1<'_, Label>) -> f64 {
    let n = probabilities.len().min(labels.len());
    if n == 0 {
        return 0.0;
    }

    let wrong = probabilities
        .iter()
        .zip(labels.iter())
        .filter(|&(&p, &y)| ((p as f64) > PROBABILITY_THRESHOLD) != (y > 0.5))
        .count();

    wrong as f64 / n as f64
}

/// Mean negative log-likelihood of the labels.
pub fn log_loss(probabilities: &ArrayView1<'_, Score>, labels: &ArrayView1<'_, Label>) -> f64 {
    let n = probabilities.len().min(labels.len());
    if n == 0 {
        return 0.0;
    }

    let total: f64 = probabilities
        .iter()
        .zip(labels.iter())
        .map(|(&p, &y)| {
            let p = (p as f64).clamp(LOGLOSS_EPS, 1.0 - LOGLOSS_EPS);
            let y = y as f64;
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();

    total / n as f64
}
