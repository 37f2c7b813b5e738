//! Feature importance reporting and model dumps.

use crate::booster::{Booster, FeatureImportance};
use crate::core::error::Result;
use crate::core::types::ImportanceType;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Normalized importance of the features a model actually splits on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportanceReport {
    /// Sorted by descending gain share
    pub features: Vec<FeatureImportance>,
}

impl ImportanceReport {
    pub fn from_booster(booster: &Booster) -> Self {
        ImportanceReport {
            features: booster.feature_importance(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The `n` most important features by `kind`.
    pub fn top(&self, n: usize, kind: ImportanceType) -> Vec<&FeatureImportance> {
        let mut ranked: Vec<&FeatureImportance> = self.features.iter().collect();
        ranked.sort_by(|a, b| b.value(kind).total_cmp(&a.value(kind)));
        ranked.truncate(n);
        ranked
    }

    /// Fixed-width ranking table.
    pub fn render(&self) -> String {
        let width = self
            .features
            .iter()
            .map(|f| f.feature.len())
            .max()
            .unwrap_or(0)
            .max("feature".len());

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>4}  {:<width$}  {:>10}  {:>10}  {:>10}",
            "rank",
            "feature",
            "gain",
            "cover",
            "frequency",
            width = width
        );
        for (rank, f) in self.features.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>4}  {:<width$}  {:>10.6}  {:>10.6}  {:>10.6}",
                rank + 1,
                f.feature,
                f.gain,
                f.cover,
                f.frequency,
                width = width
            );
        }
        out
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_text(path.as_ref(), &self.render())
    }
}

/// XGBoost-format text dump of every tree in `booster`.
pub fn render_dump(booster: &Booster, with_stats: bool) -> String {
    booster.dump_model(with_stats)
}

/// Write the model dump, with statistics, to `path`.
pub fn write_dump<P: AsRef<Path>>(booster: &Booster, path: P) -> Result<()> {
    write_text(path.as_ref(), &render_dump(booster, true))
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoosterParams;
    use crate::dataset::DMatrix;
    use ndarray::{Array1, Array2};

    fn trained() -> Booster {
        // Only column "signal" separates the classes.
        let features = Array2::from_shape_fn((40, 2), |(r, c)| if c == 0 { r as f64 } else { 1.0 });
        let labels = Array1::from_iter((0..40).map(|r| if r >= 20 { 1.0 } else { 0.0 }));
        let dmat = DMatrix::from_f64(&features, vec!["signal".into(), "constant".into()])
            .unwrap()
            .with_labels(labels)
            .unwrap();
        let params = BoosterParams {
            max_depth: 2,
            nthread: 1,
            ..BoosterParams::default()
        };
        let mut booster = Booster::new(&params, &dmat).unwrap();
        for _ in 0..3 {
            booster.update(&dmat).unwrap();
        }
        booster
    }

    #[test]
    fn test_report_lists_used_features_only() {
        let report = ImportanceReport::from_booster(&trained());
        assert_eq!(report.len(), 1);
        assert_eq!(report.features[0].feature, "signal");
        assert!((report.features[0].gain - 1.0).abs() < 1e-12);

        let table = report.render();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("rank") && lines[0].contains("frequency"));
        assert!(lines[1].contains("signal") && lines[1].contains("1.000000"));
    }

    #[test]
    fn test_top_respects_kind() {
        let report = ImportanceReport {
            features: vec![
                FeatureImportance {
                    feature: "a".into(),
                    gain: 0.7,
                    cover: 0.2,
                    frequency: 0.5,
                },
                FeatureImportance {
                    feature: "b".into(),
                    gain: 0.3,
                    cover: 0.8,
                    frequency: 0.5,
                },
            ],
        };
        assert_eq!(report.top(1, ImportanceType::Gain)[0].feature, "a");
        assert_eq!(report.top(1, ImportanceType::Cover)[0].feature, "b");
        assert_eq!(report.top(5, ImportanceType::Frequency).len(), 2);
    }

    #[test]
    fn test_dump_written_with_stats() {
        let booster = trained();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model/dump.txt");
        write_dump(&booster, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("booster[0]:\n0:[signal<"));
        assert!(text.contains("gain="));
        assert_eq!(text.matches("booster[").count(), 3);
        assert!(!render_dump(&booster, false).contains("cover="));
    }
}
