//! End-to-end comparison of two listings: load, align, transform, render.

use crate::config::CompareFileConfig;
use crate::data::{load_csv, DataConfig};
use crate::error::Result;
use crate::transform::Transformer;
use crate::types::{Comparison, Instrument};
use crate::viz::Renderer;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PRIMARY_LABEL_FX: &str = "UL AS, in GBP";
pub const SECONDARY_LABEL_FX: &str = "UL LSE, in GBP";
pub const PRIMARY_LABEL: &str = "UL AS";
pub const SECONDARY_LABEL: &str = "UL LSE";

/// Input files for one comparison run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub primary: PathBuf,
    pub secondary: PathBuf,
    /// FX series applied to the primary listing.
    pub fx: Option<PathBuf>,
}

impl InputPaths {
    pub fn from_config(config: &CompareFileConfig) -> Self {
        Self {
            primary: config.inputs.primary.clone(),
            secondary: config.inputs.secondary.clone(),
            fx: config.fx_path().map(Path::to_path_buf),
        }
    }
}

impl Default for InputPaths {
    fn default() -> Self {
        Self::from_config(&CompareFileConfig::default())
    }
}

/// Load every input file and build the aligned comparison.
///
/// With an FX file the primary listing is converted and both series are
/// labelled as GBP; without one both are compared in their own currencies.
pub fn compare_files(paths: &InputPaths, data_config: &DataConfig) -> Result<Comparison> {
    let primary = load_csv(&paths.primary, data_config)?;
    let secondary = load_csv(&paths.secondary, data_config)?;

    match &paths.fx {
        Some(fx_path) => {
            let fx = load_csv(fx_path, data_config)?;
            Transformer::with_fx(fx).compare(&[
                Instrument::converted(PRIMARY_LABEL_FX, primary),
                Instrument::native(SECONDARY_LABEL_FX, secondary),
            ])
        }
        None => Transformer::new().compare(&[
            Instrument::native(PRIMARY_LABEL, primary),
            Instrument::native(SECONDARY_LABEL, secondary),
        ]),
    }
}

/// Build the comparison and hand it to each renderer in order.
pub fn run(
    paths: &InputPaths,
    data_config: &DataConfig,
    renderers: &[&dyn Renderer],
) -> Result<Comparison> {
    let comparison = compare_files(paths, data_config)?;
    info!(
        "Rendering {} series with {} renderer(s)",
        comparison.series.len(),
        renderers.len()
    );
    for renderer in renderers {
        renderer.render(&comparison)?;
    }
    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompareError;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    struct Recording {
        seen: RefCell<Vec<usize>>,
    }

    impl Renderer for Recording {
        fn render(&self, comparison: &Comparison) -> Result<()> {
            self.seen.borrow_mut().push(comparison.dates.len());
            Ok(())
        }
    }

    fn write(dir: &TempDir, name: &str, rows: &[(&str, f64)]) -> PathBuf {
        let path = dir.path().join(name);
        let mut content = String::from("Date,Price\n");
        for (date, price) in rows {
            content.push_str(&format!("{date},{price}\n"));
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_paths() {
        let paths = InputPaths::default();
        assert_eq!(paths.primary, PathBuf::from("Unilever_AS.csv"));
        assert_eq!(paths.secondary, PathBuf::from("Unilever_LSE.csv"));
        assert_eq!(paths.fx, Some(PathBuf::from("EURGBP.csv")));
    }

    #[test]
    fn test_compare_files_with_fx() {
        let dir = TempDir::new().unwrap();
        let paths = InputPaths {
            primary: write(&dir, "as.csv", &[("2020-01-01", 100.0), ("2020-01-02", 110.0)]),
            secondary: write(&dir, "lse.csv", &[("2020-01-01", 90.0), ("2020-01-02", 99.0)]),
            fx: Some(write(&dir, "fx.csv", &[("2020-01-01", 0.9), ("2020-01-02", 0.9)])),
        };

        let comparison = compare_files(&paths, &DataConfig::default()).unwrap();
        let primary = comparison.get(PRIMARY_LABEL_FX).unwrap();
        assert!((primary.prices[0] - 90.0).abs() < 1e-12);
        assert!(comparison.get(SECONDARY_LABEL_FX).is_some());
    }

    #[test]
    fn test_compare_files_without_fx() {
        let dir = TempDir::new().unwrap();
        let paths = InputPaths {
            primary: write(&dir, "as.csv", &[("2020-01-01", 100.0)]),
            secondary: write(&dir, "lse.csv", &[("2020-01-01", 90.0)]),
            fx: None,
        };
        let comparison = compare_files(&paths, &DataConfig::default()).unwrap();
        assert!(comparison.get(PRIMARY_LABEL).is_some());
        assert!(comparison.get(SECONDARY_LABEL).is_some());
    }

    #[test]
    fn test_missing_fx_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let paths = InputPaths {
            primary: write(&dir, "as.csv", &[("2020-01-01", 100.0)]),
            secondary: write(&dir, "lse.csv", &[("2020-01-01", 90.0)]),
            fx: Some(dir.path().join("missing.csv")),
        };
        let err = compare_files(&paths, &DataConfig::default()).unwrap_err();
        assert!(matches!(err, CompareError::CsvError(_)));
    }

    #[test]
    fn test_run_calls_each_renderer() {
        let dir = TempDir::new().unwrap();
        let paths = InputPaths {
            primary: write(&dir, "as.csv", &[("2020-01-01", 1.0), ("2020-01-02", 2.0)]),
            secondary: write(&dir, "lse.csv", &[("2020-01-01", 1.0), ("2020-01-02", 2.0)]),
            fx: None,
        };
        let a = Recording {
            seen: RefCell::new(Vec::new()),
        };
        let b = Recording {
            seen: RefCell::new(Vec::new()),
        };

        run(&paths, &DataConfig::default(), &[&a, &b]).unwrap();
        assert_eq!(*a.seen.borrow(), vec![2]);
        assert_eq!(*b.seen.borrow(), vec![2]);
    }
}
