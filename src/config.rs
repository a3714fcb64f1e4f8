use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::sample::Metric;
use crate::error::ConfigError;
use crate::processing::aggregate::AggregationMode;

/// One scheme/operation chart: its title and the operations it compares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub title: String,
    pub operations: Vec<String>,
}

impl ViewConfig {
    pub fn new(title: &str, operations: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            operations: operations.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Static knobs of the pipeline. Passed explicitly into filtering and
/// aggregation; nothing reads it from global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scheme allow-list, also the legend order.
    pub schemes: Vec<String>,
    /// One chart per view; each view carries its operation allow-list.
    pub views: Vec<ViewConfig>,
    /// Reduction for scheme/operation charts.
    pub smoothing: AggregationMode,
    pub metric: Metric,
    /// Every Nth row of each run is kept in the run-overlay chart.
    pub run_stride: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schemes: ["no scheme", "none", "ref_counting", "seize", "crossbeam", "hazard_pointer"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            views: vec![
                ViewConfig::new("Insert Operations", &["enqueue", "insert"]),
                ViewConfig::new("Delete Operations", &["dequeue", "remove"]),
            ],
            smoothing: AggregationMode::default(),
            metric: Metric::default(),
            run_stride: 1,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.smoothing {
            AggregationMode::MovingAverage { window: 0 } => return Err(ConfigError::ZeroWindow),
            AggregationMode::BucketMean { bucket_size: 0 } => return Err(ConfigError::ZeroBucket),
            AggregationMode::CrossRunMean { stride: 0 } => return Err(ConfigError::ZeroStride),
            _ => {}
        }
        if self.run_stride == 0 {
            return Err(ConfigError::ZeroStride);
        }
        if self.views.is_empty() {
            return Err(ConfigError::NoViews);
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        tracing::info!("Settings loaded from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Settings saved to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.views.len(), 2);
        assert_eq!(config.smoothing, AggregationMode::MovingAverage { window: 10 });
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = PipelineConfig::from_json(
            r#"{ "schemes": ["seize"], "smoothing": { "mode": "bucket_mean", "bucket_size": 25 } }"#,
        )
        .unwrap();
        assert_eq!(config.schemes, vec!["seize".to_string()]);
        assert_eq!(config.smoothing, AggregationMode::BucketMean { bucket_size: 25 });
        assert_eq!(config.views, PipelineConfig::default().views);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let err = PipelineConfig::from_json(r#"{ "smoothing": { "mode": "moving_average", "window": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroWindow));

        let err = PipelineConfig::from_json(r#"{ "run_stride": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroStride));

        let err = PipelineConfig::from_json(r#"{ "views": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NoViews));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("memplot-settings-{}.json", std::process::id()));
        let mut config = PipelineConfig::default();
        config.run_stride = 5;
        config.save(&path).unwrap();
        let loaded = PipelineConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn bad_json_is_reported() {
        assert!(matches!(
            PipelineConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
