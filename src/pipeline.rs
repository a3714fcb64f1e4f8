use std::path::{Path, PathBuf};

use crate::chart::views::build_charts;
use crate::chart::ChartEmitter;
use crate::config::PipelineConfig;
use crate::data::loader::{load_file, RawTable};
use crate::data::parser::{parse_table, TableLayout};
use crate::error::{LoadError, RenderError, RowError};

/// What happened to one input file on its way to the emitter.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub path: PathBuf,
    pub layout: TableLayout,
    pub rows_read: usize,
    pub samples: usize,
    pub dropped_rows: Vec<RowError>,
    pub charts_emitted: usize,
    /// Series left out of otherwise drawable charts.
    pub skipped_series: Vec<RenderError>,
    /// Charts that could not be emitted at all.
    pub render_failures: Vec<RenderError>,
}

impl PipelineSummary {
    pub fn dropped_count(&self) -> usize {
        self.dropped_rows.len()
    }

    pub fn status_line(&self) -> String {
        format!(
            "{} ({}): {} rows, {} samples, {} dropped, {} charts",
            self.path.display(),
            self.layout.label(),
            self.rows_read,
            self.samples,
            self.dropped_count(),
            self.charts_emitted
        )
    }
}

/// Load, parse, aggregate and emit one file. File-level failures return
/// before anything reaches the emitter.
pub fn process_file<E>(path: &Path, config: &PipelineConfig, emitter: &mut E) -> Result<PipelineSummary, LoadError>
where
    E: ChartEmitter + ?Sized,
{
    let table = load_file(path)?;
    process_table(&table, config, emitter)
}

/// Run an already loaded table through the pipeline.
pub fn process_table<E>(table: &RawTable, config: &PipelineConfig, emitter: &mut E) -> Result<PipelineSummary, LoadError>
where
    E: ChartEmitter + ?Sized,
{
    let report = parse_table(table)?;
    let charts = build_charts(&report, config);

    let mut summary = PipelineSummary {
        path: table.path.clone(),
        layout: report.layout,
        rows_read: report.rows_read,
        samples: report.samples.len(),
        dropped_rows: report.dropped,
        charts_emitted: 0,
        skipped_series: Vec::new(),
        render_failures: Vec::new(),
    };

    for chart in charts {
        let (chart, skipped) = match chart.without_empty_series() {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::warn!("{e}");
                summary.render_failures.push(e);
                continue;
            }
        };
        for e in &skipped {
            tracing::debug!("{}: {e}", chart.title);
        }
        summary.skipped_series.extend(skipped);

        let title = chart.title.clone();
        match emitter.emit(chart) {
            Ok(()) => {
                tracing::info!("Emitted chart `{title}`");
                summary.charts_emitted += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to render `{title}`: {e}");
                summary.render_failures.push(e);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Chart;
    use crate::config::ViewConfig;
    use crate::data::loader::parse_text;
    use crate::processing::aggregate::AggregationMode;

    fn table(text: &str) -> RawTable {
        parse_text(Path::new("bench.csv"), text).unwrap()
    }

    fn enqueue_only(smoothing: AggregationMode) -> PipelineConfig {
        PipelineConfig {
            schemes: vec!["ref_counting".into()],
            views: vec![ViewConfig::new("Enqueue", &["enqueue"])],
            smoothing,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn two_batches_in_one_bucket() {
        let t = table(
            "Reclamation Scheme,Operation,Memory Before (KB),Memory After (KB)\n\
             ref_counting,enqueue,100 KB,120 KB\n\
             ref_counting,enqueue,120 KB,90 KB\n",
        );
        let mut charts: Vec<Chart> = Vec::new();
        let summary = process_table(&t, &enqueue_only(AggregationMode::BucketMean { bucket_size: 2 }), &mut charts).unwrap();

        assert_eq!(summary.charts_emitted, 1);
        assert_eq!(charts[0].series.len(), 1);
        assert_eq!(charts[0].series[0].label, "ref_counting (enqueue)");
        assert_eq!(charts[0].series[0].series.points, vec![[0.0, -5.0]]);
    }

    #[test]
    fn malformed_row_is_counted_and_skipped() {
        let t = table(
            "Reclamation Scheme,Operation,Memory Change (KB)\n\
             ref_counting,enqueue,512 KB\n\
             ref_counting,enqueue,abc KB\n\
             ref_counting,enqueue,256 KB\n",
        );
        let mut charts: Vec<Chart> = Vec::new();
        let summary = process_table(&t, &enqueue_only(AggregationMode::MovingAverage { window: 1 }), &mut charts).unwrap();

        assert_eq!(summary.rows_read, 3);
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.dropped_count(), 1);
        assert_eq!(charts[0].series[0].series.points, vec![[0.0, 512.0], [1.0, 256.0]]);
    }

    #[test]
    fn empty_keys_are_skipped_not_fatal() {
        let t = table(
            "Reclamation Scheme,Operation,Memory Change (KB)\n\
             seize,enqueue,1 KB\n",
        );
        let mut charts: Vec<Chart> = Vec::new();
        let summary = process_table(&t, &PipelineConfig::default(), &mut charts).unwrap();

        // The insert view draws seize (enqueue); the delete view has nothing.
        assert_eq!(summary.charts_emitted, 1);
        assert_eq!(charts[0].series.len(), 1);
        assert!(!summary.skipped_series.is_empty());
        assert_eq!(summary.render_failures.len(), 1);
        assert!(matches!(summary.render_failures[0], RenderError::NothingToRender { .. }));
    }

    #[test]
    fn disjoint_allow_list_renders_nothing() {
        let t = table(
            "Reclamation Scheme,Operation,Memory Change (KB)\n\
             seize,enqueue,1 KB\n",
        );
        let config = PipelineConfig {
            schemes: vec!["epoch".into()],
            ..PipelineConfig::default()
        };
        let mut charts: Vec<Chart> = Vec::new();
        let summary = process_table(&t, &config, &mut charts).unwrap();
        assert!(charts.is_empty());
        assert_eq!(summary.charts_emitted, 0);
        assert_eq!(summary.samples, 1);
    }

    #[test]
    fn missing_file_emits_nothing() {
        let path = std::env::temp_dir().join("memplot-no-such-export.csv");
        let mut charts: Vec<Chart> = Vec::new();
        let err = process_file(&path, &PipelineConfig::default(), &mut charts).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
        assert!(err.to_string().contains("memplot-no-such-export.csv"));
        assert!(charts.is_empty());
    }

    #[test]
    fn schema_mismatch_emits_nothing() {
        let t = table("Foo,Bar\nx,y\n");
        let mut charts: Vec<Chart> = Vec::new();
        let err = process_table(&t, &PipelineConfig::default(), &mut charts).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bench.csv"));
        assert!(message.contains("found [Foo, Bar]"));
        assert!(charts.is_empty());
    }

    struct RefusingEmitter;

    impl ChartEmitter for RefusingEmitter {
        fn emit(&mut self, chart: Chart) -> Result<(), RenderError> {
            Err(RenderError::NothingToRender { title: chart.title })
        }
    }

    #[test]
    fn emitter_failures_are_reported() {
        let t = table("1,0,100\n1,1,90\n");
        let summary = process_table(&t, &PipelineConfig::default(), &mut RefusingEmitter).unwrap();
        assert_eq!(summary.charts_emitted, 0);
        assert_eq!(summary.render_failures.len(), 1);
        assert_eq!(summary.samples, 2);
    }
}
