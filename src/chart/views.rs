use crate::chart::{Annotation, Chart};
use crate::config::PipelineConfig;
use crate::data::parser::{ParseReport, TableLayout};
use crate::data::sample::{Metric, Sample};
use crate::data::units::kib_to_mib;
use crate::processing::aggregate::{aggregate_groups, AggregationMode, NamedSeries, Series};
use crate::processing::filter::{filter_samples, group_by_allow_list, group_by_key};

/// Label placed at each "after" reading of the timeline view.
pub const INSERT_ANNOTATION: &str = "Insert";

/// The logical views of a parsed file.
pub fn build_charts(report: &ParseReport, config: &PipelineConfig) -> Vec<Chart> {
    match report.layout {
        TableLayout::SchemeOperation => operation_charts(&report.samples, config),
        TableLayout::Timeline => vec![timeline_chart(&report.samples)],
        TableLayout::RunOverlay => vec![run_overlay_chart(&report.samples, config.run_stride)],
    }
}

/// One chart per configured view, one line per `(scheme, operation)` of the
/// allow-lists.
pub fn operation_charts(samples: &[Sample], config: &PipelineConfig) -> Vec<Chart> {
    let benchmark = samples.iter().find_map(|s| s.benchmark.as_deref());

    config
        .views
        .iter()
        .map(|view| {
            let kept = filter_samples(samples, &config.schemes, &view.operations);
            let groups = group_by_allow_list(&kept, &config.schemes, &view.operations);
            let series = aggregate_groups(&groups, config.metric, config.smoothing);

            Chart {
                title: match benchmark {
                    Some(name) => format!("{} ({name})", view.title),
                    None => view.title.clone(),
                },
                x_title: config.smoothing.x_title().to_string(),
                y_title: config.metric.label().to_string(),
                series,
                annotations: Vec::new(),
            }
        })
        .collect()
}

/// Before/after memory of a single run in MiB against elapsed seconds, with
/// an annotation on every after reading.
pub fn timeline_chart(samples: &[Sample]) -> Chart {
    let line = |metric: Metric| Series {
        points: samples
            .iter()
            .filter_map(|s| Some([s.elapsed_secs?, kib_to_mib(s.metric(metric)?)]))
            .collect(),
    };

    let after = line(Metric::MemoryAfter);
    let annotations = after
        .points
        .iter()
        .map(|&[x, y]| Annotation {
            x,
            y,
            text: INSERT_ANNOTATION.to_string(),
        })
        .collect();

    Chart {
        title: "Memory Usage Over Time".to_string(),
        x_title: "Time Elapsed (seconds)".to_string(),
        y_title: "Memory Usage (MB)".to_string(),
        series: vec![
            NamedSeries {
                label: "Memory Before".to_string(),
                series: line(Metric::MemoryBefore),
            },
            NamedSeries {
                label: "Memory After".to_string(),
                series: after,
            },
        ],
        annotations,
    }
}

/// Available memory of every run plus their average.
pub fn run_overlay_chart(samples: &[Sample], stride: usize) -> Chart {
    let mode = AggregationMode::CrossRunMean { stride };
    let groups = group_by_key(samples);

    Chart {
        title: "Available Memory per Run".to_string(),
        x_title: mode.x_title().to_string(),
        y_title: Metric::FreeMemory.label().to_string(),
        series: aggregate_groups(&groups, Metric::FreeMemory, mode),
        annotations: Vec::new(),
    }
}
