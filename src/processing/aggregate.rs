use serde::{Deserialize, Serialize};

use crate::data::sample::{Metric, Sample};
use crate::processing::downsampling::every_nth;
use crate::processing::filter::Group;

/// Legend label of the cross-run overlay line.
pub const AVERAGE_LABEL: &str = "Average";

/// How a group of samples is reduced to one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AggregationMode {
    /// Trailing mean over up to `window` samples. The first `window - 1`
    /// points average whatever history exists. X is the sample index.
    MovingAverage { window: usize },
    /// Mean of contiguous buckets of `bucket_size` samples. X is the
    /// bucket index.
    BucketMean { bucket_size: usize },
    /// Per-run lines against elapsed seconds (every `stride`-th row), plus
    /// one line averaging all runs at each shared X.
    CrossRunMean { stride: usize },
}

impl Default for AggregationMode {
    fn default() -> Self {
        AggregationMode::MovingAverage { window: 10 }
    }
}

impl AggregationMode {
    pub fn label(&self) -> &'static str {
        match self {
            AggregationMode::MovingAverage { .. } => "Moving average",
            AggregationMode::BucketMean { .. } => "Bucket mean",
            AggregationMode::CrossRunMean { .. } => "Cross-run mean",
        }
    }

    /// X-axis title for series produced in this mode.
    pub fn x_title(&self) -> &'static str {
        match self {
            AggregationMode::MovingAverage { .. } => "Index (Smoothed)",
            AggregationMode::BucketMean { .. } => "Bucket",
            AggregationMode::CrossRunMean { .. } => "Time Elapsed (seconds)",
        }
    }
}

/// Ordered `(x, y)` points of one plotted line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub points: Vec<[f64; 2]>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p[1])
    }
}

/// A series with its legend label.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub label: String,
    pub series: Series,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Trailing moving average over sample positions, with a growing window at
/// the start. Position `i` holding a value yields `[i, mean]`, the mean of
/// the values present in `values[i + 1 - w ..= i]` (clamped at index 0).
/// Absent positions yield no point but still occupy the window.
pub fn moving_average(values: &[Option<f64>], window: usize) -> Vec<[f64; 2]> {
    let window = window.max(1);
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_some())
        .map(|(i, _)| {
            let present: Vec<f64> = values[(i + 1).saturating_sub(window)..=i].iter().flatten().copied().collect();
            [i as f64, mean(&present)]
        })
        .collect()
}

/// One `[bucket index, mean]` point per bucket of `bucket_size` values. The
/// last bucket may be short. Absent values are left out of the mean; a
/// bucket with no values at all yields no point.
pub fn bucket_means(values: &[Option<f64>], bucket_size: usize) -> Vec<[f64; 2]> {
    values
        .chunks(bucket_size.max(1))
        .enumerate()
        .filter_map(|(bucket, chunk)| {
            let present: Vec<f64> = chunk.iter().flatten().copied().collect();
            (!present.is_empty()).then(|| [bucket as f64, mean(&present)])
        })
        .collect()
}

/// Mean Y across runs at every distinct X, sorted by X.
pub fn cross_run_mean<'a, I>(runs: I) -> Series
where
    I: IntoIterator<Item = &'a Series>,
{
    let mut points: Vec<[f64; 2]> = runs
        .into_iter()
        .flat_map(|s| s.points.iter().copied())
        .collect();
    points.sort_by(|a, b| a[0].total_cmp(&b[0]));

    Series {
        points: points
            .chunk_by(|a, b| a[0] == b[0])
            .map(|same_x| {
                let ys: Vec<f64> = same_x.iter().map(|p| p[1]).collect();
                [same_x[0][0], mean(&ys)]
            })
            .collect(),
    }
}

/// Reduce one same-key group, in its original order, to a series.
pub fn reduce_group(samples: &[&Sample], metric: Metric, mode: AggregationMode) -> Series {
    match mode {
        AggregationMode::MovingAverage { window } => {
            let values: Vec<Option<f64>> = samples.iter().map(|s| s.metric(metric)).collect();
            Series {
                points: moving_average(&values, window),
            }
        }
        AggregationMode::BucketMean { bucket_size } => {
            let values: Vec<Option<f64>> = samples.iter().map(|s| s.metric(metric)).collect();
            Series {
                points: bucket_means(&values, bucket_size),
            }
        }
        AggregationMode::CrossRunMean { stride } => {
            let mut points: Vec<[f64; 2]> = every_nth(samples, stride)
                .into_iter()
                .filter_map(|s| Some([s.elapsed_secs?, s.metric(metric)?]))
                .collect();
            // Runs are plotted against time, whatever order the rows came in.
            points.sort_by(|a, b| a[0].total_cmp(&b[0]));
            Series { points }
        }
    }
}

/// Reduce every group with the same mode. Cross-run mode appends exactly
/// one `Average` line computed from the already downsampled runs.
pub fn aggregate_groups(groups: &[Group<'_>], metric: Metric, mode: AggregationMode) -> Vec<NamedSeries> {
    let mut named: Vec<NamedSeries> = groups
        .iter()
        .map(|(key, members)| NamedSeries {
            label: key.to_string(),
            series: reduce_group(members, metric, mode),
        })
        .collect();

    if let AggregationMode::CrossRunMean { .. } = mode {
        let average = cross_run_mean(named.iter().map(|n| &n.series));
        named.push(NamedSeries {
            label: AVERAGE_LABEL.to_string(),
            series: average,
        });
    }

    named
}
