use crate::processing::aggregate::Series;

/// Summary of one plotted line, shown next to the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// Last Y minus first Y: net growth or shrinkage over the run.
    pub net_change: f64,
}

impl SeriesStats {
    /// `None` for a series without finite Y values.
    pub fn compute(series: &Series) -> Option<Self> {
        let finite: Vec<f64> = series.ys().filter(|v| v.is_finite()).collect();
        let (&first, &last) = (finite.first()?, finite.last()?);

        let count = finite.len();
        let mean = finite.iter().sum::<f64>() / count as f64;
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        let mut sorted = finite;
        sorted.sort_by(f64::total_cmp);
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        Some(Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean,
            median,
            std_dev: variance.sqrt(),
            net_change: last - first,
        })
    }

    pub fn report(&self, label: &str) -> String {
        format!(
            "{label}: n={} min={:.2} max={:.2} mean={:.2} median={:.2} sd={:.2} net={:+.2}",
            self.count, self.min, self.max, self.mean, self.median, self.std_dev, self.net_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_finite_values() {
        let series = Series {
            points: vec![[0.0, 4.0], [1.0, f64::NAN], [2.0, 1.0], [3.0, 3.0], [4.0, 2.0]],
        };
        let stats = SeriesStats::compute(&series).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.net_change, -2.0);
    }

    #[test]
    fn empty_series_has_no_stats() {
        assert!(SeriesStats::compute(&Series::default()).is_none());
    }

    #[test]
    fn report_mentions_label() {
        let series = Series { points: vec![[0.0, 1.0]] };
        let text = SeriesStats::compute(&series).unwrap().report("seize (enqueue)");
        assert!(text.starts_with("seize (enqueue): n=1"));
    }
}
