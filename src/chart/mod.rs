pub mod views;

use crate::error::RenderError;
use crate::processing::aggregate::NamedSeries;

/// A text label pinned to a data point.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Everything a plotting backend needs for one figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub series: Vec<NamedSeries>,
    pub annotations: Vec<Annotation>,
}

impl Chart {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.series.len()).sum()
    }

    /// Drop series without points and report each one. Fails when nothing
    /// drawable is left.
    pub fn without_empty_series(self) -> Result<(Chart, Vec<RenderError>), RenderError> {
        let (kept, empty): (Vec<NamedSeries>, Vec<NamedSeries>) =
            self.series.into_iter().partition(|s| !s.series.is_empty());

        if kept.is_empty() {
            return Err(RenderError::NothingToRender { title: self.title });
        }

        let skipped = empty
            .into_iter()
            .map(|s| RenderError::EmptySeries { label: s.label })
            .collect();

        Ok((
            Chart {
                series: kept,
                ..self
            },
            skipped,
        ))
    }
}

/// A plotting backend. Receives charts that have at least one non-empty
/// series.
pub trait ChartEmitter {
    fn emit(&mut self, chart: Chart) -> Result<(), RenderError>;
}

/// Collects charts in memory.
impl ChartEmitter for Vec<Chart> {
    fn emit(&mut self, chart: Chart) -> Result<(), RenderError> {
        self.push(chart);
        Ok(())
    }
}
