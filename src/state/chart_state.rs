use crate::chart::{Chart, ChartEmitter};
use crate::error::RenderError;

/// Line colors, cycled per series.
pub const COLOR_PALETTE: [[u8; 4]; 10] = [
    [31, 119, 180, 255],  // Blue
    [255, 127, 14, 255],  // Orange
    [44, 160, 44, 255],   // Green
    [214, 39, 40, 255],   // Red
    [148, 103, 189, 255], // Purple
    [140, 86, 75, 255],   // Brown
    [227, 119, 194, 255], // Pink
    [127, 127, 127, 255], // Gray
    [188, 189, 34, 255],  // Olive
    [23, 190, 207, 255],  // Cyan
];

pub fn color_for_index(index: usize) -> [u8; 4] {
    COLOR_PALETTE[index % COLOR_PALETTE.len()]
}

/// Direction for table column sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

static NEXT_CHART_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

fn next_chart_id() -> u64 {
    NEXT_CHART_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
}

/// A chart on screen plus its display toggles.
#[derive(Debug, Clone)]
pub struct ChartState {
    pub id: u64,
    pub chart: Chart,
    pub colors: Vec<[u8; 4]>,
    pub visible: Vec<bool>,
    pub show_table: bool,
    pub show_stats: bool,
    pub show_annotations: bool,
    /// Table sort state: (column_index, direction). None = series order.
    pub table_sort: Option<(usize, SortDirection)>,
}

impl ChartState {
    pub fn new(chart: Chart) -> Self {
        let n = chart.series.len();
        Self {
            id: next_chart_id(),
            colors: (0..n).map(color_for_index).collect(),
            visible: vec![true; n],
            show_table: false,
            show_stats: false,
            show_annotations: !chart.annotations.is_empty(),
            table_sort: None,
            chart,
        }
    }
}

/// Charts emitted by the pipeline, in emission order.
#[derive(Debug, Default)]
pub struct ChartBoard {
    pub charts: Vec<ChartState>,
}

impl ChartBoard {
    pub fn clear(&mut self) {
        self.charts.clear();
    }

    pub fn remove(&mut self, chart_id: u64) {
        self.charts.retain(|c| c.id != chart_id);
    }

    pub fn total_points(&self) -> usize {
        self.charts.iter().map(|c| c.chart.point_count()).sum()
    }
}

impl ChartEmitter for ChartBoard {
    fn emit(&mut self, chart: Chart) -> Result<(), RenderError> {
        if chart.series.iter().all(|s| s.series.is_empty()) {
            return Err(RenderError::NothingToRender { title: chart.title });
        }
        self.charts.push(ChartState::new(chart));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::aggregate::{NamedSeries, Series};

    fn chart(points: Vec<[f64; 2]>) -> Chart {
        Chart {
            title: "t".into(),
            x_title: "x".into(),
            y_title: "y".into(),
            series: vec![NamedSeries {
                label: "a".into(),
                series: Series { points },
            }],
            annotations: Vec::new(),
        }
    }

    #[test]
    fn board_collects_and_removes() {
        let mut board = ChartBoard::default();
        board.emit(chart(vec![[0.0, 1.0], [1.0, 2.0]])).unwrap();
        board.emit(chart(vec![[0.0, 3.0]])).unwrap();
        assert_eq!(board.charts.len(), 2);
        assert_eq!(board.total_points(), 3);
        assert_eq!(board.charts[0].colors, vec![color_for_index(0)]);

        let first = board.charts[0].id;
        board.remove(first);
        assert_eq!(board.charts.len(), 1);
        assert_ne!(board.charts[0].id, first);
    }

    #[test]
    fn board_refuses_blank_chart() {
        let mut board = ChartBoard::default();
        assert!(board.emit(chart(Vec::new())).is_err());
        assert!(board.charts.is_empty());
    }
}
