use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Text};

use crate::processing::statistics::SeriesStats;
use crate::state::chart_state::{ChartState, SortDirection};
use crate::state::theme::Theme;

/// Actions a chart panel can request from the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartAction {
    None,
    Close,
}

const TABLE_HEADERS: [&str; 3] = ["Series", "X", "Y"];

/// Helper to create a toolbar button with consistent min size.
fn toolbar_btn(ui: &mut egui::Ui, label: &str) -> egui::Response {
    ui.add(egui::Button::new(label).min_size(egui::vec2(0.0, 26.0)))
}

/// Helper to create a selected/toggled toolbar button.
fn toolbar_toggle_btn(ui: &mut egui::Ui, label: &str, active: bool) -> egui::Response {
    let btn = if active {
        egui::Button::new(egui::RichText::new(label).strong())
            .fill(ui.visuals().selection.bg_fill)
            .min_size(egui::vec2(0.0, 26.0))
    } else {
        egui::Button::new(label).min_size(egui::vec2(0.0, 26.0))
    };
    ui.add(btn)
}

/// Render one emitted chart. `panel_height` is the target height of the plot
/// or table area.
pub fn show_chart_panel(state: &mut ChartState, ui: &mut egui::Ui, theme: &Theme, panel_height: f32) -> ChartAction {
    let mut action = ChartAction::None;

    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(10))
        .corner_radius(egui::CornerRadius::same(8))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&state.chart.title);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let close_btn = egui::Button::new(
                        egui::RichText::new("Close").color(egui::Color32::from_rgb(220, 60, 60)),
                    )
                    .min_size(egui::vec2(0.0, 26.0));
                    if ui.add(close_btn).on_hover_text("Remove this chart").clicked() {
                        action = ChartAction::Close;
                    }
                });
            });

            ui.add_space(2.0);

            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                let table = state.show_table;
                if toolbar_toggle_btn(ui, if table { "Chart View" } else { "Table View" }, table)
                    .on_hover_text("Toggle between chart and data table")
                    .clicked()
                {
                    state.show_table = !state.show_table;
                }
                if toolbar_toggle_btn(ui, "Stats", state.show_stats).clicked() {
                    state.show_stats = !state.show_stats;
                }
                if !state.chart.annotations.is_empty()
                    && toolbar_toggle_btn(ui, "Labels", state.show_annotations)
                        .on_hover_text("Show point annotations")
                        .clicked()
                {
                    state.show_annotations = !state.show_annotations;
                }
                if toolbar_btn(ui, "Show All").clicked() {
                    state.visible.iter_mut().for_each(|v| *v = true);
                }

                ui.separator();

                for (i, named) in state.chart.series.iter().enumerate() {
                    let [r, g, b, a] = state.colors[i];
                    let text = egui::RichText::new(&named.label).color(egui::Color32::from_rgba_unmultiplied(r, g, b, a));
                    ui.checkbox(&mut state.visible[i], text);
                }
            });

            ui.add_space(4.0);

            if state.show_table {
                show_table_view(state, ui, panel_height);
            } else {
                show_plot(state, ui, theme, panel_height);
            }

            if state.show_stats {
                ui.add_space(4.0);
                show_stats(state, ui);
            }
        });

    action
}

fn show_plot(state: &ChartState, ui: &mut egui::Ui, theme: &Theme, height: f32) {
    let chart = &state.chart;

    Plot::new(("chart", state.id))
        .legend(Legend::default())
        .x_axis_label(chart.x_title.as_str())
        .y_axis_label(chart.y_title.as_str())
        .height(height)
        .show(ui, |plot_ui| {
            for (i, named) in chart.series.iter().enumerate() {
                if !state.visible[i] {
                    continue;
                }
                let [r, g, b, a] = state.colors[i];
                let points = PlotPoints::new(named.series.points.clone());
                plot_ui.line(
                    Line::new(points)
                        .name(&named.label)
                        .color(egui::Color32::from_rgba_unmultiplied(r, g, b, a))
                        .width(2.0),
                );
            }
            if state.show_annotations {
                for note in &chart.annotations {
                    plot_ui.text(
                        Text::new(PlotPoint::new(note.x, note.y), note.text.as_str())
                            .color(theme.annotation_color())
                            .anchor(egui::Align2::LEFT_BOTTOM),
                    );
                }
            }
        });
}

fn show_stats(state: &ChartState, ui: &mut egui::Ui) {
    for (i, named) in state.chart.series.iter().enumerate() {
        if !state.visible[i] {
            continue;
        }
        match SeriesStats::compute(&named.series) {
            Some(stats) => ui.monospace(stats.report(&named.label)),
            None => ui.weak(format!("{}: no data", named.label)),
        };
    }
}

// ---------------------------------------------------------------------------
// Table view
// ---------------------------------------------------------------------------

fn cycle_sort(state: &mut ChartState, col: usize) {
    state.table_sort = match state.table_sort {
        Some((c, SortDirection::Ascending)) if c == col => Some((col, SortDirection::Descending)),
        Some((c, SortDirection::Descending)) if c == col => None,
        _ => Some((col, SortDirection::Ascending)),
    };
}

/// One table row per visible point: (series index, x, y).
fn table_rows(state: &ChartState) -> Vec<(usize, f64, f64)> {
    let mut rows: Vec<(usize, f64, f64)> = state
        .chart
        .series
        .iter()
        .enumerate()
        .filter(|(i, _)| state.visible[*i])
        .flat_map(|(i, named)| named.series.points.iter().map(move |&[x, y]| (i, x, y)))
        .collect();

    if let Some((col, dir)) = state.table_sort {
        rows.sort_by(|a, b| {
            let cmp = match col {
                0 => a.0.cmp(&b.0),
                1 => a.1.total_cmp(&b.1),
                _ => a.2.total_cmp(&b.2),
            };
            match dir {
                SortDirection::Ascending => cmp,
                SortDirection::Descending => cmp.reverse(),
            }
        });
    }
    rows
}

fn show_table_view(state: &mut ChartState, ui: &mut egui::Ui, height: f32) {
    use egui_extras::{Column, TableBuilder};

    let rows = table_rows(state);
    if rows.is_empty() {
        ui.label("No points to show.");
        return;
    }

    let current_sort = state.table_sort;
    let clicked_col: std::cell::Cell<Option<usize>> = std::cell::Cell::new(None);

    ui.push_id(("table", state.id), |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(160.0))
            .columns(Column::auto().at_least(100.0), 2)
            .min_scrolled_height(height)
            .max_scroll_height(height)
            .header(20.0, |mut header| {
                for (col, title) in TABLE_HEADERS.iter().enumerate() {
                    header.col(|ui| {
                        let arrow = match current_sort {
                            Some((c, SortDirection::Ascending)) if c == col => " ^",
                            Some((c, SortDirection::Descending)) if c == col => " v",
                            _ => "",
                        };
                        if ui.button(format!("{title}{arrow}")).clicked() {
                            clicked_col.set(Some(col));
                        }
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let (series, x, y) = rows[row.index()];
                    row.col(|ui| {
                        ui.label(&state.chart.series[series].label);
                    });
                    row.col(|ui| {
                        ui.label(format!("{x:.3}"));
                    });
                    row.col(|ui| {
                        ui.label(format!("{y:.3}"));
                    });
                });
            });
    });

    if let Some(col) = clicked_col.get() {
        cycle_sort(state, col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Chart;
    use crate::processing::aggregate::{NamedSeries, Series};

    fn state() -> ChartState {
        ChartState::new(Chart {
            title: "t".into(),
            x_title: "x".into(),
            y_title: "y".into(),
            series: vec![
                NamedSeries {
                    label: "a".into(),
                    series: Series { points: vec![[0.0, 5.0], [1.0, 1.0]] },
                },
                NamedSeries {
                    label: "b".into(),
                    series: Series { points: vec![[0.0, 3.0]] },
                },
            ],
            annotations: Vec::new(),
        })
    }

    #[test]
    fn sort_cycles_through_three_states() {
        let mut s = state();
        cycle_sort(&mut s, 2);
        assert_eq!(s.table_sort, Some((2, SortDirection::Ascending)));
        cycle_sort(&mut s, 2);
        assert_eq!(s.table_sort, Some((2, SortDirection::Descending)));
        cycle_sort(&mut s, 2);
        assert_eq!(s.table_sort, None);
    }

    #[test]
    fn table_rows_follow_sort_and_visibility() {
        let mut s = state();
        assert_eq!(table_rows(&s), vec![(0, 0.0, 5.0), (0, 1.0, 1.0), (1, 0.0, 3.0)]);

        s.table_sort = Some((2, SortDirection::Ascending));
        let ys: Vec<f64> = table_rows(&s).iter().map(|r| r.2).collect();
        assert_eq!(ys, vec![1.0, 3.0, 5.0]);

        s.visible[0] = false;
        assert_eq!(table_rows(&s), vec![(1, 0.0, 3.0)]);
    }
}
