use crate::config::{PipelineConfig, ViewConfig};
use crate::data::sample::Metric;
use crate::processing::aggregate::AggregationMode;

/// What the user asked for from the settings window.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    None,
    Apply(PipelineConfig),
    Save(PipelineConfig),
    Load,
    Close,
}

/// Editable copy of a [`PipelineConfig`]. List fields are edited as
/// comma-separated text.
pub struct SettingsDialogState {
    schemes_text: String,
    views: Vec<(String, String)>,
    smoothing: AggregationMode,
    window: usize,
    bucket_size: usize,
    stride: usize,
    metric: Metric,
    run_stride: usize,
    pub error: String,
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl SettingsDialogState {
    pub fn new(config: &PipelineConfig) -> Self {
        let (window, bucket_size, stride) = match config.smoothing {
            AggregationMode::MovingAverage { window } => (window, 10, 1),
            AggregationMode::BucketMean { bucket_size } => (10, bucket_size, 1),
            AggregationMode::CrossRunMean { stride } => (10, 10, stride),
        };
        Self {
            schemes_text: config.schemes.join(", "),
            views: config
                .views
                .iter()
                .map(|v| (v.title.clone(), v.operations.join(", ")))
                .collect(),
            smoothing: config.smoothing,
            window,
            bucket_size,
            stride,
            metric: config.metric,
            run_stride: config.run_stride,
            error: String::new(),
        }
    }

    /// Build and validate the config the dialog currently describes.
    pub fn to_config(&self) -> Result<PipelineConfig, String> {
        let config = PipelineConfig {
            schemes: split_list(&self.schemes_text),
            views: self
                .views
                .iter()
                .map(|(title, ops)| ViewConfig {
                    title: title.trim().to_string(),
                    operations: split_list(ops),
                })
                .collect(),
            smoothing: match self.smoothing {
                AggregationMode::MovingAverage { .. } => AggregationMode::MovingAverage { window: self.window },
                AggregationMode::BucketMean { .. } => AggregationMode::BucketMean { bucket_size: self.bucket_size },
                AggregationMode::CrossRunMean { .. } => AggregationMode::CrossRunMean { stride: self.stride },
            },
            metric: self.metric,
            run_stride: self.run_stride,
        };
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

/// Show the pipeline settings window.
pub fn show_settings_dialog(ctx: &egui::Context, state: &mut SettingsDialogState) -> SettingsAction {
    let mut open = true;
    let mut action = SettingsAction::None;

    egui::Window::new("Pipeline Settings")
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_width(520.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.label(egui::RichText::new("Schemes").strong().size(15.0));
                ui.label(egui::RichText::new("Comma separated; also the legend order.").weak());
                ui.add(egui::TextEdit::singleline(&mut state.schemes_text).desired_width(f32::INFINITY));

                ui.add_space(8.0);
                ui.label(egui::RichText::new("Views").strong().size(15.0));

                let mut remove: Option<usize> = None;
                egui::Frame::group(ui.style())
                    .inner_margin(egui::Margin::same(8))
                    .show(ui, |ui| {
                        egui::Grid::new("views_grid").num_columns(3).striped(true).show(ui, |ui| {
                            ui.strong("Title");
                            ui.strong("Operations");
                            ui.end_row();
                            for (i, (title, ops)) in state.views.iter_mut().enumerate() {
                                ui.add(egui::TextEdit::singleline(title).desired_width(160.0));
                                ui.add(egui::TextEdit::singleline(ops).desired_width(200.0));
                                if ui.small_button("Remove").clicked() {
                                    remove = Some(i);
                                }
                                ui.end_row();
                            }
                        });
                        if ui.button("Add View").clicked() {
                            state.views.push(("New View".to_string(), String::new()));
                        }
                    });
                if let Some(i) = remove {
                    state.views.remove(i);
                }

                ui.add_space(8.0);
                ui.label(egui::RichText::new("Aggregation").strong().size(15.0));
                ui.horizontal(|ui| {
                    let options = [
                        AggregationMode::MovingAverage { window: state.window },
                        AggregationMode::BucketMean { bucket_size: state.bucket_size },
                        AggregationMode::CrossRunMean { stride: state.stride },
                    ];
                    egui::ComboBox::from_id_salt("smoothing_mode")
                        .selected_text(state.smoothing.label())
                        .show_ui(ui, |ui| {
                            for option in options {
                                let selected = std::mem::discriminant(&option) == std::mem::discriminant(&state.smoothing);
                                if ui.selectable_label(selected, option.label()).clicked() {
                                    state.smoothing = option;
                                }
                            }
                        });
                    match state.smoothing {
                        AggregationMode::MovingAverage { .. } => {
                            ui.label("Window:");
                            ui.add(egui::DragValue::new(&mut state.window).range(1..=10_000));
                        }
                        AggregationMode::BucketMean { .. } => {
                            ui.label("Bucket size:");
                            ui.add(egui::DragValue::new(&mut state.bucket_size).range(1..=10_000));
                        }
                        AggregationMode::CrossRunMean { .. } => {
                            ui.label("Stride:");
                            ui.add(egui::DragValue::new(&mut state.stride).range(1..=10_000));
                        }
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Metric:");
                    egui::ComboBox::from_id_salt("metric")
                        .selected_text(state.metric.label())
                        .show_ui(ui, |ui| {
                            for metric in Metric::ALL {
                                ui.selectable_value(&mut state.metric, metric, metric.label());
                            }
                        });
                });
                ui.horizontal(|ui| {
                    ui.label("Run overlay stride:");
                    ui.add(egui::DragValue::new(&mut state.run_stride).range(1..=10_000));
                });

                if !state.error.is_empty() {
                    ui.add_space(4.0);
                    ui.colored_label(egui::Color32::from_rgb(220, 60, 60), &state.error);
                }

                ui.add_space(8.0);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        match state.to_config() {
                            Ok(config) => action = SettingsAction::Apply(config),
                            Err(e) => state.error = e,
                        }
                    }
                    if ui.button("Save...").clicked() {
                        match state.to_config() {
                            Ok(config) => action = SettingsAction::Save(config),
                            Err(e) => state.error = e,
                        }
                    }
                    if ui.button("Load...").clicked() {
                        action = SettingsAction::Load;
                    }
                    if ui.button("Reset to Defaults").clicked() {
                        *state = SettingsDialogState::new(&PipelineConfig::default());
                    }
                });
            });
        });

    if !open {
        return SettingsAction::Close;
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(SettingsDialogState::new(&config).to_config().unwrap(), config);
    }

    #[test]
    fn list_text_is_trimmed_and_split() {
        let mut state = SettingsDialogState::new(&PipelineConfig::default());
        state.schemes_text = " seize ,, crossbeam ".to_string();
        state.views = vec![("Pushes".to_string(), "enqueue,push".to_string())];
        state.smoothing = AggregationMode::BucketMean { bucket_size: 1 };
        state.bucket_size = 25;

        let config = state.to_config().unwrap();
        assert_eq!(config.schemes, vec!["seize", "crossbeam"]);
        assert_eq!(config.views, vec![ViewConfig::new("Pushes", &["enqueue", "push"])]);
        assert_eq!(config.smoothing, AggregationMode::BucketMean { bucket_size: 25 });
    }

    #[test]
    fn invalid_settings_are_reported() {
        let mut state = SettingsDialogState::new(&PipelineConfig::default());
        state.views.clear();
        assert!(state.to_config().is_err());
    }
}
