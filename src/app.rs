use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::config::PipelineConfig;
use crate::data::loader::{self, RawTable};
use crate::error::LoadError;
use crate::pipeline::{process_table, PipelineSummary};
use crate::state::app_state::{AppState, VERSION};
use crate::state::theme::Theme;
use crate::ui::chart_panel::{self, ChartAction};
use crate::ui::settings_dialog::{self, SettingsAction, SettingsDialogState};

/// Pending async file load result.
struct PendingLoad {
    path: PathBuf,
    result: Arc<Mutex<Option<Result<RawTable, LoadError>>>>,
}

/// The memplot viewer.
pub struct MemPlotApp {
    pub state: AppState,
    pub settings_dialog: Option<SettingsDialogState>,
    /// An error message shown in the footer until dismissed.
    pub error_message: Option<String>,
    /// The last file that made it through loading, kept so new settings can
    /// be applied without reading it again.
    table: Option<RawTable>,
    summary: Option<PipelineSummary>,
    pending_load: Option<PendingLoad>,
}

impl MemPlotApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: PipelineConfig, initial_file: Option<PathBuf>) -> Self {
        let state = AppState {
            config,
            ..AppState::default()
        };

        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(15.0));
        style.text_styles.insert(egui::TextStyle::Button, egui::FontId::proportional(14.5));
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(20.0));
        style.text_styles.insert(egui::TextStyle::Monospace, egui::FontId::monospace(13.5));
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.window_margin = egui::Margin::same(12);
        ctx.set_style(style);
        ctx.set_visuals(state.theme.visuals());

        let mut app = Self {
            state,
            settings_dialog: None,
            error_message: None,
            table: None,
            summary: None,
            pending_load: None,
        };
        if let Some(path) = initial_file {
            app.load_file(&path);
        }
        app
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_file(&path);
        }
    }

    /// Read a file on a worker thread so the UI stays responsive.
    fn load_file(&mut self, path: &Path) {
        let path_buf = path.to_path_buf();
        let result: Arc<Mutex<Option<Result<RawTable, LoadError>>>> = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);

        std::thread::spawn(move || {
            let loaded = loader::load_file(&path_buf);
            if let Ok(mut slot) = result_clone.lock() {
                *slot = Some(loaded);
            }
        });

        self.pending_load = Some(PendingLoad {
            path: path.to_path_buf(),
            result,
        });
    }

    /// Run the current table through the pipeline, replacing every chart.
    fn reprocess(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        self.state.board.clear();
        match process_table(table, &self.state.config, &mut self.state.board) {
            Ok(summary) => {
                tracing::info!("{}", summary.status_line());
                self.error_message = if summary.charts_emitted == 0 {
                    tracing::warn!("Nothing to plot in {:?}", summary.path);
                    Some("Nothing to plot with the current scheme and operation lists.".to_string())
                } else {
                    None
                };
                self.summary = Some(summary);
            }
            Err(e) => {
                tracing::error!("{e}");
                self.error_message = Some(e.to_string());
                self.summary = None;
            }
        }
    }

    fn apply_config(&mut self, config: PipelineConfig) {
        tracing::info!("Applying settings: {:?} on {:?}", config.smoothing, config.metric);
        self.state.config = config;
        self.reprocess();
    }

    fn save_settings(&mut self, config: &PipelineConfig) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("memplot-settings.json")
            .add_filter("Settings", &["json"])
            .save_file()
        {
            if let Err(e) = config.save(&path) {
                tracing::error!("{e}");
                self.error_message = Some(e.to_string());
            }
        }
    }

    fn load_settings(&mut self) {
        if let Some(path) = rfd::FileDialog::new().add_filter("Settings", &["json"]).pick_file() {
            match PipelineConfig::load(&path) {
                Ok(config) => {
                    self.settings_dialog = Some(SettingsDialogState::new(&config));
                    self.apply_config(config);
                }
                Err(e) => {
                    tracing::error!("{e}");
                    self.error_message = Some(e.to_string());
                }
            }
        }
    }

    fn poll_pending_load(&mut self) {
        let Some(pending) = &self.pending_load else {
            return;
        };
        let finished = match pending.result.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => Some(Err(LoadError::Io {
                path: pending.path.clone(),
                source: std::io::Error::other("loader thread panicked"),
            })),
        };
        let Some(result) = finished else {
            return;
        };
        self.pending_load = None;

        match result {
            Ok(table) => {
                tracing::info!("Loaded {:?} ({} rows)", table.path, table.row_count());
                self.table = Some(table);
                self.reprocess();
            }
            Err(e) => {
                tracing::error!("Failed to load file: {e}");
                self.error_message = Some(e.to_string());
            }
        }
    }
}

impl eframe::App for MemPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(self.state.theme.visuals());

        // Dropped files: the last CSV wins.
        let mut dropped: Option<PathBuf> = None;
        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    let is_csv = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
                    if is_csv {
                        dropped = Some(path.clone());
                    }
                }
            }
        });
        if let Some(path) = dropped {
            self.load_file(&path);
        }

        // --- Header panel ---
        let mut open_file = false;
        let mut reload = false;
        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("memplot");
                    ui.separator();

                    if ui.button("Open CSV").clicked() {
                        open_file = true;
                    }
                    if ui
                        .add_enabled(self.table.is_some(), egui::Button::new("Reprocess"))
                        .on_hover_text("Run the loaded file through the pipeline again")
                        .clicked()
                    {
                        reload = true;
                    }
                    if ui.button("Settings").clicked() && self.settings_dialog.is_none() {
                        self.settings_dialog = Some(SettingsDialogState::new(&self.state.config));
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let theme_label = match self.state.theme {
                            Theme::Dark => "Light Mode",
                            Theme::Light => "Dark Mode",
                        };
                        if ui.button(theme_label).clicked() {
                            self.state.theme = self.state.theme.toggle();
                        }
                        ui.separator();
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });

        if open_file {
            self.open_file_dialog();
        }
        if reload {
            self.reprocess();
        }

        // --- Footer panel ---
        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    match &self.summary {
                        Some(summary) => {
                            ui.label(egui::RichText::new(summary.status_line()).weak());
                            if summary.dropped_count() > 0 {
                                let detail: Vec<String> =
                                    summary.dropped_rows.iter().take(20).map(|e| e.to_string()).collect();
                                ui.label(format!("{} rows dropped", summary.dropped_count()))
                                    .on_hover_text(detail.join("\n"));
                            }
                            ui.label(
                                egui::RichText::new(format!("{} points", self.state.board.total_points())).weak(),
                            );
                        }
                        None => {
                            ui.label(egui::RichText::new("No file loaded").weak());
                        }
                    }

                    if let Some(msg) = &self.error_message {
                        ui.separator();
                        ui.colored_label(self.state.theme.error_color(), msg);
                        if ui.small_button("dismiss").clicked() {
                            self.error_message = None;
                        }
                    }
                });
            });

        // --- Central panel with one panel per chart ---
        let mut closed: Vec<u64> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            let chart_count = self.state.board.charts.len();
            let panel_height = if chart_count <= 1 {
                (ui.available_height() - 120.0).max(300.0)
            } else {
                ((ui.available_height() - 10.0) / 2.0 - 100.0).max(300.0)
            };

            egui::ScrollArea::vertical().show(ui, |ui| {
                if chart_count == 0 {
                    ui.add_space(80.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("Memory telemetry plotter");
                        ui.add_space(12.0);
                        ui.label(
                            egui::RichText::new("Open or drag-and-drop a memory telemetry CSV to get started.").weak(),
                        );
                    });
                }

                let theme = self.state.theme;
                for chart in &mut self.state.board.charts {
                    let id = chart.id;
                    ui.push_id(id, |ui| {
                        if chart_panel::show_chart_panel(chart, ui, &theme, panel_height) == ChartAction::Close {
                            closed.push(id);
                        }
                    });
                    ui.add_space(10.0);
                }
            });
        });
        for id in closed {
            self.state.board.remove(id);
        }

        // --- Async load ---
        self.poll_pending_load();
        if self.pending_load.is_some() {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading file...");
                    });
                });
            ctx.request_repaint();
        }

        // --- Settings dialog ---
        let action = match self.settings_dialog.as_mut() {
            Some(dialog) => settings_dialog::show_settings_dialog(ctx, dialog),
            None => SettingsAction::None,
        };
        match action {
            SettingsAction::None => {}
            SettingsAction::Apply(config) => self.apply_config(config),
            SettingsAction::Save(config) => self.save_settings(&config),
            SettingsAction::Load => self.load_settings(),
            SettingsAction::Close => self.settings_dialog = None,
        }
    }
}
