mod app;
mod chart;
mod cli;
mod config;
mod data;
mod error;
mod pipeline;
mod processing;
mod state;
mod ui;

use std::path::PathBuf;

use app::MemPlotApp;
use chart::Chart;
use clap::Parser;
use cli::Cli;
use config::PipelineConfig;
use eframe::egui;
use eframe::egui_wgpu;
use processing::statistics::SeriesStats;

/// Run the pipeline over `files` without a window and print what each chart
/// would show.
fn run_summary(files: &[PathBuf], config: &PipelineConfig) -> Result<(), String> {
    let mut failed = false;
    for path in files {
        let mut charts: Vec<Chart> = Vec::new();
        match pipeline::process_file(path, config, &mut charts) {
            Ok(summary) => {
                println!("{}", summary.status_line());
                for row in &summary.dropped_rows {
                    println!("  dropped: {row}");
                }
                for chart in &charts {
                    println!("  {}", chart.title);
                    for named in &chart.series {
                        if let Some(stats) = SeriesStats::compute(&named.series) {
                            println!("    {}", stats.report(&named.label));
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!("{e}");
                failed = true;
            }
        }
    }
    if failed {
        return Err("some files could not be processed".to_string());
    }
    Ok(())
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => match PipelineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("memplot: {e}");
                std::process::exit(2);
            }
        },
        None => PipelineConfig::default(),
    };

    if cli.summary {
        if let Err(e) = run_summary(&cli.files, &config) {
            eprintln!("memplot: {e}");
            std::process::exit(1);
        }
        return Ok(());
    }

    let initial_file = cli.files.into_iter().next();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("memplot")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_drag_and_drop(true),
        wgpu_options: egui_wgpu::WgpuConfiguration {
            present_mode: eframe::wgpu::PresentMode::AutoVsync,
            wgpu_setup: egui_wgpu::WgpuSetup::CreateNew(egui_wgpu::WgpuSetupCreateNew {
                instance_descriptor: eframe::wgpu::InstanceDescriptor {
                    backends: eframe::wgpu::Backends::DX12 | eframe::wgpu::Backends::VULKAN | eframe::wgpu::Backends::GL,
                    ..Default::default()
                },
                power_preference: eframe::wgpu::PowerPreference::LowPower,
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        "memplot",
        options,
        Box::new(|cc| Ok(Box::new(MemPlotApp::new(cc, config, initial_file)))),
    )
}
