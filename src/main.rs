mod app;
mod color;
mod config;
mod data;
mod error;
mod pages;
mod state;
mod ui;

use std::path::Path;

use app::SharkDashApp;
use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Shark Dash – Pitch Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(SharkDashApp::new(&config)))),
    )
}
