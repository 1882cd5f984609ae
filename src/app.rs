use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SharkDashApp {
    pub state: AppState,
}

impl SharkDashApp {
    /// Build the app and read the configured dataset once.
    pub fn new(config: &DashboardConfig) -> Self {
        let mut state = AppState::new(config.schema());
        state.open(&config.dataset_path);
        Self { state }
    }
}

impl eframe::App for SharkDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("navigation_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::page_view(ui, &self.state);
        });
    }
}
