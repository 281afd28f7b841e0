mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::DashboardApp;
use clap::Parser;
use config::{Args, DashboardConfig};
use data::cache::DatasetCache;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from(Args::parse());
    log::info!("Starting dashboard with data source {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    // A failed load is shown in the window rather than aborting startup.
    let state = AppState::with_cache(DatasetCache::from_path(&config.data_path));

    eframe::run_native(
        "Titanic Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
}
