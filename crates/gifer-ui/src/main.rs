#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod helpers;
mod modules;
mod settings;
mod state;
mod theme;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> eframe::Result {
    let settings = settings::Settings::from_env();
    helpers::log::init(settings.log_level);

    // The probe needs the in-process libraries; the window still opens
    // without them so the user sees the error in the status bar.
    let init_error = gifer_media::init().err().map(|e| format!("{e:#}"));
    if let Some(e) = &init_error {
        log::error!("[app] {e}");
    }

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("GIFer")
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 480.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "GIFer",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::GiferApp::new(cc, settings, init_error)))),
    )
}
