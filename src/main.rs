mod app;
use math_trails_app::*;

use app::MyApp;
use database::db::init_database;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let conn = init_database().expect("Failed to initialize database");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([520.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Math Trails",
        options,
        Box::new(|_cc| Ok(Box::new(MyApp::new(conn)))),
    )
}
