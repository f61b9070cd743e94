//! Desktop quiz editor built on the EduAdmin selector widgets.
//!
//! Exposes a `run` helper so the workspace root can launch the UI without
//! duplicating initialization logic.

mod app;
/// Fetch worker + protocol types used by the widgets and headless tests.
pub mod backend;
/// egui selector widgets.
pub mod widgets;

pub use app::{QuizDraft, QuizEditorApp};

use eduadmin_core::Config;
use eframe::egui;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "eduadmin=warn,eduadmin_core=info,eduadmin_client=info,eduadmin_gui=info";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// Start the quiz editor with tracing enabled.
///
/// # Returns
/// The result of `eframe::run_native`.
///
/// # Errors
/// Propagates any `eframe` initialization or runtime error (including app
/// creation failures when the API client cannot be built).
pub fn run() -> eframe::Result<()> {
    init_tracing();

    let config = Config::from_env();
    let app =
        QuizEditorApp::new(config).map_err(|err| eframe::Error::AppCreation(Box::new(err)))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(app::DEFAULT_WINDOW_SIZE)
            .with_min_inner_size(app::MIN_WINDOW_SIZE)
            .with_title("EduAdmin"),
        ..Default::default()
    };

    eframe::run_native("EduAdmin", options, Box::new(|_cc| Ok(Box::new(app))))
}
