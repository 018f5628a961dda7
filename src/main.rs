mod app;
mod event;
mod explainer;
mod models;
mod session;
mod theme;

use app::MetaAiApp;
use eframe::egui;
use explainer::{ExplainerClient, ExplainerConfig};
use std::sync::mpsc;
use theme::Theme;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A .env file is honored for the service credentials; absence is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ExplainerConfig::from_env()?;
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("metaai-runtime")
        .build()?;

    let explainer = runtime.block_on(async { ExplainerClient::new(config, tx.clone()) })?;
    tracing::info!("explainer client ready");

    let app = MetaAiApp::new(rx, explainer);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "MetaAI",
        native_options,
        Box::new(move |creation_context| {
            Theme::default().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
