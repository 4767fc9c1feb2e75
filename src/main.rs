mod app;
mod config;
mod grid;
mod image_loader;
mod layout;
mod models;
mod ui;

use app::CaveApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cave=info".parse().unwrap()),
        )
        .init();

    let app = CaveApp::new();
    std::process::exit(app.run());
}
