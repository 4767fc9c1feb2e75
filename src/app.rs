use gtk4::prelude::*;
use gtk4::Application;

use crate::config::Settings;
use crate::models::{default_showcases, seed_assets, tag_seeds, Gallery, GalleryStore};
use crate::ui::MainWindow;

const APP_ID: &str = "com.cave.Portfolio";

pub struct CaveApp {
    app: Application,
}

impl CaveApp {
    pub fn new() -> Self {
        let app = Application::builder().application_id(APP_ID).build();

        app.connect_activate(Self::on_activate);

        Self { app }
    }

    pub fn run(&self) -> i32 {
        self.app.run().into()
    }

    fn on_activate(app: &Application) {
        let mut settings = Settings::from_env();

        let Some(store) = open_store(&settings) else {
            tracing::error!("No gallery store available, quitting");
            app.quit();
            return;
        };
        match store.settings() {
            Ok(stored) => settings.apply_stored(&stored),
            Err(err) => tracing::warn!(error = ?err, "Failed to read saved settings"),
        }

        let showcases = default_showcases();
        let mut seeds = seed_assets(&settings.asset_dir);
        tag_seeds(&mut seeds, &showcases);

        let mut gallery = Gallery::new(store, settings.upload_limits());
        if let Err(err) = gallery.load(seeds) {
            tracing::warn!("Failed to load saved artworks: {}", err);
        }
        tracing::info!("Gallery ready with {} artworks", gallery.len());

        let window = MainWindow::new(app, settings, gallery, &showcases);
        window.present();
        // Keep the window alive by storing it on the Application.
        unsafe {
            app.set_data("main-window", window);
        }
    }
}

impl Default for CaveApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Configured or XDG database, rebuilt if corrupt; in-memory as a last resort.
fn open_store(settings: &Settings) -> Option<GalleryStore> {
    let path = match &settings.db_path {
        Some(path) => Ok(path.clone()),
        None => GalleryStore::default_db_path(),
    };

    match path.and_then(|path| GalleryStore::open_or_rebuild(&path)) {
        Ok(store) => return Some(store),
        Err(err) => {
            tracing::warn!(error = ?err, "Gallery store unavailable, uploads will not persist")
        }
    }

    match GalleryStore::open_in_memory() {
        Ok(store) => Some(store),
        Err(err) => {
            tracing::error!(error = ?err, "Failed to open in-memory gallery store");
            None
        }
    }
}
