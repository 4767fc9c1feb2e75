//! Runtime settings.
//!
//! Resolution order: built-in defaults, then `CAVE_*` environment variables,
//! then values saved from the tuning panel in the store's settings table.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::grid::TransitionTimings;
use crate::models::{Credentials, UploadLimits, MAX_PAYLOAD_BYTES};

const MIB: u64 = 1024 * 1024;

/// A behaviour parameter adjustable from the tuning panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tunable {
    FadeMs,
    SettleMs,
    ScrollDebounceMs,
    ResizeDebounceMs,
    SmoothScrollMs,
    ImageMaxMb,
    VideoMaxMb,
}

impl Tunable {
    pub const ALL: [Tunable; 7] = [
        Tunable::FadeMs,
        Tunable::SettleMs,
        Tunable::ScrollDebounceMs,
        Tunable::ResizeDebounceMs,
        Tunable::SmoothScrollMs,
        Tunable::ImageMaxMb,
        Tunable::VideoMaxMb,
    ];

    /// Settings-table key; the env var is `CAVE_` plus the upper-cased key.
    pub fn key(self) -> &'static str {
        match self {
            Tunable::FadeMs => "fade_ms",
            Tunable::SettleMs => "settle_ms",
            Tunable::ScrollDebounceMs => "scroll_debounce_ms",
            Tunable::ResizeDebounceMs => "resize_debounce_ms",
            Tunable::SmoothScrollMs => "smooth_scroll_ms",
            Tunable::ImageMaxMb => "image_max_mb",
            Tunable::VideoMaxMb => "video_max_mb",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tunable::FadeMs => "Fade (ms)",
            Tunable::SettleMs => "Settle delay (ms)",
            Tunable::ScrollDebounceMs => "Scroll snap delay (ms)",
            Tunable::ResizeDebounceMs => "Resize delay (ms)",
            Tunable::SmoothScrollMs => "Smooth scroll (ms)",
            Tunable::ImageMaxMb => "Image limit (MB)",
            Tunable::VideoMaxMb => "Video limit (MB)",
        }
    }

    /// Inclusive range accepted from any source.
    pub fn range(self) -> (u64, u64) {
        match self {
            Tunable::FadeMs => (100, 2000),
            Tunable::SettleMs => (0, 2000),
            Tunable::ScrollDebounceMs => (150, 600),
            Tunable::ResizeDebounceMs => (50, 1000),
            Tunable::SmoothScrollMs => (0, 1500),
            Tunable::ImageMaxMb => (1, 200),
            Tunable::VideoMaxMb => (1, MAX_PAYLOAD_BYTES / MIB),
        }
    }

    pub fn env_var(self) -> String {
        format!("CAVE_{}", self.key().to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub fade_ms: u64,
    pub settle_ms: u64,
    pub scroll_debounce_ms: u64,
    pub resize_debounce_ms: u64,
    pub smooth_scroll_ms: u64,
    pub image_max_mb: u64,
    pub video_max_mb: u64,
    pub user: String,
    pub password: String,
    /// `None` uses the XDG data directory.
    pub db_path: Option<PathBuf>,
    pub asset_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fade_ms: 500,
            settle_ms: 500,
            scroll_debounce_ms: 600,
            resize_debounce_ms: 200,
            smooth_scroll_ms: 350,
            image_max_mb: 30,
            video_max_mb: MAX_PAYLOAD_BYTES / MIB,
            user: "dpig".to_string(),
            password: "3088".to_string(),
            db_path: None,
            asset_dir: PathBuf::from("images"),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `CAVE_*` key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        for tunable in Tunable::ALL {
            let var = tunable.env_var();
            if let Some(raw) = lookup(&var) {
                if !settings.apply_raw(tunable, &raw) {
                    warn!("Ignoring invalid {}={:?}", var, raw);
                }
            }
        }

        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(user) = non_empty("CAVE_USER") {
            settings.user = user.trim().to_lowercase();
        }
        if let Some(password) = non_empty("CAVE_PASSWORD") {
            settings.password = password;
        }
        if let Some(path) = non_empty("CAVE_DB_PATH") {
            settings.db_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = non_empty("CAVE_ASSET_DIR") {
            settings.asset_dir = PathBuf::from(dir);
        }
        settings
    }

    /// Apply values saved in the settings table. Unknown keys are ignored.
    pub fn apply_stored(&mut self, stored: &HashMap<String, String>) {
        for tunable in Tunable::ALL {
            if let Some(raw) = stored.get(tunable.key()) {
                if !self.apply_raw(tunable, raw) {
                    warn!("Ignoring invalid stored {}={:?}", tunable.key(), raw);
                }
            }
        }
    }

    fn apply_raw(&mut self, tunable: Tunable, raw: &str) -> bool {
        match raw.trim().parse::<u64>() {
            Ok(value) => {
                self.set(tunable, value);
                true
            }
            Err(_) => false,
        }
    }

    pub fn get(&self, tunable: Tunable) -> u64 {
        match tunable {
            Tunable::FadeMs => self.fade_ms,
            Tunable::SettleMs => self.settle_ms,
            Tunable::ScrollDebounceMs => self.scroll_debounce_ms,
            Tunable::ResizeDebounceMs => self.resize_debounce_ms,
            Tunable::SmoothScrollMs => self.smooth_scroll_ms,
            Tunable::ImageMaxMb => self.image_max_mb,
            Tunable::VideoMaxMb => self.video_max_mb,
        }
    }

    /// Set a tunable, clamped to its range.
    pub fn set(&mut self, tunable: Tunable, value: u64) {
        let (min, max) = tunable.range();
        let value = value.clamp(min, max);
        let slot = match tunable {
            Tunable::FadeMs => &mut self.fade_ms,
            Tunable::SettleMs => &mut self.settle_ms,
            Tunable::ScrollDebounceMs => &mut self.scroll_debounce_ms,
            Tunable::ResizeDebounceMs => &mut self.resize_debounce_ms,
            Tunable::SmoothScrollMs => &mut self.smooth_scroll_ms,
            Tunable::ImageMaxMb => &mut self.image_max_mb,
            Tunable::VideoMaxMb => &mut self.video_max_mb,
        };
        *slot = value;
    }

    /// Key/value pairs written by "Save settings".
    pub fn stored_pairs(&self) -> Vec<(&'static str, String)> {
        Tunable::ALL
            .iter()
            .map(|t| (t.key(), self.get(*t).to_string()))
            .collect()
    }

    pub fn transition_timings(&self) -> TransitionTimings {
        TransitionTimings {
            fade: Duration::from_millis(self.fade_ms),
            settle: Duration::from_millis(self.settle_ms),
        }
    }

    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn smooth_scroll(&self) -> Duration {
        Duration::from_millis(self.smooth_scroll_ms)
    }

    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            image_max_bytes: self.image_max_mb * MIB,
            video_max_bytes: self.video_max_mb * MIB,
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.upload_limits(), UploadLimits::default());
        assert_eq!(settings.transition_timings(), TransitionTimings::default());
        assert_eq!(settings.credentials().user, "dpig");
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("CAVE_FADE_MS", "300"),
            ("CAVE_SCROLL_DEBOUNCE_MS", "50"),
            ("CAVE_SETTLE_MS", "soon"),
            ("CAVE_USER", " Artist "),
            ("CAVE_ASSET_DIR", "/srv/art"),
            ("CAVE_DB_PATH", ""),
        ]));
        assert_eq!(settings.fade_ms, 300);
        // Clamped to the lower bound
        assert_eq!(settings.scroll_debounce_ms, 150);
        assert_eq!(settings.settle_ms, 500);
        assert_eq!(settings.user, "artist");
        assert_eq!(settings.asset_dir, PathBuf::from("/srv/art"));
        assert_eq!(settings.db_path, None);
    }

    #[test]
    fn test_stored_values_round_trip() {
        let mut tuned = Settings::default();
        tuned.set(Tunable::SmoothScrollMs, 800);
        tuned.set(Tunable::ImageMaxMb, 10);

        let stored: HashMap<String, String> = tuned
            .stored_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let mut settings = Settings::default();
        settings.apply_stored(&stored);
        assert_eq!(settings.smooth_scroll(), Duration::from_millis(800));
        assert_eq!(settings.upload_limits().image_max_bytes, 10 * MIB);
    }

    #[test]
    fn test_video_limit_clamped_to_store_capacity() {
        let settings = Settings::from_lookup(lookup(&[("CAVE_VIDEO_MAX_MB", "1024")]));
        assert_eq!(settings.video_max_mb, 950);
        assert!(settings.upload_limits().video_max_bytes <= MAX_PAYLOAD_BYTES);

        let mut tuned = Settings::default();
        tuned.set(Tunable::VideoMaxMb, 4096);
        assert_eq!(tuned.video_max_mb, Tunable::VideoMaxMb.range().1);
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(Tunable::ResizeDebounceMs.env_var(), "CAVE_RESIZE_DEBOUNCE_MS");
    }
}
