//! SQLite-backed persistence for uploaded artwork and tuned settings.
//!
//! The gallery is stored as a whole: every mutation replaces all persisted
//! rows in one transaction, so the table always mirrors the in-memory list.
//! Only items with a non-zero timestamp are written; seeded artwork is
//! rediscovered from the asset directory at startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use crate::models::{GalleryItem, MediaData, MediaKind};

/// Largest upload the store accepts. SQLite refuses blobs (and rows) past
/// 1,000,000,000 bytes, so this stays a few megabytes under that.
pub const MAX_PAYLOAD_BYTES: u64 = 950 * 1024 * 1024;

pub struct GalleryStore {
    conn: Connection,
}

impl GalleryStore {
    /// Returns `XDG_DATA_HOME/cave/gallery.sqlite`.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "cave").context("Failed to determine project directories")?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

        Ok(data_dir.join("gallery.sqlite"))
    }

    /// Opens or creates the database at the specified path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )
        .context("Failed to configure SQLite pragmas")?;

        let store = Self { conn };
        store.create_tables()?;

        info!("Opened gallery store at {:?}", path);
        Ok(store)
    }

    /// A store that lives only for this session.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    /// Opens `path`, moving an unreadable database aside and starting fresh.
    pub fn open_or_rebuild(path: &Path) -> Result<Self> {
        match Self::open(path) {
            Ok(store) => Ok(store),
            Err(err) => {
                warn!(error = ?err, "Gallery store unreadable at {:?}", path);
                let backup_path = path.with_extension("sqlite.corrupted");
                if path.exists() {
                    std::fs::rename(path, &backup_path).with_context(|| {
                        format!("Failed to backup corrupted database to {:?}", backup_path)
                    })?;
                    warn!("Backed up corrupted database to {:?}", backup_path);
                }
                Self::open(path)
            }
        }
    }

    fn create_tables(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS gallery_items (
                timestamp INTEGER PRIMARY KEY NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                tag TEXT NOT NULL,
                asset_path TEXT,
                mime TEXT,
                payload BLOB
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            ",
            )
            .context("Failed to create database tables")?;

        debug!("Database tables created/verified");
        Ok(())
    }

    // =========================================================================
    // Gallery items
    // =========================================================================

    /// Replaces the stored gallery with the persistable subset of `items`.
    pub fn replace_items(&mut self, items: &[GalleryItem]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM gallery_items", [])
            .context("Failed to clear gallery items")?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "
                INSERT INTO gallery_items (
                    timestamp, position, name, kind, tag, asset_path, mime, payload
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
            )?;

            for item in items.iter().filter(|item| item.is_persisted()) {
                let (asset_path, mime, payload) = match &item.data {
                    MediaData::Asset(path) => {
                        (Some(path.to_string_lossy().into_owned()), None, None)
                    }
                    MediaData::Inline { mime, bytes } => {
                        (None, Some(mime.as_str()), Some(bytes.as_slice()))
                    }
                };
                stmt.execute(params![
                    item.timestamp,
                    count as i64,
                    item.name,
                    item.kind.as_str(),
                    item.tag,
                    asset_path,
                    mime,
                    payload,
                ])
                .with_context(|| format!("Failed to store gallery item {}", item.name))?;
                count += 1;
            }
        }
        tx.commit()?;

        debug!("Stored {} gallery items", count);
        Ok(count)
    }

    /// Loads every stored item in the order it was saved.
    pub fn load_items(&self) -> Result<Vec<GalleryItem>> {
        let mut stmt = self.conn.prepare(
            "
            SELECT timestamp, name, kind, tag, asset_path, mime, payload
            FROM gallery_items ORDER BY position
            ",
        )?;

        let rows = stmt.query_map([], |row| {
            let asset_path: Option<String> = row.get(4)?;
            let mime: Option<String> = row.get(5)?;
            let payload: Option<Vec<u8>> = row.get(6)?;
            let data = match (asset_path, payload) {
                (Some(path), _) => MediaData::Asset(PathBuf::from(path)),
                (None, payload) => MediaData::Inline {
                    mime: mime.unwrap_or_default(),
                    bytes: payload.unwrap_or_default(),
                },
            };
            Ok(GalleryItem {
                timestamp: row.get(0)?,
                name: row.get(1)?,
                kind: MediaKind::parse(&row.get::<_, String>(2)?),
                tag: row.get(3)?,
                data,
            })
        })?;

        let mut items = Vec::new();
        for item in rows {
            items.push(item.context("Failed to read gallery item")?);
        }
        Ok(items)
    }

    pub fn count_items(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM gallery_items", [], |r| r.get(0))?;
        Ok(count)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("Failed to save setting {}", key))?;
        Ok(())
    }

    pub fn settings(&self) -> Result<HashMap<String, String>> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM settings")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut map = HashMap::new();
        for row in rows {
            let (key, value): (String, String) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn uploaded(name: &str, timestamp: i64) -> GalleryItem {
        GalleryItem {
            name: name.to_string(),
            kind: MediaKind::Image,
            data: MediaData::Inline {
                mime: "image/png".to_string(),
                bytes: name.as_bytes().to_vec(),
            },
            timestamp,
            tag: "all".to_string(),
        }
    }

    #[test]
    fn test_open_and_create() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("gallery.sqlite");

        let store = GalleryStore::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(store.count_items().unwrap(), 0);
    }

    #[test]
    fn test_replace_skips_seeded_items() {
        let mut store = GalleryStore::open_in_memory().unwrap();
        let items = vec![
            uploaded("a.png", 10),
            GalleryItem::asset(PathBuf::from("images/seed.png"), MediaKind::Image),
            uploaded("b.png", 20),
        ];

        assert_eq!(store.replace_items(&items).unwrap(), 2);
        let loaded = store.load_items().unwrap();
        assert_eq!(loaded, vec![items[0].clone(), items[2].clone()]);
    }

    #[test]
    fn test_replace_overwrites_previous_contents() {
        let mut store = GalleryStore::open_in_memory().unwrap();
        store
            .replace_items(&[uploaded("a.png", 1), uploaded("b.png", 2)])
            .unwrap();
        store.replace_items(&[uploaded("c.png", 3)]).unwrap();

        let loaded = store.load_items().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "c.png");
    }

    #[test]
    fn test_items_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("gallery.sqlite");
        let items = vec![uploaded("x.png", 5), uploaded("y.png", 6)];
        {
            let mut store = GalleryStore::open(&db_path).unwrap();
            store.replace_items(&items).unwrap();
        }
        let store = GalleryStore::open(&db_path).unwrap();
        assert_eq!(store.load_items().unwrap(), items);
    }

    #[test]
    fn test_settings_upsert() {
        let store = GalleryStore::open_in_memory().unwrap();
        store.set_setting("fade_ms", "500").unwrap();
        store.set_setting("fade_ms", "300").unwrap();
        let settings = store.settings().unwrap();
        assert_eq!(settings.get("fade_ms").map(String::as_str), Some("300"));
        assert_eq!(settings.len(), 1);
    }

    #[test]
    fn test_rebuild_moves_garbage_aside() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("gallery.sqlite");
        std::fs::write(&db_path, vec![b'x'; 4096]).unwrap();

        let store = GalleryStore::open_or_rebuild(&db_path).unwrap();
        assert_eq!(store.count_items().unwrap(), 0);
        assert!(db_path.with_extension("sqlite.corrupted").exists());
    }
}
