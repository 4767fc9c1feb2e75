//! In-memory artwork collection with sort, filter, upload and delete.
//!
//! Uploads and deletions require a logged-in `Session`. Every mutation is
//! followed by a full overwrite of the persisted collection.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::{
    GalleryItem, GalleryStore, MediaData, MediaKind, Session, MAX_PAYLOAD_BYTES, TAG_ALL,
};

/// Upload size ceilings in bytes. Both are capped at `MAX_PAYLOAD_BYTES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Images and GIFs.
    pub image_max_bytes: u64,
    pub video_max_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            image_max_bytes: 30 * 1024 * 1024,
            video_max_bytes: MAX_PAYLOAD_BYTES,
        }
    }
}

impl UploadLimits {
    pub fn limit_for(&self, kind: MediaKind) -> u64 {
        let configured = match kind {
            MediaKind::Image => self.image_max_bytes,
            MediaKind::Video => self.video_max_bytes,
        };
        configured.min(MAX_PAYLOAD_BYTES)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("not logged in")]
    NotAuthenticated,
    #[error("{name} exceeds the size limit ({size} > {limit} bytes)")]
    TooLarge { name: String, size: u64, limit: u64 },
    #[error("{0} is not an image or video")]
    UnsupportedType(String),
    #[error("artwork not found")]
    NotFound,
    #[error("deletion cancelled")]
    Cancelled,
    #[error("failed to read {name}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Newest upload first.
    #[default]
    Date,
    /// Case-insensitive name, A to Z.
    Name,
}

impl SortMode {
    pub fn toggled(self) -> Self {
        match self {
            SortMode::Date => SortMode::Name,
            SortMode::Name => SortMode::Date,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Date => "date",
            SortMode::Name => "name",
        }
    }
}

/// A file picked for upload that passed type and size checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub path: PathBuf,
    pub name: String,
    pub kind: MediaKind,
    pub size: u64,
}

impl UploadCandidate {
    pub fn inspect(path: &Path) -> Result<Self, GalleryError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let kind =
            MediaKind::from_path(path).ok_or_else(|| GalleryError::UnsupportedType(name.clone()))?;
        let size = std::fs::metadata(path)
            .map_err(|source| GalleryError::Read {
                name: name.clone(),
                source,
            })?
            .len();
        Ok(Self {
            path: path.to_path_buf(),
            name,
            kind,
            size,
        })
    }
}

/// File contents read off the UI thread, ready to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub name: String,
    pub kind: MediaKind,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Blocking read of an accepted candidate. Runs on a worker thread.
pub fn read_upload(candidate: &UploadCandidate) -> Result<UploadPayload, GalleryError> {
    let bytes = std::fs::read(&candidate.path).map_err(|source| GalleryError::Read {
        name: candidate.name.clone(),
        source,
    })?;
    Ok(UploadPayload {
        name: candidate.name.clone(),
        kind: candidate.kind,
        mime: mime_for_path(&candidate.path, candidate.kind),
        bytes,
    })
}

fn mime_for_path(path: &Path, kind: MediaKind) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let subtype = match ext.as_str() {
        "jpg" => "jpeg",
        "tif" => "tiff",
        "mov" => "quicktime",
        "mkv" => "x-matroska",
        "avi" => "x-msvideo",
        "ogv" => "ogg",
        "" => "octet-stream",
        other => other,
    };
    format!("{}/{}", kind.as_str(), subtype)
}

/// Seeded artwork: every image/video directly inside `dir`, by file name.
pub fn seed_assets(dir: &Path) -> Vec<GalleryItem> {
    let mut items: Vec<GalleryItem> = WalkDir::new(dir)
        .follow_links(false)
        .max_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || entry
                    .file_name()
                    .to_str()
                    .map(|name| !name.starts_with('.'))
                    .unwrap_or(true)
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let path = entry.into_path();
            MediaKind::from_path(&path).map(|kind| GalleryItem::asset(path, kind))
        })
        .collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Seeded {} artworks from {:?}", items.len(), dir);
    items
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

pub struct Gallery {
    items: Vec<GalleryItem>,
    sort: SortMode,
    filter: String,
    limits: UploadLimits,
    store: GalleryStore,
    last_timestamp: i64,
}

impl Gallery {
    pub fn new(store: GalleryStore, limits: UploadLimits) -> Self {
        Self {
            items: Vec::new(),
            sort: SortMode::default(),
            filter: TAG_ALL.to_string(),
            limits,
            store,
            last_timestamp: 0,
        }
    }

    /// Load persisted uploads, then append the seeded artwork.
    pub fn load(&mut self, seeds: Vec<GalleryItem>) -> Result<(), GalleryError> {
        let stored = self.store.load_items()?;
        self.last_timestamp = stored.iter().map(|i| i.timestamp).max().unwrap_or(0);
        info!(
            "Gallery loaded: {} uploaded, {} seeded",
            stored.len(),
            seeds.len()
        );
        self.items = stored;
        self.items.extend(seeds);
        Ok(())
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn store(&self) -> &GalleryStore {
        &self.store
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: UploadLimits) {
        self.limits = limits;
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    pub fn set_sort_mode(&mut self, sort: SortMode) {
        self.sort = sort;
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, tag: &str) {
        self.filter = tag.to_string();
    }

    /// Sorted and filtered view. Sorting is stable.
    pub fn render(&self) -> Vec<&GalleryItem> {
        let mut view: Vec<&GalleryItem> = self
            .items
            .iter()
            .filter(|item| self.filter == TAG_ALL || item.tag == self.filter)
            .collect();
        match self.sort {
            SortMode::Date => view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortMode::Name => view.sort_by_key(|item| item.name.to_lowercase()),
        }
        view
    }

    pub fn find(&self, fingerprint: u64) -> Option<&GalleryItem> {
        self.items.iter().find(|i| i.fingerprint() == fingerprint)
    }

    /// Split picked files into those allowed to upload and per-file rejections.
    ///
    /// Fails as a whole when nobody is logged in.
    pub fn prepare_upload(
        &self,
        session: &Session,
        paths: &[PathBuf],
    ) -> Result<(Vec<UploadCandidate>, Vec<GalleryError>), GalleryError> {
        if !session.is_logged_in() {
            return Err(GalleryError::NotAuthenticated);
        }

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for path in paths {
            match UploadCandidate::inspect(path).and_then(|c| self.check_size(c)) {
                Ok(candidate) => accepted.push(candidate),
                Err(err) => {
                    warn!(error = %err, "Upload rejected");
                    rejected.push(err);
                }
            }
        }
        Ok((accepted, rejected))
    }

    fn check_size(&self, candidate: UploadCandidate) -> Result<UploadCandidate, GalleryError> {
        let limit = self.limits.limit_for(candidate.kind);
        if candidate.size > limit {
            return Err(GalleryError::TooLarge {
                name: candidate.name,
                size: candidate.size,
                limit,
            });
        }
        Ok(candidate)
    }

    /// Append a read payload with a fresh timestamp and persist.
    pub fn accept_upload(
        &mut self,
        session: &Session,
        payload: UploadPayload,
        now_ms: i64,
    ) -> Result<&GalleryItem, GalleryError> {
        if !session.is_logged_in() {
            return Err(GalleryError::NotAuthenticated);
        }
        let size = payload.bytes.len() as u64;
        let limit = self.limits.limit_for(payload.kind);
        if size > limit {
            return Err(GalleryError::TooLarge {
                name: payload.name,
                size,
                limit,
            });
        }

        let timestamp = self.next_timestamp(now_ms);
        self.items.push(GalleryItem {
            name: payload.name,
            kind: payload.kind,
            data: MediaData::Inline {
                mime: payload.mime,
                bytes: payload.bytes,
            },
            timestamp,
            tag: TAG_ALL.to_string(),
        });
        if let Err(err) = self.persist() {
            self.items.pop();
            return Err(err);
        }

        let item = &self.items[self.items.len() - 1];
        info!("Uploaded {} ({} bytes)", item.name, size);
        Ok(item)
    }

    /// Remove the item with `fingerprint` after confirmation and auth checks.
    pub fn delete(
        &mut self,
        session: &Session,
        fingerprint: u64,
        confirmed: bool,
    ) -> Result<GalleryItem, GalleryError> {
        if !confirmed {
            return Err(GalleryError::Cancelled);
        }
        if !session.is_logged_in() {
            return Err(GalleryError::NotAuthenticated);
        }
        let index = self
            .items
            .iter()
            .position(|i| i.fingerprint() == fingerprint)
            .ok_or(GalleryError::NotFound)?;

        let removed = self.items.remove(index);
        if let Err(err) = self.persist() {
            self.items.insert(index, removed);
            return Err(err);
        }
        info!("Deleted {}", removed.name);
        Ok(removed)
    }

    /// Upload timestamps double as persistence keys, so they never repeat.
    fn next_timestamp(&mut self, now_ms: i64) -> i64 {
        let timestamp = now_ms.max(self.last_timestamp + 1).max(1);
        self.last_timestamp = timestamp;
        timestamp
    }

    /// Callers restore `items` when this fails, so memory and store agree.
    fn persist(&mut self) -> Result<(), GalleryError> {
        if let Err(err) = self.store.replace_items(&self.items) {
            warn!(error = %err, "Failed to persist gallery");
            return Err(err.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credentials;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn session(logged_in: bool) -> Session {
        let mut session = Session::new(Credentials {
            user: "dpig".into(),
            password: "3088".into(),
        });
        if logged_in {
            session.login("dpig", "3088").unwrap();
        }
        session
    }

    fn payload(name: &str, bytes: usize) -> UploadPayload {
        UploadPayload {
            name: name.to_string(),
            kind: MediaKind::Image,
            mime: "image/png".to_string(),
            bytes: vec![7; bytes],
        }
    }

    fn gallery() -> Gallery {
        let mut gallery = Gallery::new(
            GalleryStore::open_in_memory().unwrap(),
            UploadLimits::default(),
        );
        gallery.load(Vec::new()).unwrap();
        gallery
    }

    fn names(view: &[&GalleryItem]) -> Vec<String> {
        view.iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn test_render_sorts_by_date_then_name() {
        let mut gallery = gallery();
        let session = session(true);
        gallery.accept_upload(&session, payload("b.png", 1), 100).unwrap();
        gallery.accept_upload(&session, payload("C.png", 2), 300).unwrap();
        gallery.accept_upload(&session, payload("a.png", 3), 200).unwrap();

        assert_eq!(names(&gallery.render()), ["C.png", "a.png", "b.png"]);

        gallery.set_sort_mode(SortMode::Name);
        assert_eq!(names(&gallery.render()), ["a.png", "b.png", "C.png"]);
    }

    #[test]
    fn test_render_filters_by_tag() {
        let mut gallery = gallery();
        let session = session(true);
        gallery.accept_upload(&session, payload("a.png", 1), 1).unwrap();
        gallery.items[0].tag = "oil".into();
        gallery.accept_upload(&session, payload("b.png", 2), 2).unwrap();

        gallery.set_filter("oil");
        assert_eq!(names(&gallery.render()), ["a.png"]);
        gallery.set_filter("sketch");
        assert!(gallery.render().is_empty());
        gallery.set_filter(TAG_ALL);
        assert_eq!(gallery.render().len(), 2);
    }

    #[test]
    fn test_upload_requires_login() {
        let mut gallery = gallery();
        let logged_out = session(false);
        assert!(matches!(
            gallery.prepare_upload(&logged_out, &[PathBuf::from("x.png")]),
            Err(GalleryError::NotAuthenticated)
        ));
        assert!(matches!(
            gallery.accept_upload(&logged_out, payload("x.png", 1), 1),
            Err(GalleryError::NotAuthenticated)
        ));
        assert!(gallery.is_empty());
    }

    #[test]
    fn test_oversized_upload_leaves_gallery_unchanged() {
        let dir = tempdir().unwrap();
        let big = dir.path().join("big.png");
        let small = dir.path().join("small.png");
        std::fs::write(&big, vec![0u8; 2048]).unwrap();
        std::fs::write(&small, vec![0u8; 16]).unwrap();

        let mut gallery = gallery();
        gallery.set_limits(UploadLimits {
            image_max_bytes: 1024,
            video_max_bytes: 4096,
        });
        let session = session(true);

        let (accepted, rejected) = gallery
            .prepare_upload(&session, &[big.clone(), small.clone()])
            .unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].name, "small.png");
        assert!(matches!(
            rejected.as_slice(),
            [GalleryError::TooLarge { size: 2048, limit: 1024, .. }]
        ));

        let oversized = read_upload(&UploadCandidate::inspect(&big).unwrap()).unwrap();
        assert!(matches!(
            gallery.accept_upload(&session, oversized, 1),
            Err(GalleryError::TooLarge { .. })
        ));
        assert!(gallery.is_empty());
        assert_eq!(gallery.store().count_items().unwrap(), 0);
    }

    #[test]
    fn test_unsupported_files_are_rejected() {
        let dir = tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"hello").unwrap();

        let gallery = gallery();
        let (accepted, rejected) = gallery.prepare_upload(&session(true), &[notes]).unwrap();
        assert!(accepted.is_empty());
        assert!(matches!(
            rejected.as_slice(),
            [GalleryError::UnsupportedType(name)] if name == "notes.txt"
        ));
    }

    #[test]
    fn test_read_upload_detects_mime() {
        let dir = tempdir().unwrap();
        let clip = dir.path().join("clip.MOV");
        std::fs::write(&clip, b"....").unwrap();

        let candidate = UploadCandidate::inspect(&clip).unwrap();
        assert_eq!(candidate.kind, MediaKind::Video);
        let payload = read_upload(&candidate).unwrap();
        assert_eq!(payload.mime, "video/quicktime");
        assert_eq!(payload.bytes, b"....");
    }

    #[test]
    fn test_timestamps_are_unique_and_nonzero() {
        let mut gallery = gallery();
        let session = session(true);
        gallery.accept_upload(&session, payload("a.png", 1), 0).unwrap();
        gallery.accept_upload(&session, payload("b.png", 2), 0).unwrap();
        gallery.accept_upload(&session, payload("c.png", 3), 0).unwrap();

        let stamps: HashSet<i64> = gallery.items().iter().map(|i| i.timestamp).collect();
        assert_eq!(stamps.len(), 3);
        assert!(stamps.iter().all(|t| *t > 0));
    }

    #[test]
    fn test_delete_requires_confirmation_and_login() {
        let mut gallery = gallery();
        let artist = session(true);
        gallery.accept_upload(&artist, payload("a.png", 4), 10).unwrap();
        let fingerprint = gallery.items()[0].fingerprint();

        assert!(matches!(
            gallery.delete(&artist, fingerprint, false),
            Err(GalleryError::Cancelled)
        ));
        assert!(matches!(
            gallery.delete(&session(false), fingerprint, true),
            Err(GalleryError::NotAuthenticated)
        ));
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.store().count_items().unwrap(), 1);

        let removed = gallery.delete(&artist, fingerprint, true).unwrap();
        assert_eq!(removed.name, "a.png");
        assert!(gallery.is_empty());
        assert_eq!(gallery.store().count_items().unwrap(), 0);
        assert!(matches!(
            gallery.delete(&artist, fingerprint, true),
            Err(GalleryError::NotFound)
        ));
    }

    #[test]
    fn test_reload_preserves_membership() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("gallery.sqlite");
        let artist = session(true);
        let seeds = vec![GalleryItem::asset(
            PathBuf::from("images/seed.png"),
            MediaKind::Image,
        )];

        let before: HashSet<u64> = {
            let mut gallery = Gallery::new(
                GalleryStore::open(&db_path).unwrap(),
                UploadLimits::default(),
            );
            gallery.load(seeds.clone()).unwrap();
            gallery.accept_upload(&artist, payload("a.png", 5), 10).unwrap();
            gallery.accept_upload(&artist, payload("b.png", 6), 20).unwrap();
            gallery.items().iter().map(GalleryItem::fingerprint).collect()
        };

        let mut reloaded = Gallery::new(
            GalleryStore::open(&db_path).unwrap(),
            UploadLimits::default(),
        );
        reloaded.load(seeds).unwrap();
        let after: HashSet<u64> = reloaded.items().iter().map(GalleryItem::fingerprint).collect();
        assert_eq!(before, after);

        // New uploads after a reload keep increasing timestamps
        let item = reloaded.accept_upload(&artist, payload("c.png", 7), 5).unwrap();
        assert!(item.timestamp > 20);
    }

    #[test]
    fn test_seed_assets_scans_media_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.gif"), b"x").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("readme.md"), b"x").unwrap();
        std::fs::write(dir.path().join(".hidden.png"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.png"), b"x").unwrap();

        let seeds = seed_assets(dir.path());
        let names: Vec<&str> = seeds.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a.jpg", "b.gif"]);
        assert!(seeds.iter().all(|i| i.timestamp == 0));
    }

    #[test]
    fn test_seed_assets_accepts_dot_named_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join(".assets");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("wall.png"), b"x").unwrap();
        std::fs::write(root.join(".cache.png"), b"x").unwrap();

        let seeds = seed_assets(&root);
        let names: Vec<&str> = seeds.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["wall.png"]);
    }

    #[test]
    fn test_failed_write_keeps_memory_and_store_in_step() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("gallery.sqlite");
        let artist = session(true);

        let mut gallery = Gallery::new(
            GalleryStore::open(&db_path).unwrap(),
            UploadLimits::default(),
        );
        gallery.load(Vec::new()).unwrap();
        gallery.accept_upload(&artist, payload("kept.png", 4), 10).unwrap();
        let fingerprint = gallery.items()[0].fingerprint();

        // A second connection makes every write to the table fail
        let other = rusqlite::Connection::open(&db_path).unwrap();
        other
            .execute_batch(
                "
                CREATE TRIGGER refuse_delete BEFORE DELETE ON gallery_items
                BEGIN SELECT RAISE(ABORT, 'gallery is read-only'); END;
                CREATE TRIGGER refuse_insert BEFORE INSERT ON gallery_items
                BEGIN SELECT RAISE(ABORT, 'gallery is read-only'); END;
                ",
            )
            .unwrap();

        assert!(matches!(
            gallery.accept_upload(&artist, payload("lost.png", 4), 20),
            Err(GalleryError::Storage(_))
        ));
        assert_eq!(gallery.len(), 1);
        assert!(gallery.items().iter().all(|i| i.name != "lost.png"));

        assert!(matches!(
            gallery.delete(&artist, fingerprint, true),
            Err(GalleryError::Storage(_))
        ));
        assert!(gallery.find(fingerprint).is_some());

        other
            .execute_batch("DROP TRIGGER refuse_delete; DROP TRIGGER refuse_insert;")
            .unwrap();
        assert_eq!(
            gallery.store().count_items().unwrap(),
            gallery.len() as i64
        );

        gallery.delete(&artist, fingerprint, true).unwrap();
        assert_eq!(gallery.store().count_items().unwrap(), 0);
    }

    #[test]
    fn test_limits_never_exceed_store_capacity() {
        let limits = UploadLimits {
            image_max_bytes: 30 * 1024 * 1024,
            video_max_bytes: 4 * 1024 * 1024 * 1024,
        };
        assert_eq!(limits.limit_for(MediaKind::Video), MAX_PAYLOAD_BYTES);
        assert_eq!(limits.limit_for(MediaKind::Image), 30 * 1024 * 1024);
        assert!(UploadLimits::default().limit_for(MediaKind::Video) < 1_000_000_000);

        let mut gallery = gallery();
        gallery.set_limits(limits);
        let clip = UploadCandidate {
            path: PathBuf::from("clip.mp4"),
            name: "clip.mp4".to_string(),
            kind: MediaKind::Video,
            size: 1_000_000_000,
        };
        assert!(matches!(
            gallery.check_size(clip),
            Err(GalleryError::TooLarge { limit: MAX_PAYLOAD_BYTES, .. })
        ));
    }
}
