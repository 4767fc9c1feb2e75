use std::path::{Path, PathBuf};

use xxhash_rust::xxh3::xxh3_64;

/// Tag that bypasses filtering and is given to every item by default.
pub const TAG_ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tiff" | "tif" => Some(Self::Image),
            "webm" | "mp4" | "mkv" | "avi" | "mov" | "ogg" | "ogv" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "video" => Self::Video,
            _ => Self::Image,
        }
    }
}

/// Where an item's media lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaData {
    /// A file shipped with the portfolio.
    Asset(PathBuf),
    /// An uploaded payload kept in the store.
    Inline { mime: String, bytes: Vec<u8> },
}

impl MediaData {
    pub fn len(&self) -> usize {
        match self {
            Self::Asset(_) => 0,
            Self::Inline { bytes, .. } => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub name: String,
    pub kind: MediaKind,
    pub data: MediaData,
    /// Upload time in ms since the epoch; 0 for seeded items.
    pub timestamp: i64,
    pub tag: String,
}

impl GalleryItem {
    /// A seeded item backed by a file on disk.
    pub fn asset(path: PathBuf, kind: MediaKind) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            kind,
            data: MediaData::Asset(path),
            timestamp: 0,
            tag: TAG_ALL.to_string(),
        }
    }

    /// Seeded items are never written to the store.
    pub fn is_persisted(&self) -> bool {
        self.timestamp > 0
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    /// Stable identity of the data reference.
    pub fn fingerprint(&self) -> u64 {
        match &self.data {
            MediaData::Asset(path) => xxh3_64(path.to_string_lossy().as_bytes()),
            MediaData::Inline { bytes, .. } => xxh3_64(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(MediaKind::from_extension("GIF"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_extension("webm"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("txt"), None);
        assert_eq!(
            MediaKind::from_path(Path::new("images/deer +cloud-2-2.jpg")),
            Some(MediaKind::Image)
        );
    }

    #[test]
    fn test_asset_item_defaults() {
        let item = GalleryItem::asset(PathBuf::from("images/9-1-2.png"), MediaKind::Image);
        assert_eq!(item.name, "9-1-2.png");
        assert_eq!(item.tag, TAG_ALL);
        assert!(!item.is_persisted());
    }

    #[test]
    fn test_fingerprint_follows_data() {
        let a = GalleryItem::asset(PathBuf::from("images/a.png"), MediaKind::Image);
        let mut b = a.clone();
        b.name = "renamed.png".into();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = GalleryItem::asset(PathBuf::from("images/c.png"), MediaKind::Image);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
