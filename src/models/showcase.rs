use crate::grid::GridPos;
use crate::models::{GalleryItem, MediaKind};

/// A fixed artwork card pinned to one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Showcase {
    pub pos: GridPos,
    pub tag: &'static str,
    pub title: &'static str,
    pub year: u16,
    pub medium: &'static str,
    pub kind: MediaKind,
    /// File name inside the asset directory.
    pub source: &'static str,
}

impl Showcase {
    /// Text reported to the debug panel while hovered.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) · {} · {}",
            self.title, self.year, self.medium, self.tag
        )
    }
}

pub fn default_showcases() -> Vec<Showcase> {
    vec![
        Showcase {
            pos: GridPos::HOME,
            tag: "watercolor",
            title: "Still Life Study",
            year: 2024,
            medium: "Watercolor on paper",
            kind: MediaKind::Image,
            source: "9-1-2.png",
        },
        Showcase {
            pos: GridPos::clamped(1, 2),
            tag: "oil",
            title: "Portrait Series #3",
            year: 2023,
            medium: "Oil on canvas",
            kind: MediaKind::Image,
            source: "deer +cloud-2-2.jpg",
        },
        Showcase {
            pos: GridPos::clamped(4, 0),
            tag: "sketch",
            title: "Class Sketches",
            year: 2022,
            medium: "Pencil",
            kind: MediaKind::Image,
            source: "clip 練習 光影 角.jpg",
        },
    ]
}

pub fn showcase_at(showcases: &[Showcase], pos: GridPos) -> Option<&Showcase> {
    showcases.iter().find(|s| s.pos == pos)
}

/// Seeded artwork shown in a showcase inherits that showcase's tag.
pub fn tag_seeds(seeds: &mut [GalleryItem], showcases: &[Showcase]) {
    for item in seeds.iter_mut() {
        if let Some(showcase) = showcases.iter().find(|s| s.source == item.name) {
            item.tag = showcase.tag.to_string();
        }
    }
}

/// Distinct tags offered by the filter row, `all` first.
pub fn filter_tags(showcases: &[Showcase]) -> Vec<&'static str> {
    let mut tags = vec![crate::models::TAG_ALL];
    for showcase in showcases {
        if !tags.contains(&showcase.tag) {
            tags.push(showcase.tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rooms() {
        let showcases = default_showcases();
        let ids: Vec<String> = showcases.iter().map(|s| s.pos.id()).collect();
        assert_eq!(ids, ["C_GROUND", "L1_D1", "R2_U1"]);
        assert_eq!(
            showcase_at(&showcases, GridPos::HOME).map(|s| s.tag),
            Some("watercolor")
        );
        assert!(showcase_at(&showcases, GridPos::GALLERY_ENTRY).is_none());
    }

    #[test]
    fn test_tag_seeds_by_source() {
        let mut seeds = vec![
            GalleryItem::asset("images/9-1-2.png".into(), MediaKind::Image),
            GalleryItem::asset("images/blender piggy-test.gif".into(), MediaKind::Image),
        ];
        tag_seeds(&mut seeds, &default_showcases());
        assert_eq!(seeds[0].tag, "watercolor");
        assert_eq!(seeds[1].tag, "all");
    }

    #[test]
    fn test_filter_tags() {
        assert_eq!(
            filter_tags(&default_showcases()),
            ["all", "watercolor", "oil", "sketch"]
        );
    }
}
