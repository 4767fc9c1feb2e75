//! State shown in the paged debug panel.

use crate::grid::GridPos;

pub const DEBUG_PAGE_SIZE: usize = 8;
pub const DEBUG_PAGE_COUNT: usize = 10;
pub const EMPTY_ENTRY: &str = "<empty>";

/// Latest value of every reported field. Blank fields render as `<empty>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugInfo {
    pub previous_block: Option<GridPos>,
    pub current_block: Option<GridPos>,
    pub artwork: String,
    pub lightbox: String,
    pub filter: String,
    pub nav: String,
    pub input: String,
}

impl DebugInfo {
    pub fn set_blocks(&mut self, previous: GridPos, current: GridPos) {
        self.previous_block = Some(previous);
        self.current_block = Some(current);
    }

    /// Labelled lines in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let block = |pos: Option<GridPos>| pos.map(|p| p.id()).unwrap_or_default();
        vec![
            ("Previous block", block(self.previous_block)),
            ("Current block", block(self.current_block)),
            ("Artwork info", self.artwork.clone()),
            ("Lightbox", self.lightbox.clone()),
            ("Filter", self.filter.clone()),
            ("Nav", self.nav.clone()),
            ("Input", self.input.clone()),
        ]
    }
}

/// Fixed-size pager over `DebugInfo::entries`, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugPager {
    page: usize,
}

impl Default for DebugPager {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl DebugPager {
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn label(&self) -> String {
        format!("Page {}/{}", self.page, DEBUG_PAGE_COUNT)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < DEBUG_PAGE_COUNT
    }

    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Rendered lines for the current page, always `DEBUG_PAGE_SIZE` long.
    pub fn lines(&self, info: &DebugInfo) -> Vec<String> {
        let entries = info.entries();
        let start = (self.page - 1) * DEBUG_PAGE_SIZE;
        (start..start + DEBUG_PAGE_SIZE)
            .map(|i| match entries.get(i) {
                Some((label, value)) if !value.trim().is_empty() => {
                    format!("{}: {}", label, value)
                }
                Some((label, _)) => format!("{}: {}", label, EMPTY_ENTRY),
                None => EMPTY_ENTRY.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pager_bounds() {
        let mut pager = DebugPager::default();
        assert_eq!(pager.label(), "Page 1/10");
        assert!(!pager.has_prev());
        assert!(!pager.prev());

        for _ in 0..20 {
            pager.next();
        }
        assert_eq!(pager.page(), DEBUG_PAGE_COUNT);
        assert!(!pager.has_next());
        assert_eq!(pager.label(), "Page 10/10");
    }

    #[test]
    fn test_first_page_lines() {
        let mut info = DebugInfo::default();
        info.set_blocks(GridPos::HOME, GridPos::R1_GROUND);
        info.input = "ArrowRight".into();

        let lines = DebugPager::default().lines(&info);
        assert_eq!(lines.len(), DEBUG_PAGE_SIZE);
        assert_eq!(lines[0], "Previous block: C_GROUND");
        assert_eq!(lines[1], "Current block: R1_GROUND");
        assert_eq!(lines[2], "Artwork info: <empty>");
        assert_eq!(lines[6], "Input: ArrowRight");
        assert_eq!(lines[7], EMPTY_ENTRY);
    }

    #[test]
    fn test_later_pages_are_blank() {
        let mut pager = DebugPager::default();
        pager.next();
        let lines = pager.lines(&DebugInfo::default());
        assert!(lines.iter().all(|l| l == EMPTY_ENTRY));
    }
}
