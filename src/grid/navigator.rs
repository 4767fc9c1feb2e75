// Grid navigator for the cave portfolio
// Owns the current room and the flags that gate navigation input.
//
// Routing rules around the R1_D1..R1_D5 gallery zone:
// - leaving the zone left/right lands on the GROUND row of the neighbour column
// - entering the zone from outside always lands on R1_D1
// - leaving the zone by any other move (except into R1_U1) uses a black fade
// - R1_D1 -> R1_GROUND is a plain smooth scroll

use super::position::{Direction, GridPos, ROW_GROUND};

/// How the viewport gets to the target room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStyle {
    /// Animated scroll, position committed immediately.
    Smooth,
    /// Black-screen transition; the jump happens while the overlay is opaque.
    Fade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationPlan {
    pub target: GridPos,
    pub style: MoveStyle,
}

/// Outcome of a settled wheel/drag scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapDecision {
    /// Scroll to the room and make it current.
    Snap(GridPos),
    /// Record the room as current without moving the viewport.
    Track(GridPos),
}

#[derive(Debug, Clone)]
pub struct Navigator {
    current: GridPos,
    previous: GridPos,
    transitioning: bool,
    resizing: bool,
    login_modal_open: bool,
}

impl Navigator {
    pub fn new(start: GridPos) -> Self {
        Self {
            current: start,
            previous: start,
            transitioning: false,
            resizing: false,
            login_modal_open: false,
        }
    }

    pub fn current(&self) -> GridPos {
        self.current
    }

    pub fn previous(&self) -> GridPos {
        self.previous
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn is_resizing(&self) -> bool {
        self.resizing
    }

    /// Whether directional input is currently accepted.
    pub fn accepts_input(&self) -> bool {
        !(self.transitioning || self.resizing || self.login_modal_open)
    }

    pub fn set_resizing(&mut self, resizing: bool) {
        self.resizing = resizing;
    }

    pub fn set_login_modal_open(&mut self, open: bool) {
        self.login_modal_open = open;
    }

    /// Mark a black-screen sequence as running. Returns false if one already is.
    pub fn begin_transition(&mut self) -> bool {
        if self.transitioning {
            return false;
        }
        self.transitioning = true;
        true
    }

    pub fn finish_transition(&mut self) {
        self.transitioning = false;
    }

    /// Record arrival at `pos`.
    pub fn commit(&mut self, pos: GridPos) {
        self.previous = self.current;
        self.current = pos;
    }

    /// Compute where `direction` leads and how to get there.
    ///
    /// Returns `None` without touching any state while input is gated.
    /// `Smooth` plans are committed before returning; `Fade` plans leave the
    /// navigator transitioning until the sequencer reports completion.
    pub fn navigate(&mut self, direction: Direction) -> Option<NavigationPlan> {
        if !self.accepts_input() {
            return None;
        }

        let plan = Self::plan(self.current, direction);
        match plan.style {
            MoveStyle::Smooth => self.commit(plan.target),
            MoveStyle::Fade => {
                self.transitioning = true;
            }
        }
        Some(plan)
    }

    /// Pure routing: where does `direction` from `source` end up.
    pub fn plan(source: GridPos, direction: Direction) -> NavigationPlan {
        let candidate = source.step(direction);

        if source.is_restricted() && direction.is_horizontal() {
            return NavigationPlan {
                target: candidate.with_row(ROW_GROUND),
                style: MoveStyle::Fade,
            };
        }

        if !source.is_restricted() && candidate.is_restricted() {
            return NavigationPlan {
                target: GridPos::GALLERY_ENTRY,
                style: MoveStyle::Fade,
            };
        }

        if source.is_restricted() && !candidate.is_restricted() && candidate != GridPos::R1_U1 {
            // R1_D1 -> R1_GROUND is the one seam that scrolls without a fade
            if !(source == GridPos::GALLERY_ENTRY
                && direction == Direction::Up
                && candidate == GridPos::R1_GROUND)
            {
                return NavigationPlan {
                    target: candidate,
                    style: MoveStyle::Fade,
                };
            }
        }

        NavigationPlan {
            target: candidate,
            style: MoveStyle::Smooth,
        }
    }

    /// Direct jump from the overview panel.
    pub fn jump_to(&mut self, pos: GridPos) -> bool {
        if self.transitioning {
            return false;
        }
        self.commit(pos);
        true
    }

    /// Decide what to do once wheel scrolling has settled near `nearest`.
    pub fn snap_decision(&mut self, nearest: GridPos) -> Option<SnapDecision> {
        if self.transitioning || self.resizing {
            return None;
        }

        let inside_zone = self.current.is_restricted() && nearest.is_restricted();
        let decision = if inside_zone && nearest != self.current {
            SnapDecision::Track(nearest)
        } else {
            SnapDecision::Snap(nearest)
        };

        if nearest != self.current {
            self.commit(nearest);
        }
        Some(decision)
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(GridPos::HOME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::position::{COLS, COL_C, ROWS, ROW_D1};

    const ALL_DIRECTIONS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    fn pos(id: &str) -> GridPos {
        id.parse().unwrap()
    }

    #[test]
    fn test_navigate_never_leaves_grid() {
        for start in GridPos::all() {
            for dir in ALL_DIRECTIONS {
                let plan = Navigator::plan(start, dir);
                assert!(plan.target.col() < COLS);
                assert!(plan.target.row() < ROWS);
            }
        }
    }

    #[test]
    fn test_leaving_gallery_sideways_lands_on_ground() {
        for row in ROW_D1..ROWS {
            let start = GridPos::new(3, row).unwrap();
            let left = Navigator::plan(start, Direction::Left);
            assert_eq!(left.target, pos("C_GROUND"));
            assert_eq!(left.style, MoveStyle::Fade);

            let right = Navigator::plan(start, Direction::Right);
            assert_eq!(right.target, pos("R2_GROUND"));
            assert_eq!(right.style, MoveStyle::Fade);
        }
    }

    #[test]
    fn test_entering_gallery_always_lands_on_first_cell() {
        for start in GridPos::all().filter(|p| !p.is_restricted()) {
            for dir in ALL_DIRECTIONS {
                let candidate = start.step(dir);
                if candidate.is_restricted() {
                    let plan = Navigator::plan(start, dir);
                    assert_eq!(plan.target, GridPos::GALLERY_ENTRY, "from {start} {dir:?}");
                    assert_eq!(plan.style, MoveStyle::Fade);
                }
            }
        }
        // Lateral entry from deep rows still lands on D1
        let plan = Navigator::plan(pos("C_D4"), Direction::Right);
        assert_eq!(plan.target, pos("R1_D1"));
    }

    #[test]
    fn test_gallery_to_ground_seam_scrolls_without_fade() {
        let plan = Navigator::plan(pos("R1_D1"), Direction::Up);
        assert_eq!(plan.target, pos("R1_GROUND"));
        assert_eq!(plan.style, MoveStyle::Smooth);
    }

    #[test]
    fn test_moves_inside_gallery_scroll_smoothly() {
        let down = Navigator::plan(pos("R1_D2"), Direction::Down);
        assert_eq!(down.target, pos("R1_D3"));
        assert_eq!(down.style, MoveStyle::Smooth);

        let up = Navigator::plan(pos("R1_D3"), Direction::Up);
        assert_eq!(up.target, pos("R1_D2"));
        assert_eq!(up.style, MoveStyle::Smooth);
    }

    #[test]
    fn test_two_rights_from_home() {
        let mut nav = Navigator::default();
        nav.navigate(Direction::Right).unwrap();
        nav.navigate(Direction::Right).unwrap();
        assert_eq!(nav.current(), pos("R2_GROUND"));
        assert_eq!(nav.previous(), pos("R1_GROUND"));
    }

    #[test]
    fn test_navigation_rejected_while_transitioning() {
        let mut nav = Navigator::new(pos("R1_D1"));
        let plan = nav.navigate(Direction::Left).unwrap();
        assert_eq!(plan.style, MoveStyle::Fade);
        assert!(nav.is_transitioning());

        for dir in ALL_DIRECTIONS {
            assert!(nav.navigate(dir).is_none());
        }
        assert_eq!(nav.current(), pos("R1_D1"));

        nav.commit(plan.target);
        nav.finish_transition();
        assert_eq!(nav.current(), GridPos::new(COL_C, 1).unwrap());
        assert!(nav.navigate(Direction::Up).is_some());
    }

    #[test]
    fn test_navigation_rejected_while_resizing_or_logging_in() {
        let mut nav = Navigator::default();
        nav.set_resizing(true);
        assert!(nav.navigate(Direction::Left).is_none());
        nav.set_resizing(false);

        nav.set_login_modal_open(true);
        assert!(nav.navigate(Direction::Left).is_none());
        assert_eq!(nav.current(), GridPos::HOME);
    }

    #[test]
    fn test_begin_transition_is_exclusive() {
        let mut nav = Navigator::default();
        assert!(nav.begin_transition());
        assert!(!nav.begin_transition());
        nav.finish_transition();
        assert!(nav.begin_transition());
    }

    #[test]
    fn test_snap_tracks_inside_gallery() {
        let mut nav = Navigator::new(pos("R1_D2"));
        assert_eq!(
            nav.snap_decision(pos("R1_D4")),
            Some(SnapDecision::Track(pos("R1_D4")))
        );
        assert_eq!(nav.current(), pos("R1_D4"));

        assert_eq!(
            nav.snap_decision(pos("R1_GROUND")),
            Some(SnapDecision::Snap(pos("R1_GROUND")))
        );
    }

    #[test]
    fn test_snap_suppressed_while_resizing() {
        let mut nav = Navigator::default();
        nav.set_resizing(true);
        assert_eq!(nav.snap_decision(pos("L1_GROUND")), None);
        assert_eq!(nav.current(), GridPos::HOME);
    }

    #[test]
    fn test_snap_to_same_cell_keeps_previous() {
        let mut nav = Navigator::default();
        nav.navigate(Direction::Left).unwrap();
        assert_eq!(
            nav.snap_decision(pos("L1_GROUND")),
            Some(SnapDecision::Snap(pos("L1_GROUND")))
        );
        assert_eq!(nav.previous(), GridPos::HOME);
    }
}
