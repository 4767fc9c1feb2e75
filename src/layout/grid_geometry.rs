use crate::grid::GridPos;

/// Scroll offsets and cell size of the room viewport.
///
/// Every room is exactly one viewport in size, so the cell grid is uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub viewport_w: f64,
    pub viewport_h: f64,
}

impl GridGeometry {
    pub fn new(scroll_x: f64, scroll_y: f64, viewport_w: f64, viewport_h: f64) -> Self {
        Self {
            scroll_x,
            scroll_y,
            viewport_w: sanitize_extent(viewport_w),
            viewport_h: sanitize_extent(viewport_h),
        }
    }

    /// Top-left scroll offset that shows `pos` exactly.
    pub fn origin_of(&self, pos: GridPos) -> (f64, f64) {
        (
            pos.col() as f64 * self.viewport_w,
            pos.row() as f64 * self.viewport_h,
        )
    }

    pub fn center_of(&self, pos: GridPos) -> (f64, f64) {
        let (x, y) = self.origin_of(pos);
        (x + self.viewport_w / 2.0, y + self.viewport_h / 2.0)
    }

    pub fn viewport_center(&self) -> (f64, f64) {
        (
            self.scroll_x + self.viewport_w / 2.0,
            self.scroll_y + self.viewport_h / 2.0,
        )
    }

    /// The room whose centre is closest (Euclidean) to the viewport centre.
    /// Ties go to the first room in row-major order.
    pub fn nearest_cell(&self) -> GridPos {
        let (cx, cy) = self.viewport_center();
        let mut closest = GridPos::HOME;
        let mut min_distance = f64::INFINITY;
        for pos in GridPos::all() {
            let (x, y) = self.center_of(pos);
            let distance = (cx - x).hypot(cy - y);
            if distance < min_distance {
                min_distance = distance;
                closest = pos;
            }
        }
        closest
    }
}

fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(id: &str) -> GridPos {
        id.parse().unwrap()
    }

    #[test]
    fn test_exact_origin_is_nearest() {
        let base = GridGeometry::new(0.0, 0.0, 1280.0, 720.0);
        for cell in GridPos::all() {
            let (x, y) = base.origin_of(cell);
            let geometry = GridGeometry::new(x, y, 1280.0, 720.0);
            assert_eq!(geometry.nearest_cell(), cell);
        }
    }

    #[test]
    fn test_partial_scroll_snaps_to_majority_cell() {
        // 40% of the way from C_GROUND towards R1_GROUND
        let geometry = GridGeometry::new(2.4 * 1000.0, 800.0, 1000.0, 800.0);
        assert_eq!(geometry.nearest_cell(), pos("C_GROUND"));

        // 60% of the way down from R1_D1 to R1_D2
        let geometry = GridGeometry::new(3000.0, 2.6 * 800.0, 1000.0, 800.0);
        assert_eq!(geometry.nearest_cell(), pos("R1_D2"));
    }

    #[test]
    fn test_overscroll_clamps_to_edge_cell() {
        let geometry = GridGeometry::new(-500.0, 99_999.0, 1000.0, 800.0);
        assert_eq!(geometry.nearest_cell(), pos("L2_D5"));
    }

    #[test]
    fn test_degenerate_viewport_is_sanitized() {
        let geometry = GridGeometry::new(0.0, 0.0, 0.0, f64::NAN);
        assert_eq!(geometry.viewport_w, 1.0);
        assert_eq!(geometry.viewport_h, 1.0);
        assert_eq!(geometry.origin_of(pos("R2_D5")), (4.0, 6.0));
    }
}
