use std::fmt;
use std::str::FromStr;

/// Column labels, left to right.
pub const COL_LABELS: [&str; 5] = ["L2", "L1", "C", "R1", "R2"];
/// Row labels, top to bottom.
pub const ROW_LABELS: [&str; 7] = ["U1", "GROUND", "D1", "D2", "D3", "D4", "D5"];

pub const COLS: usize = COL_LABELS.len();
pub const ROWS: usize = ROW_LABELS.len();

pub const COL_C: usize = 2;
pub const COL_R1: usize = 3;
pub const ROW_U1: usize = 0;
pub const ROW_GROUND: usize = 1;
pub const ROW_D1: usize = 2;

/// Navigation direction for grid movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// A room in the 5×7 grid. Indices are always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    col: usize,
    row: usize,
}

impl GridPos {
    /// The room shown on startup.
    pub const HOME: GridPos = GridPos {
        col: COL_C,
        row: ROW_GROUND,
    };
    /// First room of the gallery zone.
    pub const GALLERY_ENTRY: GridPos = GridPos {
        col: COL_R1,
        row: ROW_D1,
    };
    pub const R1_GROUND: GridPos = GridPos {
        col: COL_R1,
        row: ROW_GROUND,
    };
    pub const R1_U1: GridPos = GridPos {
        col: COL_R1,
        row: ROW_U1,
    };

    pub fn new(col: usize, row: usize) -> Option<Self> {
        (col < COLS && row < ROWS).then_some(Self { col, row })
    }

    /// Build a position, saturating out-of-range indices to the last cell.
    pub fn clamped(col: usize, row: usize) -> Self {
        Self {
            col: col.min(COLS - 1),
            row: row.min(ROWS - 1),
        }
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// One step in `direction`, staying put at the grid edge.
    pub fn step(self, direction: Direction) -> Self {
        let (mut col, mut row) = (self.col, self.row);
        match direction {
            Direction::Left => col = col.saturating_sub(1),
            Direction::Right => col = (col + 1).min(COLS - 1),
            Direction::Up => row = row.saturating_sub(1),
            Direction::Down => row = (row + 1).min(ROWS - 1),
        }
        Self { col, row }
    }

    pub fn with_row(self, row: usize) -> Self {
        Self::clamped(self.col, row)
    }

    /// Whether this room belongs to the R1_D1..R1_D5 gallery zone.
    pub fn is_restricted(&self) -> bool {
        self.col == COL_R1 && self.row >= ROW_D1
    }

    pub fn id(&self) -> String {
        self.to_string()
    }

    /// Every room, row-major.
    pub fn all() -> impl Iterator<Item = GridPos> {
        (0..ROWS).flat_map(|row| (0..COLS).map(move |col| GridPos { col, row }))
    }
}

impl Default for GridPos {
    fn default() -> Self {
        Self::HOME
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", COL_LABELS[self.col], ROW_LABELS[self.row])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown grid cell: {0}")]
pub struct ParseGridPosError(pub String);

impl FromStr for GridPos {
    type Err = ParseGridPosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (col_label, row_label) = s
            .split_once('_')
            .ok_or_else(|| ParseGridPosError(s.to_string()))?;
        let col = COL_LABELS.iter().position(|c| *c == col_label);
        let row = ROW_LABELS.iter().position(|r| *r == row_label);
        col.zip(row)
            .and_then(|(col, row)| Self::new(col, row))
            .ok_or_else(|| ParseGridPosError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        for pos in GridPos::all() {
            let parsed: GridPos = pos.id().parse().unwrap();
            assert_eq!(parsed, pos);
        }
        assert_eq!(GridPos::all().count(), COLS * ROWS);
    }

    #[test]
    fn test_parse_rejects_unknown_labels() {
        assert!("R3_GROUND".parse::<GridPos>().is_err());
        assert!("C-GROUND".parse::<GridPos>().is_err());
        assert!("C_D6".parse::<GridPos>().is_err());
    }

    #[test]
    fn test_step_stays_in_bounds() {
        let top_left = GridPos::new(0, 0).unwrap();
        assert_eq!(top_left.step(Direction::Left), top_left);
        assert_eq!(top_left.step(Direction::Up), top_left);

        let bottom_right = GridPos::new(COLS - 1, ROWS - 1).unwrap();
        assert_eq!(bottom_right.step(Direction::Right), bottom_right);
        assert_eq!(bottom_right.step(Direction::Down), bottom_right);
    }

    #[test]
    fn test_restricted_zone_membership() {
        let restricted: Vec<String> = GridPos::all()
            .filter(GridPos::is_restricted)
            .map(|p| p.id())
            .collect();
        assert_eq!(restricted, ["R1_D1", "R1_D2", "R1_D3", "R1_D4", "R1_D5"]);
        assert!(!GridPos::R1_GROUND.is_restricted());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(GridPos::new(COLS, 0).is_none());
        assert!(GridPos::new(0, ROWS).is_none());
        assert_eq!(GridPos::clamped(99, 99), GridPos::new(4, 6).unwrap());
    }
}
