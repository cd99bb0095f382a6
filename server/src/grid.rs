//! Static passability grid over chunks.
//!
//! Terrain is fixed at construction: one byte per chunk, 0 passable and
//! 1 impassable, stored row-major. Out-of-bounds chunks are treated as
//! impassable by queries rather than raising.

use shared::Coord;

/// Terrain code for a chunk a unit can stand in and cross.
pub const TERRAIN_OPEN: u8 = 0;
/// Terrain code for an impassable chunk.
pub const TERRAIN_BLOCKED: u8 = 1;

/// The world's chunk grid.
#[derive(Debug, Clone)]
pub struct GridMap {
    width: u32,
    height: u32,
    terrain: Vec<u8>,
}

impl GridMap {
    /// Creates an all-passable map.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn open(width: u32, height: u32) -> Self {
        assert!(width > 0, "GridMap width must be positive");
        assert!(height > 0, "GridMap height must be positive");
        Self {
            width,
            height,
            terrain: vec![TERRAIN_OPEN; (width as usize) * (height as usize)],
        }
    }

    /// Parses a map from rows of `.` (passable) and `@` (impassable).
    /// Row order is top to bottom, i.e. the first row is y = 0.
    ///
    /// # Panics
    ///
    /// Panics on an empty string, ragged rows, or unknown characters.
    pub fn from_rows(rows: &str) -> Self {
        let lines: Vec<&str> = rows.lines().filter(|l| !l.is_empty()).collect();
        assert!(!lines.is_empty(), "GridMap needs at least one row");
        let width = lines[0].chars().count();
        assert!(width > 0, "GridMap needs at least one column");

        let mut terrain = Vec::with_capacity(width * lines.len());
        for line in &lines {
            assert_eq!(line.chars().count(), width, "ragged map row: {line:?}");
            for ch in line.chars() {
                terrain.push(match ch {
                    '.' => TERRAIN_OPEN,
                    '@' => TERRAIN_BLOCKED,
                    other => panic!("unknown terrain character {other:?}"),
                });
            }
        }

        Self {
            width: width as u32,
            height: lines.len() as u32,
            terrain,
        }
    }

    /// Map width in chunks.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Map height in chunks.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Terrain codes in row-major order, for the handshake snapshot.
    pub fn terrain(&self) -> &[u8] {
        &self.terrain
    }

    /// True iff the chunk lies within `[0, width) x [0, height)`.
    pub fn in_bounds(&self, chunk: (i32, i32)) -> bool {
        let (cx, cy) = chunk;
        cx >= 0 && cy >= 0 && (cx as u32) < self.width && (cy as u32) < self.height
    }

    /// True iff the chunk is in bounds and its terrain is open.
    pub fn is_passable(&self, chunk: (i32, i32)) -> bool {
        if !self.in_bounds(chunk) {
            return false;
        }
        let index = (chunk.1 as usize) * (self.width as usize) + (chunk.0 as usize);
        self.terrain[index] == TERRAIN_OPEN
    }

    /// True iff the chunk containing `pos` is passable.
    pub fn is_position_passable(&self, pos: Coord) -> bool {
        self.is_passable(pos.to_chunk())
    }
}
