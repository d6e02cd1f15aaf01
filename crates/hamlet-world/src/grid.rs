//! Grid geometry: bounds checks, adjacency, distances, and chunk math.
//!
//! All functions here are pure. Out-of-range coordinates are simply
//! "invalid" -- nothing in this module returns an error.

use hamlet_types::{Direction, Position};
use serde::{Deserialize, Serialize};

/// Default half-width of the square world (tiles from origin to edge).
pub const DEFAULT_HALF_EXTENT: i32 = 64;

/// The bounded square region in which positions are valid.
///
/// Valid coordinates satisfy `-half_extent <= x, z <= half_extent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    half_extent: i32,
}

impl GridBounds {
    /// Create bounds with the given half-width. Negative values are
    /// treated as zero (only the origin is valid).
    pub const fn new(half_extent: i32) -> Self {
        Self {
            half_extent: if half_extent < 0 { 0 } else { half_extent },
        }
    }

    /// Half-width of the region.
    pub const fn half_extent(&self) -> i32 {
        self.half_extent
    }

    /// Whether `pos` lies inside the region.
    pub const fn is_valid(&self, pos: Position) -> bool {
        pos.x >= -self.half_extent
            && pos.x <= self.half_extent
            && pos.z >= -self.half_extent
            && pos.z <= self.half_extent
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::new(DEFAULT_HALF_EXTENT)
    }
}

/// Manhattan (taxicab) distance between two tiles.
pub const fn manhattan_distance(a: Position, b: Position) -> u32 {
    a.x.abs_diff(b.x).saturating_add(a.z.abs_diff(b.z))
}

/// Whether two tiles are orthogonal neighbors (distance exactly 1).
pub const fn is_adjacent(a: Position, b: Position) -> bool {
    manhattan_distance(a, b) == 1
}

/// The four orthogonal neighbors of `pos` in [`Direction::ALL`] order.
///
/// Neighbors whose coordinates would overflow are omitted. Callers that
/// care about world bounds must filter with [`GridBounds::is_valid`].
pub fn adjacent_positions(pos: Position) -> Vec<Position> {
    Direction::ALL
        .iter()
        .filter_map(|&dir| pos.offset(dir))
        .collect()
}

/// The direction that moves `from` one tile closer to `to` along the x axis.
fn x_step(from: Position, to: Position) -> Option<Direction> {
    match to.x.cmp(&from.x) {
        core::cmp::Ordering::Greater => Some(Direction::East),
        core::cmp::Ordering::Less => Some(Direction::West),
        core::cmp::Ordering::Equal => None,
    }
}

/// The direction that moves `from` one tile closer to `to` along the z axis.
fn z_step(from: Position, to: Position) -> Option<Direction> {
    match to.z.cmp(&from.z) {
        core::cmp::Ordering::Greater => Some(Direction::South),
        core::cmp::Ordering::Less => Some(Direction::North),
        core::cmp::Ordering::Equal => None,
    }
}

/// Candidate single-tile steps from `from` towards `to`, best first.
///
/// The first candidate reduces the larger of `|dx|` and `|dz|` (x wins
/// ties). The second reduces the other axis, if it differs. No diagonals.
/// Returns an empty list when `from == to`.
pub fn step_candidates(from: Position, to: Position) -> Vec<Direction> {
    let dx = from.x.abs_diff(to.x);
    let dz = from.z.abs_diff(to.z);
    let (primary, secondary) = if dx >= dz {
        (x_step(from, to), z_step(from, to))
    } else {
        (z_step(from, to), x_step(from, to))
    };
    primary.into_iter().chain(secondary).collect()
}

/// Coordinate of a square world-generation chunk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    /// Chunk column.
    pub x: i32,
    /// Chunk row.
    pub z: i32,
}

impl ChunkCoord {
    /// Create a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing `pos` for the given chunk size.
    ///
    /// Returns `None` if `chunk_size` is zero.
    pub fn containing(pos: Position, chunk_size: u32) -> Option<Self> {
        let size = i32::try_from(chunk_size).ok().filter(|s| *s > 0)?;
        Some(Self {
            x: pos.x.div_euclid(size),
            z: pos.z.div_euclid(size),
        })
    }

    /// Every tile inside this chunk, row by row.
    ///
    /// Returns an empty list if `chunk_size` is zero or the chunk lies so
    /// far out that its coordinates overflow.
    pub fn tiles(self, chunk_size: u32) -> Vec<Position> {
        let Ok(size) = i32::try_from(chunk_size) else {
            return Vec::new();
        };
        let (Some(origin_x), Some(origin_z)) = (self.x.checked_mul(size), self.z.checked_mul(size))
        else {
            return Vec::new();
        };
        let mut tiles = Vec::new();
        for dz in 0..size {
            for dx in 0..size {
                if let (Some(x), Some(z)) = (origin_x.checked_add(dx), origin_z.checked_add(dz)) {
                    tiles.push(Position::new(x, z));
                }
            }
        }
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let bounds = GridBounds::new(10);
        assert!(bounds.is_valid(Position::new(10, -10)));
        assert!(bounds.is_valid(Position::new(0, 0)));
        assert!(!bounds.is_valid(Position::new(11, 0)));
        assert!(!bounds.is_valid(Position::new(0, -11)));
    }

    #[test]
    fn negative_extent_only_allows_origin() {
        let bounds = GridBounds::new(-5);
        assert!(bounds.is_valid(Position::new(0, 0)));
        assert!(!bounds.is_valid(Position::new(1, 0)));
    }

    #[test]
    fn manhattan_distance_sums_axes() {
        assert_eq!(manhattan_distance(Position::new(0, 0), Position::new(3, -4)), 7);
        assert_eq!(manhattan_distance(Position::new(2, 2), Position::new(2, 2)), 0);
        assert_eq!(
            manhattan_distance(Position::new(i32::MIN, 0), Position::new(i32::MAX, 0)),
            u32::MAX
        );
    }

    #[test]
    fn adjacency_excludes_diagonals() {
        let origin = Position::new(0, 0);
        let neighbors = adjacent_positions(origin);
        assert_eq!(neighbors.len(), 4);
        assert!(neighbors.contains(&Position::new(1, 0)));
        assert!(neighbors.contains(&Position::new(0, -1)));
        assert!(!neighbors.contains(&Position::new(1, 1)));
        assert!(neighbors.iter().all(|n| is_adjacent(origin, *n)));
    }

    #[test]
    fn step_reduces_larger_axis_first() {
        let steps = step_candidates(Position::new(0, 0), Position::new(2, 5));
        assert_eq!(steps, vec![Direction::South, Direction::East]);

        let steps = step_candidates(Position::new(0, 0), Position::new(-4, 1));
        assert_eq!(steps, vec![Direction::West, Direction::South]);
    }

    #[test]
    fn step_prefers_x_on_ties_and_stops_at_target() {
        let steps = step_candidates(Position::new(0, 0), Position::new(3, -3));
        assert_eq!(steps, vec![Direction::East, Direction::North]);

        let steps = step_candidates(Position::new(0, 0), Position::new(0, 3));
        assert_eq!(steps, vec![Direction::South]);

        assert!(step_candidates(Position::new(1, 1), Position::new(1, 1)).is_empty());
    }

    #[test]
    fn chunk_math_handles_negative_coordinates() {
        assert_eq!(ChunkCoord::containing(Position::new(-1, 0), 16), Some(ChunkCoord::new(-1, 0)));
        assert_eq!(ChunkCoord::containing(Position::new(15, 16), 16), Some(ChunkCoord::new(0, 1)));
        assert_eq!(ChunkCoord::containing(Position::new(0, 0), 0), None);

        let tiles = ChunkCoord::new(-1, 0).tiles(4);
        assert_eq!(tiles.len(), 16);
        assert_eq!(tiles.first(), Some(&Position::new(-4, 0)));
        assert_eq!(tiles.last(), Some(&Position::new(-1, 3)));
    }
}
