use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const ORIGIN: TileCoord = TileCoord { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate `steps` cells away in `dir`.
    pub fn step(self, dir: Direction, steps: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx * steps,
            y: self.y + dy * steps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        }
    }

    /// Parses one Sokoban move letter (`l`, `u`, `r`, `d`, either case).
    pub fn from_move_char(c: char) -> Option<Direction> {
        match c.to_ascii_lowercase() {
            'l' => Some(Direction::Left),
            'u' => Some(Direction::Up),
            'r' => Some(Direction::Right),
            'd' => Some(Direction::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl GridSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    pub fn contains(&self, c: TileCoord) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < self.width && c.y < self.height
    }

    /// Row-major index of `c`, or `None` outside the grid.
    pub fn index(&self, c: TileCoord) -> Option<usize> {
        if !self.contains(c) {
            return None;
        }
        Some((c.y * self.width + c.x) as usize)
    }

    pub fn clamp(&self, c: TileCoord) -> TileCoord {
        TileCoord {
            x: c.x.clamp(0, (self.width - 1).max(0)),
            y: c.y.clamp(0, (self.height - 1).max(0)),
        }
    }

    pub fn iter_tiles(&self) -> impl Iterator<Item = TileCoord> + use<> {
        let width = self.width;
        let height = self.height;
        (0..height).flat_map(move |y| (0..width).map(move |x| TileCoord { x, y }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_and_index() {
        let g = GridSize::new(3, 2);
        assert!(g.contains(TileCoord::new(2, 1)));
        assert!(!g.contains(TileCoord::new(3, 0)));
        assert!(!g.contains(TileCoord::new(0, -1)));
        assert_eq!(g.index(TileCoord::new(1, 1)), Some(4));
        assert_eq!(g.index(TileCoord::new(0, 2)), None);
        assert_eq!(g.area(), 6);
    }

    #[test]
    fn clamp_keeps_inside() {
        let g = GridSize::new(4, 3);
        assert_eq!(g.clamp(TileCoord::new(-2, 9)), TileCoord::new(0, 2));
        assert_eq!(g.clamp(TileCoord::new(2, 1)), TileCoord::new(2, 1));
    }

    #[test]
    fn iter_is_row_major() {
        let g = GridSize::new(2, 2);
        let tiles: Vec<_> = g.iter_tiles().collect();
        assert_eq!(
            tiles,
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn steps_follow_direction() {
        let c = TileCoord::new(3, 3);
        assert_eq!(c.step(Direction::Left, 2), TileCoord::new(1, 3));
        assert_eq!(c.step(Direction::Down, 1), TileCoord::new(3, 4));
        assert_eq!(Direction::from_move_char('U'), Some(Direction::Up));
        assert_eq!(Direction::from_move_char('x'), None);
    }
}
