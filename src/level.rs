use serde::Serialize;
use thiserror::Error;

use crate::coords::{GridSize, TileCoord};
use crate::tile::TileKind;

pub const MAX_WIDTH: i32 = 19;
pub const MAX_HEIGHT: i32 = 11;
/// Longest name the editor hands out.
pub const MAX_NAME_LEN: usize = 16;
pub const DEFAULT_NAME: &str = "Untitled";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("level size {width}x{height} is outside 1x1..=19x11")]
    InvalidSize { width: i32, height: i32 },
    #[error("could not allocate storage for {0} tiles")]
    AllocationFailure(usize),
    #[error("expected {expected} tiles, got {found}")]
    TileCountMismatch { expected: usize, found: usize },
    #[error("tile {index} is not a board tile")]
    InvalidTile { index: usize },
}

/// One puzzle board. `tiles.len() == width * height` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Level {
    width: i32,
    height: i32,
    tiles: Vec<TileKind>,
    name: String,
}

impl Level {
    pub fn new(width: i32, height: i32, fill: TileKind) -> Result<Self, LevelError> {
        let size = checked_size(width, height)?;
        if fill == TileKind::Invalid {
            return Err(LevelError::InvalidTile { index: 0 });
        }
        let mut tiles = Vec::new();
        tiles
            .try_reserve_exact(size.area())
            .map_err(|_| LevelError::AllocationFailure(size.area()))?;
        tiles.resize(size.area(), fill);
        Ok(Self {
            width,
            height,
            tiles,
            name: String::new(),
        })
    }

    pub fn from_tiles(
        width: i32,
        height: i32,
        tiles: Vec<TileKind>,
        name: impl Into<String>,
    ) -> Result<Self, LevelError> {
        let size = checked_size(width, height)?;
        if tiles.len() != size.area() {
            return Err(LevelError::TileCountMismatch {
                expected: size.area(),
                found: tiles.len(),
            });
        }
        if let Some(index) = tiles.iter().position(|t| *t == TileKind::Invalid) {
            return Err(LevelError::InvalidTile { index });
        }
        let mut level = Self {
            width,
            height,
            tiles,
            name: String::new(),
        };
        level.set_name(name);
        Ok(level)
    }

    pub fn width(&self) -> i32 {
        self.width
    }
    pub fn height(&self) -> i32 {
        self.height
    }
    pub fn size(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }
    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names are stored on a single line of the level file.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name: String = name.into();
        self.name = name.replace(['\r', '\n'], " ");
    }

    /// Tile at `c`; `Invalid` outside the grid.
    pub fn get_tile(&self, c: TileCoord) -> TileKind {
        self.size()
            .index(c)
            .map(|i| self.tiles[i])
            .unwrap_or(TileKind::Invalid)
    }

    /// Returns false (and changes nothing) out of bounds or for `Invalid`.
    pub fn set_tile(&mut self, c: TileCoord, k: TileKind) -> bool {
        if k == TileKind::Invalid {
            return false;
        }
        match self.size().index(c) {
            Some(i) => {
                self.tiles[i] = k;
                true
            }
            None => false,
        }
    }

    pub fn count(&self, pred: impl Fn(TileKind) -> bool) -> usize {
        self.tiles.iter().filter(|t| pred(**t)).count()
    }

    pub fn contains_tile(&self, k: TileKind) -> bool {
        self.tiles.contains(&k)
    }

    /// First player tile in row-major order.
    pub fn find_player(&self) -> Option<TileCoord> {
        self.size()
            .iter_tiles()
            .find(|c| self.get_tile(*c).is_player())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TileKind]> {
        self.tiles.chunks(self.width as usize)
    }

    /// Copies the level, reporting allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Level, LevelError> {
        let mut tiles = Vec::new();
        tiles
            .try_reserve_exact(self.tiles.len())
            .map_err(|_| LevelError::AllocationFailure(self.tiles.len()))?;
        tiles.extend_from_slice(&self.tiles);
        Ok(Self {
            width: self.width,
            height: self.height,
            tiles,
            name: self.name.clone(),
        })
    }

    /// Overwrites every tile from a grid of identical size.
    pub(crate) fn copy_tiles_from(&mut self, other: &Level) {
        debug_assert_eq!(self.size(), other.size());
        self.tiles.copy_from_slice(&other.tiles);
    }
}

fn checked_size(width: i32, height: i32) -> Result<GridSize, LevelError> {
    if !(1..=MAX_WIDTH).contains(&width) || !(1..=MAX_HEIGHT).contains(&height) {
        return Err(LevelError::InvalidSize { width, height });
    }
    Ok(GridSize::new(width, height))
}
