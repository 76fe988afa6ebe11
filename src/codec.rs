//! Plain-text level format.
//!
//! ```text
//! ; Level name
//! #####
//! #@$.#
//! #####
//!
//! ```
//!
//! A `;` line names the level that follows, tile rows use `# @ + $ * .` and
//! space, and a blank (at most two characters) line or the end of the input
//! closes a level.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collection::LevelCollection;
use crate::level::{Level, LevelError, MAX_HEIGHT, MAX_WIDTH};
use crate::tile::TileKind;

const STAGE_WIDTH: usize = MAX_WIDTH as usize;
const STAGE_HEIGHT: usize = MAX_HEIGHT as usize;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid character {found:?} on line {line}, column {column}")]
    InvalidCharacter {
        line: usize,
        column: usize,
        found: char,
    },
    #[error(transparent)]
    Allocation(#[from] LevelError),
}

#[derive(Debug, Error)]
#[error("could not write {}: {source}", .path.display())]
pub struct SaveError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Soft outcome of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    Ok,
    /// At least one level exceeded 19x11 and was skipped.
    OversizedDropped,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub levels: LevelCollection,
    pub status: LoadStatus,
}

/// Rows of the level under construction, kept at full screen stride.
struct Staging {
    rows: [[Option<TileKind>; STAGE_WIDTH]; STAGE_HEIGHT],
    name: String,
    row_count: usize,
    max_width: usize,
}

impl Staging {
    fn new() -> Self {
        Self {
            rows: [[None; STAGE_WIDTH]; STAGE_HEIGHT],
            name: String::new(),
            row_count: 0,
            max_width: 0,
        }
    }

    fn in_progress(&self) -> bool {
        self.row_count > 0
    }

    fn fits(&self) -> bool {
        self.max_width <= STAGE_WIDTH && self.row_count <= STAGE_HEIGHT
    }

    fn push_row(&mut self, row: &[TileKind]) {
        self.max_width = self.max_width.max(row.len());
        if self.row_count < STAGE_HEIGHT && row.len() <= STAGE_WIDTH {
            for (slot, tile) in self.rows[self.row_count].iter_mut().zip(row) {
                *slot = Some(*tile);
            }
        }
        self.row_count += 1;
    }

    /// Builds the staged level, or `None` when it is too large to keep.
    /// Staging is reset either way.
    fn take_level(&mut self) -> Result<Option<Level>, LevelError> {
        let staged = std::mem::replace(self, Staging::new());
        if !staged.fits() {
            return Ok(None);
        }
        let mut tiles = Vec::new();
        let area = staged.max_width * staged.row_count;
        tiles
            .try_reserve_exact(area)
            .map_err(|_| LevelError::AllocationFailure(area))?;
        for row in &staged.rows[..staged.row_count] {
            tiles.extend(
                row[..staged.max_width]
                    .iter()
                    .map(|t| t.unwrap_or(TileKind::Floor)),
            );
        }
        Level::from_tiles(
            staged.max_width as i32,
            staged.row_count as i32,
            tiles,
            staged.name,
        )
        .map(Some)
    }
}

fn is_tile_row(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|c| TileKind::from_char(c).is_some())
}

/// Parses level text into a collection whose cursor rests on the first level.
pub fn parse(text: &str) -> Result<LoadOutcome, LoadError> {
    let mut levels = LevelCollection::new();
    let mut staging = Staging::new();
    let mut status = LoadStatus::Ok;

    let mut commit = |staging: &mut Staging, levels: &mut LevelCollection| -> Result<(), LevelError> {
        match staging.take_level()? {
            Some(level) => {
                debug!("parsed level {:?} ({}x{})", level.name(), level.width(), level.height());
                levels.push_back(level);
            }
            None => {
                warn!("dropping a level larger than {MAX_WIDTH}x{MAX_HEIGHT}");
                status = LoadStatus::OversizedDropped;
            }
        }
        Ok(())
    };

    for (index, raw) in text.split('\n').enumerate() {
        let line = raw.trim_end_matches(['\r', '\n']);
        let length = line.chars().count();

        if let Some(rest) = line.strip_prefix(';') {
            if length >= 3 {
                staging.name = rest.strip_prefix(' ').unwrap_or(rest).to_string();
                continue;
            }
        }

        if is_tile_row(line) {
            let mut row = Vec::with_capacity(length);
            for (column, c) in line.chars().enumerate() {
                let tile = TileKind::from_char(c).ok_or(LoadError::InvalidCharacter {
                    line: index + 1,
                    column: column + 1,
                    found: c,
                })?;
                row.push(tile);
            }
            staging.push_row(&row);
        }

        if length <= 2 && staging.in_progress() {
            commit(&mut staging, &mut levels)?;
        }
    }

    if staging.in_progress() {
        commit(&mut staging, &mut levels)?;
    }

    Ok(LoadOutcome { levels, status })
}

pub fn load(path: impl AsRef<Path>) -> Result<LoadOutcome, LoadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LoadError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let outcome = parse(&String::from_utf8_lossy(&bytes))?;
    info!(
        "loaded {} level(s) from {} ({:?})",
        outcome.levels.len(),
        path.display(),
        outcome.status
    );
    Ok(outcome)
}

/// One `; name` line, the rows, then a blank line, for every level in order.
pub fn serialize(levels: &LevelCollection) -> String {
    let mut out = String::new();
    for level in levels.iter() {
        out.push_str("; ");
        out.push_str(level.name());
        out.push('\n');
        for row in level.rows() {
            out.extend(row.iter().map(|t| t.to_char().unwrap_or(' ')));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Truncates and replaces the file at `path`.
pub fn save(path: impl AsRef<Path>, levels: &LevelCollection) -> Result<(), SaveError> {
    let path = path.as_ref();
    fs::write(path, serialize(levels)).map_err(|source| SaveError {
        path: path.to_path_buf(),
        source,
    })?;
    info!("saved {} level(s) to {}", levels.len(), path.display());
    Ok(())
}
