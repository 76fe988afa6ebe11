use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::codec::{self, SaveError};
use crate::collection::{LevelCollection, LevelId};
use crate::command::{EditCommand, Outcome};
use crate::coords::{Direction, TileCoord};
use crate::engine::{confirm_exit, save_prompted};
use crate::level::{DEFAULT_NAME, Level, LevelError, MAX_HEIGHT, MAX_NAME_LEN, MAX_WIDTH};
use crate::prompt::{Confirmation, Notice, Prompter, TextInput};
use crate::tile::{PALETTE, TileKind};

/// Palette choice plus the paint cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditorSelection {
    pub tile_index: usize,
    pub cursor: TileCoord,
}

impl EditorSelection {
    pub fn tile(&self) -> TileKind {
        TileKind::from_palette_index(self.tile_index).unwrap_or(TileKind::Wall)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditView {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<TileKind>,
    pub cursor: TileCoord,
    pub selected: usize,
    pub position: usize,
    pub count: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl EditView {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Parses `WxH` (either case of `x`, surrounding spaces allowed) within the level limits.
pub fn parse_size(text: &str) -> Option<(i32, i32)> {
    let (w, h) = text.trim().split_once(['x', 'X'])?;
    let width: i32 = w.trim().parse().ok()?;
    let height: i32 = h.trim().parse().ok()?;
    let fits = (1..=MAX_WIDTH).contains(&width) && (1..=MAX_HEIGHT).contains(&height);
    fits.then_some((width, height))
}

#[derive(Debug, Clone)]
pub struct EditorEngine {
    levels: LevelCollection,
    selection: EditorSelection,
    path: PathBuf,
    unsaved: bool,
}

impl EditorEngine {
    pub fn new(levels: LevelCollection, path: impl Into<PathBuf>) -> Self {
        Self {
            levels,
            selection: EditorSelection::default(),
            path: path.into(),
            unsaved: false,
        }
    }

    pub fn levels(&self) -> &LevelCollection {
        &self.levels
    }
    pub fn into_levels(self) -> LevelCollection {
        self.levels
    }
    pub fn selection(&self) -> EditorSelection {
        self.selection
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn is_unsaved(&self) -> bool {
        self.unsaved
    }

    fn blank_level(width: i32, height: i32) -> Result<Level, LevelError> {
        let mut level = Level::new(width, height, TileKind::Floor)?;
        level.set_name(DEFAULT_NAME);
        Ok(level)
    }

    fn focus(&mut self, id: LevelId) {
        self.levels.select(id);
        self.selection.cursor = TileCoord::ORIGIN;
        self.unsaved = true;
    }

    /// Appends a floor-filled level and makes it current.
    pub fn create_level(&mut self, width: i32, height: i32) -> Result<LevelId, LevelError> {
        let id = self.levels.push_back(Self::blank_level(width, height)?);
        self.focus(id);
        Ok(id)
    }

    /// Inserts a floor-filled level next to the current one and makes it current.
    pub fn insert_level(&mut self, before: bool, width: i32, height: i32) -> Result<LevelId, LevelError> {
        let level = Self::blank_level(width, height)?;
        let id = if before {
            self.levels.insert_before(level)
        } else {
            self.levels.insert_after(level)
        };
        self.focus(id);
        info!("added {width}x{height} level at {:?}", self.levels.position(id));
        Ok(id)
    }

    /// Asks for a size until it is valid, then inserts the level.
    pub fn add_level<P: Prompter + ?Sized>(&mut self, before: bool, prompter: &mut P) -> Outcome {
        loop {
            let text = match prompter.prompt_text("Level size (WxH)", "", 7) {
                TextInput::Accepted(text) => text,
                TextInput::Cancelled => return Outcome::REDRAW,
                TextInput::QuitRequested => return Outcome::quit(),
            };
            let Some((width, height)) = parse_size(&text) else {
                if prompter.notify("Invalid size!") == Notice::QuitRequested {
                    return Outcome::quit();
                }
                continue;
            };
            return match self.insert_level(before, width, height) {
                Ok(_) => Outcome::REDRAW,
                Err(e) => {
                    warn!("{e}");
                    match prompter.notify("Memory allocation failed") {
                        Notice::QuitRequested => Outcome::quit(),
                        Notice::Acknowledged => Outcome::REDRAW,
                    }
                }
            };
        }
    }

    /// Removes the current level without asking.
    pub fn remove_current(&mut self) -> Option<Level> {
        let removed = self.levels.remove_current()?;
        self.selection.cursor = TileCoord::ORIGIN;
        self.unsaved = true;
        Some(removed)
    }

    pub fn delete_current<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Outcome {
        if self.levels.is_empty() {
            return Outcome::IDLE;
        }
        match prompter.confirm("Delete this level?") {
            Confirmation::Confirmed => {
                if let Some(level) = self.remove_current() {
                    info!("deleted level {:?}", level.name());
                }
                Outcome::REDRAW
            }
            Confirmation::Declined => Outcome::REDRAW,
            Confirmation::QuitRequested => Outcome::quit(),
        }
    }

    pub fn rename_level(&mut self, name: &str) -> bool {
        let Some(level) = self.levels.current_mut() else {
            return false;
        };
        level.set_name(name.chars().take(MAX_NAME_LEN).collect::<String>());
        self.unsaved = true;
        true
    }

    pub fn rename<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Outcome {
        let Some(current) = self.levels.current() else {
            return Outcome::IDLE;
        };
        let initial = current.name().to_string();
        match prompter.prompt_text("Level name", &initial, MAX_NAME_LEN) {
            TextInput::Accepted(name) => {
                self.rename_level(&name);
                Outcome::REDRAW
            }
            TextInput::Cancelled => Outcome::REDRAW,
            TextInput::QuitRequested => Outcome::quit(),
        }
    }

    /// Out-of-bounds coordinates are ignored.
    pub fn paint_at(&mut self, c: TileCoord) -> bool {
        let tile = self.selection.tile();
        let Some(level) = self.levels.current_mut() else {
            return false;
        };
        if !level.set_tile(c, tile) {
            return false;
        }
        self.unsaved = true;
        true
    }

    pub fn paint(&mut self) -> bool {
        self.paint_at(self.selection.cursor)
    }

    pub fn set_cursor(&mut self, c: TileCoord) -> bool {
        let Some(level) = self.levels.current() else {
            return false;
        };
        let clamped = level.size().clamp(c);
        let changed = clamped != self.selection.cursor;
        self.selection.cursor = clamped;
        changed
    }

    /// Returns whether the cursor moved; it stops at the grid edge.
    pub fn move_cursor(&mut self, dir: Direction) -> bool {
        self.set_cursor(self.selection.cursor.step(dir, 1))
    }

    pub fn select_tile(&mut self, index: usize) -> bool {
        if index >= PALETTE.len() || index == self.selection.tile_index {
            return false;
        }
        self.selection.tile_index = index;
        true
    }

    pub fn next_level(&mut self) -> bool {
        let moved = self.levels.next();
        if moved {
            self.selection.cursor = TileCoord::ORIGIN;
        }
        moved
    }

    pub fn prev_level(&mut self) -> bool {
        let moved = self.levels.prev();
        if moved {
            self.selection.cursor = TileCoord::ORIGIN;
        }
        moved
    }

    pub fn save_to_path(&mut self) -> Result<(), SaveError> {
        codec::save(&self.path, &self.levels)?;
        self.unsaved = false;
        Ok(())
    }

    pub fn save<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Outcome {
        let (outcome, written) = save_prompted(prompter, &mut self.path, &self.levels);
        if written {
            self.unsaved = false;
        }
        outcome
    }

    pub fn exit_to_menu<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Outcome {
        confirm_exit(self.unsaved, prompter)
    }

    pub fn handle<P: Prompter + ?Sized>(&mut self, cmd: EditCommand, prompter: &mut P) -> Outcome {
        debug!("edit command {cmd:?}");
        match cmd {
            EditCommand::MoveCursor(dir) => Outcome::redraw_if(self.move_cursor(dir)),
            EditCommand::SetCursor(c) => Outcome::redraw_if(self.set_cursor(c)),
            EditCommand::Paint => Outcome::redraw_if(self.paint()),
            EditCommand::PaintAt(c) => Outcome::redraw_if(self.paint_at(c)),
            EditCommand::SelectTile(index) => Outcome::redraw_if(self.select_tile(index)),
            EditCommand::AddLevel { before } => self.add_level(before, prompter),
            EditCommand::DeleteLevel => self.delete_current(prompter),
            EditCommand::RenameLevel => self.rename(prompter),
            EditCommand::Save => self.save(prompter),
            EditCommand::NextLevel => Outcome::redraw_if(self.next_level()),
            EditCommand::PrevLevel => Outcome::redraw_if(self.prev_level()),
            EditCommand::Exit => self.exit_to_menu(prompter),
            EditCommand::Quit => Outcome::quit(),
        }
    }

    pub fn view(&self) -> EditView {
        let selected = self.selection.tile_index;
        let Some(id) = self.levels.current_id() else {
            return EditView {
                name: String::new(),
                width: 0,
                height: 0,
                tiles: Vec::new(),
                cursor: TileCoord::ORIGIN,
                selected,
                position: 0,
                count: 0,
                has_prev: false,
                has_next: false,
            };
        };
        let level = self.levels.get(id);
        EditView {
            name: level.map(|l| l.name().to_string()).unwrap_or_default(),
            width: level.map_or(0, Level::width),
            height: level.map_or(0, Level::height),
            tiles: level.map(|l| l.tiles().to_vec()).unwrap_or_default(),
            cursor: self.selection.cursor,
            selected,
            position: self.levels.position(id).unwrap_or_default(),
            count: self.levels.len(),
            has_prev: self.levels.has_prev(),
            has_next: self.levels.has_next(),
        }
    }
}
