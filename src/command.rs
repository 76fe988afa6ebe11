use serde::{Deserialize, Serialize};

use crate::coords::{Direction, TileCoord};
use crate::status::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayCommand {
    Move(Direction),
    Revert,
    Save,
    NextLevel,
    PrevLevel,
    /// Back to the menu, asking first if there are unsaved changes.
    Exit,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditCommand {
    MoveCursor(Direction),
    /// Cursor jump from a pointer click; clamped to the grid.
    SetCursor(TileCoord),
    Paint,
    PaintAt(TileCoord),
    SelectTile(usize),
    AddLevel { before: bool },
    DeleteLevel,
    RenameLevel,
    Save,
    NextLevel,
    PrevLevel,
    Exit,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Play(PlayCommand),
    Edit(EditCommand),
}

/// Result of processing one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Outcome {
    pub rerender: bool,
    pub exit: Option<ExitCode>,
}

impl Outcome {
    pub const IDLE: Outcome = Outcome { rerender: false, exit: None };
    pub const REDRAW: Outcome = Outcome { rerender: true, exit: None };

    pub fn redraw_if(changed: bool) -> Self {
        Outcome { rerender: changed, exit: None }
    }

    pub fn exit(code: ExitCode) -> Self {
        Outcome { rerender: false, exit: Some(code) }
    }

    pub fn quit() -> Self {
        Self::exit(ExitCode::Quit)
    }

    pub fn is_exit(&self) -> bool {
        self.exit.is_some()
    }
}
