pub mod codec;
pub mod collection;
pub mod command;
pub mod coords;
pub mod editor;
pub mod engine;
pub mod gameplay;
pub mod hud;
pub mod level;
pub mod prompt;
pub mod script;
pub mod status;
pub mod tile;

// Re-exports for convenience in tests and integration users.
pub use codec::{LoadError, LoadOutcome, LoadStatus, SaveError, load, parse, save, serialize};
pub use collection::{LevelCollection, LevelId};
pub use command::{Command, EditCommand, Outcome, PlayCommand};
pub use coords::{Direction, GridSize, TileCoord};
pub use editor::{EditView, EditorEngine, EditorSelection, parse_size};
pub use engine::{Mode, Opened, Session, SessionView, open};
pub use gameplay::{GameSession, GameplayEngine, MoveResult, PlayView, ValidationError, validate_level_set};
pub use hud::{EDIT_HINTS, PLAY_HINTS, board_rows, format_status_line, palette_lines};
pub use level::{DEFAULT_NAME, Level, LevelError, MAX_HEIGHT, MAX_NAME_LEN, MAX_WIDTH};
pub use prompt::{Answer, Confirmation, MAX_PATH_LEN, Notice, Prompter, ScriptedPrompter, TextInput};
pub use script::{Script, ScriptError, Step, compile_edit_script, compile_play_script, compile_script, parse_script};
pub use status::{ErrorClass, ExitCode, Status};
pub use tile::{PALETTE, TileKind};
