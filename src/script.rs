use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::{Command, EditCommand, PlayCommand};
use crate::coords::{Direction, TileCoord};
use crate::engine::Mode;
use crate::tile::PALETTE;

pub const SCRIPT_VERSION: u32 = 1;
const MAX_REPEAT: u32 = 10_000;

#[derive(Debug, Error)]
pub enum ScriptError {
	#[error("Invalid script root")]
	InvalidRoot,
	#[error("Unsupported script version: {0}")]
	UnsupportedVersion(u32),
	#[error("Step {step} is not available in {mode:?} mode")]
	WrongMode { step: &'static str, mode: Mode },
	#[error("Invalid argument: {0}")]
	InvalidArg(String),
	#[error("Schema error: {0}")]
	Schema(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
	pub version: u32,
	pub node: String,
	pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node")]
pub enum Step {
	Move {
		dir: Direction,
	},
	/// LURD notation, e.g. `"rrUl"`.
	Moves {
		path: String,
	},
	Repeat {
		count: u32,
		body: Vec<Step>,
	},
	Revert,
	Save,
	NextLevel,
	PrevLevel,
	Exit,
	Quit,
	Cursor {
		dir: Direction,
	},
	Select {
		index: usize,
	},
	Paint,
	PaintAt {
		x: i32,
		y: i32,
	},
	AddLevel {
		#[serde(default)]
		before: bool,
	},
	DeleteLevel,
	RenameLevel,
}

impl Step {
	pub fn name(&self) -> &'static str {
		match self {
			Step::Move { .. } => "Move",
			Step::Moves { .. } => "Moves",
			Step::Repeat { .. } => "Repeat",
			Step::Revert => "Revert",
			Step::Save => "Save",
			Step::NextLevel => "NextLevel",
			Step::PrevLevel => "PrevLevel",
			Step::Exit => "Exit",
			Step::Quit => "Quit",
			Step::Cursor { .. } => "Cursor",
			Step::Select { .. } => "Select",
			Step::Paint => "Paint",
			Step::PaintAt { .. } => "PaintAt",
			Step::AddLevel { .. } => "AddLevel",
			Step::DeleteLevel => "DeleteLevel",
			Step::RenameLevel => "RenameLevel",
		}
	}
}

pub fn parse_script(json: &str) -> Result<Script, ScriptError> {
	Ok(serde_json::from_str(json)?)
}

fn shared(step: &Step) -> Option<(PlayCommand, EditCommand)> {
	match step {
		Step::Save => Some((PlayCommand::Save, EditCommand::Save)),
		Step::NextLevel => Some((PlayCommand::NextLevel, EditCommand::NextLevel)),
		Step::PrevLevel => Some((PlayCommand::PrevLevel, EditCommand::PrevLevel)),
		Step::Exit => Some((PlayCommand::Exit, EditCommand::Exit)),
		Step::Quit => Some((PlayCommand::Quit, EditCommand::Quit)),
		_ => None,
	}
}

fn compile_steps(steps: &[Step], mode: Mode, out: &mut Vec<Command>) -> Result<(), ScriptError> {
	for step in steps {
		if let Some((play, edit)) = shared(step) {
			out.push(match mode {
				Mode::Play => Command::Play(play),
				Mode::Edit => Command::Edit(edit),
			});
			continue;
		}
		match (mode, step) {
			(_, Step::Repeat { count, body }) => {
				if *count > MAX_REPEAT {
					return Err(ScriptError::InvalidArg(format!("repeat count {count} exceeds {MAX_REPEAT}")));
				}
				for _ in 0..*count {
					compile_steps(body, mode, out)?;
				}
			}
			(Mode::Play, Step::Move { dir }) => out.push(Command::Play(PlayCommand::Move(*dir))),
			(Mode::Play, Step::Moves { path }) => {
				for c in path.chars().filter(|c| !c.is_whitespace()) {
					let dir = Direction::from_move_char(c)
						.ok_or_else(|| ScriptError::InvalidArg(format!("move letter {c:?}")))?;
					out.push(Command::Play(PlayCommand::Move(dir)));
				}
			}
			(Mode::Play, Step::Revert) => out.push(Command::Play(PlayCommand::Revert)),
			(Mode::Edit, Step::Cursor { dir }) => out.push(Command::Edit(EditCommand::MoveCursor(*dir))),
			(Mode::Edit, Step::Select { index }) => {
				if *index >= PALETTE.len() {
					return Err(ScriptError::InvalidArg(format!("palette index {index}")));
				}
				out.push(Command::Edit(EditCommand::SelectTile(*index)));
			}
			(Mode::Edit, Step::Paint) => out.push(Command::Edit(EditCommand::Paint)),
			(Mode::Edit, Step::PaintAt { x, y }) => {
				out.push(Command::Edit(EditCommand::PaintAt(TileCoord::new(*x, *y))))
			}
			(Mode::Edit, Step::AddLevel { before }) => {
				out.push(Command::Edit(EditCommand::AddLevel { before: *before }))
			}
			(Mode::Edit, Step::DeleteLevel) => out.push(Command::Edit(EditCommand::DeleteLevel)),
			(Mode::Edit, Step::RenameLevel) => out.push(Command::Edit(EditCommand::RenameLevel)),
			(mode, other) => return Err(ScriptError::WrongMode { step: other.name(), mode }),
		}
	}
	Ok(())
}

pub fn compile_script(s: &Script, mode: Mode) -> Result<Vec<Command>, ScriptError> {
	if s.node != "Script" {
		return Err(ScriptError::InvalidRoot);
	}
	if s.version != SCRIPT_VERSION {
		return Err(ScriptError::UnsupportedVersion(s.version));
	}
	let mut out = Vec::new();
	compile_steps(&s.steps, mode, &mut out)?;
	Ok(out)
}

pub fn compile_play_script(s: &Script) -> Result<Vec<PlayCommand>, ScriptError> {
	Ok(compile_script(s, Mode::Play)?
		.into_iter()
		.filter_map(|c| match c {
			Command::Play(p) => Some(p),
			Command::Edit(_) => None,
		})
		.collect())
}

pub fn compile_edit_script(s: &Script) -> Result<Vec<EditCommand>, ScriptError> {
	Ok(compile_script(s, Mode::Edit)?
		.into_iter()
		.filter_map(|c| match c {
			Command::Edit(e) => Some(e),
			Command::Play(_) => None,
		})
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn script(steps: serde_json::Value) -> Script {
		serde_json::from_value(json!({ "version": 1, "node": "Script", "steps": steps })).unwrap()
	}

	#[test]
	fn compiles_play_steps() {
		let s = script(json!([
			{ "node": "Move", "dir": "Right" },
			{ "node": "Moves", "path": "lU r" },
			{ "node": "Repeat", "count": 2, "body": [{ "node": "Revert" }] },
			{ "node": "NextLevel" }
		]));
		let cmds = compile_play_script(&s).unwrap();
		assert_eq!(
			cmds,
			vec![
				PlayCommand::Move(Direction::Right),
				PlayCommand::Move(Direction::Left),
				PlayCommand::Move(Direction::Up),
				PlayCommand::Move(Direction::Right),
				PlayCommand::Revert,
				PlayCommand::Revert,
				PlayCommand::NextLevel,
			]
		);
	}

	#[test]
	fn compiles_edit_steps() {
		let s = script(json!([
			{ "node": "AddLevel" },
			{ "node": "Select", "index": 6 },
			{ "node": "Cursor", "dir": "Down" },
			{ "node": "PaintAt", "x": 1, "y": 2 },
			{ "node": "Save" }
		]));
		let cmds = compile_edit_script(&s).unwrap();
		assert_eq!(cmds[0], EditCommand::AddLevel { before: false });
		assert_eq!(cmds[3], EditCommand::PaintAt(TileCoord::new(1, 2)));
		assert_eq!(cmds[4], EditCommand::Save);
	}

	#[test]
	fn rejects_foreign_steps_and_bad_arguments() {
		let s = script(json!([{ "node": "Paint" }]));
		assert!(matches!(compile_play_script(&s), Err(ScriptError::WrongMode { step: "Paint", .. })));
		let s = script(json!([{ "node": "Revert" }]));
		assert!(matches!(compile_edit_script(&s), Err(ScriptError::WrongMode { .. })));
		let s = script(json!([{ "node": "Moves", "path": "rx" }]));
		assert!(matches!(compile_play_script(&s), Err(ScriptError::InvalidArg(_))));
		let s = script(json!([{ "node": "Select", "index": 7 }]));
		assert!(matches!(compile_edit_script(&s), Err(ScriptError::InvalidArg(_))));
	}

	#[test]
	fn rejects_wrong_root_and_version() {
		let mut s = script(json!([]));
		s.node = "Program".into();
		assert!(matches!(compile_play_script(&s), Err(ScriptError::InvalidRoot)));
		let mut s = script(json!([]));
		s.version = 2;
		assert!(matches!(compile_play_script(&s), Err(ScriptError::UnsupportedVersion(2))));
		assert!(matches!(parse_script("{\"node\": \"Script\"}"), Err(ScriptError::Schema(_))));
	}
}
