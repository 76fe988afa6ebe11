use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::codec::{self, LoadError, LoadStatus};
use crate::collection::LevelCollection;
use crate::command::{Command, Outcome};
use crate::editor::{EditView, EditorEngine};
use crate::gameplay::{GameplayEngine, PlayView, ValidationError};
use crate::prompt::{Confirmation, MAX_PATH_LEN, Notice, Prompter, TextInput};
use crate::status::{ExitCode, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
	Play,
	Edit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionView {
	Play(PlayView),
	Edit(EditView),
}

/// The one writer of a level collection while a session is open.
#[derive(Debug)]
pub enum Session {
	Play(GameplayEngine),
	Edit(EditorEngine),
}

impl Session {
	pub fn mode(&self) -> Mode {
		match self {
			Session::Play(_) => Mode::Play,
			Session::Edit(_) => Mode::Edit,
		}
	}

	/// Commands for the other mode are ignored.
	pub fn handle<P: Prompter + ?Sized>(&mut self, cmd: Command, prompter: &mut P) -> Outcome {
		match (self, cmd) {
			(Session::Play(engine), Command::Play(c)) => engine.handle(c, prompter),
			(Session::Edit(engine), Command::Edit(c)) => engine.handle(c, prompter),
			(session, other) => {
				warn!("ignoring {other:?} in {:?} mode", session.mode());
				Outcome::IDLE
			}
		}
	}

	/// Feeds commands until one ends the session.
	pub fn run<P: Prompter + ?Sized>(
		&mut self,
		commands: impl IntoIterator<Item = Command>,
		prompter: &mut P,
	) -> Option<ExitCode> {
		for cmd in commands {
			let outcome = self.handle(cmd, prompter);
			if let Some(code) = outcome.exit {
				info!("session ended with {code:?}");
				return Some(code);
			}
		}
		None
	}

	pub fn view(&self) -> SessionView {
		match self {
			Session::Play(engine) => SessionView::Play(engine.view()),
			Session::Edit(engine) => SessionView::Edit(engine.view()),
		}
	}

	pub fn levels(&self) -> &LevelCollection {
		match self {
			Session::Play(engine) => engine.levels(),
			Session::Edit(engine) => engine.levels(),
		}
	}
}

#[derive(Debug)]
pub enum Opened {
	Ready(Session),
	Closed(ExitCode),
}

fn notify_and_close<P: Prompter + ?Sized>(prompter: &mut P, message: &str) -> Opened {
	match prompter.notify(message) {
		Notice::QuitRequested => Opened::Closed(ExitCode::Quit),
		Notice::Acknowledged => Opened::Closed(ExitCode::ReturnToMenu),
	}
}

/// Loads `path` and starts a session, reporting load problems through `prompter`.
pub fn open<P: Prompter + ?Sized>(mode: Mode, path: impl AsRef<Path>, prompter: &mut P) -> Opened {
	let path = path.as_ref();
	let levels = match codec::load(path) {
		Ok(outcome) => {
			if outcome.status == LoadStatus::OversizedDropped {
				match prompter.confirm(Status::OversizedDropped.message()) {
					Confirmation::Confirmed => {}
					Confirmation::Declined => return Opened::Closed(ExitCode::ReturnToMenu),
					Confirmation::QuitRequested => return Opened::Closed(ExitCode::Quit),
				}
			}
			outcome.levels
		}
		Err(LoadError::FileNotFound { .. }) if mode == Mode::Edit => {
			info!("{} does not exist yet, starting an empty collection", path.display());
			LevelCollection::new()
		}
		Err(e) => {
			warn!("{e}");
			return notify_and_close(prompter, Status::from(&e).message());
		}
	};

	match mode {
		Mode::Edit => Opened::Ready(Session::Edit(EditorEngine::new(levels, path))),
		Mode::Play => match GameplayEngine::new(levels, path) {
			Ok(engine) => Opened::Ready(Session::Play(engine)),
			Err(ValidationError::EmptyLevelSet) => notify_and_close(prompter, "The file contains no levels"),
			Err(e) => {
				warn!("refusing to play {}: {e}", path.display());
				notify_and_close(prompter, Status::from(&e).message())
			}
		},
	}
}

/// Asks for a file name and writes the collection there.
/// Returns the outcome and whether the file was written.
pub(crate) fn save_prompted<P: Prompter + ?Sized>(
	prompter: &mut P,
	path: &mut PathBuf,
	levels: &LevelCollection,
) -> (Outcome, bool) {
	let initial = path.to_string_lossy().into_owned();
	match prompter.prompt_text("File name", &initial, MAX_PATH_LEN) {
		TextInput::QuitRequested => return (Outcome::quit(), false),
		TextInput::Cancelled => return (Outcome::REDRAW, false),
		TextInput::Accepted(name) => {
			let name = name.trim();
			if !name.is_empty() {
				*path = PathBuf::from(name);
			}
		}
	}
	let (notice, written) = match codec::save(path.as_path(), levels) {
		Ok(()) => (prompter.notify("Saved."), true),
		Err(e) => {
			warn!("{e}");
			(prompter.notify(&format!("Save failed: {e}")), false)
		}
	};
	match notice {
		Notice::QuitRequested => (Outcome::quit(), written),
		Notice::Acknowledged => (Outcome::REDRAW, written),
	}
}

pub(crate) fn confirm_exit<P: Prompter + ?Sized>(unsaved: bool, prompter: &mut P) -> Outcome {
	if !unsaved {
		return Outcome::exit(ExitCode::ReturnToMenu);
	}
	match prompter.confirm("Exit without saving?") {
		Confirmation::Confirmed => Outcome::exit(ExitCode::ReturnToMenu),
		Confirmation::Declined => Outcome::REDRAW,
		Confirmation::QuitRequested => Outcome::quit(),
	}
}
