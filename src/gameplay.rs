use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{self, SaveError};
use crate::collection::{LevelCollection, LevelId};
use crate::command::{Outcome, PlayCommand};
use crate::coords::{Direction, TileCoord};
use crate::engine::{confirm_exit, save_prompted};
use crate::level::{Level, LevelError};
use crate::prompt::{Confirmation, Notice, Prompter};
use crate::status::Status;
use crate::tile::TileKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the file contains no levels")]
    EmptyLevelSet,
    #[error("level {} ({name:?}) has {found} players, expected exactly one", .index + 1)]
    PlayerCount {
        index: usize,
        name: String,
        found: usize,
    },
    #[error("level {} ({name:?}) has {crates} crates for {targets} targets", .index + 1)]
    NotEnoughCrates {
        index: usize,
        name: String,
        crates: usize,
        targets: usize,
    },
    #[error("level {0:?} is not part of the collection")]
    MissingLevel(LevelId),
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Checks one level: exactly one player and at least as many crates as targets.
pub fn validate_level(index: usize, level: &Level) -> Result<(), ValidationError> {
    let players = level.count(TileKind::is_player);
    if players != 1 {
        return Err(ValidationError::PlayerCount {
            index,
            name: level.name().to_string(),
            found: players,
        });
    }
    let crates = level.count(TileKind::is_crate);
    let targets = level.count(TileKind::has_target);
    if crates < targets {
        return Err(ValidationError::NotEnoughCrates {
            index,
            name: level.name().to_string(),
            crates,
            targets,
        });
    }
    Ok(())
}

/// Runs before play starts; any bad level rejects the whole set.
pub fn validate_level_set(levels: &LevelCollection) -> Result<(), ValidationError> {
    if levels.is_empty() {
        return Err(ValidationError::EmptyLevelSet);
    }
    for (index, level) in levels.iter().enumerate() {
        validate_level(index, level)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveResult {
    Blocked,
    Walked,
    /// `completed` is set on every push that leaves no open target.
    Pushed { completed: bool },
}

/// Working copy of one level during play.
///
/// `grid` is owned and holds no player tile; the player lives in `player`.
/// The backup level stays untouched in the collection until `write_back`.
#[derive(Debug, Clone)]
pub struct GameSession {
    backup: LevelId,
    grid: Level,
    player: TileCoord,
    finished: bool,
    edited: bool,
}

impl GameSession {
    pub fn fill(levels: &LevelCollection, backup: LevelId) -> Result<Self, ValidationError> {
        let level = levels
            .get(backup)
            .ok_or(ValidationError::MissingLevel(backup))?;
        let mut grid = level.try_clone()?;
        let player = grid.find_player().ok_or_else(|| ValidationError::PlayerCount {
            index: levels.position(backup).unwrap_or_default(),
            name: level.name().to_string(),
            found: 0,
        })?;
        let under = if grid.get_tile(player) == TileKind::PlayerOnTarget {
            TileKind::Target
        } else {
            TileKind::Floor
        };
        grid.set_tile(player, under);
        let finished = !grid.contains_tile(TileKind::Target);
        Ok(Self {
            backup,
            grid,
            player,
            finished,
            edited: false,
        })
    }

    pub fn backup(&self) -> LevelId {
        self.backup
    }
    pub fn grid(&self) -> &Level {
        &self.grid
    }
    pub fn player(&self) -> TileCoord {
        self.player
    }
    pub fn is_finished(&self) -> bool {
        self.finished
    }
    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn move_player(&mut self, dir: Direction) -> MoveResult {
        let ahead = self.player.step(dir, 1);
        let ahead_tile = self.grid.get_tile(ahead);

        if ahead_tile.is_crate() {
            let beyond = self.player.step(dir, 2);
            let beyond_tile = self.grid.get_tile(beyond);
            if !beyond_tile.is_open() {
                return MoveResult::Blocked;
            }
            let vacated = if ahead_tile == TileKind::CrateOnTarget {
                TileKind::Target
            } else {
                TileKind::Floor
            };
            let landed = if beyond_tile == TileKind::Target {
                TileKind::CrateOnTarget
            } else {
                TileKind::Crate
            };
            self.grid.set_tile(ahead, vacated);
            self.grid.set_tile(beyond, landed);
            self.player = ahead;
            self.edited = true;

            let completed = !self.grid.contains_tile(TileKind::Target);
            self.finished = completed;
            return MoveResult::Pushed { completed };
        }

        if ahead_tile.is_open() {
            self.player = ahead;
            self.edited = true;
            return MoveResult::Walked;
        }
        MoveResult::Blocked
    }

    /// Copies the grid into the backup level, re-encoding the player tile.
    pub fn write_back(&mut self, levels: &mut LevelCollection) -> bool {
        let Some(backup) = levels.get_mut(self.backup) else {
            return false;
        };
        backup.copy_tiles_from(&self.grid);
        let on = if backup.get_tile(self.player) == TileKind::Target {
            TileKind::PlayerOnTarget
        } else {
            TileKind::Player
        };
        backup.set_tile(self.player, on);
        self.edited = false;
        true
    }
}

/// Immutable snapshot handed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayView {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<TileKind>,
    pub player: TileCoord,
    pub finished: bool,
    pub edited: bool,
    pub position: usize,
    pub count: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone)]
pub struct GameplayEngine {
    levels: LevelCollection,
    session: GameSession,
    path: PathBuf,
    unsaved: bool,
}

impl GameplayEngine {
    /// Validates the set and starts on the collection's current level.
    pub fn new(levels: LevelCollection, path: impl Into<PathBuf>) -> Result<Self, ValidationError> {
        validate_level_set(&levels)?;
        let start = levels
            .current_id()
            .or_else(|| levels.first_id())
            .ok_or(ValidationError::EmptyLevelSet)?;
        let session = GameSession::fill(&levels, start)?;
        Ok(Self {
            levels,
            session,
            path: path.into(),
            unsaved: false,
        })
    }

    pub fn levels(&self) -> &LevelCollection {
        &self.levels
    }
    pub fn into_levels(self) -> LevelCollection {
        self.levels
    }
    pub fn session(&self) -> &GameSession {
        &self.session
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn is_unsaved(&self) -> bool {
        self.unsaved
    }

    pub fn handle<P: Prompter + ?Sized>(&mut self, cmd: PlayCommand, prompter: &mut P) -> Outcome {
        debug!("play command {cmd:?}");
        match cmd {
            PlayCommand::Move(dir) => self.move_player(dir, prompter),
            PlayCommand::Revert => {
                self.revert();
                Outcome::REDRAW
            }
            PlayCommand::Save => self.save(prompter),
            PlayCommand::NextLevel => self.switch_level(true, prompter),
            PlayCommand::PrevLevel => self.switch_level(false, prompter),
            PlayCommand::Exit => self.exit_to_menu(prompter),
            PlayCommand::Quit => Outcome::quit(),
        }
    }

    pub fn move_player<P: Prompter + ?Sized>(&mut self, dir: Direction, prompter: &mut P) -> Outcome {
        match self.session.move_player(dir) {
            MoveResult::Blocked => Outcome::IDLE,
            MoveResult::Walked | MoveResult::Pushed { completed: false } => {
                self.unsaved = true;
                Outcome::REDRAW
            }
            MoveResult::Pushed { completed: true } => {
                self.unsaved = true;
                self.commit();
                info!("level {:?} completed", self.session.grid().name());
                match prompter.notify("Level complete!") {
                    Notice::QuitRequested => Outcome::quit(),
                    Notice::Acknowledged => Outcome::REDRAW,
                }
            }
        }
    }

    /// Discards the working copy and rebuilds it from the backup level.
    pub fn revert(&mut self) {
        match GameSession::fill(&self.levels, self.session.backup()) {
            Ok(session) => self.session = session,
            Err(e) => warn!("cannot revert: {e}"),
        }
    }

    /// Writes the working copy into the collection.
    pub fn commit(&mut self) {
        if !self.session.write_back(&mut self.levels) {
            warn!("backup level {:?} vanished before commit", self.session.backup());
        }
    }

    /// Commits, then serializes the whole collection to the current path.
    pub fn save_to_path(&mut self) -> Result<(), SaveError> {
        self.commit();
        codec::save(&self.path, &self.levels)?;
        self.unsaved = false;
        Ok(())
    }

    pub fn save<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Outcome {
        self.commit();
        let (outcome, written) = save_prompted(prompter, &mut self.path, &self.levels);
        if written {
            self.unsaved = false;
        }
        outcome
    }

    /// Asks whether to keep unfinished edits, then moves to the adjacent level.
    /// At either end of the collection only the answer is applied.
    pub fn switch_level<P: Prompter + ?Sized>(&mut self, forward: bool, prompter: &mut P) -> Outcome {
        let mut kept = false;
        if self.session.is_edited() && !self.session.is_finished() {
            match prompter.confirm("Do you want to keep your changes?") {
                Confirmation::QuitRequested => return Outcome::quit(),
                Confirmation::Confirmed => {
                    self.commit();
                    self.unsaved = true;
                    kept = true;
                }
                Confirmation::Declined => {}
            }
        }

        let backup = self.session.backup();
        let target = if forward {
            self.levels.next_of(backup)
        } else {
            self.levels.prev_of(backup)
        };
        let Some(target) = target else {
            return if kept { Outcome::REDRAW } else { Outcome::IDLE };
        };

        match GameSession::fill(&self.levels, target) {
            Ok(session) => {
                self.levels.select(target);
                self.session = session;
                Outcome::REDRAW
            }
            Err(e) => {
                warn!("cannot switch level: {e}");
                match prompter.notify(Status::from(&e).message()) {
                    Notice::QuitRequested => Outcome::quit(),
                    Notice::Acknowledged => Outcome::REDRAW,
                }
            }
        }
    }

    pub fn exit_to_menu<P: Prompter + ?Sized>(&mut self, prompter: &mut P) -> Outcome {
        confirm_exit(self.unsaved, prompter)
    }

    pub fn view(&self) -> PlayView {
        let grid = self.session.grid();
        let backup = self.session.backup();
        PlayView {
            name: grid.name().to_string(),
            width: grid.width(),
            height: grid.height(),
            tiles: grid.tiles().to_vec(),
            player: self.session.player(),
            finished: self.session.is_finished(),
            edited: self.session.is_edited(),
            position: self.levels.position(backup).unwrap_or_default(),
            count: self.levels.len(),
            has_prev: self.levels.prev_of(backup).is_some(),
            has_next: self.levels.next_of(backup).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse;
    use crate::prompt::{Answer, ScriptedPrompter};
    use crate::status::ExitCode;

    fn levels(text: &str) -> LevelCollection {
        parse(text).unwrap().levels
    }

    fn engine(text: &str) -> GameplayEngine {
        GameplayEngine::new(levels(text), "unused.txt").unwrap()
    }

    const ONE_PUSH: &str = "; A\n#@$.#\n#####\n";
    const TWO: &str = "; A\n#@ $.#\n\n; B\n#.$@#\n";

    #[test]
    fn fill_extracts_player() {
        let c = levels("; A\n#+$ #\n");
        let s = GameSession::fill(&c, c.first_id().unwrap()).unwrap();
        assert_eq!(s.player(), TileCoord::new(1, 0));
        assert_eq!(s.grid().get_tile(TileCoord::new(1, 0)), TileKind::Target);
        assert!(!s.is_finished());
        assert!(!s.is_edited());
    }

    #[test]
    fn push_onto_last_target_finishes_and_commits() {
        let mut e = engine(ONE_PUSH);
        let mut p = ScriptedPrompter::new();
        let out = e.handle(PlayCommand::Move(Direction::Right), &mut p);
        assert_eq!(out, Outcome::REDRAW);
        assert!(e.session().is_finished());
        assert!(p.saw("Level complete"));
        let stored = e.levels().current().unwrap();
        use TileKind::*;
        assert_eq!(&stored.tiles()[..5], &[Wall, Floor, Player, CrateOnTarget, Wall]);
    }

    #[test]
    fn finished_is_set_on_the_covering_push_not_before() {
        let mut e = engine("; A\n#@ $ .#\n");
        let mut p = ScriptedPrompter::new();
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        assert!(!e.session().is_finished());
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        assert!(!e.session().is_finished());
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        assert!(e.session().is_finished());
    }

    #[test]
    fn winning_again_after_undoing_a_win_commits_and_notifies() {
        let mut e = engine("; A\n#######\n#@$.  #\n#     #\n#######\n");
        let mut p = ScriptedPrompter::new();
        for dir in [
            Direction::Right,
            Direction::Right,
            Direction::Down,
            Direction::Right,
            Direction::Right,
            Direction::Up,
        ] {
            e.handle(PlayCommand::Move(dir), &mut p);
        }
        assert!(!e.session().is_finished());
        e.handle(PlayCommand::Move(Direction::Left), &mut p);

        let wins = p.seen.iter().filter(|m| m.contains("Level complete")).count();
        assert_eq!(wins, 2);
        assert!(e.session().is_finished());
        assert!(!e.session().is_edited());
        let stored = e.levels().current().unwrap();
        assert_eq!(stored.find_player(), Some(TileCoord::new(4, 1)));
        assert_eq!(stored.get_tile(TileCoord::new(3, 1)), TileKind::CrateOnTarget);
    }

    #[test]
    fn walls_crates_and_edges_block() {
        let c = levels("; A\n@$$.\n");
        let mut s = GameSession::fill(&c, c.first_id().unwrap()).unwrap();
        assert_eq!(s.move_player(Direction::Left), MoveResult::Blocked);
        assert_eq!(s.move_player(Direction::Up), MoveResult::Blocked);
        assert_eq!(s.move_player(Direction::Right), MoveResult::Blocked);
        assert!(!s.is_edited());

        let c = levels("; A\n@$#\n");
        let mut s = GameSession::fill(&c, c.first_id().unwrap()).unwrap();
        assert_eq!(s.move_player(Direction::Right), MoveResult::Blocked);
        assert_eq!(s.player(), TileCoord::new(0, 0));
    }

    #[test]
    fn crate_leaving_a_target_restores_it() {
        let c = levels("; A\n@* .\n");
        let mut s = GameSession::fill(&c, c.first_id().unwrap()).unwrap();
        assert_eq!(s.move_player(Direction::Right), MoveResult::Pushed { completed: false });
        assert_eq!(s.grid().get_tile(TileCoord::new(1, 0)), TileKind::Target);
        assert_eq!(s.grid().get_tile(TileCoord::new(2, 0)), TileKind::Crate);
    }

    #[test]
    fn revert_discards_and_is_idempotent() {
        let mut e = engine(TWO);
        let mut p = ScriptedPrompter::new();
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        assert!(e.session().is_edited());
        e.revert();
        let once = e.view();
        e.revert();
        assert_eq!(e.view(), once);
        assert_eq!(once.player, TileCoord::new(1, 0));
        assert!(!once.edited);
    }

    #[test]
    fn switch_with_edits_asks_and_keeps_when_confirmed() {
        let mut e = engine(TWO);
        let mut p = ScriptedPrompter::with_answers([Answer::Confirm(Confirmation::Confirmed)]);
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        let out = e.handle(PlayCommand::NextLevel, &mut p);
        assert_eq!(out, Outcome::REDRAW);
        assert!(p.saw("keep your changes"));
        assert_eq!(e.view().name, "B");
        let first = e.levels().iter().next().unwrap();
        assert_eq!(first.get_tile(TileCoord::new(2, 0)), TileKind::Player);
    }

    #[test]
    fn switch_declined_discards_edits() {
        let mut e = engine(TWO);
        let mut p = ScriptedPrompter::with_answers([Answer::Confirm(Confirmation::Declined)]);
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        e.handle(PlayCommand::NextLevel, &mut p);
        let first = e.levels().iter().next().unwrap();
        assert_eq!(first.get_tile(TileCoord::new(1, 0)), TileKind::Player);
    }

    #[test]
    fn switch_quit_aborts() {
        let mut e = engine(TWO);
        let mut p = ScriptedPrompter::with_answers([Answer::Confirm(Confirmation::QuitRequested)]);
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        let out = e.handle(PlayCommand::NextLevel, &mut p);
        assert_eq!(out.exit, Some(ExitCode::Quit));
        assert_eq!(e.view().name, "A");
    }

    #[test]
    fn switch_at_boundary_is_a_no_op() {
        let mut e = engine(TWO);
        let mut p = ScriptedPrompter::new();
        assert_eq!(e.handle(PlayCommand::PrevLevel, &mut p), Outcome::IDLE);
        assert!(p.seen.is_empty());
    }

    #[test]
    fn switch_at_boundary_still_asks_about_edits() {
        let mut e = engine(TWO);
        let mut p = ScriptedPrompter::with_answers([Answer::Confirm(Confirmation::Confirmed)]);
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        assert_eq!(e.handle(PlayCommand::PrevLevel, &mut p), Outcome::REDRAW);
        assert!(p.saw("keep your changes"));
        assert_eq!(e.view().name, "A");
        assert!(!e.session().is_edited());
        let first = e.levels().iter().next().unwrap();
        assert_eq!(first.get_tile(TileCoord::new(2, 0)), TileKind::Player);

        let mut e = engine(TWO);
        let mut p = ScriptedPrompter::with_answers([Answer::Confirm(Confirmation::QuitRequested)]);
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        assert_eq!(e.handle(PlayCommand::PrevLevel, &mut p).exit, Some(ExitCode::Quit));
    }

    #[test]
    fn exit_asks_only_when_unsaved() {
        let mut e = engine(TWO);
        let mut p = ScriptedPrompter::new();
        assert_eq!(e.handle(PlayCommand::Exit, &mut p).exit, Some(ExitCode::ReturnToMenu));
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        assert_eq!(e.handle(PlayCommand::Exit, &mut p), Outcome::REDRAW);
        p.push(Answer::Confirm(Confirmation::Confirmed));
        assert_eq!(e.handle(PlayCommand::Exit, &mut p).exit, Some(ExitCode::ReturnToMenu));
    }

    #[test]
    fn validation_rejects_bad_sets() {
        assert_eq!(
            validate_level_set(&LevelCollection::new()),
            Err(ValidationError::EmptyLevelSet)
        );
        let err = validate_level_set(&levels("; A\n#@@$.#\n")).unwrap_err();
        assert!(matches!(err, ValidationError::PlayerCount { found: 2, .. }));
        let err = validate_level_set(&levels("; A\n#@$#\n\n; B\n#@$..#\n")).unwrap_err();
        assert!(matches!(err, ValidationError::NotEnoughCrates { index: 1, crates: 1, targets: 2, .. }));
        assert!(GameplayEngine::new(levels("; A\n# $.#\n"), "x").is_err());
    }

    #[test]
    fn targets_under_player_and_crates_count() {
        // two targets (one under the player, one covered), two crates
        assert!(validate_level_set(&levels("; A\n#+$*#\n")).is_ok());
        assert!(validate_level_set(&levels("; A\n#+*#\n")).is_err());
    }

    #[test]
    fn save_to_path_commits_the_working_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.txt");
        let mut e = GameplayEngine::new(levels(TWO), &path).unwrap();
        let mut p = ScriptedPrompter::new();
        e.handle(PlayCommand::Move(Direction::Right), &mut p);
        e.save_to_path().unwrap();
        assert!(!e.is_unsaved());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "; A\n# @$.#\n\n; B\n#.$@#\n\n"
        );
    }

    #[test]
    fn level_without_targets_starts_finished() {
        let e = engine("; A\n#@ #\n");
        assert!(e.session().is_finished());
    }
}
