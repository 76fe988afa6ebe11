use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPrimaryContextPass};
use sokoforge::hud::{cursor, display_tiles};
use sokoforge::{
	Answer, Command as SessionCommand, Confirmation, Direction, EDIT_HINTS, EditCommand, ExitCode, GridSize,
	Mode, Notice, Opened, PALETTE, PLAY_HINTS, PlayCommand, Prompter, Session, SessionView, TextInput, TileCoord,
	TileKind, format_status_line, open,
};

// ---------- Constants ----------
const TILE_SIZE: f32 = 40.0;
const TILE_GAP: f32 = 2.0;
const DEFAULT_LEVEL_FILE: &str = "levels.txt";
const TOAST_SECONDS: f32 = 3.0;

// ---------- Components ----------
#[derive(Component)]
struct TilePos {
	x: i32,
	y: i32,
}

#[derive(Component)]
struct BoardLayer; // Marker to despawn/rebuild when the view changes

// ---------- Worker protocol ----------
#[derive(Debug)]
enum Request {
	Open(Mode, PathBuf),
	Command(SessionCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptRequest {
	Confirm(String),
	Text { label: String, initial: String, max_len: usize },
	Notify(String),
}

#[derive(Debug)]
enum WorkerEvent {
	View(SessionView),
	Prompt(PromptRequest),
	Closed(ExitCode),
}

/// Serves the prompt contract from the worker thread: each call posts a
/// request to the UI and blocks until the answer comes back.
struct ChannelPrompter {
	events: Sender<WorkerEvent>,
	answers: Receiver<Answer>,
}

impl ChannelPrompter {
	fn ask(&mut self, request: PromptRequest) -> Option<Answer> {
		self.events.send(WorkerEvent::Prompt(request)).ok()?;
		self.answers.recv().ok()
	}
}

// A closed channel means the window is gone.
impl Prompter for ChannelPrompter {
	fn confirm(&mut self, message: &str) -> Confirmation {
		match self.ask(PromptRequest::Confirm(message.to_string())) {
			Some(Answer::Confirm(c)) => c,
			Some(_) => Confirmation::Declined,
			None => Confirmation::QuitRequested,
		}
	}

	fn prompt_text(&mut self, label: &str, initial: &str, max_len: usize) -> TextInput {
		let request = PromptRequest::Text { label: label.to_string(), initial: initial.to_string(), max_len };
		match self.ask(request) {
			Some(Answer::Text(TextInput::Accepted(text))) => TextInput::Accepted(text.chars().take(max_len).collect()),
			Some(Answer::Text(other)) => other,
			Some(_) => TextInput::Cancelled,
			None => TextInput::QuitRequested,
		}
	}

	fn notify(&mut self, message: &str) -> Notice {
		match self.ask(PromptRequest::Notify(message.to_string())) {
			Some(Answer::Notice(n)) => n,
			Some(_) => Notice::Acknowledged,
			None => Notice::QuitRequested,
		}
	}
}

fn run_worker(requests: Receiver<Request>, events: Sender<WorkerEvent>, answers: Receiver<Answer>) {
	let mut prompter = ChannelPrompter { events: events.clone(), answers };
	let mut session: Option<Session> = None;
	for request in requests {
		let event = match request {
			Request::Open(mode, path) => match open(mode, &path, &mut prompter) {
				Opened::Ready(opened) => {
					let view = opened.view();
					session = Some(opened);
					WorkerEvent::View(view)
				}
				Opened::Closed(code) => WorkerEvent::Closed(code),
			},
			Request::Command(cmd) => {
				let Some(active) = session.as_mut() else {
					continue;
				};
				let outcome = active.handle(cmd, &mut prompter);
				if let Some(code) = outcome.exit {
					session = None;
					WorkerEvent::Closed(code)
				} else if outcome.rerender {
					WorkerEvent::View(active.view())
				} else {
					continue;
				}
			}
		};
		if events.send(event).is_err() {
			break;
		}
	}
}

// ---------- Resources ----------
#[derive(Resource)]
struct Worker {
	requests: Sender<Request>,
	answers: Sender<Answer>,
	events: Mutex<Receiver<WorkerEvent>>,
}

fn spawn_worker() -> std::io::Result<Worker> {
	let (request_tx, request_rx) = mpsc::channel();
	let (event_tx, event_rx) = mpsc::channel();
	let (answer_tx, answer_rx) = mpsc::channel();
	thread::Builder::new()
		.name("session".to_string())
		.spawn(move || run_worker(request_rx, event_tx, answer_rx))?;
	Ok(Worker { requests: request_tx, answers: answer_tx, events: Mutex::new(event_rx) })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
	Menu,
	Session,
}

#[derive(Resource)]
struct UiState {
	screen: Screen,
	path_input: String,
	view: Option<SessionView>,
	modal: Option<PromptRequest>,
	modal_text: String,
	request_rebuild_tiles: bool,
	toast: Option<(String, f32)>, // (message, remaining_seconds)
}

impl UiState {
	fn new(path: String) -> Self {
		Self {
			screen: Screen::Menu,
			path_input: path,
			view: None,
			modal: None,
			modal_text: String::new(),
			request_rebuild_tiles: false,
			toast: None,
		}
	}
}

// ---------- Entry ----------
fn main() {
	let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_LEVEL_FILE.to_string());
	let worker = match spawn_worker() {
		Ok(worker) => worker,
		Err(e) => {
			eprintln!("could not start the session worker: {e}");
			return;
		}
	};

	App::new()
		.add_plugins(DefaultPlugins.set(WindowPlugin {
			primary_window: Some(Window {
				title: "Sokoforge".to_string(),
				resolution: (1024, 720).into(),
				..Default::default()
			}),
			..Default::default()
		}))
		.add_plugins(EguiPlugin::default())
		// Resources
		.insert_resource(UiState::new(path))
		.insert_resource(worker)
		// Setup
		.add_systems(Startup, setup_camera)
		// Frame systems
		.add_systems(
			Update,
			(
				pump_worker_events,
				handle_keys,
				handle_board_click,
				build_board_when_needed,
				update_toast_timer,
			)
				.chain(),
		)
		.add_systems(EguiPrimaryContextPass, draw_ui)
		.run();
}

// ---------- Setup ----------
fn setup_camera(mut commands: Commands) {
	commands.spawn((Camera2d, Transform::from_xyz(0.0, 0.0, 1000.0)));
}

// ---------- Utilities ----------
fn tile_color_for_kind(k: TileKind) -> Color {
	match k {
		TileKind::Wall => Color::srgb(0.22, 0.2, 0.24),
		TileKind::Floor => Color::srgb(0.72, 0.68, 0.6),
		TileKind::Target => Color::srgb(0.95, 0.8, 0.3),
		TileKind::Crate => Color::srgb(0.55, 0.35, 0.18),
		TileKind::CrateOnTarget => Color::srgb(0.3, 0.65, 0.3),
		TileKind::Player => Color::srgb(0.2, 0.4, 0.85),
		TileKind::PlayerOnTarget => Color::srgb(0.45, 0.6, 0.95),
		TileKind::Invalid => Color::BLACK,
	}
}

/// Row 0 is drawn at the top.
fn tile_center(size: GridSize, c: TileCoord, z: f32) -> Vec3 {
	Vec3::new(
		c.x as f32 * TILE_SIZE + TILE_SIZE * 0.5,
		(size.height - 1 - c.y) as f32 * TILE_SIZE + TILE_SIZE * 0.5,
		z,
	)
}

fn world_to_tile_coord(size: GridSize, p: Vec2) -> TileCoord {
	let x = (p.x / TILE_SIZE).floor() as i32;
	let row = (p.y / TILE_SIZE).floor() as i32;
	TileCoord::new(x, size.height - 1 - row)
}

fn screen_to_world_2d(camera_q: &Query<(&Camera, &GlobalTransform)>, screen_pos: Vec2) -> Option<Vec2> {
	let (camera, camera_transform) = camera_q.single().ok()?;
	camera.viewport_to_world_2d(camera_transform, screen_pos).ok()
}

fn view_mode(view: &SessionView) -> Mode {
	match view {
		SessionView::Play(_) => Mode::Play,
		SessionView::Edit(_) => Mode::Edit,
	}
}

fn set_toast(ui: &mut UiState, msg: impl Into<String>) {
	ui.toast = Some((msg.into(), TOAST_SECONDS));
}

fn send_command(worker: &Worker, ui: &mut UiState, cmd: SessionCommand) {
	if worker.requests.send(Request::Command(cmd)).is_err() {
		set_toast(ui, "Session worker stopped");
	}
}

fn palette_key(key: KeyCode) -> Option<usize> {
	match key {
		KeyCode::Digit1 => Some(0),
		KeyCode::Digit2 => Some(1),
		KeyCode::Digit3 => Some(2),
		KeyCode::Digit4 => Some(3),
		KeyCode::Digit5 => Some(4),
		KeyCode::Digit6 => Some(5),
		KeyCode::Digit7 => Some(6),
		_ => None,
	}
}

fn direction_key(key: KeyCode) -> Option<Direction> {
	match key {
		KeyCode::ArrowLeft | KeyCode::KeyA => Some(Direction::Left),
		KeyCode::ArrowUp | KeyCode::KeyW => Some(Direction::Up),
		KeyCode::ArrowRight | KeyCode::KeyD => Some(Direction::Right),
		KeyCode::ArrowDown | KeyCode::KeyS => Some(Direction::Down),
		_ => None,
	}
}

fn command_for_key(mode: Mode, key: KeyCode, ctrl: bool) -> Option<SessionCommand> {
	if ctrl {
		return match (mode, key) {
			(Mode::Play, KeyCode::KeyR) => Some(SessionCommand::Play(PlayCommand::Revert)),
			(Mode::Play, KeyCode::KeyS) => Some(SessionCommand::Play(PlayCommand::Save)),
			(Mode::Edit, KeyCode::KeyS) => Some(SessionCommand::Edit(EditCommand::Save)),
			_ => None,
		};
	}
	match mode {
		Mode::Play => {
			let cmd = match key {
				KeyCode::PageDown => PlayCommand::NextLevel,
				KeyCode::PageUp => PlayCommand::PrevLevel,
				KeyCode::Escape => PlayCommand::Exit,
				other => PlayCommand::Move(direction_key(other)?),
			};
			Some(SessionCommand::Play(cmd))
		}
		Mode::Edit => {
			let cmd = match key {
				KeyCode::Enter | KeyCode::Space => EditCommand::Paint,
				KeyCode::Home => EditCommand::AddLevel { before: true },
				KeyCode::End => EditCommand::AddLevel { before: false },
				KeyCode::Delete => EditCommand::DeleteLevel,
				KeyCode::KeyR => EditCommand::RenameLevel,
				KeyCode::PageDown => EditCommand::NextLevel,
				KeyCode::PageUp => EditCommand::PrevLevel,
				KeyCode::Escape => EditCommand::Exit,
				other => match palette_key(other) {
					Some(index) => EditCommand::SelectTile(index),
					None => EditCommand::MoveCursor(direction_key(other)?),
				},
			};
			Some(SessionCommand::Edit(cmd))
		}
	}
}

// ---------- Systems: Worker ----------
fn pump_worker_events(worker: Res<Worker>, mut ui: ResMut<UiState>, mut exit: EventWriter<AppExit>) {
	let Ok(events) = worker.events.lock() else {
		return;
	};
	while let Ok(event) = events.try_recv() {
		match event {
			WorkerEvent::View(view) => {
				ui.view = Some(view);
				ui.screen = Screen::Session;
				ui.request_rebuild_tiles = true;
			}
			WorkerEvent::Prompt(request) => {
				ui.modal_text = match &request {
					PromptRequest::Text { initial, .. } => initial.clone(),
					_ => String::new(),
				};
				ui.modal = Some(request);
			}
			WorkerEvent::Closed(ExitCode::Quit) => {
				exit.write(AppExit::Success);
			}
			WorkerEvent::Closed(ExitCode::ReturnToMenu) => {
				ui.screen = Screen::Menu;
				ui.view = None;
				ui.request_rebuild_tiles = true;
			}
		}
	}
}

// ---------- Systems: Input ----------
fn handle_keys(keys: Res<ButtonInput<KeyCode>>, mut ui: ResMut<UiState>, worker: Res<Worker>) {
	if ui.modal.is_some() {
		return;
	}
	let Some(mode) = ui.view.as_ref().map(view_mode) else {
		return;
	};
	let ctrl = keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
	for key in keys.get_just_pressed() {
		if let Some(cmd) = command_for_key(mode, *key, ctrl) {
			send_command(&worker, &mut ui, cmd);
		}
	}
}

fn handle_board_click(
	mut egui_ctx: EguiContexts,
	windows: Query<&Window, With<PrimaryWindow>>,
	q_cam: Query<(&Camera, &GlobalTransform)>,
	mouse_buttons: Res<ButtonInput<MouseButton>>,
	mut ui: ResMut<UiState>,
	worker: Res<Worker>,
) {
	if !mouse_buttons.just_pressed(MouseButton::Left) || ui.modal.is_some() {
		return;
	}
	if let Ok(ctx) = egui_ctx.ctx_mut() {
		if ctx.wants_pointer_input() || ctx.is_pointer_over_area() {
			return;
		}
	}
	let Some(SessionView::Edit(view)) = ui.view.as_ref() else {
		return;
	};
	let size = GridSize::new(view.width, view.height);
	let window = if let Ok(w) = windows.single() { w } else { return };
	let cursor_pos = if let Some(p) = window.cursor_position() { p } else { return };
	let world_pos = if let Some(wp) = screen_to_world_2d(&q_cam, cursor_pos) { wp } else { return };
	let c = world_to_tile_coord(size, world_pos);
	if size.contains(c) {
		send_command(&worker, &mut ui, SessionCommand::Edit(EditCommand::SetCursor(c)));
		send_command(&worker, &mut ui, SessionCommand::Edit(EditCommand::Paint));
	}
}

// ---------- Systems: Board Rendering ----------
fn build_board_when_needed(
	mut commands: Commands,
	mut ui: ResMut<UiState>,
	existing_layers: Query<Entity, With<BoardLayer>>,
	mut q_cam: Query<&mut Transform, With<Camera2d>>,
) {
	if !ui.request_rebuild_tiles {
		return;
	}
	ui.request_rebuild_tiles = false;
	for e in &existing_layers {
		commands.entity(e).despawn();
	}
	let Some(view) = ui.view.as_ref() else {
		return;
	};

	let (size, tiles) = display_tiles(view);
	for c in size.iter_tiles() {
		let Some(kind) = size.index(c).and_then(|i| tiles.get(i)) else {
			continue;
		};
		commands.spawn((
			Sprite::from_color(tile_color_for_kind(*kind), Vec2::splat(TILE_SIZE - TILE_GAP)),
			Transform::from_translation(tile_center(size, c, 0.0)),
			TilePos { x: c.x, y: c.y },
			BoardLayer,
		));
	}
	if let Some(c) = cursor(view) {
		commands.spawn((
			Sprite::from_color(Color::srgba(1.0, 1.0, 1.0, 0.35), Vec2::splat(TILE_SIZE)),
			Transform::from_translation(tile_center(size, c, 5.0)),
			BoardLayer,
		));
	}

	if let Ok(mut cam_transform) = q_cam.single_mut() {
		cam_transform.translation.x = size.width as f32 * TILE_SIZE * 0.5;
		cam_transform.translation.y = size.height as f32 * TILE_SIZE * 0.5;
	}
}

// ---------- Systems: Toast ----------
fn update_toast_timer(time: Res<Time>, mut ui: ResMut<UiState>) {
	if let Some((_, ref mut remaining)) = ui.toast {
		*remaining -= time.delta_secs();
		if *remaining <= 0.0 {
			ui.toast = None;
		}
	}
}

// ---------- Systems: UI ----------
fn draw_modal(ctx: &egui::Context, request: &PromptRequest, text: &mut String) -> Option<Answer> {
	let mut answer = None;
	let (enter, escape) = ctx.input(|i| (i.key_pressed(egui::Key::Enter), i.key_pressed(egui::Key::Escape)));
	egui::Window::new("Sokoforge")
		.collapsible(false)
		.resizable(false)
		.anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
		.show(ctx, |ui_modal| match request {
			PromptRequest::Confirm(message) => {
				ui_modal.label(message);
				ui_modal.horizontal(|ui_row| {
					if ui_row.button("Yes").clicked() || enter {
						answer = Some(Answer::Confirm(Confirmation::Confirmed));
					}
					if ui_row.button("No").clicked() || escape {
						answer = Some(Answer::Confirm(Confirmation::Declined));
					}
					if ui_row.button("Quit").clicked() {
						answer = Some(Answer::Confirm(Confirmation::QuitRequested));
					}
				});
			}
			PromptRequest::Text { label, max_len, .. } => {
				ui_modal.label(label);
				ui_modal.add(egui::TextEdit::singleline(text).char_limit(*max_len)).request_focus();
				ui_modal.horizontal(|ui_row| {
					if ui_row.button("OK").clicked() || enter {
						answer = Some(Answer::Text(TextInput::Accepted(text.clone())));
					}
					if ui_row.button("Cancel").clicked() || escape {
						answer = Some(Answer::Text(TextInput::Cancelled));
					}
					if ui_row.button("Quit").clicked() {
						answer = Some(Answer::Text(TextInput::QuitRequested));
					}
				});
			}
			PromptRequest::Notify(message) => {
				ui_modal.label(message);
				ui_modal.horizontal(|ui_row| {
					if ui_row.button("OK").clicked() || enter || escape {
						answer = Some(Answer::Notice(Notice::Acknowledged));
					}
					if ui_row.button("Quit").clicked() {
						answer = Some(Answer::Notice(Notice::QuitRequested));
					}
				});
			}
		});
	answer
}

fn draw_ui(
	mut egui_ctx: EguiContexts,
	mut ui: ResMut<UiState>,
	worker: Res<Worker>,
	mut exit: EventWriter<AppExit>,
) {
	if let Ok(ctx) = egui_ctx.ctx_mut() {

	match ui.screen {
		Screen::Menu => {
			let mut start = None;
			let mut quit = false;
			egui::CentralPanel::default().show(&*ctx, |ui_menu| {
				ui_menu.heading("Sokoforge");
				ui_menu.horizontal(|ui_row| {
					ui_row.label("Level file");
					ui_row.text_edit_singleline(&mut ui.path_input);
				});
				ui_menu.horizontal(|ui_row| {
					if ui_row.button("Play").clicked() {
						start = Some(Mode::Play);
					}
					if ui_row.button("Edit").clicked() {
						start = Some(Mode::Edit);
					}
					if ui_row.button("Quit").clicked() {
						quit = true;
					}
				});
				if let Some((ref msg, _)) = ui.toast {
					ui_menu.colored_label(egui::Color32::YELLOW, msg);
				}
			});
			if quit {
				exit.write(AppExit::Success);
			}
			if let Some(mode) = start {
				let path = PathBuf::from(ui.path_input.trim());
				if worker.requests.send(Request::Open(mode, path)).is_err() {
					set_toast(&mut ui, "Session worker stopped");
				}
			}
		}
		Screen::Session => {
			let mut clicked = None;
			if let Some(view) = ui.view.as_ref() {
				egui::TopBottomPanel::top("top_hud").show(&*ctx, |ui_top| {
					ui_top.label(format_status_line(view));
					let hints: &[&str] = match view {
						SessionView::Play(_) => &PLAY_HINTS,
						SessionView::Edit(_) => &EDIT_HINTS,
					};
					ui_top.horizontal_wrapped(|ui_row| {
						for hint in hints {
							ui_row.label(*hint);
							ui_row.separator();
						}
					});
				});
				if let SessionView::Edit(edit) = view {
					egui::SidePanel::right("palette").default_width(180.0).show(&*ctx, |ui_right| {
						ui_right.heading("Tiles");
						for (i, tile) in PALETTE.iter().enumerate() {
							let label = format!("{} {}", i + 1, tile.label());
							if ui_right.selectable_label(i == edit.selected, label).clicked() {
								clicked = Some(SessionCommand::Edit(EditCommand::SelectTile(i)));
							}
						}
					});
				}
			}
			if let Some(cmd) = clicked {
				send_command(&worker, &mut ui, cmd);
			}
		}
	}

	if let Some(request) = ui.modal.take() {
		match draw_modal(ctx, &request, &mut ui.modal_text) {
			Some(answer) => {
				if worker.answers.send(answer).is_err() {
					set_toast(&mut ui, "Session worker stopped");
				}
			}
			None => ui.modal = Some(request),
		}
	}

	} // end if Ok(ctx)
}

#[cfg(test)]
mod tests {
	use super::*;
	use bevy::prelude::{MinimalPlugins, TransformPlugin};
	use sokoforge::{EditorEngine, GameplayEngine, LevelCollection, parse};
	use std::time::Duration;

	const TIMEOUT: Duration = Duration::from_secs(5);

	fn play_view(text: &str) -> SessionView {
		let levels = parse(text).unwrap().levels;
		SessionView::Play(GameplayEngine::new(levels, "unused.txt").unwrap().view())
	}

	#[test]
	fn keys_map_to_commands_per_mode() {
		assert_eq!(
			command_for_key(Mode::Play, KeyCode::KeyW, false),
			Some(SessionCommand::Play(PlayCommand::Move(Direction::Up)))
		);
		assert_eq!(
			command_for_key(Mode::Play, KeyCode::KeyS, true),
			Some(SessionCommand::Play(PlayCommand::Save))
		);
		assert_eq!(
			command_for_key(Mode::Play, KeyCode::KeyR, true),
			Some(SessionCommand::Play(PlayCommand::Revert))
		);
		assert_eq!(
			command_for_key(Mode::Edit, KeyCode::Digit7, false),
			Some(SessionCommand::Edit(EditCommand::SelectTile(6)))
		);
		assert_eq!(
			command_for_key(Mode::Edit, KeyCode::Home, false),
			Some(SessionCommand::Edit(EditCommand::AddLevel { before: true }))
		);
		assert_eq!(command_for_key(Mode::Play, KeyCode::Digit1, false), None);
		assert_eq!(command_for_key(Mode::Play, KeyCode::KeyR, false), None);
	}

	#[test]
	fn click_position_maps_back_to_tile() {
		let size = GridSize::new(5, 3);
		let c = TileCoord::new(3, 0);
		let center = tile_center(size, c, 0.0);
		assert_eq!(world_to_tile_coord(size, center.truncate()), c);
	}

	#[test]
	fn board_spawns_one_sprite_per_tile() {
		let mut app = App::new();
		app.add_plugins((MinimalPlugins, TransformPlugin));

		let mut ui = UiState::new("levels.txt".to_string());
		ui.view = Some(play_view("; A\n#@$.#\n#####\n"));
		ui.request_rebuild_tiles = true;
		app.insert_resource(ui);
		app.add_systems(Startup, (setup_camera, build_board_when_needed).chain());
		app.update();

		let world = app.world_mut();
		let mut q = world.query::<&TilePos>();
		assert_eq!(q.iter(world).count(), 10);
	}

	#[test]
	fn empty_editor_view_spawns_nothing() {
		let mut app = App::new();
		app.add_plugins((MinimalPlugins, TransformPlugin));

		let mut ui = UiState::new("levels.txt".to_string());
		let editor = EditorEngine::new(LevelCollection::new(), "x.txt");
		ui.view = Some(SessionView::Edit(editor.view()));
		ui.request_rebuild_tiles = true;
		app.insert_resource(ui);
		app.add_systems(Startup, (setup_camera, build_board_when_needed).chain());
		app.update();

		let world = app.world_mut();
		let mut q = world.query::<&BoardLayer>();
		assert_eq!(q.iter(world).count(), 0);
	}

	#[test]
	fn worker_reports_missing_file_through_a_prompt() {
		let dir = tempfile::tempdir().unwrap();
		let worker = spawn_worker().unwrap();
		let events = worker.events.lock().unwrap();
		worker.requests.send(Request::Open(Mode::Play, dir.path().join("missing.txt"))).unwrap();

		match events.recv_timeout(TIMEOUT).unwrap() {
			WorkerEvent::Prompt(PromptRequest::Notify(msg)) => assert_eq!(msg, "Could not open file"),
			other => panic!("unexpected {other:?}"),
		}
		worker.answers.send(Answer::Notice(Notice::Acknowledged)).unwrap();
		assert!(matches!(events.recv_timeout(TIMEOUT).unwrap(), WorkerEvent::Closed(ExitCode::ReturnToMenu)));
	}

	#[test]
	fn worker_plays_commands_in_order() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("levels.txt");
		std::fs::write(&path, "; A\n#@ $.#\n").unwrap();
		let worker = spawn_worker().unwrap();
		let events = worker.events.lock().unwrap();

		worker.requests.send(Request::Open(Mode::Play, path)).unwrap();
		assert!(matches!(events.recv_timeout(TIMEOUT).unwrap(), WorkerEvent::View(SessionView::Play(_))));

		let step = SessionCommand::Play(PlayCommand::Move(Direction::Right));
		worker.requests.send(Request::Command(step)).unwrap();
		match events.recv_timeout(TIMEOUT).unwrap() {
			WorkerEvent::View(SessionView::Play(view)) => assert_eq!(view.player, TileCoord::new(2, 0)),
			other => panic!("unexpected {other:?}"),
		}

		worker.requests.send(Request::Command(SessionCommand::Play(PlayCommand::Exit))).unwrap();
		match events.recv_timeout(TIMEOUT).unwrap() {
			WorkerEvent::Prompt(PromptRequest::Confirm(msg)) => assert_eq!(msg, "Exit without saving?"),
			other => panic!("unexpected {other:?}"),
		}
		worker.answers.send(Answer::Confirm(Confirmation::Confirmed)).unwrap();
		assert!(matches!(events.recv_timeout(TIMEOUT).unwrap(), WorkerEvent::Closed(ExitCode::ReturnToMenu)));
	}
}
