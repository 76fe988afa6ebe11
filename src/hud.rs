use crate::coords::{GridSize, TileCoord};
use crate::engine::SessionView;
use crate::tile::{PALETTE, TileKind};

pub const PLAY_HINTS: [&str; 5] = [
	"Arrows/WASD: move",
	"Ctrl+R: revert",
	"Ctrl+S: save",
	"PgUp/PgDn: level",
	"Esc: menu",
];

pub const EDIT_HINTS: [&str; 7] = [
	"Arrows: cursor",
	"Enter/Space: paint",
	"1-7: tile",
	"Home/End: add level",
	"Del: delete level",
	"R: rename",
	"Ctrl+S: save",
];

fn status_line(position: usize, count: usize, name: &str) -> String {
	let name = if name.is_empty() { "(unnamed)" } else { name };
	format!("{}/{} · {}", position + 1, count, name)
}

pub fn format_status_line(view: &SessionView) -> String {
	match view {
		SessionView::Play(v) => {
			let mut line = status_line(v.position, v.count, &v.name);
			if v.finished {
				line.push_str(" · Finished");
			}
			line
		}
		SessionView::Edit(v) if v.is_empty() => "No levels".to_string(),
		SessionView::Edit(v) => status_line(v.position, v.count, &v.name),
	}
}

fn tile_char(tile: TileKind) -> char {
	tile.to_char().unwrap_or('?')
}

/// Tile kinds as drawn, row-major; the player is merged back into the play grid.
pub fn display_tiles(view: &SessionView) -> (GridSize, Vec<TileKind>) {
	match view {
		SessionView::Play(v) => {
			let size = GridSize::new(v.width, v.height);
			let mut tiles = v.tiles.clone();
			if let Some(i) = size.index(v.player) {
				tiles[i] = if tiles[i] == TileKind::Target {
					TileKind::PlayerOnTarget
				} else {
					TileKind::Player
				};
			}
			(size, tiles)
		}
		SessionView::Edit(v) => (GridSize::new(v.width, v.height), v.tiles.clone()),
	}
}

/// Text rendering of the board, one string per row.
pub fn board_rows(view: &SessionView) -> Vec<String> {
	let (size, tiles) = display_tiles(view);
	if size.width <= 0 {
		return Vec::new();
	}
	tiles
		.chunks(size.width as usize)
		.map(|row| row.iter().copied().map(tile_char).collect())
		.collect()
}

pub fn cursor(view: &SessionView) -> Option<TileCoord> {
	match view {
		SessionView::Edit(v) if !v.is_empty() => Some(v.cursor),
		_ => None,
	}
}

pub fn palette_lines(selected: usize) -> Vec<String> {
	PALETTE
		.iter()
		.enumerate()
		.map(|(i, tile)| {
			let marker = if i == selected { '>' } else { ' ' };
			format!("{marker} {} {}", i + 1, tile.label())
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::codec::parse;
	use crate::editor::EditorEngine;
	use crate::gameplay::GameplayEngine;
	use crate::collection::LevelCollection;

	#[test]
	fn status_line_counts_from_one() {
		let levels = parse("; First\n#@$.#\n\n; Second\n#@$.#\n").unwrap().levels;
		let e = GameplayEngine::new(levels, "x").unwrap();
		let line = format_status_line(&SessionView::Play(e.view()));
		assert_eq!(line, "1/2 · First");
	}

	#[test]
	fn finished_levels_are_marked() {
		let levels = parse("; Done\n#@*#\n").unwrap().levels;
		let e = GameplayEngine::new(levels, "x").unwrap();
		assert!(format_status_line(&SessionView::Play(e.view())).ends_with(" · Finished"));
	}

	#[test]
	fn board_overlays_player() {
		let levels = parse("; A\n#+$ #\n#####\n").unwrap().levels;
		let e = GameplayEngine::new(levels, "x").unwrap();
		let rows = board_rows(&SessionView::Play(e.view()));
		assert_eq!(rows, vec!["#+$ #".to_string(), "#####".to_string()]);
	}

	#[test]
	fn empty_editor_view() {
		let e = EditorEngine::new(LevelCollection::new(), "x");
		let view = SessionView::Edit(e.view());
		assert_eq!(format_status_line(&view), "No levels");
		assert!(board_rows(&view).is_empty());
		assert_eq!(cursor(&view), None);
	}

	#[test]
	fn palette_marks_selection() {
		let lines = palette_lines(6);
		assert_eq!(lines.len(), 7);
		assert!(lines[6].starts_with('>'));
		assert!(lines[0].starts_with(' '));
	}
}
