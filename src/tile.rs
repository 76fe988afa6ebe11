#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TileKind {
	Wall,
	Player,
	PlayerOnTarget,
	Crate,
	CrateOnTarget,
	Target,
	Floor,
	/// Answer for queries outside the grid. Never stored in a level.
	Invalid,
}

/// Tiles the editor can paint, in palette order.
pub const PALETTE: [TileKind; 7] = [
	TileKind::Wall,
	TileKind::Player,
	TileKind::PlayerOnTarget,
	TileKind::Crate,
	TileKind::CrateOnTarget,
	TileKind::Target,
	TileKind::Floor,
];

impl TileKind {
	pub fn from_char(c: char) -> Option<TileKind> {
		match c {
			'#' => Some(TileKind::Wall),
			'@' => Some(TileKind::Player),
			'+' => Some(TileKind::PlayerOnTarget),
			'$' => Some(TileKind::Crate),
			'*' => Some(TileKind::CrateOnTarget),
			'.' => Some(TileKind::Target),
			' ' => Some(TileKind::Floor),
			_ => None,
		}
	}

	pub fn to_char(self) -> Option<char> {
		match self {
			TileKind::Wall => Some('#'),
			TileKind::Player => Some('@'),
			TileKind::PlayerOnTarget => Some('+'),
			TileKind::Crate => Some('$'),
			TileKind::CrateOnTarget => Some('*'),
			TileKind::Target => Some('.'),
			TileKind::Floor => Some(' '),
			TileKind::Invalid => None,
		}
	}

	pub fn from_palette_index(index: usize) -> Option<TileKind> {
		PALETTE.get(index).copied()
	}

	pub fn palette_index(self) -> Option<usize> {
		PALETTE.iter().position(|k| *k == self)
	}

	pub fn is_player(self) -> bool {
		matches!(self, TileKind::Player | TileKind::PlayerOnTarget)
	}

	pub fn is_crate(self) -> bool {
		matches!(self, TileKind::Crate | TileKind::CrateOnTarget)
	}

	/// Floor or an uncovered target: something a player can step on or a crate can slide onto.
	pub fn is_open(self) -> bool {
		matches!(self, TileKind::Floor | TileKind::Target)
	}

	pub fn has_target(self) -> bool {
		matches!(self, TileKind::Target | TileKind::CrateOnTarget | TileKind::PlayerOnTarget)
	}

	pub fn label(self) -> &'static str {
		match self {
			TileKind::Wall => "Wall",
			TileKind::Player => "Player",
			TileKind::PlayerOnTarget => "Player on target",
			TileKind::Crate => "Crate",
			TileKind::CrateOnTarget => "Crate on target",
			TileKind::Target => "Target",
			TileKind::Floor => "Floor",
			TileKind::Invalid => "Invalid",
		}
	}
}
