//! Board logic for a level-based minesweeper: mine placement, flood-fill
//! reveal, flag bookkeeping, level progression, and the persistent high-score
//! table. Rendering and input live elsewhere and drive this crate through
//! [`GameSession`] and the read-only board queries.

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use generator::*;
pub use scores::*;
pub use session::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod generator;
mod scores;
mod session;
mod types;

/// Highest playable level.
pub const MAX_LEVEL: u8 = 10;

/// Fixed parameters for one level of the campaign.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelParams {
    /// Side length of the square board.
    pub dim: Coord,
    /// Mines placed on the board.
    pub mines: CellCount,
    /// Finishing under this many seconds earns a time bonus.
    pub bonus_budget_secs: u32,
    /// Points awarded per newly revealed cell.
    pub points_per_reveal: i32,
}

const LEVELS: [LevelParams; MAX_LEVEL as usize] = [
    LevelParams { dim: 10, mines: 15, bonus_budget_secs: 20, points_per_reveal: 1 },
    LevelParams { dim: 10, mines: 20, bonus_budget_secs: 30, points_per_reveal: 2 },
    LevelParams { dim: 12, mines: 21, bonus_budget_secs: 50, points_per_reveal: 3 },
    LevelParams { dim: 12, mines: 26, bonus_budget_secs: 80, points_per_reveal: 4 },
    LevelParams { dim: 14, mines: 30, bonus_budget_secs: 120, points_per_reveal: 5 },
    LevelParams { dim: 14, mines: 35, bonus_budget_secs: 150, points_per_reveal: 7 },
    LevelParams { dim: 16, mines: 39, bonus_budget_secs: 190, points_per_reveal: 9 },
    LevelParams { dim: 16, mines: 46, bonus_budget_secs: 210, points_per_reveal: 12 },
    LevelParams { dim: 20, mines: 80, bonus_budget_secs: 270, points_per_reveal: 18 },
    LevelParams { dim: 20, mines: 100, bonus_budget_secs: 360, points_per_reveal: 30 },
];

impl LevelParams {
    /// Parameters for `level`, which must be in `1..=MAX_LEVEL`.
    pub fn for_level(level: u8) -> Result<Self> {
        if (1..=MAX_LEVEL).contains(&level) {
            Ok(LEVELS[level as usize - 1])
        } else {
            Err(GameError::UnknownLevel)
        }
    }

    /// Parameters of the starting level.
    pub const fn first() -> Self {
        LEVELS[0]
    }

    pub const fn total_cells(&self) -> CellCount {
        cell_area(self.dim, self.dim)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parameters_grow_with_the_level() {
        let mut previous = LevelParams::for_level(1).unwrap();
        for level in 2..=MAX_LEVEL {
            let params = LevelParams::for_level(level).unwrap();
            assert!(params.dim >= previous.dim, "level {level}");
            assert!(params.mines >= previous.mines, "level {level}");
            assert!(params.mines < params.total_cells(), "level {level}");
            previous = params;
        }
    }

    #[test]
    fn levels_outside_the_table_are_rejected() {
        assert_eq!(LevelParams::for_level(0), Err(GameError::UnknownLevel));
        assert_eq!(
            LevelParams::for_level(MAX_LEVEL + 1),
            Err(GameError::UnknownLevel)
        );
    }

    #[test]
    fn first_level_matches_the_table() {
        assert_eq!(LevelParams::first(), LevelParams::for_level(1).unwrap());
        assert_eq!(LevelParams::first().safe_cells(), 85);
    }
}
