use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::Coord2;

/// What the render layer sees at one grid position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8),
    /// A revealed mine.
    Mine,
}

impl CellView {
    pub const fn is_covered(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

/// One grid position: mine status, disclosure state, adjacency count, and the
/// in-bounds neighbor positions assigned at board generation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    is_mine: bool,
    revealed: bool,
    flagged: bool,
    mines_around: u8,
    neighbors: SmallVec<[Coord2; 8]>,
}

impl Cell {
    pub fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Mines among the up-to-8 grid neighbors, fixed at generation time.
    pub fn mines_around(&self) -> u8 {
        self.mines_around
    }

    /// Neighbor positions in row-major offset order.
    pub fn neighbors(&self) -> &[Coord2] {
        &self.neighbors
    }

    pub fn view(&self) -> CellView {
        if self.flagged {
            CellView::Flagged
        } else if !self.revealed {
            CellView::Hidden
        } else if self.is_mine {
            CellView::Mine
        } else {
            CellView::Revealed(self.mines_around)
        }
    }

    pub(crate) fn assign_mine(&mut self) {
        self.is_mine = true;
    }

    pub(crate) fn assign_adjacency(&mut self, mines_around: u8, neighbors: SmallVec<[Coord2; 8]>) {
        self.mines_around = mines_around;
        self.neighbors = neighbors;
    }

    /// Marks the cell revealed. Cells never go back to covered.
    pub(crate) fn mark_revealed(&mut self) {
        self.revealed = true;
    }

    /// Toggles the flag, refusing revealed cells. Returns whether anything changed.
    pub(crate) fn toggle_flag(&mut self) -> bool {
        if self.revealed {
            return false;
        }
        self.flagged = !self.flagged;
        true
    }
}
