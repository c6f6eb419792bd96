use std::collections::VecDeque;
use std::ops::BitOr;

use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Outcome of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Outcome of a reveal or chord action. `HitMine` is the loss condition and is
/// signaled as a value, never as an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn is_mine_hit(self) -> bool {
        matches!(self, Self::HitMine)
    }
}

/// Used to merge outcomes when a chord opens several neighbors.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) | (_, HitMine) => HitMine,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Square grid of cells with aggregate counters. Cells exist as soon as the
/// board does; mines are placed later, on the first reveal, so the starting
/// cell can be protected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    dim: Coord,
    mine_count: CellCount,
    cells: Array2<Cell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    generated: bool,
}

impl Board {
    pub fn new(dim: Coord, mine_count: CellCount) -> Self {
        let dim = dim.max(1);
        Self {
            dim,
            mine_count,
            cells: Array2::default((dim as usize, dim as usize)),
            revealed_count: 0,
            flagged_count: 0,
            generated: false,
        }
    }

    /// Builds a generated board from explicit mine positions, for replays and
    /// deterministic tests.
    pub fn with_mines(dim: Coord, mines: &[Coord2]) -> Result<Self> {
        let mut board = Self::new(dim, 0);
        let mut mask: Array2<bool> = Array2::default((board.dim as usize, board.dim as usize));
        for &pos in mines {
            board.validate(pos)?;
            mask[pos.to_index()] = true;
        }
        board.mine_count = mask.iter().filter(|&&mine| mine).count() as CellCount;
        board.apply_layout(&mask);
        Ok(board)
    }

    /// Places mines through `generator`, never on the `excluded` first-clicked
    /// cell, then wires adjacency counts and neighbor lists.
    pub fn generate(
        &mut self,
        generator: &mut RandomMineGenerator,
        excluded: Coord2,
    ) -> Result<()> {
        let excluded = self.validate(excluded)?;
        if self.generated {
            return Err(GameError::MinesAlreadyPlaced);
        }
        let mask = generator.place(self.dim, self.mine_count, excluded)?;
        self.apply_layout(&mask);
        Ok(())
    }

    fn apply_layout(&mut self, mask: &Array2<bool>) {
        for row in 0..self.dim {
            for col in 0..self.dim {
                let pos = (row, col);
                let mut around = 0u8;
                let mut neighbors = SmallVec::new();
                for neighbor in mask.neighbors_of(pos) {
                    if mask[neighbor.to_index()] {
                        around += 1;
                    }
                    neighbors.push(neighbor);
                }
                let cell = &mut self.cells[pos.to_index()];
                if mask[pos.to_index()] {
                    cell.assign_mine();
                }
                cell.assign_adjacency(around, neighbors);
            }
        }
        self.generated = true;
    }

    pub fn dim(&self) -> Coord {
        self.dim
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        cell_area(self.dim, self.dim)
    }

    pub fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn count_revealed(&self) -> CellCount {
        self.revealed_count
    }

    pub fn count_flagged(&self) -> CellCount {
        self.flagged_count
    }

    pub fn cell(&self, pos: Coord2) -> Result<&Cell> {
        let pos = self.validate(pos)?;
        Ok(&self.cells[pos.to_index()])
    }

    pub fn view_at(&self, pos: Coord2) -> Result<CellView> {
        Ok(self.cell(pos)?.view())
    }

    fn validate(&self, pos: Coord2) -> Result<Coord2> {
        if pos.0 < self.dim && pos.1 < self.dim {
            Ok(pos)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    /// Toggles the flag at `pos`. Revealed cells refuse flags; repeated
    /// toggles cancel out.
    pub fn toggle_flag(&mut self, pos: Coord2) -> Result<FlagOutcome> {
        let pos = self.validate(pos)?;
        let cell = &mut self.cells[pos.to_index()];
        if !cell.toggle_flag() {
            return Ok(FlagOutcome::NoChange);
        }
        if cell.is_flagged() {
            self.flagged_count += 1;
        } else {
            self.flagged_count -= 1;
        }
        Ok(FlagOutcome::Changed)
    }

    /// Flagged neighbors of `pos`, the trigger count for a chord.
    pub fn count_flagged_neighbors(&self, pos: Coord2) -> Result<u8> {
        let pos = self.validate(pos)?;
        Ok(self.cells[pos.to_index()]
            .neighbors()
            .iter()
            .filter(|&&neighbor| self.cells[neighbor.to_index()].is_flagged())
            .count() as u8)
    }

    /// Reveals the cell at `pos`.
    ///
    /// A flagged target is a safe no-op. A covered zero cell cascades through
    /// its zero-region. A revealed numbered cell whose flagged-neighbor count
    /// matches chords: every unflagged neighbor is revealed, stopping at the
    /// first mine uncovered.
    pub fn reveal(&mut self, pos: Coord2) -> Result<RevealOutcome> {
        let pos = self.validate(pos)?;
        if !self.generated {
            return Err(GameError::MinesNotPlaced);
        }

        let (flagged, revealed, around) = {
            let cell = &self.cells[pos.to_index()];
            (cell.is_flagged(), cell.is_revealed(), cell.mines_around())
        };

        if flagged {
            return Ok(RevealOutcome::NoChange);
        }

        if revealed {
            if around != 0 && self.count_flagged_neighbors(pos)? == around {
                return Ok(self.chord_neighbors(pos));
            }
            return Ok(RevealOutcome::NoChange);
        }

        Ok(self.reveal_single(pos))
    }

    fn chord_neighbors(&mut self, pos: Coord2) -> RevealOutcome {
        let neighbors: SmallVec<[Coord2; 8]> =
            self.cells[pos.to_index()].neighbors().iter().copied().collect();

        let mut merged = RevealOutcome::NoChange;
        for neighbor in neighbors {
            if self.cells[neighbor.to_index()].is_flagged() {
                continue;
            }
            merged = merged | self.reveal_single(neighbor);
            if merged.is_mine_hit() {
                // stop cascading as soon as a mine comes up
                break;
            }
        }
        merged
    }

    fn reveal_single(&mut self, pos: Coord2) -> RevealOutcome {
        let cell = &mut self.cells[pos.to_index()];
        if cell.is_revealed() || cell.is_flagged() {
            return RevealOutcome::NoChange;
        }
        cell.mark_revealed();
        let is_mine = cell.is_mine();
        let around = cell.mines_around();
        self.revealed_count += 1;

        if is_mine {
            log::debug!("mine uncovered at {pos:?}");
            return RevealOutcome::HitMine;
        }

        log::trace!("revealed {pos:?}, {around} mines around");
        if around == 0 {
            self.flood_fill(pos);
        }
        RevealOutcome::Revealed
    }

    /// Opens the zero-region around `origin` with an explicit worklist.
    /// Zero cells have no mine neighbors, so the flood never uncovers a mine.
    fn flood_fill(&mut self, origin: Coord2) {
        let mut visited: HashSet<Coord2> = HashSet::new();
        visited.insert(origin);

        let mut worklist: VecDeque<Coord2> = self.cells[origin.to_index()]
            .neighbors()
            .iter()
            .copied()
            .filter(|&neighbor| {
                let cell = &self.cells[neighbor.to_index()];
                !cell.is_revealed() && !cell.is_flagged()
            })
            .collect();
        log::trace!("flood fill from {origin:?}, frontier {worklist:?}");

        while let Some(pos) = worklist.pop_front() {
            if !visited.insert(pos) {
                continue;
            }
            {
                let cell = &mut self.cells[pos.to_index()];
                if cell.is_revealed() || cell.is_flagged() {
                    continue;
                }
                cell.mark_revealed();
            }
            self.revealed_count += 1;

            let around = self.cells[pos.to_index()].mines_around();
            log::trace!("flood revealed {pos:?}, {around} mines around");
            if around == 0 {
                let next: SmallVec<[Coord2; 8]> = self.cells[pos.to_index()]
                    .neighbors()
                    .iter()
                    .copied()
                    .filter(|&neighbor| {
                        let cell = &self.cells[neighbor.to_index()];
                        !cell.is_revealed() && !cell.is_flagged() && !visited.contains(&neighbor)
                    })
                    .collect();
                worklist.extend(next);
            }
        }
    }

    /// Press-highlight hint for the render layer: the unflagged neighbors of a
    /// revealed numbered cell whose flag count does not match yet. Pure query,
    /// never board state.
    pub fn highlight_targets(&self, pos: Coord2) -> Result<SmallVec<[Coord2; 8]>> {
        let pos = self.validate(pos)?;
        let cell = &self.cells[pos.to_index()];
        let mut targets = SmallVec::new();
        if !cell.is_revealed() || cell.mines_around() == 0 {
            return Ok(targets);
        }
        if self.count_flagged_neighbors(pos)? == cell.mines_around() {
            // a chord would fire instead
            return Ok(targets);
        }
        for &neighbor in cell.neighbors() {
            if !self.cells[neighbor.to_index()].is_flagged() {
                targets.push(neighbor);
            }
        }
        Ok(targets)
    }

    /// Uncovers every unflagged mine after a loss. Flagged cells keep their
    /// flag and stay covered.
    pub fn reveal_all_mines(&mut self) {
        let mut opened: CellCount = 0;
        for cell in self.cells.iter_mut() {
            if cell.is_mine() && !cell.is_flagged() && !cell.is_revealed() {
                cell.mark_revealed();
                opened += 1;
            }
        }
        self.revealed_count += opened;
    }

    pub fn flagged_mine_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| cell.is_mine() && cell.is_flagged())
            .count() as CellCount
    }

    /// Every safe cell has been opened.
    pub fn all_safe_revealed(&self) -> bool {
        self.generated && self.revealed_count == self.safe_cells()
    }

    /// Every mine carries a flag.
    pub fn all_mines_flagged(&self) -> bool {
        self.generated && self.mine_count > 0 && self.flagged_mine_count() == self.mine_count
    }

    /// Level-complete test. Opening all safe cells and flagging all mines are
    /// independent win paths.
    pub fn is_cleared(&self) -> bool {
        self.all_safe_revealed() || self.all_mines_flagged()
    }
}
